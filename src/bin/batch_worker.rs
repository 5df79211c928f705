//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// One-shot batch entry point for confidential-compute style deployments: read
// an order batch from the input directory, run a single match cycle, write
// the result record to the output directory, exit.
//--------------------------------------------------------------------------------------------------

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use darkpool_worker::{
    Config, DarkPoolEngine, JsonFileStore, MatchOutcome, OrderDraft, SettlementSigner,
};

/// Command line arguments for the batch worker
#[derive(Parser, Debug)]
#[command(author, version, about = "Single-cycle dark pool batch worker")]
struct Args {
    /// Directory holding orders.json and the persisted orderbook.json
    #[arg(long, default_value = "/iexec_in")]
    input_dir: PathBuf,

    /// Directory the result record is written to
    #[arg(long, default_value = "/iexec_out")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = Config::from_env();

    let signer =
        SettlementSigner::from_hex_seed(&config.signer_key).context("invalid signer key")?;

    let store = JsonFileStore::with_paths(
        args.input_dir.join("orderbook.json"),
        args.output_dir.join("result.json"),
    )
    .context("failed to prepare storage paths")?;

    let mut engine = DarkPoolEngine::load(Box::new(store), signer, config.ladder()).await;

    // The order batch is optional; a missing file means an empty batch.
    let orders_path = args.input_dir.join("orders.json");
    let drafts: Vec<OrderDraft> = match tokio::fs::read(&orders_path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .with_context(|| format!("malformed order batch at {}", orders_path.display()))?,
        Err(_) => {
            warn!(path = %orders_path.display(), "no order batch found, running on the persisted book");
            Vec::new()
        }
    };

    if !drafts.is_empty() {
        let inserted = engine
            .submit(drafts)
            .await
            .context("order batch rejected")?;
        info!(count = inserted.len(), "order batch inserted");
    }

    let outcome = engine.run_match_cycle().await.context("match cycle failed")?;
    match &outcome {
        MatchOutcome::Matched { price, signer, .. } => {
            info!(price = *price, signer = %signer, "cycle matched, settlement written");
        }
        MatchOutcome::NoMatch { reason } => {
            info!(reason = %reason, "cycle produced no match");
        }
    }

    Ok(())
}
