//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This is the main entry point for the dark pool worker API server.
// It loads configuration, restores the persisted book, and starts listening
// for requests.
//--------------------------------------------------------------------------------------------------

use std::net::SocketAddr;

use tracing::info;

use darkpool_worker::{Api, Config, DarkPoolEngine, JsonFileStore, SettlementSigner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (for logging)
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let addr: SocketAddr = config.bind_addr.parse()?;
    let store = Box::new(JsonFileStore::new(&config.data_dir)?);

    // A bad key must abort startup, never fall back to a default.
    let signer = SettlementSigner::from_hex_seed(&config.signer_key)?;
    info!(signer = %signer.address(), "settlement signer ready");

    let engine = DarkPoolEngine::load(store, signer, config.ladder()).await;

    Api::new(addr, engine).serve().await
}
