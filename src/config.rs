use dotenv::dotenv;
use std::env;

use crate::liquidity::QuoteLadder;

const BIND_ADDR: &str = "BIND_ADDR";
const DATA_DIR: &str = "DATA_DIR";
const SIGNER_KEY: &str = "SIGNER_KEY";
const BASE_TOKEN: &str = "BASE_TOKEN";
const QUOTE_TOKEN: &str = "QUOTE_TOKEN";
const MM_ADDRESS: &str = "MM_ADDRESS";
const REF_PRICE: &str = "REF_PRICE";
const MM_LEVELS: &str = "MM_LEVELS";
const MM_SPREAD_BPS: &str = "MM_SPREAD_BPS";
const MM_STEP_BPS: &str = "MM_STEP_BPS";
const MM_SIZE_BASE: &str = "MM_SIZE_BASE";
const MM_ENSURE_CROSS: &str = "MM_ENSURE_CROSS";

#[derive(Clone)]
pub struct Config {
    pub bind_addr: String,
    pub data_dir: String,
    pub signer_key: String,
    pub base_token: String,
    pub quote_token: String,
    pub mm_address: String,
    pub ref_price: f64,
    pub mm_levels: u32,
    pub mm_spread_bps: f64,
    pub mm_step_bps: f64,
    pub mm_size_base: f64,
    pub mm_ensure_cross: bool,
}

impl Config {
    pub fn from_env() -> Config {
        match Self::try_from_env() {
            Ok(config) => config,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_from_env() -> Result<Config, String> {
        // Load .env file
        dotenv().ok();

        // The signing key is the only variable without a default: running a
        // settlement worker with an accidental key would be worse than not
        // starting at all.
        let signer_key = env::var(SIGNER_KEY)
            .map_err(|_| format!("failed to load environment variable {}", SIGNER_KEY))?;

        let bind_addr = env::var(BIND_ADDR).unwrap_or_else(|_| "127.0.0.1:8000".to_string());
        let data_dir = env::var(DATA_DIR).unwrap_or_else(|_| "./data".to_string());
        let base_token = env::var(BASE_TOKEN).unwrap_or_else(|_| "0xBaseToken".to_string());
        let quote_token = env::var(QUOTE_TOKEN).unwrap_or_else(|_| "0xQuoteToken".to_string());
        let mm_address = env::var(MM_ADDRESS)
            .unwrap_or_else(|_| "0x000000000000000000000000000000000000dEaD".to_string());

        let ref_price = parse_var(REF_PRICE, 2000.0)?;
        let mm_levels = parse_var(MM_LEVELS, 3u32)?;
        let mm_spread_bps = parse_var(MM_SPREAD_BPS, 50.0)?;
        let mm_step_bps = parse_var(MM_STEP_BPS, 25.0)?;
        let mm_size_base = parse_var(MM_SIZE_BASE, 1.0)?;
        let mm_ensure_cross = parse_var(MM_ENSURE_CROSS, true)?;

        Ok(Config {
            bind_addr,
            data_dir,
            signer_key,
            base_token,
            quote_token,
            mm_address,
            ref_price,
            mm_levels,
            mm_spread_bps,
            mm_step_bps,
            mm_size_base,
            mm_ensure_cross,
        })
    }

    /// Quote ladder derived from the market-making variables.
    pub fn ladder(&self) -> QuoteLadder {
        QuoteLadder {
            ref_price: self.ref_price,
            maker: self.mm_address.clone(),
            base_token: self.base_token.clone(),
            quote_token: self.quote_token.clone(),
            levels: self.mm_levels,
            spread_bps: self.mm_spread_bps,
            step_bps: self.mm_step_bps,
            size_base: self.mm_size_base,
            ensure_cross: self.mm_ensure_cross,
            ..QuoteLadder::default()
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("failed to parse environment variable {}: {}", name, raw)),
        Err(_) => Ok(default),
    }
}
