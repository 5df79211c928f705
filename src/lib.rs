// Expose the modules
pub mod api;
pub mod config;
pub mod engine;
pub mod liquidity;
pub mod matching_engine;
pub mod orderbook;
pub mod settlement;
pub mod storage;
pub mod types;

// Re-export key types for easier usage
pub use api::Api;
pub use config::Config;
pub use engine::{DarkPoolEngine, EngineError};
pub use liquidity::{QuoteLadder, inject};
pub use matching_engine::{MatchProposal, MatchingError, try_match};
pub use orderbook::{BookSnapshot, OrderBook};
pub use settlement::{SettlementSigner, SignedSettlement, build_trade, verify_settlement};
pub use storage::{BookStore, JsonFileStore, StorageError};
pub use types::{MatchOutcome, Order, OrderDraft, OrderType, Side, Trade};
