//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module synthesizes layered market-maker quotes into an order book
// around a reference price. Each level widens the spread; an optional extra
// bid above the best ask guarantees at least one crossing pair for demo
// liquidity.
//
// | Component     | Description                                                               |
// |---------------|---------------------------------------------------------------------------|
// | QuoteLadder   | Injection parameters: reference price, levels, spreads, sizes             |
// | inject        | Appends the synthetic bid/ask levels to a book                            |
//--------------------------------------------------------------------------------------------------

use tracing::debug;

use crate::orderbook::OrderBook;
use crate::types::{NO_EXPIRY, Order, OrderType, Side};

/// Parameters for synthetic market-maker injection.
#[derive(Debug, Clone)]
pub struct QuoteLadder {
    /// Reference quote-per-base price the ladder is centered on.
    pub ref_price: f64,
    /// Owner stamped on every synthetic quote.
    pub maker: String,
    /// Base token identifier.
    pub base_token: String,
    /// Quote token identifier.
    pub quote_token: String,
    /// Number of bid/ask levels to emit.
    pub levels: u32,
    /// Spread of the tightest level, in basis points.
    pub spread_bps: f64,
    /// Additional spread per level, in basis points.
    pub step_bps: f64,
    /// Quote size per level, in whole base tokens.
    pub size_base: f64,
    /// Decimals of the base token.
    pub base_decimals: u32,
    /// Decimals of the quote token.
    pub quote_decimals: u32,
    /// When set, appends one extra bid priced above every injected ask so a
    /// crossing pair always exists. Demo liquidity floor, not genuine
    /// counterparty intent; gate off in any real deployment.
    pub ensure_cross: bool,
}

impl Default for QuoteLadder {
    fn default() -> Self {
        Self {
            ref_price: 2000.0,
            maker: "0x000000000000000000000000000000000000dEaD".to_string(),
            base_token: "0xBaseToken".to_string(),
            quote_token: "0xQuoteToken".to_string(),
            levels: 3,
            spread_bps: 50.0,
            step_bps: 25.0,
            size_base: 1.0,
            base_decimals: 18,
            quote_decimals: 18,
            ensure_cross: true,
        }
    }
}

/// Appends the ladder's synthetic quotes to `book`. Append-only: existing
/// orders are never mutated or removed, and the injected quotes carry a
/// far-future deadline so pruning never touches them.
pub fn inject(book: &mut OrderBook, ladder: &QuoteLadder, now: i64) {
    for i in 0..ladder.levels {
        let spread = (ladder.spread_bps + f64::from(i) * ladder.step_bps) / 10_000.0;
        let bid_px = round2(ladder.ref_price * (1.0 - spread));
        let ask_px = round2(ladder.ref_price * (1.0 + spread));

        book.insert(ladder.ask_quote(ask_px), now);
        book.insert(ladder.bid_quote(bid_px), now);
    }

    if ladder.ensure_cross {
        // Priced 1% above the reference, strictly above every injected ask.
        let cross_px = round2(ladder.ref_price * 1.01);
        book.insert(ladder.bid_quote(cross_px), now);
    }

    debug!(
        levels = ladder.levels,
        ensure_cross = ladder.ensure_cross,
        "injected synthetic maker quotes"
    );
}

impl QuoteLadder {
    /// Maker sells `size_base` of the base token for quote at `price`.
    fn ask_quote(&self, price: f64) -> Order {
        Order {
            owner: self.maker.clone(),
            side: Side::Sell,
            order_type: OrderType::Limit,
            token_in: self.quote_token.clone(),
            token_out: self.base_token.clone(),
            amount_in: self.quote_units(),
            amount_out: self.base_units(),
            price,
            deadline: Some(NO_EXPIRY),
            ts: 0,
        }
    }

    /// Maker buys the base token, paying quote, at `price`.
    fn bid_quote(&self, price: f64) -> Order {
        Order {
            owner: self.maker.clone(),
            side: Side::Buy,
            order_type: OrderType::Limit,
            token_in: self.base_token.clone(),
            token_out: self.quote_token.clone(),
            amount_in: self.base_units(),
            amount_out: self.quote_units(),
            price,
            deadline: Some(NO_EXPIRY),
            ts: 0,
        }
    }

    // Amounts are truncated to integer base units; truncation is
    // implementation-defined but deterministic and identical across levels.
    fn base_units(&self) -> String {
        trunc_units(self.size_base, self.base_decimals)
    }

    fn quote_units(&self) -> String {
        trunc_units(self.ref_price * self.size_base, self.quote_decimals)
    }
}

fn trunc_units(amount: f64, decimals: u32) -> String {
    ((amount * 10f64.powi(decimals as i32)).trunc() as u128).to_string()
}

fn round2(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

//--------------------------------------------------------------------------------------------------
//  TESTS
//--------------------------------------------------------------------------------------------------
