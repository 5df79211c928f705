//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the crossing scan over a pruned, sorted order book.
// It is single-shot: one call returns at most one (bid, ask) pair and a trade
// price; the caller consumes both orders whole (no partial fills).
//
// | Component      | Description                                                              |
// |----------------|--------------------------------------------------------------------------|
// | try_match      | Nested scan for the first admissible crossing pair                       |
// | same_pair      | Token-direction alignment test (case-insensitive)                        |
// | MatchProposal  | The selected pair plus the derived trade price                           |
// | MatchingError  | EmptyBook / NoCrossingQuotes                                             |
//--------------------------------------------------------------------------------------------------

use thiserror::Error;

use crate::orderbook::OrderBook;
use crate::types::{Order, OrderType};

/// Errors that can occur during the crossing scan. Both are recoverable and
/// surface as a structured no-match result, never as a crash.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchingError {
    /// One or both sides have zero orders.
    #[error("book empty")]
    EmptyBook,

    /// Book non-empty but no admissible pair crosses.
    #[error("no crossing quotes")]
    NoCrossingQuotes,
}

/// A crossing pair selected from the book, priced and ready for settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchProposal {
    /// The buy-side order (taker of the base asset).
    pub bid: Order,
    /// The sell-side order (maker of the base asset).
    pub ask: Order,
    /// Derived execution price, quote per base.
    pub price: f64,
}

/// Returns true when the two orders trade the same token pair: token
/// directions align either directly or swapped, compared case-insensitively.
pub fn same_pair(bid: &Order, ask: &Order) -> bool {
    let direct = bid.token_in.eq_ignore_ascii_case(&ask.token_in)
        && bid.token_out.eq_ignore_ascii_case(&ask.token_out);
    let swapped = bid.token_in.eq_ignore_ascii_case(&ask.token_out)
        && bid.token_out.eq_ignore_ascii_case(&ask.token_in);
    direct || swapped
}

/// Scans a pruned, **sorted** book for the first crossing (bid, ask) pair.
///
/// Because both sides are pre-sorted, the first admissible pair in scan order
/// is the price-time-priority match. The scan deliberately stops there rather
/// than searching for a globally best pairing; single-shot FIFO matching is
/// the chosen tie-break policy.
///
/// Price derivation:
/// - market bid: the ask's quoted price
/// - market ask: the bid's quoted price
/// - limit vs limit: the midpoint, admissible only when `bid >= ask`
pub fn try_match(book: &OrderBook) -> Result<MatchProposal, MatchingError> {
    if book.bids().is_empty() || book.asks().is_empty() {
        return Err(MatchingError::EmptyBook);
    }

    for bid in book.bids() {
        for ask in book.asks() {
            if !same_pair(bid, ask) {
                continue;
            }

            if bid.order_type == OrderType::Market {
                // Market buyer accepts the best ask it reaches first.
                return Ok(proposal(bid, ask, ask.price));
            }
            if ask.order_type == OrderType::Market {
                return Ok(proposal(bid, ask, bid.price));
            }
            if bid.price >= ask.price {
                return Ok(proposal(bid, ask, (bid.price + ask.price) / 2.0));
            }
        }
    }

    Err(MatchingError::NoCrossingQuotes)
}

fn proposal(bid: &Order, ask: &Order, price: f64) -> MatchProposal {
    MatchProposal {
        bid: bid.clone(),
        ask: ask.clone(),
        price,
    }
}

//--------------------------------------------------------------------------------------------------
//  TESTS
//--------------------------------------------------------------------------------------------------
