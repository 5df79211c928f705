//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the two-sided order book for a single token pair.
// Bids and asks are flat sequences kept in price-time priority by an explicit
// sort before every match attempt.
//
// | Component     | Description                                                               |
// |---------------|---------------------------------------------------------------------------|
// | OrderBook     | Owns the bid and ask sequences; insert, prune, sort, remove, snapshot     |
// | BookSnapshot  | Serializable copy of both sides (`buy` / `sell` on the wire)              |
//
//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name                  | Description                               | Return Type             |
// |-----------------------|-------------------------------------------|-------------------------|
// | insert                | Adds one order, stamping ts if unset      | ()                      |
// | insert_all            | Adds a batch of orders                    | ()                      |
// | prune                 | Drops expired orders from both sides      | ()                      |
// | sort                  | Restores price-time priority              | ()                      |
// | remove                | Removes first structural match            | bool                    |
// | snapshot              | Read-only copy of both sides              | BookSnapshot            |
//--------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::types::{Order, Side};

/// The in-memory order book: two flat, ordered sequences of resting orders.
///
/// The book itself enforces no price or deadline validation at insert time;
/// expiry is handled by [`OrderBook::prune`] and crossing by the matching
/// engine. One logical owner mutates the book per match cycle.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    bids: Vec<Order>,
    asks: Vec<Order>,
}

/// Read-only, serializable copy of the book. Wire field names match the
/// persisted snapshot format (`buy` / `sell`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    #[serde(default)]
    pub buy: Vec<Order>,
    #[serde(default)]
    pub sell: Vec<Order>,
}

impl OrderBook {
    /// Creates an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a book from a persisted snapshot.
    pub fn from_snapshot(snapshot: BookSnapshot) -> Self {
        Self {
            bids: snapshot.buy,
            asks: snapshot.sell,
        }
    }

    /// Appends one order to its side, assigning the insertion timestamp when
    /// the order does not carry one yet.
    pub fn insert(&mut self, mut order: Order, now: i64) {
        if order.ts == 0 {
            order.ts = now;
        }
        match order.side {
            Side::Buy => self.bids.push(order),
            Side::Sell => self.asks.push(order),
        }
    }

    /// Appends a batch of already-validated orders.
    pub fn insert_all(&mut self, orders: Vec<Order>, now: i64) {
        for order in orders {
            self.insert(order, now);
        }
    }

    /// Removes every order whose deadline has passed. Orders without a
    /// deadline are non-expiring and always survive.
    pub fn prune(&mut self, now: i64) {
        self.bids.retain(|o| !o.is_expired(now));
        self.asks.retain(|o| !o.is_expired(now));
    }

    /// Restores price-time priority: bids descending by price, asks ascending,
    /// both tie-broken by insertion timestamp (oldest first).
    ///
    /// Must run before every match attempt; an unsorted book is never matched.
    pub fn sort(&mut self) {
        self.bids
            .sort_by(|a, b| b.price.total_cmp(&a.price).then(a.ts.cmp(&b.ts)));
        self.asks
            .sort_by(|a, b| a.price.total_cmp(&b.price).then(a.ts.cmp(&b.ts)));
    }

    /// Removes the first structurally-equal occurrence of `order` from its
    /// side. Returns false (not an error) when the order is not present, to
    /// tolerate concurrent book rewrites between cycles.
    pub fn remove(&mut self, order: &Order) -> bool {
        let side = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        match side.iter().position(|o| o == order) {
            Some(pos) => {
                side.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Bid side in current book order.
    pub fn bids(&self) -> &[Order] {
        &self.bids
    }

    /// Ask side in current book order.
    pub fn asks(&self) -> &[Order] {
        &self.asks
    }

    /// Read-only copy of both sides, used by the book-viewing interface and
    /// by persistence.
    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            buy: self.bids.clone(),
            sell: self.asks.clone(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
//  TESTS
//--------------------------------------------------------------------------------------------------
