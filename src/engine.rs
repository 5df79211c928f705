//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module owns the transactional match cycle. One DarkPoolEngine instance
// holds exclusive write access to the book; a cycle runs
// prune -> inject -> sort -> try_match -> build -> sign -> remove -> persist
// as one atomic unit. On signing or persistence failure the in-memory book is
// rolled back to its pre-cycle state, so no partial application survives.
//
// | Component       | Description                                                             |
// |-----------------|-------------------------------------------------------------------------|
// | DarkPoolEngine  | Book + storage port + signer + quote ladder                             |
// | submit          | Validate-then-apply insertion of incoming orders                        |
// | run_match_cycle | One full cycle producing a persisted MatchOutcome                       |
// | EngineError     | InvalidOrder / SigningFailure / PersistenceFailure                      |
//--------------------------------------------------------------------------------------------------

use thiserror::Error;
use tracing::{info, warn};

use crate::liquidity::{QuoteLadder, inject};
use crate::matching_engine::try_match;
use crate::orderbook::{BookSnapshot, OrderBook};
use crate::settlement::{SettlementSigner, SigningError, build_trade};
use crate::storage::{BookStore, StorageError};
use crate::types::{MatchOutcome, Order, OrderDraft, TypeError, now_ts};

/// Errors fatal to an engine operation. Matching failures are not here: an
/// empty or uncrossed book is a recoverable outcome, reported as
/// [`MatchOutcome::NoMatch`].
#[derive(Error, Debug)]
pub enum EngineError {
    /// An incoming order failed validation; the whole batch is rejected and
    /// the book is unchanged.
    #[error("invalid order: {0}")]
    InvalidOrder(#[from] TypeError),

    /// The settlement could not be signed; no partial or unsigned result is
    /// produced and the book is rolled back.
    #[error("signing failure: {0}")]
    Signing(#[from] SigningError),

    /// The snapshot could not be written; the in-memory mutation is rolled
    /// back so state never diverges from storage.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StorageError),
}

/// The dark pool worker core: one book, one signer, one storage port.
///
/// Callers in a multi-request environment must guard the engine with a single
/// lock; nothing may observe the book between the start of a cycle and its
/// final persist.
pub struct DarkPoolEngine {
    book: OrderBook,
    store: Box<dyn BookStore>,
    signer: SettlementSigner,
    ladder: QuoteLadder,
}

impl DarkPoolEngine {
    /// Creates an engine with an empty book.
    pub fn new(store: Box<dyn BookStore>, signer: SettlementSigner, ladder: QuoteLadder) -> Self {
        Self {
            book: OrderBook::new(),
            store,
            signer,
            ladder,
        }
    }

    /// Creates an engine seeded from the persisted snapshot.
    pub async fn load(
        store: Box<dyn BookStore>,
        signer: SettlementSigner,
        ladder: QuoteLadder,
    ) -> Self {
        let snapshot = store.load_book().await;
        info!(
            bids = snapshot.buy.len(),
            asks = snapshot.sell.len(),
            "loaded persisted order book"
        );
        Self {
            book: OrderBook::from_snapshot(snapshot),
            store,
            signer,
            ladder,
        }
    }

    /// Validates and inserts a batch of incoming orders, then persists the
    /// book. Validate-then-apply: if any draft is malformed the whole batch
    /// is rejected before the book changes; if the flush fails the insertion
    /// is rolled back.
    pub async fn submit(&mut self, drafts: Vec<OrderDraft>) -> Result<Vec<Order>, EngineError> {
        let mut orders = Vec::with_capacity(drafts.len());
        for draft in drafts {
            orders.push(draft.into_order()?);
        }

        let checkpoint = self.book.clone();
        let now = now_ts();
        self.book.insert_all(orders.clone(), now);

        if let Err(err) = self.store.save_book(&self.book.snapshot()).await {
            warn!(%err, "book flush failed, rolling back insertion");
            self.book = checkpoint;
            return Err(err.into());
        }

        // Echo the orders as inserted, with their assigned timestamps.
        for order in &mut orders {
            if order.ts == 0 {
                order.ts = now;
            }
        }
        Ok(orders)
    }

    /// Pruned, sorted view of the book for the viewing interface. Does not
    /// persist; housekeeping is flushed by the next cycle.
    pub fn book_view(&mut self) -> BookSnapshot {
        self.book.prune(now_ts());
        self.book.sort();
        self.book.snapshot()
    }

    /// Runs one full match cycle at the current time.
    pub async fn run_match_cycle(&mut self) -> Result<MatchOutcome, EngineError> {
        self.run_match_cycle_at(now_ts()).await
    }

    /// Runs one full match cycle with an explicit clock, for tests.
    pub async fn run_match_cycle_at(&mut self, now: i64) -> Result<MatchOutcome, EngineError> {
        let checkpoint = self.book.clone();
        match self.cycle(now).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!(%err, "match cycle aborted, restoring book");
                self.book = checkpoint;
                Err(err)
            }
        }
    }

    async fn cycle(&mut self, now: i64) -> Result<MatchOutcome, EngineError> {
        self.book.prune(now);
        inject(&mut self.book, &self.ladder, now);
        self.book.sort();

        let outcome = match try_match(&self.book) {
            Ok(proposal) => {
                let trade = build_trade(&proposal.bid, &proposal.ask, now)?;
                let signed = self.signer.sign(&trade)?;

                // Matched orders are fully consumed; removal is a no-op if a
                // concurrent rewrite already dropped them.
                self.book.remove(&proposal.bid);
                self.book.remove(&proposal.ask);

                info!(price = proposal.price, "matched and signed settlement");
                MatchOutcome::Matched {
                    price: proposal.price,
                    trade: signed.trade,
                    signature: signed.signature,
                    signer: signed.signer,
                }
            }
            Err(reason) => {
                // Injected liquidity is intentionally kept in the saved book.
                info!(%reason, "no match this cycle");
                MatchOutcome::NoMatch {
                    reason: reason.to_string(),
                }
            }
        };

        // Result before book: a failed book flush leaves a stale snapshot
        // that re-matches next cycle, never a consumed pair with no
        // settlement record.
        self.store.save_result(&outcome).await?;
        self.store.save_book(&self.book.snapshot()).await?;
        Ok(outcome)
    }

    /// The most recently persisted match result, if any.
    pub async fn latest_result(&self) -> Option<MatchOutcome> {
        self.store.load_latest_result().await
    }

    /// The signer address the verifier is expected to authorize.
    pub fn signer_address(&self) -> String {
        self.signer.address()
    }
}

//--------------------------------------------------------------------------------------------------
//  TESTS
//--------------------------------------------------------------------------------------------------
