//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module defines the core data types used throughout the dark pool worker:
// resting orders, the settlement trade record, and the result record written
// after every match cycle.
//
// | Section            | Description                                                      |
// |--------------------|------------------------------------------------------------------|
// | ENUMS              | Discrete sets of values (Side, OrderType, MatchOutcome).         |
// | STRUCTS            | Order, OrderDraft (wire shape) and Trade.                        |
// | HELPERS            | Amount coercion and the worker clock.                            |
// | TESTS              | Unit tests for parsing, coercion and serde shapes.               |
//--------------------------------------------------------------------------------------------------

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel deadline for orders that never expire (synthetic maker quotes).
pub const NO_EXPIRY: i64 = 9_999_999_999;

//--------------------------------------------------------------------------------------------------
//  ENUMS
//--------------------------------------------------------------------------------------------------

/// Represents the side of an order (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// A buy order (bid): pays the quote token, receives the base token.
    Buy,
    /// A sell order (ask): provides the base token, receives the quote token.
    Sell,
}

impl FromStr for Side {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(TypeError::InvalidSide(other.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Represents the type of an order, influencing how a trade price is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Executes at the order's quoted price or better.
    #[default]
    Limit,
    /// Executes at the best available counter-quote.
    Market,
}

impl FromStr for OrderType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "limit" => Ok(OrderType::Limit),
            "market" => Ok(OrderType::Market),
            other => Err(TypeError::InvalidOrderType(other.to_string())),
        }
    }
}

//--------------------------------------------------------------------------------------------------
//  STRUCTS
//--------------------------------------------------------------------------------------------------

/// One resting intent to trade.
///
/// `price` is used only for ranking and midpoint computation; `amount_in` and
/// `amount_out` drive actual value transfer and stay as decimal-integer
/// strings to avoid floating point precision loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Address-like identifier of the order owner.
    pub owner: String,
    /// Buy or sell.
    pub side: Side,
    /// Limit or market; absent on the wire means limit.
    #[serde(default)]
    pub order_type: OrderType,
    /// Token the owner receives when the order settles.
    pub token_in: String,
    /// Token the owner sends when the order settles.
    pub token_out: String,
    /// Base-unit amount of `token_in`, as a decimal string.
    pub amount_in: String,
    /// Base-unit amount of `token_out`, as a decimal string.
    pub amount_out: String,
    /// Quote-per-base ranking price.
    #[serde(default)]
    pub price: f64,
    /// Absolute expiry in unix seconds; absent means non-expiring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<i64>,
    /// Insertion timestamp assigned by the book; 0 means not yet assigned.
    #[serde(default)]
    pub ts: i64,
}

impl Order {
    /// Returns true if the order's deadline has passed. Orders without a
    /// deadline never expire.
    pub fn is_expired(&self, now: i64) -> bool {
        self.deadline.is_some_and(|d| d < now)
    }
}

/// Wire shape of an incoming order: side and order type arrive as raw strings
/// and no insertion timestamp is present yet. Shared by the REST adapter and
/// the batch feed so validation has a single home.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub owner: String,
    pub side: String,
    #[serde(default = "OrderDraft::default_order_type")]
    pub order_type: String,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: String,
    pub amount_out: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub deadline: Option<i64>,
}

impl OrderDraft {
    fn default_order_type() -> String {
        "limit".to_string()
    }

    /// Validates the draft and converts it into a typed [`Order`].
    ///
    /// Rejects unknown sides and order types, and amounts that are not
    /// representable as non-negative integers.
    pub fn into_order(self) -> Result<Order, TypeError> {
        let side = Side::from_str(&self.side)?;
        let order_type = OrderType::from_str(&self.order_type)?;
        to_units(&self.amount_in)?;
        to_units(&self.amount_out)?;

        Ok(Order {
            owner: self.owner,
            side,
            order_type,
            token_in: self.token_in,
            token_out: self.token_out,
            amount_in: self.amount_in,
            amount_out: self.amount_out,
            price: self.price,
            deadline: self.deadline,
            ts: 0,
        })
    }
}

/// The settlement instruction derived from one matched (bid, ask) pair.
///
/// Field declaration order is the canonical encoding order consumed by the
/// on-chain verifier: maker, taker, tokenA, tokenB, amountA, amountB, nonce,
/// deadline. Do not reorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    /// Owner of the ask; sends `token_a` (base).
    pub maker: String,
    /// Owner of the bid; sends `token_b` (quote).
    pub taker: String,
    /// Base token identifier, from the ask's `token_out`.
    pub token_a: String,
    /// Quote token identifier, from the bid's `token_out`.
    pub token_b: String,
    /// Integer amount of `token_a` the maker sends.
    pub amount_a: String,
    /// Integer amount of `token_b` the taker sends.
    pub amount_b: String,
    /// Freshness token derived from the cycle clock.
    pub nonce: i64,
    /// Absolute expiry of the settlement instruction.
    pub deadline: i64,
}

/// Result record written after every match cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// A crossing pair was found, priced and signed.
    Matched {
        price: f64,
        trade: Trade,
        signature: String,
        /// Hex-encoded public key of the attesting worker; `enclave` on the
        /// wire, after the confidential-compute deployment it names.
        #[serde(rename = "enclave")]
        signer: String,
    },
    /// No admissible pair; the book is preserved.
    NoMatch { reason: String },
}

//--------------------------------------------------------------------------------------------------
//  HELPERS
//--------------------------------------------------------------------------------------------------

/// Coerces a decimal-string amount to integer base units, truncating toward
/// zero. Negative amounts are rejected.
pub fn to_units(raw: &str) -> Result<u128, TypeError> {
    let value =
        Decimal::from_str(raw.trim()).map_err(|_| TypeError::InvalidAmount(raw.to_string()))?;
    if value.is_sign_negative() {
        return Err(TypeError::InvalidAmount(raw.to_string()));
    }
    value
        .trunc()
        .to_u128()
        .ok_or_else(|| TypeError::InvalidAmount(raw.to_string()))
}

/// Current unix time in seconds, the worker's clock source.
pub fn now_ts() -> i64 {
    Utc::now().timestamp()
}

//--------------------------------------------------------------------------------------------------
//  ERRORS
//--------------------------------------------------------------------------------------------------

/// Errors raised while validating wire-level order fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// The side is not one of `buy` | `sell`.
    #[error("invalid side: {0} (must be buy|sell)")]
    InvalidSide(String),
    /// The order type is not one of `limit` | `market`.
    #[error("invalid order type: {0} (must be limit|market)")]
    InvalidOrderType(String),
    /// The amount is not a non-negative decimal-integer string.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

//--------------------------------------------------------------------------------------------------
//  TESTS
//--------------------------------------------------------------------------------------------------
