//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module turns a matched (bid, ask) pair into a canonical Trade record
// and attests it for the external on-chain verifier: deterministic canonical
// bytes, SHA-256 digest, Ed25519 signature, hex encoding throughout.
//
// | Component         | Description                                                           |
// |-------------------|-----------------------------------------------------------------------|
// | build_trade       | Derives the Trade from a crossing pair                                |
// | canonical_bytes   | Fixed-field-order encoding the verifier recomputes                    |
// | SettlementSigner  | Holds the enclave key; signs trades, exposes the signer address       |
// | verify_settlement | Signature check mirroring what the verifier performs                  |
//--------------------------------------------------------------------------------------------------

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::types::{Order, Trade, TypeError, to_units};

/// Validity window of a settlement instruction, in seconds.
pub const SETTLEMENT_WINDOW_SECS: i64 = 600;

/// Errors raised while keying the signer or producing/checking a signature.
#[derive(Error, Debug)]
pub enum SigningError {
    /// The configured key is not a 32-byte hex seed.
    #[error("invalid signer key: expected 32-byte hex seed")]
    InvalidKey,

    /// The trade could not be canonically encoded.
    #[error("canonical encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// A signature or address is not valid hex of the right length.
    #[error("invalid signature encoding")]
    InvalidSignature,

    /// The signature does not verify against the canonical bytes.
    #[error("signature verification failed")]
    VerificationFailed,
}

/// A trade plus its attestation, the complete settlement payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedSettlement {
    pub trade: Trade,
    /// Hex-encoded Ed25519 signature over the canonical digest.
    pub signature: String,
    /// Hex-encoded public key of the signer; `enclave` on the wire.
    #[serde(rename = "enclave")]
    pub signer: String,
}

/// Builds the settlement instruction for a crossing pair.
///
/// The maker is the ask's owner (sells the base asset), the taker the bid's
/// owner. Amounts are the counterparties' `amountOut` values coerced to
/// integers, truncating toward zero.
pub fn build_trade(bid: &Order, ask: &Order, now: i64) -> Result<Trade, TypeError> {
    let amount_a = to_units(&ask.amount_out)?;
    let amount_b = to_units(&bid.amount_out)?;

    Ok(Trade {
        maker: ask.owner.clone(),
        taker: bid.owner.clone(),
        token_a: ask.token_out.clone(),
        token_b: bid.token_out.clone(),
        amount_a: amount_a.to_string(),
        amount_b: amount_b.to_string(),
        nonce: now,
        deadline: now + SETTLEMENT_WINDOW_SECS,
    })
}

/// Canonical byte encoding of a trade: compact JSON with fields in the fixed
/// verifier order (maker, taker, tokenA, tokenB, amountA, amountB, nonce,
/// deadline). The same logical trade always yields the same bytes, so signer
/// and verifier hash identically.
pub fn canonical_bytes(trade: &Trade) -> Result<Vec<u8>, SigningError> {
    Ok(serde_json::to_vec(trade)?)
}

/// The enclave signer: wraps the worker's private key and attests settlement
/// instructions for the external verifier.
pub struct SettlementSigner {
    key: SigningKey,
}

impl SettlementSigner {
    /// Builds the signer from a hex-encoded 32-byte seed, with or without a
    /// `0x` prefix.
    pub fn from_hex_seed(seed_hex: &str) -> Result<Self, SigningError> {
        let trimmed = seed_hex.strip_prefix("0x").unwrap_or(seed_hex);
        let bytes = hex::decode(trimmed).map_err(|_| SigningError::InvalidKey)?;
        let seed: [u8; 32] = bytes.try_into().map_err(|_| SigningError::InvalidKey)?;
        Ok(Self {
            key: SigningKey::from_bytes(&seed),
        })
    }

    /// Hex-encoded public key, the address the verifier authorizes.
    pub fn address(&self) -> String {
        hex::encode(self.key.verifying_key().to_bytes())
    }

    /// Signs the SHA-256 digest of the trade's canonical bytes.
    ///
    /// Ed25519 is deterministic: the same trade and key always produce the
    /// same signature, and any field change produces a different one.
    pub fn sign(&self, trade: &Trade) -> Result<SignedSettlement, SigningError> {
        let digest = Sha256::digest(canonical_bytes(trade)?);
        let signature = self.key.sign(&digest);

        Ok(SignedSettlement {
            trade: trade.clone(),
            signature: hex::encode(signature.to_bytes()),
            signer: self.address(),
        })
    }
}

/// Recomputes the canonical digest and checks the attestation, mirroring the
/// on-chain verifier's obligation.
pub fn verify_settlement(signed: &SignedSettlement) -> Result<(), SigningError> {
    let key_bytes: [u8; 32] = hex::decode(&signed.signer)
        .map_err(|_| SigningError::InvalidSignature)?
        .try_into()
        .map_err(|_| SigningError::InvalidSignature)?;
    let sig_bytes: [u8; 64] = hex::decode(&signed.signature)
        .map_err(|_| SigningError::InvalidSignature)?
        .try_into()
        .map_err(|_| SigningError::InvalidSignature)?;

    let verifying_key =
        VerifyingKey::from_bytes(&key_bytes).map_err(|_| SigningError::InvalidSignature)?;
    let signature = Signature::from_bytes(&sig_bytes);

    let digest = Sha256::digest(canonical_bytes(&signed.trade)?);
    verifying_key
        .verify(&digest, &signature)
        .map_err(|_| SigningError::VerificationFailed)
}

//--------------------------------------------------------------------------------------------------
//  TESTS
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderType, Side};

    const TEST_SEED: &str = "0101010101010101010101010101010101010101010101010101010101010101";

    fn crossing_pair() -> (Order, Order) {
        let bid = Order {
            owner: "0xBuyer".to_string(),
            side: Side::Buy,
            order_type: OrderType::Limit,
            token_in: "0xBase".to_string(),
            token_out: "0xQuote".to_string(),
            amount_in: "1000000000000000000".to_string(),
            amount_out: "2000000000000000000000".to_string(),
            price: 2010.0,
            deadline: None,
            ts: 1,
        };
        let ask = Order {
            owner: "0xSeller".to_string(),
            side: Side::Sell,
            order_type: OrderType::Limit,
            token_in: "0xQuote".to_string(),
            token_out: "0xBase".to_string(),
            amount_in: "2000000000000000000000".to_string(),
            amount_out: "1000000000000000000".to_string(),
            price: 1990.0,
            deadline: None,
            ts: 2,
        };
        (bid, ask)
    }

    #[test]
    fn test_build_trade_maps_sides() {
        let (bid, ask) = crossing_pair();
        let trade = build_trade(&bid, &ask, 1_700_000_000).unwrap();

        assert_eq!(trade.maker, "0xSeller");
        assert_eq!(trade.taker, "0xBuyer");
        assert_eq!(trade.token_a, "0xBase");
        assert_eq!(trade.token_b, "0xQuote");
        assert_eq!(trade.amount_a, "1000000000000000000");
        assert_eq!(trade.amount_b, "2000000000000000000000");
        assert_eq!(trade.nonce, 1_700_000_000);
        assert_eq!(trade.deadline, 1_700_000_000 + SETTLEMENT_WINDOW_SECS);
    }

    #[test]
    fn test_build_trade_truncates_decimal_amounts() {
        let (mut bid, ask) = crossing_pair();
        bid.amount_out = "1999.99".to_string();

        let trade = build_trade(&bid, &ask, 0).unwrap();
        assert_eq!(trade.amount_b, "1999");
    }

    #[test]
    fn test_canonical_bytes_field_order() {
        let (bid, ask) = crossing_pair();
        let trade = build_trade(&bid, &ask, 10).unwrap();
        let encoded = String::from_utf8(canonical_bytes(&trade).unwrap()).unwrap();

        let positions: Vec<usize> = [
            "\"maker\"",
            "\"taker\"",
            "\"tokenA\"",
            "\"tokenB\"",
            "\"amountA\"",
            "\"amountB\"",
            "\"nonce\"",
            "\"deadline\"",
        ]
        .iter()
        .map(|field| encoded.find(field).expect(field))
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let signer = SettlementSigner::from_hex_seed(TEST_SEED).unwrap();
        let (bid, ask) = crossing_pair();
        let trade = build_trade(&bid, &ask, 10).unwrap();

        let first = signer.sign(&trade).unwrap();
        let second = signer.sign(&trade).unwrap();
        assert_eq!(first.signature, second.signature);
        assert_eq!(first.signer, second.signer);
        assert_eq!(first.signature.len(), 128); // 64 bytes hex encoded
    }

    #[test]
    fn test_signature_changes_with_any_field() {
        let signer = SettlementSigner::from_hex_seed(TEST_SEED).unwrap();
        let (bid, ask) = crossing_pair();
        let trade = build_trade(&bid, &ask, 10).unwrap();
        let baseline = signer.sign(&trade).unwrap();

        let mut nonce_changed = trade.clone();
        nonce_changed.nonce += 1;
        assert_ne!(
            signer.sign(&nonce_changed).unwrap().signature,
            baseline.signature
        );

        let mut amount_changed = trade.clone();
        amount_changed.amount_a = "1".to_string();
        assert_ne!(
            signer.sign(&amount_changed).unwrap().signature,
            baseline.signature
        );
    }

    #[test]
    fn test_verify_settlement_round_trip() {
        let signer = SettlementSigner::from_hex_seed(TEST_SEED).unwrap();
        let (bid, ask) = crossing_pair();
        let trade = build_trade(&bid, &ask, 10).unwrap();

        let signed = signer.sign(&trade).unwrap();
        assert!(verify_settlement(&signed).is_ok());
    }

    #[test]
    fn test_verify_rejects_tampered_trade() {
        let signer = SettlementSigner::from_hex_seed(TEST_SEED).unwrap();
        let (bid, ask) = crossing_pair();
        let trade = build_trade(&bid, &ask, 10).unwrap();

        let mut signed = signer.sign(&trade).unwrap();
        signed.trade.amount_b = "0".to_string();
        assert!(matches!(
            verify_settlement(&signed),
            Err(SigningError::VerificationFailed)
        ));
    }

    #[test]
    fn test_invalid_seed_is_rejected() {
        assert!(matches!(
            SettlementSigner::from_hex_seed("deadbeef"),
            Err(SigningError::InvalidKey)
        ));
        assert!(matches!(
            SettlementSigner::from_hex_seed("zz"),
            Err(SigningError::InvalidKey)
        ));
    }
}
