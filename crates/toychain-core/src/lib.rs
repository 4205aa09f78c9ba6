//! A small proof-of-work hash chain.
//!
//! Each [`Block`] is identified by the SHA-256 of its fields and mined until
//! its hex hash starts with a number of `'0'` characters. A [`Chain`] links
//! blocks by previous hash and detects tampering by recomputing every hash
//! from the current field values.

pub mod block;
pub mod chain;
pub mod constants;
pub mod error;
pub mod pow;

use std::time::{SystemTime, UNIX_EPOCH};

pub use block::{Block, Payload, Transaction};
pub use chain::{Chain, ChainConfig, MiningMode};
pub use error::{ChainError, Result};

pub type Hash = [u8; 32];

/// Milliseconds since the Unix epoch, or 0 if the clock is set before it.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
