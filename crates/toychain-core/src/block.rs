use crate::{
    constants::GENESIS_PREVIOUS_HASH,
    error::{ChainError, Result},
    pow,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub receiver: String,
    pub amount: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, amount: u64) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
        }
    }
}

/// Parses `sender:receiver:amount`.
impl FromStr for Transaction {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(sender), Some(receiver), Some(amount))
                if !sender.is_empty() && !receiver.is_empty() =>
            {
                let amount = amount.trim().parse::<u64>().map_err(|e| {
                    ChainError::InvalidTransaction(format!("bad amount {amount:?}: {e}"))
                })?;
                Ok(Self::new(sender, receiver, amount))
            }
            _ => Err(ChainError::InvalidTransaction(format!(
                "expected sender:receiver:amount, got {s:?}"
            ))),
        }
    }
}

/// Opaque block payload. Serialized untagged, so a transaction list hashes
/// as a plain JSON array and the genesis placeholder as a JSON string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Transactions(Vec<Transaction>),
    Json(serde_json::Value),
}

impl Payload {
    /// Compact JSON fed into the block hash. Struct fields serialize in
    /// declaration order and `serde_json` maps keep keys sorted, so equal
    /// payloads always produce equal bytes.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Vec<Transaction>> for Payload {
    fn from(txs: Vec<Transaction>) -> Self {
        Payload::Transactions(txs)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::Json(value)
    }
}

/// A single record in the chain.
///
/// `index`, `timestamp`, `transactions` and `previous_hash` stay public so
/// callers can tamper with a stored block; the chain validator recomputes
/// the hash from these fields and catches the change. `nonce` and `hash`
/// are only written by mining.
#[derive(Clone, Debug, Serialize)]
pub struct Block {
    pub index: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub transactions: Payload,
    pub previous_hash: String,
    nonce: u64,
    hash: String,
}

impl Block {
    /// Builds an unmined block whose previous hash is the genesis sentinel.
    pub fn new(index: u64, timestamp: u64, transactions: impl Into<Payload>) -> Result<Self> {
        Self::with_previous_hash(index, timestamp, transactions, GENESIS_PREVIOUS_HASH)
    }

    pub fn with_previous_hash(
        index: u64,
        timestamp: u64,
        transactions: impl Into<Payload>,
        previous_hash: impl Into<String>,
    ) -> Result<Self> {
        let mut block = Self {
            index,
            timestamp,
            transactions: transactions.into(),
            previous_hash: previous_hash.into(),
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.calculate_hash()?;
        Ok(block)
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Hash recorded at construction or by the last mining run.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    // index | timestamp | payload json | previous hash; the nonce goes last
    fn hash_prefix(&self) -> Result<Vec<u8>> {
        let payload = self.transactions.to_canonical_json()?;
        let mut bytes = Vec::with_capacity(8 + 8 + payload.len() + self.previous_hash.len() + 8);
        bytes.extend_from_slice(&self.index.to_le_bytes());
        bytes.extend_from_slice(&self.timestamp.to_le_bytes());
        bytes.extend_from_slice(&payload);
        bytes.extend_from_slice(self.previous_hash.as_bytes());
        Ok(bytes)
    }

    /// Full hash preimage for the current field values.
    pub fn hash_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = self.hash_prefix()?;
        bytes.extend_from_slice(&self.nonce.to_le_bytes());
        Ok(bytes)
    }

    /// Lowercase hex SHA-256 of the current field values. Does not touch
    /// the stored hash.
    pub fn calculate_hash(&self) -> Result<String> {
        let prefix = self.hash_prefix()?;
        Ok(hex::encode(pow::hash_with_nonce(&prefix, self.nonce)))
    }

    pub fn is_mined(&self, difficulty: u32) -> bool {
        pow::meets_difficulty(&self.hash, difficulty)
    }

    /// Searches nonces upward from the current one until the hash has
    /// `difficulty` leading zero hex characters. There is no iteration cap.
    pub fn mine(&mut self, difficulty: u32) -> Result<()> {
        let prefix = self.hash_prefix()?;
        let (nonce, hash) = pow::search_nonce(&prefix, self.nonce, difficulty)
            .ok_or(ChainError::NonceSpaceExhausted { index: self.index })?;
        self.seal(nonce, hash);
        Ok(())
    }

    /// [`Block::mine`] with the nonce search spread over the rayon pool.
    pub fn mine_parallel(&mut self, difficulty: u32) -> Result<()> {
        let prefix = self.hash_prefix()?;
        let (nonce, hash) = pow::search_nonce_parallel(&prefix, self.nonce, difficulty)
            .ok_or(ChainError::NonceSpaceExhausted { index: self.index })?;
        self.seal(nonce, hash);
        Ok(())
    }

    fn seal(&mut self, nonce: u64, hash: crate::Hash) {
        self.nonce = nonce;
        self.hash = hex::encode(hash);
        info!(
            "Mined block {} with nonce {} and hash {}",
            self.index, self.nonce, self.hash
        );
    }
}
