use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("chain has no blocks")]
    EmptyChain,

    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("nonce space exhausted while mining block {index}")]
    NonceSpaceExhausted { index: u64 },

    #[error("non-contiguous block index: expected {expected}, found {found}")]
    NonContiguousIndex { expected: u64, found: u64 },

    #[error("timestamp went backwards: previous {previous}, found {found}")]
    TimestampRegression { previous: u64, found: u64 },

    #[error("block {index} hash mismatch: stored {stored}, computed {computed}")]
    HashMismatch {
        index: u64,
        stored: String,
        computed: String,
    },

    #[error("block {index} does not link to its predecessor: expected {expected}, found {found}")]
    BrokenLink {
        index: u64,
        expected: String,
        found: String,
    },

    #[error("block {index} hash does not meet difficulty {difficulty}")]
    InsufficientWork { index: u64, difficulty: u32 },

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
}

pub type Result<T> = std::result::Result<T, ChainError>;
