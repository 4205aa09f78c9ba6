use crate::{
    block::Block,
    constants::{DEFAULT_DIFFICULTY, GENESIS_PAYLOAD, GENESIS_PREVIOUS_HASH},
    error::{ChainError, Result},
    now_millis,
};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MiningMode {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ChainConfig {
    /// Leading zero hex characters required of every appended block.
    pub difficulty: u32,
    pub mining: MiningMode,
    /// Reject non-contiguous indices and backwards timestamps on append,
    /// and check them plus proof-of-work during validation.
    pub strict: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            mining: MiningMode::Sequential,
            strict: false,
        }
    }
}

impl ChainConfig {
    pub fn with_difficulty(mut self, difficulty: u32) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_mining(mut self, mining: MiningMode) -> Self {
        self.mining = mining;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Unmined root block stamped with the current time.
pub fn genesis_block() -> Result<Block> {
    Block::with_previous_hash(0, now_millis(), GENESIS_PAYLOAD, GENESIS_PREVIOUS_HASH)
}

/// Append-only sequence of blocks, rooted at an unmined genesis block.
#[derive(Clone, Debug, Serialize)]
pub struct Chain {
    blocks: Vec<Block>,
    #[serde(flatten)]
    config: ChainConfig,
}

impl Chain {
    pub fn new() -> Result<Self> {
        Self::with_config(ChainConfig::default())
    }

    pub fn with_config(config: ChainConfig) -> Result<Self> {
        Ok(Self {
            blocks: vec![genesis_block()?],
            config,
        })
    }

    pub fn difficulty(&self) -> u32 {
        self.config.difficulty
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, position: usize) -> Option<&Block> {
        self.blocks.get(position)
    }

    /// Mutable access to a stored block. Edits are not re-mined, so any
    /// change to hashed fields shows up in [`Chain::validate`].
    pub fn block_mut(&mut self, position: usize) -> Option<&mut Block> {
        self.blocks.get_mut(position)
    }

    pub fn latest_block(&self) -> Result<&Block> {
        self.blocks.last().ok_or(ChainError::EmptyChain)
    }

    /// Links `candidate` to the current tip, mines it at the chain
    /// difficulty and appends it. Blocks until a nonce is found.
    pub fn add_block(&mut self, mut candidate: Block) -> Result<()> {
        let latest = self.latest_block()?;
        if self.config.strict {
            check_succession(latest, &candidate)
                .inspect_err(|err| warn!("Rejected block {}: {err}", candidate.index))?;
        }
        candidate.previous_hash = latest.hash().to_string();

        match self.config.mining {
            MiningMode::Sequential => candidate.mine(self.config.difficulty)?,
            MiningMode::Parallel => candidate.mine_parallel(self.config.difficulty)?,
        }

        info!(
            "Appended block {} at height {}",
            candidate.index,
            self.blocks.len()
        );
        self.blocks.push(candidate);
        Ok(())
    }

    /// Re-derives every non-genesis hash from current field values and
    /// checks it against the stored hash and the successor's link.
    pub fn validate(&self) -> Result<()> {
        self.check_blocks()
            .inspect_err(|err| debug!("Chain validation failed: {err}"))
    }

    pub fn is_chain_valid(&self) -> bool {
        self.validate().is_ok()
    }

    fn check_blocks(&self) -> Result<()> {
        for pair in self.blocks.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);

            let computed = current.calculate_hash()?;
            if current.hash() != computed {
                return Err(ChainError::HashMismatch {
                    index: current.index,
                    stored: current.hash().to_string(),
                    computed,
                });
            }

            if current.previous_hash != previous.hash() {
                return Err(ChainError::BrokenLink {
                    index: current.index,
                    expected: previous.hash().to_string(),
                    found: current.previous_hash.clone(),
                });
            }

            if self.config.strict {
                check_succession(previous, current)?;
                if !current.is_mined(self.config.difficulty) {
                    return Err(ChainError::InsufficientWork {
                        index: current.index,
                        difficulty: self.config.difficulty,
                    });
                }
            }
        }
        Ok(())
    }

    /// Indented JSON of the whole chain. Display only; never parsed back.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.to_pretty_json().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

fn check_succession(previous: &Block, next: &Block) -> Result<()> {
    let expected = previous.index.saturating_add(1);
    if next.index != expected {
        return Err(ChainError::NonContiguousIndex {
            expected,
            found: next.index,
        });
    }
    if next.timestamp < previous.timestamp {
        return Err(ChainError::TimestampRegression {
            previous: previous.timestamp,
            found: next.timestamp,
        });
    }
    Ok(())
}
