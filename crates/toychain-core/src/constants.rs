pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
/// Leading zero hex characters required of every mined block.
pub const DEFAULT_DIFFICULTY: u32 = 3;
pub const GENESIS_PREVIOUS_HASH: &str = "0";
pub const GENESIS_PAYLOAD: &str = "Genesis Block";
