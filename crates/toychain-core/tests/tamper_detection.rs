use toychain_core::{
    constants::GENESIS_PREVIOUS_HASH, now_millis, Block, Chain, ChainConfig, ChainError,
    MiningMode, Transaction,
};

fn scenario_chain(config: ChainConfig) -> Chain {
    let mut chain = Chain::with_config(config).expect("genesis");
    chain
        .add_block(
            Block::new(1, now_millis(), vec![Transaction::new("Alice", "Bob", 100)])
                .expect("block 1"),
        )
        .expect("mine block 1");
    chain
        .add_block(
            Block::new(2, now_millis(), vec![Transaction::new("Bob", "Charlie", 50)])
                .expect("block 2"),
        )
        .expect("mine block 2");
    chain
}

#[test]
fn test_fresh_chain_is_valid() {
    let chain = Chain::new().unwrap();
    assert_eq!(chain.len(), 1);
    let genesis = chain.latest_block().unwrap();
    assert_eq!(genesis.index, 0);
    assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
    assert!(chain.is_chain_valid());
}

#[test]
fn test_end_to_end_scenario() {
    let mut chain = scenario_chain(ChainConfig::default());
    assert_eq!(chain.difficulty(), 3);
    assert_eq!(chain.len(), 3);
    for block in &chain.blocks()[1..] {
        assert!(block.hash().starts_with("000"), "{}", block.hash());
    }
    assert!(chain.is_chain_valid());

    chain.block_mut(1).unwrap().transactions =
        vec![Transaction::new("Alice", "Bob", 10_000)].into();

    assert!(!chain.is_chain_valid());
    assert!(matches!(
        chain.validate(),
        Err(ChainError::HashMismatch { index: 1, .. })
    ));
}

#[test]
fn test_end_to_end_scenario_parallel() {
    let config = ChainConfig::default().with_mining(MiningMode::Parallel);
    let mut chain = scenario_chain(config);
    assert!(chain.is_chain_valid());

    chain.block_mut(1).unwrap().transactions =
        vec![Transaction::new("Alice", "Bob", 10_000)].into();
    assert!(!chain.is_chain_valid());
}

#[test]
fn test_link_break_leaves_other_chains_untouched() {
    let pristine = scenario_chain(ChainConfig::default().with_difficulty(2));
    let mut tampered = pristine.clone();

    tampered.block_mut(2).unwrap().previous_hash = "1234abcd".to_string();

    assert!(!tampered.is_chain_valid());
    assert!(pristine.is_chain_valid());
}

#[test]
fn test_strict_chain_accepts_scenario() {
    let config = ChainConfig::default().with_difficulty(2).with_strict(true);
    let chain = scenario_chain(config);
    assert!(chain.is_chain_valid());
}

#[test]
fn test_remining_a_tampered_block_still_breaks_successor() {
    let mut chain = scenario_chain(ChainConfig::default().with_difficulty(2));
    let block = chain.block_mut(1).unwrap();
    block.transactions = vec![Transaction::new("Alice", "Bob", 10_000)].into();
    block.mine(2).unwrap();

    // Block 1 is self-consistent again, but block 2 still points at the old hash.
    assert!(matches!(
        chain.validate(),
        Err(ChainError::BrokenLink { index: 2, .. })
    ));
}

#[test]
fn test_pretty_json_is_display_only_text() {
    let chain = scenario_chain(ChainConfig::default().with_difficulty(1));
    let text = chain.to_pretty_json().unwrap();
    assert!(text.contains("\"Alice\""));
    assert!(text.contains("\"Charlie\""));
    assert!(text.contains("\"previous_hash\""));
}
