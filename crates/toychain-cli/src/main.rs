use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use toychain_core::{
    constants::DEFAULT_DIFFICULTY, now_millis, Block, Chain, ChainConfig, MiningMode, Transaction,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "toychain")]
#[command(about = "Build a small proof-of-work chain and check it for tampering")]
struct Cli {
    #[command(flatten)]
    opts: ChainOpts,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct ChainOpts {
    /// Leading zero hex characters required of each mined block
    #[arg(long, global = true, default_value_t = DEFAULT_DIFFICULTY)]
    difficulty: u32,

    /// Search nonces on all cores
    #[arg(long, global = true)]
    parallel: bool,

    /// Reject non-contiguous indices and backwards timestamps
    #[arg(long, global = true)]
    strict: bool,

    /// Print the chain as single-line JSON
    #[arg(long, global = true)]
    compact: bool,
}

impl ChainOpts {
    fn config(&self) -> ChainConfig {
        let mining = if self.parallel {
            MiningMode::Parallel
        } else {
            MiningMode::Sequential
        };
        ChainConfig::default()
            .with_difficulty(self.difficulty)
            .with_mining(mining)
            .with_strict(self.strict)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mine two blocks, then tamper with the first and validate again
    Demo,
    /// Mine one block per transaction and print the chain
    Mine {
        /// Transaction as sender:receiver:amount (repeatable)
        #[arg(long = "tx", required = true)]
        txs: Vec<Transaction>,
    },
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut chain = Chain::with_config(cli.opts.config())?;
    info!("Created chain with difficulty {}", chain.difficulty());

    match cli.cmd {
        Command::Demo => run_demo(&mut chain, cli.opts.compact)?,
        Command::Mine { txs } => {
            for tx in txs {
                let index = chain.latest_block()?.index + 1;
                println!("Mining block {index}...");
                chain.add_block(Block::new(index, now_millis(), vec![tx])?)?;
            }
            print_chain(&chain, cli.opts.compact)?;
            println!("Is blockchain valid? {}", chain.is_chain_valid());
        }
    }
    Ok(())
}

fn run_demo(chain: &mut Chain, compact: bool) -> Result<()> {
    println!("Mining block 1...");
    chain.add_block(Block::new(
        1,
        now_millis(),
        vec![Transaction::new("Alice", "Bob", 100)],
    )?)?;

    println!("Mining block 2...");
    chain.add_block(Block::new(
        2,
        now_millis(),
        vec![Transaction::new("Bob", "Charlie", 50)],
    )?)?;

    print_chain(chain, compact)?;
    println!("Is blockchain valid? {}", chain.is_chain_valid());

    println!("Tampering with blockchain...");
    if let Some(block) = chain.block_mut(1) {
        block.transactions = vec![Transaction::new("Alice", "Bob", 10_000)].into();
    }
    println!(
        "Is blockchain valid after tampering? {}",
        chain.is_chain_valid()
    );
    Ok(())
}

fn print_chain(chain: &Chain, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(chain)?
    } else {
        chain.to_pretty_json()?
    };
    println!("Blockchain: {text}");
    Ok(())
}
