//! Command-line front end: create a wallet, show balance, transfer funds,
//! list waiting mempool transactions, and mine a block.

use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use tracing::info;

use utxo_chain::chain::Chain;
use utxo_chain::config::Config;
use utxo_chain::error::{Error, Result};
use utxo_chain::mining::Miner;
use utxo_chain::model::address::Address;
use utxo_chain::model::input::TransactionInput;
use utxo_chain::model::output::TransactionOutput;
use utxo_chain::model::transaction::Transaction;
use utxo_chain::persistence::{export, ChainStore, FileChainStore, FileMempoolStore, MempoolStore};
use utxo_chain::wallet::{FileWalletRegistry, Wallet, WalletRegistry};

#[derive(Parser)]
#[command(name = "wallet-cli")]
#[command(about = "UTXO chain wallet and mining CLI")]
struct Cli {
    /// Override the default data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new wallet and print its address.
    CreateWallet,
    /// Show the current balance for an address.
    Balance {
        /// 16-hex-character wallet address.
        address: String,
    },
    /// Transfer an amount from one wallet to another.
    Transfer {
        from_address: String,
        to_address: String,
        amount: f32,
    },
    /// List transactions currently waiting in the mempool.
    WaitingTransactions,
    /// Mine a new block, awarding the reward to an address.
    Mine {
        /// 16-hex-character wallet address to receive the coinbase reward.
        address: String,
    },
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::new(cli.data_dir);

    if let Err(e) = run(cli.command, &config) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::CreateWallet => create_wallet(config),
        Command::Balance { address } => balance(config, &address),
        Command::Transfer {
            from_address,
            to_address,
            amount,
        } => transfer(config, &from_address, &to_address, amount),
        Command::WaitingTransactions => waiting_transactions(config),
        Command::Mine { address } => mine(config, &address),
    }
}

fn format_timestamp(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

fn wallet_registry(config: &Config) -> FileWalletRegistry {
    FileWalletRegistry::new(config.wallet_root())
}

fn load_wallet_by_address(config: &Config, address: &str) -> Result<Wallet> {
    let address: Address = address.parse()?;
    wallet_registry(config).load(address)
}

fn load_chain(config: &Config) -> Result<Chain> {
    let store = FileChainStore::new(config.chain_path());
    Ok(store.load()?.unwrap_or_else(Chain::empty))
}

fn create_wallet(config: &Config) -> Result<()> {
    info!("creating new wallet");
    let registry = wallet_registry(config);
    let wallet = Wallet::create(&registry)?;
    println!("wallet address: {}", wallet.address()?);
    Ok(())
}

fn balance(config: &Config, address: &str) -> Result<()> {
    let address: Address = address.parse()?;

    let chain = load_chain(config)?;
    println!("balance for {address}: {}", chain.balance_of(address));
    Ok(())
}

fn transfer(config: &Config, from_address: &str, to_address: &str, amount: f32) -> Result<()> {
    if amount <= 0.0 {
        return Err(Error::InvalidArgument("transfer amount must be greater than zero".into()));
    }

    let from_wallet = load_wallet_by_address(config, from_address)?;
    let to_wallet_address: Address = to_address.parse()?;
    let from_address = from_wallet.address()?;

    let chain = load_chain(config)?;

    let mut available = chain
        .utxo_set(Some(&std::iter::once(from_address).collect()))
        .into_iter()
        .map(|(outpoint, output)| (outpoint, output.amount))
        .collect::<Vec<_>>();
    available.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let total: f32 = available.iter().map(|(_, amount)| amount).sum();
    if total < amount {
        return Err(Error::InsufficientFunds(format!(
            "address {from_address} has {total} available but {amount} was requested"
        )));
    }

    let mut prepared_amount = 0.0f32;
    let mut inputs = Vec::new();
    while prepared_amount < amount {
        let (outpoint, outpoint_amount) = available.pop().expect("total already checked to cover amount");
        prepared_amount += outpoint_amount;
        inputs.push(TransactionInput::new(outpoint));
    }

    let mut outputs = vec![TransactionOutput::new(to_wallet_address, amount)?];
    if prepared_amount > amount {
        outputs.push(TransactionOutput::new(from_address, prepared_amount - amount)?);
    }

    let mut transaction = Transaction::new_transfer(inputs, outputs)?;
    from_wallet.sign_transaction(&mut transaction)?;

    let mempool = FileMempoolStore::new(config.mempool_path());
    mempool.append(&transaction)?;

    println!(
        "transferred {amount} from {from_address} to {to_wallet_address} at {}: tx {}",
        format_timestamp(transaction.timestamp()),
        hex::encode(transaction.id())
    );
    Ok(())
}

fn waiting_transactions(config: &Config) -> Result<()> {
    let mempool = FileMempoolStore::new(config.mempool_path());
    let mut transactions = mempool.load()?;
    transactions.sort_by_key(Transaction::timestamp);

    println!("waiting transactions:");
    for tx in &transactions {
        println!("- {} ({})", hex::encode(tx.id()), format_timestamp(tx.timestamp()));
    }
    Ok(())
}

fn mine(config: &Config, address: &str) -> Result<()> {
    let reward_address: Address = address.parse()?;

    let chain = load_chain(config)?;
    let mempool = FileMempoolStore::new(config.mempool_path());
    let waiting = mempool.load()?;

    info!(workers = config.mining.workers, batch_size = config.mining.batch_size, "mining new block");
    let miner = Miner::new(config.mining.workers, config.mining.batch_size)?;

    match miner.mine(&chain, &waiting, Some(reward_address))? {
        Some(block) => {
            let mined_transactions = block.transactions.clone();

            let mut new_chain = chain;
            new_chain.push(block.clone())?;

            let chain_store = FileChainStore::new(config.chain_path());
            chain_store.save(&new_chain)?;
            export::save_chain_export(&config.chain_export_path(), &new_chain)?;
            mempool.remove(&mined_transactions)?;

            println!("mined block {}", hex::encode(block.id()));
            println!("├ nonce: {}", block.nonce);
            println!("├ timestamp: {}", format_timestamp(block.timestamp));
            println!("├ transactions: {}", block.transactions.len());
            println!("└ previous block id: {}", hex::encode(block.previous_block_id));
        }
        None => println!("failed to mine block, nonce space exhausted"),
    }

    Ok(())
}
