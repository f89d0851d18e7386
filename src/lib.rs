//! Single-node UTXO blockchain engine: block/transaction model, chain
//! traversal and validation, parallel proof-of-work mining, RSA-4096
//! wallets, and filesystem persistence shims.

pub mod chain;
pub mod codec;
pub mod config;
pub mod error;
pub mod hash;
pub mod mining;
pub mod model;
pub mod persistence;
pub mod validation;
pub mod wallet;

pub use chain::Chain;
pub use error::{Error, Result};
pub use mining::Miner;
pub use model::{Address, Block, Transaction};
pub use wallet::Wallet;
