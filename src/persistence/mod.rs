//! Persistence contracts and filesystem-backed reference implementations.
//! The wire formats are external (§6): a flat genesis-first block stream
//! for the chain, and a length-prefix-free, EOF-terminated transaction
//! stream for the mempool.

pub mod chain_store;
pub mod export;
pub mod mempool_store;

pub use chain_store::{ChainStore, FileChainStore};
pub use export::{export_chain, BlockExport, ChainExport};
pub use mempool_store::{FileMempoolStore, MempoolStore};
