//! On-chain entity types and their canonical binary encodings.

pub mod address;
pub mod block;
pub mod input;
pub mod outpoint;
pub mod output;
pub mod signature;
pub mod transaction;

pub use address::Address;
pub use block::Block;
pub use input::TransactionInput;
pub use outpoint::TransactionOutpoint;
pub use output::TransactionOutput;
pub use signature::TransactionSignature;
pub use transaction::Transaction;
