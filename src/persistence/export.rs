//! Human-readable entity projections for external collaborators (§6).
//!
//! Export is always a single atomic write of the *entire* array, never a
//! load-then-append: the Python original's `export_transaction` opened its
//! target file in `w+` mode and then tried to `json.load` it, which reads
//! back nothing because `w+` truncates on open. That bug is not
//! reproduced here.

use std::path::Path;

use serde::Serialize;

use crate::chain::Chain;
use crate::error::Result;
use crate::model::block::Block;
use crate::model::input::TransactionInput;
use crate::model::outpoint::TransactionOutpoint;
use crate::model::output::TransactionOutput;
use crate::model::signature::TransactionSignature;
use crate::model::transaction::Transaction;

#[derive(Debug, Clone, Serialize)]
pub struct OutpointExport {
    pub transaction_id: String,
    pub output_index: u16,
}

impl From<&TransactionOutpoint> for OutpointExport {
    fn from(o: &TransactionOutpoint) -> Self {
        OutpointExport {
            transaction_id: hex::encode(o.transaction_id),
            output_index: o.output_index,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InputExport {
    pub outpoint: OutpointExport,
}

impl From<&TransactionInput> for InputExport {
    fn from(i: &TransactionInput) -> Self {
        InputExport {
            outpoint: OutpointExport::from(&i.outpoint),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputExport {
    pub address: String,
    pub amount: f32,
}

impl From<&TransactionOutput> for OutputExport {
    fn from(o: &TransactionOutput) -> Self {
        OutputExport {
            address: o.address.to_hex(),
            amount: o.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignatureExport {
    pub script: String,
    pub signature: String,
}

impl From<&TransactionSignature> for SignatureExport {
    fn from(s: &TransactionSignature) -> Self {
        SignatureExport {
            script: hex::encode(&s.wallet_public_repr),
            signature: hex::encode(s.signature),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionExport {
    pub timestamp: i64,
    pub inputs: Vec<InputExport>,
    pub outputs: Vec<OutputExport>,
    pub signatures: Vec<SignatureExport>,
}

impl From<&Transaction> for TransactionExport {
    fn from(tx: &Transaction) -> Self {
        TransactionExport {
            timestamp: tx.timestamp(),
            inputs: tx.inputs().iter().map(InputExport::from).collect(),
            outputs: tx.outputs().iter().map(OutputExport::from).collect(),
            signatures: tx.signatures().iter().map(SignatureExport::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockExport {
    pub previous_block_id: Option<String>,
    pub transactions_root: String,
    pub timestamp: i64,
    pub nonce: i64,
    pub transactions: Vec<TransactionExport>,
}

impl From<&Block> for BlockExport {
    fn from(block: &Block) -> Self {
        BlockExport {
            previous_block_id: if block.is_genesis() {
                None
            } else {
                Some(hex::encode(block.previous_block_id))
            },
            transactions_root: hex::encode(block.merkle_root()),
            timestamp: block.timestamp,
            nonce: block.nonce,
            transactions: block.transactions.iter().map(TransactionExport::from).collect(),
        }
    }
}

pub type ChainExport = Vec<BlockExport>;

pub fn export_chain(chain: &Chain) -> ChainExport {
    chain.blocks().iter().map(BlockExport::from).collect()
}

/// Write the chain's export projection to `path` in one atomic
/// write-then-rename, overwriting any prior contents in full.
pub fn save_chain_export(path: &Path, chain: &Chain) -> Result<()> {
    let export = export_chain(chain);
    let json = serde_json::to_vec(&export)
        .map_err(|e| crate::error::Error::InvalidEncoding(format!("failed to serialize chain export: {e}")))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::address::Address;
    use crate::model::block::GENESIS_PREVIOUS_ID;

    #[test]
    fn genesis_block_exports_with_null_previous_id() {
        let tx = Transaction::new_coinbase(Address([1u8; 8])).unwrap();
        let block = Block::new(GENESIS_PREVIOUS_ID, vec![tx], 0).unwrap();
        let export = BlockExport::from(&block);
        assert!(export.previous_block_id.is_none());
        assert_eq!(export.transactions.len(), 1);
    }

    #[test]
    fn chain_export_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let tx = Transaction::new_coinbase(Address([1u8; 8])).unwrap();
        let block = Block::new(GENESIS_PREVIOUS_ID, vec![tx], 0).unwrap();
        let chain = Chain::from_blocks(vec![block]).unwrap();

        let path = dir.path().join("chain.json");
        save_chain_export(&path, &chain).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: ChainExport = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
