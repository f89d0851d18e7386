//! Blocks: a header linking to the previous block plus an ordered
//! transaction list, exactly one of which must be a coinbase.

use crate::codec::{encode_array, encode_i64, Codec, Cursor};
use crate::error::{Error, Result};
use crate::hash::{sha256, Digest32};
use crate::model::transaction::{transactions_merkle_root, Transaction};

/// Upper bound a block ID must fall below for its proof of work to be
/// accepted: two leading zero bytes followed by thirty `0xFF` bytes.
pub const TARGET: Digest32 = [
    0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
];

pub const GENESIS_PREVIOUS_ID: Digest32 = [0u8; 32];

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub previous_block_id: Digest32,
    pub transactions: Vec<Transaction>,
    pub timestamp: i64,
    pub nonce: i64,
}

impl Block {
    /// Construct a new candidate block. Exactly one of `transactions` must
    /// be a coinbase transaction; `previous_block_id` is `GENESIS_PREVIOUS_ID`
    /// for the first block in a chain.
    pub fn new(previous_block_id: Digest32, transactions: Vec<Transaction>, timestamp: i64) -> Result<Self> {
        let coinbase_count = transactions.iter().filter(|t| t.is_coinbase()).count();
        if coinbase_count != 1 {
            return Err(Error::InvalidArgument(format!(
                "a block must contain exactly one coinbase transaction, got {coinbase_count}"
            )));
        }

        if !transactions[0].is_coinbase() {
            return Err(Error::InvalidArgument(
                "the coinbase transaction must be first in the block".into(),
            ));
        }

        Ok(Block {
            previous_block_id,
            transactions,
            timestamp,
            nonce: 0,
        })
    }

    pub fn is_genesis(&self) -> bool {
        self.previous_block_id == GENESIS_PREVIOUS_ID
    }

    pub fn merkle_root(&self) -> Digest32 {
        transactions_merkle_root(&self.transactions)
    }

    /// The 80-byte header hashed to produce this block's ID.
    pub fn header_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(32 + 32 + 8 + 8);
        out.extend_from_slice(&self.previous_block_id);
        out.extend_from_slice(&self.merkle_root());
        encode_i64(&mut out, self.timestamp);
        encode_i64(&mut out, self.nonce);
        out
    }

    pub fn id(&self) -> Digest32 {
        sha256(&self.header_bytes())
    }

    /// Whether this block's ID satisfies the proof-of-work target.
    pub fn check_proof(&self) -> bool {
        self.id() < TARGET
    }
}

impl Codec for Block {
    fn encode_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.header_bytes());
        encode_array(out, &self.transactions, |item, buf| item.encode_to(buf));
    }

    fn decode_from(cursor: &mut Cursor<'_>) -> Result<Self> {
        let previous_block_id = cursor.take_fixed::<32>()?;
        let merkle_root = cursor.take_fixed::<32>()?;
        let timestamp = cursor.take_i64()?;
        let nonce = cursor.take_i64()?;
        let transactions = cursor.take_array(Transaction::decode_from)?;

        if transactions_merkle_root(&transactions) != merkle_root {
            return Err(Error::InvalidEncoding(
                "parsed merkle root does not match recomputed root of parsed transactions".into(),
            ));
        }

        let mut block = Block::new(previous_block_id, transactions, timestamp)?;
        block.nonce = nonce;
        Ok(block)
    }
}
