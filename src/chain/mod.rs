//! The chain: an arena of blocks plus a tip index, not a back-pointer
//! graph (see `DESIGN.md`). Traversal always walks the arena in
//! genesis-first order from index `0` to the tip.

use std::collections::{HashMap, HashSet};

use crate::codec::Codec;
use crate::error::{Error, Result};
use crate::hash::Digest32;
use crate::model::address::Address;
use crate::model::block::Block;
use crate::model::outpoint::TransactionOutpoint;
use crate::model::output::TransactionOutput;
use crate::model::transaction::Transaction;

/// Outpoint → owning output, the view transaction validity checks against.
pub type UtxoSet = HashMap<TransactionOutpoint, TransactionOutput>;

/// An append-only sequence of blocks, genesis first. The last element is
/// the tip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chain {
    blocks: Vec<Block>,
}

/// Checks genesis-first previous-id linkage over an ordered block list.
/// Returns a description of the first break, if any; callers decide which
/// `Error` kind the break maps to (see `from_blocks` vs. `decode_from`).
fn linkage_break(blocks: &[Block]) -> Option<String> {
    for (i, block) in blocks.iter().enumerate() {
        if i == 0 {
            if !block.is_genesis() {
                return Some("the first block in a chain must have an all-zero previous_block_id".into());
            }
        } else {
            let expected = blocks[i - 1].id();
            if block.previous_block_id != expected {
                return Some(format!("block {i} does not chain onto block {}", i - 1));
            }
        }
    }
    None
}

impl Chain {
    pub fn empty() -> Self {
        Chain { blocks: Vec::new() }
    }

    /// Build a chain from an already-assembled block list, e.g. one a
    /// caller constructed in memory. A broken previous-id linkage here is
    /// a semantically invalid chain, not a malformed encoding, so it
    /// reports `Error::InvalidChain` (see `decode_from` for the decode
    /// path, which reports the same break as `Error::InvalidEncoding`).
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self> {
        if let Some(message) = linkage_break(&blocks) {
            return Err(Error::InvalidChain(message));
        }

        Ok(Chain { blocks })
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Append a freshly mined block. The caller is responsible for having
    /// validated it against this chain's tip.
    pub fn push(&mut self, block: Block) -> Result<()> {
        match self.tip() {
            None => {
                if !block.is_genesis() {
                    return Err(Error::InvalidChain(
                        "the first block appended to an empty chain must be a genesis block".into(),
                    ));
                }
            }
            Some(tip) if block.previous_block_id != tip.id() => {
                return Err(Error::InvalidChain(
                    "appended block does not chain onto the current tip".into(),
                ));
            }
            _ => {}
        }

        self.blocks.push(block);
        Ok(())
    }

    /// All transactions across the chain, genesis first, keyed by ID.
    /// Later insertions win on collision (should never occur under the
    /// chain's own invariants).
    pub fn transaction_map(&self) -> HashMap<Digest32, &Transaction> {
        let mut map = HashMap::new();
        for block in &self.blocks {
            for tx in &block.transactions {
                map.insert(tx.id(), tx);
            }
        }
        map
    }

    /// The UTXO set up to and including this chain's tip, optionally
    /// restricted to outputs owned by one of `addresses`.
    ///
    /// Spends referencing an outpoint absent from the running set are
    /// tolerated silently when a filter is active, since filtered
    /// traversal may never have inserted that outpoint in the first
    /// place.
    pub fn utxo_set(&self, addresses: Option<&HashSet<Address>>) -> UtxoSet {
        let mut utxo: HashMap<TransactionOutpoint, TransactionOutput> = HashMap::new();

        for block in &self.blocks {
            for tx in &block.transactions {
                for input in tx.inputs() {
                    utxo.remove(&input.outpoint);
                }

                let tx_id = tx.id();
                for (index, output) in tx.outputs().iter().enumerate() {
                    if let Some(filter) = addresses {
                        if !filter.contains(&output.address) {
                            continue;
                        }
                    }

                    utxo.insert(TransactionOutpoint::new(tx_id, index as u16), *output);
                }
            }
        }

        utxo
    }

    /// Balances per address, derived by summing the UTXO set grouped by
    /// output owner.
    pub fn balances(&self) -> HashMap<Address, f32> {
        let mut totals = HashMap::new();
        for output in self.utxo_set(None).values() {
            *totals.entry(output.address).or_insert(0.0) += output.amount;
        }
        totals
    }

    /// Balance of a single address (0.0 if it owns nothing).
    pub fn balance_of(&self, address: Address) -> f32 {
        let mut filter = HashSet::new();
        filter.insert(address);
        self.utxo_set(Some(&filter))
            .values()
            .map(|o| o.amount)
            .sum()
    }

    /// The UTXO set as it stood immediately before `block_index` (i.e.
    /// over blocks `[0, block_index)`). Used by validation to check a
    /// block's transactions against strictly prior chain state.
    pub fn utxo_set_before(&self, block_index: usize) -> UtxoSet {
        let prefix = Chain {
            blocks: self.blocks[..block_index].to_vec(),
        };
        prefix.utxo_set(None)
    }
}

impl Codec for Chain {
    fn encode_to(&self, out: &mut Vec<u8>) {
        for block in &self.blocks {
            block.encode_to(out);
        }
    }

    fn decode_from(cursor: &mut crate::codec::Cursor<'_>) -> Result<Self> {
        let mut blocks = Vec::new();
        while !cursor.remaining().is_empty() {
            blocks.push(Block::decode_from(cursor)?);
        }

        // A previous-id mismatch discovered while decoding a byte stream
        // is a malformed store (spec.md §7/§4.8), not a semantically
        // invalid but well-formed chain — report it the same way a short
        // read or a merkle-root mismatch is reported.
        if let Some(message) = linkage_break(&blocks) {
            return Err(Error::InvalidEncoding(message));
        }

        Ok(Chain { blocks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::input::TransactionInput;
    use crate::model::output::TransactionOutput;

    fn coinbase(addr: Address) -> Transaction {
        Transaction::new_coinbase(addr).unwrap()
    }

    #[test]
    fn genesis_only_chain_has_coinbase_balance() {
        let a = Address([1u8; 8]);
        let genesis = Block::new(crate::model::block::GENESIS_PREVIOUS_ID, vec![coinbase(a)], 0).unwrap();
        let chain = Chain::from_blocks(vec![genesis]).unwrap();
        assert_eq!(chain.balance_of(a), 10.0);
    }

    #[test]
    fn rejects_non_genesis_first_block() {
        let a = Address([1u8; 8]);
        let not_genesis = Block::new([9u8; 32], vec![coinbase(a)], 0).unwrap();
        assert!(Chain::from_blocks(vec![not_genesis]).is_err());
    }

    #[test]
    fn transfer_moves_balance_between_addresses() {
        let a = Address([1u8; 8]);
        let b = Address([2u8; 8]);

        let genesis = Block::new(crate::model::block::GENESIS_PREVIOUS_ID, vec![coinbase(a)], 0).unwrap();
        let genesis_tx_id = genesis.transactions[0].id();

        let input = TransactionInput::new(TransactionOutpoint::new(genesis_tx_id, 0));
        let output = TransactionOutput::new(b, 10.0).unwrap();
        let transfer = Transaction::new_transfer(vec![input], vec![output]).unwrap();

        let next_coinbase = coinbase(a);
        let next = Block::new(genesis.id(), vec![next_coinbase, transfer], 1).unwrap();

        let chain = Chain::from_blocks(vec![genesis, next]).unwrap();
        assert_eq!(chain.balance_of(a), 10.0);
        assert_eq!(chain.balance_of(b), 10.0);
    }

    #[test]
    fn whole_chain_round_trips() {
        let a = Address([1u8; 8]);
        let genesis = Block::new(crate::model::block::GENESIS_PREVIOUS_ID, vec![coinbase(a)], 0).unwrap();
        let chain = Chain::from_blocks(vec![genesis]).unwrap();

        let (decoded, rest) = Chain::decode(&chain.encode()).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, chain);
    }
}
