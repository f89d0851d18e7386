//! Proof and transaction validity checks, each runnable in shallow (tip
//! only) or deep (whole chain) mode.
//!
//! Each inspected block starts from the UTXO view of strictly prior
//! blocks, then threads it through the block's own transaction list in
//! order: every transaction is validated against the view left by the
//! ones before it in the same block, and its effects are applied before
//! the next is checked. Two transactions spending the same outpoint in
//! one block therefore fail — the second finds the outpoint already
//! gone (see `DESIGN.md`).

use std::collections::HashSet;

use crate::chain::{Chain, UtxoSet};
use crate::error::{Error, Result};
use crate::model::outpoint::TransactionOutpoint;
use crate::model::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Shallow,
    Deep,
}

/// Check proof of work. In [`Depth::Shallow`] mode only the tip is
/// inspected; in [`Depth::Deep`] mode every block is.
pub fn check_proof(chain: &Chain, depth: Depth) -> Result<()> {
    match depth {
        Depth::Shallow => {
            if let Some(tip) = chain.tip() {
                if !tip.check_proof() {
                    return Err(Error::InvalidChain("tip block does not satisfy the proof-of-work target".into()));
                }
            }
        }
        Depth::Deep => {
            for (i, block) in chain.blocks().iter().enumerate() {
                if !block.check_proof() {
                    return Err(Error::InvalidChain(format!(
                        "block {i} does not satisfy the proof-of-work target"
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Check transaction validity for every transaction in the inspected
/// block(s), threading the UTXO view from the blocks strictly before
/// each one through its own transaction list in order.
pub fn check_transactions(chain: &Chain, depth: Depth) -> Result<()> {
    let range = match depth {
        Depth::Shallow => {
            if chain.is_empty() {
                return Ok(());
            }
            chain.len() - 1..chain.len()
        }
        Depth::Deep => 0..chain.len(),
    };

    for block_index in range {
        let mut utxo = chain.utxo_set_before(block_index);
        let block = &chain.blocks()[block_index];

        for tx in &block.transactions {
            validate_transaction(tx, &utxo)?;
            apply_transaction(tx, &mut utxo);
        }
    }

    Ok(())
}

/// Apply a validated transaction's effect to a working UTXO view: remove
/// its spent outpoints, then insert its own outputs. Used to thread the
/// view through a block's transaction list one transaction at a time.
fn apply_transaction(tx: &Transaction, utxo: &mut UtxoSet) {
    for input in tx.inputs() {
        utxo.remove(&input.outpoint);
    }
    for (index, output) in tx.outputs().iter().enumerate() {
        utxo.insert(TransactionOutpoint::new(tx.id(), index as u16), output.clone());
    }
}

fn validate_transaction(tx: &Transaction, utxo: &UtxoSet) -> Result<()> {
    if tx.is_coinbase() {
        return Ok(());
    }

    let mut available = 0.0f32;
    let mut owning_addresses = HashSet::new();

    for input in tx.inputs() {
        let referenced = utxo.get(&input.outpoint).ok_or_else(|| {
            Error::InvalidChain(format!(
                "transaction {} references an outpoint that is not in the UTXO set",
                hex::encode(tx.id())
            ))
        })?;

        available += referenced.amount;
        owning_addresses.insert(referenced.address);
    }

    let spent: f32 = tx.outputs().iter().map(|o| o.amount).sum();
    if spent > available {
        return Err(Error::InvalidChain(format!(
            "transaction {} spends {spent} but only {available} is available",
            hex::encode(tx.id())
        )));
    }

    let signer_addresses: HashSet<_> = tx.signatures().iter().map(|s| s.signer_address()).collect();
    for address in &owning_addresses {
        if !signer_addresses.contains(address) {
            return Err(Error::InvalidChain(format!(
                "transaction {} spends an input owned by {address} without a covering signature",
                hex::encode(tx.id())
            )));
        }
    }

    Ok(())
}

/// Run both proof and transaction validity in the requested mode.
pub fn validate_chain(chain: &Chain, depth: Depth) -> Result<()> {
    check_proof(chain, depth)?;
    check_transactions(chain, depth)?;
    Ok(())
}

/// Whether a single candidate transaction would validate if appended on
/// top of `chain`'s current tip. Used by the mempool/miner to filter
/// waiting transactions before assembling a candidate block.
pub fn transaction_validates_against_tip(chain: &Chain, tx: &Transaction) -> bool {
    let utxo = chain.utxo_set(None);
    validate_transaction(tx, &utxo).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::address::Address;
    use crate::model::block::{Block, GENESIS_PREVIOUS_ID};
    use crate::model::input::TransactionInput;
    use crate::model::outpoint::TransactionOutpoint;
    use crate::model::output::TransactionOutput;
    use crate::model::signature::TransactionSignature;

    fn coinbase(addr: Address) -> Transaction {
        Transaction::new_coinbase(addr).unwrap()
    }

    #[test]
    fn genesis_chain_validates() {
        let a = Address([1u8; 8]);
        let genesis = Block::new(GENESIS_PREVIOUS_ID, vec![coinbase(a)], 0).unwrap();
        let chain = Chain::from_blocks(vec![genesis]).unwrap();
        assert!(validate_chain(&chain, Depth::Deep).is_ok());
    }

    #[test]
    fn unsigned_transfer_fails_signature_coverage() {
        let a = Address([1u8; 8]);
        let b = Address([2u8; 8]);

        let genesis = Block::new(GENESIS_PREVIOUS_ID, vec![coinbase(a)], 0).unwrap();
        let genesis_tx_id = genesis.transactions[0].id();

        let input = TransactionInput::new(TransactionOutpoint::new(genesis_tx_id, 0));
        let output = TransactionOutput::new(b, 10.0).unwrap();
        let transfer = Transaction::new_transfer(vec![input], vec![output]).unwrap();

        let next = Block::new(genesis.id(), vec![coinbase(a), transfer], 1).unwrap();
        let chain = Chain::from_blocks(vec![genesis, next]).unwrap();
        assert!(validate_chain(&chain, Depth::Deep).is_err());
    }

    #[test]
    fn signed_transfer_validates() {
        let b = Address([2u8; 8]);

        // Derive the signer's address from a fixed public-key buffer so
        // the signature's `signer_address()` matches the coinbase output
        // it spends.
        let public_repr = vec![7u8; crate::model::signature::WALLET_PUBLIC_REPR_LEN];
        let signer = Address::from_public_key_bytes(&public_repr);

        let genesis = Block::new(GENESIS_PREVIOUS_ID, vec![coinbase(signer)], 0).unwrap();
        let genesis_tx_id = genesis.transactions[0].id();
        let input = TransactionInput::new(TransactionOutpoint::new(genesis_tx_id, 0));
        let output = TransactionOutput::new(b, 10.0).unwrap();
        let mut transfer = Transaction::new_transfer(vec![input], vec![output]).unwrap();
        let sig = TransactionSignature::new(public_repr, [0u8; 32]).unwrap();
        transfer.add_signature(sig).unwrap();

        let next = Block::new(genesis.id(), vec![coinbase(signer), transfer], 1).unwrap();
        let chain = Chain::from_blocks(vec![genesis, next]).unwrap();
        assert!(validate_chain(&chain, Depth::Deep).is_ok());
    }

    #[test]
    fn overspend_is_rejected() {
        let a = Address([1u8; 8]);
        let b = Address([2u8; 8]);

        let genesis = Block::new(GENESIS_PREVIOUS_ID, vec![coinbase(a)], 0).unwrap();
        let genesis_tx_id = genesis.transactions[0].id();

        let input = TransactionInput::new(TransactionOutpoint::new(genesis_tx_id, 0));
        let output = TransactionOutput::new(b, 999.0).unwrap();
        let transfer = Transaction::new_transfer(vec![input], vec![output]).unwrap();

        let next = Block::new(genesis.id(), vec![coinbase(a), transfer], 1).unwrap();
        let chain = Chain::from_blocks(vec![genesis, next]).unwrap();
        assert!(validate_chain(&chain, Depth::Deep).is_err());
    }
}
