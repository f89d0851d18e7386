//! Transactions, modeled as a tagged enum rather than a coinbase/subclass
//! relation (see `DESIGN.md`): which variant decodes out of a byte stream
//! is inferred from whether the parsed input array is empty, exactly as
//! the protocol specifies.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::codec::{encode_array, encode_i64, Codec, Cursor};
use crate::error::{Error, Result};
use crate::hash::{sha256, Digest32};
use crate::model::address::Address;
use crate::model::input::TransactionInput;
use crate::model::output::TransactionOutput;
use crate::model::signature::TransactionSignature;

/// Fixed reward minted by every coinbase transaction.
pub const COINBASE_REWARD: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Transaction {
    Coinbase {
        output: TransactionOutput,
        timestamp: i64,
        signatures: Vec<TransactionSignature>,
    },
    Transfer {
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
        timestamp: i64,
        signatures: Vec<TransactionSignature>,
    },
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the Unix epoch")
        .as_millis() as i64
}

impl Transaction {
    /// Create a fresh coinbase transaction awarding [`COINBASE_REWARD`] to
    /// `address`.
    pub fn new_coinbase(address: Address) -> Result<Self> {
        let output = TransactionOutput::new(address, COINBASE_REWARD)?;
        Ok(Transaction::Coinbase {
            output,
            timestamp: now_ms(),
            signatures: Vec::new(),
        })
    }

    /// Create a transfer spending `inputs` into `outputs`. Requires at
    /// least one input.
    pub fn new_transfer(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Result<Self> {
        if inputs.is_empty() {
            return Err(Error::InvalidArgument(
                "a non-coinbase transaction requires at least one input".into(),
            ));
        }

        Ok(Transaction::Transfer {
            inputs,
            outputs,
            timestamp: now_ms(),
            signatures: Vec::new(),
        })
    }

    pub fn is_coinbase(&self) -> bool {
        matches!(self, Transaction::Coinbase { .. })
    }

    pub fn inputs(&self) -> &[TransactionInput] {
        match self {
            Transaction::Coinbase { .. } => &[],
            Transaction::Transfer { inputs, .. } => inputs,
        }
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        match self {
            Transaction::Coinbase { output, .. } => std::slice::from_ref(output),
            Transaction::Transfer { outputs, .. } => outputs,
        }
    }

    pub fn signatures(&self) -> &[TransactionSignature] {
        match self {
            Transaction::Coinbase { signatures, .. } => signatures,
            Transaction::Transfer { signatures, .. } => signatures,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            Transaction::Coinbase { timestamp, .. } => *timestamp,
            Transaction::Transfer { timestamp, .. } => *timestamp,
        }
    }

    pub fn id(&self) -> Digest32 {
        sha256(&self.encode())
    }

    /// Append a signature, rejecting a wallet that has already signed this
    /// transaction (by matching public representation).
    pub fn add_signature(&mut self, signature: TransactionSignature) -> Result<()> {
        let signatures = match self {
            Transaction::Coinbase { signatures, .. } => signatures,
            Transaction::Transfer { signatures, .. } => signatures,
        };

        if signatures
            .iter()
            .any(|s| s.wallet_public_repr == signature.wallet_public_repr)
        {
            return Err(Error::InvalidArgument(
                "this wallet has already signed this transaction".into(),
            ));
        }

        signatures.push(signature);
        Ok(())
    }
}

impl Codec for Transaction {
    fn encode_to(&self, out: &mut Vec<u8>) {
        encode_i64(out, self.timestamp());
        encode_array(out, self.inputs(), |item, buf| item.encode_to(buf));
        encode_array(out, self.outputs(), |item, buf| item.encode_to(buf));
        encode_array(out, self.signatures(), |item, buf| item.encode_to(buf));
    }

    fn decode_from(cursor: &mut Cursor<'_>) -> Result<Self> {
        let timestamp = cursor.take_i64()?;
        let inputs = cursor.take_array(TransactionInput::decode_from)?;
        let outputs = cursor.take_array(TransactionOutput::decode_from)?;
        let signatures = cursor.take_array(TransactionSignature::decode_from)?;

        if inputs.is_empty() {
            if outputs.len() != 1 {
                return Err(Error::InvalidEncoding(
                    "coinbase transaction must have exactly one output".into(),
                ));
            }

            if outputs[0].amount != COINBASE_REWARD {
                return Err(Error::InvalidEncoding(format!(
                    "coinbase transaction must award exactly {COINBASE_REWARD}"
                )));
            }

            Ok(Transaction::Coinbase {
                output: outputs[0],
                timestamp,
                signatures,
            })
        } else {
            Ok(Transaction::Transfer {
                inputs,
                outputs,
                timestamp,
                signatures,
            })
        }
    }
}

/// Merkle root over an ordered sequence of transaction IDs.
pub fn transactions_merkle_root(transactions: &[Transaction]) -> Digest32 {
    let ids: Vec<Digest32> = transactions.iter().map(Transaction::id).collect();
    crate::hash::merkle_root(&ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::outpoint::TransactionOutpoint;

    #[test]
    fn coinbase_round_trips() {
        let tx = Transaction::new_coinbase(Address([1u8; 8])).unwrap();
        let (decoded, rest) = Transaction::decode(&tx.encode()).unwrap();
        assert!(rest.is_empty());
        assert!(decoded.is_coinbase());
        assert_eq!(decoded.outputs()[0].amount, COINBASE_REWARD);
    }

    #[test]
    fn transfer_requires_at_least_one_input() {
        let out = TransactionOutput::new(Address([2u8; 8]), 1.0).unwrap();
        assert!(Transaction::new_transfer(vec![], vec![out]).is_err());
    }

    #[test]
    fn transfer_round_trips() {
        let input = TransactionInput::new(TransactionOutpoint::new([9u8; 32], 0));
        let output = TransactionOutput::new(Address([2u8; 8]), 3.5).unwrap();
        let tx = Transaction::new_transfer(vec![input], vec![output]).unwrap();

        let (decoded, rest) = Transaction::decode(&tx.encode()).unwrap();
        assert!(rest.is_empty());
        assert!(!decoded.is_coinbase());
        assert_eq!(decoded.inputs(), tx.inputs());
    }

    #[test]
    fn duplicate_signer_is_rejected() {
        let out = TransactionOutput::new(Address([2u8; 8]), 1.0).unwrap();
        let input = TransactionInput::new(TransactionOutpoint::new([1u8; 32], 0));
        let mut tx = Transaction::new_transfer(vec![input], vec![out]).unwrap();

        let sig = TransactionSignature::new(vec![5u8; crate::model::signature::WALLET_PUBLIC_REPR_LEN], [0u8; 32])
            .unwrap();
        tx.add_signature(sig.clone()).unwrap();
        assert!(tx.add_signature(sig).is_err());
    }

    #[test]
    fn transaction_id_changes_with_content() {
        let out_a = TransactionOutput::new(Address([2u8; 8]), 1.0).unwrap();
        let out_b = TransactionOutput::new(Address([2u8; 8]), 2.0).unwrap();
        let input = TransactionInput::new(TransactionOutpoint::new([1u8; 32], 0));

        let tx_a = Transaction::new_transfer(vec![input], vec![out_a]).unwrap();
        let tx_b = Transaction::new_transfer(vec![input], vec![out_b]).unwrap();
        assert_ne!(tx_a.id(), tx_b.id());
    }
}
