//! A reference to a specific output of a specific prior transaction.

use crate::codec::{Codec, Cursor};
use crate::error::Result;
use crate::hash::Digest32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionOutpoint {
    pub transaction_id: Digest32,
    pub output_index: u16,
}

impl TransactionOutpoint {
    pub fn new(transaction_id: Digest32, output_index: u16) -> Self {
        TransactionOutpoint {
            transaction_id,
            output_index,
        }
    }
}

impl Codec for TransactionOutpoint {
    fn encode_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.transaction_id);
        out.extend_from_slice(&self.output_index.to_be_bytes());
    }

    fn decode_from(cursor: &mut Cursor<'_>) -> Result<Self> {
        let transaction_id = cursor.take_fixed::<32>()?;
        let output_index = cursor.take_u16()?;
        Ok(TransactionOutpoint::new(transaction_id, output_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let op = TransactionOutpoint::new([7u8; 32], 42);
        let (decoded, rest) = TransactionOutpoint::decode(&op.encode()).unwrap();
        assert_eq!(op, decoded);
        assert!(rest.is_empty());
    }
}
