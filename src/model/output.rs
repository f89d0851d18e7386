//! A transaction output: binds an amount to a recipient address.

use crate::codec::{Codec, Cursor};
use crate::error::{Error, Result};
use crate::model::address::Address;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransactionOutput {
    pub address: Address,
    pub amount: f32,
}

impl TransactionOutput {
    pub fn new(address: Address, amount: f32) -> Result<Self> {
        if !(amount > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "output amount must be > 0, got {amount}"
            )));
        }

        Ok(TransactionOutput { address, amount })
    }
}

impl Codec for TransactionOutput {
    fn encode_to(&self, out: &mut Vec<u8>) {
        self.address.encode_to(out);
        out.extend_from_slice(&self.amount.to_be_bytes());
    }

    fn decode_from(cursor: &mut Cursor<'_>) -> Result<Self> {
        let address = Address::decode_from(cursor)?;
        let amount = cursor.take_f32()?;
        TransactionOutput::new(address, amount)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f32::NEG_INFINITY)]
    fn rejects_non_positive_amount(#[case] amount: f32) {
        assert!(TransactionOutput::new(Address([0u8; 8]), amount).is_err());
    }

    #[test]
    fn accepts_a_positive_amount() {
        assert!(TransactionOutput::new(Address([0u8; 8]), 1.0).is_ok());
    }

    #[test]
    fn round_trips() {
        let out = TransactionOutput::new(Address([3u8; 8]), 12.5).unwrap();
        let (decoded, rest) = TransactionOutput::decode(&out.encode()).unwrap();
        assert_eq!(out, decoded);
        assert!(rest.is_empty());
    }
}
