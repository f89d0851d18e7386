//! A transaction input: an assertion of intent to spend one outpoint.

use crate::codec::{Codec, Cursor};
use crate::error::Result;
use crate::model::outpoint::TransactionOutpoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionInput {
    pub outpoint: TransactionOutpoint,
}

impl TransactionInput {
    pub fn new(outpoint: TransactionOutpoint) -> Self {
        TransactionInput { outpoint }
    }
}

impl Codec for TransactionInput {
    fn encode_to(&self, out: &mut Vec<u8>) {
        self.outpoint.encode_to(out);
    }

    fn decode_from(cursor: &mut Cursor<'_>) -> Result<Self> {
        Ok(TransactionInput::new(TransactionOutpoint::decode_from(cursor)?))
    }
}
