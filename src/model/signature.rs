//! A transaction signature: a wallet's canonical public representation
//! paired with `SHA256(RSA-PSS(SHA256-MGF1, salt=MAX, transaction_id))`.
//!
//! The inner `SHA256` over the RSA-PSS output collapses the on-chain
//! verifier to a fixed 32 bytes; this is deliberate (see `DESIGN.md`) and
//! must be preserved for byte compatibility.

use crate::codec::{Codec, Cursor};
use crate::error::Result;
use crate::model::address::Address;

/// DER PKCS#1 encoding length of an RSA-4096 (e=65537) public key.
pub const WALLET_PUBLIC_REPR_LEN: usize = 526;
pub const SIGNATURE_INNER_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSignature {
    pub wallet_public_repr: Vec<u8>,
    pub signature: [u8; SIGNATURE_INNER_LEN],
}

impl TransactionSignature {
    pub fn new(wallet_public_repr: Vec<u8>, signature: [u8; SIGNATURE_INNER_LEN]) -> Result<Self> {
        if wallet_public_repr.len() != WALLET_PUBLIC_REPR_LEN {
            return Err(crate::error::Error::InvalidArgument(format!(
                "wallet public representation must be {WALLET_PUBLIC_REPR_LEN} bytes, got {}",
                wallet_public_repr.len()
            )));
        }

        Ok(TransactionSignature {
            wallet_public_repr,
            signature,
        })
    }

    /// The address of the wallet that produced this signature.
    pub fn signer_address(&self) -> Address {
        Address::from_public_key_bytes(&self.wallet_public_repr)
    }
}

impl Codec for TransactionSignature {
    fn encode_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.wallet_public_repr);
        out.extend_from_slice(&self.signature);
    }

    fn decode_from(cursor: &mut Cursor<'_>) -> Result<Self> {
        let wallet_public_repr = cursor.take_vec(WALLET_PUBLIC_REPR_LEN)?;
        let signature = cursor.take_fixed::<SIGNATURE_INNER_LEN>()?;
        TransactionSignature::new(wallet_public_repr, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length_repr() {
        assert!(TransactionSignature::new(vec![0u8; 10], [0u8; 32]).is_err());
    }

    #[test]
    fn round_trips() {
        let sig = TransactionSignature::new(vec![7u8; WALLET_PUBLIC_REPR_LEN], [9u8; 32]).unwrap();
        let (decoded, rest) = TransactionSignature::decode(&sig.encode()).unwrap();
        assert_eq!(sig, decoded);
        assert!(rest.is_empty());
    }
}
