//! Wallet addresses: the first 8 bytes of `SHA256` over a wallet's
//! canonical (DER PKCS#1) public-key encoding.

use std::fmt;
use std::str::FromStr;

use crate::codec::{Codec, Cursor};
use crate::error::{Error, Result};
use crate::hash::sha256;

pub const ADDRESS_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// Derive the address owned by a wallet with the given canonical
    /// public-key bytes (DER PKCS#1, 526 bytes for RSA-4096/e=65537).
    pub fn from_public_key_bytes(public_key_der: &[u8]) -> Self {
        let digest = sha256(public_key_der);
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&digest[..ADDRESS_LEN]);
        Address(out)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != ADDRESS_LEN * 2 {
            return Err(Error::InvalidArgument(format!(
                "address must be {} hex characters, got {}",
                ADDRESS_LEN * 2,
                s.len()
            )));
        }

        let bytes = hex::decode(s)
            .map_err(|e| Error::InvalidArgument(format!("address is not valid hex: {e}")))?;
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

impl Codec for Address {
    fn encode_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }

    fn decode_from(cursor: &mut Cursor<'_>) -> Result<Self> {
        Ok(Address(cursor.take_fixed::<ADDRESS_LEN>()?))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn address_round_trips_through_hex() {
        let addr = Address([1, 2, 3, 4, 5, 6, 7, 8]);
        let parsed: Address = addr.to_hex().parse().unwrap();
        assert_eq!(addr, parsed);
    }

    #[rstest]
    #[case("deadbeef")]
    #[case("")]
    #[case("00112233445566778899")]
    #[case("gggggggggggggggg")]
    fn rejects_malformed_address_strings(#[case] input: &str) {
        assert!(input.parse::<Address>().is_err());
    }
}
