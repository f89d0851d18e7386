//! Length-prefixed, big-endian binary codec shared by every on-chain entity.
//!
//! Every entity serializes to a fixed-order byte stream (see each type's
//! `encode`/`decode` in [`crate::model`]) built out of the primitives here:
//! fixed-size raw fields, big-endian integers/floats, and `u16`-length-
//! prefixed arrays. [`Cursor`] is the safe-load scope described by the
//! protocol — any short or malformed read turns into
//! [`Error::InvalidEncoding`] instead of a slice-index panic.

use crate::error::{Error, Result};

/// Maximum number of items a length-prefixed array may carry.
pub const MAX_ARRAY_LEN: usize = u16::MAX as usize;

/// A cursor over a decode buffer that turns out-of-bounds reads into
/// [`Error::InvalidEncoding`] rather than panicking.
pub struct Cursor<'a> {
    remaining: &'a [u8],
}

impl<'a> Cursor<'a> {
    pub fn new(b: &'a [u8]) -> Self {
        Cursor { remaining: b }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        self.remaining
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining.len() < n {
            return Err(Error::InvalidEncoding(format!(
                "expected {n} more bytes, only {} remain",
                self.remaining.len()
            )));
        }
        let (head, tail) = self.remaining.split_at(n);
        self.remaining = tail;
        Ok(head)
    }

    /// Read a fixed-size raw field, verbatim.
    pub fn take_fixed<const N: usize>(&mut self) -> Result<[u8; N]> {
        let slice = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub fn take_vec(&mut self, n: usize) -> Result<Vec<u8>> {
        Ok(self.take(n)?.to_vec())
    }

    pub fn take_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.take_fixed::<2>()?))
    }

    pub fn take_i64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.take_fixed::<8>()?))
    }

    pub fn take_f32(&mut self) -> Result<f32> {
        Ok(f32::from_be_bytes(self.take_fixed::<4>()?))
    }

    /// Read a `u16`-length-prefixed array of items decoded by `item_fn`.
    pub fn take_array<T>(
        &mut self,
        mut item_fn: impl FnMut(&mut Cursor<'a>) -> Result<T>,
    ) -> Result<Vec<T>> {
        let len = self.take_u16()? as usize;
        let mut items = Vec::with_capacity(len.min(4096));

        for _ in 0..len {
            items.push(item_fn(self)?);
        }

        Ok(items)
    }
}

/// Serialize a `u16`-length-prefixed array, writing each item with `to_bytes`.
pub fn encode_array<T>(out: &mut Vec<u8>, items: &[T], mut to_bytes: impl FnMut(&T, &mut Vec<u8>)) {
    debug_assert!(items.len() <= MAX_ARRAY_LEN, "array length exceeds u16::MAX");
    out.extend_from_slice(&(items.len() as u16).to_be_bytes());

    for item in items {
        to_bytes(item, out);
    }
}

pub fn encode_i64(out: &mut Vec<u8>, v: i64) {
    out.extend_from_slice(&v.to_be_bytes());
}

pub fn encode_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

pub fn encode_f32(out: &mut Vec<u8>, v: f32) {
    out.extend_from_slice(&v.to_be_bytes());
}

/// Types that round-trip to the canonical on-chain byte format.
pub trait Codec: Sized {
    /// Append this entity's canonical encoding to `out`.
    fn encode_to(&self, out: &mut Vec<u8>);

    /// Consume this entity's encoding from the front of `cursor`.
    fn decode_from(cursor: &mut Cursor<'_>) -> Result<Self>;

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_to(&mut out);
        out
    }

    fn decode(b: &[u8]) -> Result<(Self, &[u8])> {
        let mut cursor = Cursor::new(b);
        let item = Self::decode_from(&mut cursor)?;
        Ok((item, cursor.remaining()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_reports_short_buffer_as_invalid_encoding() {
        let b = [0u8; 3];
        let mut cursor = Cursor::new(&b);
        let err = cursor.take_fixed::<8>().unwrap_err();
        assert!(matches!(err, Error::InvalidEncoding(_)));
    }

    #[test]
    fn array_round_trips() {
        let mut out = Vec::new();
        encode_array(&mut out, &[1u16, 2, 3], |v, buf| encode_u16(buf, *v));

        let mut cursor = Cursor::new(&out);
        let decoded = cursor.take_array(|c| c.take_u16()).unwrap();
        assert_eq!(decoded, vec![1, 2, 3]);
        assert!(cursor.remaining().is_empty());
    }
}
