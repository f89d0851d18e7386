//! SHA-256 hashing and the merkle root used to summarize a block's
//! transactions.
//!
//! Padding on an odd-length level is an empty byte string, not a duplicate
//! of the last node — this differs from the more common Bitcoin-style
//! duplication and is preserved deliberately for on-chain byte
//! compatibility (see `original_source/core/bytetools/merkle.py`, which
//! does the same).

use sha2::{Digest, Sha256};

pub type Digest32 = [u8; 32];

pub fn sha256(data: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let out = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&out);
    digest
}

/// Computes the merkle root over already-hashed leaves (e.g. transaction
/// IDs). Panics are impossible; an empty slice returns the all-zero digest,
/// matching the "never called with empty transactions" note in the
/// protocol (every block has at least a coinbase).
pub fn merkle_root(leaves: &[Digest32]) -> Digest32 {
    if leaves.is_empty() {
        return [0u8; 32];
    }

    let mut level: Vec<Vec<u8>> = leaves.iter().map(|l| l.to_vec()).collect();

    while level.len() > 1 {
        if level.len() % 2 != 0 {
            level.push(Vec::new());
        }

        level = level
            .chunks(2)
            .map(|pair| {
                let mut hasher = Sha256::new();
                hasher.update(&pair[0]);
                hasher.update(&pair[1]);
                hasher.finalize().to_vec()
            })
            .collect();
    }

    let mut root = [0u8; 32];
    root.copy_from_slice(&level[0]);
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_leaf_is_its_own_root() {
        let leaf = sha256(b"only transaction");
        assert_eq!(merkle_root(&[leaf]), leaf);
    }

    #[test]
    fn odd_count_pads_with_empty_bytes_not_duplicate() {
        let a = sha256(b"a");
        let b = sha256(b"b");
        let c = sha256(b"c");

        let root = merkle_root(&[a, b, c]);

        let ab = {
            let mut h = Sha256::new();
            h.update(a);
            h.update(b);
            h.finalize().to_vec()
        };
        let c_padded = {
            let mut h = Sha256::new();
            h.update(c);
            h.update([]);
            h.finalize().to_vec()
        };
        let mut expected = [0u8; 32];
        let mut h = Sha256::new();
        h.update(&ab);
        h.update(&c_padded);
        expected.copy_from_slice(&h.finalize());

        assert_eq!(root, expected);
    }

    #[test]
    fn swapping_leaves_changes_root() {
        let a = sha256(b"a");
        let b = sha256(b"b");
        assert_ne!(merkle_root(&[a, b]), merkle_root(&[b, a]));
    }

    #[test]
    fn deterministic_for_fixed_input() {
        let leaves: Vec<_> = (0..5u8).map(|i| sha256(&[i])).collect();
        assert_eq!(merkle_root(&leaves), merkle_root(&leaves));
    }
}
