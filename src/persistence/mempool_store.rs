//! The on-disk mempool store: a concatenated, length-prefix-free stream
//! of serialized transactions, read to EOF.

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use crate::codec::{Codec, Cursor};
use crate::error::Result;
use crate::model::transaction::Transaction;

pub trait MempoolStore {
    /// All waiting transactions; an empty set if the store is missing.
    fn load(&self) -> Result<Vec<Transaction>>;

    /// Append one transaction to the store.
    fn append(&self, transaction: &Transaction) -> Result<()>;

    /// Rewrite the store without the given transactions (matched by ID).
    fn remove(&self, transactions: &[Transaction]) -> Result<()>;
}

pub struct FileMempoolStore {
    path: PathBuf,
}

impl FileMempoolStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileMempoolStore { path: path.into() }
    }
}

impl MempoolStore for FileMempoolStore {
    fn load(&self) -> Result<Vec<Transaction>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut cursor = Cursor::new(&bytes);
        let mut transactions = Vec::new();
        while !cursor.remaining().is_empty() {
            transactions.push(Transaction::decode_from(&mut cursor)?);
        }

        Ok(transactions)
    }

    fn append(&self, transaction: &Transaction) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&transaction.encode())?;
        Ok(())
    }

    fn remove(&self, transactions: &[Transaction]) -> Result<()> {
        let remove_ids: HashSet<_> = transactions.iter().map(Transaction::id).collect();
        let remaining: Vec<Transaction> = self
            .load()?
            .into_iter()
            .filter(|tx| !remove_ids.contains(&tx.id()))
            .collect();

        let mut bytes = Vec::new();
        for tx in &remaining {
            tx.encode_to(&mut bytes);
        }

        std::fs::write(&self.path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::address::Address;

    #[test]
    fn missing_store_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMempoolStore::new(dir.path().join("mempool.bin"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn append_and_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMempoolStore::new(dir.path().join("mempool.bin"));

        let tx_a = Transaction::new_coinbase(Address([1u8; 8])).unwrap();
        let tx_b = Transaction::new_coinbase(Address([2u8; 8])).unwrap();
        store.append(&tx_a).unwrap();
        store.append(&tx_b).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id(), tx_a.id());
        assert_eq!(loaded[1].id(), tx_b.id());
    }

    #[test]
    fn remove_drops_matching_transactions_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMempoolStore::new(dir.path().join("mempool.bin"));

        let tx_a = Transaction::new_coinbase(Address([1u8; 8])).unwrap();
        let tx_b = Transaction::new_coinbase(Address([2u8; 8])).unwrap();
        store.append(&tx_a).unwrap();
        store.append(&tx_b).unwrap();

        store.remove(std::slice::from_ref(&tx_a)).unwrap();

        let remaining = store.load().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id(), tx_b.id());
    }
}
