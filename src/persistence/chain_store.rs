//! The on-disk chain store: a single file holding the genesis-first
//! concatenation of encoded blocks. An empty or missing file means
//! "no chain."

use std::path::PathBuf;

use crate::chain::Chain;
use crate::codec::Codec;
use crate::error::Result;
use crate::validation::{self, Depth};

pub trait ChainStore {
    /// The stored chain (whose `tip()` is the latest block), or `None` if
    /// the store is empty or missing. A malformed store fails with
    /// `InvalidEncoding`; a structurally valid but semantically invalid
    /// chain (failing deep validation) fails with `InvalidChain`.
    fn load(&self) -> Result<Option<Chain>>;

    /// Overwrite the store with the genesis-first byte stream of `chain`.
    fn save(&self, chain: &Chain) -> Result<()>;
}

pub struct FileChainStore {
    path: PathBuf,
}

impl FileChainStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileChainStore { path: path.into() }
    }
}

impl ChainStore for FileChainStore {
    fn load(&self) -> Result<Option<Chain>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if bytes.is_empty() {
            return Ok(None);
        }

        let (chain, _) = Chain::decode(&bytes)?;
        validation::validate_chain(&chain, Depth::Deep)?;
        Ok(Some(chain))
    }

    fn save(&self, chain: &Chain) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, chain.encode())?;
        Ok(())
    }
}
