//! The wallet-persistence contract: "given an address, yield the
//! corresponding private key or report not-found"; "given a wallet,
//! persist it, refusing to overwrite an existing address."

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::address::Address;
use crate::wallet::Wallet;

pub trait WalletRegistry {
    fn load(&self, address: Address) -> Result<Wallet>;
    fn save(&self, wallet: &Wallet) -> Result<()>;
}

/// Reference registry backed by the filesystem, mirroring the on-disk
/// layout `<root>/<hex address>/private.pem`.
pub struct FileWalletRegistry {
    root: PathBuf,
}

impl FileWalletRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileWalletRegistry { root: root.into() }
    }

    fn wallet_dir(&self, address: Address) -> PathBuf {
        self.root.join(address.to_hex())
    }

    fn private_key_path(&self, address: Address) -> PathBuf {
        self.wallet_dir(address).join("private.pem")
    }
}

impl WalletRegistry for FileWalletRegistry {
    fn load(&self, address: Address) -> Result<Wallet> {
        let path = self.private_key_path(address);
        let pem = std::fs::read_to_string(&path)
            .map_err(|_| Error::NotFound(format!("wallet {address} was not found in the registry")))?;
        Wallet::from_pkcs8_pem(&pem)
    }

    fn save(&self, wallet: &Wallet) -> Result<()> {
        let address = wallet.address()?;
        let dir = self.wallet_dir(address);

        if dir.exists() {
            return Err(Error::Conflict(format!(
                "wallet {address} is already saved and cannot be overwritten"
            )));
        }

        std::fs::create_dir_all(&dir)?;
        let pem = wallet.to_pkcs8_pem()?;
        std::fs::write(self.private_key_path(address), pem)?;
        Ok(())
    }
}

pub fn default_wallet_root(data_dir: &Path) -> PathBuf {
    data_dir.join("wallets")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_a_temp_directory() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FileWalletRegistry::new(dir.path());

        let wallet = crate::wallet::Wallet::generate().unwrap();
        registry.save(&wallet).unwrap();

        let address = wallet.address().unwrap();
        let loaded = registry.load(address).unwrap();
        assert_eq!(loaded.address().unwrap(), address);
    }

    #[test]
    fn refuses_to_overwrite_an_existing_address() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FileWalletRegistry::new(dir.path());

        let wallet = crate::wallet::Wallet::generate().unwrap();
        registry.save(&wallet).unwrap();
        assert!(registry.save(&wallet).is_err());
    }

    #[test]
    fn missing_address_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FileWalletRegistry::new(dir.path());
        assert!(registry.load(Address([9u8; 8])).is_err());
    }
}
