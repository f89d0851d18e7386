//! Runtime configuration: data directory, miner worker/batch tuning, and
//! logging, loaded from and saved to TOML.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MiningConfig {
    /// Number of parallel worker threads (`P` in the mining procedure).
    pub workers: usize,
    /// Nonces per batch dispatched to a worker (`B` in the mining procedure).
    pub batch_size: i64,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            batch_size: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub enable_console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_console: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub mining: MiningConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("./data"))
            .join("utxo-chain");

        Self {
            data_dir,
            mining: MiningConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = data_dir {
            config.data_dir = dir;
        }
        config
    }

    pub fn chain_path(&self) -> PathBuf {
        self.data_dir.join("blockchain.bin")
    }

    pub fn mempool_path(&self) -> PathBuf {
        self.data_dir.join("mempool.bin")
    }

    pub fn chain_export_path(&self) -> PathBuf {
        self.data_dir.join("blockchain.json")
    }

    pub fn wallet_root(&self) -> PathBuf {
        self.data_dir.join("wallets")
    }

    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("failed to parse config: {e}")))
    }

    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_at_least_one_worker() {
        assert!(Config::default().mining.workers >= 1);
    }

    #[test]
    fn round_trips_through_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::new(Some(dir.path().to_path_buf()));
        config.mining.workers = 4;
        config.mining.batch_size = 5_000;

        config.to_file(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
