//! Wallets: RSA-4096 keypairs, address derivation, and transaction signing.

pub mod registry;

use pkcs1::{DecodeRsaPublicKey, EncodeRsaPublicKey};
use pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding};
use rand::rngs::OsRng;
use rsa::pss::SigningKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::{Error, Result};
use crate::hash::sha256;
use crate::model::address::Address;
use crate::model::signature::{TransactionSignature, WALLET_PUBLIC_REPR_LEN};
use crate::model::transaction::Transaction;

pub use registry::{FileWalletRegistry, WalletRegistry};

const RSA_KEY_BITS: usize = 4096;
const RSA_PUBLIC_EXPONENT: u64 = 65537;

/// PSS salt length matching Python `cryptography`'s `PSS.MAX_LENGTH` for a
/// 4096-bit modulus with SHA-256: `modulus_bytes - hash_bytes - 2`.
const PSS_SALT_LEN: usize = (RSA_KEY_BITS / 8) - 32 - 2;

/// A wallet: an RSA-4096 keypair and the address it derives.
#[derive(Clone)]
pub struct Wallet {
    private_key: RsaPrivateKey,
}

impl Wallet {
    /// Generate a fresh RSA-4096 (e=65537) keypair. Does not check for
    /// address collisions against any registry; see [`Wallet::create`]
    /// for the collision-avoiding constructor used by the CLI.
    pub fn generate() -> Result<Self> {
        let mut rng = OsRng;
        let private_key = RsaPrivateKey::new_with_exp(&mut rng, RSA_KEY_BITS, &rsa::BigUint::from(RSA_PUBLIC_EXPONENT))
            .map_err(|e| Error::Crypto(format!("failed to generate RSA-4096 key: {e}")))?;

        Ok(Wallet { private_key })
    }

    /// Generate a wallet and persist it, regenerating on address collision
    /// against `registry`.
    pub fn create(registry: &impl WalletRegistry) -> Result<Self> {
        loop {
            let wallet = Wallet::generate()?;
            match registry.save(&wallet) {
                Ok(()) => return Ok(wallet),
                Err(Error::Conflict(_)) => continue,
                Err(other) => return Err(other),
            }
        }
    }

    pub fn from_private_key(private_key: RsaPrivateKey) -> Self {
        Wallet { private_key }
    }

    pub fn public_key(&self) -> RsaPublicKey {
        self.private_key.to_public_key()
    }

    /// The canonical on-chain public representation: DER PKCS#1, expected
    /// to be exactly [`WALLET_PUBLIC_REPR_LEN`] bytes for an RSA-4096 key.
    pub fn public_key_der(&self) -> Result<Vec<u8>> {
        let der = self
            .public_key()
            .to_pkcs1_der()
            .map_err(|e| Error::Crypto(format!("failed to DER-encode public key: {e}")))?;
        let bytes = der.as_bytes().to_vec();

        if bytes.len() != WALLET_PUBLIC_REPR_LEN {
            return Err(Error::Crypto(format!(
                "DER PKCS#1 public key was {} bytes, expected {WALLET_PUBLIC_REPR_LEN}",
                bytes.len()
            )));
        }

        Ok(bytes)
    }

    pub fn address(&self) -> Result<Address> {
        Ok(Address::from_public_key_bytes(&self.public_key_der()?))
    }

    /// PKCS#8 PEM encoding of the private key, unencrypted.
    pub fn to_pkcs8_pem(&self) -> Result<String> {
        let pem = self
            .private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| Error::Crypto(format!("failed to PEM-encode private key: {e}")))?;
        Ok(pem.to_string())
    }

    pub fn from_pkcs8_pem(pem: &str) -> Result<Self> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|e| Error::Crypto(format!("failed to parse PKCS#8 PEM private key: {e}")))?;
        Ok(Wallet { private_key })
    }

    /// Sign `transaction`'s ID: `SHA256(RSA-PSS(SHA256-MGF1, salt=MAX, id))`,
    /// appending a [`TransactionSignature`] to it. Fails if this wallet has
    /// already signed the transaction.
    pub fn sign_transaction(&self, transaction: &mut Transaction) -> Result<()> {
        let signing_key = SigningKey::<Sha256>::new_with_salt_len(self.private_key.clone(), PSS_SALT_LEN);
        let mut rng = OsRng;
        let pss_signature = signing_key.sign_with_rng(&mut rng, &transaction.id());
        let inner = sha256(&pss_signature.to_bytes());

        let signature = TransactionSignature::new(self.public_key_der()?, inner)?;
        transaction.add_signature(signature)
    }
}

/// Decode a wallet's canonical public representation back into a usable
/// RSA public key, for callers that only have the on-chain bytes.
pub fn public_key_from_der(der: &[u8]) -> Result<RsaPublicKey> {
    RsaPublicKey::from_pkcs1_der(der).map_err(|e| Error::Crypto(format!("invalid DER PKCS#1 public key: {e}")))
}
