//! Crate-wide error type.
//!
//! Mirrors the error kinds laid out by the protocol: constructors reject
//! bad arguments with [`Error::InvalidArgument`], the codec reports
//! malformed bytes with [`Error::InvalidEncoding`], a structurally sound but
//! semantically broken chain fails to load with [`Error::InvalidChain`], and
//! so on. Nothing here panics on untrusted input; every fallible path
//! returns one of these variants.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("invalid chain: {0}")]
    InvalidChain(String),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cryptographic error: {0}")]
    Crypto(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
