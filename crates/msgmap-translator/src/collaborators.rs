//! Post-translation collaborators
//!
//! Encryption and downstream delivery run strictly after the mapping engine
//! has produced its output. Implementations carry their own key storage,
//! transport, and retry policy.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Error type returned by collaborator implementations
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Cipher family requested for the translated output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EncryptionKind {
    /// Symmetric AES; ciphertext carries its IV
    #[default]
    Aes,
    /// PGP public-key encryption
    Pgp,
}

impl EncryptionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EncryptionKind::Aes => "AES",
            EncryptionKind::Pgp => "PGP",
        }
    }
}

impl FromStr for EncryptionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AES" => Ok(EncryptionKind::Aes),
            "PGP" => Ok(EncryptionKind::Pgp),
            other => Err(format!("unknown encryption type '{other}'")),
        }
    }
}

impl fmt::Display for EncryptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encrypts a finished target message
pub trait Encryptor: Send + Sync {
    /// Encrypt `content` with the key identified by `key_ref`
    ///
    /// # Errors
    ///
    /// Implementations fail when the key cannot be resolved or the cipher
    /// rejects the input.
    fn encrypt(&self, content: &str, kind: EncryptionKind, key_ref: Option<&str>) -> Result<String, BoxError>;
}

/// Delivery parameters for one forwarded message
#[derive(Debug, Clone, Copy)]
pub struct ForwardRequest<'a> {
    pub endpoint: &'a str,
    pub body: &'a str,
    /// Sent as an API key header when present
    pub api_key: Option<&'a str>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

/// Delivers a finished target message downstream
pub trait Forwarder: Send + Sync {
    /// Send the request and return the downstream response body
    ///
    /// # Errors
    ///
    /// Implementations fail on transport errors, timeouts, or non-success
    /// responses.
    fn forward(&self, request: &ForwardRequest<'_>) -> Result<String, BoxError>;
}

impl<F> Encryptor for F
where
    F: Fn(&str, EncryptionKind, Option<&str>) -> Result<String, BoxError> + Send + Sync,
{
    fn encrypt(&self, content: &str, kind: EncryptionKind, key_ref: Option<&str>) -> Result<String, BoxError> {
        self(content, kind, key_ref)
    }
}
