#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # msgmap-translator
//!
//! Embeddable translator facade.
//!
//! A [`Translator`] resolves route configurations by id, runs the mapping
//! engine, and optionally hands the result to an [`Encryptor`] and a
//! [`Forwarder`]. Both collaborators are traits; this crate ships no
//! cryptography or HTTP client of its own.

pub mod collaborators;
pub mod options;
pub mod translator;

pub use collaborators::{BoxError, EncryptionKind, Encryptor, ForwardRequest, Forwarder};
pub use options::{TranslationOptions, TranslationResult};
pub use translator::{Translator, TranslatorBuilder};

use thiserror::Error;

/// Direction of a translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Request,
    Response,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Direction::Request => "request",
            Direction::Response => "response",
        })
    }
}

/// Errors surfaced by the translator facade
#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("Failed to load mapping for routeId: {route}")]
    Load {
        route: String,
        #[source]
        source: msgmap_mapping::Error,
    },

    #[error("Failed to translate {direction} for routeId: {route}")]
    Translate {
        route: String,
        direction: Direction,
        #[source]
        source: msgmap_mapping::Error,
    },

    #[error("Encryption requested but no encryptor is configured")]
    EncryptorMissing,

    #[error("Forwarding requested but no forwarder is configured")]
    ForwarderMissing,

    #[error("Invalid translation options: {0}")]
    InvalidOptions(String),

    #[error("Encryption failed: {0}")]
    Encryption(#[source] BoxError),

    #[error("Forwarding to {endpoint} failed: {source}")]
    Forwarding {
        endpoint: String,
        #[source]
        source: BoxError,
    },
}

pub type Result<T> = std::result::Result<T, TranslationError>;
