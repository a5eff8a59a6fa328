//! Per-call translation options and results

use crate::collaborators::EncryptionKind;
use std::time::Duration;

/// Default connect timeout handed to forwarders
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5_000);
/// Default read timeout handed to forwarders
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(30_000);

/// What to do with a request beyond mapping it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationOptions {
    pub route_id: String,
    pub encrypt: bool,
    pub encryption_type: EncryptionKind,
    pub encryption_key_ref: Option<String>,
    pub forward: bool,
    pub endpoint: Option<String>,
    pub forwarding_api_key: Option<String>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl TranslationOptions {
    /// Mapping only, for `route_id`
    pub fn new(route_id: impl Into<String>) -> Self {
        Self {
            route_id: route_id.into(),
            encrypt: false,
            encryption_type: EncryptionKind::default(),
            encryption_key_ref: None,
            forward: false,
            endpoint: None,
            forwarding_api_key: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Encrypt the mapped output
    #[must_use]
    pub fn with_encryption(mut self, kind: EncryptionKind, key_ref: impl Into<String>) -> Self {
        self.encrypt = true;
        self.encryption_type = kind;
        self.encryption_key_ref = Some(key_ref.into());
        self
    }

    /// Forward the (possibly encrypted) output to `endpoint`
    #[must_use]
    pub fn with_forwarding(mut self, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        self.forward = true;
        self.endpoint = Some(endpoint.into());
        self.forwarding_api_key = api_key;
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }
}

/// Outcome of [`crate::Translator::translate_with_options`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    /// Mapped output, encrypted when requested
    pub target_message: String,
    /// Downstream response body when the message was forwarded
    pub forwarding_response: Option<String>,
    pub forwarded: bool,
}

impl TranslationResult {
    #[must_use]
    pub fn without_forwarding(target_message: String) -> Self {
        Self {
            target_message,
            forwarding_response: None,
            forwarded: false,
        }
    }

    #[must_use]
    pub fn with_forwarding(target_message: String, forwarding_response: String) -> Self {
        Self {
            target_message,
            forwarding_response: Some(forwarding_response),
            forwarded: true,
        }
    }
}
