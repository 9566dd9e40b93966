//! Connection options handed to transports with every request

use std::path::PathBuf;
use std::time::Duration;

use crate::impl_choice_conversions;

/// How the client authenticates against the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AuthType {
    /// Pre-shared key sent as a header.
    #[default]
    ApiKey,
    /// Mutual TLS with a client certificate.
    Tls,
}

impl_choice_conversions!(AuthType {
    ApiKey => "api_key",
    Tls => "tls",
});

/// Client certificate material used when `auth_type` is `tls`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TlsOptions {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub verify_peer: bool,
    /// Only set when `verify_peer` is true.
    pub ca_cert_path: Option<PathBuf>,
}

/// Options every transport strategy interprets the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TransportOptions {
    pub auth_type: AuthType,
    pub api_key: Option<String>,
    pub tls: Option<TlsOptions>,
    /// `None` disables the request timeout.
    pub timeout: Option<Duration>,
}

impl TransportOptions {
    /// True when the client certificate path should be used.
    #[must_use]
    pub const fn uses_tls_auth(&self) -> bool {
        matches!(self.auth_type, AuthType::Tls) && self.tls.is_some()
    }

    /// Key to send as `X-Api-Key`, when api-key auth is configured.
    #[must_use]
    pub fn api_key_header(&self) -> Option<&str> {
        match self.auth_type {
            AuthType::ApiKey => self.api_key.as_deref().filter(|key| !key.is_empty()),
            AuthType::Tls => None,
        }
    }
}
