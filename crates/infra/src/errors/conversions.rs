//! Conversions from external infrastructure errors into domain errors.

use keyring::Error as KeyringError;
use lapi_domain::{LapiError, TransportError};
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub LapiError);

impl From<InfraError> for LapiError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<LapiError> for InfraError {
    fn from(value: LapiError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoLapiError {
    fn into_lapi(self) -> LapiError;
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → LapiError */
/* -------------------------------------------------------------------------- */

impl IntoLapiError for KeyringError {
    fn into_lapi(self) -> LapiError {
        use KeyringError::{
            Ambiguous, BadEncoding, Invalid, NoEntry, NoStorageAccess, PlatformFailure, TooLong,
        };

        let description = self.to_string();

        let message = match self {
            NoEntry => "keychain entry not found".into(),
            BadEncoding(_) => "credential in keychain is not valid UTF-8".into(),
            TooLong(name, limit) => {
                format!("keychain attribute '{name}' exceeds platform limit ({limit})")
            }
            Invalid(attr, reason) => format!("keychain attribute '{attr}' is invalid: {reason}"),
            Ambiguous(entries) => {
                format!("multiple keychain entries matched request ({} results)", entries.len())
            }
            PlatformFailure(err) => format!("keychain platform error: {err}"),
            NoStorageAccess(err) => format!("unable to access secure storage: {err}"),
            _ => description,
        };
        LapiError::Storage(message)
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        Self(value.into_lapi())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → LapiError */
/* -------------------------------------------------------------------------- */

impl IntoLapiError for HttpError {
    fn into_lapi(self) -> LapiError {
        if self.is_builder() {
            return TransportError::Setup(self.to_string()).into();
        }

        if self.is_timeout() {
            return TransportError::CallFailed(format!("request timed out: {self}")).into();
        }

        if self.is_connect() {
            return TransportError::CallFailed(format!("connection failure: {self}")).into();
        }

        TransportError::CallFailed(self.to_string()).into()
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_lapi())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → LapiError */
/* -------------------------------------------------------------------------- */

impl IntoLapiError for std::io::Error {
    fn into_lapi(self) -> LapiError {
        LapiError::Storage(format!("{:?}: {self}", self.kind()))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        Self(value.into_lapi())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
