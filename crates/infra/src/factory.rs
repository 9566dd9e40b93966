//! Wiring of the concrete adapters into a [`Bouncer`].

use std::path::PathBuf;
use std::sync::Arc;

use lapi_core::{Bouncer, CredentialStore};
use lapi_domain::{Configuration, Result};
use tracing::info;

use crate::http::TransportKind;
use crate::storage::{FileCredentialStore, KeychainCredentialStore};

/// Where credentials are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// One JSON file per field under the directory.
    Directory(PathBuf),
    /// Platform keychain, one entry per field.
    Keychain,
}

/// Open the credential store for the configured environment.
///
/// # Errors
/// Returns `LapiError::Storage` if the keychain cannot be accessed.
pub fn open_credential_store(
    config: &Configuration,
    location: StoreLocation,
) -> Result<Arc<dyn CredentialStore>> {
    match location {
        StoreLocation::Directory(dir) => {
            info!(dir = %dir.display(), env = %config.env(), "using file credential store");
            Ok(Arc::new(FileCredentialStore::new(dir, config.env())))
        }
        StoreLocation::Keychain => {
            let store = KeychainCredentialStore::new(config.env())?;
            info!(service = %store.service_name(), "using keychain credential store");
            Ok(Arc::new(store))
        }
    }
}

/// Build a bouncer on the selected transport strategy.
pub fn build_bouncer(
    config: Configuration,
    kind: TransportKind,
    store: Arc<dyn CredentialStore>,
) -> Bouncer {
    info!(transport = %kind, api_url = %config.api_url(), "building bouncer");
    Bouncer::new(config, kind.build(), store)
}
