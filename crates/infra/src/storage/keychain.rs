//! Credential store backed by the platform keychain
//!
//! One keychain entry per field under the service `lapi-bouncer.<env>`.
//! Scenarios are stored as a JSON array string.

use keyring::Entry;
use lapi_core::CredentialStore;
use lapi_domain::{Environment, LapiError, Result};
use tracing::debug;

use crate::errors::InfraError;

const SERVICE_PREFIX: &str = "lapi-bouncer";

/// Keychain-backed credential store.
pub struct KeychainCredentialStore {
    service_name: String,
    machine_id: Entry,
    password: Entry,
    token: Entry,
    scenarios: Entry,
}

impl KeychainCredentialStore {
    /// Open the entries for `env`.
    ///
    /// # Errors
    /// Returns `LapiError::Storage` if the keychain cannot be accessed.
    pub fn new(env: Environment) -> Result<Self> {
        let service_name = format!("{SERVICE_PREFIX}.{env}");
        Ok(Self {
            machine_id: entry(&service_name, "machine-id")?,
            password: entry(&service_name, "password")?,
            token: entry(&service_name, "token")?,
            scenarios: entry(&service_name, "scenarios")?,
            service_name,
        })
    }

    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn get_secret(&self, entry: &Entry, key: &str) -> Result<Option<String>> {
        debug!(service = %self.service_name, key = %key, "Retrieving secret from keychain");

        match entry.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(InfraError::from(e).into()),
        }
    }

    fn set_secret(&self, entry: &Entry, key: &str, value: &str) -> Result<()> {
        debug!(service = %self.service_name, key = %key, "Storing secret in keychain");

        entry.set_password(value).map_err(|e| LapiError::from(InfraError::from(e)))
    }
}

fn entry(service_name: &str, key: &str) -> Result<Entry> {
    Entry::new(service_name, key).map_err(|e| LapiError::from(InfraError::from(e)))
}

impl CredentialStore for KeychainCredentialStore {
    fn retrieve_machine_id(&self) -> Result<Option<String>> {
        self.get_secret(&self.machine_id, "machine-id")
    }

    fn retrieve_password(&self) -> Result<Option<String>> {
        self.get_secret(&self.password, "password")
    }

    fn retrieve_token(&self) -> Result<Option<String>> {
        self.get_secret(&self.token, "token")
    }

    fn retrieve_scenarios(&self) -> Result<Option<Vec<String>>> {
        self.get_secret(&self.scenarios, "scenarios")?
            .map(|raw| {
                serde_json::from_str(&raw)
                    .map_err(|e| LapiError::Storage(format!("stored scenarios are not valid JSON: {e}")))
            })
            .transpose()
    }

    fn store_machine_id(&self, machine_id: &str) -> Result<()> {
        self.set_secret(&self.machine_id, "machine-id", machine_id)
    }

    fn store_password(&self, password: &str) -> Result<()> {
        self.set_secret(&self.password, "password", password)
    }

    fn store_token(&self, token: &str) -> Result<()> {
        self.set_secret(&self.token, "token", token)
    }

    fn store_scenarios(&self, scenarios: &[String]) -> Result<()> {
        let raw = serde_json::to_string(scenarios).map_err(|e| LapiError::Serialization(e.to_string()))?;
        self.set_secret(&self.scenarios, "scenarios", &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_store() -> KeychainCredentialStore {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        KeychainCredentialStore::new(Environment::Prod).unwrap()
    }

    #[test]
    fn service_is_namespaced_by_environment() {
        assert_eq!(mock_store().service_name(), "lapi-bouncer.prod");
    }

    #[test]
    fn absent_entries_read_as_none() {
        let store = mock_store();
        assert_eq!(store.retrieve_machine_id().unwrap(), None);
        assert_eq!(store.retrieve_scenarios().unwrap(), None);
    }

    #[test]
    fn entries_round_trip() {
        let store = mock_store();
        let scenarios = vec!["crowdsecurity/ssh-bf".to_string()];

        store.store_machine_id("machine").unwrap();
        store.store_password("password").unwrap();
        store.store_token("token").unwrap();
        store.store_scenarios(&scenarios).unwrap();

        assert_eq!(store.retrieve_machine_id().unwrap().as_deref(), Some("machine"));
        assert_eq!(store.retrieve_password().unwrap().as_deref(), Some("password"));
        assert_eq!(store.retrieve_token().unwrap().as_deref(), Some("token"));
        assert_eq!(store.retrieve_scenarios().unwrap(), Some(scenarios));
    }
}
