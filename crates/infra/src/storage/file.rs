//! Credential store backed by one small JSON file per field.
//!
//! Files are named `<env>-<field>.json` and hold a single-key object, e.g.
//! `dev-machine-id.json` → `{"machine_id": "..."}`. A missing file means the
//! field was never stored.

use std::fs;
use std::path::{Path, PathBuf};

use lapi_core::CredentialStore;
use lapi_domain::{Environment, LapiError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::InfraError;

const MACHINE_ID_FILE: (&str, &str) = ("machine-id", "machine_id");
const PASSWORD_FILE: (&str, &str) = ("password", "password");
const TOKEN_FILE: (&str, &str) = ("token", "token");
const SCENARIOS_FILE: (&str, &str) = ("scenarios", "scenarios");

/// JSON-file credential store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    dir: PathBuf,
    env: Environment,
}

impl FileCredentialStore {
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>, env: Environment) -> Self {
        Self { dir: dir.into(), env }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `field`.
    #[must_use]
    pub fn path_for(&self, field: &str) -> PathBuf {
        self.dir.join(format!("{}-{field}.json", self.env))
    }

    fn read<T: DeserializeOwned>(&self, (field, key): (&str, &str)) -> Result<Option<T>> {
        let path = self.path_for(field);
        if !path.exists() {
            return Ok(None);
        }

        debug!(path = %path.display(), "reading credential file");
        let contents = fs::read_to_string(&path).map_err(|e| LapiError::from(InfraError::from(e)))?;
        let document: Value = serde_json::from_str(&contents).map_err(|e| {
            LapiError::Storage(format!("{} is not valid JSON: {e}", path.display()))
        })?;

        match document.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                LapiError::Storage(format!("unexpected \"{key}\" in {}: {e}", path.display()))
            }),
        }
    }

    fn write<T: Serialize + ?Sized>(&self, (field, key): (&str, &str), value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| LapiError::from(InfraError::from(e)))?;

        let mut document = Map::new();
        document.insert(
            key.to_string(),
            serde_json::to_value(value).map_err(|e| LapiError::Serialization(e.to_string()))?,
        );
        let contents = serde_json::to_string(&document)
            .map_err(|e| LapiError::Serialization(e.to_string()))?;

        let path = self.path_for(field);
        debug!(path = %path.display(), "writing credential file");
        fs::write(&path, contents).map_err(|e| LapiError::from(InfraError::from(e)))?;
        restrict_permissions(&path)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| LapiError::from(InfraError::from(e)))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

impl CredentialStore for FileCredentialStore {
    fn retrieve_machine_id(&self) -> Result<Option<String>> {
        self.read(MACHINE_ID_FILE)
    }

    fn retrieve_password(&self) -> Result<Option<String>> {
        self.read(PASSWORD_FILE)
    }

    fn retrieve_token(&self) -> Result<Option<String>> {
        self.read(TOKEN_FILE)
    }

    fn retrieve_scenarios(&self) -> Result<Option<Vec<String>>> {
        self.read(SCENARIOS_FILE)
    }

    fn store_machine_id(&self, machine_id: &str) -> Result<()> {
        self.write(MACHINE_ID_FILE, machine_id)
    }

    fn store_password(&self, password: &str) -> Result<()> {
        self.write(PASSWORD_FILE, password)
    }

    fn store_token(&self, token: &str) -> Result<()> {
        self.write(TOKEN_FILE, token)
    }

    fn store_scenarios(&self, scenarios: &[String]) -> Result<()> {
        self.write(SCENARIOS_FILE, scenarios)
    }
}
