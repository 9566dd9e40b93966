//! In-memory test doubles for the core ports.
//!
//! Available in unit tests and, through the `test-utils` feature, to other
//! crates of the workspace.

use std::collections::VecDeque;
use std::sync::Arc;

use lapi_domain::{Headers, Request, Response, Result, TransportError};
use parking_lot::Mutex;
use serde_json::Value;

use crate::ports::{CredentialStore, Transport};

/// Snapshot of everything a [`MemoryCredentialStore`] holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredCredentials {
    pub machine_id: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub scenarios: Option<Vec<String>>,
}

/// Credential store backed by a shared in-memory struct.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    storage: Arc<Mutex<StoredCredentials>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed machine id and password.
    #[must_use]
    pub fn with_credentials(self, machine_id: &str, password: &str) -> Self {
        {
            let mut storage = self.storage.lock();
            storage.machine_id = Some(machine_id.to_string());
            storage.password = Some(password.to_string());
        }
        self
    }

    /// Seed a token together with the scenarios it was obtained for.
    #[must_use]
    pub fn with_session(self, token: &str, scenarios: &[&str]) -> Self {
        {
            let mut storage = self.storage.lock();
            storage.token = Some(token.to_string());
            storage.scenarios = Some(scenarios.iter().map(ToString::to_string).collect());
        }
        self
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> StoredCredentials {
        self.storage.lock().clone()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn retrieve_machine_id(&self) -> Result<Option<String>> {
        Ok(self.storage.lock().machine_id.clone())
    }

    fn retrieve_password(&self) -> Result<Option<String>> {
        Ok(self.storage.lock().password.clone())
    }

    fn retrieve_token(&self) -> Result<Option<String>> {
        Ok(self.storage.lock().token.clone())
    }

    fn retrieve_scenarios(&self) -> Result<Option<Vec<String>>> {
        Ok(self.storage.lock().scenarios.clone())
    }

    fn store_machine_id(&self, machine_id: &str) -> Result<()> {
        self.storage.lock().machine_id = Some(machine_id.to_string());
        Ok(())
    }

    fn store_password(&self, password: &str) -> Result<()> {
        self.storage.lock().password = Some(password.to_string());
        Ok(())
    }

    fn store_token(&self, token: &str) -> Result<()> {
        self.storage.lock().token = Some(token.to_string());
        Ok(())
    }

    fn store_scenarios(&self, scenarios: &[String]) -> Result<()> {
        self.storage.lock().scenarios = Some(scenarios.to_vec());
        Ok(())
    }
}

/// Transport that replays queued responses and records every request.
///
/// Once the queue is empty, calls fail with a `CallFailed` transport error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<std::result::Result<Response, TransportError>>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response.
    pub fn push_response(&self, status: u16, body: &str) {
        self.responses.lock().push_back(Ok(Response::new(status, body, Headers::new())));
    }

    /// Queue a response whose body is the given JSON value.
    pub fn push_json(&self, status: u16, body: &Value) {
        self.push_response(status, &body.to_string());
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Requests executed so far, oldest first.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    /// Number of queued responses not consumed yet.
    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &Request) -> Result<Response> {
        if !request.headers().contains(lapi_domain::constants::HEADER_USER_AGENT) {
            return Err(TransportError::MissingUserAgent.into());
        }

        self.requests.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::CallFailed("no scripted response left".into())))
            .map_err(Into::into)
    }
}
