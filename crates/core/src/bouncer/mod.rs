//! Session orchestration for the watcher ("bouncer") identity
//!
//! [`Bouncer`] owns the authentication lifecycle:
//!
//! 1. `ensure_register` generates and registers machine credentials when the
//!    stored ones are missing or carry the wrong prefix.
//! 2. `ensure_auth` logs in when there is no token, when a login is forced,
//!    or when the configured scenarios changed since the last login.
//! 3. `manage_request` attaches the bearer token and retries the whole
//!    login + request cycle on a 401, at most `LOGIN_RETRY` times.
//!
//! Every public operation funnels through `manage_request`. Retries happen
//! immediately, without backoff.

pub mod credentials;
pub mod tags;

use std::sync::Arc;

use lapi_domain::constants::{
    DECISIONS_FILTER_ENDPOINT, DECISIONS_STREAM_ENDPOINT, HEADER_AUTHORIZATION, HEADER_USER_AGENT,
    LOGIN_RETRY, REGISTER_RETRY, SIGNALS_ENDPOINT, WATCHER_ENROLL_ENDPOINT, WATCHER_LOGIN_ENDPOINT,
    WATCHER_REGISTER_ENDPOINT,
};
use lapi_domain::{Configuration, Headers, LapiError, Method, Result};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, instrument, warn};

pub use self::credentials::{
    are_equals, generate_machine_id, generate_password, generate_random_string,
    should_refresh_credentials,
};
pub use self::tags::normalize_tags;
use crate::client::LapiClient;
use crate::ports::{CredentialStore, Transport};

/// Authenticated LAPI client for a watcher machine.
pub struct Bouncer {
    config: Configuration,
    client: LapiClient,
    store: Arc<dyn CredentialStore>,
}

impl Bouncer {
    /// Create a bouncer from a validated configuration.
    pub fn new(
        config: Configuration,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        let client = LapiClient::new(&config, transport);
        Self { config, client, store }
    }

    /// Validated configuration this bouncer was built with.
    pub const fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Low-level client, for requests this type has no helper for.
    pub const fn client(&self) -> &LapiClient {
        &self.client
    }

    /// Fetch the decision stream.
    ///
    /// `startup=true` is only sent when `startup` is set; `filter` entries
    /// (`scopes`, `origins`, `scenarios_containing`, ...) become query
    /// parameters.
    ///
    /// # Errors
    /// Any error of [`Bouncer::manage_request`].
    #[instrument(skip(self, filter))]
    pub fn get_stream_decisions(&self, startup: bool, filter: Map<String, Value>) -> Result<Value> {
        let mut parameters = filter;
        if startup {
            parameters.insert("startup".into(), Value::String("true".into()));
        }
        self.manage_request(Method::Get, DECISIONS_STREAM_ENDPOINT, Value::Object(parameters))
    }

    /// Fetch decisions matching `filter`.
    ///
    /// # Errors
    /// Any error of [`Bouncer::manage_request`].
    #[instrument(skip(self, filter))]
    pub fn get_filtered_decisions(&self, filter: Map<String, Value>) -> Result<Value> {
        self.manage_request(Method::Get, DECISIONS_FILTER_ENDPOINT, Value::Object(filter))
    }

    /// Push signals; the body is the JSON array of `signals`.
    ///
    /// # Errors
    /// Any error of [`Bouncer::manage_request`].
    #[instrument(skip(self, signals), fields(count = signals.len()))]
    pub fn push_signals(&self, signals: &[Value]) -> Result<Value> {
        self.manage_request(Method::Post, SIGNALS_ENDPOINT, Value::Array(signals.to_vec()))
    }

    /// Enroll this watcher on the console.
    ///
    /// # Errors
    /// `LapiError::InvalidTag` before any network call if a tag is not a
    /// non-empty string; otherwise any error of [`Bouncer::manage_request`].
    #[instrument(skip(self, attachment_key, tags))]
    pub fn enroll(
        &self,
        name: &str,
        overwrite: bool,
        attachment_key: &str,
        tags: &[Value],
    ) -> Result<Value> {
        let tags = normalize_tags(tags)?;
        let parameters = json!({
            "name": name,
            "overwrite": overwrite,
            "attachment_key": attachment_key,
            "tags": tags,
        });
        self.manage_request(Method::Post, WATCHER_ENROLL_ENDPOINT, parameters)
    }

    /// Register fresh credentials if the stored ones are stale.
    ///
    /// Returns `true` when credentials were regenerated, in which case any
    /// stored token belongs to the previous identity.
    ///
    /// # Errors
    /// Storage errors, or the last registration error once `REGISTER_RETRY`
    /// retries are spent.
    pub fn ensure_register(&self) -> Result<bool> {
        let machine_id = self.store.retrieve_machine_id()?;
        let password = self.store.retrieve_password()?;

        if !should_refresh_credentials(
            machine_id.as_deref(),
            password.as_deref(),
            self.config.machine_id_prefix(),
        ) {
            return Ok(false);
        }

        let machine_id = generate_machine_id(self.config.machine_id_prefix())?;
        let password = generate_password()?;
        self.store.store_machine_id(&machine_id)?;
        self.store.store_password(&password)?;

        self.register_with_retry(&machine_id, &password)?;
        info!(machine_id = %machine_id, "watcher registered");
        Ok(true)
    }

    /// Make sure a token is stored, logging in when needed.
    ///
    /// # Errors
    /// Storage errors, login errors, or `LapiError::MissingToken` when the
    /// login response carries no token.
    pub fn ensure_auth(&self, force: bool) -> Result<()> {
        let token = self.store.retrieve_token()?.filter(|token| !token.is_empty());
        let scenarios_changed = self
            .store
            .retrieve_scenarios()?
            .map_or(true, |stored| !are_equals(&stored, self.config.scenarios()));

        if token.is_some() && !force && !scenarios_changed {
            return Ok(());
        }

        debug!(force, scenarios_changed, has_token = token.is_some(), "logging in");

        let machine_id = self
            .store
            .retrieve_machine_id()?
            .ok_or_else(|| LapiError::Storage("machine id is not stored".into()))?;
        let password = self
            .store
            .retrieve_password()?
            .ok_or_else(|| LapiError::Storage("password is not stored".into()))?;

        let token = self.login(&machine_id, &password)?;
        self.store.store_token(&token)?;
        self.store.store_scenarios(self.config.scenarios())?;
        info!(machine_id = %machine_id, "watcher logged in");
        Ok(())
    }

    /// `POST /watchers` with `{machine_id, password}`.
    ///
    /// # Errors
    /// Any error of [`LapiClient::send`].
    pub fn register(&self, machine_id: &str, password: &str) -> Result<Value> {
        let parameters = json!({ "machine_id": machine_id, "password": password });
        self.client.send(Method::Post, WATCHER_REGISTER_ENDPOINT, parameters, self.user_agent_headers())
    }

    /// `POST /watchers/login`; returns the bearer token.
    ///
    /// # Errors
    /// Any error of [`LapiClient::send`], or `LapiError::MissingToken`.
    pub fn login(&self, machine_id: &str, password: &str) -> Result<String> {
        let parameters = json!({
            "password": password,
            "machine_id": machine_id,
            "scenarios": self.config.scenarios(),
        });
        let response =
            self.client.send(Method::Post, WATCHER_LOGIN_ENDPOINT, parameters, self.user_agent_headers())?;

        response
            .get("token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(ToString::to_string)
            .ok_or(LapiError::MissingToken)
    }

    /// `Authorization: Bearer <token>` from the stored token.
    ///
    /// # Errors
    /// `LapiError::TokenRequired` when no token is stored.
    pub fn handle_token_header(&self) -> Result<Headers> {
        let token = self
            .store
            .retrieve_token()?
            .filter(|token| !token.is_empty())
            .ok_or(LapiError::TokenRequired)?;
        Ok(Headers::new().with(HEADER_AUTHORIZATION, format!("Bearer {token}")))
    }

    /// Run an authenticated request, re-authenticating on 401.
    ///
    /// # Errors
    /// Non-401 errors are returned as soon as they happen. After
    /// `LOGIN_RETRY + 1` unauthorized attempts,
    /// `LapiError::LoginRetriesExhausted` wraps the last one.
    pub fn manage_request(&self, method: Method, endpoint: &str, parameters: Value) -> Result<Value> {
        let attempts = LOGIN_RETRY + 1;
        let mut force_login = false;
        let mut last_error = LapiError::TokenRequired;

        for attempt in 1..=attempts {
            match self.authenticated_call(method, endpoint, &parameters, force_login) {
                Ok(value) => return Ok(value),
                Err(err) if err.is_unauthorized() => {
                    warn!(attempt, %method, endpoint, error = %err, "unauthorized, forcing a new login");
                    force_login = true;
                    last_error = err;
                }
                Err(err) => return Err(err),
            }
        }

        error!(attempts, %method, endpoint, "login retries exhausted");
        Err(LapiError::LoginRetriesExhausted { attempts, source: Box::new(last_error) })
    }

    fn authenticated_call(
        &self,
        method: Method,
        endpoint: &str,
        parameters: &Value,
        force_login: bool,
    ) -> Result<Value> {
        let refreshed = self.ensure_register()?;
        self.ensure_auth(force_login || refreshed)?;

        let mut headers = self.user_agent_headers();
        headers.extend(self.handle_token_header()?);
        self.client.send(method, endpoint, parameters.clone(), headers)
    }

    fn register_with_retry(&self, machine_id: &str, password: &str) -> Result<()> {
        let attempts = REGISTER_RETRY + 1;
        let mut attempt = 1;
        loop {
            match self.register(machine_id, password) {
                Ok(_) => return Ok(()),
                Err(err) if attempt < attempts => {
                    warn!(attempt, error = %err, "registration failed, retrying");
                    attempt += 1;
                }
                Err(err) => {
                    error!(attempts, error = %err, "registration failed");
                    return Err(err);
                }
            }
        }
    }

    fn user_agent_headers(&self) -> Headers {
        Headers::new().with(HEADER_USER_AGENT, self.config.user_agent())
    }
}
