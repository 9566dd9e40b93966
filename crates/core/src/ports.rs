//! Port interfaces for the LAPI client
//!
//! These traits define the boundaries between the session logic and the
//! infrastructure that performs HTTP calls and persists credentials.

use lapi_domain::{Request, Response, Result};

/// Executes one HTTP exchange.
///
/// Implementations must reject a request without a `User-Agent` header
/// before any network activity and must interpret [`Request::options`] the
/// same way, so strategies stay interchangeable.
pub trait Transport: Send + Sync {
    /// Send the request and return the normalized response.
    ///
    /// Non-2xx statuses are NOT errors at this level.
    fn execute(&self, request: &Request) -> Result<Response>;
}

/// Persistence for the machine identity and the current session.
///
/// Every `retrieve_*` returns `Ok(None)` when the value was never stored.
pub trait CredentialStore: Send + Sync {
    fn retrieve_machine_id(&self) -> Result<Option<String>>;

    fn retrieve_password(&self) -> Result<Option<String>>;

    fn retrieve_token(&self) -> Result<Option<String>>;

    /// Scenario set used for the last successful login.
    fn retrieve_scenarios(&self) -> Result<Option<Vec<String>>>;

    fn store_machine_id(&self, machine_id: &str) -> Result<()>;

    fn store_password(&self, password: &str) -> Result<()>;

    fn store_token(&self, token: &str) -> Result<()>;

    fn store_scenarios(&self, scenarios: &[String]) -> Result<()>;
}
