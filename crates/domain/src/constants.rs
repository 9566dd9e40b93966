//! Client constants
//!
//! Centralized location for the wire-level and lifecycle constants shared by
//! every crate of the workspace.

// User agent
pub const USER_AGENT_PREFIX: &str = "csrustlapi";
pub const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

// Generated credentials
pub const MACHINE_ID_LENGTH: usize = 48;
pub const PASSWORD_LENGTH: usize = 32;
pub const MACHINE_ID_CHARSET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";
pub const PASSWORD_CHARSET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// Retries (additional attempts after the first one)
pub const REGISTER_RETRY: u32 = 1;
pub const LOGIN_RETRY: u32 = 1;

// Endpoints, relative to the configured API url
pub const WATCHER_REGISTER_ENDPOINT: &str = "/watchers";
pub const WATCHER_LOGIN_ENDPOINT: &str = "/watchers/login";
pub const WATCHER_ENROLL_ENDPOINT: &str = "/watchers/enroll";
pub const DECISIONS_STREAM_ENDPOINT: &str = "/decisions/stream";
pub const DECISIONS_FILTER_ENDPOINT: &str = "/decisions";
pub const SIGNALS_ENDPOINT: &str = "/signals";

// Configuration defaults and limits
pub const DEFAULT_API_URL: &str = "http://localhost:8080/v1";
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 120;
pub const MAX_NAME_PART_LENGTH: usize = 16;

// Decision scopes
pub const SCOPE_IP: &str = "ip";
pub const SCOPE_RANGE: &str = "range";

// Headers
pub const HEADER_USER_AGENT: &str = "User-Agent";
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_API_KEY: &str = "X-Api-Key";
pub const HEADER_ACCEPT: &str = "Accept";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const JSON_MIME: &str = "application/json";

/// Separator used when a list is flattened into a single string (query
/// parameters, environment variables).
pub const SEP: &str = ",";
