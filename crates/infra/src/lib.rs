//! # LAPI Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - HTTP transports on `reqwest` (blocking and runtime-driven)
//! - Credential stores (JSON files, platform keychain)
//! - Configuration loading from the environment and files
//!
//! ## Architecture
//! - Implements traits defined in `lapi-core`
//! - Depends on `lapi-domain` and `lapi-core`
//! - Contains all "impure" code (network, filesystem, keychain)

pub mod config;
pub mod errors;
pub mod factory;
pub mod http;
pub mod storage;

// Re-export commonly used items
pub use errors::InfraError;
pub use factory::{build_bouncer, open_credential_store, StoreLocation};
pub use http::{BlockingTransport, RuntimeTransport, TransportKind};
pub use storage::{FileCredentialStore, KeychainCredentialStore};
