//! # LAPI Core
//!
//! Session and request logic of the LAPI bouncer client, free of any I/O.
//!
//! This crate contains:
//! - Port interfaces ([`Transport`], [`CredentialStore`])
//! - The low-level [`LapiClient`] (request building and response decoding)
//! - The [`Bouncer`] session orchestrator and its public operations
//!
//! ## Architecture Principles
//! - Only depends on `lapi-domain`
//! - No HTTP, filesystem or keychain code
//! - All external dependencies via traits

pub mod bouncer;
pub mod client;
pub mod ports;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use bouncer::Bouncer;
pub use client::LapiClient;
pub use ports::{CredentialStore, Transport};
