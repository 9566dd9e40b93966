//! # LAPI Domain
//!
//! Value types shared by every crate of the LAPI bouncer client.
//!
//! This crate contains:
//! - Request/Response message model and transport options
//! - Client configuration and its validation
//! - Error types and Result definitions
//! - Wire and lifecycle constants
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - Only external dependencies allowed
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
