//! Wire-level value types

pub mod message;
pub mod options;

pub use message::{json_type_name, Headers, Method, Request, Response};
pub use options::{AuthType, TlsOptions, TransportOptions};
