//! Credential store implementations

pub mod file;
pub mod keychain;

pub use file::FileCredentialStore;
pub use keychain::KeychainCredentialStore;
