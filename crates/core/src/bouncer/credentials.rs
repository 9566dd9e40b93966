//! Machine credential generation and staleness rules

use std::collections::HashSet;

use lapi_domain::constants::{MACHINE_ID_CHARSET, MACHINE_ID_LENGTH, PASSWORD_CHARSET, PASSWORD_LENGTH};
use lapi_domain::{LapiError, Result};
use rand::seq::SliceRandom;

/// Random string of `length` characters drawn from `charset`.
///
/// # Errors
/// `LapiError::InvalidInput` for a zero length or an empty charset.
pub fn generate_random_string(length: usize, charset: &str) -> Result<String> {
    if length == 0 {
        return Err(LapiError::InvalidInput("Length must be greater than zero".into()));
    }
    let alphabet: Vec<char> = charset.chars().collect();
    if alphabet.is_empty() {
        return Err(LapiError::InvalidInput(
            "There must be at least one allowed character.".into(),
        ));
    }

    let mut rng = rand::thread_rng();
    Ok((0..length).filter_map(|_| alphabet.choose(&mut rng)).collect())
}

/// `prefix` followed by lowercase alphanumerics, `MACHINE_ID_LENGTH` chars in
/// total.
///
/// # Errors
/// `LapiError::InvalidInput` if the prefix leaves no room for random chars.
pub fn generate_machine_id(prefix: &str) -> Result<String> {
    let random = generate_random_string(
        MACHINE_ID_LENGTH.saturating_sub(prefix.chars().count()),
        MACHINE_ID_CHARSET,
    )?;
    Ok(format!("{prefix}{random}"))
}

/// Mixed-case alphanumeric password of `PASSWORD_LENGTH` chars.
///
/// # Errors
/// Never in practice; see [`generate_random_string`].
pub fn generate_password() -> Result<String> {
    generate_random_string(PASSWORD_LENGTH, PASSWORD_CHARSET)
}

/// Stored credentials must be regenerated when either part is missing or the
/// machine id does not carry the configured prefix.
#[must_use]
pub fn should_refresh_credentials(
    machine_id: Option<&str>,
    password: Option<&str>,
    prefix: &str,
) -> bool {
    match (machine_id, password) {
        (Some(machine_id), Some(password)) if !machine_id.is_empty() && !password.is_empty() => {
            !machine_id.starts_with(prefix)
        }
        _ => true,
    }
}

/// Order-insensitive comparison of two scenario lists.
#[must_use]
pub fn are_equals(left: &[String], right: &[String]) -> bool {
    let left: HashSet<&str> = left.iter().map(String::as_str).collect();
    let right: HashSet<&str> = right.iter().map(String::as_str).collect();
    left == right
}
