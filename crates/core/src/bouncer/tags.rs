//! Enrollment tag normalization

use lapi_domain::{json_type_name, LapiError, Result};
use serde_json::Value;

/// Validate tags and drop duplicates, keeping the first occurrence.
///
/// # Errors
/// `LapiError::InvalidTag` if any tag is not a string or is empty.
pub fn normalize_tags(tags: &[Value]) -> Result<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let Value::String(tag) = tag else {
            return Err(LapiError::InvalidTag(format!(
                "Tag must be a string: {} given",
                json_type_name(tag)
            )));
        };
        if tag.is_empty() {
            return Err(LapiError::InvalidTag("Tag must not be empty".into()));
        }
        if !normalized.contains(tag) {
            normalized.push(tag.clone());
        }
    }
    Ok(normalized)
}
