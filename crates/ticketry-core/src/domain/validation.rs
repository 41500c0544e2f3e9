//! Field validation shared by the aggregates

use crate::error::{Error, Result};

/// Trim a required text field and check it against its length bound
pub(crate) fn required_text(field: &str, value: &str, max_len: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{} cannot be empty", field)));
    }
    check_length(field, trimmed, max_len)?;
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank input becomes `None`
pub(crate) fn optional_text(
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> Result<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            check_length(field, trimmed, max_len)?;
            Ok(Some(trimmed.to_string()))
        }
    }
}

fn check_length(field: &str, value: &str, max_len: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max_len {
        return Err(Error::validation(format!(
            "{} too long ({} characters, max {})",
            field, len, max_len
        )));
    }
    Ok(())
}

/// Minimal shape check for an email address: one `@` with text on both sides
///
/// Returns the address lowercased (Unicode-aware), which is the form stored
/// and compared for uniqueness.
pub(crate) fn email(value: &str, max_len: usize) -> Result<String> {
    let email = email_key(&required_text("Email", value, max_len)?);
    let mut parts = email.split('@');
    let valid = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(local), Some(domain), None)
            if !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
    );
    if !valid {
        return Err(Error::validation(format!("'{}' is not a valid email address", email)));
    }
    Ok(email)
}

/// Normalised lookup key for an email address
pub(crate) fn email_key(value: &str) -> String {
    value.trim().to_lowercase()
}
