//! Label name validation.
//!
//! A label is a mutable name bound to a manifest hash, stored server-side as
//! one file per label. The rules below keep a label name from escaping the
//! labels directory or colliding with anything else on disk:
//!
//! - Must be non-empty and at most [`MAX_LABEL_NAME_LEN`] bytes
//! - Must not contain `/`, `\`, or control characters
//! - Must not contain `..`
//! - Must not start with `.`

use crate::error::TypeError;

/// Maximum length of a label name in bytes.
pub const MAX_LABEL_NAME_LEN: usize = 255;

/// Validate a label name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use depot_types::validate_label_name;
///
/// assert!(validate_label_name("v1").is_ok());
/// assert!(validate_label_name("release-2024.1").is_ok());
/// assert!(validate_label_name("").is_err());
/// assert!(validate_label_name("../escape").is_err());
/// ```
pub fn validate_label_name(name: &str) -> Result<(), TypeError> {
    if name.is_empty() {
        return Err(invalid(name, "label name must not be empty"));
    }

    if name.len() > MAX_LABEL_NAME_LEN {
        return Err(invalid(name, "label name too long"));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(invalid(name, "must not contain path separators"));
    }

    if name.contains("..") {
        return Err(invalid(name, "must not contain '..'"));
    }

    if name.starts_with('.') {
        return Err(invalid(name, "must not start with '.'"));
    }

    if name.chars().any(|ch| ch.is_control()) {
        return Err(invalid(name, "must not contain control characters"));
    }

    Ok(())
}

fn invalid(name: &str, reason: &str) -> TypeError {
    TypeError::InvalidLabel {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        assert!(validate_label_name("v1").is_ok());
        assert!(validate_label_name("release-2024.1").is_ok());
        assert!(validate_label_name("nightly_build").is_ok());
        assert!(validate_label_name("a").is_ok());
    }

    #[test]
    fn reject_empty() {
        assert!(validate_label_name("").is_err());
    }

    #[test]
    fn reject_path_separators() {
        assert!(validate_label_name("a/b").is_err());
        assert!(validate_label_name("a\\b").is_err());
    }

    #[test]
    fn reject_traversal() {
        assert!(validate_label_name("..").is_err());
        assert!(validate_label_name("a..b").is_err());
    }

    #[test]
    fn reject_leading_dot() {
        assert!(validate_label_name(".hidden").is_err());
    }

    #[test]
    fn reject_control_chars() {
        assert!(validate_label_name("a\nb").is_err());
        assert!(validate_label_name("a\0b").is_err());
    }

    #[test]
    fn reject_too_long() {
        let name = "x".repeat(MAX_LABEL_NAME_LEN + 1);
        assert!(validate_label_name(&name).is_err());
        let name = "x".repeat(MAX_LABEL_NAME_LEN);
        assert!(validate_label_name(&name).is_ok());
    }
}
