//! Package name validation.
//!
//! Package names double as directory names under the packages root, so the
//! accepted alphabet is deliberately small: ASCII letters, digits, `_`, `-`
//! and `.`, starting with a letter or digit, at most [`MAX_NAME_LEN`] bytes.

use crate::error::PackageError;

/// Longest accepted package name, in bytes.
pub const MAX_NAME_LEN: usize = 64;

/// Returns true if `name` is an acceptable package name.
pub fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    let Some(&first) = bytes.first() else {
        return false;
    };
    if bytes.len() > MAX_NAME_LEN || !first.is_ascii_alphanumeric() {
        return false;
    }
    bytes
        .iter()
        .all(|&b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
}

/// Validate a package name, returning `InvalidName` if it is rejected.
pub fn validate_name(name: &str) -> Result<(), PackageError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(PackageError::InvalidName(name.to_string()))
    }
}

/// Validate a name that may be absent. A missing name is always invalid.
pub fn validate_optional_name(name: Option<&str>) -> Result<&str, PackageError> {
    match name {
        Some(name) => validate_name(name).map(|()| name),
        None => Err(PackageError::InvalidName(String::new())),
    }
}
