//! Secret detection for structured log fields.

/// Checks if a key/variable name likely refers to a secret.
///
/// Uses case-insensitive pattern matching to detect common secret-related
/// naming conventions, including the AWS credential variables.
///
/// # Examples
///
/// ```
/// use instance_catalog_shared::is_secret_key;
///
/// assert!(is_secret_key("AWS_SECRET_ACCESS_KEY"));
/// assert!(is_secret_key("sessionToken"));
/// assert!(!is_secret_key("region"));
/// ```
pub fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_uppercase();
    key.contains("KEY")
        || key.contains("TOKEN")
        || key.contains("SECRET")
        || key.contains("PASSWORD")
        || key.contains("CREDENTIAL")
        || key.contains("AUTH")
}

/// The redacted placeholder string.
pub const REDACTED: &str = "[REDACTED]";
