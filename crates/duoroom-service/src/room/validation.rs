//! Input checks for names, messages and uploads.

use duoroom_core::config::RoomsConfig;
use duoroom_core::error::AppError;
use duoroom_core::result::AppResult;

/// Trim a display name and check its length.
pub fn display_name(raw: &str, limits: &RoomsConfig) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::invalid_input("Name must not be empty"));
    }
    if name.chars().count() > limits.max_name_length {
        return Err(AppError::invalid_input(format!(
            "Name must be at most {} characters",
            limits.max_name_length
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(AppError::invalid_input("Name contains control characters"));
    }
    Ok(name.to_string())
}

/// Reject blank or oversized chat messages. The content is kept as sent.
pub fn message(content: &str, limits: &RoomsConfig) -> AppResult<()> {
    if content.trim().is_empty() {
        return Err(AppError::invalid_input("Message must not be empty"));
    }
    if content.chars().count() > limits.max_message_length {
        return Err(AppError::invalid_input(format!(
            "Message must be at most {} characters",
            limits.max_message_length
        )));
    }
    Ok(())
}

/// Reject empty or oversized uploads.
pub fn upload_size(len: usize, max_bytes: u64) -> AppResult<()> {
    if len == 0 {
        return Err(AppError::invalid_input("File must not be empty"));
    }
    if len as u64 > max_bytes {
        return Err(AppError::invalid_input(format!(
            "File exceeds the {max_bytes} byte upload limit"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let limits = RoomsConfig::default();
        assert_eq!(display_name("  alice ", &limits).unwrap(), "alice");
        assert!(display_name("   ", &limits).is_err());
        assert!(display_name(&"x".repeat(65), &limits).is_err());
        assert!(display_name("a\nb", &limits).is_err());
    }

    #[test]
    fn test_message() {
        let limits = RoomsConfig::default();
        assert!(message("hi", &limits).is_ok());
        assert!(message(" \t\n", &limits).is_err());
        assert!(message(&"y".repeat(4001), &limits).is_err());
    }

    #[test]
    fn test_upload_size() {
        assert!(upload_size(0, 10).is_err());
        assert!(upload_size(10, 10).is_ok());
        assert!(upload_size(11, 10).is_err());
    }
}
