//! Inbound frame checks applied before parsing.

use duoroom_core::error::AppError;

/// Base64 expands 3 bytes into 4 characters.
pub fn base64_len(bytes: u64) -> usize {
    usize::try_from(bytes.div_ceil(3) * 4).unwrap_or(usize::MAX)
}

/// Largest text frame accepted: the plain frame limit plus room for a
/// base64 upload of the maximum size.
pub fn max_inbound_bytes(max_frame_bytes: usize, max_upload_bytes: u64) -> usize {
    max_frame_bytes.saturating_add(base64_len(max_upload_bytes))
}

/// Validates an inbound text frame.
pub fn validate_inbound(raw: &str, max_bytes: usize) -> Result<(), AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::invalid_input(format!(
            "Message exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::invalid_input("Empty message"));
    }

    Ok(())
}
