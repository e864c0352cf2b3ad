//! File name handling shared by providers and the room registry.

use duoroom_core::error::AppError;
use duoroom_core::result::AppResult;

/// Longest file name kept after sanitizing.
const MAX_FILENAME_CHARS: usize = 255;

/// Reduce a client-supplied file name to a safe final path component.
///
/// Directory parts and control characters are dropped. Names that end up
/// empty (or are just dots) are rejected with `InvalidInput`.
pub fn sanitize_filename(raw: &str) -> AppResult<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_FILENAME_CHARS)
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        return Err(AppError::invalid_input("File name must not be empty"));
    }
    Ok(cleaned.to_string())
}

/// Guess a MIME type from a file extension.
pub fn mime_from_path(path: &str) -> Option<String> {
    let (_, ext) = path.rsplit_once('.')?;
    let mime = match ext.to_lowercase().as_str() {
        "txt" | "log" | "md" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "tar" => "application/x-tar",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "csv" => "text/csv",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => return None,
    };
    Some(mime.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\bob\\x.png").unwrap(), "x.png");
        assert_eq!(sanitize_filename("  notes.txt ").unwrap(), "notes.txt");
    }

    #[test]
    fn test_sanitize_rejects_empty() {
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename("dir/").is_err());
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("\u{0}\u{7}").is_err());
    }

    #[test]
    fn test_mime_from_path() {
        assert_eq!(mime_from_path("x.PNG").as_deref(), Some("image/png"));
        assert_eq!(mime_from_path("archive.tar.gz").as_deref(), Some("application/gzip"));
        assert_eq!(mime_from_path("Makefile"), None);
    }
}
