use anyhow::{Result, anyhow};
use std::path::Path;

/// Name used when a multipart part carries no filename
pub const FALLBACK_FILENAME: &str = "unnamed";

#[derive(Debug, Clone)]
pub struct InvalidName {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for InvalidName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for InvalidName {}

/// Makes an uploaded filename safe to embed in an object key.
/// Path components and control characters are dropped; everything else is
/// kept exactly as the client sent it.
pub fn sanitize_filename(filename: &str) -> Result<String> {
    // Get only the filename component (remove any path)
    let name = Path::new(&filename.replace('\\', "/"))
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string();

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path components stripped from filename: {}", filename);
    }

    let sanitized: String = name.chars().filter(|c| !c.is_control()).collect();

    if sanitized.trim().is_empty() || sanitized == "." || sanitized == ".." {
        return Err(anyhow!(InvalidName {
            code: "INVALID_FILENAME",
            message: format!("Filename '{}' is not usable", filename),
        }));
    }

    // Limit length safely for UTF-8
    let mut end = sanitized.len().min(255);
    while !sanitized.is_char_boundary(end) {
        end -= 1;
    }

    Ok(sanitized[..end].to_string())
}

/// Checks that a folder name is a single, non-empty key segment
pub fn validate_folder_name(name: &str) -> std::result::Result<(), validator::ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." || trimmed.contains('/') {
        let mut err = validator::ValidationError::new("invalid_folder_name");
        err.message = Some(format!("'{}' is not a valid folder name", name).into());
        return Err(err);
    }
    Ok(())
}
