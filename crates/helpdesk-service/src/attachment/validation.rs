//! Upload batch checks: file count, per-file size and the type allow-list.

use std::path::Path;

use bytes::Bytes;

use helpdesk_core::config::AttachmentConfig;
use helpdesk_core::error::{AppError, FieldViolation};
use helpdesk_core::result::AppResult;

/// One file received from the client.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Client-supplied file name, kept for display and download.
    pub file_name: String,
    /// Declared content type, if any.
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl IncomingFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            data,
        }
    }
}

/// Whether a file may be stored.
///
/// Accepted when the lowercased extension **or** the declared content type
/// (parameters stripped) is on the allow-list.
pub fn is_allowed(config: &AttachmentConfig, file_name: &str, content_type: Option<&str>) -> bool {
    let extension_ok = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| config.allowed_extensions.iter().any(|a| *a == e));

    let content_type_ok = content_type
        .map(|ct| ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
        .is_some_and(|ct| config.allowed_content_types.iter().any(|a| *a == ct));

    extension_ok || content_type_ok
}

/// Cut a content type down to at most `max_len` characters.
pub fn truncate_content_type(content_type: &str, max_len: usize) -> String {
    content_type.chars().take(max_len).collect()
}

/// Check a whole batch, reporting every problem at once.
pub fn validate_batch(config: &AttachmentConfig, files: &[IncomingFile]) -> AppResult<()> {
    if files.is_empty() {
        return Err(AppError::invalid_fields(vec![FieldViolation::new(
            "files",
            "No files were uploaded",
        )]));
    }

    let mut violations = Vec::new();
    if files.len() > config.max_files_per_upload {
        violations.push(FieldViolation::new(
            "files",
            format!(
                "At most {} files may be uploaded at once, got {}",
                config.max_files_per_upload,
                files.len()
            ),
        ));
    }

    for (i, file) in files.iter().enumerate() {
        let field = format!("files[{i}]");
        if file.data.len() as u64 > config.max_file_size_bytes {
            violations.push(FieldViolation::new(
                field.clone(),
                format!(
                    "'{}' exceeds the {} byte limit",
                    file.file_name, config.max_file_size_bytes
                ),
            ));
        }
        if !is_allowed(config, &file.file_name, file.content_type.as_deref()) {
            violations.push(FieldViolation::new(
                field,
                format!("'{}' is not an accepted file type", file.file_name),
            ));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(AppError::invalid_fields(violations))
    }
}
