//! Attachment configuration.

use serde::{Deserialize, Serialize};

/// Limits and allow-lists applied to ticket attachments.
///
/// A file is accepted when **either** its extension or its declared
/// content type appears in the corresponding list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentConfig {
    /// Root directory of the local attachment store.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Maximum number of files in one upload call.
    #[serde(default = "default_max_files")]
    pub max_files_per_upload: usize,
    /// Maximum size of a single file in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    /// Stored content types are truncated to this many characters.
    #[serde(default = "default_content_type_max_len")]
    pub content_type_max_len: usize,
    /// Accepted lowercase file extensions, without the dot.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    /// Accepted declared content types.
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<String>,
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            max_files_per_upload: default_max_files(),
            max_file_size_bytes: default_max_file_size(),
            content_type_max_len: default_content_type_max_len(),
            allowed_extensions: default_allowed_extensions(),
            allowed_content_types: default_allowed_content_types(),
        }
    }
}

fn default_root_path() -> String {
    "./data/attachments".to_string()
}

fn default_max_files() -> usize {
    5
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_content_type_max_len() -> usize {
    50
}

fn default_allowed_extensions() -> Vec<String> {
    [
        "jpeg", "jpg", "png", "gif", "bmp", "svg", "pdf", "doc", "docx", "xls", "xlsx", "txt",
        "zip", "rar", "7z", "csv", "ppt", "pptx",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_allowed_content_types() -> Vec<String> {
    [
        "image/jpeg",
        "image/jpg",
        "image/png",
        "image/gif",
        "image/bmp",
        "image/svg+xml",
        "application/pdf",
        "application/msword",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "application/vnd.ms-excel",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "application/vnd.ms-powerpoint",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "text/plain",
        "text/csv",
        "application/zip",
        "application/x-zip-compressed",
        "application/x-rar-compressed",
        "application/x-7z-compressed",
        "application/octet-stream",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
