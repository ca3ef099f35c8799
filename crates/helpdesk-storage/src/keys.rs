//! Storage key generation for attachments.

use std::path::Path;

use uuid::Uuid;

/// Longest extension carried over from the client file name.
const MAX_EXTENSION_LEN: usize = 10;

/// Build a fresh, collision-free key for an uploaded file.
///
/// Keys look like `tickets/42/ticket-<uuid><.ext>`. Only the extension of
/// the client-supplied name is kept, lowercased, and only when it is plain
/// ASCII alphanumerics.
pub fn attachment_key(ticket_id: i64, original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| {
            !e.is_empty()
                && e.len() <= MAX_EXTENSION_LEN
                && e.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("tickets/{ticket_id}/ticket-{}{ext}", Uuid::now_v7().simple())
}
