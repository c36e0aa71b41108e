//! Markdown rendering for conversations.

use anyhow::Result;
use chrono::{Local, TimeZone};
use std::fs;
use std::path::Path;

use super::images;
use crate::storage::models::{ChatMessage, Conversation, MessageRole};

/// Characters that cannot appear in filenames on common filesystems.
const ILLEGAL_FILENAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Maximum title length before truncation, counted in characters.
const MAX_TITLE_CHARS: usize = 100;

/// Formats an epoch timestamp as `YYYY-MM-DD HH:MM:SS` in local time.
pub fn format_timestamp(epoch: i64) -> String {
    match Local.timestamp_opt(epoch, 0).single() {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "unknown".to_string(),
    }
}

/// Year and month buckets (`"2024"`, `"03"`) for a creation timestamp.
pub fn year_month(epoch: i64) -> (String, String) {
    match Local.timestamp_opt(epoch, 0).single() {
        Some(t) => (t.format("%Y").to_string(), t.format("%m").to_string()),
        None => ("0000".to_string(), "00".to_string()),
    }
}

/// Replaces filesystem-illegal characters and truncates long titles.
///
/// Idempotent on titles that are already legal and short enough. The
/// result never exceeds 100 characters (97 plus a `...` marker when
/// truncation happened).
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if ILLEGAL_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect();

    if cleaned.chars().count() > MAX_TITLE_CHARS {
        let mut truncated: String = cleaned.chars().take(MAX_TITLE_CHARS - 3).collect();
        truncated.push_str("...");
        truncated
    } else {
        cleaned
    }
}

/// The on-disk Markdown filename for a conversation title.
pub fn file_name(title: &str) -> String {
    format!("{}.md", sanitize_title(title))
}

/// Percent-encodes a filename so index links stay valid.
///
/// Keeps the RFC 3986 unreserved set literal; everything else is encoded
/// byte-wise.
pub fn url_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Renders one conversation to Markdown, extracting image attachments
/// into `images_root/<conversation id>/` as a side effect.
///
/// Messages are emitted in ascending logical-timestamp order (missing
/// timestamps sort first); system messages and unrecognized roles are
/// dropped. The conversation's image bucket is created even when no
/// message carries an attachment.
pub fn render_conversation(
    conversation: &Conversation,
    images_root: &Path,
    cache_root: &Path,
) -> Result<String> {
    let mut md = format!("# {}\n\n", conversation.title);
    md.push_str("---\n");
    md.push_str(&format!(
        "Created: {}\n",
        format_timestamp(conversation.created_at)
    ));
    md.push_str(&format!(
        "Updated: {}\n",
        format_timestamp(conversation.updated_at)
    ));
    md.push_str("---\n\n");

    let bucket = images_root.join(&conversation.id);
    fs::create_dir_all(&bucket)?;

    let mut messages: Vec<&ChatMessage> = conversation.chat.messages.iter().collect();
    messages.sort_by_key(|m| m.sort_timestamp());

    for msg in messages {
        let heading = match msg.role {
            MessageRole::User => "🧑 user".to_string(),
            MessageRole::Assistant => {
                format!("🤖 {}", msg.model_name.as_deref().unwrap_or("assistant"))
            }
            MessageRole::System | MessageRole::Unknown => continue,
        };

        let mut content = msg.content.clone();
        for attachment in &msg.files {
            if let Some(stored) = images::store_attachment(attachment, &bucket, cache_root)? {
                let label = attachment.name.as_deref().unwrap_or(&stored.file_name);
                // Chat files live three levels deep under chats/<YYYY>/<MM>/
                content.push_str(&format!(
                    "\n\n![{label}](../../../images/{}/{})\n",
                    conversation.id, stored.file_name
                ));
            }
        }

        md.push_str(&format!("## {heading}\n\n{content}\n\n"));
    }

    Ok(md)
}
