//! Core data models for chatvault
//!
//! These mirror the shape of the chat-history rows the backup reads,
//! independent of any specific database engine.

use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

/// One chat session with its full message history, owned by a single user.
///
/// Read-only from the exporter's perspective; the database is the system
/// of record.
#[derive(Debug, Clone)]
pub struct Conversation {
    /// Opaque conversation id, unique within a user
    pub id: String,

    /// Owner of the conversation
    pub user_id: String,

    /// Display title
    pub title: String,

    /// Public share id, if the conversation was shared
    pub share_id: Option<String>,

    /// Whether the conversation is archived
    pub archived: bool,

    /// Whether the conversation is pinned
    pub pinned: bool,

    /// Creation time as a Unix epoch timestamp (seconds)
    pub created_at: i64,

    /// Last-update time as a Unix epoch timestamp (seconds)
    pub updated_at: i64,

    /// Free-form metadata attached by the chat application
    pub meta: Value,

    /// The nested chat body holding the ordered message list
    pub chat: ChatBody,
}

/// The JSON chat blob stored alongside each conversation row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatBody {
    /// Messages in logical order
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    /// Who sent this message
    #[serde(default)]
    pub role: MessageRole,

    /// The message text
    #[serde(default)]
    pub content: String,

    /// Logical timestamp (seconds); messages without one sort first
    #[serde(default)]
    pub timestamp: Option<i64>,

    /// Model that produced an assistant message
    #[serde(rename = "modelName", default)]
    pub model_name: Option<String>,

    /// Attached files, if any
    #[serde(default)]
    pub files: Vec<Attachment>,
}

impl ChatMessage {
    /// Sort key for rendering: messages lacking a timestamp use 0.
    pub fn sort_timestamp(&self) -> i64 {
        self.timestamp.unwrap_or(0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// A human user message.
    User,
    /// An AI assistant response.
    Assistant,
    /// A system prompt or instruction (dropped from exports).
    System,
    /// Any role this tool does not recognize.
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::System => write!(f, "system"),
            MessageRole::Unknown => write!(f, "unknown"),
        }
    }
}

/// A file descriptor attached to a message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attachment {
    /// MIME-ish type tag, e.g. "image" or "image/png"
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Data URL or cache-path reference
    #[serde(default)]
    pub url: String,

    /// Original filename supplied by the uploader
    #[serde(default)]
    pub name: Option<String>,
}

/// Where an attachment's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSource {
    /// Base64 payload embedded in a `data:image/<fmt>;base64,...` URL.
    Inline { format: String, payload: String },
    /// Relative path into the chat application's cache directory.
    CachePath(String),
}

fn data_url_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"^data:image/(\w+);base64,(.+)$").expect("valid data URL regex")
    })
}

impl Attachment {
    /// Whether this attachment is an image of any format.
    pub fn is_image(&self) -> bool {
        self.kind.starts_with("image")
    }

    /// Classifies the attachment URL, or `None` if it is neither an inline
    /// data URL nor a cache reference.
    pub fn source(&self) -> Option<AttachmentSource> {
        if let Some(caps) = data_url_re().captures(&self.url) {
            return Some(AttachmentSource::Inline {
                format: caps[1].to_string(),
                payload: caps[2].to_string(),
            });
        }
        if self.url.starts_with("/cache/") {
            return Some(AttachmentSource::CachePath(
                self.url.trim_start_matches('/').to_string(),
            ));
        }
        None
    }
}
