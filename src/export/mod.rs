//! Conversation export.
//!
//! Turns conversation records into a self-contained backup tree:
//! an `index.md`, per-conversation Markdown under `chats/<YYYY>/<MM>/`,
//! and extracted images under `images/<conversation id>/`. The tree is
//! fully regenerated on every run; files from conversations that no
//! longer exist in the database are left in place.

pub mod images;
pub mod markdown;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::notify::Notifier;
use crate::storage::models::Conversation;

pub use images::StoredImage;
pub use markdown::{file_name, sanitize_title, url_encode};

/// Writes the backup tree for one user's conversations.
pub struct Exporter {
    backup_root: PathBuf,
    /// Directory cached attachments are resolved against (the database's parent)
    cache_root: PathBuf,
}

impl Exporter {
    pub fn new(backup_root: PathBuf, db_path: &Path) -> Self {
        let cache_root = db_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        Self {
            backup_root,
            cache_root,
        }
    }

    /// Exports every conversation and writes the index.
    ///
    /// Conversations are expected in listing order (most recently updated
    /// first); the index preserves that order. Returns the number of
    /// conversations written.
    ///
    /// # Errors
    ///
    /// Any filesystem write failure aborts the export. The partial tree
    /// left behind is safe to overwrite on the next run.
    pub fn export_all(
        &self,
        conversations: &[Conversation],
        notifier: &dyn Notifier,
    ) -> Result<usize> {
        let images_root = self.backup_root.join("images");
        fs::create_dir_all(&images_root).with_context(|| {
            format!("Failed to create backup directory {}", self.backup_root.display())
        })?;

        let mut index = String::from("# Index\n\n");

        for conversation in conversations {
            let (year, month) = markdown::year_month(conversation.created_at);
            let chat_dir = self.backup_root.join("chats").join(&year).join(&month);
            fs::create_dir_all(&chat_dir)
                .with_context(|| format!("Failed to create {}", chat_dir.display()))?;

            let file_name = markdown::file_name(&conversation.title);
            index.push_str(&format!(
                "- [{}](./chats/{}/{}/{})\n",
                conversation.title,
                year,
                month,
                markdown::url_encode(&file_name)
            ));

            let content =
                markdown::render_conversation(conversation, &images_root, &self.cache_root)?;
            let path = chat_dir.join(&file_name);
            fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            notifier.status(
                &format!("Backed up {}/{}/{}", year, month, conversation.title),
                false,
            );
        }

        let index_path = self.backup_root.join("index.md");
        fs::write(&index_path, index)
            .with_context(|| format!("Failed to write {}", index_path.display()))?;

        Ok(conversations.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoopNotifier;
    use crate::storage::models::{Attachment, ChatBody, ChatMessage, MessageRole};
    use tempfile::tempdir;

    fn conversation(id: &str, title: &str, messages: Vec<ChatMessage>) -> Conversation {
        Conversation {
            id: id.to_string(),
            user_id: "u1".to_string(),
            title: title.to_string(),
            share_id: None,
            archived: false,
            pinned: false,
            created_at: 1_700_000_000,
            updated_at: 1_700_100_000,
            meta: serde_json::Value::Null,
            chat: ChatBody { messages },
        }
    }

    fn message(role: MessageRole, content: &str, timestamp: i64) -> ChatMessage {
        ChatMessage {
            role,
            content: content.to_string(),
            timestamp: Some(timestamp),
            model_name: None,
            files: Vec::new(),
        }
    }

    /// The full scenario: one conversation with an inline PNG, one plain.
    fn two_conversation_fixture() -> Vec<Conversation> {
        let mut with_image = message(MessageRole::User, "Here is a photo", 1);
        with_image.files.push(Attachment {
            kind: "image".to_string(),
            url: "data:image/png;base64,aGVsbG8=".to_string(),
            name: Some("tokyo.png".to_string()),
        });

        vec![
            conversation(
                "id1",
                "Trip: Tokyo?",
                vec![
                    with_image,
                    message(MessageRole::Assistant, "Looks great!", 2),
                ],
            ),
            conversation(
                "id2",
                "Plain talk",
                vec![
                    message(MessageRole::User, "hello", 1),
                    message(MessageRole::Assistant, "hi", 2),
                ],
            ),
        ]
    }

    #[test]
    fn test_export_scenario_produces_expected_tree() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("backup");
        let conversations = two_conversation_fixture();

        let exporter = Exporter::new(root.clone(), &dir.path().join("webui.db"));
        let count = exporter.export_all(&conversations, &NoopNotifier).unwrap();
        assert_eq!(count, 2);

        // Index has one link per conversation, in listing order
        let index = std::fs::read_to_string(root.join("index.md")).unwrap();
        let links: Vec<&str> = index.lines().filter(|l| l.starts_with("- [")).collect();
        assert_eq!(links.len(), 2);
        assert!(links[0].contains("[Trip: Tokyo?]"));
        assert!(links[0].contains("Trip_%20Tokyo_.md"));

        // The sanitized chat file exists in its year/month bucket
        let (year, month) = markdown::year_month(1_700_000_000);
        let chat_path = root
            .join("chats")
            .join(&year)
            .join(&month)
            .join("Trip_ Tokyo_.md");
        let chat = std::fs::read_to_string(&chat_path).unwrap();
        assert!(chat.contains("## 🧑 user"));
        assert!(chat.contains("## 🤖 assistant"));
        assert_eq!(chat.matches("![").count(), 1, "exactly one image reference");

        // Image bucket for id1 holds the content-addressed PNG
        let hash = images::content_hash16(b"hello");
        assert!(root.join("images").join("id1").join(format!("{hash}.png")).exists());

        // Image bucket for id2 exists but is empty
        let id2_bucket = root.join("images").join("id2");
        assert!(id2_bucket.is_dir());
        assert_eq!(std::fs::read_dir(&id2_bucket).unwrap().count(), 0);
    }

    #[test]
    fn test_reexport_is_byte_identical() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("backup");
        let conversations = two_conversation_fixture();
        let exporter = Exporter::new(root.clone(), &dir.path().join("webui.db"));

        exporter.export_all(&conversations, &NoopNotifier).unwrap();
        let (year, month) = markdown::year_month(1_700_000_000);
        let chat_path = root
            .join("chats")
            .join(&year)
            .join(&month)
            .join("Trip_ Tokyo_.md");
        let first = std::fs::read(&chat_path).unwrap();
        let first_index = std::fs::read(root.join("index.md")).unwrap();

        exporter.export_all(&conversations, &NoopNotifier).unwrap();
        assert_eq!(std::fs::read(&chat_path).unwrap(), first);
        assert_eq!(std::fs::read(root.join("index.md")).unwrap(), first_index);
    }
}
