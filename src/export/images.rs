//! Content-addressed image extraction.
//!
//! Attachment bytes are stored under a filename derived from the SHA-256
//! of the raw content, so identical images map to identical storage no
//! matter how they arrived.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::storage::models::{Attachment, AttachmentSource};

/// An image written into a conversation's bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Content-addressed filename, `<hash16>.<ext>`
    pub file_name: String,
}

/// First 16 hex characters of the SHA-256 of `bytes`.
pub fn content_hash16(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<String>()[..16]
        .to_string()
}

/// Extracts one image attachment into the conversation's bucket directory.
///
/// Returns `None` for non-image attachments, unrecognized URL shapes, and
/// cache references whose source file no longer exists. The write is
/// skipped when a file with the same content hash is already present.
pub fn store_attachment(
    attachment: &Attachment,
    bucket: &Path,
    cache_root: &Path,
) -> Result<Option<StoredImage>> {
    if !attachment.is_image() {
        return Ok(None);
    }

    match attachment.source() {
        Some(AttachmentSource::Inline { format, payload }) => {
            let bytes = BASE64
                .decode(payload.as_bytes())
                .context("Failed to decode inline image attachment")?;
            Ok(Some(write_content_addressed(bucket, &bytes, &format)?))
        }
        Some(AttachmentSource::CachePath(rel)) => {
            let source = cache_root.join(&rel);
            if !source.exists() {
                tracing::warn!("Cached attachment missing, skipping: {}", source.display());
                return Ok(None);
            }
            let bytes = fs::read(&source)
                .with_context(|| format!("Failed to read cached image {}", source.display()))?;
            let format = source
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("bin")
                .to_string();
            Ok(Some(write_content_addressed(bucket, &bytes, &format)?))
        }
        None => Ok(None),
    }
}

fn write_content_addressed(bucket: &Path, bytes: &[u8], ext: &str) -> Result<StoredImage> {
    fs::create_dir_all(bucket)
        .with_context(|| format!("Failed to create image directory {}", bucket.display()))?;

    let file_name = format!("{}.{}", content_hash16(bytes), ext);
    let path = bucket.join(&file_name);

    // Same hash means same content; never rewrite an existing file.
    if !path.exists() {
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write image {}", path.display()))?;
    }

    Ok(StoredImage { file_name })
}
