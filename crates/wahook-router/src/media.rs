// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media relay: pull an attachment out of the session and re-expose it.
//!
//! The attachment is downloaded into an anonymous temp file, optionally
//! inlined as base64 and optionally re-uploaded to blob storage under a
//! fresh `<uuid>.<ext>` name. Every failure degrades to empty outputs.

use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, error};

use wahook_core::event::MediaMessage;
use wahook_core::types::MediaKind;
use wahook_core::{BlobStorage, SessionRuntime, WahookError};

pub const DEFAULT_MEDIA_TIMEOUT: Duration = Duration::from_secs(60);

/// What the relay produced. Either field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayedMedia {
    pub url: String,
    pub base64: String,
}

pub struct MediaRelay {
    blob: Option<Arc<dyn BlobStorage>>,
    timeout: Duration,
}

impl MediaRelay {
    pub fn new(blob: Option<Arc<dyn BlobStorage>>, timeout: Duration) -> Self {
        Self { blob, timeout }
    }

    /// Download `media` and produce its inline body and/or re-hosted URL.
    pub async fn fetch(
        &self,
        session: &dyn SessionRuntime,
        media: &MediaMessage,
        kind: MediaKind,
        inline: bool,
    ) -> RelayedMedia {
        let mut relayed = RelayedMedia::default();
        if !inline && self.blob.is_none() {
            return relayed;
        }

        let bytes = match tokio::time::timeout(self.timeout, download(session, media, kind)).await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                error!(kind = %kind, error = %e, "failed to download media");
                return relayed;
            }
            Err(_) => {
                error!(kind = %kind, timeout_secs = self.timeout.as_secs(), "media download timed out");
                return relayed;
            }
        };

        let ext = extension_for(&media.file_name, &media.mimetype, &bytes);
        if inline {
            relayed.base64 = STANDARD.encode(&bytes);
        }

        if let Some(blob) = &self.blob {
            let name = format!("{}.{ext}", uuid::Uuid::new_v4());
            match blob.upload(&name, &media.mimetype, bytes).await {
                Ok(url) => {
                    debug!(kind = %kind, %url, "media re-hosted");
                    relayed.url = url;
                }
                Err(e) => error!(kind = %kind, name = %name, error = %e, "failed to upload media"),
            }
        }

        relayed
    }
}

impl Default for MediaRelay {
    fn default() -> Self {
        Self::new(None, DEFAULT_MEDIA_TIMEOUT)
    }
}

async fn download(
    session: &dyn SessionRuntime,
    media: &MediaMessage,
    kind: MediaKind,
) -> Result<Vec<u8>, WahookError> {
    let std_file = tempfile::tempfile().map_err(|e| storage("failed to create temp file", e))?;
    let mut file = tokio::fs::File::from_std(std_file);

    session.download_to_file(media, kind, &mut file).await?;

    file.seek(SeekFrom::Start(0))
        .await
        .map_err(|e| storage("failed to rewind temp file", e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .await
        .map_err(|e| storage("failed to read temp file", e))?;
    Ok(bytes)
}

fn storage(message: &str, e: std::io::Error) -> WahookError {
    WahookError::Storage {
        message: message.to_string(),
        source: Some(Box::new(e)),
    }
}

/// File extension for an attachment, by file name, then mime type, then
/// content sniffing. Falls back to `bin`.
pub fn extension_for(file_name: &str, mimetype: &str, content: &[u8]) -> String {
    if let Some(ext) = Path::new(file_name.trim())
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
    {
        return ext.to_ascii_lowercase();
    }
    if let Some(ext) = extension_for_mime(mimetype) {
        return ext;
    }
    sniff_extension(content).unwrap_or("bin").to_string()
}

fn extension_for_mime(mimetype: &str) -> Option<String> {
    let essence = mimetype.split(';').next()?.trim().to_ascii_lowercase();
    if essence.is_empty() {
        return None;
    }
    let preferred = match essence.as_str() {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "audio/ogg" => Some("ogg"),
        "audio/mpeg" => Some("mp3"),
        "audio/mp4" => Some("m4a"),
        "video/mp4" => Some("mp4"),
        "application/pdf" => Some("pdf"),
        _ => None,
    };
    if let Some(ext) = preferred {
        return Some(ext.to_string());
    }
    mime_guess::get_mime_extensions_str(&essence)
        .and_then(|exts| exts.first())
        .map(|ext| ext.to_string())
}

fn sniff_extension(content: &[u8]) -> Option<&'static str> {
    if content.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if content.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if content.starts_with(b"GIF87a") || content.starts_with(b"GIF89a") {
        Some("gif")
    } else if content.starts_with(b"%PDF") {
        Some("pdf")
    } else if content.starts_with(b"OggS") {
        Some("ogg")
    } else if content.starts_with(b"ID3") || content.starts_with(&[0xFF, 0xFB]) {
        Some("mp3")
    } else if content.starts_with(b"PK\x03\x04") {
        Some("zip")
    } else if content.len() >= 12 && content.starts_with(b"RIFF") && &content[8..12] == b"WEBP" {
        Some("webp")
    } else if content.len() >= 12 && content.starts_with(b"RIFF") && &content[8..12] == b"WAVE" {
        Some("wav")
    } else if content.len() >= 8 && &content[4..8] == b"ftyp" {
        Some("mp4")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wahook_test_utils::{MockBlobStorage, MockSession, SessionCall};

    const PDF: &[u8] = b"%PDF-1.7 fake";

    fn doc(file_name: &str, mimetype: &str) -> MediaMessage {
        MediaMessage {
            url: "https://mmg.test/doc".into(),
            file_name: file_name.into(),
            mimetype: mimetype.into(),
            ..Default::default()
        }
    }

    #[test]
    fn extension_prefers_file_name() {
        assert_eq!(extension_for("Report.PDF", "image/png", &[0xFF, 0xD8, 0xFF]), "pdf");
    }

    #[test]
    fn extension_falls_back_to_mime() {
        assert_eq!(extension_for("", "audio/ogg; codecs=opus", b""), "ogg");
        assert_eq!(extension_for("noext", "image/jpeg", b""), "jpg");
    }

    #[test]
    fn extension_falls_back_to_sniffing() {
        assert_eq!(extension_for("", "", PDF), "pdf");
        assert_eq!(extension_for("", "", b"\x89PNG\r\n\x1a\nrest"), "png");
        assert_eq!(extension_for("", "", b"RIFF\0\0\0\0WEBPVP8 "), "webp");
        assert_eq!(extension_for("", "", b"\0\0\0\x18ftypmp42"), "mp4");
    }

    #[test]
    fn unknown_content_is_bin() {
        assert_eq!(extension_for("", "", b"hello"), "bin");
        assert_eq!(extension_for("", "application/x-not-a-real-type", b""), "bin");
    }

    #[tokio::test]
    async fn inline_and_upload() {
        let session = MockSession::new().with_media(PDF.to_vec());
        let blob = Arc::new(MockBlobStorage::new());
        let relay = MediaRelay::new(Some(blob.clone()), DEFAULT_MEDIA_TIMEOUT);

        let relayed = relay
            .fetch(&session, &doc("", "application/pdf"), MediaKind::Document, true)
            .await;

        assert_eq!(relayed.base64, STANDARD.encode(PDF));
        let uploads = blob.uploads();
        assert_eq!(uploads.len(), 1);
        assert!(uploads[0].name.ends_with(".pdf"));
        assert_eq!(uploads[0].name.len(), 36 + 4);
        assert_eq!(uploads[0].mimetype, "application/pdf");
        assert_eq!(uploads[0].bytes, PDF);
        assert_eq!(relayed.url, format!("https://blobs.test/{}", uploads[0].name));
    }

    #[tokio::test]
    async fn nothing_requested_skips_download() {
        let session = MockSession::new().with_media(PDF.to_vec());
        let relay = MediaRelay::default();
        let relayed = relay
            .fetch(&session, &doc("a.pdf", ""), MediaKind::Document, false)
            .await;
        assert_eq!(relayed, RelayedMedia::default());
        assert!(session.calls().is_empty());
    }

    #[tokio::test]
    async fn download_failure_degrades_to_empty() {
        let session = MockSession::new();
        session.fail("download_to_file");
        let blob = Arc::new(MockBlobStorage::new());
        let relay = MediaRelay::new(Some(blob.clone()), DEFAULT_MEDIA_TIMEOUT);

        let relayed = relay
            .fetch(&session, &doc("a.pdf", ""), MediaKind::Document, true)
            .await;
        assert_eq!(relayed, RelayedMedia::default());
        assert!(blob.uploads().is_empty());
        assert!(matches!(session.calls()[0], SessionCall::Download { kind: MediaKind::Document, .. }));
    }

    #[tokio::test]
    async fn upload_failure_keeps_inline_body() {
        let session = MockSession::new().with_media(PDF.to_vec());
        let blob = Arc::new(MockBlobStorage::new());
        blob.set_failing(true);
        let relay = MediaRelay::new(Some(blob), DEFAULT_MEDIA_TIMEOUT);

        let relayed = relay
            .fetch(&session, &doc("a.pdf", ""), MediaKind::Document, true)
            .await;
        assert_eq!(relayed.url, "");
        assert_eq!(relayed.base64, STANDARD.encode(PDF));
    }
}
