//! Audio upload handling
//!
//! Accepts a multipart `mp3` field, writes it under the uploads directory and
//! registers the file as a playlist item. The file write always completes
//! before the store mutation that references it: a crash in between leaves an
//! orphaned file on disk, never a playlist item pointing at nothing.

use super::session::Session;
use super::state::ServerState;
use crate::user::{AudioFile, LibraryError};

use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

pub const UPLOADS_ROUTE_PREFIX: &str = "/uploads";

/// The multipart field name the client sends the audio file under.
const AUDIO_FIELD_NAME: &str = "mp3";

/// Replaces every character outside [A-Za-z0-9._-] with an underscore.
pub fn sanitize_filename(original: &str) -> String {
    original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Unique on-disk name: millisecond timestamp prefix + sanitized original.
fn generate_disk_name(original: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{}_{}", millis, sanitize_filename(original))
}

pub async fn upload_audio(
    session: Session,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Response {
    let mut original_name: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some(AUDIO_FIELD_NAME) {
            continue;
        }
        original_name = field.file_name().map(|s| s.to_string());
        match field.bytes().await {
            Ok(bytes) => data = Some(bytes.to_vec()),
            Err(err) => {
                warn!("Failed to read uploaded file data: {}", err);
                return LibraryError::Validation("Failed to read file".to_string())
                    .into_response();
            }
        }
    }

    let original_name = match original_name {
        Some(name) if !name.is_empty() => name,
        _ => return LibraryError::Validation("Missing mp3 file".to_string()).into_response(),
    };
    let data = match data {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return LibraryError::Validation("Missing mp3 file".to_string()).into_response(),
    };

    // Ownership check up front so bogus playlist ids never hit the disk.
    if let Err(err) = state
        .library
        .lock()
        .unwrap()
        .ensure_playlist(&session.username, &id)
    {
        return err.into_response();
    }

    let disk_name = generate_disk_name(&original_name);
    let file_path = state.config.uploads_dir.join(&disk_name);

    // The library lock is not held across the disk write.
    if let Err(err) = tokio::fs::create_dir_all(&state.config.uploads_dir).await {
        warn!("Failed to create uploads directory: {}", err);
        return LibraryError::Io(err.into()).into_response();
    }
    if let Err(err) = tokio::fs::write(&file_path, &data).await {
        warn!("Failed to write uploaded file {:?}: {}", file_path, err);
        return LibraryError::Io(err.into()).into_response();
    }

    let audio = AudioFile {
        url: format!("{}/{}", UPLOADS_ROUTE_PREFIX, disk_name),
        filename: disk_name,
        original_name,
    };

    // The playlist may have vanished since the precheck; the written file
    // then stays behind as an orphan, which is acceptable.
    match state
        .library
        .lock()
        .unwrap()
        .add_audio(&session.username, &id, audio)
    {
        Ok(()) => {
            info!(
                "User {} uploaded audio into playlist {} ({} bytes)",
                session.username,
                id,
                data.len()
            );
            Json(json!({ "ok": true })).into_response()
        }
        Err(err) => err.into_response(),
    }
}
