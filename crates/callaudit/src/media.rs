//! Media classification for submitted uploads.

use std::path::Path;

use crate::error::SimulatorError;
use crate::job::{MediaKind, UploadDescriptor};

/// MIME types accepted when no explicit list is configured.
pub const DEFAULT_ACCEPTED_MIME_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "video/mp4",
    "video/quicktime",
];

/// Guesses a MIME type from a file name using its extension.
/// Returns `None` for unknown extensions.
pub fn guess_mime(name: &str) -> Option<String> {
    mime_guess::from_path(Path::new(name))
        .first()
        .map(|m| m.essence_str().to_string())
}

/// Resolves the media kind of a descriptor.
///
/// The bare categories `audio` and `video` are always accepted. Full MIME
/// types must be audio or video and their subtype must contain the subtype of
/// one of `accepted` (so `audio/x-wav` passes on the strength of `audio/wav`).
pub fn classify<S: AsRef<str>>(
    descriptor: &UploadDescriptor,
    accepted: &[S],
) -> Result<MediaKind, SimulatorError> {
    let category = descriptor.mime_category.trim().to_ascii_lowercase();
    let reject = || SimulatorError::UnsupportedMediaType {
        name: descriptor.name.clone(),
        category: descriptor.mime_category.clone(),
    };

    match category.as_str() {
        "audio" => return Ok(MediaKind::Audio),
        "video" => return Ok(MediaKind::Video),
        _ => {}
    }

    let (top, subtype) = category.split_once('/').ok_or_else(reject)?;
    let kind = match top {
        "audio" => MediaKind::Audio,
        "video" => MediaKind::Video,
        _ => return Err(reject()),
    };

    let subtype = subtype.split(';').next().unwrap_or_default().trim();
    let allowed = accepted.iter().any(|entry| {
        let entry = entry.as_ref().trim().to_ascii_lowercase();
        match entry.split_once('/') {
            Some((entry_top, entry_sub)) => entry_top == top && !entry_sub.is_empty() && subtype.contains(entry_sub),
            None => false,
        }
    });

    if allowed {
        Ok(kind)
    } else {
        Err(reject())
    }
}
