//! Upload validation rules.
//!
//! An upload is accepted when either its filename extension or its declared
//! content type is on the corresponding allow-list. The two checks are
//! alternative sufficient conditions, not a conjunction: browsers routinely
//! send `application/octet-stream` for perfectly good `.m4a` files, and
//! conversely a correct `audio/*` type can arrive with an exotic filename.

/// Filename extensions accepted for transcription (lowercase).
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "m4a", "aac", "ogg", "flac", "mp4", "mpeg", "mpga", "webm",
];

/// Declared content types accepted for transcription.
///
/// Includes the generic binary fallback because mobile browsers often fail
/// to detect audio MIME types.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/x-wav",
    "audio/wave",
    "audio/mp4",
    "audio/m4a",
    "audio/x-m4a",
    "audio/aac",
    "audio/x-aac",
    "audio/ogg",
    "audio/flac",
    "audio/x-flac",
    "audio/webm",
    "video/mp4",
    "video/webm",
    "application/octet-stream",
];

/// Extract the lowercase extension from a filename, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Whether the upload passes the format allow-lists.
pub fn is_allowed_upload(filename: &str, content_type: &str) -> bool {
    let extension_ok = file_extension(filename)
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));
    let mime_ok = ALLOWED_MIME_TYPES.contains(&content_type.to_ascii_lowercase().as_str());
    extension_ok || mime_ok
}

/// Content type forwarded to the transcription service.
///
/// Falls back to the generic binary type when the declared value is not a
/// plausible `type/subtype` token, so multipart form construction cannot
/// fail on caller-supplied input.
pub fn effective_mime(content_type: &str) -> &str {
    let plausible = content_type.split_once('/').is_some_and(|(t, s)| {
        !t.is_empty()
            && !s.is_empty()
            && content_type
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '+' | '.'))
    });
    if plausible {
        content_type
    } else {
        "application/octet-stream"
    }
}
