use std::path::Path;

/// MIME type used when a filename carries no recognised image extension.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Map a filename's extension to an image MIME type.
///
/// Matching is case-insensitive. Missing or unknown extensions fall back to
/// [`DEFAULT_IMAGE_MIME`]; this never fails.
pub fn mime_for_filename(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/vnd.microsoft.icon",
        Some("heic") => "image/heic",
        Some("avif") => "image/avif",
        other => {
            tracing::debug!(
                "Unrecognized image extension {:?} for '{}', falling back to {}",
                other,
                filename,
                DEFAULT_IMAGE_MIME
            );
            DEFAULT_IMAGE_MIME
        }
    }
}
