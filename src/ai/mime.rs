use std::path::Path;

/// Picks the inline mime type for a data URI.
///
/// Only PNG and JPEG are distinguished: anything whose media marker does not
/// mention `image/png` is sent as JPEG.
pub fn data_uri_mime(data_uri: &str) -> &'static str {
    let marker = data_uri.split(',').next().unwrap_or_default();
    if marker.contains("image/png") {
        "image/png"
    } else {
        "image/jpeg"
    }
}

/// Returns the base64 payload of a data URI, or `None` when the URI is not a
/// `data:` URI or has no `,` separator.
pub fn data_uri_payload(data_uri: &str) -> Option<&str> {
    if !data_uri.starts_with("data:") {
        return None;
    }
    data_uri.split(',').nth(1)
}

pub fn mime_for_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_mime_png() {
        assert_eq!(data_uri_mime("data:image/png;base64,iVBORw0"), "image/png");
    }

    #[test]
    fn test_data_uri_mime_everything_else_is_jpeg() {
        assert_eq!(data_uri_mime("data:image/jpeg;base64,/9j/"), "image/jpeg");
        assert_eq!(data_uri_mime("data:image/webp;base64,UklGR"), "image/jpeg");
        assert_eq!(data_uri_mime("data:image/gif;base64,R0lG"), "image/jpeg");
    }

    #[test]
    fn test_data_uri_mime_is_substring_match() {
        assert_eq!(data_uri_mime("data:x-image/pngish;base64,AA"), "image/png");
    }

    #[test]
    fn test_data_uri_payload() {
        assert_eq!(data_uri_payload("data:image/png;base64,AAAA"), Some("AAAA"));
        assert_eq!(data_uri_payload("data:image/png;base64AAAA"), None);
        assert_eq!(data_uri_payload("image/png;base64,AAAA"), None);
    }

    #[test]
    fn test_data_uri_payload_stops_at_next_comma() {
        assert_eq!(data_uri_payload("data:image/png;base64,AA,BB"), Some("AA"));
    }

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for_extension(Path::new("a.png")), "image/png");
        assert_eq!(mime_for_extension(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_for_extension(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_for_extension(Path::new("a.gif")), "image/gif");
        assert_eq!(mime_for_extension(Path::new("dir/a.webp")), "image/webp");
    }

    #[test]
    fn test_mime_for_unknown_extension_defaults_to_jpeg() {
        assert_eq!(mime_for_extension(Path::new("a.bmp")), "image/jpeg");
        assert_eq!(mime_for_extension(Path::new("noext")), "image/jpeg");
    }
}
