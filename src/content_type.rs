use std::fmt;
use std::path::Path;

/// MIME type sent with the `image` form part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Jpeg,
    Png,
    Heif,
    OctetStream,
}

impl ContentType {
    /// Resolves the content type from a file name's extension, ignoring case.
    pub fn from_file_name(file_name: &str) -> Self {
        // Everything after the last dot of the basename, so ".jpg" counts too.
        let extension = Path::new(file_name)
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("jpg") | Some("jpeg") => ContentType::Jpeg,
            Some("png") => ContentType::Png,
            Some("heif") | Some("heic") => ContentType::Heif,
            _ => {
                tracing::debug!(
                    "Unrecognized image extension for '{}', falling back to application/octet-stream",
                    file_name
                );
                ContentType::OctetStream
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Jpeg => "image/jpeg",
            ContentType::Png => "image/png",
            ContentType::Heif => "image/heif",
            ContentType::OctetStream => "application/octet-stream",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_extensions() {
        assert_eq!(ContentType::from_file_name("finish.jpg"), ContentType::Jpeg);
        assert_eq!(ContentType::from_file_name("finish.jpeg"), ContentType::Jpeg);
        assert_eq!(ContentType::from_file_name("FINISH.JPG").as_str(), "image/jpeg");
    }

    #[test]
    fn test_png() {
        assert_eq!(ContentType::from_file_name("start.png").as_str(), "image/png");
        assert_eq!(ContentType::from_file_name("start.PnG").as_str(), "image/png");
    }

    #[test]
    fn test_heif_and_heic() {
        assert_eq!(ContentType::from_file_name("a.heic").as_str(), "image/heif");
        assert_eq!(ContentType::from_file_name("a.HEIF").as_str(), "image/heif");
    }

    #[test]
    fn test_unknown_falls_back_to_octet_stream() {
        assert_eq!(
            ContentType::from_file_name("notes.txt").as_str(),
            "application/octet-stream"
        );
        assert_eq!(ContentType::from_file_name("no_extension"), ContentType::OctetStream);
        assert_eq!(ContentType::from_file_name(""), ContentType::OctetStream);
    }

    #[test]
    fn test_bare_extension_file_name() {
        assert_eq!(ContentType::from_file_name(".jpg"), ContentType::Jpeg);
        assert_eq!(ContentType::from_file_name("photos/.PNG"), ContentType::Png);
        assert_eq!(ContentType::from_file_name("archive."), ContentType::OctetStream);
    }

    #[test]
    fn test_display_matches_mime() {
        assert_eq!(ContentType::Heif.to_string(), "image/heif");
    }
}
