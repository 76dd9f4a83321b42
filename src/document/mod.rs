pub mod io;
pub mod markup;
pub mod model;
pub mod txt;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use model::{Document, DocumentContent, DocumentId, DocumentIdentity, Payload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentCategory {
    Image,
    Pdf,
    Text,
    RichText,
    Binary,
    Unknown,
    Error,
}

impl DocumentCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::Text => "text",
            Self::RichText => "richText",
            Self::Binary => "binary",
            Self::Unknown => "unknown",
            Self::Error => "error",
        }
    }

    // Binary, Unknown and Error tabs only carry a message and are never saved.
    pub const fn is_placeholder(self) -> bool {
        match self {
            Self::Binary | Self::Unknown | Self::Error => true,
            Self::Image | Self::Pdf | Self::Text | Self::RichText => false,
        }
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "svg", "bmp"];
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "json", "js", "ts", "tsx", "jsx", "css", "html", "py", "java", "c", "cpp",
];
const RICH_TEXT_EXTENSIONS: &[&str] = &["docx", "doc", "odt", "rtf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionHint {
    Image,
    Pdf,
    Text,
    RichText,
    Other,
}

pub fn extension_hint(path: &Path) -> ExtensionHint {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();
    hint_for_extension(&ext)
}

pub fn hint_for_extension(ext: &str) -> ExtensionHint {
    match ext {
        "pdf" => ExtensionHint::Pdf,
        e if IMAGE_EXTENSIONS.contains(&e) => ExtensionHint::Image,
        e if TEXT_EXTENSIONS.contains(&e) => ExtensionHint::Text,
        e if RICH_TEXT_EXTENSIONS.contains(&e) => ExtensionHint::RichText,
        _ => ExtensionHint::Other,
    }
}

pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    // Readers tolerate junk before the header within the first KiB.
    let window = &bytes[..bytes.len().min(1024)];
    window.windows(5).any(|w| w == b"%PDF-")
}

pub fn looks_like_image(bytes: &[u8]) -> bool {
    image::guess_format(bytes).is_ok()
}

pub fn looks_like_text(bytes: &[u8]) -> bool {
    if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
        return true;
    }
    let window = &bytes[..bytes.len().min(8192)];
    !window.contains(&0) && std::str::from_utf8(window).is_ok()
}

pub fn image_mime(ext: &str) -> String {
    match ext {
        "svg" => "image/svg+xml".to_string(),
        "jpg" => "image/jpeg".to_string(),
        other => format!("image/{other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_lists_drive_hints() {
        assert_eq!(extension_hint(Path::new("a/b.PNG")), ExtensionHint::Image);
        assert_eq!(extension_hint(Path::new("paper.pdf")), ExtensionHint::Pdf);
        assert_eq!(extension_hint(Path::new("main.cpp")), ExtensionHint::Text);
        assert_eq!(extension_hint(Path::new("page.html")), ExtensionHint::Text);
        assert_eq!(extension_hint(Path::new("letter.docx")), ExtensionHint::RichText);
        assert_eq!(extension_hint(Path::new("archive.tar")), ExtensionHint::Other);
        assert_eq!(extension_hint(Path::new("Makefile")), ExtensionHint::Other);
    }

    #[test]
    fn sniffers_recognize_magic_bytes() {
        assert!(looks_like_pdf(b"%PDF-1.7\n%..."));
        assert!(!looks_like_pdf(b"hello"));
        assert!(looks_like_image(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]));
        assert!(!looks_like_image(b"plain words"));
        assert!(looks_like_text("héllo\nworld".as_bytes()));
        assert!(!looks_like_text(&[0x00, 0x01, 0x02]));
    }

    #[test]
    fn category_labels_and_placeholders() {
        assert_eq!(DocumentCategory::RichText.label(), "richText");
        assert!(DocumentCategory::Error.is_placeholder());
        assert!(!DocumentCategory::Pdf.is_placeholder());
        assert_eq!(image_mime("svg"), "image/svg+xml");
        assert_eq!(image_mime("jpg"), "image/jpeg");
    }
}
