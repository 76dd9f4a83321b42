use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::document::{
    DocumentCategory, DocumentContent, DocumentIdentity, ExtensionHint, Payload, extension_hint,
    image_mime, looks_like_image, looks_like_pdf, looks_like_text,
    txt::{decode_text, encode_text},
};

pub const BINARY_PLACEHOLDER: &str = "Preview unavailable for this binary format.";
pub const UNKNOWN_PLACEHOLDER: &str = "Unknown file format.";

#[derive(Debug, thiserror::Error)]
pub enum FileIoError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rich document conversion failed: {0}")]
    Conversion(String),

    #[error("{0} documents cannot be saved")]
    Unsupported(&'static str),
}

#[derive(Debug, Clone)]
pub struct OpenedFile {
    pub identity: DocumentIdentity,
    pub category: DocumentCategory,
    pub content: DocumentContent,
}

pub trait FileReader {
    fn read(&self, path: &Path) -> Result<OpenedFile, FileIoError>;
}

pub trait FileSaver {
    fn save(&self, path: &Path, category: DocumentCategory, content: &DocumentContent)
    -> Result<(), FileIoError>;
}

pub trait RichTextConverter {
    fn to_html(&self, bytes: &[u8]) -> Result<String, FileIoError>;
    fn from_html(&self, html: &str) -> Result<Vec<u8>, FileIoError>;
}

#[derive(Default)]
pub struct LocalFiles {
    converter: Option<Box<dyn RichTextConverter>>,
}

impl LocalFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_converter(converter: Box<dyn RichTextConverter>) -> Self {
        Self {
            converter: Some(converter),
        }
    }

    pub fn classify(&self, identity: &DocumentIdentity, bytes: Vec<u8>) -> Result<OpenedFile, FileIoError> {
        let (category, content) = match extension_hint(&identity.path) {
            ExtensionHint::Image => {
                if identity.extension == "svg" || looks_like_image(&bytes) {
                    (
                        DocumentCategory::Image,
                        DocumentContent::Binary(Payload::new(bytes, image_mime(&identity.extension))),
                    )
                } else {
                    mismatch(identity, "image")
                }
            }
            ExtensionHint::Pdf => {
                if looks_like_pdf(&bytes) {
                    (
                        DocumentCategory::Pdf,
                        DocumentContent::Binary(Payload::new(bytes, "application/pdf")),
                    )
                } else {
                    mismatch(identity, "PDF")
                }
            }
            ExtensionHint::Text => (
                DocumentCategory::Text,
                DocumentContent::Text(decode_text(&bytes)),
            ),
            ExtensionHint::RichText => match &self.converter {
                Some(converter) => (
                    DocumentCategory::RichText,
                    DocumentContent::Markup(converter.to_html(&bytes)?),
                ),
                None => (
                    DocumentCategory::Binary,
                    DocumentContent::Text(BINARY_PLACEHOLDER.to_string()),
                ),
            },
            ExtensionHint::Other => sniff(bytes),
        };

        debug!(
            "classified {} as {} ({} bytes)",
            identity.path.display(),
            category.label(),
            content.len()
        );

        Ok(OpenedFile {
            identity: identity.clone(),
            category,
            content,
        })
    }
}

impl FileReader for LocalFiles {
    fn read(&self, path: &Path) -> Result<OpenedFile, FileIoError> {
        let bytes = fs::read(path).map_err(|source| FileIoError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.classify(&DocumentIdentity::from_path(path), bytes)
    }
}

impl FileSaver for LocalFiles {
    fn save(
        &self,
        path: &Path,
        category: DocumentCategory,
        content: &DocumentContent,
    ) -> Result<(), FileIoError> {
        let bytes = match (category, content) {
            (DocumentCategory::Text, DocumentContent::Text(text)) => encode_text(text),
            (DocumentCategory::RichText, DocumentContent::Markup(html)) => match &self.converter {
                Some(converter) => converter.from_html(html)?,
                None => return Err(FileIoError::Unsupported(category.label())),
            },
            (DocumentCategory::Image | DocumentCategory::Pdf, DocumentContent::Binary(payload)) => {
                payload.bytes().to_vec()
            }
            (other, _) => return Err(FileIoError::Unsupported(other.label())),
        };

        fs::write(path, bytes).map_err(|source| FileIoError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("saved {}", path.display());
        Ok(())
    }
}

fn mismatch(identity: &DocumentIdentity, expected: &str) -> (DocumentCategory, DocumentContent) {
    warn!(
        "{} has a .{} extension but does not contain {expected} data",
        identity.path.display(),
        identity.extension
    );
    (
        DocumentCategory::Error,
        DocumentContent::Text(format!(
            "{} could not be opened: the file is not valid {expected} data.",
            identity.name
        )),
    )
}

fn sniff(bytes: Vec<u8>) -> (DocumentCategory, DocumentContent) {
    if looks_like_pdf(&bytes) {
        return (
            DocumentCategory::Pdf,
            DocumentContent::Binary(Payload::new(bytes, "application/pdf")),
        );
    }
    if let Ok(format) = image::guess_format(&bytes) {
        let mime = format.to_mime_type().to_string();
        return (DocumentCategory::Image, DocumentContent::Binary(Payload::new(bytes, mime)));
    }
    if looks_like_text(&bytes) {
        return (DocumentCategory::Text, DocumentContent::Text(decode_text(&bytes)));
    }
    (
        DocumentCategory::Unknown,
        DocumentContent::Text(UNKNOWN_PLACEHOLDER.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn classify(name: &str, bytes: &[u8]) -> OpenedFile {
        LocalFiles::new()
            .classify(&DocumentIdentity::from_path(format!("/docs/{name}")), bytes.to_vec())
            .expect("classification succeeds")
    }

    struct UpperCaseConverter;

    impl RichTextConverter for UpperCaseConverter {
        fn to_html(&self, bytes: &[u8]) -> Result<String, FileIoError> {
            Ok(format!("<p>{}</p>", String::from_utf8_lossy(bytes)))
        }

        fn from_html(&self, html: &str) -> Result<Vec<u8>, FileIoError> {
            Ok(html.to_uppercase().into_bytes())
        }
    }

    #[test]
    fn text_extensions_decode_as_text() {
        let opened = classify("main.py", b"print('hi')\n");
        assert_eq!(opened.category, DocumentCategory::Text);
        assert_eq!(opened.content, DocumentContent::Text("print('hi')\n".into()));
        assert_eq!(opened.identity.extension, "py");
    }

    #[test]
    fn pdf_extension_requires_pdf_magic() {
        let ok = classify("paper.pdf", b"%PDF-1.4\n...");
        assert_eq!(ok.category, DocumentCategory::Pdf);
        assert_eq!(ok.content.payload().map(Payload::mime), Some("application/pdf"));

        let bad = classify("paper.pdf", b"not a pdf");
        assert_eq!(bad.category, DocumentCategory::Error);
        assert!(bad.content.as_str().is_some_and(|m| m.contains("not valid PDF")));
    }

    #[test]
    fn images_carry_mime_typed_payloads() {
        let png = classify("shot.png", &PNG_HEADER);
        assert_eq!(png.category, DocumentCategory::Image);
        assert_eq!(png.content.payload().map(Payload::mime), Some("image/png"));

        let svg = classify("logo.svg", b"<svg/>");
        assert_eq!(svg.category, DocumentCategory::Image);
        assert_eq!(svg.content.payload().map(Payload::mime), Some("image/svg+xml"));
    }

    #[test]
    fn office_documents_need_a_converter() {
        let binary = classify("letter.docx", b"PK\x03\x04");
        assert_eq!(binary.category, DocumentCategory::Binary);
        assert_eq!(binary.content, DocumentContent::Text(BINARY_PLACEHOLDER.into()));

        let files = LocalFiles::with_converter(Box::new(UpperCaseConverter));
        let rich = files
            .classify(&DocumentIdentity::from_path("letter.docx"), b"hello".to_vec())
            .expect("converts");
        assert_eq!(rich.category, DocumentCategory::RichText);
        assert_eq!(rich.content, DocumentContent::Markup("<p>hello</p>".into()));
    }

    #[test]
    fn unknown_extensions_are_sniffed() {
        assert_eq!(classify("blob", b"%PDF-1.7").category, DocumentCategory::Pdf);
        assert_eq!(classify("blob.bin", &PNG_HEADER).category, DocumentCategory::Image);
        assert_eq!(classify("README", b"just words").category, DocumentCategory::Text);
        assert_eq!(classify("data.bin", &[0, 159, 146, 150]).category, DocumentCategory::Unknown);
    }

    #[test]
    fn read_and_save_round_trip_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.txt");
        fs::write(&path, "draft").expect("seed file");

        let files = LocalFiles::new();
        let opened = files.read(&path).expect("reads");
        assert_eq!(opened.identity.name, "notes.txt");

        files
            .save(&path, DocumentCategory::Text, &DocumentContent::Text("final".into()))
            .expect("saves");
        assert_eq!(fs::read_to_string(&path).expect("reads back"), "final");
    }

    #[test]
    fn missing_files_and_unsupported_saves_error() {
        let files = LocalFiles::new();
        assert!(matches!(
            files.read(Path::new("/definitely/not/here.txt")),
            Err(FileIoError::Read { .. })
        ));
        assert!(matches!(
            files.save(
                Path::new("x.bin"),
                DocumentCategory::Binary,
                &DocumentContent::Text(BINARY_PLACEHOLDER.into())
            ),
            Err(FileIoError::Unsupported("binary"))
        ));
    }
}
