use std::{fmt, path::PathBuf, sync::Arc};

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::document::DocumentCategory;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentIdentity {
    pub name: String,
    pub path: PathBuf,
    pub extension: String,
}

impl DocumentIdentity {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string());
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        Self {
            name,
            path,
            extension,
        }
    }
}

#[derive(Clone)]
pub struct Payload {
    bytes: Arc<Vec<u8>>,
    mime: String,
}

impl Payload {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes: Arc::new(bytes),
            mime: mime.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    pub fn shared_bytes(&self) -> Arc<Vec<u8>> {
        self.bytes.clone()
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn data_uri(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(self.bytes.as_slice());
        format!("data:{};base64,{encoded}", self.mime)
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        self.mime == other.mime
            && (Arc::ptr_eq(&self.bytes, &other.bytes) || self.bytes == other.bytes)
    }
}

impl Eq for Payload {}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentContent {
    Text(String),
    Markup(String),
    Binary(Payload),
}

impl DocumentContent {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::Markup(text) => Some(text.as_str()),
            Self::Binary(_) => None,
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Binary(payload) => Some(payload),
            Self::Text(_) | Self::Markup(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) | Self::Markup(text) => text.len(),
            Self::Binary(payload) => payload.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fits(&self, category: DocumentCategory) -> bool {
        match category {
            DocumentCategory::Image | DocumentCategory::Pdf => matches!(self, Self::Binary(_)),
            DocumentCategory::RichText => matches!(self, Self::Markup(_)),
            DocumentCategory::Text
            | DocumentCategory::Binary
            | DocumentCategory::Unknown
            | DocumentCategory::Error => matches!(self, Self::Text(_)),
        }
    }
}

impl From<String> for DocumentContent {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for DocumentContent {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    identity: DocumentIdentity,
    category: DocumentCategory,
    content: DocumentContent,
    last_saved_content: DocumentContent,
}

impl Document {
    pub(crate) fn new(
        id: DocumentId,
        identity: DocumentIdentity,
        category: DocumentCategory,
        content: DocumentContent,
    ) -> Self {
        Self {
            id,
            identity,
            category,
            last_saved_content: content.clone(),
            content,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn identity(&self) -> &DocumentIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn path(&self) -> &std::path::Path {
        &self.identity.path
    }

    pub fn extension(&self) -> &str {
        &self.identity.extension
    }

    pub fn category(&self) -> DocumentCategory {
        self.category
    }

    pub fn content(&self) -> &DocumentContent {
        &self.content
    }

    pub fn last_saved_content(&self) -> &DocumentContent {
        &self.last_saved_content
    }

    pub fn is_dirty(&self) -> bool {
        self.content != self.last_saved_content
    }

    pub fn title(&self) -> String {
        if self.is_dirty() {
            format!("{}*", self.identity.name)
        } else {
            self.identity.name.clone()
        }
    }

    pub(crate) fn set_content(&mut self, content: DocumentContent) {
        self.content = content;
    }

    pub(crate) fn mark_saved(&mut self) {
        self.last_saved_content = self.content.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_doc(text: &str) -> Document {
        Document::new(
            DocumentId(1),
            DocumentIdentity::from_path("/tmp/notes.txt"),
            DocumentCategory::Text,
            DocumentContent::from(text),
        )
    }

    #[test]
    fn dirty_is_derived_from_saved_snapshot() {
        let mut doc = text_doc("hello");
        assert!(!doc.is_dirty());

        doc.set_content("hello world".into());
        assert!(doc.is_dirty());
        assert_eq!(doc.title(), "notes.txt*");

        doc.set_content("hello".into());
        assert!(!doc.is_dirty());
    }

    #[test]
    fn mark_saved_is_idempotent() {
        let mut doc = text_doc("a");
        doc.set_content("b".into());
        doc.mark_saved();
        assert!(!doc.is_dirty());
        doc.mark_saved();
        assert!(!doc.is_dirty());
        assert_eq!(doc.content(), doc.last_saved_content());
    }

    #[test]
    fn identity_lowercases_extension() {
        let identity = DocumentIdentity::from_path("/docs/Report.PDF");
        assert_eq!(identity.name, "Report.PDF");
        assert_eq!(identity.extension, "pdf");
    }

    #[test]
    fn payload_equality_and_data_uri() {
        let a = Payload::new(b"abc".to_vec(), "image/png");
        let b = Payload::new(b"abc".to_vec(), "image/png");
        assert_eq!(a, b);
        assert_eq!(a.data_uri(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn content_shape_matches_category() {
        let payload = DocumentContent::Binary(Payload::new(vec![1], "application/pdf"));
        assert!(payload.fits(DocumentCategory::Pdf));
        assert!(!payload.fits(DocumentCategory::Text));
        assert!(DocumentContent::Markup("<p>x</p>".into()).fits(DocumentCategory::RichText));
        assert!(DocumentContent::from("x").fits(DocumentCategory::Error));
    }
}
