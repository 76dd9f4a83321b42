use std::{fs, rc::Rc};

use omnis::{
    assistant::{AssistantMode, answer, analytics::Intent},
    document::{
        DocumentCategory, DocumentContent,
        io::{FileSaver, LocalFiles},
        markup::TagStripper,
        txt::paginate,
    },
    pdf::{DisabledDecoder, RenderPhase},
    session::{Session, SessionOptions, ViewerMode},
};

fn session(page_size: usize) -> Session {
    Session::new(SessionOptions {
        text_page_size: page_size,
        decoder: Rc::new(DisabledDecoder),
        ..SessionOptions::default()
    })
}

#[test]
fn open_edit_save_and_close_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let notes = dir.path().join("notes.md");
    let other = dir.path().join("other.txt");
    fs::write(&notes, "# Notes\nfirst").expect("seed notes");
    fs::write(&other, "other").expect("seed other");

    let files = LocalFiles::new();
    let mut session = session(500);
    let first = session.open_path(&files, &notes).expect("opens notes");
    let second = session.open_path(&files, &other).expect("opens other");
    assert_eq!(session.active_id(), Some(second));

    session.activate(first);
    session.set_viewer_mode(ViewerMode::Edit);
    session.update_content(first, DocumentContent::from("# Notes\nfirst\nsecond"));
    assert!(session.is_dirty(first));
    assert_eq!(
        session.document(first).map(|d| d.title()),
        Some("notes.md*".to_string())
    );

    session.save_active(&files).expect("saves");
    assert!(!session.is_dirty(first));
    assert_eq!(
        fs::read_to_string(&notes).expect("reads back"),
        "# Notes\nfirst\nsecond"
    );

    session.close_document(first);
    assert_eq!(session.active_id(), Some(second));
    session.close_document(second);
    assert_eq!(session.active_id(), None);
}

#[test]
fn failed_open_adds_no_tab() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session(500);
    assert!(
        session
            .open_path(&LocalFiles::new(), &dir.path().join("missing.txt"))
            .is_err()
    );
    assert!(session.is_empty());
}

#[test]
fn failed_save_keeps_the_document_dirty() {
    struct FailingSaver;

    impl FileSaver for FailingSaver {
        fn save(
            &self,
            path: &std::path::Path,
            _category: DocumentCategory,
            _content: &DocumentContent,
        ) -> Result<(), omnis::document::io::FileIoError> {
            Err(omnis::document::io::FileIoError::Write {
                path: path.to_path_buf(),
                source: std::io::Error::other("disk full"),
            })
        }
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("a.txt");
    fs::write(&path, "v1").expect("seed");

    let mut session = session(500);
    let id = session.open_path(&LocalFiles::new(), &path).expect("opens");
    session.update_content(id, "v2".into());

    let err = session.save_active(&FailingSaver).expect_err("save fails");
    assert!(err.to_string().contains("disk full"));
    assert!(session.is_dirty(id));
}

#[test]
fn large_text_is_paged_in_read_mode_only() {
    let text = (1..=1234)
        .map(|i| format!("line {i}"))
        .collect::<Vec<_>>()
        .join("\n");
    let pagination = paginate(&text, 500);
    assert_eq!(pagination.page_count(), 3);
    assert_eq!(pagination.pages().collect::<Vec<_>>().join("\n"), text);

    let mut session = session(500);
    session.open_document(
        omnis::document::DocumentIdentity::from_path("/big.log"),
        DocumentCategory::Text,
        DocumentContent::Text(text.clone()),
    );
    session.set_text_page(3);
    assert_eq!(session.visible_text().map(|t| t.lines().count()), Some(234));

    session.set_viewer_mode(ViewerMode::Edit);
    assert_eq!(session.visible_text(), Some(text.as_str()));
}

#[test]
fn assistant_reads_the_active_rich_document() {
    let mut session = session(500);
    session.open_document(
        omnis::document::DocumentIdentity::from_path("/letter.docx"),
        DocumentCategory::RichText,
        DocumentContent::Markup("<p>cat dog cat</p><p>bird cat dog</p>".into()),
    );

    let text = session.active_plain_text(&TagStripper);
    let reply = answer("most used word?", &text, AssistantMode::Local);
    assert_eq!(reply.intent, Intent::Frequency);
    assert!(reply.body.contains("1. **cat** (3 times)"));
}

#[test]
fn pdf_without_decoder_fails_once_and_stays_failed() {
    let mut session = session(500);
    session.open_document(
        omnis::document::DocumentIdentity::from_path("/paper.pdf"),
        DocumentCategory::Pdf,
        DocumentContent::Binary(omnis::document::Payload::new(
            b"%PDF-1.4".to_vec(),
            "application/pdf",
        )),
    );

    assert_eq!(session.poll_renders().len(), 1);
    session.pdf_next_page();
    session.pdf_zoom_in();
    assert!(session.poll_renders().is_empty());
    assert!(matches!(
        session.render_pipeline().map(|p| p.phase()),
        Some(RenderPhase::Failed { .. })
    ));
}
