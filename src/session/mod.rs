pub mod events;

use std::{path::Path, rc::Rc};

use log::{debug, info, warn};

use crate::document::{
    Document, DocumentCategory, DocumentContent, DocumentId, DocumentIdentity,
    io::{FileIoError, FileReader, FileSaver},
    markup::MarkupStripper,
    txt::{DEFAULT_PAGE_SIZE, PaginationState, paginate},
};
use crate::pdf::{DocumentDecoder, RenderEvent, RenderPipeline, ZoomLimits};

pub use events::{SessionEvent, SubscriptionId};
use events::Subscribers;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewerMode {
    #[default]
    View,
    Edit,
}

#[derive(Clone)]
pub struct SessionOptions {
    pub text_page_size: usize,
    pub zoom: ZoomLimits,
    pub decoder: Rc<dyn DocumentDecoder>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            text_page_size: DEFAULT_PAGE_SIZE,
            zoom: ZoomLimits::default(),
            decoder: crate::pdf::default_decoder(),
        }
    }
}

struct ActiveRender {
    document: DocumentId,
    pipeline: RenderPipeline,
}

pub struct Session {
    documents: Vec<Document>,
    active: Option<DocumentId>,
    next_id: u64,
    viewer_mode: ViewerMode,
    text_page: usize,
    options: SessionOptions,
    device_pixel_ratio: f32,
    render: Option<ActiveRender>,
    subscribers: Subscribers,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            documents: Vec::new(),
            active: None,
            next_id: 0,
            viewer_mode: ViewerMode::View,
            text_page: 1,
            options,
            device_pixel_ratio: 1.0,
            render: None,
            subscribers: Subscribers::default(),
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id() == id)
    }

    pub fn active_id(&self) -> Option<DocumentId> {
        self.active
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.active.and_then(|id| self.document(id))
    }

    pub fn is_dirty(&self, id: DocumentId) -> bool {
        self.document(id).is_some_and(Document::is_dirty)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.documents.iter().any(Document::is_dirty)
    }

    pub fn viewer_mode(&self) -> ViewerMode {
        self.viewer_mode
    }

    pub fn text_page_size(&self) -> usize {
        self.options.text_page_size
    }

    fn position(&self, id: DocumentId) -> Option<usize> {
        self.documents.iter().position(|doc| doc.id() == id)
    }

    pub fn open_document(
        &mut self,
        identity: DocumentIdentity,
        category: DocumentCategory,
        content: DocumentContent,
    ) -> DocumentId {
        self.next_id += 1;
        let id = DocumentId(self.next_id);
        info!("opened {} as {} ({id})", identity.path.display(), category.label());

        self.documents
            .push(Document::new(id, identity, category, content));
        self.viewer_mode = ViewerMode::View;
        self.emit(SessionEvent::Opened(id));
        self.select(id);
        id
    }

    pub fn open_path(
        &mut self,
        reader: &dyn FileReader,
        path: &Path,
    ) -> Result<DocumentId, FileIoError> {
        let opened = reader.read(path)?;
        Ok(self.open_document(opened.identity, opened.category, opened.content))
    }

    pub fn update_content(&mut self, id: DocumentId, content: DocumentContent) {
        let Some(index) = self.position(id) else {
            debug!("ignoring edit for closed document {id}");
            return;
        };
        let doc = &mut self.documents[index];
        if doc.category().is_placeholder() {
            debug!("ignoring edit for {} placeholder {id}", doc.category().label());
            return;
        }
        if !content.fits(doc.category()) {
            warn!(
                "ignoring {} content for {} document {id}",
                content_kind(&content),
                doc.category().label()
            );
            return;
        }
        if doc.content() == &content {
            return;
        }
        doc.set_content(content);

        self.reload_render_if_showing(id);
        self.emit(SessionEvent::ContentChanged(id));
    }

    // Call only after the save collaborator reported success.
    pub fn mark_saved(&mut self, id: DocumentId) {
        let Some(index) = self.position(id) else {
            return;
        };
        self.documents[index].mark_saved();
        self.emit(SessionEvent::Saved(id));
    }

    pub fn save_document(&mut self, id: DocumentId, saver: &dyn FileSaver) -> Result<(), FileIoError> {
        let Some(doc) = self.document(id) else {
            return Ok(());
        };
        saver.save(doc.path(), doc.category(), doc.content())?;
        self.mark_saved(id);
        Ok(())
    }

    pub fn save_active(&mut self, saver: &dyn FileSaver) -> Result<(), FileIoError> {
        match self.active {
            Some(id) => self.save_document(id, saver),
            None => Ok(()),
        }
    }

    pub fn close_document(&mut self, id: DocumentId) {
        let Some(index) = self.position(id) else {
            return;
        };
        let closed = self.documents.remove(index);
        info!("closed {} ({id})", closed.path().display());

        // Reassign before notifying so no observer sees a dangling active id.
        let was_active = self.active == Some(id);
        if was_active {
            let next = index
                .checked_sub(1)
                .or((!self.documents.is_empty()).then_some(0))
                .and_then(|i| self.documents.get(i))
                .map(Document::id);
            self.active = next;
            self.text_page = 1;
            match next {
                Some(next) => self.swap_render(next),
                None => self.render = None,
            }
        }

        self.emit(SessionEvent::Closed(id));
        if was_active {
            self.emit(SessionEvent::Activated(self.active));
        }
    }

    pub fn activate(&mut self, id: DocumentId) {
        if self.active == Some(id) {
            return;
        }
        if self.position(id).is_some() {
            self.select(id);
        }
    }

    pub fn reorder(&mut self, id: DocumentId, before_id: DocumentId) {
        if id == before_id {
            return;
        }
        let (Some(from), Some(_)) = (self.position(id), self.position(before_id)) else {
            return;
        };
        let doc = self.documents.remove(from);
        let to = self.position(before_id).unwrap_or(self.documents.len());
        self.documents.insert(to, doc);
        self.emit(SessionEvent::Reordered);
    }

    pub fn move_to_end(&mut self, id: DocumentId) {
        let Some(from) = self.position(id) else {
            return;
        };
        if from + 1 == self.documents.len() {
            return;
        }
        let doc = self.documents.remove(from);
        self.documents.push(doc);
        self.emit(SessionEvent::Reordered);
    }

    fn select(&mut self, id: DocumentId) {
        self.active = Some(id);
        self.text_page = 1;
        self.swap_render(id);
        self.emit(SessionEvent::Activated(Some(id)));
    }

    fn active_text(&self) -> Option<&str> {
        let doc = self.active_document()?;
        match (doc.category(), doc.content()) {
            (DocumentCategory::Text, DocumentContent::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn text_pagination(&self) -> Option<PaginationState> {
        let text = self.active_text()?;
        Some(PaginationState::derive(
            text,
            self.options.text_page_size,
            self.text_page,
        ))
    }

    pub fn visible_text(&self) -> Option<&str> {
        let text = self.active_text()?;
        match self.viewer_mode {
            ViewerMode::Edit => Some(text),
            ViewerMode::View => {
                Some(paginate(text, self.options.text_page_size).page_of(self.text_page))
            }
        }
    }

    pub fn set_text_page(&mut self, page: usize) {
        let Some(state) = self.text_pagination() else {
            return;
        };
        let page = page.clamp(1, state.page_count);
        if page != state.current_page {
            self.text_page = page;
            self.emit(SessionEvent::ViewChanged);
        }
    }

    pub fn next_text_page(&mut self) {
        if let Some(state) = self.text_pagination() {
            self.set_text_page(state.current_page + 1);
        }
    }

    pub fn prev_text_page(&mut self) {
        if let Some(state) = self.text_pagination() {
            self.set_text_page(state.current_page.saturating_sub(1));
        }
    }

    pub fn set_text_page_size(&mut self, page_size: usize) {
        let page_size = page_size.max(1);
        if page_size != self.options.text_page_size {
            self.options.text_page_size = page_size;
            self.text_page = 1;
            self.emit(SessionEvent::ViewChanged);
        }
    }

    pub fn set_viewer_mode(&mut self, mode: ViewerMode) {
        if self.viewer_mode != mode {
            self.viewer_mode = mode;
            self.emit(SessionEvent::ViewChanged);
        }
    }

    pub fn toggle_viewer_mode(&mut self) {
        let mode = match self.viewer_mode {
            ViewerMode::View => ViewerMode::Edit,
            ViewerMode::Edit => ViewerMode::View,
        };
        self.set_viewer_mode(mode);
    }

    pub fn render_pipeline(&self) -> Option<&RenderPipeline> {
        let render = self.render.as_ref()?;
        (Some(render.document) == self.active).then_some(&render.pipeline)
    }

    fn with_pipeline(&mut self, op: impl FnOnce(&mut RenderPipeline)) {
        let Some(render) = self.render.as_mut() else {
            return;
        };
        op(&mut render.pipeline);
        self.emit(SessionEvent::ViewChanged);
    }

    pub fn pdf_next_page(&mut self) {
        self.with_pipeline(RenderPipeline::next_page);
    }

    pub fn pdf_prev_page(&mut self) {
        self.with_pipeline(RenderPipeline::prev_page);
    }

    pub fn pdf_go_to_page(&mut self, page: usize) {
        self.with_pipeline(|pipeline| pipeline.go_to_page(page));
    }

    pub fn pdf_zoom_in(&mut self) {
        self.with_pipeline(RenderPipeline::zoom_in);
    }

    pub fn pdf_zoom_out(&mut self) {
        self.with_pipeline(RenderPipeline::zoom_out);
    }

    pub fn pdf_rotate(&mut self) {
        self.with_pipeline(RenderPipeline::rotate);
    }

    pub fn pdf_reload(&mut self) {
        self.with_pipeline(RenderPipeline::reload);
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        self.device_pixel_ratio = ratio;
        self.with_pipeline(|pipeline| pipeline.set_device_pixel_ratio(ratio));
    }

    pub fn poll_renders(&mut self) -> Vec<RenderEvent> {
        let Some(render) = self.render.as_mut() else {
            return Vec::new();
        };
        let events = render.pipeline.poll();
        if !events.is_empty() {
            self.emit(SessionEvent::ViewChanged);
        }
        events
    }

    fn swap_render(&mut self, id: DocumentId) {
        // Dropping the old pipeline cancels its work and releases its handle.
        self.render = None;

        let Some(doc) = self.document(id) else {
            return;
        };
        let payload = match (doc.category(), doc.content()) {
            (DocumentCategory::Pdf, DocumentContent::Binary(payload)) => payload.clone(),
            _ => return,
        };

        let mut pipeline =
            RenderPipeline::with_zoom(Rc::clone(&self.options.decoder), self.options.zoom);
        pipeline.set_device_pixel_ratio(self.device_pixel_ratio);
        pipeline.load(payload);
        self.render = Some(ActiveRender {
            document: id,
            pipeline,
        });
    }

    fn reload_render_if_showing(&mut self, id: DocumentId) {
        let Some(render) = self.render.as_mut() else {
            return;
        };
        if render.document != id {
            return;
        }
        let payload = self
            .documents
            .iter()
            .find(|doc| doc.id() == id)
            .and_then(|doc| doc.content().payload())
            .cloned();
        if let Some(payload) = payload {
            render.pipeline.load(payload);
        }
    }

    pub fn active_plain_text(&self, stripper: &dyn MarkupStripper) -> String {
        let Some(doc) = self.active_document() else {
            return String::new();
        };
        match (doc.category(), doc.content()) {
            (DocumentCategory::Text, DocumentContent::Text(text)) => text.clone(),
            (DocumentCategory::RichText, DocumentContent::Markup(html)) => stripper.strip(html),
            (
                DocumentCategory::Text
                | DocumentCategory::RichText
                | DocumentCategory::Image
                | DocumentCategory::Pdf
                | DocumentCategory::Binary
                | DocumentCategory::Unknown
                | DocumentCategory::Error,
                _,
            ) => String::new(),
        }
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&SessionEvent) + 'static) -> SubscriptionId {
        self.subscribers.add(Box::new(callback))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    fn emit(&mut self, event: SessionEvent) {
        self.subscribers.emit(&event);
    }
}

fn content_kind(content: &DocumentContent) -> &'static str {
    match content {
        DocumentContent::Text(_) => "text",
        DocumentContent::Markup(_) => "markup",
        DocumentContent::Binary(_) => "binary",
    }
}
