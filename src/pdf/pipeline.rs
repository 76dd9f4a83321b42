use std::{collections::VecDeque, rc::Rc};

use log::{debug, error, info, warn};

use crate::document::Payload;
use crate::pdf::decoder::{
    DecodedDocument, DocumentDecoder, LoadTask, RenderFault, RenderTask, TaskPoll,
};
use crate::pdf::state::{Command, Effect, RenderPhase, RenderState, RequestId, Rotation, ZoomLimits};
use crate::pdf::surface::{RasterSurface, Viewport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    Loaded { total_pages: usize },
    LoadFailed { message: String },
    Rendered { page: usize },
}

pub struct RenderPipeline {
    decoder: Rc<dyn DocumentDecoder>,
    state: RenderState,
    payload: Option<Payload>,
    document: Option<Box<dyn DecodedDocument>>,
    loading: Option<(RequestId, LoadTask)>,
    rendering: Option<(RequestId, RenderTask)>,
    surface: RasterSurface,
}

impl RenderPipeline {
    pub fn new(decoder: Rc<dyn DocumentDecoder>) -> Self {
        Self::with_zoom(decoder, ZoomLimits::default())
    }

    pub fn with_zoom(decoder: Rc<dyn DocumentDecoder>, zoom: ZoomLimits) -> Self {
        Self {
            decoder,
            state: RenderState::new(zoom),
            payload: None,
            document: None,
            loading: None,
            rendering: None,
            surface: RasterSurface::new(),
        }
    }

    pub fn load(&mut self, payload: Payload) {
        debug!("pdf load requested ({} bytes)", payload.len());
        self.payload = Some(payload);
        self.dispatch(Command::Load);
    }

    pub fn reload(&mut self) {
        if self.payload.is_some() {
            self.dispatch(Command::Load);
        }
    }

    pub fn unload(&mut self) {
        self.dispatch(Command::Unload);
        self.payload = None;
    }

    pub fn next_page(&mut self) {
        self.dispatch(Command::NextPage);
    }

    pub fn prev_page(&mut self) {
        self.dispatch(Command::PrevPage);
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.dispatch(Command::GoToPage(page));
    }

    pub fn zoom_in(&mut self) {
        self.dispatch(Command::ZoomIn);
    }

    pub fn zoom_out(&mut self) {
        self.dispatch(Command::ZoomOut);
    }

    pub fn rotate(&mut self) {
        self.dispatch(Command::Rotate);
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        self.dispatch(Command::SetDevicePixelRatio(ratio));
    }

    pub fn poll(&mut self) -> Vec<RenderEvent> {
        crate::profile_scope!("pdf.poll");
        let mut events = Vec::new();

        let load = self
            .loading
            .as_ref()
            .map(|(request, task)| (*request, task.poll()));
        if let Some((request, outcome)) = load {
            match outcome {
                TaskPoll::Pending => {}
                TaskPoll::Ready(Ok(document)) => {
                    self.loading = None;
                    let total_pages = document.page_count();
                    info!("pdf loaded: {total_pages} pages");
                    self.document = Some(document);
                    events.push(RenderEvent::Loaded { total_pages });
                    self.dispatch(Command::Loaded {
                        request,
                        total_pages,
                    });
                }
                TaskPoll::Ready(Err(err)) => {
                    self.loading = None;
                    warn!("pdf load failed: {err}");
                    events.push(self.fail_load(request, err.to_string()));
                }
                TaskPoll::Abandoned => {
                    self.loading = None;
                    warn!("pdf decoder dropped load request {}", request.0);
                    events.push(self.fail_load(request, "The document could not be loaded.".into()));
                }
            }
        }

        let render = self
            .rendering
            .as_ref()
            .map(|(request, task)| (*request, task.poll()));
        if let Some((request, outcome)) = render {
            match outcome {
                TaskPoll::Pending => {}
                TaskPoll::Ready(Ok(page)) => {
                    self.rendering = None;
                    let page_number = page.page_number;
                    if self.state.accepts_render(request) {
                        match self.surface.paint(page) {
                            Ok(()) => events.push(RenderEvent::Rendered { page: page_number }),
                            Err(fault) => error!("failed to paint page {page_number}: {fault}"),
                        }
                    }
                    self.dispatch(Command::RenderSettled { request });
                }
                TaskPoll::Ready(Err(RenderFault::Cancelled)) => {
                    self.rendering = None;
                    debug!("render {} cancelled", request.0);
                    self.dispatch(Command::RenderSettled { request });
                }
                TaskPoll::Ready(Err(fault)) => {
                    self.rendering = None;
                    error!("render of page {} failed: {fault}", self.state.current_page());
                    self.dispatch(Command::RenderSettled { request });
                }
                TaskPoll::Abandoned => {
                    self.rendering = None;
                    error!("decoder dropped render request {}", request.0);
                    self.dispatch(Command::RenderSettled { request });
                }
            }
        }

        events
    }

    pub fn phase(&self) -> &RenderPhase {
        self.state.phase()
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page()
    }

    pub fn total_pages(&self) -> usize {
        self.state.total_pages()
    }

    pub fn scale(&self) -> f32 {
        self.state.scale()
    }

    pub fn rotation(&self) -> Rotation {
        self.state.rotation()
    }

    pub fn is_idle(&self) -> bool {
        self.loading.is_none() && self.rendering.is_none()
    }

    fn fail_load(&mut self, request: RequestId, message: String) -> RenderEvent {
        self.dispatch(Command::LoadFailed {
            request,
            message: message.clone(),
        });
        RenderEvent::LoadFailed { message }
    }

    fn dispatch(&mut self, cmd: Command) {
        let mut queue = VecDeque::from([cmd]);
        while let Some(cmd) = queue.pop_front() {
            for effect in self.state.apply(cmd) {
                if let Some(follow_up) = self.run(effect) {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    fn run(&mut self, effect: Effect) -> Option<Command> {
        match effect {
            Effect::CancelLoad => {
                if let Some((request, task)) = self.loading.take() {
                    debug!("cancelling load {}", request.0);
                    task.cancel();
                }
                None
            }
            Effect::CancelRender => {
                if let Some((request, task)) = self.rendering.take() {
                    debug!("cancelling render {}", request.0);
                    task.cancel();
                }
                None
            }
            Effect::ReleaseDocument => {
                if let Some(document) = self.document.take() {
                    document.destroy();
                }
                self.surface.clear();
                None
            }
            Effect::LoadDocument { request } => match &self.payload {
                Some(payload) => {
                    self.loading = Some((request, self.decoder.load_document(payload.clone())));
                    None
                }
                None => Some(Command::LoadFailed {
                    request,
                    message: "No document to load.".into(),
                }),
            },
            Effect::RenderPage { request, page } => {
                let Some(document) = &self.document else {
                    return Some(Command::RenderSettled { request });
                };
                match document.page(page) {
                    Ok(handle) => {
                        let viewport = Viewport::new(
                            handle.size(),
                            self.state.scale(),
                            self.state.rotation(),
                            self.state.device_pixel_ratio(),
                        );
                        self.surface.resize_for(&viewport);
                        self.rendering = Some((request, handle.render(&viewport)));
                        None
                    }
                    Err(fault) => {
                        error!("cannot open page {page}: {fault}");
                        Some(Command::RenderSettled { request })
                    }
                }
            }
        }
    }
}

impl Drop for RenderPipeline {
    fn drop(&mut self) {
        self.dispatch(Command::Unload);
    }
}
