use serde::{Deserialize, Serialize};

use crate::pdf::{DEFAULT_SCALE, MAX_SCALE, MIN_SCALE, ZOOM_STEP};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderPhase {
    Unloaded,
    Loading,
    Ready,
    Rendering,
    // `message` is shown to the user as-is.
    Failed { message: String },
}

impl RenderPhase {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Ready | Self::Rendering)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub const fn degrees(self) -> u16 {
        match self {
            Self::R0 => 0,
            Self::R90 => 90,
            Self::R180 => 180,
            Self::R270 => 270,
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::R0 => Self::R90,
            Self::R90 => Self::R180,
            Self::R180 => Self::R270,
            Self::R270 => Self::R0,
        }
    }

    pub const fn is_quarter_turn(self) -> bool {
        matches!(self, Self::R90 | Self::R270)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomLimits {
    pub default: u32,
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self::from_factors(DEFAULT_SCALE, MIN_SCALE, MAX_SCALE, ZOOM_STEP)
    }
}

impl ZoomLimits {
    pub fn from_factors(default: f32, min: f32, max: f32, step: f32) -> Self {
        let min = to_hundredths(min).max(1);
        let max = to_hundredths(max).max(min);
        Self {
            default: to_hundredths(default).clamp(min, max),
            min,
            max,
            step: to_hundredths(step).max(1),
        }
    }
}

fn to_hundredths(factor: f32) -> u32 {
    (factor.max(0.0) * 100.0).round() as u32
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load,
    Loaded { request: RequestId, total_pages: usize },
    LoadFailed { request: RequestId, message: String },
    NextPage,
    PrevPage,
    GoToPage(usize),
    ZoomIn,
    ZoomOut,
    Rotate,
    SetDevicePixelRatio(f32),
    RenderSettled { request: RequestId },
    Unload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CancelLoad,
    CancelRender,
    ReleaseDocument,
    LoadDocument { request: RequestId },
    RenderPage { request: RequestId, page: usize },
}

#[derive(Debug, Clone)]
pub struct RenderState {
    phase: RenderPhase,
    total_pages: usize,
    current_page: usize,
    zoom: ZoomLimits,
    scale: u32,
    rotation: Rotation,
    device_pixel_ratio: f32,
    next_request: u64,
    pending_load: Option<RequestId>,
    in_flight: Option<RequestId>,
    has_document: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new(ZoomLimits::default())
    }
}

impl RenderState {
    #[must_use]
    pub fn new(zoom: ZoomLimits) -> Self {
        Self {
            phase: RenderPhase::Unloaded,
            total_pages: 0,
            current_page: 1,
            scale: zoom.default,
            zoom,
            rotation: Rotation::R0,
            device_pixel_ratio: 1.0,
            next_request: 0,
            pending_load: None,
            in_flight: None,
            has_document: false,
        }
    }

    pub fn phase(&self) -> &RenderPhase {
        &self.phase
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn scale(&self) -> f32 {
        self.scale as f32 / 100.0
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    pub fn pending_load(&self) -> Option<RequestId> {
        self.pending_load
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd {
            Command::Load => {
                let mut effects = self.teardown();
                let request = self.next_request_id();
                self.pending_load = Some(request);
                self.phase = RenderPhase::Loading;
                effects.push(Effect::LoadDocument { request });
                effects
            }

            Command::Loaded {
                request,
                total_pages,
            } => {
                if self.pending_load != Some(request) {
                    return Vec::new();
                }
                self.pending_load = None;
                self.has_document = true;
                self.total_pages = total_pages;
                self.current_page = 1;
                self.phase = RenderPhase::Ready;
                self.render_current_page()
            }

            Command::LoadFailed { request, message } => {
                if self.pending_load != Some(request) {
                    return Vec::new();
                }
                self.pending_load = None;
                self.phase = RenderPhase::Failed { message };
                Vec::new()
            }

            Command::NextPage => {
                let target = self.current_page.saturating_add(1);
                self.navigate(target)
            }

            Command::PrevPage => {
                let target = self.current_page.saturating_sub(1);
                self.navigate(target)
            }

            Command::GoToPage(page) => self.navigate(page),

            Command::ZoomIn => {
                self.scale = (self.scale + self.zoom.step).min(self.zoom.max);
                self.render_current_page()
            }

            Command::ZoomOut => {
                self.scale = self.scale.saturating_sub(self.zoom.step).max(self.zoom.min);
                self.render_current_page()
            }

            Command::Rotate => {
                self.rotation = self.rotation.next();
                self.render_current_page()
            }

            Command::SetDevicePixelRatio(ratio) => {
                let ratio = if ratio.is_finite() { ratio.max(0.1) } else { 1.0 };
                if (self.device_pixel_ratio - ratio).abs() <= f32::EPSILON {
                    return Vec::new();
                }
                self.device_pixel_ratio = ratio;
                self.render_current_page()
            }

            Command::RenderSettled { request } => {
                if self.in_flight == Some(request) {
                    self.in_flight = None;
                    self.phase = RenderPhase::Ready;
                }
                Vec::new()
            }

            Command::Unload => {
                let effects = self.teardown();
                self.phase = RenderPhase::Unloaded;
                effects
            }
        }
    }

    pub fn accepts_render(&self, request: RequestId) -> bool {
        self.in_flight == Some(request)
    }

    fn navigate(&mut self, target: usize) -> Vec<Effect> {
        if !self.phase.is_loaded() {
            return Vec::new();
        }
        self.current_page = target.clamp(1, self.total_pages.max(1));
        self.render_current_page()
    }

    fn render_current_page(&mut self) -> Vec<Effect> {
        if !self.phase.is_loaded() {
            return Vec::new();
        }
        let mut effects = Vec::with_capacity(2);
        if self.in_flight.take().is_some() {
            effects.push(Effect::CancelRender);
        }
        let request = self.next_request_id();
        self.in_flight = Some(request);
        self.phase = RenderPhase::Rendering;
        effects.push(Effect::RenderPage {
            request,
            page: self.current_page,
        });
        effects
    }

    fn teardown(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.in_flight.take().is_some() {
            effects.push(Effect::CancelRender);
        }
        if self.pending_load.take().is_some() {
            effects.push(Effect::CancelLoad);
        }
        if std::mem::take(&mut self.has_document) {
            effects.push(Effect::ReleaseDocument);
        }
        self.total_pages = 0;
        self.current_page = 1;
        effects
    }

    fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }
}
