use image::RgbaImage;

use crate::pdf::decoder::{RenderFault, RenderedPage};
use crate::pdf::state::Rotation;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub rotation: Rotation,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(page: PageSize, scale: f32, rotation: Rotation, device_pixel_ratio: f32) -> Self {
        let (width, height) = if rotation.is_quarter_turn() {
            (page.height * scale, page.width * scale)
        } else {
            (page.width * scale, page.height * scale)
        };
        Self {
            width,
            height,
            scale,
            rotation,
            device_pixel_ratio: device_pixel_ratio.max(0.1),
        }
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width * self.device_pixel_ratio).floor() as u32,
            (self.height * self.device_pixel_ratio).floor() as u32,
        )
    }

    pub fn layout_size(&self) -> (u32, u32) {
        (self.width.floor() as u32, self.height.floor() as u32)
    }

    pub fn render_scale(&self) -> f32 {
        self.scale * self.device_pixel_ratio
    }
}

#[derive(Debug, Default)]
pub struct RasterSurface {
    pixel_size: (u32, u32),
    layout_size: (u32, u32),
    image: Option<RgbaImage>,
    painted_page: Option<usize>,
}

impl RasterSurface {
    pub fn new() -> Self {
        Self::default()
    }

    // Resizing discards whatever was painted.
    pub fn resize_for(&mut self, viewport: &Viewport) {
        self.pixel_size = viewport.pixel_size();
        self.layout_size = viewport.layout_size();
        self.image = None;
        self.painted_page = None;
    }

    pub fn paint(&mut self, page: RenderedPage) -> Result<(), RenderFault> {
        let RenderedPage {
            page_number,
            width,
            height,
            rgba,
        } = page;
        let image = RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
            RenderFault::Failed(format!("bitmap for page {page_number} is not {width}x{height} RGBA"))
        })?;
        self.image = Some(image);
        self.painted_page = Some(page_number);
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        self.pixel_size
    }

    pub fn layout_size(&self) -> (u32, u32) {
        self.layout_size
    }

    pub fn painted_page(&self) -> Option<usize> {
        self.painted_page
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    pub fn snapshot(&self) -> Option<RgbaImage> {
        self.image.clone()
    }
}
