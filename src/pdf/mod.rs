pub mod decoder;
#[cfg(feature = "pdf")]
pub mod pdfium;
pub mod pipeline;
pub mod state;
pub mod surface;

use std::rc::Rc;

pub use decoder::{
    CancellationToken, DecodeError, DecodedDocument, DecodedPage, DisabledDecoder,
    DocumentDecoder, LoadTask, RenderFault, RenderTask, RenderedPage,
};
pub use pipeline::{RenderEvent, RenderPipeline};
pub use state::{RenderPhase, RenderState, Rotation, ZoomLimits};
pub use surface::{PageSize, RasterSurface, Viewport};

pub const DEFAULT_SCALE: f32 = 1.2;
pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 3.0;
pub const ZOOM_STEP: f32 = 0.2;

pub fn default_decoder() -> Rc<dyn DocumentDecoder> {
    #[cfg(feature = "pdf")]
    {
        Rc::new(pdfium::PdfiumDecoder::new())
    }

    #[cfg(not(feature = "pdf"))]
    {
        Rc::new(DisabledDecoder)
    }
}
