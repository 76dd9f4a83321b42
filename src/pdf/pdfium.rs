use std::{cell::RefCell, rc::Rc, sync::Arc};

use log::{debug, info};
use pdfium_render::prelude::*;

use crate::document::Payload;
use crate::pdf::decoder::{
    DecodeError, DecodedDocument, DecodedPage, DocumentDecoder, LoadTask, RenderFault, RenderTask,
    RenderedPage, Task,
};
use crate::pdf::state::Rotation;
use crate::pdf::surface::{PageSize, Viewport};

// Pdfium documents borrow the library handle, so each page render reopens
// the document from the shared payload bytes.
#[derive(Default)]
pub struct PdfiumDecoder {
    pdfium: RefCell<Option<Rc<Pdfium>>>,
    password: Option<String>,
}

impl PdfiumDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_password(password: impl Into<String>) -> Self {
        Self {
            pdfium: RefCell::new(None),
            password: Some(password.into()),
        }
    }

    fn ensure_pdfium(&self) -> Result<Rc<Pdfium>, DecodeError> {
        if let Some(pdfium) = self.pdfium.borrow().as_ref() {
            return Ok(Rc::clone(pdfium));
        }

        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| DecodeError::Io(format!("failed to bind pdfium library: {e}")))?;
        info!("pdfium bound");
        let pdfium = Rc::new(Pdfium::new(bindings));
        *self.pdfium.borrow_mut() = Some(Rc::clone(&pdfium));
        Ok(pdfium)
    }

    fn open(&self, bytes: &[u8]) -> Result<(Rc<Pdfium>, Vec<PageSize>), DecodeError> {
        let pdfium = self.ensure_pdfium()?;
        let page_sizes = {
            let document = pdfium
                .load_pdf_from_byte_slice(bytes, self.password.as_deref())
                .map_err(map_open_error)?;
            document
                .pages()
                .iter()
                .map(|page| PageSize::new(page.width().value, page.height().value))
                .collect::<Vec<_>>()
        };
        Ok((pdfium, page_sizes))
    }
}

impl DocumentDecoder for PdfiumDecoder {
    fn load_document(&self, payload: Payload) -> LoadTask {
        let bytes = payload.shared_bytes();
        let result = self.open(bytes.as_slice()).map(|(pdfium, page_sizes)| {
            debug!("pdfium opened document with {} pages", page_sizes.len());
            Box::new(PdfiumDocument {
                pdfium,
                bytes,
                password: self.password.clone(),
                page_sizes,
            }) as Box<dyn DecodedDocument>
        });
        Task::ready(result)
    }
}

struct PdfiumDocument {
    pdfium: Rc<Pdfium>,
    bytes: Arc<Vec<u8>>,
    password: Option<String>,
    page_sizes: Vec<PageSize>,
}

impl DecodedDocument for PdfiumDocument {
    fn page_count(&self) -> usize {
        self.page_sizes.len()
    }

    fn page(&self, page_number: usize) -> Result<Box<dyn DecodedPage>, RenderFault> {
        let size = page_number
            .checked_sub(1)
            .and_then(|index| self.page_sizes.get(index))
            .copied()
            .ok_or(RenderFault::InvalidPage(page_number))?;
        Ok(Box::new(PdfiumPage {
            pdfium: Rc::clone(&self.pdfium),
            bytes: Arc::clone(&self.bytes),
            password: self.password.clone(),
            number: page_number,
            size,
        }))
    }
}

struct PdfiumPage {
    pdfium: Rc<Pdfium>,
    bytes: Arc<Vec<u8>>,
    password: Option<String>,
    number: usize,
    size: PageSize,
}

impl PdfiumPage {
    fn rasterize(&self, viewport: &Viewport) -> Result<RenderedPage, RenderFault> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(self.bytes.as_slice(), self.password.as_deref())
            .map_err(|e| RenderFault::Failed(format!("failed to reopen document: {e}")))?;
        let page = document
            .pages()
            .get((self.number - 1) as u16)
            .map_err(|_| RenderFault::InvalidPage(self.number))?;

        let rotation = match viewport.rotation {
            Rotation::R0 => PdfPageRenderRotation::None,
            Rotation::R90 => PdfPageRenderRotation::Degrees90,
            Rotation::R180 => PdfPageRenderRotation::Degrees180,
            Rotation::R270 => PdfPageRenderRotation::Degrees270,
        };
        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .scale_page_by_factor(viewport.render_scale())
                    .rotate(rotation, true)
                    .render_annotations(true)
                    .render_form_data(true),
            )
            .map_err(|e| RenderFault::Failed(e.to_string()))?;

        Ok(RenderedPage {
            page_number: self.number,
            width: bitmap.width() as u32,
            height: bitmap.height() as u32,
            rgba: bitmap.as_rgba_bytes(),
        })
    }
}

impl DecodedPage for PdfiumPage {
    fn page_number(&self) -> usize {
        self.number
    }

    fn size(&self) -> PageSize {
        self.size
    }

    fn render(&self, viewport: &Viewport) -> RenderTask {
        let (completer, task) = Task::channel();
        completer.complete(self.rasterize(viewport));
        task
    }
}

fn map_open_error(error: PdfiumError) -> DecodeError {
    match error {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            DecodeError::PasswordRequired
        }
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::FormatError) => {
            DecodeError::Invalid("the file is damaged or not a PDF".into())
        }
        other => DecodeError::Io(other.to_string()),
    }
}
