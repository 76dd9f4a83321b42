use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::document::Payload;
use crate::pdf::surface::{PageSize, Viewport};

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("PDF support is not enabled in this build")]
    FeatureDisabled,
    #[error("this PDF is password protected")]
    PasswordRequired,
    #[error("invalid PDF: {0}")]
    Invalid(String),
    #[error("failed to load PDF: {0}")]
    Io(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderFault {
    #[error("render cancelled")]
    Cancelled,
    #[error("page {0} is out of range")]
    InvalidPage(usize),
    #[error("render failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub page_number: usize,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

pub enum TaskPoll<T> {
    Pending,
    Ready(T),
    Abandoned,
}

pub struct Task<T> {
    token: CancellationToken,
    receiver: flume::Receiver<T>,
}

// Completing after cancellation is allowed and is a no-op.
pub struct Completer<T> {
    token: CancellationToken,
    sender: flume::Sender<T>,
}

pub type LoadTask = Task<Result<Box<dyn DecodedDocument>, DecodeError>>;
pub type RenderTask = Task<Result<RenderedPage, RenderFault>>;

impl<T> Task<T> {
    pub fn channel() -> (Completer<T>, Task<T>) {
        let (sender, receiver) = flume::bounded(1);
        let token = CancellationToken::new();
        (
            Completer {
                token: token.clone(),
                sender,
            },
            Task { token, receiver },
        )
    }

    pub fn ready(value: T) -> Self {
        let (completer, task) = Self::channel();
        completer.complete(value);
        task
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn poll(&self) -> TaskPoll<T> {
        match self.receiver.try_recv() {
            Ok(value) => TaskPoll::Ready(value),
            Err(flume::TryRecvError::Empty) => TaskPoll::Pending,
            Err(flume::TryRecvError::Disconnected) => TaskPoll::Abandoned,
        }
    }

    pub fn cancel(self) {
        self.token.cancel();
    }
}

impl<T> Completer<T> {
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn complete(self, value: T) {
        if self.token.is_cancelled() {
            return;
        }
        // Receiver gone means the task was cancelled or dropped.
        let _ = self.sender.send(value);
    }
}

pub trait DocumentDecoder {
    fn load_document(&self, payload: Payload) -> LoadTask;
}

pub trait DecodedDocument {
    fn page_count(&self) -> usize;

    // page_number is 1-based.
    fn page(&self, page_number: usize) -> Result<Box<dyn DecodedPage>, RenderFault>;

    fn destroy(self: Box<Self>) {}
}

pub trait DecodedPage {
    fn page_number(&self) -> usize;

    fn size(&self) -> PageSize;

    fn render(&self, viewport: &Viewport) -> RenderTask;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledDecoder;

impl DocumentDecoder for DisabledDecoder {
    fn load_document(&self, _payload: Payload) -> LoadTask {
        Task::ready(Err(DecodeError::FeatureDisabled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_task_never_yields() {
        let (completer, task) = Task::<u32>::channel();
        let token = task.token().clone();
        task.cancel();

        assert!(token.is_cancelled());
        assert!(completer.is_cancelled());
        completer.complete(7);
    }

    #[test]
    fn completed_task_yields_once() {
        let task = Task::ready(5_u32);
        assert!(matches!(task.poll(), TaskPoll::Ready(5)));
        assert!(matches!(task.poll(), TaskPoll::Abandoned));
    }

    #[test]
    fn pending_until_completed() {
        let (completer, task) = Task::<&str>::channel();
        assert!(matches!(task.poll(), TaskPoll::Pending));
        completer.complete("done");
        assert!(matches!(task.poll(), TaskPoll::Ready("done")));
    }

    #[test]
    fn disabled_decoder_reports_feature_error() {
        let task = DisabledDecoder.load_document(Payload::new(b"%PDF-1.4".to_vec(), "application/pdf"));
        match task.poll() {
            TaskPoll::Ready(Err(err)) => {
                assert_eq!(err, DecodeError::FeatureDisabled);
                assert_eq!(err.to_string(), "PDF support is not enabled in this build");
            }
            _ => panic!("expected an immediate failure"),
        }
    }
}
