use crate::document::DocumentId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Opened(DocumentId),
    ContentChanged(DocumentId),
    Saved(DocumentId),
    Closed(DocumentId),
    Activated(Option<DocumentId>),
    Reordered,
    ViewChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&SessionEvent)>;

#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

impl Subscribers {
    pub(crate) fn add(&mut self, callback: Callback) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.callbacks.push((id, callback));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    pub(crate) fn emit(&mut self, event: &SessionEvent) {
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }
}
