use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::id::EventId;

/// What part of the pipeline an [`Event`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Llm,
    Retrieve,
    Wrapper,
}

/// Handle passed down through chat and query calls so instrumentation can
/// group related callbacks. The adapter logic never inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub kind: EventKind,
    pub parent_id: Option<EventId>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            id: EventId::new(),
            kind,
            parent_id: None,
            tags: Vec::new(),
        }
    }

    /// A new event whose parent is `self`.
    pub fn child(&self, kind: EventKind) -> Self {
        Self {
            id: EventId::new(),
            kind,
            parent_id: Some(self.id),
            tags: self.tags.clone(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CallbackEvent {
    /// One streamed fragment; `token` is `None` on the terminating event.
    LlmStream {
        event: Event,
        index: usize,
        token: Option<String>,
        is_done: bool,
    },
    Retrieve {
        event: Event,
        query: String,
        nodes: usize,
    },
    #[serde(other)]
    Unknown,
}

pub struct EventBus {
    sender: broadcast::Sender<CallbackEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CallbackEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: CallbackEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}
