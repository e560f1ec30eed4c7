//! Change notifications for whatever is presenting a practice session.
//!
//! Every state transition emits a [`SessionEvent`]. Views subscribe with
//! [`EventBus::subscribe`] and redraw from the events they receive instead of
//! polling the state machine.

use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::practice::{Composition, Provenance, TimerState};

use super::RequestId;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    TaskSelected { session_id: Uuid, task_id: String },
    DraftUpdated { session_id: Uuid, composition: Composition },
    TimerChanged { session_id: Uuid, timer: TimerState },
    Submitted { session_id: Uuid, request_id: RequestId },
    FeedbackReady { session_id: Uuid, request_id: RequestId, provenance: Provenance },
    StaleFeedbackIgnored { request_id: RequestId },
    AnnotationToggled { session_id: Uuid, annotation: usize, showing_replacement: bool },
    EditResumed { session_id: Uuid },
    SessionDiscarded { session_id: Uuid },
    Reset,
}

/// Fan-out of session events to any number of subscribers.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<mpsc::UnboundedSender<SessionEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Delivers `event` to every live subscriber and forgets closed ones.
    pub fn emit(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
