//! Rejection notifications
//!
//! After a rejection is committed the engine hands a [`RejectionEvent`] to
//! every registered [`RejectionSink`]. Delivering it to the department's
//! contributors is the sink's business; the engine only guarantees the
//! comments were persisted before any sink is called.

use parking_lot::Mutex;
use perfeval_model::{ActorRole, DepartmentId, RecordId, UserId};
use serde::{Deserialize, Serialize};

/// Emitted once per committed rejection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionEvent {
    pub record_id: RecordId,
    pub department_id: DepartmentId,
    pub rejected_by: UserId,
    pub rejected_by_role: ActorRole,
    pub comments: String,
}

/// Notification collaborator hook
pub trait RejectionSink: Send + Sync {
    fn on_rejection(&self, event: &RejectionEvent);
}

/// Sink that keeps every event, for tests and the CLI
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<RejectionEvent>>,
}

impl MemorySink {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RejectionEvent> {
        self.events.lock().clone()
    }

    pub fn drain(&self) -> Vec<RejectionEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl RejectionSink for MemorySink {
    fn on_rejection(&self, event: &RejectionEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_collects_and_drains() {
        let sink = MemorySink::new();
        sink.on_rejection(&RejectionEvent {
            record_id: RecordId::new(),
            department_id: "finance".into(),
            rejected_by: "dir".into(),
            rejected_by_role: ActorRole::Director,
            comments: "missing Q3 data".into(),
        });

        assert_eq!(sink.events().len(), 1);
        assert_eq!(sink.drain()[0].comments, "missing Q3 data");
        assert!(sink.events().is_empty());
    }
}
