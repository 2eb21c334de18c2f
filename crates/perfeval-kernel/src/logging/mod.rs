//! Tamper-evident audit trail
//!
//! Every committed state change appends an [`AuditEvent`] to the
//! [`AuditLog`]. Each event carries the SHA-256 of its predecessor, so
//! [`AuditLog::verify_integrity`] detects any edited or dropped entry.

use crate::error::{LogError, Operation};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use perfeval_model::{ActorRole, DepartmentId, EvaluationStatus, RecordId, UserId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditEventId(pub Uuid);

impl AuditEventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AuditEventId {
    fn default() -> Self {
        Self::new()
    }
}

/// One committed workflow action, chained to its predecessor by hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: AuditEventId,
    pub timestamp: DateTime<Utc>,
    pub record_id: RecordId,
    pub department_id: DepartmentId,
    pub actor: UserId,
    pub role: ActorRole,
    pub action: String,
    pub from: Option<EvaluationStatus>,
    pub to: EvaluationStatus,
    pub comments: Option<String>,
    #[serde(with = "hex_bytes")]
    pub prev_hash: [u8; 32],
    #[serde(with = "hex_bytes")]
    pub hash: [u8; 32],
}

impl AuditEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        record_id: RecordId,
        department_id: DepartmentId,
        actor: UserId,
        role: ActorRole,
        operation: Operation,
        from: Option<EvaluationStatus>,
        to: EvaluationStatus,
        comments: Option<String>,
    ) -> Self {
        Self {
            event_id: AuditEventId::new(),
            timestamp: Utc::now(),
            record_id,
            department_id,
            actor,
            role,
            action: operation.as_str().to_string(),
            from,
            to,
            comments,
            prev_hash: [0u8; 32],
            hash: [0u8; 32],
        }
    }

    #[must_use]
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

/// Append-only, hash-chained audit trail shared by every record
#[derive(Debug, Default)]
pub struct AuditLog {
    inner: Mutex<Vec<AuditEvent>>,
}

impl AuditLog {
    pub fn append(&self, mut event: AuditEvent) -> AuditEventId {
        let mut guard = self.inner.lock();
        let prev_hash = guard.last().map(|e| e.hash).unwrap_or([0u8; 32]);
        event.prev_hash = prev_hash;
        event.hash = compute_hash(&event);
        let id = event.event_id;
        guard.push(event);
        id
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.inner.lock().clone()
    }

    pub fn events_for(&self, record_id: RecordId) -> Vec<AuditEvent> {
        self.inner
            .lock()
            .iter()
            .filter(|e| e.record_id == record_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn verify_integrity(&self) -> Result<(), LogError> {
        verify_chain(&self.inner.lock())
    }
}

/// Check an exported event sequence
pub fn verify_chain(events: &[AuditEvent]) -> Result<(), LogError> {
    let mut prev = [0u8; 32];
    for (index, e) in events.iter().enumerate() {
        if e.prev_hash != prev || e.hash != compute_hash(e) {
            return Err(LogError::IntegrityViolation { index });
        }
        prev = e.hash;
    }
    Ok(())
}

fn compute_hash(event: &AuditEvent) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(event.event_id.0.as_bytes());
    hasher.update(event.timestamp.timestamp_micros().to_le_bytes());
    hasher.update(event.record_id.0.to_bytes());
    hasher.update(event.department_id.as_str().as_bytes());
    hasher.update([0]);
    hasher.update(event.actor.as_str().as_bytes());
    hasher.update([0]);
    hasher.update(event.role.as_str().as_bytes());
    hasher.update([0]);
    hasher.update(event.action.as_bytes());
    hasher.update([0]);
    hasher.update(event.from.map_or("", EvaluationStatus::as_str).as_bytes());
    hasher.update([0]);
    hasher.update(event.to.as_str().as_bytes());
    hasher.update([0]);
    hasher.update(event.comments.as_deref().unwrap_or("").as_bytes());
    hasher.update([0]);
    hasher.update(event.prev_hash);
    hasher.finalize().into()
}

mod hex_bytes {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = hex::decode(&text).map_err(D::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| D::Error::custom("expected 32 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(to: EvaluationStatus) -> AuditEvent {
        AuditEvent::new(
            RecordId::new(),
            "finance".into(),
            "alice".into(),
            ActorRole::Contributor,
            Operation::Submit,
            Some(EvaluationStatus::Draft),
            to,
            None,
        )
    }

    #[test]
    fn appended_events_form_a_chain() {
        let log = AuditLog::default();
        log.append(event(EvaluationStatus::Submitted));
        log.append(event(EvaluationStatus::DirectorApproved));

        let events = log.events();
        assert_eq!(events[0].prev_hash, [0u8; 32]);
        assert_eq!(events[1].prev_hash, events[0].hash);
        assert!(log.verify_integrity().is_ok());
    }

    #[test]
    fn tampering_is_detected() {
        let log = AuditLog::default();
        log.append(event(EvaluationStatus::Submitted));
        log.append(event(EvaluationStatus::DirectorApproved));

        let mut events = log.events();
        events[0].comments = Some("rewritten".into());
        assert_eq!(
            verify_chain(&events),
            Err(LogError::IntegrityViolation { index: 0 })
        );
    }

    #[test]
    fn events_survive_json_export() {
        let log = AuditLog::default();
        log.append(event(EvaluationStatus::Submitted));

        let json = serde_json::to_string(&log.events()).unwrap();
        let restored: Vec<AuditEvent> = serde_json::from_str(&json).unwrap();
        assert!(verify_chain(&restored).is_ok());
        assert_eq!(restored[0].hash_hex().len(), 64);
    }
}
