use crate::model::AuditLogEntry;
use uuid::Uuid;

pub const AUDIT_LOG_CAP: usize = 200;

pub fn new_entry(event: impl Into<String>) -> AuditLogEntry {
    AuditLogEntry {
        id: Uuid::new_v4().to_string(),
        event: event.into(),
        timestamp: chrono::Local::now()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    }
}

/// Newest first. Anything past the cap falls off the end.
pub fn prepend(logs: &mut Vec<AuditLogEntry>, entry: AuditLogEntry) {
    logs.insert(0, entry);
    logs.truncate(AUDIT_LOG_CAP);
}
