use crate::ipc::helpers::{to_json, with_session, HandlerErr, SessionStore};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn audit_list(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let logs = &store.data().audit_logs;
    let limit = match params.get("limit") {
        None => logs.len(),
        Some(v) if v.is_null() => logs.len(),
        Some(v) => v
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| HandlerErr::new("bad_params", "limit must be a non-negative integer"))?,
    };
    let entries: Vec<_> = logs.iter().take(limit).collect();
    Ok(json!({
        "entries": to_json(&entries)?,
        "total": logs.len(),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "audit.list" => Some(with_session(state, req, audit_list)),
        _ => None,
    }
}
