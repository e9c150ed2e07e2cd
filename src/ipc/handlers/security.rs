use crate::backup;
use crate::ipc::helpers::{
    get_required_str, require_session, respond, to_json, with_session, HandlerErr, SessionStore,
};
use crate::ipc::types::{AppState, Request};
use crate::model::AppData;
use crate::store::ConfirmedAction;
use anyhow::Context;
use serde_json::json;
use std::path::Path;

fn load_bundle(path: &Path) -> anyhow::Result<AppData> {
    let payload = backup::read_state_bundle(path)?;
    serde_json::from_str(&payload).context("backup state is not a valid tutordesk state")
}

fn security_pending(store: &mut SessionStore, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "pending": to_json(&store.pending_confirmation())? }))
}

fn security_cancel(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let request_id = get_required_str(params, "requestId")?;
    let cancelled = store.cancel_confirmation(&request_id)?;
    Ok(json!({ "cancelled": to_json(&cancelled)? }))
}

fn security_confirm(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let request_id = get_required_str(params, "requestId")?;
    let done = require_session(state)?.confirm(&request_id, &load_bundle)?;
    let result = match done {
        ConfirmedAction::StudentDeleted { student_id } => {
            if state.selected_student.as_deref() == Some(student_id.as_str()) {
                state.selected_student = None;
            }
            json!({ "action": "deleteStudent", "studentId": student_id })
        }
        ConfirmedAction::FeeUnchecked { student_id, month } => {
            json!({ "action": "uncheckFee", "studentId": student_id, "month": month })
        }
        ConfirmedAction::BackupRestored { bundle_path } => {
            state.selected_student = None;
            json!({ "action": "restoreBackup", "bundlePath": bundle_path.to_string_lossy() })
        }
    };
    Ok(result)
}

fn handle_security_confirm(state: &mut AppState, req: &Request) -> serde_json::Value {
    let result = security_confirm(state, &req.params);
    respond(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "security.pending" => Some(with_session(state, req, security_pending)),
        "security.confirm" => Some(handle_security_confirm(state, req)),
        "security.cancel" => Some(with_session(state, req, security_cancel)),
        _ => None,
    }
}
