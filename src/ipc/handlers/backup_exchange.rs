use crate::backup;
use crate::ipc::helpers::{get_required_str, to_json, with_session, HandlerErr, SessionStore};
use crate::ipc::types::{AppState, Request};
use crate::model::AppData;
use log::info;
use serde_json::json;
use std::path::PathBuf;

fn backup_export(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let out_path = PathBuf::from(get_required_str(params, "outPath")?);
    let stored = store
        .storage()
        .load_payload()
        .map_err(|e| HandlerErr::new("storage_failed", format!("{e:#}")))?;
    // A workspace that was never written has no blob yet.
    let payload = match stored {
        Some(p) => p,
        None => serde_json::to_string(store.data())
            .map_err(|e| HandlerErr::new("internal", e.to_string()))?,
    };
    let summary = backup::export_state_bundle(&payload, &out_path)
        .map_err(|e| HandlerErr::new("backup_failed", format!("{e:#}")))?;
    info!("exported backup to {}", out_path.to_string_lossy());
    Ok(json!({
        "outPath": out_path.to_string_lossy(),
        "bundleFormat": summary.bundle_format,
        "entryCount": summary.entry_count,
        "sha256": summary.sha256,
    }))
}

/// Validates the bundle now; the actual replacement waits for confirmation.
fn backup_import(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let in_path = PathBuf::from(get_required_str(params, "inPath")?);
    let payload = backup::read_state_bundle(&in_path)
        .map_err(|e| HandlerErr::new("backup_failed", format!("{e:#}")))?;
    let incoming: AppData = serde_json::from_str(&payload)
        .map_err(|e| HandlerErr::new("backup_failed", e.to_string()))?;
    let request = store.request_restore(in_path);
    Ok(json!({
        "studentCount": incoming.students.len(),
        "confirmationRequired": to_json(&request)?,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.export" => Some(with_session(state, req, backup_export)),
        "backup.import" => Some(with_session(state, req, backup_import)),
        _ => None,
    }
}
