use crate::config::Config;
use crate::db::SqliteStorage;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;
use log::{info, warn};
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "loggedIn": state.logged_in,
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    let config = match Config::load(&path) {
        Ok(c) => c,
        Err(e) => {
            warn!("rejecting workspace {}: {:#}", path.to_string_lossy(), e);
            return err(&req.id, "bad_config", format!("{e:#}"), None);
        }
    };

    let opened = SqliteStorage::open(&path, config.storage_key.clone())
        .and_then(|storage| Store::open(storage, config.reference()));
    match opened {
        Ok(store) => {
            info!("workspace selected: {}", path.to_string_lossy());
            let student_count = store.data().students.len();
            state.workspace = Some(path.clone());
            state.store = Some(store);
            state.config = Some(config);
            // A different workspace means a different admin secret.
            state.logged_in = false;
            state.selected_student = None;
            state.celebration = None;
            ok(
                &req.id,
                json!({
                    "workspacePath": path.to_string_lossy(),
                    "studentCount": student_count,
                }),
            )
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

fn handle_reference_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let result = match state.config.as_ref() {
        Some(cfg) => Ok(json!({
            "classes": cfg.classes,
            "months": cfg.months,
            "currentYear": cfg.current_year,
            "feeReminderDay": cfg.fee_reminder_day,
        })),
        None => Err(HandlerErr::new("no_workspace", "select a workspace first")),
    };
    respond(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "reference.get" => Some(handle_reference_get(state, req)),
        _ => None,
    }
}
