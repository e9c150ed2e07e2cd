use crate::ipc::helpers::{get_required_str, require_workspace, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use log::{info, warn};
use serde_json::json;

fn auth_login(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let password = get_required_str(params, "password")?;
    let (_, cfg) = require_workspace(state)?;
    if password != cfg.admin_password {
        warn!("rejected admin login attempt");
        return Err(HandlerErr::new("invalid_credential", "Invalid Admin Password!"));
    }
    if let Some(store) = state.store.as_mut() {
        store.record_login()?;
    }
    state.logged_in = true;
    info!("admin session opened");
    Ok(json!({ "loggedIn": true }))
}

fn handle_auth_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let result = auth_login(state, &req.params);
    respond(&req.id, result)
}

fn handle_auth_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.logged_in = false;
    state.selected_student = None;
    if let Some(req) = state.store.as_mut().and_then(|store| store.discard_confirmation()) {
        info!("logout discarded confirmation {}", req.request_id);
    }
    respond(&req.id, Ok(json!({ "loggedIn": false })))
}

fn handle_auth_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(
        &req.id,
        Ok(json!({
            "loggedIn": state.logged_in,
            "workspaceSelected": state.store.is_some(),
        })),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.login" => Some(handle_auth_login(state, req)),
        "auth.logout" => Some(handle_auth_logout(state, req)),
        "auth.status" => Some(handle_auth_status(state, req)),
        _ => None,
    }
}
