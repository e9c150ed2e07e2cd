use crate::ipc::helpers::{
    get_optional_str, require_session, respond, to_json, with_session, HandlerErr, SessionStore,
};
use crate::ipc::types::{AppState, Request};
use crate::views::{self, DashboardOptions};
use chrono::NaiveDate;
use serde_json::json;

fn views_directory(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let query = get_optional_str(params, "query").unwrap_or_default();
    let class_filter = get_optional_str(params, "classFilter");
    let students = views::directory(&store.data().students, &query, class_filter.as_deref());
    Ok(json!({ "students": to_json(&students)? }))
}

fn views_archived(store: &mut SessionStore, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let students = views::archived_students(&store.data().students);
    Ok(json!({ "students": to_json(&students)? }))
}

fn views_dashboard(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let today = match get_optional_str(params, "today") {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map_err(|_| HandlerErr::new("bad_params", "today must be YYYY-MM-DD"))?,
        None => chrono::Local::now().date_naive(),
    };
    let opts = match state.config.as_ref() {
        Some(cfg) => DashboardOptions {
            reminder_day: cfg.fee_reminder_day,
            preview_limit: cfg.reminder_preview_limit,
        },
        None => return Err(HandlerErr::new("no_workspace", "select a workspace first")),
    };
    let store = require_session(state)?;
    let stats = views::dashboard(&store.data().students, store.reference(), today, &opts);
    to_json(&stats)
}

fn ui_celebration(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    if state.celebration.as_ref().is_some_and(|c| !c.is_live()) {
        state.celebration = None;
    }
    Ok(json!({
        "celebrate": state.celebration.as_ref().map(|c| c.student_name.clone()),
    }))
}

fn handle_views_dashboard(state: &mut AppState, req: &Request) -> serde_json::Value {
    let result = views_dashboard(state, &req.params);
    respond(&req.id, result)
}

fn handle_ui_celebration(state: &mut AppState, req: &Request) -> serde_json::Value {
    let result = ui_celebration(state);
    respond(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "views.directory" => Some(with_session(state, req, views_directory)),
        "views.archived" => Some(with_session(state, req, views_archived)),
        "views.dashboard" => Some(handle_views_dashboard(state, req)),
        "ui.celebration" => Some(handle_ui_celebration(state, req)),
        _ => None,
    }
}
