use crate::ipc::helpers::{
    get_optional_str, get_required_str, parse_params, to_json, with_session, HandlerErr,
    SessionStore,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{NewSchedule, Schedule};
use serde_json::json;

fn schedules_list(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let date = get_optional_str(params, "date");
    let schedules: Vec<&Schedule> = store
        .data()
        .schedules
        .iter()
        .filter(|s| date.as_deref().map_or(true, |d| s.date == d))
        .collect();
    Ok(json!({ "schedules": to_json(&schedules)? }))
}

fn schedules_add(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let form: NewSchedule = parse_params(params)?;
    if form.title.trim().is_empty() {
        return Err(HandlerErr::new("bad_params", "title must not be empty"));
    }
    let schedule = store.add_schedule(form)?;
    Ok(json!({ "scheduleId": schedule.id, "schedule": to_json(&schedule)? }))
}

fn schedules_toggle(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let schedule_id = get_required_str(params, "scheduleId")?;
    let schedule = store.toggle_schedule(&schedule_id)?;
    Ok(json!({ "scheduleId": schedule.id, "completed": schedule.completed }))
}

fn schedules_delete(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let schedule_id = get_required_str(params, "scheduleId")?;
    store.delete_schedule(&schedule_id)?;
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "schedules.list" => Some(with_session(state, req, schedules_list)),
        "schedules.add" => Some(with_session(state, req, schedules_add)),
        "schedules.toggle" => Some(with_session(state, req, schedules_toggle)),
        "schedules.delete" => Some(with_session(state, req, schedules_delete)),
        _ => None,
    }
}
