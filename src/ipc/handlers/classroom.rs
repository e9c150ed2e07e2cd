use crate::ipc::helpers::{get_required_str, parse_field, with_session, HandlerErr, SessionStore};
use crate::ipc::types::{AppState, Request};
use crate::model::MarkEntry;
use chrono::NaiveDate;
use serde_json::json;

fn attendance_record(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let date = get_required_str(params, "date")?;
    if NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
        return Err(HandlerErr::new("bad_params", "date must be YYYY-MM-DD"));
    }
    let target_class = get_required_str(params, "targetClass")?;
    let present_ids: Vec<String> = parse_field(params, "presentIds")?;
    let absent_ids: Vec<String> = parse_field(params, "absentIds")?;

    let touched = store.record_attendance(&date, &present_ids, &absent_ids, &target_class)?;
    Ok(json!({
        "date": date,
        "targetClass": target_class,
        "studentsInClass": touched,
    }))
}

fn marks_bulk_record(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let target_class = get_required_str(params, "targetClass")?;
    let subject = get_required_str(params, "subject")?;
    if subject.trim().is_empty() {
        return Err(HandlerErr::new("bad_params", "subject must not be empty"));
    }
    let entries: Vec<MarkEntry> = parse_field(params, "entries")?;

    let stars = store.record_bulk_marks(&target_class, &subject, &entries)?;
    Ok(json!({
        "targetClass": target_class,
        "subject": subject,
        "starStudentIds": stars,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.record" => Some(with_session(state, req, attendance_record)),
        "marks.bulkRecord" => Some(with_session(state, req, marks_bulk_record)),
        _ => None,
    }
}
