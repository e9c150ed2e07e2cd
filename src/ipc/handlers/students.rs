use crate::ipc::helpers::{
    get_optional_str, get_required_str, parse_field, parse_params, require_session, respond,
    to_json, with_session, HandlerErr, SessionStore,
};
use crate::ipc::types::{AppState, Celebration, Request};
use crate::model::{NewStudent, StudentPatch};
use serde_json::json;
use std::time::Duration;

fn students_list(store: &mut SessionStore, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "students": to_json(&store.data().students)? }))
}

fn students_get(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let student = store.student(&student_id)?;
    Ok(json!({ "student": to_json(student)? }))
}

fn students_admit(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let form: NewStudent = parse_params(params)?;
    if form.name.trim().is_empty() {
        return Err(HandlerErr::new("bad_params", "name must not be empty"));
    }
    let student = store.admit_student(form)?;
    Ok(json!({ "studentId": student.id, "student": to_json(&student)? }))
}

fn students_update(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let patch: StudentPatch = parse_field(params, "patch")?;
    let student = store.update_student(&student_id, patch)?;
    Ok(json!({ "student": to_json(&student)? }))
}

fn students_delete(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let request = store.request_delete_student(&student_id)?;
    Ok(json!({ "confirmationRequired": to_json(&request)? }))
}

fn students_toggle_active(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let status = store.toggle_deactivation(&student_id)?;
    Ok(json!({ "studentId": student_id, "status": to_json(&status)? }))
}

fn students_promote(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let promotion = require_session(state)?.promote_student(&student_id)?;
    let seconds = state
        .config
        .as_ref()
        .map(|c| c.celebration_seconds)
        .unwrap_or(3);
    state.celebration = Some(Celebration::new(
        promotion.student_name.clone(),
        Duration::from_secs(seconds),
    ));
    Ok(json!({
        "studentId": student_id,
        "fromClass": promotion.from_class,
        "toClass": promotion.to_class,
        "celebrate": promotion.student_name,
    }))
}

fn students_select(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let store = require_session(state)?;
    let selected = match get_optional_str(params, "studentId") {
        Some(id) => Some(store.student(&id)?.id.clone()),
        None => None,
    };
    state.selected_student = selected.clone();
    Ok(json!({ "selectedStudentId": selected }))
}

fn handle_students_promote(state: &mut AppState, req: &Request) -> serde_json::Value {
    let result = students_promote(state, &req.params);
    respond(&req.id, result)
}

fn handle_students_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let result = students_select(state, &req.params);
    respond(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(with_session(state, req, students_list)),
        "students.get" => Some(with_session(state, req, students_get)),
        "students.admit" => Some(with_session(state, req, students_admit)),
        "students.update" => Some(with_session(state, req, students_update)),
        "students.delete" => Some(with_session(state, req, students_delete)),
        "students.toggleActive" => Some(with_session(state, req, students_toggle_active)),
        "students.promote" => Some(handle_students_promote(state, req)),
        "students.select" => Some(handle_students_select(state, req)),
        _ => None,
    }
}
