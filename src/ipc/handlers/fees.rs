use crate::ipc::helpers::{get_required_str, to_json, with_session, HandlerErr, SessionStore};
use crate::ipc::types::{AppState, Request};
use crate::store::FeeToggle;
use serde_json::json;

/// Marking a month paid applies at once; unmarking opens a confirmation request instead.
fn fees_toggle(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let month = get_required_str(params, "month")?;
    match store.toggle_fee(&student_id, &month)? {
        FeeToggle::Paid => {
            let student = store.student(&student_id)?;
            Ok(json!({
                "paid": true,
                "paidMonths": student.paid_months,
            }))
        }
        FeeToggle::ConfirmationRequired(request) => Ok(json!({
            "paid": true,
            "confirmationRequired": to_json(&request)?,
        })),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "fees.toggle" => Some(with_session(state, req, fees_toggle)),
        _ => None,
    }
}
