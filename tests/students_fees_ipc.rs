mod common;

use common::*;
use serde_json::json;

#[test]
fn fee_payment_and_gated_reversal() {
    let workspace = temp_dir("tutordesk-fees");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_session(&mut stdin, &mut reader, &workspace);

    let asha = admit(&mut stdin, &mut reader, "Asha", "Class 5");
    let s = student(&mut stdin, &mut reader, &asha);
    assert_eq!(s.get("status").and_then(|v| v.as_str()), Some("ACTIVE"));
    assert_eq!(s.get("paidMonths"), Some(&json!([])));
    assert_eq!(s.get("monthlyFee").and_then(|v| v.as_f64()), Some(500.0));
    assert_eq!(latest_audit_event(&mut stdin, &mut reader), "New Admission: Asha");

    let paid = request_ok(
        &mut stdin,
        &mut reader,
        "pay",
        "fees.toggle",
        json!({ "studentId": asha, "month": "2026-10" }),
    );
    assert_eq!(paid.get("paidMonths"), Some(&json!(["2026-10"])));
    assert!(paid.get("confirmationRequired").is_none());
    assert_eq!(
        latest_audit_event(&mut stdin, &mut reader),
        "Fee Paid: Asha for 2026-10"
    );

    // Unchecking needs confirmation; nothing changes until then.
    let gated = request_ok(
        &mut stdin,
        &mut reader,
        "unpay",
        "fees.toggle",
        json!({ "studentId": asha, "month": "2026-10" }),
    );
    let request_id = gated
        .get("confirmationRequired")
        .and_then(|c| c.get("requestId"))
        .and_then(|v| v.as_str())
        .expect("requestId")
        .to_string();
    assert_eq!(
        gated
            .get("confirmationRequired")
            .and_then(|c| c.get("action"))
            .and_then(|a| a.get("kind"))
            .and_then(|v| v.as_str()),
        Some("uncheckFee")
    );
    let s = student(&mut stdin, &mut reader, &asha);
    assert_eq!(s.get("paidMonths"), Some(&json!(["2026-10"])));

    let pending = request_ok(&mut stdin, &mut reader, "pending", "security.pending", json!({}));
    assert_eq!(
        pending
            .get("pending")
            .and_then(|p| p.get("requestId"))
            .and_then(|v| v.as_str()),
        Some(request_id.as_str())
    );

    let confirmed = request_ok(
        &mut stdin,
        &mut reader,
        "confirm",
        "security.confirm",
        json!({ "requestId": request_id }),
    );
    assert_eq!(confirmed.get("action").and_then(|v| v.as_str()), Some("uncheckFee"));
    let s = student(&mut stdin, &mut reader, &asha);
    assert_eq!(s.get("paidMonths"), Some(&json!([])));
    assert_eq!(
        latest_audit_event(&mut stdin, &mut reader),
        "Security Authorized: Unchecked fee for Asha (2026-10)"
    );

    // The request ran once; confirming it again finds nothing open.
    let again = request(
        &mut stdin,
        &mut reader,
        "confirm-again",
        "security.confirm",
        json!({ "requestId": request_id }),
    );
    assert_eq!(error_code(&again), Some("no_pending_confirmation"));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn delete_requires_confirmation_and_clears_selection() {
    let workspace = temp_dir("tutordesk-delete");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_session(&mut stdin, &mut reader, &workspace);

    let asha = admit(&mut stdin, &mut reader, "Asha", "Class 5");
    let bimal = admit(&mut stdin, &mut reader, "Bimal", "Class 5");
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "select",
        "students.select",
        json!({ "studentId": asha }),
    );

    let gated = request_ok(
        &mut stdin,
        &mut reader,
        "del",
        "students.delete",
        json!({ "studentId": asha }),
    );
    let request_id = gated
        .get("confirmationRequired")
        .and_then(|c| c.get("requestId"))
        .and_then(|v| v.as_str())
        .expect("requestId")
        .to_string();
    let listed = request_ok(&mut stdin, &mut reader, "list1", "students.list", json!({}));
    assert_eq!(
        listed.get("students").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(2)
    );

    // Cancel first: the student survives.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "cancel",
        "security.cancel",
        json!({ "requestId": request_id }),
    );
    let listed = request_ok(&mut stdin, &mut reader, "list2", "students.list", json!({}));
    assert_eq!(
        listed.get("students").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(2)
    );

    // Ask again and confirm.
    let gated = request_ok(
        &mut stdin,
        &mut reader,
        "del2",
        "students.delete",
        json!({ "studentId": asha }),
    );
    let request_id = gated
        .get("confirmationRequired")
        .and_then(|c| c.get("requestId"))
        .and_then(|v| v.as_str())
        .expect("requestId")
        .to_string();
    let stale = request(
        &mut stdin,
        &mut reader,
        "stale",
        "security.confirm",
        json!({ "requestId": "not-the-open-one" }),
    );
    assert_eq!(error_code(&stale), Some("confirmation_mismatch"));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "confirm",
        "security.confirm",
        json!({ "requestId": request_id }),
    );
    let listed = request_ok(&mut stdin, &mut reader, "list3", "students.list", json!({}));
    let ids: Vec<String> = listed
        .get("students")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|s| s.get("id").and_then(|v| v.as_str()).map(|s| s.to_string()))
        .collect();
    assert_eq!(ids, vec![bimal]);
    assert_eq!(
        latest_audit_event(&mut stdin, &mut reader),
        "Security Authorized: Permanent Delete Student - Asha"
    );

    let health = request_ok(&mut stdin, &mut reader, "h", "health", json!({}));
    assert_eq!(health.get("loggedIn").and_then(|v| v.as_bool()), Some(true));
    let missing = request(
        &mut stdin,
        &mut reader,
        "gone",
        "students.get",
        json!({ "studentId": asha }),
    );
    assert_eq!(error_code(&missing), Some("not_found"));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn promotion_and_archival() {
    let workspace = temp_dir("tutordesk-promote");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_session(&mut stdin, &mut reader, &workspace);

    let asha = admit(&mut stdin, &mut reader, "Asha", "Class 5");
    let promoted = request_ok(
        &mut stdin,
        &mut reader,
        "promote",
        "students.promote",
        json!({ "studentId": asha }),
    );
    assert_eq!(promoted.get("toClass").and_then(|v| v.as_str()), Some("Class 6"));
    let celebration = request_ok(&mut stdin, &mut reader, "party", "ui.celebration", json!({}));
    assert_eq!(
        celebration.get("celebrate").and_then(|v| v.as_str()),
        Some("Asha")
    );
    assert_eq!(
        latest_audit_event(&mut stdin, &mut reader),
        "Student Promoted: Asha from Class 5 to Class 6"
    );

    let dev = admit(&mut stdin, &mut reader, "Dev", "Class 12");
    let top = request(
        &mut stdin,
        &mut reader,
        "promote-top",
        "students.promote",
        json!({ "studentId": dev }),
    );
    assert_eq!(error_code(&top), Some("invalid_operation"));
    let s = student(&mut stdin, &mut reader, &dev);
    assert_eq!(s.get("studentClass").and_then(|v| v.as_str()), Some("Class 12"));
    assert_eq!(latest_audit_event(&mut stdin, &mut reader), "New Admission: Dev");

    let archived = request_ok(
        &mut stdin,
        &mut reader,
        "archive",
        "students.toggleActive",
        json!({ "studentId": dev }),
    );
    assert_eq!(archived.get("status").and_then(|v| v.as_str()), Some("DEACTIVATED"));
    assert_eq!(latest_audit_event(&mut stdin, &mut reader), "Account Archived: Dev");

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "edit",
        "students.update",
        json!({ "studentId": dev, "patch": { "guardianPhone": "9111111111" } }),
    );
    let s = updated.get("student").expect("student");
    assert_eq!(s.get("guardianPhone").and_then(|v| v.as_str()), Some("9111111111"));
    assert_eq!(s.get("status").and_then(|v| v.as_str()), Some("DEACTIVATED"));
    assert_eq!(s.get("name").and_then(|v| v.as_str()), Some("Dev"));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn session_is_required_and_password_checked() {
    let workspace = temp_dir("tutordesk-auth");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let early = request(&mut stdin, &mut reader, "1", "students.list", json!({}));
    assert_eq!(error_code(&early), Some("no_workspace"));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let locked = request(&mut stdin, &mut reader, "3", "students.list", json!({}));
    assert_eq!(error_code(&locked), Some("not_logged_in"));

    for attempt in 0..3 {
        let wrong = request(
            &mut stdin,
            &mut reader,
            &format!("bad-{}", attempt),
            "auth.login",
            json!({ "password": "guess" }),
        );
        assert_eq!(error_code(&wrong), Some("invalid_credential"));
    }

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "auth.login",
        json!({ "password": PASSWORD }),
    );
    let audit = request_ok(&mut stdin, &mut reader, "5", "audit.list", json!({}));
    let events: Vec<String> = audit
        .get("entries")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|e| e.get("event").and_then(|v| v.as_str()).map(|s| s.to_string()))
        .collect();
    assert_eq!(events, vec!["Admin Logged In successfully".to_string()]);

    let _ = request_ok(&mut stdin, &mut reader, "6", "auth.logout", json!({}));
    let locked = request(&mut stdin, &mut reader, "7", "audit.list", json!({}));
    assert_eq!(error_code(&locked), Some("not_logged_in"));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn logout_discards_open_confirmation() {
    let workspace = temp_dir("tutordesk-logout-gate");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_session(&mut stdin, &mut reader, &workspace);

    let asha = admit(&mut stdin, &mut reader, "Asha", "Class 5");
    let gated = request_ok(
        &mut stdin,
        &mut reader,
        "del",
        "students.delete",
        json!({ "studentId": asha }),
    );
    let request_id = gated
        .get("confirmationRequired")
        .and_then(|c| c.get("requestId"))
        .and_then(|v| v.as_str())
        .expect("requestId")
        .to_string();

    let _ = request_ok(&mut stdin, &mut reader, "out", "auth.logout", json!({}));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "in",
        "auth.login",
        json!({ "password": PASSWORD }),
    );

    let pending = request_ok(&mut stdin, &mut reader, "pending", "security.pending", json!({}));
    assert!(pending.get("pending").map_or(true, |p| p.is_null()));
    let late = request(
        &mut stdin,
        &mut reader,
        "confirm",
        "security.confirm",
        json!({ "requestId": request_id }),
    );
    assert_eq!(error_code(&late), Some("no_pending_confirmation"));
    let s = student(&mut stdin, &mut reader, &asha);
    assert_eq!(s.get("name").and_then(|v| v.as_str()), Some("Asha"));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn profile_update_leaves_payments_alone() {
    let workspace = temp_dir("tutordesk-update-payments");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_session(&mut stdin, &mut reader, &workspace);

    let asha = admit(&mut stdin, &mut reader, "Asha", "Class 5");
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "pay",
        "fees.toggle",
        json!({ "studentId": asha, "month": "2026-10" }),
    );
    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "upd",
        "students.update",
        json!({ "studentId": asha, "patch": { "paidMonths": [], "guardianPhone": "9111111111" } }),
    );
    let s = updated.get("student").cloned().unwrap_or_default();
    assert_eq!(s.get("paidMonths"), Some(&json!(["2026-10"])));
    assert_eq!(s.get("guardianPhone").and_then(|v| v.as_str()), Some("9111111111"));

    let _ = std::fs::remove_dir_all(workspace);
}
