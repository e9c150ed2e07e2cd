use crate::config::Config;
use crate::db::SqliteStorage;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::{Store, StoreError};
use serde::de::DeserializeOwned;
use serde_json::json;

pub type SessionStore = Store<SqliteStorage>;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<StoreError> for HandlerErr {
    fn from(e: StoreError) -> Self {
        let details = match &e {
            StoreError::NotFound { entity, id } => Some(json!({ "entity": entity, "id": id })),
            StoreError::UnknownClass(class) => Some(json!({ "class": class })),
            StoreError::AlreadyHighestClass { class, .. } => Some(json!({ "class": class })),
            StoreError::ConfirmationMismatch { open_request_id } => {
                Some(json!({ "openRequestId": open_request_id }))
            }
            StoreError::NoPendingConfirmation | StoreError::Storage(_) | StoreError::Backup(_) => None,
        };
        Self {
            code: e.code(),
            message: e.to_string(),
            details,
        }
    }
}

pub fn respond(id: &str, result: Result<serde_json::Value, HandlerErr>) -> serde_json::Value {
    match result {
        Ok(value) => ok(id, value),
        Err(error) => error.response(id),
    }
}

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::new("bad_params", format!("missing {}", key)))
}

pub fn get_optional_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Deserializes the whole params object into a typed payload.
pub fn parse_params<T: DeserializeOwned>(params: &serde_json::Value) -> Result<T, HandlerErr> {
    serde_json::from_value(params.clone())
        .map_err(|e| HandlerErr::new("bad_params", e.to_string()))
}

pub fn parse_field<T: DeserializeOwned>(
    params: &serde_json::Value,
    key: &str,
) -> Result<T, HandlerErr> {
    let Some(v) = params.get(key) else {
        return Err(HandlerErr::new("bad_params", format!("missing {}", key)));
    };
    serde_json::from_value(v.clone())
        .map_err(|e| HandlerErr::new("bad_params", format!("invalid {}: {}", key, e)))
}

pub fn require_workspace(state: &AppState) -> Result<(&SessionStore, &Config), HandlerErr> {
    match (state.store.as_ref(), state.config.as_ref()) {
        (Some(store), Some(cfg)) => Ok((store, cfg)),
        _ => Err(HandlerErr::new("no_workspace", "select a workspace first")),
    }
}

/// Store access for a logged-in admin.
pub fn require_session(state: &mut AppState) -> Result<&mut SessionStore, HandlerErr> {
    if state.store.is_none() {
        return Err(HandlerErr::new("no_workspace", "select a workspace first"));
    }
    if !state.logged_in {
        return Err(HandlerErr::new("not_logged_in", "log in first"));
    }
    state
        .store
        .as_mut()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}

/// Runs `f` against the store if the session allows it and wraps the outcome.
pub fn with_session<F>(state: &mut AppState, req: &Request, f: F) -> serde_json::Value
where
    F: FnOnce(&mut SessionStore, &serde_json::Value) -> Result<serde_json::Value, HandlerErr>,
{
    let result = require_session(state).and_then(|store| f(store, &req.params));
    respond(&req.id, result)
}

pub fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, HandlerErr> {
    serde_json::to_value(value).map_err(|e| HandlerErr::new("internal", e.to_string()))
}
