use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::config::Config;
use crate::db::SqliteStorage;
use crate::store::Store;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Short-lived "promotion succeeded" signal for the UI.
#[derive(Debug, Clone)]
pub struct Celebration {
    pub student_name: String,
    pub expires_at: Instant,
}

impl Celebration {
    pub fn new(student_name: String, lasts: Duration) -> Self {
        Self {
            student_name,
            expires_at: Instant::now() + lasts,
        }
    }

    pub fn is_live(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Everything here except the store is session-only and never persisted.
#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub config: Option<Config>,
    pub store: Option<Store<SqliteStorage>>,
    pub logged_in: bool,
    pub selected_student: Option<String>,
    pub celebration: Option<Celebration>,
}
