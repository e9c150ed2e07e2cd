use anyhow::Context;
use figment::{
    providers::{Env, Format, Json, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "tutordesk.json";
pub const ENV_PREFIX: &str = "TUTORDESK_";

/// Static reference data and knobs for a workspace.
/// Layered as: built-in defaults, then `tutordesk.json` in the workspace, then `TUTORDESK_*` env vars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub admin_password: String,
    /// Ordered class levels, lowest first. Promotion walks this list.
    pub classes: Vec<String>,
    pub months: Vec<String>,
    /// Year used in `"<year>-<month>"` fee identifiers. Defaults to the current local year.
    pub current_year: Option<i32>,
    pub storage_key: String,
    pub fee_reminder_day: u32,
    pub reminder_preview_limit: usize,
    pub celebration_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_password: "brightx-admin".to_string(),
            classes: (3..=12).map(|n| format!("Class {}", n)).collect(),
            months: [
                "January",
                "February",
                "March",
                "April",
                "May",
                "June",
                "July",
                "August",
                "September",
                "October",
                "November",
                "December",
            ]
            .iter()
            .map(|m| m.to_string())
            .collect(),
            current_year: None,
            storage_key: "TUTORDESK_DATA_V3".to_string(),
            fee_reminder_day: 12,
            reminder_preview_limit: 6,
            celebration_seconds: 3,
        }
    }
}

impl Config {
    pub fn load(workspace: &Path) -> anyhow::Result<Self> {
        let cfg: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Json::file(workspace.join(CONFIG_FILE_NAME)))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .context("invalid tutordesk configuration")?;
        if cfg.classes.is_empty() {
            anyhow::bail!("configuration must list at least one class");
        }
        if cfg.months.len() != 12 {
            anyhow::bail!("configuration must list exactly twelve months");
        }
        Ok(cfg)
    }

    pub fn reference(&self) -> ReferenceData {
        ReferenceData {
            classes: self.classes.clone(),
            months: self.months.clone(),
            current_year: self.current_year,
        }
    }
}

/// The slice of configuration the store and views need.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceData {
    pub classes: Vec<String>,
    pub months: Vec<String>,
    pub current_year: Option<i32>,
}

impl ReferenceData {
    pub fn class_index(&self, class: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == class)
    }

    pub fn next_class(&self, class: &str) -> Option<&str> {
        let idx = self.class_index(class)?;
        self.classes.get(idx + 1).map(|s| s.as_str())
    }

    pub fn year_or(&self, fallback: i32) -> i32 {
        self.current_year.unwrap_or(fallback)
    }
}

impl Default for ReferenceData {
    fn default() -> Self {
        Config::default().reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_classes_run_from_three_to_twelve() {
        let r = ReferenceData::default();
        assert_eq!(r.classes.first().map(|s| s.as_str()), Some("Class 3"));
        assert_eq!(r.classes.last().map(|s| s.as_str()), Some("Class 12"));
        assert_eq!(r.next_class("Class 5"), Some("Class 6"));
        assert_eq!(r.next_class("Class 12"), None);
        assert_eq!(r.next_class("Class 99"), None);
    }

    #[test]
    fn workspace_file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!(
            "tutordesk-config-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("create dir");
        std::fs::write(
            dir.join(CONFIG_FILE_NAME),
            r#"{ "admin_password": "letmein", "current_year": 2031 }"#,
        )
        .expect("write config");

        let cfg = Config::load(&dir).expect("load config");
        assert_eq!(cfg.admin_password, "letmein");
        assert_eq!(cfg.current_year, Some(2031));
        assert_eq!(cfg.fee_reminder_day, 12);

        let _ = std::fs::remove_dir_all(dir);
    }
}
