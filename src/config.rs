use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use url::Url;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const ENV_API_BASE_URL: &str = "ISSUE_GRID_API_BASE_URL";
pub const ENV_PAGE_SIZE: &str = "ISSUE_GRID_PAGE_SIZE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceMode {
    #[default]
    None,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub page_size: u32,
    pub debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub persistence: PersistenceMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/".to_string(),
            page_size: 20,
            debounce_ms: 500,
            request_timeout_secs: 30,
            persistence: PersistenceMode::None,
        }
    }
}

impl AppConfig {
    /// Reads `config.json` from `config_dir` if present, then applies environment overrides.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let path = config_dir.join(CONFIG_FILE_NAME);
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        } else {
            AppConfig::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|value| !value.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(size) = lookup(ENV_PAGE_SIZE) {
            self.page_size = size
                .trim()
                .parse()
                .with_context(|| format!("{ENV_PAGE_SIZE} must be a positive integer, got {size:?}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be greater than zero")
        }
        self.base_url()?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.api_base_url)
            .with_context(|| format!("invalid api_base_url: {}", self.api_base_url))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Date,
    Set(&'static [&'static str]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub field: &'static str,
    pub header: &'static str,
    pub kind: ColumnKind,
}

const STATES: &[&str] = &["NSW", "VIC", "QLD", "WA", "SA", "TAS", "NT"];
const STATUSES: &[&str] = &["Not Started", "In Progress", "Completed", "Archived"];

const ISSUE_COLUMNS: &[ColumnDef] = &[
    ColumnDef { field: "issue_reference", header: "Reference", kind: ColumnKind::Text },
    ColumnDef { field: "issue_raiseddate", header: "Date", kind: ColumnKind::Date },
    ColumnDef { field: "issue_responsiblecontactpersontext", header: "Adviser", kind: ColumnKind::Text },
    ColumnDef { field: "issue_causecontactpersontext", header: "Responsible Person", kind: ColumnKind::Text },
    ColumnDef { field: "issue_responsiblecontactperson_streetstate", header: "State", kind: ColumnKind::Set(STATES) },
    ColumnDef { field: "issue_responsiblecontactperson_contactbusiness_tradename", header: "Licensee", kind: ColumnKind::Text },
    ColumnDef { field: "issue_responsiblecontactbusinesstext", header: "Business", kind: ColumnKind::Text },
    ColumnDef { field: "issue_seissueidentification", header: "Source", kind: ColumnKind::Text },
    ColumnDef { field: "issue_seimpact", header: "Impact", kind: ColumnKind::Text },
    ColumnDef { field: "issue_title", header: "Title", kind: ColumnKind::Text },
    ColumnDef { field: "issue_statustext", header: "Status", kind: ColumnKind::Set(STATUSES) },
];

/// Static shape of the issue grid: what is requested and how it is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridConfig {
    pub columns: Vec<ColumnDef>,
    pub fields: Vec<String>,
    pub summary_fields: Vec<String>,
    pub count_key: String,
    pub date_field: String,
    pub search_column: String,
    pub editable_columns: Vec<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: ISSUE_COLUMNS.to_vec(),
            fields: ISSUE_COLUMNS.iter().map(|col| col.field.to_string()).collect(),
            summary_fields: vec!["count(*) issuecount".to_string()],
            count_key: "issuecount".to_string(),
            date_field: "issue_raiseddate".to_string(),
            search_column: "issue_title".to_string(),
            editable_columns: vec!["issue_reference".to_string(), "issue_title".to_string()],
        }
    }
}

impl GridConfig {
    pub fn header_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.columns
            .iter()
            .find(|col| col.field == field)
            .map(|col| col.header)
            .unwrap_or(field)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "hellhbbd", "issue-grid")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))
}

pub fn default_config_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("scratch.sqlite"))
}

pub fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview2");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

pub fn default_webview_data_dir() -> Result<PathBuf> {
    ensure_webview_data_dir(project_dirs()?.data_local_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_API_BASE_URL, "https://issues.example.com/"),
            (ENV_PAGE_SIZE, "50"),
        ]);
        let mut config = AppConfig::default();

        config
            .apply_env(|key| env.get(key).map(|value| value.to_string()))
            .expect("env overrides should apply");

        assert_eq!(config.api_base_url, "https://issues.example.com/");
        assert_eq!(config.page_size, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_page_size_env_is_an_error() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(|key| (key == ENV_PAGE_SIZE).then(|| "lots".to_string()))
            .expect_err("non-numeric page size should fail");

        assert!(err.to_string().contains(ENV_PAGE_SIZE), "unexpected error: {err:#}");
    }

    #[test]
    fn partial_config_file_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"page_size": 100, "persistence": "sqlite"}"#)
                .expect("partial config should parse");

        assert_eq!(config.page_size, 100);
        assert_eq!(config.persistence, PersistenceMode::Sqlite);
        assert_eq!(config.debounce_ms, 500);
    }

    #[test]
    fn default_grid_projection_matches_columns() {
        let grid = GridConfig::default();

        assert_eq!(grid.fields.len(), grid.columns.len());
        assert!(grid.fields.contains(&grid.date_field));
        assert!(grid.fields.contains(&grid.search_column));
        assert_eq!(grid.header_for("issue_statustext"), "Status");
        assert_eq!(grid.header_for("unknown"), "unknown");
    }
}
