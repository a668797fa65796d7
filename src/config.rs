// ⚙️ Dashboard Configuration
// Paths, bind address and the credential mapping, from defaults, JSON file and environment

use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG: &str = "PROPWEALTH_CONFIG";
pub const ENV_DATA: &str = "PROPWEALTH_DATA";
pub const ENV_SHEET: &str = "PROPWEALTH_SHEET";
pub const ENV_LOGO: &str = "PROPWEALTH_LOGO";
pub const ENV_BIND: &str = "PROPWEALTH_BIND";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Spreadsheet with one row per suburb observation
    pub data_path: PathBuf,

    /// Worksheet to read (ignored for CSV sources)
    pub sheet_name: String,

    /// Logo shown above the title
    pub logo_path: PathBuf,

    /// Logo display width in pixels
    pub logo_width: u32,

    /// Address the web server listens on
    pub bind_addr: String,

    /// Username -> plain-text password
    pub users: BTreeMap<String, String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: PathBuf::from("Book2.xlsx"),
            sheet_name: "Sheet1".to_string(),
            logo_path: PathBuf::from("PropWealth logo final-05 (4).png"),
            logo_width: 200,
            bind_addr: "0.0.0.0:8501".to_string(),
            users: default_users(),
        }
    }
}

pub fn default_users() -> BTreeMap<String, String> {
    let mut users = BTreeMap::new();
    users.insert("admin".to_string(), "pass123".to_string());
    users.insert("propwealth".to_string(), "invest2025".to_string());
    users
}

impl DashboardConfig {
    /// Load configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: DashboardConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path.as_ref()))?;

        Ok(config)
    }

    /// Defaults, then the file (explicit path or `PROPWEALTH_CONFIG`), then env overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var(ENV_CONFIG).ok().map(PathBuf::from);

        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => DashboardConfig::from_file(path)?,
            None => DashboardConfig::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `PROPWEALTH_*` overrides using the given lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(data) = lookup(ENV_DATA) {
            self.data_path = PathBuf::from(data);
        }
        if let Some(sheet) = lookup(ENV_SHEET) {
            self.sheet_name = sheet;
        }
        if let Some(logo) = lookup(ENV_LOGO) {
            self.logo_path = PathBuf::from(logo);
        }
        if let Some(bind) = lookup(ENV_BIND) {
            self.bind_addr = bind;
        }
    }
}
