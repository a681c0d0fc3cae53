//! Configuration management
//!
//! Compatible with the back-office settings.json format:
//! ```json
//! {
//!   "ingestion": { "uploadMaxBytes": 10485760, "previewRows": 50 },
//!   "environment": { "live": false }
//! }
//! ```

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

const DEFAULT_UPLOAD_MAX_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_FORMAT_CHECK_MAX_BYTES: u64 = 50 * 1024 * 1024;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    ingestion: IngestionLimits,
    #[serde(default)]
    environment: EnvironmentSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvironmentSettings {
    #[serde(default)]
    live: bool,
}

/// Size caps applied to uploaded files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionLimits {
    /// Hard cap on accepted uploads
    #[serde(default = "default_upload_max_bytes")]
    pub upload_max_bytes: u64,
    /// Ceiling applied by the format pre-check
    #[serde(default = "default_format_check_max_bytes")]
    pub format_check_max_bytes: u64,
    /// Cap on materialized rows for previews; None materializes everything
    #[serde(default)]
    pub preview_rows: Option<usize>,
}

impl Default for IngestionLimits {
    fn default() -> Self {
        Self {
            upload_max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
            format_check_max_bytes: DEFAULT_FORMAT_CHECK_MAX_BYTES,
            preview_rows: None,
        }
    }
}

fn default_upload_max_bytes() -> u64 {
    DEFAULT_UPLOAD_MAX_BYTES
}

fn default_format_check_max_bytes() -> u64 {
    DEFAULT_FORMAT_CHECK_MAX_BYTES
}

/// Foliodesk configuration (simplified view of settings)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub limits: IngestionLimits,
    pub live: bool,
}

impl Config {
    /// Load config from the foliodesk directory.
    ///
    /// The live/test environment can be forced via FOLIODESK_LIVE
    /// (for CI/testing) regardless of the settings file.
    pub fn load(foliodesk_dir: &Path) -> Result<Self> {
        let settings_path = foliodesk_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let live = match std::env::var("FOLIODESK_LIVE").ok().as_deref() {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => true,
            Some("false" | "0" | "no" | "FALSE" | "NO") => false,
            _ => raw.environment.live,
        };

        Ok(Self {
            limits: raw.ingestion,
            live,
        })
    }
}
