//! Project configuration (`pg2my.toml`).
//!
//! The config file is optional and lives next to the code being ported.
//! Built-in defaults match the file layout the tool was written against:
//! Drizzle schema files under `drizzle/`, data-access files under
//! `server/`.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{PortError, PortResult};

/// Config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "pg2my.toml";

/// What to do when `.returning(` occurrences survive a full rewrite pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResidualPolicy {
    /// Fail the file (exit nonzero). The default.
    #[default]
    Fail,
    /// Print a warning and keep going.
    Warn,
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub files: FileSet,
    pub returning: ReturningConfig,
}

/// The file sets each stage runs against when none are given on the
/// command line.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileSet {
    /// Schema definition files (schema + enums stages).
    pub schema: Vec<String>,
    /// Data-access files (returning stage).
    pub queries: Vec<String>,
    /// Generated DDL files (constraints stage).
    pub ddl: Vec<String>,
}

impl Default for FileSet {
    fn default() -> Self {
        Self {
            schema: vec![
                "drizzle/schema.ts".to_string(),
                "drizzle/schema_org_members.ts".to_string(),
            ],
            queries: vec![
                "server/db.ts".to_string(),
                "server/dbOrganizations.ts".to_string(),
                "server/dbOrganizationsExtended.ts".to_string(),
                "server/servicePlanScheduler.ts".to_string(),
            ],
            ddl: vec![],
        }
    }
}

/// Returning-stage knobs.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct ReturningConfig {
    pub on_residual: ResidualPolicy,
}

impl Config {
    /// Load `pg2my.toml` from the working directory, falling back to the
    /// built-in defaults when it does not exist.
    pub fn load() -> PortResult<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> PortResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| PortError::io(path, e))?;
        toml::from_str(&content).map_err(|e| PortError::Config(e.to_string()))
    }
}
