//! Run configuration.
//!
//! Defaults follow the conventional supabase project layout. A project-local
//! `driftcheck.toml` overrides the defaults, and CLI flags override both:
//!
//! ```toml
//! remote_path = "db/remote-schema.sql"
//! migrations_dir = "db/migrations"
//! strict = true
//! schema = "public"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{DriftError, DriftResult};

pub const DEFAULT_REMOTE: &str = "supabase/remote-schema.sql";
pub const DEFAULT_MIGRATIONS_DIR: &str = "supabase/migrations";
pub const DEFAULT_SCHEMA: &str = "public";
pub const CONFIG_FILE: &str = "driftcheck.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path of the live schema dump.
    pub remote_path: PathBuf,
    /// Directory holding the *.sql migration files.
    pub migrations_dir: PathBuf,
    /// Whether any discrepancy should fail the run.
    pub strict: bool,
    /// Schema whose prefix qualifies every object in the dump.
    pub schema: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote_path: PathBuf::from(DEFAULT_REMOTE),
            migrations_dir: PathBuf::from(DEFAULT_MIGRATIONS_DIR),
            strict: false,
            schema: DEFAULT_SCHEMA.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> DriftResult<Self> {
        if !path.exists() {
            return Err(DriftError::missing(path));
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| DriftError::Config(e.to_string()))
    }

    /// Read `driftcheck.toml` from the working directory when present,
    /// otherwise fall back to the defaults.
    pub fn discover() -> DriftResult<Self> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// The dump's qualification prefix, e.g. `public.`.
    pub fn schema_prefix(&self) -> String {
        format!("{}.", self.schema)
    }
}
