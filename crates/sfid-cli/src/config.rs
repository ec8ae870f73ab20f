//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`:
//!
//! ```yaml
//! database: /var/lib/sfid/seq.db   # default .identity_code_seq.db
//! secret: my-deployment-secret     # default GMB-IDENTITY-DEFAULT-SECRET
//! schema: provinces.yaml           # default: built-in province table
//! ```
//!
//! Relative `database` and `schema` paths are resolved against the config
//! file's directory.
//!
//! Perturbation secret precedence: `--secret` flag, then the
//! `IDENTITY_N9_SECRET` environment variable, then the file, then the
//! built-in default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use sfid_core::perturb::SECRET_ENV_VAR;
use sfid_core::{N9Secret, SchemaConfig};
use sfid_store::DEFAULT_DB_PATH;

/// Contents of the configuration file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Sequence database path.
    pub database: Option<PathBuf>,
    /// Perturbation secret.
    pub secret: Option<String>,
    /// Schema YAML path.
    pub schema: Option<PathBuf>,
}

impl Settings {
    /// Load settings from `path`, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut settings: Settings = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        settings.database = settings.database.map(|p| resolve_against(base, p));
        settings.schema = settings.schema.map(|p| resolve_against(base, p));

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(settings)
    }

    /// The sequence database path, honouring a per-command override.
    pub fn database_path(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.database.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
    }

    /// The province/city schema: the configured file or the built-in table.
    pub fn schema_config(&self) -> Result<SchemaConfig> {
        match &self.schema {
            Some(path) => SchemaConfig::from_yaml_file(path)
                .with_context(|| format!("failed to load schema {}", path.display())),
            None => Ok(SchemaConfig::builtin()),
        }
    }

    /// The perturbation secret, reading the environment.
    pub fn secret(&self, flag: Option<&str>) -> N9Secret {
        let env = std::env::var(SECRET_ENV_VAR).ok();
        self.secret_with_env(flag, env.as_deref())
    }

    fn secret_with_env(&self, flag: Option<&str>, env: Option<&str>) -> N9Secret {
        [flag, env, self.secret.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .map(N9Secret::new)
            .unwrap_or_default()
    }
}

fn resolve_against(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
