//! Service Configuration Module
//!
//! Loads a service's configuration struct from layered sources:
//!
//! 1. `Default` values of the target struct (via `#[serde(default)]`)
//! 2. An optional TOML file
//! 3. Environment variables `<PREFIX>__<SECTION>__<KEY>`
//! 4. Single-variable aliases such as `BOT_TOKEN`
//!
//! Later sources win.

use anyhow::{Context, Result};
use config_crate::{Config, Environment, File, FileFormat};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Separator between prefix, section and key in environment variable names
const ENV_SEPARATOR: &str = "__";

/// Separator for list-valued environment variables
const LIST_SEPARATOR: &str = ",";

/// Builder for layered configuration loading
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_prefix: String,
    file: Option<PathBuf>,
    file_required: bool,
    list_keys: Vec<String>,
    aliases: Vec<(String, String)>,
}

impl ConfigLoader {
    /// Create a loader reading `<env_prefix>__...` environment variables
    pub fn new(env_prefix: impl Into<String>) -> Self {
        Self {
            env_prefix: env_prefix.into(),
            file: None,
            file_required: false,
            list_keys: Vec::new(),
            aliases: Vec::new(),
        }
    }

    /// Read a TOML file that must exist
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self.file_required = true;
        self
    }

    /// Read a TOML file if one was resolved and it exists
    pub fn with_optional_file(mut self, path: Option<PathBuf>) -> Self {
        self.file = path;
        self.file_required = false;
        self
    }

    /// Parse this key's environment value as a comma-separated list
    pub fn list_key(mut self, key: impl Into<String>) -> Self {
        self.list_keys.push(key.into());
        self
    }

    /// Map a standalone environment variable onto a config key
    pub fn env_alias(mut self, var: impl Into<String>, key: impl Into<String>) -> Self {
        self.aliases.push((var.into(), key.into()));
        self
    }

    /// Build and deserialize the configuration
    pub fn load<T: DeserializeOwned>(&self) -> Result<T> {
        let mut builder = Config::builder();

        if let Some(path) = &self.file {
            let expanded = expand_path(path)?;
            if expanded.exists() || self.file_required {
                info!("Loading configuration file: {:?}", expanded);
                let name = expanded
                    .to_str()
                    .with_context(|| format!("Config path is not valid UTF-8: {:?}", expanded))?;
                builder = builder
                    .add_source(File::new(name, FileFormat::Toml).required(self.file_required));
            } else {
                warn!("Configuration file not found, using defaults: {:?}", expanded);
            }
        }

        let mut environment = Environment::with_prefix(&self.env_prefix)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true);
        if !self.list_keys.is_empty() {
            environment = environment.list_separator(LIST_SEPARATOR);
            for key in &self.list_keys {
                environment = environment.with_list_parse_key(key);
            }
        }
        builder = builder.add_source(environment);

        for (var, key) in &self.aliases {
            if let Ok(value) = std::env::var(var) {
                debug!("Applying {} to {}", var, key);
                builder = builder
                    .set_override(key.as_str(), value)
                    .with_context(|| format!("Failed to apply {} override", var))?;
            }
        }

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

/// Pick the configuration file: explicit path, then `env_var`, then `default`
pub fn resolve_config_path(
    explicit: Option<PathBuf>,
    env_var: &str,
    default: &str,
) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    if let Ok(path) = std::env::var(env_var) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    let fallback = PathBuf::from(default);
    fallback.exists().then_some(fallback)
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .with_context(|| format!("Failed to expand config path {:?}", path))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
