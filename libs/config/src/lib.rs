//! # Centralized Service Configuration
//!
//! Configuration loading and shared defaults for the scanner services.
//!
//! ## Features
//!
//! - **Layered Loading**: optional TOML file, then prefixed environment
//!   variables, then legacy single-variable aliases
//! - **Service Defaults**: exchange endpoints, timeouts and cadence constants
//!   used when a setting is absent
//!
//! ## Usage
//!
//! ```rust,no_run
//! use service_config::{resolve_config_path, ConfigLoader};
//! # #[derive(serde::Deserialize, Default)]
//! # #[serde(default)]
//! # struct ScannerConfig { symbols: Vec<String> }
//!
//! let path = resolve_config_path(None, "SCANNER_CONFIG_PATH", "config/scanner.toml");
//! let config: ScannerConfig = ConfigLoader::new("SCANNER")
//!     .with_optional_file(path)
//!     .list_key("symbols")
//!     .env_alias("BOT_TOKEN", "telegram.bot_token")
//!     .load()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod service;
pub mod service_config;

pub use service_config::{resolve_config_path, ConfigLoader};
