//! Workspace configuration, usually read from `scry.toml`.
//!
//! ```toml
//! [classpath]
//! entries = ["build/classes", "libs/dep.jar"]
//!
//! [hierarchy]
//! max_depth = 512
//!
//! [logging]
//! level = "debug"
//! json = false
//! ```

use std::path::Path;
use std::sync::Once;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

use scry_classpath::{Classpath, ClasspathConfig};

use crate::hierarchy::{HierarchyResolver, ResolverOptions, DEFAULT_MAX_DEPTH};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScryConfig {
    #[serde(default)]
    pub classpath: ClasspathConfig,
    #[serde(default)]
    pub hierarchy: HierarchyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HierarchyConfig {
    /// Longest supertype chain a walk follows before reporting the hierarchy
    /// as malformed.
    #[serde(default = "HierarchyConfig::default_max_depth")]
    pub max_depth: usize,
}

impl HierarchyConfig {
    fn default_max_depth() -> usize {
        DEFAULT_MAX_DEPTH
    }
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::default_max_depth(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Level or `EnvFilter` directives, e.g. `"info"` or `"scry.hierarchy=trace"`.
    /// `RUST_LOG` is appended when set.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let level = match self.level.trim() {
            "" => Self::default_level(),
            level => level.to_ascii_lowercase(),
        };
        let directives = match std::env::var("RUST_LOG") {
            Ok(env) if !env.trim().is_empty() => format!("{level},{}", env.trim()),
            _ => level.clone(),
        };

        tracing_subscriber::EnvFilter::try_new(directives)
            .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
            .unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::default()
                    .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
            })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` quotes the offending input; keep only the message.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl ScryConfig {
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a config file. Relative classpath entries are taken relative to
    /// the file's directory.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::load_from_str(&text)?;
        if let Some(dir) = path.parent() {
            config.classpath.resolve_relative_to(dir);
        }
        Ok(config)
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions::from(&self.hierarchy)
    }

    /// A resolver over the configured classpath.
    pub fn resolver(&self) -> HierarchyResolver<Classpath> {
        HierarchyResolver::new(self.classpath.build()).with_options(self.resolver_options())
    }
}

static TRACING_INIT: Once = Once::new();

/// Installs a global `fmt` subscriber writing to stderr.
///
/// Only the first call in a process has an effect, and nothing happens if
/// the host already installed a subscriber of its own.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let layer = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry()
            .with(config.env_filter())
            .with(layer);
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
