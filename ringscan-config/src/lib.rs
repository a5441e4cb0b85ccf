//! Loader for ringscan configuration with YAML + environment overlays.
//!
//! Sources are merged in order: YAML files and inline snippets first, then
//! `RINGSCAN_`-prefixed environment variables (`__` separates nesting, so
//! `RINGSCAN_SCAN__TIMEOUT_SECS=5` sets `scan.timeout_secs`). After merging,
//! `${VAR}` placeholders inside string values are expanded from the process
//! environment. Every section is optional.
//!
//! ```yaml
//! urls:
//!   - https://example.com/contacts
//! scan:
//!   timeout_secs: 30
//!   connect_timeout_secs: 10
//!   normalization: strict
//! output:
//!   format: json
//! log:
//!   stderr: true
//!   filter: "info,ringscan_http=debug"
//! ```
use config::{Config, ConfigError, Environment, File, FileFormat};
use ringscan_common::OutputFormat;
use ringscan_common::observability::LogFormat;
use ringscan_extract::NormalizePolicy;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "RINGSCAN";
const CONFIG_FILE_NAME: &str = "ringscan.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RingscanConfig {
    pub urls: Vec<String>,
    pub scan: ScanSection,
    pub output: OutputSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    /// Whole-request budget per page, body included.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub normalization: NormalizePolicy,
    pub user_agent: Option<String>,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            normalization: NormalizePolicy::Strict,
            user_agent: None,
        }
    }
}

impl ScanSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub stderr: bool,
    pub format: LogFormat,
    pub filter: String,
    pub dir: Option<PathBuf>,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            stderr: false,
            format: LogFormat::Text,
            filter: "info".to_string(),
            dir: None,
        }
    }
}

/// `~/.config/ringscan/ringscan.yaml` (or the platform equivalent).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ringscan").join(CONFIG_FILE_NAME))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct RingscanConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env: Environment,
}

impl Default for RingscanConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl RingscanConfigLoader {
    /// Start with defaults plus `RINGSCAN_` env overrides.
    ///
    /// ```
    /// use ringscan_config::RingscanConfigLoader;
    ///
    /// let config = RingscanConfigLoader::new()
    ///     .with_yaml_str("urls: ['https://example.com']")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.urls, vec!["https://example.com".to_string()]);
    /// assert_eq!(config.scan.timeout_secs, 30);
    /// ```
    pub fn new() -> Self {
        Self::with_env(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("urls"),
        )
    }

    /// Use a custom environment source; tests pass a fixed map through
    /// [`Environment::source`].
    pub fn with_env(env: Environment) -> Self {
        Self {
            builder: Config::builder(),
            env,
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use ringscan_config::RingscanConfigLoader;
    /// use ringscan_extract::NormalizePolicy;
    ///
    /// let cfg = RingscanConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// scan:
    ///   timeout_secs: 5
    ///   normalization: permissive
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.scan.timeout_secs, 5);
    /// assert_eq!(cfg.scan.connect_timeout_secs, 10);
    /// assert_eq!(cfg.scan.normalization, NormalizePolicy::Permissive);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into [`RingscanConfig`].
    ///
    /// Environment overrides are applied after every file, and `${VAR}`
    /// placeholders are expanded before the typed structs are built.
    pub fn load(self) -> Result<RingscanConfig, ConfigError> {
        let cfg = self.builder.add_source(self.env).build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
