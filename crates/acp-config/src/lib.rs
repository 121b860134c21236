//! Hierarchical configuration with discovery and precedence: CLI flags
//! override the config file, which overrides built-in defaults.
//!
//! Mirrors the layering convention common to CLI tools in this ecosystem:
//! a TOML file discovered by walking upward from the current directory,
//! merged under a fixed precedence, with each effective value's source
//! tracked for `status`/`history` display.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where an effective configuration value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    Cli,
    File,
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "cli"),
            Self::File => write!(f, "file"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Raw `.acp/config.toml` contents.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Defaults {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RetryConfig {
    pub max_retries: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InteractionConfig {
    /// When true, `error_handler`'s "ignore" remediation choice is offered.
    pub allow_ignore_governance: Option<bool>,
    /// When true, strict validation failures in the Governance Validator
    /// are always hard failures (this is always the engine's behavior;
    /// the flag exists so phase agents can be told to be extra careful).
    pub strict_validation: Option<bool>,
}

/// Effective, fully-resolved configuration plus where each value came from.
#[derive(Debug, Clone)]
pub struct Config {
    pub model: String,
    pub max_retries: u32,
    pub allow_ignore_governance: bool,
    pub strict_validation: bool,
    pub source_attribution: HashMap<String, ConfigSource>,
}

impl Default for Config {
    fn default() -> Self {
        let mut source_attribution = HashMap::new();
        for key in ["model", "max_retries", "allow_ignore_governance", "strict_validation"] {
            source_attribution.insert(key.to_string(), ConfigSource::Default);
        }
        Self {
            model: "mock".to_string(),
            max_retries: acp_types::MAX_RETRIES,
            allow_ignore_governance: false,
            strict_validation: false,
            source_attribution,
        }
    }
}

/// CLI-supplied overrides. Each `Some` wins over the file and the default.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub max_retries: Option<u32>,
    pub allow_ignore_governance: Option<bool>,
    pub strict_validation: Option<bool>,
}

/// Discover `.acp/config.toml` by walking upward from `start_dir`, stopping
/// at a VCS root or the filesystem root.
#[must_use]
pub fn discover_config_path(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let candidate = current.join(".acp").join("config.toml");
        if candidate.exists() {
            return Some(candidate);
        }
        if current.join(".git").exists() || current.parent().is_none() {
            return None;
        }
        current = current.parent()?.to_path_buf();
    }
}

/// Load the config file at `path`, if present.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed as TOML.
pub fn load_config_file(path: Option<&Path>) -> Result<ConfigFile, toml::de::Error> {
    let Some(path) = path else {
        return Ok(ConfigFile::default());
    };
    let Ok(content) = std::fs::read_to_string(path) else {
        return Ok(ConfigFile::default());
    };
    toml::from_str(&content)
}

/// Merge CLI overrides, a loaded file, and built-in defaults into an
/// effective `Config`, tracking the source of each value.
#[must_use]
pub fn resolve(cli: &CliOverrides, file: &ConfigFile) -> Config {
    let mut config = Config::default();
    let mut set = |key: &str, source: ConfigSource, config: &mut Config| {
        config.source_attribution.insert(key.to_string(), source);
    };

    if let Some(model) = cli.model.clone() {
        config.model = model;
        set("model", ConfigSource::Cli, &mut config);
    } else if let Some(model) = file.defaults.model.clone() {
        config.model = model;
        set("model", ConfigSource::File, &mut config);
    }

    if let Some(max_retries) = cli.max_retries {
        config.max_retries = max_retries;
        set("max_retries", ConfigSource::Cli, &mut config);
    } else if let Some(max_retries) = file.retry.max_retries {
        config.max_retries = max_retries;
        set("max_retries", ConfigSource::File, &mut config);
    }

    if let Some(allow) = cli.allow_ignore_governance {
        config.allow_ignore_governance = allow;
        set("allow_ignore_governance", ConfigSource::Cli, &mut config);
    } else if let Some(allow) = file.interaction.allow_ignore_governance {
        config.allow_ignore_governance = allow;
        set("allow_ignore_governance", ConfigSource::File, &mut config);
    }

    if let Some(strict) = cli.strict_validation {
        config.strict_validation = strict;
        set("strict_validation", ConfigSource::Cli, &mut config);
    } else if let Some(strict) = file.interaction.strict_validation {
        config.strict_validation = strict;
        set("strict_validation", ConfigSource::File, &mut config);
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_set() {
        let config = resolve(&CliOverrides::default(), &ConfigFile::default());
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.source_attribution["max_retries"], ConfigSource::Default);
    }

    #[test]
    fn file_overrides_default() {
        let file = ConfigFile {
            retry: RetryConfig { max_retries: Some(5) },
            ..Default::default()
        };
        let config = resolve(&CliOverrides::default(), &file);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.source_attribution["max_retries"], ConfigSource::File);
    }

    #[test]
    fn cli_overrides_file() {
        let file = ConfigFile {
            retry: RetryConfig { max_retries: Some(5) },
            ..Default::default()
        };
        let cli = CliOverrides {
            max_retries: Some(7),
            ..Default::default()
        };
        let config = resolve(&cli, &file);
        assert_eq!(config.max_retries, 7);
        assert_eq!(config.source_attribution["max_retries"], ConfigSource::Cli);
    }

    #[test]
    fn discover_finds_nested_config() {
        let dir = tempfile::tempdir().unwrap();
        let acp_dir = dir.path().join(".acp");
        std::fs::create_dir_all(&acp_dir).unwrap();
        std::fs::write(acp_dir.join("config.toml"), "[defaults]\nmodel = \"sonnet\"\n").unwrap();

        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();

        let found = discover_config_path(&nested).unwrap();
        let file = load_config_file(Some(&found)).unwrap();
        assert_eq!(file.defaults.model.as_deref(), Some("sonnet"));
    }
}
