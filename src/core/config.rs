use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Default chat model requested from OpenRouter.
pub const DEFAULT_MODEL: &str = "agentica-org/deepcoder-14b-preview:free";

/// Default completion endpoint base URL.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

pub const DEFAULT_MAX_TOKENS: u32 = 6000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Prompt file consulted when the config does not name one.
const DEFAULT_PROMPT_PATH: &str = "prompts/system_prompt.txt";

/// Compiled-in system prompt used when no prompt file is present.
const FALLBACK_SYSTEM_PROMPT: &str = "You are an expert RPA assistant specializing in \
automation and coding. Provide complete, working code with proper error handling and \
documentation.";

/// Errors that can occur when loading configuration or the prompt file.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read a file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Failed to parse config at {}: {}", path.display(), source)
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

/// Application configuration. Loaded once at startup and never mutated
/// afterwards; every field has a compiled-in default so the config file is
/// optional.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Plain-text file whose contents become the system message, verbatim.
    #[serde(default)]
    pub system_prompt_file: Option<PathBuf>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            base_url: default_base_url(),
            system_prompt_file: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Config, ConfigError> {
        Self::load_from_path(&Self::config_path())
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                path: config_path.to_path_buf(),
                source,
            })?;
            let config: Config =
                toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                    path: config_path.to_path_buf(),
                    source,
                })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Resolve the system prompt. An explicitly configured file must be
    /// readable; the default prompt path falls back to the compiled-in
    /// prompt when absent.
    pub fn system_prompt(&self) -> Result<String, ConfigError> {
        match &self.system_prompt_file {
            Some(path) => read_prompt_file(path),
            None => {
                let path = Path::new(DEFAULT_PROMPT_PATH);
                if path.exists() {
                    read_prompt_file(path)
                } else {
                    Ok(FALLBACK_SYSTEM_PROMPT.to_string())
                }
            }
        }
    }

    fn config_path() -> PathBuf {
        let proj_dirs = ProjectDirs::from("org", "rpachat", "rpachat")
            .expect("Failed to determine config directory");
        proj_dirs.config_dir().join("config.toml")
    }
}

fn read_prompt_file(path: &Path) -> Result<String, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(contents.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn defaults_apply_without_a_config_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from_path(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.system_prompt_file.is_none());
    }

    #[test]
    fn toml_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "model = \"qwen/qwen3-coder:free\"").unwrap();
        writeln!(file, "max_tokens = 2048").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.model, "qwen/qwen3-coder:free");
        assert_eq!(config.max_tokens, 2048);
        // Unset fields keep their defaults.
        assert_eq!(config.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "model = [not toml").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn configured_prompt_file_is_read_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompt.txt");
        fs::write(&path, "You help with RPA workflows.\n").unwrap();

        let config = Config {
            system_prompt_file: Some(path),
            ..Config::default()
        };
        assert_eq!(config.system_prompt().unwrap(), "You help with RPA workflows.");
    }

    #[test]
    fn missing_configured_prompt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            system_prompt_file: Some(dir.path().join("absent.txt")),
            ..Config::default()
        };
        assert!(matches!(
            config.system_prompt(),
            Err(ConfigError::Read { .. })
        ));
    }
}
