//! Configuration for the coding assistant.
//!
//! [`CodeConfig`] is read from `~/.keel.toml` (or the file given with
//! `--config`), then command-line overrides are applied, then the API key is
//! taken from the environment when the file does not set one. It converts
//! into keel-rs types via [`agent_config`](CodeConfig::agent_config),
//! [`tool_set`](CodeConfig::tool_set), [`session_store`](CodeConfig::session_store)
//! and [`client`](CodeConfig::client).

use std::path::{Path, PathBuf};

use keel_rs::agent::config::{DEFAULT_MAX_TOKENS, DEFAULT_MAX_TOOL_ROUNDS, DEFAULT_TEMPERATURE};
use keel_rs::prelude::*;
use serde::Deserialize;

use crate::prompt::coding_system_prompt;

/// Config file name, looked up in the home directory.
pub const CONFIG_FILE_NAME: &str = ".keel.toml";

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["OPENROUTER_KEY", "OPENROUTER_API_KEY"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("no API key: set OPENROUTER_KEY or OPENROUTER_API_KEY, or api_key in ~/.keel.toml")]
    MissingApiKey,
    #[error("failed to create API client: {0}")]
    Client(String),
}

/// Settings for one run of the assistant.
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CodeConfig {
    /// Model identifier. Default: `"anthropic/claude-sonnet-4"`.
    pub model: String,
    /// OpenRouter-compatible API base URL.
    pub base_url: String,
    pub api_key: Option<String>,
    /// Maximum tokens per response. Default: `4000`.
    pub max_tokens: u32,
    /// Sampling temperature. Default: `0.7`.
    pub temperature: f32,
    /// Tool round-trips per turn. Default: `10`.
    pub max_tool_rounds: u32,
    /// Root for file tools and relative paths. Default: `"."`.
    pub workdir: PathBuf,
    /// Session file. Default: `~/.keel_session.json`.
    pub session_file: Option<PathBuf>,
    pub verbose: bool,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: keel_rs::OPENROUTER_BASE_URL.to_string(),
            api_key: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            workdir: PathBuf::from("."),
            session_file: None,
            verbose: false,
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub model: Option<String>,
    pub workdir: Option<PathBuf>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub max_tool_rounds: Option<u32>,
    pub verbose: bool,
}

impl CodeConfig {
    /// Default config file location, `None` when there is no home directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `~/.keel.toml` is read
    /// when present and defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => {
                let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;
                tracing::debug!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(model) = overrides.model {
            self.model = model;
        }
        if let Some(workdir) = overrides.workdir {
            self.workdir = workdir;
        }
        if let Some(max_tokens) = overrides.max_tokens {
            self.max_tokens = max_tokens;
        }
        if let Some(temperature) = overrides.temperature {
            self.temperature = temperature;
        }
        if let Some(rounds) = overrides.max_tool_rounds {
            self.max_tool_rounds = rounds;
        }
        self.verbose |= overrides.verbose;
        self
    }

    /// Fill `api_key` from the first set variable in [`API_KEY_VARS`] when
    /// the file did not provide one. `lookup` is usually
    /// `|k| std::env::var(k).ok()`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            self.api_key = API_KEY_VARS
                .iter()
                .find_map(|var| lookup(var).filter(|v| !v.trim().is_empty()));
        }
        self
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig::new(&self.model, coding_system_prompt())
            .with_workdir(&self.workdir)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
            .with_max_tool_rounds(self.max_tool_rounds)
            .with_verbose(self.verbose)
    }

    /// File tools rooted at the working directory.
    pub fn tool_set(&self) -> ToolSet {
        ToolSet::new()
            .with_arg_validation(true)
            .with_file_tools(&self.workdir)
    }

    pub fn session_store(&self) -> JsonFileStore {
        match &self.session_file {
            Some(path) => JsonFileStore::new(path),
            None => JsonFileStore::at_default_location(),
        }
    }

    pub fn client(&self) -> Result<OpenRouterClient, ConfigError> {
        let client = OpenRouterClient::with_headers(
            self.api_key()?,
            "https://github.com/keel-rs/keel",
            "keel-code",
        )
        .map_err(ConfigError::Client)?;
        Ok(client.with_base_url(&self.base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CodeConfig::default();
        assert_eq!(config.model, "anthropic/claude-sonnet-4");
        assert_eq!(config.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.max_tokens, 4000);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.max_tool_rounds, 10);
        assert!(!config.verbose);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = CodeConfig::from_toml("model = \"openai/gpt-4o\"\nmax_tool_rounds = 3\n").unwrap();
        assert_eq!(config.model, "openai/gpt-4o");
        assert_eq!(config.max_tool_rounds, 3);
        assert_eq!(config.max_tokens, 4000);
    }

    #[test]
    fn unreadable_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keel.toml");
        std::fs::write(&path, "max_tokens = \"lots\"").unwrap();
        let err = CodeConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CodeConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keel.toml");
        std::fs::write(&path, "verbose = true\napi_key = \"from-file\"\n").unwrap();
        let config = CodeConfig::load(Some(&path)).unwrap();
        assert!(config.verbose);
        assert_eq!(config.api_key().unwrap(), "from-file");
    }

    #[test]
    fn overrides_win_over_file() {
        let config = CodeConfig::from_toml("model = \"openai/gpt-4o\"\ntemperature = 0.2\n")
            .unwrap()
            .with_overrides(Overrides {
                model: Some("google/gemini-pro-1.5".into()),
                max_tokens: Some(1234),
                verbose: true,
                ..Default::default()
            });
        assert_eq!(config.model, "google/gemini-pro-1.5");
        assert_eq!(config.max_tokens, 1234);
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert!(config.verbose);
    }

    #[test]
    fn env_key_fallback_order() {
        let config = CodeConfig::default().with_env(|k| match k {
            "OPENROUTER_API_KEY" => Some("second".into()),
            _ => None,
        });
        assert_eq!(config.api_key().unwrap(), "second");

        let config = CodeConfig::default().with_env(|k| Some(format!("{k}-value")));
        assert_eq!(config.api_key().unwrap(), "OPENROUTER_KEY-value");
    }

    #[test]
    fn file_key_beats_env() {
        let config = CodeConfig::from_toml("api_key = \"file\"")
            .unwrap()
            .with_env(|_| Some("env".into()));
        assert_eq!(config.api_key().unwrap(), "file");
    }

    #[test]
    fn missing_key_is_reported() {
        let config = CodeConfig::default().with_env(|_| None);
        assert!(matches!(config.api_key(), Err(ConfigError::MissingApiKey)));
        assert!(matches!(config.client(), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn agent_config_carries_settings() {
        let config = CodeConfig::default().with_overrides(Overrides {
            max_tool_rounds: Some(2),
            workdir: Some(PathBuf::from("/tmp/project")),
            ..Default::default()
        });
        let agent = config.agent_config();
        assert_eq!(agent.max_tool_rounds, 2);
        assert_eq!(agent.workdir, PathBuf::from("/tmp/project"));
        assert!(agent.system_prompt.contains("coding assistant"));
    }

    #[test]
    fn tool_set_has_file_tools() {
        let tools = CodeConfig::default().tool_set();
        assert_eq!(tools.names(), ["list_directory", "read_file", "write_file"]);
    }

    #[test]
    fn session_store_honours_override() {
        let config = CodeConfig::from_toml("session_file = \"/tmp/s.json\"").unwrap();
        assert_eq!(config.session_store().path(), Path::new("/tmp/s.json"));
    }
}
