//! Configuration management for the QA agent.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - Config file (`.qa-agent/config.yaml` in the workspace, or an explicit path)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric: relative storage paths resolve
//! against the workspace, which is also the only directory the corpus may be
//! written into.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Languages the agent can converse in.
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "ar"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .qa-agent/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Name the agent introduces itself with
    pub agent_name: String,

    /// Language used before any user input has been seen ("en" or "ar")
    pub default_language: String,

    /// Whether Arabic input is recognized at all
    pub enable_arabic: bool,

    /// Q&A corpus document (relative paths resolve against the workspace)
    pub qa_database_path: PathBuf,

    /// Directory holding the persisted vector index and its metadata
    pub vector_db_path: PathBuf,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    workspace: Option<WorkspaceConfig>,
    agent: Option<AgentConfig>,
    storage: Option<StorageConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AgentConfig {
    name: Option<String>,
    #[serde(rename = "defaultLanguage")]
    default_language: Option<String>,
    #[serde(rename = "enableArabic")]
    enable_arabic: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageConfig {
    #[serde(rename = "qaDatabasePath")]
    qa_database_path: Option<String>,
    #[serde(rename = "vectorDbPath")]
    vector_db_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            agent_name: "Sales Assistant".to_string(),
            default_language: "en".to_string(),
            enable_arabic: true,
            qa_database_path: PathBuf::from("data/qa_database.json"),
            vector_db_path: PathBuf::from("data/vector_db"),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment and defaults.
    ///
    /// Environment variables:
    /// - `QA_AGENT_WORKSPACE`: Override workspace path
    /// - `QA_AGENT_CONFIG`: Path to config file
    /// - `AGENT_NAME`, `DEFAULT_LANGUAGE`, `ENABLE_ARABIC`
    /// - `QA_DATABASE_PATH`, `VECTOR_DB_PATH`
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use qa_agent_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Corpus: {:?}", config.corpus_path());
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration, letting an explicit workspace or config file
    /// (typically from CLI flags) decide which YAML file is merged.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        Self::load_from_lookup(workspace, config_file, |key| std::env::var(key).ok())
    }

    fn load_from_lookup<F>(
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        lookup: F,
    ) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ws) = workspace.or_else(|| lookup("QA_AGENT_WORKSPACE").map(PathBuf::from)) {
            config.workspace = ws;
        }

        config.config_file = config_file.or_else(|| lookup("QA_AGENT_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.state_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        config.apply_env(lookup);

        Ok(config)
    }

    /// Environment variables override YAML config.
    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("AGENT_NAME") {
            self.agent_name = name;
        }

        if let Some(language) = lookup("DEFAULT_LANGUAGE") {
            self.default_language = language.to_lowercase();
        }

        if let Some(enable) = lookup("ENABLE_ARABIC") {
            self.enable_arabic = enable.eq_ignore_ascii_case("true");
        }

        if let Some(path) = lookup("QA_DATABASE_PATH") {
            self.qa_database_path = PathBuf::from(path);
        }

        if let Some(path) = lookup("VECTOR_DB_PATH") {
            self.vector_db_path = PathBuf::from(path);
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.log_level = Some(level);
        }

        if lookup("NO_COLOR").is_some() {
            self.no_color = true;
        }
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(agent) = config_file.agent {
            if let Some(name) = agent.name {
                result.agent_name = name;
            }
            if let Some(language) = agent.default_language {
                result.default_language = language.to_lowercase();
            }
            if let Some(enable) = agent.enable_arabic {
                result.enable_arabic = enable;
            }
        }

        if let Some(storage) = config_file.storage {
            if let Some(path) = storage.qa_database_path {
                result.qa_database_path = PathBuf::from(path);
            }
            if let Some(path) = storage.vector_db_path {
                result.vector_db_path = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    pub fn with_overrides(
        mut self,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .qa-agent state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.workspace.join(".qa-agent")
    }

    /// Ensure the .qa-agent directory exists.
    pub fn ensure_state_dir(&self) -> AppResult<()> {
        let state_dir = self.state_dir();
        if !state_dir.exists() {
            std::fs::create_dir_all(&state_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .qa-agent directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Absolute location of the Q&A corpus document.
    pub fn corpus_path(&self) -> PathBuf {
        self.resolve(&self.qa_database_path)
    }

    /// Absolute location of the vector index directory.
    pub fn index_dir(&self) -> PathBuf {
        self.resolve(&self.vector_db_path)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if !SUPPORTED_LANGUAGES.contains(&self.default_language.as_str()) {
            return Err(AppError::Config(format!(
                "Unsupported default language: {}. Supported: {}",
                self.default_language,
                SUPPORTED_LANGUAGES.join(", ")
            )));
        }

        if self.default_language == "ar" && !self.enable_arabic {
            return Err(AppError::Config(
                "Default language is Arabic but Arabic support is disabled".to_string(),
            ));
        }

        if self.agent_name.trim().is_empty() {
            return Err(AppError::Config("Agent name cannot be empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.agent_name, "Sales Assistant");
        assert_eq!(config.default_language, "en");
        assert!(config.enable_arabic);
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_paths_resolve_against_workspace() {
        let config = AppConfig {
            workspace: PathBuf::from("/srv/agent"),
            ..AppConfig::default()
        };
        assert_eq!(
            config.corpus_path(),
            PathBuf::from("/srv/agent/data/qa_database.json")
        );
        assert_eq!(config.index_dir(), PathBuf::from("/srv/agent/data/vector_db"));
        assert!(config.state_dir().ends_with(".qa-agent"));
    }

    #[test]
    fn test_env_overrides_yaml() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join(".qa-agent")).unwrap();
        std::fs::write(
            temp.path().join(".qa-agent/config.yaml"),
            "agent:\n  name: Yaml Bot\n  defaultLanguage: ar\nstorage:\n  qaDatabasePath: kb/qa.json\n",
        )
        .unwrap();

        let env = env_of(&[("AGENT_NAME", "Env Bot"), ("ENABLE_ARABIC", "FALSE")]);
        let config = AppConfig::load_from_lookup(Some(temp.path().to_path_buf()), None, |k| {
            env.get(k).cloned()
        })
        .unwrap();

        assert_eq!(config.agent_name, "Env Bot");
        assert_eq!(config.default_language, "ar");
        assert!(!config.enable_arabic);
        assert_eq!(config.corpus_path(), temp.path().join("kb/qa.json"));
    }

    #[test]
    fn test_missing_workspace_is_error() {
        let result = AppConfig::load_from_lookup(
            Some(PathBuf::from("/definitely/not/a/workspace")),
            None,
            |_| None,
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_explicit_missing_config_file_is_error() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load_from_lookup(
            Some(temp.path().to_path_buf()),
            Some(temp.path().join("nope.yaml")),
            |_| None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_with_overrides() {
        let overridden = AppConfig::default().with_overrides(None, true, true);

        assert!(overridden.verbose);
        assert!(overridden.no_color);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_language() {
        let config = AppConfig {
            default_language: "fr".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_arabic_disabled_conflict() {
        let config = AppConfig {
            default_language: "ar".to_string(),
            enable_arabic: false,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(AppConfig::default().validate().is_ok());
    }
}
