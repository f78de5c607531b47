use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_DEBOUNCE_MS: u64 = 2_000;
const LOG_FILE_NAME: &str = "docsmith.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// External program used to draft section text. It reads the prompt on
/// stdin and prints the generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the persisted document, exports and the log file.
    pub storage_path: PathBuf,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<GenerationConfig>,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for Config {
    fn default() -> Self {
        let storage = shellexpand::tilde("~/.local/share/docsmith");
        Self {
            storage_path: PathBuf::from(storage.as_ref()),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            generation: None,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded storage path
        config.storage_path =
            Self::expand_path(&config.storage_path).unwrap_or(config.storage_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Load the user's config, falling back to defaults when none exists.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Ok(Self::load()?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/docsmith");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn log_file(&self) -> PathBuf {
        self.storage_path.join(LOG_FILE_NAME)
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/docsmith/config.toml"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.storage_path.to_string_lossy().starts_with('~'));
        assert_eq!(config.debounce_ms, 2_000);
        assert_eq!(config.generation, None);
        assert!(config.log_file().ends_with("docsmith.log"));
    }

    #[test]
    fn test_minimal_file_fills_defaults() {
        let config: Config = toml::from_str(r#"storage_path = "/srv/docs""#).unwrap();
        assert_eq!(config.storage_path, PathBuf::from("/srv/docs"));
        assert_eq!(config.debounce_ms, 2_000);
        assert_eq!(config.generation, None);
    }

    #[test]
    fn test_generation_table() {
        let config: Config = toml::from_str(
            r#"
storage_path = "/srv/docs"
debounce_ms = 500

[generation]
command = "llm"
args = ["-m", "small"]
"#,
        )
        .unwrap();

        assert_eq!(config.debounce_ms, 500);
        assert_eq!(
            config.generation,
            Some(GenerationConfig {
                command: "llm".into(),
                args: vec!["-m".into(), "small".into()],
            })
        );
    }

    #[test]
    fn test_generation_args_default_empty() {
        let config: Config = toml::from_str(
            r#"
storage_path = "/srv/docs"
[generation]
command = "draft"
"#,
        )
        .unwrap();
        assert_eq!(config.generation.unwrap().args, Vec::<String>::new());
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path(Path::new("~/test/path")).unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("DOCSMITH_TEST_ROOT", "/test/env/path");
        }

        let expanded = Config::expand_path(Path::new("$DOCSMITH_TEST_ROOT/subdir")).unwrap();
        assert_eq!(expanded, PathBuf::from("/test/env/path/subdir"));

        unsafe {
            env::remove_var("DOCSMITH_TEST_ROOT");
        }
    }

    #[test]
    fn test_expand_path_leaves_plain_paths() {
        for path in ["/absolute/path", "relative/path"] {
            assert_eq!(Config::expand_path(Path::new(path)).unwrap(), PathBuf::from(path));
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load_from_path(temp_dir.path().join("nonexistent.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_toml_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "storage_path = [").unwrap();

        assert!(matches!(
            Config::load_from_path(&config_file),
            Err(ConfigError::ConfigParseError { .. })
        ));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = Config {
            storage_path: PathBuf::from("/tmp/docsmith"),
            debounce_ms: 750,
            generation: Some(GenerationConfig {
                command: "cat".into(),
                args: vec![],
            }),
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_storage_path_expanded_on_load() {
        unsafe {
            env::set_var("DOCSMITH_TEST_STORAGE", "/custom/storage");
        }
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, r#"storage_path = "$DOCSMITH_TEST_STORAGE/docs""#).unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();
        assert_eq!(config.storage_path, PathBuf::from("/custom/storage/docs"));

        unsafe {
            env::remove_var("DOCSMITH_TEST_STORAGE");
        }
    }
}
