//! Configuration loading and root folder resolution
//!
//! Every field resolves with the same priority order:
//! 1. Command-line argument (highest, where one exists)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default listen port for the verification service
pub const DEFAULT_PORT: u16 = 5780;

/// Default local inference endpoint (variant B)
pub const DEFAULT_INFERENCE_ENDPOINT: &str = "http://127.0.0.1:8501/v1/deed-classifier";

/// Default verification request timeout in seconds
pub const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 30;

/// Raw TOML config file contents (all fields optional)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<String>,
    pub port: Option<u16>,
    pub vision_endpoint: Option<String>,
    pub vision_api_key: Option<String>,
    pub inference_endpoint: Option<String>,
    pub verify_timeout_secs: Option<u64>,
}

impl TomlConfig {
    /// Load the platform config file if present, empty config otherwise
    pub fn load() -> Self {
        let Some(path) = config_file_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<TomlConfig>(&contents) {
                Ok(config) => {
                    info!("Loaded config file: {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring malformed config file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct GdgConfig {
    /// Root data folder holding gooddeedgo.db and uploads/
    pub root_folder: PathBuf,
    /// HTTP listen port
    pub port: u16,
    /// Hosted variant: vision-language endpoint URL
    pub vision_endpoint: Option<String>,
    /// Hosted variant: vision-language endpoint API key
    pub vision_api_key: Option<String>,
    /// Local variant: score model inference endpoint URL
    pub inference_endpoint: String,
    /// Timeout applied to verification backend requests
    pub verify_timeout_secs: u64,
}

impl GdgConfig {
    /// Resolve full configuration from CLI args, environment, TOML, defaults
    pub fn resolve(cli_root: Option<&Path>, cli_port: Option<u16>) -> Self {
        let toml_config = TomlConfig::load();

        let root_folder = resolve_root_folder(cli_root, &toml_config);

        let port = cli_port
            .or_else(|| {
                std::env::var("GDG_PORT")
                    .ok()
                    .and_then(|v| v.parse::<u16>().ok())
            })
            .or(toml_config.port)
            .unwrap_or(DEFAULT_PORT);

        let vision_endpoint = std::env::var("GDG_VISION_ENDPOINT")
            .ok()
            .or(toml_config.vision_endpoint);

        let vision_api_key = std::env::var("GDG_VISION_API_KEY")
            .ok()
            .or(toml_config.vision_api_key);

        let inference_endpoint = std::env::var("GDG_INFERENCE_ENDPOINT")
            .ok()
            .or(toml_config.inference_endpoint)
            .unwrap_or_else(|| DEFAULT_INFERENCE_ENDPOINT.to_string());

        let verify_timeout_secs = std::env::var("GDG_VERIFY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .or(toml_config.verify_timeout_secs)
            .unwrap_or(DEFAULT_VERIFY_TIMEOUT_SECS);

        Self {
            root_folder,
            port,
            vision_endpoint,
            vision_api_key,
            inference_endpoint,
            verify_timeout_secs,
        }
    }

    /// Path to the SQLite database under the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("gooddeedgo.db")
    }

    /// Path to the uploaded-image folder under the root folder
    pub fn uploads_dir(&self) -> PathBuf {
        self.root_folder.join("uploads")
    }

    /// Create the root folder if missing
    pub fn ensure_root_folder(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    /// Hosted variant credentials, or a config error naming every source
    pub fn hosted_credentials(&self) -> Result<(String, String)> {
        let endpoint = self.vision_endpoint.clone().ok_or_else(|| {
            Error::Config(
                "Vision endpoint not configured. Set GDG_VISION_ENDPOINT or \
                 vision_endpoint in the config file."
                    .to_string(),
            )
        })?;
        let api_key = self
            .vision_api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "Vision API key not configured. Set GDG_VISION_API_KEY or \
                     vision_api_key in the config file."
                        .to_string(),
                )
            })?;
        Ok((endpoint, api_key))
    }
}

/// Root folder resolution priority: CLI arg, env var, TOML, OS default
fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var("GDG_ROOT_FOLDER") {
        return PathBuf::from(path);
    }

    if let Some(path) = &toml_config.root_folder {
        return PathBuf::from(path);
    }

    default_root_folder()
}

/// Get platform config file path (~/.config/gooddeedgo/config.toml on Linux)
fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gooddeedgo").join("config.toml"))
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("gooddeedgo"))
        .unwrap_or_else(|| PathBuf::from("./gooddeedgo_data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "GDG_ROOT_FOLDER",
            "GDG_PORT",
            "GDG_VISION_ENDPOINT",
            "GDG_VISION_API_KEY",
            "GDG_INFERENCE_ENDPOINT",
            "GDG_VERIFY_TIMEOUT_SECS",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = GdgConfig::resolve(None, None);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.inference_endpoint, DEFAULT_INFERENCE_ENDPOINT);
        assert_eq!(config.verify_timeout_secs, DEFAULT_VERIFY_TIMEOUT_SECS);
        assert!(config.vision_endpoint.is_none());
    }

    #[test]
    #[serial]
    fn test_cli_overrides_env() {
        clear_env();
        std::env::set_var("GDG_PORT", "6000");
        let config = GdgConfig::resolve(Some(Path::new("/tmp/gdg-test")), Some(7000));
        assert_eq!(config.root_folder, PathBuf::from("/tmp/gdg-test"));
        assert_eq!(config.port, 7000);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_resolution() {
        clear_env();
        std::env::set_var("GDG_ROOT_FOLDER", "/tmp/gdg-env");
        std::env::set_var("GDG_VISION_ENDPOINT", "https://vision.example/v1");
        std::env::set_var("GDG_VISION_API_KEY", "key-123");
        let config = GdgConfig::resolve(None, None);
        assert_eq!(config.root_folder, PathBuf::from("/tmp/gdg-env"));
        let (endpoint, key) = config.hosted_credentials().unwrap();
        assert_eq!(endpoint, "https://vision.example/v1");
        assert_eq!(key, "key-123");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_hosted_credentials_missing() {
        clear_env();
        let config = GdgConfig::resolve(None, None);
        assert!(config.hosted_credentials().is_err());
    }

    #[test]
    #[serial]
    fn test_blank_api_key_rejected() {
        clear_env();
        std::env::set_var("GDG_VISION_ENDPOINT", "https://vision.example/v1");
        std::env::set_var("GDG_VISION_API_KEY", "   ");
        let config = GdgConfig::resolve(None, None);
        assert!(config.hosted_credentials().is_err());
        clear_env();
    }

    #[test]
    fn test_derived_paths() {
        let config = GdgConfig {
            root_folder: PathBuf::from("/data/gdg"),
            port: DEFAULT_PORT,
            vision_endpoint: None,
            vision_api_key: None,
            inference_endpoint: DEFAULT_INFERENCE_ENDPOINT.to_string(),
            verify_timeout_secs: DEFAULT_VERIFY_TIMEOUT_SECS,
        };
        assert_eq!(config.database_path(), PathBuf::from("/data/gdg/gooddeedgo.db"));
        assert_eq!(config.uploads_dir(), PathBuf::from("/data/gdg/uploads"));
    }
}
