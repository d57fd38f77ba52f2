use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            workers: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: ServerConfig,
    pub artifact_path: PathBuf,
    pub frontend_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            artifact_path: PathBuf::from("artifacts/severity_model.json"),
            frontend_dir: PathBuf::from("frontend"),
        }
    }
}

impl DashboardConfig {
    /// Loads the YAML config named by `SEVERITY_CONFIG` (or the default
    /// path), then applies environment overrides. A missing default file
    /// falls back to built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match std::env::var("SEVERITY_CONFIG") {
            Ok(path) => Self::from_path(path)?,
            Err(_) => {
                let path = resolve_path(Path::new(DEFAULT_CONFIG_PATH));
                if path.exists() {
                    Self::from_path(path)?
                } else {
                    log::warn!("No config file at {}, using defaults", DEFAULT_CONFIG_PATH);
                    Self::default()
                }
            }
        };

        let mut config = config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.artifact_path = resolve_path(&config.artifact_path);
        config.frontend_dir = resolve_path(&config.frontend_dir);
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&config_str)
    }

    pub fn from_yaml_str(config_str: &str) -> Result<Self, ConfigError> {
        let config: DashboardConfig = serde_yaml::from_str(config_str)?;
        Ok(config)
    }

    /// Applies `HOST`, `PORT`, `ARTIFACT_PATH` and `FRONTEND_DIR` from
    /// `lookup`.
    pub fn apply_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(path) = lookup("ARTIFACT_PATH") {
            self.artifact_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("FRONTEND_DIR") {
            self.frontend_dir = PathBuf::from(dir);
        }
        Ok(self)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Relative paths that do not exist from the working directory are tried
/// against the workspace root when running under cargo.
fn resolve_path(path: &Path) -> PathBuf {
    if path.is_absolute() || path.exists() {
        return path.to_path_buf();
    }
    match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(manifest_dir) => {
            let candidate = Path::new(&manifest_dir).join("..").join(path);
            if candidate.exists() {
                candidate
            } else {
                path.to_path_buf()
            }
        }
        Err(_) => path.to_path_buf(),
    }
}
