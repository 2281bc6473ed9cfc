// src/config.rs
// Configuration: validated server settings plus an optional preview.json file

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const CONFIG_FILE: &str = "preview.json";

/// Immutable server configuration. The document root is canonicalized and
/// verified readable at construction time, so a started server never
/// discovers a bad root mid-request.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_host: String,
    pub bind_port: u16,
    pub document_root: PathBuf,
}

impl ServerConfig {
    pub fn new(
        bind_host: &str,
        bind_port: u16,
        document_root: &Path,
    ) -> Result<Self, ConfigError> {
        if bind_port == 0 {
            return Err(ConfigError::ValidationError(
                "port must be between 1 and 65535".to_string(),
            ));
        }

        let document_root = document_root.canonicalize().map_err(|err| {
            ConfigError::ValidationError(format!(
                "document root {}: {}",
                document_root.display(),
                err
            ))
        })?;

        if !document_root.is_dir() {
            return Err(ConfigError::ValidationError(format!(
                "document root {} is not a directory",
                document_root.display()
            )));
        }

        // Readability check up front; the serve loop only ever reads.
        fs::read_dir(&document_root)?;

        Ok(ServerConfig {
            bind_host: bind_host.to_string(),
            bind_port,
            document_root,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.bind_port)
    }
}

/// Optional settings read from `preview.json` in the document root.
/// CLI flags override anything given here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewConfig {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub required_assets: Option<Vec<String>>,
}

#[derive(Debug)]
pub enum ConfigError {
    FileNotFound(String),
    ParseError(String),
    ValidationError(String),
    IoError(std::io::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Configuration file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse configuration: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation failed: {}", msg)
            }
            ConfigError::IoError(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

pub struct ConfigLoader {
    serve_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(serve_dir: PathBuf) -> Self {
        Self { serve_dir }
    }

    /// Load `preview.json` from the document root, or the explicitly given
    /// file. An absent default file is not an error; an absent custom file is.
    pub fn load(&self, custom_config_path: Option<&str>) -> Result<PreviewConfig, ConfigError> {
        let config_path = match custom_config_path {
            Some(custom) => {
                let path = PathBuf::from(custom);
                if !path.exists() {
                    return Err(ConfigError::FileNotFound(
                        path.to_string_lossy().to_string(),
                    ));
                }
                path
            }
            None => {
                let path = self.serve_dir.join(CONFIG_FILE);
                if !path.exists() {
                    return Ok(PreviewConfig::default());
                }
                path
            }
        };

        let contents = fs::read_to_string(&config_path)?;

        log::info!("Loading configuration from: {}", config_path.display());

        serde_json::from_str(&contents)
            .map_err(|err| ConfigError::ParseError(format!("{}: {}", config_path.display(), err)))
    }
}
