use crate::{Result, SlicerError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SLICE_NAME: &str = "SliceWeb";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlicerConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub slice: SliceConfig,
    #[serde(default)]
    pub defaults: VmDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_url")]
    pub url: String,
    /// Base URL of the auth service serving `/login`; `url` when unset
    #[serde(default)]
    pub auth_url: Option<String>,
    /// Bearer token sent as `Authorization` on every request
    #[serde(default)]
    pub token: Option<String>,
    /// Request timeout; the HTTP client's default applies when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            auth_url: None,
            token: None,
            timeout_secs: None,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_url() -> String {
    "http://localhost:8000".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliceConfig {
    #[serde(default = "default_slice_name")]
    pub name: String,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            name: default_slice_name(),
        }
    }
}

fn default_slice_name() -> String {
    DEFAULT_SLICE_NAME.to_string()
}

/// Values offered by the add-VM prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmDefaults {
    #[serde(default = "default_cpu")]
    pub cpu: u32,
    #[serde(default = "default_ram")]
    pub ram_mb: u32,
    #[serde(default = "default_disk")]
    pub disk_gb: u32,
}

impl Default for VmDefaults {
    fn default() -> Self {
        Self {
            cpu: default_cpu(),
            ram_mb: default_ram(),
            disk_gb: default_disk(),
        }
    }
}

fn default_cpu() -> u32 {
    1
}

fn default_ram() -> u32 {
    512
}

fn default_disk() -> u32 {
    3
}

impl SlicerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_str(&contents)
    }

    pub fn from_str(contents: &str) -> Result<Self> {
        let config: SlicerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, contents)?;
        Ok(())
    }

    /// `$XDG_CONFIG_HOME/slicer/config.toml`, falling back to the working directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("slicer").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("slicer.toml"))
    }

    fn validate(&self) -> Result<()> {
        if self.backend.url.trim().is_empty() {
            return Err(SlicerError::Config("backend.url must not be empty".into()));
        }
        if self.slice.name.trim().is_empty() {
            return Err(SlicerError::Config("slice.name must not be empty".into()));
        }
        let VmDefaults {
            cpu,
            ram_mb,
            disk_gb,
        } = self.defaults;
        if cpu == 0 || ram_mb == 0 || disk_gb == 0 {
            return Err(SlicerError::Config(
                "defaults.cpu, defaults.ram_mb and defaults.disk_gb must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Store a fresh access token in the file at `path`, keeping everything
    /// else the file holds. A missing file starts from defaults.
    pub fn store_token<P: AsRef<Path>>(path: P, token: &str) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.backend.token = Some(token.to_string());
        config.save_to_file(path)?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the file values.
    pub fn with_overrides(mut self, url: Option<String>, token: Option<String>) -> Self {
        if let Some(url) = url {
            self.backend.url = url;
        }
        if token.is_some() {
            self.backend.token = token;
        }
        self
    }
}
