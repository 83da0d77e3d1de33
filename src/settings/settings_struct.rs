use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::RwLock;

use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Settings structure to hold global configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Path the settings were loaded from, empty for defaults
    pub pref_path: String,
    pub log_level: String,
    /// Directory holding `clash.tpl` and `surge.tpl`, empty for the built-in templates
    pub template_path: String,

    // Server
    pub listen_address: String,
    pub listen_port: u32,
    pub max_concur_threads: usize,

    // Upstream fetch
    /// Seconds a fetched subscription is reused, 0 disables the cache
    pub cache_subscription: u64,
    pub fetch_timeout: u64,
    pub max_download_size: usize,
}

// Default value functions for serde
pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_listen_address() -> String {
    "127.0.0.1".to_string()
}

pub fn default_listen_port() -> u32 {
    25500
}

pub fn default_max_concur_threads() -> usize {
    4
}

pub fn default_cache_subscription() -> u64 {
    60
}

pub fn default_fetch_timeout() -> u64 {
    15
}

pub fn default_max_download_size() -> usize {
    4 * 1024 * 1024 // 4MB
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            pref_path: String::new(),
            log_level: default_log_level(),
            template_path: String::new(),
            listen_address: default_listen_address(),
            listen_port: default_listen_port(),
            max_concur_threads: default_max_concur_threads(),
            cache_subscription: default_cache_subscription(),
            fetch_timeout: default_fetch_timeout(),
            max_download_size: default_max_download_size(),
        }
    }
}

/// Common settings section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonSettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub template_path: String,
}

impl Default for CommonSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            template_path: String::new(),
        }
    }
}

/// Server settings section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    #[serde(rename = "listen", default = "default_listen_address")]
    pub listen_address: String,
    #[serde(rename = "port", default = "default_listen_port")]
    pub listen_port: u32,
    #[serde(default = "default_max_concur_threads")]
    pub max_concur_threads: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            listen_port: default_listen_port(),
            max_concur_threads: default_max_concur_threads(),
        }
    }
}

/// Upstream fetch settings section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSettings {
    #[serde(default = "default_cache_subscription")]
    pub cache_subscription: u64,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: u64,
    #[serde(default = "default_max_download_size")]
    pub max_download_size: usize,
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            cache_subscription: default_cache_subscription(),
            fetch_timeout: default_fetch_timeout(),
            max_download_size: default_max_download_size(),
        }
    }
}

/// On-disk layout shared by the TOML and YAML settings files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub common: CommonSettings,
    pub server: ServerSettings,
    pub advanced: AdvancedSettings,
}

impl From<FileSettings> for Settings {
    fn from(file: FileSettings) -> Self {
        let mut settings = Settings {
            pref_path: String::new(),
            log_level: file.common.log_level,
            template_path: file.common.template_path,
            listen_address: file.server.listen_address,
            listen_port: file.server.listen_port,
            max_concur_threads: file.server.max_concur_threads,
            cache_subscription: file.advanced.cache_subscription,
            fetch_timeout: file.advanced.fetch_timeout,
            max_download_size: file.advanced.max_download_size,
        };

        // Ensure listen_address is not empty
        if settings.listen_address.trim().is_empty() {
            settings.listen_address = default_listen_address();
        }
        if settings.max_concur_threads == 0 {
            settings.max_concur_threads = default_max_concur_threads();
        }
        settings
    }
}

const YAML_SECTION_KEYS: [&str; 3] = ["common:", "server:", "advanced:"];

impl Settings {
    /// Create a new settings instance with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current() -> Arc<Settings> {
        GLOBAL
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Parse settings from TOML or YAML content
    pub fn load_from_content(content: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        // YAML files are recognized by a top level section key at line start
        let is_yaml = content
            .lines()
            .any(|line| YAML_SECTION_KEYS.iter().any(|key| line.starts_with(key)));
        if is_yaml {
            let file: FileSettings = serde_yaml::from_str(content)?;
            return Ok(Settings::from(file));
        }

        let file: FileSettings = toml::from_str(content)?;
        Ok(Settings::from(file))
    }

    /// Load settings from a file
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let content = std::fs::read_to_string(path)?;
        let mut settings = Settings::load_from_content(&content)?;
        settings.pref_path = path.to_owned();
        Ok(settings)
    }

    /// Listen address with the port appended unless it already has one
    pub fn bind_address(&self) -> String {
        if self.listen_address.contains(':') {
            self.listen_address.clone()
        } else {
            format!("{}:{}", self.listen_address, self.listen_port)
        }
    }
}

// Global settings instance
pub static GLOBAL: LazyLock<RwLock<Arc<Settings>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Settings::new())));

/// Replace the global settings
pub fn update_settings(settings: Settings) {
    *GLOBAL
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(settings);
}

/// Update settings directly from file path
pub fn update_settings_from_file(path: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match Settings::load_from_file(path) {
        Ok(settings) => {
            info!("Loaded settings from '{}'", path);
            update_settings(settings);
            Ok(())
        }
        Err(err) => {
            warn!("Failed to load settings from '{}': {}", path, err);
            Err(err)
        }
    }
}

pub fn update_settings_from_content(
    content: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = Settings::load_from_content(content)?;
    update_settings(settings);
    Ok(())
}
