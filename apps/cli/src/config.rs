//! Client configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `$XDG_CONFIG_HOME/chanvault/config.toml` (or `~/.config/...`)
//! - Windows: `%APPDATA%/chanvault/config.toml`
//!
//! `CHANVAULT_TOKEN` and `CHANVAULT_CHANNEL_ID` override the stored
//! credentials.

use std::path::{Path, PathBuf};

use chanvault_catalog::StoreConfig;
use chanvault_channel::ChannelConfig;
use chanvault_channel::config::DEFAULT_API_BASE_URL;
use serde::{Deserialize, Serialize};

pub const TOKEN_ENV: &str = "CHANVAULT_TOKEN";
pub const CHANNEL_ID_ENV: &str = "CHANVAULT_CHANNEL_ID";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Bot token used to authenticate against the channel API.
    #[serde(default)]
    pub token: String,

    /// Channel the files are stored in.
    #[serde(default)]
    pub channel_id: String,

    /// REST API base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Attachment name of the catalog snapshot.
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Where downloads go when no output directory is given.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Where directories are zipped before upload.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.into()
}

fn default_index_name() -> String {
    StoreConfig::default().index_name
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_staging_dir() -> PathBuf {
    StoreConfig::default().staging_dir
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: String::new(),
            channel_id: String::new(),
            api_base_url: default_api_base_url(),
            index_name: default_index_name(),
            download_dir: default_download_dir(),
            staging_dir: default_staging_dir(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            tracing::debug!(path = %path.display(), "configuration loaded");
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Saves the configuration to `path`, readable only by the owner.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        // The file holds the bot token.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Stores credentials given on the command line, trimmed.
    pub fn set_credentials(&mut self, token: &str, channel_id: &str) {
        self.token = token.trim().to_string();
        self.channel_id = channel_id.trim().to_string();
    }

    /// Applies credential overrides from the environment.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(token) = var(TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            self.token = token;
        }
        if let Some(channel_id) = var(CHANNEL_ID_ENV).filter(|v| !v.trim().is_empty()) {
            self.channel_id = channel_id;
        }
    }

    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig::new(self.token.trim(), self.channel_id.trim())
            .with_base_url(&self.api_base_url)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            index_name: self.index_name.clone(),
            staging_dir: self.staging_dir.clone(),
            ..StoreConfig::default()
        }
    }
}

/// Returns the platform-specific configuration file path.
pub fn config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("chanvault").join("config.toml")
    }

    #[cfg(not(target_os = "windows"))]
    {
        let base = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
                PathBuf::from(home).join(".config")
            });
        base.join("chanvault").join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.token.is_empty());
        assert_eq!(config.api_base_url, "https://discord.com/api/v10");
        assert_eq!(config.index_name, "index.txt");
        assert_eq!(config.download_dir, PathBuf::from("."));
    }

    #[test]
    fn config_partial_toml() {
        let config: Config = toml::from_str(r#"token = "abc""#).unwrap();
        assert_eq!(config.token, "abc");
        assert!(config.channel_id.is_empty());
        assert_eq!(config.index_name, "index.txt");
    }

    #[test]
    fn config_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let config = Config {
            token: "secret".into(),
            channel_id: "1234".into(),
            download_dir: PathBuf::from("/srv/downloads"),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn init_credentials_persist() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::load_from(&path).unwrap();
        config.set_credentials(" tok ", "42\n");
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.token, "tok");
        assert_eq!(loaded.channel_id, "42");
        assert_eq!(loaded.index_name, "index.txt");
    }

    #[test]
    fn env_overrides_credentials() {
        let mut config = Config {
            token: "file-token".into(),
            channel_id: "1".into(),
            ..Config::default()
        };
        config.apply_env(|key| match key {
            TOKEN_ENV => Some("env-token".into()),
            CHANNEL_ID_ENV => Some("  ".into()),
            _ => None,
        });
        assert_eq!(config.token, "env-token");
        assert_eq!(config.channel_id, "1");
    }

    #[test]
    fn builds_component_configs() {
        let config = Config {
            token: " t ".into(),
            channel_id: "99".into(),
            api_base_url: "http://localhost:1/".into(),
            index_name: "catalog.json".into(),
            ..Config::default()
        };
        let channel = config.channel_config();
        assert_eq!(channel.token, "t");
        assert_eq!(channel.messages_url(), "http://localhost:1/channels/99/messages");
        assert_eq!(config.store_config().index_name, "catalog.json");
    }

    #[test]
    fn config_path_ends_with_file_name() {
        let path = config_path();
        assert!(path.ends_with("chanvault/config.toml"));
    }
}
