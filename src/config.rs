use std::fs;

use camino::Utf8PathBuf;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::IdMapError;

pub const CONFIG_FILE: &str = "tcga-idmap.json";
pub const API_URL_ENV: &str = "TCGA_IDMAP_API_URL";

pub const DEFAULT_API_URL: &str = "https://api.gdc.cancer.gov";
pub const DEFAULT_LEGACY_API_URL: &str = "https://api.gdc.cancer.gov/legacy";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub legacy_api_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub max_retries: Option<usize>,
}

/// Settings of the HTTP collaborator after defaults have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub legacy_api_url: String,
    pub timeout_secs: u64,
    pub page_size: usize,
    pub max_retries: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            legacy_api_url: DEFAULT_LEGACY_API_URL.to_string(),
            timeout_secs: 60,
            page_size: 1000,
            max_retries: 3,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path` if given, otherwise the first of `./tcga-idmap.json` and
    /// the user config directory that exists, otherwise the defaults.
    pub fn resolve(path: Option<&str>) -> Result<ClientConfig, IdMapError> {
        let config_path = match path {
            Some(path) => Some(Utf8PathBuf::from(path)),
            None => Self::discover(),
        };

        let config: Config = match config_path {
            Some(config_path) => {
                tracing::debug!(path = %config_path, "loading config");
                let content = fs::read_to_string(&config_path)
                    .map_err(|_| IdMapError::ConfigRead(config_path.clone().into_std_path_buf()))?;
                serde_json::from_str(&content)
                    .map_err(|err| IdMapError::ConfigParse(err.to_string()))?
            }
            None => Config::default(),
        };

        let env_url = std::env::var(API_URL_ENV).ok();
        Ok(Self::resolve_config(config, env_url))
    }

    pub fn resolve_config(config: Config, env_url: Option<String>) -> ClientConfig {
        let defaults = ClientConfig::default();
        let api_url = env_url
            .filter(|url| !url.trim().is_empty())
            .or(config.api_url)
            .unwrap_or(defaults.api_url);

        ClientConfig {
            api_url: trim_slash(api_url),
            legacy_api_url: trim_slash(config.legacy_api_url.unwrap_or(defaults.legacy_api_url)),
            timeout_secs: config.timeout_secs.unwrap_or(defaults.timeout_secs),
            page_size: config
                .page_size
                .filter(|size| *size > 0)
                .unwrap_or(defaults.page_size),
            max_retries: config.max_retries.unwrap_or(defaults.max_retries),
        }
    }

    fn discover() -> Option<Utf8PathBuf> {
        let local = Utf8PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        ProjectDirs::from("", "", "tcga-idmap")
            .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.config_dir().join(CONFIG_FILE)).ok())
            .filter(|path| path.exists())
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
