use crate::{ApiParams, VkApi};
use reqwest::Client;
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use thiserror::Error;

const CONFIG_FILE: &str = ".vk_config.yml";
const DEFAULT_API_BASEURL: &str = "https://api.vk.com/method/";
const DEFAULT_API_VERSION: &str = "5.131";

impl VkApi {
    /// Construct the VkApi struct based on the contents of the config file `.vk_config.yml`
    /// present in the current user's home directory. Returns an enum error type that includes the
    /// error types of all crates used.
    pub fn from_default_file() -> Result<VkApi, ConfigReadError> {
        Self::from_config_section(&ConfigFileSection::from_default_file()?)
    }

    /// Construct the VkApi struct based on the `common` section of the YAML file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<VkApi, ConfigReadError> {
        Self::from_config_section(&ConfigFileSection::from_file(path)?)
    }

    /// Construct the VkApi struct based on a passed-in ConfigFileSection instance. A default
    /// Reqwest client is used; swap it with [`VkApi::with_http_client`].
    pub fn from_config_section(section: &ConfigFileSection) -> Result<VkApi, ConfigReadError> {
        let mut base = section.api_baseurl.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let api_uri_base: Url = base.parse()?;

        let api_params = ApiParams {
            version: section.api_version.clone(),
            access_token: section.access_token.clone(),
        };
        let client = api_params.build_client(Client::new());

        Ok(VkApi {
            api_uri_base,
            api_params,
            client,
        })
    }
}

/// All of the configuration data needed to set up a VkApi struct and a TokenRegistry.
/// Implements Deserialize to be read from a YAML file easily, or can be created manually.
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct ConfigFileSection {
    pub api_baseurl: String,
    pub api_version: String,
    pub access_token: Option<String>,
    pub callback_url: Option<String>,
    pub app_secrets: Option<HashMap<String, String>>,
}

impl ConfigFileSection {
    /// Read the `common` section of `.vk_config.yml` in the current user's home directory.
    pub fn from_default_file() -> Result<ConfigFileSection, ConfigReadError> {
        let mut home = dirs::home_dir().ok_or(ConfigReadError::NoHomeDir)?;
        home.push(CONFIG_FILE);
        Self::from_file(home)
    }

    /// Read the `common` section of the YAML file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<ConfigFileSection, ConfigReadError> {
        let config_data = std::fs::read_to_string(path)?;
        Self::from_yaml(&config_data)
    }

    pub(crate) fn from_yaml(config_data: &str) -> Result<ConfigFileSection, ConfigReadError> {
        let config_data_value: serde_yml::Value = serde_yml::from_str(config_data)?;
        let common_section = config_data_value
            .get("common")
            .ok_or(ConfigReadError::InvalidFile(None))?;
        let common_section_typed: ConfigFileSection =
            serde_yml::from_value(common_section.clone())?;
        Ok(common_section_typed)
    }
}

impl Default for ConfigFileSection {
    fn default() -> Self {
        Self {
            api_baseurl: DEFAULT_API_BASEURL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: None,
            callback_url: None,
            app_secrets: None,
        }
    }
}

/// All of the possible errors that can take place when attempting to read a config file. Errors
/// are specific to the libraries that created them, and include the details from those libraries.
#[derive(Debug, Error)]
pub enum ConfigReadError {
    #[error("File Read Error: {0}")]
    FileReadError(#[from] io::Error),
    #[error("Not a valid VK config file: {0:?}")]
    InvalidFile(Option<serde_yml::Error>),
    #[error("VK API URI not valid: {0}")]
    InvalidUri(#[from] url::ParseError),
    #[error("Unable to locate the current user's home directory")]
    NoHomeDir,
}

impl From<serde_yml::Error> for ConfigReadError {
    fn from(err: serde_yml::Error) -> ConfigReadError {
        ConfigReadError::InvalidFile(Some(err))
    }
}
