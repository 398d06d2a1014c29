use crate::{
    cli::OutputFormat,
    error::{CliError, Result},
};
use pandalive_parser::extractor::platform_configs::merge_platform_extras;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_DIR: &str = "pandalive";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Request timeout in seconds
    pub timeout: u64,
    pub output: OutputFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Extractor options merged under the `--extras` flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<Value>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            output: OutputFormat::Pretty,
            proxy: None,
            user_agent: None,
            extras: None,
        }
    }
}

impl AppConfig {
    /// `<config dir>/pandalive/config.toml`, or `./config.toml` when the
    /// platform has no config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR))
            .unwrap_or_default()
            .join(CONFIG_FILE)
    }

    fn resolve_path(path: Option<&Path>) -> PathBuf {
        path.map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path)
    }

    /// Load the config file, falling back to defaults when it does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(path);
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&content)?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let path = Self::resolve_path(path);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn reset(path: Option<&Path>) -> Result<()> {
        Self::default().save(path)
    }

    pub fn show(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Extractor extras for one run: config extras, then the configured
    /// user agent, then the `--extras` JSON from the command line.
    pub fn merged_extras(&self, cli_extras: Option<&str>) -> Result<Option<Value>> {
        let cli_extras = cli_extras
            .map(serde_json::from_str::<Value>)
            .transpose()?;
        if let Some(extras) = &cli_extras
            && !extras.is_object()
        {
            return Err(CliError::InvalidInput(
                "--extras must be a JSON object".to_string(),
            ));
        }

        let user_agent = self
            .user_agent
            .as_ref()
            .map(|ua| serde_json::json!({ "user_agent": ua }));

        let base = merge_platform_extras(self.extras.clone(), user_agent);
        Ok(merge_platform_extras(base, cli_extras))
    }
}
