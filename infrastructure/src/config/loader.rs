//! Configuration file loader with multi-source merging

use super::error::ConfigError;
use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "listing-vetting";
const PROJECT_FILES: [&str; 2] = ["vetting.toml", ".vetting.toml"];
const ENV_PREFIX: &str = "VETTING_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `VETTING_*` environment variables (`VETTING_LLM__MODEL` sets `llm.model`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./vetting.toml` or `./.vetting.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/listing-vetting/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        Self::extract(Self::figment(config_path))
    }

    /// Load only default configuration (for --no-config), still honoring env overrides
    pub fn load_defaults() -> Result<FileConfig, ConfigError> {
        Self::extract(
            Figment::new()
                .merge(Serialized::defaults(FileConfig::default()))
                .merge(Self::env()),
        )
    }

    fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Self::env())
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    fn extract(figment: Figment) -> Result<FileConfig, ConfigError> {
        let config: FileConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations in priority order
    pub fn config_sources(explicit: Option<&Path>) -> Vec<String> {
        let mut sources = vec![format!("[ENV  ] {}* (split on __)", ENV_PREFIX)];

        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "MISS " };
            sources.push(format!("[{mark}] Explicit: {}", path.display()));
        }

        match Self::project_config_path() {
            Some(path) => sources.push(format!("[FOUND] Project: {}", path.display())),
            None => sources.push(format!(
                "[     ] Project: ./{} or ./{}",
                PROJECT_FILES[0], PROJECT_FILES[1]
            )),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            sources.push(format!("[{mark}] Global:  {}", path.display()));
        }

        sources.push("[     ] Default: built-in defaults".to_string());
        sources
    }
}
