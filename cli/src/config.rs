use crate::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const PRODUCTS_URL_ENV: &str = "TASKDECK_PRODUCTS_URL";
pub const TASKS_URL_ENV: &str = "TASKDECK_TASKS_URL";

/// Contents of `config.toml`. Every section is optional in the file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub pagination: PaginationConfig,
    pub storage: StorageConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub products_url: String,
    pub tasks_url: String,
    /// Only the product catalog gets an explicit timeout.
    pub product_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            products_url: "https://fakestoreapi.com".to_string(),
            tasks_url: "https://dummyjson.com".to_string(),
            product_timeout_secs: 10,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PaginationConfig {
    pub page_size: u32,
    pub max_buttons: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_buttons: 5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "taskdeck", "taskdeck")
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Reads the file at `path`. A missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// The config file, then `TASKDECK_*` variables, then the given flags.
    pub fn load(products_url: Option<String>, tasks_url: Option<String>) -> Result<Self> {
        Self::layered(
            &Self::default_path()?,
            |key| std::env::var(key).ok(),
            products_url,
            tasks_url,
        )
    }

    /// Validation runs once, after every layer is applied, so a flag can
    /// replace a bad value from the environment.
    pub fn layered(
        path: &Path,
        env: impl Fn(&str) -> Option<String>,
        products_url: Option<String>,
        tasks_url: Option<String>,
    ) -> Result<Self> {
        let mut config = Self::load_from(path)?;
        config.apply_overrides(env(PRODUCTS_URL_ENV), env(TASKS_URL_ENV));
        config.apply_overrides(products_url, tasks_url);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, products_url: Option<String>, tasks_url: Option<String>) {
        if let Some(url) = products_url {
            self.api.products_url = url;
        }
        if let Some(url) = tasks_url {
            self.api.tasks_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, raw) in [
            ("products_url", &self.api.products_url),
            ("tasks_url", &self.api.tasks_url),
        ] {
            Url::parse(raw).map_err(|e| Error::Config(format!("{name} '{raw}': {e}")))?;
        }
        if self.pagination.page_size == 0 {
            return Err(Error::Config("page_size must be greater than 0".into()));
        }
        if self.pagination.max_buttons == 0 {
            return Err(Error::Config("max_buttons must be greater than 0".into()));
        }
        Ok(())
    }

    pub fn product_timeout(&self) -> Duration {
        Duration::from_secs(self.api.product_timeout_secs)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[pagination]\npage_size = 4\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.pagination.page_size, 4);
        assert_eq!(config.pagination.max_buttons, 5);
        assert_eq!(config.api.tasks_url, "https://dummyjson.com");
        assert_eq!(config.product_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("config.toml");
        let mut config = AppConfig::default();
        config.apply_overrides(Some("http://localhost:9000".into()), None);
        config.save_to(&path).unwrap();

        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn flags_win_over_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let env = |key: &str| (key == PRODUCTS_URL_ENV).then(|| "not a url".to_string());

        let config = AppConfig::layered(&path, env, Some("http://localhost:8080".into()), None)
            .unwrap();
        assert_eq!(config.api.products_url, "http://localhost:8080");
        assert_eq!(config.api.tasks_url, "https://dummyjson.com");

        assert!(matches!(
            AppConfig::layered(&path, env, None, None),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn environment_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api]\ntasks_url = \"http://file.test\"\n").unwrap();
        let env = |key: &str| (key == TASKS_URL_ENV).then(|| "http://env.test".to_string());

        let config = AppConfig::layered(&path, env, None, None).unwrap();
        assert_eq!(config.api.tasks_url, "http://env.test");
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = AppConfig::default();
        config.apply_overrides(None, Some("not a url".into()));
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = AppConfig::default();
        config.pagination.page_size = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
