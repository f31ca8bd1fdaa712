use serde::Deserialize;
use std::{fs, net::IpAddr, path::Path};
use thiserror::Error;

use crate::{
    repositories::Repositories,
    viewmodels::{
        AuthSettings, AuthViewModel, DashboardSettings, DashboardViewModel, Notifier,
        SearchSettings, SearchViewModel,
    },
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings of the dev backend and the screen logic, every field optional in the file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub address: IpAddr,
    pub port: u16,
    /// JSON file holding the database.
    pub database: String,
    pub log_level: log::LevelFilter,
    /// The screen settings are only read by library consumers, through the builders below.
    pub search: SearchSettings,
    pub dashboard: DashboardSettings,
    pub auth: AuthSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: IpAddr::from([127, 0, 0, 1]),
            port: 3030,
            database: "db.json".to_string(),
            log_level: log::LevelFilter::Info,
            search: SearchSettings::default(),
            dashboard: DashboardSettings::default(),
            auth: AuthSettings::default(),
        }
    }
}

impl Config {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn search_view_model(&self, repos: &Repositories) -> SearchViewModel {
        SearchViewModel::new(repos, self.search.clone())
    }

    pub fn dashboard_view_model(
        &self,
        repos: &Repositories,
        notifier: Notifier,
    ) -> DashboardViewModel {
        DashboardViewModel::new(repos, self.dashboard.clone(), notifier)
    }

    pub fn auth_view_model(&self, repos: &Repositories, notifier: Notifier) -> AuthViewModel {
        AuthViewModel::new(repos, self.auth.clone(), notifier)
    }
}
