//! Application configuration loaded from environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppError, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Repository root holding `data/` and `builds/`.
    /// Falls back to the current working directory.
    #[serde(default)]
    pub repo_root: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Install the Prometheus recorder and expose `/metrics`.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_port() -> u16 {
    3001
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            repo_root: None,
            rust_log: default_log_level(),
            metrics_enabled: true,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> std::result::Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Load from the environment, apply CLI overrides and validate.
    pub fn load_with(port: Option<u16>, repo_root: Option<PathBuf>) -> Result<Self> {
        let config = Self::load()?.with_overrides(port, repo_root);
        config.validate().map_err(AppError::InvalidConfig)?;
        Ok(config)
    }

    /// Apply CLI overrides on top of the environment.
    pub fn with_overrides(mut self, port: Option<u16>, repo_root: Option<PathBuf>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        if repo_root.is_some() {
            self.repo_root = repo_root;
        }
        self
    }

    /// Resolved repository root.
    pub fn resolved_root(&self) -> PathBuf {
        match &self.repo_root {
            Some(root) => root.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.port == 0 {
            return Err("PORT must be non-zero".to_string());
        }

        let root = self.resolved_root();
        if !Path::new(&root).is_dir() {
            return Err(format!("REPO_ROOT {} is not a directory", root.display()));
        }

        Ok(())
    }
}
