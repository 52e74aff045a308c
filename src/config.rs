use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::Deserialize;

const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
const DEFAULT_APPLIED_LOG: &str = "applied_jobs.csv";
const DEFAULT_SKIPPED_LOG: &str = "skipped_jobs.csv";

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub resume_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobPreferences {
    pub locations: Vec<String>,
    pub job_roles: Vec<String>,
    #[serde(default)]
    pub salary_range: String,
    #[serde(default = "default_applied_log")]
    pub log_path: String,
    #[serde(default = "default_skipped_log")]
    pub skipped_log_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub preferences: JobPreferences,
    pub search_query: String,
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default)]
    pub openai_api_key: String,
}

fn default_applied_log() -> String {
    DEFAULT_APPLIED_LOG.to_string()
}

fn default_skipped_log() -> String {
    DEFAULT_SKIPPED_LOG.to_string()
}

fn default_webdriver_url() -> String {
    DEFAULT_WEBDRIVER_URL.to_string()
}

impl AppConfig {
    /// Loads the config file, then applies environment overrides so secrets
    /// (NAUKRI_PASSWORD, OPENAI_API_KEY) never have to live on disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(format!("Config file {:?} does not exist.", path_ref).into());
        }

        let content = fs::read_to_string(path_ref)?;
        let mut config: AppConfig = serde_json::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;

        info!(
            "Loaded config from {:?}: {} role keyword(s), {} location(s)",
            path_ref,
            config.preferences.job_roles.len(),
            config.preferences.locations.len()
        );
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            env::var("NAUKRI_PASSWORD").ok(),
            env::var("OPENAI_API_KEY").ok(),
        );
    }

    /// Secrets from the environment win over whatever the file holds.
    fn apply_overrides(&mut self, password: Option<String>, api_key: Option<String>) {
        if let Some(password) = password {
            self.credentials.password = password;
        }
        if let Some(key) = api_key {
            self.openai_api_key = key;
        }
        if self.openai_api_key.is_empty() {
            warn!("No OpenAI API key configured. Cover letters will be skipped.");
        }
    }

    fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.credentials.username.is_empty() {
            return Err("Config is missing a username.".into());
        }
        if self.credentials.password.is_empty() {
            return Err("Config is missing a password (file or NAUKRI_PASSWORD).".into());
        }
        if self.preferences.job_roles.is_empty() {
            return Err("Config needs at least one job role keyword.".into());
        }
        Ok(())
    }
}
