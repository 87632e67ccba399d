use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr};

use crate::{
    entities::media_asset::StoragePolicy,
    repositories::video_documents::DocumentStoreKind,
    upload_limit::UploadLimit,
};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default = "default_media_api_url")]
    pub media_api_url: String,

    #[serde(default)]
    pub cloud_name: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub api_secret: String,

    #[serde(default = "default_image_preset")]
    pub image_upload_preset: String,

    #[serde(default = "default_video_preset")]
    pub video_upload_preset: String,

    #[serde(default = "default_image_folder")]
    pub image_folder: String,

    #[serde(default = "default_video_folder")]
    pub video_folder: String,

    #[serde(default = "default_video_prefix")]
    pub video_list_prefix: String,

    #[serde(default = "default_max_results")]
    pub video_list_max_results: u32,

    #[serde(default = "default_max_upload_kb")]
    pub max_upload_kb: u64,

    #[serde(default)]
    pub document_store: DocumentStoreKind,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Media-Gallery-API".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_media_api_url() -> String {
    "https://api.cloudinary.com".to_string()
}
fn default_image_preset() -> String {
    "images".to_string()
}
fn default_video_preset() -> String {
    "videos".to_string()
}
fn default_image_folder() -> String {
    "images".to_string()
}
fn default_video_folder() -> String {
    "videos".to_string()
}
fn default_video_prefix() -> String {
    "videos/".to_string()
}
fn default_max_results() -> u32 {
    100
}
fn default_max_upload_kb() -> u64 {
    UploadLimit::DEFAULT_KB
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .try_parsing(true)
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Fall back to the host's conventional variable names
        config.cloud_name = fill_or_env(config.cloud_name, "CLOUDINARY_CLOUD_NAME")?;
        config.api_key = fill_or_env(config.api_key, "CLOUDINARY_API_KEY")?;
        config.api_secret = fill_or_env(config.api_secret, "CLOUDINARY_API_SECRET")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.cloud_name.trim().is_empty() {
            errors.push("CLOUD_NAME cannot be empty");
        }
        if self.api_key.trim().is_empty() {
            errors.push("API_KEY cannot be empty");
        }
        if self.api_secret.trim().is_empty() {
            errors.push("API_SECRET cannot be empty");
        }
        if url::Url::parse(&self.media_api_url).is_err() {
            errors.push("MEDIA_API_URL must be an absolute URL");
        }
        if self.max_upload_kb == 0 {
            errors.push("MAX_UPLOAD_KB must be greater than zero");
        }
        if !(1..=500).contains(&self.video_list_max_results) {
            errors.push("VIDEO_LIST_MAX_RESULTS must be between 1 and 500");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn upload_limit(&self) -> UploadLimit {
        UploadLimit::from_kilobytes(self.max_upload_kb)
    }
}

fn fill_or_env(current: String, env_key: &str) -> Result<String, ConfigError> {
    if current.trim().is_empty() {
        env::var(env_key).map_err(|_| ConfigError::Message(format!("{env_key} must be set")))
    } else {
        Ok(current)
    }
}

impl From<&AppConfig> for StoragePolicy {
    fn from(config: &AppConfig) -> Self {
        StoragePolicy {
            image_upload_preset: config.image_upload_preset.clone(),
            video_upload_preset: config.video_upload_preset.clone(),
            image_folder: config.image_folder.clone(),
            video_folder: config.video_folder.clone(),
            video_list_prefix: config.video_list_prefix.clone(),
            video_list_max_results: config.video_list_max_results,
        }
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("media_api_url", &self.media_api_url)
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key.redact())
            .field("api_secret", &self.api_secret.redact())
            .field("image_upload_preset", &self.image_upload_preset)
            .field("video_upload_preset", &self.video_upload_preset)
            .field("image_folder", &self.image_folder)
            .field("video_folder", &self.video_folder)
            .field("video_list_prefix", &self.video_list_prefix)
            .field("video_list_max_results", &self.video_list_max_results)
            .field("max_upload_kb", &self.max_upload_kb)
            .field("document_store", &self.document_store)
            .finish()
    }
}
