use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr};
use url::Url;
use zeroize::Zeroizing;

use crate::constants::FALLBACK_SENDER;

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

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub resend_api_key: Option<String>,

    #[serde(default = "default_resend_api_url")]
    pub resend_api_url: String,

    #[serde(default)]
    pub contact_to: Option<String>,

    #[serde(default)]
    pub contact_from: Option<String>,

    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
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
fn default_resend_api_url() -> String {
    "https://api.resend.com".to_string()
}
fn default_purge_interval() -> u64 {
    300
}
fn default_log_format() -> LogFormat {
    LogFormat::Pretty
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
            .add_source(Environment::with_prefix("APP").try_parsing(true).list_separator(",").with_list_parse_key("cors_allowed_origins").ignore_empty(true));

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Deployments that predate the APP_ prefix
        config.resend_api_key = non_blank(config.resend_api_key).or_else(|| legacy_env("RESEND_API_KEY"));
        config.contact_to = non_blank(config.contact_to).or_else(|| legacy_env("CONTACT_TO"));
        config.contact_from = non_blank(config.contact_from).or_else(|| legacy_env("CONTACT_FROM"));

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.resend_api_base().is_err() {
            errors.push("RESEND_API_URL must be an absolute URL");
        }
        if self.purge_interval_secs == 0 {
            errors.push("PURGE_INTERVAL_SECS must be greater than zero");
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

    /// Copy of the API key that is wiped when dropped.
    pub fn api_key_secret(&self) -> Option<Zeroizing<String>> {
        non_blank(self.resend_api_key.clone()).map(Zeroizing::new)
    }

    /// Delivery needs both a key and somewhere to send to.
    pub fn email_configured(&self) -> bool {
        self.resend_api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
            && self.contact_to.as_deref().is_some_and(|to| !to.trim().is_empty())
    }

    /// The configured sender is only trusted in production.
    pub fn sender_address(&self) -> String {
        match (&self.contact_from, self.is_production()) {
            (Some(from), true) => from.clone(),
            _ => FALLBACK_SENDER.to_string(),
        }
    }

    /// Base URL of the email API, always ending in `/` so joins append.
    pub fn resend_api_base(&self) -> Result<Url, url::ParseError> {
        let raw = self.resend_api_url.trim();
        if raw.ends_with('/') {
            Url::parse(raw)
        } else {
            Url::parse(&format!("{raw}/"))
        }
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            cors_allowed_origins: default_cors_origins(),
            resend_api_key: None,
            resend_api_url: default_resend_api_url(),
            contact_to: None,
            contact_from: None,
            purge_interval_secs: default_purge_interval(),
            log_format: default_log_format(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn legacy_env(key: &str) -> Option<String> {
    non_blank(env::var(key).ok())
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

impl Redact for Option<String> {
    fn redact(&self) -> &str {
        match self {
            Some(key) if !key.is_empty() => "[REDACTED]",
            _ => "[MISSING]",
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("resend_api_key", &self.resend_api_key.redact())
            .field("resend_api_url", &self.resend_api_url)
            .field("contact_to", &self.contact_to)
            .field("contact_from", &self.contact_from)
            .field("purge_interval_secs", &self.purge_interval_secs)
            .field("log_format", &self.log_format)
            .finish()
    }
}
