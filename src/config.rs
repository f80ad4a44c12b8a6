//! Configuration types.
//!
//! `AppConfig` is built once at startup from three layers (highest wins):
//! environment variables, an optional TOML file, built-in defaults. The
//! resulting value is immutable and handed to each client constructor.

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ConfigError;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "habit-coach.toml";

/// Chat completion endpoint settings.
#[derive(Debug, Clone)]
pub struct GitHubModelsConfig {
    /// Bearer token. Absence is reported when a completion is attempted.
    pub api_token: Option<SecretString>,
    pub api_url: String,
    pub default_model: String,
    /// Sent as `X-GitHub-Api-Version`.
    pub api_version: String,
}

impl Default for GitHubModelsConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            api_url: "https://models.github.ai/inference/chat/completions".to_string(),
            default_model: "xai/grok-3".to_string(),
            api_version: "2022-11-28".to_string(),
        }
    }
}

/// Scripture and quotation lookup endpoints.
#[derive(Debug, Clone)]
pub struct ExternalApisConfig {
    /// Search URL prefix; the tag query is appended verbatim.
    pub quote_api: String,
    /// Base URL; the encoded reference is appended as a path segment.
    pub bible_api: String,
    pub bible_translation: String,
}

impl Default for ExternalApisConfig {
    fn default() -> Self {
        Self {
            quote_api: "https://api.quotable.io/search/quotes?limit=1&query=".to_string(),
            bible_api: "https://bible-api.com/".to_string(),
            bible_translation: "kjv".to_string(),
        }
    }
}

/// Outbound HTTP client settings shared by all upstream clients.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    /// Disables TLS certificate validation. Development only.
    pub accept_invalid_certs: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
        }
    }
}

impl HttpConfig {
    /// Build the shared outbound client.
    pub fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        if self.accept_invalid_certs {
            tracing::warn!(
                "TLS certificate validation is DISABLED for outbound requests; \
                 do not run this configuration in production"
            );
        }
        reqwest::Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
    }
}

/// Inbound server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Static frontend directory, served only if it exists.
    pub web_dir: PathBuf,
    /// Number of plan days enriched at once. 1 means strictly sequential.
    pub enrich_concurrency: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            web_dir: PathBuf::from("wwwroot"),
            enrich_concurrency: 1,
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub github_models: GitHubModelsConfig,
    pub external_apis: ExternalApisConfig,
    pub http: HttpConfig,
    pub server: ServerConfig,
}

// ── File format ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(rename = "GitHubModels")]
    github_models: Option<GitHubModelsSection>,
    #[serde(rename = "ExternalApis")]
    external_apis: Option<ExternalApisSection>,
    #[serde(rename = "Http")]
    http: Option<HttpSection>,
    #[serde(rename = "Server")]
    server: Option<ServerSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GitHubModelsSection {
    api_token: Option<SecretString>,
    api_url: Option<String>,
    default_model: Option<String>,
    api_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ExternalApisSection {
    quote_api: Option<String>,
    bible_api: Option<String>,
    bible_translation: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HttpSection {
    timeout_secs: Option<u64>,
    accept_invalid_certs: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ServerSection {
    port: Option<u16>,
    web_dir: Option<PathBuf>,
    enrich_concurrency: Option<usize>,
}

impl AppConfig {
    /// Load configuration from defaults, the optional config file and the
    /// process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = Self::config_file_path() {
            config.apply_file(&path)?;
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// `HABIT_COACH_CONFIG` if set, else `habit-coach.toml` when present.
    pub fn config_file_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("HABIT_COACH_CONFIG") {
            return Some(PathBuf::from(path));
        }
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        default.exists().then_some(default)
    }

    /// Overlay values from a TOML file.
    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path)?;
        self.apply_toml(&content).map_err(|message| ConfigError::ParseError {
            path: path.display().to_string(),
            message,
        })
    }

    fn apply_toml(&mut self, content: &str) -> Result<(), String> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| e.to_string())?;

        if let Some(gh) = file.github_models {
            // A blank token counts as not configured.
            if let Some(token) = gh.api_token.filter(|t| !t.expose_secret().trim().is_empty()) {
                self.github_models.api_token = Some(token);
            }
            if let Some(v) = gh.api_url {
                self.github_models.api_url = v;
            }
            if let Some(v) = gh.default_model {
                self.github_models.default_model = v;
            }
            if let Some(v) = gh.api_version {
                self.github_models.api_version = v;
            }
        }

        if let Some(ext) = file.external_apis {
            if let Some(v) = ext.quote_api {
                self.external_apis.quote_api = v;
            }
            if let Some(v) = ext.bible_api {
                self.external_apis.bible_api = v;
            }
            if let Some(v) = ext.bible_translation {
                self.external_apis.bible_translation = v;
            }
        }

        if let Some(http) = file.http {
            if let Some(secs) = http.timeout_secs {
                self.http.timeout = Duration::from_secs(secs);
            }
            if let Some(v) = http.accept_invalid_certs {
                self.http.accept_invalid_certs = v;
            }
        }

        if let Some(server) = file.server {
            if let Some(v) = server.port {
                self.server.port = v;
            }
            if let Some(v) = server.web_dir {
                self.server.web_dir = v;
            }
            if let Some(v) = server.enrich_concurrency {
                if v == 0 {
                    return Err("Server.EnrichConcurrency must be at least 1".to_string());
                }
                self.server.enrich_concurrency = v;
            }
        }

        Ok(())
    }

    /// Overlay values from environment-style lookups. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("GITHUB_MODELS_API_TOKEN") {
            self.github_models.api_token = Some(SecretString::from(token));
        }
        if let Some(v) = get("GITHUB_MODELS_API_URL") {
            self.github_models.api_url = v;
        }
        if let Some(v) = get("GITHUB_MODELS_DEFAULT_MODEL") {
            self.github_models.default_model = v;
        }
        if let Some(v) = get("GITHUB_MODELS_API_VERSION") {
            self.github_models.api_version = v;
        }
        if let Some(v) = get("QUOTE_API_URL") {
            self.external_apis.quote_api = v;
        }
        if let Some(v) = get("BIBLE_API_URL") {
            self.external_apis.bible_api = v;
        }
        if let Some(v) = get("BIBLE_TRANSLATION") {
            self.external_apis.bible_translation = v;
        }

        if let Some(v) = get("HABIT_COACH_HTTP_TIMEOUT_SECS") {
            let secs: u64 = parse_value("HABIT_COACH_HTTP_TIMEOUT_SECS", &v)?;
            self.http.timeout = Duration::from_secs(secs);
        }
        if let Some(v) = get("HABIT_COACH_ACCEPT_INVALID_CERTS") {
            self.http.accept_invalid_certs = parse_value("HABIT_COACH_ACCEPT_INVALID_CERTS", &v)?;
        }
        if let Some(v) = get("HABIT_COACH_PORT") {
            self.server.port = parse_value("HABIT_COACH_PORT", &v)?;
        }
        if let Some(v) = get("HABIT_COACH_WEB_DIR") {
            self.server.web_dir = PathBuf::from(v);
        }
        if let Some(v) = get("HABIT_COACH_ENRICH_CONCURRENCY") {
            let n: usize = parse_value("HABIT_COACH_ENRICH_CONCURRENCY", &v)?;
            if n == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "HABIT_COACH_ENRICH_CONCURRENCY".to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
            self.server.enrich_concurrency = n;
        }

        Ok(())
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{raw:?}: {e}"),
    })
}
