//! Application configuration loaded from environment variables.
//!
//! The configuration is built once at startup and passed explicitly to every
//! component that needs it. Any missing required value or invalid value
//! aborts startup.
//!
//! # Security Notes
//! - Sensitive fields are clearly marked and must never be logged
//! - Production environments should inject them from a secret manager

use anyhow::{Context, bail};
use envconfig::Envconfig;

/// Application configuration with security-aware field management.
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// Environment name to deploy the app (NON-SENSITIVE)
    /// Values: "local", "dev", "staging", "prod"
    #[envconfig(default = "local")]
    pub env: String,

    /// Port for web server binding (NON-SENSITIVE)
    #[envconfig(default = "3000")]
    pub port: u16,

    /// 🔒 SENSITIVE: Token configured in the Facebook app dashboard to
    /// verify the webhook subscription
    pub fb_verify_token: String,

    /// 🔒 SENSITIVE: Page access token used for every Graph API call.
    /// Optional at startup, every outbound call fails fast without it.
    pub fb_page_access_token: Option<String>,

    /// Graph API base URL (NON-SENSITIVE)
    /// Example: "https://graph.facebook.com/v22.0"
    pub graph_api_url: String,

    /// Message broker connection URL (SEMI-SENSITIVE, may embed credentials)
    #[envconfig(default = "amqp://localhost:5672")]
    pub rabbitmq_url: String,

    /// Queue inbound events are published to (NON-SENSITIVE)
    #[envconfig(default = "messages_queue")]
    pub rabbitmq_queue: String,

    /// Client name used when talking to the broker (NON-SENSITIVE)
    #[envconfig(default = "FACEBOOK_SERVICE")]
    pub facebook_service_name: String,

    /// 🔒 SENSITIVE: Logfire write token, logs are only exported when set
    pub logfire_token: Option<String>,

    /// Path to SSL certificate file (NON-SENSITIVE)
    /// HTTPS is served only when both TLS paths are set
    pub tls_certificate_path: Option<String>,

    /// Path to SSL private key file (SENSITIVE PATH)
    pub tls_private_key_path: Option<String>,
}

impl AppConfig {
    /// Checks if running in production environment
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }

    /// Graph API base url without trailing slashes
    pub fn graph_api_base_url(&self) -> &str {
        self.graph_api_url.trim_end_matches('/')
    }

    /// Returns the certificate and private key paths when TLS is enabled
    pub fn tls_paths(&self) -> Option<(&str, &str)> {
        match (&self.tls_certificate_path, &self.tls_private_key_path) {
            (Some(cert), Some(key)) if !cert.is_empty() && !key.is_empty() => {
                Some((cert.as_str(), key.as_str()))
            }
            _ => None,
        }
    }

    /// Validates values envconfig can't check by itself
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.fb_verify_token.trim().is_empty() {
            bail!("FB_VERIFY_TOKEN must not be empty");
        }

        if self.port == 0 {
            bail!("PORT must be between 1 and 65535");
        }

        let graph_api_url = reqwest::Url::parse(&self.graph_api_url)
            .with_context(|| format!("GRAPH_API_URL is not a valid url: {}", self.graph_api_url))?;
        if !matches!(graph_api_url.scheme(), "http" | "https") {
            bail!("GRAPH_API_URL must use http or https");
        }

        reqwest::Url::parse(&self.rabbitmq_url).context("RABBITMQ_URL is not a valid url")?;

        if self.rabbitmq_queue.trim().is_empty() {
            bail!("RABBITMQ_QUEUE must not be empty");
        }

        if self.tls_certificate_path.is_some() != self.tls_private_key_path.is_some() {
            bail!("TLS_CERTIFICATE_PATH and TLS_PRIVATE_KEY_PATH must be set together");
        }

        Ok(())
    }
}

/// Loads the configuration from the process environment and validates it.
pub fn init_config() -> anyhow::Result<AppConfig> {
    let app_config =
        AppConfig::init_from_env().context("failed to load configuration from environment")?;
    app_config.validate()?;

    Ok(app_config)
}
