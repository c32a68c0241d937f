//! Centralized server configuration.
//!
//! Strongly-typed configuration loaded via the `config` crate from
//! environment variables, nested sections separated by `__`
//! (e.g. `SCHEDULE__HOUR=7`, `EMAIL__API_KEY=...`).

use serde::Deserialize;

/// Server configuration composed from per-concern sections.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// PostgreSQL database connection URL.
    pub database_url: String,

    /// Address to bind the HTTP listener to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Public URL of this server, embedded in approval links.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Process-wide secret: signs action tokens and guards `/generate`.
    pub secret_key: String,

    /// How many records the dashboard shows.
    #[serde(default = "default_dashboard_limit")]
    pub dashboard_limit: i64,

    /// Optional path to a JSON themes file; built-in defaults otherwise.
    #[serde(default)]
    pub themes_path: Option<String>,

    /// Content producer configuration.
    pub anthropic: AnthropicConfig,

    /// Approval email configuration.
    pub email: EmailConfig,

    /// Publishing configuration.
    #[serde(default)]
    pub instagram: InstagramConfig,

    /// Daily generation schedule.
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Content producer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicConfig {
    /// Anthropic API key.
    pub api_key: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
}

/// Approval email configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Resend API key.
    pub api_key: String,

    /// Sender address.
    #[serde(default = "default_from_email")]
    pub from: String,

    /// The approver's address.
    pub approver: String,
}

/// Publishing configuration.
///
/// Credentials default to empty so an unconfigured deployment starts up
/// and fails per-publish instead of at boot.
#[derive(Debug, Clone, Deserialize)]
pub struct InstagramConfig {
    /// Long-lived Graph API access token.
    #[serde(default)]
    pub access_token: String,

    /// Business account id.
    #[serde(default)]
    pub account_id: String,

    /// Public image URL attached to every post; the platform requires one.
    #[serde(default = "default_image_url")]
    pub default_image_url: Option<String>,
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            account_id: String::new(),
            default_image_url: default_image_url(),
        }
    }
}

/// Daily generation schedule configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Hour of day (24h, local time).
    #[serde(default = "default_schedule_hour")]
    pub hour: u32,

    /// Minute.
    #[serde(default)]
    pub minute: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            hour: default_schedule_hour(),
            minute: 0,
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_dashboard_limit() -> i64 {
    50
}

fn default_model() -> String {
    postloop_ai::anthropic::DEFAULT_MODEL.to_string()
}

fn default_from_email() -> String {
    "noreply@example.com".to_string()
}

fn default_image_url() -> Option<String> {
    // Placeholder until image generation lands; posts need some image.
    Some("https://images.unsplash.com/photo-1506126613408-eca07ce68773?w=1080&q=80".to_string())
}

fn default_schedule_hour() -> u32 {
    7
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_defaults_to_seven_local() {
        let schedule = ScheduleConfig::default();
        assert_eq!(schedule.hour, 7);
        assert_eq!(schedule.minute, 0);
    }

    #[test]
    fn instagram_defaults_are_unconfigured_but_present() {
        let instagram = InstagramConfig::default();
        assert!(instagram.access_token.is_empty());
        assert!(instagram.default_image_url.is_some());
    }
}
