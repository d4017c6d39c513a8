use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;

use crate::error::{FormgateError, Result};

/// Main configuration for the gateway process.
///
/// Resolved once at startup from the environment; read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub mailer: MailerKind,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl ServerConfig {
    pub fn addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Which delivery strategy this deployment runs.
///
/// Selected once at startup; never negotiated per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MailerKind {
    Smtp,
    Resend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            mailer: MailerKind::Smtp,
        }
    }
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_mailer(mut self, mailer: MailerKind) -> Self {
        self.config.mailer = mailer;
        self
    }

    /// Load configuration from environment variables
    ///
    /// Reads `HOST`, `PORT`, and `MAILER` (`smtp` or `resend`, default `smtp`).
    pub fn from_env(mut self) -> Self {
        if let Ok(host) = std::env::var("HOST") {
            self.config.server.host = host;
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.config.server.port = port;
        }
        if let Ok(mailer) = std::env::var("MAILER") {
            match mailer.to_lowercase().as_str() {
                "resend" => self.config.mailer = MailerKind::Resend,
                "smtp" => self.config.mailer = MailerKind::Smtp,
                other => {
                    tracing::warn!(mailer = other, "unknown MAILER value, keeping smtp");
                }
            }
        }
        self
    }

    pub fn build(self) -> Result<Config> {
        if self.config.server.port == 0 {
            return Err(FormgateError::internal("server port must be greater than 0"));
        }
        self.config.server.addr().map_err(|e| {
            FormgateError::internal(format!(
                "invalid server address {}:{} - {}",
                self.config.server.host, self.config.server.port, e
            ))
        })?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Addressing for the notification email: where it goes and the identity
/// it is sent under.
#[derive(Debug, Clone)]
pub struct ContactConfig {
    /// Destination for every notification
    pub to: String,
    /// Display/authoritative sender address
    pub from: String,
    /// Display name shown in the From/Sender header
    pub from_name: String,
}

/// SMTP relay connection parameters
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    /// true = implicit TLS (typically 465), false = STARTTLS (typically 587)
    pub implicit_tls: bool,
    pub username: String,
    pub password: String,
    /// Put the submitter's address on the envelope instead of the
    /// authenticated account. Risks provider-side spoofing flags.
    pub force_from_user: bool,
}

/// Transactional API authorization
#[derive(Debug, Clone)]
pub struct ResendSettings {
    pub api_key: String,
}

/// Settings for whichever strategy is deployed
#[derive(Debug, Clone)]
pub enum MailerSettings {
    Smtp(SmtpSettings),
    Resend(ResendSettings),
}

/// Config keys that were required but absent from the environment.
///
/// Rendered into the configuration-error response, so it names keys only,
/// never values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingSettings(Vec<&'static str>);

impl MissingSettings {
    fn push(&mut self, key: &'static str) {
        self.0.push(key);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<&'static str>> for MissingSettings {
    fn from(keys: Vec<&'static str>) -> Self {
        Self(keys)
    }
}

impl fmt::Display for MissingSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

const DEFAULT_FROM_NAME: &str = "Contact Form";

/// Resolve the delivery settings for the deployed strategy from the
/// environment.
///
/// SMTP strategy:
/// - `SMTP_HOST` (default: smtp.gmail.com)
/// - `SMTP_PORT` (default: 587)
/// - `SMTP_SECURE` (`ssl` = implicit TLS, anything else = STARTTLS)
/// - `SMTP_USER`, `SMTP_PASS` (required; embedded whitespace is stripped
///   from the password to survive copy-paste artifacts)
/// - `FORCE_FROM_USER` (`true` = submitter on the envelope)
/// - `CONTACT_TO_EMAIL` (required), `CONTACT_FROM_EMAIL` (defaults to
///   `SMTP_USER`), `CONTACT_FROM_NAME`
///
/// Resend strategy:
/// - `RESEND_API_KEY`, `CONTACT_TO_EMAIL`, `CONTACT_FROM_EMAIL` (required)
/// - `CONTACT_FROM_NAME`
///
/// Returns the keys that are missing instead of a config on failure, so
/// the handler can answer with a configuration error naming them.
pub fn delivery_from_env(
    kind: MailerKind,
) -> std::result::Result<(ContactConfig, MailerSettings), MissingSettings> {
    let mut missing = MissingSettings::default();
    let from_name = env_or("CONTACT_FROM_NAME", DEFAULT_FROM_NAME);

    match kind {
        MailerKind::Smtp => {
            let host = env_or("SMTP_HOST", "smtp.gmail.com");
            let port = std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587);
            let implicit_tls = std::env::var("SMTP_SECURE")
                .map(|v| v.to_lowercase() == "ssl")
                .unwrap_or(false);
            let force_from_user = std::env::var("FORCE_FROM_USER")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false);

            let username = require(&mut missing, "SMTP_USER");
            // Strip whitespace first: a pasted app password with spaces
            // must not count as present.
            let password = std::env::var("SMTP_PASS")
                .ok()
                .map(|p| p.chars().filter(|c| !c.is_whitespace()).collect::<String>())
                .filter(|p| !p.is_empty());
            if password.is_none() {
                missing.push("SMTP_PASS");
            }
            let to = require(&mut missing, "CONTACT_TO_EMAIL");
            // The display sender falls back to the authenticated account
            let from = std::env::var("CONTACT_FROM_EMAIL")
                .ok()
                .filter(|v| !v.is_empty())
                .or_else(|| username.clone());
            if from.is_none() {
                missing.push("CONTACT_FROM_EMAIL");
            }

            let (Some(username), Some(password), Some(to), Some(from)) =
                (username, password, to, from)
            else {
                return Err(missing);
            };

            Ok((
                ContactConfig {
                    to,
                    from,
                    from_name,
                },
                MailerSettings::Smtp(SmtpSettings {
                    host,
                    port,
                    implicit_tls,
                    username,
                    password,
                    force_from_user,
                }),
            ))
        }
        MailerKind::Resend => {
            let api_key = require(&mut missing, "RESEND_API_KEY");
            let to = require(&mut missing, "CONTACT_TO_EMAIL");
            let from = require(&mut missing, "CONTACT_FROM_EMAIL");

            let (Some(api_key), Some(to), Some(from)) = (api_key, to, from) else {
                return Err(missing);
            };

            Ok((
                ContactConfig {
                    to,
                    from,
                    from_name,
                },
                MailerSettings::Resend(ResendSettings { api_key }),
            ))
        }
    }
}

fn require(missing: &mut MissingSettings, key: &'static str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => Some(v),
        _ => {
            missing.push(key);
            None
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_settings_display_joins_keys() {
        let missing = MissingSettings::from(vec!["SMTP_USER", "SMTP_PASS", "CONTACT_TO_EMAIL"]);
        assert_eq!(missing.to_string(), "SMTP_USER/SMTP_PASS/CONTACT_TO_EMAIL");
    }

    #[test]
    fn config_builder_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.mailer, MailerKind::Smtp);
    }

    #[test]
    fn config_builder_rejects_port_zero() {
        assert!(ConfigBuilder::new().with_port(0).build().is_err());
    }

    // Environment access is process-global, so every env scenario lives in
    // this single test to keep it off other threads' toes.
    #[test]
    fn delivery_settings_resolve_from_env() {
        let smtp_keys = [
            "SMTP_HOST",
            "SMTP_PORT",
            "SMTP_SECURE",
            "SMTP_USER",
            "SMTP_PASS",
            "FORCE_FROM_USER",
            "CONTACT_TO_EMAIL",
            "CONTACT_FROM_EMAIL",
            "CONTACT_FROM_NAME",
            "RESEND_API_KEY",
        ];
        for key in smtp_keys {
            std::env::remove_var(key);
        }

        // Nothing set: every required SMTP key is reported.
        let err = delivery_from_env(MailerKind::Smtp).unwrap_err();
        assert_eq!(err.to_string(), "SMTP_USER/SMTP_PASS/CONTACT_TO_EMAIL/CONTACT_FROM_EMAIL");

        // Full SMTP environment.
        std::env::set_var("SMTP_USER", "relay@example.com");
        std::env::set_var("SMTP_PASS", "abcd efgh ijkl mnop");
        std::env::set_var("SMTP_SECURE", "ssl");
        std::env::set_var("FORCE_FROM_USER", "TRUE");
        std::env::set_var("CONTACT_TO_EMAIL", "owner@example.com");

        let (contact, settings) = delivery_from_env(MailerKind::Smtp).unwrap();
        assert_eq!(contact.to, "owner@example.com");
        // CONTACT_FROM_EMAIL falls back to the SMTP account.
        assert_eq!(contact.from, "relay@example.com");
        assert_eq!(contact.from_name, "Contact Form");
        let MailerSettings::Smtp(smtp) = settings else {
            panic!("expected SMTP settings");
        };
        assert_eq!(smtp.host, "smtp.gmail.com");
        assert_eq!(smtp.port, 587);
        assert!(smtp.implicit_tls);
        assert!(smtp.force_from_user);
        // Whitespace stripped from the pasted app password.
        assert_eq!(smtp.password, "abcdefghijklmnop");

        // A whitespace-only password counts as missing.
        std::env::set_var("SMTP_PASS", "   ");
        let err = delivery_from_env(MailerKind::Smtp).unwrap_err();
        assert_eq!(err.to_string(), "SMTP_PASS");

        // Resend strategy requires its own keys.
        let err = delivery_from_env(MailerKind::Resend).unwrap_err();
        assert_eq!(err.to_string(), "RESEND_API_KEY/CONTACT_FROM_EMAIL");

        std::env::set_var("RESEND_API_KEY", "re_123");
        std::env::set_var("CONTACT_FROM_EMAIL", "noreply@example.com");
        let (contact, settings) = delivery_from_env(MailerKind::Resend).unwrap();
        assert_eq!(contact.from, "noreply@example.com");
        assert!(matches!(settings, MailerSettings::Resend(_)));

        for key in smtp_keys {
            std::env::remove_var(key);
        }
    }
}
