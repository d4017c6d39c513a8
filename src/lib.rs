//! formgate - a server-side contact-form mail gateway
//!
//! Accepts a structured submission (name, email, subject, message),
//! validates it, composes an HTML + plain-text notification, and delivers
//! it to a fixed destination through the strategy this deployment runs:
//! an authenticated SMTP relay or a transactional REST API.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use formgate::{AppContext, ConfigBuilder, MemoryMailer, router};
//!
//! #[tokio::main]
//! async fn main() {
//!     formgate::init_tracing();
//!
//!     let config = ConfigBuilder::new().from_env().build().unwrap();
//!
//!     let ctx = AppContext::builder()
//!         .with_mailer(Arc::new(MemoryMailer::new()))
//!         .build();
//!
//!     let listener = tokio::net::TcpListener::bind(config.server.addr().unwrap())
//!         .await
//!         .unwrap();
//!     axum::serve(listener, router(ctx)).await.unwrap();
//! }
//! ```

mod app;
pub mod config;
pub mod contact;
mod error;
pub mod mailer;

pub use app::{AppContext, AppContextBuilder};
pub use config::{
    Config, ConfigBuilder, ContactConfig, MailerKind, MailerSettings, MissingSettings,
    ResendSettings, ServerConfig, SmtpSettings,
};
pub use contact::{ContactRequest, ContactResponse, Submission, compose, html_escape, router};
pub use error::{FormgateError, Result};
pub use mailer::{
    DeliveryReceipt, Mailer, MemoryMailer, OutboundEmail, ResendMailer, SmtpMailer,
};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// Call this early in main(), before building the app.
///
/// # Environment Variables
///
/// - `RUST_LOG`: log filter (e.g. "info", "formgate=debug")
/// - `FORMGATE_LOG_JSON`: set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("FORMGATE_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
