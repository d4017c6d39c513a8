use std::sync::Arc;

use crate::config::{ContactConfig, MissingSettings};
use crate::error::{FormgateError, Result};
use crate::mailer::Mailer;

/// Process-wide context handed to the handler as router state.
///
/// Holds the delivery configuration resolved once at startup and the
/// deployed delivery strategy. Cheap to clone; immutable after build.
#[derive(Clone)]
pub struct AppContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    contact: std::result::Result<ContactConfig, MissingSettings>,
    mailer: Option<Arc<dyn Mailer>>,
}

impl AppContext {
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::new()
    }

    /// The resolved contact addressing, or a configuration error naming
    /// the settings that were missing at startup.
    pub fn contact(&self) -> Result<&ContactConfig> {
        self.inner.contact.as_ref().map_err(|missing| {
            // A context that never saw any delivery settings still needs
            // a readable message, not an empty key list.
            if missing.is_empty() {
                FormgateError::misconfigured("delivery settings")
            } else {
                FormgateError::misconfigured(missing.to_string())
            }
        })
    }

    pub fn mailer(&self) -> Result<&Arc<dyn Mailer>> {
        self.inner
            .mailer
            .as_ref()
            .ok_or_else(|| FormgateError::internal("no mailer configured"))
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("configured", &self.inner.contact.is_ok())
            .field("has_mailer", &self.inner.mailer.is_some())
            .finish()
    }
}

#[must_use = "builder does nothing until you call build()"]
pub struct AppContextBuilder {
    contact: std::result::Result<ContactConfig, MissingSettings>,
    mailer: Option<Arc<dyn Mailer>>,
}

impl AppContextBuilder {
    fn new() -> Self {
        Self {
            contact: Err(MissingSettings::default()),
            mailer: None,
        }
    }

    pub fn with_contact(mut self, contact: ContactConfig) -> Self {
        self.contact = Ok(contact);
        self
    }

    /// Record that required settings were absent; every request will get
    /// a configuration error naming them.
    pub fn with_config_error(mut self, missing: MissingSettings) -> Self {
        self.contact = Err(missing);
        self
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn build(self) -> AppContext {
        AppContext {
            inner: Arc::new(ContextInner {
                contact: self.contact,
                mailer: self.mailer,
            }),
        }
    }
}
