//! Delivery backends for composed notifications
//!
//! `Mailer` abstracts the outbound transport so the handler stays
//! strategy-agnostic:
//! - `SmtpMailer` - authenticated SMTP relay via lettre
//! - `ResendMailer` - transactional REST API via reqwest
//! - `MemoryMailer` - in-memory capture for tests

mod memory;
mod resend;
mod smtp;

pub use memory::MemoryMailer;
pub use resend::ResendMailer;
pub use smtp::SmtpMailer;

use crate::error::Result;
use async_trait::async_trait;

/// A composed notification, ready for whichever backend is deployed.
///
/// Built fresh per submission; never persisted or reused.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    /// Notification destination
    pub to: String,
    /// Full subject line (submitter name prefix included)
    pub subject: String,
    /// HTML rendering, user fields escaped
    pub html: String,
    /// Plain-text rendering, unescaped
    pub text: String,
    /// Submitter identity, used for From/Reply-To framing
    pub submitter_name: String,
    pub submitter_email: String,
}

/// Outcome of one delivery attempt
#[derive(Debug, Clone, Default)]
pub struct DeliveryReceipt {
    /// Provider-assigned message identifier, verbatim, when one exists
    pub id: Option<String>,
}

/// Outbound transport seam.
///
/// Implementations make exactly one delivery attempt per call; retrying
/// is the submitter's problem, not this layer's.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt>;
}
