//! SMTP relay delivery using lettre
//!
//! Supports two addressing modes. In the default "deliverability-safe"
//! mode the submitter appears in the From header for display, a Sender
//! header names the configured sending identity, and the envelope
//! reverse-path is the authenticated account, so bounces and reputation
//! checks hit an address the relay is actually authoritative for. With
//! `force_from_user` the submitter's address goes on the envelope too,
//! which providers may flag as spoofing.

use crate::config::{ContactConfig, SmtpSettings};
use crate::error::{FormgateError, Result};
use crate::mailer::{DeliveryReceipt, Mailer, OutboundEmail};
use async_trait::async_trait;
use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    address::Envelope,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    settings: SmtpSettings,
    contact: ContactConfig,
}

impl SmtpMailer {
    /// Build the relay transport once; it is reused for the process
    /// lifetime and pooled by lettre.
    pub fn new(settings: SmtpSettings, contact: ContactConfig) -> Result<Self> {
        let builder = if settings.implicit_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .map_err(|e| FormgateError::internal(format!("failed to create SMTP transport: {e}")))?;

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            settings,
            contact,
        })
    }

    /// Assemble the RFC 5322 message and the SMTP envelope for it.
    ///
    /// Kept separate from the network send so the addressing semantics
    /// are testable offline.
    fn build_parts(&self, email: &OutboundEmail, message_id: &str) -> Result<(Message, Envelope)> {
        let submitter: Address = email
            .submitter_email
            .parse()
            .map_err(|e| FormgateError::internal(format!("submitter address rejected: {e}")))?;
        let to: Address = email
            .to
            .parse()
            .map_err(|e| FormgateError::internal(format!("invalid destination address: {e}")))?;

        let submitter_mailbox = Mailbox::new(Some(email.submitter_name.clone()), submitter.clone());

        let mut builder = Message::builder()
            .from(submitter_mailbox.clone())
            .reply_to(submitter_mailbox)
            .to(Mailbox::new(None, to.clone()))
            .subject(email.subject.clone())
            .message_id(Some(message_id.to_string()));

        let envelope_from = if self.settings.force_from_user {
            submitter
        } else {
            let display: Address = self
                .contact
                .from
                .parse()
                .map_err(|e| FormgateError::internal(format!("invalid sender address: {e}")))?;
            builder = builder.sender(Mailbox::new(Some(self.contact.from_name.clone()), display));

            self.settings
                .username
                .parse()
                .map_err(|e| FormgateError::internal(format!("invalid account address: {e}")))?
        };

        let envelope = Envelope::new(Some(envelope_from), vec![to])
            .map_err(|e| FormgateError::internal(format!("invalid envelope: {e}")))?;

        let message = builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html.clone()),
                    ),
            )
            .map_err(|e| FormgateError::internal(format!("failed to build email: {e}")))?;

        Ok((message, envelope))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt> {
        let message_id = format!("<{}@{}>", uuid::Uuid::new_v4(), self.settings.host);
        let (message, envelope) = self.build_parts(email, &message_id)?;

        self.transport
            .send_raw(&envelope, &message.formatted())
            .await
            .map_err(|e| FormgateError::delivery(e.to_string()))?;

        tracing::debug!(%message_id, "relay accepted message");
        Ok(DeliveryReceipt {
            id: Some(message_id),
        })
    }
}

// AsyncSmtpTransport doesn't impl Debug, and the settings hold a secret.
impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("host", &self.settings.host)
            .field("port", &self.settings.port)
            .field("force_from_user", &self.settings.force_from_user)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(force_from_user: bool) -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".to_string(),
            port: 587,
            implicit_tls: false,
            username: "relay-account@example.com".to_string(),
            password: "secret".to_string(),
            force_from_user,
        }
    }

    fn contact() -> ContactConfig {
        ContactConfig {
            to: "owner@example.com".to_string(),
            from: "noreply@example.com".to_string(),
            from_name: "Contact Form".to_string(),
        }
    }

    fn outbound() -> OutboundEmail {
        OutboundEmail {
            to: "owner@example.com".to_string(),
            subject: "Ada — Hello".to_string(),
            html: "<p>hi</p>".to_string(),
            text: "hi".to_string(),
            submitter_name: "Ada".to_string(),
            submitter_email: "ada@example.com".to_string(),
        }
    }

    // The pooled transport needs a runtime to drop in, so these are async.

    #[tokio::test]
    async fn safe_mode_envelope_uses_authenticated_account() {
        let mailer = SmtpMailer::new(settings(false), contact()).unwrap();
        let (message, envelope) = mailer.build_parts(&outbound(), "<id@test>").unwrap();

        assert_eq!(
            envelope.from().map(ToString::to_string),
            Some("relay-account@example.com".to_string())
        );

        let raw = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(raw.contains("Sender:"));
        assert!(raw.contains("noreply@example.com"));
        // The submitter still shows in From and gets the replies.
        assert!(raw.contains("From:"));
        assert!(raw.contains("ada@example.com"));
        assert!(raw.contains("Reply-To:"));
    }

    #[tokio::test]
    async fn forced_mode_envelope_uses_submitter() {
        let mailer = SmtpMailer::new(settings(true), contact()).unwrap();
        let (message, envelope) = mailer.build_parts(&outbound(), "<id@test>").unwrap();

        assert_eq!(
            envelope.from().map(ToString::to_string),
            Some("ada@example.com".to_string())
        );

        let raw = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(!raw.contains("Sender:"));
        assert!(raw.contains("Reply-To:"));
    }

    #[tokio::test]
    async fn envelope_recipient_is_the_destination() {
        let mailer = SmtpMailer::new(settings(false), contact()).unwrap();
        let (_, envelope) = mailer.build_parts(&outbound(), "<id@test>").unwrap();

        let recipients: Vec<String> = envelope.to().iter().map(ToString::to_string).collect();
        assert_eq!(recipients, vec!["owner@example.com".to_string()]);
    }

    #[tokio::test]
    async fn bad_submitter_address_is_an_internal_error() {
        let mailer = SmtpMailer::new(settings(false), contact()).unwrap();
        let mut email = outbound();
        // Passed shape validation but not RFC parsing.
        email.submitter_email = "a b@c.d".to_string();

        let err = mailer.build_parts(&email, "<id@test>").unwrap_err();
        assert!(matches!(err, FormgateError::Internal(_)));
    }
}
