//! Transactional API delivery via the Resend REST endpoint
//!
//! One POST per send, bearer-token auth, no retries. Non-success statuses
//! become delivery errors carrying whatever diagnostic body the provider
//! returned.

use crate::config::{ContactConfig, ResendSettings};
use crate::error::{FormgateError, Result};
use crate::mailer::{DeliveryReceipt, Mailer, OutboundEmail};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

pub struct ResendMailer {
    client: reqwest::Client,
    settings: ResendSettings,
    contact: ContactConfig,
}

#[derive(Debug, Default, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

impl ResendMailer {
    pub fn new(settings: ResendSettings, contact: ContactConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
            contact,
        }
    }

    fn payload(&self, email: &OutboundEmail) -> Value {
        json!({
            "from": format!("{} <{}>", self.contact.from_name, self.contact.from),
            "to": [email.to],
            "subject": email.subject,
            "html": email.html,
            "text": email.text,
            "reply_to": email.submitter_email,
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt> {
        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.settings.api_key)
            .json(&self.payload(email))
            .send()
            .await
            .map_err(|e| FormgateError::delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Best-effort decode of the provider's error body; an empty
            // object when the body isn't JSON.
            let detail: Value = response.json().await.unwrap_or_else(|_| json!({}));
            tracing::warn!(status = status.as_u16(), "provider rejected send");
            return Err(FormgateError::delivery(detail));
        }

        let body: SendResponse = response.json().await.unwrap_or_default();
        Ok(DeliveryReceipt { id: body.id })
    }
}

impl std::fmt::Debug for ResendMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendMailer")
            .field("from", &self.contact.from)
            .field("to", &self.contact.to)
            .finish()
    }
}
