//! In-memory mailer that captures outbound messages for assertions.

use crate::error::{FormgateError, Result};
use crate::mailer::{DeliveryReceipt, Mailer, OutboundEmail};
use async_trait::async_trait;
use std::sync::Mutex;

/// Collects sent messages in memory instead of delivering them.
///
/// Hold it in an `Arc` shared with the router under test, then assert on
/// `sent_messages()` after driving requests through.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    receipt_id: Option<String>,
    fail_with: Option<String>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report this identifier on every successful send.
    pub fn with_receipt_id(mut self, id: impl Into<String>) -> Self {
        self.receipt_id = Some(id.into());
        self
    }

    /// Fail every send with a delivery error carrying this diagnostic.
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.fail_with = Some(reason.into());
        self
    }

    pub fn sent_messages(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_message(&self) -> Option<OutboundEmail> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt> {
        if let Some(reason) = &self.fail_with {
            return Err(FormgateError::delivery(reason.clone()));
        }

        self.sent.lock().unwrap().push(email.clone());
        Ok(DeliveryReceipt {
            id: self.receipt_id.clone(),
        })
    }
}
