use serde::Deserialize;

use crate::error::{FormgateError, Result};

/// Raw request body as submitted by the browser form.
///
/// Everything is optional at this stage; `Submission::validate` decides
/// what counts as present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A validated submission. Fields pass through unmodified: no trimming,
/// no normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

impl Submission {
    /// Validate a raw request. Pure; no side effects.
    ///
    /// Empty strings count as missing, same as absent fields. The email
    /// check is deliberately permissive: it only rejects gross
    /// malformation, not RFC violations.
    pub fn validate(request: ContactRequest) -> Result<Self> {
        let name = request.name.filter(|s| !s.is_empty());
        let email = request.email.filter(|s| !s.is_empty());
        let message = request.message.filter(|s| !s.is_empty());
        let subject = request.subject.filter(|s| !s.is_empty());

        let (Some(name), Some(email), Some(message)) = (name, email, message) else {
            return Err(FormgateError::MissingFields);
        };

        if !email_shape_ok(&email) {
            return Err(FormgateError::InvalidEmail);
        }

        Ok(Self {
            name,
            email,
            subject,
            message,
        })
    }
}

/// Unanchored shape check equivalent to `.+@.+\..+`: some `@` with at
/// least one character before it, then a `.` with at least one character
/// on each side.
fn email_shape_ok(email: &str) -> bool {
    let bytes = email.as_bytes();
    (1..bytes.len()).any(|at| {
        bytes[at] == b'@' && (at + 2..bytes.len() - 1).any(|dot| bytes[dot] == b'.')
    })
}
