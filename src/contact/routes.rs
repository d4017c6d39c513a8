use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::Serialize;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

use crate::app::AppContext;
use crate::contact::compose::compose;
use crate::contact::request::{ContactRequest, Submission};
use crate::error::{FormgateError, Result};

/// Bound on the whole request, delivery round trip included. The
/// transports carry no explicit timeout of their own, so this keeps a
/// stalled relay from hanging the handler indefinitely.
const HANDLER_TIMEOUT: Duration = Duration::from_secs(15);

/// Body of a successful submission response
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub ok: bool,
    /// Provider-assigned identifier, verbatim; null when none was given
    pub id: Option<String>,
}

/// Build the gateway router with the given context injected as state.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route(
            "/api/contact",
            post(submit_contact).fallback(method_not_allowed),
        )
        .layer(TimeoutLayer::new(HANDLER_TIMEOUT))
        .with_state(ctx)
}

/// Handle one submission: validate, compose, make exactly one delivery
/// attempt, and hold the response until it settles.
async fn submit_contact(
    State(ctx): State<AppContext>,
    payload: std::result::Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<ContactResponse>> {
    // A body that doesn't parse degrades to an empty submission, so the
    // caller gets the missing-fields rejection instead of a bare
    // framework response.
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unparseable request body");
            ContactRequest::default()
        }
    };

    let submission = Submission::validate(request)?;
    // Configuration problems must surface before any outbound call.
    let contact = ctx.contact()?;
    let mailer = ctx.mailer()?;

    let email = compose(&submission, contact);
    let receipt = mailer.send(&email).await?;

    tracing::info!(id = receipt.id.as_deref().unwrap_or("-"), "contact message delivered");
    Ok(Json(ContactResponse {
        ok: true,
        id: receipt.id,
    }))
}

async fn method_not_allowed() -> FormgateError {
    FormgateError::MethodNotAllowed
}
