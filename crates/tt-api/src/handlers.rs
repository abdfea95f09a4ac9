//! # tt-api Handlers
//!
//! This module coordinates the flow between webhook deliveries and the
//! core hook registry.

use std::sync::Arc;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use tt_core::error::AppError;
use tt_core::hooks::HookRegistry;
use tt_core::models::PostProcessed;
use tt_core::traits::{ForumStore, WebhookVerifier};
use tt_core::Outcome;
use uuid::Uuid;
use crate::error::ApiError;
use crate::SIGNATURE_HEADER;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub store: Arc<dyn ForumStore>,
    pub hooks: Arc<HookRegistry>,
    pub verifier: Box<dyn WebhookVerifier>,
}

/// Body of a "post processed" delivery.
#[derive(Debug, Deserialize, Serialize)]
pub struct PostProcessedPayload {
    pub post_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct HandlerResult {
    pub handler: &'static str,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub post_id: Uuid,
    pub results: Vec<HandlerResult>,
}

/// Authenticates the delivery, loads the post, and runs every hook.
///
/// Body is taken raw so the signature covers exactly the bytes sent.
pub async fn post_processed(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    // 1. Security Check: was this sent by the host?
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    if !data.verifier.verify(&body, signature) {
        tracing::warn!(peer = ?req.peer_addr(), "rejected webhook with bad signature");
        return Err(AppError::Unauthorized("invalid webhook signature".into()).into());
    }

    // 2. Payload
    let payload: PostProcessedPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::ValidationError(format!("malformed payload: {e}")))?;

    // 3. Resolve the post the host is talking about
    let post = data
        .store
        .get_post(payload.post_id)
        .await
        .map_err(|e| AppError::Internal(format!("{e:#}")))?
        .ok_or_else(|| AppError::NotFound("Post".into(), payload.post_id.to_string()))?;

    // 4. Dispatch
    let reports = data.hooks.dispatch(&PostProcessed { post }).await?;

    Ok(HttpResponse::Ok().json(DispatchResponse {
        post_id: payload.post_id,
        results: reports
            .into_iter()
            .map(|r| HandlerResult { handler: r.handler, outcome: r.outcome })
            .collect(),
    }))
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}
