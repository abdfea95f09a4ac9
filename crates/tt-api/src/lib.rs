//! # tt-api
//!
//! Webhook receiver: the forum host POSTs here after it has rendered a
//! post, and the registered hooks run against that post.

pub mod error;
pub mod handlers;
pub mod middleware;

use actix_web::web;

pub use error::ApiError;
pub use handlers::AppState;

/// Header carrying the HMAC signature of the raw request body.
pub const SIGNATURE_HEADER: &str = "X-Topic-Thumb-Signature";

/// Configures the routes for the receiver.
///
/// Scoped so the binary can mount everything under a prefix if needed.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            .route("/health", web::get().to(handlers::health))
            .route("/hooks/post-processed", web::post().to(handlers::post_processed)),
    );
}
