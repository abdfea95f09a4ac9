//! Middleware for logging and response hardening.

use actix_web::middleware::{DefaultHeaders, Logger};

/// Request log line: remote-ip "request-line" status-code response-size elapsed-ms
pub fn standard_middleware() -> Logger {
    Logger::new(r#"%a "%r" %s %b %Dms"#)
}

// The receiver only ever returns JSON or plain text.
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("Cache-Control", "no-store"))
}
