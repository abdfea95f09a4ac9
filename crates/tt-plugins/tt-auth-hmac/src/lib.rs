//! # tt-auth-hmac
//!
//! HMAC-SHA256 implementation of `WebhookVerifier`.
//! The sender signs the raw request body and sends `sha256=<hex digest>`.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tt_core::traits::WebhookVerifier;

type HmacSha256 = Hmac<Sha256>;

pub struct HmacWebhookVerifier {
    secret: SecretString,
}

impl HmacWebhookVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length, so this cannot fail.
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .unwrap_or_else(|_| unreachable!("hmac keys have no length limit"))
    }

    /// Produces the header value a sender would attach to `body`.
    pub fn sign(&self, body: &[u8]) -> String {
        let mut mac = self.mac();
        mac.update(body);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }
}

impl WebhookVerifier for HmacWebhookVerifier {
    fn verify(&self, body: &[u8], signature: Option<&str>) -> bool {
        let Some(header) = signature else {
            tracing::debug!("webhook delivery has no signature header");
            return false;
        };
        let Some(digest) = header.trim().strip_prefix("sha256=") else {
            tracing::debug!("webhook signature uses an unsupported scheme");
            return false;
        };
        let Ok(expected) = hex::decode(digest) else {
            return false;
        };

        let mut mac = self.mac();
        mac.update(body);
        // constant-time comparison
        mac.verify_slice(&expected).is_ok()
    }
}

/// Accepts every delivery. For deployments where the receiver is only
/// reachable from the forum host.
pub struct UnsignedWebhookVerifier;

impl UnsignedWebhookVerifier {
    pub fn new() -> Self {
        tracing::warn!("webhook signatures are not checked; set webhook.secret to enable");
        Self
    }
}

impl Default for UnsignedWebhookVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl WebhookVerifier for UnsignedWebhookVerifier {
    fn verify(&self, _body: &[u8], _signature: Option<&str>) -> bool {
        true
    }
}
