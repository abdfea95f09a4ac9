//! # Core Traits (Ports)
//!
//! Any host adapter must implement these traits to be used by the binary.

use async_trait::async_trait;
use crate::models::{Category, Post, PostProcessed, Thread, Upload};
use uuid::Uuid;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// Read/write contract against the host's forum records.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait ForumStore: Send + Sync {
    async fn get_post(&self, id: Uuid) -> anyhow::Result<Option<Post>>;
    async fn get_thread(&self, id: Uuid) -> anyhow::Result<Option<Thread>>;
    async fn get_category(&self, id: Uuid) -> anyhow::Result<Option<Category>>;
    async fn get_upload(&self, id: Uuid) -> anyhow::Result<Option<Upload>>;

    /// Points the thread's thumbnail at `upload_id`, leaving every other
    /// column as the host last wrote it. Must return an error when the
    /// thread is gone or the upload is unknown.
    async fn set_thread_thumbnail(&self, thread_id: Uuid, upload_id: Uuid) -> anyhow::Result<()>;
}

/// Globally scoped, host-owned settings.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait SiteSettings: Send + Sync {
    /// Returns `None` when the host has no value stored under `name`.
    async fn get_bool(&self, name: &str) -> anyhow::Result<Option<bool>>;
}

/// Authenticates inbound webhook deliveries.
pub trait WebhookVerifier: Send + Sync {
    /// `signature` is the raw header value, if the sender provided one.
    fn verify(&self, body: &[u8], signature: Option<&str>) -> bool;
}

/// A subscriber to the host's "post processed" event.
#[async_trait]
pub trait PostProcessedHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &PostProcessed) -> crate::error::Result<crate::assigner::Outcome>;
}
