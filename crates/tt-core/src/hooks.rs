//! # Hooks
//!
//! Explicit subscription point for "post processed" events. Adapters (the
//! webhook receiver, an in-process host) own a `HookRegistry` and dispatch
//! into it; handlers never see how the event arrived.

use std::sync::Arc;
use async_trait::async_trait;
use crate::assigner::{Outcome, ThumbnailAssigner};
use crate::error::{AppError, Result};
use crate::models::PostProcessed;
use crate::settings::ThumbnailSettings;
use crate::traits::{ForumStore, PostProcessedHandler, SiteSettings};

/// One handler's result for a dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerReport {
    pub handler: &'static str,
    pub outcome: Outcome,
}

#[derive(Default)]
pub struct HookRegistry {
    handlers: Vec<Arc<dyn PostProcessedHandler>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers run in registration order.
    pub fn register(&mut self, handler: Arc<dyn PostProcessedHandler>) -> &mut Self {
        tracing::debug!(handler = handler.name(), "registered post_processed handler");
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Calls every handler in turn. The first error stops dispatch and is
    /// returned; later handlers do not run and nothing is retried.
    pub async fn dispatch(&self, event: &PostProcessed) -> Result<Vec<HandlerReport>> {
        let mut reports = Vec::with_capacity(self.handlers.len());
        for handler in &self.handlers {
            let outcome = handler.handle(event).await.inspect_err(|e| {
                tracing::warn!(handler = handler.name(), post_id = %event.post.id, error = %e, "post_processed handler failed");
            })?;
            reports.push(HandlerReport { handler: handler.name(), outcome });
        }
        Ok(reports)
    }
}

/// Binds `ThumbnailAssigner` to the event stream, taking a fresh settings
/// snapshot for every event.
pub struct ThumbnailHook {
    assigner: ThumbnailAssigner,
    settings: Arc<dyn SiteSettings>,
}

impl ThumbnailHook {
    pub const NAME: &'static str = "topic_thumbnail_recent_post";

    pub fn new(store: Arc<dyn ForumStore>, settings: Arc<dyn SiteSettings>) -> Self {
        Self { assigner: ThumbnailAssigner::new(store), settings }
    }
}

#[async_trait]
impl PostProcessedHandler for ThumbnailHook {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn handle(&self, event: &PostProcessed) -> Result<Outcome> {
        let snapshot = ThumbnailSettings::load(self.settings.as_ref())
            .await
            .map_err(|e| AppError::Internal(format!("loading site settings: {e:#}")))?;
        self.assigner.assign(&event.post, &snapshot).await
    }
}
