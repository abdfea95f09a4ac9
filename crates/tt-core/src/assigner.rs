//! # ThumbnailAssigner
//!
//! Resolves the entities around a processed post, asks `eligibility` for a
//! verdict and, when the post qualifies, points the thread at its upload.

use std::sync::Arc;
use serde::Serialize;
use uuid::Uuid;
use crate::eligibility::{self, Candidate, Ineligible};
use crate::error::{AppError, Result};
use crate::models::Post;
use crate::settings::ThumbnailSettings;
use crate::traits::ForumStore;

/// What happened to the thread after a post was processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The thumbnail was overwritten and persisted
    Applied { thread_id: Uuid, upload_id: Uuid },
    /// The thread already pointed at this upload; nothing was written
    Unchanged { thread_id: Uuid, upload_id: Uuid },
    Skipped { reason: Ineligible },
}

pub struct ThumbnailAssigner {
    store: Arc<dyn ForumStore>,
}

impl ThumbnailAssigner {
    pub fn new(store: Arc<dyn ForumStore>) -> Self {
        Self { store }
    }

    /// Runs the guard-then-mutate step for a single post.
    ///
    /// Lookups stop as soon as a relation is missing; `evaluate` then
    /// reports the corresponding gate. Only the thumbnail column is written,
    /// at most once.
    pub async fn assign(&self, post: &Post, settings: &ThumbnailSettings) -> Result<Outcome> {
        if !settings.enabled {
            return Ok(Outcome::Skipped { reason: Ineligible::Disabled });
        }

        let thread = self.store.get_thread(post.thread_id).await.map_err(read_failure)?;

        let category = match thread.as_ref().and_then(|t| t.category_id) {
            Some(id) => self.store.get_category(id).await.map_err(read_failure)?,
            None => None,
        };

        let upload = match post.image_upload_id {
            Some(id) if !id.is_nil() => self.store.get_upload(id).await.map_err(read_failure)?,
            _ => None,
        };

        let candidate = Candidate {
            post,
            thread: thread.as_ref(),
            category: category.as_ref(),
            upload: upload.as_ref(),
        };

        let eligible = match eligibility::evaluate(settings, &candidate) {
            Ok(eligible) => eligible,
            Err(reason) => {
                tracing::debug!(post_id = %post.id, thread_id = %post.thread_id, %reason, "post not eligible for thumbnail");
                return Ok(Outcome::Skipped { reason });
            }
        };
        let (thread_id, upload_id) = (eligible.thread.id, eligible.upload_id);

        if eligible.thread.image_upload_id == Some(upload_id) {
            return Ok(Outcome::Unchanged { thread_id, upload_id });
        }

        self.store.set_thread_thumbnail(thread_id, upload_id).await.map_err(|e| {
            tracing::error!(%thread_id, %upload_id, error = %e, "failed to persist thread thumbnail");
            AppError::Persistence(e)
        })?;

        tracing::info!(%thread_id, post_id = %post.id, %upload_id, "thread thumbnail updated");
        Ok(Outcome::Applied { thread_id, upload_id })
    }
}

fn read_failure(e: anyhow::Error) -> AppError {
    AppError::Internal(format!("{e:#}"))
}
