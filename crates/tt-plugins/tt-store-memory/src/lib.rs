//! # tt-store-memory
//!
//! In-process implementation of `ForumStore` and `SiteSettings`.
//! Used when topic-thumb is embedded directly in a host process, and as
//! the backing store for scenario tests.

use anyhow::{bail, Context};
use async_trait::async_trait;
use dashmap::DashMap;
use tt_core::models::{Category, Post, Thread, Upload};
use tt_core::traits::{ForumStore, SiteSettings};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryForumStore {
    categories: DashMap<Uuid, Category>,
    threads: DashMap<Uuid, Thread>,
    posts: DashMap<Uuid, Post>,
    uploads: DashMap<Uuid, Upload>,
    settings: DashMap<String, bool>,
}

impl MemoryForumStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_category(&self, category: Category) {
        self.categories.insert(category.id, category);
    }

    pub fn insert_thread(&self, thread: Thread) {
        self.threads.insert(thread.id, thread);
    }

    pub fn insert_post(&self, post: Post) {
        self.posts.insert(post.id, post);
    }

    pub fn insert_upload(&self, upload: Upload) {
        self.uploads.insert(upload.id, upload);
    }

    pub fn set_setting(&self, name: &str, value: bool) {
        self.settings.insert(name.to_string(), value);
    }

    /// Current thumbnail of a thread, if the thread exists and has one.
    pub fn thumbnail_of(&self, thread_id: Uuid) -> Option<Uuid> {
        self.threads.get(&thread_id).and_then(|t| t.image_upload_id)
    }

    /// Mutates a stored thread in place; no-op for unknown ids.
    pub fn update_thread(&self, id: Uuid, f: impl FnOnce(&mut Thread)) {
        if let Some(mut thread) = self.threads.get_mut(&id) {
            f(thread.value_mut());
        }
    }

    pub fn remove_thread(&self, id: Uuid) -> Option<Thread> {
        self.threads.remove(&id).map(|(_, thread)| thread)
    }

    /// Mutates a stored category in place; no-op for unknown ids.
    pub fn update_category(&self, id: Uuid, f: impl FnOnce(&mut Category)) {
        if let Some(mut category) = self.categories.get_mut(&id) {
            f(category.value_mut());
        }
    }
}

#[async_trait]
impl ForumStore for MemoryForumStore {
    async fn get_post(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
        Ok(self.posts.get(&id).map(|p| p.clone()))
    }

    async fn get_thread(&self, id: Uuid) -> anyhow::Result<Option<Thread>> {
        Ok(self.threads.get(&id).map(|t| t.clone()))
    }

    async fn get_category(&self, id: Uuid) -> anyhow::Result<Option<Category>> {
        Ok(self.categories.get(&id).map(|c| c.clone()))
    }

    async fn get_upload(&self, id: Uuid) -> anyhow::Result<Option<Upload>> {
        Ok(self.uploads.get(&id).map(|u| u.clone()))
    }

    /// Touches only the thumbnail field of the stored thread.
    async fn set_thread_thumbnail(&self, thread_id: Uuid, upload_id: Uuid) -> anyhow::Result<()> {
        if !self.uploads.contains_key(&upload_id) {
            bail!("validation failed: upload {upload_id} does not exist");
        }

        let mut stored = self
            .threads
            .get_mut(&thread_id)
            .with_context(|| format!("thread {thread_id} does not exist"))?;
        stored.image_upload_id = Some(upload_id);
        tracing::trace!(%thread_id, %upload_id, "thread thumbnail set");
        Ok(())
    }
}

#[async_trait]
impl SiteSettings for MemoryForumStore {
    async fn get_bool(&self, name: &str) -> anyhow::Result<Option<bool>> {
        Ok(self.settings.get(name).map(|v| *v))
    }
}
