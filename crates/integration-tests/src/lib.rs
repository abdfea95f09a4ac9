//! Shared fixtures for the cross-crate tests in `tests/`.

use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use tt_core::models::{Category, JournalRole, Post, Thread, Upload, CATEGORY_OPT_IN_FIELD};
use tt_core::traits::ForumStore;
use tt_store_memory::MemoryForumStore;
use uuid::Uuid;

pub fn category(opted_in: bool) -> Category {
    let mut c = Category { id: Uuid::now_v7(), slug: format!("cat-{}", Uuid::now_v7().simple()), custom_fields: Default::default() };
    c.custom_fields.insert(CATEGORY_OPT_IN_FIELD.into(), opted_in.into());
    c
}

pub fn thread(starter: Uuid, category: Option<&Category>) -> Thread {
    Thread {
        id: Uuid::now_v7(),
        category_id: category.map(|c| c.id),
        author_id: starter,
        title: "Summer allotment diary".into(),
        image_upload_id: None,
    }
}

pub fn upload(filename: &str, extension: Option<&str>, content_type: Option<&str>) -> Upload {
    Upload {
        id: Uuid::now_v7(),
        original_filename: filename.into(),
        extension: extension.map(Into::into),
        content_type: content_type.map(Into::into),
    }
}

pub fn jpeg() -> Upload {
    upload("beans.jpg", Some("jpg"), Some("image/jpeg"))
}

pub fn png() -> Upload {
    upload("squash.png", Some("png"), Some("image/png"))
}

pub fn gif() -> Upload {
    upload("rain.gif", Some("gif"), Some("image/gif"))
}

pub fn post(thread: &Thread, author: Uuid, upload: Option<&Upload>) -> Post {
    Post {
        id: Uuid::now_v7(),
        thread_id: thread.id,
        author_id: author,
        image_upload_id: upload.map(|u| u.id),
        journal_role: None,
        created_at: Utc::now(),
    }
}

pub fn journal_post(thread: &Thread, author: Uuid, upload: Option<&Upload>, role: JournalRole) -> Post {
    Post { journal_role: Some(role), ..post(thread, author, upload) }
}

/// Delegates to the in-memory host but runs `between` right after each
/// thread read, so a host edit lands between the hook's read and its write.
pub struct InterleavedStore<F> {
    pub host: Arc<MemoryForumStore>,
    pub between: F,
}

#[async_trait]
impl<F> ForumStore for InterleavedStore<F>
where
    F: Fn(&MemoryForumStore, Uuid) + Send + Sync,
{
    async fn get_post(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
        self.host.get_post(id).await
    }

    async fn get_thread(&self, id: Uuid) -> anyhow::Result<Option<Thread>> {
        let thread = self.host.get_thread(id).await?;
        (self.between)(&self.host, id);
        Ok(thread)
    }

    async fn get_category(&self, id: Uuid) -> anyhow::Result<Option<Category>> {
        self.host.get_category(id).await
    }

    async fn get_upload(&self, id: Uuid) -> anyhow::Result<Option<Upload>> {
        self.host.get_upload(id).await
    }

    async fn set_thread_thumbnail(&self, thread_id: Uuid, upload_id: Uuid) -> anyhow::Result<()> {
        self.host.set_thread_thumbnail(thread_id, upload_id).await
    }
}
