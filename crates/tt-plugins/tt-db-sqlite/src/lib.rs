//! # tt-db-sqlite Implementation
//!
//! This module implements the data mapping between the forum's SQLite
//! relational model and the `tt-core` domain models.

use std::str::FromStr;
use anyhow::{bail, Context};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tt_core::models::{Category, JournalRole, Post, Thread, Upload};
use tt_core::traits::{ForumStore, SiteSettings};
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id   BLOB PRIMARY KEY,
    slug TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS category_custom_fields (
    category_id BLOB NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    value       TEXT,
    PRIMARY KEY (category_id, name)
);

CREATE TABLE IF NOT EXISTS uploads (
    id                BLOB PRIMARY KEY,
    original_filename TEXT NOT NULL,
    extension         TEXT,
    content_type      TEXT
);

CREATE TABLE IF NOT EXISTS threads (
    id              BLOB PRIMARY KEY,
    category_id     BLOB REFERENCES categories(id),
    author_id       BLOB NOT NULL,
    title           TEXT NOT NULL CHECK (length(trim(title)) > 0),
    image_upload_id BLOB REFERENCES uploads(id)
);

CREATE TABLE IF NOT EXISTS posts (
    id              BLOB PRIMARY KEY,
    thread_id       BLOB NOT NULL REFERENCES threads(id) ON DELETE CASCADE,
    author_id       BLOB NOT NULL,
    image_upload_id BLOB REFERENCES uploads(id),
    journal_role    TEXT,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS site_settings (
    name  TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

pub struct SqliteForumStore {
    pool: SqlitePool,
}

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> anyhow::Result<Uuid> {
    Uuid::from_slice(blob).context("malformed uuid column")
}

fn opt_uuid(row: &SqliteRow, column: &str) -> anyhow::Result<Option<Uuid>> {
    row.try_get::<Option<Vec<u8>>, _>(column)?
        .map(|b| blob_to_uuid(&b))
        .transpose()
}

/// Custom fields are stored as text. JSON literals keep their type,
/// anything else stays a plain string.
fn field_value(raw: Option<String>) -> serde_json::Value {
    match raw {
        None => serde_json::Value::Null,
        Some(s) => serde_json::from_str(&s).unwrap_or(serde_json::Value::String(s)),
    }
}

fn parse_setting(name: &str, raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Ok(true),
        "false" | "f" | "0" => Ok(false),
        other => bail!("site setting {name} is not a boolean: {other:?}"),
    }
}

impl SqliteForumStore {
    /// Connects and creates the schema if it is missing.
    ///
    /// `sqlite::memory:` databases live inside a single connection, so the
    /// pool is pinned to one connection that never expires.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("connecting to {url}"))?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await.context("creating schema")?;
        tracing::info!(url, "sqlite forum store ready");
        Ok(Self { pool })
    }

    pub async fn insert_category(&self, category: &Category) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO categories (id, slug) VALUES (?, ?)")
            .bind(uuid_to_blob(category.id))
            .bind(&category.slug)
            .execute(&mut *tx)
            .await?;

        for (name, value) in &category.custom_fields {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            sqlx::query("INSERT INTO category_custom_fields (category_id, name, value) VALUES (?, ?, ?)")
                .bind(uuid_to_blob(category.id))
                .bind(name)
                .bind(text)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Upserts a single category custom field.
    pub async fn set_category_field(&self, category_id: Uuid, name: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO category_custom_fields (category_id, name, value) VALUES (?, ?, ?)
             ON CONFLICT (category_id, name) DO UPDATE SET value = excluded.value",
        )
        .bind(uuid_to_blob(category_id))
        .bind(name)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_upload(&self, upload: &Upload) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO uploads (id, original_filename, extension, content_type) VALUES (?, ?, ?, ?)")
            .bind(uuid_to_blob(upload.id))
            .bind(&upload.original_filename)
            .bind(&upload.extension)
            .bind(&upload.content_type)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_thread(&self, thread: &Thread) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO threads (id, category_id, author_id, title, image_upload_id) VALUES (?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(thread.id))
            .bind(thread.category_id.map(uuid_to_blob))
            .bind(uuid_to_blob(thread.author_id))
            .bind(&thread.title)
            .bind(thread.image_upload_id.map(uuid_to_blob))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_post(&self, post: &Post) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO posts (id, thread_id, author_id, image_upload_id, journal_role, created_at) VALUES (?, ?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(post.id))
            .bind(uuid_to_blob(post.thread_id))
            .bind(uuid_to_blob(post.author_id))
            .bind(post.image_upload_id.map(uuid_to_blob))
            .bind(post.journal_role.map(|r| r.as_str()))
            .bind(post.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_setting(&self, name: &str, value: bool) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO site_settings (name, value) VALUES (?, ?)
             ON CONFLICT (name) DO UPDATE SET value = excluded.value",
        )
        .bind(name)
        .bind(if value { "t" } else { "f" })
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ForumStore for SqliteForumStore {
    async fn get_post(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else { return Ok(None) };

        let journal_role = match row.try_get::<Option<String>, _>("journal_role")? {
            Some(raw) => Some(
                JournalRole::parse(&raw).with_context(|| format!("post {id} has unknown journal role {raw:?}"))?,
            ),
            None => None,
        };

        Ok(Some(Post {
            id: blob_to_uuid(row.try_get::<Vec<u8>, _>("id")?.as_slice())?,
            thread_id: blob_to_uuid(row.try_get::<Vec<u8>, _>("thread_id")?.as_slice())?,
            author_id: blob_to_uuid(row.try_get::<Vec<u8>, _>("author_id")?.as_slice())?,
            image_upload_id: opt_uuid(&row, "image_upload_id")?,
            journal_role,
            created_at: row.try_get("created_at")?,
        }))
    }

    async fn get_thread(&self, id: Uuid) -> anyhow::Result<Option<Thread>> {
        let row = sqlx::query("SELECT * FROM threads WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Thread {
                id: blob_to_uuid(row.try_get::<Vec<u8>, _>("id")?.as_slice())?,
                category_id: opt_uuid(&row, "category_id")?,
                author_id: blob_to_uuid(row.try_get::<Vec<u8>, _>("author_id")?.as_slice())?,
                title: row.try_get("title")?,
                image_upload_id: opt_uuid(&row, "image_upload_id")?,
            })),
            None => Ok(None),
        }
    }

    /// Loads a category together with all of its custom fields.
    async fn get_category(&self, id: Uuid) -> anyhow::Result<Option<Category>> {
        let row = sqlx::query("SELECT id, slug FROM categories WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else { return Ok(None) };

        let custom_fields = sqlx::query("SELECT name, value FROM category_custom_fields WHERE category_id = ?")
            .bind(uuid_to_blob(id))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|f| -> anyhow::Result<(String, serde_json::Value)> {
                Ok((f.try_get("name")?, field_value(f.try_get("value")?)))
            })
            .collect::<anyhow::Result<serde_json::Map<_, _>>>()?;

        Ok(Some(Category {
            id: blob_to_uuid(row.try_get::<Vec<u8>, _>("id")?.as_slice())?,
            slug: row.try_get("slug")?,
            custom_fields,
        }))
    }

    async fn get_upload(&self, id: Uuid) -> anyhow::Result<Option<Upload>> {
        let row = sqlx::query("SELECT * FROM uploads WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Upload {
                id: blob_to_uuid(row.try_get::<Vec<u8>, _>("id")?.as_slice())?,
                original_filename: row.try_get("original_filename")?,
                extension: row.try_get("extension")?,
                content_type: row.try_get("content_type")?,
            })),
            None => Ok(None),
        }
    }

    /// Updates only the thumbnail column so concurrent host edits to the
    /// rest of the row survive.
    ///
    /// Fails when the row is gone or the upload is unknown (foreign key).
    async fn set_thread_thumbnail(&self, thread_id: Uuid, upload_id: Uuid) -> anyhow::Result<()> {
        let result = sqlx::query("UPDATE threads SET image_upload_id = ? WHERE id = ?")
            .bind(uuid_to_blob(upload_id))
            .bind(uuid_to_blob(thread_id))
            .execute(&self.pool)
            .await
            .with_context(|| format!("setting thumbnail of thread {thread_id}"))?;

        if result.rows_affected() == 0 {
            bail!("thread {thread_id} does not exist");
        }
        Ok(())
    }
}

#[async_trait]
impl SiteSettings for SqliteForumStore {
    async fn get_bool(&self, name: &str) -> anyhow::Result<Option<bool>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM site_settings WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        value.map(|raw| parse_setting(name, &raw)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tt_core::models::CATEGORY_OPT_IN_FIELD;

    async fn store() -> SqliteForumStore {
        SqliteForumStore::new("sqlite::memory:").await.expect("Failed to init SQLite")
    }

    fn upload(name: &str, ext: Option<&str>, ct: Option<&str>) -> Upload {
        Upload {
            id: Uuid::now_v7(),
            original_filename: name.into(),
            extension: ext.map(Into::into),
            content_type: ct.map(Into::into),
        }
    }

    #[tokio::test]
    async fn test_thread_round_trip_and_thumbnail() {
        let repo = store().await;
        let image = upload("lake.jpg", Some("jpg"), Some("image/jpeg"));
        repo.insert_upload(&image).await.unwrap();

        let thread = Thread {
            id: Uuid::now_v7(),
            category_id: None,
            author_id: Uuid::now_v7(),
            title: "Lake district".into(),
            image_upload_id: None,
        };
        repo.insert_thread(&thread).await.unwrap();
        assert_eq!(repo.get_thread(thread.id).await.unwrap(), Some(thread.clone()));

        repo.set_thread_thumbnail(thread.id, image.id).await.expect("Failed to set thumbnail");
        assert_eq!(repo.get_thread(thread.id).await.unwrap().unwrap().image_upload_id, Some(image.id));
    }

    #[tokio::test]
    async fn test_thumbnail_write_keeps_host_edits() {
        let repo = store().await;
        let image = upload("fells.png", Some("png"), Some("image/png"));
        repo.insert_upload(&image).await.unwrap();

        let thread = Thread {
            id: Uuid::now_v7(),
            category_id: None,
            author_id: Uuid::now_v7(),
            title: "Fells".into(),
            image_upload_id: None,
        };
        repo.insert_thread(&thread).await.unwrap();

        // the host renames the thread after the hook has read it
        sqlx::query("UPDATE threads SET title = 'Fells, week two' WHERE id = ?")
            .bind(uuid_to_blob(thread.id))
            .execute(&repo.pool)
            .await
            .unwrap();

        repo.set_thread_thumbnail(thread.id, image.id).await.unwrap();
        let stored = repo.get_thread(thread.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Fells, week two");
        assert_eq!(stored.image_upload_id, Some(image.id));
    }

    #[tokio::test]
    async fn test_thumbnail_rejects_unknown_upload_and_missing_row() {
        let repo = store().await;
        let image = upload("dunes.jpg", Some("jpg"), Some("image/jpeg"));
        repo.insert_upload(&image).await.unwrap();
        let thread = Thread {
            id: Uuid::now_v7(),
            category_id: None,
            author_id: Uuid::now_v7(),
            title: "Dunes".into(),
            image_upload_id: None,
        };

        assert!(repo.set_thread_thumbnail(thread.id, image.id).await.is_err(), "row does not exist yet");

        repo.insert_thread(&thread).await.unwrap();
        assert!(repo.set_thread_thumbnail(thread.id, Uuid::now_v7()).await.is_err(), "foreign key must be enforced");
        assert_eq!(repo.get_thread(thread.id).await.unwrap().unwrap().image_upload_id, None);
    }

    #[tokio::test]
    async fn test_category_custom_fields() {
        let repo = store().await;
        let mut category = Category { id: Uuid::now_v7(), slug: "hikes".into(), custom_fields: Default::default() };
        category.custom_fields.insert(CATEGORY_OPT_IN_FIELD.into(), true.into());
        repo.insert_category(&category).await.unwrap();

        let loaded = repo.get_category(category.id).await.unwrap().unwrap();
        assert!(loaded.thumbnail_opt_in());

        repo.set_category_field(category.id, CATEGORY_OPT_IN_FIELD, "f").await.unwrap();
        assert!(!repo.get_category(category.id).await.unwrap().unwrap().thumbnail_opt_in());

        repo.set_category_field(category.id, CATEGORY_OPT_IN_FIELD, "t").await.unwrap();
        assert!(repo.get_category(category.id).await.unwrap().unwrap().thumbnail_opt_in());
    }

    #[tokio::test]
    async fn test_post_and_upload_mapping() {
        let repo = store().await;
        let gif = upload("spin", None, Some("image/gif"));
        repo.insert_upload(&gif).await.unwrap();

        let thread = Thread { id: Uuid::now_v7(), category_id: None, author_id: Uuid::now_v7(), title: "Spin".into(), image_upload_id: None };
        repo.insert_thread(&thread).await.unwrap();

        let post = Post {
            id: Uuid::now_v7(),
            thread_id: thread.id,
            author_id: thread.author_id,
            image_upload_id: Some(gif.id),
            journal_role: Some(JournalRole::Entry),
            created_at: chrono::Utc::now(),
        };
        repo.insert_post(&post).await.unwrap();

        let loaded = repo.get_post(post.id).await.unwrap().unwrap();
        assert_eq!(loaded.image_upload_id, Some(gif.id));
        assert_eq!(loaded.journal_role, Some(JournalRole::Entry));

        let loaded_upload = repo.get_upload(gif.id).await.unwrap().unwrap();
        assert_eq!(loaded_upload.extension, None);
        assert!(loaded_upload.is_gif());
    }

    #[tokio::test]
    async fn test_site_settings() {
        let repo = store().await;
        assert_eq!(repo.get_bool("topic_thumbnail_recent_post_enabled").await.unwrap(), None);

        repo.set_setting("topic_thumbnail_recent_post_enabled", true).await.unwrap();
        assert_eq!(repo.get_bool("topic_thumbnail_recent_post_enabled").await.unwrap(), Some(true));

        repo.set_setting("topic_thumbnail_recent_post_enabled", false).await.unwrap();
        assert_eq!(repo.get_bool("topic_thumbnail_recent_post_enabled").await.unwrap(), Some(false));

        sqlx::query("INSERT INTO site_settings (name, value) VALUES ('odd', 'maybe')")
            .execute(&repo.pool)
            .await
            .unwrap();
        assert!(repo.get_bool("odd").await.is_err());
    }
}
