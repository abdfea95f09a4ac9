//! # Domain Models
//!
//! The host forum's entities as this extension sees them.
//! Every relationship the host may leave dangling is an `Option`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Custom field on a category that opts it into thumbnail assignment.
pub const CATEGORY_OPT_IN_FIELD: &str = "enable_thumbnail_recent_post";

/// A classification bucket for threads (e.g., "Travel Journals").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub slug: String,
    /// Loosely typed key/value bucket owned by the host
    #[serde(default)]
    pub custom_fields: serde_json::Map<String, serde_json::Value>,
}

impl Category {
    /// Reads a custom field as a boolean flag.
    ///
    /// Host custom fields are stored loosely, so `true`, `"true"`, `"t"`,
    /// `"1"` and `1` all count as set. Anything else, including a missing
    /// field, is unset.
    pub fn custom_flag(&self, name: &str) -> bool {
        match self.custom_fields.get(name) {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => {
                matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "t" | "1")
            }
            Some(serde_json::Value::Number(n)) => n.as_i64() == Some(1),
            _ => false,
        }
    }

    pub fn thumbnail_opt_in(&self) -> bool {
        self.custom_flag(CATEGORY_OPT_IN_FIELD)
    }
}

/// A discussion thread (the host calls these "topics").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    /// The starter: the user who opened the thread
    pub author_id: Uuid,
    pub title: String,
    /// Upload shown as the thread's preview in summary views
    pub image_upload_id: Option<Uuid>,
}

/// Role of a post inside a journal-style thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalRole {
    Entry,
    Comment,
}

impl JournalRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Comment => "comment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "entry" => Some(Self::Entry),
            "comment" => Some(Self::Comment),
            _ => None,
        }
    }
}

/// A single contribution to a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub author_id: Uuid,
    /// First image found in the rendered post, if any
    pub image_upload_id: Option<Uuid>,
    /// Present only when the thread is a journal
    #[serde(default)]
    pub journal_role: Option<JournalRole>,
    pub created_at: DateTime<Utc>,
}

/// A stored file record. Only metadata is relevant here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upload {
    pub id: Uuid,
    pub original_filename: String,
    pub extension: Option<String>,
    pub content_type: Option<String>,
}

impl Upload {
    /// True when any metadata signal says this is a GIF.
    ///
    /// The filename suffix only counts when the extension is missing or
    /// blank.
    pub fn is_gif(&self) -> bool {
        let by_type = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.trim().eq_ignore_ascii_case("image/gif"));

        let extension = self
            .extension
            .as_deref()
            .map(|ext| ext.trim().trim_start_matches('.'))
            .filter(|ext| !ext.is_empty());

        let by_name = match extension {
            Some(ext) => ext.eq_ignore_ascii_case("gif"),
            None => self.original_filename.to_ascii_lowercase().ends_with(".gif"),
        };

        by_type || by_name
    }
}

/// Emitted by the host once a post has been rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostProcessed {
    pub post: Post,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn upload(name: &str, ext: Option<&str>, ct: Option<&str>) -> Upload {
        Upload {
            id: Uuid::now_v7(),
            original_filename: name.into(),
            extension: ext.map(Into::into),
            content_type: ct.map(Into::into),
        }
    }

    #[test]
    fn gif_detected_by_content_type_alone() {
        assert!(upload("cat", None, Some("IMAGE/GIF")).is_gif());
    }

    #[test]
    fn gif_detected_by_extension_despite_wrong_type() {
        assert!(upload("cat.jpg", Some("GIF"), Some("image/jpeg")).is_gif());
    }

    #[test]
    fn filename_only_consulted_without_extension() {
        assert!(upload("Dancing.GIF", None, None).is_gif());
        assert!(!upload("dancing.gif", Some("png"), Some("image/png")).is_gif());
    }

    #[test]
    fn blank_extension_falls_back_to_filename() {
        for ext in ["", "   ", "."] {
            assert!(upload("loop.gif", Some(ext), None).is_gif(), "extension {ext:?}");
        }
        assert!(!upload("loop.png", Some(" "), None).is_gif());
    }

    #[test]
    fn jpeg_is_not_gif() {
        assert!(!upload("photo.jpg", Some("jpg"), Some("image/jpeg")).is_gif());
    }

    #[test]
    fn custom_flag_truthiness() {
        let mut category = Category { id: Uuid::now_v7(), slug: "journals".into(), custom_fields: Default::default() };
        assert!(!category.thumbnail_opt_in());

        for (value, expected) in [
            (json!(true), true),
            (json!("t"), true),
            (json!("TRUE"), true),
            (json!(1), true),
            (json!(false), false),
            (json!("f"), false),
            (json!(0), false),
            (json!(null), false),
        ] {
            category.custom_fields.insert(CATEGORY_OPT_IN_FIELD.into(), value.clone());
            assert_eq!(category.thumbnail_opt_in(), expected, "value {value}");
        }
    }

    #[test]
    fn journal_role_round_trips_through_str() {
        for role in [JournalRole::Entry, JournalRole::Comment] {
            assert_eq!(JournalRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(JournalRole::parse("draft"), None);
    }
}
