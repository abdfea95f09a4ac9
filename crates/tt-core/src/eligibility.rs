//! # Eligibility
//!
//! The pure decision: given a post, whatever the host could resolve around
//! it, and a settings snapshot, should the thread's thumbnail change?
//!
//! Gates are evaluated in order and the first failing one wins. The
//! master switch, thread, author and image checks come first and hand
//! back what they resolved; the toggleable checks live in `GATES`.

use serde::Serialize;
use uuid::Uuid;
use crate::models::{Category, JournalRole, Post, Thread, Upload};
use crate::settings::ThumbnailSettings;

/// A post together with the entities it was resolved against.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub post: &'a Post,
    pub thread: Option<&'a Thread>,
    pub category: Option<&'a Category>,
    pub upload: Option<&'a Upload>,
}

/// Why a post did not qualify. Not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ineligible {
    Disabled,
    MissingThread,
    NotStarter,
    NoImage,
    MissingCategory,
    CategoryNotOptedIn,
    NotJournalEntry,
    MissingUpload,
    GifUpload,
}

impl Ineligible {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::MissingThread => "missing_thread",
            Self::NotStarter => "not_starter",
            Self::NoImage => "no_image",
            Self::MissingCategory => "missing_category",
            Self::CategoryNotOptedIn => "category_not_opted_in",
            Self::NotJournalEntry => "not_journal_entry",
            Self::MissingUpload => "missing_upload",
            Self::GifUpload => "gif_upload",
        }
    }
}

impl std::fmt::Display for Ineligible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a passing evaluation proved: the thread to update and the upload
/// it should point at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eligible<'a> {
    pub thread: &'a Thread,
    pub upload_id: Uuid,
}

type Gate = fn(&ThumbnailSettings, &Candidate<'_>) -> Result<(), Ineligible>;

/// Checks that run once the thread and the image are known.
const GATES: &[Gate] = &[category_opted_in, journal_entry, not_gif];

/// Returns the thread and upload to link, or the first failed gate.
pub fn evaluate<'a>(settings: &ThumbnailSettings, candidate: &Candidate<'a>) -> Result<Eligible<'a>, Ineligible> {
    if !settings.enabled {
        return Err(Ineligible::Disabled);
    }
    let thread = thread_present(candidate)?;
    posted_by_starter(candidate.post, thread)?;
    let upload_id = has_image(candidate.post)?;

    for gate in GATES {
        gate(settings, candidate)?;
    }
    Ok(Eligible { thread, upload_id })
}

fn thread_present<'a>(c: &Candidate<'a>) -> Result<&'a Thread, Ineligible> {
    match c.thread {
        Some(thread) if thread.id == c.post.thread_id => Ok(thread),
        _ => Err(Ineligible::MissingThread),
    }
}

fn posted_by_starter(post: &Post, thread: &Thread) -> Result<(), Ineligible> {
    if thread.author_id == post.author_id { Ok(()) } else { Err(Ineligible::NotStarter) }
}

fn has_image(post: &Post) -> Result<Uuid, Ineligible> {
    match post.image_upload_id {
        Some(id) if !id.is_nil() => Ok(id),
        _ => Err(Ineligible::NoImage),
    }
}

fn category_opted_in(settings: &ThumbnailSettings, c: &Candidate<'_>) -> Result<(), Ineligible> {
    if !settings.require_category_opt_in {
        return Ok(());
    }
    match c.category {
        None => Err(Ineligible::MissingCategory),
        Some(category) if category.thumbnail_opt_in() => Ok(()),
        Some(_) => Err(Ineligible::CategoryNotOptedIn),
    }
}

fn journal_entry(settings: &ThumbnailSettings, c: &Candidate<'_>) -> Result<(), Ineligible> {
    if !settings.require_journal_entry || c.post.journal_role == Some(JournalRole::Entry) {
        Ok(())
    } else {
        Err(Ineligible::NotJournalEntry)
    }
}

fn not_gif(settings: &ThumbnailSettings, c: &Candidate<'_>) -> Result<(), Ineligible> {
    // The upload must resolve either way; the metadata check is the toggle.
    let upload = c.upload.ok_or(Ineligible::MissingUpload)?;
    if settings.exclude_gifs && upload.is_gif() {
        Err(Ineligible::GifUpload)
    } else {
        Ok(())
    }
}
