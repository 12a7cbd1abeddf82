// src/entity/note.rs
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{iso_millis, Priority};

/// A user-authored note as stored in the data file.
///
/// Every field except the id and timestamps falls back to its default when
/// absent, since older data files hold whatever the client happened to post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub is_favourite: bool,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request. Server-owned fields (`id`, `createdAt`,
/// `updatedAt`) are not part of it and are dropped if a client sends them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub priority: Priority,
    pub is_draft: bool,
    pub is_favourite: bool,
}

impl NewNote {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update: only the fields that are `Some` are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub priority: Option<Priority>,
    pub is_draft: Option<bool>,
    pub is_favourite: Option<bool>,
}

impl NoteUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.priority.is_none()
            && self.is_draft.is_none()
            && self.is_favourite.is_none()
    }
}

impl Note {
    pub fn create(id: String, new: NewNote, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            content: new.content,
            priority: new.priority,
            is_draft: new.is_draft,
            is_favourite: new.is_favourite,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge `update` into this note and restamp `updated_at`.
    ///
    /// `updated_at` always moves forward, even when two updates land within
    /// the same millisecond.
    pub fn apply(&mut self, update: NoteUpdate, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(is_draft) = update.is_draft {
            self.is_draft = is_draft;
        }
        if let Some(is_favourite) = update.is_favourite {
            self.is_favourite = is_favourite;
        }

        let floor = self.updated_at + Duration::milliseconds(1);
        self.updated_at = now.max(floor);
    }

    /// Case-insensitive substring match on title or content.
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.content.to_lowercase().contains(needle_lower)
    }
}
