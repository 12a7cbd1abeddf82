//! Filter/sort pipeline behind the note list.
//!
//! A list is produced in three steps:
//! - select by [`View`] (all, drafts or favourites)
//! - keep notes whose title or content contains the search term, ignoring case
//! - stable sort by priority (high first), then by `updatedAt` (newest first)

use serde::Serialize;

use crate::entity::Note;
use crate::error::ScribbleError;

/// Which tab of the note list is being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    All,
    Drafts,
    Favourites,
}

impl View {
    /// Check whether a note belongs in this view.
    pub fn includes(&self, note: &Note) -> bool {
        match self {
            View::All => true,
            View::Drafts => note.is_draft,
            View::Favourites => note.is_favourite,
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::All => write!(f, "all"),
            View::Drafts => write!(f, "drafts"),
            View::Favourites => write!(f, "favourites"),
        }
    }
}

impl std::str::FromStr for View {
    type Err = ScribbleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(View::All),
            "draft" | "drafts" => Ok(View::Drafts),
            "favourite" | "favourites" | "favorite" | "favorites" => Ok(View::Favourites),
            _ => Err(ScribbleError::InvalidView(s.to_string())),
        }
    }
}

/// A view plus an optional search term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteQuery {
    pub view: View,
    pub search: Option<String>,
}

impl NoteQuery {
    pub fn new(view: View) -> Self {
        Self { view, search: None }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// The search term, if it is non-empty.
    fn needle(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    /// Message shown when the query yields nothing.
    pub fn empty_message(&self) -> String {
        if self.needle().is_some() {
            return "No notes found".to_string();
        }
        match self.view {
            View::All => "No notes yet".to_string(),
            other => format!("No {} yet", other),
        }
    }
}

/// Run the pipeline over `notes`.
pub fn apply(notes: Vec<Note>, query: &NoteQuery) -> Vec<Note> {
    let needle = query.needle().map(str::to_lowercase);

    let mut selected: Vec<Note> = notes
        .into_iter()
        .filter(|n| query.view.includes(n))
        .filter(|n| needle.as_deref().map_or(true, |needle| n.matches(needle)))
        .collect();

    // sort_by is stable
    selected.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
    selected
}

/// Per-tab counts over the unfiltered collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViewCounts {
    pub all: usize,
    pub drafts: usize,
    pub favourites: usize,
}

impl ViewCounts {
    pub fn from_notes(notes: &[Note]) -> Self {
        Self {
            all: notes.len(),
            drafts: notes.iter().filter(|n| n.is_draft).count(),
            favourites: notes.iter().filter(|n| n.is_favourite).count(),
        }
    }
}
