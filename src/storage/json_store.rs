use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::{self, NewNote, Note, NoteUpdate};
use crate::error::{Result, ScribbleError};

/// One entry of the `notes` array.
///
/// Entries that do not decode as a [`Note`] are kept verbatim so that a
/// rewrite of the file does not drop them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StoredNote {
    Note(Note),
    Raw(Value),
}

impl StoredNote {
    pub fn as_note(&self) -> Option<&Note> {
        match self {
            StoredNote::Note(note) => Some(note),
            StoredNote::Raw(_) => None,
        }
    }

    fn as_note_mut(&mut self) -> Option<&mut Note> {
        match self {
            StoredNote::Note(note) => Some(note),
            StoredNote::Raw(_) => None,
        }
    }

    /// Numeric id, also read from raw entries so new ids never reuse theirs.
    fn numeric_id(&self) -> Option<i64> {
        match self {
            StoredNote::Note(note) => note.id.parse().ok(),
            StoredNote::Raw(value) => match value.get("id")? {
                Value::String(id) => id.parse().ok(),
                Value::Number(id) => id.as_i64(),
                _ => None,
            },
        }
    }
}

/// The whole on-disk document: `{ "notes": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NoteDb {
    pub notes: Vec<StoredNote>,
}

impl NoteDb {
    /// Decoded notes in stored order, skipping raw entries.
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter_map(StoredNote::as_note)
    }

    pub fn push(&mut self, note: Note) {
        self.notes.push(StoredNote::Note(note));
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Note> {
        self.notes
            .iter_mut()
            .filter_map(StoredNote::as_note_mut)
            .find(|n| n.id == id)
    }
}

/// Document shape as read, before each note is decoded.
#[derive(Deserialize)]
struct RawDb {
    #[serde(default)]
    notes: Vec<Value>,
}

/// Flat-file note store.
///
/// Every operation reads the whole file, mutates it in memory and writes the
/// whole document back. Callers that share a store across tasks are
/// responsible for serializing access.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Bind a store to `path`. The file is not touched until the first read.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing data file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the data file.
    ///
    /// A missing, unreadable or unparseable file reads as an empty store.
    /// Notes that parse as JSON but not as a [`Note`] are logged and kept raw.
    pub fn load(&self) -> NoteDb {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "data file missing, starting empty");
                return NoteDb::default();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read data file");
                return NoteDb::default();
            }
        };

        let doc: RawDb = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "data file is not valid, treating as empty");
                return NoteDb::default();
            }
        };

        let notes = doc
            .notes
            .into_iter()
            .enumerate()
            .map(|(index, value)| match Note::deserialize(&value) {
                Ok(note) => StoredNote::Note(note),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), index, error = %e, "skipping unreadable note");
                    StoredNote::Raw(value)
                }
            })
            .collect();
        NoteDb { notes }
    }

    /// Overwrite the data file with `db`.
    pub fn save(&self, db: &NoteDb) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(db)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// All notes in stored order
    pub fn list(&self) -> Vec<Note> {
        self.load().notes().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<Note> {
        self.load().notes().find(|n| n.id == id).cloned()
    }

    pub fn create(&self, new: NewNote) -> Result<Note> {
        let mut db = self.load();
        let now = entity::now();

        let note = Note::create(next_id(&db, now), new, now);
        db.push(note.clone());
        self.save(&db)?;

        tracing::debug!(id = %note.id, "created note");
        Ok(note)
    }

    pub fn update(&self, id: &str, update: NoteUpdate) -> Result<Note> {
        let mut db = self.load();
        let note = db
            .find_mut(id)
            .ok_or_else(|| ScribbleError::NoteNotFound(id.to_string()))?;
        note.apply(update, entity::now());
        let note = note.clone();

        self.save(&db)?;

        tracing::debug!(id, "updated note");
        Ok(note)
    }

    /// Remove a note, returning what was removed.
    pub fn delete(&self, id: &str) -> Result<Note> {
        let mut db = self.load();
        let removed = db
            .notes()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(|| ScribbleError::NoteNotFound(id.to_string()))?;

        db.notes
            .retain(|stored| !matches!(stored.as_note(), Some(n) if n.id == id));
        self.save(&db)?;

        tracing::debug!(id, "deleted note");
        Ok(removed)
    }

    pub fn toggle_favourite(&self, id: &str) -> Result<Note> {
        let current = self
            .get(id)
            .ok_or_else(|| ScribbleError::NoteNotFound(id.to_string()))?;

        self.update(
            id,
            NoteUpdate {
                is_favourite: Some(!current.is_favourite),
                ..Default::default()
            },
        )
    }
}

/// Ids are the creation time in epoch milliseconds. On a clash the id moves
/// past the largest numeric id already present, or to the first free id
/// after the current time when that would overflow.
fn next_id(db: &NoteDb, now: DateTime<Utc>) -> String {
    let candidate = now.timestamp_millis();
    let taken: HashSet<i64> = db.notes.iter().filter_map(StoredNote::numeric_id).collect();
    if !taken.contains(&candidate) {
        return candidate.to_string();
    }

    let max = taken.iter().copied().max().unwrap_or(candidate);
    max.max(candidate)
        .checked_add(1)
        .or_else(|| (candidate..=i64::MAX).find(|id| !taken.contains(id)))
        .or_else(|| (i64::MIN..candidate).rev().find(|id| !taken.contains(id)))
        .unwrap_or(candidate)
        .to_string()
}
