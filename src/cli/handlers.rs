use std::io::{self, Read};

use crate::api;
use crate::config::Config;
use crate::entity::{NewNote, Note, NoteUpdate, Priority};
use crate::error::{Result, ScribbleError};
use crate::storage::JsonStore;
use crate::view::{NoteQuery, View, ViewCounts};

fn open_store(config: &Config) -> JsonStore {
    JsonStore::open(&config.data_file)
}

fn read_stdin() -> Result<Option<String>> {
    let mut content = String::new();
    io::stdin().read_to_string(&mut content)?;
    Ok(if content.is_empty() { None } else { Some(content) })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Short flag summary like " (draft, favourite)"
fn flags(note: &Note) -> String {
    let mut parts = Vec::new();
    if note.is_draft {
        parts.push("draft");
    }
    if note.is_favourite {
        parts.push("favourite");
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

pub fn handle_serve(config: &Config) -> Result<()> {
    let store = open_store(config);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(api::serve(store, &config.bind))
}

pub fn handle_list(config: &Config, view: String, search: Option<String>, json: bool) -> Result<()> {
    let store = open_store(config);
    let view: View = view.parse()?;

    let all = store.list();
    let counts = ViewCounts::from_notes(&all);
    let query = NoteQuery { view, search };
    let notes = crate::view::apply(all, &query);

    if json {
        return print_json(&notes);
    }

    println!(
        "All Notes ({}) | Drafts ({}) | Favourites ({})\n",
        counts.all, counts.drafts, counts.favourites
    );
    if notes.is_empty() {
        println!("{}.", query.empty_message());
        return Ok(());
    }
    for n in notes {
        println!(
            "  {} [{:<6}] {}{}",
            n.id,
            n.priority.to_string(),
            n.title,
            flags(&n)
        );
        println!("      updated {}", n.updated_at.format("%Y-%m-%d %H:%M"));
    }

    Ok(())
}

pub fn handle_get(config: &Config, id: String, json: bool) -> Result<()> {
    let store = open_store(config);
    let note = store.get(&id).ok_or(ScribbleError::NoteNotFound(id))?;

    if json {
        return print_json(&note);
    }

    println!("Note {}", note.id);
    println!("Title: {}", note.title);
    println!("Priority: {}", note.priority);
    println!("Draft: {}", if note.is_draft { "yes" } else { "no" });
    println!("Favourite: {}", if note.is_favourite { "yes" } else { "no" });
    println!("Created: {}", note.created_at.format("%Y-%m-%d %H:%M"));
    println!("Updated: {}", note.updated_at.format("%Y-%m-%d %H:%M"));
    if !note.content.is_empty() {
        println!("\n{}", note.content);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_add(
    config: &Config,
    title: String,
    content: Option<String>,
    stdin: bool,
    priority: String,
    draft: bool,
    favourite: bool,
    json: bool,
) -> Result<()> {
    let store = open_store(config);

    let mut new = NewNote::new(title);
    new.priority = priority.parse()?;
    new.is_draft = draft;
    new.is_favourite = favourite;
    let content = if stdin { read_stdin()? } else { content };
    new.content = content.unwrap_or_default();

    let note = store.create(new)?;

    if json {
        print_json(&note)?;
    } else {
        println!("Created note {} - {}", note.id, note.title);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_update(
    config: &Config,
    id: String,
    title: Option<String>,
    content: Option<String>,
    stdin: bool,
    priority: Option<String>,
    draft: Option<bool>,
    favourite: Option<bool>,
    json: bool,
) -> Result<()> {
    let store = open_store(config);

    let updates = NoteUpdate {
        title,
        content: if stdin { read_stdin()? } else { content },
        priority: priority.map(|p| p.parse::<Priority>()).transpose()?,
        is_draft: draft,
        is_favourite: favourite,
    };
    if updates.is_empty() {
        tracing::warn!(%id, "no fields given, only the update time changes");
    }

    let updated = store.update(&id, updates)?;

    if json {
        print_json(&updated)?;
    } else {
        println!("Updated note {} - {}", updated.id, updated.title);
    }

    Ok(())
}

pub fn handle_favourite(config: &Config, id: String, json: bool) -> Result<()> {
    let store = open_store(config);
    let note = store.toggle_favourite(&id)?;

    if json {
        print_json(&note)?;
    } else if note.is_favourite {
        println!("Added note {} to favourites - {}", note.id, note.title);
    } else {
        println!("Removed note {} from favourites - {}", note.id, note.title);
    }

    Ok(())
}

pub fn handle_delete(config: &Config, id: String, force: bool) -> Result<()> {
    let store = open_store(config);
    let note = store
        .get(&id)
        .ok_or_else(|| ScribbleError::NoteNotFound(id.clone()))?;

    // Confirm deletion unless --force is used
    if !force {
        eprintln!("Delete note {} - {}? [y/N] ", note.id, note.title);

        if atty::is(atty::Stream::Stdin) {
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        } else {
            return Err(ScribbleError::ConfirmationRequired);
        }
    }

    let removed = store.delete(&id)?;
    println!("Deleted note {} - {}", removed.id, removed.title);

    Ok(())
}
