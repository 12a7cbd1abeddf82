use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "scribble")]
#[command(version, about = "A single-user note-taking service backed by a JSON file")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a YAML config file (defaults to ./scribble.yaml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JSON data file to read and write notes
    #[arg(long, global = true, value_name = "FILE")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server and web UI
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:3000
        #[arg(long)]
        bind: Option<String>,
    },

    /// List notes, highest priority and most recently updated first
    List {
        /// Which notes to show (all, drafts, favourites)
        #[arg(long, default_value = "all")]
        view: String,

        /// Only show notes whose title or content contains this text
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single note
    Get {
        /// Note ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a note
    Add {
        /// Note title
        title: String,

        /// Note content
        #[arg(long, short = 'c', conflicts_with = "stdin")]
        content: Option<String>,

        /// Read content from stdin
        #[arg(long)]
        stdin: bool,

        /// Priority (low, medium, high)
        #[arg(long, short = 'p', default_value = "medium")]
        priority: String,

        /// Mark the note as a draft
        #[arg(long)]
        draft: bool,

        /// Mark the note as a favourite
        #[arg(long)]
        favourite: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change fields of an existing note
    Update {
        /// Note ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New content
        #[arg(long, short = 'c', conflicts_with = "stdin")]
        content: Option<String>,

        /// Read new content from stdin
        #[arg(long)]
        stdin: bool,

        /// New priority (low, medium, high)
        #[arg(long, short = 'p')]
        priority: Option<String>,

        /// Set or clear the draft flag
        #[arg(long, value_name = "BOOL")]
        draft: Option<bool>,

        /// Set or clear the favourite flag
        #[arg(long, value_name = "BOOL")]
        favourite: Option<bool>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Toggle the favourite flag of a note
    Favourite {
        /// Note ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a note
    Delete {
        /// Note ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}
