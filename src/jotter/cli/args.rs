use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jotter")]
#[command(version)]
#[command(about = "Local-first notes with markdown export and shareable links", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to $JOTTER_HOME or the platform data dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a note from markdown (reads stdin when no text is given)
    #[command(alias = "n")]
    Create {
        /// Markdown content
        #[arg(required = false)]
        text: Option<String>,
    },

    /// List notes, most recently edited first
    #[command(alias = "ls")]
    List,

    /// View one or more notes
    #[command(alias = "v")]
    View {
        /// Indexes of the notes, or words from a title
        #[arg(required = true, num_args = 1..)]
        notes: Vec<String>,

        /// Show as markdown instead of HTML
        #[arg(short, long)]
        markdown: bool,
    },

    /// Replace a note's content with markdown (reads stdin when no text is given)
    #[command(alias = "e")]
    Edit {
        /// Index of the note, or words from its title
        note: String,

        /// New markdown content
        #[arg(required = false)]
        text: Option<String>,
    },

    /// Edit one element through its markdown form, e.g. `rewrite 1 2 "## New Title"`
    Rewrite {
        /// Index of the note, or words from its title
        note: String,

        /// Element number (omit to list editable elements)
        element: Option<usize>,

        /// New markdown for the element
        value: Option<String>,
    },

    /// Delete one or more notes
    #[command(alias = "rm")]
    Delete {
        /// Indexes of the notes, or words from a title
        #[arg(required = true, num_args = 1..)]
        notes: Vec<String>,
    },

    /// Export notes (all notes when none are given)
    #[command(group(ArgGroup::new("format").args(["markdown", "html", "archive"])))]
    Export {
        /// Indexes of the notes, or words from a title
        notes: Vec<String>,

        /// One markdown file per note (default)
        #[arg(long)]
        markdown: bool,

        /// One standalone HTML page per note
        #[arg(long)]
        html: bool,

        /// A single .tar.gz of markdown files
        #[arg(long)]
        archive: bool,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Import markdown or text files, or directories of them
    Import {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
    },

    /// Print a URL fragment that carries the whole note
    Share {
        /// Index of the note, or words from its title
        note: String,
    },

    /// Create a note from a shared fragment or URL
    Open {
        fragment: String,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (theme, font, autosave-ms, overlay-tags,
        /// paragraph-editable, import-extensions)
        key: Option<String>,

        /// Value to set
        value: Option<String>,
    },
}
