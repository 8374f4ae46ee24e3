//! # CLI Layer
//!
//! One UI client for jotter. This is the only place that knows about
//! terminal I/O, exit codes and argument parsing; everything else goes
//! through [`JotterApi`] and comes back as a `CmdResult` to print.
//!
//! - `run()`: entry point called by `main.rs`
//! - `init_context()`: resolves the data dir, loads config, builds the API
//! - `handle_*()`: per-command handlers
//! - `print`: output formatting

mod args;
mod print;

use args::{Cli, Commands};
use clap::Parser;
use directories::ProjectDirs;
use jotter::api::{ConfigAction, ExportFormat, JotterApi, JotterPaths, ViewFormat};
use jotter::config::JotterConfig;
use jotter::error::{JotterError, Result};
use jotter::store::fs::FileStore;
use print::{print_config, print_messages, print_notes, print_rendered};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

const HOME_ENV: &str = "JOTTER_HOME";

pub fn run() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = dispatch(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}

struct AppContext {
    api: JotterApi<FileStore>,
}

fn dispatch(cli: Cli) -> Result<()> {
    let mut ctx = init_context(cli.data_dir)?;

    match cli.command {
        Some(Commands::Create { text }) => handle_create(&mut ctx, text),
        Some(Commands::List) | None => handle_list(&ctx),
        Some(Commands::View { notes, markdown }) => handle_view(&ctx, notes, markdown),
        Some(Commands::Edit { note, text }) => handle_edit(&mut ctx, note, text),
        Some(Commands::Rewrite {
            note,
            element,
            value,
        }) => handle_rewrite(&mut ctx, note, element, value),
        Some(Commands::Delete { notes }) => handle_delete(&mut ctx, notes),
        Some(Commands::Export {
            notes,
            markdown: _,
            html,
            archive,
            output,
        }) => {
            let format = if archive {
                ExportFormat::Archive
            } else if html {
                ExportFormat::Html
            } else {
                ExportFormat::Markdown
            };
            handle_export(&ctx, notes, format, &output)
        }
        Some(Commands::Import { paths }) => handle_import(&mut ctx, paths),
        Some(Commands::Share { note }) => handle_share(&ctx, note),
        Some(Commands::Open { fragment }) => handle_open(&mut ctx, fragment),
        Some(Commands::Config { key, value }) => handle_config(&mut ctx, key, value),
    }
}

fn data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "jotter", "jotter")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| JotterError::Store("Could not determine data dir".to_string()))
}

fn init_context(explicit_dir: Option<PathBuf>) -> Result<AppContext> {
    let dir = data_dir(explicit_dir)?;
    let config = match JotterConfig::load(&dir) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "unreadable config, using defaults");
            JotterConfig::default()
        }
    };
    tracing::debug!(data_dir = %dir.display(), "using data dir");

    let store = FileStore::new(dir.clone());
    let api = JotterApi::new(store, JotterPaths::new(dir), config);
    Ok(AppContext { api })
}

/// Text from the argument, else piped stdin.
fn text_or_stdin(text: Option<String>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    let mut buf = String::new();
    stdin.read_to_string(&mut buf).map_err(JotterError::Io)?;
    Ok(buf)
}

fn handle_create(ctx: &mut AppContext, text: Option<String>) -> Result<()> {
    let markdown = text_or_stdin(text)?;
    let result = ctx.api.create_note(&markdown)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_list(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.list_notes()?;
    print_notes(&result.listed_notes);
    print_messages(&result.messages);
    Ok(())
}

fn handle_view(ctx: &AppContext, notes: Vec<String>, markdown: bool) -> Result<()> {
    let format = if markdown {
        ViewFormat::Markdown
    } else {
        ViewFormat::Html
    };
    let result = ctx.api.view_notes(&notes, format)?;
    print_rendered(&result.listed_notes, &result.rendered);
    print_messages(&result.messages);
    Ok(())
}

fn handle_edit(ctx: &mut AppContext, note: String, text: Option<String>) -> Result<()> {
    let markdown = text_or_stdin(text)?;
    let result = ctx.api.update_note(&note, &markdown)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_rewrite(
    ctx: &mut AppContext,
    note: String,
    element: Option<usize>,
    value: Option<String>,
) -> Result<()> {
    let result = ctx.api.rewrite_element(&note, element, value.as_deref())?;
    if let Some(output) = &result.output {
        if !output.is_empty() {
            println!("{}", output);
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, notes: Vec<String>) -> Result<()> {
    let result = ctx.api.delete_notes(&notes)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(ctx: &AppContext, notes: Vec<String>, format: ExportFormat, out: &Path) -> Result<()> {
    let result = ctx.api.export_notes(&notes, format, out)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_import(ctx: &mut AppContext, paths: Vec<PathBuf>) -> Result<()> {
    let result = ctx.api.import_notes(paths)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_share(ctx: &AppContext, note: String) -> Result<()> {
    let result = ctx.api.share_note(&note)?;
    if let Some(fragment) = &result.output {
        println!("{}", fragment);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_open(ctx: &mut AppContext, fragment: String) -> Result<()> {
    let result = ctx.api.open_fragment(&fragment)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };
    let show_all = matches!(action, ConfigAction::ShowAll);
    let result = ctx.api.config(action)?;
    if show_all {
        if let Some(config) = &result.config {
            print_config(config);
        }
    }
    print_messages(&result.messages);
    Ok(())
}
