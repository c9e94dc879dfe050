//! # CLI Layer
//!
//! This module is **one possible UI client** for shelf, not the application
//! itself. It is the only place that parses arguments, writes to the terminal
//! and installs the tracing subscriber. Exit codes are decided by `main.rs`
//! from the error kind returned here.
//!
//! ## Structure
//!
//! - `run()`: parse, set up diagnostics and context, dispatch
//! - `init_context()`: resolves the shelf root and builds the `ShelfApi`
//! - `handle_*()`: per-command handlers that call the API and print the result

use super::print::{print_item, print_item_list, print_messages, render_csv, render_json};
use super::setup::{Cli, Commands, ConfigKey, OutputFormat};
use clap::parser::ValueSource;
use clap::{CommandFactory, FromArgMatches};
use directories::ProjectDirs;
use shelf::api::{ConfigAction, ShelfApi};
use shelf::config::{RootSource, ShelfPaths};
use shelf::error::Result;
use shelf::store::ShelfStore;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

struct AppContext {
    api: ShelfApi,
}

pub fn run() -> Result<()> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    init_tracing(cli.verbose);
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let shelf_source = match matches.value_source("shelf") {
        Some(ValueSource::EnvVariable) => RootSource::Env,
        _ => RootSource::Flag,
    };
    let mut ctx = init_context(&cli, shelf_source)?;

    match cli.command {
        Commands::Add {
            path,
            id,
            title,
            memo,
        } => handle_add(&mut ctx, &path, &id, &title, memo.as_deref()),
        Commands::Show { id } => handle_show(&ctx, &id),
        Commands::Info { id } => handle_info(&ctx, &id),
        Commands::Edit { id, title, memo } => handle_edit(&mut ctx, &id, title, memo),
        Commands::Delete { id } => handle_delete(&mut ctx, &id),
        Commands::List { output } => handle_list(&ctx, output),
        Commands::Path { id } => handle_path(&ctx, &id),
        Commands::Doctor => handle_doctor(&mut ctx),
        Commands::Config { key, value, unset } => handle_config(&ctx, key, value, unset),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("shelf=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn init_context(cli: &Cli, shelf_source: RootSource) -> Result<AppContext> {
    let explicit = cli.shelf.clone().map(|root| (root, shelf_source));
    let config_dir = cli.config_dir.clone().or_else(|| {
        ProjectDirs::from("com", "shelf", "shelf").map(|dirs| dirs.config_dir().to_path_buf())
    });

    let paths = ShelfPaths::resolve(explicit, config_dir)?;
    debug!(
        root = %paths.root.display(),
        source = %paths.root_source,
        "resolved shelf root"
    );

    let store = ShelfStore::new(paths.root.clone());
    Ok(AppContext {
        api: ShelfApi::new(store, paths),
    })
}

fn handle_add(
    ctx: &mut AppContext,
    path: &Path,
    id: &str,
    title: &str,
    memo: Option<&str>,
) -> Result<()> {
    let result = ctx.api.add_item(id, path, title, memo)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_show(ctx: &AppContext, id: &str) -> Result<()> {
    let result = ctx.api.show_item(id)?;
    if let (Some(item), Some(text)) = (result.listed_items.first(), &result.text) {
        print_item(item, text);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_info(ctx: &AppContext, id: &str) -> Result<()> {
    let result = ctx.api.item_info(id)?;
    if let Some(item) = result.listed_items.first() {
        println!("{}", render_json(item)?);
    }
    Ok(())
}

fn handle_edit(
    ctx: &mut AppContext,
    id: &str,
    title: Option<String>,
    memo: Option<String>,
) -> Result<()> {
    let result = ctx.api.edit_item(id, title, memo)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, id: &str) -> Result<()> {
    let result = ctx.api.delete_item(id)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_list(ctx: &AppContext, output: OutputFormat) -> Result<()> {
    let result = ctx.api.list_items()?;
    match output {
        OutputFormat::Text => print_item_list(&result.listed_items),
        OutputFormat::Json => println!("{}", render_json(&result.listed_items)?),
        OutputFormat::Csv => print!("{}", render_csv(&result.listed_items)),
    }
    Ok(())
}

fn handle_path(ctx: &AppContext, id: &str) -> Result<()> {
    let result = ctx.api.item_path(id)?;
    for path in &result.paths {
        println!("{}", path.display());
    }
    Ok(())
}

fn handle_doctor(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.doctor()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(
    ctx: &AppContext,
    key: Option<ConfigKey>,
    value: Option<PathBuf>,
    unset: bool,
) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::Show,
        (Some(ConfigKey::ShelfRoot), _) if unset => ConfigAction::UnsetShelfRoot,
        (Some(ConfigKey::ShelfRoot), None) => ConfigAction::Show,
        (Some(ConfigKey::ShelfRoot), Some(value)) => {
            // Relative values are resolved against the current directory.
            let root = if value.is_absolute() {
                value
            } else {
                std::env::current_dir()?.join(value)
            };
            ConfigAction::SetShelfRoot(root)
        }
    };

    let result = ctx.api.config(action)?;
    print_messages(&result.messages);
    Ok(())
}
