//! Quote Generator - show, collect and sync quotes from the command line.
//!
//! Quotes are kept in a local `SQLite` store, can be filtered by category,
//! imported from and exported to JSON, and merged with a remote JSON
//! endpoint (remote side authoritative).
//!
//! QUICK START:
//!   quotes show                        # Random quote from the selected category
//!   quotes add "Stay curious." Life    # Add a quote
//!   quotes filter Life                 # Select a category
//!   quotes sync                        # Merge with the remote endpoint once
//!   quotes shell                       # Interactive session with background sync

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use rand::Rng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{pick_random, Presenter, QuoteStore, SyncAgent, TickOutcome};
use cli::shell::{ShellCommand, HELP};
use cli::{Cli, Commands};
use domain::{AppConfig, AppError, CategoryFilter, ImportReport, RemoteConfig};
use infrastructure::{
    ensure_config_exists, load_config, render_config, HttpRemote, LocalStorage, RemoteSource,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
async fn run(cli: Cli) -> anyhow::Result<()> {
    let format = cli
        .output_format()
        .map_err(|message| AppError::Config { message })?;

    let data_dir = cli.data_dir.as_deref();
    let config = load_config(data_dir).context("Failed to load configuration")?;
    let mut presenter = Presenter::new(std::io::stdout(), format);

    match cli.command {
        Commands::Config { init } => cmd_config(&config, data_dir, init, &mut presenter)?,
        Commands::Show { category } => {
            let store = open_store(&config)?;
            cmd_show(&store, category.as_deref(), &mut presenter)?;
        }
        Commands::Add {
            text,
            category,
            push,
        } => {
            let mut store = open_store(&config)?;
            let quote = store.add(&text, &category)?;
            presenter.render_one(Some(&quote))?;
            presenter.notify("Quote added")?;
            if let Some(remote) = push_remote(push, &config.remote)? {
                SyncAgent::new(remote, Arc::new(Mutex::new(store)))
                    .push_quote(&quote)
                    .await;
            }
        }
        Commands::List { category } => {
            let store = open_store(&config)?;
            let filter = match category {
                Some(c) => c.parse()?,
                None => store.selected().clone(),
            };
            presenter.render_many(&store.filter(&filter))?;
        }
        Commands::Categories => {
            let store = open_store(&config)?;
            presenter.render_categories(&store.categories(), store.selected())?;
        }
        Commands::Filter { category } => {
            let mut store = open_store(&config)?;
            store.select_category(category.parse()?)?;
            presenter.render_many(&store.filter(store.selected()))?;
        }
        Commands::Export { output } => {
            let store = open_store(&config)?;
            let json = store.export_json()?;
            match output {
                Some(path) => {
                    write_export(&path, &json)?;
                    presenter.notify(&format!(
                        "Exported {} quotes to {}",
                        store.len(),
                        path.display()
                    ))?;
                }
                None => presenter.print(&json)?,
            }
        }
        Commands::Import { file } => {
            let mut store = open_store(&config)?;
            let report = import_file(&mut store, &file)?;
            report_import(&mut presenter, report)?;
        }
        Commands::Sync => {
            let agent = build_agent(&config)?;
            agent.tick(&mut presenter).await?;
        }
        Commands::Daemon { interval } => {
            if interval.is_none() && !config.sync.enabled {
                return Err(AppError::Config {
                    message: "Periodic sync is disabled; enable [sync] or pass --interval".into(),
                }
                .into());
            }
            let interval = interval.map_or_else(
                || config.sync.interval(),
                |secs| std::time::Duration::from_secs(secs.max(1)),
            );
            let agent = build_agent(&config)?;
            agent
                .run(interval, &mut presenter, shutdown_signal())
                .await?;
        }
        Commands::Shell => {
            let agent = build_agent(&config)?;
            cmd_shell(&agent, &mut presenter, &config).await?;
        }
        Commands::Status => {
            let store = open_store(&config)?;
            let state = store.storage().get_sync_state()?;
            presenter.render_status(&store, &state)?;
        }
    }

    Ok(())
}

/// Open the quote store described by `config`.
fn open_store(config: &AppConfig) -> anyhow::Result<QuoteStore> {
    let path = config.storage_db_path();
    let storage = LocalStorage::open(&path)
        .with_context(|| format!("Failed to open quote storage at {}", path.display()))?;
    let session = LocalStorage::open_in_memory()?;
    Ok(QuoteStore::load(storage, session))
}

/// The remote to push a new quote to, if pushing was requested.
fn push_remote(push: bool, config: &RemoteConfig) -> domain::Result<Option<HttpRemote>> {
    if push || config.push_on_add {
        HttpRemote::new(config).map(Some)
    } else {
        Ok(None)
    }
}

/// Build a sync agent over the configured store and endpoint.
fn build_agent(config: &AppConfig) -> anyhow::Result<SyncAgent<HttpRemote>> {
    let store = open_store(config)?;
    let remote = HttpRemote::new(&config.remote)?;
    tracing::debug!(endpoint = remote.endpoint(), "Using remote endpoint");
    Ok(SyncAgent::new(remote, Arc::new(Mutex::new(store))))
}

/// Show a random quote, optionally from an explicit category.
fn cmd_show<W: Write>(
    store: &QuoteStore,
    category: Option<&str>,
    presenter: &mut Presenter<W>,
) -> domain::Result<()> {
    let mut rng = rand::thread_rng();

    match category {
        Some(category) => {
            let pool = store.filter(&category.parse::<CategoryFilter>()?);
            let quote = pick_random(pool.len(), &mut rng).and_then(|i| pool.get(i));
            presenter.render_one(quote)?;
        }
        None => {
            presenter.show_random(store, &mut rng)?;
        }
    }

    Ok(())
}

/// Show or initialize the configuration.
fn cmd_config<W: Write>(
    config: &AppConfig,
    data_dir: Option<&Path>,
    init: bool,
    presenter: &mut Presenter<W>,
) -> domain::Result<()> {
    if init {
        let path = ensure_config_exists(data_dir)?;
        presenter.notify(&format!("Config file: {}", path.display()))?;
    }

    presenter.print(&render_config(config)?)
}

/// Interactive session: user commands and periodic sync on one task.
async fn cmd_shell<R: RemoteSource, W: Write>(
    agent: &SyncAgent<R>,
    presenter: &mut Presenter<W>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let mut rng = rand::thread_rng();

    presenter.print("Quote Generator session. Type 'help' for commands.")?;
    {
        let store = agent.store().lock().await;
        presenter.show_random(&store, &mut rng)?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(config.sync.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick fires immediately; the first sync waits a full interval.
    ticker.tick().await;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match line.parse::<ShellCommand>() {
                    Ok(ShellCommand::Quit) => break,
                    Ok(command) => {
                        let push = config.remote.push_on_add;
                        if let Err(e) = execute(agent, presenter, &mut rng, push, command).await {
                            presenter.warn(&e.to_string())?;
                        }
                    }
                    Err(message) => presenter.warn(&message)?,
                }
            }
            _ = ticker.tick(), if config.sync.enabled => {
                agent.tick(presenter).await?;
            }
        }
    }

    Ok(())
}

/// Run a single session command.
async fn execute<R: RemoteSource, W: Write, G: Rng>(
    agent: &SyncAgent<R>,
    presenter: &mut Presenter<W>,
    rng: &mut G,
    push_on_add: bool,
    command: ShellCommand,
) -> domain::Result<()> {
    match command {
        ShellCommand::Show => {
            let store = agent.store().lock().await;
            presenter.show_random(&store, rng)?;
        }
        ShellCommand::Last => {
            let store = agent.store().lock().await;
            presenter.show_last(&store, rng)?;
        }
        ShellCommand::Add { category, text } => {
            let quote = agent.store().lock().await.add(&text, &category)?;
            presenter.render_one(Some(&quote))?;
            presenter.notify("Quote added")?;
            if push_on_add {
                agent.push_quote(&quote).await;
            }
        }
        ShellCommand::List => {
            let store = agent.store().lock().await;
            presenter.render_many(&store.filter(store.selected()))?;
        }
        ShellCommand::Categories => {
            let store = agent.store().lock().await;
            presenter.render_categories(&store.categories(), store.selected())?;
        }
        ShellCommand::Filter(category) => {
            let mut store = agent.store().lock().await;
            store.select_category(category.parse()?)?;
            presenter.render_many(&store.filter(store.selected()))?;
        }
        ShellCommand::Sync => {
            if agent.tick(presenter).await? == TickOutcome::Skipped {
                presenter.warn("A sync is already in progress")?;
            }
        }
        ShellCommand::Export(path) => {
            let store = agent.store().lock().await;
            write_export(&path, &store.export_json()?)?;
            presenter.notify(&format!(
                "Exported {} quotes to {}",
                store.len(),
                path.display()
            ))?;
        }
        ShellCommand::Import(path) => {
            let report = import_file(&mut *agent.store().lock().await, &path)?;
            report_import(presenter, report)?;
        }
        ShellCommand::Status => {
            let store = agent.store().lock().await;
            let state = store.storage().get_sync_state()?;
            presenter.render_status(&store, &state)?;
        }
        ShellCommand::Help => presenter.print(HELP)?,
        ShellCommand::Quit | ShellCommand::Empty => {}
    }

    Ok(())
}

/// Write an exported document to `path`.
fn write_export(path: &Path, json: &str) -> domain::Result<()> {
    std::fs::write(path, json)
        .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;
    tracing::info!(path = %path.display(), "Exported quotes");
    Ok(())
}

/// Import the JSON document at `path` into `store`.
fn import_file(store: &mut QuoteStore, path: &Path) -> domain::Result<ImportReport> {
    let document = std::fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read {}", path.display()), e))?;
    store.import_json(&document)
}

/// Tell the user how an import went.
fn report_import<W: Write>(presenter: &mut Presenter<W>, report: ImportReport) -> domain::Result<()> {
    if report.accepted == 0 {
        return presenter.warn("No valid quotes were found in the imported file.");
    }

    let mut message = format!("Successfully imported {} quotes.", report.accepted);
    if report.rejected > 0 {
        message.push_str(&format!(" Skipped {} invalid entries.", report.rejected));
    }
    presenter.notify(&message)
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_remote_only_when_requested() {
        let mut config = RemoteConfig::default();
        assert!(push_remote(false, &config).unwrap().is_none());
        assert!(push_remote(true, &config).unwrap().is_some());

        config.push_on_add = true;
        assert!(push_remote(false, &config).unwrap().is_some());
    }
}
