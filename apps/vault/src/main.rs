use std::{fs, path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings_from, DEFAULT_CONFIG_FILE},
    views::filter_records,
    CatalogClient, MissingCatalog, MutationOutcome, RemoteCatalog, StoreClient, VaultController,
    VaultError, VaultEvent,
};
use shared::domain::{ListKind, Priority, Record, RecordId};
use tokio::sync::broadcast;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "vault", about = "Manage a vinyl inventory and wishlist")]
struct Cli {
    /// Optional TOML settings file.
    #[arg(long, env = "VAULT_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Overrides the configured store endpoint.
    #[arg(long)]
    store_url: Option<String>,
    /// Overrides the configured catalog token.
    #[arg(long)]
    catalog_token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a list, optionally filtered by title or artist.
    List {
        kind: ListKind,
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        by_priority: bool,
    },
    /// Search the catalog; records already collected are marked.
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    Show {
        id: i64,
    },
    /// Add a catalog release to the wishlist.
    Add {
        id: i64,
        #[arg(long)]
        priority: Priority,
    },
    Delete {
        id: i64,
    },
    /// Move a wishlist entry into the inventory.
    Move {
        id: i64,
    },
    Priority {
        id: i64,
        level: Priority,
    },
    /// Write a list as CSV into the output directory.
    Export {
        kind: ListKind,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    debug!(command = ?cli.command, "starting");

    let mut settings = load_settings_from(&cli.config);
    if let Some(url) = cli.store_url {
        settings.store_url = Some(url);
    }
    if let Some(token) = cli.catalog_token {
        settings.catalog_token = Some(token);
    }

    let store = StoreClient::from_settings(&settings).context("failed to configure store")?;
    let catalog: Arc<dyn RemoteCatalog> = match CatalogClient::from_settings(&settings)
        .context("failed to configure catalog")?
    {
        Some(client) => Arc::new(client),
        None => {
            info!("no catalog token configured; search and details are unavailable");
            Arc::new(MissingCatalog)
        }
    };

    let controller = VaultController::new(Arc::new(store));
    let mut events = controller.subscribe_events();
    if let Err(err) = controller.load().await {
        eprintln!("{}", err.notice());
        return Ok(ExitCode::FAILURE);
    }

    let code = match cli.command {
        Command::List {
            kind,
            filter,
            by_priority,
        } => list(&controller, kind, filter.as_deref(), by_priority).await,
        Command::Search { query } => {
            search(&controller, catalog.as_ref(), &query.join(" ")).await
        }
        Command::Show { id } => show(&controller, catalog.as_ref(), RecordId(id)).await,
        Command::Add { id, priority } => {
            add(&controller, catalog.as_ref(), &mut events, RecordId(id), priority).await
        }
        Command::Delete { id } => {
            let id = RecordId(id);
            let outcome = controller.delete_from_inventory(id).await;
            report(
                outcome,
                &mut events,
                format!("Deleted record {id} from the inventory."),
                format!("Record {id} is not in the inventory."),
            )
        }
        Command::Move { id } => {
            let id = RecordId(id);
            let outcome = controller.move_to_inventory(id).await;
            report(
                outcome,
                &mut events,
                format!("Moved record {id} to the inventory."),
                format!("Record {id} is not on the wishlist."),
            )
        }
        Command::Priority { id, level } => {
            let id = RecordId(id);
            let outcome = controller.update_priority(id, level).await;
            report(
                outcome,
                &mut events,
                format!("Record {id} now has {level} priority."),
                format!("Record {id} is not on the wishlist or already has {level} priority."),
            )
        }
        Command::Export { kind, out } => export(&controller, kind, out).await?,
    };
    Ok(code)
}

async fn list(
    controller: &VaultController,
    kind: ListKind,
    filter: Option<&str>,
    by_priority: bool,
) -> ExitCode {
    let records = controller.records(kind).await;
    let shown: Vec<Record> = filter_records(&records, filter.unwrap_or_default())
        .into_iter()
        .cloned()
        .collect();
    if shown.is_empty() {
        println!("{}", render::empty_list_notice(kind, filter));
        return ExitCode::SUCCESS;
    }

    if by_priority {
        for line in render::grouped_lines(&shown) {
            println!("{line}");
        }
    } else {
        for record in &shown {
            println!("{}", render::record_line(record));
        }
    }
    ExitCode::SUCCESS
}

async fn search(
    controller: &VaultController,
    catalog: &dyn RemoteCatalog,
    query: &str,
) -> ExitCode {
    let results = match catalog.search(query).await {
        Ok(results) => results,
        Err(err) => {
            eprintln!("Search failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    if results.is_empty() {
        println!("No results found.");
        return ExitCode::SUCCESS;
    }
    for record in &results {
        let in_collection = controller.is_in_collection(record.id).await;
        println!("{}", render::search_line(record, in_collection));
    }
    ExitCode::SUCCESS
}

async fn show(
    controller: &VaultController,
    catalog: &dyn RemoteCatalog,
    id: RecordId,
) -> ExitCode {
    let detail = match catalog.details(id).await {
        Ok(detail) => detail,
        Err(err) => {
            eprintln!("Could not load record details: {err}");
            return ExitCode::FAILURE;
        }
    };
    let state = controller.snapshot().await;
    let held = state.location(id).zip(state.find(id));
    print!("{}", render::detail_text(&detail, held));
    ExitCode::SUCCESS
}

async fn add(
    controller: &VaultController,
    catalog: &dyn RemoteCatalog,
    events: &mut broadcast::Receiver<VaultEvent>,
    id: RecordId,
    priority: Priority,
) -> ExitCode {
    if controller.is_in_collection(id).await {
        println!("Record {id} is already in your collection.");
        return ExitCode::SUCCESS;
    }
    let detail = match catalog.details(id).await {
        Ok(detail) => detail,
        Err(err) => {
            eprintln!("Could not load record details: {err}");
            return ExitCode::FAILURE;
        }
    };
    let title = format!("{} - {}", detail.record.artist, detail.record.title);
    let outcome = controller.add_to_wishlist(detail.record, priority).await;
    report(
        outcome,
        events,
        format!("Added {title} to the wishlist with {priority} priority."),
        format!("Record {id} is already in your collection."),
    )
}

async fn export(controller: &VaultController, kind: ListKind, out: PathBuf) -> Result<ExitCode> {
    let file = controller.export(kind).await;
    let rows = controller.records(kind).await.len();
    fs::create_dir_all(&out).with_context(|| format!("failed to create {}", out.display()))?;
    let path = out.join(file.filename);
    fs::write(&path, file.content.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {rows} records to {} ({}).", path.display(), file.mime_type);
    Ok(ExitCode::SUCCESS)
}

/// Prints the outcome of a write; rollback notices come from the event stream.
fn report(
    outcome: Result<MutationOutcome, VaultError>,
    events: &mut broadcast::Receiver<VaultEvent>,
    applied: String,
    skipped: String,
) -> ExitCode {
    let mut notified = false;
    while let Ok(event) = events.try_recv() {
        if let VaultEvent::MutationRolledBack { notice, .. } = event {
            eprintln!("{notice}");
            notified = true;
        }
    }

    match outcome {
        Ok(MutationOutcome::Applied) => {
            println!("{applied}");
            ExitCode::SUCCESS
        }
        Ok(MutationOutcome::Skipped) => {
            println!("{skipped}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            if !notified {
                eprintln!("{}", err.notice());
            }
            debug!("write failed: {err}");
            ExitCode::FAILURE
        }
    }
}
