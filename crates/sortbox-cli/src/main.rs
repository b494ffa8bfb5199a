use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use sortbox_core::{
    AppConfig, Category, FileRecord, FileStore, JsonFileStore, Preview, Session, SessionEvent,
    SortboxError, classify, extensions_for, format_size, import, preview_for, viewer,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "sortbox",
    about = "Drop files in, get them sorted by type",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting SORTBOX_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Log progress details to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add files (or directories of files) and organize them.
    Organize {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Descend into subdirectories.
        #[arg(long)]
        recursive: bool,
    },

    /// List organized files grouped by category.
    List,

    /// Show a single file record.
    Show { index: usize },

    /// Print the category for each file name (nothing is stored).
    Classify {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Open an image or PDF in the system viewer.
    Preview { index: usize },

    /// Write a stored file back to disk.
    Download {
        index: usize,
        #[arg(long)]
        out: Option<PathBuf>,
        /// Replace the destination if it already exists.
        #[arg(long)]
        force: bool,
    },

    /// Per-category counts and sizes.
    Stats,

    /// Remove every stored file.
    Clear {
        #[arg(long)]
        confirm: bool,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config as TOML.
    Show,
    /// Print the config file path.
    Path,
    /// Write the default config file if none exists.
    Init,
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        let code = err
            .downcast_ref::<SortboxError>()
            .map(|e| e.exit_code())
            .unwrap_or(sortbox_core::ExitCode::GeneralError);
        eprintln!("Error: {err}");
        std::process::exit(code as i32);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,sortbox_core=info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let start = Instant::now();

    // ── Env var overrides ──────────────────────────────────────────────────
    let json_output = cli.json || std::env::var("SORTBOX_JSON").as_deref() == Ok("1");

    let mut config = AppConfig::load()?;
    if let Ok(dir) = std::env::var("SORTBOX_DATA_DIR") {
        config.set_data_dir(dir.into());
    }
    debug!(data_dir = %config.data_dir().display(), "config loaded");

    match cli.command {
        // ── Organize ───────────────────────────────────────────────────────

        Commands::Organize { paths, recursive } => {
            let files = import::collect_files(&paths, recursive);
            if files.is_empty() {
                eprintln!("No readable files found.");
                std::process::exit(sortbox_core::ExitCode::NotFound as i32);
            }

            // Ctrl-C stops the sequencer; records already reported still settle.
            let cancel = CancellationToken::new();
            let trigger = cancel.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => trigger.cancel(),
                    Err(e) => warn!("cannot listen for Ctrl-C: {e}"),
                }
            });

            let mut session = Session::from_config(open_store(&config), &config);
            let report = session
                .organize_with_cancel(
                    files,
                    |event| {
                        if !json_output {
                            print_event(&event);
                        }
                    },
                    &cancel,
                )
                .await?;
            let dur = start.elapsed().as_millis();

            if json_output {
                let added: Vec<_> = session.store().records()[report.first_index..]
                    .iter()
                    .map(record_json)
                    .collect();
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": {
                        "items": added,
                        "skipped": report.skipped,
                        "cancelled": report.summary.cancelled,
                    },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                for name in &report.skipped {
                    eprintln!("Skipped unreadable file: {name}");
                }
            }
        }

        // ── List ───────────────────────────────────────────────────────────

        Commands::List => {
            let store = open_store(&config);
            let dur = start.elapsed().as_millis();

            if json_output {
                let groups: Vec<_> = store
                    .grouped()
                    .iter()
                    .map(|g| {
                        serde_json::json!({
                            "category": g.category,
                            "folder": g.category.folder_path(),
                            "items": g.files.iter().map(|r| record_json(r)).collect::<Vec<_>>(),
                        })
                    })
                    .collect();
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "groups": groups, "total": store.len() },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if store.is_empty() {
                println!("No files yet. Use `sortbox organize <files>` to add some.");
            } else {
                let indexed: Vec<(usize, &FileRecord)> = store.records().iter().enumerate().collect();
                for group in store.grouped() {
                    println!(
                        "{} ({} {})",
                        group.category.display_name(),
                        group.files.len(),
                        if group.files.len() == 1 { "file" } else { "files" }
                    );
                    for (index, record) in indexed.iter().filter(|(_, r)| r.category == group.category) {
                        println!(
                            "  {index:>3}  {name:<40}  {size:>10}  {status}",
                            name = record.name,
                            size = format_size(record.size),
                            status = record.status,
                        );
                    }
                }
            }
        }

        // ── Show ───────────────────────────────────────────────────────────

        Commands::Show { index } => {
            let store = open_store(&config);
            let record = store.get(index)?;
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":record_json(record),"meta":{"duration_ms":dur}}))?;
            } else {
                println!("{}", serde_json::to_string_pretty(&record_json(record))?);
            }
        }

        // ── Classify ───────────────────────────────────────────────────────

        Commands::Classify { names } => {
            let results: Vec<(String, Category)> =
                names.into_iter().map(|n| { let c = classify(&n); (n, c) }).collect();
            if json_output {
                let items: Vec<_> = results
                    .iter()
                    .map(|(name, category)| serde_json::json!({"name": name, "category": category}))
                    .collect();
                print_json(&serde_json::json!({"status":"ok","data":{"items":items}}))?;
            } else {
                for (name, category) in &results {
                    println!("{category:<10}  {name}");
                }
            }
        }

        // ── Preview / Download ─────────────────────────────────────────────

        Commands::Preview { index } => {
            let store = open_store(&config);
            let record = store.get(index)?;
            if let Preview::DownloadOnly = preview_for(record) {
                eprintln!(
                    "{} is in {}: no inline preview. Use `sortbox download {index}`.",
                    record.name,
                    record.category.display_name()
                );
                std::process::exit(sortbox_core::ExitCode::InvalidArgs as i32);
            }
            let path = viewer::open_preview(record, &config.preview_cache_dir())?;
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"opened":path}}))?;
            } else {
                println!("Opened {}", path.display());
            }
        }

        Commands::Download { index, out, force } => {
            let store = open_store(&config);
            let record = store.get(index)?;
            let dest = match out {
                Some(path) => path,
                None => viewer::default_download_path(record, &std::env::current_dir()?),
            };
            let path = viewer::download(record, &dest, force)?;
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"written":path}}))?;
            } else {
                println!("Saved {} ({})", path.display(), format_size(record.size));
            }
        }

        // ── Stats ──────────────────────────────────────────────────────────

        Commands::Stats => {
            let store = open_store(&config);
            let groups = store.grouped();
            let dur = start.elapsed().as_millis();

            if json_output {
                let by_category: Vec<_> = groups
                    .iter()
                    .map(|g| {
                        serde_json::json!({
                            "category": g.category,
                            "count": g.files.len(),
                            "bytes": g.total_size(),
                            "extensions": extensions_for(g.category),
                        })
                    })
                    .collect();
                print_json(&serde_json::json!({
                    "status":"ok",
                    "data":{"total_files":store.len(),"total_bytes":store.total_size(),"categories":by_category},
                    "meta":{"duration_ms":dur}
                }))?;
            } else {
                println!("File statistics:");
                println!("  Total files: {}", store.len());
                println!("  Total size:  {}", format_size(store.total_size()));
                for g in &groups {
                    let extensions = extensions_for(g.category);
                    println!(
                        "  {:<12} {:>4}  {:>10}  {}",
                        g.category.display_name(),
                        g.files.len(),
                        format_size(g.total_size()),
                        if extensions.is_empty() { "-".to_string() } else { extensions.join(", ") }
                    );
                }
            }
        }

        // ── Clear ──────────────────────────────────────────────────────────

        Commands::Clear { confirm } => {
            let mut store = open_store(&config);
            if store.is_empty() {
                println!("Nothing to clear.");
                return Ok(());
            }
            if !confirm {
                eprintln!("This removes all {} files. Add --confirm to proceed.", store.len());
                std::process::exit(sortbox_core::ExitCode::ConfirmRequired as i32);
            }
            let count = store.len();
            store.clear();
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"cleared":count}}))?;
            } else {
                println!("All files cleared successfully");
            }
        }

        // ── Config ─────────────────────────────────────────────────────────

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":config}))?;
                } else {
                    print!("{}", config.to_toml_string()?);
                }
            }
            ConfigAction::Path => {
                println!("{}", AppConfig::config_path().display());
            }
            ConfigAction::Init => {
                let path = AppConfig::config_path();
                if path.exists() {
                    println!("Config already exists: {}", path.display());
                } else {
                    AppConfig::default().save_to(&path)?;
                    println!("Wrote default config: {}", path.display());
                }
            }
        },
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn open_store(config: &AppConfig) -> FileStore {
    FileStore::open(JsonFileStore::at(config.snapshot_path()))
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

/// Record as JSON with the embedded bytes replaced by a flag.
fn record_json(record: &FileRecord) -> serde_json::Value {
    let mut value = serde_json::to_value(record).unwrap_or(serde_json::Value::Null);
    if let serde_json::Value::Object(map) = &mut value {
        map.remove("dataUrl");
        map.insert(
            "hasPreview".to_string(),
            serde_json::Value::Bool(record.preview_data.is_some()),
        );
        map.insert("folder".to_string(), record.category.folder_path().into());
    }
    value
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Started { count } => {
            println!("Organizing {count} file{}...", plural(*count));
        }
        SessionEvent::Organizing { index, name, category } => {
            println!("  [{index:>3}] {name} -> {}", category.folder_path());
        }
        SessionEvent::Organized { .. } => {}
        SessionEvent::Finished { organized, cancelled } => {
            if *cancelled {
                println!("Stopped after {organized} file{}.", plural(*organized));
            } else {
                println!("Successfully organized {organized} file{}!", plural(*organized));
            }
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
