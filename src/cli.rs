//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use rand::RngCore;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::fs_image_adapter::FsImageAdapter;
use crate::adapters::pairs_adapter::{BinanceSymbolSource, PairsCatalog};
use crate::adapters::sqlite_adapter::SqliteAdapter;
use crate::domain::dashboard::compute_dashboard;
use crate::domain::error::JournalError;
use crate::ports::auth_port::Owner;
use crate::ports::config_port::ConfigPort;
use crate::ports::journal_port::JournalPort;

#[derive(Parser, Debug)]
#[command(name = "tradejournal", about = "Personal trading journal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Create the database tables and indexes
    InitDb {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Create an account and print its bearer token
    AddUser {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        username: String,
    },
    /// Print a user's dashboard summary as JSON
    Dashboard {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        username: String,
    },
    /// Export a user's journal to CSV
    Export {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Import journal rows for a user from CSV
    Import {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        input: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Serve { config } => run_serve(&config),
        Command::InitDb { config } => run_init_db(&config),
        Command::AddUser { config, username } => run_add_user(&config, &username),
        Command::Dashboard { config, username } => run_dashboard(&config, &username),
        Command::Export {
            config,
            username,
            output,
        } => run_export(&config, &username, &output),
        Command::Import {
            config,
            username,
            input,
        } => run_import(&config, &username, &input),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = JournalError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn open_store(config: &dyn ConfigPort) -> Result<SqliteAdapter, ExitCode> {
    let store = SqliteAdapter::from_config(config).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    store.initialize_schema().map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    Ok(store)
}

fn lookup_user(store: &SqliteAdapter, username: &str) -> Result<Owner, ExitCode> {
    match store.find_user(username) {
        Ok(Some(owner)) => Ok(owner),
        Ok(None) => {
            let err = JournalError::UserNotFound {
                username: username.to_string(),
            };
            eprintln!("error: {err}");
            Err(ExitCode::from(&err))
        }
        Err(e) => {
            eprintln!("error: {e}");
            Err(ExitCode::from(&e))
        }
    }
}

fn run_init_db(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Err(code) = open_store(&config) {
        return code;
    }
    eprintln!("Database initialized");
    ExitCode::SUCCESS
}

fn run_add_user(config_path: &PathBuf, username: &str) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let store = match open_store(&config) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let mut token_bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut token_bytes);
    let token = hex::encode(token_bytes);

    match store.create_user(username, &token) {
        Ok(owner) => {
            eprintln!("Created user {} (id {})", owner.username, owner.id);
            eprintln!("Bearer token (shown once, only the hash is stored):");
            println!("{token}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn run_dashboard(config_path: &PathBuf, username: &str) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let store = match open_store(&config) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let owner = match lookup_user(&store, username) {
        Ok(o) => o,
        Err(code) => return code,
    };

    let rows = match store.fetch_all_for_owner(owner.id) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    let summary = compute_dashboard(&rows);
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run_export(config_path: &PathBuf, username: &str, output: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let store = match open_store(&config) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let owner = match lookup_user(&store, username) {
        Ok(o) => o,
        Err(code) => return code,
    };

    let rows = match store.fetch_all_for_owner(owner.id) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    match CsvAdapter::export_to_path(&rows, output) {
        Ok(()) => {
            eprintln!("Exported {} rows to {}", rows.len(), output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn run_import(config_path: &PathBuf, username: &str, input: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let store = match open_store(&config) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let owner = match lookup_user(&store, username) {
        Ok(o) => o,
        Err(code) => return code,
    };

    let entries = match CsvAdapter::import_from_path(input) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    let mut imported = 0usize;
    for entry in entries {
        if let Err(e) = store.insert(owner.id, entry) {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
        imported += 1;
    }

    eprintln!("Imported {imported} rows for {username}");
    ExitCode::SUCCESS
}

fn run_serve(config_path: &PathBuf) -> ExitCode {
    use crate::adapters::web::{build_router, AppState};
    use std::net::SocketAddr;
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let store = match open_store(&config) {
        Ok(s) => Arc::new(s),
        Err(code) => return code,
    };

    let images = Arc::new(FsImageAdapter::from_config(&config));
    let uploads_root = images.root().to_path_buf();

    let source = match BinanceSymbolSource::new() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };
    let cache_ttl = config.get_int("pairs", "cache_ttl_secs", 300).max(0) as u64;
    let pairs = Arc::new(PairsCatalog::new(
        Box::new(source),
        Duration::from_secs(cache_ttl),
    ));

    let addr: SocketAddr = config
        .get_string("web", "listen")
        .unwrap_or_else(|| "127.0.0.1:5000".to_string())
        .parse()
        .unwrap_or_else(|_| "127.0.0.1:5000".parse().unwrap());

    eprintln!("Starting web server on {}", addr);

    let state = AppState {
        journal: store.clone(),
        images,
        auth: store,
        pairs,
    };

    let router = build_router(state, uploads_root);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(1);
        }
    };

    let served: Result<(), std::io::Error> = runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await
    });

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}
