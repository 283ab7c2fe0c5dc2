//! linkstore CLI
//!
//! Command-line interface for a file-backed linkstore.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use linkstore::config::{Config, LogSyncStrategy};
use linkstore::log::LogRecovery;
use linkstore::{DeletionTask, Engine, Resolution, StoreError};
use tracing_subscriber::{fmt, EnvFilter};

/// linkstore CLI
#[derive(Parser, Debug)]
#[command(name = "linkstore")]
#[command(about = "Shorten, resolve and delete links in a linkstore data directory")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./linkstore_data")]
    data_dir: String,

    /// fsync the log every N appends instead of after each one
    #[arg(long)]
    sync_every: Option<usize>,

    /// Deletion worker threads
    #[arg(long, default_value = "4")]
    workers: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Shorten one or more URLs
    Shorten {
        /// URLs to shorten
        #[arg(required = true)]
        urls: Vec<String>,

        /// Owner (session) id
        #[arg(short, long)]
        owner: String,
    },

    /// Print the URL behind a key
    Resolve {
        /// The key to resolve
        key: String,
    },

    /// List an owner's live links
    List {
        /// Owner (session) id
        #[arg(short, long)]
        owner: String,
    },

    /// Soft-delete keys owned by an owner
    Delete {
        /// Keys to delete
        #[arg(required = true)]
        keys: Vec<String>,

        /// Owner (session) id
        #[arg(short, long)]
        owner: String,
    },

    /// Scan the log and report its health
    Verify,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,linkstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut builder = Config::builder()
        .data_dir(&args.data_dir)
        .pool_size(args.workers);
    if let Some(count) = args.sync_every {
        builder = builder.log_sync_strategy(LogSyncStrategy::EveryNEntries { count });
    }
    let config = builder.build();

    match run(config, args.command) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: Config, command: Commands) -> linkstore::Result<ExitCode> {
    if let Commands::Verify = command {
        let result = LogRecovery::verify(&config.log_path())?;
        println!("records:   {}", result.entries_recovered);
        println!("corrupted: {}", result.entries_corrupted);
        match result.highest_key {
            Some(key) => println!("last key:  {}", key),
            None => println!("last key:  none"),
        }
        return Ok(if result.entries_corrupted == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let engine = Engine::open(config)?;
    tracing::debug!("linkstore v{} opened", linkstore::VERSION);

    let code = match command {
        Commands::Shorten { urls, owner } => {
            for (url, key) in urls.iter().zip(engine.shorten_batch(&urls, &owner)?) {
                println!("{}\t{}", key, url);
            }
            ExitCode::SUCCESS
        }
        Commands::Resolve { key } => match engine.resolve(&key) {
            Ok(Resolution::Redirect(url)) => {
                println!("{}", url);
                ExitCode::SUCCESS
            }
            Ok(Resolution::Gone) => {
                println!("gone");
                ExitCode::SUCCESS
            }
            Err(StoreError::NotFound(_)) => {
                eprintln!("unknown key: {}", key);
                ExitCode::FAILURE
            }
            Err(e) => return Err(e),
        },
        Commands::List { owner } => {
            let mut links: Vec<_> = engine.store().get_by_owner(&owner)?.into_iter().collect();
            links.sort_by_key(|(key, _)| key.parse::<u64>().unwrap_or(u64::MAX));
            for (key, url) in links {
                println!("{}\t{}", key, url);
            }
            ExitCode::SUCCESS
        }
        Commands::Delete { keys, owner } => {
            let task = DeletionTask::new(keys, owner);
            if let Err(e) = engine.request_delete(task) {
                eprintln!("{}", e);
                return Ok(ExitCode::FAILURE);
            }
            ExitCode::SUCCESS
        }
        Commands::Verify => unreachable!("handled before the engine is opened"),
    };

    let stats = engine.close();
    if stats.tasks_completed > 0 || stats.tasks_failed > 0 {
        println!("deleted {} keys", stats.keys_deleted);
    }
    Ok(code)
}
