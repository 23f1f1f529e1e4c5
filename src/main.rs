//! Main entry point for the showtracker CLI application.

use clap::{Parser, Subcommand};
use log::{debug, warn};
use showtracker::api::OmdbProvider;
use showtracker::commands::{self, AddRequest, Removal};
use showtracker::config::{Config, API_KEY_ENV};
use showtracker::error::{Result, TrackerError};
use showtracker::navigator::Direction;
use showtracker::storage::Store;
use std::env;
use std::path::PathBuf;

/// Command-line arguments for the showtracker application.
#[derive(Parser, Debug)]
#[command(
    name = "showtracker",
    version,
    about = "Keep track of the next episode of the TV shows you watch",
    long_about = "Track TV shows episode by episode, with listings and ratings from OMDb."
)]
struct Args {
    /// Print the table of next episodes
    #[arg(long)]
    list: bool,

    /// Import a watchlist file (defaults to the configured watchlist)
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "")]
    watchlist: Option<String>,

    /// Directory holding the show and tracker databases
    #[arg(long, global = true)]
    database_dir: Option<PathBuf>,

    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, global = true, default_value_t = 1)]
    log: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start tracking a show, or update its note and short code
    Add {
        /// Show title, optionally followed by a code such as s06e09
        show: String,
        /// Next episode to watch, e.g. S06E09 (defaults to S01E01)
        episode: Option<String>,
        /// Free-text note
        #[arg(long)]
        note: Option<String>,
        /// Short alias for the show
        #[arg(short = 'c', long)]
        short_code: Option<String>,
    },
    /// Mark episodes as watched
    Inc {
        /// Show title or short code
        show: String,
        /// Number of episodes
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        by: i64,
    },
    /// Step back through episodes
    Dec {
        /// Show title or short code
        show: String,
        /// Number of episodes
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        by: i64,
    },
    /// Stop tracking a show, or clear its note or short code
    Rm {
        /// Show title or short code
        show: String,
        /// Clear the note only
        #[arg(long)]
        note: bool,
        /// Clear the short code only
        #[arg(long)]
        short_code: bool,
    },
    /// Print the next episode of a show
    Next {
        /// Show title or short code
        show: String,
    },
    /// Re-fetch a show's episode listing
    Refresh {
        /// Show title or short code
        show: String,
    },
}

/// Build the OMDb provider from config and environment.
fn provider(config: &Config) -> Result<OmdbProvider> {
    let api_key = config.resolve_api_key(env::var(API_KEY_ENV).ok());
    OmdbProvider::new(&config.api_url, api_key)
}

/// Run the requested action. Returns `false` if there was nothing to do.
async fn run(args: Args, config: &Config, store: &Store) -> Result<bool> {
    if args.list {
        print!("{}", commands::list_table(store)?);
        return Ok(true);
    }

    if let Some(path) = args.watchlist {
        let path = if path.is_empty() {
            PathBuf::from(&config.watchlist)
        } else {
            PathBuf::from(path)
        };
        let provider = provider(config)?;
        let _lock = store.lock()?;
        let (mut show_db, mut tracker) = store.load_all()?;
        let report =
            commands::import_watchlist(&provider, &mut show_db, &mut tracker, &path).await?;
        store.save_all(&show_db, &tracker)?;
        println!(
            "Imported {} show(s), updated {}, skipped {}",
            report.imported, report.updated, report.skipped
        );
        return Ok(true);
    }

    let Some(command) = args.command else {
        return Ok(false);
    };

    // Read-only commands don't take the lock
    let _lock = match command {
        Command::Next { .. } => None,
        _ => Some(store.lock()?),
    };
    let (mut show_db, mut tracker) = store.load_all()?;

    match command {
        Command::Add {
            show,
            episode,
            note,
            short_code,
        } => {
            let request = AddRequest {
                show,
                episode,
                note,
                short_code,
            };
            let provider = provider(config)?;
            let tracked =
                commands::add_show(&provider, &mut show_db, &mut tracker, &request).await?;
            println!("Tracking {} from {}", tracked.title, tracked.position.cursor());
        }
        Command::Inc { show, by } => {
            let tracked =
                commands::step_show(&show_db, &mut tracker, &show, Direction::Forward, by)?;
            println!("{}: next is {}", tracked.title, tracked.position.cursor());
        }
        Command::Dec { show, by } => {
            let tracked =
                commands::step_show(&show_db, &mut tracker, &show, Direction::Backward, by)?;
            println!("{}: next is {}", tracked.title, tracked.position.cursor());
        }
        Command::Rm {
            show,
            note,
            short_code,
        } => match commands::remove(&mut tracker, &show, note, short_code)? {
            Removal::Show(removed) => println!("Stopped tracking {}", removed.title),
            Removal::Fields(updated) => println!("Updated {}", updated.title),
        },
        Command::Refresh { show } => {
            let provider = provider(config)?;
            let tracked =
                commands::refresh_show(&provider, &mut show_db, &mut tracker, &show).await?;
            println!("Refreshed {}; next is {}", tracked.title, tracked.position.cursor());
        }
        Command::Next { show } => {
            let episode = commands::next_episode(&show_db, &tracker, &show)?;
            println!("{}", episode.to_display());
            return Ok(true);
        }
    }

    store.save_all(&show_db, &tracker)?;
    Ok(true)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.log {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    debug!("Log level set to {:?}", log_level);

    // Load config
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config: {}. Using defaults.", e);
        Config::new()
    });

    // CLI flag wins over config
    let database_dir = match args.database_dir.clone() {
        Some(dir) => Ok(dir),
        None => config.resolve_database_dir(),
    };
    let store = match database_dir {
        Ok(dir) => Store::new(dir),
        Err(e) => exit_with(&e),
    };
    debug!("Using database directory {}", store.dir().display());

    match run(args, &config, &store).await {
        Ok(true) => {}
        Ok(false) => {
            use clap::CommandFactory;
            let _ = Args::command().print_help();
            println!();
        }
        Err(e) => exit_with(&e),
    }
}

fn exit_with(error: &TrackerError) -> ! {
    eprintln!("Error: {}", error);
    std::process::exit(error.exit_code());
}
