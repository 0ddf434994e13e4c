#[macro_use]
extern crate log;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tsuzuki::{
    domain::{
        entities::series::{Series, SeriesEntry},
        services::library::{LibraryService, ReconcileOptions},
    },
    infrastructure::{
        config::Config, domain::repositories::library::InMemoryLibraryRepository,
    },
};
use tsuzuki_lib::{
    comparison::{UnnumberedPolicy, get_number_unread_chapters_with, unread_badge},
    models::{Chapter, ChapterInfo},
};

#[derive(Parser)]
#[clap(version, about = "Reconcile manga chapter lists and count unread chapters")]
struct Opts {
    /// Path to config file
    #[clap(long)]
    config: Option<String>,
    #[clap(subcommand)]
    subcmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Count unread chapters of a JSON chapter list
    Unread {
        path: PathBuf,
        /// Leave chapters without a number out of the count
        #[clap(long)]
        skip_unnumbered: bool,
    },
    /// Find the chapter in a list that best matches another chapter
    Similar {
        original: PathBuf,
        candidates: PathBuf,
    },
    /// Refresh a series in a library snapshot with freshly fetched chapters
    Refresh {
        library: PathBuf,
        series_id: String,
        fresh: PathBuf,
        /// Title used when the series is not in the library yet
        #[clap(long)]
        title: Option<String>,
        /// Print the summary without writing the snapshot back
        #[clap(long)]
        dry_run: bool,
    },
}

fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, anyhow::Error> {
    let file = std::fs::File::open(path.as_ref())
        .map_err(|e| anyhow::anyhow!("failed to open {}: {e}", path.as_ref().display()))?;
    let value = serde_json::from_reader(std::io::BufReader::new(file))?;

    Ok(value)
}

fn init_logger() {
    if std::env::var("RUST_LOG").is_err() {
        if let Ok(tsuzuki_log) = std::env::var("TSUZUKI_LOG") {
            env_logger::Builder::new()
                .parse_filters(&format!(
                    "tsuzuki={tsuzuki_log},tsuzuki_lib={tsuzuki_log}"
                ))
                .init();
            return;
        }
    }

    env_logger::init();
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    init_logger();

    let opts: Opts = Opts::parse();
    let config = Config::open(opts.config)?;

    debug!("config: {:?}", config);

    match opts.subcmd {
        Command::Unread {
            path,
            skip_unnumbered,
        } => {
            let chapters: Vec<Chapter> = read_json(&path)?;
            let policy = if skip_unnumbered {
                UnnumberedPolicy::Skip
            } else {
                config.unnumbered_policy
            };

            let unread = get_number_unread_chapters_with(&chapters, policy);
            match unread_badge(unread) {
                Some(count) => println!("{count}"),
                None => {
                    warn!("unread count is not a number");
                    println!("NaN");
                }
            }
        }
        Command::Similar {
            original,
            candidates,
        } => {
            let original: Chapter = read_json(&original)?;
            let candidates: Vec<Chapter> = read_json(&candidates)?;

            let repo = InMemoryLibraryRepository::new();
            let svc = LibraryService::new(repo, ReconcileOptions::from(&config));
            let selected = svc.find_similar_chapter(&original, &candidates);

            println!("{}", serde_json::to_string_pretty(&selected)?);
        }
        Command::Refresh {
            library,
            series_id,
            fresh,
            title,
            dry_run,
        } => {
            let entries: Vec<SeriesEntry> = if library.exists() {
                read_json(&library)?
            } else {
                vec![]
            };
            let fresh: Vec<ChapterInfo> = read_json(&fresh)?;
            let known = entries.iter().any(|e| e.series.id == series_id);

            let repo = InMemoryLibraryRepository::from_entries(entries);
            let svc = LibraryService::new(repo.clone(), ReconcileOptions::from(&config));
            let summary = if known {
                svc.refresh_chapters(&series_id, fresh).await?
            } else {
                info!("series {series_id} is not in the library, importing it");
                let series = Series {
                    title: title.unwrap_or_else(|| series_id.clone()),
                    id: series_id,
                    source_id: String::new(),
                };
                svc.import_series(&series, fresh).await?
            };

            println!("{}", serde_json::to_string_pretty(&summary)?);

            if !dry_run {
                let entries = repo.entries().await;
                std::fs::write(&library, serde_json::to_string_pretty(&entries)?)?;
                info!("wrote library snapshot to {}", library.display());
            }
        }
    }

    Ok(())
}
