use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use reelcore_config::Settings;
use reelcore_index::DirectoryIndex;
use reeld::{LifecycleEvent, RecordingList, RecordingService};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "List screen recordings, newest first")]
struct Cli {
    /// Folder holding the recordings. Overrides the settings file.
    #[arg(long)]
    folder: Option<String>,
    /// Directory tree to index. Defaults to the folder's parent.
    #[arg(long)]
    root: Option<PathBuf>,
    /// Settings file (JSON).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the listing as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(folder) = cli.folder {
        settings.recordings_folder = folder;
    }

    let root = cli
        .root
        .unwrap_or_else(|| index_root_for(Path::new(&settings.recordings_folder)));
    tracing::debug!(root = %root.display(), folder = %settings.recordings_folder, "indexing");

    let index = DirectoryIndex::new(root, &settings.video_extensions);
    let service = RecordingService::new(index, &settings);
    service.handle_lifecycle(LifecycleEvent::Start);

    let list = service
        .refresh()
        .await
        .with_context(|| format!("listing recordings in {}", settings.recordings_folder))?;
    service.handle_lifecycle(LifecycleEvent::Stop);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        print_list(&list);
    }

    Ok(())
}

/// Parent of the recordings folder, so the folder itself is part of the walk.
fn index_root_for(folder: &Path) -> PathBuf {
    match folder.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        Some(_) => PathBuf::from("."),
        None if folder.has_root() => folder.to_path_buf(),
        None => PathBuf::from("."),
    }
}

fn print_list(list: &RecordingList) {
    if list.items.is_empty() {
        println!("no recordings in {}", list.folder);
        return;
    }

    for item in &list.items {
        println!(
            "{:>12}  {:>10}  {}",
            item.date_added_unix_secs,
            item.size_bytes,
            item.path.display()
        );
    }
    if list.truncated {
        println!("(listing interrupted)");
    }
}
