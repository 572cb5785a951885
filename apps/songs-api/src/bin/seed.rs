//! Load a newline-delimited JSON song file into the catalog.
//!
//! ```text
//! MONGODB_URL=mongodb://localhost:27017 songs-seed --file tests/songs.json --clear
//! ```

use clap::Parser;
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use database::mongodb::MongoConfig;
use domain_songs::{MongoSongRepository, Song, SongService};
use eyre::{WrapErr, eyre};
use serde_json::Value;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "songs-seed")]
#[command(about = "Bulk-insert songs from a newline-delimited JSON file")]
#[command(version)]
struct Cli {
    /// One JSON song object per line; blank lines are skipped
    #[arg(long, default_value = "./tests/songs.json")]
    file: PathBuf,

    /// Delete every existing song before inserting
    #[arg(long)]
    clear: bool,

    /// Songs per insert request
    #[arg(long, default_value = "500")]
    batch_size: NonZeroUsize,
}

/// Parse NDJSON into songs, failing on the first bad line
fn parse_catalog(input: &str) -> eyre::Result<Vec<Song>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let line_number = index + 1;
            match serde_json::from_str::<Value>(line)
                .wrap_err_with(|| format!("line {line_number}: invalid JSON"))?
            {
                Value::Object(fields) => Ok(Song::from(fields)),
                other => Err(eyre!(
                    "line {line_number}: expected a song object, got {}",
                    json_kind(&other)
                )),
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();
    let cli = Cli::parse();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let input = std::fs::read_to_string(&cli.file)
        .wrap_err_with(|| format!("failed to read {}", cli.file.display()))?;
    let songs = parse_catalog(&input).wrap_err_with(|| format!("in {}", cli.file.display()))?;
    info!(count = songs.len(), file = %cli.file.display(), "Parsed song file");

    let config = MongoConfig::from_env()?;
    let client = database::mongodb::connect_from_config_with_retry(&config, None).await?;
    let service = SongService::new(MongoSongRepository::new(
        &client.database(config.database()),
    ));

    if cli.clear {
        let deleted = service.clear_songs().await?;
        info!(deleted, "Cleared existing songs");
    }

    let mut inserted = 0;
    for batch in songs.chunks(cli.batch_size.get()) {
        inserted += service.add_songs(batch.to_vec()).await?;
    }
    info!(inserted, database = config.database(), "Seeding complete");

    database::mongodb::close(client).await;
    Ok(())
}
