use anyhow::{Result, anyhow};
use clap::Parser;
use mouse_snake::game::GameConfig;
use mouse_snake::logging::{init_tracing, install_panic_hook};
use mouse_snake::modes::HumanMode;
use mouse_snake::storage::{FileHighScoreStore, HighScoreStore, MemoryHighScoreStore};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "mouse_snake")]
#[command(version, about = "Snake game steered with the mouse")]
struct Cli {
    /// Tiles along each side of the board
    #[arg(long)]
    tile_count: Option<usize>,

    /// Surface units per tile used for steering distances
    #[arg(long)]
    cell_size: Option<f32>,

    /// JSON file with game settings; command-line values take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// File holding the best score (defaults to the user data directory)
    #[arg(long)]
    high_score_file: Option<PathBuf>,

    /// Keep the best score for this session only
    #[arg(long)]
    no_save: bool,

    /// Write logs to this file (set RUST_LOG to change verbosity)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn build_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::from_json_file(path)?,
        None => GameConfig::default(),
    };

    if let Some(tile_count) = cli.tile_count {
        config.tile_count = tile_count;
    }
    if let Some(cell_size) = cli.cell_size {
        config.cell_size = cell_size;
    }

    config
        .validate()
        .map_err(|msg| anyhow!("Invalid game configuration: {msg}"))?;
    Ok(config)
}

fn build_store(cli: &Cli) -> Box<dyn HighScoreStore> {
    if cli.no_save {
        return Box::new(MemoryHighScoreStore::default());
    }

    match cli
        .high_score_file
        .clone()
        .or_else(FileHighScoreStore::default_path)
    {
        Some(path) => {
            info!(path = ?path, "using high score file");
            Box::new(FileHighScoreStore::new(path))
        }
        None => {
            warn!("no data directory available, high score will not be kept");
            Box::new(MemoryHighScoreStore::default())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_file.as_deref())?;
    install_panic_hook();

    let config = build_config(&cli)?;
    let store = build_store(&cli);

    let mut human_mode = HumanMode::new(config, store);
    human_mode.run().await?;

    Ok(())
}
