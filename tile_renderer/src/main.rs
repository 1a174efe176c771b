// main.rs - Headless driver: builds the tile buffers, replays a command script
// and dumps the vertex data that the GPU submission path would upload.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::{Path, PathBuf};

use maze_tile_renderer::{Maze, MazeData, MazeGraphic, RendererConfig, TileCommand};

/// CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to maze JSON file; an open maze is used when omitted
    #[arg(short, long)]
    pub maze: Option<PathBuf>,

    /// Width of the open maze
    #[arg(short = 'W', long, default_value = "16")]
    pub width: usize,

    /// Height of the open maze
    #[arg(short = 'H', long, default_value = "16")]
    pub height: usize,

    /// Renderer config JSON (display toggles, colors, geometry, text)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON array of tile commands to apply after drawing
    #[arg(long)]
    pub commands: Option<PathBuf>,

    /// Write the triangle-graphic buffer as raw vertex bytes
    #[arg(long)]
    pub graphic_out: Option<PathBuf>,

    /// Write the triangle-texture buffer as raw vertex bytes
    #[arg(long)]
    pub texture_out: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<RendererConfig> {
    match &args.config {
        Some(path) => RendererConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(RendererConfig::default()),
    }
}

fn load_maze_data(args: &Args) -> Result<MazeData> {
    match &args.maze {
        Some(path) => {
            let s = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&s)
                .with_context(|| format!("Failed to parse maze JSON from {}", path.display()))
        }
        None => Ok(MazeData::open(args.width, args.height)),
    }
}

fn load_commands(path: &Path) -> Result<Vec<TileCommand>> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&s)
        .with_context(|| format!("Failed to parse commands from {}", path.display()))
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    info!("Starting with {args:?}");

    let config = load_config(&args)?;
    let data = load_maze_data(&args)?;
    let maze = Maze::from_data(&data, &config.geometry).context("Invalid maze")?;
    let mut maze_graphic = MazeGraphic::new(maze, &config).context("Failed to build tile buffers")?;

    if let Some(path) = &args.commands {
        let commands = load_commands(path)?;
        let mut rejected = 0usize;
        for (i, command) in commands.iter().enumerate() {
            if let Err(e) = maze_graphic.apply(command) {
                warn!("Command {} rejected: {}", i, e);
                rejected += 1;
            }
        }
        info!(
            "Applied {} of {} commands",
            commands.len() - rejected,
            commands.len()
        );
    }

    info!(
        "Buffers: {} triangle graphics ({} bytes), {} triangle textures ({} bytes)",
        maze_graphic.graphic_buffer().len(),
        maze_graphic.graphic_bytes().len(),
        maze_graphic.texture_buffer().len(),
        maze_graphic.texture_bytes().len()
    );

    if let Some(path) = &args.graphic_out {
        write_bytes(path, maze_graphic.graphic_bytes())?;
    }
    if let Some(path) = &args.texture_out {
        write_bytes(path, maze_graphic.texture_bytes())?;
    }

    Ok(())
}
