//! alphaworld - inspect legacy Alpha-format world saves
//!
//! Thin command-line wrapper over `alphaworld-world`.

mod config;

use std::path::{Path, PathBuf};

use alphaworld_world::{
    read_lock_timestamp, Chunk, ChunkPos, LockMode, NbtFileSource, Value, World, WorldMetadata,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use config::{CliConfig, DEFAULT_CONFIG_PATH};
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect Alpha-format world saves", long_about = None)]
struct Args {
    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// World directory (overrides `world_dir` from the configuration file)
    #[arg(short, long, global = true)]
    world: Option<PathBuf>,

    /// Session lock convention to use when opening the world
    #[arg(long, value_enum, global = true)]
    lock_mode: Option<LockModeArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print world metadata from level.dat
    Info,
    /// Load one chunk and summarize it
    Chunk {
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        z: i32,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the timestamp currently held in session.lock
    Lock,
    /// Print the effective configuration as TOML
    Config {
        /// Also write it to the configuration file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LockModeArg {
    Cooperative,
    Observe,
}

impl From<LockModeArg> for LockMode {
    fn from(arg: LockModeArg) -> Self {
        match arg {
            LockModeArg::Cooperative => LockMode::Cooperative,
            LockModeArg::Observe => LockMode::Observe,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChunkSummary {
    requested: ChunkPos,
    stored: ChunkPos,
    last_update: i64,
    populated: bool,
    tile_entities: usize,
    entities: Vec<EntitySummary>,
}

#[derive(Debug, Serialize)]
struct EntitySummary {
    id: String,
    position: [f64; 3],
    health: Option<i16>,
}

impl ChunkSummary {
    fn new(requested: ChunkPos, chunk: &Chunk) -> Self {
        let level = &chunk.level;
        let tile_entities = match &level.tile_entities {
            Value::List(items) => items.len(),
            _ => 0,
        };
        Self {
            requested,
            stored: chunk.position(),
            last_update: level.last_update,
            populated: level.is_populated(),
            tile_entities,
            entities: level
                .entities
                .iter()
                .map(|e| EntitySummary {
                    id: e.id.clone(),
                    position: [
                        e.physics.position.x,
                        e.physics.position.y,
                        e.physics.position.z,
                    ],
                    health: e.health,
                })
                .collect(),
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let config = effective_config(&args);
    info!(?config, "starting alphaworld v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Info => {
            let world = open_world(&config)?;
            print!("{}", describe_metadata(world.metadata()));
            world.close();
        }
        Command::Chunk { x, z, json } => {
            let mut world = open_world(&config)?;
            let chunk = world
                .load_chunk(x, z)
                .with_context(|| format!("failed to load chunk ({x}, {z})"))?;
            let summary = ChunkSummary::new(ChunkPos::new(x, z), chunk);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", describe_chunk(&summary));
            }
            world.close();
        }
        Command::Lock => {
            let dir = world_dir(&config)?;
            let timestamp = read_lock_timestamp(dir)
                .with_context(|| format!("failed to read session lock in {}", dir.display()))?;
            println!("{timestamp} ({})", format_millis(timestamp));
        }
        Command::Config { save } => {
            print!("{}", toml::to_string_pretty(&config)?);
            if save {
                config
                    .save_to_path(&args.config)
                    .with_context(|| format!("failed to write {}", args.config.display()))?;
                info!(path = %args.config.display(), "saved configuration");
            }
        }
    }
    Ok(())
}

/// Configuration file values with command-line overrides applied.
fn effective_config(args: &Args) -> CliConfig {
    let mut config = CliConfig::load_from_path(&args.config);
    if let Some(world) = &args.world {
        config.world_dir = Some(world.clone());
    }
    if let Some(mode) = args.lock_mode {
        config.lock_mode = mode.into();
    }
    config
}

fn world_dir(config: &CliConfig) -> Result<&Path> {
    config
        .world_dir
        .as_deref()
        .context("no world directory given (use --world or set world_dir in the config file)")
}

fn open_world(config: &CliConfig) -> Result<World> {
    let dir = world_dir(config)?;
    World::open_with(dir, config.world_options(), NbtFileSource)
        .with_context(|| format!("failed to open world at {}", dir.display()))
}

fn format_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "out of range".to_string())
}

fn describe_metadata(meta: &WorldMetadata) -> String {
    format!(
        "RandomSeed: {}\nSpawn: {} {} {}\nTime: {}\nLastPlayed: {} ({})\nSizeOnDisk: {}\nSnowCovered: {}\n",
        meta.random_seed,
        meta.spawn_x,
        meta.spawn_y,
        meta.spawn_z,
        meta.time,
        meta.last_played,
        format_millis(meta.last_played),
        meta.size_on_disk,
        meta.is_snow_covered(),
    )
}

fn describe_chunk(summary: &ChunkSummary) -> String {
    let mut out = format!(
        "Chunk {} (stored as {})\nLastUpdate: {}\nPopulated: {}\nTileEntities: {}\nEntities: {}\n",
        summary.requested,
        summary.stored,
        summary.last_update,
        summary.populated,
        summary.tile_entities,
        summary.entities.len(),
    );
    for entity in &summary.entities {
        let [x, y, z] = entity.position;
        out.push_str(&format!("  {} at {x:.2} {y:.2} {z:.2}", entity.id));
        if let Some(health) = entity.health {
            out.push_str(&format!(" health {health}"));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("alphaworld").chain(args.iter().copied()))
            .expect("args parse")
    }

    #[test]
    fn command_line_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alphaworld.toml");
        CliConfig {
            world_dir: Some(PathBuf::from("/from/config")),
            lock_mode: LockMode::Observe,
        }
        .save_to_path(&path)
        .unwrap();

        let config_arg = path.to_string_lossy().into_owned();
        let args = parse(&[
            "--config",
            &config_arg,
            "--world",
            "/from/flag",
            "--lock-mode",
            "cooperative",
            "info",
        ]);
        let config = effective_config(&args);
        assert_eq!(config.world_dir, Some(PathBuf::from("/from/flag")));
        assert_eq!(config.lock_mode, LockMode::Cooperative);

        let args = parse(&["--config", &config_arg, "lock"]);
        let config = effective_config(&args);
        assert_eq!(config.world_dir, Some(PathBuf::from("/from/config")));
        assert_eq!(config.lock_mode, LockMode::Observe);
    }

    #[test]
    fn chunk_accepts_negative_coordinates() {
        let args = parse(&["chunk", "-3", "-70", "--json"]);
        match args.command {
            Command::Chunk { x, z, json } => {
                assert_eq!((x, z), (-3, -70));
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn missing_world_dir_is_an_error() {
        let err = world_dir(&CliConfig::default()).unwrap_err();
        assert!(err.to_string().contains("--world"));
    }

    #[test]
    fn metadata_description_lists_seed_and_spawn() {
        let text = describe_metadata(&WorldMetadata {
            random_seed: 42,
            spawn_y: 64,
            last_played: 0,
            ..WorldMetadata::default()
        });
        assert!(text.contains("RandomSeed: 42"));
        assert!(text.contains("Spawn: 0 64 0"));
        assert!(text.contains("1970-01-01T00:00:00+00:00"));
    }
}
