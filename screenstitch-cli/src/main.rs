use clap::Parser;
use screenstitch::io::{load_rgba, save_rgba};
use screenstitch::{Arena, BestScore, LimitedHost, SearchObserver, StitchConfig, Stitcher};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Screenstitch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output, including search progress.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct StitchConfigJson {
    level_floor: u32,
    max_levels: usize,
    flat_tolerance: u32,
}

impl Default for StitchConfigJson {
    fn default() -> Self {
        let cfg = StitchConfig::default();
        Self {
            level_floor: cfg.level_floor,
            max_levels: cfg.max_levels,
            flat_tolerance: cfg.flat_tolerance,
        }
    }
}

impl From<StitchConfigJson> for StitchConfig {
    fn from(value: StitchConfigJson) -> Self {
        Self {
            level_floor: value.level_floor,
            max_levels: value.max_levels,
            flat_tolerance: value.flat_tolerance,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    image_a_path: String,
    image_b_path: String,
    output_path: String,
    result_path: Option<String>,
    memory_limit_bytes: Option<usize>,
    stitch: StitchConfigJson,
}

#[derive(Debug, Serialize)]
struct Output {
    offset_x: i32,
    offset_y: i32,
    score: u64,
    width: usize,
    height: usize,
}

/// Logs remaining work and every improvement the search reports.
struct ProgressLog;

impl SearchObserver for ProgressLog {
    fn on_progress(&mut self, remaining: u64) {
        tracing::info!(remaining, "search progress");
    }

    fn on_best_score(&mut self, best: &BestScore) {
        tracing::debug!(
            level = best.level,
            x = best.offset_x,
            y = best.offset_y,
            score = best.score,
            "new best"
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("screenstitch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_a_path.is_empty() || config.image_b_path.is_empty() {
        return Err("image_a_path and image_b_path must be set in the config".into());
    }
    if config.output_path.is_empty() {
        return Err("output_path must be set in the config".into());
    }

    let arena = match config.memory_limit_bytes {
        Some(limit) => Arena::with_host(LimitedHost::new(limit)),
        None => Arena::new(),
    };
    let mut stitcher = Stitcher::with_arena(arena).with_config(config.stitch.into());

    let a = load_rgba(stitcher.arena_mut(), &config.image_a_path)?;
    let b = load_rgba(stitcher.arena_mut(), &config.image_b_path)?;
    let stitch = stitcher.find_overlap(&a, &b, &mut ProgressLog)?;
    save_rgba(stitcher.arena(), &stitch.image, &config.output_path)?;
    tracing::info!(
        used_bytes = stitcher.arena().used_bytes(),
        committed_bytes = stitcher.arena().committed_bytes(),
        "arena usage"
    );

    let output = Output {
        offset_x: stitch.offset_x,
        offset_y: stitch.offset_y,
        score: stitch.score,
        width: stitch.image.width(),
        height: stitch.image.height(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.result_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
