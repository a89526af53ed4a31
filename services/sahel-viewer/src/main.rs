//! Sahel map viewer CLI.
//!
//! Renders single years, plays year-to-year transitions into PNG frames
//! and prints the statistics panel as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use map_view::ViewConfig;
use raster_store::{AssetLocation, RasterFormat, StoreConfig};
use sahel_common::{DataType, Year};
use sahel_viewer::{animate, render, stats, Pacing};

#[derive(Parser, Debug)]
#[command(name = "sahel-viewer")]
#[command(about = "Render and animate Sahel land cover, vegetation, precipitation and population rasters")]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "SAHEL_JSON_LOGS")]
    json_logs: bool,

    /// Number of tokio worker threads (defaults to CPU count)
    #[arg(long, env = "TOKIO_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Local directory holding the raster assets
    #[arg(long, env = "SAHEL_ASSET_DIR")]
    asset_dir: Option<PathBuf>,

    /// Base URL of the raster assets (wins over --asset-dir)
    #[arg(long, env = "SAHEL_ASSET_URL")]
    asset_url: Option<String>,

    /// Asset encoding: geotiff or json
    #[arg(long, env = "SAHEL_RASTER_FORMAT")]
    format: Option<String>,

    /// Transition length in milliseconds
    #[arg(long, env = "SAHEL_TRANSITION_MS")]
    transition_ms: Option<u64>,

    /// Seed for the reveal pattern
    #[arg(long, env = "SAHEL_SEED")]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Paint one year (fractional years interpolate) to a PNG
    Render {
        #[arg(long, default_value = "landCover")]
        data_type: DataType,
        #[arg(long)]
        year: f64,
        #[arg(long, short, default_value = "sahel.png")]
        output: PathBuf,
    },
    /// Play transitions between consecutive years into PNG frames
    Animate {
        #[arg(long, default_value = "landCover")]
        data_type: DataType,
        #[arg(long)]
        from: Year,
        #[arg(long)]
        to: Year,
        #[arg(long, default_value = "30")]
        fps: u32,
        #[arg(long, default_value = "frames")]
        out_dir: PathBuf,
        /// Pace frames on the wall clock instead of a fixed step
        #[arg(long)]
        realtime: bool,
    },
    /// Print the statistics for one year as JSON
    Stats {
        #[arg(long, default_value = "landCover")]
        data_type: DataType,
        #[arg(long)]
        year: f64,
    },
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime = tokio::runtime::Builder::new_multi_thread();
    runtime.enable_all();
    if let Some(threads) = args.worker_threads {
        runtime.worker_threads(threads);
    }
    let runtime = runtime.build().context("Failed to build tokio runtime")?;

    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    // Logs go to stderr so stdout stays clean for JSON output
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let store = store_config(&args);
    let view = view_config(&args);
    info!(command = ?args.command, "Starting sahel-viewer");

    match args.command {
        Command::Render {
            data_type,
            year,
            output,
        } => {
            let record = render(store, view, data_type, year, &output).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Animate {
            data_type,
            from,
            to,
            fps,
            out_dir,
            realtime,
        } => {
            let pacing = if realtime {
                Pacing::Realtime { fps }
            } else {
                Pacing::Stepped { fps }
            };
            let summary = animate(store, view, data_type, from, to, pacing, &out_dir).await?;
            info!(
                frames = summary.frames_written,
                out_dir = %summary.out_dir.display(),
                "Animation written"
            );
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Stats { data_type, year } => {
            let record = stats(store, view, data_type, year).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(())
}

fn store_config(args: &Args) -> StoreConfig {
    let mut config = StoreConfig::from_env();
    if let Some(dir) = &args.asset_dir {
        config.location = AssetLocation::Directory(dir.clone());
    }
    if let Some(url) = &args.asset_url {
        config.location = AssetLocation::Url(url.clone());
    }
    if let Some(format) = &args.format {
        config.format = RasterFormat::from_str(format);
    }
    config
}

fn view_config(args: &Args) -> ViewConfig {
    let mut config = ViewConfig::from_env();
    if let Some(ms) = args.transition_ms {
        config.transition_ms = ms;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config
}
