//! The viewer's subcommands.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use map_view::ViewConfig;
use raster_store::StoreConfig;
use renderer::StatsRecord;
use sahel_common::{DataType, Year};

use crate::{write_canvas, Pacing, Session};

/// Outcome of an `animate` run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationSummary {
    pub frames_written: usize,
    pub out_dir: PathBuf,
    /// Statistics of each year's final frame, in playback order.
    pub stats: Vec<StatsRecord>,
}

/// Paint one (possibly fractional) year and write it to `output`.
pub async fn render(
    store: StoreConfig,
    view: ViewConfig,
    data_type: DataType,
    year: f64,
    output: &Path,
) -> Result<StatsRecord> {
    let mut session = open_settled(store, view, data_type, year).await?;
    let record = current_stats(&session, data_type, year)?;

    write_canvas(&session.view, output)?;
    info!(output = %output.display(), effective_year = record.year, "Rendered");
    session.log_cache_stats();
    session.view.dispose();
    Ok(record)
}

/// Statistics for one (possibly fractional) year, without writing images.
pub async fn stats(
    store: StoreConfig,
    view: ViewConfig,
    data_type: DataType,
    year: f64,
) -> Result<StatsRecord> {
    let mut session = open_settled(store, view, data_type, year).await?;
    let record = current_stats(&session, data_type, year)?;
    session.view.dispose();
    Ok(record)
}

/// Play year-to-year transitions from `from` to `to` (either direction),
/// writing every painted frame as `frame_NNNNN.png` into `out_dir`.
pub async fn animate(
    store: StoreConfig,
    view: ViewConfig,
    data_type: DataType,
    from: Year,
    to: Year,
    pacing: Pacing,
    out_dir: &Path,
) -> Result<AnimationSummary> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let view = ViewConfig {
        initial_data_type: data_type,
        initial_year: from,
        ..view
    };
    let mut session = Session::open(store, view, pacing)?;
    let report = session.view.select_data_type(data_type).await?;
    if !report.is_complete() {
        warn!(failed = report.failed.len(), "Some years could not be loaded");
    }

    let mut index = 0usize;
    let mut stats = Vec::new();
    let mut write_frame = |view: &map_view::MapView| -> Result<()> {
        if write_canvas(view, &frame_path(out_dir, index))? {
            index += 1;
        }
        Ok(())
    };

    write_frame(&session.view)?;
    stats.extend(session.view.last_stats().cloned());

    for year in playback_years(from, to).into_iter().skip(1) {
        session.view.select_year(year as f64)?;
        let frames = session.run_frames(&mut write_frame).await?;
        info!(year, frames, "Transition played");
        stats.extend(session.view.last_stats().cloned());
    }

    session.log_cache_stats();
    session.view.dispose();

    if index == 0 {
        bail!("No {} rasters available between {} and {}", data_type, from, to);
    }
    Ok(AnimationSummary {
        frames_written: index,
        out_dir: out_dir.to_path_buf(),
        stats,
    })
}

/// Open a session with instant transitions and settle on `year`.
async fn open_settled(
    store: StoreConfig,
    view: ViewConfig,
    data_type: DataType,
    year: f64,
) -> Result<Session> {
    let view = ViewConfig {
        transition_ms: 0,
        initial_data_type: data_type,
        initial_year: year.floor() as Year,
        ..view
    };
    let mut session = Session::open(store, view, Pacing::Stepped { fps: 1 })?;

    let report = session.view.select_data_type(data_type).await?;
    if !report.is_complete() {
        warn!(failed = report.failed.len(), "Some years could not be loaded");
    }

    session.view.select_year(year)?;
    session.run_frames(|_| Ok(())).await?;
    Ok(session)
}

fn current_stats(session: &Session, data_type: DataType, year: f64) -> Result<StatsRecord> {
    match session.view.last_stats() {
        Some(record) => Ok(record.clone()),
        None => bail!("No {} raster available for {}", data_type, year),
    }
}

fn playback_years(from: Year, to: Year) -> Vec<Year> {
    if from <= to {
        (from..=to).collect()
    } else {
        (to..=from).rev().collect()
    }
}

fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame_{:05}.png", index))
}
