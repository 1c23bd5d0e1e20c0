//! Narrated video assembly from paired image and audio sources.

pub mod encoder;
pub mod timeline;

pub use encoder::{EncodeOptions, FfmpegEncoder, TimelineEncoder};
pub use timeline::{assemble, Resolution};

use crate::media;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::info;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory layout and rendering settings for one video run.
#[derive(Debug, Clone)]
pub struct VideoJob {
    pub images_dir: PathBuf,
    pub audios_dir: PathBuf,
    pub finals_dir: PathBuf,
    /// Output file name pattern with an optional `{timestamp}` token
    pub filename_pattern: String,
    pub resolution: Resolution,
    pub lead_in: Duration,
    pub options: EncodeOptions,
}

impl VideoJob {
    /// Standard layout under `root_dir`: `image_sources/`, `audio_sources/`
    /// and `final_video/`.
    pub fn from_root(
        root_dir: &Path,
        filename_pattern: impl Into<String>,
        resolution: Resolution,
        lead_in: Duration,
        options: EncodeOptions,
    ) -> Self {
        Self {
            images_dir: root_dir.join("image_sources"),
            audios_dir: root_dir.join("audio_sources"),
            finals_dir: root_dir.join("final_video"),
            filename_pattern: filename_pattern.into(),
            resolution,
            lead_in,
            options,
        }
    }
}

/// Expand `{timestamp}` in `pattern` as `YYYYMMDD_HHMMSS`.
pub fn render_filename(pattern: &str, now: DateTime<Local>) -> String {
    pattern.replace("{timestamp}", &now.format("%Y%m%d_%H%M%S").to_string())
}

/// Pair, assemble and encode a video.
///
/// The result goes to `output_path` when given, otherwise to
/// `finals_dir/<rendered filename_pattern>`.
///
/// # Returns
/// The path of the written video.
pub fn create_video(
    job: &VideoJob,
    encoder: &dyn TimelineEncoder,
    output_path: Option<&Path>,
) -> Result<PathBuf> {
    let pairs = media::pair(&job.images_dir, &job.audios_dir)?;
    let timeline = assemble(&pairs, job.resolution, job.lead_in)?;
    info!(
        "Assembling final video: {} clip(s), {:.1}s",
        timeline.clips.len(),
        timeline.total_duration().as_secs_f64()
    );

    let output_path = match output_path {
        Some(path) => path.to_path_buf(),
        None => job
            .finals_dir
            .join(render_filename(&job.filename_pattern, Local::now())),
    };
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    info!("Writing final video to {}", output_path.display());
    encoder
        .encode(&timeline, &output_path, &job.options)
        .context("Failed to encode video")?;

    Ok(output_path)
}
