//! Timeline rendering using FFmpeg.

use super::timeline::Timeline;
use anyhow::{Context, Result};
use log::{debug, info};
use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tempfile::TempDir;

/// Encoder settings for the final container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Video codec (e.g. libx264)
    pub codec: String,
    /// Audio codec (e.g. aac)
    pub audio_codec: String,
    pub fps: u32,
    /// Target video bitrate (e.g. "4000k"); codec default when `None`
    pub bitrate: Option<String>,
}

/// Writes an assembled timeline to a media file.
pub trait TimelineEncoder {
    fn encode(&self, timeline: &Timeline, output_path: &Path, options: &EncodeOptions) -> Result<()>;
}

/// Renders timelines with an FFmpeg filter graph.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    /// FFmpeg executable (name on PATH or full path)
    program: PathBuf,
    /// Colour filling the letterbox/pillarbox area
    background: String,
}

impl FfmpegEncoder {
    /// Create an encoder using `program` and a letterbox `background` colour.
    pub fn new(program: impl Into<PathBuf>, background: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            background: background.into(),
        }
    }

    /// Build the filter graph for `timeline`.
    ///
    /// Input `2i` is the looped image of clip `i` and input `2i + 1` its audio.
    /// Each image is scaled to fit the frame and centred on the background;
    /// each audio track is delayed by the lead-in and padded with silence to
    /// the clip length. All segments are concatenated into `[vout]`/`[aout]`.
    pub fn filter_graph(&self, timeline: &Timeline, fps: u32) -> String {
        let (w, h) = (timeline.resolution.width, timeline.resolution.height);
        let mut graph = String::new();

        for (i, clip) in timeline.clips.iter().enumerate() {
            let total = seconds(clip.total_duration());
            let delay_ms = clip.lead_in.as_millis();

            let _ = writeln!(
                graph,
                "[{img}:v]scale={w}:{h}:force_original_aspect_ratio=decrease,\
                 pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color={bg},setsar=1,fps={fps},\
                 format=yuv420p,trim=duration={total}[v{i}];",
                img = 2 * i,
                bg = self.background,
            );
            let _ = writeln!(
                graph,
                "[{aud}:a]aresample=48000,aformat=sample_fmts=fltp:channel_layouts=stereo,\
                 adelay={delay_ms}:all=1,apad,atrim=duration={total}[a{i}];",
                aud = 2 * i + 1,
            );
        }

        for i in 0..timeline.clips.len() {
            let _ = write!(graph, "[v{i}][a{i}]");
        }
        let _ = write!(
            graph,
            "concat=n={}:v=1:a=1[vout][aout]",
            timeline.clips.len()
        );

        graph
    }

    /// Build the FFmpeg argument list reading the filter graph from `script_path`.
    pub fn build_args(
        &self,
        timeline: &Timeline,
        script_path: &Path,
        output_path: &Path,
        options: &EncodeOptions,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-hide_banner".into()];

        for clip in &timeline.clips {
            let total = seconds(clip.total_duration());
            args.extend(["-loop".into(), "1".into()]);
            args.extend(["-framerate".into(), options.fps.to_string().into()]);
            args.extend(["-t".into(), total.into()]);
            args.extend(["-i".into(), clip.image.clone().into_os_string()]);
            args.extend(["-i".into(), clip.audio.clone().into_os_string()]);
        }

        args.extend(["-filter_complex_script".into(), script_path.as_os_str().to_owned()]);
        args.extend(["-map".into(), "[vout]".into(), "-map".into(), "[aout]".into()]);
        args.extend(["-c:v".into(), options.codec.clone().into()]);
        args.extend(["-c:a".into(), options.audio_codec.clone().into()]);
        args.extend(["-r".into(), options.fps.to_string().into()]);
        if let Some(bitrate) = &options.bitrate {
            args.extend(["-b:v".into(), bitrate.clone().into()]);
        }
        args.extend(["-pix_fmt".into(), "yuv420p".into()]);
        args.push(output_path.as_os_str().to_owned());

        args
    }
}

impl TimelineEncoder for FfmpegEncoder {
    fn encode(&self, timeline: &Timeline, output_path: &Path, options: &EncodeOptions) -> Result<()> {
        if timeline.clips.is_empty() {
            anyhow::bail!("Timeline has no clips");
        }

        // Intermediate files live here and are removed when it drops,
        // whether or not FFmpeg succeeds.
        let temp_dir = TempDir::new()?;
        let script_path = temp_dir.path().join("filter_graph.txt");
        std::fs::write(&script_path, self.filter_graph(timeline, options.fps))
            .context("Failed to write filter graph")?;

        info!(
            "Video write parameters: codec={}, audio_codec={}, fps={}, bitrate={}",
            options.codec,
            options.audio_codec,
            options.fps,
            options.bitrate.as_deref().unwrap_or("default")
        );
        let args = self.build_args(timeline, &script_path, output_path, options);
        debug!("Running {} with {} arguments", self.program.display(), args.len());

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .with_context(|| format!("Failed to run {}", self.program.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffmpeg video encoding failed: {}", stderr);
        }

        Ok(())
    }
}

/// Format a duration as seconds with millisecond precision.
fn seconds(duration: Duration) -> String {
    format!("{:.3}", duration.as_secs_f64())
}
