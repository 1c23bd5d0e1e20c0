//! Timeline assembly: one timed clip per audio chunk, in playback order.

use crate::media::MatchedPair;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Silence before the narration of each clip starts.
pub const DEFAULT_LEAD_IN: Duration = Duration::from_secs(1);

/// Output frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A still image shown while one audio chunk plays.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedClip {
    pub base_name: String,
    pub image: PathBuf,
    pub audio: PathBuf,
    pub audio_duration: Duration,
    /// Delay before the audio starts; the image is already visible
    pub lead_in: Duration,
}

impl TimedClip {
    /// Length of the clip: lead-in followed by the full audio.
    pub fn total_duration(&self) -> Duration {
        self.lead_in + self.audio_duration
    }
}

/// Clips to be played back to back.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub resolution: Resolution,
    pub clips: Vec<TimedClip>,
}

impl Timeline {
    /// Sum of all clip durations.
    pub fn total_duration(&self) -> Duration {
        self.clips.iter().map(TimedClip::total_duration).sum()
    }
}

/// Read the playback length of a WAV file from its header.
pub fn audio_duration(path: &Path) -> Result<Duration> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open audio file {}", path.display()))?;
    let sample_rate = reader.spec().sample_rate;
    if sample_rate == 0 {
        anyhow::bail!("Audio file has a zero sample rate: {}", path.display());
    }

    // `duration` counts frames, i.e. samples per channel.
    let frames = reader.duration();
    Ok(Duration::from_secs_f64(f64::from(frames) / f64::from(sample_rate)))
}

/// Build the concatenated timeline for the matched pairs.
///
/// Pairs keep their given order and each pair contributes one clip per audio
/// chunk in index order. Every clip lasts `lead_in + audio duration`.
pub fn assemble(pairs: &[MatchedPair], resolution: Resolution, lead_in: Duration) -> Result<Timeline> {
    let mut clips = Vec::new();

    for pair in pairs {
        info!(
            "Processing base '{}': image={}, audio_count={}",
            pair.base_name,
            pair.image.display(),
            pair.audio.len()
        );

        for chunk in &pair.audio {
            let audio_duration = audio_duration(&chunk.path)?;
            debug!(
                "   Clip: image={}, audio={} ({:.2}s)",
                pair.image.display(),
                chunk.path.display(),
                audio_duration.as_secs_f64()
            );

            clips.push(TimedClip {
                base_name: pair.base_name.clone(),
                image: pair.image.clone(),
                audio: chunk.path.clone(),
                audio_duration,
                lead_in,
            });
        }
    }

    Ok(Timeline { resolution, clips })
}
