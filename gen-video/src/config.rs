//! gen-video settings file.

use crate::text::DEFAULT_MAX_WORDS;
use crate::tts::{DevicePreference, GenerationParams};
use crate::video::timeline::DEFAULT_LEAD_IN;
use crate::video::{EncodeOptions, Resolution};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default settings file location.
pub const DEFAULT_SETTINGS_PATH: &str = "settings.toml";

// Default values for Chatterbox TTS
const DEFAULT_CFG_WEIGHT: f32 = 0.5;
const DEFAULT_EXAGGERATION: f32 = 0.5;

/// All settings, loaded once per run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathSettings,

    #[serde(default)]
    pub tts: TtsSettings,

    #[serde(default)]
    pub video: VideoSettings,
}

/// Source and output directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root holding image_sources/, audio_sources/ and final_video/
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// Text files to synthesize
    #[serde(default = "default_text_sources_dir")]
    pub text_sources_dir: PathBuf,

    /// Where synthesized audio is written
    #[serde(default = "default_audio_sources_dir")]
    pub audio_sources_dir: PathBuf,
}

fn default_root_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_text_sources_dir() -> PathBuf {
    PathBuf::from("data/text_sources")
}

fn default_audio_sources_dir() -> PathBuf {
    PathBuf::from("data/audio_sources")
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            text_sources_dir: default_text_sources_dir(),
            audio_sources_dir: default_audio_sources_dir(),
        }
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsSettings {
    /// Device to use ("auto", "cuda", "mps", "cpu", ...)
    #[serde(default = "default_device")]
    pub device: String,

    /// Pacing/CFG weight
    #[serde(default = "default_cfg_weight")]
    pub cfg_weight: f32,

    /// Expressiveness/exaggeration
    #[serde(default = "default_exaggeration")]
    pub exaggeration: f32,

    /// Reference voice audio for cloning
    #[serde(default)]
    pub voice_prompt_path: Option<PathBuf>,

    /// Maximum words per synthesized chunk
    #[serde(default = "default_max_words")]
    pub max_words: usize,
}

fn default_device() -> String {
    "auto".to_string()
}

fn default_cfg_weight() -> f32 {
    DEFAULT_CFG_WEIGHT
}

fn default_exaggeration() -> f32 {
    DEFAULT_EXAGGERATION
}

fn default_max_words() -> usize {
    DEFAULT_MAX_WORDS
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            device: default_device(),
            cfg_weight: default_cfg_weight(),
            exaggeration: default_exaggeration(),
            voice_prompt_path: None,
            max_words: default_max_words(),
        }
    }
}

impl TtsSettings {
    pub fn device_preference(&self) -> DevicePreference {
        DevicePreference::parse(&self.device)
    }

    /// Generation parameters, with the voice prompt already checked on disk.
    pub fn generation_params(&self) -> GenerationParams {
        let params = GenerationParams::new()
            .with_cfg_weight(self.cfg_weight)
            .with_exaggeration(self.exaggeration);

        match crate::tts::resolve_voice_prompt(self.voice_prompt_path.as_deref()) {
            Some(voice) => params.with_voice_prompt(voice),
            None => params,
        }
    }
}

/// Video assembly and encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSettings {
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Output frame size as [width, height]
    #[serde(default = "default_resolution")]
    pub resolution: [u32; 2],

    #[serde(default = "default_codec")]
    pub codec: String,

    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Video bitrate (e.g. "4000k"); encoder default when unset
    #[serde(default)]
    pub bitrate: Option<String>,

    /// Output file name; `{timestamp}` is replaced with the current time
    #[serde(default = "default_filename_pattern")]
    pub filename_pattern: String,

    /// Silence before each clip's narration, in seconds
    #[serde(default = "default_lead_in_secs")]
    pub lead_in_secs: f64,

    /// Letterbox colour (any FFmpeg colour name or hex value)
    #[serde(default = "default_background")]
    pub background: String,

    /// FFmpeg executable
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,
}

fn default_fps() -> u32 {
    24
}

fn default_resolution() -> [u32; 2] {
    [1280, 720]
}

fn default_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_filename_pattern() -> String {
    "final_{timestamp}.mp4".to_string()
}

fn default_lead_in_secs() -> f64 {
    DEFAULT_LEAD_IN.as_secs_f64()
}

fn default_background() -> String {
    "black".to_string()
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            resolution: default_resolution(),
            codec: default_codec(),
            audio_codec: default_audio_codec(),
            bitrate: None,
            filename_pattern: default_filename_pattern(),
            lead_in_secs: default_lead_in_secs(),
            background: default_background(),
            ffmpeg: default_ffmpeg(),
        }
    }
}

impl VideoSettings {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.resolution[0], self.resolution[1])
    }

    /// Lead-in as a duration; negative or non-finite values become zero.
    pub fn lead_in(&self) -> Duration {
        Duration::try_from_secs_f64(self.lead_in_secs).unwrap_or(Duration::ZERO)
    }

    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            codec: self.codec.clone(),
            audio_codec: self.audio_codec.clone(),
            fps: self.fps,
            bitrate: self.bitrate.clone().filter(|b| !b.trim().is_empty()),
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Settings file not found: {}", path.display());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse settings from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        if settings.video.resolution.contains(&0) {
            anyhow::bail!("video.resolution must be non-zero, got {:?}", settings.video.resolution);
        }
        if settings.video.fps == 0 {
            anyhow::bail!("video.fps must be non-zero");
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.paths.root_dir, PathBuf::from("data"));
        assert_eq!(settings.tts.device, "auto");
        assert_eq!(settings.tts.cfg_weight, 0.5);
        assert_eq!(settings.tts.exaggeration, 0.5);
        assert_eq!(settings.tts.max_words, 100);
        assert!(settings.tts.voice_prompt_path.is_none());
        assert_eq!(settings.video.fps, 24);
        assert_eq!(settings.video.resolution, [1280, 720]);
        assert_eq!(settings.video.codec, "libx264");
        assert_eq!(settings.video.audio_codec, "aac");
        assert_eq!(settings.video.filename_pattern, "final_{timestamp}.mp4");
        assert_eq!(settings.video.lead_in(), Duration::from_secs(1));
    }

    #[test]
    fn test_parse_empty_settings() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings.paths.text_sources_dir, PathBuf::from("data/text_sources"));
        assert_eq!(settings.paths.audio_sources_dir, PathBuf::from("data/audio_sources"));
        assert_eq!(settings.video.fps, 24);
    }

    #[test]
    fn test_parse_settings() {
        let toml_str = r#"
[paths]
text_sources_dir = "in/text"
audio_sources_dir = "in/audio"

[tts]
device = "mps"
cfg_weight = 0.3
exaggeration = 0.7
voice_prompt_path = "/path/to/voice.wav"
max_words = 60

[video]
fps = 30
resolution = [1920, 1080]
codec = "libx265"
audio_codec = "libopus"
bitrate = "8000k"
filename_pattern = "talk_{timestamp}.mkv"
lead_in_secs = 0.5
"#;
        let settings = Settings::parse(toml_str).unwrap();
        assert_eq!(settings.paths.text_sources_dir, PathBuf::from("in/text"));
        assert_eq!(settings.paths.root_dir, PathBuf::from("data"));
        assert_eq!(
            settings.tts.device_preference(),
            DevicePreference::Explicit("mps".to_string())
        );
        assert_eq!(settings.tts.cfg_weight, 0.3);
        assert_eq!(settings.tts.exaggeration, 0.7);
        assert_eq!(
            settings.tts.voice_prompt_path,
            Some(PathBuf::from("/path/to/voice.wav"))
        );
        assert_eq!(settings.tts.max_words, 60);
        assert_eq!(settings.video.resolution(), Resolution::new(1920, 1080));
        assert_eq!(settings.video.lead_in(), Duration::from_millis(500));

        let opts = settings.video.encode_options();
        assert_eq!(opts.codec, "libx265");
        assert_eq!(opts.audio_codec, "libopus");
        assert_eq!(opts.fps, 30);
        assert_eq!(opts.bitrate.as_deref(), Some("8000k"));
    }

    #[test]
    fn test_missing_voice_prompt_is_dropped() {
        let settings = Settings::parse("[tts]\nvoice_prompt_path = \"/no/such/voice.wav\"\n").unwrap();
        let params = settings.tts.generation_params();
        assert!(params.voice_prompt.is_none());
        assert_eq!(params.cfg_weight, 0.5);
    }

    #[test]
    fn test_negative_lead_in_is_zero() {
        let settings = Settings::parse("[video]\nlead_in_secs = -2.0\n").unwrap();
        assert_eq!(settings.video.lead_in(), Duration::ZERO);
    }

    #[test]
    fn test_empty_bitrate_is_unset() {
        let settings = Settings::parse("[video]\nbitrate = \"\"\n").unwrap();
        assert!(settings.video.encode_options().bitrate.is_none());
    }

    #[test]
    fn test_zero_resolution_rejected() {
        assert!(Settings::parse("[video]\nresolution = [0, 720]\n").is_err());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let err = Settings::load(&temp_dir.path().join("settings.toml")).unwrap_err();
        assert!(err.to_string().contains("Settings file not found"));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        std::fs::write(&path, "[video]\nfps = 12\n").unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.video.fps, 12);
    }
}
