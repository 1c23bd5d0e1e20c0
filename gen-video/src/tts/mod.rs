//! Speech model trait, generation parameters and compute device selection.

// Device probing and waveform construction only have callers in the model backends.
#![cfg_attr(not(feature = "chatterbox"), allow(dead_code))]

#[cfg(feature = "chatterbox")]
pub mod chatterbox;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::warn;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Generation controls passed through to the speech model untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Reference voice recording for cloning; `None` uses the model's default voice
    pub voice_prompt: Option<PathBuf>,
    /// Classifier-free guidance weight (pacing)
    pub cfg_weight: f32,
    /// Expressiveness/exaggeration
    pub exaggeration: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            voice_prompt: None,
            cfg_weight: 0.5,
            exaggeration: 0.5,
        }
    }
}

impl GenerationParams {
    /// Create generation parameters with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reference voice path.
    pub fn with_voice_prompt(mut self, path: impl Into<PathBuf>) -> Self {
        self.voice_prompt = Some(path.into());
        self
    }

    /// Set the CFG weight.
    pub fn with_cfg_weight(mut self, cfg_weight: f32) -> Self {
        self.cfg_weight = cfg_weight;
        self
    }

    /// Set the exaggeration level.
    pub fn with_exaggeration(mut self, exaggeration: f32) -> Self {
        self.exaggeration = exaggeration;
        self
    }
}

/// Raw audio returned by a speech model.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// Interleaved samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Waveform {
    /// Create a single-channel waveform.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
        }
    }

    /// Playback length of the waveform.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 || self.channels == 0 {
            return Duration::ZERO;
        }
        let frames = self.samples.len() as f64 / f64::from(self.channels);
        Duration::from_secs_f64(frames / f64::from(self.sample_rate))
    }

    /// Write the waveform as a 32-bit float WAV file, creating parent directories.
    pub fn write_wav(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };

        let mut writer = hound::WavWriter::create(path, spec)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer
            .finalize()
            .with_context(|| format!("Failed to finalize {}", path.display()))?;

        Ok(())
    }
}

/// Speech model trait - every TTS engine implements this.
#[async_trait]
pub trait SpeechModel: Send + Sync {
    /// Generate speech for `text`.
    async fn generate(&self, text: &str, params: &GenerationParams) -> Result<Waveform>;

    /// Device the model runs on (cuda, mps, cpu, ...).
    fn device(&self) -> &str;
}

/// Requested compute device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevicePreference {
    /// Pick the first available accelerator, falling back to CPU
    Auto,
    /// Use the named device as-is
    Explicit(String),
}

impl DevicePreference {
    /// Parse a configured device name. Empty and "auto" mean auto-detect.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("auto") {
            DevicePreference::Auto
        } else {
            DevicePreference::Explicit(value.to_string())
        }
    }
}

/// Reports which accelerators the runtime can use.
pub trait DeviceProbe {
    fn cuda_available(&self) -> bool;
    fn mps_available(&self) -> bool;
}

/// Resolve a device preference to a concrete device name.
pub fn select_device(preference: &DevicePreference, probe: &dyn DeviceProbe) -> String {
    match preference {
        DevicePreference::Explicit(name) => name.clone(),
        DevicePreference::Auto => {
            if probe.cuda_available() {
                "cuda".to_string()
            } else if probe.mps_available() {
                "mps".to_string()
            } else {
                "cpu".to_string()
            }
        }
    }
}

/// Check a configured voice prompt.
///
/// A missing file is not fatal: it is reported and the default voice is used.
pub fn resolve_voice_prompt(path: Option<&Path>) -> Option<PathBuf> {
    let path = path?;
    if path.exists() {
        Some(path.to_path_buf())
    } else {
        warn!(
            "Configured voice_prompt_path does not exist: {} (using default voice)",
            path.display()
        );
        None
    }
}

/// Create the speech model for the requested device.
#[cfg(feature = "chatterbox")]
pub fn create_model(device: &DevicePreference) -> Result<Box<dyn SpeechModel>> {
    Ok(Box::new(chatterbox::ChatterboxModel::new(device)?))
}

/// Create the speech model for the requested device.
#[cfg(not(feature = "chatterbox"))]
pub fn create_model(_device: &DevicePreference) -> Result<Box<dyn SpeechModel>> {
    anyhow::bail!(
        "gen-video was built without a speech model. Rebuild with `--features chatterbox`."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FakeProbe {
        cuda: bool,
        mps: bool,
    }

    impl DeviceProbe for FakeProbe {
        fn cuda_available(&self) -> bool {
            self.cuda
        }

        fn mps_available(&self) -> bool {
            self.mps
        }
    }

    #[test]
    fn test_generation_params_default() {
        let params = GenerationParams::default();
        assert_eq!(params.cfg_weight, 0.5);
        assert_eq!(params.exaggeration, 0.5);
        assert!(params.voice_prompt.is_none());
    }

    #[test]
    fn test_generation_params_builder() {
        let params = GenerationParams::new()
            .with_cfg_weight(0.3)
            .with_exaggeration(0.7)
            .with_voice_prompt("/path/to/voice.wav");

        assert_eq!(params.cfg_weight, 0.3);
        assert_eq!(params.exaggeration, 0.7);
        assert_eq!(params.voice_prompt, Some(PathBuf::from("/path/to/voice.wav")));
    }

    #[test]
    fn test_device_preference_parse() {
        assert_eq!(DevicePreference::parse("auto"), DevicePreference::Auto);
        assert_eq!(DevicePreference::parse(" AUTO "), DevicePreference::Auto);
        assert_eq!(DevicePreference::parse(""), DevicePreference::Auto);
        assert_eq!(
            DevicePreference::parse("cuda:1"),
            DevicePreference::Explicit("cuda:1".to_string())
        );
    }

    #[test]
    fn test_auto_prefers_cuda_then_mps_then_cpu() {
        let auto = DevicePreference::Auto;
        let both = FakeProbe { cuda: true, mps: true };
        let mps_only = FakeProbe { cuda: false, mps: true };
        let none = FakeProbe { cuda: false, mps: false };

        assert_eq!(select_device(&auto, &both), "cuda");
        assert_eq!(select_device(&auto, &mps_only), "mps");
        assert_eq!(select_device(&auto, &none), "cpu");
    }

    #[test]
    fn test_explicit_device_ignores_probe() {
        let probe = FakeProbe { cuda: true, mps: true };
        let pref = DevicePreference::Explicit("cpu".to_string());
        assert_eq!(select_device(&pref, &probe), "cpu");
    }

    #[test]
    fn test_missing_voice_prompt_falls_back_to_default() {
        let missing = Path::new("/definitely/not/here/voice.wav");
        assert_eq!(resolve_voice_prompt(Some(missing)), None);
        assert_eq!(resolve_voice_prompt(None), None);
    }

    #[test]
    fn test_existing_voice_prompt_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let voice = temp_dir.path().join("voice.wav");
        std::fs::write(&voice, b"RIFF").unwrap();
        assert_eq!(resolve_voice_prompt(Some(&voice)), Some(voice));
    }

    #[test]
    fn test_waveform_duration() {
        let wave = Waveform::mono(vec![0.0; 48_000], 24_000);
        assert_eq!(wave.duration(), Duration::from_secs(2));

        let stereo = Waveform {
            samples: vec![0.0; 48_000],
            sample_rate: 24_000,
            channels: 2,
        };
        assert_eq!(stereo.duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_write_wav_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("out.wav");
        let wave = Waveform::mono(vec![0.0, 0.5, -0.5, 0.25], 16_000);

        wave.write_wav(&path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_format, hound::SampleFormat::Float);
        assert_eq!(reader.len(), 4);
    }
}
