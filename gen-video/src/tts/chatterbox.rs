//! Chatterbox TTS model embedded through PyO3.
//!
//! Uses Chatterbox TTS from Resemble AI. The model is loaded once and reused
//! for every chunk; inference runs on a blocking thread so the runtime stays
//! responsive.

use super::{select_device, DevicePreference, DeviceProbe, GenerationParams, SpeechModel, Waveform};
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::sync::Arc;

/// Asks PyTorch which accelerators are usable.
struct TorchProbe;

impl TorchProbe {
    fn check(path: &[&str]) -> bool {
        Python::with_gil(|py| -> PyResult<bool> {
            let mut obj = py.import("torch")?.into_any();
            for attr in path {
                obj = obj.getattr(*attr)?;
            }
            obj.call_method0("is_available")?.extract::<bool>()
        })
        .unwrap_or(false)
    }
}

impl DeviceProbe for TorchProbe {
    fn cuda_available(&self) -> bool {
        Self::check(&["cuda"])
    }

    fn mps_available(&self) -> bool {
        Self::check(&["backends", "mps"])
    }
}

/// Chatterbox speech model.
pub struct ChatterboxModel {
    /// Device the model was loaded on
    device: String,
    /// Loaded `ChatterboxTTS` instance
    model: Arc<Py<PyAny>>,
    /// Output sample rate reported by the model
    sample_rate: u32,
}

impl ChatterboxModel {
    /// Load the pretrained model on the requested device.
    pub fn new(preference: &DevicePreference) -> Result<Self> {
        let device = select_device(preference, &TorchProbe);
        info!("Initializing Chatterbox on device: {}", device);

        let (model, sample_rate) = Python::with_gil(|py| -> Result<(Py<PyAny>, u32)> {
            let os = py.import("os")?;
            os.getattr("environ")?
                .set_item("PYTORCH_ENABLE_MPS_FALLBACK", "1")?;

            let chatterbox_tts = py
                .import("chatterbox.tts")
                .context("Failed to import chatterbox.tts; is chatterbox-tts installed?")?;
            let class = chatterbox_tts.getattr("ChatterboxTTS")?;

            let kwargs = PyDict::new(py);
            kwargs.set_item("device", &device)?;
            let model = class.call_method("from_pretrained", (), Some(&kwargs))?;

            let sample_rate: u32 = model
                .getattr("sr")
                .and_then(|sr| sr.extract())
                .unwrap_or(48_000);

            Ok((model.unbind(), sample_rate))
        })?;

        Ok(Self {
            device,
            model: Arc::new(model),
            sample_rate,
        })
    }

    fn generate_sync(
        model: &Py<PyAny>,
        device: &str,
        default_sample_rate: u32,
        text: &str,
        params: &GenerationParams,
    ) -> Result<Waveform> {
        Python::with_gil(|py| {
            let model = model.bind(py);

            let gen_kwargs = PyDict::new(py);
            if let Some(voice) = &params.voice_prompt {
                gen_kwargs.set_item("audio_prompt_path", voice.to_string_lossy().as_ref())?;
            }
            gen_kwargs.set_item("cfg_weight", params.cfg_weight)?;
            gen_kwargs.set_item("exaggeration", params.exaggeration)?;

            let wav = model.call_method("generate", (text,), Some(&gen_kwargs))?;

            // Tensor shape is (channels, samples); drop a leading singleton axis.
            let wav_np = wav
                .call_method0("detach")?
                .call_method0("cpu")?
                .call_method0("squeeze")?
                .call_method0("numpy")?;
            let ndim: usize = wav_np.getattr("ndim")?.extract()?;
            let (channels, interleaved) = if ndim == 2 {
                let channels: u16 = wav_np.getattr("shape")?.get_item(0)?.extract()?;
                (channels, wav_np.getattr("T")?.call_method0("flatten")?)
            } else {
                (1, wav_np)
            };
            let samples: Vec<f32> = interleaved.call_method0("tolist")?.extract()?;

            cleanup_memory(py, device)?;

            Ok(Waveform {
                samples,
                sample_rate: default_sample_rate,
                channels,
            })
        })
    }
}

/// Release cached accelerator memory between generations.
fn cleanup_memory(py: Python<'_>, device: &str) -> Result<()> {
    py.import("gc")?.call_method0("collect")?;

    let torch = py.import("torch")?;
    let cache = match device {
        "mps" => Some(torch.getattr("mps")?),
        d if d.starts_with("cuda") => Some(torch.getattr("cuda")?),
        _ => None,
    };
    if let Some(cache) = cache {
        if cache.hasattr("empty_cache")? {
            cache.call_method0("empty_cache")?;
        }
    }

    Ok(())
}

#[async_trait]
impl SpeechModel for ChatterboxModel {
    async fn generate(&self, text: &str, params: &GenerationParams) -> Result<Waveform> {
        let model = Arc::clone(&self.model);
        let device = self.device.clone();
        let sample_rate = self.sample_rate;
        let text = text.to_string();
        let params = params.clone();

        tokio::task::spawn_blocking(move || {
            Self::generate_sync(&model, &device, sample_rate, &text, &params)
        })
        .await
        .context("Task join error")?
    }

    fn device(&self) -> &str {
        &self.device
    }
}
