//! Directory-level speech synthesis: chunk text files and write one WAV per chunk.

use crate::naming::chunk_file_name;
use crate::text::chunk_document;
use crate::tts::{GenerationParams, SpeechModel};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default extension for synthesized audio.
pub const DEFAULT_SUFFIX: &str = ".wav";

/// Errors the synthesis driver reports before doing any work.
#[derive(Debug, Error)]
pub enum SynthError {
    #[error("Text directory not found: {}", .0.display())]
    MissingTextDir(PathBuf),
}

/// Turns directories of text files into speech audio.
pub struct Synthesizer<'a> {
    model: &'a dyn SpeechModel,
    params: GenerationParams,
    show_progress: bool,
}

impl<'a> Synthesizer<'a> {
    /// Create a synthesizer backed by `model`.
    pub fn new(model: &'a dyn SpeechModel, params: GenerationParams) -> Self {
        Self {
            model,
            params,
            show_progress: false,
        }
    }

    /// Show a progress bar per text file.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Generate speech for `text` and save it as WAV at `output_path`.
    pub async fn synthesize_to_file(&self, text: &str, output_path: &Path) -> Result<PathBuf> {
        info!(
            "Synthesizing {} words into {}",
            text.split_whitespace().count(),
            output_path.display()
        );
        debug!("Chunk text: {}", text);

        let waveform = self
            .model
            .generate(text, &self.params)
            .await
            .with_context(|| format!("Speech generation failed for {}", output_path.display()))?;

        waveform.write_wav(output_path)?;
        debug!(
            "Wrote {:.2}s of audio to {}",
            waveform.duration().as_secs_f64(),
            output_path.display()
        );

        Ok(output_path.to_path_buf())
    }

    /// Convert every `*.txt` file in `text_dir` into audio files in `output_dir`.
    ///
    /// A text that fits in one chunk becomes `{stem}{suffix}`; longer texts
    /// become `{stem}-01{suffix}`, `{stem}-02{suffix}`, ... Outputs that are
    /// at least as new as their text file are left alone.
    ///
    /// # Returns
    /// Paths of the files written during this call, in generation order.
    pub async fn synthesize_directory(
        &self,
        text_dir: &Path,
        output_dir: &Path,
        max_words: usize,
        suffix: &str,
    ) -> Result<Vec<PathBuf>> {
        if !text_dir.is_dir() {
            return Err(SynthError::MissingTextDir(text_dir.to_path_buf()).into());
        }

        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        let text_files = list_text_files(text_dir)?;
        if text_files.is_empty() {
            warn!("No .txt files found in {}", text_dir.display());
            return Ok(Vec::new());
        }

        let mut generated = Vec::new();

        for txt_path in &text_files {
            let file_name = txt_path.file_name().unwrap_or_default().to_string_lossy();
            let text = fs::read_to_string(txt_path)
                .with_context(|| format!("Failed to read {}", txt_path.display()))?;
            let text = text.trim();
            if text.is_empty() {
                warn!("Skipping empty file: {}", file_name);
                continue;
            }

            let chunks = chunk_document(text, max_words);
            info!("{}: split into {} chunk(s)", file_name, chunks.len());

            let stem = txt_path.file_stem().unwrap_or_default().to_string_lossy();
            let pb = self.progress_bar(chunks.len(), &file_name);

            for chunk in &chunks {
                let out_path = output_dir.join(chunk_file_name(&stem, chunk.position, suffix));

                if is_up_to_date(txt_path, &out_path) {
                    info!("Skipping up-to-date file: {}", out_path.display());
                    pb.inc(1);
                    continue;
                }
                if out_path.exists() {
                    info!(
                        "Regenerating audio because text is newer: {}",
                        out_path.display()
                    );
                }

                debug!("Chunk {:?} of {}: {} words", chunk.position, file_name, chunk.word_count());
                self.synthesize_to_file(&chunk.text, &out_path).await?;
                match chunk.position {
                    Some(n) => info!(
                        "Generated chunk {:02} for {}: {}",
                        n,
                        file_name,
                        out_path.display()
                    ),
                    None => info!("Generated: {}", out_path.display()),
                }
                generated.push(out_path);
                pb.inc(1);
            }

            pb.finish_and_clear();
        }

        Ok(generated)
    }

    fn progress_bar(&self, len: usize, label: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(label.to_string());
        pb
    }
}

/// All `*.txt` files directly inside `dir`, sorted by file name.
fn list_text_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        let is_txt = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if is_txt && path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Whether `output` exists and was modified no earlier than `source`.
///
/// Any missing file or unreadable timestamp counts as stale.
pub fn is_up_to_date(source: &Path, output: &Path) -> bool {
    let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified());

    match (modified(source), modified(output)) {
        (Ok(source_time), Ok(output_time)) => source_time <= output_time,
        _ => false,
    }
}
