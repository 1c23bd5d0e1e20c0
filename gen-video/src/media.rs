//! Pairing of still images with their narration audio chunks by base name.

use crate::naming::parse_chunk_stem;
use anyhow::{Context, Result};
use log::{debug, info};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Image extension picked up from the images directory.
pub const IMAGE_EXTENSION: &str = "png";

/// Audio extension picked up from the audio directory.
pub const AUDIO_EXTENSION: &str = "wav";

/// Conditions that stop video assembly.
#[derive(Debug, Error)]
pub enum PairingError {
    #[error("Directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("No matching (png, wav) pairs found in {} and {}", .images_dir.display(), .audios_dir.display())]
    NoMatches {
        images_dir: PathBuf,
        audios_dir: PathBuf,
    },
}

/// One audio file belonging to a base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    /// Chunk index recovered from the `-NN` suffix, 0 when absent
    pub index: u32,
    pub path: PathBuf,
}

/// Audio chunks grouped by base name, each group in playback order.
pub type AudioGroups = BTreeMap<String, Vec<AudioChunk>>;

/// An image together with the audio chunks narrated over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPair {
    pub base_name: String,
    pub image: PathBuf,
    /// Sorted by ascending index
    pub audio: Vec<AudioChunk>,
}

/// Case-insensitive ordering with the exact string as tie-break.
fn cmp_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Files in `dir` whose extension matches `extension` (ASCII case-insensitive).
fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PairingError::MissingDirectory(dir.to_path_buf()).into());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        let matches = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches && path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| {
        cmp_names(
            &a.file_name().unwrap_or_default().to_string_lossy(),
            &b.file_name().unwrap_or_default().to_string_lossy(),
        )
    });
    Ok(files)
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

/// Key every image in `images_dir` by its full file stem.
pub fn scan_images(images_dir: &Path) -> Result<HashMap<String, PathBuf>> {
    let images = list_files(images_dir, IMAGE_EXTENSION)?
        .into_iter()
        .map(|path| (stem_of(&path), path))
        .collect();
    Ok(images)
}

/// Group the audio files in `audios_dir` by base name.
///
/// `intro.wav`, `intro-01.wav` and `intro-02.wav` all land under `intro`,
/// ordered by index with the unsuffixed file first.
pub fn scan_audio_groups(audios_dir: &Path) -> Result<AudioGroups> {
    let mut groups = AudioGroups::new();

    for path in list_files(audios_dir, AUDIO_EXTENSION)? {
        let stem = stem_of(&path);
        let (base, index) = parse_chunk_stem(&stem);
        groups
            .entry(base.to_string())
            .or_default()
            .push(AudioChunk { index, path });
    }

    for chunks in groups.values_mut() {
        chunks.sort_by(|a, b| {
            a.index.cmp(&b.index).then_with(|| {
                cmp_names(
                    &a.path.file_name().unwrap_or_default().to_string_lossy(),
                    &b.path.file_name().unwrap_or_default().to_string_lossy(),
                )
            })
        });
    }

    Ok(groups)
}

/// Match images with audio groups.
///
/// Only base names present on both sides are returned, ordered
/// case-insensitively by base name. Unmatched files are ignored.
pub fn match_pairs(images: &HashMap<String, PathBuf>, groups: &AudioGroups) -> Vec<MatchedPair> {
    let mut pairs: Vec<MatchedPair> = groups
        .iter()
        .filter_map(|(base, audio)| {
            let image = images.get(base)?;
            Some(MatchedPair {
                base_name: base.clone(),
                image: image.clone(),
                audio: audio.clone(),
            })
        })
        .collect();

    pairs.sort_by(|a, b| cmp_names(&a.base_name, &b.base_name));
    pairs
}

/// Scan both directories and pair images with their audio chunks.
///
/// # Errors
/// [`PairingError::MissingDirectory`] if either directory is absent and
/// [`PairingError::NoMatches`] if no base name has both an image and audio.
pub fn pair(images_dir: &Path, audios_dir: &Path) -> Result<Vec<MatchedPair>> {
    let images = scan_images(images_dir)?;
    let groups = scan_audio_groups(audios_dir)?;
    debug!(
        "Found {} image(s) and {} audio group(s)",
        images.len(),
        groups.len()
    );

    let pairs = match_pairs(&images, &groups);
    if pairs.is_empty() {
        return Err(PairingError::NoMatches {
            images_dir: images_dir.to_path_buf(),
            audios_dir: audios_dir.to_path_buf(),
        }
        .into());
    }

    info!("Found {} matching image/audio base names", pairs.len());
    Ok(pairs)
}
