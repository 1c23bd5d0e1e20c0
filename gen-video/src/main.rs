//! gen-video - Turn text and still images into a narrated video

mod config;
mod media;
mod naming;
mod synth;
mod text;
mod tts;
mod video;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Settings, DEFAULT_SETTINGS_PATH};
use env_logger::Env;
use log::{debug, info};
use std::path::PathBuf;
use synth::Synthesizer;
use video::{FfmpegEncoder, VideoJob};

#[derive(Parser, Debug)]
#[command(name = "gen-video")]
#[command(about = "Turn text and still images into a narrated video", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the settings file
    #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
    settings: PathBuf,

    /// Synthesize audio for every text file in the text sources directory
    #[arg(long, default_value_t = false)]
    synthesize: bool,

    /// Pair images with audio and render the final video
    #[arg(long, default_value_t = false)]
    make_video: bool,

    /// Output video path (default: <root_dir>/final_video/<filename_pattern>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let settings = Settings::load(&args.settings).context("Failed to load settings")?;
    debug!("Settings: {:?}", settings);

    if !args.synthesize && !args.make_video {
        info!("Nothing to do. Pass --synthesize and/or --make-video.");
        return Ok(());
    }

    if args.synthesize {
        run_synthesis(&settings).await?;
    }

    if args.make_video {
        let output = run_video(&settings, args.output.as_deref())?;
        println!("Final video written to: {}", output.display());
    }

    Ok(())
}

async fn run_synthesis(settings: &Settings) -> Result<()> {
    let tts = &settings.tts;
    let params = tts.generation_params();

    let model = tts::create_model(&tts.device_preference())?;
    info!("Using TTS device: {}", model.device());

    let written = Synthesizer::new(model.as_ref(), params)
        .with_progress(true)
        .synthesize_directory(
            &settings.paths.text_sources_dir,
            &settings.paths.audio_sources_dir,
            tts.max_words,
            synth::DEFAULT_SUFFIX,
        )
        .await?;

    info!("Synthesis finished: {} file(s) written", written.len());
    Ok(())
}

fn run_video(settings: &Settings, output: Option<&std::path::Path>) -> Result<PathBuf> {
    let video = &settings.video;
    let job = VideoJob::from_root(
        &settings.paths.root_dir,
        video.filename_pattern.clone(),
        video.resolution(),
        video.lead_in(),
        video.encode_options(),
    );
    let encoder = FfmpegEncoder::new(video.ffmpeg.clone(), video.background.clone());

    video::create_video(&job, &encoder, output)
}
