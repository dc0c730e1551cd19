use std::{error::Error, path::PathBuf, sync::Arc};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framecast::{
    AssembleOptions, AssumeYes, ConfirmOverwrite, DEFAULT_IMAGE_EXTENSION, ExtractOptions,
    ExtractOutcome, FfmpegLogLevel, FourCc, FrameBound, LinePrompt, ProgressCallback, ProgressInfo,
    VideoSource,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framecast video2image input.mp4 frames\n  framecast image2video frames output.mp4 30\n  framecast image2video frames output.mp4 24 --image_ext png --fourcc avc1\n  framecast probe input.mp4 --json\n  framecast completions zsh > _framecast";

#[derive(Debug, Parser)]
#[command(
    name = "framecast",
    version,
    about = "Process videos: split them into images and assemble images into videos",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Do not draw a progress bar.
    #[arg(long, global = true)]
    no_progress: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true, value_parser = parse_log_level)]
    log_level: Option<FfmpegLogLevel>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse a video into numbered images.
    #[command(
        name = "video2image",
        about = "Parse video to images",
        after_help = "Examples:\n  framecast video2image input.mp4 frames\n  framecast video2image input.mp4 frames --image_ext png --yes"
    )]
    Video2Image {
        /// Path to the video file.
        video_path: PathBuf,
        /// Path to the directory to place parsed images.
        output_dir: PathBuf,
        /// Extension (and format) of the written images.
        #[arg(long = "image_ext", visible_alias = "image-ext", default_value = DEFAULT_IMAGE_EXTENSION)]
        image_ext: String,
        /// Write exactly the frame count the container declares, repeating
        /// the last frame if the stream runs short.
        #[arg(long)]
        match_declared_count: bool,
        /// Write into a non-empty output directory without asking.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Assemble the images of a directory into a video.
    #[command(
        name = "image2video",
        about = "Convert images in directory to video",
        after_help = "Examples:\n  framecast image2video frames output.mp4 30\n  framecast image2video frames output.mkv 23.976 --fourcc avc1 --bitrate 4000000"
    )]
    Image2Video {
        /// Path to the directory containing images.
        image_dir: PathBuf,
        /// Path to the output video file (mp4).
        video_path: PathBuf,
        /// Frames per second of the output video.
        #[arg(value_parser = parse_fps)]
        fps: f64,
        /// Extension of the images to assemble.
        #[arg(long = "image_ext", visible_alias = "image-ext", default_value = DEFAULT_IMAGE_EXTENSION)]
        image_ext: String,
        /// Four-character code of the output codec (mp4v, avc1, hev1, mjpg, vp09).
        #[arg(long, default_value = "mp4v", value_parser = parse_fourcc)]
        fourcc: FourCc,
        /// Target bitrate in bits per second.
        #[arg(long)]
        bitrate: Option<usize>,
    },

    /// Print the metadata of a video.
    #[command(about = "Print video metadata", visible_alias = "info")]
    Probe {
        /// Path to the video file.
        video_path: PathBuf,
        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_fps(value: &str) -> Result<f64, String> {
    let fps: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if !fps.is_finite() || fps <= 0.0 {
        return Err(format!("frame rate must be a positive number, got {value}"));
    }
    Ok(fps)
}

fn parse_fourcc(value: &str) -> Result<FourCc, String> {
    value.parse().map_err(|error: framecast::FramecastError| error.to_string())
}

fn parse_log_level(value: &str) -> Result<FfmpegLogLevel, String> {
    value.parse()
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Feeds library progress snapshots into an `indicatif` bar.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_with_message("done");
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        // The declared frame count of a video can be short of the real one.
        let length = info.total.unwrap_or(0).max(info.current);
        if self.bar.length() != Some(length) {
            self.bar.set_length(length);
        }
        self.bar.set_position(info.current);
    }
}

fn progress_for(global: &GlobalOptions) -> Result<Option<Arc<TerminalProgress>>, Box<dyn Error>> {
    if global.no_progress {
        Ok(None)
    } else {
        Ok(Some(Arc::new(TerminalProgress::new()?)))
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);
    if let Some(level) = cli.global.log_level {
        framecast::set_ffmpeg_log_level(level);
    }

    match cli.command {
        Commands::Video2Image {
            video_path,
            output_dir,
            image_ext,
            match_declared_count,
            yes,
        } => {
            let mut options = ExtractOptions::new().with_image_extension(&image_ext);
            if match_declared_count {
                options = options.with_frame_bound(FrameBound::DeclaredCount);
            }
            let progress = progress_for(&cli.global)?;
            if let Some(progress) = &progress {
                options = options.with_progress(progress.clone());
            }

            let mut confirm: Box<dyn ConfirmOverwrite> = if yes {
                Box::new(AssumeYes)
            } else {
                Box::new(LinePrompt::terminal())
            };

            let outcome =
                framecast::extract_frames(&video_path, &output_dir, &options, confirm.as_mut())?;
            if let Some(progress) = &progress {
                progress.finish();
            }

            match outcome {
                ExtractOutcome::Declined => println!("stop here"),
                // A decoded/declared count mismatch is logged by the library.
                ExtractOutcome::Completed(summary) => {
                    println!(
                        "{} {}",
                        "success:".green().bold(),
                        format!(
                            "Extracted {} frame(s) to {} (video fps: {})",
                            summary.frames_written,
                            summary.output_dir.display(),
                            summary.frames_per_second
                        )
                        .green()
                    );
                }
            }
        }
        Commands::Image2Video {
            image_dir,
            video_path,
            fps,
            image_ext,
            fourcc,
            bitrate,
        } => {
            if video_path.exists() {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("overwriting {}", video_path.display()).yellow()
                );
            }

            let mut options = AssembleOptions::new(fps)
                .with_image_extension(&image_ext)
                .with_codec_tag(fourcc);
            if let Some(bitrate) = bitrate {
                options = options.with_bitrate(bitrate);
            }
            let progress = progress_for(&cli.global)?;
            if let Some(progress) = &progress {
                options = options.with_progress(progress.clone());
            }

            let summary = framecast::assemble_video(&image_dir, &video_path, &options)?;
            if let Some(progress) = &progress {
                progress.finish();
            }

            println!(
                "{} {}",
                "success:".green().bold(),
                format!(
                    "Wrote {} frame(s) ({}x{} @ {} fps, {}) to {}",
                    summary.frames_written,
                    summary.width,
                    summary.height,
                    summary.frames_per_second,
                    fourcc,
                    summary.video_path.display()
                )
                .green()
            );
        }
        Commands::Probe { video_path, json } => {
            let source = VideoSource::open(&video_path)?;
            let metadata = source.metadata();
            if json {
                let payload = json!({
                    "path": source.path().display().to_string(),
                    "format": metadata.format,
                    "codec": metadata.codec,
                    "width": metadata.width,
                    "height": metadata.height,
                    "fps": metadata.frames_per_second,
                    "frame_count": metadata.frame_count,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Format: {}", metadata.format);
                println!(
                    "Video: {}x{} @ {:.3} fps [{}]",
                    metadata.width, metadata.height, metadata.frames_per_second, metadata.codec
                );
                println!("Declared frames: {}", metadata.frame_count);
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framecast", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
