//! # framecast
//!
//! Split a video into numbered still frames, and assemble a directory of
//! numbered still frames back into a video. Decoding and encoding are done by
//! FFmpeg via the [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next)
//! crate; image files are read and written with [`image`].
//!
//! ## Quick Start
//!
//! ### Video to images
//!
//! ```no_run
//! use framecast::{AssumeYes, ExtractOptions};
//!
//! // Writes frames/00000.jpg, frames/00001.jpg, ...
//! framecast::extract_frames("input.mp4", "frames", &ExtractOptions::new(), &mut AssumeYes)?;
//! # Ok::<(), framecast::FramecastError>(())
//! ```
//!
//! ### Images to video
//!
//! ```no_run
//! use framecast::AssembleOptions;
//!
//! let summary = framecast::assemble_video("frames", "output.mp4", &AssembleOptions::new(30.0))?;
//! println!("{} frames at {}x{}", summary.frames_written, summary.width, summary.height);
//! # Ok::<(), framecast::FramecastError>(())
//! ```
//!
//! ## Behavior
//!
//! - Frames are numbered from zero and zero-padded to five digits.
//! - Extraction decodes to end of stream by default; see [`FrameBound`] for
//!   the alternative that follows the container's declared frame count.
//! - Extracting into a non-empty directory asks a [`ConfirmOverwrite`]
//!   decision first.
//! - Assembly sorts images by path and requires them all to share the first
//!   image's dimensions.
//! - The output codec is picked by a four-character code ([`FourCc`]),
//!   `mp4v` by default.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod assemble;
pub mod config;
mod conversion;
pub mod encode;
pub mod error;
pub mod extract;
pub mod ffmpeg;
pub mod iterator;
pub mod metadata;
pub mod progress;
pub mod prompt;
pub mod source;

pub use assemble::{AssembleSummary, assemble_video, discover_images};
pub use config::{
    AssembleOptions, DEFAULT_IMAGE_EXTENSION, DEFAULT_INDEX_WIDTH, ExtractOptions, FrameBound,
};
pub use encode::{FourCc, VideoCodec, VideoEncoder, VideoEncoderOptions};
pub use error::FramecastError;
pub use extract::{ExtractOutcome, ExtractSummary, extract_frames};
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use iterator::FrameIterator;
pub use metadata::VideoMetadata;
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use prompt::{
    AFFIRMATIVE_ANSWER, AssumeNo, AssumeYes, ConfirmOverwrite, LinePrompt, is_affirmative,
};
pub use source::VideoSource;
