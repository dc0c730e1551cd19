//! Error types for the `framecast` crate.
//!
//! This module defines [`FramecastError`], the unified error type returned by
//! every fallible operation in the crate. Errors carry the paths, frame
//! dimensions, and upstream messages needed to diagnose a failed run.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framecast` operations.
///
/// A user declining to overwrite a non-empty directory is **not** an error;
/// see [`ExtractOutcome::Declined`](crate::ExtractOutcome::Declined).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramecastError {
    /// The video file could not be opened.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// The encoder could not be configured or rejected a frame.
    #[error("Video encoding error: {0}")]
    VideoEncodeError(String),

    /// The output container could not be created or written.
    #[error("Video write error: {0}")]
    VideoWriteError(String),

    /// The FFmpeg build in use does not ship an encoder for the codec.
    #[error("No encoder available for codec tag '{tag}' ({codec})")]
    EncoderUnavailable {
        /// The requested fourcc.
        tag: String,
        /// FFmpeg's name for the codec the tag maps to.
        codec: String,
    },

    /// The fourcc does not map to a supported encoder.
    #[error("Unsupported codec tag '{0}' (expected one of mp4v, avc1, hev1, mjpg, vp09)")]
    UnsupportedCodecTag(String),

    /// The requested output frame rate is not a positive, finite number.
    #[error("Invalid frame rate {0}: must be a positive, finite number")]
    InvalidFrameRate(f64),

    /// The image directory contained no file with the requested extension.
    #[error("No '*.{extension}' images found in {directory}")]
    NoImagesFound {
        /// Directory that was searched.
        directory: PathBuf,
        /// Extension that was matched (without the leading dot).
        extension: String,
    },

    /// Frames cannot be written with this file extension.
    #[error("Cannot write images with extension '{0}'")]
    UnsupportedImageFormat(String),

    /// An input image does not share the first image's dimensions.
    #[error(
        "Image {path} is {}x{}, expected {}x{} like the first image",
        .found.0, .found.1, .expected.0, .expected.1
    )]
    DimensionMismatch {
        /// The offending image.
        path: PathBuf,
        /// `(width, height)` the encoder was opened with.
        expected: (u32, u32),
        /// `(width, height)` of the offending image.
        found: (u32, u32),
    },

    /// An input image could not be read or decoded.
    #[error("Failed to decode image {path}: {source}")]
    ImageDecode {
        /// The image that failed.
        path: PathBuf,
        /// The decoder error.
        #[source]
        source: ImageError,
    },

    /// A directory could not be listed.
    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        /// The directory that was listed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: IoError,
    },

    /// The output path exists but is not a directory.
    #[error("Output path {0} exists and is not a directory")]
    NotADirectory(PathBuf),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while encoding or converting a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for FramecastError {
    fn from(error: FfmpegError) -> Self {
        FramecastError::FfmpegError(error.to_string())
    }
}
