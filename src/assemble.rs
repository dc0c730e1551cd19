//! Numbered still images to video.
//!
//! [`assemble_video`] collects every `*.<ext>` file of a directory, sorts
//! them by path and encodes them, in that order, into a new video. With the
//! zero-padded names written by [`extract_frames`](crate::extract_frames),
//! path order is frame order.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView};

use crate::config::AssembleOptions;
use crate::encode::{VideoEncoder, VideoEncoderOptions};
use crate::error::FramecastError;
use crate::progress::{OperationType, ProgressTracker};

/// Counts from a completed assembly.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct AssembleSummary {
    /// Number of frames encoded, one per image.
    pub frames_written: u64,
    /// Frame width, taken from the first image.
    pub width: u32,
    /// Frame height, taken from the first image.
    pub height: u32,
    /// Playback frame rate of the written video.
    pub frames_per_second: f64,
    /// The written video.
    pub video_path: PathBuf,
}

/// List the images of `directory` that [`assemble_video`] would encode.
///
/// Matches regular files whose name ends in `.<extension>` (case-sensitive)
/// and does not start with a dot, like the shell glob `*.<extension>`.
/// The result is sorted by full path.
///
/// # Errors
///
/// [`FramecastError::ReadDirectory`] if the directory cannot be listed.
pub fn discover_images<P: AsRef<Path>>(
    directory: P,
    extension: &str,
) -> Result<Vec<PathBuf>, FramecastError> {
    let directory = directory.as_ref();
    let suffix = format!(".{}", extension.trim_start_matches('.'));
    let read_error = |source| FramecastError::ReadDirectory {
        path: directory.to_path_buf(),
        source,
    };

    let mut images = Vec::new();
    for entry in fs::read_dir(directory).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let file_name = entry.file_name();
        // Compared as bytes so names that are not UTF-8 still match.
        let name = file_name.as_encoded_bytes();
        if name.starts_with(b".")
            || name.len() <= suffix.len()
            || !name.ends_with(suffix.as_bytes())
        {
            continue;
        }
        if entry.path().is_file() {
            images.push(entry.path());
        }
    }

    images.sort();
    Ok(images)
}

fn open_image(path: &Path) -> Result<DynamicImage, FramecastError> {
    image::open(path).map_err(|source| FramecastError::ImageDecode {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode every matching image of `image_dir` into `video_path`.
///
/// The first image fixes the video's dimensions; every later image must
/// match them. An existing file at `video_path` is overwritten without
/// asking. If the run fails after the encoder was opened, the partially
/// written video is left on disk unfinalized.
///
/// # Errors
///
/// - [`FramecastError::InvalidFrameRate`] if the frame rate is not positive.
/// - [`FramecastError::ReadDirectory`] if `image_dir` cannot be listed.
/// - [`FramecastError::NoImagesFound`] if nothing matches the extension.
/// - [`FramecastError::ImageDecode`] if an image cannot be decoded.
/// - [`FramecastError::DimensionMismatch`] if an image's size differs from
///   the first image's.
/// - Encoder errors from [`VideoEncoder`].
pub fn assemble_video<I, V>(
    image_dir: I,
    video_path: V,
    options: &AssembleOptions,
) -> Result<AssembleSummary, FramecastError>
where
    I: AsRef<Path>,
    V: AsRef<Path>,
{
    let image_dir = image_dir.as_ref();
    let video_path = video_path.as_ref();

    let frame_rate = options.frame_rate;
    if !frame_rate.is_finite() || frame_rate <= 0.0 {
        return Err(FramecastError::InvalidFrameRate(frame_rate));
    }

    let images = discover_images(image_dir, &options.image_extension)?;
    log::info!(
        "Found {} '*.{}' images in {image_dir:?}",
        images.len(),
        options.image_extension
    );
    let Some(first_path) = images.first() else {
        return Err(FramecastError::NoImagesFound {
            directory: image_dir.to_path_buf(),
            extension: options.image_extension.clone(),
        });
    };

    let first = open_image(first_path)?;
    let (width, height) = first.dimensions();

    let mut encoder_options = VideoEncoderOptions::new(width, height, frame_rate)
        .codec_tag(options.codec_tag);
    if let Some(bitrate) = options.bitrate {
        encoder_options = encoder_options.bitrate(bitrate);
    }
    let mut encoder = VideoEncoder::create(video_path, &encoder_options)?;

    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::FrameAssembly,
        Some(images.len() as u64),
        options.batch_size,
    );

    let mut pending_first = Some(first);
    for (index, path) in images.iter().enumerate() {
        let image = match pending_first.take() {
            Some(image) => image,
            None => open_image(path)?,
        };

        let expected = encoder.dimensions();
        let found = image.dimensions();
        if found != expected {
            return Err(FramecastError::DimensionMismatch {
                path: path.clone(),
                expected,
                found,
            });
        }

        encoder.push(&image)?;
        log::debug!("encoded {path:?} ({} frames so far)", encoder.frames_written());
        tracker.advance(index as u64);
    }

    let frames_written = encoder.finish()?;
    tracker.finish();
    log::info!("Wrote {frames_written} frames to {video_path:?}");

    Ok(AssembleSummary {
        frames_written,
        width,
        height,
        frames_per_second: frame_rate,
        video_path: video_path.to_path_buf(),
    })
}
