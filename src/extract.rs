//! Video to numbered still images.
//!
//! [`extract_frames`] decodes a video front to back and writes every frame
//! as `<index>.<ext>` into an output directory, in the order the decoder
//! yields them.
//!
//! # Example
//!
//! ```no_run
//! use framecast::{ExtractOptions, ExtractOutcome, LinePrompt};
//!
//! let outcome = framecast::extract_frames(
//!     "input.mp4",
//!     "frames/",
//!     &ExtractOptions::new(),
//!     &mut LinePrompt::terminal(),
//! )?;
//!
//! match outcome {
//!     ExtractOutcome::Completed(summary) => {
//!         println!("wrote {} frames", summary.frames_written)
//!     }
//!     ExtractOutcome::Declined => println!("stop here"),
//! }
//! # Ok::<(), framecast::FramecastError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::config::{ExtractOptions, FrameBound};
use crate::error::FramecastError;
use crate::progress::{OperationType, ProgressTracker};
use crate::prompt::ConfirmOverwrite;
use crate::source::VideoSource;

/// What an extraction run did.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum ExtractOutcome {
    /// Frames were written.
    Completed(ExtractSummary),
    /// The output directory was not empty and the overwrite was refused.
    /// Nothing was written.
    Declined,
}

/// Counts from a completed extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractSummary {
    /// Number of image files written.
    pub frames_written: u64,
    /// Number of frames the decoder produced before the run stopped.
    pub frames_decoded: u64,
    /// Frame count the container declared.
    pub declared_frames: u64,
    /// Source frame rate.
    pub frames_per_second: f64,
    /// Directory the frames were written to.
    pub output_dir: PathBuf,
}

/// State of the output directory before anything is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputDirectory {
    Created,
    Empty,
    Populated,
}

fn inspect_output_dir(output_dir: &Path) -> Result<OutputDirectory, FramecastError> {
    if !output_dir.exists() {
        fs::create_dir_all(output_dir)?;
        log::info!("Created output directory {output_dir:?}");
        return Ok(OutputDirectory::Created);
    }
    if !output_dir.is_dir() {
        return Err(FramecastError::NotADirectory(output_dir.to_path_buf()));
    }

    let mut entries = fs::read_dir(output_dir).map_err(|source| FramecastError::ReadDirectory {
        path: output_dir.to_path_buf(),
        source,
    })?;
    if entries.next().is_some() {
        Ok(OutputDirectory::Populated)
    } else {
        Ok(OutputDirectory::Empty)
    }
}

/// Reject extensions `image` cannot pick an encoder for.
fn check_writable_extension(extension: &str) -> Result<(), FramecastError> {
    match ImageFormat::from_extension(extension) {
        Some(format) if format.writing_enabled() => Ok(()),
        _ => Err(FramecastError::UnsupportedImageFormat(extension.to_string())),
    }
}

/// Write every frame of `video_path` into `output_dir`.
///
/// The video is opened before the output directory is touched, so an
/// unreadable source leaves the filesystem unchanged. A missing directory is
/// created. A non-empty one is only written into if `confirm` agrees;
/// otherwise [`ExtractOutcome::Declined`] is returned and nothing is written.
///
/// How many files are written is governed by
/// [`ExtractOptions::with_frame_bound`]. Files are never cleaned up: a run
/// that fails halfway leaves the frames written so far.
///
/// # Errors
///
/// - [`FramecastError::UnsupportedImageFormat`] if the image extension names
///   no format `image` can write. Checked before anything else.
/// - [`FramecastError::FileOpen`] / [`FramecastError::NoVideoStream`] if the
///   source cannot be opened.
/// - [`FramecastError::NotADirectory`] if `output_dir` is a file.
/// - [`FramecastError::VideoDecodeError`] / [`FramecastError::FfmpegError`]
///   if decoding fails.
/// - [`FramecastError::ImageError`] / [`FramecastError::IoError`] if a frame
///   cannot be written.
pub fn extract_frames<V, D, C>(
    video_path: V,
    output_dir: D,
    options: &ExtractOptions,
    confirm: &mut C,
) -> Result<ExtractOutcome, FramecastError>
where
    V: AsRef<Path>,
    D: AsRef<Path>,
    C: ConfirmOverwrite + ?Sized,
{
    let output_dir = output_dir.as_ref();
    check_writable_extension(options.image_extension())?;
    let mut source = VideoSource::open(video_path)?;
    let metadata = source.metadata().clone();
    log::info!(
        "video fps: {} ({} frames declared, {}x{} {})",
        metadata.frames_per_second,
        metadata.frame_count,
        metadata.width,
        metadata.height,
        metadata.codec,
    );

    if inspect_output_dir(output_dir)? == OutputDirectory::Populated
        && !confirm.confirm(output_dir)?
    {
        log::info!("Output directory {output_dir:?} is not empty; stopping");
        return Ok(ExtractOutcome::Declined);
    }

    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::FrameExtraction,
        Some(metadata.frame_count),
        options.batch_size,
    );
    let mut writer = FrameWriter {
        output_dir,
        options,
        tracker: &mut tracker,
        written: 0,
    };

    let frames_decoded = match options.frame_bound {
        FrameBound::EndOfStream => {
            let mut decoded = 0;
            for frame in source.frames()? {
                let (index, image) = frame?;
                writer.write(index, &image)?;
                decoded += 1;
            }
            decoded
        }
        FrameBound::DeclaredCount => {
            write_declared_count(source.frames()?, metadata.frame_count, &mut writer)?
        }
    };
    let frames_written = writer.written;
    tracker.finish();

    if frames_decoded != metadata.frame_count {
        log::warn!(
            "Decoded {frames_decoded} frames but the container declares {}",
            metadata.frame_count
        );
    }
    log::info!("Wrote {frames_written} frames to {output_dir:?}");

    Ok(ExtractOutcome::Completed(ExtractSummary {
        frames_written,
        frames_decoded,
        declared_frames: metadata.frame_count,
        frames_per_second: metadata.frames_per_second,
        output_dir: output_dir.to_path_buf(),
    }))
}

/// Write exactly `declared` files, repeating the last decoded frame if the
/// stream runs short. Returns the number of frames decoded.
fn write_declared_count<I>(
    mut frames: I,
    declared: u64,
    writer: &mut FrameWriter<'_>,
) -> Result<u64, FramecastError>
where
    I: Iterator<Item = Result<(u64, DynamicImage), FramecastError>>,
{
    let mut last: Option<DynamicImage> = None;
    let mut decoded = 0;

    for index in 0..declared {
        match frames.next() {
            Some(frame) => {
                let (_, image) = frame?;
                decoded += 1;
                last = Some(image);
            }
            None if last.is_some() => {
                log::debug!("Stream ended early; repeating frame {} as {index}", decoded - 1);
            }
            None => break,
        }

        if let Some(image) = &last {
            writer.write(index, image)?;
        }
    }

    Ok(decoded)
}

struct FrameWriter<'a> {
    output_dir: &'a Path,
    options: &'a ExtractOptions,
    tracker: &'a mut ProgressTracker,
    written: u64,
}

impl FrameWriter<'_> {
    fn write(&mut self, index: u64, image: &DynamicImage) -> Result<(), FramecastError> {
        let path = self.output_dir.join(self.options.frame_file_name(index));
        image.save(&path)?;
        log::debug!("saved frame {index} -> {path:?}");
        self.written += 1;
        self.tracker.advance(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use image::{Rgb, RgbImage};

    use super::*;
    use crate::progress::NoOpProgress;

    fn solid(value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([value, value, value])))
    }

    fn stream_of(
        values: &[u8],
    ) -> impl Iterator<Item = Result<(u64, DynamicImage), FramecastError>> + '_ {
        values
            .iter()
            .enumerate()
            .map(|(index, &value)| Ok((index as u64, solid(value))))
    }

    /// Run the declared-count bound into `dir` and return (decoded, written, names).
    fn declared_run<I>(dir: &Path, frames: I, declared: u64) -> (u64, u64, Vec<String>)
    where
        I: Iterator<Item = Result<(u64, DynamicImage), FramecastError>>,
    {
        let options = ExtractOptions::new().with_image_extension("png");
        let mut tracker = ProgressTracker::new(
            Arc::new(NoOpProgress),
            OperationType::FrameExtraction,
            Some(declared),
            1,
        );
        let mut writer = FrameWriter {
            output_dir: dir,
            options: &options,
            tracker: &mut tracker,
            written: 0,
        };
        let decoded = write_declared_count(frames, declared, &mut writer).unwrap();
        let written = writer.written;

        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        (decoded, written, names)
    }

    #[test]
    fn short_stream_repeats_last_frame() {
        let temporary = tempfile::tempdir().unwrap();
        let dir = temporary.path();

        let (decoded, written, names) = declared_run(dir, stream_of(&[10, 200]), 4);
        assert_eq!((decoded, written), (2, 4));
        assert_eq!(names, vec!["00000.png", "00001.png", "00002.png", "00003.png"]);

        let last = fs::read(dir.join("00001.png")).unwrap();
        assert_ne!(fs::read(dir.join("00000.png")).unwrap(), last);
        assert_eq!(fs::read(dir.join("00002.png")).unwrap(), last);
        assert_eq!(fs::read(dir.join("00003.png")).unwrap(), last);
    }

    #[test]
    fn long_stream_drops_trailing_frames() {
        let temporary = tempfile::tempdir().unwrap();
        let dir = temporary.path();

        let (decoded, written, names) = declared_run(dir, stream_of(&[1, 2, 3, 4, 5]), 3);
        assert_eq!((decoded, written), (3, 3));
        assert_eq!(names, vec!["00000.png", "00001.png", "00002.png"]);

        let third = image::open(dir.join("00002.png")).unwrap().to_rgb8();
        assert_eq!(third.get_pixel(0, 0), &Rgb([3, 3, 3]));
    }

    #[test]
    fn empty_stream_writes_nothing() {
        let temporary = tempfile::tempdir().unwrap();
        let (decoded, written, names) = declared_run(temporary.path(), stream_of(&[]), 3);
        assert_eq!((decoded, written), (0, 0));
        assert!(names.is_empty());
    }

    #[test]
    fn decode_error_stops_the_run() {
        let temporary = tempfile::tempdir().unwrap();
        let options = ExtractOptions::new().with_image_extension("png");
        let mut tracker = ProgressTracker::new(
            Arc::new(NoOpProgress),
            OperationType::FrameExtraction,
            Some(3),
            1,
        );
        let mut writer = FrameWriter {
            output_dir: temporary.path(),
            options: &options,
            tracker: &mut tracker,
            written: 0,
        };
        let frames = stream_of(&[7]).chain(std::iter::once(Err(
            FramecastError::VideoDecodeError("corrupt packet".to_string()),
        )));

        let result = write_declared_count(frames, 3, &mut writer);
        assert!(matches!(result, Err(FramecastError::VideoDecodeError(_))));
        assert_eq!(writer.written, 1);
    }

    #[test]
    fn extension_must_be_writable() {
        assert!(check_writable_extension("jpg").is_ok());
        assert!(check_writable_extension("PNG").is_ok());
        assert!(matches!(
            check_writable_extension("xyz"),
            Err(FramecastError::UnsupportedImageFormat(ext)) if ext == "xyz"
        ));
    }

    #[test]
    fn missing_directory_is_created() {
        let temporary = tempfile::tempdir().unwrap();
        let target = temporary.path().join("a").join("b");
        assert_eq!(inspect_output_dir(&target).unwrap(), OutputDirectory::Created);
        assert!(target.is_dir());
    }

    #[test]
    fn empty_and_populated_directories() {
        let temporary = tempfile::tempdir().unwrap();
        assert_eq!(
            inspect_output_dir(temporary.path()).unwrap(),
            OutputDirectory::Empty
        );

        fs::write(temporary.path().join("notes.txt"), b"x").unwrap();
        assert_eq!(
            inspect_output_dir(temporary.path()).unwrap(),
            OutputDirectory::Populated
        );
    }

    #[test]
    fn file_in_place_of_directory() {
        let temporary = tempfile::tempdir().unwrap();
        let file = temporary.path().join("frames");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            inspect_output_dir(&file),
            Err(FramecastError::NotADirectory(path)) if path == file
        ));
    }
}
