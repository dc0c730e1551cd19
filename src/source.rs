//! Opened source videos.
//!
//! [`VideoSource`] opens a container, locates its best video stream and
//! caches the stream's [`VideoMetadata`]. Frames are read with
//! [`frames`](VideoSource::frames).

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    codec::context::Context as CodecContext, format::context::Input, media::Type, Rational,
};

use crate::{error::FramecastError, iterator::FrameIterator, metadata::VideoMetadata};

/// A video file opened for sequential decoding.
///
/// # Example
///
/// ```no_run
/// use framecast::VideoSource;
///
/// let mut source = VideoSource::open("input.mp4")?;
/// println!("video fps: {}", source.metadata().frames_per_second);
///
/// for frame in source.frames()? {
///     let (index, image) = frame?;
///     image.save(format!("{index:05}.png"))?;
/// }
/// # Ok::<(), framecast::FramecastError>(())
/// ```
pub struct VideoSource {
    pub(crate) input_context: Input,
    pub(crate) video_stream_index: usize,
    metadata: VideoMetadata,
    file_path: PathBuf,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open a video file.
    ///
    /// Initializes FFmpeg (idempotent), opens the container and reads the
    /// metadata of its best video stream.
    ///
    /// # Errors
    ///
    /// [`FramecastError::FileOpen`] if the file cannot be opened or its codec
    /// parameters cannot be read, and [`FramecastError::NoVideoStream`] if it
    /// contains no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FramecastError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();
        let open_error = |reason: String| FramecastError::FileOpen {
            path: file_path.clone(),
            reason,
        };

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(FramecastError::NoVideoStream)?;
        let video_stream_index = stream.index();

        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|error| open_error(format!("Failed to read video codec parameters: {error}")))?;

        let frames_per_second = [stream.avg_frame_rate(), stream.rate()]
            .into_iter()
            .find(|rate| rate.numerator() > 0 && rate.denominator() > 0)
            .map(f64::from)
            .unwrap_or(0.0);

        let frame_count = declared_frame_count(
            stream.frames(),
            stream.duration(),
            stream.time_base(),
            input_context.duration(),
            frames_per_second,
        );

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            codec,
            format: input_context.format().name().to_string(),
        };

        log::debug!("Opened {path:?}: {metadata:?}");

        Ok(Self {
            input_context,
            video_stream_index,
            metadata,
            file_path,
        })
    }

    /// Metadata of the video stream, read at open time.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// The path this source was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Iterate every frame from the current read position to end of stream.
    ///
    /// The iterator borrows the source mutably; packets it consumes are gone,
    /// so a second call continues where the first one stopped.
    pub fn frames(&mut self) -> Result<FrameIterator<'_>, FramecastError> {
        FrameIterator::new(self)
    }
}

/// The frame count a container declares for a stream.
///
/// Prefers the header's frame count, then the stream duration, then the
/// container duration (in `AV_TIME_BASE` microseconds), each converted with
/// the frame rate.
fn declared_frame_count(
    header_frames: i64,
    stream_duration: i64,
    time_base: Rational,
    container_duration_micros: i64,
    frames_per_second: f64,
) -> u64 {
    if header_frames > 0 {
        return header_frames as u64;
    }
    if frames_per_second <= 0.0 {
        return 0;
    }

    let seconds = if stream_duration > 0 && time_base.denominator() != 0 {
        stream_duration as f64 * f64::from(time_base)
    } else if container_duration_micros > 0 {
        container_duration_micros as f64 / 1_000_000.0
    } else {
        0.0
    };

    (seconds * frames_per_second).round() as u64
}
