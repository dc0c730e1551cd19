//! Run options.
//!
//! [`ExtractOptions`] and [`AssembleOptions`] are builders that carry the
//! policy choices of each procedure (file suffix, index padding, codec tag,
//! frame-count bound) together with a progress callback, so the procedure
//! signatures stay small.
//!
//! # Example
//!
//! ```
//! use framecast::{AssembleOptions, ExtractOptions, FourCc, FrameBound};
//!
//! let extract = ExtractOptions::new()
//!     .with_image_extension("png")
//!     .with_frame_bound(FrameBound::DeclaredCount);
//! assert_eq!(extract.frame_file_name(7), "00007.png");
//!
//! let assemble = AssembleOptions::new(24.0)
//!     .with_codec_tag("avc1".parse::<FourCc>()?);
//! assert_eq!(assemble.codec_tag().as_str(), "avc1");
//! # Ok::<(), framecast::FramecastError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::encode::FourCc;
use crate::progress::{NoOpProgress, ProgressCallback};

/// Extension used for extracted frames and matched by the assembler.
pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

/// Number of digits extracted frame indices are zero-padded to.
pub const DEFAULT_INDEX_WIDTH: usize = 5;

/// How many frames the extractor writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameBound {
    /// Decode until the decoder signals end of stream. One file per frame
    /// actually decoded, whatever the container declares. This is the default.
    #[default]
    EndOfStream,
    /// Write exactly the container's declared frame count.
    ///
    /// Decoded frames past the declared count are dropped. If the stream runs
    /// short, the last decoded frame is written again for each remaining
    /// index. A stream that yields no frame at all writes nothing.
    DeclaredCount,
}

/// Strip a leading dot so `".png"` and `"png"` mean the same thing.
fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_string()
}

/// Options for [`extract_frames`](crate::extract_frames).
#[derive(Clone)]
pub struct ExtractOptions {
    pub(crate) image_extension: String,
    pub(crate) index_width: usize,
    pub(crate) frame_bound: FrameBound,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) batch_size: u64,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("image_extension", &self.image_extension)
            .field("index_width", &self.index_width)
            .field("frame_bound", &self.frame_bound)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Defaults: `jpg` files, five-digit indices, decode to end of stream,
    /// no progress callback, batch size 1.
    pub fn new() -> Self {
        Self {
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            index_width: DEFAULT_INDEX_WIDTH,
            frame_bound: FrameBound::default(),
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
        }
    }

    /// Set the file extension of written frames. The image format is chosen
    /// from it, so it must be one the `image` crate can encode.
    #[must_use]
    pub fn with_image_extension(mut self, extension: &str) -> Self {
        self.image_extension = normalize_extension(extension);
        self
    }

    /// Set how many digits frame indices are zero-padded to.
    ///
    /// Indices with more digits than `width` are written in full, which breaks
    /// lexicographic ordering for a later assembly pass.
    #[must_use]
    pub fn with_index_width(mut self, width: usize) -> Self {
        self.index_width = width;
        self
    }

    /// Choose how many frames are written. See [`FrameBound`].
    #[must_use]
    pub fn with_frame_bound(mut self, bound: FrameBound) -> Self {
        self.frame_bound = bound;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Fire the progress callback every `size` frames (minimum 1).
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn image_extension(&self) -> &str {
        &self.image_extension
    }

    pub fn frame_bound(&self) -> FrameBound {
        self.frame_bound
    }

    /// File name of the frame with the given zero-based index, e.g. `00042.jpg`.
    pub fn frame_file_name(&self, index: u64) -> String {
        format!(
            "{index:0width$}.{ext}",
            width = self.index_width,
            ext = self.image_extension
        )
    }
}

/// Options for [`assemble_video`](crate::assemble_video).
#[derive(Clone)]
pub struct AssembleOptions {
    pub(crate) frame_rate: f64,
    pub(crate) image_extension: String,
    pub(crate) codec_tag: FourCc,
    pub(crate) bitrate: Option<usize>,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) batch_size: u64,
}

impl Debug for AssembleOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AssembleOptions")
            .field("frame_rate", &self.frame_rate)
            .field("image_extension", &self.image_extension)
            .field("codec_tag", &self.codec_tag)
            .field("bitrate", &self.bitrate)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl AssembleOptions {
    /// Options for a video played at `frame_rate` frames per second.
    ///
    /// Defaults: match `*.jpg`, codec tag `mp4v`, encoder-chosen bitrate, no
    /// progress callback. The frame rate is validated when the run starts.
    pub fn new(frame_rate: f64) -> Self {
        Self {
            frame_rate,
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            codec_tag: FourCc::default(),
            bitrate: None,
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
        }
    }

    /// Only images whose file name ends in `.<extension>` are assembled.
    #[must_use]
    pub fn with_image_extension(mut self, extension: &str) -> Self {
        self.image_extension = normalize_extension(extension);
        self
    }

    /// Select the output codec by its four-character code.
    #[must_use]
    pub fn with_codec_tag(mut self, tag: FourCc) -> Self {
        self.codec_tag = tag;
        self
    }

    /// Target bitrate in bits per second.
    #[must_use]
    pub fn with_bitrate(mut self, bitrate: usize) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Fire the progress callback every `size` frames (minimum 1).
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn image_extension(&self) -> &str {
        &self.image_extension
    }

    pub fn codec_tag(&self) -> FourCc {
        self.codec_tag
    }

    pub fn bitrate(&self) -> Option<usize> {
        self.bitrate
    }
}
