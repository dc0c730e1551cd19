//! Streaming video encoder.
//!
//! [`VideoEncoder`] opens an output container once, with fixed dimensions, a
//! frame rate and a codec chosen by its four-character code ([`FourCc`]).
//! Frames are then pushed one at a time and [`finish`](VideoEncoder::finish)
//! flushes the encoder and writes the container trailer.
//!
//! # Example
//!
//! ```no_run
//! use framecast::{FramecastError, VideoEncoder, VideoEncoderOptions};
//!
//! let first = image::open("frames/00000.jpg")?;
//! let options = VideoEncoderOptions::new(first.width(), first.height(), 30.0);
//! let mut encoder = VideoEncoder::create("out.mp4", &options)?;
//! encoder.push(&first)?;
//! encoder.finish()?;
//! # Ok::<(), FramecastError>(())
//! ```

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;

use ffmpeg_next::codec::Id;
use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::codec::encoder::video::Encoder as OpenedVideoEncoder;
use ffmpeg_next::format::context::Output;
use ffmpeg_next::format::{Flags as FormatFlags, Pixel};
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};
use ffmpeg_next::{Packet, Rational};
use image::{DynamicImage, GenericImageView};

use crate::conversion;
use crate::error::FramecastError;

/// Output codecs reachable through a [`FourCc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoCodec {
    /// MPEG-4 Part 2.
    Mpeg4,
    /// H.264 / AVC.
    H264,
    /// H.265 / HEVC.
    H265,
    /// Motion JPEG.
    Mjpeg,
    /// VP9.
    Vp9,
}

impl VideoCodec {
    fn to_codec_id(self) -> Id {
        match self {
            VideoCodec::Mpeg4 => Id::MPEG4,
            VideoCodec::H264 => Id::H264,
            VideoCodec::H265 => Id::HEVC,
            VideoCodec::Mjpeg => Id::MJPEG,
            VideoCodec::Vp9 => Id::VP9,
        }
    }

    fn input_pixel_format(self) -> Pixel {
        match self {
            // The MJPEG encoder only accepts full-range YUV.
            VideoCodec::Mjpeg => Pixel::YUVJ420P,
            _ => Pixel::YUV420P,
        }
    }
}

/// A four-character codec code such as `mp4v` or `avc1`.
///
/// Tags are matched case-insensitively and stored lower-case. The tag picks
/// the encoder; the container writes whatever tag it uses for that codec.
///
/// | Tags | Codec |
/// |------|-------|
/// | `mp4v`, `fmp4`, `xvid`, `divx` | MPEG-4 Part 2 (default) |
/// | `avc1`, `h264`, `x264` | H.264 |
/// | `hev1`, `hvc1`, `h265` | H.265 |
/// | `mjpg` | Motion JPEG |
/// | `vp09`, `vp90` | VP9 |
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc {
    tag: [u8; 4],
    codec: VideoCodec,
}

impl FourCc {
    /// Parse a tag, failing with [`FramecastError::UnsupportedCodecTag`] when
    /// it is not four ASCII characters or names no supported codec.
    pub fn new(tag: &str) -> Result<Self, FramecastError> {
        let unsupported = || FramecastError::UnsupportedCodecTag(tag.to_string());

        let bytes: [u8; 4] = tag
            .as_bytes()
            .try_into()
            .map_err(|_| unsupported())?;
        if !bytes.iter().all(u8::is_ascii_alphanumeric) {
            return Err(unsupported());
        }
        let lower = bytes.map(|byte| byte.to_ascii_lowercase());

        let codec = match &lower {
            b"mp4v" | b"fmp4" | b"xvid" | b"divx" => VideoCodec::Mpeg4,
            b"avc1" | b"h264" | b"x264" => VideoCodec::H264,
            b"hev1" | b"hvc1" | b"h265" => VideoCodec::H265,
            b"mjpg" => VideoCodec::Mjpeg,
            b"vp09" | b"vp90" => VideoCodec::Vp9,
            _ => return Err(unsupported()),
        };

        Ok(Self { tag: lower, codec })
    }

    /// The tag, lower-cased.
    pub fn as_str(&self) -> &str {
        // Only ASCII alphanumerics get past `new`.
        std::str::from_utf8(&self.tag).unwrap_or("????")
    }

    /// The codec this tag selects.
    pub fn codec(&self) -> VideoCodec {
        self.codec
    }
}

impl Default for FourCc {
    fn default() -> Self {
        Self {
            tag: *b"mp4v",
            codec: VideoCodec::Mpeg4,
        }
    }
}

impl FromStr for FourCc {
    type Err = FramecastError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::new(tag)
    }
}

impl Display for FourCc {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl Debug for FourCc {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "FourCc({:?} -> {:?})", self.as_str(), self.codec)
    }
}

/// Convert a frame rate to a reduced rational with millisecond precision,
/// e.g. `29.97` to `2997/100`.
pub(crate) fn frame_rate_to_rational(frames_per_second: f64) -> Result<Rational, FramecastError> {
    let scaled = (frames_per_second * 1000.0).round();
    if !frames_per_second.is_finite() || scaled < 1.0 || scaled > i32::MAX as f64 {
        return Err(FramecastError::InvalidFrameRate(frames_per_second));
    }
    Ok(Rational::new(scaled as i32, 1000).reduce())
}

/// Options for [`VideoEncoder::create`].
#[derive(Debug, Clone)]
pub struct VideoEncoderOptions {
    /// Width of every frame that will be pushed.
    pub width: u32,
    /// Height of every frame that will be pushed.
    pub height: u32,
    /// Playback frame rate.
    pub frames_per_second: f64,
    /// Codec selection. Defaults to `mp4v`.
    pub codec_tag: FourCc,
    /// Bitrate in bits per second. `None` leaves the encoder default.
    pub bitrate: Option<usize>,
}

impl VideoEncoderOptions {
    pub fn new(width: u32, height: u32, frames_per_second: f64) -> Self {
        Self {
            width,
            height,
            frames_per_second,
            codec_tag: FourCc::default(),
            bitrate: None,
        }
    }

    /// Set the codec tag.
    #[must_use]
    pub fn codec_tag(mut self, tag: FourCc) -> Self {
        self.codec_tag = tag;
        self
    }

    /// Set the target bitrate in bits per second.
    #[must_use]
    pub fn bitrate(mut self, bitrate: usize) -> Self {
        self.bitrate = Some(bitrate);
        self
    }
}

/// Encodes frames into a video file, one frame at a time.
///
/// Dropping the encoder without calling [`finish`](VideoEncoder::finish)
/// leaves a truncated, unfinalized file on disk.
pub struct VideoEncoder {
    output: Output,
    encoder: OpenedVideoEncoder,
    scaler: ScalingContext,
    stream_index: usize,
    encoder_time_base: Rational,
    stream_time_base: Rational,
    width: u32,
    height: u32,
    frames_written: u64,
}

impl VideoEncoder {
    /// Create the output file and open the encoder.
    ///
    /// The container format is inferred from the file extension. An existing
    /// file at `path` is overwritten.
    ///
    /// # Errors
    ///
    /// - [`FramecastError::InvalidFrameRate`] for a non-positive frame rate.
    /// - [`FramecastError::EncoderUnavailable`] if FFmpeg has no encoder for
    ///   the codec.
    /// - [`FramecastError::VideoWriteError`] if the container cannot be
    ///   created or its header written.
    /// - [`FramecastError::VideoEncodeError`] if the encoder rejects the
    ///   settings.
    pub fn create<P: AsRef<Path>>(
        path: P,
        options: &VideoEncoderOptions,
    ) -> Result<Self, FramecastError> {
        let path = path.as_ref();
        let frame_rate = frame_rate_to_rational(options.frames_per_second)?;
        let time_base = frame_rate.invert();
        let (width, height) = (options.width, options.height);
        if width == 0 || height == 0 {
            return Err(FramecastError::VideoEncodeError(format!(
                "cannot encode {width}x{height} frames"
            )));
        }

        log::info!(
            "Encoding {width}x{height} video to {path:?} (codec={}, fps={frame_rate})",
            options.codec_tag,
        );

        ffmpeg_next::init().map_err(|e| {
            FramecastError::VideoEncodeError(format!("FFmpeg initialisation failed: {e}"))
        })?;

        let codec = options.codec_tag.codec();
        let codec_id = codec.to_codec_id();
        let target_pixel = codec.input_pixel_format();

        let encoder_codec =
            ffmpeg_next::encoder::find(codec_id).ok_or_else(|| FramecastError::EncoderUnavailable {
                tag: options.codec_tag.to_string(),
                codec: format!("{codec_id:?}"),
            })?;

        let mut output = ffmpeg_next::format::output(path)
            .map_err(|e| FramecastError::VideoWriteError(format!("cannot open output: {e}")))?;

        // Read before add_stream borrows the context mutably.
        let needs_global_header = output.format().flags().contains(FormatFlags::GLOBAL_HEADER);

        let mut stream = output
            .add_stream(encoder_codec)
            .map_err(|e| FramecastError::VideoWriteError(format!("cannot add stream: {e}")))?;
        let stream_index = stream.index();

        let mut encoder = CodecContext::from_parameters(stream.parameters())
            .map_err(|e| {
                FramecastError::VideoEncodeError(format!("cannot create codec context: {e}"))
            })?
            .encoder()
            .video()
            .map_err(|e| {
                FramecastError::VideoEncodeError(format!("cannot create video encoder: {e}"))
            })?;

        encoder.set_width(width);
        encoder.set_height(height);
        encoder.set_format(target_pixel);
        encoder.set_time_base(time_base);
        encoder.set_frame_rate(Some(frame_rate));
        if let Some(bitrate) = options.bitrate {
            encoder.set_bit_rate(bitrate);
        }

        if needs_global_header {
            unsafe {
                (*encoder.as_mut_ptr()).flags |=
                    ffmpeg_sys_next::AV_CODEC_FLAG_GLOBAL_HEADER as i32;
            }
        }

        let opened = encoder
            .open_as(encoder_codec)
            .map_err(|e| FramecastError::VideoEncodeError(format!("cannot open encoder: {e}")))?;

        stream.set_parameters(&opened);
        stream.set_time_base(time_base);

        output
            .write_header()
            .map_err(|e| FramecastError::VideoWriteError(format!("cannot write header: {e}")))?;

        // The muxer may pick its own stream time base while writing the header.
        let stream_time_base = output
            .stream(stream_index)
            .map(|stream| stream.time_base())
            .ok_or_else(|| {
                FramecastError::VideoWriteError("output stream disappeared".to_string())
            })?;

        let scaler = ScalingContext::get(
            Pixel::RGB24,
            width,
            height,
            target_pixel,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|e| FramecastError::VideoEncodeError(format!("cannot create scaler: {e}")))?;

        Ok(Self {
            output,
            encoder: opened,
            scaler,
            stream_index,
            encoder_time_base: time_base,
            stream_time_base,
            width,
            height,
            frames_written: 0,
        })
    }

    /// `(width, height)` every pushed frame must have.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of frames pushed so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Append one frame.
    ///
    /// # Errors
    ///
    /// [`FramecastError::VideoEncodeError`] if the frame's dimensions differ
    /// from the encoder's or the encoder rejects it, and
    /// [`FramecastError::VideoWriteError`] if a packet cannot be written.
    pub fn push(&mut self, image: &DynamicImage) -> Result<(), FramecastError> {
        if image.dimensions() != (self.width, self.height) {
            return Err(FramecastError::VideoEncodeError(format!(
                "frame is {}x{}, encoder expects {}x{}",
                image.width(),
                image.height(),
                self.width,
                self.height,
            )));
        }

        let source = conversion::image_to_frame(&image.to_rgb8());
        let mut converted = VideoFrame::empty();
        self.scaler
            .run(&source, &mut converted)
            .map_err(|e| FramecastError::VideoEncodeError(format!("scaling failed: {e}")))?;
        converted.set_pts(Some(self.frames_written as i64));

        self.encoder
            .send_frame(&converted)
            .map_err(|e| FramecastError::VideoEncodeError(format!("send_frame failed: {e}")))?;
        self.frames_written += 1;

        self.write_pending_packets()
    }

    /// Flush the encoder and write the container trailer.
    ///
    /// Returns the number of frames written.
    pub fn finish(mut self) -> Result<u64, FramecastError> {
        self.encoder
            .send_eof()
            .map_err(|e| FramecastError::VideoEncodeError(format!("send_eof failed: {e}")))?;
        self.write_pending_packets()?;

        self.output
            .write_trailer()
            .map_err(|e| FramecastError::VideoWriteError(format!("cannot write trailer: {e}")))?;

        log::debug!("Finalized video with {} frames", self.frames_written);
        Ok(self.frames_written)
    }

    fn write_pending_packets(&mut self) -> Result<(), FramecastError> {
        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            packet.rescale_ts(self.encoder_time_base, self.stream_time_base);
            packet
                .write_interleaved(&mut self.output)
                .map_err(|e| FramecastError::VideoWriteError(format!("write packet failed: {e}")))?;
        }
        Ok(())
    }
}
