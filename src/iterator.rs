//! Lazy, pull-based frame iterator.
//!
//! [`FrameIterator`] decodes frames on demand: each call to
//! [`next()`](Iterator::next) reads and decodes just enough packets to
//! produce the next frame. Frames are yielded in decoder output order with a
//! zero-based index, until the decoder is drained at end of stream.

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    Error as FfmpegError, Packet,
};
use image::{DynamicImage, RgbImage};

use crate::{conversion, error::FramecastError, source::VideoSource};

/// A scaler together with the input layout it was built for.
struct RgbScaler {
    context: ScalingContext,
    format: Pixel,
    width: u32,
    height: u32,
}

/// A lazy iterator over every decoded frame of a [`VideoSource`].
///
/// Created via [`VideoSource::frames`]. Items are `(index, image)` pairs with
/// the image in 8-bit RGB at the frame's native size. After an error the
/// iterator is fused.
pub struct FrameIterator<'a> {
    source: &'a mut VideoSource,
    decoder: VideoDecoder,
    scaler: Option<RgbScaler>,
    decoded_frame: VideoFrame,
    scaled_frame: VideoFrame,
    next_index: u64,
    eof_sent: bool,
    done: bool,
}

impl<'a> FrameIterator<'a> {
    pub(crate) fn new(source: &'a mut VideoSource) -> Result<Self, FramecastError> {
        let stream = source
            .input_context
            .stream(source.video_stream_index)
            .ok_or(FramecastError::NoVideoStream)?;
        let decoder = CodecContext::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        Ok(Self {
            source,
            decoder,
            scaler: None,
            decoded_frame: VideoFrame::empty(),
            scaled_frame: VideoFrame::empty(),
            next_index: 0,
            eof_sent: false,
            done: false,
        })
    }

    /// Convert the current `decoded_frame` to an RGB image.
    ///
    /// The scaler is rebuilt whenever the decoded layout changes mid-stream.
    fn convert_current_frame(&mut self) -> Result<DynamicImage, FramecastError> {
        let format = self.decoded_frame.format();
        let width = self.decoded_frame.width();
        let height = self.decoded_frame.height();

        let reusable = self
            .scaler
            .as_ref()
            .is_some_and(|s| s.format == format && s.width == width && s.height == height);
        if !reusable {
            let context = ScalingContext::get(
                format,
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?;
            self.scaler = Some(RgbScaler {
                context,
                format,
                width,
                height,
            });
        }

        let scaler = self.scaler.as_mut().ok_or_else(|| {
            FramecastError::VideoDecodeError("scaler was not initialised".to_string())
        })?;
        scaler
            .context
            .run(&self.decoded_frame, &mut self.scaled_frame)?;

        let buffer = conversion::frame_to_buffer(&self.scaled_frame, width, height);
        let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            FramecastError::VideoDecodeError(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;
        Ok(DynamicImage::ImageRgb8(image))
    }

    fn fail(&mut self, error: FramecastError) -> Option<<Self as Iterator>::Item> {
        self.done = true;
        Some(Err(error))
    }
}

impl Iterator for FrameIterator<'_> {
    type Item = Result<(u64, DynamicImage), FramecastError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            // Take a frame the decoder has already produced.
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                return match self.convert_current_frame() {
                    Ok(image) => {
                        let index = self.next_index;
                        self.next_index += 1;
                        Some(Ok((index, image)))
                    }
                    Err(error) => self.fail(error),
                };
            }

            if self.eof_sent {
                log::debug!("Decoder drained after {} frames", self.next_index);
                self.done = true;
                return None;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.source.input_context) {
                Ok(()) => {
                    // Packets of other streams are skipped.
                    if packet.stream() == self.source.video_stream_index {
                        if let Err(error) = self.decoder.send_packet(&packet) {
                            return self.fail(FramecastError::VideoDecodeError(format!(
                                "decoder rejected packet after frame {}: {error}",
                                self.next_index
                            )));
                        }
                    }
                }
                Err(FfmpegError::Eof) => {
                    if let Err(error) = self.decoder.send_eof() {
                        return self.fail(FramecastError::from(error));
                    }
                    self.eof_sent = true;
                }
                Err(error) => {
                    return self.fail(FramecastError::VideoDecodeError(format!(
                        "cannot read packet after frame {}: {error}",
                        self.next_index
                    )));
                }
            }
        }
    }
}
