//! Pixel-buffer copies between FFmpeg frames and `image` buffers.
//!
//! FFmpeg planes carry a per-row stride that can be wider than the image, so
//! both directions copy row by row unless the layouts already agree.

use ffmpeg_next::{format::Pixel, frame::Video as VideoFrame};
use image::RgbImage;

const RGB_BYTES_PER_PIXEL: usize = 3;

/// Copy an RGB24 frame into a tightly-packed buffer.
pub(crate) fn frame_to_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_len = (width as usize) * RGB_BYTES_PER_PIXEL;
    let data = video_frame.data(0);

    if stride == row_len {
        data[..row_len * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_len * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_len]);
        }
        buffer
    }
}

/// Copy an RGB image into a freshly allocated RGB24 frame.
pub(crate) fn image_to_frame(image: &RgbImage) -> VideoFrame {
    let (width, height) = image.dimensions();
    let mut frame = VideoFrame::new(Pixel::RGB24, width, height);
    let stride = frame.stride(0);
    let row_len = (width as usize) * RGB_BYTES_PER_PIXEL;
    let source = image.as_raw();
    let destination = frame.data_mut(0);

    for row in 0..(height as usize) {
        let src_start = row * row_len;
        let dst_start = row * stride;
        destination[dst_start..dst_start + row_len]
            .copy_from_slice(&source[src_start..src_start + row_len]);
    }
    frame
}
