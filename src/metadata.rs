//! Video metadata.
//!
//! [`VideoMetadata`] is read once when a [`VideoSource`](crate::VideoSource)
//! is opened and cached for its lifetime.

/// Metadata for the best video stream of a container.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (may be approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Frame count declared by the container.
    ///
    /// Taken from the stream header when the container records one, otherwise
    /// estimated from duration and frame rate. Used to pace progress and by
    /// [`FrameBound::DeclaredCount`](crate::FrameBound::DeclaredCount); it is
    /// not guaranteed to match the number of frames the decoder produces.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"mpeg4"`).
    pub codec: String,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
}
