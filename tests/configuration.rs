//! ExtractOptions, AssembleOptions, and FourCc tests.

use std::sync::Arc;

use framecast::{
    AssembleOptions, ExtractOptions, FourCc, FrameBound, FramecastError, ProgressCallback,
    ProgressInfo, VideoCodec,
};

// ── ExtractOptions builder ───────────────────────────────────────

#[test]
fn extract_defaults() {
    let options = ExtractOptions::new();
    assert_eq!(options.image_extension(), "jpg");
    assert_eq!(options.frame_bound(), FrameBound::EndOfStream);

    let debug = format!("{options:?}");
    assert!(debug.contains("ExtractOptions"));
    assert!(debug.contains("index_width: 5"));
    assert!(debug.contains("batch_size: 1"));
}

#[test]
fn extract_batch_size_clamps_zero() {
    let debug = format!("{:?}", ExtractOptions::new().with_batch_size(0));
    assert!(debug.contains("batch_size: 1"));
}

#[test]
fn extract_file_names() {
    let options = ExtractOptions::new();
    assert_eq!(options.frame_file_name(0), "00000.jpg");
    assert_eq!(options.frame_file_name(99_999), "99999.jpg");
    assert_eq!(options.frame_file_name(100_000), "100000.jpg");

    let options = ExtractOptions::new()
        .with_image_extension(".png")
        .with_index_width(3);
    assert_eq!(options.frame_file_name(7), "007.png");
}

struct Silent;

impl ProgressCallback for Silent {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

#[test]
fn options_clone_with_callback() {
    let options = ExtractOptions::new()
        .with_progress(Arc::new(Silent))
        .with_frame_bound(FrameBound::DeclaredCount);
    let cloned = options.clone();
    assert_eq!(cloned.frame_bound(), FrameBound::DeclaredCount);
}

// ── AssembleOptions builder ──────────────────────────────────────

#[test]
fn assemble_defaults() {
    let options = AssembleOptions::new(24.0);
    assert_eq!(options.frame_rate(), 24.0);
    assert_eq!(options.image_extension(), "jpg");
    assert_eq!(options.codec_tag().as_str(), "mp4v");
    assert_eq!(options.bitrate(), None);
}

#[test]
fn assemble_builder_chain() {
    let tag: FourCc = "MJPG".parse().unwrap();
    let options = AssembleOptions::new(29.97)
        .with_image_extension("PNG")
        .with_codec_tag(tag)
        .with_bitrate(2_000_000);

    // Extensions keep their case; matching is case-sensitive.
    assert_eq!(options.image_extension(), "PNG");
    assert_eq!(options.codec_tag().codec(), VideoCodec::Mjpeg);
    assert_eq!(options.bitrate(), Some(2_000_000));

    let debug = format!("{options:?}");
    assert!(debug.contains("AssembleOptions"));
    assert!(debug.contains("frame_rate: 29.97"));
}

// ── FourCc ───────────────────────────────────────────────────────

#[test]
fn fourcc_aliases() {
    for (tag, codec) in [
        ("mp4v", VideoCodec::Mpeg4),
        ("XVID", VideoCodec::Mpeg4),
        ("avc1", VideoCodec::H264),
        ("hvc1", VideoCodec::H265),
        ("mjpg", VideoCodec::Mjpeg),
        ("vp09", VideoCodec::Vp9),
    ] {
        let parsed: FourCc = tag.parse().unwrap();
        assert_eq!(parsed.codec(), codec, "{tag}");
        assert_eq!(parsed.to_string(), tag.to_ascii_lowercase());
    }
}

#[test]
fn fourcc_default_is_mp4v() {
    assert_eq!(FourCc::default().to_string(), "mp4v");
}

#[test]
fn fourcc_rejects_bad_tags() {
    for tag in ["", "mp4", "mp4vv", "zzzz", "mp4 ", "mp\u{e9}"] {
        match tag.parse::<FourCc>() {
            Err(FramecastError::UnsupportedCodecTag(rejected)) => assert_eq!(rejected, tag),
            other => panic!("expected UnsupportedCodecTag for {tag:?}, got {other:?}"),
        }
    }
}

// ── Debug output ─────────────────────────────────────────────────

#[test]
fn debug_hides_callback() {
    let extract = format!("{:?}", ExtractOptions::new().with_progress(Arc::new(Silent)));
    assert!(!extract.contains("progress"));

    let assemble = format!("{:?}", AssembleOptions::new(30.0).with_progress(Arc::new(Silent)));
    assert!(assemble.contains("codec_tag"));
    assert!(!assemble.contains("progress"));
}

#[test]
fn assemble_extension_leading_dot_is_ignored() {
    let options = AssembleOptions::new(30.0).with_image_extension(".png");
    assert_eq!(options.image_extension(), "png");
}
