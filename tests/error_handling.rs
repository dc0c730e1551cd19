//! Failure modes of extraction and assembly.

use std::fs;
use std::path::Path;

use framecast::{AssembleOptions, AssumeYes, ExtractOptions, FramecastError, VideoSource};
use image::{Rgb, RgbImage};

fn never_asked(directory: &Path) -> bool {
    panic!("Should not ask about {directory:?}");
}

#[test]
fn missing_video_creates_nothing() {
    let workspace = tempfile::tempdir().unwrap();
    let output = workspace.path().join("frames");

    let result = framecast::extract_frames(
        workspace.path().join("missing.mp4"),
        &output,
        &ExtractOptions::new(),
        &mut never_asked,
    );
    match result {
        Err(error @ FramecastError::FileOpen { .. }) => {
            assert!(error.to_string().contains("Failed to open video file"), "{error}");
        }
        other => panic!("Expected FileOpen, got {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn unwritable_image_extension_is_refused_up_front() {
    let workspace = tempfile::tempdir().unwrap();
    let output = workspace.path().join("frames");

    // The video does not exist either; the extension is checked first.
    let result = framecast::extract_frames(
        workspace.path().join("missing.mp4"),
        &output,
        &ExtractOptions::new().with_image_extension("xyz"),
        &mut never_asked,
    );
    match result {
        Err(FramecastError::UnsupportedImageFormat(extension)) => assert_eq!(extension, "xyz"),
        other => panic!("Expected UnsupportedImageFormat, got {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn garbage_file_is_not_a_video() {
    let workspace = tempfile::tempdir().unwrap();
    let bogus = workspace.path().join("bogus.mp4");
    fs::write(&bogus, b"definitely not a video container").unwrap();

    let result = VideoSource::open(&bogus);
    assert!(
        matches!(
            result,
            Err(FramecastError::FileOpen { .. }) | Err(FramecastError::NoVideoStream)
        ),
        "unexpected result: {result:?}"
    );
}

#[test]
fn output_path_that_is_a_file() {
    let workspace = tempfile::tempdir().unwrap();
    let images = workspace.path().join("images");
    fs::create_dir(&images).unwrap();
    RgbImage::from_pixel(32, 32, Rgb([0, 128, 255]))
        .save(images.join("00000.jpg"))
        .unwrap();

    let video = workspace.path().join("one.mp4");
    match framecast::assemble_video(&images, &video, &AssembleOptions::new(10.0)) {
        Err(FramecastError::EncoderUnavailable { .. }) => return,
        result => {
            result.expect("Failed to assemble video");
        }
    }

    let occupied = workspace.path().join("occupied");
    fs::write(&occupied, b"").unwrap();
    let result =
        framecast::extract_frames(&video, &occupied, &ExtractOptions::new(), &mut AssumeYes);
    match result {
        Err(FramecastError::NotADirectory(path)) => assert_eq!(path, occupied),
        other => panic!("Expected NotADirectory, got {other:?}"),
    }
}

#[test]
fn empty_image_directory() {
    let workspace = tempfile::tempdir().unwrap();
    fs::write(workspace.path().join("frame.png"), b"").unwrap();

    let video = workspace.path().join("out.mp4");
    let result = framecast::assemble_video(workspace.path(), &video, &AssembleOptions::new(30.0));
    match result {
        Err(FramecastError::NoImagesFound {
            directory,
            extension,
        }) => {
            assert_eq!(directory, workspace.path());
            assert_eq!(extension, "jpg");
        }
        other => panic!("Expected NoImagesFound, got {other:?}"),
    }
    assert!(!video.exists());
}

#[test]
fn missing_image_directory() {
    let workspace = tempfile::tempdir().unwrap();
    let result = framecast::assemble_video(
        workspace.path().join("nowhere"),
        workspace.path().join("out.mp4"),
        &AssembleOptions::new(30.0),
    );
    assert!(matches!(result, Err(FramecastError::ReadDirectory { .. })));
}

#[test]
fn frame_rate_is_validated_before_anything_else() {
    let workspace = tempfile::tempdir().unwrap();
    for rate in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let result = framecast::assemble_video(
            workspace.path().join("nowhere"),
            workspace.path().join("out.mp4"),
            &AssembleOptions::new(rate),
        );
        assert!(
            matches!(result, Err(FramecastError::InvalidFrameRate(_))),
            "rate {rate} gave {result:?}"
        );
    }
}

#[test]
fn unreadable_image_names_the_file() {
    let workspace = tempfile::tempdir().unwrap();
    let broken = workspace.path().join("00000.jpg");
    fs::write(&broken, b"not a jpeg").unwrap();

    let video = workspace.path().join("out.mp4");
    let result = framecast::assemble_video(workspace.path(), &video, &AssembleOptions::new(30.0));
    match result {
        Err(FramecastError::ImageDecode { path, .. }) => assert_eq!(path, broken),
        other => panic!("Expected ImageDecode, got {other:?}"),
    }
    assert!(!video.exists());
}

#[test]
fn errors_render_readable_messages() {
    let error = FramecastError::DimensionMismatch {
        path: "frames/00007.jpg".into(),
        expected: (640, 480),
        found: (320, 240),
    };
    let message = error.to_string();
    assert!(message.contains("00007.jpg"), "{message}");
    assert!(message.contains("640x480"), "{message}");
    assert!(message.contains("320x240"), "{message}");
}
