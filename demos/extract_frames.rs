//! Split a video into numbered frames.
//!
//! Usage:
//!   cargo run --example extract_frames -- <input_file> [output_dir]

use std::error::Error;

use framecast::{ExtractOptions, ExtractOutcome, LinePrompt, VideoSource};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next().unwrap_or_else(|| "input.mp4".to_string());
    let output_dir = args.next().unwrap_or_else(|| "frames".to_string());

    println!("Opening {input_path}...");
    let source = VideoSource::open(&input_path)?;
    let metadata = source.metadata();
    println!(
        "Video: {}x{}, {:.2} fps, {} frames declared",
        metadata.width, metadata.height, metadata.frames_per_second, metadata.frame_count,
    );
    drop(source);

    let options = ExtractOptions::new().with_image_extension("png");
    let outcome = framecast::extract_frames(
        &input_path,
        &output_dir,
        &options,
        &mut LinePrompt::terminal(),
    )?;

    match outcome {
        ExtractOutcome::Completed(summary) => println!(
            "Saved {} frames to {}",
            summary.frames_written,
            summary.output_dir.display()
        ),
        ExtractOutcome::Declined => println!("stop here"),
    }
    Ok(())
}
