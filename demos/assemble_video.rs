//! Draw a short gradient sequence and assemble it into a video.
//!
//! Usage:
//!   cargo run --example assemble_video -- [output_file]

use std::error::Error;
use std::sync::Arc;

use framecast::{AssembleOptions, ProgressCallback, ProgressInfo};
use image::{Rgb, RgbImage};

struct PrintProgress;

impl ProgressCallback for PrintProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(percentage) = info.percentage {
            println!("  {}/{} ({percentage:.0}%)", info.current, info.total.unwrap_or(0));
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "gradient.mp4".to_string());

    let frames = scratch_dir()?;
    println!("Drawing 60 frames into {}...", frames.display());
    for index in 0..60u32 {
        let shade = (index * 4) as u8;
        let image = RgbImage::from_fn(320, 240, |x, _| Rgb([shade, (x % 256) as u8, 255 - shade]));
        image.save(frames.join(format!("{index:05}.jpg")))?;
    }

    let options = AssembleOptions::new(30.0)
        .with_progress(Arc::new(PrintProgress))
        .with_batch_size(15);
    let summary = framecast::assemble_video(&frames, &output_path, &options)?;
    println!(
        "Wrote {} frames ({}x{}) to {}",
        summary.frames_written,
        summary.width,
        summary.height,
        summary.video_path.display()
    );

    std::fs::remove_dir_all(&frames)?;
    Ok(())
}

fn scratch_dir() -> std::io::Result<std::path::PathBuf> {
    let dir = std::env::temp_dir().join(format!("framecast-demo-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
