use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use dc6_core::{Animation, Palette};
use image::RgbaImage;
use tracing::{debug, warn};

/// File name used for a single exported frame.
pub fn frame_file_name(direction: usize, frame: usize) -> String {
    format!("frame_dir{direction}_frame{frame}.png")
}

/// Load a palette from a JSON array of 256 `[r, g, b, a]` entries.
pub fn load_palette(path: &Path) -> Result<Palette> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read palette: {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Invalid palette file: {}", path.display()))
}

/// Write every frame of `animation` as an RGBA PNG under `out_dir`.
///
/// Returns the paths written, in direction then frame order. PNG has no
/// zero-sized images, so frames with no pixels are skipped and left out.
pub fn export_frames(
    animation: &Animation,
    palette: &Palette,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(animation.frame_count());
    for (d, direction) in animation.directions.iter().enumerate() {
        for (f, frame) in direction.iter().enumerate() {
            if frame.width() == 0 || frame.height() == 0 {
                warn!(
                    direction = d,
                    frame = f,
                    width = frame.width(),
                    height = frame.height(),
                    "skipping empty frame"
                );
                continue;
            }
            let image = RgbaImage::from_raw(frame.width(), frame.height(), frame.to_rgba(palette))
                .ok_or_else(|| anyhow!("frame {d}/{f} has an inconsistent pixel buffer"))?;
            let path = out_dir.join(frame_file_name(d, f));
            image
                .save(&path)
                .with_context(|| format!("Failed to write image: {}", path.display()))?;
            debug!(direction = d, frame = f, path = %path.display(), "exported frame");
            written.push(path);
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dc6_core::{Direction, Frame};
    use tempfile::TempDir;

    #[test]
    fn frame_names_follow_direction_and_index() {
        assert_eq!(frame_file_name(0, 0), "frame_dir0_frame0.png");
        assert_eq!(frame_file_name(3, 12), "frame_dir3_frame12.png");
    }

    #[test]
    fn export_writes_one_png_per_frame() {
        let temp = TempDir::new().expect("tempdir");
        let mut animation = Animation::default();
        for _ in 0..2 {
            let frames = vec![
                Frame::from_pixels(2, 2, vec![5, 0, 0, 7]).unwrap(),
                Frame::from_pixels(1, 3, vec![1, 2, 3]).unwrap(),
            ];
            animation.directions.push(Direction::new(frames));
        }

        let out = temp.path().join("frames");
        let written = export_frames(&animation, &Palette::grayscale(), &out).unwrap();
        assert_eq!(written.len(), 4);
        assert!(out.join("frame_dir1_frame1.png").is_file());

        let image = image::open(out.join("frame_dir0_frame0.png")).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0).0, [5, 5, 5, 255]);
        assert_eq!(image.get_pixel(1, 1).0, [7, 7, 7, 255]);
    }

    #[test]
    fn export_skips_empty_frames() {
        let temp = TempDir::new().expect("tempdir");
        let mut animation = Animation::default();
        animation.directions.push(Direction::new(vec![
            Frame::from_pixels(1, 1, vec![3]).unwrap(),
            Frame::from_pixels(0, 0, Vec::new()).unwrap(),
            Frame::from_pixels(4, 0, Vec::new()).unwrap(),
            Frame::from_pixels(1, 2, vec![0, 9]).unwrap(),
        ]));
        let decoded = dc6_core::decode(&dc6_core::encode(&animation).unwrap()).unwrap();

        let out = temp.path().join("frames");
        let written = export_frames(&decoded, &Palette::grayscale(), &out).unwrap();
        assert_eq!(
            written,
            vec![out.join("frame_dir0_frame0.png"), out.join("frame_dir0_frame3.png")]
        );
        assert!(!out.join("frame_dir0_frame1.png").exists());
        assert!(!out.join("frame_dir0_frame2.png").exists());
    }

    #[test]
    fn palette_file_must_have_256_entries() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("palette.json");

        fs::write(&path, serde_json::to_string(&vec![[1u8, 2, 3, 4]; 256]).unwrap()).unwrap();
        assert_eq!(load_palette(&path).unwrap().color(9), [1, 2, 3, 4]);

        fs::write(&path, serde_json::to_string(&vec![[1u8, 2, 3]; 256]).unwrap()).unwrap();
        assert!(load_palette(&path).is_err());
    }
}
