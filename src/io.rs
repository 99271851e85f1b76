// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Saving rendered overlay frames.

use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::error::{OverlayError, Result};
use crate::source::SourceMeta;

/// Find the next available run directory (render, render2, render3, etc.)
#[must_use]
pub fn find_next_run_dir(base: &str, prefix: &str) -> PathBuf {
    let base_path = Path::new(base);
    let first = base_path.join(prefix);
    if !first.exists() {
        return first;
    }
    (2..)
        .map(|i| base_path.join(format!("{prefix}{i}")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

/// Writes rendered frames into one run directory.
#[derive(Debug, Clone)]
pub struct FrameWriter {
    save_dir: PathBuf,
    saved: usize,
}

impl FrameWriter {
    /// Create a writer for `save_dir`. The directory is created on the first save.
    #[must_use]
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            saved: 0,
        }
    }

    /// Directory frames are written into.
    #[must_use]
    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Number of frames saved so far.
    #[must_use]
    pub const fn saved(&self) -> usize {
        self.saved
    }

    /// Save one frame as PNG, named after the source file stem.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the image cannot be
    /// written.
    pub fn save(&mut self, meta: &SourceMeta, frame: &RgbaImage) -> Result<PathBuf> {
        let path = save_frame(&self.save_dir, meta, frame)?;
        self.saved += 1;
        Ok(path)
    }
}

/// Save one frame as `<dir>/<stem>.png`, keeping transparency.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the image cannot be written.
pub fn save_frame(dir: &Path, meta: &SourceMeta, frame: &RgbaImage) -> Result<PathBuf> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| {
            OverlayError::IoError(format!("Failed to create directory {}: {e}", dir.display()))
        })?;
    }
    let path = dir.join(format!("{}.png", meta.stem()));
    frame
        .save(&path)
        .map_err(|e| OverlayError::ImageError(format!("Failed to save {}: {e}", path.display())))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_find_next_run_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().to_string_lossy().to_string();
        assert_eq!(find_next_run_dir(&base, "render"), tmp.path().join("render"));
        std::fs::create_dir(tmp.path().join("render")).unwrap();
        assert_eq!(find_next_run_dir(&base, "render"), tmp.path().join("render2"));
        std::fs::create_dir(tmp.path().join("render2")).unwrap();
        assert_eq!(find_next_run_dir(&base, "render"), tmp.path().join("render3"));
    }

    #[test]
    fn test_save_frame_keeps_alpha() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out");
        let meta = SourceMeta {
            frame_idx: 0,
            total_frames: 1,
            path: "frames/person.jpg".to_string(),
        };
        let frame = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 40]));

        let mut writer = FrameWriter::new(&dir);
        let path = writer.save(&meta, &frame).unwrap();
        assert_eq!(path, dir.join("person.png"));
        assert_eq!(writer.saved(), 1);

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.get_pixel(2, 1), &Rgba([10, 20, 30, 40]));
    }
}
