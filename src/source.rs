// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Frame sources for the overlay pipeline.
//!
//! Frames are still images read from disk: a single file, an explicit list, every
//! image in a directory, or a simple `dir/*.ext` glob. Directory and glob sources
//! are visited in sorted path order so frame `i` lines up with line `i` of a
//! recorded result file.

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{OverlayError, Result};

/// Image extensions recognised when scanning directories.
pub const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "bmp", "gif", "webp", "tiff", "tif"];

/// Input frames for the overlay.
#[derive(Debug, Clone)]
pub enum Source {
    /// Path to an image file.
    Image(PathBuf),
    /// In-memory image.
    ImageBuffer(DynamicImage),
    /// List of image paths, visited in the given order.
    ImageList(Vec<PathBuf>),
    /// Directory containing images.
    Directory(PathBuf),
    /// Glob pattern for images.
    Glob(String),
}

impl Source {
    /// Check if this source yields a single frame.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        matches!(self, Self::Image(_) | Self::ImageBuffer(_))
    }

    /// Check if this source is a directory, glob, or list.
    #[must_use]
    pub const fn is_batch(&self) -> bool {
        matches!(self, Self::Directory(_) | Self::Glob(_) | Self::ImageList(_))
    }

    /// Get the path if this source has one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Image(p) | Self::Directory(p) => Some(p),
            _ => None,
        }
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        if s.contains('*') {
            return Self::Glob(s.to_string());
        }
        let path = PathBuf::from(s);
        if path.is_dir() {
            return Self::Directory(path);
        }
        Self::Image(path)
    }
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        if path.is_dir() {
            Self::Directory(path)
        } else {
            Self::Image(path)
        }
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Self::from(path.to_path_buf())
    }
}

impl From<DynamicImage> for Source {
    fn from(img: DynamicImage) -> Self {
        Self::ImageBuffer(img)
    }
}

impl From<Vec<PathBuf>> for Source {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self::ImageList(paths)
    }
}

/// Metadata about a source frame.
#[derive(Debug, Clone)]
pub struct SourceMeta {
    /// Frame index (0 for single images).
    pub frame_idx: usize,
    /// Total frames in the source.
    pub total_frames: usize,
    /// Source path, empty for in-memory images.
    pub path: String,
}

impl Default for SourceMeta {
    fn default() -> Self {
        Self {
            frame_idx: 0,
            total_frames: 1,
            path: String::new(),
        }
    }
}

impl SourceMeta {
    /// File stem of the source path, or a zero-padded frame index when there is none.
    #[must_use]
    pub fn stem(&self) -> String {
        Path::new(&self.path)
            .file_stem()
            .map_or_else(|| format!("frame{:05}", self.frame_idx), |s| s.to_string_lossy().into_owned())
    }
}

/// Iterator over frames from a source.
#[derive(Debug)]
pub struct SourceIterator {
    source: Source,
    current_frame: usize,
    image_paths: Vec<PathBuf>,
}

impl SourceIterator {
    /// Create a new source iterator.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or glob base does not exist.
    pub fn new(source: Source) -> Result<Self> {
        let image_paths = match &source {
            Source::Directory(path) => collect_images_from_dir(path)?,
            Source::Glob(pattern) => collect_images_from_glob(pattern)?,
            Source::Image(path) => vec![path.clone()],
            Source::ImageList(paths) => paths.clone(),
            Source::ImageBuffer(_) => Vec::new(),
        };
        Ok(Self {
            source,
            current_frame: 0,
            image_paths,
        })
    }

    /// Number of frames this iterator yields in total.
    #[must_use]
    pub fn total_frames(&self) -> usize {
        match self.source {
            Source::ImageBuffer(_) => 1,
            _ => self.image_paths.len(),
        }
    }

    fn next_image(&mut self) -> Option<Result<(DynamicImage, SourceMeta)>> {
        let path = self.image_paths.get(self.current_frame)?;
        let meta = SourceMeta {
            frame_idx: self.current_frame,
            total_frames: self.image_paths.len(),
            path: path.to_string_lossy().to_string(),
        };
        self.current_frame += 1;

        Some(image::open(path).map(|img| (img, meta)).map_err(|e| {
            OverlayError::ImageError(format!("Failed to load {}: {e}", path.display()))
        }))
    }
}

impl Iterator for SourceIterator {
    type Item = Result<(DynamicImage, SourceMeta)>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Source::ImageBuffer(img) = &self.source {
            if self.current_frame > 0 {
                return None;
            }
            self.current_frame = 1;
            return Some(Ok((img.clone(), SourceMeta::default())));
        }
        self.next_image()
    }
}

/// Check if a path is an image file based on extension.
fn is_image_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy().to_lowercase();
        IMAGE_EXTENSIONS.contains(&ext.as_str())
    })
}

/// Collect image paths from a directory, sorted.
fn collect_images_from_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(OverlayError::ImageError(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_image_file(path))
        .collect();
    paths.sort();
    Ok(paths)
}

/// Collect image paths from a `dir/*.ext` or `dir/*` pattern, sorted.
fn collect_images_from_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let Some(star_pos) = pattern.find('*') else {
        return Ok(vec![PathBuf::from(pattern)]);
    };
    let dir_part = &pattern[..star_pos];
    let dir = if dir_part.is_empty() {
        Path::new(".")
    } else {
        Path::new(dir_part.trim_end_matches(['/', '\\']))
    };
    let ext_filter = pattern[star_pos..].strip_prefix("*.").map(str::to_lowercase);

    if !dir.is_dir() {
        return Err(OverlayError::ImageError(format!(
            "Directory not found: {}",
            dir.display()
        )));
    }
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            ext_filter.as_ref().map_or_else(
                || is_image_file(path),
                |ext| {
                    path.extension()
                        .is_some_and(|e| e.to_string_lossy().to_lowercase() == *ext)
                },
            )
        })
        .collect();
    paths.sort();
    Ok(paths)
}
