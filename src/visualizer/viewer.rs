// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Live window for rendered overlay frames.

use image::RgbImage;
use minifb::{Key, Window, WindowOptions};

use crate::error::{OverlayError, Result};
use crate::surface::Surface;

/// A simple overlay viewer using minifb. ESC or Q closes it.
pub struct Viewer {
    window: Window,
    width: usize,
    height: usize,
    buffer: Vec<u32>,
}

impl Viewer {
    /// Create a new viewer window.
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be opened.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| OverlayError::VisualizerError(format!("Failed to create window: {e}")))?;

        window.set_target_fps(60);

        Ok(Self {
            window,
            width,
            height,
            buffer: Vec::new(),
        })
    }

    /// Whether the window is open and no close key is held.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.window.is_open()
            && !self.window.is_key_down(Key::Escape)
            && !self.window.is_key_down(Key::Q)
    }

    /// Show a rendered surface, flattened over black.
    ///
    /// Returns `Ok(false)` once the user has closed the window.
    ///
    /// # Errors
    ///
    /// Returns an error if the window fails to present the frame.
    pub fn show(&mut self, surface: &Surface) -> Result<bool> {
        self.update(&surface.to_rgb())
    }

    /// Show an RGB frame at its native size.
    ///
    /// # Errors
    ///
    /// Returns an error if the window fails to present the frame.
    pub fn update(&mut self, image: &RgbImage) -> Result<bool> {
        if !self.is_open() {
            return Ok(false);
        }
        self.buffer = pack_rgb(image);
        self.width = image.width() as usize;
        self.height = image.height() as usize;

        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| OverlayError::VisualizerError(format!("Failed to update window: {e}")))?;
        Ok(true)
    }

    /// Keep the last frame on screen for `duration`, or until the window closes.
    ///
    /// # Errors
    ///
    /// Returns an error if the window fails to present the frame.
    pub fn wait(&mut self, duration: std::time::Duration) -> Result<bool> {
        if self.buffer.is_empty() {
            return Ok(self.is_open());
        }
        let start = std::time::Instant::now();
        while start.elapsed() < duration {
            if !self.is_open() {
                return Ok(false);
            }
            self.window
                .update_with_buffer(&self.buffer, self.width, self.height)
                .map_err(|e| {
                    OverlayError::VisualizerError(format!("Failed to update window: {e}"))
                })?;
        }
        Ok(true)
    }
}

/// Pack RGB pixels as `0x00RRGGBB`, the layout minifb expects.
fn pack_rgb(image: &RgbImage) -> Vec<u32> {
    image
        .pixels()
        .map(|p| (u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) | u32::from(p[2]))
        .collect()
}
