// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use image::Rgba;

/// RGBA color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8, pub u8);

impl Color {
    /// Opaque white.
    pub const WHITE: Color = Color(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Color = Color(0, 0, 0, 255);
    /// Fully transparent.
    pub const TRANSPARENT: Color = Color(0, 0, 0, 0);

    /// Create an opaque color from RGB values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b, 255)
    }

    /// Create a color with an explicit alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(r, g, b, a)
    }

    /// Same color with a different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self(self.0, self.1, self.2, a)
    }

    /// Color channels as floats in `[0, 1]`.
    #[must_use]
    pub fn to_f32(self) -> [f32; 4] {
        [
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
            f32::from(self.3) / 255.0,
        ]
    }
}

impl From<Color> for Rgba<u8> {
    fn from(c: Color) -> Self {
        Rgba([c.0, c.1, c.2, c.3])
    }
}

impl From<Rgba<u8>> for Color {
    fn from(p: Rgba<u8>) -> Self {
        Self(p[0], p[1], p[2], p[3])
    }
}

/// Marker fill for the subject's left side, `rgb(235,105,233)`.
pub const COLOR_LEFT: Color = Color::new(235, 105, 233);

/// Marker fill for the subject's right side. Currently identical to the left.
pub const COLOR_RIGHT: Color = Color::new(235, 105, 233);

/// Face tessellation stroke, `#C0C0C070`.
pub const TESSELATION_COLOR: Color = Color::rgba(192, 192, 192, 112);

/// Tint for foreground pixels in `mask` mode, `#00FF007F`.
pub const FOREGROUND_TINT: Color = Color::rgba(0, 255, 0, 127);

/// Tint for background pixels in `cutout` mode, `#0000FF7F`.
pub const BACKGROUND_TINT: Color = Color::rgba(0, 0, 255, 127);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_conversion() {
        let px: Rgba<u8> = TESSELATION_COLOR.into();
        assert_eq!(px, Rgba([192, 192, 192, 112]));
        assert_eq!(Color::from(px), TESSELATION_COLOR);
    }

    #[test]
    fn test_with_alpha() {
        assert_eq!(Color::WHITE.with_alpha(0), Color(255, 255, 255, 0));
        let f = FOREGROUND_TINT.to_f32();
        assert!((f[1] - 1.0).abs() < f32::EPSILON);
        assert!((f[3] - 127.0 / 255.0).abs() < f32::EPSILON);
    }
}
