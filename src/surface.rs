// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 2-D raster drawing surface.
//!
//! [`Surface`] behaves like a browser canvas context reduced to what the overlay
//! needs: scaled image draws, rectangle fills, thick lines, circles, rectangle
//! outlines, and four Porter-Duff composite operations. Shapes are rasterized with
//! `imageproc` into a coverage stencil and then composited pixel by pixel, so every
//! operation honors the active [`CompositeOp`].
//!
//! Coordinates are backing-buffer pixels. When the surface is created with a device
//! pixel ratio other than 1 the backing buffer is enlarged, not the logical size.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;

use crate::visualizer::Color;

/// How drawn pixels combine with the existing surface content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeOp {
    /// Draw on top of existing content.
    #[default]
    SourceOver,
    /// Keep the new content only where the surface was already opaque.
    SourceIn,
    /// Keep the new content only where the surface was transparent.
    SourceOut,
    /// Keep the surface where it was opaque and show the new content underneath.
    DestinationAtop,
}

impl CompositeOp {
    /// Operations that also affect pixels the source does not cover.
    const fn is_unbounded(self) -> bool {
        !matches!(self, Self::SourceOver)
    }

    /// Combine straight-alpha source and destination colors.
    fn apply(self, src: [f32; 4], dst: [f32; 4]) -> [f32; 4] {
        let (sa, da) = (src[3], dst[3]);
        // (source weight, destination weight) in premultiplied space
        let (fs, fd) = match self {
            Self::SourceOver => (1.0, 1.0 - sa),
            Self::SourceIn => (da, 0.0),
            Self::SourceOut => (1.0 - da, 0.0),
            Self::DestinationAtop => (1.0 - da, sa),
        };
        let out_a = sa * fs + da * fd;
        if out_a <= f32::EPSILON {
            return [0.0; 4];
        }
        let mut out = [0.0, 0.0, 0.0, out_a];
        for c in 0..3 {
            out[c] = (src[c] * sa * fs + dst[c] * da * fd) / out_a;
        }
        out
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn pixel_to_f32(p: Rgba<u8>) -> [f32; 4] {
    Color::from(p).to_f32()
}

fn f32_to_pixel(v: [f32; 4]) -> Rgba<u8> {
    Rgba([to_u8(v[0]), to_u8(v[1]), to_u8(v[2]), to_u8(v[3])])
}

/// Coverage mask for one shape, clipped to the surface.
struct Stencil {
    x0: i32,
    y0: i32,
    mask: GrayImage,
}

impl Stencil {
    /// Allocate a stencil over the intersection of `[min, max]` with the surface.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn new(min: (f32, f32), max: (f32, f32), width: u32, height: u32) -> Option<Self> {
        if !(min.0.is_finite() && min.1.is_finite() && max.0.is_finite() && max.1.is_finite()) {
            return None;
        }
        let x0 = (min.0.floor() as i64).max(0);
        let y0 = (min.1.floor() as i64).max(0);
        let x1 = (max.0.ceil() as i64).min(i64::from(width) - 1);
        let y1 = (max.1.ceil() as i64).min(i64::from(height) - 1);
        if x1 < x0 || y1 < y0 {
            return None;
        }
        Some(Self {
            x0: x0 as i32,
            y0: y0 as i32,
            mask: GrayImage::new((x1 - x0 + 1) as u32, (y1 - y0 + 1) as u32),
        })
    }

    /// Translate a surface coordinate into stencil space.
    #[allow(clippy::cast_precision_loss)]
    fn local(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.x0 as f32, y - self.y0 as f32)
    }

    #[allow(clippy::cast_sign_loss)]
    fn covers(&self, x: u32, y: u32) -> bool {
        let (lx, ly) = (i64::from(x) - i64::from(self.x0), i64::from(y) - i64::from(self.y0));
        if lx < 0 || ly < 0 || lx >= i64::from(self.mask.width()) || ly >= i64::from(self.mask.height())
        {
            return false;
        }
        self.mask.get_pixel(lx as u32, ly as u32)[0] > 0
    }
}

const ON: Luma<u8> = Luma([255]);
const OFF: Luma<u8> = Luma([0]);

#[allow(clippy::cast_possible_truncation)]
fn round_i32(v: f32) -> i32 {
    v.round() as i32
}

/// RGBA drawing surface.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
    logical_size: (u32, u32),
    pixel_ratio: f32,
    composite: CompositeOp,
}

impl Surface {
    /// Create a transparent surface with a device pixel ratio of 1.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_pixel_ratio(width, height, 1.0)
    }

    /// Create a transparent surface whose backing buffer is scaled by `ratio`.
    ///
    /// Non-finite or non-positive ratios fall back to 1.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn with_pixel_ratio(width: u32, height: u32, ratio: f32) -> Self {
        let ratio = if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 };
        let (bw, bh) = if (ratio - 1.0).abs() < f32::EPSILON {
            (width, height)
        } else {
            (
                ((width as f32) * ratio).round().max(1.0) as u32,
                ((height as f32) * ratio).round().max(1.0) as u32,
            )
        };
        Self {
            pixels: RgbaImage::new(bw, bh),
            logical_size: (width, height),
            pixel_ratio: ratio,
            composite: CompositeOp::SourceOver,
        }
    }

    /// Backing buffer width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Backing buffer height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Size requested by the caller before pixel-ratio scaling.
    #[must_use]
    pub const fn logical_size(&self) -> (u32, u32) {
        self.logical_size
    }

    /// Device pixel ratio of the backing buffer.
    #[must_use]
    pub const fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Active composite operation.
    #[must_use]
    pub const fn composite(&self) -> CompositeOp {
        self.composite
    }

    /// Set the composite operation for subsequent draws.
    pub fn set_composite(&mut self, op: CompositeOp) {
        self.composite = op;
    }

    /// Pixel at backing coordinates.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    /// Borrow the backing buffer.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        for p in self.pixels.pixels_mut() {
            *p = Rgba([0, 0, 0, 0]);
        }
    }

    /// Copy of the surface with alpha kept.
    #[must_use]
    pub fn to_rgba(&self) -> RgbaImage {
        self.pixels.clone()
    }

    /// Copy of the surface flattened over black.
    #[must_use]
    pub fn to_rgb(&self) -> RgbImage {
        RgbImage::from_fn(self.width(), self.height(), |x, y| {
            let p = self.pixels.get_pixel(x, y);
            let a = f32::from(p[3]) / 255.0;
            image::Rgb([
                to_u8(f32::from(p[0]) / 255.0 * a),
                to_u8(f32::from(p[1]) / 255.0 * a),
                to_u8(f32::from(p[2]) / 255.0 * a),
            ])
        })
    }

    /// Draw an image scaled to cover the whole surface.
    pub fn draw_image(&mut self, image: &DynamicImage) {
        let (w, h) = (self.width(), self.height());
        let rgba = if image.width() == w && image.height() == h {
            image.to_rgba8()
        } else {
            imageops::resize(&image.to_rgba8(), w, h, FilterType::Triangle)
        };
        let op = self.composite;
        for (dst, src) in self.pixels.pixels_mut().zip(rgba.pixels()) {
            *dst = f32_to_pixel(op.apply(pixel_to_f32(*src), pixel_to_f32(*dst)));
        }
    }

    /// Draw a probability mask scaled to cover the whole surface.
    ///
    /// Each mask value becomes the alpha of a white pixel, so foreground is opaque
    /// and background transparent.
    pub fn draw_mask(&mut self, mask: &GrayImage) {
        let (w, h) = (self.width(), self.height());
        let scaled;
        let mask = if mask.width() == w && mask.height() == h {
            mask
        } else {
            scaled = imageops::resize(mask, w, h, FilterType::Triangle);
            &scaled
        };
        let op = self.composite;
        for (dst, m) in self.pixels.pixels_mut().zip(mask.pixels()) {
            let src = [1.0, 1.0, 1.0, f32::from(m[0]) / 255.0];
            *dst = f32_to_pixel(op.apply(src, pixel_to_f32(*dst)));
        }
    }

    /// Fill an axis-aligned rectangle.
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        let (x0, x1) = (x.min(x + width), x.max(x + width));
        let (y0, y1) = (y.min(y + height), y.max(y + height));
        let stencil = Stencil::new((x0, y0), (x1 - 1.0, y1 - 1.0), self.width(), self.height())
            .map(|mut s| {
                let (lx, ly) = s.local(x0, y0);
                fill_box(&mut s.mask, lx, ly, x1 - x0, y1 - y0, ON);
                s
            });
        self.paint(stencil.as_ref(), color);
    }

    /// Stroke a straight segment with butt caps.
    pub fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Color) {
        let half = (width.max(1.0)) / 2.0;
        let min = (from.0.min(to.0) - half, from.1.min(to.1) - half);
        let max = (from.0.max(to.0) + half, from.1.max(to.1) + half);
        let stencil = Stencil::new(min, max, self.width(), self.height()).map(|mut s| {
            let a = s.local(from.0, from.1);
            let b = s.local(to.0, to.1);
            rasterize_segment(&mut s.mask, a, b, width);
            s
        });
        self.paint(stencil.as_ref(), color);
    }

    /// Fill a disc.
    pub fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Color) {
        if !(radius.is_finite() && radius > 0.0) {
            return;
        }
        let stencil = Stencil::new(
            (center.0 - radius, center.1 - radius),
            (center.0 + radius, center.1 + radius),
            self.width(),
            self.height(),
        )
        .map(|mut s| {
            let (cx, cy) = s.local(center.0, center.1);
            draw_filled_circle_mut(&mut s.mask, (round_i32(cx), round_i32(cy)), round_i32(radius), ON);
            s
        });
        self.paint(stencil.as_ref(), color);
    }

    /// Stroke a circle outline centered on the radius.
    pub fn stroke_circle(&mut self, center: (f32, f32), radius: f32, width: f32, color: Color) {
        if !(radius.is_finite() && radius > 0.0 && width > 0.0) {
            return;
        }
        let outer = radius + width / 2.0;
        let inner = radius - width / 2.0;
        let stencil = Stencil::new(
            (center.0 - outer, center.1 - outer),
            (center.0 + outer, center.1 + outer),
            self.width(),
            self.height(),
        )
        .map(|mut s| {
            let c = s.local(center.0, center.1);
            let c = (round_i32(c.0), round_i32(c.1));
            draw_filled_circle_mut(&mut s.mask, c, round_i32(outer), ON);
            if inner >= 1.0 {
                draw_filled_circle_mut(&mut s.mask, c, round_i32(inner), OFF);
            }
            s
        });
        self.paint(stencil.as_ref(), color);
    }

    /// Stroke a rectangle outline centered on its edges.
    pub fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, line_width: f32, color: Color) {
        let half = line_width.max(1.0) / 2.0;
        let (x0, x1) = (x.min(x + width), x.max(x + width));
        let (y0, y1) = (y.min(y + height), y.max(y + height));
        let stencil = Stencil::new(
            (x0 - half, y0 - half),
            (x1 + half, y1 + half),
            self.width(),
            self.height(),
        )
        .map(|mut s| {
            let (ox, oy) = s.local(x0 - half, y0 - half);
            fill_box(&mut s.mask, ox, oy, x1 - x0 + 2.0 * half, y1 - y0 + 2.0 * half, ON);
            let (ix, iy) = s.local(x0 + half, y0 + half);
            fill_box(&mut s.mask, ix, iy, x1 - x0 - 2.0 * half, y1 - y0 - 2.0 * half, OFF);
            s
        });
        self.paint(stencil.as_ref(), color);
    }

    /// Composite `color` through a stencil with the active operation.
    fn paint(&mut self, stencil: Option<&Stencil>, color: Color) {
        let src = color.to_f32();
        let op = self.composite;
        if op.is_unbounded() {
            let clear = [0.0; 4];
            for (x, y, dst) in self.pixels.enumerate_pixels_mut() {
                let covered = stencil.is_some_and(|s| s.covers(x, y));
                let s = if covered { src } else { clear };
                *dst = f32_to_pixel(op.apply(s, pixel_to_f32(*dst)));
            }
            return;
        }
        let Some(stencil) = stencil else {
            return;
        };
        for (lx, ly, m) in stencil.mask.enumerate_pixels() {
            if m[0] == 0 {
                continue;
            }
            #[allow(clippy::cast_sign_loss)]
            let (x, y) = ((stencil.x0 as u32) + lx, (stencil.y0 as u32) + ly);
            let dst = self.pixels.get_pixel_mut(x, y);
            *dst = f32_to_pixel(op.apply(src, pixel_to_f32(*dst)));
        }
    }
}

/// Fill a box given in stencil coordinates, ignoring empty boxes.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fill_box(mask: &mut GrayImage, x: f32, y: f32, width: f32, height: f32, value: Luma<u8>) {
    let (w, h) = (width.round(), height.round());
    if !(w >= 1.0 && h >= 1.0) {
        return;
    }
    let rect = Rect::at(round_i32(x), round_i32(y)).of_size(w as u32, h as u32);
    draw_filled_rect_mut(mask, rect, value);
}

/// Rasterize a thick segment as a quad, falling back to a disc for zero length.
fn rasterize_segment(mask: &mut GrayImage, a: (f32, f32), b: (f32, f32), width: f32) {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len = dx.hypot(dy);
    let half = width.max(1.0) / 2.0;
    if len < 0.5 {
        draw_filled_circle_mut(mask, (round_i32(a.0), round_i32(a.1)), round_i32(half), ON);
        return;
    }
    let (nx, ny) = (-dy / len * half, dx / len * half);
    let quad = [
        Point::new(round_i32(a.0 + nx), round_i32(a.1 + ny)),
        Point::new(round_i32(b.0 + nx), round_i32(b.1 + ny)),
        Point::new(round_i32(b.0 - nx), round_i32(b.1 - ny)),
        Point::new(round_i32(a.0 - nx), round_i32(a.1 - ny)),
    ];
    if quad[0] == quad[3] || quad[0] == quad[1] {
        imageproc::drawing::draw_line_segment_mut(mask, a, b, ON);
        return;
    }
    draw_polygon_mut(mask, &quad, ON);
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::new(255, 0, 0);

    #[test]
    fn test_new_is_transparent() {
        let s = Surface::new(4, 3);
        assert_eq!((s.width(), s.height()), (4, 3));
        assert!(s.image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_pixel_ratio_scales_backing_buffer() {
        let s = Surface::with_pixel_ratio(100, 50, 2.0);
        assert_eq!((s.width(), s.height()), (200, 100));
        assert_eq!(s.logical_size(), (100, 50));

        let s = Surface::with_pixel_ratio(100, 50, f32::NAN);
        assert_eq!((s.width(), s.height()), (100, 50));
    }

    #[test]
    fn test_fill_rect_source_over() {
        let mut s = Surface::new(10, 10);
        s.fill_rect(2.0, 2.0, 3.0, 3.0, RED);
        assert_eq!(s.pixel(3, 3), Rgba([255, 0, 0, 255]));
        assert_eq!(s.pixel(0, 0)[3], 0);
        assert_eq!(s.pixel(5, 5)[3], 0);
    }

    #[test]
    fn test_source_in_only_keeps_opaque_region() {
        let mut s = Surface::new(4, 1);
        s.fill_rect(0.0, 0.0, 2.0, 1.0, Color::WHITE);
        s.set_composite(CompositeOp::SourceIn);
        s.fill_rect(0.0, 0.0, 4.0, 1.0, RED);
        assert_eq!(s.pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(s.pixel(3, 0)[3], 0);
    }

    #[test]
    fn test_source_out_only_keeps_transparent_region() {
        let mut s = Surface::new(4, 1);
        s.fill_rect(0.0, 0.0, 2.0, 1.0, Color::WHITE);
        s.set_composite(CompositeOp::SourceOut);
        s.fill_rect(0.0, 0.0, 4.0, 1.0, RED);
        assert_eq!(s.pixel(0, 0)[3], 0);
        assert_eq!(s.pixel(3, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_destination_atop_fills_holes() {
        let mut s = Surface::new(2, 1);
        s.fill_rect(0.0, 0.0, 1.0, 1.0, RED);
        s.set_composite(CompositeOp::DestinationAtop);
        let blue = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 1, Rgba([0, 0, 255, 255])));
        s.draw_image(&blue);
        assert_eq!(s.pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(s.pixel(1, 0), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_translucent_over_opaque() {
        let mut s = Surface::new(1, 1);
        s.fill_rect(0.0, 0.0, 1.0, 1.0, Color::BLACK);
        s.fill_rect(0.0, 0.0, 1.0, 1.0, Color::rgba(0, 255, 0, 127));
        let p = s.pixel(0, 0);
        assert_eq!(p[3], 255);
        assert!((126..=128).contains(&p[1]));
    }

    #[test]
    fn test_stroke_line_covers_path() {
        let mut s = Surface::new(20, 20);
        s.stroke_line((2.0, 10.0), (17.0, 10.0), 4.0, RED);
        assert_eq!(s.pixel(10, 10), Rgba([255, 0, 0, 255]));
        assert_eq!(s.pixel(10, 2)[3], 0);
        assert_eq!(s.pixel(0, 10)[3], 0);
    }

    #[test]
    fn test_stroke_line_offscreen_and_degenerate() {
        let mut s = Surface::new(10, 10);
        s.stroke_line((-50.0, -50.0), (-40.0, -40.0), 3.0, RED);
        s.stroke_line((f32::NAN, 1.0), (5.0, 5.0), 3.0, RED);
        assert!(s.image().pixels().all(|p| p[3] == 0));
        s.stroke_line((5.0, 5.0), (5.0, 5.0), 3.0, RED);
        assert_eq!(s.pixel(5, 5), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_circles() {
        let mut s = Surface::new(30, 30);
        s.fill_circle((15.0, 15.0), 5.0, RED);
        assert_eq!(s.pixel(15, 15), Rgba([255, 0, 0, 255]));
        assert_eq!(s.pixel(15, 25)[3], 0);

        let mut s = Surface::new(30, 30);
        s.stroke_circle((15.0, 15.0), 8.0, 2.0, RED);
        assert_eq!(s.pixel(15, 15)[3], 0);
        assert_eq!(s.pixel(23, 15), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_stroke_rect_is_hollow() {
        let mut s = Surface::new(40, 40);
        s.stroke_rect(10.0, 10.0, 20.0, 20.0, 2.0, RED);
        assert_eq!(s.pixel(10, 20), Rgba([255, 0, 0, 255]));
        assert_eq!(s.pixel(20, 30), Rgba([255, 0, 0, 255]));
        assert_eq!(s.pixel(20, 20)[3], 0);
    }

    #[test]
    fn test_draw_mask_sets_alpha() {
        let mut s = Surface::new(4, 4);
        let mask = GrayImage::from_fn(4, 4, |x, _| if x < 2 { Luma([255]) } else { Luma([0]) });
        s.draw_mask(&mask);
        assert_eq!(s.pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(s.pixel(3, 0)[3], 0);

        let mut s = Surface::new(8, 8);
        s.draw_mask(&mask);
        assert!(s.pixel(0, 0)[3] > 200);
        assert!(s.pixel(7, 0)[3] < 55);
    }

    #[test]
    fn test_clear_and_flatten() {
        let mut s = Surface::new(2, 2);
        s.fill_rect(0.0, 0.0, 2.0, 2.0, Color::rgba(200, 100, 0, 255));
        assert_eq!(s.to_rgb().get_pixel(1, 1), &image::Rgb([200, 100, 0]));
        s.clear();
        assert!(s.image().pixels().all(|p| p[3] == 0));
        assert_eq!(s.to_rgb().get_pixel(1, 1), &image::Rgb([0, 0, 0]));
    }
}
