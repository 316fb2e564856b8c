//! CPU rasterizer implementing [`Surface`] over a `tiny_skia::Pixmap`.
//!
//! Fills run without anti-aliasing, which keeps the output bit-exact across
//! runs and platforms. The pixmap converts to an `image::RgbaImage` once
//! painting is done.

use std::f64::consts::FRAC_PI_2;

use image::{Rgba, RgbaImage};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};

use crate::{parse_css_color, render, AvatarError, RenderConfig, RenderReport, Result, Surface};

/// Largest pixel count a raster surface will allocate
pub const MAX_RASTER_PIXELS: u64 = 1 << 26;

/// CPU surface painting into a pixmap
pub struct RasterSurface {
    pixmap: Pixmap,
    fill: Rgba<u8>,
    stroke: Rgba<u8>,
    path: PathBuilder,
    /// Current point and the start of its subpath
    cursor: Option<(f64, f64)>,
    subpath_start: Option<(f64, f64)>,
}

impl RasterSurface {
    /// Transparent surface of `width` x `height` pixels
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let invalid = || AvatarError::InvalidDimensions {
            width: width as f64,
            height: height as f64,
        };
        if width as u64 * height as u64 > MAX_RASTER_PIXELS {
            return Err(invalid());
        }
        let pixmap = Pixmap::new(width, height).ok_or_else(invalid)?;
        Ok(Self {
            pixmap,
            fill: Rgba([0, 0, 0, 255]),
            stroke: Rgba([0, 0, 0, 255]),
            path: PathBuilder::new(),
            cursor: None,
            subpath_start: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn fill_color(&self) -> Rgba<u8> {
        self.fill
    }

    pub fn stroke_color(&self) -> Rgba<u8> {
        self.stroke
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Unpremultiplied copy of the pixels
    pub fn to_image(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        image
    }

    fn fill_paint(&self) -> Paint<'static> {
        let [r, g, b, a] = self.fill.0;
        let mut paint = Paint::default();
        paint.set_color(Color::from_rgba8(r, g, b, a));
        paint.anti_alias = false;
        paint
    }

    fn move_cursor(&mut self, x: f64, y: f64) {
        self.path.move_to(x as f32, y as f32);
        self.cursor = Some((x, y));
        self.subpath_start = Some((x, y));
    }

    fn line_cursor(&mut self, x: f64, y: f64) {
        if self.cursor.is_none() {
            self.move_cursor(x, y);
            return;
        }
        self.path.line_to(x as f32, y as f32);
        self.cursor = Some((x, y));
    }
}

impl Surface for RasterSurface {
    fn set_fill_style(&mut self, color: &str) {
        if let Some(c) = parse_css_color(color) {
            self.fill = c;
        }
    }

    fn set_stroke_style(&mut self, color: &str) {
        if let Some(c) = parse_css_color(color) {
            self.stroke = c;
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let (x0, x1) = (x.min(x + width), x.max(x + width));
        let (y0, y1) = (y.min(y + height), y.max(y + height));
        let Some(rect) = Rect::from_ltrb(x0 as f32, y0 as f32, x1 as f32, y1 as f32) else {
            return;
        };
        let paint = self.fill_paint();
        self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    fn begin_path(&mut self) {
        self.path = PathBuilder::new();
        self.cursor = None;
        self.subpath_start = None;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.move_cursor(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.line_cursor(x, y);
    }

    /// Arc as cubic segments of at most a quarter turn each.
    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64) {
        if radius < 0.0 || !radius.is_finite() {
            return;
        }
        let sweep = (end_angle - start_angle).clamp(-std::f64::consts::TAU, std::f64::consts::TAU);
        let point = |a: f64| (x + radius * a.cos(), y + radius * a.sin());

        let (sx, sy) = point(start_angle);
        self.line_cursor(sx, sy);

        let segments = (sweep.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
        let step = sweep / segments as f64;
        let k = 4.0 / 3.0 * (step / 4.0).tan() * radius;
        for i in 0..segments {
            let a0 = start_angle + step * i as f64;
            let a1 = a0 + step;
            let (x0, y0) = point(a0);
            let (x1, y1) = point(a1);
            self.path.cubic_to(
                (x0 - k * a0.sin()) as f32,
                (y0 + k * a0.cos()) as f32,
                (x1 + k * a1.sin()) as f32,
                (y1 - k * a1.cos()) as f32,
                x1 as f32,
                y1 as f32,
            );
            self.cursor = Some((x1, y1));
        }
    }

    fn close_path(&mut self) {
        if self.cursor.is_some() {
            self.path.close();
            self.cursor = self.subpath_start;
        }
    }

    /// Nonzero winding fill of the current path
    fn fill(&mut self) {
        if self.fill[3] == 0 {
            return;
        }
        let Some(path) = self.path.clone().finish() else {
            return;
        };
        let paint = self.fill_paint();
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
}

/// Pixel size for a render: `ceil(width)` x `ceil(height)`, bounded by
/// [`MAX_RASTER_PIXELS`].
fn raster_size(config: &RenderConfig) -> Result<(u32, u32)> {
    let (width, height) = (config.width().ceil(), config.height().ceil());
    let invalid = AvatarError::InvalidDimensions {
        width: config.width(),
        height: config.height(),
    };
    if width > u32::MAX as f64 || height > u32::MAX as f64 || width * height > MAX_RASTER_PIXELS as f64 {
        return Err(invalid);
    }
    Ok((width as u32, height as u32))
}

/// Render `config` onto a transparent image of `ceil(width)` x `ceil(height)` pixels.
pub fn render_image(config: &RenderConfig) -> Result<RgbaImage> {
    render_image_with_report(config).map(|(image, _)| image)
}

/// As [`render_image`], also returning the choices made per cell.
pub fn render_image_with_report(config: &RenderConfig) -> Result<(RgbaImage, RenderReport)> {
    let (width, height) = raster_size(config)?;
    let mut surface = RasterSurface::new(width, height)?;
    let report = render(config, &mut surface)?;
    Ok((surface.to_image(), report))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    #[test]
    fn test_zero_size_rejected() {
        assert!(RasterSurface::new(0, 10).is_err());
        assert!(RasterSurface::new(10, 0).is_err());
    }

    #[test]
    fn test_oversized_surface_rejected() {
        assert!(matches!(
            RasterSurface::new(100_000, 100_000),
            Err(AvatarError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_oversized_render_rejected() {
        for (w, h) in [(1e12, 10.0), (10.0, 5e9), (20_000.0, 20_000.0)] {
            let config = RenderConfig::new("big", vec!["red".into()], w, h).unwrap();
            assert!(
                matches!(render_image(&config), Err(AvatarError::InvalidDimensions { .. })),
                "{}x{} accepted", w, h
            );
        }
    }

    #[test]
    fn test_fill_rect_covers_pixels() {
        let mut s = RasterSurface::new(10, 10).unwrap();
        s.set_fill_style("red");
        s.fill_rect(2.0, 3.0, 4.0, 5.0);
        let img = s.to_image();
        assert_eq!(*img.get_pixel(2, 3), RED);
        assert_eq!(*img.get_pixel(5, 7), RED);
        assert_eq!(*img.get_pixel(6, 7), CLEAR);
        assert_eq!(*img.get_pixel(2, 8), CLEAR);
        assert_eq!(*img.get_pixel(1, 3), CLEAR);
    }

    #[test]
    fn test_invalid_color_keeps_previous() {
        let mut s = RasterSurface::new(4, 4).unwrap();
        s.set_fill_style("blue");
        s.set_fill_style("not a color");
        assert_eq!(s.fill_color(), Rgba([0, 0, 255, 255]));
        s.set_stroke_style("#0f0");
        s.set_stroke_style("");
        assert_eq!(s.stroke_color(), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_polygon_fill() {
        let mut s = RasterSurface::new(10, 10).unwrap();
        s.set_fill_style("red");
        s.begin_path();
        s.move_to(0.0, 0.0);
        s.line_to(10.0, 0.0);
        s.line_to(0.0, 10.0);
        s.close_path();
        s.fill();
        let img = s.to_image();
        assert_eq!(*img.get_pixel(0, 0), RED);
        assert_eq!(*img.get_pixel(3, 3), RED);
        assert_eq!(*img.get_pixel(9, 9), CLEAR);
        assert_eq!(*img.get_pixel(6, 6), CLEAR);
    }

    #[test]
    fn test_nonzero_winding_fills_overlap() {
        let mut s = RasterSurface::new(10, 10).unwrap();
        s.set_fill_style("red");
        s.begin_path();
        for (x0, x1) in [(0.0, 6.0), (4.0, 10.0)] {
            s.move_to(x0, 0.0);
            s.line_to(x1, 0.0);
            s.line_to(x1, 10.0);
            s.line_to(x0, 10.0);
            s.close_path();
        }
        s.fill();
        for x in 0..10 {
            assert_eq!(*s.to_image().get_pixel(x, 5), RED, "x={}", x);
        }
    }

    #[test]
    fn test_circle_fill() {
        let mut s = RasterSurface::new(21, 21).unwrap();
        s.set_fill_style("red");
        s.begin_path();
        s.arc(10.5, 10.5, 8.0, 0.0, std::f64::consts::TAU);
        s.fill();
        let img = s.to_image();
        assert_eq!(*img.get_pixel(10, 10), RED);
        assert_eq!(*img.get_pixel(10, 3), RED);
        assert_eq!(*img.get_pixel(0, 0), CLEAR);
        assert_eq!(*img.get_pixel(20, 20), CLEAR);
        assert_eq!(*img.get_pixel(10, 1), CLEAR);

        let filled = img.pixels().filter(|p| **p == RED).count() as f64;
        let expected = std::f64::consts::PI * 64.0;
        assert!((filled - expected).abs() < expected * 0.05, "{} vs {}", filled, expected);
    }

    #[test]
    fn test_begin_path_discards_previous() {
        let mut s = RasterSurface::new(10, 10).unwrap();
        s.set_fill_style("red");
        s.begin_path();
        s.move_to(0.0, 0.0);
        s.line_to(5.0, 0.0);
        s.line_to(5.0, 5.0);
        s.begin_path();
        s.fill();
        assert!(s.to_image().pixels().all(|p| *p == CLEAR));
    }

    #[test]
    fn test_alpha_blending() {
        let mut s = RasterSurface::new(2, 1).unwrap();
        s.set_fill_style("white");
        s.fill_rect(0.0, 0.0, 2.0, 1.0);
        s.set_fill_style("rgba(0, 0, 0, 0.5)");
        s.fill_rect(0.0, 0.0, 1.0, 1.0);
        let img = s.to_image();
        let half = img.get_pixel(0, 0);
        assert!(half.0[..3].iter().all(|c| (126..=128).contains(c)), "{:?}", half);
        assert_eq!(half[3], 255);
        assert_eq!(*img.get_pixel(1, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_render_image_covers_background() {
        let config = RenderConfig::new("abc", vec!["red".into(), "blue".into()], 100.0, 100.0).unwrap();
        let img = render_image(&config).unwrap();
        assert_eq!(img.dimensions(), (100, 100));
        assert!(img.pixels().all(|p| p[3] == 255), "transparent pixel left");
    }

    #[test]
    fn test_render_image_deterministic() {
        let config = RenderConfig::new("pixels", vec!["#fff".into(), "#000".into()], 64.0, 48.0).unwrap();
        let a = render_image(&config).unwrap();
        let b = render_image(&config).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_fractional_size_rounds_up() {
        let config = RenderConfig::new("frac", vec!["red".into()], 10.2, 0.5).unwrap();
        let (img, report) = render_image_with_report(&config).unwrap();
        assert_eq!(img.dimensions(), (11, 1));
        assert!(!report.cells.is_empty());
    }
}
