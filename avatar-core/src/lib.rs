//! Seeded Voronoi avatar generation.
//!
//! Tessellates a rectangle into Voronoi cells around a seeded random point set
//! and paints every cell as either a circle or a shrunken polygon. Rendering
//! goes through the [`Surface`] trait, so the same pipeline drives the CPU
//! rasterizer, the recording surface used in tests, and host adapters.

mod color;
mod config;
mod point;
mod raster;
mod render;
mod rng;
mod surface;
mod voronoi;

#[cfg(feature = "parallel")]
mod batch;

pub use color::parse_css_color;
pub use config::{
    color_property, input_properties, AvatarProps, RenderConfig, COLOR_SLOTS, DEFAULT_SEED, PAINT_NAME,
    SEED_PROPERTY,
};
pub use point::Point;
pub use raster::{render_image, render_image_with_report, RasterSurface, MAX_RASTER_PIXELS};
pub use render::{
    render, render_with_rng, sample_points, CellPaint, RenderReport, ShapeVariant, BACKGROUND,
    CIRCLE_THRESHOLD, MAX_POINTS, MIN_POINTS, POLYGON_SCALE,
};
pub use rng::SeededRng;
pub use surface::{DrawCommand, RecordingSurface, Surface};
pub use voronoi::{build_diagram, VoronoiCell};

#[cfg(feature = "parallel")]
pub use batch::render_batch;

/// Error type for avatar generation
#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("No sites provided")]
    NoSites,

    #[error("Invalid dimensions: {width}x{height} (both must be finite, positive and within raster limits)")]
    InvalidDimensions { width: f64, height: f64 },

    #[error("Voronoi diagram could not be built for {0} sites")]
    Triangulation(usize),

    #[error("Too many colors: {0} (at most 8 slots)")]
    TooManyColors(usize),

    #[error("Render cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, AvatarError>;
