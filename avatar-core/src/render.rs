//! The avatar pipeline: seed, sample points, partition, paint.

use std::f64::consts::TAU;

use crate::point::scale_about;
use crate::{build_diagram, Point, RenderConfig, Result, SeededRng, Surface, VoronoiCell};

/// Background painted under every cell; also stands in for an empty palette
pub const BACKGROUND: &str = "tomato";

/// Inclusive bounds on the number of sampled points
pub const MIN_POINTS: i64 = 4;
pub const MAX_POINTS: i64 = 24;

/// Polygon cells shrink toward their centroid by this factor
pub const POLYGON_SCALE: f64 = 0.85;

/// A shape draw above this value paints a circle, otherwise a polygon
pub const CIRCLE_THRESHOLD: f64 = 0.5;

/// Shape chosen for a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeVariant {
    Circle,
    Polygon,
}

/// What was painted for one cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellPaint {
    pub fill: String,
    pub stroke: String,
    pub variant: ShapeVariant,
}

/// Choices made during a render, in drawing order
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub points: Vec<Point>,
    pub cells: Vec<CellPaint>,
}

impl RenderReport {
    pub fn variants(&self) -> Vec<ShapeVariant> {
        self.cells.iter().map(|c| c.variant).collect()
    }
}

/// Re-seed `rng` from the config and draw the point set.
pub fn sample_points(config: &RenderConfig, rng: &mut SeededRng) -> Vec<Point> {
    rng.reseed(config.seed());
    let count = rng.int_inclusive(MIN_POINTS, MAX_POINTS) as usize;

    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        let x = rng.range(0.0, config.width());
        let y = rng.range(0.0, config.height());
        points.push(Point::new(x, y));
    }
    points
}

fn paint_circle<S: Surface + ?Sized>(surface: &mut S, cell: &VoronoiCell) {
    surface.begin_path();
    surface.arc(
        cell.centroid.x,
        cell.centroid.y,
        cell.inner_circle_radius / 2.0,
        0.0,
        TAU,
    );
    surface.fill();
}

fn paint_polygon<S: Surface + ?Sized>(surface: &mut S, cell: &VoronoiCell) {
    let scaled = scale_about(&cell.polygon(), cell.centroid, POLYGON_SCALE);
    let Some((first, rest)) = scaled.split_first() else {
        return;
    };

    surface.begin_path();
    surface.move_to(first.x, first.y);
    for p in rest {
        surface.line_to(p.x, p.y);
    }
    surface.close_path();
    surface.fill();
}

/// Render using a caller-owned stream. The stream is re-seeded first, so its
/// prior state never affects the output.
pub fn render_with_rng<S: Surface + ?Sized>(
    config: &RenderConfig,
    rng: &mut SeededRng,
    surface: &mut S,
) -> Result<RenderReport> {
    surface.set_fill_style(BACKGROUND);
    surface.fill_rect(0.0, 0.0, config.width(), config.height());

    let points = sample_points(config, rng);
    let diagram = build_diagram(config.width(), config.height(), &points)?;

    let mut cells = Vec::with_capacity(diagram.len());
    for cell in &diagram {
        let fill = rng.pick(config.colors()).map_or(BACKGROUND, String::as_str);
        let stroke = rng.pick(config.colors()).map_or(BACKGROUND, String::as_str);
        surface.set_fill_style(fill);
        surface.set_stroke_style(stroke);

        let variant = if rng.unit() > CIRCLE_THRESHOLD {
            paint_circle(surface, cell);
            ShapeVariant::Circle
        } else {
            paint_polygon(surface, cell);
            ShapeVariant::Polygon
        };

        cells.push(CellPaint {
            fill: fill.to_string(),
            stroke: stroke.to_string(),
            variant,
        });
    }

    Ok(RenderReport { points, cells })
}

/// Paint the avatar for `config` onto `surface` with a fresh stream.
pub fn render<S: Surface + ?Sized>(config: &RenderConfig, surface: &mut S) -> Result<RenderReport> {
    let mut rng = SeededRng::new(config.seed());
    render_with_rng(config, &mut rng, surface)
}
