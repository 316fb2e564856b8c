//! Voronoi partition of a rectangle, clipped to its bounds.
//!
//! Cells come from `voronoice`, which triangulates the sites and clips every
//! cell to a bounding box. Geometry runs in a unit frame (rectangle centered
//! on the origin, longer side 1) so tolerances hold at any pixel scale. Inputs
//! the triangulation cannot take (one site, or all sites on a line) partition
//! into parallel strips instead.

use voronoice::{BoundingBox, ClipBehavior, VoronoiBuilder};

use crate::point::{centroid, signed_area};
use crate::{AvatarError, Point, Result};

/// One cell of the diagram
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiCell {
    /// Input point owning this cell
    pub site: Point,
    /// Area centroid of the polygon
    pub centroid: Point,
    /// Distance from the centroid to the nearest polygon edge
    pub inner_circle_radius: f64,
    /// Polygon vertices, wound like `[(0,0), (w,0), (w,h), (0,h)]`. Empty for
    /// a site that duplicates an earlier one.
    pub vertices: Vec<[f64; 2]>,
}

impl VoronoiCell {
    pub fn polygon(&self) -> Vec<Point> {
        self.vertices.iter().copied().map(Point::from).collect()
    }

    pub fn area(&self) -> f64 {
        signed_area(&self.polygon()).abs()
    }
}

/// Unit-frame distance under which sites merge, vertices collapse and
/// sites count as collinear.
const TOLERANCE: f64 = 1e-9;

/// Maps the pixel rectangle onto a unit frame and back.
struct Frame {
    width: f64,
    height: f64,
    scale: f64,
}

impl Frame {
    fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scale: width.max(height),
        }
    }

    fn half_extents(&self) -> (f64, f64) {
        (self.width / self.scale / 2.0, self.height / self.scale / 2.0)
    }

    fn to_unit(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.width / 2.0) / self.scale,
            (p.y - self.height / 2.0) / self.scale,
        )
    }

    fn to_pixels(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.width / 2.0,
            p.y * self.scale + self.height / 2.0,
        )
    }
}

/// Unit-frame rectangle in the canonical winding.
fn unit_rect(half_w: f64, half_h: f64) -> Vec<Point> {
    vec![
        Point::new(-half_w, -half_h),
        Point::new(half_w, -half_h),
        Point::new(half_w, half_h),
        Point::new(-half_w, half_h),
    ]
}

/// Drop consecutive vertices closer than [`TOLERANCE`] (including last-to-first).
fn dedup_vertices(mut polygon: Vec<Point>) -> Vec<Point> {
    polygon.dedup_by(|b, a| a.dist_sq(b) < TOLERANCE * TOLERANCE);
    while polygon.len() > 1 {
        let (first, last) = (polygon[0], polygon[polygon.len() - 1]);
        if first.dist_sq(&last) < TOLERANCE * TOLERANCE {
            polygon.pop();
        } else {
            break;
        }
    }
    polygon
}

/// Farthest site from `sites[0]` and the unit direction toward it, if any
/// site is apart from the first.
fn spread(sites: &[Point]) -> Option<(Point, Point)> {
    let origin = sites[0];
    let far = sites
        .iter()
        .copied()
        .max_by(|a, b| origin.dist_sq(a).total_cmp(&origin.dist_sq(b)))?;
    let len = origin.dist(&far);
    if len <= TOLERANCE {
        return None;
    }
    Some((origin, Point::new((far.x - origin.x) / len, (far.y - origin.y) / len)))
}

fn is_collinear(sites: &[Point]) -> bool {
    if sites.len() < 3 {
        return true;
    }
    let Some((origin, dir)) = spread(sites) else {
        return true;
    };
    sites.iter().all(|p| {
        let cross = dir.x * (p.y - origin.y) - dir.y * (p.x - origin.x);
        cross.abs() <= TOLERANCE
    })
}

/// Keep the part of `polygon` whose projection onto `dir` is at most
/// `offset` (or at least, when `keep_above`).
fn cut(polygon: &[Point], origin: Point, dir: Point, offset: f64, keep_above: bool) -> Vec<Point> {
    let side = |p: &Point| {
        let t = (p.x - origin.x) * dir.x + (p.y - origin.y) * dir.y - offset;
        if keep_above {
            -t
        } else {
            t
        }
    };
    let mut out = Vec::with_capacity(polygon.len() + 1);
    for (i, a) in polygon.iter().enumerate() {
        let b = &polygon[(i + 1) % polygon.len()];
        let (fa, fb) = (side(a), side(b));
        if fa <= 0.0 {
            out.push(*a);
        }
        if (fa <= 0.0) != (fb <= 0.0) {
            let t = fa / (fa - fb);
            out.push(Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y)));
        }
    }
    out
}

/// Cells for sites on a common line: strips between consecutive bisectors.
fn strip_cells(half_w: f64, half_h: f64, sites: &[Point]) -> Vec<Vec<Point>> {
    let rect = unit_rect(half_w, half_h);
    let Some((origin, dir)) = spread(sites) else {
        return vec![rect];
    };

    let t: Vec<f64> = sites
        .iter()
        .map(|p| (p.x - origin.x) * dir.x + (p.y - origin.y) * dir.y)
        .collect();
    let mut order: Vec<usize> = (0..sites.len()).collect();
    order.sort_by(|&a, &b| t[a].total_cmp(&t[b]));

    let mut cells = vec![Vec::new(); sites.len()];
    for (k, &i) in order.iter().enumerate() {
        let mut polygon = rect.clone();
        if k > 0 {
            let lower = (t[order[k - 1]] + t[i]) / 2.0;
            polygon = cut(&polygon, origin, dir, lower, true);
        }
        if k + 1 < order.len() {
            let upper = (t[i] + t[order[k + 1]]) / 2.0;
            polygon = cut(&polygon, origin, dir, upper, false);
        }
        cells[i] = polygon;
    }
    cells
}

/// Cells from the triangulation, indexed like `sites`.
fn clipped_cells(half_w: f64, half_h: f64, sites: &[Point]) -> Option<Vec<Vec<Point>>> {
    let voronoi = VoronoiBuilder::default()
        .set_sites(
            sites
                .iter()
                .map(|p| voronoice::Point { x: p.x, y: p.y })
                .collect(),
        )
        .set_bounding_box(BoundingBox::new_centered(half_w * 2.0, half_h * 2.0))
        .set_clip_behavior(ClipBehavior::Clip)
        .build()?;

    let mut cells = vec![Vec::new(); sites.len()];
    for cell in voronoi.iter_cells() {
        if let Some(slot) = cells.get_mut(cell.site()) {
            *slot = cell.iter_vertices().map(|v| Point::new(v.x, v.y)).collect();
        }
    }
    Some(cells)
}

/// Finish a unit-frame polygon into a cell in pixel coordinates.
fn finish_cell(frame: &Frame, site: Point, polygon: Vec<Point>) -> VoronoiCell {
    let mut polygon = dedup_vertices(polygon);
    if polygon.len() < 3 {
        polygon.clear();
    }
    if signed_area(&polygon) < 0.0 {
        polygon.reverse();
    }

    let (center, inner_circle_radius) = match centroid(&polygon) {
        Some(center) => {
            let n = polygon.len();
            let radius = (0..n)
                .map(|i| center.dist_to_segment(&polygon[i], &polygon[(i + 1) % n]))
                .fold(f64::INFINITY, f64::min);
            (frame.to_pixels(center), radius * frame.scale)
        }
        None => (site, 0.0),
    };

    VoronoiCell {
        site,
        centroid: center,
        inner_circle_radius,
        vertices: polygon
            .into_iter()
            .map(|p| frame.to_pixels(p).to_array())
            .collect(),
    }
}

/// Partition `[0,width] x [0,height]` into one cell per point, in input order.
///
/// Coincident points keep the region for the lowest index; later copies get
/// an empty polygon, zero radius and their site as centroid.
pub fn build_diagram(width: f64, height: f64, points: &[Point]) -> Result<Vec<VoronoiCell>> {
    if points.is_empty() {
        return Err(AvatarError::NoSites);
    }
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(width) || !valid(height) {
        return Err(AvatarError::InvalidDimensions { width, height });
    }

    let frame = Frame::new(width, height);
    let (half_w, half_h) = frame.half_extents();

    let mut unique: Vec<Point> = Vec::with_capacity(points.len());
    let owner: Vec<Option<usize>> = points
        .iter()
        .map(|p| {
            let p = frame.to_unit(*p);
            if unique.iter().any(|q| q.dist_sq(&p) <= TOLERANCE * TOLERANCE) {
                None
            } else {
                unique.push(p);
                Some(unique.len() - 1)
            }
        })
        .collect();

    let mut polygons = if is_collinear(&unique) {
        strip_cells(half_w, half_h, &unique)
    } else {
        clipped_cells(half_w, half_h, &unique).ok_or(AvatarError::Triangulation(unique.len()))?
    };

    Ok(points
        .iter()
        .zip(owner)
        .map(|(site, slot)| {
            let polygon = slot.map(|k| std::mem::take(&mut polygons[k])).unwrap_or_default();
            finish_cell(&frame, *site, polygon)
        })
        .collect())
}
