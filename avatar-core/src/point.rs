//! Point type and the polygon helpers shared by the diagram and renderer.

/// 2D position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared distance to another point
    pub fn dist_sq(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Distance to another point
    pub fn dist(&self, other: &Point) -> f64 {
        self.dist_sq(other).sqrt()
    }

    /// Distance to the segment `a`-`b`
    pub fn dist_to_segment(&self, a: &Point, b: &Point) -> f64 {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return self.dist(a);
        }
        let t = (((self.x - a.x) * dx + (self.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
        self.dist(&Point::new(a.x + t * dx, a.y + t * dy))
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Signed shoelace area. Positive for the winding of `[(0,0), (w,0), (w,h), (0,h)]`.
pub(crate) fn signed_area(polygon: &[Point]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Area centroid, or the vertex average for degenerate polygons.
pub(crate) fn centroid(polygon: &[Point]) -> Option<Point> {
    if polygon.is_empty() {
        return None;
    }
    let area = signed_area(polygon);
    if area.abs() < 1e-12 {
        let n = polygon.len() as f64;
        let sx: f64 = polygon.iter().map(|p| p.x).sum();
        let sy: f64 = polygon.iter().map(|p| p.y).sum();
        return Some(Point::new(sx / n, sy / n));
    }

    let n = polygon.len();
    let (mut cx, mut cy) = (0.0, 0.0);
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let cross = a.x * b.y - b.x * a.y;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    let k = 1.0 / (6.0 * area);
    Some(Point::new(cx * k, cy * k))
}

/// Scale vertices toward (or away from) `origin` by `factor`.
pub(crate) fn scale_about(polygon: &[Point], origin: Point, factor: f64) -> Vec<Point> {
    polygon
        .iter()
        .map(|p| {
            Point::new(
                origin.x + (p.x - origin.x) * factor,
                origin.y + (p.y - origin.y) * factor,
            )
        })
        .collect()
}

/// Whether `p` lies inside or on a convex polygon, within `eps`.
#[cfg(test)]
pub(crate) fn convex_contains(polygon: &[Point], p: &Point, eps: f64) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let orientation = signed_area(polygon).signum();
    let n = polygon.len();
    (0..n).all(|i| {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let edge_len = a.dist(&b);
        if edge_len == 0.0 {
            return true;
        }
        let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
        cross * orientation / edge_len >= -eps
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ]
    }

    #[test]
    fn test_square_area_and_centroid() {
        let sq = square(10.0);
        assert_eq!(signed_area(&sq), 100.0);
        let c = centroid(&sq).unwrap();
        assert!((c.x - 5.0).abs() < 1e-12 && (c.y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_reversed_winding_flips_area_sign() {
        let mut sq = square(4.0);
        sq.reverse();
        assert_eq!(signed_area(&sq), -16.0);
        let c = centroid(&sq).unwrap();
        assert!((c.x - 2.0).abs() < 1e-12 && (c.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_scale_preserves_centroid() {
        let tri = vec![Point::new(0.0, 0.0), Point::new(9.0, 0.0), Point::new(0.0, 6.0)];
        let c = centroid(&tri).unwrap();
        let scaled = scale_about(&tri, c, 0.85);
        let c2 = centroid(&scaled).unwrap();
        assert!(c.dist(&c2) < 1e-9);
        assert!((signed_area(&scaled) - signed_area(&tri) * 0.85 * 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_dist_to_segment() {
        let p = Point::new(5.0, 3.0);
        assert_eq!(p.dist_to_segment(&Point::new(0.0, 0.0), &Point::new(10.0, 0.0)), 3.0);
        // Beyond the endpoint the nearest point is the endpoint itself
        let q = Point::new(13.0, 4.0);
        assert_eq!(q.dist_to_segment(&Point::new(0.0, 0.0), &Point::new(10.0, 0.0)), 5.0);
    }

    #[test]
    fn test_convex_contains() {
        let sq = square(10.0);
        assert!(convex_contains(&sq, &Point::new(5.0, 5.0), 1e-9));
        assert!(convex_contains(&sq, &Point::new(10.0, 0.0), 1e-9));
        assert!(!convex_contains(&sq, &Point::new(10.5, 5.0), 1e-9));
    }
}
