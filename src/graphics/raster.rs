//! Device space rasterization, every routine reports pixels through a callback.

#[cfg(not(any(test, feature = "std")))]
use micromath::F32Ext;

pub type Vertex = (i32, i32);

/// Bresenham, both end points inclusive
pub fn line<F: FnMut(i32, i32)>(from: Vertex, to: Vertex, mut plot: F) {
    let (mut x, mut y) = from;
    let (dx, dy) = ((to.0 - x).abs(), -(to.1 - y).abs());
    let (sx, sy) = (if x < to.0 { 1 } else { -1 }, if y < to.1 { 1 } else { -1 });
    let mut error = dx + dy;
    loop {
        plot(x, y);
        if x == to.0 && y == to.1 {
            return;
        }
        let e2 = 2 * error;
        if e2 >= dy {
            error += dy;
            x += sx;
        }
        if e2 <= dx {
            error += dx;
            y += sy;
        }
    }
}

/// Scanline fill, `span(y, x0, x1)` with `x0 <= x1` inclusive
pub fn triangle<F: FnMut(i32, i32, i32)>(vertices: [Vertex; 3], mut span: F) {
    let top = vertices.iter().map(|v| v.1).min().unwrap_or(0);
    let bottom = vertices.iter().map(|v| v.1).max().unwrap_or(0);
    let edges = [(0, 1), (1, 2), (2, 0)];
    for y in top..=bottom {
        let mut range: Option<(i32, i32)> = None;
        for &(a, b) in edges.iter() {
            let (a, b) = (vertices[a], vertices[b]);
            let xs = if a.1 == b.1 {
                if a.1 != y {
                    continue;
                }
                (a.0.min(b.0), a.0.max(b.0))
            } else {
                if y < a.1.min(b.1) || y > a.1.max(b.1) {
                    continue;
                }
                let x = a.0 + (y - a.1) * (b.0 - a.0) / (b.1 - a.1);
                (x, x)
            };
            range = Some(match range {
                Some((x0, x1)) => (x0.min(xs.0), x1.max(xs.1)),
                None => xs,
            });
        }
        if let Some((x0, x1)) = range {
            span(y, x0, x1);
        }
    }
}

pub const ELLIPSE_SEGMENTS: usize = 32;

/// Polygon approximation of the ellipse inscribed in a rectangle, local space
pub fn ellipse(x: f32, y: f32, w: f32, h: f32) -> [(f32, f32); ELLIPSE_SEGMENTS] {
    let (rx, ry) = (w / 2.0, h / 2.0);
    let (cx, cy) = (x + rx, y + ry);
    let mut points = [(0.0, 0.0); ELLIPSE_SEGMENTS];
    for (i, point) in points.iter_mut().enumerate() {
        let theta = i as f32 * 2.0 * core::f32::consts::PI / ELLIPSE_SEGMENTS as f32;
        *point = (cx + rx * theta.cos(), cy + ry * theta.sin());
    }
    points
}

mod test {
    #[test]
    fn test_line() {
        use std::vec::Vec;

        let mut pixels = Vec::new();
        super::line((0, 0), (4, 2), |x, y| pixels.push((x, y)));
        assert_eq!(pixels, std::vec![(0, 0), (1, 1), (2, 1), (3, 2), (4, 2)]);

        let mut pixels = Vec::new();
        super::line((3, 3), (3, 3), |x, y| pixels.push((x, y)));
        assert_eq!(pixels, std::vec![(3, 3)]);
    }

    #[test]
    fn test_triangle() {
        use std::vec::Vec;

        let mut spans = Vec::new();
        super::triangle([(0, 0), (4, 0), (0, 4)], |y, x0, x1| spans.push((y, x0, x1)));
        assert_eq!(spans, std::vec![(0, 0, 4), (1, 0, 3), (2, 0, 2), (3, 0, 1), (4, 0, 0)]);

        let mut spans = Vec::new();
        super::triangle([(5, 1), (1, 1), (3, 1)], |y, x0, x1| spans.push((y, x0, x1)));
        assert_eq!(spans, std::vec![(1, 1, 5)]);
    }

    #[test]
    fn test_ellipse() {
        let points = super::ellipse(0.0, 0.0, 20.0, 10.0);
        assert_eq!(points[0], (20.0, 5.0));
        let quarter = points[super::ELLIPSE_SEGMENTS / 4];
        assert!((quarter.0 - 10.0).abs() < 1e-4 && (quarter.1 - 10.0).abs() < 1e-4);
    }
}
