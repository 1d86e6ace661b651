use std::f64::consts::{PI, TAU};

use geo::Contains;
use geo_types::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

/// Rounded-corner radius of the jigsaw outline (px).
pub const CORNER_RADIUS: f64 = 8.0;
/// Arc subdivision used for the cached hit-test outline.
const ARC_SEGMENTS: usize = 12;
const EPS: f64 = 1e-9;

/// Basic two dimensional point in logical (CSS) pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

impl From<Point> for Coord<f64> {
    fn from(p: Point) -> Self {
        Coord { x: p.x, y: p.y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }

    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

/// Path verbs of the 2D canvas API, so a browser `Path2D` can replay a
/// [`PiecePath`] one command at a time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// `arc(center, radius, start, end, anticlockwise)`; angles in radians.
    Arc {
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        ccw: bool,
    },
    /// `arcTo(corner, to, radius)`: round the corner between the current point
    /// and `to`.
    ArcTo {
        corner: Point,
        to: Point,
        radius: f64,
    },
    Close,
}

/// Closed jigsaw outline for one challenge round.
///
/// Built once per round from the target coordinate and the piece size, then
/// shared by the cutout overlay and the floating piece.
#[derive(Clone, Debug, PartialEq)]
pub struct PiecePath {
    origin: Point,
    size: f64,
    commands: Vec<PathCommand>,
    outline: Polygon<f64>,
}

impl PiecePath {
    /// Outline whose square body has its top-left corner at `origin`.
    ///
    /// Each edge carries a lobe of radius `size / 6` at its midpoint: the right
    /// one bulges outward, the top, bottom and left ones bite inward.
    pub fn new(origin: Point, size: f64) -> Self {
        let (x, y, p) = (origin.x, origin.y, size);
        let r = CORNER_RADIUS;
        let lobe = p / 6.0;
        let commands = vec![
            PathCommand::MoveTo(Point::new(x + r, y)),
            PathCommand::LineTo(Point::new(x + p / 3.0, y)),
            PathCommand::Arc {
                center: Point::new(x + p / 2.0, y),
                radius: lobe,
                start: PI,
                end: 0.0,
                ccw: true,
            },
            PathCommand::LineTo(Point::new(x + p - r, y)),
            PathCommand::ArcTo {
                corner: Point::new(x + p, y),
                to: Point::new(x + p, y + r),
                radius: r,
            },
            PathCommand::LineTo(Point::new(x + p, y + p / 3.0)),
            PathCommand::Arc {
                center: Point::new(x + p, y + p / 2.0),
                radius: lobe,
                start: -PI / 2.0,
                end: PI / 2.0,
                ccw: false,
            },
            PathCommand::LineTo(Point::new(x + p, y + p - r)),
            PathCommand::ArcTo {
                corner: Point::new(x + p, y + p),
                to: Point::new(x + p - r, y + p),
                radius: r,
            },
            PathCommand::LineTo(Point::new(x + 2.0 * p / 3.0, y + p)),
            PathCommand::Arc {
                center: Point::new(x + p / 2.0, y + p),
                radius: lobe,
                start: 0.0,
                end: PI,
                ccw: true,
            },
            PathCommand::LineTo(Point::new(x + r, y + p)),
            PathCommand::ArcTo {
                corner: Point::new(x, y + p),
                to: Point::new(x, y + p - r),
                radius: r,
            },
            PathCommand::LineTo(Point::new(x, y + 2.0 * p / 3.0)),
            PathCommand::Arc {
                center: Point::new(x, y + p / 2.0),
                radius: lobe,
                start: PI / 2.0,
                end: -PI / 2.0,
                ccw: true,
            },
            PathCommand::LineTo(Point::new(x, y + r)),
            PathCommand::ArcTo {
                corner: Point::new(x, y),
                to: Point::new(x + r, y),
                radius: r,
            },
            PathCommand::Close,
        ];
        let outline = flatten_commands(&commands, ARC_SEGMENTS);
        PiecePath {
            origin,
            size,
            commands,
            outline,
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Axis-aligned box of the outline, including the outward right lobe.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.size + self.size / 6.0,
            self.size,
        )
    }

    /// Polygonal approximation with `segments_per_arc` chords per curved run.
    pub fn flatten(&self, segments_per_arc: usize) -> Polygon<f64> {
        flatten_commands(&self.commands, segments_per_arc)
    }

    /// Whether `pt` lies inside the outline after shifting it by `dx` horizontally.
    pub fn contains(&self, pt: Point, dx: f64) -> bool {
        self.outline
            .contains(&geo_types::Point::new(pt.x - dx, pt.y))
    }
}

fn flatten_commands(commands: &[PathCommand], segments_per_arc: usize) -> Polygon<f64> {
    let n = segments_per_arc.max(2);
    let mut pts: Vec<Coord<f64>> = Vec::with_capacity(commands.len() * (n + 1));
    let mut cursor = Point::default();
    for cmd in commands {
        match *cmd {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => {
                pts.push(p.into());
                cursor = p;
            }
            PathCommand::Arc {
                center,
                radius,
                start,
                end,
                ccw,
            } => {
                let sweep = arc_sweep(start, end, ccw);
                cursor = push_arc(&mut pts, center, radius, start, sweep, n);
            }
            PathCommand::ArcTo { corner, to, radius } => {
                match corner_arc(cursor, corner, to, radius) {
                    Some((center, start, sweep)) => {
                        cursor = push_arc(&mut pts, center, radius, start, sweep, n);
                    }
                    None => {
                        pts.push(corner.into());
                        cursor = corner;
                    }
                }
            }
            PathCommand::Close => {}
        }
    }
    Polygon::new(LineString::from(pts), vec![])
}

fn push_arc(
    pts: &mut Vec<Coord<f64>>,
    center: Point,
    radius: f64,
    start: f64,
    sweep: f64,
    n: usize,
) -> Point {
    let mut last = center;
    for i in 0..=n {
        let a = start + sweep * (i as f64) / (n as f64);
        last = Point::new(center.x + radius * a.cos(), center.y + radius * a.sin());
        pts.push(last.into());
    }
    last
}

/// Signed sweep from `start` to `end` in the canvas arc convention
/// (positive = clockwise on screen).
fn arc_sweep(start: f64, end: f64, ccw: bool) -> f64 {
    let raw = end - start;
    if ccw {
        if raw <= -TAU { -TAU } else { -(-raw).rem_euclid(TAU) }
    } else if raw >= TAU {
        TAU
    } else {
        raw.rem_euclid(TAU)
    }
}

/// Circle tangent to both legs of the corner `from -> corner -> to`.
/// Returns `(center, start_angle, sweep)`, or `None` for a degenerate corner.
fn corner_arc(from: Point, corner: Point, to: Point, radius: f64) -> Option<(Point, f64, f64)> {
    let (v1x, v1y) = (from.x - corner.x, from.y - corner.y);
    let (v2x, v2y) = (to.x - corner.x, to.y - corner.y);
    let l1 = v1x.hypot(v1y);
    let l2 = v2x.hypot(v2y);
    if radius <= 0.0 || l1 < EPS || l2 < EPS {
        return None;
    }
    let (u1x, u1y) = (v1x / l1, v1y / l1);
    let (u2x, u2y) = (v2x / l2, v2y / l2);
    let theta = (u1x * u2x + u1y * u2y).clamp(-1.0, 1.0).acos();
    if theta < EPS || PI - theta < EPS {
        return None;
    }
    let half = theta / 2.0;
    let d = radius / half.tan();
    let t1 = Point::new(corner.x + u1x * d, corner.y + u1y * d);
    let t2 = Point::new(corner.x + u2x * d, corner.y + u2y * d);
    let (bx, by) = (u1x + u2x, u1y + u2y);
    let bl = bx.hypot(by);
    let reach = radius / half.sin();
    let center = Point::new(corner.x + bx / bl * reach, corner.y + by / bl * reach);
    let a1 = (t1.y - center.y).atan2(t1.x - center.x);
    let a2 = (t2.y - center.y).atan2(t2.x - center.x);
    let mut sweep = a2 - a1;
    if sweep > PI {
        sweep -= TAU;
    } else if sweep < -PI {
        sweep += TAU;
    }
    Some((center, a1, sweep))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece() -> PiecePath {
        PiecePath::new(Point::new(50.0, 30.0), 44.0)
    }

    #[test]
    fn outline_is_closed_and_starts_with_move() {
        let path = piece();
        let cmds = path.commands();
        assert!(matches!(cmds.first(), Some(PathCommand::MoveTo(_))));
        assert_eq!(cmds.last(), Some(&PathCommand::Close));
        let arcs = cmds
            .iter()
            .filter(|c| matches!(c, PathCommand::Arc { .. }))
            .count();
        let corners = cmds
            .iter()
            .filter(|c| matches!(c, PathCommand::ArcTo { .. }))
            .count();
        assert_eq!((arcs, corners), (4, 4));
    }

    #[test]
    fn same_inputs_give_same_outline() {
        assert_eq!(piece(), piece());
        assert_ne!(piece(), PiecePath::new(Point::new(51.0, 30.0), 44.0));
    }

    #[test]
    fn body_and_outward_lobe_are_inside() {
        let path = piece();
        assert!(path.contains(Point::new(72.0, 52.0), 0.0));
        // right lobe reaches p/6 past the edge
        assert!(path.contains(Point::new(50.0 + 44.0 + 5.0, 52.0), 0.0));
    }

    #[test]
    fn inward_lobes_and_outside_are_excluded() {
        let path = piece();
        // top notch
        assert!(!path.contains(Point::new(72.0, 32.0), 0.0));
        // left notch
        assert!(!path.contains(Point::new(52.0, 52.0), 0.0));
        // bottom notch
        assert!(!path.contains(Point::new(72.0, 72.0), 0.0));
        assert!(!path.contains(Point::new(10.0, 10.0), 0.0));
    }

    #[test]
    fn contains_follows_horizontal_shift() {
        let path = piece();
        assert!(!path.contains(Point::new(22.0, 52.0), 0.0));
        assert!(path.contains(Point::new(22.0, 52.0), -50.0));
    }

    #[test]
    fn bounds_cover_flattened_outline() {
        let path = piece();
        let b = path.bounds();
        for c in path.flatten(32).exterior().coords() {
            assert!(c.x >= b.x - 1e-6 && c.x <= b.right() + 1e-6, "x {}", c.x);
            assert!(c.y >= b.y - 1e-6 && c.y <= b.bottom() + 1e-6, "y {}", c.y);
        }
    }

    #[test]
    fn rounded_corner_stays_off_the_square_corner() {
        let path = piece();
        assert!(!path.contains(Point::new(50.5, 30.5), 0.0));
        assert!(path.contains(Point::new(50.0 + CORNER_RADIUS, 30.0 + CORNER_RADIUS), 0.0));
    }

    #[test]
    fn sweep_follows_canvas_direction() {
        assert!((arc_sweep(PI, 0.0, true) + PI).abs() < 1e-12);
        assert!((arc_sweep(0.0, PI, true) + PI).abs() < 1e-12);
        assert!((arc_sweep(-PI / 2.0, PI / 2.0, false) - PI).abs() < 1e-12);
    }
}
