use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Minimum distance between the cutout and the widget edges (px).
pub const MARGIN: f64 = 8.0;

/// Where the piece has to be dragged to: the top-left corner of the cutout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub x: f64,
    pub y: f64,
}

impl Target {
    pub const fn new(x: f64, y: f64) -> Self {
        Target { x, y }
    }

    pub fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Draw a fresh target inside `width` x `height` for a piece of edge `piece`.
///
/// Both axes land on whole pixels in `[MARGIN, extent - piece - MARGIN]`; when
/// the widget is too small for that window the coordinate pins to `MARGIN`.
pub fn seed_target<R: Rng>(rng: &mut R, width: f64, height: f64, piece: f64) -> Target {
    Target {
        x: seed_axis(rng, width, piece),
        y: seed_axis(rng, height, piece),
    }
}

fn seed_axis<R: Rng>(rng: &mut R, extent: f64, piece: f64) -> f64 {
    let span = (extent - piece - 2.0 * MARGIN).floor();
    if !span.is_finite() || span <= 0.0 {
        return MARGIN;
    }
    let unit: f64 = rng.random();
    MARGIN + (unit * (span + 1.0)).floor().min(span)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn targets_stay_inside_margins() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..2000 {
            let t = seed_target(&mut rng, 320.0, 160.0, 44.0);
            assert!((MARGIN..=320.0 - 44.0 - MARGIN).contains(&t.x), "{t:?}");
            assert!((MARGIN..=160.0 - 44.0 - MARGIN).contains(&t.y), "{t:?}");
            assert_eq!(t.x.fract(), 0.0);
        }
    }

    #[test]
    fn cramped_widget_pins_to_margin() {
        let mut rng = SmallRng::seed_from_u64(1);
        let t = seed_target(&mut rng, 50.0, 40.0, 44.0);
        assert_eq!(t, Target::new(MARGIN, MARGIN));
    }

    #[test]
    fn consecutive_rounds_differ() {
        let mut rng = SmallRng::seed_from_u64(99);
        let targets: Vec<_> = (0..8)
            .map(|_| seed_target(&mut rng, 320.0, 160.0, 44.0))
            .collect();
        assert!(targets.windows(2).any(|w| w[0] != w[1]));
    }
}
