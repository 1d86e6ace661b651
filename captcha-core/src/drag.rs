use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Which handle started the gesture; reported to verifiers as `targetType`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragSource {
    #[default]
    #[serde(rename = "button")]
    Thumb,
    #[serde(rename = "puzzle")]
    Piece,
}

/// Everything captured between pointer-down and pointer-up.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Release {
    pub offset: f64,
    pub duration_ms: f64,
    pub trail: Vec<Point>,
    pub source: DragSource,
    pub delta_y: f64,
}

#[derive(Clone, Debug)]
struct Gesture {
    start: Point,
    started_at: f64,
    source: DragSource,
    offset: f64,
    delta_y: f64,
    trail: Vec<Point>,
}

#[derive(Clone, Debug, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging(Gesture),
}

/// Idle -> Dragging -> Idle tracker for one slider.
///
/// Positions are viewport coordinates; the tracker only ever reports the
/// horizontal distance travelled, clamped to the slider track.
#[derive(Clone, Debug, Default)]
pub struct DragTracker {
    state: DragState,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Current horizontal offset, zero when idle.
    pub fn offset(&self) -> f64 {
        match &self.state {
            DragState::Dragging(g) => g.offset,
            DragState::Idle => 0.0,
        }
    }

    /// Start a gesture. A gesture already in flight is never restarted.
    pub fn begin(&mut self, pos: Point, now_ms: f64, source: DragSource) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.state = DragState::Dragging(Gesture {
            start: pos,
            started_at: now_ms,
            source,
            offset: 0.0,
            delta_y: 0.0,
            trail: Vec::new(),
        });
        true
    }

    /// Record a sample and return the offset clamped to `[0, max_offset]`.
    pub fn update(&mut self, pos: Point, max_offset: f64) -> Option<f64> {
        let DragState::Dragging(g) = &mut self.state else {
            return None;
        };
        g.offset = (pos.x - g.start.x).clamp(0.0, max_offset.max(0.0));
        g.delta_y = pos.y - g.start.y;
        g.trail.push(pos);
        Some(g.offset)
    }

    /// End the gesture; `None` when nothing was being dragged.
    pub fn finish(&mut self, now_ms: f64) -> Option<Release> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(g) => Some(Release {
                offset: g.offset,
                duration_ms: (now_ms - g.started_at).max(0.0),
                trail: g.trail,
                source: g.source,
                delta_y: g.delta_y,
            }),
            DragState::Idle => None,
        }
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}
