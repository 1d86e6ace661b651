use crate::config::PROMPT_TEXT;
use crate::drag::{DragSource, DragTracker};
use crate::geometry::{PiecePath, Point, Size};
use crate::seed::{MARGIN, Target};
use crate::verify::{Check, plan_check};

/// Failed attempts in one round before a fresh round is forced.
pub const RETRY_LIMIT: u32 = 3;

pub const STATUS_CLASS: &str = "slider-captcha-status";

/// Per-round knobs derived from the configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub piece_size: f64,
    pub tolerance: f64,
    pub success_text: String,
    pub fail_text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Background (or image pair) still being prepared.
    Loading,
    Ready,
    Dragging,
    /// Released; waiting for the verdict.
    Verifying,
    Solved,
}

/// Identifies one round. Asynchronous completions carry the id they were
/// started with and are dropped when it no longer matches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoundId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settlement {
    Passed,
    /// `refresh` is set when the retry limit was just reached.
    Failed { refresh: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    Prompt,
    Verified,
    Rejected,
}

/// Text and class list for the status label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusView {
    pub text: String,
    pub class: String,
}

/// A released gesture waiting to be judged.
#[derive(Clone, Debug, PartialEq)]
pub struct Pending {
    pub round: RoundId,
    pub check: Check,
}

/// State record of one mounted captcha.
#[derive(Clone, Debug)]
pub struct Challenge {
    settings: Settings,
    size: Size,
    target: Target,
    path: PiecePath,
    phase: Phase,
    status: Status,
    retries: u32,
    round: RoundId,
    drag: DragTracker,
}

impl Challenge {
    /// A challenge before its first round; nothing is draggable until
    /// [`Challenge::begin_round`] and [`Challenge::finish_loading`] ran.
    pub fn new(settings: Settings) -> Self {
        let target = Target::new(MARGIN, MARGIN);
        let path = PiecePath::new(target.origin(), settings.piece_size);
        Challenge {
            settings,
            size: Size::default(),
            target,
            path,
            phase: Phase::Loading,
            status: Status::Prompt,
            retries: 0,
            round: RoundId(0),
            drag: DragTracker::new(),
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn path(&self) -> &PiecePath {
        &self.path
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn solved(&self) -> bool {
        self.phase == Phase::Solved
    }

    pub fn is_current(&self, round: RoundId) -> bool {
        self.round == round
    }

    /// Start a new round at `target`: the solved flag, any gesture in flight and
    /// the retry counter are cleared and the outline is rebuilt.
    pub fn begin_round(&mut self, size: Size, target: Target) -> RoundId {
        self.round = RoundId(self.round.0 + 1);
        self.size = size;
        self.target = target;
        self.path = PiecePath::new(target.origin(), self.settings.piece_size);
        self.phase = Phase::Loading;
        self.status = Status::Prompt;
        self.retries = 0;
        self.drag.cancel();
        self.round
    }

    /// Background for `round` is in place; the round becomes interactive.
    pub fn finish_loading(&mut self, round: RoundId) -> bool {
        if round != self.round || self.phase != Phase::Loading {
            return false;
        }
        self.phase = Phase::Ready;
        true
    }

    /// End the current round without starting another. Every pending
    /// completion becomes stale.
    pub fn retire(&mut self) {
        self.round = RoundId(self.round.0 + 1);
        self.phase = Phase::Loading;
        self.drag.cancel();
    }

    pub fn pointer_down(&mut self, pos: Point, now_ms: f64, source: DragSource) -> bool {
        if self.phase != Phase::Ready || !self.drag.begin(pos, now_ms, source) {
            return false;
        }
        self.phase = Phase::Dragging;
        true
    }

    /// Slider offset after a move, or `None` when this instance is not dragging.
    pub fn pointer_move(&mut self, pos: Point, max_offset: f64) -> Option<f64> {
        if self.phase != Phase::Dragging {
            return None;
        }
        self.drag.update(pos, max_offset)
    }

    pub fn pointer_up(&mut self, now_ms: f64, has_verifier: bool) -> Option<Pending> {
        if self.phase != Phase::Dragging {
            return None;
        }
        let release = self.drag.finish(now_ms)?;
        self.phase = Phase::Verifying;
        Some(Pending {
            round: self.round,
            check: plan_check(&release, self.target, self.settings.tolerance, has_verifier),
        })
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == Phase::Dragging
    }

    /// Apply a verdict for `round`. `None` when the verdict is stale.
    pub fn settle(&mut self, round: RoundId, passed: bool) -> Option<Settlement> {
        if round != self.round || self.phase != Phase::Verifying {
            return None;
        }
        if passed {
            self.phase = Phase::Solved;
            self.status = Status::Verified;
            self.retries = 0;
            return Some(Settlement::Passed);
        }
        self.phase = Phase::Ready;
        self.status = Status::Rejected;
        self.retries += 1;
        let refresh = self.retries >= RETRY_LIMIT;
        if refresh {
            self.retries = 0;
        }
        Some(Settlement::Failed { refresh })
    }

    /// Horizontal shift of the piece layer for a slider `offset`: at zero the
    /// piece sits away from the hole and meets it when `offset == target.x`.
    pub fn piece_shift(&self, offset: f64) -> f64 {
        offset - self.target.x
    }

    pub fn status(&self) -> StatusView {
        let (text, class) = match self.status {
            Status::Prompt => (PROMPT_TEXT, STATUS_CLASS.to_string()),
            Status::Verified => (
                self.settings.success_text.as_str(),
                format!("{STATUS_CLASS} ok"),
            ),
            Status::Rejected => (
                self.settings.fail_text.as_str(),
                format!("{STATUS_CLASS} err shake"),
            ),
        };
        StatusView {
            text: text.to_string(),
            class,
        }
    }
}
