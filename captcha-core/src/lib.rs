//! Browser-independent core of the slide-to-verify jigsaw captcha.
//!
//! Everything here is plain Rust: the piece outline, target seeding, drag
//! tracking, the verification policy, the per-instance challenge state and the
//! canvas compositing order (expressed against the [`compositor::Surface`]
//! trait). The `captcha-wasm` crate binds these to the DOM.

pub mod challenge;
pub mod compositor;
pub mod config;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod seed;
pub mod verify;

pub use challenge::{
    Challenge, Pending, Phase, RETRY_LIMIT, RoundId, Settings, Settlement, StatusView,
};
pub use compositor::{Backing, Composite, Fit, Rgba, Surface, fit_rect};
pub use config::{CaptchaConfig, Dimension, ImagePair, Theme};
pub use drag::{DragSource, DragTracker, Release};
pub use error::{Error, Result};
pub use geometry::{PathCommand, PiecePath, Point, Rect, Size};
pub use seed::{MARGIN, Target, seed_target};
pub use verify::{Check, VerifyParam, plan_check, within_tolerance};
