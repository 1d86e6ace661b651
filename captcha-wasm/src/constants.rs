/// Widget-wide numeric constants, in CSS pixels unless noted otherwise.
/// Width of the slider thumb; the slider track ends this far before the edge.
pub const THUMB_WIDTH: f64 = 44.0;
/// How long the failure shake class stays on the status label (ms).
pub const SHAKE_MS: u32 = 500;
/// Layout of the server-rendered image pair.
pub const PAIR_BG_WIDTH: f64 = 320.0;
pub const PAIR_BG_HEIGHT: f64 = 160.0;
pub const PAIR_PIECE_WIDTH: f64 = 60.0;
pub const PAIR_PIECE_LEFT: f64 = 0.0;
/// Stacking of the three canvases inside the stage.
pub const Z_CUTOUT: &str = "5";
pub const Z_PIECE: &str = "10";
pub const Z_REFRESH: &str = "20";
