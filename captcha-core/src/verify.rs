use serde::{Deserialize, Serialize};

use crate::drag::{DragSource, Release};
use crate::seed::Target;

/// Payload handed to a host-supplied `onVerify` function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyParam {
    /// Milliseconds between pointer-down and pointer-up.
    pub duration: f64,
    pub trail: Vec<[f64; 2]>,
    pub target_type: DragSource,
    /// Final horizontal slider offset.
    pub x: f64,
}

impl From<&Release> for VerifyParam {
    fn from(r: &Release) -> Self {
        VerifyParam {
            duration: r.duration_ms,
            trail: r.trail.iter().map(|p| [p.x, p.y]).collect(),
            target_type: r.source,
            x: r.offset,
        }
    }
}

/// How a finished gesture gets judged.
#[derive(Clone, Debug, PartialEq)]
pub enum Check {
    /// Decided on the spot by the tolerance rule.
    Local(bool),
    /// Deferred to the external verifier; resolve = pass, reject = fail.
    Remote(VerifyParam),
}

pub fn within_tolerance(offset: f64, target_x: f64, tolerance: f64) -> bool {
    (offset - target_x).abs() <= tolerance
}

/// Pick the verdict source for a release.
///
/// A configured verifier always wins, whether or not the images come from a
/// remote pair supplier (in which case the local target is meaningless).
/// Without one the release is checked against the target with `tolerance`.
pub fn plan_check(release: &Release, target: Target, tolerance: f64, has_verifier: bool) -> Check {
    if has_verifier {
        Check::Remote(VerifyParam::from(release))
    } else {
        Check::Local(within_tolerance(release.offset, target.x, tolerance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn release(offset: f64) -> Release {
        Release {
            offset,
            duration_ms: 420.0,
            trail: vec![Point::new(10.0, 5.0), Point::new(40.0, 6.0)],
            source: DragSource::Piece,
            delta_y: 1.0,
        }
    }

    #[test]
    fn tolerance_window_is_inclusive() {
        assert!(within_tolerance(56.0, 50.0, 6.0));
        assert!(within_tolerance(44.0, 50.0, 6.0));
        assert!(!within_tolerance(57.0, 50.0, 6.0));
        assert!(!within_tolerance(43.0, 50.0, 6.0));
    }

    #[test]
    fn local_rule_without_verifier() {
        let target = Target::new(50.0, 20.0);
        assert_eq!(plan_check(&release(55.0), target, 10.0, false), Check::Local(true));
        assert_eq!(plan_check(&release(80.0), target, 5.0, false), Check::Local(false));
    }

    #[test]
    fn verifier_takes_precedence_over_tolerance() {
        let target = Target::new(50.0, 20.0);
        let Check::Remote(param) = plan_check(&release(50.0), target, 6.0, true) else {
            panic!("expected remote check");
        };
        assert_eq!(param.x, 50.0);
        assert_eq!(param.duration, 420.0);
        assert_eq!(param.trail, vec![[10.0, 5.0], [40.0, 6.0]]);
    }

    #[test]
    fn payload_uses_camel_case_keys() {
        let param = VerifyParam::from(&release(12.0));
        let json = serde_json::to_value(&param).unwrap();
        assert_eq!(json["targetType"], "puzzle");
        assert_eq!(json["x"], 12.0);
        assert_eq!(json["trail"][1][0], 40.0);
    }
}
