//! Vector and wraparound helpers shared by both space variants.
//!
//! Geometry runs on [`glam::DVec2`]. The helpers here cover what `glam`
//! does not: per-axis sign that maps zero to zero, periodic axis deltas and
//! the eight Moore-neighbourhood compass offsets.

use glam::DVec2;

/// The eight compass offsets of the Moore neighbourhood.
pub const COMPASS: [DVec2; 8] = [
    DVec2::new(0.0, 1.0),
    DVec2::new(0.0, -1.0),
    DVec2::new(1.0, 0.0),
    DVec2::new(-1.0, 0.0),
    DVec2::new(1.0, 1.0),
    DVec2::new(1.0, -1.0),
    DVec2::new(-1.0, 1.0),
    DVec2::new(-1.0, -1.0),
];

/// Sign of a scalar with `0.0` mapped to `0.0`.
///
/// `f64::signum` returns `1.0` for positive zero, which would turn a
/// target sitting on the agent into a spurious direction.
#[inline]
#[must_use]
pub fn sign_or_zero(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Per-axis [`sign_or_zero`], quantizing a vector onto the compass.
#[inline]
#[must_use]
pub fn compass_sign(v: DVec2) -> DVec2 {
    DVec2::new(sign_or_zero(v.x), sign_or_zero(v.y))
}

/// Shortest signed difference `to - from` along an axis of length `extent`.
///
/// Wraps when the direct difference is longer than half the extent.
#[inline]
#[must_use]
pub fn wrapped_delta(from: f64, to: f64, extent: f64) -> f64 {
    let d = to - from;
    if d.abs() > extent / 2.0 {
        d - extent.copysign(d)
    } else {
        d
    }
}

/// Absolute per-axis separation, taking the shorter way round when `torus`.
#[inline]
#[must_use]
pub fn axis_separation(a: f64, b: f64, extent: f64, torus: bool) -> f64 {
    let d = (a - b).abs();
    if torus {
        d.min(extent - d)
    } else {
        d
    }
}

/// Rotate a vector by `angle` radians.
#[inline]
#[must_use]
pub fn rotate(v: DVec2, angle: f64) -> DVec2 {
    DVec2::from_angle(angle).rotate(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_or_zero_keeps_zero() {
        assert_eq!(sign_or_zero(0.0), 0.0);
        assert_eq!(sign_or_zero(-0.0), 0.0);
        assert_eq!(sign_or_zero(3.5), 1.0);
        assert_eq!(sign_or_zero(-0.2), -1.0);
    }

    #[test]
    fn test_compass_sign() {
        assert_eq!(compass_sign(DVec2::new(0.3, -7.0)), DVec2::new(1.0, -1.0));
        assert_eq!(compass_sign(DVec2::ZERO), DVec2::ZERO);
    }

    #[test]
    fn test_wrapped_delta_takes_short_way() {
        assert_eq!(wrapped_delta(1.0, 9.0, 10.0), -2.0);
        assert_eq!(wrapped_delta(9.0, 1.0, 10.0), 2.0);
        assert_eq!(wrapped_delta(2.0, 5.0, 10.0), 3.0);
        // Exactly half the extent stays direct
        assert_eq!(wrapped_delta(0.0, 5.0, 10.0), 5.0);
    }

    #[test]
    fn test_axis_separation() {
        assert_eq!(axis_separation(1.0, 9.0, 10.0, true), 2.0);
        assert_eq!(axis_separation(1.0, 9.0, 10.0, false), 8.0);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate(DVec2::X, std::f64::consts::FRAC_PI_2);
        assert!((v - DVec2::Y).length() < 1e-12);
    }

    #[test]
    fn test_compass_has_eight_distinct_unit_offsets() {
        for (i, a) in COMPASS.iter().enumerate() {
            assert_ne!(*a, DVec2::ZERO);
            for b in &COMPASS[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
