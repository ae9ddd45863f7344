//! 2D geometry primitives shared by the sweep tests
//!
//! `glam::Vec2` covers add/sub/scale/dot/length; this module adds the few
//! operations the solvers phrase differently.

use glam::Vec2;

/// Scalar 2D cross product: `a.x * b.y - a.y * b.x`
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.perp_dot(b)
}

/// Elastic reflection of `v` about `normal`.
///
/// `v' = v - 2 (v·n) / |n|² n`, so `normal` does not need to be unit length.
/// A zero normal leaves `v` untouched.
#[inline]
pub fn reflect(v: Vec2, normal: Vec2) -> Vec2 {
    let len_sq = normal.length_squared();
    if len_sq <= f32::MIN_POSITIVE {
        return v;
    }
    v - 2.0 * v.dot(normal) / len_sq * normal
}

/// Unit vector along `v`, or zero when `|v| < epsilon` (degenerate edge)
#[inline]
pub fn normalize_or_zero(v: Vec2, epsilon: f32) -> Vec2 {
    let len = v.length();
    if len < epsilon { Vec2::ZERO } else { v / len }
}

/// Square root via one Newton step on the reciprocal-square-root estimate.
///
/// Within ~0.2% of `f32::sqrt` for positive inputs; returns ~0 for 0.
#[inline]
pub fn fast_sqrt(x: f32) -> f32 {
    let half = 0.5 * x;
    let bits = 0x5f37_5a86_u32.wrapping_sub(x.to_bits() >> 1);
    let mut y = f32::from_bits(bits);
    y *= 1.5 - half * y * y;
    1.0 / y
}

#[inline]
pub fn sqrt(x: f32, fast: bool) -> f32 {
    if fast { fast_sqrt(x) } else { x.sqrt() }
}

/// Earliest strictly positive root of `a t² + 2 b t + c = 0`.
///
/// Requires a positive discriminant (grazing tangency counts as a miss).
/// When one root is negative the other is returned.
pub fn earliest_positive_root(a: f32, b: f32, c: f32, fast: bool) -> Option<f32> {
    if a <= f32::MIN_POSITIVE {
        return None;
    }
    let disc = b * b - a * c;
    if disc <= 0.0 {
        return None;
    }
    let root = sqrt(disc, fast);
    let t1 = (-b - root) / a;
    let t2 = (-b + root) / a;
    match (t1 > 0.0, t2 > 0.0) {
        (true, true) => Some(t1.min(t2)),
        (true, false) => Some(t1),
        (false, true) => Some(t2),
        (false, false) => None,
    }
}
