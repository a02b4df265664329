//! Interpolation helpers for keyframe segments:
//! - lerp_f32 (linear)
//! - bezier_segment (cubic bezier in (frame, value) space, x inverted by bisection)

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Evaluate a bezier segment at `frame`.
///
/// `p0`/`p3` are the keyframe coordinates, `p1`/`p2` the right handle of the left key and
/// the left handle of the right key. Handle x is clamped into the segment so x(t) stays
/// monotonic, then x(t) = frame is solved by binary search.
pub fn bezier_segment(p0: [f32; 2], p1: [f32; 2], p2: [f32; 2], p3: [f32; 2], frame: f32) -> f32 {
    let span = p3[0] - p0[0];
    if span <= f32::EPSILON {
        return p0[1];
    }
    let x1 = p1[0].clamp(p0[0], p3[0]);
    let x2 = p2[0].clamp(p0[0], p3[0]);
    let target = frame.clamp(p0[0], p3[0]);

    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = (target - p0[0]) / span;
    for _ in 0..32 {
        let x = cubic_bezier(p0[0], x1, x2, p3[0], mid);
        if (x - target).abs() < 1e-6 {
            break;
        }
        if x < target {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(p0[1], p1[1], p2[1], p3[1], mid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_midpoint() {
        assert_eq!(lerp_f32(2.0, 4.0, 0.5), 3.0);
    }

    #[test]
    fn thirds_handles_are_linear() {
        // Handles placed on the chord at one third produce a straight line.
        let v = bezier_segment([0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0], 1.5);
        assert!((v - 1.5).abs() < 1e-4);
    }

    #[test]
    fn flat_handles_ease() {
        let v = bezier_segment([0.0, 0.0], [1.0, 0.0], [2.0, 1.0], [3.0, 1.0], 1.5);
        assert!((v - 0.5).abs() < 1e-4);
        let early = bezier_segment([0.0, 0.0], [1.0, 0.0], [2.0, 1.0], [3.0, 1.0], 0.3);
        assert!(early < 0.1);
    }

    #[test]
    fn overshooting_handles_are_clamped() {
        let v = bezier_segment([0.0, 0.0], [5.0, 0.0], [-2.0, 1.0], [1.0, 1.0], 1.0);
        assert!((v - 1.0).abs() < 1e-4);
    }
}
