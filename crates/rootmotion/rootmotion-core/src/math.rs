//! Quaternion helpers for heading/lean decomposition.
//!
//! Quaternions travel as `[w, x, y, z]` arrays (the channel order of rotation curves) and
//! are converted to `nalgebra::Quaternion` for products and inverses.

use nalgebra::Quaternion;
use serde::{Deserialize, Serialize};

/// `[w, x, y, z]`
pub type Quat = [f32; 4];

pub const IDENTITY: Quat = [1.0, 0.0, 0.0, 0.0];

const DEGENERATE_NORM: f32 = 1e-6;

/// Local bone axis treated as vertical when isolating heading.
///
/// Mixamo rigs twist about local Y, which is the default. Other values change which
/// component is kept on the root and which two are pinned on the source bone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerticalAxis {
    X,
    #[default]
    Y,
    Z,
}

impl VerticalAxis {
    /// Quaternion component index (in `[w, x, y, z]`) of this axis.
    pub fn component(self) -> usize {
        match self {
            VerticalAxis::X => 1,
            VerticalAxis::Y => 2,
            VerticalAxis::Z => 3,
        }
    }

    /// Components describing lean/roll about the two other axes.
    pub fn lean_components(self) -> [usize; 2] {
        match self {
            VerticalAxis::X => [2, 3],
            VerticalAxis::Y => [1, 3],
            VerticalAxis::Z => [1, 2],
        }
    }
}

#[inline]
pub fn to_nalgebra(q: Quat) -> Quaternion<f32> {
    Quaternion::new(q[0], q[1], q[2], q[3])
}

#[inline]
pub fn from_nalgebra(q: &Quaternion<f32>) -> Quat {
    [q.w, q.i, q.j, q.k]
}

/// Normalize, leaving a zero quaternion untouched.
pub fn normalize(q: Quat) -> Quat {
    let n = to_nalgebra(q);
    let norm = n.norm();
    if norm <= DEGENERATE_NORM {
        return q;
    }
    from_nalgebra(&(n / norm))
}

/// Hamilton product `a * b`.
pub fn mul(a: Quat, b: Quat) -> Quat {
    from_nalgebra(&(to_nalgebra(a) * to_nalgebra(b)))
}

pub fn inverse(q: Quat) -> Quat {
    to_nalgebra(q)
        .try_inverse()
        .map(|inv| from_nalgebra(&inv))
        .unwrap_or(IDENTITY)
}

/// Heading part of `q`: keep `w` and the vertical component, drop the rest, normalize.
/// A rotation with no heading information (both kept components ~0) yields identity.
pub fn heading(q: Quat, axis: VerticalAxis) -> Quat {
    let c = axis.component();
    let mut h = [q[0], 0.0, 0.0, 0.0];
    h[c] = q[c];
    if to_nalgebra(h).norm() <= DEGENERATE_NORM {
        return IDENTITY;
    }
    normalize(h)
}

/// Residual of `q` once `heading` is removed: `normalize(q * heading⁻¹)`.
pub fn without_heading(q: Quat, heading: Quat) -> Quat {
    normalize(mul(q, inverse(heading)))
}

/// Overwrite the lean components of `q` with those of `reference`. The result is not
/// renormalized.
pub fn pin_lean(mut q: Quat, reference: Quat, axis: VerticalAxis) -> Quat {
    for c in axis.lean_components() {
        q[c] = reference[c];
    }
    q
}

/// Rotation of `angle` radians about a local axis.
pub fn from_axis_angle(axis: VerticalAxis, angle: f32) -> Quat {
    let mut q = [(angle * 0.5).cos(), 0.0, 0.0, 0.0];
    q[axis.component()] = (angle * 0.5).sin();
    q
}
