//! Heading transfer from the source bone onto the root bone.
//!
//! Per frame the source bone's local rotation is split into a heading about the vertical
//! axis (keyed on the root) and a residual (keyed back on the source). The residual's lean
//! components are then pinned to their reference-frame values. The pinning keeps Mixamo
//! clips stable but is not an exact decomposition: lean that varies over the clip is lost.

use std::ops::RangeInclusive;

use log::{debug, warn};

use crate::action::Action;
use crate::armature::Armature;
use crate::config::TransferConfig;
use crate::curve::InsertMode;
use crate::data_path::{BoneProperty, DataPath};
use crate::locator::{find_curve_mut, get_or_create};
use crate::math::{heading, pin_lean, without_heading, Quat, IDENTITY};
use crate::pose::{FrameDriver, PoseEvaluator};

#[derive(Clone, Debug, PartialEq)]
pub struct RotationOutcome {
    /// Heading was moved onto the root (as opposed to keying the root at identity).
    pub transferred: bool,
    pub frames: RangeInclusive<i32>,
    /// Frames that received keys.
    pub keyed_frames: usize,
}

/// Key a full quaternion on `bone` at `frame`. Channels whose curve cannot be created are
/// skipped.
fn key_quaternion(
    armature: &Armature,
    action: &mut Action,
    bone: &str,
    group: &str,
    slot: Option<&str>,
    frame: i32,
    q: Quat,
) {
    let path = DataPath::pose_bone(bone, BoneProperty::RotationQuaternion);
    for (i, value) in q.into_iter().enumerate() {
        if let Some(curve) = get_or_create(armature, action, &path, i, group, slot) {
            curve.insert(frame as f32, value, InsertMode::Fast);
        }
    }
}

fn rotation_of(armature: &Armature, bone: &str) -> Quat {
    armature
        .pose_bone(bone)
        .map(|p| p.rotation_quaternion)
        .unwrap_or(IDENTITY)
}

fn set_rotation(armature: &mut Armature, bone: &str, q: Quat) {
    if let Some(pb) = armature.pose_bone_mut(bone) {
        pb.rotation_quaternion = q;
    }
}

/// Run the rotation pass for one action. With the action's rotation flag off the root's
/// rotation curves are rebuilt at identity; otherwise heading is transferred frame by frame
/// and the driver is returned to the frame it started on. New curves of a layered action go
/// into the channel-bag of the bound `slot`.
pub fn transfer_rotation<E: PoseEvaluator>(
    armature: &mut Armature,
    action: &mut Action,
    cfg: &TransferConfig,
    driver: &mut FrameDriver<E>,
    slot: Option<&str>,
) -> RotationOutcome {
    if !action.policy.transfer_rotation {
        return fill_identity(armature, action, cfg, slot);
    }

    let frames = action.frames();
    let (source, root) = (cfg.source_bone.as_str(), cfg.root_bone.as_str());
    if armature.pose_bone(source).is_none() || armature.pose_bone(root).is_none() {
        warn!(
            "rotation transfer skipped for '{}': pose bones '{source}'/'{root}' missing",
            action.name
        );
        return RotationOutcome {
            transferred: false,
            frames,
            keyed_frames: 0,
        };
    }

    let original_frame = driver.current();
    driver.frame_set(armature, action, cfg.reference_frame);
    let reference = rotation_of(armature, source);

    let mut keyed_frames = 0;
    for frame in frames.clone() {
        driver.frame_set(armature, action, frame);
        let q_source = rotation_of(armature, source);

        let q_root = heading(q_source, cfg.vertical_axis);
        set_rotation(armature, root, q_root);
        key_quaternion(armature, action, root, &cfg.root_group, slot, frame, q_root);

        let q_residual = pin_lean(
            without_heading(q_source, q_root),
            reference,
            cfg.vertical_axis,
        );
        set_rotation(armature, source, q_residual);
        key_quaternion(
            armature,
            action,
            source,
            &cfg.source_group,
            slot,
            frame,
            q_residual,
        );
        keyed_frames += 1;
    }

    driver.frame_set(armature, action, original_frame);
    debug!(
        "heading transferred on '{}' for {keyed_frames} frames",
        action.name
    );
    RotationOutcome {
        transferred: true,
        frames,
        keyed_frames,
    }
}

/// Clear the root's rotation curves and key identity on every frame of the range.
fn fill_identity(
    armature: &Armature,
    action: &mut Action,
    cfg: &TransferConfig,
    slot: Option<&str>,
) -> RotationOutcome {
    let path = DataPath::pose_bone(&cfg.root_bone, BoneProperty::RotationQuaternion);
    for i in 0..4 {
        if let Some(curve) = find_curve_mut(action, &path, i) {
            curve.clear();
        }
    }
    let frames = action.frames();
    for frame in frames.clone() {
        let root = cfg.root_bone.as_str();
        key_quaternion(armature, action, root, &cfg.root_group, slot, frame, IDENTITY);
    }
    RotationOutcome {
        transferred: false,
        keyed_frames: frames.clone().count(),
        frames,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armature::Bone;
    use crate::curve::FCurve;
    use crate::locator::find_curve;
    use crate::math::{from_axis_angle, mul, VerticalAxis};
    use crate::policy::{AxisMode, TransferPolicy};
    use crate::pose::CurveEvaluator;
    use approx::assert_relative_eq;

    fn rot(bone: &str) -> DataPath {
        DataPath::pose_bone(bone, BoneProperty::RotationQuaternion)
    }

    fn rig() -> Armature {
        Armature::new(vec![Bone::new("Root"), Bone::new("Hips")])
    }

    fn keyed(action: &mut Action, frames: &[(i32, Quat)]) {
        for i in 0..4 {
            let points: Vec<(f32, f32)> = frames.iter().map(|&(f, q)| (f as f32, q[i])).collect();
            action
                .store
                .push_curve(FCurve::from_points(rot("Hips"), i, &points).with_group("Hips"), None);
        }
    }

    fn key_at(action: &Action, bone: &str, frame: f32) -> Quat {
        let mut q = [0.0; 4];
        for (i, c) in q.iter_mut().enumerate() {
            *c = find_curve(action, &rot(bone), i)
                .and_then(|curve| curve.value_at_key(frame))
                .expect("key");
        }
        q
    }

    #[test]
    fn disabled_rotation_keys_root_identity() {
        let mut arm = rig();
        let mut action = Action::new_flat("Walk");
        action.manual_frame_range = Some([1.0, 4.0]);
        let mut driver = FrameDriver::new(CurveEvaluator, 1);
        let out = transfer_rotation(&mut arm, &mut action, &TransferConfig::default(), &mut driver, None);
        assert!(!out.transferred);
        assert_eq!(out.keyed_frames, 4);
        for frame in 1..=4 {
            assert_eq!(key_at(&action, "Root", frame as f32), IDENTITY);
        }
        assert!(find_curve(&action, &rot("Hips"), 0).is_none());
    }

    #[test]
    fn heading_only_motion_moves_entirely_to_root() {
        let mut arm = rig();
        let mut action = Action::new_flat("Turn")
            .with_policy(TransferPolicy::new(AxisMode::Horizontal, true));
        let frames: Vec<(i32, Quat)> = (1..=5)
            .map(|f| (f, from_axis_angle(VerticalAxis::Y, 0.3 * f as f32)))
            .collect();
        keyed(&mut action, &frames);
        let mut driver = FrameDriver::new(CurveEvaluator, 3);

        let out = transfer_rotation(&mut arm, &mut action, &TransferConfig::default(), &mut driver, None);
        assert!(out.transferred);
        assert_eq!(out.keyed_frames, 5);
        assert_eq!(driver.current(), 3);
        for &(f, q) in &frames {
            let q_root = key_at(&action, "Root", f as f32);
            let q_hips = key_at(&action, "Hips", f as f32);
            let recombined = mul(q_root, q_hips);
            for i in 0..4 {
                assert_relative_eq!(q_root[i], q[i], epsilon = 1e-5);
                assert_relative_eq!(recombined[i], q[i], epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn lean_is_pinned_to_the_reference_frame() {
        let mut arm = rig();
        let mut action = Action::new_flat("Lean")
            .with_policy(TransferPolicy::new(AxisMode::Horizontal, true));
        let frames: Vec<(i32, Quat)> = (1..=4)
            .map(|f| {
                let yaw = from_axis_angle(VerticalAxis::Y, 0.2 * f as f32);
                let lean = from_axis_angle(VerticalAxis::X, 0.05 * f as f32);
                (f, mul(lean, yaw))
            })
            .collect();
        keyed(&mut action, &frames);
        let mut driver = FrameDriver::new(CurveEvaluator, 1);
        transfer_rotation(&mut arm, &mut action, &TransferConfig::default(), &mut driver, None);

        let first = key_at(&action, "Hips", 1.0);
        for f in 2..=4 {
            let q = key_at(&action, "Hips", f as f32);
            assert_eq!(q[1], first[1]);
            assert_eq!(q[3], first[3]);
        }
        let root = key_at(&action, "Root", 4.0);
        assert_eq!(root[1], 0.0);
        assert_eq!(root[3], 0.0);
    }

    #[test]
    fn missing_root_pose_bone_skips_transfer() {
        let mut arm = Armature::new(vec![Bone::new("Hips")]);
        let mut action = Action::new_flat("Turn")
            .with_policy(TransferPolicy::new(AxisMode::Horizontal, true));
        keyed(&mut action, &[(1, IDENTITY), (2, IDENTITY)]);
        let mut driver = FrameDriver::new(CurveEvaluator, 1);
        let out = transfer_rotation(&mut arm, &mut action, &TransferConfig::default(), &mut driver, None);
        assert!(!out.transferred);
        assert_eq!(out.keyed_frames, 0);
    }
}
