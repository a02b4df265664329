//! Translation transfer from the source bone onto the root bone.

use std::ops::RangeInclusive;

use log::debug;

use crate::action::Action;
use crate::armature::Armature;
use crate::config::TransferConfig;
use crate::curve::InsertMode;
use crate::data_path::{BoneProperty, DataPath};
use crate::error::TransferError;
use crate::locator::{find_curve, find_curve_mut, get_or_create};
use crate::policy::AxisMode;

const X: usize = 0;
const Y: usize = 1;
const Z: usize = 2;

/// What a location pass did to one action.
#[derive(Clone, Debug, PartialEq)]
pub struct LocationOutcome {
    pub mode: AxisMode,
    pub frames: RangeInclusive<i32>,
    /// Root location channels that exist after resolution (0..=3).
    pub root_channels: usize,
    /// All-axes only: source height sampled at the reference frame.
    pub ground_offset: Option<f32>,
}

/// Move translation from the source bone onto the root bone according to the action's axis
/// mode. Fails with [`TransferError::NoTranslationCurves`] when the source bone has no
/// location curve at all; nothing is written in that case. Root curves created for a layered
/// action go into the channel-bag of the object's bound `slot`.
pub fn transfer_location(
    armature: &Armature,
    action: &mut Action,
    cfg: &TransferConfig,
    slot: Option<&str>,
) -> crate::Result<LocationOutcome> {
    let hips = DataPath::pose_bone(&cfg.source_bone, BoneProperty::Location);
    let root = DataPath::pose_bone(&cfg.root_bone, BoneProperty::Location);

    if (X..=Z).all(|i| find_curve(action, &hips, i).is_none()) {
        return Err(TransferError::NoTranslationCurves {
            action: action.name.clone(),
        });
    }

    let root_channels = (X..=Z)
        .filter(|&i| get_or_create(armature, action, &root, i, &cfg.root_group, slot).is_some())
        .count();
    let frames = action.frames();
    let mode = action.policy.axis_mode;

    let ground_offset = match mode {
        AxisMode::AllAxes => Some(transfer_all_axes(
            action,
            &hips,
            &root,
            frames.clone(),
            cfg.reference_frame,
        )),
        AxisMode::Horizontal => {
            transfer_horizontal(action, &hips, &root, frames.clone());
            None
        }
        AxisMode::NoTransfer => {
            fill_zero(action, &root, frames.clone());
            None
        }
    };

    if mode.moves_horizontal() {
        for i in [X, Z] {
            if let Some(curve) = find_curve_mut(action, &hips, i) {
                curve.zero_values();
            }
        }
    }

    debug!(
        "location transfer {:?} on '{}' over {}..={}",
        mode,
        action.name,
        frames.start(),
        frames.end()
    );
    Ok(LocationOutcome {
        mode,
        frames,
        root_channels,
        ground_offset,
    })
}

/// Replace the root channel's keys with a copy of the source channel's. Skipped when either
/// curve is missing.
fn copy_channel(action: &mut Action, from: &DataPath, to: &DataPath, index: usize) {
    let Some(keys) = find_curve(action, from, index).map(|c| c.keyframe_points.clone()) else {
        return;
    };
    if let Some(target) = find_curve_mut(action, to, index) {
        target.copy_points_from(&keys);
    }
}

fn transfer_all_axes(
    action: &mut Action,
    hips: &DataPath,
    root: &DataPath,
    frames: RangeInclusive<i32>,
    reference_frame: i32,
) -> f32 {
    let ground = find_curve(action, hips, Y)
        .map(|c| c.evaluate(reference_frame as f32))
        .unwrap_or(0.0);

    if ground < 0.0 {
        if let Some(curve) = find_curve_mut(action, hips, Y) {
            curve.offset_values(-ground);
            curve.update();
        }
    }

    for i in X..=Z {
        copy_channel(action, hips, root, i);
    }

    if let Some(curve) = find_curve_mut(action, hips, Y) {
        let floor = if ground < 0.0 { ground } else { 0.0 };
        for frame in frames {
            curve.insert(frame as f32, floor, InsertMode::Fast);
        }
        curve.update();
    }
    ground
}

fn transfer_horizontal(
    action: &mut Action,
    hips: &DataPath,
    root: &DataPath,
    frames: RangeInclusive<i32>,
) {
    for i in [X, Z] {
        copy_channel(action, hips, root, i);
    }
    if let Some(curve) = find_curve_mut(action, root, Y) {
        for frame in frames {
            curve.insert(frame as f32, 0.0, InsertMode::Fast);
        }
    }
}

fn fill_zero(action: &mut Action, root: &DataPath, frames: RangeInclusive<i32>) {
    for i in X..=Z {
        if let Some(curve) = find_curve_mut(action, root, i) {
            for frame in frames.clone() {
                curve.insert(frame as f32, 0.0, InsertMode::Fast);
            }
            curve.update();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armature::Bone;
    use crate::curve::FCurve;
    use crate::policy::TransferPolicy;

    fn rig() -> Armature {
        Armature::new(vec![Bone::new("Root"), Bone::new("Hips")])
    }

    fn hips() -> DataPath {
        DataPath::pose_bone("Hips", BoneProperty::Location)
    }

    fn root() -> DataPath {
        DataPath::pose_bone("Root", BoneProperty::Location)
    }

    fn action(mode: AxisMode, hips_y: &[(f32, f32)]) -> Action {
        let mut action =
            Action::new_flat("Walk").with_policy(TransferPolicy::new(mode, false));
        action.store.push_curve(
            FCurve::from_points(hips(), X, &[(1.0, 0.1), (5.0, 0.5)]).with_group("Hips"),
            None,
        );
        action
            .store
            .push_curve(FCurve::from_points(hips(), Y, hips_y).with_group("Hips"), None);
        action.store.push_curve(
            FCurve::from_points(hips(), Z, &[(1.0, -0.2), (5.0, 2.0)]).with_group("Hips"),
            None,
        );
        action
    }

    fn values(action: &Action, path: &DataPath, i: usize) -> Vec<(f32, f32)> {
        find_curve(action, path, i).expect("curve").points().collect()
    }

    #[test]
    fn missing_source_curves_are_reported_untouched() {
        let mut action = Action::new_flat("Empty");
        let err = transfer_location(&rig(), &mut action, &TransferConfig::default(), None).unwrap_err();
        assert_eq!(
            err,
            TransferError::NoTranslationCurves {
                action: "Empty".into()
            }
        );
        assert_eq!(action.store.curves().count(), 0);
    }

    #[test]
    fn horizontal_moves_x_and_z_and_flattens_root_y() {
        let mut action = action(AxisMode::Horizontal, &[(1.0, 0.9), (5.0, 1.1)]);
        let out = transfer_location(&rig(), &mut action, &TransferConfig::default(), None).unwrap();
        assert_eq!(out.root_channels, 3);
        assert_eq!(out.frames, 0..=5);
        assert_eq!(values(&action, &root(), X), vec![(1.0, 0.1), (5.0, 0.5)]);
        assert_eq!(values(&action, &root(), Z), vec![(1.0, -0.2), (5.0, 2.0)]);
        assert!(values(&action, &root(), Y).iter().all(|&(_, v)| v == 0.0));
        assert_eq!(values(&action, &root(), Y).len(), 6);
        assert!(values(&action, &hips(), X).iter().all(|&(_, v)| v == 0.0));
        assert!(values(&action, &hips(), Z).iter().all(|&(_, v)| v == 0.0));
        assert_eq!(values(&action, &hips(), Y), vec![(1.0, 0.9), (5.0, 1.1)]);
    }

    #[test]
    fn all_axes_absorbs_height_into_root() {
        let mut action = action(AxisMode::AllAxes, &[(1.0, 0.9), (5.0, 1.1)]);
        let out = transfer_location(&rig(), &mut action, &TransferConfig::default(), None).unwrap();
        assert_eq!(out.ground_offset, Some(0.9));
        assert_eq!(values(&action, &root(), Y), vec![(1.0, 0.9), (5.0, 1.1)]);
        let hips_y = values(&action, &hips(), Y);
        assert_eq!(hips_y.first(), Some(&(0.0, 0.0)));
        assert!(hips_y.iter().all(|&(_, v)| v == 0.0));
    }

    #[test]
    fn all_axes_below_ground_keeps_the_offset_on_the_source() {
        let mut action = action(AxisMode::AllAxes, &[(1.0, -0.5), (5.0, 0.5)]);
        transfer_location(&rig(), &mut action, &TransferConfig::default(), None).unwrap();
        // Shifted by +0.5 before the copy.
        assert_eq!(values(&action, &root(), Y), vec![(1.0, 0.0), (5.0, 1.0)]);
        assert!(values(&action, &hips(), Y).iter().all(|&(_, v)| v == -0.5));
    }

    #[test]
    fn no_transfer_zeroes_root_and_leaves_source() {
        let mut action = action(AxisMode::NoTransfer, &[(1.0, 0.9), (5.0, 1.1)]);
        let before: Vec<FCurve> = (X..=Z)
            .map(|i| find_curve(&action, &hips(), i).expect("hips curve").clone())
            .collect();
        transfer_location(&rig(), &mut action, &TransferConfig::default(), None).unwrap();
        for i in X..=Z {
            assert!(values(&action, &root(), i).iter().all(|&(_, v)| v == 0.0));
            assert_eq!(find_curve(&action, &hips(), i), Some(&before[i]));
        }
    }

    #[test]
    fn root_creation_failure_skips_channels() {
        let arm = Armature::new(vec![Bone::new("Hips")]);
        let mut action = action(AxisMode::Horizontal, &[(1.0, 0.9), (5.0, 1.1)]);
        let out = transfer_location(&arm, &mut action, &TransferConfig::default(), None).unwrap();
        assert_eq!(out.root_channels, 0);
        assert!(find_curve(&action, &root(), X).is_none());
        assert!(values(&action, &hips(), X).iter().all(|&(_, v)| v == 0.0));
    }
}
