//! Curve lookup and creation over both store shapes.
//!
//! Callers address curves by (data path, channel index) and never see which shape the
//! action uses. New curves are created the way the host does it: keying the armature's
//! current property value at frame 0, then resolving the curve that insertion produced.

use log::warn;

use crate::action::Action;
use crate::armature::Armature;
use crate::curve::{FCurve, InsertMode};
use crate::data_path::DataPath;
use crate::error::TransferError;

/// Frame used when a missing curve is created by keying the current pose.
pub const CREATE_FRAME: f32 = 0.0;

/// Every curve of the action, enumerated afresh on each call.
pub fn all_curves(action: &Action) -> impl Iterator<Item = &FCurve> + '_ {
    action.store.curves()
}

pub fn find_curve<'a>(action: &'a Action, data_path: &DataPath, index: usize) -> Option<&'a FCurve> {
    action.store.find(data_path, index)
}

pub fn find_curve_mut<'a>(
    action: &'a mut Action,
    data_path: &DataPath,
    index: usize,
) -> Option<&'a mut FCurve> {
    action.store.find_mut(data_path, index)
}

/// Key the armature's current value of `data_path[index]` at `frame`, creating the curve
/// (in `group`, and in the channel-bag of the bound `slot` for layered actions) when needed.
/// Handles are recalculated.
pub fn keyframe_insert(
    armature: &Armature,
    action: &mut Action,
    data_path: &DataPath,
    index: usize,
    frame: f32,
    group: &str,
    slot: Option<&str>,
) -> crate::Result<()> {
    let fail = |reason: &str| TransferError::KeyframeInsert {
        data_path: data_path.to_string(),
        index,
        reason: reason.to_string(),
    };
    let (Some(bone), Some(property)) = (data_path.bone(), data_path.property()) else {
        return Err(fail("path does not name a pose-bone property"));
    };
    if armature.pose_bone(bone).is_none() {
        return Err(fail("bone not found"));
    }
    let value = armature
        .property_value(bone, property, index)
        .ok_or_else(|| fail("index out of range"))?;

    if action.store.find(data_path, index).is_none() {
        let slot = action.keying_slot(slot).map(str::to_string);
        let curve = FCurve::new(data_path.clone(), index).with_group(group);
        action.store.push_curve(curve, slot.as_deref());
    }
    let curve = action
        .store
        .find_mut(data_path, index)
        .ok_or_else(|| fail("curve missing after insertion"))?;
    curve.insert(frame, value, InsertMode::Replace);
    Ok(())
}

/// Existing curve for `data_path[index]`, or a new one keyed at [`CREATE_FRAME`]. A failed
/// creation is logged and yields `None`; callers skip the channel.
pub fn get_or_create<'a>(
    armature: &Armature,
    action: &'a mut Action,
    data_path: &DataPath,
    index: usize,
    group: &str,
    slot: Option<&str>,
) -> Option<&'a mut FCurve> {
    if action.store.find(data_path, index).is_none() {
        let created =
            keyframe_insert(armature, action, data_path, index, CREATE_FRAME, group, slot);
        if let Err(err) = created {
            warn!("error creating fcurve: {err}");
            return None;
        }
    }
    action.store.find_mut(data_path, index)
}
