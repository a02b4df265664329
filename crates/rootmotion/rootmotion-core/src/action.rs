//! Animation clips.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::armature::Armature;
use crate::curve::FCurve;
use crate::data_path::{BoneProperty, DataPath};
use crate::math::Quat;
use crate::policy::TransferPolicy;
use crate::store::CurveStore;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub store: CurveStore,
    /// Slots (animated-object bindings) declared by the action, in order.
    #[serde(default)]
    pub slots: Vec<String>,
    /// Explicit playback range; overrides the keyed extent when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_frame_range: Option<[f32; 2]>,
    #[serde(default)]
    pub policy: TransferPolicy,
    /// Source-bone curves as they were before the first transfer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceSnapshot>,
}

impl Action {
    pub fn new_flat(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn new_layered(name: impl Into<String>, slot: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: CurveStore::layered(),
            slots: vec![slot.into()],
            ..Self::default()
        }
    }

    /// Slot newly keyed curves belong to: `bound` when it is one of this action's slots,
    /// otherwise the first slot.
    pub fn keying_slot<'a>(&'a self, bound: Option<&'a str>) -> Option<&'a str> {
        bound
            .filter(|b| self.slots.iter().any(|s| s == b))
            .or_else(|| self.first_slot())
    }

    pub fn with_policy(mut self, policy: TransferPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn first_slot(&self) -> Option<&str> {
        self.slots.first().map(String::as_str)
    }

    /// `[start, end]`: the manual range if set, otherwise the keyed extent of every curve.
    /// A zero-length range is widened to `end = start + 1`; an action without keys spans
    /// `[0, 1]`.
    pub fn frame_range(&self) -> (f32, f32) {
        let (start, end) = match self.manual_frame_range {
            Some([s, e]) => (s, e),
            None => self
                .store
                .curves()
                .filter_map(FCurve::frame_extent)
                .fold(None, |acc: Option<(f32, f32)>, (s, e)| match acc {
                    Some((a, b)) => Some((a.min(s), b.max(e))),
                    None => Some((s, e)),
                })
                .unwrap_or((0.0, 0.0)),
        };
        if end <= start {
            (start, start + 1.0)
        } else {
            (start, end)
        }
    }

    /// Every integer frame of [`Action::frame_range`], bounds truncated toward zero.
    pub fn frames(&self) -> RangeInclusive<i32> {
        let (start, end) = self.frame_range();
        (start as i32)..=(end as i32)
    }
}

/// Pre-transfer state of the source bone: its location and rotation curves (or their
/// absence) and its pose at capture time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceSnapshot {
    pub bone: String,
    pub channels: Vec<CapturedChannel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_quaternion: Option<Quat>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapturedChannel {
    pub data_path: DataPath,
    pub array_index: usize,
    /// `None` when the channel had no curve.
    pub curve: Option<FCurve>,
}

const CAPTURED: [BoneProperty; 2] = [BoneProperty::Location, BoneProperty::RotationQuaternion];

impl SourceSnapshot {
    pub fn capture(action: &Action, armature: &Armature, bone: &str) -> Self {
        let channels = CAPTURED
            .iter()
            .flat_map(|&prop| {
                let path = DataPath::pose_bone(bone, prop);
                (0..prop.channel_count()).map(move |i| (path.clone(), i))
            })
            .map(|(data_path, array_index)| CapturedChannel {
                curve: action.store.find(&data_path, array_index).cloned(),
                data_path,
                array_index,
            })
            .collect();
        let pose = armature.pose_bone(bone);
        Self {
            bone: bone.to_string(),
            channels,
            location: pose.map(|p| p.location),
            rotation_quaternion: pose.map(|p| p.rotation_quaternion),
        }
    }

    /// Put every captured channel back: curves are reset to their captured keys (recreated
    /// in the bag of `slot` if removed since) and curves that did not exist are removed.
    pub fn restore(&self, action: &mut Action, armature: &mut Armature, slot: Option<&str>) {
        let slot = action.keying_slot(slot).map(str::to_string);
        for channel in &self.channels {
            match &channel.curve {
                Some(captured) => {
                    match action.store.find_mut(&channel.data_path, channel.array_index) {
                        Some(curve) => {
                            curve.keyframe_points = captured.keyframe_points.clone();
                            curve.group = captured.group.clone();
                        }
                        None => {
                            action.store.push_curve(captured.clone(), slot.as_deref());
                        }
                    }
                }
                None => {
                    action.store.remove(&channel.data_path, channel.array_index);
                }
            }
        }
        if let Some(pb) = armature.pose_bone_mut(&self.bone) {
            if let Some(loc) = self.location {
                pb.location = loc;
            }
            if let Some(rot) = self.rotation_quaternion {
                pb.rotation_quaternion = rot;
            }
        }
    }
}
