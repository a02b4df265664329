//! Pose evaluation: sampling an action's bone curves at a frame.
//!
//! `evaluate_pose` is pure; [`Pose::apply_to`] is the only step that writes the armature.
//! [`FrameDriver`] pairs the two and tracks the current frame, standing in for the host's
//! "set current frame" side effect.

use hashbrown::HashMap;

use crate::action::Action;
use crate::armature::Armature;
use crate::data_path::{BoneProperty, DataPath};

/// Channels of one bone that the action animates. `None` channels are left as posed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoneSample {
    pub location: [Option<f32>; 3],
    pub rotation_quaternion: [Option<f32>; 4],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pose {
    pub frame: i32,
    pub bones: HashMap<String, BoneSample>,
}

impl Pose {
    pub fn bone(&self, name: &str) -> Option<&BoneSample> {
        self.bones.get(name)
    }

    /// Write every sampled channel onto the matching pose bone.
    pub fn apply_to(&self, armature: &mut Armature) {
        for (name, sample) in &self.bones {
            let Some(pb) = armature.pose_bone_mut(name) else {
                continue;
            };
            for (dst, src) in pb.location.iter_mut().zip(sample.location) {
                if let Some(v) = src {
                    *dst = v;
                }
            }
            for (dst, src) in pb.rotation_quaternion.iter_mut().zip(sample.rotation_quaternion) {
                if let Some(v) = src {
                    *dst = v;
                }
            }
        }
    }
}

/// Sample every pose-bone location/rotation curve of `action` at `frame`. Curves for bones
/// the armature lacks, or for other properties, are ignored.
pub fn evaluate_pose(action: &Action, armature: &Armature, frame: i32) -> Pose {
    let mut bones: HashMap<String, BoneSample> = HashMap::new();
    for curve in action.store.curves() {
        let DataPath::PoseBone { bone, property } = &curve.data_path else {
            continue;
        };
        if armature.pose_bone(bone).is_none() {
            continue;
        }
        let value = curve.evaluate(frame as f32);
        let sample = bones.entry_ref(bone.as_str()).or_default();
        let slot = match property {
            BoneProperty::Location => sample.location.get_mut(curve.array_index),
            BoneProperty::RotationQuaternion => {
                sample.rotation_quaternion.get_mut(curve.array_index)
            }
            BoneProperty::RotationEuler | BoneProperty::Scale => None,
        };
        if let Some(slot) = slot {
            *slot = Some(value);
        }
    }
    Pose { frame, bones }
}

/// Produces the pose of an armature at a frame.
pub trait PoseEvaluator {
    fn evaluate(&self, action: &Action, armature: &Armature, frame: i32) -> Pose;
}

/// Evaluates the action's own curves.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurveEvaluator;

impl PoseEvaluator for CurveEvaluator {
    fn evaluate(&self, action: &Action, armature: &Armature, frame: i32) -> Pose {
        evaluate_pose(action, armature, frame)
    }
}

/// Current-frame state. Setting a frame evaluates the action and applies the pose before
/// returning, so curve reads that follow see the re-evaluated armature.
#[derive(Debug)]
pub struct FrameDriver<E = CurveEvaluator> {
    evaluator: E,
    current: i32,
}

impl<E: PoseEvaluator> FrameDriver<E> {
    pub fn new(evaluator: E, current: i32) -> Self {
        Self { evaluator, current }
    }

    #[inline]
    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn frame_set(&mut self, armature: &mut Armature, action: &Action, frame: i32) {
        self.current = frame;
        self.evaluator
            .evaluate(action, armature, frame)
            .apply_to(armature);
    }
}
