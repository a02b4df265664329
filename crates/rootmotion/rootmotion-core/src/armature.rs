//! Skeleton data: bind-pose bones, posable bones, and edit-mode sessions.
//!
//! Bones can only be added or re-parented through an [`EditBones`] session. Ending the
//! session (dropping it) returns the armature to object mode and rebuilds the pose so that
//! every bone has exactly one pose bone of the same name.

use serde::{Deserialize, Serialize};

use crate::data_path::BoneProperty;
use crate::math::{Quat, IDENTITY};

fn default_tail() -> [f32; 3] {
    [0.0, 0.0, 1.0]
}

fn identity() -> Quat {
    IDENTITY
}

/// Bind-pose bone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub head: [f32; 3],
    #[serde(default = "default_tail")]
    pub tail: [f32; 3],
}

impl Bone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            head: [0.0; 3],
            tail: default_tail(),
        }
    }
}

/// Runtime-posable instance of a bone: current local transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseBone {
    pub name: String,
    #[serde(default)]
    pub location: [f32; 3],
    /// `[w, x, y, z]`
    #[serde(default = "identity")]
    pub rotation_quaternion: Quat,
}

impl PoseBone {
    pub fn rest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: [0.0; 3],
            rotation_quaternion: IDENTITY,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Object,
    Edit,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Armature {
    #[serde(default)]
    pub bones: Vec<Bone>,
    #[serde(default)]
    pub pose: Vec<PoseBone>,
    #[serde(skip)]
    mode: Mode,
}

impl Armature {
    pub fn new(bones: Vec<Bone>) -> Self {
        let mut armature = Self {
            bones,
            pose: Vec::new(),
            mode: Mode::Object,
        };
        armature.sync_pose();
        armature
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }

    pub fn has_bone(&self, name: &str) -> bool {
        self.bone(name).is_some()
    }

    pub fn pose_bone(&self, name: &str) -> Option<&PoseBone> {
        self.pose.iter().find(|p| p.name == name)
    }

    pub fn pose_bone_mut(&mut self, name: &str) -> Option<&mut PoseBone> {
        self.pose.iter_mut().find(|p| p.name == name)
    }

    /// Enter edit mode. The returned session restores object mode when dropped.
    pub fn edit(&mut self) -> EditBones<'_> {
        self.mode = Mode::Edit;
        EditBones { armature: self }
    }

    /// Rebuild pose bones in bone order: keep existing state, add missing bones at rest,
    /// drop pose bones whose bone is gone.
    pub fn sync_pose(&mut self) {
        let mut pose = Vec::with_capacity(self.bones.len());
        for bone in &self.bones {
            let existing = self
                .pose
                .iter()
                .position(|p| p.name == bone.name)
                .map(|i| self.pose.swap_remove(i));
            pose.push(existing.unwrap_or_else(|| PoseBone::rest(bone.name.clone())));
        }
        self.pose = pose;
    }

    /// Current value of one channel of a pose-bone property.
    pub fn property_value(&self, bone: &str, property: BoneProperty, index: usize) -> Option<f32> {
        let pb = self.pose_bone(bone)?;
        match property {
            BoneProperty::Location => pb.location.get(index).copied(),
            BoneProperty::RotationQuaternion => pb.rotation_quaternion.get(index).copied(),
            BoneProperty::RotationEuler => (index < 3).then_some(0.0),
            BoneProperty::Scale => (index < 3).then_some(1.0),
        }
    }
}

/// Edit-mode access to an armature's bones.
pub struct EditBones<'a> {
    armature: &'a mut Armature,
}

impl EditBones<'_> {
    pub fn contains(&self, name: &str) -> bool {
        self.armature.has_bone(name)
    }

    pub fn get(&self, name: &str) -> Option<&Bone> {
        self.armature.bone(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Bone> {
        self.armature.bones.iter_mut().find(|b| b.name == name)
    }

    /// Add a bone. Names are unique; an existing bone with this name is returned instead.
    pub fn new_bone(&mut self, name: &str) -> &mut Bone {
        let idx = match self.armature.bones.iter().position(|b| b.name == name) {
            Some(i) => i,
            None => {
                self.armature.bones.push(Bone::new(name));
                self.armature.bones.len() - 1
            }
        };
        &mut self.armature.bones[idx]
    }

    /// Parent `child` under `parent`. Both must exist.
    pub fn set_parent(&mut self, child: &str, parent: &str) -> bool {
        if !self.contains(parent) {
            return false;
        }
        match self.get_mut(child) {
            Some(bone) => {
                bone.parent = Some(parent.to_string());
                true
            }
            None => false,
        }
    }
}

impl Drop for EditBones<'_> {
    fn drop(&mut self) {
        self.armature.mode = Mode::Object;
        self.armature.sync_pose();
    }
}
