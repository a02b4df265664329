//! Host document model: objects, actions and the scene that ties them together.

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::armature::Armature;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectData {
    Armature(Armature),
    Mesh,
    Empty,
}

/// Action assignment of an object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimData {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub action_slot: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub name: String,
    pub data: ObjectData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_data: Option<AnimData>,
}

impl Object {
    pub fn armature(name: impl Into<String>, armature: Armature) -> Self {
        Self {
            name: name.into(),
            data: ObjectData::Armature(armature),
            parent: None,
            animation_data: None,
        }
    }

    pub fn as_armature(&self) -> Option<&Armature> {
        match &self.data {
            ObjectData::Armature(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_armature_mut(&mut self) -> Option<&mut Armature> {
        match &mut self.data {
            ObjectData::Armature(a) => Some(a),
            _ => None,
        }
    }

    /// Name of the assigned action, if any.
    pub fn action(&self) -> Option<&str> {
        self.animation_data.as_ref()?.action.as_deref()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default = "default_frame")]
    pub frame_current: i32,
    #[serde(default = "default_frame")]
    pub frame_start: i32,
    #[serde(default = "default_frame_end")]
    pub frame_end: i32,
    /// Objects present in the active view layer.
    #[serde(default)]
    pub view_layer: Vec<String>,
    /// Armature the transfer operator works on.
    #[serde(default)]
    pub target_armature: Option<String>,
}

fn default_frame() -> i32 {
    1
}

fn default_frame_end() -> i32 {
    250
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            frame_current: default_frame(),
            frame_start: default_frame(),
            frame_end: default_frame_end(),
            view_layer: Vec::new(),
            target_armature: None,
        }
    }
}

impl Scene {
    pub fn is_in_view_layer(&self, name: &str) -> bool {
        self.view_layer.iter().any(|n| n == name)
    }
}

/// Everything the operators touch: objects, actions, and the scene.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendData {
    #[serde(default)]
    pub objects: Vec<Object>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub scene: Scene,
}

impl BlendData {
    /// Parse a document and bring every armature's pose in line with its bones.
    pub fn from_json(s: &str) -> crate::Result<Self> {
        let mut data: BlendData = serde_json::from_str(s)?;
        for obj in &mut data.objects {
            if let Some(arm) = obj.as_armature_mut() {
                arm.sync_pose();
            }
        }
        Ok(data)
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn object(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut Object> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn action_mut(&mut self, name: &str) -> Option<&mut Action> {
        self.actions.iter_mut().find(|a| a.name == name)
    }

    pub fn armature(&self, object: &str) -> Option<&Armature> {
        self.object(object)?.as_armature()
    }

    /// Remove all named objects in one pass. Names are collected by the caller first, so
    /// nothing is removed while the object list is being walked. Returns the removed count.
    pub fn batch_remove(&mut self, names: &[String]) -> usize {
        let before = self.objects.len();
        self.objects.retain(|o| !names.contains(&o.name));
        self.scene.view_layer.retain(|n| !names.contains(n));
        before - self.objects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armature::Bone;

    #[test]
    fn from_json_syncs_pose_bones() {
        let json = r#"{
            "objects": [
                { "name": "Armature", "data": { "type": "armature", "bones": [{ "name": "Hips" }] } },
                { "name": "Body", "data": { "type": "mesh" }, "parent": "Armature" }
            ],
            "scene": { "view_layer": ["Armature", "Body"], "target_armature": "Armature" }
        }"#;
        let data = BlendData::from_json(json).unwrap();
        let arm = data.armature("Armature").expect("armature");
        assert!(arm.pose_bone("Hips").is_some());
        assert!(data.armature("Body").is_none());
        assert_eq!(data.scene.frame_current, 1);
    }

    #[test]
    fn batch_remove_drops_objects_and_view_layer_entries() {
        let mut data = BlendData::default();
        for name in ["A", "A.001", "B"] {
            data.objects
                .push(Object::armature(name, Armature::new(vec![Bone::new("Hips")])));
            data.scene.view_layer.push(name.to_string());
        }
        let removed = data.batch_remove(&["A.001".to_string(), "Z".to_string()]);
        assert_eq!(removed, 1);
        assert!(data.object("A.001").is_none());
        assert_eq!(data.scene.view_layer, vec!["A".to_string(), "B".to_string()]);
    }
}
