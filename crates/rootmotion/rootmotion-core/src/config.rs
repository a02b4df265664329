//! Configuration for root-motion transfer.

use serde::{Deserialize, Serialize};

use crate::math::VerticalAxis;

/// Names and constants the transfer operator works with.
/// Defaults match Mixamo rigs; every field can be overridden from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Bone whose motion is extracted (pelvis).
    pub source_bone: String,
    /// Synthesized parent of the source bone.
    pub root_bone: String,
    /// Rest tail of a newly created root bone (head sits at the origin).
    pub root_tail: [f32; 3],
    /// Display group for the root bone's curves.
    pub root_group: String,
    /// Display group for the source bone's rotation curves.
    pub source_group: String,
    /// Local axis treated as vertical when isolating heading.
    pub vertical_axis: VerticalAxis,
    /// Frame sampled for the ground offset and the reference lean.
    pub reference_frame: i32,
    /// Restore the source bone's captured curves before re-running a transfer.
    pub restore_source_on_rerun: bool,
    /// Factor applied to the hips location curves of freshly imported Mixamo clips.
    pub hips_location_scale: f32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            source_bone: "Hips".to_string(),
            root_bone: "Root".to_string(),
            root_tail: [0.0, 0.0, 0.4],
            root_group: "Root".to_string(),
            source_group: "Hips".to_string(),
            vertical_axis: VerticalAxis::Y,
            reference_frame: 1,
            restore_source_on_rerun: true,
            hips_location_scale: 0.01,
        }
    }
}

impl TransferConfig {
    /// Parse a (possibly partial) JSON config; missing fields take their defaults.
    pub fn from_json(s: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = TransferConfig::from_json(r#"{ "source_bone": "pelvis" }"#).unwrap();
        assert_eq!(cfg.source_bone, "pelvis");
        assert_eq!(cfg.root_bone, "Root");
        assert_eq!(cfg.vertical_axis, VerticalAxis::Y);
        assert_eq!(cfg.reference_frame, 1);
    }
}
