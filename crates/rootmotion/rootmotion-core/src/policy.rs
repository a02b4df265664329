//! Per-action transfer policy.

use serde::{Deserialize, Serialize};

/// Which translation axes move from the source bone onto the root bone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisMode {
    /// Transfer X, Y and Z.
    #[serde(rename = "XYZ")]
    AllAxes,
    /// Transfer X and Z only; the root never carries vertical motion.
    #[default]
    #[serde(rename = "XZ")]
    Horizontal,
    /// Leave translation on the source bone; the root is keyed at the origin.
    #[serde(rename = "NONE")]
    NoTransfer,
}

impl AxisMode {
    /// Whether the source bone's horizontal channels are zeroed after the transfer.
    pub fn moves_horizontal(self) -> bool {
        matches!(self, AxisMode::AllAxes | AxisMode::Horizontal)
    }
}

/// Attached to each action; the engines only read it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPolicy {
    #[serde(default)]
    pub axis_mode: AxisMode,
    /// Move the heading rotation onto the root bone.
    #[serde(default)]
    pub transfer_rotation: bool,
}

impl TransferPolicy {
    pub fn new(axis_mode: AxisMode, transfer_rotation: bool) -> Self {
        Self {
            axis_mode,
            transfer_rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_panel() {
        let p = TransferPolicy::default();
        assert_eq!(p.axis_mode, AxisMode::Horizontal);
        assert!(!p.transfer_rotation);
    }

    #[test]
    fn modes_use_short_names_on_the_wire() {
        let p: TransferPolicy =
            serde_json::from_str(r#"{ "axis_mode": "XYZ", "transfer_rotation": true }"#).unwrap();
        assert_eq!(p, TransferPolicy::new(AxisMode::AllAxes, true));
        assert_eq!(
            serde_json::to_string(&AxisMode::NoTransfer).unwrap(),
            "\"NONE\""
        );
        assert!(!AxisMode::NoTransfer.moves_horizontal());
    }
}
