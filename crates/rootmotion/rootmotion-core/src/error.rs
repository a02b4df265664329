//! Error types for root-motion transfer

use serde::{Deserialize, Serialize};

/// Errors raised while provisioning, locating curves, or transferring motion.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TransferError {
    /// The scene has no target armature configured
    #[error("No target armature selected")]
    NoTargetArmature,

    /// Object lookup failed
    #[error("Object not found: {name}")]
    ObjectNotFound { name: String },

    /// Object exists but does not carry armature data
    #[error("Object '{name}' is not an armature")]
    NotAnArmature { name: String },

    /// Armature is not part of the active view layer
    #[error("Armature '{name}' must be in the active view layer")]
    NotInViewLayer { name: String },

    /// Required bone is absent from the skeleton
    #[error("No bone named '{bone}' found")]
    MissingBone { bone: String },

    /// Action lookup failed
    #[error("Action not found: {name}")]
    ActionNotFound { name: String },

    /// Action carries no source-bone translation curves
    #[error("No translation data found in action {action}")]
    NoTranslationCurves { action: String },

    /// Host rejected a keyframe insertion (and with it, curve creation)
    #[error("Cannot key {data_path}[{index}]: {reason}")]
    KeyframeInsert {
        data_path: String,
        index: usize,
        reason: String,
    },

    /// Data path string could not be parsed
    #[error("Invalid data path '{path}': {reason}")]
    InvalidDataPath { path: String, reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl TransferError {
    /// Soft failures skip a channel or an action; everything else aborts the operator.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoTranslationCurves { .. } | Self::KeyframeInsert { .. }
        )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::NoTargetArmature
            | Self::ObjectNotFound { .. }
            | Self::NotAnArmature { .. }
            | Self::NotInViewLayer { .. }
            | Self::MissingBone { .. } => "precondition",
            Self::ActionNotFound { .. } | Self::NoTranslationCurves { .. } => "action",
            Self::KeyframeInsert { .. } | Self::InvalidDataPath { .. } => "curve",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for TransferError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_failures_are_recoverable() {
        let skip = TransferError::NoTranslationCurves {
            action: "Walk".to_string(),
        };
        assert!(skip.is_recoverable());
        assert_eq!(skip.category(), "action");

        let fatal = TransferError::MissingBone {
            bone: "Hips".to_string(),
        };
        assert!(!fatal.is_recoverable());
        assert_eq!(fatal.category(), "precondition");
    }

    #[test]
    fn messages_are_human_readable() {
        let err = TransferError::MissingBone {
            bone: "Hips".to_string(),
        };
        assert_eq!(err.to_string(), "No bone named 'Hips' found");

        let err = TransferError::KeyframeInsert {
            data_path: "pose.bones[\"Root\"].location".to_string(),
            index: 1,
            reason: "bone does not exist".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot key pose.bones[\"Root\"].location[1]: bone does not exist"
        );
    }

    #[test]
    fn json_errors_convert() {
        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: TransferError = bad.into();
        assert_eq!(err.category(), "serialization");
    }
}
