//! Data path parsing and formatting.
//!
//! Grammar for pose-bone channels:
//!   pose.bones["<bone>"].<property>
//! - `<bone>` may contain `\"` and `\\` escapes
//! - `<property>` is one of `location`, `rotation_quaternion`, `rotation_euler`, `scale`
//!   Examples:
//!   `pose.bones["Hips"].location` -> bone="Hips", property=Location
//!   `pose.bones["Root"].rotation_quaternion` -> bone="Root", property=RotationQuaternion
//!
//! Any other non-empty string is kept verbatim as [`DataPath::Raw`] so curves driving
//! unrelated properties survive enumeration untouched.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::TransferError;

const BONES_PREFIX: &str = "pose.bones[\"";

/// Animatable transform property of a pose bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoneProperty {
    Location,
    RotationQuaternion,
    RotationEuler,
    Scale,
}

impl BoneProperty {
    pub fn as_str(self) -> &'static str {
        match self {
            BoneProperty::Location => "location",
            BoneProperty::RotationQuaternion => "rotation_quaternion",
            BoneProperty::RotationEuler => "rotation_euler",
            BoneProperty::Scale => "scale",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "location" => Some(BoneProperty::Location),
            "rotation_quaternion" => Some(BoneProperty::RotationQuaternion),
            "rotation_euler" => Some(BoneProperty::RotationEuler),
            "scale" => Some(BoneProperty::Scale),
            _ => None,
        }
    }

    /// Number of channels (array indices) the property exposes.
    pub fn channel_count(self) -> usize {
        match self {
            BoneProperty::RotationQuaternion => 4,
            _ => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataPath {
    PoseBone {
        bone: String,
        property: BoneProperty,
    },
    Raw(String),
}

impl DataPath {
    pub fn pose_bone(bone: impl Into<String>, property: BoneProperty) -> Self {
        DataPath::PoseBone {
            bone: bone.into(),
            property,
        }
    }

    /// Parse a path string according to the grammar described above.
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("empty path".to_string());
        }
        let Some(rest) = s.strip_prefix(BONES_PREFIX) else {
            return Ok(DataPath::Raw(s.to_string()));
        };

        let mut bone = String::new();
        let mut chars = rest.char_indices();
        let mut close = None;
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, escaped)) => bone.push(escaped),
                    None => return Err("dangling escape in bone name".to_string()),
                },
                '"' => {
                    close = Some(i);
                    break;
                }
                _ => bone.push(c),
            }
        }
        let Some(close) = close else {
            return Err("unterminated bone name".to_string());
        };
        if bone.is_empty() {
            return Err("empty bone name".to_string());
        }

        let tail = &rest[close + 1..];
        let property = tail
            .strip_prefix("].")
            .and_then(BoneProperty::parse);
        match property {
            Some(property) => Ok(DataPath::PoseBone { bone, property }),
            None => Ok(DataPath::Raw(s.to_string())),
        }
    }

    /// Bone name for pose-bone paths.
    pub fn bone(&self) -> Option<&str> {
        match self {
            DataPath::PoseBone { bone, .. } => Some(bone),
            DataPath::Raw(_) => None,
        }
    }

    pub fn property(&self) -> Option<BoneProperty> {
        match self {
            DataPath::PoseBone { property, .. } => Some(*property),
            DataPath::Raw(_) => None,
        }
    }

    pub fn is_bone_property(&self, bone: &str, property: BoneProperty) -> bool {
        matches!(self, DataPath::PoseBone { bone: b, property: p } if b == bone && *p == property)
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataPath::PoseBone { bone, property } => {
                f.write_str(BONES_PREFIX)?;
                for c in bone.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, "\"].{}", property.as_str())
            }
            DataPath::Raw(raw) => f.write_str(raw),
        }
    }
}

impl FromStr for DataPath {
    type Err = TransferError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataPath::parse(s).map_err(|reason| TransferError::InvalidDataPath {
            path: s.to_string(),
            reason,
        })
    }
}

// Serde support: serialize as string, deserialize from string
impl Serialize for DataPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DataPath {
    fn deserialize<D>(deserializer: D) -> Result<DataPath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DataPath::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_location() {
        let p = DataPath::parse("pose.bones[\"Hips\"].location").unwrap();
        assert_eq!(p.bone(), Some("Hips"));
        assert_eq!(p.property(), Some(BoneProperty::Location));
        assert_eq!(p.to_string(), "pose.bones[\"Hips\"].location");
    }

    #[test]
    fn parse_rotation_quaternion() {
        let p = DataPath::parse("pose.bones[\"Root\"].rotation_quaternion").unwrap();
        assert!(p.is_bone_property("Root", BoneProperty::RotationQuaternion));
        assert_eq!(p.property().unwrap().channel_count(), 4);
    }

    #[test]
    fn escaped_bone_names_survive_formatting() {
        let p = DataPath::pose_bone("mixamorig:\"Hips\"", BoneProperty::Scale);
        let text = p.to_string();
        assert_eq!(text, "pose.bones[\"mixamorig:\\\"Hips\\\"\"].scale");
        assert_eq!(DataPath::parse(&text).unwrap(), p);
    }

    #[test]
    fn unknown_properties_stay_raw() {
        let p = DataPath::parse("pose.bones[\"Hips\"].bbone_curveinx").unwrap();
        assert!(matches!(p, DataPath::Raw(_)));
        assert_eq!(p.bone(), None);

        let p = DataPath::parse("key_blocks[\"Smile\"].value").unwrap();
        assert_eq!(p.to_string(), "key_blocks[\"Smile\"].value");
    }

    #[test]
    fn rejects_malformed_bone_paths() {
        let err = "pose.bones[\"".parse::<DataPath>().unwrap_err();
        assert_eq!(err.category(), "curve");
        assert!(DataPath::parse("").is_err());
        assert!(DataPath::parse("pose.bones[\"Hips").is_err());
        assert!(DataPath::parse("pose.bones[\"\"].location").is_err());
    }
}
