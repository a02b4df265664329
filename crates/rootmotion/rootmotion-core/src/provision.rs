//! Root bone provisioning.

use log::info;

use crate::armature::Armature;
use crate::config::TransferConfig;
use crate::error::TransferError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provisioned {
    /// Root bone was added and the source bone parented under it.
    Created,
    /// Root bone already existed; nothing changed.
    AlreadyPresent,
}

pub fn has_root_bone(armature: &Armature, cfg: &TransferConfig) -> bool {
    armature.has_bone(&cfg.root_bone)
}

/// Make sure the armature has a root bone parenting the source bone.
///
/// A missing source bone is a precondition failure: nothing is created. The armature is
/// back in object mode on every return path.
pub fn ensure_root_bone(armature: &mut Armature, cfg: &TransferConfig) -> crate::Result<Provisioned> {
    let mut edit = armature.edit();

    if edit.contains(&cfg.root_bone) {
        info!("{} bone already exists", cfg.root_bone);
        return Ok(Provisioned::AlreadyPresent);
    }
    if !edit.contains(&cfg.source_bone) {
        return Err(TransferError::MissingBone {
            bone: cfg.source_bone.clone(),
        });
    }

    let root = edit.new_bone(&cfg.root_bone);
    root.head = [0.0; 3];
    root.tail = cfg.root_tail;
    root.parent = None;
    edit.set_parent(&cfg.source_bone, &cfg.root_bone);
    Ok(Provisioned::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armature::{Bone, Mode};

    #[test]
    fn creates_root_once() {
        let cfg = TransferConfig::default();
        let mut arm = Armature::new(vec![Bone::new("Hips"), Bone::new("Spine")]);
        assert!(!has_root_bone(&arm, &cfg));
        assert_eq!(ensure_root_bone(&mut arm, &cfg), Ok(Provisioned::Created));
        assert_eq!(ensure_root_bone(&mut arm, &cfg), Ok(Provisioned::AlreadyPresent));

        assert_eq!(arm.bones.iter().filter(|b| b.name == "Root").count(), 1);
        let root = arm.bone("Root").unwrap();
        assert_eq!(root.tail, [0.0, 0.0, 0.4]);
        assert_eq!(arm.bone("Hips").unwrap().parent.as_deref(), Some("Root"));
        assert!(arm.pose_bone("Root").is_some());
        assert_eq!(arm.mode(), Mode::Object);
    }

    #[test]
    fn missing_source_bone_creates_nothing() {
        let cfg = TransferConfig::default();
        let mut arm = Armature::new(vec![Bone::new("mixamorig:Hips")]);
        let err = ensure_root_bone(&mut arm, &cfg).unwrap_err();
        assert_eq!(err.category(), "precondition");
        assert!(!has_root_bone(&arm, &cfg));
        assert_eq!(arm.mode(), Mode::Object);
    }
}
