//! Clean-up passes for freshly imported Mixamo clips.

use log::info;

use crate::action::Action;
use crate::armature::Armature;
use crate::data_path::BoneProperty;
use crate::document::BlendData;
use crate::error::TransferError;

/// First bone whose name contains "hips", ignoring case (`mixamorig:Hips`, `Hips`, ...).
pub fn find_hips_bone(armature: &Armature) -> Option<&str> {
    armature
        .bones
        .iter()
        .map(|b| b.name.as_str())
        .find(|name| name.to_lowercase().contains("hips"))
}

/// Scale every key value of the hips bone's location curves by `factor` and refresh the
/// curves. Returns the number of curves touched, or `None` when the rig has no hips bone.
pub fn correct_hips_offset(armature: &Armature, action: &mut Action, factor: f32) -> Option<usize> {
    let hips = find_hips_bone(armature)?;
    let mut touched = 0;
    for curve in action.store.curves_mut() {
        if curve.data_path.is_bone_property(hips, BoneProperty::Location) {
            curve.scale_values(factor);
            curve.update();
            touched += 1;
        }
    }
    Some(touched)
}

/// Apply [`correct_hips_offset`] to the action assigned to `object`. Objects without an
/// assigned action, or rigs without a hips bone, are left alone.
pub fn correct_object_hips(data: &mut BlendData, object: &str, factor: f32) -> crate::Result<usize> {
    let obj = data
        .objects
        .iter()
        .find(|o| o.name == object)
        .ok_or_else(|| TransferError::ObjectNotFound {
            name: object.to_string(),
        })?;
    let armature = obj.as_armature().ok_or_else(|| TransferError::NotAnArmature {
        name: object.to_string(),
    })?;
    let Some(action_name) = obj.action() else {
        return Ok(0);
    };
    let action = data
        .actions
        .iter_mut()
        .find(|a| a.name == action_name)
        .ok_or_else(|| TransferError::ActionNotFound {
            name: action_name.to_string(),
        })?;
    Ok(correct_hips_offset(armature, action, factor).unwrap_or(0))
}

/// `<base>.<digits>`, the naming the host gives duplicated objects.
pub fn is_duplicate_name(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, suffix)| !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()))
}

/// Remove every duplicate-named object in one batch. Returns the removed count.
pub fn remove_duplicate_objects(data: &mut BlendData) -> usize {
    let names: Vec<String> = data
        .objects
        .iter()
        .filter(|o| is_duplicate_name(&o.name))
        .map(|o| o.name.clone())
        .collect();
    if names.is_empty() {
        return 0;
    }
    let removed = data.batch_remove(&names);
    info!("removed {removed} duplicate objects");
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armature::Bone;
    use crate::curve::FCurve;
    use crate::data_path::DataPath;
    use crate::document::{AnimData, Object, ObjectData};

    #[test]
    fn duplicate_names() {
        assert!(is_duplicate_name("Armature.001"));
        assert!(is_duplicate_name("a.b.12"));
        assert!(!is_duplicate_name("Armature"));
        assert!(!is_duplicate_name("Armature."));
        assert!(!is_duplicate_name("Armature.v2"));
    }

    #[test]
    fn hips_scale_touches_only_hips_location() {
        let arm = Armature::new(vec![Bone::new("mixamorig:Spine"), Bone::new("mixamorig:Hips")]);
        assert_eq!(find_hips_bone(&arm), Some("mixamorig:Hips"));

        let mut action = Action::new_layered("Walk", "OBArmature");
        let loc = DataPath::pose_bone("mixamorig:Hips", BoneProperty::Location);
        let rot = DataPath::pose_bone("mixamorig:Hips", BoneProperty::RotationQuaternion);
        action
            .store
            .push_curve(FCurve::from_points(loc.clone(), 1, &[(1.0, 100.0), (2.0, 50.0)]), None);
        action
            .store
            .push_curve(FCurve::from_points(rot.clone(), 0, &[(1.0, 1.0)]), None);

        assert_eq!(correct_hips_offset(&arm, &mut action, 0.01), Some(1));
        let y = action.store.find(&loc, 1).unwrap();
        assert_eq!(y.points().collect::<Vec<_>>(), vec![(1.0, 1.0), (2.0, 0.5)]);
        assert_eq!(action.store.find(&rot, 0).unwrap().value_at_key(1.0), Some(1.0));
    }

    #[test]
    fn object_without_action_is_left_alone() {
        let mut data = BlendData::default();
        data.objects
            .push(Object::armature("Armature", Armature::new(vec![Bone::new("Hips")])));
        data.objects.push(Object {
            name: "Body".into(),
            data: ObjectData::Mesh,
            parent: None,
            animation_data: Some(AnimData::default()),
        });
        assert_eq!(correct_object_hips(&mut data, "Armature", 0.01), Ok(0));
        assert!(matches!(
            correct_object_hips(&mut data, "Body", 0.01),
            Err(TransferError::NotAnArmature { .. })
        ));
    }

    #[test]
    fn sweep_removes_duplicates_in_one_batch() {
        let mut data = BlendData::default();
        for name in ["Armature", "Armature.001", "Armature.002", "Cube"] {
            data.objects
                .push(Object::armature(name, Armature::new(vec![Bone::new("Hips")])));
        }
        assert_eq!(remove_duplicate_objects(&mut data), 2);
        assert_eq!(remove_duplicate_objects(&mut data), 0);
        assert_eq!(data.objects.len(), 2);
    }
}
