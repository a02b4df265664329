//! Action playback matching: bind an action to an object and fit the scene to it.

use log::{info, warn};

use crate::action::Action;
use crate::document::{AnimData, BlendData, Object, Scene};
use crate::error::TransferError;
use crate::report::Report;

/// Assign `action` to `object`, creating animation data when missing.
///
/// When the action declares slots the object keeps its current slot if that slot belongs
/// to the action; otherwise it is bound to the action's first slot. Returns the bound slot.
pub fn assign_action<'a>(object: &'a mut Object, action: &Action) -> Option<&'a str> {
    let adt = object.animation_data.get_or_insert_with(AnimData::default);
    adt.action = Some(action.name.clone());

    if let Some(first) = action.first_slot() {
        let valid = adt
            .action_slot
            .as_deref()
            .is_some_and(|slot| action.slots.iter().any(|s| s == slot));
        if !valid {
            adt.action_slot = Some(first.to_string());
        }
    }
    adt.action_slot.as_deref()
}

/// Set the scene's playback range to the action's frame range and jump to its start.
pub fn match_frame_range(scene: &mut Scene, action: &Action) {
    let (start, end) = action.frame_range();
    scene.frame_start = start as i32;
    scene.frame_end = end as i32;
    scene.frame_current = scene.frame_start;
}

/// Assign the named action to the named object and match the scene range to it.
pub fn play_loop(data: &mut BlendData, object: &str, action: &str) -> crate::Result<Report> {
    let Some(act) = data.actions.iter().find(|a| a.name == action) else {
        warn!("cannot loop: action '{action}' not found");
        return Err(TransferError::ActionNotFound {
            name: action.to_string(),
        });
    };
    let Some(obj) = data.objects.iter_mut().find(|o| o.name == object) else {
        return Err(TransferError::ObjectNotFound {
            name: object.to_string(),
        });
    };
    assign_action(obj, act);
    match_frame_range(&mut data.scene, act);
    info!(
        "looping '{}' over {}..={}",
        act.name, data.scene.frame_start, data.scene.frame_end
    );
    Ok(Report::info(format!("Looping: {}", act.name)))
}
