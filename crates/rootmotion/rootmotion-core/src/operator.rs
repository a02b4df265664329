//! The "apply transfer" operator: provision the root bone, then rewrite every action.

use log::{debug, info, warn};

use crate::action::{Action, SourceSnapshot};
use crate::armature::Armature;
use crate::config::TransferConfig;
use crate::document::BlendData;
use crate::error::TransferError;
use crate::location::{transfer_location, LocationOutcome};
use crate::playback::assign_action;
use crate::pose::{CurveEvaluator, FrameDriver, PoseEvaluator};
use crate::provision::{ensure_root_bone, Provisioned};
use crate::report::Report;
use crate::rotation::{transfer_rotation, RotationOutcome};

/// Result of one action's pass. `location` is `None` when the action was skipped.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionOutcome {
    pub action: String,
    /// Source curves were restored from a previous run before transferring.
    pub restored: bool,
    pub location: Option<LocationOutcome>,
    pub rotation: Option<RotationOutcome>,
}

impl ActionOutcome {
    pub fn skipped(&self) -> bool {
        self.location.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransferReport {
    /// False when a precondition failed and nothing was transferred.
    pub finished: bool,
    pub provisioned: Option<Provisioned>,
    pub reports: Vec<Report>,
    pub actions: Vec<ActionOutcome>,
}

impl TransferReport {
    pub fn errors(&self) -> impl Iterator<Item = &Report> + '_ {
        self.reports
            .iter()
            .filter(|r| r.level == crate::report::ReportLevel::Error)
    }
}

/// Run the transfer on the scene's target armature for every action in `data`.
pub fn apply_transfer(data: &mut BlendData, cfg: &TransferConfig) -> TransferReport {
    apply_transfer_with(data, cfg, CurveEvaluator)
}

/// [`apply_transfer`] with a caller-supplied pose evaluator.
pub fn apply_transfer_with<E: PoseEvaluator>(
    data: &mut BlendData,
    cfg: &TransferConfig,
    evaluator: E,
) -> TransferReport {
    let mut report = TransferReport::default();
    match run(data, cfg, evaluator, &mut report) {
        Ok(()) => {
            report.finished = true;
            report.reports.push(Report::info("Root motion transfer complete"));
        }
        Err(err) => {
            warn!("transfer cancelled [{}]: {err}", err.category());
            report.reports.push(Report::error(err.to_string()));
        }
    }
    report
}

fn run<E: PoseEvaluator>(
    data: &mut BlendData,
    cfg: &TransferConfig,
    evaluator: E,
    report: &mut TransferReport,
) -> crate::Result<()> {
    let target = data
        .scene
        .target_armature
        .clone()
        .ok_or(TransferError::NoTargetArmature)?;

    let BlendData {
        objects,
        actions,
        scene,
    } = data;
    let object = objects
        .iter_mut()
        .find(|o| o.name == target)
        .ok_or_else(|| TransferError::ObjectNotFound {
            name: target.clone(),
        })?;
    let not_armature = || TransferError::NotAnArmature {
        name: target.clone(),
    };
    if object.as_armature().is_none() {
        return Err(not_armature());
    }
    if !scene.is_in_view_layer(&object.name) {
        return Err(TransferError::NotInViewLayer { name: target.clone() });
    }

    let armature = object.as_armature_mut().ok_or_else(not_armature)?;
    let provisioned = ensure_root_bone(armature, cfg)?;
    if provisioned == Provisioned::AlreadyPresent {
        report
            .reports
            .push(Report::info(format!("{} bone already exists", cfg.root_bone)));
    }
    report.provisioned = Some(provisioned);

    let mut driver = FrameDriver::new(evaluator, scene.frame_current);
    for action in actions.iter_mut() {
        let slot = assign_action(object, action).map(str::to_string);
        let slot = slot.as_deref();
        let armature = object.as_armature_mut().ok_or_else(not_armature)?;
        let frame = driver.current();
        driver.frame_set(armature, action, frame);

        let restored = prepare_source(armature, action, cfg, slot, &mut report.reports);
        let location = match transfer_location(armature, action, cfg, slot) {
            Ok(outcome) => outcome,
            Err(err) if err.is_recoverable() => {
                warn!("skipping action '{}': {err}", action.name);
                report.reports.push(Report::error(err.to_string()));
                report.actions.push(ActionOutcome {
                    action: action.name.clone(),
                    restored,
                    location: None,
                    rotation: None,
                });
                continue;
            }
            Err(err) => return Err(err),
        };
        let rotation = transfer_rotation(armature, action, cfg, &mut driver, slot);

        info!(
            "transferred root motion for '{}' ({:?}, rotation: {})",
            action.name, location.mode, rotation.transferred
        );
        report.actions.push(ActionOutcome {
            action: action.name.clone(),
            restored,
            location: Some(location),
            rotation: Some(rotation),
        });
    }
    scene.frame_current = driver.current();
    Ok(())
}

/// On the first run, capture the source bone's curves on the action; on later runs, put
/// them back so the transfer starts from the same input. Returns true when restored.
///
/// A snapshot taken for a different source bone is replaced, with a warning, by a fresh
/// capture of the current curves.
fn prepare_source(
    armature: &mut Armature,
    action: &mut Action,
    cfg: &TransferConfig,
    slot: Option<&str>,
    reports: &mut Vec<Report>,
) -> bool {
    if !cfg.restore_source_on_rerun {
        return false;
    }
    match action.source.take() {
        Some(snapshot) if snapshot.bone == cfg.source_bone => {
            debug!("restoring source curves of '{}'", action.name);
            snapshot.restore(action, armature, slot);
            action.source = Some(snapshot);
            true
        }
        previous => {
            if let Some(stale) = previous {
                warn!(
                    "action '{}' was captured for bone '{}', recapturing for '{}'",
                    action.name, stale.bone, cfg.source_bone
                );
                reports.push(Report::warning(format!(
                    "Action {} was transferred from bone {}; its curves were not restored",
                    action.name, stale.bone
                )));
            }
            action.source = Some(SourceSnapshot::capture(action, armature, &cfg.source_bone));
            false
        }
    }
}
