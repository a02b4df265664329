//! Root-motion extraction for humanoid rigs (host-agnostic)
//!
//! Rewrites a rig's pelvis ("Hips") animation so that horizontal travel and heading live
//! on a synthesized "Root" bone. The crate models what it needs from the host application
//! as plain data: armatures with bones and pose bones, actions with flat or layered curve
//! stores, and a scene with a current frame. Setting a frame is an explicit call through
//! [`FrameDriver`].
//!
//! Pipeline: [`ensure_root_bone`], then per action [`transfer_location`] and
//! [`transfer_rotation`]; [`apply_transfer`] runs all of it and returns host-facing reports.

pub mod action;
pub mod armature;
pub mod config;
pub mod curve;
pub mod data_path;
pub mod document;
pub mod error;
pub mod interp;
pub mod location;
pub mod locator;
pub mod math;
pub mod mixamo;
pub mod operator;
pub mod playback;
pub mod policy;
pub mod pose;
pub mod provision;
pub mod report;
pub mod rotation;
pub mod store;

pub use action::{Action, CapturedChannel, SourceSnapshot};
pub use armature::{Armature, Bone, EditBones, Mode, PoseBone};
pub use config::TransferConfig;
pub use curve::{FCurve, InsertMode, Interpolation, Keyframe, FRAME_THRESHOLD};
pub use data_path::{BoneProperty, DataPath};
pub use document::{AnimData, BlendData, Object, ObjectData, Scene};
pub use error::TransferError;
pub use location::{transfer_location, LocationOutcome};
pub use locator::{all_curves, find_curve, find_curve_mut, get_or_create, keyframe_insert};
pub use math::{Quat, VerticalAxis};
pub use mixamo::{correct_hips_offset, correct_object_hips, remove_duplicate_objects};
pub use operator::{apply_transfer, apply_transfer_with, ActionOutcome, TransferReport};
pub use playback::{assign_action, match_frame_range, play_loop};
pub use policy::{AxisMode, TransferPolicy};
pub use pose::{evaluate_pose, BoneSample, CurveEvaluator, FrameDriver, Pose, PoseEvaluator};
pub use provision::{ensure_root_bone, has_root_bone, Provisioned};
pub use report::{Report, ReportLevel};
pub use rotation::{transfer_rotation, RotationOutcome};
pub use store::{ChannelBag, CurveStore, Layer, StoreKind, Strip};

pub type Result<T> = core::result::Result<T, TransferError>;
