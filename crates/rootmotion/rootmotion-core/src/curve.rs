//! F-Curves: one scalar animation channel addressed by (data path, array index).
//!
//! Model:
//! - Keyframes are kept in frame order with at most one key per frame; inserting within
//!   [`FRAME_THRESHOLD`] of an existing key overwrites it.
//! - The left key of a segment decides its interpolation (constant, linear, bezier).
//! - Outside the keyed extent the curve holds the first/last value (constant extrapolation).
//! - Bezier handles are optional; unset handles act as flat handles at one third of the
//!   segment until [`FCurve::update`] (or a [`InsertMode::Replace`] insertion) computes them.

use serde::{Deserialize, Serialize};

use crate::data_path::DataPath;
use crate::interp::{bezier_segment, lerp_f32};

/// Two keys closer than this (in frames) are the same key.
pub const FRAME_THRESHOLD: f32 = 0.01;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    Constant,
    Linear,
    #[default]
    Bezier,
}

/// How a keyframe insertion treats the curve's derived data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertMode {
    /// Insert or overwrite only; handles are not recalculated.
    Fast,
    /// Insert or overwrite, then recalculate handles across the curve.
    Replace,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// (frame, value)
    pub co: [f32; 2],
    #[serde(default)]
    pub interpolation: Interpolation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_left: Option<[f32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_right: Option<[f32; 2]>,
}

impl Keyframe {
    pub fn new(frame: f32, value: f32) -> Self {
        Self {
            co: [frame, value],
            interpolation: Interpolation::default(),
            handle_left: None,
            handle_right: None,
        }
    }

    #[inline]
    pub fn frame(&self) -> f32 {
        self.co[0]
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.co[1]
    }

    /// Move the value, carrying the handles along so the local shape is kept.
    fn set_value(&mut self, value: f32) {
        let delta = value - self.co[1];
        self.co[1] = value;
        if let Some(h) = self.handle_left.as_mut() {
            h[1] += delta;
        }
        if let Some(h) = self.handle_right.as_mut() {
            h[1] += delta;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FCurve {
    pub data_path: DataPath,
    #[serde(default)]
    pub array_index: usize,
    /// Display group (usually the bone name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub keyframe_points: Vec<Keyframe>,
}

impl FCurve {
    pub fn new(data_path: DataPath, array_index: usize) -> Self {
        Self {
            data_path,
            array_index,
            group: None,
            keyframe_points: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Build a curve from (frame, value) pairs; handles are computed as after `update()`.
    pub fn from_points(data_path: DataPath, array_index: usize, points: &[(f32, f32)]) -> Self {
        let mut curve = Self::new(data_path, array_index);
        for &(frame, value) in points {
            curve.insert(frame, value, InsertMode::Fast);
        }
        curve.update();
        curve
    }

    #[inline]
    pub fn matches(&self, data_path: &DataPath, array_index: usize) -> bool {
        self.array_index == array_index && &self.data_path == data_path
    }

    #[inline]
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframe_points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keyframe_points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keyframe_points.is_empty()
    }

    /// Iterate (frame, value) pairs in frame order.
    pub fn points(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.keyframe_points.iter().map(|k| (k.co[0], k.co[1]))
    }

    /// Value of the key sitting on `frame`, if any.
    pub fn value_at_key(&self, frame: f32) -> Option<f32> {
        self.find_key(frame).map(|i| self.keyframe_points[i].co[1])
    }

    fn find_key(&self, frame: f32) -> Option<usize> {
        let idx = self.keyframe_points.partition_point(|k| k.co[0] < frame);
        [idx.checked_sub(1), Some(idx)]
            .into_iter()
            .flatten()
            .filter(|&i| i < self.keyframe_points.len())
            .find(|&i| (self.keyframe_points[i].co[0] - frame).abs() < FRAME_THRESHOLD)
    }

    /// Insert a key, overwriting any key within the frame threshold. Returns its index.
    pub fn insert(&mut self, frame: f32, value: f32, mode: InsertMode) -> usize {
        let index = match self.find_key(frame) {
            Some(i) => {
                let key = &mut self.keyframe_points[i];
                key.co = [frame, value];
                key.handle_left = None;
                key.handle_right = None;
                i
            }
            None => {
                let i = self.keyframe_points.partition_point(|k| k.co[0] < frame);
                self.keyframe_points.insert(i, Keyframe::new(frame, value));
                i
            }
        };
        if mode == InsertMode::Replace {
            self.recalc_handles();
        }
        index
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        self.keyframe_points.clear();
    }

    /// Replace this curve's keys with a point-for-point copy of `source`.
    pub fn copy_points_from(&mut self, source: &[Keyframe]) {
        self.clear();
        for key in source {
            self.insert(key.co[0], key.co[1], InsertMode::Fast);
        }
    }

    /// Add `delta` to every key value.
    pub fn offset_values(&mut self, delta: f32) {
        for key in &mut self.keyframe_points {
            let v = key.co[1] + delta;
            key.set_value(v);
        }
    }

    /// Multiply every key value by `factor`.
    pub fn scale_values(&mut self, factor: f32) {
        for key in &mut self.keyframe_points {
            let v = key.co[1] * factor;
            key.set_value(v);
        }
    }

    /// Set every existing key value to zero; frames are kept.
    pub fn zero_values(&mut self) {
        for key in &mut self.keyframe_points {
            key.set_value(0.0);
        }
    }

    /// First and last keyed frame.
    pub fn frame_extent(&self) -> Option<(f32, f32)> {
        let first = self.keyframe_points.first()?;
        let last = self.keyframe_points.last()?;
        Some((first.co[0], last.co[0]))
    }

    /// Evaluate the curve at `frame`. An empty curve evaluates to 0.
    pub fn evaluate(&self, frame: f32) -> f32 {
        let keys = &self.keyframe_points;
        let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
            return 0.0;
        };
        if frame <= first.co[0] {
            return first.co[1];
        }
        if frame >= last.co[0] {
            return last.co[1];
        }
        if let Some(i) = self.find_key(frame) {
            if keys[i].co[0] == frame {
                return keys[i].co[1];
            }
        }

        let i1 = keys.partition_point(|k| k.co[0] <= frame);
        let left = &keys[i1 - 1];
        let right = &keys[i1];
        let span = right.co[0] - left.co[0];
        if span <= f32::EPSILON {
            return right.co[1];
        }
        match left.interpolation {
            Interpolation::Constant => left.co[1],
            Interpolation::Linear => lerp_f32(left.co[1], right.co[1], (frame - left.co[0]) / span),
            Interpolation::Bezier => {
                let p1 = left
                    .handle_right
                    .unwrap_or([left.co[0] + span / 3.0, left.co[1]]);
                let p2 = right
                    .handle_left
                    .unwrap_or([right.co[0] - span / 3.0, right.co[1]]);
                bezier_segment(left.co, p1, p2, right.co, frame)
            }
        }
    }

    /// Re-sort keys, merge keys closer than the threshold (last write wins), and recalculate
    /// handles. Call after bulk edits made with [`InsertMode::Fast`].
    pub fn update(&mut self) {
        self.keyframe_points
            .sort_by(|a, b| a.co[0].total_cmp(&b.co[0]));
        let mut merged: Vec<Keyframe> = Vec::with_capacity(self.keyframe_points.len());
        for key in self.keyframe_points.drain(..) {
            match merged.last_mut() {
                Some(prev) if (key.co[0] - prev.co[0]).abs() < FRAME_THRESHOLD => *prev = key,
                _ => merged.push(key),
            }
        }
        self.keyframe_points = merged;
        self.recalc_handles();
    }

    /// Auto-clamped handles: horizontal at the ends and at local extrema, otherwise parallel
    /// to the neighbour chord; each side reaches one third of the adjacent interval.
    pub fn recalc_handles(&mut self) {
        let n = self.keyframe_points.len();
        for i in 0..n {
            let co = self.keyframe_points[i].co;
            let prev = i.checked_sub(1).map(|p| self.keyframe_points[p].co);
            let next = self.keyframe_points.get(i + 1).map(|k| k.co);

            let left_len = match (prev, next) {
                (Some(p), _) => (co[0] - p[0]) / 3.0,
                (None, Some(nx)) => (nx[0] - co[0]) / 3.0,
                (None, None) => 1.0,
            };
            let right_len = match (prev, next) {
                (_, Some(nx)) => (nx[0] - co[0]) / 3.0,
                (Some(p), None) => (co[0] - p[0]) / 3.0,
                (None, None) => 1.0,
            };
            let slope = match (prev, next) {
                (Some(p), Some(nx)) => {
                    let extremum = (co[1] >= p[1] && co[1] >= nx[1])
                        || (co[1] <= p[1] && co[1] <= nx[1]);
                    let dx = nx[0] - p[0];
                    if extremum || dx <= f32::EPSILON {
                        0.0
                    } else {
                        (nx[1] - p[1]) / dx
                    }
                }
                _ => 0.0,
            };

            let key = &mut self.keyframe_points[i];
            key.handle_left = Some([co[0] - left_len, co[1] - slope * left_len]);
            key.handle_right = Some([co[0] + right_len, co[1] + slope * right_len]);
        }
    }
}
