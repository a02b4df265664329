//! Curve storage shapes.
//!
//! Actions keep their F-Curves in one of two topologies:
//! - `Flat`: the action owns its curves (and display groups) directly.
//! - `Layered`: layers own strips, strips own channel-bags (one per slot), channel-bags own
//!   curves and groups.
//!
//! Both are variants of one closed enum, so the shape is fixed per action and every call
//! dispatches on the variant instead of probing for capabilities.

use serde::{Deserialize, Serialize};

use crate::curve::FCurve;
use crate::data_path::DataPath;

pub const DEFAULT_LAYER_NAME: &str = "Layer";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Flat,
    Layered,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelBag {
    /// Slot this bag animates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub fcurves: Vec<FCurve>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Strip {
    #[serde(default)]
    pub channelbags: Vec<ChannelBag>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    #[serde(default)]
    pub strips: Vec<Strip>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveStore {
    Flat {
        #[serde(default)]
        groups: Vec<String>,
        #[serde(default)]
        fcurves: Vec<FCurve>,
    },
    Layered {
        #[serde(default)]
        layers: Vec<Layer>,
    },
}

impl Default for CurveStore {
    fn default() -> Self {
        CurveStore::Flat {
            groups: Vec::new(),
            fcurves: Vec::new(),
        }
    }
}

fn ensure_group(groups: &mut Vec<String>, name: &str) {
    if !groups.iter().any(|g| g == name) {
        groups.push(name.to_string());
    }
}

impl CurveStore {
    pub fn layered() -> Self {
        CurveStore::Layered { layers: Vec::new() }
    }

    pub fn kind(&self) -> StoreKind {
        match self {
            CurveStore::Flat { .. } => StoreKind::Flat,
            CurveStore::Layered { .. } => StoreKind::Layered,
        }
    }

    /// Enumerate every curve. Each call walks the current contents again.
    pub fn curves(&self) -> Box<dyn Iterator<Item = &FCurve> + '_> {
        match self {
            CurveStore::Flat { fcurves, .. } => Box::new(fcurves.iter()),
            CurveStore::Layered { layers } => Box::new(
                layers
                    .iter()
                    .flat_map(|l| l.strips.iter())
                    .flat_map(|s| s.channelbags.iter())
                    .flat_map(|b| b.fcurves.iter()),
            ),
        }
    }

    pub fn curves_mut(&mut self) -> Box<dyn Iterator<Item = &mut FCurve> + '_> {
        match self {
            CurveStore::Flat { fcurves, .. } => Box::new(fcurves.iter_mut()),
            CurveStore::Layered { layers } => Box::new(
                layers
                    .iter_mut()
                    .flat_map(|l| l.strips.iter_mut())
                    .flat_map(|s| s.channelbags.iter_mut())
                    .flat_map(|b| b.fcurves.iter_mut()),
            ),
        }
    }

    pub fn find(&self, data_path: &DataPath, array_index: usize) -> Option<&FCurve> {
        self.curves().find(|c| c.matches(data_path, array_index))
    }

    pub fn find_mut(&mut self, data_path: &DataPath, array_index: usize) -> Option<&mut FCurve> {
        self.curves_mut().find(|c| c.matches(data_path, array_index))
    }

    /// Display groups across the store.
    pub fn groups(&self) -> Vec<&str> {
        match self {
            CurveStore::Flat { groups, .. } => groups.iter().map(String::as_str).collect(),
            CurveStore::Layered { layers } => layers
                .iter()
                .flat_map(|l| l.strips.iter())
                .flat_map(|s| s.channelbags.iter())
                .flat_map(|b| b.groups.iter().map(String::as_str))
                .collect(),
        }
    }

    /// Add a curve, registering its group on the owning container.
    ///
    /// Layered stores put it in the channel-bag for `slot`, creating a layer, strip and bag
    /// when none exists yet. Without a slot the first bag is used.
    pub fn push_curve(&mut self, curve: FCurve, slot: Option<&str>) -> &mut FCurve {
        match self {
            CurveStore::Flat { groups, fcurves } => {
                if let Some(group) = curve.group.as_deref() {
                    ensure_group(groups, group);
                }
                let i = fcurves.len();
                fcurves.push(curve);
                &mut fcurves[i]
            }
            CurveStore::Layered { layers } => {
                let bag = Self::target_bag(layers, slot);
                if let Some(group) = curve.group.as_deref() {
                    ensure_group(&mut bag.groups, group);
                }
                let i = bag.fcurves.len();
                bag.fcurves.push(curve);
                &mut bag.fcurves[i]
            }
        }
    }

    fn target_bag<'a>(layers: &'a mut Vec<Layer>, slot: Option<&str>) -> &'a mut ChannelBag {
        if let Some(slot) = slot {
            let found = layers.iter().enumerate().find_map(|(li, l)| {
                l.strips.iter().enumerate().find_map(|(si, s)| {
                    s.channelbags
                        .iter()
                        .position(|b| b.slot.as_deref() == Some(slot))
                        .map(|bi| (li, si, bi))
                })
            });
            if let Some((li, si, bi)) = found {
                return &mut layers[li].strips[si].channelbags[bi];
            }
        }

        if layers.is_empty() {
            layers.push(Layer {
                name: DEFAULT_LAYER_NAME.to_string(),
                strips: Vec::new(),
            });
        }
        let layer = &mut layers[0];
        if layer.strips.is_empty() {
            layer.strips.push(Strip::default());
        }
        let bags = &mut layer.strips[0].channelbags;
        if slot.is_some() || bags.is_empty() {
            bags.push(ChannelBag {
                slot: slot.map(str::to_string),
                ..ChannelBag::default()
            });
            let last = bags.len() - 1;
            return &mut bags[last];
        }
        &mut bags[0]
    }

    /// Remove a curve wherever it lives.
    pub fn remove(&mut self, data_path: &DataPath, array_index: usize) -> Option<FCurve> {
        let take = |fcurves: &mut Vec<FCurve>| {
            fcurves
                .iter()
                .position(|c| c.matches(data_path, array_index))
                .map(|i| fcurves.remove(i))
        };
        match self {
            CurveStore::Flat { fcurves, .. } => take(fcurves),
            CurveStore::Layered { layers } => layers
                .iter_mut()
                .flat_map(|l| l.strips.iter_mut())
                .flat_map(|s| s.channelbags.iter_mut())
                .find_map(|b| take(&mut b.fcurves)),
        }
    }
}
