//! Instance key codec.
//!
//! Per-instance controls share one flat namespace with static controls. A
//! property `P` of instance `N` is stored under the key `"P-N"`. Decoding
//! uses the last `-digits` suffix as the instance id, so a base property may
//! itself contain dashes (`"grid-col-3"` is property `grid-col` of
//! instance 3). A static name that happens to end in `-digits` without
//! leading zeros is decoded as instanced as well; property names must avoid
//! that shape.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::value::{FlatConfig, SettingValue};

/// Properties an instance needs before it can be materialized as a widget.
pub const REQUIRED_PROPERTIES: [&str; 4] = ["col", "line", "width", "height"];

static INSTANCE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)-([0-9]+)$").expect("instance key pattern is valid"));

/// Identifier of a dynamic instance. Issued from a monotonic counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encode `base` of instance `id` as a flat key.
pub fn encode(base: &str, id: InstanceId) -> String {
    format!("{base}-{id}")
}

/// Split a flat key into its base property and instance id.
///
/// Returns `None` for static keys, including keys whose numeric suffix does
/// not fit an instance id or is not in the form [`encode`] writes (`"col-01"`
/// stays static, so it never shares a slot with `"col-1"`).
pub fn decode(key: &str) -> Option<(&str, InstanceId)> {
    let caps = INSTANCE_KEY.captures(key)?;
    let base = caps.get(1)?.as_str();
    let digits = caps.get(2)?.as_str();
    let id = digits.parse::<u64>().ok()?;
    if id.to_string() != digits {
        return None;
    }
    Some((base, InstanceId(id)))
}

/// Composite key used inside the settings store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingKey {
    Static(String),
    Instance { id: InstanceId, property: String },
}

impl SettingKey {
    pub fn parse(name: &str) -> Self {
        match decode(name) {
            Some((property, id)) => SettingKey::Instance {
                id,
                property: property.to_string(),
            },
            None => SettingKey::Static(name.to_string()),
        }
    }

    pub fn instance(&self) -> Option<InstanceId> {
        match self {
            SettingKey::Instance { id, .. } => Some(*id),
            SettingKey::Static(_) => None,
        }
    }

    /// The flat string form used at the control boundary.
    pub fn to_flat(&self) -> String {
        match self {
            SettingKey::Static(name) => name.clone(),
            SettingKey::Instance { id, property } => encode(property, *id),
        }
    }
}

/// Decoded configuration of one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceBundle {
    pub id: InstanceId,
    pub properties: BTreeMap<String, Option<SettingValue>>,
}

impl InstanceBundle {
    pub fn new(id: InstanceId) -> Self {
        Self {
            id,
            properties: BTreeMap::new(),
        }
    }

    pub fn number(&self, property: &str) -> Option<i64> {
        self.properties.get(property)?.as_ref()?.as_number()
    }

    /// `true` once every [`REQUIRED_PROPERTIES`] entry holds a number.
    pub fn is_complete(&self) -> bool {
        REQUIRED_PROPERTIES
            .iter()
            .all(|property| self.number(property).is_some())
    }
}

/// Group every instanced key of `config` by instance id.
///
/// Static keys are skipped. Bundles come back ordered by id, which is also
/// the order the instances were issued in.
pub fn decode_all(config: &FlatConfig) -> BTreeMap<InstanceId, InstanceBundle> {
    let mut bundles: BTreeMap<InstanceId, InstanceBundle> = BTreeMap::new();
    for (key, value) in config {
        let Some((property, id)) = decode(key) else {
            continue;
        };
        bundles
            .entry(id)
            .or_insert_with(|| InstanceBundle::new(id))
            .properties
            .insert(property.to_string(), value.clone());
    }
    bundles
}
