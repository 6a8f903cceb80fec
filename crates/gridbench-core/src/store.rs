use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::codec::SettingKey;
use crate::control::ControlDescriptor;
use crate::schema::{SettingsSchema, SettingsSection};
use crate::value::{FlatConfig, SettingValue, SettingValues};

/// The store's single change subscriber.
pub type ChangeHook = Box<dyn FnMut(&SettingsStore)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    UnknownControl(String),
    KindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    NotAValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownControl(name) => write!(f, "unknown control: {name}"),
            Self::KindMismatch {
                name,
                expected,
                found,
            } => write!(f, "control {name} expects a {expected}, got a {found}"),
            Self::NotAValue(name) => write!(f, "control {name} is an action and holds no value"),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Current values of every control in a settings schema.
///
/// Values are keyed by [`SettingKey`]; the flat `"P-N"` string form only
/// appears in [`get_config`](Self::get_config) and in the names callers pass
/// in. Any mutation that changes what [`get_config`](Self::get_config)
/// returns is reported to the single hook registered with
/// [`subscribe`](Self::subscribe), synchronously, before the mutating call
/// returns.
pub struct SettingsStore {
    schema: SettingsSchema,
    descriptors: HashMap<SettingKey, ControlDescriptor>,
    values: BTreeMap<SettingKey, Option<SettingValue>>,
    hook: Option<ChangeHook>,
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("title", &self.schema.title)
            .field("values", &self.values)
            .field("subscribed", &self.hook.is_some())
            .finish()
    }
}

impl SettingsStore {
    pub fn new(schema: SettingsSchema) -> Self {
        let mut store = Self {
            schema,
            descriptors: HashMap::new(),
            values: BTreeMap::new(),
            hook: None,
        };
        store.reindex();
        store
    }

    /// Seed initial values. Entries without a matching control, or with the
    /// wrong kind of value, are ignored. Does not notify.
    pub fn with_values(mut self, initial: SettingValues) -> Self {
        for (name, value) in initial {
            let key = SettingKey::parse(&name);
            let Some(descriptor) = self.descriptors.get(&key) else {
                tracing::trace!(name = %name, "initial value has no control");
                continue;
            };
            match descriptor.coerce(value) {
                Ok(value) => {
                    self.values.insert(key, Some(value));
                }
                Err(err) => tracing::debug!(error = %err, "initial value ignored"),
            }
        }
        self
    }

    /// Register the change hook, returning the one it replaces.
    pub fn subscribe(&mut self, hook: ChangeHook) -> Option<ChangeHook> {
        self.hook.replace(hook)
    }

    pub fn unsubscribe(&mut self) -> Option<ChangeHook> {
        self.hook.take()
    }

    pub fn schema(&self) -> &SettingsSchema {
        &self.schema
    }

    /// Every control of the schema in form order, footer last.
    pub fn controls(&self) -> impl Iterator<Item = &ControlDescriptor> + '_ {
        self.schema.controls()
    }

    pub fn descriptor(&self, name: &str) -> Option<&ControlDescriptor> {
        self.descriptors.get(&SettingKey::parse(name))
    }

    /// Value of the named control; `None` when unset or unknown.
    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.values.get(&SettingKey::parse(name))?.as_ref()
    }

    /// Flat view of every value whose key starts with `prefix`.
    ///
    /// The empty prefix selects the whole store.
    pub fn get_config(&self, prefix: &str) -> FlatConfig {
        self.values
            .iter()
            .map(|(key, value)| (key.to_flat(), value.clone()))
            .filter(|(name, _)| name.starts_with(prefix))
            .collect()
    }

    /// Set a control's value. Returns whether the stored value changed.
    pub fn set_value(&mut self, name: &str, value: SettingValue) -> Result<bool, SettingsError> {
        let key = SettingKey::parse(name);
        let descriptor = self
            .descriptors
            .get(&key)
            .ok_or_else(|| SettingsError::UnknownControl(name.to_string()))?;
        let value = descriptor.coerce(value)?;

        let slot = self.values.entry(key).or_insert(None);
        if slot.as_ref() == Some(&value) {
            return Ok(false);
        }
        *slot = Some(value);
        self.notify();
        Ok(true)
    }

    /// Reset a control to unset. Returns whether it held a value.
    pub fn clear_value(&mut self, name: &str) -> Result<bool, SettingsError> {
        let key = SettingKey::parse(name);
        let descriptor = self
            .descriptors
            .get(&key)
            .ok_or_else(|| SettingsError::UnknownControl(name.to_string()))?;
        if !descriptor.holds_value() {
            return Err(SettingsError::NotAValue(name.to_string()));
        }

        let previous = self.values.insert(key, None).flatten();
        if previous.is_none() {
            return Ok(false);
        }
        self.notify();
        Ok(true)
    }

    /// Replace the schema's sections.
    ///
    /// New controls start unset, surviving controls keep their values and
    /// values of controls that left the schema are dropped. Always notifies.
    pub fn set_sections(&mut self, sections: Vec<SettingsSection>) {
        self.schema.sections = sections;
        self.reindex();
        tracing::debug!(
            title = ?self.schema.title,
            controls = self.descriptors.len(),
            "settings sections replaced"
        );
        self.notify();
    }

    fn reindex(&mut self) {
        let descriptors: HashMap<SettingKey, ControlDescriptor> = self
            .schema
            .controls()
            .map(|control| (SettingKey::parse(control.name()), control.clone()))
            .collect();

        self.values.retain(|key, _| {
            descriptors
                .get(key)
                .is_some_and(ControlDescriptor::holds_value)
        });
        for (key, descriptor) in &descriptors {
            if descriptor.holds_value() {
                self.values.entry(key.clone()).or_insert(None);
            }
        }
        self.descriptors = descriptors;
    }

    fn notify(&mut self) {
        // The slot is empty while the hook runs.
        if let Some(mut hook) = self.hook.take() {
            hook(self);
            self.hook = Some(hook);
        }
    }
}
