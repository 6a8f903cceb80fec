use crate::codec::{encode, InstanceId};
use crate::store::SettingsError;
use crate::value::SettingValue;

/// What an action control does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Append a new dynamic instance row.
    AddInstance,
    /// Remove the row of the given instance.
    RemoveInstance(InstanceId),
}

impl Action {
    /// Control name of the button that triggers this action.
    ///
    /// Removal buttons are named per instance, so they decode to the same
    /// instance as the row they sit in.
    pub fn control_name(&self) -> String {
        match self {
            Action::AddInstance => "add-instance".to_string(),
            Action::RemoveInstance(id) => encode("remove-instance", *id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlKind {
    Numeric {
        min: Option<i64>,
        max: Option<i64>,
        step: i64,
    },
    Boolean,
    Action {
        text: String,
        action: Action,
    },
}

/// A named, typed, constrained form input.
///
/// Descriptors are built once through the constructors below and never
/// change afterwards. The name is the control's flat config key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlDescriptor {
    name: String,
    kind: ControlKind,
}

impl ControlDescriptor {
    pub fn number(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ControlKind::Numeric {
                min: None,
                max: None,
                step: 1,
            },
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ControlKind::Boolean,
        }
    }

    /// An action button named after its action. `text` is only shown.
    pub fn button(text: impl Into<String>, action: Action) -> Self {
        Self {
            name: action.control_name(),
            kind: ControlKind::Action {
                text: text.into(),
                action,
            },
        }
    }

    pub fn with_min(mut self, min: i64) -> Self {
        if let ControlKind::Numeric { min: m, .. } = &mut self.kind {
            *m = Some(min);
        }
        self
    }

    pub fn with_max(mut self, max: i64) -> Self {
        if let ControlKind::Numeric { max: m, .. } = &mut self.kind {
            *m = Some(max);
        }
        self
    }

    pub fn with_step(mut self, step: i64) -> Self {
        if let ControlKind::Numeric { step: s, .. } = &mut self.kind {
            *s = step.max(1);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ControlKind {
        &self.kind
    }

    /// Action controls are triggered, not edited, and have no config entry.
    pub fn holds_value(&self) -> bool {
        !matches!(self.kind, ControlKind::Action { .. })
    }

    pub fn action(&self) -> Option<Action> {
        match &self.kind {
            ControlKind::Action { action, .. } => Some(*action),
            _ => None,
        }
    }

    /// Check `value` against this control and apply its constraints.
    ///
    /// Numbers outside `min`/`max` are clamped, the way a number input
    /// clamps what the user types.
    pub fn coerce(&self, value: SettingValue) -> Result<SettingValue, SettingsError> {
        match (&self.kind, value) {
            (ControlKind::Numeric { min, max, .. }, SettingValue::Number(n)) => {
                let mut n = n;
                if let Some(min) = min {
                    n = n.max(*min);
                }
                if let Some(max) = max {
                    n = n.min(*max);
                }
                Ok(SettingValue::Number(n))
            }
            (ControlKind::Boolean, SettingValue::Bool(b)) => Ok(SettingValue::Bool(b)),
            (ControlKind::Action { .. }, _) => Err(SettingsError::NotAValue(self.name.clone())),
            (kind, value) => Err(SettingsError::KindMismatch {
                name: self.name.clone(),
                expected: kind_name(kind),
                found: value.kind_name(),
            }),
        }
    }
}

fn kind_name(kind: &ControlKind) -> &'static str {
    match kind {
        ControlKind::Numeric { .. } => "number",
        ControlKind::Boolean => "boolean",
        ControlKind::Action { .. } => "action",
    }
}
