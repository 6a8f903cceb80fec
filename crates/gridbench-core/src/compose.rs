use std::fmt;

use crate::codec::{self, InstanceBundle, InstanceId};
use crate::page::PageDefinition;
use crate::store::SettingsStore;
use crate::value::FlatConfig;
use crate::widget::{BoxOptions, Placement, WidgetError, WidgetFactory, WidgetHandle, WidgetOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// The factory refused the root container. The previous tree is intact.
    Root(WidgetError),
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root(err) => write!(f, "root widget could not be created: {err}"),
        }
    }
}

impl std::error::Error for ComposeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Root(err) => Some(err),
        }
    }
}

/// Outcome of one rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub root: WidgetHandle,
    /// Instances attached as children, in attach order.
    pub attached: Vec<InstanceId>,
    /// Incomplete instances, still being filled in.
    pub skipped: Vec<InstanceId>,
    /// Complete instances that could not be placed: out of range values or
    /// refused by the factory.
    pub rejected: Vec<InstanceId>,
}

/// Rebuilds the widget tree from the settings stores.
///
/// Every call creates a fresh root container and re-attaches one child per
/// complete instance; the previous root is only destroyed once the new one
/// exists. Nothing is diffed against the previous tree.
#[derive(Debug, Default)]
pub struct CompositionEngine {
    root: Option<WidgetHandle>,
    cycles: u64,
}

impl CompositionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root of the last successful rebuild.
    pub fn root(&self) -> Option<WidgetHandle> {
        self.root
    }

    /// Number of successful rebuilds so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn recompose(
        &mut self,
        page_store: &SettingsStore,
        widget_store: &SettingsStore,
        factory: &mut dyn WidgetFactory,
        definition: &dyn PageDefinition,
    ) -> Result<Composition, ComposeError> {
        let flat = page_store.get_config("");
        let bundles = codec::decode_all(&flat);

        let options = root_options(definition, widget_store);
        let root = definition.create_widget(factory, &options).map_err(|err| {
            tracing::error!(error = %err, "root widget rejected; keeping previous tree");
            ComposeError::Root(err)
        })?;

        let mut composition = Composition {
            root,
            attached: Vec::new(),
            skipped: Vec::new(),
            rejected: Vec::new(),
        };

        for (id, bundle) in &bundles {
            if !bundle.is_complete() {
                tracing::trace!(instance = %id, "instance incomplete; not attached");
                composition.skipped.push(*id);
                continue;
            }
            let Some(placement) = placement(bundle) else {
                tracing::warn!(instance = %id, "instance placement out of range");
                composition.rejected.push(*id);
                continue;
            };
            let options = WidgetOptions::Box(BoxOptions::titled(id.to_string()));
            match factory.attach_child(root, placement, options) {
                Ok(_) => composition.attached.push(*id),
                Err(err) => {
                    tracing::warn!(instance = %id, error = %err, "child widget rejected");
                    composition.rejected.push(*id);
                }
            }
        }

        if let Some(previous) = self.root.replace(root) {
            if previous != root {
                factory.detach(previous);
            }
        }
        self.cycles += 1;

        tracing::debug!(
            cycle = self.cycles,
            attached = composition.attached.len(),
            skipped = composition.skipped.len(),
            rejected = composition.rejected.len(),
            "widget tree rebuilt"
        );
        Ok(composition)
    }
}

/// Root options as they reach the factory: the page's defaults, overlaid
/// with every set value of the widget store, then passed through
/// [`PageDefinition::filter_code`].
pub fn root_options(definition: &dyn PageDefinition, widget_store: &SettingsStore) -> FlatConfig {
    let mut options: FlatConfig = definition
        .widget_default_settings()
        .into_iter()
        .map(|(name, value)| (name, Some(value)))
        .collect();
    for (name, value) in widget_store.get_config("") {
        if value.is_some() {
            options.insert(name, value);
        }
    }
    definition.filter_code(options)
}

/// Cell placement of a complete bundle; `None` when a value does not fit a
/// cell coordinate.
fn placement(bundle: &InstanceBundle) -> Option<Placement> {
    let cell = |property: &str, min: i64| {
        bundle
            .number(property)
            .filter(|n| *n >= min)
            .and_then(|n| u16::try_from(n).ok())
    };
    Some(Placement {
        col: cell("col", 0)?,
        line: cell("line", 0)?,
        width: cell("width", 1)?,
        height: cell("height", 1)?,
    })
}
