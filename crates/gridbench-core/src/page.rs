//! The settings page: owner of everything the composition engine touches.

use crate::bus::EventBus;
use crate::codec::InstanceId;
use crate::compose::{self, ComposeError, Composition, CompositionEngine};
use crate::control::Action;
use crate::event::Event;
use crate::instance::InstanceRegistry;
use crate::schema::SettingsSchema;
use crate::store::{SettingsError, SettingsStore};
use crate::value::{FlatConfig, SettingValue, SettingValues};
use crate::widget::{WidgetError, WidgetFactory, WidgetHandle, WidgetTree};

/// Hooks a demo supplies to a [`SettingsPage`].
///
/// The page calls them at fixed points: the settings factories and the
/// initial settings once at construction, [`create_widget`] and
/// [`filter_code`] on every recomposition, and
/// [`pre_update_widget_settings`] whenever a widget setting changes.
///
/// [`create_widget`]: PageDefinition::create_widget
/// [`filter_code`]: PageDefinition::filter_code
/// [`pre_update_widget_settings`]: PageDefinition::pre_update_widget_settings
pub trait PageDefinition {
    /// Root options used for anything the widget settings leave unset.
    fn widget_default_settings(&self) -> SettingValues;

    /// Values the widget settings form starts with.
    fn widget_initial_settings(&self) -> SettingValues;

    /// Schema of the page settings card. Its sections come from `registry`.
    fn create_page_settings(&self, registry: &InstanceRegistry) -> SettingsSchema;

    /// Schema of the widget settings card.
    fn create_widget_settings(&self) -> SettingsSchema;

    /// Create the root widget from the (filtered) root options.
    fn create_widget(
        &self,
        factory: &mut dyn WidgetFactory,
        options: &FlatConfig,
    ) -> Result<WidgetHandle, WidgetError>;

    /// Adjust the root options before they reach the factory.
    fn filter_code(&self, options: FlatConfig) -> FlatConfig;

    /// Called when the widget settings change. Returning `true` rebuilds
    /// the tree.
    fn pre_update_widget_settings(&self, config: &FlatConfig) -> bool;
}

/// Context object owning the two settings stores, the instance registry,
/// the composition engine and the widget tree.
///
/// Both stores publish into one [`EventBus`]; every mutating method drains
/// it before returning, so the tree always reflects the latest edit.
pub struct SettingsPage<D: PageDefinition> {
    definition: D,
    page_store: SettingsStore,
    widget_store: SettingsStore,
    registry: InstanceRegistry,
    engine: CompositionEngine,
    tree: WidgetTree,
    bus: EventBus,
    last_composition: Option<Composition>,
    last_error: Option<String>,
}

impl<D: PageDefinition> SettingsPage<D> {
    pub fn new(definition: D) -> Self {
        Self::with_registry(definition, InstanceRegistry::new())
    }

    pub fn with_registry(definition: D, registry: InstanceRegistry) -> Self {
        let bus = EventBus::new();

        let mut widget_store = SettingsStore::new(definition.create_widget_settings())
            .with_values(definition.widget_initial_settings());
        let handle = bus.clone();
        widget_store.subscribe(Box::new(move |_: &SettingsStore| {
            handle.publish(Event::WidgetSettingsChanged)
        }));

        let mut page_store = SettingsStore::new(definition.create_page_settings(&registry));
        let handle = bus.clone();
        page_store.subscribe(Box::new(move |_: &SettingsStore| {
            handle.publish(Event::PageSettingsChanged)
        }));

        let mut page = Self {
            definition,
            page_store,
            widget_store,
            registry,
            engine: CompositionEngine::new(),
            tree: WidgetTree::new(),
            bus,
            last_composition: None,
            last_error: None,
        };
        if let Err(err) = page.recompose() {
            tracing::warn!(error = %err, "initial composition failed");
        }
        page
    }

    pub fn definition(&self) -> &D {
        &self.definition
    }

    pub fn page_store(&self) -> &SettingsStore {
        &self.page_store
    }

    pub fn widget_store(&self) -> &SettingsStore {
        &self.widget_store
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn engine(&self) -> &CompositionEngine {
        &self.engine
    }

    pub fn last_composition(&self) -> Option<&Composition> {
        self.last_composition.as_ref()
    }

    /// Message of the last failed recomposition, cleared by the next
    /// successful one.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_page_value(&mut self, name: &str, value: SettingValue) -> Result<bool, SettingsError> {
        let changed = self.page_store.set_value(name, value)?;
        self.pump();
        Ok(changed)
    }

    pub fn clear_page_value(&mut self, name: &str) -> Result<bool, SettingsError> {
        let changed = self.page_store.clear_value(name)?;
        self.pump();
        Ok(changed)
    }

    pub fn set_widget_value(
        &mut self,
        name: &str,
        value: SettingValue,
    ) -> Result<bool, SettingsError> {
        let changed = self.widget_store.set_value(name, value)?;
        self.pump();
        Ok(changed)
    }

    pub fn clear_widget_value(&mut self, name: &str) -> Result<bool, SettingsError> {
        let changed = self.widget_store.clear_value(name)?;
        self.pump();
        Ok(changed)
    }

    /// Run the action of a pressed button. Returns the new instance's id
    /// for [`Action::AddInstance`].
    pub fn trigger(&mut self, action: Action) -> Option<InstanceId> {
        match action {
            Action::AddInstance => Some(self.add_instance()),
            Action::RemoveInstance(id) => {
                self.remove_instance(id);
                None
            }
        }
    }

    pub fn add_instance(&mut self) -> InstanceId {
        let id = self.registry.add_instance().id();
        self.page_store.set_sections(self.registry.sections());
        self.pump();
        id
    }

    pub fn remove_instance(&mut self, id: InstanceId) -> bool {
        if !self.registry.remove_instance(id) {
            return false;
        }
        self.page_store.set_sections(self.registry.sections());
        self.pump();
        true
    }

    /// Handle every pending store notification. Returns the number of
    /// recompositions run.
    pub fn pump(&mut self) -> usize {
        let mut cycles = 0;
        for event in self.bus.drain() {
            let rebuild = match event {
                Event::PageSettingsChanged => true,
                Event::WidgetSettingsChanged => self
                    .definition
                    .pre_update_widget_settings(&self.widget_store.get_config("")),
            };
            if rebuild {
                // failures are kept in last_error
                let _ = self.recompose();
                cycles += 1;
            }
        }
        cycles
    }

    /// Rebuild the widget tree from the current settings.
    pub fn recompose(&mut self) -> Result<(), ComposeError> {
        let result = self.engine.recompose(
            &self.page_store,
            &self.widget_store,
            &mut self.tree,
            &self.definition,
        );
        match result {
            Ok(composition) => {
                self.last_composition = Some(composition);
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// The filtered root options, as pretty JSON.
    pub fn generated_code(&self) -> String {
        let options = compose::root_options(&self.definition, &self.widget_store);
        serde_json::to_string_pretty(&options).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_all, encode};
    use crate::testing::TestPage;
    use crate::widget::{GridOptions, WidgetOptions};

    fn fill(page: &mut SettingsPage<TestPage>, id: InstanceId, values: [i64; 4]) {
        for (property, value) in ["col", "line", "width", "height"].into_iter().zip(values) {
            page.set_page_value(&encode(property, id), SettingValue::Number(value))
                .unwrap();
        }
    }

    fn child_count(page: &SettingsPage<TestPage>) -> usize {
        let root = page.tree().root().unwrap().handle;
        page.tree().children(root).count()
    }

    #[test]
    fn construction_composes_once() {
        let page = SettingsPage::new(TestPage);
        assert_eq!(page.engine().cycles(), 1);
        assert!(page.tree().root().is_some());
        assert!(page.last_error().is_none());
        assert!(page.widget_store().get("fullSize").is_some());
    }

    #[test]
    fn each_edit_recomposes_in_the_same_call() {
        let mut page = SettingsPage::new(TestPage);
        let id = page.add_instance();
        assert_eq!(page.engine().cycles(), 2);

        fill(&mut page, id, [2, 1, 5, 3]);
        assert_eq!(page.engine().cycles(), 6);
        assert_eq!(child_count(&page), 1);
        assert_eq!(page.last_composition().unwrap().attached, vec![id]);
    }

    #[test]
    fn unchanged_value_does_not_recompose() {
        let mut page = SettingsPage::new(TestPage);
        let id = page.add_instance();
        let name = encode("col", id);
        page.set_page_value(&name, SettingValue::Number(1)).unwrap();
        let cycles = page.engine().cycles();
        assert!(!page.set_page_value(&name, SettingValue::Number(1)).unwrap());
        assert_eq!(page.engine().cycles(), cycles);
    }

    #[test]
    fn scenario_full_size_and_incomplete_instance() {
        let mut page = SettingsPage::new(TestPage);
        let first = page.trigger(Action::AddInstance).unwrap();
        fill(&mut page, first, [2, 1, 5, 3]);
        let second = page.trigger(Action::AddInstance).unwrap();
        page.set_page_value(&encode("col", second), SettingValue::Number(0))
            .unwrap();

        let composition = page.last_composition().unwrap();
        assert_eq!(composition.attached, vec![first]);
        assert_eq!(composition.skipped, vec![second]);
        assert_eq!(child_count(&page), 1);

        let root = page.tree().root().unwrap();
        assert!(matches!(
            &root.options,
            WidgetOptions::Grid(GridOptions { full_size: true, width: None, height: None, .. })
        ));

        page.set_widget_value("fullSize", SettingValue::Bool(false))
            .unwrap();
        let root = page.tree().root().unwrap();
        assert!(matches!(
            &root.options,
            WidgetOptions::Grid(GridOptions { full_size: false, width: Some(10), height: Some(10), .. })
        ));
        let bundles = decode_all(&page.page_store().get_config(""));
        assert_eq!(bundles[&first].number("width"), Some(5));
        assert_eq!(bundles[&first].number("height"), Some(3));
        assert_eq!(child_count(&page), 1);
    }

    #[test]
    fn removal_keeps_form_and_bundles_in_step() {
        let mut page = SettingsPage::new(TestPage);
        let a = page.add_instance();
        let b = page.add_instance();
        fill(&mut page, a, [0, 0, 1, 1]);
        fill(&mut page, b, [1, 1, 1, 1]);
        assert_eq!(child_count(&page), 2);

        page.trigger(Action::RemoveInstance(a));
        let rows: Vec<_> = page.page_store().schema().sections[0]
            .rows
            .iter()
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(rows, vec![format!("instance-row-{b}")]);
        let bundles = decode_all(&page.page_store().get_config(""));
        assert_eq!(bundles.keys().copied().collect::<Vec<_>>(), vec![b]);
        assert_eq!(child_count(&page), 1);
    }

    #[test]
    fn removing_unknown_instance_is_noop() {
        let mut page = SettingsPage::new(TestPage);
        page.add_instance();
        let cycles = page.engine().cycles();
        assert!(!page.remove_instance(InstanceId(99)));
        assert_eq!(page.engine().cycles(), cycles);
        assert_eq!(page.registry().len(), 1);
    }

    #[test]
    fn root_failure_is_reported_and_recovered() {
        let mut page = SettingsPage::new(TestPage);
        let id = page.add_instance();
        fill(&mut page, id, [0, 0, 1, 1]);

        page.set_widget_value("columns", SettingValue::Number(0))
            .unwrap();
        assert!(page.last_error().unwrap().contains("root widget"));
        assert_eq!(child_count(&page), 1);

        page.set_widget_value("columns", SettingValue::Number(3))
            .unwrap();
        assert!(page.last_error().is_none());
        assert_eq!(child_count(&page), 1);
    }

    #[test]
    fn generated_code_reflects_filter() {
        let mut page = SettingsPage::new(TestPage);
        let code = page.generated_code();
        assert!(code.contains("\"fullSize\": true"));
        assert!(!code.contains("\"width\""));

        page.set_widget_value("fullSize", SettingValue::Bool(false))
            .unwrap();
        assert!(page.generated_code().contains("\"width\": 10"));
    }

    #[test]
    fn store_errors_propagate_without_recomposing() {
        let mut page = SettingsPage::new(TestPage);
        let cycles = page.engine().cycles();
        assert!(page
            .set_page_value("col-1", SettingValue::Number(1))
            .is_err());
        assert!(page
            .set_widget_value("fullSize", SettingValue::Number(1))
            .is_err());
        assert_eq!(page.engine().cycles(), cycles);
    }
}
