//! Page definition shared by the unit tests of this crate.

use crate::control::{Action, ControlDescriptor};
use crate::instance::InstanceRegistry;
use crate::page::PageDefinition;
use crate::schema::{SettingsColumn, SettingsRow, SettingsSchema, SettingsSection};
use crate::value::{FlatConfig, SettingValue, SettingValues};
use crate::widget::{GridOptions, WidgetError, WidgetFactory, WidgetHandle, WidgetOptions};

/// An 8x8 full-size grid whose `columns` control accepts 0, so tests can
/// provoke a root failure through an ordinary edit.
pub struct TestPage;

impl PageDefinition for TestPage {
    fn widget_default_settings(&self) -> SettingValues {
        let mut values = SettingValues::new();
        values.insert("columns".into(), SettingValue::Number(1));
        values.insert("rows".into(), SettingValue::Number(1));
        values.insert("width".into(), SettingValue::Number(10));
        values.insert("height".into(), SettingValue::Number(10));
        values
    }

    fn widget_initial_settings(&self) -> SettingValues {
        let mut values = SettingValues::new();
        values.insert("columns".into(), SettingValue::Number(8));
        values.insert("rows".into(), SettingValue::Number(8));
        values.insert("fullSize".into(), SettingValue::Bool(true));
        values
    }

    fn create_page_settings(&self, registry: &InstanceRegistry) -> SettingsSchema {
        let mut schema = SettingsSchema::new("Page")
            .with_footer(ControlDescriptor::button("Add", Action::AddInstance));
        schema.sections = registry.sections();
        schema
    }

    fn create_widget_settings(&self) -> SettingsSchema {
        let column = SettingsColumn::new()
            .with_control(ControlDescriptor::number("columns").with_min(0))
            .with_control(ControlDescriptor::number("rows").with_min(1))
            .with_control(ControlDescriptor::number("width").with_min(1))
            .with_control(ControlDescriptor::number("height").with_min(1))
            .with_control(ControlDescriptor::boolean("fullSize"));
        SettingsSchema::new("Widget").with_section(SettingsSection::new(vec![
            SettingsRow::new("grid").with_column(column),
        ]))
    }

    fn create_widget(
        &self,
        factory: &mut dyn WidgetFactory,
        options: &FlatConfig,
    ) -> Result<WidgetHandle, WidgetError> {
        let grid = GridOptions::from_config(options)?;
        factory.attach_root(WidgetOptions::Grid(grid))
    }

    fn filter_code(&self, mut options: FlatConfig) -> FlatConfig {
        if options.get("fullSize") == Some(&Some(SettingValue::Bool(true))) {
            options.remove("width");
            options.remove("height");
        }
        options
    }

    fn pre_update_widget_settings(&self, _config: &FlatConfig) -> bool {
        true
    }
}
