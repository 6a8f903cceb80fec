use gridbench_config::{BenchConfig, WidgetOverrides};
use gridbench_core::{
    control::{Action, ControlDescriptor},
    instance::InstanceRegistry,
    page::PageDefinition,
    schema::{SettingsColumn, SettingsRow, SettingsSchema, SettingsSection},
    value::{FlatConfig, SettingValue, SettingValues},
    widget::{GridOptions, WidgetError, WidgetFactory, WidgetHandle, WidgetOptions},
};

/// The grid layout demo.
///
/// The widget card configures a grid container (position, size, column and
/// row counts, full-size mode). The page card holds one row per box; every
/// complete row becomes a box placed in the grid.
#[derive(Debug, Clone, Default)]
pub struct GridDemo {
    overrides: WidgetOverrides,
}

impl GridDemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// A demo whose initial grid settings take the `[widget]` overrides.
    pub fn from_config(config: &BenchConfig) -> Self {
        Self {
            overrides: config.widget.clone(),
        }
    }
}

/// Upper bound for the grid's column and row counts.
pub const MAX_GRID_CELLS: i64 = 64;

fn number(values: &mut SettingValues, name: &str, value: i64) {
    values.insert(name.to_string(), SettingValue::Number(value));
}

impl PageDefinition for GridDemo {
    fn widget_default_settings(&self) -> SettingValues {
        let mut values = SettingValues::new();
        number(&mut values, "col", 0);
        number(&mut values, "line", 0);
        number(&mut values, "width", 10);
        number(&mut values, "height", 5);
        number(&mut values, "columns", 1);
        number(&mut values, "rows", 1);
        values.insert("fullSize".into(), SettingValue::Bool(false));
        values
    }

    fn widget_initial_settings(&self) -> SettingValues {
        let o = &self.overrides;
        let mut values = SettingValues::new();
        number(&mut values, "col", o.col.map_or(1, i64::from));
        number(&mut values, "line", o.line.map_or(1, i64::from));
        number(&mut values, "width", o.width.map_or(40, i64::from));
        number(&mut values, "height", o.height.map_or(20, i64::from));
        number(&mut values, "columns", o.columns.map_or(4, i64::from));
        number(&mut values, "rows", o.rows.map_or(4, i64::from));
        values.insert(
            "fullSize".into(),
            SettingValue::Bool(o.full_size.unwrap_or(true)),
        );
        values
    }

    fn create_page_settings(&self, registry: &InstanceRegistry) -> SettingsSchema {
        let mut schema = SettingsSchema::new("Demo options").with_footer(
            ControlDescriptor::button("Add new widget", Action::AddInstance),
        );
        schema.sections = registry.sections();
        schema
    }

    fn create_widget_settings(&self) -> SettingsSchema {
        let basic = SettingsRow::new("basic-options")
            .with_column(
                SettingsColumn::titled("Position")
                    .with_control(ControlDescriptor::number("col").with_min(0))
                    .with_control(ControlDescriptor::number("line").with_min(0)),
            )
            .with_column(
                SettingsColumn::titled("Size")
                    .with_control(ControlDescriptor::number("width").with_min(1))
                    .with_control(ControlDescriptor::number("height").with_min(1)),
            );
        let grid = SettingsRow::new("grid-options").with_column(
            SettingsColumn::new()
                .with_label("Columns: ")
                .with_control(
                    ControlDescriptor::number("columns")
                        .with_min(1)
                        .with_max(MAX_GRID_CELLS),
                )
                .with_label("Rows: ")
                .with_control(
                    ControlDescriptor::number("rows")
                        .with_min(1)
                        .with_max(MAX_GRID_CELLS),
                )
                .with_label("Full Size: ")
                .with_control(ControlDescriptor::boolean("fullSize")),
        );

        SettingsSchema::new("Grid options")
            .with_section(SettingsSection::titled("Basic", vec![basic]))
            .with_section(SettingsSection::titled("Grid", vec![grid]))
    }

    fn create_widget(
        &self,
        factory: &mut dyn WidgetFactory,
        options: &FlatConfig,
    ) -> Result<WidgetHandle, WidgetError> {
        let grid = GridOptions::from_config(options)?;
        tracing::trace!(columns = grid.columns, rows = grid.rows, "creating grid root");
        factory.attach_root(WidgetOptions::Grid(grid))
    }

    /// A full-size grid ignores its own width and height, so they are left
    /// out of the options.
    fn filter_code(&self, mut options: FlatConfig) -> FlatConfig {
        let full_size = options
            .get("fullSize")
            .and_then(|value| value.as_ref())
            .and_then(SettingValue::as_bool)
            .unwrap_or(false);
        if full_size {
            options.remove("width");
            options.remove("height");
        }
        options
    }

    fn pre_update_widget_settings(&self, _config: &FlatConfig) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridbench_core::codec::{encode, InstanceId};
    use gridbench_core::control::ControlKind;
    use gridbench_core::page::SettingsPage;

    fn fill(page: &mut SettingsPage<GridDemo>, id: InstanceId, values: [i64; 4]) {
        for (property, value) in ["col", "line", "width", "height"].into_iter().zip(values) {
            page.set_page_value(&encode(property, id), SettingValue::Number(value))
                .unwrap();
        }
    }

    fn root_grid(page: &SettingsPage<GridDemo>) -> GridOptions {
        match &page.tree().root().unwrap().options {
            WidgetOptions::Grid(grid) => grid.clone(),
            other => panic!("root is not a grid: {other:?}"),
        }
    }

    #[test]
    fn initial_grid_is_full_size_four_by_four() {
        let page = SettingsPage::new(GridDemo::new());
        let grid = root_grid(&page);
        assert_eq!((grid.columns, grid.rows), (4, 4));
        assert!(grid.full_size);
        assert_eq!((grid.width, grid.height), (None, None));
        assert_eq!((grid.col, grid.line), (1, 1));
    }

    #[test]
    fn widget_schema_exposes_every_grid_control() {
        let schema = GridDemo::new().create_widget_settings();
        let names: Vec<_> = schema.controls().map(|c| c.name().to_string()).collect();
        assert_eq!(
            names,
            vec!["col", "line", "width", "height", "columns", "rows", "fullSize"]
        );
        assert!(schema.footer.is_none());
    }

    #[test]
    fn page_schema_has_add_footer() {
        let mut registry = InstanceRegistry::new();
        registry.add_instance();
        let schema = GridDemo::new().create_page_settings(&registry);
        assert_eq!(schema.title.as_deref(), Some("Demo options"));
        assert_eq!(schema.sections.len(), 1);
        let footer = schema.footer.unwrap();
        assert_eq!(footer.name(), "add-instance");
        assert_eq!(footer.action(), Some(Action::AddInstance));
        assert!(matches!(
            footer.kind(),
            ControlKind::Action { text, .. } if text == "Add new widget"
        ));
    }

    #[test]
    fn filter_code_keeps_size_without_full_size() {
        let demo = GridDemo::new();
        let mut options: FlatConfig = demo
            .widget_default_settings()
            .into_iter()
            .map(|(k, v)| (k, Some(v)))
            .collect();
        let kept = demo.filter_code(options.clone());
        assert!(kept.contains_key("width"));

        options.insert("fullSize".into(), Some(SettingValue::Bool(true)));
        let stripped = demo.filter_code(options);
        assert!(!stripped.contains_key("width"));
        assert!(!stripped.contains_key("height"));
        assert!(stripped.contains_key("columns"));
    }

    #[test]
    fn overrides_replace_initial_values() {
        let config =
            BenchConfig::from_toml_str("[widget]\ncolumns = 6\nfull_size = false\nwidth = 30\n")
                .unwrap();
        let page = SettingsPage::new(GridDemo::from_config(&config));
        let grid = root_grid(&page);
        assert_eq!(grid.columns, 6);
        assert_eq!(grid.rows, 4);
        assert!(!grid.full_size);
        assert_eq!(grid.width, Some(30));
        assert_eq!(grid.height, Some(20));
    }

    #[test]
    fn boxes_follow_their_rows() {
        let mut page = SettingsPage::new(GridDemo::new());
        let a = page.add_instance();
        let b = page.add_instance();
        fill(&mut page, a, [0, 0, 2, 1]);
        fill(&mut page, b, [2, 2, 2, 2]);
        page.set_page_value(&encode("width", b), SettingValue::Number(1))
            .unwrap();

        let root = page.tree().root().unwrap().handle;
        let placements: Vec<_> = page
            .tree()
            .children(root)
            .map(|node| node.placement.unwrap())
            .collect();
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[1].width, 1);
        assert_eq!(page.last_composition().unwrap().attached, vec![a, b]);
    }

    #[test]
    fn box_outside_grid_is_rejected_until_grid_grows() {
        let mut page = SettingsPage::new(GridDemo::new());
        let id = page.add_instance();
        fill(&mut page, id, [5, 0, 1, 1]);
        assert_eq!(page.last_composition().unwrap().rejected, vec![id]);

        page.set_widget_value("columns", SettingValue::Number(6))
            .unwrap();
        assert_eq!(page.last_composition().unwrap().attached, vec![id]);
    }

    #[test]
    fn grid_counts_are_capped() {
        let mut page = SettingsPage::new(GridDemo::new());
        page.set_widget_value("columns", SettingValue::Number(65535))
            .unwrap();
        page.set_widget_value("rows", SettingValue::Number(3000))
            .unwrap();
        let grid = root_grid(&page);
        assert_eq!(i64::from(grid.columns), MAX_GRID_CELLS);
        assert_eq!(i64::from(grid.rows), MAX_GRID_CELLS);
    }
}
