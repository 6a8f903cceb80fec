use crate::control::ControlDescriptor;

/// One entry inside a settings column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Static text drawn before or between controls.
    Label(String),
    Control(ControlDescriptor),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsColumn {
    pub title: Option<String>,
    pub contents: Vec<Content>,
}

impl SettingsColumn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            contents: Vec::new(),
        }
    }

    pub fn with_label(mut self, text: impl Into<String>) -> Self {
        self.contents.push(Content::Label(text.into()));
        self
    }

    pub fn with_control(mut self, control: ControlDescriptor) -> Self {
        self.contents.push(Content::Control(control));
        self
    }

    pub fn controls(&self) -> impl Iterator<Item = &ControlDescriptor> + '_ {
        self.contents.iter().filter_map(|content| match content {
            Content::Control(control) => Some(control),
            Content::Label(_) => None,
        })
    }
}

/// A horizontal group of columns; the unit of dynamic add/remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsRow {
    pub id: String,
    pub columns: Vec<SettingsColumn>,
}

impl SettingsRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: SettingsColumn) -> Self {
        self.columns.push(column);
        self
    }

    pub fn controls(&self) -> impl Iterator<Item = &ControlDescriptor> + '_ {
        self.columns.iter().flat_map(SettingsColumn::controls)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsSection {
    pub title: Option<String>,
    pub rows: Vec<SettingsRow>,
}

impl SettingsSection {
    pub fn new(rows: Vec<SettingsRow>) -> Self {
        Self { title: None, rows }
    }

    pub fn titled(title: impl Into<String>, rows: Vec<SettingsRow>) -> Self {
        Self {
            title: Some(title.into()),
            rows,
        }
    }
}

/// Declarative description of a settings form.
///
/// Sections are only ever replaced as a whole, through
/// [`crate::store::SettingsStore::set_sections`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsSchema {
    pub title: Option<String>,
    pub sections: Vec<SettingsSection>,
    /// Page-level button drawn below the sections.
    pub footer: Option<ControlDescriptor>,
}

impl SettingsSchema {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_section(mut self, section: SettingsSection) -> Self {
        self.sections.push(section);
        self
    }

    pub fn with_footer(mut self, control: ControlDescriptor) -> Self {
        self.footer = Some(control);
        self
    }

    /// Every control in form order, footer last.
    pub fn controls(&self) -> impl Iterator<Item = &ControlDescriptor> + '_ {
        self.sections
            .iter()
            .flat_map(|section| section.rows.iter())
            .flat_map(SettingsRow::controls)
            .chain(self.footer.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Action;

    fn sample() -> SettingsSchema {
        SettingsSchema::new("Sample")
            .with_section(SettingsSection::new(vec![SettingsRow::new("a")
                .with_column(
                    SettingsColumn::titled("Columns")
                        .with_control(ControlDescriptor::number("columns").with_min(1)),
                )
                .with_column(
                    SettingsColumn::new()
                        .with_label("Full: ")
                        .with_control(ControlDescriptor::boolean("fullSize")),
                )]))
            .with_section(SettingsSection::titled(
                "More",
                vec![SettingsRow::new("b").with_column(
                    SettingsColumn::new().with_control(ControlDescriptor::number("rows")),
                )],
            ))
            .with_footer(ControlDescriptor::button("Add", Action::AddInstance))
    }

    #[test]
    fn controls_follow_form_order_with_footer_last() {
        let schema = sample();
        let names: Vec<_> = schema.controls().map(ControlDescriptor::name).collect();
        assert_eq!(names, vec!["columns", "fullSize", "rows", "add-instance"]);
    }

    #[test]
    fn labels_are_not_controls() {
        let column = SettingsColumn::new().with_label("x").with_label("y");
        assert_eq!(column.controls().count(), 0);
        assert_eq!(column.contents.len(), 2);
    }

    #[test]
    fn empty_schema_has_no_controls() {
        assert_eq!(SettingsSchema::default().controls().count(), 0);
    }
}
