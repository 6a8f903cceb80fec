use crate::codec::{self, InstanceId};
use crate::control::{Action, ControlDescriptor};
use crate::schema::{SettingsColumn, SettingsRow, SettingsSection};

/// A dynamic row together with the instance it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRow {
    id: InstanceId,
    row: SettingsRow,
}

impl InstanceRow {
    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn row(&self) -> &SettingsRow {
        &self.row
    }
}

/// Ordered collection of dynamic instance rows.
///
/// Ids come from a counter that only moves forward, so an id is never handed
/// out twice even after its row is removed. The registry only holds form
/// descriptors; callers push [`sections`](Self::sections) into the page's
/// settings store after every change.
pub struct InstanceRegistry {
    rows: Vec<InstanceRow>,
    next_id: u64,
    title: Option<String>,
}

impl Default for InstanceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
            title: None,
        }
    }

    /// Title of the section the rows are rendered in.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Issue the next id and append a row describing one child widget.
    pub fn add_instance(&mut self) -> &InstanceRow {
        let id = InstanceId(self.next_id);
        self.next_id += 1;

        let idx = self.rows.len();
        self.rows.push(InstanceRow {
            id,
            row: instance_row(id),
        });
        tracing::debug!(instance = %id, rows = self.rows.len(), "instance row added");
        &self.rows[idx]
    }

    /// Drop the row of `id`. Unknown ids leave the registry untouched.
    pub fn remove_instance(&mut self, id: InstanceId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        let removed = self.rows.len() != before;
        if removed {
            tracing::debug!(instance = %id, rows = self.rows.len(), "instance row removed");
        }
        removed
    }

    /// The page schema sections for the current rows.
    pub fn sections(&self) -> Vec<SettingsSection> {
        vec![SettingsSection {
            title: self.title.clone(),
            rows: self.rows.iter().map(|entry| entry.row.clone()).collect(),
        }]
    }

    pub fn rows(&self) -> &[InstanceRow] {
        &self.rows
    }

    pub fn ids(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.rows.iter().map(InstanceRow::id)
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.rows.iter().any(|row| row.id == id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn instance_row(id: InstanceId) -> SettingsRow {
    let field = |label: &str, property: &str, min: i64| {
        SettingsColumn::new()
            .with_label(label)
            .with_control(ControlDescriptor::number(codec::encode(property, id)).with_min(min))
    };

    SettingsRow::new(format!("instance-row-{id}"))
        .with_column(field("Column: ", "col", 0))
        .with_column(field("Row: ", "line", 0))
        .with_column(field("Width: ", "width", 1))
        .with_column(field("Height: ", "height", 1))
        .with_column(SettingsColumn::new().with_control(ControlDescriptor::button(
            format!("Remove {id}"),
            Action::RemoveInstance(id),
        )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlKind;

    #[test]
    fn ids_are_distinct_and_increasing() {
        let mut reg = InstanceRegistry::new();
        for _ in 0..5 {
            reg.add_instance();
        }
        assert_eq!(reg.len(), 5);
        let ids: Vec<_> = reg.ids().collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ids[0], InstanceId(1));
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut reg = InstanceRegistry::new();
        let first = reg.add_instance().id();
        let second = reg.add_instance().id();
        assert!(reg.remove_instance(second));
        let third = reg.add_instance().id();
        assert_eq!(first, InstanceId(1));
        assert_eq!(third, InstanceId(3));
        assert!(!reg.contains(second));
    }

    #[test]
    fn removing_unknown_id_is_noop() {
        let mut reg = InstanceRegistry::new();
        reg.add_instance();
        let before = reg.sections();
        assert!(!reg.remove_instance(InstanceId(42)));
        assert_eq!(reg.sections(), before);
    }

    #[test]
    fn row_has_four_fields_and_a_remove_button() {
        let mut reg = InstanceRegistry::new();
        let entry = reg.add_instance();
        let row = entry.row();
        assert_eq!(row.id, "instance-row-1");
        assert_eq!(row.columns.len(), 5);

        let names: Vec<_> = row.controls().map(ControlDescriptor::name).collect();
        assert_eq!(
            names,
            vec!["col-1", "line-1", "width-1", "height-1", "remove-instance-1"]
        );

        let mins: Vec<_> = row
            .controls()
            .filter_map(|c| match c.kind() {
                ControlKind::Numeric { min, .. } => *min,
                _ => None,
            })
            .collect();
        assert_eq!(mins, vec![0, 0, 1, 1]);

        let button = row.controls().last().unwrap();
        assert_eq!(button.action(), Some(Action::RemoveInstance(InstanceId(1))));
    }

    #[test]
    fn sections_mirror_rows_in_order() {
        let mut reg = InstanceRegistry::new().with_title("Boxes");
        reg.add_instance();
        reg.add_instance();
        reg.add_instance();
        reg.remove_instance(InstanceId(2));

        let sections = reg.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title.as_deref(), Some("Boxes"));
        let ids: Vec<_> = sections[0].rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["instance-row-1", "instance-row-3"]);
    }

    #[test]
    fn empty_registry_yields_one_empty_section() {
        let reg = InstanceRegistry::new();
        assert!(reg.is_empty());
        let sections = reg.sections();
        assert_eq!(sections.len(), 1);
        assert!(sections[0].rows.is_empty());
    }
}
