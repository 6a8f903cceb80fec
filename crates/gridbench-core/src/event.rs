/// Notifications published by the settings stores of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A value or the row set of the page settings changed.
    PageSettingsChanged,
    /// A value of the widget settings changed.
    WidgetSettingsChanged,
}
