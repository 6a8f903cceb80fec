use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use gridbench_core::{
    control::{Action, ControlDescriptor, ControlKind},
    schema::{Content, SettingsSchema},
    store::SettingsStore,
    value::SettingValue,
};

/// Which settings card the form shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Card {
    /// The dynamic instance rows.
    #[default]
    Page,
    /// The root widget's options.
    Widget,
}

impl Card {
    pub fn toggle(self) -> Self {
        match self {
            Card::Page => Card::Widget,
            Card::Widget => Card::Page,
        }
    }
}

/// Active card and the index of the focused control in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormState {
    pub card: Card,
    pub focus: usize,
}

impl FormState {
    pub fn switch_card(&mut self) {
        self.card = self.card.toggle();
        self.focus = 0;
    }

    /// Move the focus by `delta`, wrapping around `len` controls.
    pub fn move_focus(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.focus = 0;
            return;
        }
        let len = len as isize;
        let current = (self.focus as isize).min(len - 1);
        self.focus = (current + delta).rem_euclid(len) as usize;
    }

    /// Keep the focus on an existing control after the form shrank.
    pub fn clamp(&mut self, len: usize) {
        self.focus = self.focus.min(len.saturating_sub(1));
    }

    pub fn focused<'a>(&self, schema: &'a SettingsSchema) -> Option<&'a ControlDescriptor> {
        schema.controls().nth(self.focus)
    }
}

/// A keyboard edit aimed at the focused control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEdit {
    /// Add `n` steps (negative to go down).
    Step(i64),
    /// Append a decimal digit.
    Digit(u8),
    Backspace,
    Clear,
    Toggle,
    Press,
}

/// What the caller should do with the stores after an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Set(String, SettingValue),
    Clear(String),
    Trigger(Action),
    None,
}

/// Translate `edit` into a store operation for `control`, given its
/// `current` value. Edits that do not apply to the control's kind yield
/// [`EditOutcome::None`].
pub fn apply_edit(
    control: &ControlDescriptor,
    current: Option<&SettingValue>,
    edit: FieldEdit,
) -> EditOutcome {
    let name = control.name().to_string();
    match (control.kind(), edit) {
        (ControlKind::Action { action, .. }, FieldEdit::Press) => EditOutcome::Trigger(*action),
        (ControlKind::Action { .. }, _) => EditOutcome::None,
        (_, FieldEdit::Clear) => match current {
            Some(_) => EditOutcome::Clear(name),
            None => EditOutcome::None,
        },
        (ControlKind::Boolean, FieldEdit::Toggle | FieldEdit::Press) => {
            let on = current.and_then(SettingValue::as_bool).unwrap_or(false);
            EditOutcome::Set(name, SettingValue::Bool(!on))
        }
        (ControlKind::Numeric { min, step, .. }, FieldEdit::Step(n)) => {
            let next = match current.and_then(SettingValue::as_number) {
                Some(value) => value.saturating_add(n.saturating_mul(*step)),
                None => min.unwrap_or(0),
            };
            EditOutcome::Set(name, SettingValue::Number(next))
        }
        (ControlKind::Numeric { .. }, FieldEdit::Digit(d)) => {
            let digit = i64::from(d.min(9));
            let next = match current.and_then(SettingValue::as_number) {
                Some(value) if value < 0 => value.saturating_mul(10).saturating_sub(digit),
                Some(value) => value.saturating_mul(10).saturating_add(digit),
                None => digit,
            };
            EditOutcome::Set(name, SettingValue::Number(next))
        }
        (ControlKind::Numeric { .. }, FieldEdit::Backspace) => {
            match current.and_then(SettingValue::as_number) {
                Some(value) if value / 10 != 0 => EditOutcome::Set(name, SettingValue::Number(value / 10)),
                Some(_) => EditOutcome::Clear(name),
                None => EditOutcome::None,
            }
        }
        _ => EditOutcome::None,
    }
}

fn field_text(control: &ControlDescriptor, value: Option<&SettingValue>) -> String {
    match control.kind() {
        ControlKind::Action { text, .. } => format!("<{text}>"),
        ControlKind::Boolean => {
            let mark = match value.and_then(SettingValue::as_bool) {
                Some(true) => "x",
                Some(false) => " ",
                None => "?",
            };
            format!("[{mark}]")
        }
        ControlKind::Numeric { .. } => match value {
            Some(value) => format!("[{value}]"),
            None => "[_]".to_string(),
        },
    }
}

/// Cut `text` to at most `width` display columns.
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        let next = format!("{out}{ch}");
        if next.width() + 1 > width {
            break;
        }
        out = next;
    }
    out.push('…');
    out
}

/// Build the form's lines. The control at `focus` (form order) is
/// highlighted.
pub fn form_lines(store: &SettingsStore, focus: Option<usize>, width: u16) -> Vec<Line<'static>> {
    let schema = store.schema();
    let width = usize::from(width);
    let focused = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let mut index = 0usize;
    let mut lines = Vec::new();

    let control_span = |control: &ControlDescriptor, index: &mut usize| {
        let text = field_text(control, store.get(control.name()));
        let style = if focus == Some(*index) {
            focused
        } else if control.holds_value() {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Magenta)
        };
        *index += 1;
        Span::styled(text, style)
    };

    for section in &schema.sections {
        if let Some(title) = &section.title {
            lines.push(Line::from(Span::styled(
                fit(title, width),
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )));
        }
        for row in &section.rows {
            let mut spans = Vec::new();
            for column in &row.columns {
                if let Some(title) = &column.title {
                    spans.push(Span::styled(
                        format!("{title}: "),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                let labelled = column
                    .contents
                    .iter()
                    .any(|content| matches!(content, Content::Label(_)));
                for content in &column.contents {
                    match content {
                        Content::Label(text) => spans.push(Span::raw(text.clone())),
                        Content::Control(control) => {
                            if !labelled && control.holds_value() {
                                spans.push(Span::raw(format!("{} ", control.name())));
                            }
                            spans.push(control_span(control, &mut index));
                            spans.push(Span::raw(" "));
                        }
                    }
                }
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }
    }

    if schema.sections.iter().all(|section| section.rows.is_empty()) {
        lines.push(Line::from(Span::styled(
            "(nothing here yet)",
            Style::default().fg(Color::DarkGray),
        )));
    }

    if let Some(footer) = &schema.footer {
        lines.push(Line::from(""));
        lines.push(Line::from(control_span(footer, &mut index)));
    }
    lines
}

/// Render the active settings card, with the generated options below it.
pub fn render_form(
    f: &mut Frame,
    area: Rect,
    store: &SettingsStore,
    state: &FormState,
    generated_code: &str,
) {
    let title = store.schema().title.clone().unwrap_or_default();
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let mut lines = form_lines(store, Some(state.focus), inner.width);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Options",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.extend(generated_code.lines().map(|line| {
        Line::from(Span::styled(
            fit(line, usize::from(inner.width)),
            Style::default().fg(Color::Green),
        ))
    }));

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridbench_config::BenchConfig;
    use gridbench_core::{codec::InstanceId, page::SettingsPage};
    use gridbench_grid::GridDemo;
    use ratatui::{backend::TestBackend, Terminal};

    fn text_of(buf: &ratatui::buffer::Buffer) -> String {
        buf.content().iter().map(|c| c.symbol().to_string()).collect()
    }

    #[test]
    fn focus_wraps_and_clamps() {
        let mut state = FormState::default();
        state.move_focus(-1, 5);
        assert_eq!(state.focus, 4);
        state.move_focus(1, 5);
        assert_eq!(state.focus, 0);
        state.focus = 7;
        state.clamp(3);
        assert_eq!(state.focus, 2);
        state.switch_card();
        assert_eq!((state.card, state.focus), (Card::Widget, 0));
    }

    #[test]
    fn step_starts_at_minimum_then_adds() {
        let control = ControlDescriptor::number("width").with_min(1).with_step(2);
        assert_eq!(
            apply_edit(&control, None, FieldEdit::Step(1)),
            EditOutcome::Set("width".into(), SettingValue::Number(1))
        );
        assert_eq!(
            apply_edit(&control, Some(&SettingValue::Number(3)), FieldEdit::Step(-1)),
            EditOutcome::Set("width".into(), SettingValue::Number(1))
        );
    }

    #[test]
    fn digits_and_backspace_edit_numbers() {
        let control = ControlDescriptor::number("col-1");
        let twelve = SettingValue::Number(12);
        assert_eq!(
            apply_edit(&control, Some(&twelve), FieldEdit::Digit(3)),
            EditOutcome::Set("col-1".into(), SettingValue::Number(123))
        );
        assert_eq!(
            apply_edit(&control, Some(&twelve), FieldEdit::Backspace),
            EditOutcome::Set("col-1".into(), SettingValue::Number(1))
        );
        assert_eq!(
            apply_edit(&control, Some(&SettingValue::Number(4)), FieldEdit::Backspace),
            EditOutcome::Clear("col-1".into())
        );
        assert_eq!(apply_edit(&control, None, FieldEdit::Clear), EditOutcome::None);
    }

    #[test]
    fn toggle_and_press() {
        let flag = ControlDescriptor::boolean("fullSize");
        assert_eq!(
            apply_edit(&flag, Some(&SettingValue::Bool(true)), FieldEdit::Toggle),
            EditOutcome::Set("fullSize".into(), SettingValue::Bool(false))
        );
        let remove = ControlDescriptor::button("Remove 2", Action::RemoveInstance(InstanceId(2)));
        assert_eq!(
            apply_edit(&remove, None, FieldEdit::Press),
            EditOutcome::Trigger(Action::RemoveInstance(InstanceId(2)))
        );
        assert_eq!(apply_edit(&remove, None, FieldEdit::Digit(1)), EditOutcome::None);
    }

    #[test]
    fn fit_truncates_by_display_width() {
        assert_eq!(fit("short", 10), "short");
        assert_eq!(fit("abcdefgh", 5), "abcd…");
    }

    #[test]
    fn renders_rows_footer_and_options() {
        let mut page = SettingsPage::new(GridDemo::from_config(&BenchConfig::default()));
        page.add_instance();
        let backend = TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                render_form(
                    f,
                    f.area(),
                    page.page_store(),
                    &FormState::default(),
                    &page.generated_code(),
                )
            })
            .unwrap();
        let text = text_of(terminal.backend().buffer());
        assert!(text.contains("Demo options"));
        assert!(text.contains("Column:"));
        assert!(text.contains("<Remove 1>"));
        assert!(text.contains("<Add new widget>"));
        assert!(text.contains("\"columns\": 4"));
    }

    #[test]
    fn empty_page_shows_placeholder() {
        let page = SettingsPage::new(GridDemo::new());
        let lines = form_lines(page.page_store(), None, 40);
        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert!(text.iter().any(|l| l.contains("nothing here yet")));
    }
}
