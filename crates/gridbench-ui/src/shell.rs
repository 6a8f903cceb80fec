use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use gridbench_core::{
    logging::LogEntry,
    page::{PageDefinition, SettingsPage},
};

use crate::form::{render_form, Card, FormState};
use crate::layout::{page_layout, PageRects};
use crate::logs::render_logs;
use crate::preview::render_preview;

const FORM_WIDTH: u16 = 72;
const KEY_HINTS: &str =
    "Tab card | ↑↓ focus | ←→ step | 0-9 edit | Space toggle | Enter press | a add | q quit";

/// Everything one frame needs besides the page itself.
pub struct ShellView<'a> {
    pub form: &'a FormState,
    pub logs: &'a [LogEntry],
    pub log_lines: u16,
    /// Transient message shown in the status bar, e.g. a rejected edit.
    pub status_line: Option<&'a str>,
}

/// Draw the whole bench screen.
pub fn render_shell<D: PageDefinition>(
    f: &mut Frame,
    page: &SettingsPage<D>,
    view: ShellView<'_>,
) -> PageRects {
    let rects = page_layout(f.area(), view.log_lines, FORM_WIDTH);

    let (card_name, store) = match view.form.card {
        Card::Page => ("page settings", page.page_store()),
        Card::Widget => ("widget settings", page.widget_store()),
    };
    let instances = page.registry().len();
    let attached = page
        .last_composition()
        .map_or(0, |composition| composition.attached.len());
    let top = Paragraph::new(Line::from(format!(
        "gridbench | {card_name} | {attached}/{instances} boxes placed | rebuilds: {}",
        page.engine().cycles()
    )))
    .style(Style::default().fg(Color::Black).bg(Color::Cyan));
    f.render_widget(top, rects.title);

    render_form(f, rects.form, store, view.form, &page.generated_code());
    render_preview(f, rects.preview, page.tree());
    render_logs(f, rects.logs, view.logs);

    let status = match (page.last_error(), view.status_line) {
        (Some(err), _) => Span::styled(err.to_string(), Style::default().fg(Color::Red)),
        (None, Some(message)) => Span::styled(message.to_string(), Style::default().fg(Color::Yellow)),
        (None, None) => Span::styled(KEY_HINTS, Style::default().fg(Color::DarkGray)),
    };
    f.render_widget(Paragraph::new(Line::from(status)), rects.status);

    rects
}
