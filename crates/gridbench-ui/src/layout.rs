use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRects {
    pub title: Rect,
    pub form: Rect,
    pub preview: Rect,
    pub logs: Rect,
    pub status: Rect,
}

/// Split the screen into title bar, form and preview side by side, the log
/// strip and a one-line status bar.
///
/// `log_lines` is the number of visible log entries; the strip adds two rows
/// of border and is dropped entirely when `log_lines` is zero.
pub fn page_layout(area: Rect, log_lines: u16, form_width: u16) -> PageRects {
    let logs_height = if log_lines == 0 {
        0
    } else {
        log_lines.saturating_add(2).min(area.height.saturating_sub(4) / 2)
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),           // title bar
            Constraint::Min(3),              // form + preview
            Constraint::Length(logs_height), // log strip
            Constraint::Length(1),           // status bar
        ])
        .split(area);

    let body = rows[1];
    let form_width = form_width.min(body.width.saturating_sub(10).max(body.width / 2));
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(form_width), Constraint::Min(1)])
        .split(body);

    PageRects {
        title: rows[0],
        form: cols[0],
        preview: cols[1],
        logs: rows[2],
        status: rows[3],
    }
}
