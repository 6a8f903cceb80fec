use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use gridbench_core::logging::{LogEntry, LogLevel};

fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Error => Color::Red,
        LogLevel::Warn => Color::Yellow,
        LogLevel::Info => Color::Green,
        LogLevel::Debug => Color::Cyan,
        LogLevel::Trace => Color::DarkGray,
    }
}

/// Render the newest entries that fit into the log strip, oldest at the
/// top.
pub fn render_logs(f: &mut Frame, area: Rect, entries: &[LogEntry]) {
    if area.height == 0 {
        return;
    }
    let block = Block::default().borders(Borders::TOP | Borders::BOTTOM).title("Log");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let visible = usize::from(inner.height);
    let start = entries.len().saturating_sub(visible);
    let lines: Vec<Line> = entries[start..]
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!("{:5} ", entry.level),
                    Style::default()
                        .fg(level_color(entry.level))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("[{}] ", entry.target),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(entry.message.as_str()),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}
