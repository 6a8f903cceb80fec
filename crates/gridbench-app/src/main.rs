use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use gridbench_config::{BenchConfig, InstancePreset};
use gridbench_core::{
    codec::{encode, InstanceId},
    control::Action,
    logging::{self, LogBuffer, LogEntry},
    page::SettingsPage,
    store::SettingsError,
    value::SettingValue,
};
use gridbench_grid::GridDemo;
use gridbench_ui::{
    form::{apply_edit, Card, EditOutcome, FieldEdit, FormState},
    shell::{render_shell, ShellView},
};

const MAX_LOG_HISTORY: usize = 200;

struct App {
    page: SettingsPage<GridDemo>,
    form: FormState,
    log_buffer: Option<LogBuffer>,
    logs: VecDeque<LogEntry>,
    log_lines: u16,
    status: Option<String>,
}

impl App {
    fn new(config: &BenchConfig, log_buffer: Option<LogBuffer>) -> Self {
        let mut app = Self {
            page: SettingsPage::new(GridDemo::from_config(config)),
            form: FormState::default(),
            log_buffer,
            logs: VecDeque::new(),
            log_lines: config.ui.log_lines,
            status: None,
        };
        for preset in &config.instances {
            app.add_preset(preset);
        }
        app
    }

    fn add_preset(&mut self, preset: &InstancePreset) {
        let id = self.page.add_instance();
        let values = [
            ("col", preset.col),
            ("line", preset.line),
            ("width", preset.width),
            ("height", preset.height),
        ];
        for (property, value) in values {
            let name = encode(property, id);
            if let Err(err) = self
                .page
                .set_page_value(&name, SettingValue::Number(i64::from(value)))
            {
                tracing::warn!(instance = %id, error = %err, "preset value rejected");
            }
        }
        tracing::info!(instance = %id, "preset box added");
    }

    /// Move new entries from the shared log buffer into the strip's history.
    fn sync_logs(&mut self) {
        let Some(buffer) = &self.log_buffer else {
            return;
        };
        for entry in buffer.take() {
            if self.logs.len() >= MAX_LOG_HISTORY {
                self.logs.pop_front();
            }
            self.logs.push_back(entry);
        }
    }

    fn control_count(&self) -> usize {
        match self.form.card {
            Card::Page => self.page.page_store().controls().count(),
            Card::Widget => self.page.widget_store().controls().count(),
        }
    }

    /// Apply `edit` to the focused control of the active card.
    fn edit(&mut self, edit: FieldEdit) {
        let store = match self.form.card {
            Card::Page => self.page.page_store(),
            Card::Widget => self.page.widget_store(),
        };
        let Some(control) = self.form.focused(store.schema()) else {
            return;
        };
        let outcome = apply_edit(control, store.get(control.name()), edit);

        let result: Result<(), SettingsError> = match (outcome, self.form.card) {
            (EditOutcome::Set(name, value), Card::Page) => {
                self.page.set_page_value(&name, value).map(|_| ())
            }
            (EditOutcome::Set(name, value), Card::Widget) => {
                self.page.set_widget_value(&name, value).map(|_| ())
            }
            (EditOutcome::Clear(name), Card::Page) => self.page.clear_page_value(&name).map(|_| ()),
            (EditOutcome::Clear(name), Card::Widget) => {
                self.page.clear_widget_value(&name).map(|_| ())
            }
            (EditOutcome::Trigger(action), _) => {
                self.trigger(action);
                Ok(())
            }
            (EditOutcome::None, _) => Ok(()),
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, "edit rejected");
            self.status = Some(err.to_string());
        }
        self.form.clamp(self.control_count());
    }

    fn trigger(&mut self, action: Action) {
        match self.page.trigger(action) {
            Some(id) => self.status = Some(format!("added box {id}")),
            None => {
                if let Action::RemoveInstance(id) = action {
                    self.status = Some(format!("removed box {id}"));
                }
            }
        }
    }

    /// Handle one key press. Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        self.status = None;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::BackTab => self.form.switch_card(),
            KeyCode::Up => self.form.move_focus(-1, self.control_count()),
            KeyCode::Down => self.form.move_focus(1, self.control_count()),
            KeyCode::Left | KeyCode::Char('-') => self.edit(FieldEdit::Step(-1)),
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => {
                self.edit(FieldEdit::Step(1))
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let digit = c.to_digit(10).map_or(0, |d| d as u8);
                self.edit(FieldEdit::Digit(digit));
            }
            KeyCode::Backspace => self.edit(FieldEdit::Backspace),
            KeyCode::Delete => self.edit(FieldEdit::Clear),
            KeyCode::Char(' ') => self.edit(FieldEdit::Toggle),
            KeyCode::Enter => self.edit(FieldEdit::Press),
            KeyCode::Char('a') => self.trigger(Action::AddInstance),
            _ => {}
        }
        false
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn main() -> Result<()> {
    let log_buffer = logging::init();
    let config = BenchConfig::load()?;
    tracing::info!(presets = config.instances.len(), "gridbench starting up");

    let mut terminal = setup_terminal()?;
    let res = run(&mut terminal, &config, log_buffer);
    restore_terminal(terminal)?;
    res
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    config: &BenchConfig,
    log_buffer: LogBuffer,
) -> Result<()> {
    let mut app = App::new(config, Some(log_buffer));
    let poll_timeout = Duration::from_millis(config.ui.tick_ms);
    let mut frames: u64 = 0;
    let started = Instant::now();

    loop {
        app.sync_logs();

        let logs: &[LogEntry] = app.logs.make_contiguous();
        terminal.draw(|f| {
            render_shell(
                f,
                &app.page,
                ShellView {
                    form: &app.form,
                    logs,
                    log_lines: app.log_lines,
                    status_line: app.status.as_deref(),
                },
            );
        })?;
        frames += 1;

        if event::poll(poll_timeout)? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key.code) {
                    break;
                }
            }
        }
    }

    tracing::info!(
        frames,
        rebuilds = app.page.engine().cycles(),
        uptime_ms = started.elapsed().as_millis() as u64,
        "gridbench shutting down"
    );
    Ok(())
}
