use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableFocusChange;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableFocusChange;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui_caret::CaretOptions;
use ratatui_caret::StyleName;
use ratatui_caret::crossterm_input::input_event_from_crossterm;
use ratatui_caret::engine::host::FieldId;
use ratatui_caret::engine::host::NativeCaret;
use ratatui_caret::engine::host::TrackedField;
use ratatui_caret::engine::input::CaretEvent;
use ratatui_caret::field::RichField;
use ratatui_caret::field::TextField;
use ratatui_caret::input::InputEvent;
use ratatui_caret::input::KeyCode;
use ratatui_caret::input::KeyKind;
use ratatui_caret::registry::CaretRegistry;
use ratatui_caret::terminal::TerminalHost;
use std::fs::File;
use std::io;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const FRAME: Duration = Duration::from_millis(16);
const IDLE: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Focus {
    Name,
    Notes,
    Rich,
}

impl Focus {
    const ORDER: [Focus; 3] = [Focus::Name, Focus::Notes, Focus::Rich];

    fn id(self) -> FieldId {
        match self {
            Focus::Name => FieldId(1),
            Focus::Notes => FieldId(2),
            Focus::Rich => FieldId(3),
        }
    }

    fn step(self, forward: bool) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let n = Self::ORDER.len();
        Self::ORDER[if forward { (i + 1) % n } else { (i + n - 1) % n }]
    }
}

struct App {
    host: TerminalHost,
    carets: CaretRegistry<TerminalHost>,
    name: TextField,
    notes: TextField,
    rich: RichField,
    focus: Focus,
    style: StyleName,
}

impl App {
    fn send(&mut self, event: CaretEvent) {
        let App {
            host,
            carets,
            name,
            notes,
            rich,
            focus,
            ..
        } = self;
        let field: &mut dyn TrackedField = match focus {
            Focus::Name => name,
            Focus::Notes => notes,
            Focus::Rich => rich,
        };
        carets.handle_event(event, field, host);
    }

    fn edit(&mut self, input: &InputEvent) {
        match self.focus {
            Focus::Name => {
                self.name.input(input);
            }
            Focus::Notes => {
                self.notes.input(input);
            }
            Focus::Rich => {
                self.rich.input(input);
            }
        }
    }

    fn set_focus(&mut self, next: Focus) {
        if next == self.focus {
            return;
        }
        self.send(CaretEvent::Blur);
        self.focus = next;
        self.host.set_active_field(Some(next.id()));
        self.send(CaretEvent::Focus);
    }

    fn field_at(&self, x: u16, y: u16) -> Option<Focus> {
        let hit = |rect: ratatui_caret::engine::geometry::BoxRect| {
            let (x, y) = (x as f64, y as f64);
            x >= rect.left && x < rect.right() && y >= rect.top && y < rect.bottom()
        };
        Focus::ORDER.into_iter().find(|f| match f {
            Focus::Name => hit(self.name.rect()),
            Focus::Notes => hit(self.notes.rect()),
            Focus::Rich => hit(self.rich.rect()),
        })
    }

    fn next_style(&mut self) {
        let i = StyleName::ALL
            .iter()
            .position(|s| *s == self.style)
            .unwrap_or(0);
        self.style = StyleName::ALL[(i + 1) % StyleName::ALL.len()];
        let options = CaretOptions::new().with_style(self.style);
        self.carets.update(&self.name, &options);
        self.carets.update(&self.notes, &options);
        self.carets.update(&self.rich, &options);
        tracing::info!(style = %self.style, "switched caret style");
    }

    fn broadcast(&mut self, event: CaretEvent) {
        let App {
            host,
            carets,
            name,
            notes,
            rich,
            ..
        } = self;
        carets.broadcast(event, &mut [name, notes, rich], host);
    }

    fn frame(&mut self) -> bool {
        let App {
            host,
            carets,
            name,
            notes,
            rich,
            ..
        } = self;
        carets.frame_all(&mut [name, notes, rich], host)
    }

    fn layout(&mut self, area: Rect) -> [Rect; 5] {
        let [title, name, notes, rich, help] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Length(7),
            Constraint::Min(1),
        ])
        .areas(area);
        let inner = |r: Rect| Block::default().borders(Borders::ALL).inner(r);
        self.name.set_rect(self.host.to_viewport(inner(name)));
        self.notes.set_rect(self.host.to_viewport(inner(notes)));
        self.rich.set_rect(self.host.to_viewport(inner(rich)));
        [title, name, notes, rich, help]
    }
}

fn main() -> io::Result<()> {
    let log = File::create("ratatui-caret-demo.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ratatui_caret=debug,ratatui_caret_core=debug")),
        )
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .init();

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    res
}

fn run<B: Backend>(terminal: &mut Terminal<B>) -> io::Result<()> {
    let size = terminal.size()?;
    let mut app = App {
        host: TerminalHost::new(Rect::new(0, 0, size.width, size.height)),
        carets: CaretRegistry::new(),
        name: TextField::single_line(Focus::Name.id()).with_value("Type here"),
        notes: TextField::multi_line(Focus::Notes.id())
            .with_value("Multi-line notes wrap at word boundaries.\nArrow keys move the caret."),
        rich: RichField::new(Focus::Rich.id())
            .with_text("Rich region\nCtrl+A selects everything;\nthe caret follows the last line."),
        focus: Focus::Name,
        style: StyleName::Default,
    };
    app.layout(app.host.area());

    let App {
        host,
        carets,
        name,
        notes,
        rich,
        ..
    } = &mut app;
    let fields: [&mut dyn TrackedField; 3] = [name, notes, rich];
    for field in fields {
        let options = CaretOptions::new().with_trail_length(6);
        if let Err(err) = carets.attach(field, host, options) {
            tracing::warn!(%err, "caret overlay disabled for this field");
        }
    }
    app.host.set_active_field(Some(app.focus.id()));
    app.send(CaretEvent::Focus);

    loop {
        let size = terminal.size()?;
        if app.host.set_area(Rect::new(0, 0, size.width, size.height)) {
            app.broadcast(CaretEvent::Resize);
        }
        app.frame();

        terminal.draw(|f| {
            let area = f.area();
            let [title, name_box, notes_box, rich_box, help] = app.layout(area);
            let focused = app.focus;
            let block = |label: &'static str, which: Focus| {
                let title = if which == focused {
                    label.cyan().bold()
                } else {
                    label.into()
                };
                Block::default().title(title).borders(Borders::ALL)
            };
            let heading = Line::from(format!(" ratatui-caret · style: {}", app.style));
            f.render_widget(Paragraph::new(heading.bold()), title);
            f.render_widget(block("Name", Focus::Name), name_box);
            f.render_widget(block("Notes", Focus::Notes), notes_box);
            f.render_widget(block("Rich", Focus::Rich), rich_box);
            f.render_widget(
                Paragraph::new(" Tab/Shift+Tab: switch field · Ctrl+N: next style · Esc: quit")
                    .dim(),
                help,
            );

            let buf = f.buffer_mut();
            app.name.render(area, buf, Style::default());
            app.notes.render(area, buf, Style::default());
            app.rich.render(area, buf, Style::default());
            app.carets.render(&app.host, area, buf);

            // Fall back to the terminal cursor while the overlay has handed the caret back.
            let native = match focused {
                Focus::Name if app.name.native_caret() == NativeCaret::Auto => {
                    app.name.cursor_position(area)
                }
                Focus::Notes if app.notes.native_caret() == NativeCaret::Auto => {
                    app.notes.cursor_position(area)
                }
                _ => None,
            };
            if let Some(pos) = native {
                f.set_cursor_position(pos);
            }
        })?;

        let timeout = if app.carets.needs_redraw(&app.host) {
            FRAME
        } else {
            IDLE
        };
        if !crossterm::event::poll(timeout)? {
            continue;
        }
        let Some(input) = input_event_from_crossterm(crossterm::event::read()?) else {
            continue;
        };
        if handle_input(&mut app, input) {
            return Ok(());
        }
    }
}

/// Returns true when the demo should quit.
fn handle_input(app: &mut App, input: InputEvent) -> bool {
    match &input {
        InputEvent::Key(key) if key.kind == KeyKind::Press => {
            match key.code {
                KeyCode::Esc => return true,
                KeyCode::Tab => {
                    app.set_focus(app.focus.step(true));
                    return false;
                }
                KeyCode::BackTab => {
                    app.set_focus(app.focus.step(false));
                    return false;
                }
                KeyCode::Char('n') if key.modifiers.ctrl => {
                    app.next_style();
                    return false;
                }
                _ => {}
            }
            // The caret reads the cursor on the next frame, after the edit below.
            app.send(CaretEvent::KeyDown);
            app.edit(&input);
        }
        InputEvent::MouseDown(m) => {
            let Some(target) = app.field_at(m.x, m.y) else {
                return false;
            };
            app.set_focus(target);
            app.edit(&input);
            app.send(CaretEvent::Click);
        }
        InputEvent::Paste(_) => {
            app.edit(&input);
            app.send(CaretEvent::Input);
        }
        InputEvent::Resize { width, height } => {
            if app.host.set_area(Rect::new(0, 0, *width, *height)) {
                app.broadcast(CaretEvent::Resize);
            }
        }
        _ => {
            if let Some(event) = input.caret_event() {
                app.send(event);
            }
        }
    }
    false
}
