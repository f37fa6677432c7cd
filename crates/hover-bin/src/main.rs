//! oxhover: interactive terminal harness for the hover controller.
//!
//! Renders a small read-only document with a glyph margin, routes terminal
//! mouse and key input through `core-input` into one `HoverController`, and
//! draws whichever hover is showing.
//!
//! Keys: F1 show hover, F2 show sticky hover, F12 definition preview,
//! F6 toggle hover, F5 reload config, d refresh decorations, arrows move the
//! caret, q quits.

mod document;
mod popups;
mod surface;

use anyhow::Result;
use clap::Parser;
use core_config::Config;
use core_events::{ConfigChange, EditorEvent, Position, ScrollChange};
use core_hover::{
    HoverController, HoverDeps, HoverRegistry, HoverSource, SharedController,
    ShowDefinitionPreviewHoverAction, ShowHoverAction, ShowHoverArgs, SurfaceId,
};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{
        self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use document::{Document, STATUS_ROWS, ScreenHitTester, TEXT_ORIGIN, Viewport};
use popups::{SharedLayer, terminal_widgets};
use std::cell::RefCell;
use std::io::{Write, stdout};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Once;
use surface::{DocumentDefinitions, SharedSurface, SurfaceState, TerminalSurface};
use tracing::{error, info, trace};
use tracing_appender::non_blocking::WorkerGuard;

const SURFACE: SurfaceId = SurfaceId(1);

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "oxhover", version, about = "Hover arbitration playground")]
struct Args {
    /// Optional configuration file path (overrides discovery of `oxhover.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Start with hover disabled regardless of the configuration file.
    #[arg(long)]
    pub disable: bool,
    /// Start with sticky hover off regardless of the configuration file.
    #[arg(long = "no-sticky")]
    pub no_sticky: bool,
}

impl Args {
    fn apply_overrides(&self, mut config: Config) -> Config {
        if self.disable {
            config.file.hover.enabled = false;
        }
        if self.no_sticky {
            config.file.hover.sticky = false;
        }
        config
    }
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn run(&mut self, args: &Args) -> Result<Config> {
        self.configure_logging()?;
        Self::install_panic_hook();
        let config = args.apply_overrides(core_config::load_from(args.config.clone())?);
        info!(
            target: "runtime",
            config_override = args.config.is_some(),
            hover_enabled = config.file.hover.enabled,
            hover_sticky = config.file.hover.sticky,
            "startup"
        );
        Ok(config)
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join("oxhover.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, "oxhover.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, Show);
                let _ = disable_raw_mode();
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

/// Raw mode, alternate screen and mouse capture for the lifetime of the guard.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, EnableMouseCapture, Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, Show);
        let _ = disable_raw_mode();
    }
}

struct App {
    doc: Rc<Document>,
    viewport: Viewport,
    layer: SharedLayer,
    surface: SharedSurface,
    registry: HoverRegistry,
    controller: SharedController,
    config: Config,
    args: Args,
    quit: bool,
}

impl App {
    fn new(args: Args, config: Config, width: u16, height: u16) -> Self {
        let doc = Rc::new(Document::sample());
        let layer = SharedLayer::default();
        let surface: SharedSurface = Rc::new(RefCell::new(SurfaceState::new(
            config.options(),
            Position::new(4, 4),
        )));
        let factory_layer = layer.clone();
        let controller = HoverController::new(HoverDeps {
            surface: Box::new(TerminalSurface::new(surface.clone())),
            widgets: Box::new(move || terminal_widgets(factory_layer)),
            definitions: Some(Rc::new(DocumentDefinitions { doc: doc.clone() })),
        });
        let mut registry = HoverRegistry::new();
        let controller = registry.register(SURFACE, controller);
        registry.set_model_uri(SURFACE, Some(doc.uri().to_string()));
        registry.set_focused(Some(SURFACE));
        Self {
            doc,
            viewport: Viewport::new(width, height),
            layer,
            surface,
            registry,
            controller,
            config,
            args,
            quit: false,
        }
    }

    /// Deliver `event` if the controller currently listens for its signal.
    fn dispatch(&self, event: EditorEvent) {
        if self.surface.borrow().is_subscribed(event.signal()) {
            self.controller.borrow_mut().handle_event(&event);
        } else {
            trace!(target: "runtime", signal = ?event.signal(), "event_not_subscribed");
        }
    }

    async fn handle(&mut self, event: CEvent) -> Result<()> {
        match &event {
            CEvent::Key(key) if key.kind != KeyEventKind::Release => {
                if is_quit(key) {
                    self.quit = true;
                    return Ok(());
                }
                self.forward(&event);
                self.on_key(key).await?;
            }
            CEvent::Mouse(mouse) if is_scroll(mouse) => self.on_scroll(mouse),
            CEvent::Resize(width, height) => {
                self.viewport.width = *width;
                self.viewport.height = *height;
            }
            _ => self.forward(&event),
        }
        Ok(())
    }

    fn forward(&self, event: &CEvent) {
        let layer = self.layer.borrow();
        let hit = ScreenHitTester {
            doc: &self.doc,
            viewport: self.viewport,
            popups: &layer,
        };
        let mapped = core_input::map_terminal_event(event, &hit);
        drop(layer);
        if let Some(ev) = mapped {
            self.dispatch(ev);
        }
    }

    async fn on_key(&mut self, key: &KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::F(1) | KeyCode::F(2) => {
                let args = ShowHoverArgs {
                    sticky: Some(key.code == KeyCode::F(2)),
                    source: Some(HoverSource::Keyboard),
                    ..ShowHoverArgs::default()
                };
                ShowHoverAction::run(&self.registry, &args);
            }
            KeyCode::F(12) => {
                let args = ShowHoverArgs {
                    source: Some(HoverSource::Keyboard),
                    ..ShowHoverArgs::default()
                };
                ShowDefinitionPreviewHoverAction::run(&self.registry, &args).await;
            }
            KeyCode::F(5) => {
                let next = self
                    .args
                    .apply_overrides(core_config::load_from(self.args.config.clone())?);
                self.apply_config(next);
            }
            KeyCode::F(6) => {
                let mut next = self.config.clone();
                next.file.hover.enabled = !next.file.hover.enabled;
                self.apply_config(next);
            }
            KeyCode::Char('d') => self.dispatch(EditorEvent::DecorationsChanged),
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                self.move_caret(key.code);
            }
            _ => {}
        }
        Ok(())
    }

    fn apply_config(&mut self, next: Config) {
        let change: ConfigChange = self.config.diff(&next);
        self.surface.borrow_mut().options = next.options();
        self.config = next;
        if !change.changed.is_empty() {
            self.dispatch(EditorEvent::ConfigChanged(change));
        }
    }

    fn move_caret(&self, code: KeyCode) {
        let mut s = self.surface.borrow_mut();
        let Some(caret) = s.caret else {
            return;
        };
        let line = match code {
            KeyCode::Up => caret.line.saturating_sub(1).max(1),
            KeyCode::Down => (caret.line + 1).min(self.doc.line_count().max(1)),
            _ => caret.line,
        };
        let max_column = self.doc.line_len(line) + 1;
        let column = match code {
            KeyCode::Left => caret.column.saturating_sub(1).max(1),
            KeyCode::Right => caret.column + 1,
            _ => caret.column,
        }
        .min(max_column);
        s.caret = Some(Position::new(line, column));
    }

    fn on_scroll(&mut self, mouse: &MouseEvent) {
        let change = match mouse.kind {
            MouseEventKind::ScrollUp => ScrollChange {
                top_changed: self.viewport.scroll_lines(-1, &self.doc),
                left_changed: false,
            },
            MouseEventKind::ScrollDown => ScrollChange {
                top_changed: self.viewport.scroll_lines(1, &self.doc),
                left_changed: false,
            },
            MouseEventKind::ScrollLeft => ScrollChange {
                top_changed: false,
                left_changed: self.viewport.scroll_columns(-4),
            },
            _ => ScrollChange {
                top_changed: false,
                left_changed: self.viewport.scroll_columns(4),
            },
        };
        self.dispatch(EditorEvent::ScrollChanged(change));
    }

    fn draw(&self, out: &mut impl Write) -> Result<()> {
        let vp = self.viewport;
        queue!(out, Clear(ClearType::All))?;
        let text_width = usize::from(vp.width.saturating_sub(TEXT_ORIGIN));
        let caret = self.surface.borrow().caret;
        for row in 0..vp.text_rows() {
            let line = vp.top + u32::from(row) + 1;
            let Some(text) = self.doc.line(line) else {
                break;
            };
            let glyph = if self.doc.has_glyph(line) { "●" } else { " " };
            let visible: String = text
                .chars()
                .skip(vp.left as usize)
                .take(text_width)
                .collect();
            queue!(
                out,
                MoveTo(0, row),
                Print(glyph),
                Print(format!("{line:>4} ")),
                Print(visible)
            )?;
            if let Some(c) = caret
                && c.line == line
                && let Some(column) = vp.column_of(c.column)
            {
                let under = text.chars().nth(c.column.saturating_sub(1) as usize).unwrap_or(' ');
                queue!(
                    out,
                    MoveTo(column, row),
                    SetAttribute(Attribute::Reverse),
                    Print(under),
                    SetAttribute(Attribute::Reset)
                )?;
            }
        }

        let layer = self.layer.borrow();
        let popups = [
            layer.glyph_rect(&self.doc, &vp).zip(layer.glyph_label(&self.doc)),
            layer.content_rect(&self.doc, &vp).zip(layer.content_label(&self.doc)),
        ];
        for (rect, label) in popups.into_iter().flatten() {
            queue!(
                out,
                MoveTo(rect.column, rect.row),
                SetAttribute(Attribute::Reverse),
                Print(label),
                SetAttribute(Attribute::Reset)
            )?;
        }

        let snap = self.controller.borrow().snapshot();
        let status = format!(
            "{:?} pinned={} hover={} sticky={} | F1 hover F2 sticky F12 def F6 toggle F5 reload q quit",
            snap.state, snap.pinned, snap.enabled, snap.sticky
        );
        let status: String = status.chars().take(usize::from(vp.width)).collect();
        queue!(
            out,
            MoveTo(0, vp.height.saturating_sub(STATUS_ROWS)),
            SetAttribute(Attribute::Bold),
            Print(status),
            SetAttribute(Attribute::Reset)
        )?;
        out.flush()?;
        Ok(())
    }
}

fn event_kind(event: &CEvent) -> &'static str {
    match event {
        CEvent::Key(_) => "key",
        CEvent::Mouse(_) => "mouse",
        CEvent::Resize(..) => "resize",
        CEvent::FocusGained | CEvent::FocusLost => "focus",
        CEvent::Paste(_) => "paste",
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('q')
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

fn is_scroll(mouse: &MouseEvent) -> bool {
    matches!(
        mouse.kind,
        MouseEventKind::ScrollUp
            | MouseEventKind::ScrollDown
            | MouseEventKind::ScrollLeft
            | MouseEventKind::ScrollRight
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    let config = startup.run(&args)?;
    let (width, height) = terminal::size()?;
    let mut app = App::new(args, config, width, height);

    let _guard = TerminalGuard::enter()?;
    let mut out = stdout();
    app.draw(&mut out)?;
    while !app.quit {
        let event = match event::read() {
            Ok(ev) => ev,
            Err(e) => {
                error!(target: "runtime", ?e, "event_read_failed");
                break;
            }
        };
        trace!(target: "runtime", kind = event_kind(&event), "terminal_event");
        app.handle(event).await?;
        app.draw(&mut out)?;
    }
    app.registry.unregister(SURFACE);
    info!(target: "runtime", "shutdown");
    Ok(())
}
