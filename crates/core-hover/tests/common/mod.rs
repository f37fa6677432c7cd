#![allow(dead_code)] // Shared across many integration tests; each test binary uses a subset of helpers.

use core_config::EditorOptions;
use core_events::{
    EditorEvent, HitWidget, KeyEventExt, KeyToken, ModifierKey, NamedKey, PointerEvent,
    PointerTarget, Position, Signal, TextRange,
};
use core_hover::{
    ContentHoverWidget, DefinitionLookup, DisplayRequest, EditorSurface, GlyphHoverWidget,
    HoverController, HoverDeps, PendingLookup, SubscriptionId, WidgetPair,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Every widget call, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ContentShow(DisplayRequest),
    ContentHide,
    ContentDecorations,
    ContentDispose,
    GlyphShow(u32),
    GlyphHide,
    GlyphDecorations,
    GlyphDispose,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

pub struct FakeContent {
    log: CallLog,
    color_picker: Rc<Cell<bool>>,
}

impl ContentHoverWidget for FakeContent {
    fn start_showing_at(&mut self, request: &DisplayRequest) {
        self.log.borrow_mut().push(Call::ContentShow(*request));
    }
    fn hide(&mut self) {
        self.log.borrow_mut().push(Call::ContentHide);
    }
    fn is_color_picker_visible(&self) -> bool {
        self.color_picker.get()
    }
    fn on_model_decorations_changed(&mut self) {
        self.log.borrow_mut().push(Call::ContentDecorations);
    }
    fn dispose(&mut self) {
        self.log.borrow_mut().push(Call::ContentDispose);
    }
}

pub struct FakeGlyph {
    log: CallLog,
}

impl GlyphHoverWidget for FakeGlyph {
    fn start_showing_at(&mut self, line: u32) {
        self.log.borrow_mut().push(Call::GlyphShow(line));
    }
    fn hide(&mut self) {
        self.log.borrow_mut().push(Call::GlyphHide);
    }
    fn on_model_decorations_changed(&mut self) {
        self.log.borrow_mut().push(Call::GlyphDecorations);
    }
    fn dispose(&mut self) {
        self.log.borrow_mut().push(Call::GlyphDispose);
    }
}

#[derive(Debug)]
pub struct SurfaceState {
    pub options: EditorOptions,
    pub caret: Option<Position>,
    pub live: BTreeMap<SubscriptionId, Signal>,
    pub unsubscribed: Vec<SubscriptionId>,
    next: u64,
}

pub struct FakeSurface(pub Rc<RefCell<SurfaceState>>);

impl EditorSurface for FakeSurface {
    fn subscribe(&mut self, signal: Signal) -> SubscriptionId {
        let mut s = self.0.borrow_mut();
        s.next += 1;
        let id = SubscriptionId(s.next);
        s.live.insert(id, signal);
        id
    }
    fn unsubscribe(&mut self, id: SubscriptionId) {
        let mut s = self.0.borrow_mut();
        s.live.remove(&id);
        s.unsubscribed.push(id);
    }
    fn options(&self) -> EditorOptions {
        self.0.borrow().options
    }
    fn caret(&self) -> Option<Position> {
        self.0.borrow().caret
    }
}

/// Lookup whose pending operations are completed by the test.
#[derive(Default)]
pub struct ScriptedLookup {
    pub requested: RefCell<Vec<Position>>,
    pub completers: RefCell<Vec<core_hover::LookupCompleter>>,
    pub immediate: Cell<bool>,
}

impl DefinitionLookup for ScriptedLookup {
    fn start_find_definition_from_cursor(&self, position: Position) -> Option<PendingLookup> {
        self.requested.borrow_mut().push(position);
        if self.immediate.get() {
            return None;
        }
        let (done, pending) = PendingLookup::channel();
        self.completers.borrow_mut().push(done);
        Some(pending)
    }
}

pub struct Harness {
    pub controller: HoverController,
    pub calls: CallLog,
    pub surface: Rc<RefCell<SurfaceState>>,
    pub color_picker: Rc<Cell<bool>>,
    pub widgets_built: Rc<Cell<u32>>,
}

pub struct Parts {
    pub deps: HoverDeps,
    pub calls: CallLog,
    pub surface: Rc<RefCell<SurfaceState>>,
    pub color_picker: Rc<Cell<bool>>,
    pub widgets_built: Rc<Cell<u32>>,
}

pub fn options(enabled: bool, sticky: bool) -> EditorOptions {
    EditorOptions {
        hover_enabled: enabled,
        hover_sticky: sticky,
        ..EditorOptions::default()
    }
}

pub fn parts(opts: EditorOptions, lookup: Option<Rc<ScriptedLookup>>) -> Parts {
    let calls: CallLog = Rc::default();
    let color_picker = Rc::new(Cell::new(false));
    let widgets_built = Rc::new(Cell::new(0));
    let surface = Rc::new(RefCell::new(SurfaceState {
        options: opts,
        caret: Some(Position::new(1, 1)),
        live: BTreeMap::new(),
        unsubscribed: Vec::new(),
        next: 0,
    }));
    let (log, picker, built) = (calls.clone(), color_picker.clone(), widgets_built.clone());
    let deps = HoverDeps {
        surface: Box::new(FakeSurface(surface.clone())),
        widgets: Box::new(move || {
            built.set(built.get() + 1);
            WidgetPair::new(
                FakeContent {
                    log: log.clone(),
                    color_picker: picker,
                },
                FakeGlyph { log },
            )
        }),
        definitions: lookup.map(|l| l as Rc<dyn DefinitionLookup>),
    };
    Parts {
        deps,
        calls,
        surface,
        color_picker,
        widgets_built,
    }
}

impl Harness {
    pub fn new(opts: EditorOptions) -> Self {
        Self::from_parts(parts(opts, None))
    }

    pub fn enabled() -> Self {
        Self::new(options(true, true))
    }

    pub fn from_parts(p: Parts) -> Self {
        Self {
            controller: HoverController::new(p.deps),
            calls: p.calls,
            surface: p.surface,
            color_picker: p.color_picker,
            widgets_built: p.widgets_built,
        }
    }

    /// Deliver an event the way a host would: only if its signal is subscribed.
    pub fn send(&mut self, event: EditorEvent) -> bool {
        let hooked = self
            .surface
            .borrow()
            .live
            .values()
            .any(|s| *s == event.signal());
        if hooked {
            self.controller.handle_event(&event);
        }
        hooked
    }

    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    pub fn live_signals(&self) -> Signal {
        self.surface
            .borrow()
            .live
            .values()
            .fold(Signal::empty(), |acc, s| acc | *s)
    }

    /// Bring the hover into ShowingContent through a normal mouse hover and
    /// forget the calls that produced it.
    pub fn show_content_by_mouse(&mut self) {
        self.send(move_to(text(2, 5, 9)));
        self.take_calls();
    }
}

pub fn range(line: u32, start: u32, end: u32) -> TextRange {
    TextRange::new(Position::new(line, start), Position::new(line, end))
}

pub fn text(line: u32, start: u32, end: u32) -> PointerTarget {
    PointerTarget::ContentText {
        range: Some(range(line, start, end)),
    }
}

pub fn gutter(line: u32) -> PointerTarget {
    PointerTarget::GutterGlyphMargin { line: Some(line) }
}

pub fn over_content_hover() -> PointerTarget {
    PointerTarget::ContentWidget(HitWidget::ContentHover)
}

pub fn over_glyph_hover() -> PointerTarget {
    PointerTarget::OverlayWidget(HitWidget::GlyphHover)
}

pub fn move_to(target: PointerTarget) -> EditorEvent {
    EditorEvent::PointerMove(PointerEvent::at(target))
}

pub fn down_on(target: PointerTarget) -> EditorEvent {
    EditorEvent::PointerDown(PointerEvent::at(target).with_button(core_events::MouseButton::Left))
}

pub fn up() -> EditorEvent {
    EditorEvent::PointerUp(PointerEvent::at(PointerTarget::Other))
}

pub fn key(token: KeyToken) -> EditorEvent {
    EditorEvent::KeyDown(KeyEventExt::new(token))
}

pub fn esc() -> EditorEvent {
    key(KeyToken::Named(NamedKey::Esc))
}

pub fn modifier(m: ModifierKey) -> EditorEvent {
    key(KeyToken::Named(NamedKey::Modifier(m)))
}
