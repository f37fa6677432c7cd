//! Hover arbitration state machine.
//!
//! One [`HoverController`] exists per editor surface. It consumes routed
//! [`EditorEvent`]s and decides which of the two hover widgets is showing. All
//! transitions run synchronously inside [`HoverController::handle_event`]; the
//! controller never waits on anything.
//!
//! Pointer-move rules, evaluated top to bottom (first match wins):
//! 1. mouse held after pressing inside the content hover while its color picker
//!    is open: ignored
//! 2. sticky hover and the pointer is over the hover that is showing: ignored
//! 3. pinned: ignored
//! 4. content-empty within half a character of text counts as content-text
//! 5. content-text: hide glyph hover, request a delayed content hover
//! 6. glyph margin: hide content hover, request an immediate glyph hover
//! 7. anything else: hide both
//!
//! Every guarded hide goes through [`HoverController::hide_content_hover`]'s
//! guard: it is a no-op before the widgets exist and while a color-picker drag
//! is in progress; otherwise it hides both widgets and unpins.

use crate::definition::{DefinitionLookup, PendingLookup};
use crate::hooks::{EditorSurface, EventHookManager, HookProfile, Route, SubscriptionId};
use crate::modifiers::{HoverModifiers, modifiers_from_pointer};
use crate::widgets::{
    DisplayRequest, HoverAnchor, HoverSource, LazyWidgets, StartMode, WidgetFactory,
};
use core_config::EditorOptions;
use core_events::{
    ChangedOptions, ConfigChange, EditorEvent, HitWidget, KeyEventExt, PointerEvent,
    PointerTarget, Position, ScrollChange, Signal, TextRange,
};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, info, trace};

/// Collaborators handed to a controller at construction.
pub struct HoverDeps {
    pub surface: Box<dyn EditorSurface>,
    pub widgets: WidgetFactory,
    pub definitions: Option<Rc<dyn DefinitionLookup>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoverState {
    Hidden,
    ShowingContent,
    ShowingGlyph,
}

/// Read handle on the "hover is visible" flag shared with the rest of the editor.
#[derive(Debug, Clone, Default)]
pub struct HoverVisibility(Rc<Cell<bool>>);

impl HoverVisibility {
    pub fn is_visible(&self) -> bool {
        self.0.get()
    }

    fn set(&self, visible: bool) {
        self.0.set(visible);
    }
}

/// Point-in-time view of the controller's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverSnapshot {
    pub state: HoverState,
    pub pinned: bool,
    pub pointer_down: bool,
    pub clicked_on_content_widget: bool,
    pub enabled: bool,
    pub sticky: bool,
    pub profile: Option<HookProfile>,
}

pub struct HoverController {
    surface: Box<dyn EditorSurface>,
    widgets: LazyWidgets,
    hooks: EventHookManager,
    definitions: Option<Rc<dyn DefinitionLookup>>,
    config_subscription: Option<SubscriptionId>,
    enabled: bool,
    sticky_config: bool,
    pointer_down: bool,
    clicked_on_content_widget: bool,
    pinned: bool,
    state: HoverState,
    visibility: HoverVisibility,
}

fn is_over(target: &PointerTarget, widget: HitWidget) -> bool {
    matches!(
        target,
        PointerTarget::ContentWidget(w) | PointerTarget::OverlayWidget(w) if *w == widget
    )
}

fn ignore(reason: &'static str) {
    trace!(target: "hover.controller", reason, "event_ignored");
}

impl HoverController {
    pub fn new(deps: HoverDeps) -> Self {
        let HoverDeps {
            mut surface,
            widgets,
            definitions,
        } = deps;
        let options = surface.options();
        let config_subscription = Some(surface.subscribe(Signal::CONFIG_CHANGED));
        let mut hooks = EventHookManager::new();
        hooks.hook(
            surface.as_mut(),
            options.hover_enabled,
            options.hover_sticky,
        );
        info!(
            target: "hover.controller",
            enabled = options.hover_enabled,
            sticky = options.hover_sticky,
            "controller_created"
        );
        Self {
            surface,
            widgets: LazyWidgets::new(widgets),
            hooks,
            definitions,
            config_subscription,
            enabled: options.hover_enabled,
            sticky_config: options.hover_sticky,
            pointer_down: false,
            clicked_on_content_widget: false,
            pinned: false,
            state: HoverState::Hidden,
            visibility: HoverVisibility::default(),
        }
    }

    /// Route one event through the current hook cycle.
    pub fn handle_event(&mut self, event: &EditorEvent) {
        if let EditorEvent::ConfigChanged(change) = event {
            if self.config_subscription.is_some() {
                self.on_config_changed(*change);
            }
            return;
        }
        let Some(route) = self.hooks.route(event.signal()) else {
            return;
        };
        match (route, event) {
            (Route::PointerDown, EditorEvent::PointerDown(p)) => self.on_pointer_down(p),
            (Route::PointerUp, EditorEvent::PointerUp(_)) => self.pointer_down = false,
            (Route::PointerMove, EditorEvent::PointerMove(p)) => self.on_pointer_move(p),
            (Route::PointerMoveHide, EditorEvent::PointerMove(p)) => {
                self.on_pointer_move_disabled(p)
            }
            (Route::KeyDown, EditorEvent::KeyDown(k)) => self.on_key_down(k),
            (Route::ScrollChanged, EditorEvent::ScrollChanged(c)) => self.on_scroll_changed(*c),
            (Route::DecorationsChanged, _) => self.on_decorations_changed(),
            (Route::ContentHoverBlur, _) => self.on_content_hover_blur(),
            (Route::PointerLeave, _) | (Route::ModelChanged, _) => self.hide_widgets(),
            (route, _) => trace!(target: "hover.controller", ?route, "route_mismatch"),
        }
    }

    fn on_pointer_down(&mut self, ev: &PointerEvent) {
        self.pointer_down = true;
        if is_over(&ev.target, HitWidget::ContentHover) {
            // Interacting with the hover itself (links, color swatches).
            self.clicked_on_content_widget = true;
            ignore("pressed_content_hover");
            return;
        }
        if is_over(&ev.target, HitWidget::GlyphHover) {
            ignore("pressed_glyph_hover");
            return;
        }
        self.clicked_on_content_widget = false;
        self.hide_widgets();
    }

    fn on_pointer_move(&mut self, ev: &PointerEvent) {
        if self.is_color_picker_drag() {
            ignore("color_picker_drag");
            return;
        }
        if self.sticky_config && self.is_over_showing_hover(&ev.target) {
            ignore("over_sticky_hover");
            return;
        }
        if self.pinned {
            ignore("pinned");
            return;
        }
        match self.classify(ev.target) {
            PointerTarget::ContentText { range } => {
                self.hide_glyph();
                if self.enabled
                    && let Some(range) = range
                {
                    self.display(DisplayRequest {
                        anchor: HoverAnchor::Range(range),
                        mode: StartMode::Delayed,
                        focus: false,
                        source: HoverSource::Mouse,
                        modifiers: modifiers_from_pointer(ev),
                        pinned: false,
                    });
                }
            }
            PointerTarget::GutterGlyphMargin { line } => {
                self.hide_content();
                if self.enabled
                    && let Some(line) = line
                {
                    self.display(DisplayRequest {
                        anchor: HoverAnchor::Line(line),
                        mode: StartMode::Immediate,
                        focus: false,
                        source: HoverSource::Mouse,
                        modifiers: modifiers_from_pointer(ev),
                        pinned: false,
                    });
                }
            }
            _ => self.hide_widgets(),
        }
    }

    fn on_pointer_move_disabled(&mut self, ev: &PointerEvent) {
        if self.pinned {
            ignore("pinned");
            return;
        }
        if is_over(&ev.target, HitWidget::ContentHover) || is_over(&ev.target, HitWidget::GlyphHover)
        {
            ignore("over_hover_widget");
            return;
        }
        self.hide_widgets();
    }

    fn on_key_down(&mut self, key: &KeyEventExt) {
        if self.pinned && !key.token.is_escape() {
            ignore("pinned");
            return;
        }
        if key.token.is_modifier_only() {
            // Holding a modifier (e.g. for link styling) keeps the hover.
            ignore("modifier_only");
            return;
        }
        self.hide_widgets();
    }

    fn on_content_hover_blur(&mut self) {
        if self.pinned {
            self.hide_widgets();
        }
    }

    fn on_scroll_changed(&mut self, change: ScrollChange) {
        if change.offset_changed() {
            self.hide_widgets();
        }
    }

    fn on_decorations_changed(&mut self) {
        if let Some(pair) = self.widgets.existing() {
            pair.content.on_model_decorations_changed();
            pair.glyph.on_model_decorations_changed();
        }
    }

    fn on_config_changed(&mut self, change: ConfigChange) {
        if !change.has_changed(ChangedOptions::HOVER) {
            return;
        }
        let options = self.surface.options();
        self.hide_widgets();
        self.hooks.unhook(self.surface.as_mut());
        // The pointer-up listener that would clear these went away with the old cycle.
        self.pointer_down = false;
        self.clicked_on_content_widget = false;
        self.enabled = options.hover_enabled;
        self.sticky_config = options.hover_sticky;
        self.hooks
            .hook(self.surface.as_mut(), self.enabled, self.sticky_config);
        info!(
            target: "hover.controller",
            enabled = self.enabled,
            sticky = self.sticky_config,
            "rehooked_after_config_change"
        );
    }

    /// Content-empty positions just past the end of text count as text.
    fn classify(&self, target: PointerTarget) -> PointerTarget {
        if let PointerTarget::ContentEmpty {
            range,
            horizontal_distance_to_text: Some(distance),
            is_after_lines: false,
        } = target
        {
            let epsilon = self.surface.options().typical_halfwidth_character_width / 2.0;
            if distance < epsilon {
                return PointerTarget::ContentText { range };
            }
        }
        target
    }

    fn is_over_showing_hover(&self, target: &PointerTarget) -> bool {
        match self.state {
            HoverState::ShowingContent => is_over(target, HitWidget::ContentHover),
            HoverState::ShowingGlyph => is_over(target, HitWidget::GlyphHover),
            HoverState::Hidden => false,
        }
    }

    fn is_color_picker_drag(&self) -> bool {
        self.pointer_down
            && self.clicked_on_content_widget
            && self
                .widgets
                .existing_ref()
                .is_some_and(|pair| pair.content.is_color_picker_visible())
    }

    fn display(&mut self, request: DisplayRequest) {
        let Some(pair) = self.widgets.ensure() else {
            return;
        };
        let next = match request.anchor {
            HoverAnchor::Range(_) => {
                pair.content.start_showing_at(&request);
                HoverState::ShowingContent
            }
            HoverAnchor::Line(line) => {
                pair.glyph.start_showing_at(line);
                HoverState::ShowingGlyph
            }
        };
        debug!(
            target: "hover.controller",
            anchor = ?request.anchor,
            mode = ?request.mode,
            source = ?request.source,
            focus = request.focus,
            pinned = request.pinned,
            "display_requested"
        );
        self.set_state(next);
    }

    fn hide_glyph(&mut self) {
        if let Some(pair) = self.widgets.ensure() {
            pair.glyph.hide();
        }
        if self.state == HoverState::ShowingGlyph {
            self.set_state(HoverState::Hidden);
        }
    }

    fn hide_content(&mut self) {
        if let Some(pair) = self.widgets.ensure() {
            pair.content.hide();
        }
        if self.state == HoverState::ShowingContent {
            self.set_state(HoverState::Hidden);
        }
    }

    fn hide_widgets(&mut self) {
        let color_picker_drag = self.is_color_picker_drag();
        let Some(pair) = self.widgets.existing() else {
            ignore("widgets_not_created");
            return;
        };
        if color_picker_drag {
            ignore("color_picker_drag");
            return;
        }
        pair.glyph.hide();
        pair.content.hide();
        self.pinned = false;
        self.set_state(HoverState::Hidden);
    }

    fn set_state(&mut self, next: HoverState) {
        if self.state != next {
            debug!(
                target: "hover.controller",
                from = ?self.state,
                to = ?next,
                pinned = self.pinned,
                "state_changed"
            );
        }
        self.state = next;
        self.visibility.set(next != HoverState::Hidden);
    }

    // ---------------------------------------------------------------------------------------------
    // Programmatic surface
    // ---------------------------------------------------------------------------------------------

    /// Show the content hover at `range`, bypassing the pointer rules.
    /// `sticky` pins the hover until an explicit hide.
    pub fn show_content_hover(
        &mut self,
        range: TextRange,
        mode: StartMode,
        focus: bool,
        sticky: bool,
    ) {
        self.show_content_hover_from(HoverSource::Action, range, mode, focus, sticky);
    }

    /// [`Self::show_content_hover`] with an explicit request source, for hosts
    /// that bind their own keys.
    pub fn show_content_hover_from(
        &mut self,
        source: HoverSource,
        range: TextRange,
        mode: StartMode,
        focus: bool,
        sticky: bool,
    ) {
        if self.widgets.ensure().is_none() {
            debug!(target: "hover.controller", "show_after_dispose_ignored");
            return;
        }
        self.pinned = sticky;
        self.hide_glyph();
        self.display(DisplayRequest {
            anchor: HoverAnchor::Range(range),
            mode,
            focus,
            source,
            modifiers: HoverModifiers::empty(),
            pinned: sticky,
        });
    }

    /// Explicit hide; the only way to clear a pinned hover besides Escape / blur.
    pub fn hide_content_hover(&mut self) {
        self.hide_widgets();
    }

    pub fn is_color_picker_visible(&self) -> bool {
        self.widgets
            .existing_ref()
            .is_some_and(|pair| pair.content.is_color_picker_visible())
    }

    pub fn is_hover_visible(&self) -> bool {
        self.visibility.is_visible()
    }

    pub fn visibility(&self) -> HoverVisibility {
        self.visibility.clone()
    }

    pub fn options(&self) -> EditorOptions {
        self.surface.options()
    }

    pub fn caret(&self) -> Option<Position> {
        self.surface.caret()
    }

    /// Ask the definition collaborator to resolve the symbol at `position`.
    pub fn start_definition_lookup(&self, position: Position) -> Option<PendingLookup> {
        self.definitions
            .as_ref()?
            .start_find_definition_from_cursor(position)
    }

    pub fn snapshot(&self) -> HoverSnapshot {
        HoverSnapshot {
            state: self.state,
            pinned: self.pinned,
            pointer_down: self.pointer_down,
            clicked_on_content_widget: self.clicked_on_content_widget,
            enabled: self.enabled,
            sticky: self.sticky_config,
            profile: self.hooks.profile(),
        }
    }

    /// Release every subscription and both widgets. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.hooks.unhook(self.surface.as_mut());
        if let Some(id) = self.config_subscription.take() {
            self.surface.unsubscribe(id);
            debug!(target: "hover.controller", "controller_disposed");
        }
        self.widgets.dispose();
        self.pinned = false;
        self.set_state(HoverState::Hidden);
    }
}

impl Drop for HoverController {
    fn drop(&mut self) {
        self.dispose();
    }
}
