//! Hover widget interfaces and the lazy holder that owns them.
//!
//! Both widgets are created together on first need and torn down together with
//! the controller. The holder consumes its factory on creation, so a controller
//! can never build a second pair.

use crate::modifiers::HoverModifiers;
use core_events::TextRange;
use tracing::debug;

/// How eagerly the content pipeline should populate a requested hover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StartMode {
    /// Content may be computed after the pipeline's hover delay.
    Delayed,
    /// Content is requested with no deliberate delay.
    Immediate,
}

/// What initiated a display request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoverSource {
    Mouse,
    Keyboard,
    Action,
}

/// Where a hover is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoverAnchor {
    Range(TextRange),
    Line(u32),
}

/// A single show request. Built per trigger, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayRequest {
    pub anchor: HoverAnchor,
    pub mode: StartMode,
    pub focus: bool,
    pub source: HoverSource,
    pub modifiers: HoverModifiers,
    pub pinned: bool,
}

/// Range-anchored tooltip. Rendering and content computation live behind it.
pub trait ContentHoverWidget {
    /// Begin showing at `request.anchor`. A later call supersedes any pending one.
    fn start_showing_at(&mut self, request: &DisplayRequest);
    fn hide(&mut self);
    /// Whether an embedded color picker is currently open.
    fn is_color_picker_visible(&self) -> bool;
    fn on_model_decorations_changed(&mut self);
    fn dispose(&mut self) {}
}

/// Gutter-anchored tooltip.
pub trait GlyphHoverWidget {
    fn start_showing_at(&mut self, line: u32);
    fn hide(&mut self);
    fn on_model_decorations_changed(&mut self);
    fn dispose(&mut self) {}
}

/// The two widgets of one surface.
pub struct WidgetPair {
    pub content: Box<dyn ContentHoverWidget>,
    pub glyph: Box<dyn GlyphHoverWidget>,
}

impl WidgetPair {
    pub fn new(
        content: impl ContentHoverWidget + 'static,
        glyph: impl GlyphHoverWidget + 'static,
    ) -> Self {
        Self {
            content: Box::new(content),
            glyph: Box::new(glyph),
        }
    }
}

/// Builds the widget pair on first use.
pub type WidgetFactory = Box<dyn FnOnce() -> WidgetPair>;

enum Slot {
    Pending(WidgetFactory),
    Created(WidgetPair),
    Disposed,
}

/// Own-and-create-on-first-use holder for the widget pair.
pub struct LazyWidgets {
    slot: Slot,
}

impl LazyWidgets {
    pub fn new(factory: WidgetFactory) -> Self {
        Self {
            slot: Slot::Pending(factory),
        }
    }

    /// Return the pair, constructing both widgets on the first call.
    /// `None` once disposed.
    pub fn ensure(&mut self) -> Option<&mut WidgetPair> {
        if matches!(self.slot, Slot::Pending(_))
            && let Slot::Pending(factory) = std::mem::replace(&mut self.slot, Slot::Disposed)
        {
            debug!(target: "hover.widgets", "widgets_created");
            self.slot = Slot::Created(factory());
        }
        self.existing()
    }

    /// The pair if it has already been created; never constructs.
    pub fn existing(&mut self) -> Option<&mut WidgetPair> {
        match &mut self.slot {
            Slot::Created(pair) => Some(pair),
            Slot::Pending(_) | Slot::Disposed => None,
        }
    }

    pub fn existing_ref(&self) -> Option<&WidgetPair> {
        match &self.slot {
            Slot::Created(pair) => Some(pair),
            Slot::Pending(_) | Slot::Disposed => None,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self.slot, Slot::Created(_))
    }

    /// Dispose both widgets (if they were ever created). Idempotent.
    pub fn dispose(&mut self) {
        match std::mem::replace(&mut self.slot, Slot::Disposed) {
            Slot::Created(mut pair) => {
                pair.content.dispose();
                pair.glyph.dispose();
                debug!(target: "hover.widgets", "widgets_disposed");
            }
            Slot::Pending(_) | Slot::Disposed => {}
        }
    }
}
