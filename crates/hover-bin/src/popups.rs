//! Terminal renditions of the two hover widgets.
//!
//! The widgets only record what should be on screen into a shared
//! [`PopupLayer`]; the draw pass and the hit tester read it back.

use crate::document::{Document, TEXT_ORIGIN, Viewport};
use core_events::{HitWidget, TextRange};
use core_hover::{
    ContentHoverWidget, DisplayRequest, GlyphHoverWidget, HoverAnchor, StartMode, WidgetPair,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub column: u16,
    pub row: u16,
    pub width: u16,
}

impl Rect {
    pub fn contains(&self, column: u16, row: u16) -> bool {
        row == self.row && column >= self.column && column < self.column.saturating_add(self.width)
    }
}

/// What each hover wants drawn.
#[derive(Debug, Default)]
pub struct PopupLayer {
    pub content: Option<DisplayRequest>,
    pub glyph: Option<u32>,
    /// Bumped on every decoration refresh.
    pub decorations_epoch: u32,
}

impl PopupLayer {
    pub fn content_label(&self, doc: &Document) -> Option<String> {
        let request = self.content?;
        let HoverAnchor::Range(range) = request.anchor else {
            return None;
        };
        let word = doc
            .text_in(range)
            .filter(|w| !w.is_empty())
            .unwrap_or_else(|| "<caret>".to_string());
        let mode = match request.mode {
            StartMode::Delayed => "delayed",
            StartMode::Immediate => "immediate",
        };
        let pin = if request.pinned { " [pinned]" } else { "" };
        Some(format!(" {word} @ {} ({mode}, {:?}){pin} ", range.start, request.source))
    }

    pub fn glyph_label(&self, doc: &Document) -> Option<String> {
        let line = self.glyph?;
        let note = if doc.has_glyph(line) {
            "breakpoint"
        } else {
            "no decorations"
        };
        Some(format!(" line {line}: {note} "))
    }

    pub fn content_rect(&self, doc: &Document, viewport: &Viewport) -> Option<Rect> {
        let label = self.content_label(doc)?;
        let HoverAnchor::Range(TextRange { start, .. }) = self.content?.anchor else {
            return None;
        };
        let row = viewport.row_of_line(start.line)?.checked_add(1)?;
        if row >= viewport.text_rows() {
            return None;
        }
        let column = viewport.column_of(start.column).unwrap_or(TEXT_ORIGIN);
        Some(Rect {
            column,
            row,
            width: label.chars().count() as u16,
        })
    }

    pub fn glyph_rect(&self, doc: &Document, viewport: &Viewport) -> Option<Rect> {
        let label = self.glyph_label(doc)?;
        let row = viewport.row_of_line(self.glyph?)?;
        Some(Rect {
            column: 2,
            row,
            width: label.chars().count() as u16,
        })
    }

    pub fn hit(
        &self,
        column: u16,
        row: u16,
        doc: &Document,
        viewport: &Viewport,
    ) -> Option<HitWidget> {
        if self
            .content_rect(doc, viewport)
            .is_some_and(|r| r.contains(column, row))
        {
            return Some(HitWidget::ContentHover);
        }
        self.glyph_rect(doc, viewport)
            .is_some_and(|r| r.contains(column, row))
            .then_some(HitWidget::GlyphHover)
    }
}

pub type SharedLayer = Rc<RefCell<PopupLayer>>;

struct TerminalContentHover {
    layer: SharedLayer,
}

impl ContentHoverWidget for TerminalContentHover {
    fn start_showing_at(&mut self, request: &DisplayRequest) {
        self.layer.borrow_mut().content = Some(*request);
    }

    fn hide(&mut self) {
        self.layer.borrow_mut().content = None;
    }

    // The terminal rendition has no color decorations.
    fn is_color_picker_visible(&self) -> bool {
        false
    }

    fn on_model_decorations_changed(&mut self) {
        self.layer.borrow_mut().decorations_epoch += 1;
    }

    fn dispose(&mut self) {
        debug!(target: "hover.widgets", widget = "content", "disposed");
        self.hide();
    }
}

struct TerminalGlyphHover {
    layer: SharedLayer,
}

impl GlyphHoverWidget for TerminalGlyphHover {
    fn start_showing_at(&mut self, line: u32) {
        self.layer.borrow_mut().glyph = Some(line);
    }

    fn hide(&mut self) {
        self.layer.borrow_mut().glyph = None;
    }

    fn on_model_decorations_changed(&mut self) {}

    fn dispose(&mut self) {
        debug!(target: "hover.widgets", widget = "glyph", "disposed");
        self.hide();
    }
}

/// Build both widgets over `layer`. Called lazily by the controller.
pub fn terminal_widgets(layer: SharedLayer) -> WidgetPair {
    debug!(target: "hover.widgets", "terminal_widgets_created");
    WidgetPair::new(
        TerminalContentHover {
            layer: layer.clone(),
        },
        TerminalGlyphHover { layer },
    )
}
