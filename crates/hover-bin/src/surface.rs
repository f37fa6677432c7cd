//! Host side of the hover contract: listener bookkeeping, caret and options.

use crate::document::Document;
use core_config::EditorOptions;
use core_events::{Position, Signal};
use core_hover::{DefinitionLookup, EditorSurface, PendingLookup, SubscriptionId};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, trace};

/// State the event loop and the controller's surface handle share.
#[derive(Debug, Default)]
pub struct SurfaceState {
    pub options: EditorOptions,
    pub caret: Option<Position>,
    live: BTreeMap<SubscriptionId, Signal>,
    next_id: u64,
}

impl SurfaceState {
    pub fn new(options: EditorOptions, caret: Position) -> Self {
        Self {
            options,
            caret: Some(caret),
            ..Self::default()
        }
    }

    /// Union of the signals with at least one live listener.
    pub fn live_signals(&self) -> Signal {
        self.live.values().fold(Signal::empty(), |acc, s| acc | *s)
    }

    pub fn is_subscribed(&self, signal: Signal) -> bool {
        self.live_signals().contains(signal)
    }
}

pub type SharedSurface = Rc<RefCell<SurfaceState>>;

/// Handle given to the controller.
pub struct TerminalSurface {
    state: SharedSurface,
}

impl TerminalSurface {
    pub fn new(state: SharedSurface) -> Self {
        Self { state }
    }
}

impl EditorSurface for TerminalSurface {
    fn subscribe(&mut self, signal: Signal) -> SubscriptionId {
        let mut s = self.state.borrow_mut();
        s.next_id += 1;
        let id = SubscriptionId(s.next_id);
        s.live.insert(id, signal);
        trace!(target: "runtime", ?signal, id = id.0, "listener_added");
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        if let Some(signal) = self.state.borrow_mut().live.remove(&id) {
            trace!(target: "runtime", ?signal, id = id.0, "listener_removed");
        }
    }

    fn options(&self) -> EditorOptions {
        self.state.borrow().options
    }

    fn caret(&self) -> Option<Position> {
        self.state.borrow().caret
    }
}

/// Definition lookups answered straight from the in-memory document: the word
/// under the caret is searched for as an `fn` item. The lookup settles whether or
/// not an item is found.
pub struct DocumentDefinitions {
    pub doc: Rc<Document>,
}

impl DefinitionLookup for DocumentDefinitions {
    fn start_find_definition_from_cursor(&self, position: Position) -> Option<PendingLookup> {
        let range = self.doc.word_range(position)?;
        let word = self.doc.text_in(range)?;
        let needle = format!("fn {word}");
        let found = (1..=self.doc.line_count())
            .find(|l| self.doc.line(*l).is_some_and(|text| text.contains(&needle)));
        debug!(target: "runtime", %word, definition_line = ?found, "definition_lookup");
        let (done, pending) = PendingLookup::channel();
        done.complete();
        Some(pending)
    }
}
