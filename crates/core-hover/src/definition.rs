//! Definition-lookup collaborator used by the definition preview hover.

use core_events::Position;
use tokio::sync::oneshot;

/// Resolves the symbol under a position. Only completion matters to the hover
/// controller; the lookup keeps its own results.
pub trait DefinitionLookup {
    /// Start a lookup at `position`. `None` means nothing needed to be resolved
    /// and the preview may be shown right away.
    fn start_find_definition_from_cursor(&self, position: Position) -> Option<PendingLookup>;
}

/// Completion side of an in-flight lookup.
#[derive(Debug)]
pub struct LookupCompleter {
    tx: oneshot::Sender<()>,
}

impl LookupCompleter {
    pub fn complete(self) {
        // The waiting side may already be gone (surface closed); nothing to do then.
        let _ = self.tx.send(());
    }
}

/// Waiting side of an in-flight lookup.
#[derive(Debug)]
pub struct PendingLookup {
    rx: oneshot::Receiver<()>,
}

/// Why a pending lookup ended without completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupAbandoned;

impl PendingLookup {
    pub fn channel() -> (LookupCompleter, PendingLookup) {
        let (tx, rx) = oneshot::channel();
        (LookupCompleter { tx }, PendingLookup { rx })
    }

    /// Wait for the lookup to settle. A completer dropped without calling
    /// [`LookupCompleter::complete`] counts as a failed lookup.
    pub async fn settled(self) -> Result<(), LookupAbandoned> {
        self.rx.await.map_err(|_| LookupAbandoned)
    }
}
