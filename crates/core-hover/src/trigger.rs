//! Keyboard / command entry points that force a hover without the pointer.
//!
//! Both actions resolve their controller through a [`HoverRegistry`]: an explicit
//! model uri wins, otherwise the focused surface is used. Any resolution failure
//! is logged and the action becomes a no-op.

use crate::controller::HoverController;
use crate::widgets::{HoverSource, StartMode};
use core_events::{Position, TextRange};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;

pub type SharedController = Rc<RefCell<HoverController>>;

/// Identifier of one editor surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u32);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TriggerError {
    #[error("no focused editor surface")]
    NoActiveSurface,
    #[error("no hover controller for {0}")]
    NoController(String),
    #[error("no position to anchor the hover")]
    NoPosition,
    #[error("definition lookup ended without completing")]
    LookupAbandoned,
}

struct Entry {
    controller: SharedController,
    model_uri: Option<String>,
}

/// Surface id → controller map plus the focused surface.
#[derive(Default)]
pub struct HoverRegistry {
    entries: BTreeMap<SurfaceId, Entry>,
    focused: Option<SurfaceId>,
}

impl HoverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: SurfaceId, controller: HoverController) -> SharedController {
        let shared = Rc::new(RefCell::new(controller));
        self.entries.insert(
            id,
            Entry {
                controller: shared.clone(),
                model_uri: None,
            },
        );
        shared
    }

    /// Drop a surface; its controller is disposed immediately.
    pub fn unregister(&mut self, id: SurfaceId) {
        if let Some(entry) = self.entries.remove(&id) {
            entry.controller.borrow_mut().dispose();
        }
        if self.focused == Some(id) {
            self.focused = None;
        }
    }

    pub fn set_focused(&mut self, id: Option<SurfaceId>) {
        self.focused = id;
    }

    /// Record which model a surface currently shows.
    pub fn set_model_uri(&mut self, id: SurfaceId, uri: Option<String>) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.model_uri = uri;
        }
    }

    pub fn get(&self, id: SurfaceId) -> Option<SharedController> {
        self.entries.get(&id).map(|e| e.controller.clone())
    }

    /// Controller for `uri` if given, else for the focused surface.
    pub fn resolve(&self, uri: Option<&str>) -> Result<SharedController, TriggerError> {
        match uri {
            Some(uri) => self
                .entries
                .values()
                .find(|e| e.model_uri.as_deref() == Some(uri))
                .map(|e| e.controller.clone())
                .ok_or_else(|| TriggerError::NoController(uri.to_string())),
            None => {
                let id = self.focused.ok_or(TriggerError::NoActiveSurface)?;
                self.get(id)
                    .ok_or_else(|| TriggerError::NoController(format!("surface {}", id.0)))
            }
        }
    }
}

/// Arguments shared by both hover actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowHoverArgs {
    /// Anchor position; defaults to the caret.
    pub position: Option<Position>,
    /// Model to target; defaults to the focused surface.
    pub uri: Option<String>,
    pub sticky: Option<bool>,
    /// Request source; defaults to [`HoverSource::Action`].
    pub source: Option<HoverSource>,
}

fn resolve_target(
    registry: &HoverRegistry,
    args: &ShowHoverArgs,
) -> Result<(SharedController, TextRange), TriggerError> {
    let controller = registry.resolve(args.uri.as_deref())?;
    let position = match args.position {
        Some(p) => p,
        None => controller
            .borrow()
            .caret()
            .ok_or(TriggerError::NoPosition)?,
    };
    Ok((controller, TextRange::empty_at(position)))
}

/// `editor.action.showHover`: show (and optionally pin) the hover at the caret.
pub struct ShowHoverAction;

impl ShowHoverAction {
    pub const ID: &'static str = "editor.action.showHover";

    pub fn run(registry: &HoverRegistry, args: &ShowHoverArgs) {
        if let Err(err) = Self::try_run(registry, args) {
            debug!(target: "hover.trigger", action = Self::ID, %err, "action_noop");
        }
    }

    pub fn try_run(registry: &HoverRegistry, args: &ShowHoverArgs) -> Result<(), TriggerError> {
        let (controller, range) = resolve_target(registry, args)?;
        let sticky = args.sticky.unwrap_or(false);
        let mut controller = controller.borrow_mut();
        let focus = controller.options().accessibility_active() || sticky;
        debug!(
            target: "hover.trigger",
            action = Self::ID,
            position = %range.start,
            focus,
            sticky,
            "show_hover"
        );
        controller.show_content_hover_from(
            args.source.unwrap_or(HoverSource::Action),
            range,
            StartMode::Immediate,
            focus,
            sticky,
        );
        Ok(())
    }
}

/// `editor.action.showDefinitionPreviewHover`: resolve the definition under the
/// caret first, then show a focused hover once the lookup settles.
pub struct ShowDefinitionPreviewHoverAction;

impl ShowDefinitionPreviewHoverAction {
    pub const ID: &'static str = "editor.action.showDefinitionPreviewHover";

    pub async fn run(registry: &HoverRegistry, args: &ShowHoverArgs) {
        if let Err(err) = Self::try_run(registry, args).await {
            debug!(target: "hover.trigger", action = Self::ID, %err, "action_noop");
        }
    }

    pub async fn try_run(
        registry: &HoverRegistry,
        args: &ShowHoverArgs,
    ) -> Result<(), TriggerError> {
        let (controller, range) = resolve_target(registry, args)?;
        let pending = controller.borrow().start_definition_lookup(range.start);
        if let Some(pending) = pending {
            debug!(target: "hover.trigger", action = Self::ID, "definition_lookup_pending");
            pending
                .settled()
                .await
                .map_err(|_| TriggerError::LookupAbandoned)?;
        }
        let sticky = args.sticky.unwrap_or(false);
        controller.borrow_mut().show_content_hover_from(
            args.source.unwrap_or(HoverSource::Action),
            range,
            StartMode::Immediate,
            true,
            sticky,
        );
        Ok(())
    }
}
