//! core-hover: pointer / keyboard arbitration for the two hover popups of an
//! editor surface.
//!
//! A surface owns exactly one [`HoverController`]. The host feeds it every
//! [`core_events::EditorEvent`] it subscribed to; the controller decides whether
//! the range-anchored content hover or the gutter-anchored glyph hover is
//! showing (never both), when a hover is pinned, and when to hide.
//!
//! Layering (leaf to root):
//! - [`modifiers`]: modifier set carried by mouse-sourced requests
//! - [`widgets`]: widget interfaces and their lazy, paired holder
//! - [`hooks`]: listener groups installed per hover enablement
//! - [`controller`]: the arbitration state machine
//! - [`trigger`]: actions that show a hover without the pointer
//!
//! Rendering, content computation, hover delays and keybinding registration
//! belong to the host and sit behind the traits in [`widgets`] and [`hooks`].

pub mod controller;
pub mod definition;
pub mod hooks;
pub mod modifiers;
pub mod trigger;
pub mod widgets;

pub use controller::{HoverController, HoverDeps, HoverSnapshot, HoverState, HoverVisibility};
pub use definition::{DefinitionLookup, LookupCompleter, PendingLookup};
pub use hooks::{EditorSurface, EventHookManager, HookProfile, SubscriptionId};
pub use modifiers::{HoverModifiers, modifiers_from_pointer};
pub use trigger::{
    HoverRegistry, SharedController, ShowDefinitionPreviewHoverAction, ShowHoverAction,
    ShowHoverArgs, SurfaceId, TriggerError,
};
pub use widgets::{
    ContentHoverWidget, DisplayRequest, GlyphHoverWidget, HoverAnchor, HoverSource, StartMode,
    WidgetFactory, WidgetPair,
};
