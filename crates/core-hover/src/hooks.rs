//! Input-source subscriptions for one hover controller.
//!
//! A hook cycle installs one [`ListenerGroup`] whose contents depend only on
//! whether hover is enabled. Releasing the group drops every subscription it
//! holds in one call; re-hooking always builds a fresh group.
//!
//! | Signal              | Enabled profile     | Disabled profile      |
//! |---------------------|---------------------|-----------------------|
//! | pointer down / up   | arbitrate           | -                     |
//! | pointer move        | arbitrate           | hide unless pinned    |
//! | key down            | arbitrate           | -                     |
//! | decorations changed | forward to widgets  | -                     |
//! | content hover blur  | hide when pinned    | -                     |
//! | pointer leave       | hide                | hide                  |
//! | model changed       | hide                | hide                  |
//! | scroll changed      | hide on offset move | hide on offset move   |

use core_config::EditorOptions;
use core_events::{Position, Signal};
use tracing::{debug, trace};

/// Handle for one installed listener, issued by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Editor surface capabilities consumed by the hover controller.
pub trait EditorSurface {
    /// Start delivering events of `signal` (exactly one flag) to the controller.
    fn subscribe(&mut self, signal: Signal) -> SubscriptionId;
    fn unsubscribe(&mut self, id: SubscriptionId);
    fn options(&self) -> EditorOptions;
    /// Primary caret, `None` when the surface has no model attached.
    fn caret(&self) -> Option<Position>;
}

/// Which listener set is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookProfile {
    Enabled,
    Disabled,
}

/// Handler a hooked signal is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    PointerDown,
    PointerUp,
    PointerMove,
    /// Disabled-profile pointer move: plain hide, no hover requests.
    PointerMoveHide,
    PointerLeave,
    KeyDown,
    ScrollChanged,
    ModelChanged,
    DecorationsChanged,
    ContentHoverBlur,
}

const COMMON_ROUTES: [(Signal, Route); 3] = [
    (Signal::POINTER_LEAVE, Route::PointerLeave),
    (Signal::MODEL_CHANGED, Route::ModelChanged),
    (Signal::SCROLL_CHANGED, Route::ScrollChanged),
];

const ENABLED_ROUTES: [(Signal, Route); 6] = [
    (Signal::POINTER_DOWN, Route::PointerDown),
    (Signal::POINTER_UP, Route::PointerUp),
    (Signal::POINTER_MOVE, Route::PointerMove),
    (Signal::KEY_DOWN, Route::KeyDown),
    (Signal::DECORATIONS_CHANGED, Route::DecorationsChanged),
    (Signal::CONTENT_HOVER_BLUR, Route::ContentHoverBlur),
];

const DISABLED_ROUTES: [(Signal, Route); 1] = [(Signal::POINTER_MOVE, Route::PointerMoveHide)];

impl HookProfile {
    pub fn for_enabled(enabled: bool) -> Self {
        if enabled {
            HookProfile::Enabled
        } else {
            HookProfile::Disabled
        }
    }

    fn routes(self) -> impl Iterator<Item = (Signal, Route)> {
        let specific: &'static [(Signal, Route)] = match self {
            HookProfile::Enabled => &ENABLED_ROUTES,
            HookProfile::Disabled => &DISABLED_ROUTES,
        };
        specific.iter().chain(COMMON_ROUTES.iter()).copied()
    }
}

/// Every subscription of one hook cycle.
#[derive(Debug)]
pub struct ListenerGroup {
    profile: HookProfile,
    entries: Vec<(Signal, SubscriptionId, Route)>,
}

impl ListenerGroup {
    fn install(surface: &mut dyn EditorSurface, profile: HookProfile) -> Self {
        let entries = profile
            .routes()
            .map(|(signal, route)| (signal, surface.subscribe(signal), route))
            .collect();
        Self { profile, entries }
    }

    pub fn signals(&self) -> Signal {
        self.entries
            .iter()
            .fold(Signal::empty(), |acc, (signal, _, _)| acc | *signal)
    }

    fn route(&self, signal: Signal) -> Option<Route> {
        self.entries
            .iter()
            .find(|(s, _, _)| *s == signal)
            .map(|(_, _, route)| *route)
    }

    fn release(self, surface: &mut dyn EditorSurface) {
        for (_, id, _) in self.entries {
            surface.unsubscribe(id);
        }
    }
}

/// Installs and tears down the listener group of the current hook cycle.
#[derive(Debug, Default)]
pub struct EventHookManager {
    active: Option<ListenerGroup>,
}

impl EventHookManager {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Install the listener set for the given flags, replacing any previous cycle.
    pub fn hook(&mut self, surface: &mut dyn EditorSurface, enabled: bool, sticky: bool) {
        self.unhook(surface);
        let profile = HookProfile::for_enabled(enabled);
        let group = ListenerGroup::install(surface, profile);
        debug!(
            target: "hover.hooks",
            ?profile,
            sticky,
            signals = ?group.signals(),
            "hooked"
        );
        self.active = Some(group);
    }

    /// Remove every listener of the current cycle. Idempotent.
    pub fn unhook(&mut self, surface: &mut dyn EditorSurface) {
        if let Some(group) = self.active.take() {
            let profile = group.profile;
            group.release(surface);
            debug!(target: "hover.hooks", ?profile, "unhooked");
        }
    }

    pub fn profile(&self) -> Option<HookProfile> {
        self.active.as_ref().map(|g| g.profile)
    }

    pub fn signals(&self) -> Signal {
        self.active
            .as_ref()
            .map_or(Signal::empty(), ListenerGroup::signals)
    }

    /// Handler for `signal` under the current cycle, `None` when not hooked.
    pub fn route(&self, signal: Signal) -> Option<Route> {
        let route = self.active.as_ref().and_then(|g| g.route(signal));
        if route.is_none() {
            trace!(target: "hover.hooks", ?signal, "signal_not_hooked");
        }
        route
    }
}
