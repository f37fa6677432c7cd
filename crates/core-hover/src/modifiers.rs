//! Keyboard modifiers held while the pointer produced an event.

use core_events::{ModMask, PointerEvent};

bitflags::bitflags! {
    /// Modifier set forwarded to the content hover with mouse-sourced requests.
    ///
    /// `META` stands for the platform command key: terminals report it either as
    /// meta or as super, and hover content treats both the same.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct HoverModifiers: u8 {
        const CTRL = 1;
        const ALT = 2;
        const SHIFT = 4;
        const META = 8;
    }
}

/// Derive the active modifier set from a pointer event.
pub fn modifiers_from_pointer(event: &PointerEvent) -> HoverModifiers {
    let mut out = HoverModifiers::empty();
    if event.mods.contains(ModMask::CTRL) {
        out |= HoverModifiers::CTRL;
    }
    if event.mods.contains(ModMask::ALT) {
        out |= HoverModifiers::ALT;
    }
    if event.mods.contains(ModMask::SHIFT) {
        out |= HoverModifiers::SHIFT;
    }
    if event.mods.intersects(ModMask::META | ModMask::SUPER) {
        out |= HoverModifiers::META;
    }
    out
}
