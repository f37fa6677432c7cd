use crate::key_token::map_mod_mask;
use core_events::{EditorEvent, MouseButton, PointerEvent, PointerTarget};
use crossterm::event::{MouseButton as CMouseButton, MouseEvent as CMouseEvent, MouseEventKind};
use tracing::trace;

/// Layout-aware classification of a terminal cell.
///
/// The host owns text layout, gutter geometry and widget placement, so it is the
/// only party able to say what lies under a given cell.
pub trait HitTester {
    fn hit(&self, column: u16, row: u16) -> PointerTarget;
}

impl<F> HitTester for F
where
    F: Fn(u16, u16) -> PointerTarget,
{
    fn hit(&self, column: u16, row: u16) -> PointerTarget {
        self(column, row)
    }
}

/// Translate a crossterm mouse event into a pointer event.
///
/// Wheel events return `None`: scrolling reaches the hover controller as a
/// scroll-offset change once the host has applied it.
pub fn map_mouse_event(event: &CMouseEvent, hit: &dyn HitTester) -> Option<EditorEvent> {
    let build = |button: Option<CMouseButton>| {
        let mut ev = PointerEvent::at(hit.hit(event.column, event.row))
            .with_mods(map_mod_mask(event.modifiers));
        ev.column = event.column;
        ev.row = event.row;
        ev.button = button.map(map_button);
        ev
    };
    let mapped = match event.kind {
        MouseEventKind::Down(b) => EditorEvent::PointerDown(build(Some(b))),
        MouseEventKind::Up(b) => EditorEvent::PointerUp(build(Some(b))),
        MouseEventKind::Drag(b) => EditorEvent::PointerMove(build(Some(b))),
        MouseEventKind::Moved => EditorEvent::PointerMove(build(None)),
        MouseEventKind::ScrollDown
        | MouseEventKind::ScrollUp
        | MouseEventKind::ScrollLeft
        | MouseEventKind::ScrollRight => return None,
    };
    trace!(
        target: "input.mouse",
        column = event.column,
        row = event.row,
        signal = ?mapped.signal(),
        "mouse_mapped"
    );
    Some(mapped)
}

fn map_button(b: CMouseButton) -> MouseButton {
    match b {
        CMouseButton::Left => MouseButton::Left,
        CMouseButton::Right => MouseButton::Right,
        CMouseButton::Middle => MouseButton::Middle,
    }
}
