//! Terminal input translation for the hover subsystem.
//!
//! Converts raw `crossterm` events into `core-events` values: key presses become
//! [`EditorEvent::KeyDown`], mouse events are hit-tested through a host supplied
//! [`HitTester`] and become pointer events. Terminal focus loss is surfaced as a
//! pointer leave since the pointer can no longer be tracked.

mod key_token;
mod mouse;

pub use key_token::{map_key_event, map_mod_mask};
pub use mouse::{HitTester, map_mouse_event};

use core_events::{EditorEvent, PointerEvent, PointerTarget};
use crossterm::event::Event as CEvent;

/// Translate one terminal event. Returns `None` for events the hover subsystem
/// has no signal for (resize, paste, focus gained, key releases).
pub fn map_terminal_event(event: &CEvent, hit: &dyn HitTester) -> Option<EditorEvent> {
    match event {
        CEvent::Key(key) => map_key_event(key).map(EditorEvent::KeyDown),
        CEvent::Mouse(m) => map_mouse_event(m, hit),
        CEvent::FocusLost => Some(EditorEvent::PointerLeave(PointerEvent::at(
            PointerTarget::Other,
        ))),
        CEvent::FocusGained | CEvent::Paste(_) | CEvent::Resize(..) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{KeyToken, Signal};
    use crossterm::event::{
        KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyModifiers as CKeyModifiers,
    };
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::Subscriber;
    use tracing::dispatcher::Dispatch;
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::Context;
    use tracing_subscriber::layer::Layer;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::registry::Registry;

    fn other(_: u16, _: u16) -> PointerTarget {
        PointerTarget::Other
    }

    #[derive(Clone, Default)]
    struct Capture {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    #[derive(Clone, Debug)]
    struct CapturedEvent {
        target: String,
        fields: Vec<(String, String)>,
    }

    #[derive(Default)]
    struct FieldCollector {
        fields: Vec<(String, String)>,
    }

    impl Visit for FieldCollector {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    impl<S> Layer<S> for Capture
    where
        S: Subscriber,
    {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut collector = FieldCollector::default();
            event.record(&mut collector);
            let meta = event.metadata();
            self.events.lock().unwrap().push(CapturedEvent {
                target: meta.target().to_string(),
                fields: collector.fields,
            });
        }
    }

    #[test]
    fn key_press_becomes_key_down() {
        let ev = CEvent::Key(CKeyEvent::new(CKeyCode::Char('q'), CKeyModifiers::NONE));
        match map_terminal_event(&ev, &other) {
            Some(EditorEvent::KeyDown(k)) => assert_eq!(k.token, KeyToken::Char('q')),
            other => panic!("expected key down, got {:?}", other),
        }
    }

    #[test]
    fn focus_lost_is_pointer_leave_and_resize_is_ignored() {
        let leave = map_terminal_event(&CEvent::FocusLost, &other).expect("focus lost maps");
        assert_eq!(leave.signal(), Signal::POINTER_LEAVE);
        assert!(map_terminal_event(&CEvent::Resize(80, 24), &other).is_none());
        assert!(map_terminal_event(&CEvent::FocusGained, &other).is_none());
    }

    #[test]
    fn mouse_trace_uses_input_mouse_target() {
        let capture = Capture::default();
        let events = capture.events.clone();
        let dispatch = Dispatch::new(Registry::default().with(capture));

        tracing::dispatcher::with_default(&dispatch, || {
            let ev = CEvent::Mouse(crossterm::event::MouseEvent {
                kind: crossterm::event::MouseEventKind::Moved,
                column: 4,
                row: 9,
                modifiers: CKeyModifiers::NONE,
            });
            let _ = map_terminal_event(&ev, &other);
        });

        let events = events.lock().unwrap();
        let event = events
            .iter()
            .find(|e| e.target == "input.mouse")
            .expect("missing input.mouse event");
        assert!(
            event
                .fields
                .iter()
                .any(|(name, value)| name == "row" && value == "9"),
            "row field missing from event"
        );
    }
}
