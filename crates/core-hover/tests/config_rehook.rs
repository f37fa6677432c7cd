mod common;
use common::*;

use core_events::{ChangedOptions, ConfigChange, EditorEvent, KeyToken, PointerTarget, Signal};
use core_hover::{HookProfile, HoverState};
use pretty_assertions::assert_eq;

const ENABLED_SET: Signal = Signal::POINTER_DOWN
    .union(Signal::POINTER_UP)
    .union(Signal::POINTER_MOVE)
    .union(Signal::KEY_DOWN)
    .union(Signal::DECORATIONS_CHANGED)
    .union(Signal::CONTENT_HOVER_BLUR)
    .union(Signal::POINTER_LEAVE)
    .union(Signal::MODEL_CHANGED)
    .union(Signal::SCROLL_CHANGED)
    .union(Signal::CONFIG_CHANGED);

const DISABLED_SET: Signal = Signal::POINTER_MOVE
    .union(Signal::POINTER_LEAVE)
    .union(Signal::MODEL_CHANGED)
    .union(Signal::SCROLL_CHANGED)
    .union(Signal::CONFIG_CHANGED);

fn change(h: &mut Harness, enabled: bool, sticky: bool, changed: ChangedOptions) {
    {
        let mut s = h.surface.borrow_mut();
        s.options.hover_enabled = enabled;
        s.options.hover_sticky = sticky;
    }
    h.send(EditorEvent::ConfigChanged(ConfigChange::new(changed)));
}

#[test]
fn construction_hooks_profile_for_current_options() {
    let h = Harness::enabled();
    assert_eq!(h.live_signals(), ENABLED_SET);
    assert_eq!(h.controller.snapshot().profile, Some(HookProfile::Enabled));

    let h = Harness::new(options(false, true));
    assert_eq!(h.live_signals(), DISABLED_SET);
    assert_eq!(h.controller.snapshot().profile, Some(HookProfile::Disabled));
}

#[test]
fn disabling_hover_hides_and_replaces_listeners() {
    let mut h = Harness::enabled();
    h.show_content_by_mouse();
    let before: Vec<_> = h.surface.borrow().live.keys().copied().collect();

    change(&mut h, false, true, ChangedOptions::HOVER);

    assert_eq!(h.take_calls(), vec![Call::GlyphHide, Call::ContentHide]);
    assert_eq!(h.controller.snapshot().state, HoverState::Hidden);
    assert_eq!(h.live_signals(), DISABLED_SET);
    let s = h.surface.borrow();
    for id in before {
        let is_config_listener = s.live.get(&id) == Some(&Signal::CONFIG_CHANGED);
        assert!(
            is_config_listener || s.unsubscribed.contains(&id),
            "{id:?} should have been released"
        );
    }
}

#[test]
fn disabled_profile_hides_on_every_move_and_ignores_the_rest() {
    let mut h = Harness::new(options(false, true));
    assert!(!h.send(down_on(PointerTarget::Other)), "pointer down not hooked");
    assert!(!h.send(up()));
    assert!(!h.send(key(KeyToken::Char('x'))));
    assert!(!h.controller.snapshot().pointer_down);

    // Widgets only appear through the trigger path when hover is disabled.
    h.controller.show_content_hover(
        range(1, 1, 1),
        core_hover::StartMode::Immediate,
        false,
        false,
    );
    h.take_calls();

    h.send(move_to(over_content_hover()));
    assert!(h.take_calls().is_empty(), "moving onto the hover keeps it");

    h.send(move_to(text(3, 1, 5)));
    assert_eq!(
        h.take_calls(),
        vec![Call::GlyphHide, Call::ContentHide],
        "no hover requests while disabled, only hides"
    );
}

#[test]
fn disabled_profile_respects_pin() {
    let mut h = Harness::new(options(false, false));
    h.controller.show_content_hover(
        range(1, 1, 1),
        core_hover::StartMode::Immediate,
        true,
        true,
    );
    h.take_calls();
    h.send(move_to(PointerTarget::Other));
    assert!(h.take_calls().is_empty());
    assert!(h.controller.snapshot().pinned);
}

#[test]
fn unrelated_option_changes_do_not_rehook() {
    let mut h = Harness::enabled();
    h.show_content_by_mouse();
    let before = h.surface.borrow().unsubscribed.len();
    change(&mut h, false, false, ChangedOptions::FONT_INFO);
    assert!(h.take_calls().is_empty());
    assert_eq!(h.surface.borrow().unsubscribed.len(), before);
    assert_eq!(h.controller.snapshot().profile, Some(HookProfile::Enabled));
}

#[test]
fn sticky_toggle_rehooks_and_updates_behavior() {
    let mut h = Harness::enabled();
    change(&mut h, true, false, ChangedOptions::HOVER);
    let snap = h.controller.snapshot();
    assert!(snap.enabled);
    assert!(!snap.sticky);
    assert_eq!(h.live_signals(), ENABLED_SET);

    h.show_content_by_mouse();
    h.send(move_to(over_content_hover()));
    assert_eq!(h.take_calls(), vec![Call::GlyphHide, Call::ContentHide]);
}

#[test]
fn rehook_forgets_stale_pointer_down() {
    let mut h = Harness::enabled();
    h.show_content_by_mouse();
    h.color_picker.set(true);
    h.send(down_on(over_content_hover()));
    assert!(h.controller.snapshot().pointer_down);

    change(&mut h, true, true, ChangedOptions::HOVER);
    let snap = h.controller.snapshot();
    assert!(!snap.pointer_down);
    assert!(!snap.clicked_on_content_widget);
    assert_eq!(snap.state, HoverState::ShowingContent, "drag guard kept it open");

    h.send(move_to(PointerTarget::Other));
    assert_eq!(h.controller.snapshot().state, HoverState::Hidden);
}
