mod common;
use common::*;

use core_config::AccessibilitySupport;
use core_events::{PointerTarget, Position, TextRange};
use core_hover::{
    DisplayRequest, HoverAnchor, HoverController, HoverModifiers, HoverRegistry, HoverSource,
    HoverState, ShowDefinitionPreviewHoverAction, ShowHoverAction, ShowHoverArgs, StartMode,
    SurfaceId, TriggerError,
};
use pretty_assertions::assert_eq;
use std::rc::Rc;

struct Fixture {
    registry: HoverRegistry,
    calls: CallLog,
    surface: std::rc::Rc<std::cell::RefCell<SurfaceState>>,
    lookup: Rc<ScriptedLookup>,
}

fn fixture(opts: core_config::EditorOptions) -> Fixture {
    let lookup = Rc::new(ScriptedLookup::default());
    let p = parts(opts, Some(lookup.clone()));
    let mut registry = HoverRegistry::new();
    registry.register(SurfaceId(1), HoverController::new(p.deps));
    registry.set_model_uri(SurfaceId(1), Some("file:///main.rs".into()));
    registry.set_focused(Some(SurfaceId(1)));
    Fixture {
        registry,
        calls: p.calls,
        surface: p.surface,
        lookup,
    }
}

fn action_show(pos: Position, focus: bool, pinned: bool) -> Call {
    Call::ContentShow(DisplayRequest {
        anchor: HoverAnchor::Range(TextRange::empty_at(pos)),
        mode: StartMode::Immediate,
        focus,
        source: HoverSource::Action,
        modifiers: HoverModifiers::empty(),
        pinned,
    })
}

fn take(calls: &CallLog) -> Vec<Call> {
    std::mem::take(&mut *calls.borrow_mut())
}

#[test]
fn sticky_show_hover_pins_until_escape() {
    let mut f = fixture(options(true, true));
    let args = ShowHoverArgs {
        position: Some(Position::new(10, 4)),
        sticky: Some(true),
        ..ShowHoverArgs::default()
    };
    ShowHoverAction::run(&f.registry, &args);
    assert_eq!(
        take(&f.calls),
        vec![Call::GlyphHide, action_show(Position::new(10, 4), true, true)]
    );

    let controller = f.registry.resolve(None).unwrap();
    let deliver = |ev| controller.borrow_mut().handle_event(&ev);
    for target in [PointerTarget::Other, text(1, 1, 3), gutter(2), over_content_hover()] {
        deliver(move_to(target));
    }
    assert!(take(&f.calls).is_empty(), "moves never touch a pinned hover");
    let snap = controller.borrow().snapshot();
    assert!(snap.pinned);
    assert_eq!(snap.state, HoverState::ShowingContent);

    deliver(esc());
    assert_eq!(take(&f.calls), vec![Call::GlyphHide, Call::ContentHide]);
    assert!(!controller.borrow().snapshot().pinned);

    f.registry.unregister(SurfaceId(1));
}

#[test]
fn show_hover_uses_caret_and_focus_follows_accessibility() {
    let f = fixture(options(true, true));
    f.surface.borrow_mut().caret = Some(Position::new(3, 7));
    ShowHoverAction::run(&f.registry, &ShowHoverArgs::default());
    assert_eq!(
        take(&f.calls),
        vec![Call::GlyphHide, action_show(Position::new(3, 7), false, false)]
    );

    f.surface.borrow_mut().options.accessibility_support = AccessibilitySupport::On;
    ShowHoverAction::run(&f.registry, &ShowHoverArgs::default());
    assert_eq!(
        take(&f.calls),
        vec![Call::GlyphHide, action_show(Position::new(3, 7), true, false)]
    );
}

#[test]
fn show_hover_resolution_failures_are_no_ops() {
    let mut f = fixture(options(true, true));
    let by_uri = ShowHoverArgs {
        uri: Some("file:///other.rs".into()),
        ..ShowHoverArgs::default()
    };
    assert_eq!(
        ShowHoverAction::try_run(&f.registry, &by_uri),
        Err(TriggerError::NoController("file:///other.rs".into()))
    );

    f.surface.borrow_mut().caret = None;
    assert_eq!(
        ShowHoverAction::try_run(&f.registry, &ShowHoverArgs::default()),
        Err(TriggerError::NoPosition)
    );

    f.registry.set_focused(None);
    ShowHoverAction::run(&f.registry, &ShowHoverArgs::default());
    assert_eq!(
        ShowHoverAction::try_run(&f.registry, &ShowHoverArgs::default()),
        Err(TriggerError::NoActiveSurface)
    );
    assert!(take(&f.calls).is_empty());
}

#[test]
fn explicit_uri_targets_that_surface() {
    let f = fixture(options(true, true));
    let args = ShowHoverArgs {
        uri: Some("file:///main.rs".into()),
        position: Some(Position::new(2, 2)),
        source: Some(HoverSource::Keyboard),
        ..ShowHoverArgs::default()
    };
    ShowHoverAction::try_run(&f.registry, &args).unwrap();
    let calls = take(&f.calls);
    let Some(Call::ContentShow(req)) = calls.last() else {
        panic!("expected a content show, got {calls:?}");
    };
    assert_eq!(req.source, HoverSource::Keyboard);
}

#[tokio::test]
async fn definition_preview_waits_for_lookup() {
    let f = fixture(options(true, true));
    f.surface.borrow_mut().caret = Some(Position::new(8, 2));
    let args = ShowHoverArgs::default();
    let run = ShowDefinitionPreviewHoverAction::try_run(&f.registry, &args);
    tokio::pin!(run);

    // Poll once: the lookup is requested but nothing is shown yet.
    tokio::select! {
        biased;
        _ = &mut run => panic!("must wait for the lookup"),
        _ = tokio::task::yield_now() => {}
    }
    assert_eq!(*f.lookup.requested.borrow(), vec![Position::new(8, 2)]);
    assert!(take(&f.calls).is_empty());

    let done = f.lookup.completers.borrow_mut().pop().unwrap();
    done.complete();
    run.await.unwrap();
    assert_eq!(
        take(&f.calls),
        vec![Call::GlyphHide, action_show(Position::new(8, 2), true, false)],
        "focus is forced on"
    );
}

#[tokio::test]
async fn definition_preview_without_pending_lookup_shows_right_away() {
    let f = fixture(options(true, true));
    f.lookup.immediate.set(true);
    let args = ShowHoverArgs {
        position: Some(Position::new(4, 4)),
        sticky: Some(true),
        ..ShowHoverArgs::default()
    };
    ShowDefinitionPreviewHoverAction::run(&f.registry, &args).await;
    assert_eq!(
        take(&f.calls),
        vec![Call::GlyphHide, action_show(Position::new(4, 4), true, true)]
    );
}

#[tokio::test]
async fn abandoned_lookup_never_displays() {
    let f = fixture(options(true, true));
    let args = ShowHoverArgs::default();
    let run = ShowDefinitionPreviewHoverAction::try_run(&f.registry, &args);
    tokio::pin!(run);
    tokio::select! {
        biased;
        _ = &mut run => panic!("must wait for the lookup"),
        _ = tokio::task::yield_now() => {}
    }
    drop(f.lookup.completers.borrow_mut().pop());
    assert_eq!(run.await, Err(TriggerError::LookupAbandoned));
    assert!(take(&f.calls).is_empty());
}

#[test]
fn unregister_disposes_and_unfocuses() {
    let mut f = fixture(options(true, true));
    ShowHoverAction::run(&f.registry, &ShowHoverArgs::default());
    take(&f.calls);
    f.registry.unregister(SurfaceId(1));
    assert_eq!(take(&f.calls), vec![Call::ContentDispose, Call::GlyphDispose]);
    assert!(f.surface.borrow().live.is_empty());
    assert_eq!(
        ShowHoverAction::try_run(&f.registry, &ShowHoverArgs::default()),
        Err(TriggerError::NoActiveSurface)
    );
}
