use core_events::{KeyEventExt, KeyToken, ModMask, ModifierKey, NamedKey};
use crossterm::event::{
    KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind as CKeyEventKind,
    KeyModifiers as CKeyModifiers, ModifierKeyCode as CModifierKeyCode,
};

/// Map a crossterm key event into a key-down event.
///
/// Releases produce `None` (hover arbitration only observes presses), as do key
/// codes we do not support (e.g. media keys). Modifier flags wrap the base token
/// in a `KeyToken::Chord`.
pub fn map_key_event(event: &CKeyEvent) -> Option<KeyEventExt> {
    if matches!(event.kind, CKeyEventKind::Release) {
        return None;
    }
    let base = map_key_token(&event.code)?;
    let mods = map_mod_mask(event.modifiers);
    let token = if mods.is_empty() {
        base
    } else {
        KeyToken::Chord {
            base: Box::new(base),
            mods,
        }
    };
    let repeat = matches!(event.kind, CKeyEventKind::Repeat);
    Some(KeyEventExt::with_repeat(token, repeat))
}

/// Convert a crossterm key code into a key token.
pub(crate) fn map_key_token(code: &CKeyCode) -> Option<KeyToken> {
    let token = match code {
        CKeyCode::Char(c) => KeyToken::Char(*c),
        CKeyCode::Enter => KeyToken::Named(NamedKey::Enter),
        CKeyCode::Esc => KeyToken::Named(NamedKey::Esc),
        CKeyCode::Backspace => KeyToken::Named(NamedKey::Backspace),
        CKeyCode::Tab | CKeyCode::BackTab => KeyToken::Named(NamedKey::Tab),
        CKeyCode::Up => KeyToken::Named(NamedKey::Up),
        CKeyCode::Down => KeyToken::Named(NamedKey::Down),
        CKeyCode::Left => KeyToken::Named(NamedKey::Left),
        CKeyCode::Right => KeyToken::Named(NamedKey::Right),
        CKeyCode::Home => KeyToken::Named(NamedKey::Home),
        CKeyCode::End => KeyToken::Named(NamedKey::End),
        CKeyCode::PageUp => KeyToken::Named(NamedKey::PageUp),
        CKeyCode::PageDown => KeyToken::Named(NamedKey::PageDown),
        CKeyCode::Insert => KeyToken::Named(NamedKey::Insert),
        CKeyCode::Delete => KeyToken::Named(NamedKey::Delete),
        CKeyCode::F(n) => KeyToken::Named(NamedKey::F(*n)),
        CKeyCode::Modifier(m) => KeyToken::Named(NamedKey::Modifier(map_modifier_key(*m)?)),
        CKeyCode::Null
        | CKeyCode::CapsLock
        | CKeyCode::ScrollLock
        | CKeyCode::NumLock
        | CKeyCode::PrintScreen
        | CKeyCode::Pause
        | CKeyCode::Menu
        | CKeyCode::KeypadBegin
        | CKeyCode::Media(_) => return None,
    };
    Some(token)
}

fn map_modifier_key(code: CModifierKeyCode) -> Option<ModifierKey> {
    let key = match code {
        CModifierKeyCode::LeftControl | CModifierKeyCode::RightControl => ModifierKey::Ctrl,
        CModifierKeyCode::LeftAlt | CModifierKeyCode::RightAlt => ModifierKey::Alt,
        CModifierKeyCode::LeftShift | CModifierKeyCode::RightShift => ModifierKey::Shift,
        CModifierKeyCode::LeftMeta | CModifierKeyCode::RightMeta => ModifierKey::Meta,
        CModifierKeyCode::LeftSuper
        | CModifierKeyCode::RightSuper
        | CModifierKeyCode::LeftHyper
        | CModifierKeyCode::RightHyper => ModifierKey::Super,
        // Level shifts select alternate characters; they never reach us as standalone presses.
        CModifierKeyCode::IsoLevel3Shift | CModifierKeyCode::IsoLevel5Shift => return None,
    };
    Some(key)
}

/// Convert crossterm modifier flags into `ModMask` bits.
pub fn map_mod_mask(mods: CKeyModifiers) -> ModMask {
    let mut out = ModMask::empty();
    if mods.contains(CKeyModifiers::CONTROL) {
        out |= ModMask::CTRL;
    }
    if mods.contains(CKeyModifiers::ALT) {
        out |= ModMask::ALT;
    }
    if mods.contains(CKeyModifiers::SHIFT) {
        out |= ModMask::SHIFT;
    }
    if mods.contains(CKeyModifiers::SUPER) || mods.contains(CKeyModifiers::HYPER) {
        out |= ModMask::SUPER;
    }
    if mods.contains(CKeyModifiers::META) {
        out |= ModMask::META;
    }
    out
}
