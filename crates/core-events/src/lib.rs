//! Core event types consumed by the hover subsystem.
//!
//! Every input an editor surface can deliver to a hover controller is normalized
//! into an [`EditorEvent`] before routing. Pointer events arrive already hit-tested
//! (the host owns layout), so consumers only ever inspect a [`PointerTarget`].
//!
//! [`Signal`] names each subscribable input source. Hook management works in terms
//! of these flags; the host only delivers events whose signal is subscribed.

use std::fmt;
use std::time::Instant;

// -------------------------------------------------------------------------------------------------
// Positions
// -------------------------------------------------------------------------------------------------
/// 1-based line / column position inside a text model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open text range. `start <= end` is maintained by [`TextRange::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    /// Construct a range normalizing ordering so that start <= end.
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Zero-width range at `pos` (used by keyboard / action triggered hovers).
    pub const fn empty_at(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// -------------------------------------------------------------------------------------------------
// Keys
// -------------------------------------------------------------------------------------------------
bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModMask: u16 { const CTRL=1; const ALT=2; const SHIFT=4; const META=8; const SUPER=16; }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Esc,
    Backspace,
    Tab,
    F(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    /// A modifier key pressed on its own.
    Modifier(ModifierKey),
}

/// Physical modifier keys. Left/right variants collapse into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    Ctrl,
    Alt,
    Shift,
    Meta,
    Super,
}

/// Canonical logical key tokens.
///
/// `KeyToken::Chord` wraps a base token plus modifier mask so consumers can
/// reconstruct combinations such as `<C-k>` without a separate side channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyToken {
    Char(char),
    Named(NamedKey),
    Chord { base: Box<KeyToken>, mods: ModMask },
}

impl KeyToken {
    /// True when the token is nothing but a modifier key (possibly reported as a
    /// chord carrying its own modifier bit, as some terminals do).
    pub fn is_modifier_only(&self) -> bool {
        match self {
            KeyToken::Named(NamedKey::Modifier(_)) => true,
            KeyToken::Chord { base, .. } => base.is_modifier_only(),
            _ => false,
        }
    }

    /// True for the Escape key, with or without held modifiers.
    pub fn is_escape(&self) -> bool {
        match self {
            KeyToken::Named(NamedKey::Esc) => true,
            KeyToken::Chord { base, .. } => base.is_escape(),
            _ => false,
        }
    }
}

/// Rich keypress metadata.
///
/// Invariants:
/// * `timestamp` is monotonic per producer.
/// * `repeat` is `true` only for auto-repeat events reported by the terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyEventExt {
    pub token: KeyToken,
    pub repeat: bool,
    pub timestamp: Instant,
}

impl KeyEventExt {
    /// Create a `KeyEventExt` using the current instant and `repeat = false`.
    pub fn new(token: KeyToken) -> Self {
        Self::from_parts(token, false, Instant::now())
    }

    /// Create a `KeyEventExt` using the current instant and explicit repeat bit.
    pub fn with_repeat(token: KeyToken, repeat: bool) -> Self {
        Self::from_parts(token, repeat, Instant::now())
    }

    /// Create a `KeyEventExt` with caller supplied timestamp (primarily for tests).
    pub fn from_parts(token: KeyToken, repeat: bool, timestamp: Instant) -> Self {
        Self {
            token,
            repeat,
            timestamp,
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Pointer
// -------------------------------------------------------------------------------------------------
/// Which floating widget a pointer hit landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitWidget {
    /// The range-anchored content hover.
    ContentHover,
    /// The gutter-anchored glyph hover.
    GlyphHover,
    /// Any other widget hosted by the surface (find bar, suggest list, ...).
    Foreign,
}

/// Hit-test classification of a pointer position, produced by the host layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerTarget {
    /// Over rendered text. `range` is the word/token under the pointer when known.
    ContentText { range: Option<TextRange> },
    /// Over the content area but past the end of text on a line, or below the
    /// last line. `horizontal_distance_to_text` is measured in the same unit as
    /// the character width option.
    ContentEmpty {
        range: Option<TextRange>,
        horizontal_distance_to_text: Option<f32>,
        is_after_lines: bool,
    },
    /// Over the glyph margin of the gutter.
    GutterGlyphMargin { line: Option<u32> },
    /// Over a content widget (anchored to a text position).
    ContentWidget(HitWidget),
    /// Over an overlay widget (anchored to the surface frame).
    OverlayWidget(HitWidget),
    /// Anything else: line numbers, scrollbar, padding, outside the surface.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Pointer event after hit-testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub target: PointerTarget,
    pub button: Option<MouseButton>,
    pub column: u16,
    pub row: u16,
    pub mods: ModMask,
}

impl PointerEvent {
    /// Pointer event with no button and no modifiers (moves, leaves).
    pub fn at(target: PointerTarget) -> Self {
        Self {
            target,
            button: None,
            column: 0,
            row: 0,
            mods: ModMask::empty(),
        }
    }

    pub fn with_mods(mut self, mods: ModMask) -> Self {
        self.mods = mods;
        self
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = Some(button);
        self
    }
}

// -------------------------------------------------------------------------------------------------
// Surface notifications
// -------------------------------------------------------------------------------------------------
/// Which scroll offsets changed since the previous scroll notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ScrollChange {
    pub top_changed: bool,
    pub left_changed: bool,
}

impl ScrollChange {
    pub fn offset_changed(&self) -> bool {
        self.top_changed || self.left_changed
    }
}

bitflags::bitflags! {
    /// Option groups touched by a configuration change.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ChangedOptions: u8 {
        /// `hover.enabled` or `hover.sticky`.
        const HOVER = 1;
        const ACCESSIBILITY = 2;
        /// Character metrics (typical half-width character width).
        const FONT_INFO = 4;
    }
}

/// Payload of a configuration-changed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ConfigChange {
    pub changed: ChangedOptions,
}

impl ConfigChange {
    pub fn new(changed: ChangedOptions) -> Self {
        Self { changed }
    }

    pub fn has_changed(&self, option: ChangedOptions) -> bool {
        self.changed.intersects(option)
    }
}

bitflags::bitflags! {
    /// Subscribable input sources of an editor surface.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Signal: u16 {
        const POINTER_DOWN = 1 << 0;
        const POINTER_UP = 1 << 1;
        const POINTER_MOVE = 1 << 2;
        const POINTER_LEAVE = 1 << 3;
        const KEY_DOWN = 1 << 4;
        const SCROLL_CHANGED = 1 << 5;
        const MODEL_CHANGED = 1 << 6;
        const DECORATIONS_CHANGED = 1 << 7;
        const CONFIG_CHANGED = 1 << 8;
        /// Blur of the content hover widget itself (focus left the tooltip).
        const CONTENT_HOVER_BLUR = 1 << 9;
    }
}

/// Top-level event enum routed into a hover controller.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    PointerDown(PointerEvent),
    PointerUp(PointerEvent),
    PointerMove(PointerEvent),
    PointerLeave(PointerEvent),
    KeyDown(KeyEventExt),
    ScrollChanged(ScrollChange),
    /// The surface switched to another text model (or lost its model).
    ModelChanged,
    DecorationsChanged,
    ConfigChanged(ConfigChange),
    ContentHoverBlur,
}

impl EditorEvent {
    /// The single signal this event is delivered through.
    pub fn signal(&self) -> Signal {
        match self {
            EditorEvent::PointerDown(_) => Signal::POINTER_DOWN,
            EditorEvent::PointerUp(_) => Signal::POINTER_UP,
            EditorEvent::PointerMove(_) => Signal::POINTER_MOVE,
            EditorEvent::PointerLeave(_) => Signal::POINTER_LEAVE,
            EditorEvent::KeyDown(_) => Signal::KEY_DOWN,
            EditorEvent::ScrollChanged(_) => Signal::SCROLL_CHANGED,
            EditorEvent::ModelChanged => Signal::MODEL_CHANGED,
            EditorEvent::DecorationsChanged => Signal::DECORATIONS_CHANGED,
            EditorEvent::ConfigChanged(_) => Signal::CONFIG_CHANGED,
            EditorEvent::ContentHoverBlur => Signal::CONTENT_HOVER_BLUR,
        }
    }
}
