//! Demo text model, viewport and screen hit-testing.

use crate::popups::PopupLayer;
use core_events::{HitWidget, PointerTarget, Position, TextRange};
use core_input::HitTester;
use std::collections::BTreeSet;

/// Column 0 is the glyph margin, columns 1..=4 hold the line number.
pub const TEXT_ORIGIN: u16 = 6;
pub const STATUS_ROWS: u16 = 1;

const SAMPLE: &str = "\
use std::collections::HashMap;

/// Counts words in a line of text.
fn count_words(text: &str) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for word in text.split_whitespace() {
        *counts.entry(word).or_insert(0) += 1;
    }
    counts
}

fn main() {
    let counts = count_words(\"the quick brown fox jumps over the lazy dog\");
    let mut keys: Vec<_> = counts.keys().collect();
    keys.sort();
    for key in keys {
        println!(\"{key}: {}\", counts[key]);
    }
}
";

pub struct Document {
    uri: String,
    lines: Vec<String>,
    glyph_lines: BTreeSet<u32>,
}

impl Document {
    pub fn new(
        uri: impl Into<String>,
        text: &str,
        glyph_lines: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self {
            uri: uri.into(),
            lines: text.lines().map(str::to_owned).collect(),
            glyph_lines: glyph_lines.into_iter().collect(),
        }
    }

    pub fn sample() -> Self {
        Self::new("inmemory://sample.rs", SAMPLE, [4, 12])
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn line_count(&self) -> u32 {
        self.lines.len() as u32
    }

    /// 1-based line lookup.
    pub fn line(&self, line: u32) -> Option<&str> {
        let idx = line.checked_sub(1)? as usize;
        self.lines.get(idx).map(String::as_str)
    }

    pub fn line_len(&self, line: u32) -> u32 {
        self.line(line).map_or(0, |l| l.chars().count() as u32)
    }

    pub fn has_glyph(&self, line: u32) -> bool {
        self.glyph_lines.contains(&line)
    }

    /// Identifier-like word covering `pos`, as a half-open range.
    pub fn word_range(&self, pos: Position) -> Option<TextRange> {
        let chars: Vec<char> = self.line(pos.line)?.chars().collect();
        let idx = pos.column.checked_sub(1)? as usize;
        if !chars.get(idx).copied().is_some_and(is_word_char) {
            return None;
        }
        let start = chars[..idx]
            .iter()
            .rposition(|c| !is_word_char(*c))
            .map_or(0, |p| p + 1);
        let end = chars[idx..]
            .iter()
            .position(|c| !is_word_char(*c))
            .map_or(chars.len(), |p| idx + p);
        Some(TextRange::new(
            Position::new(pos.line, start as u32 + 1),
            Position::new(pos.line, end as u32 + 1),
        ))
    }

    pub fn text_in(&self, range: TextRange) -> Option<String> {
        if range.start.line != range.end.line {
            return None;
        }
        let line = self.line(range.start.line)?;
        let from = range.start.column.checked_sub(1)? as usize;
        let to = range.end.column.checked_sub(1)? as usize;
        Some(line.chars().skip(from).take(to.saturating_sub(from)).collect())
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Scroll offsets and terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible line (0-based offset).
    pub top: u32,
    /// First visible text column (0-based offset).
    pub left: u32,
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            top: 0,
            left: 0,
            width,
            height,
        }
    }

    pub fn text_rows(&self) -> u16 {
        self.height.saturating_sub(STATUS_ROWS)
    }

    pub fn row_of_line(&self, line: u32) -> Option<u16> {
        let offset = line.checked_sub(1)?.checked_sub(self.top)?;
        (offset < u32::from(self.text_rows())).then_some(offset as u16)
    }

    pub fn column_of(&self, column: u32) -> Option<u16> {
        let offset = column.checked_sub(1)?.checked_sub(self.left)?;
        u16::try_from(offset)
            .ok()
            .and_then(|o| TEXT_ORIGIN.checked_add(o))
            .filter(|c| *c < self.width)
    }

    /// Scroll by `lines`, clamped to the document. Returns whether the top moved.
    pub fn scroll_lines(&mut self, lines: i32, doc: &Document) -> bool {
        let max_top = doc.line_count().saturating_sub(1);
        let next = self.top.saturating_add_signed(lines).min(max_top);
        let moved = next != self.top;
        self.top = next;
        moved
    }

    pub fn scroll_columns(&mut self, columns: i32) -> bool {
        let next = self.left.saturating_add_signed(columns);
        let moved = next != self.left;
        self.left = next;
        moved
    }
}

/// Classifies screen cells against the document, the viewport and any open popup.
pub struct ScreenHitTester<'a> {
    pub doc: &'a Document,
    pub viewport: Viewport,
    pub popups: &'a PopupLayer,
}

impl HitTester for ScreenHitTester<'_> {
    fn hit(&self, column: u16, row: u16) -> PointerTarget {
        if let Some(widget) = self.popups.hit(column, row, self.doc, &self.viewport) {
            return match widget {
                HitWidget::GlyphHover => PointerTarget::OverlayWidget(widget),
                _ => PointerTarget::ContentWidget(widget),
            };
        }
        if row >= self.viewport.text_rows() {
            return PointerTarget::Other;
        }
        let line = self.viewport.top + u32::from(row) + 1;
        if line > self.doc.line_count() {
            return PointerTarget::ContentEmpty {
                range: None,
                horizontal_distance_to_text: None,
                is_after_lines: true,
            };
        }
        if column == 0 {
            return PointerTarget::GutterGlyphMargin { line: Some(line) };
        }
        if column < TEXT_ORIGIN {
            return PointerTarget::Other;
        }
        let text_column = self.viewport.left + u32::from(column - TEXT_ORIGIN) + 1;
        let len = self.doc.line_len(line);
        let pos = Position::new(line, text_column);
        if text_column <= len {
            let range = self
                .doc
                .word_range(pos)
                .unwrap_or_else(|| TextRange::new(pos, Position::new(line, text_column + 1)));
            return PointerTarget::ContentText { range: Some(range) };
        }
        PointerTarget::ContentEmpty {
            range: Some(TextRange::empty_at(Position::new(line, len + 1))),
            horizontal_distance_to_text: Some((text_column - len - 1) as f32),
            is_after_lines: false,
        }
    }
}
