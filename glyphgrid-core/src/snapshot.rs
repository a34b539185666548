//! Render snapshot for testing and headless output
//!
//! A snapshot is what a renderer would draw: it is built from the actual
//! appearance of every cell, after effects have been applied.

use serde::{Deserialize, Serialize};

use crate::cell::{Appearance, Mirror};
use crate::color::Color;
use crate::surface::CellSurface;

/// Serializable picture of a surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub width: usize,
    pub height: usize,
    pub default_foreground: String,
    pub default_background: String,
    /// Number of live effects when the snapshot was taken
    #[serde(default)]
    pub effects: usize,
    pub rows: Vec<SnapshotRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    /// Glyphs of the row; hidden cells and glyph 0 show as a space
    pub text: String,
    /// Runs of cells that differ from the surface defaults
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<ColorSpan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSpan {
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror: Option<Mirror>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl ColorSpan {
    fn same_style(&self, other: &ColorSpan) -> bool {
        self.fg == other.fg
            && self.bg == other.bg
            && self.mirror == other.mirror
            && self.hidden == other.hidden
    }
}

impl Snapshot {
    /// Capture the actual appearance of every cell
    pub fn from_surface(surface: &CellSurface) -> Self {
        let width = surface.width();
        let defaults = (surface.default_foreground(), surface.default_background());

        let rows = surface
            .cells()
            .chunks(width)
            .map(|row| {
                let actual: Vec<&Appearance> = row.iter().map(|cell| cell.actual()).collect();
                SnapshotRow {
                    text: actual.iter().map(|a| display_char(a)).collect(),
                    spans: extract_spans(&actual, defaults),
                }
            })
            .collect();

        Self {
            width,
            height: surface.height(),
            default_foreground: surface.default_foreground().to_hex(),
            default_background: surface.default_background().to_hex(),
            effects: surface.effect_count(),
            rows,
        }
    }

    /// Convert snapshot to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Rows joined by newlines
    pub fn screen_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl CellSurface {
    /// Render snapshot of the surface
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_surface(self)
    }
}

fn display_char(appearance: &Appearance) -> char {
    match appearance.glyph_char() {
        _ if !appearance.visible => ' ',
        '\0' => ' ',
        c if c.is_control() => ' ',
        c => c,
    }
}

fn extract_spans(row: &[&Appearance], (fg, bg): (Color, Color)) -> Vec<ColorSpan> {
    let mut spans: Vec<ColorSpan> = Vec::new();
    let mut current: Option<ColorSpan> = None;

    for (i, appearance) in row.iter().enumerate() {
        let span = ColorSpan {
            start: i,
            end: i + 1,
            fg: (appearance.foreground != fg).then(|| appearance.foreground.to_hex()),
            bg: (appearance.background != bg).then(|| appearance.background.to_hex()),
            mirror: (appearance.mirror != Mirror::None).then_some(appearance.mirror),
            hidden: !appearance.visible,
        };
        let plain = span.fg.is_none() && span.bg.is_none() && span.mirror.is_none() && !span.hidden;

        match current.as_mut() {
            Some(open) if !plain && open.same_style(&span) => open.end = i + 1,
            _ => {
                if let Some(open) = current.take() {
                    spans.push(open);
                }
                if !plain {
                    current = Some(span);
                }
            }
        }
    }

    spans.extend(current);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{Blink, EffectHandle};

    #[test]
    fn test_snapshot_text() {
        let mut surface = CellSurface::new(4, 2).unwrap();
        surface.print(0, 0, "Hi").unwrap();
        surface.print(1, 1, "!").unwrap();

        let snapshot = surface.snapshot();
        assert_eq!(snapshot.width, 4);
        assert_eq!(snapshot.height, 2);
        assert_eq!(snapshot.screen_text(), "Hi  \n !  ");
        assert!(snapshot.rows[0].spans.is_empty());
    }

    #[test]
    fn test_snapshot_spans_merge_runs() {
        let mut surface = CellSurface::new(5, 1).unwrap();
        surface
            .print_colors(1, 0, "abc", Color::RED, Color::TRANSPARENT)
            .unwrap();
        surface.set_background(3, 0, Color::BLUE).unwrap();

        let spans = &surface.snapshot().rows[0].spans;
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start, spans[0].end), (1, 3));
        assert_eq!(spans[0].fg.as_deref(), Some("#ff0000"));
        assert_eq!(spans[0].bg, None);
        assert_eq!(spans[1].bg.as_deref(), Some("#0000ff"));
    }

    #[test]
    fn test_snapshot_reads_actual_appearance() {
        let mut surface = CellSurface::new(2, 1).unwrap();
        surface.print(0, 0, "ab").unwrap();
        let blink = EffectHandle::new(Blink::new().with_speed(0.5));
        surface.set_effect(0, 0, Some(&blink)).unwrap();
        surface.update_effects(0.5);

        let snapshot = surface.snapshot();
        assert_eq!(snapshot.rows[0].text, " b");
        assert!(snapshot.rows[0].spans[0].hidden);
        assert_eq!(snapshot.effects, 1);
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let mut surface = CellSurface::new(3, 1).unwrap();
        surface.print_fg(0, 0, "xyz", Color::CYAN).unwrap();
        let snapshot = surface.snapshot();

        let json = snapshot.to_json().unwrap();
        let parsed = Snapshot::from_json(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
