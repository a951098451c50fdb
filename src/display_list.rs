//! Display list – the intermediate representation between the drawing
//! surface and PDF rendering. It records exactly what goes on each page, in
//! millimetres from the top-left corner, and can be dumped to JSON.

use serde::{Deserialize, Serialize};

use crate::fonts::FontSpec;

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Components scaled to 0.0–1.0.
    pub fn unit(self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaintStyle {
    Fill,
    Stroke,
    FillStroke,
}

impl PaintStyle {
    pub fn fills(self) -> bool {
        matches!(self, PaintStyle::Fill | PaintStyle::FillStroke)
    }

    pub fn strokes(self) -> bool {
        matches!(self, PaintStyle::Stroke | PaintStyle::FillStroke)
    }
}

/// One drawing primitive with the state it was drawn with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawItem {
    /// `x` is the left edge after alignment, `y` the baseline.
    Text {
        x: f32,
        y: f32,
        text: String,
        font: FontSpec,
        color: Rgb,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Rgb,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        paint: PaintStyle,
        corner_radius: f32,
        fill: Rgb,
        stroke: Rgb,
        line_width: f32,
    },
    /// `src` is a base64 data URI.
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        src: String,
    },
}

impl DrawItem {
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawItem::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Lowest Y the item touches.
    pub fn bottom(&self) -> f32 {
        match self {
            DrawItem::Text { y, .. } => *y,
            DrawItem::Line { y1, y2, .. } => y1.max(*y2),
            DrawItem::Rect { y, height, .. } | DrawItem::Image { y, height, .. } => y + height,
        }
    }
}

/// One page of content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_index: usize,
    pub items: Vec<DrawItem>,
}

impl PageLayout {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(DrawItem::text)
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }
}

/// A complete document ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    /// Document title embedded in the PDF metadata.
    pub title: String,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    pub fn new(title: &str, page_width_mm: f32, page_height_mm: f32) -> Self {
        Self {
            title: title.to_string(),
            page_width_mm,
            page_height_mm,
            pages: Vec::new(),
        }
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }

    /// Number of text items across the document whose text equals `text`.
    pub fn count_text(&self, text: &str) -> usize {
        self.pages
            .iter()
            .map(|p| p.texts().filter(|t| *t == text).count())
            .sum()
    }
}
