//! Font metrics and text wrapping.
//!
//! Every document is set in the PDF standard Helvetica family, so text is
//! measured against the Adobe font metrics of the builtin faces instead of
//! parsing font files. Widths are in 1/1000 em; results are in millimetres.

use serde::{Deserialize, Serialize};

/// Millimetres per PDF point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }
}

/// The only family the renderer can draw.
pub const HELVETICA: &str = "helvetica";

/// Font selection as recorded on every text item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub style: FontStyle,
    /// Size in points.
    pub size: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: HELVETICA.to_string(),
            style: FontStyle::Normal,
            size: 10.0,
        }
    }
}

impl FontSpec {
    /// Baseline-to-baseline distance in millimetres for a line factor.
    pub fn line_height_mm(&self, factor: f32) -> f32 {
        self.size * factor * MM_PER_PT
    }
}

// Advance widths for U+0020..=U+007E.
#[rustfmt::skip]
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

// Advance widths for U+00A0..=U+00FF, which WinAnsi encodes as themselves.
#[rustfmt::skip]
const HELVETICA_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

#[rustfmt::skip]
const HELVETICA_BOLD_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

// Characters the renderer maps into WinAnsi 0x80..=0x9F: (char, regular, bold).
const PUNCTUATION: [(char, u16, u16); 12] = [
    ('\u{20AC}', 556, 556),
    ('\u{201A}', 222, 278),
    ('\u{201E}', 333, 500),
    ('\u{2026}', 1000, 1000),
    ('\u{2018}', 222, 278),
    ('\u{2019}', 222, 278),
    ('\u{201C}', 333, 500),
    ('\u{201D}', 333, 500),
    ('\u{2022}', 350, 350),
    ('\u{2013}', 556, 556),
    ('\u{2014}', 1000, 1000),
    ('\u{2122}', 1000, 1000),
];

/// Widths of one face. Anything WinAnsi cannot encode renders as `?` and
/// is measured as one.
struct FaceMetrics {
    ascii: &'static [u16; 95],
    latin1: &'static [u16; 96],
    bold: bool,
}

impl FaceMetrics {
    fn advance(&self, ch: char) -> u16 {
        let code = ch as u32;
        match code {
            0x20..=0x7E => self.ascii[(code - 0x20) as usize],
            0xA0..=0xFF => self.latin1[(code - 0xA0) as usize],
            _ => PUNCTUATION
                .iter()
                .find(|(c, _, _)| *c == ch)
                .map(|&(_, regular, bold)| if self.bold { bold } else { regular })
                .unwrap_or(self.ascii[(u32::from('?') - 0x20) as usize]),
        }
    }
}

const REGULAR: FaceMetrics = FaceMetrics {
    ascii: &HELVETICA_ASCII,
    latin1: &HELVETICA_LATIN1,
    bold: false,
};

const BOLD: FaceMetrics = FaceMetrics {
    ascii: &HELVETICA_BOLD,
    latin1: &HELVETICA_BOLD_LATIN1,
    bold: true,
};

/// Text measurement for the builtin faces.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontManager;

impl FontManager {
    pub fn new() -> Self {
        Self
    }

    /// Width of `text` in millimetres. Oblique faces share the upright widths.
    pub fn measure_text_width(&self, text: &str, font: &FontSpec) -> f32 {
        let face = if font.style.is_bold() { &BOLD } else { &REGULAR };
        let units: u32 = text.chars().map(|c| face.advance(c) as u32).sum();
        units as f32 / 1000.0 * font.size * MM_PER_PT
    }
}

/// Word-wrap text to fit within `max_width` millimetres.
///
/// Words longer than a line are broken between characters. When not even a
/// single character fits, each line carries exactly one character.
pub fn split_to_width(
    text: &str,
    font: &FontSpec,
    max_width: f32,
    fonts: &FontManager,
) -> Vec<String> {
    let fits = |s: &str| fonts.measure_text_width(s, font) <= max_width;
    let mut lines: Vec<String> = Vec::new();

    // Split on existing newlines first
    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in words {
            if !current.is_empty() {
                let candidate = format!("{current} {word}");
                if fits(&candidate) {
                    current = candidate;
                    continue;
                }
                lines.push(std::mem::take(&mut current));
            }

            if fits(word) {
                current = word.to_string();
                continue;
            }

            for ch in word.chars() {
                current.push(ch);
                if current.chars().count() > 1 && !fits(&current) {
                    current.pop();
                    lines.push(std::mem::replace(&mut current, ch.to_string()));
                }
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Shorten `text` to at most `max_chars` characters, ending in "...".
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.truncate(out.trim_end().len());
    out.push_str("...");
    out
}

/// Replace the tail of `line` with "..." so that the result fits `max_width`.
pub fn ellipsize_to_width(line: &str, font: &FontSpec, max_width: f32, fonts: &FontManager) -> String {
    let mut kept: Vec<char> = line.trim_end().chars().collect();
    loop {
        let candidate: String = kept.iter().collect::<String>() + "...";
        if kept.is_empty() || fonts.measure_text_width(&candidate, font) <= max_width {
            return candidate;
        }
        kept.pop();
    }
}
