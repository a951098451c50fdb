//! Horizontal bar charts with "top N plus Others" bucketing.
//!
//! The chart never starts a new page. Callers reserve room with
//! [`ChartRenderer::height_for`] (or cap the entry count with
//! [`ChartRenderer::max_entries_for`]) before rendering.

use serde::{Deserialize, Serialize};

use crate::display_list::PaintStyle;
use crate::fonts::{truncate_chars, FontStyle};
use crate::surface::{Surface, TextAlign};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDatum {
    pub name: String,
    pub count: u64,
}

impl ChartDatum {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// Sort by count (desc) then name (asc), keep the first `top_n` and fold the
/// rest into one `others_label` entry when their sum is non-zero.
pub fn bucket_top_n(data: &[ChartDatum], top_n: usize, others_label: &str) -> Vec<ChartDatum> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

    let rest = sorted.split_off(top_n.min(sorted.len()));
    let others: u64 = rest.iter().map(|d| d.count).sum();
    if others > 0 {
        sorted.push(ChartDatum::new(others_label, others));
    }
    sorted
}

/// Bar length proportional to `count / max_count`, never below `min_width`.
pub fn bar_width(count: u64, max_count: u64, max_width: f32, min_width: f32) -> f32 {
    let max_count = max_count.max(1);
    (count as f32 / max_count as f32 * max_width).max(min_width)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    /// Room left of the bars for entry names.
    pub label_column: f32,
    pub max_bar_width: f32,
    pub min_bar_width: f32,
    pub bar_height: f32,
    /// Vertical distance between consecutive bars.
    pub row_pitch: f32,
    /// Names longer than this many characters are cut with "...".
    pub name_budget: usize,
    /// Bars at least this wide carry their value inside.
    pub inside_label_min: f32,
    pub title_height: f32,
    pub trailing_gap: f32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            label_column: 58.0,
            max_bar_width: 90.0,
            min_bar_width: 5.0,
            bar_height: 6.0,
            row_pitch: 9.0,
            name_budget: 30,
            inside_label_min: 15.0,
            title_height: 10.0,
            trailing_gap: 8.0,
        }
    }
}

pub struct ChartRenderer {
    style: ChartStyle,
    others_label: String,
}

impl ChartRenderer {
    pub fn new(style: ChartStyle, others_label: &str) -> Self {
        Self {
            style,
            others_label: others_label.to_string(),
        }
    }

    /// Total height of a chart with `entries` bars, title and trailing gap included.
    pub fn height_for(&self, entries: usize) -> f32 {
        self.style.title_height + entries as f32 * self.style.row_pitch + self.style.trailing_gap
    }

    /// Most bars that fit into `available` millimetres.
    pub fn max_entries_for(&self, available: f32) -> usize {
        let room = available - self.style.title_height - self.style.trailing_gap;
        if room <= 0.0 {
            0
        } else {
            (room / self.style.row_pitch).floor() as usize
        }
    }

    /// Draw the chart starting at `start_y` and return the Y just below it.
    pub fn render(&self, surface: &mut Surface, data: &[ChartDatum], start_y: f32, title: &str, top_n: usize) -> f32 {
        let s = &self.style;
        let left = surface.geometry().margins.left;
        let bar_x = left + s.label_column;

        surface.set_text_color(40, 40, 40);
        surface.set_font_style(FontStyle::Bold, 12.0);
        surface.draw_text(title, left, start_y + 5.0, TextAlign::Left);

        let entries = bucket_top_n(data, top_n, &self.others_label);
        let max_count = entries.iter().map(|d| d.count).max().unwrap_or(0);
        log::debug!(
            "chart: {} input entries, {} bars, max count {}",
            data.len(),
            entries.len(),
            max_count
        );

        let rows_top = start_y + s.title_height;
        for (i, datum) in entries.iter().enumerate() {
            let y = rows_top + i as f32 * s.row_pitch;
            let text_baseline = y + s.bar_height * 0.7;
            let width = bar_width(datum.count, max_count, s.max_bar_width, s.min_bar_width);
            let is_others = i >= top_n;

            surface.set_text_color(50, 50, 50);
            surface.set_font_style(FontStyle::Normal, 9.0);
            surface.draw_text(
                &truncate_chars(&datum.name, s.name_budget),
                left,
                text_baseline,
                TextAlign::Left,
            );

            if is_others {
                surface.set_fill_color(150, 150, 150);
            } else {
                surface.set_fill_color(46, 125, 50);
            }
            surface.draw_rect(bar_x, y, width, s.bar_height, PaintStyle::Fill, 1.2);

            let value = datum.count.to_string();
            surface.set_font_style(FontStyle::Bold, 8.0);
            if width >= s.inside_label_min {
                surface.set_text_color(255, 255, 255);
                surface.draw_text(&value, bar_x + width - 2.0, text_baseline, TextAlign::Right);
            } else {
                surface.set_text_color(30, 30, 30);
                surface.draw_text(&value, bar_x + width + 2.0, text_baseline, TextAlign::Left);
            }
        }

        surface.set_text_color(0, 0, 0);
        rows_top + entries.len() as f32 * s.row_pitch + s.trailing_gap
    }
}
