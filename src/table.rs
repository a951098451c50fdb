//! Auto-paginating tables.
//!
//! Rows are laid out top to bottom through a [`Cursor`]. Whenever the next
//! row would cross the safe bottom the cursor starts a new page (which runs
//! its continuation chrome) and the column header is drawn again, so a table
//! spanning N pages carries exactly N header rows.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cursor::Cursor;
use crate::display_list::{PaintStyle, Rgb};
use crate::fonts::{ellipsize_to_width, FontStyle};
use crate::surface::TextAlign;

/// One table cell as handed over by the data layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Text(String),
    Empty,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Empty => f.write_str("-"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<u64> for CellValue {
    fn from(value: u64) -> Self {
        CellValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

/// Per-column presentation overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnStyle {
    pub align: TextAlign,
    pub emphasis: FontStyle,
    pub color: Option<Rgb>,
    /// Relative width; columns without overrides share equally.
    pub weight: f32,
}

impl Default for ColumnStyle {
    fn default() -> Self {
        Self {
            align: TextAlign::Left,
            emphasis: FontStyle::Normal,
            color: None,
            weight: 1.0,
        }
    }
}

impl ColumnStyle {
    pub fn italic() -> Self {
        Self {
            emphasis: FontStyle::Italic,
            ..Self::default()
        }
    }

    pub fn muted() -> Self {
        Self {
            color: Some(Rgb(120, 120, 120)),
            ..Self::default()
        }
    }

    pub fn numeric() -> Self {
        Self {
            align: TextAlign::Right,
            ..Self::default()
        }
    }

    pub fn weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    #[serde(default)]
    pub column_styles: Vec<ColumnStyle>,
}

impl TableSpec {
    pub fn new(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
            column_styles: Vec::new(),
        }
    }

    pub fn with_styles(mut self, styles: Vec<ColumnStyle>) -> Self {
        self.column_styles = styles;
        self
    }

    fn style(&self, column: usize) -> ColumnStyle {
        self.column_styles.get(column).cloned().unwrap_or_default()
    }
}

/// A row after wrapping: lines per cell and the resulting height.
struct RowLayout {
    cells: Vec<Vec<String>>,
    height: f32,
}

pub struct TableRenderer {
    font_size: f32,
    padding: f32,
    line_factor: f32,
    header_fill: Rgb,
    zebra_fill: Rgb,
    no_records: String,
}

impl TableRenderer {
    pub fn new(no_records: &str) -> Self {
        Self {
            font_size: 9.0,
            padding: 1.8,
            line_factor: 1.25,
            header_fill: Rgb(46, 125, 50),
            zebra_fill: Rgb(242, 246, 242),
            no_records: no_records.to_string(),
        }
    }

    /// Lay the table out from `start_y` and return the Y where it ends.
    pub fn render(&self, cursor: &mut Cursor, start_y: f32, spec: &TableSpec) -> f32 {
        cursor.set_y(start_y);
        let widths = self.column_widths(cursor, spec);
        let line_height = crate::fonts::FontSpec {
            size: self.font_size,
            ..Default::default()
        }
        .line_height_mm(self.line_factor);

        let header = self.layout_header(cursor, spec, &widths, line_height);
        let rows: Vec<RowLayout> = spec
            .rows
            .iter()
            .map(|row| self.layout_row(cursor, spec, row, &widths, line_height, header.height))
            .collect();

        let first_height = rows.first().map(|r| r.height).unwrap_or(line_height + 2.0 * self.padding);
        cursor.check_break(header.height + first_height);
        self.draw_header(cursor, spec, &widths, &header, line_height);

        if rows.is_empty() {
            self.draw_no_records(cursor, first_height);
            return cursor.y();
        }

        let mut pages = 1;
        for (index, row) in rows.iter().enumerate() {
            if cursor.check_break(row.height) {
                pages += 1;
                self.draw_header(cursor, spec, &widths, &header, line_height);
            }
            self.draw_row(cursor, spec, &widths, row, index, line_height);
        }
        log::debug!(
            "table: {} rows over {} page(s), ends at {:.1}mm",
            rows.len(),
            pages,
            cursor.y()
        );
        cursor.y()
    }

    fn column_widths(&self, cursor: &Cursor, spec: &TableSpec) -> Vec<f32> {
        let weights: Vec<f32> = (0..spec.columns.len())
            .map(|i| spec.style(i).weight.max(0.0))
            .collect();
        let total: f32 = weights.iter().sum();
        let content = cursor.content_width();
        if total <= 0.0 {
            let n = spec.columns.len().max(1) as f32;
            return vec![content / n; spec.columns.len()];
        }
        weights.iter().map(|w| content * w / total).collect()
    }

    fn layout_header(&self, cursor: &mut Cursor, spec: &TableSpec, widths: &[f32], line_height: f32) -> RowLayout {
        let surface = cursor.surface_mut();
        surface.set_font_style(FontStyle::Bold, self.font_size);
        let cells: Vec<Vec<String>> = spec
            .columns
            .iter()
            .zip(widths)
            .map(|(title, w)| surface.split_to_width(title, w - 2.0 * self.padding))
            .collect();
        self.row_layout(cells, line_height)
    }

    /// Wrap one data row. Rows taller than a page are cut to fit with an ellipsis.
    fn layout_row(
        &self,
        cursor: &mut Cursor,
        spec: &TableSpec,
        row: &[CellValue],
        widths: &[f32],
        line_height: f32,
        header_height: f32,
    ) -> RowLayout {
        let max_lines = ((cursor.page_capacity() - header_height - 2.0 * self.padding) / line_height)
            .floor()
            .max(1.0) as usize;
        let surface = cursor.surface_mut();
        let cells = widths
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let style = spec.style(i);
                surface.set_font_style(style.emphasis, self.font_size);
                let text = row.get(i).cloned().unwrap_or(CellValue::Empty).to_string();
                let inner = w - 2.0 * self.padding;
                let mut lines = surface.split_to_width(&text, inner);
                if lines.len() > max_lines {
                    lines.truncate(max_lines);
                    if let Some(last) = lines.last_mut() {
                        *last = ellipsize_to_width(last, surface.font(), inner, surface.fonts());
                    }
                }
                lines
            })
            .collect();
        self.row_layout(cells, line_height)
    }

    fn row_layout(&self, cells: Vec<Vec<String>>, line_height: f32) -> RowLayout {
        let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        RowLayout {
            height: lines as f32 * line_height + 2.0 * self.padding,
            cells,
        }
    }

    fn draw_header(&self, cursor: &mut Cursor, spec: &TableSpec, widths: &[f32], header: &RowLayout, line_height: f32) {
        let y = cursor.y();
        let surface = cursor.surface_mut();
        let left = surface.geometry().margins.left;
        let total: f32 = widths.iter().sum();

        let Rgb(r, g, b) = self.header_fill;
        surface.set_fill_color(r, g, b);
        surface.draw_rect(left, y, total, header.height, PaintStyle::Fill, 0.0);

        surface.set_text_color(255, 255, 255);
        surface.set_font_style(FontStyle::Bold, self.font_size);
        let mut x = left;
        for (i, (lines, w)) in header.cells.iter().zip(widths).enumerate() {
            let align = spec.style(i).align;
            self.draw_cell(surface, lines, x, *w, y, align, line_height);
            x += w;
        }
        surface.set_text_color(0, 0, 0);
        cursor.advance(header.height);
    }

    fn draw_row(&self, cursor: &mut Cursor, spec: &TableSpec, widths: &[f32], row: &RowLayout, index: usize, line_height: f32) {
        let y = cursor.y();
        let surface = cursor.surface_mut();
        let left = surface.geometry().margins.left;
        let total: f32 = widths.iter().sum();

        if index % 2 == 1 {
            let Rgb(r, g, b) = self.zebra_fill;
            surface.set_fill_color(r, g, b);
            surface.draw_rect(left, y, total, row.height, PaintStyle::Fill, 0.0);
        }

        let mut x = left;
        for (i, (lines, w)) in row.cells.iter().zip(widths).enumerate() {
            let style = spec.style(i);
            let Rgb(r, g, b) = style.color.unwrap_or(Rgb::BLACK);
            surface.set_text_color(r, g, b);
            surface.set_font_style(style.emphasis, self.font_size);
            self.draw_cell(surface, lines, x, *w, y, style.align, line_height);
            x += w;
        }

        surface.set_draw_color(220, 220, 220);
        surface.set_line_width(0.1);
        surface.draw_line(left, y + row.height, left + total, y + row.height);
        surface.set_text_color(0, 0, 0);
        cursor.advance(row.height);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_cell(
        &self,
        surface: &mut crate::surface::Surface,
        lines: &[String],
        x: f32,
        width: f32,
        y: f32,
        align: TextAlign,
        line_height: f32,
    ) {
        let anchor = match align {
            TextAlign::Left => x + self.padding,
            TextAlign::Center => x + width / 2.0,
            TextAlign::Right => x + width - self.padding,
        };
        for (n, line) in lines.iter().enumerate() {
            let baseline = y + self.padding + line_height * (n as f32 + 0.75);
            surface.draw_text(line, anchor, baseline, align);
        }
    }

    fn draw_no_records(&self, cursor: &mut Cursor, height: f32) {
        let y = cursor.y();
        let surface = cursor.surface_mut();
        let left = surface.geometry().margins.left;
        surface.set_text_color(120, 120, 120);
        surface.set_font_style(FontStyle::Italic, self.font_size);
        surface.draw_text(&self.no_records, left + self.padding, y + height * 0.65, TextAlign::Left);
        surface.set_text_color(0, 0, 0);
        cursor.advance(height);
    }
}
