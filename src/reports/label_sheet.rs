//! Herbarium label sheets: four labels per A4 page in a fixed 2×2 grid.

use crate::chrome::Chrome;
use crate::config::{Labels, Orientation, ReportConfig};
use crate::cursor::Cursor;
use crate::display_list::PaintStyle;
use crate::error::Result;
use crate::fonts::{ellipsize_to_width, FontStyle};
use crate::model::{non_empty, LabelRecord};
use crate::pipeline::{ReportAssembler, ReportContext};
use crate::surface::{Surface, TextAlign};

pub const LABELS_PER_PAGE: usize = 4;
const COLUMNS: usize = 2;
const SHEET_MARGIN: f32 = 10.0;
const GUTTER: f32 = 6.0;
const PADDING: f32 = 4.0;
/// Height kept free at the bottom of each cell for the collector footer.
const FOOTER_RESERVE: f32 = 12.0;
const FIELD_SIZE: f32 = 8.5;
const FIELD_LINE_FACTOR: f32 = 1.35;

/// Position and size of one label on its page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Cell {
    /// Grid slot for the record at `index` on a page of `page_width × page_height`.
    pub fn for_index(index: usize, page_width: f32, page_height: f32) -> Self {
        let slot = index % LABELS_PER_PAGE;
        let rows = LABELS_PER_PAGE / COLUMNS;
        let width = (page_width - 2.0 * SHEET_MARGIN - GUTTER * (COLUMNS - 1) as f32) / COLUMNS as f32;
        let height = (page_height - 2.0 * SHEET_MARGIN - GUTTER * (rows - 1) as f32) / rows as f32;
        let (col, row) = (slot % COLUMNS, slot / COLUMNS);
        Self {
            x: SHEET_MARGIN + col as f32 * (width + GUTTER),
            y: SHEET_MARGIN + row as f32 * (height + GUTTER),
            width,
            height,
        }
    }

    fn inner_width(&self) -> f32 {
        self.width - 2.0 * PADDING
    }

    fn center(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Y below which only the footer may draw.
    pub fn footer_top(&self) -> f32 {
        self.y + self.height - PADDING - FOOTER_RESERVE
    }
}

pub struct LabelSheet {
    pub records: Vec<LabelRecord>,
}

impl LabelSheet {
    pub fn new(records: Vec<LabelRecord>) -> Self {
        Self { records }
    }
}

/// Draws one label into its cell.
struct LabelPainter<'a> {
    surface: &'a mut Surface,
    cell: Cell,
    labels: &'a Labels,
    y: f32,
}

impl<'a> LabelPainter<'a> {
    fn paint(surface: &'a mut Surface, cell: Cell, record: &LabelRecord, config: &'a ReportConfig, ordinal: u32) {
        let mut painter = Self {
            surface,
            cell,
            labels: &config.labels,
            y: cell.y + PADDING,
        };
        painter.border();
        painter.heading(&config.label_heading);
        painter.taxon(record);
        painter.fields(record);
        painter.footer(record, ordinal);
    }

    fn border(&mut self) {
        let c = self.cell;
        self.surface.set_draw_color(60, 60, 60);
        self.surface.set_line_width(0.3);
        self.surface.draw_rect(c.x, c.y, c.width, c.height, PaintStyle::Stroke, 0.0);
        self.surface.set_line_width(0.2);
    }

    fn heading(&mut self, lines: &[String; 2]) {
        let center = self.cell.center();
        self.surface.set_text_color(0, 0, 0);
        self.surface.set_font_style(FontStyle::Bold, 11.0);
        self.y += 5.0;
        self.surface.draw_text(&lines[0], center, self.y, TextAlign::Center);
        self.surface.set_font_style(FontStyle::Normal, 8.5);
        self.y += 4.5;
        self.surface.draw_text(&lines[1], center, self.y, TextAlign::Center);
        self.y += 2.5;
        self.surface.set_draw_color(120, 120, 120);
        let c = self.cell;
        self.surface.draw_line(c.x + PADDING, self.y, c.x + c.width - PADDING, self.y);
        self.y += 1.0;
    }

    fn taxon(&mut self, record: &LabelRecord) {
        let center = self.cell.center();
        let bottom = self.cell.footer_top();

        self.surface.set_font_style(FontStyle::Bold, 10.0);
        self.y += 6.0;
        self.surface
            .draw_text(&record.family.to_uppercase(), center, self.y, TextAlign::Center);

        let name = match non_empty(&record.author) {
            Some(author) => format!("{} {}", record.scientific_name, author),
            None => record.scientific_name.clone(),
        };
        self.surface.set_font_style(FontStyle::Italic, 10.0);
        let lh = self.surface.line_height(1.3);
        self.y += 1.0;
        for line in self.surface.split_to_width(&name, self.cell.inner_width()) {
            if self.y + lh > bottom {
                break;
            }
            self.y += lh;
            self.surface.draw_text(&line, center, self.y - lh * 0.25, TextAlign::Center);
        }
        self.y += 2.0;

        if let Some(popular) = non_empty(&record.popular_name) {
            let labels = self.labels;
            self.field(&labels.popular_name, popular);
        }
        self.y += 1.0;
    }

    fn fields(&mut self, record: &LabelRecord) {
        let labels = self.labels;

        let determination = match non_empty(&record.determination_date) {
            Some(date) => format!("{} ({})", record.determinant, date),
            None => record.determinant.clone(),
        };
        self.field(&labels.determination, &determination);

        let locality = match non_empty(&record.coordinates) {
            Some(coords) => format!("{} ({})", record.locality, coords),
            None => record.locality.clone(),
        };
        self.field(&labels.locality, &locality);

        if let Some(habitat) = non_empty(&record.habitat) {
            self.field(&labels.habitat, habitat);
        }

        let notes: Vec<&str> = [non_empty(&record.morphology), non_empty(&record.notes)]
            .into_iter()
            .flatten()
            .collect();
        if !notes.is_empty() {
            self.field(&labels.notes, &notes.join(". "));
        }
    }

    /// `label: value` with the value wrapped beside the bold label. Lines that
    /// would reach into the footer are dropped and the last kept line ends
    /// in an ellipsis.
    fn field(&mut self, label: &str, value: &str) {
        let x = self.cell.x + PADDING;
        let label_text = format!("{label}: ");

        self.surface.set_font_style(FontStyle::Bold, FIELD_SIZE);
        let label_width = self.surface.measure_text(&label_text);
        let lh = self.surface.line_height(FIELD_LINE_FACTOR);
        let wrap_width = (self.cell.inner_width() - label_width).max(0.0);

        let available = ((self.cell.footer_top() - self.y) / lh).floor().max(0.0) as usize;
        if available == 0 {
            return;
        }

        self.surface.set_font_style(FontStyle::Normal, FIELD_SIZE);
        let mut lines = self.surface.split_to_width(value, wrap_width);
        if lines.len() > available {
            log::debug!("label: {} cut from {} to {} line(s)", label, lines.len(), available);
            lines.truncate(available);
            if let Some(last) = lines.last_mut() {
                *last = ellipsize_to_width(last, self.surface.font(), wrap_width, self.surface.fonts());
            }
        }

        let baseline = lh * 0.75;
        self.surface.set_font_style(FontStyle::Bold, FIELD_SIZE);
        self.surface.draw_text(&label_text, x, self.y + baseline, TextAlign::Left);
        self.surface.set_font_style(FontStyle::Normal, FIELD_SIZE);
        for line in &lines {
            self.surface
                .draw_text(line, x + label_width, self.y + baseline, TextAlign::Left);
            self.y += lh;
        }
    }

    /// Collector, number and date at a fixed position at the bottom of the cell.
    fn footer(&mut self, record: &LabelRecord, ordinal: u32) {
        let c = self.cell;
        let left = c.x + PADDING;
        let right = c.x + c.width - PADDING;
        let rule_y = c.footer_top() + 2.0;
        let collector_y = rule_y + 4.5;
        let number_y = c.y + c.height - PADDING;

        self.surface.set_draw_color(120, 120, 120);
        self.surface.draw_line(left, rule_y, right, rule_y);

        let mut collector = format!("{}: {}", self.labels.collector, record.collector);
        if let Some(number) = non_empty(&record.collector_number) {
            collector.push_str(&format!("  {} {}", self.labels.collector_number, number));
        }
        self.surface.set_font_style(FontStyle::Normal, FIELD_SIZE);
        self.surface.draw_text(&record.date, right, collector_y, TextAlign::Right);
        let date_width = self.surface.measure_text(&record.date) + 3.0;
        let collector = ellipsize_if_wider(self.surface, &collector, c.inner_width() - date_width);
        self.surface.draw_text(&collector, left, collector_y, TextAlign::Left);

        self.surface.set_text_color(110, 110, 110);
        self.surface.set_font_style(FontStyle::Bold, 7.5);
        self.surface
            .draw_text(&format!("#{}", record.number.unwrap_or(ordinal)), right, number_y, TextAlign::Right);
        self.surface.set_text_color(0, 0, 0);
    }
}

fn ellipsize_if_wider(surface: &Surface, text: &str, max_width: f32) -> String {
    if surface.measure_text(text) <= max_width {
        text.to_string()
    } else {
        ellipsize_to_width(text, surface.font(), max_width, surface.fonts())
    }
}

impl ReportAssembler for LabelSheet {
    fn title(&self, _ctx: &ReportContext) -> String {
        "Specimen labels".to_string()
    }

    fn orientation(&self) -> Option<Orientation> {
        Some(Orientation::Portrait)
    }

    fn uses_chrome(&self) -> bool {
        false
    }

    fn compose_body(&self, cursor: &mut Cursor, _chrome: &Chrome, ctx: &ReportContext) -> Result<()> {
        let surface = cursor.surface_mut();
        let page = *surface.geometry();

        if self.records.is_empty() {
            surface.set_text_color(110, 110, 110);
            surface.set_font_style(FontStyle::Italic, 11.0);
            surface.draw_text(
                &ctx.config.labels.no_labels,
                page.width() / 2.0,
                page.margins.top + 20.0,
                TextAlign::Center,
            );
            surface.set_text_color(0, 0, 0);
            return Ok(());
        }

        for (index, record) in self.records.iter().enumerate() {
            if index > 0 && index % LABELS_PER_PAGE == 0 {
                surface.add_page();
            }
            let cell = Cell::for_index(index, page.width(), page.height());
            let ordinal = u32::try_from(index + 1).unwrap_or(u32::MAX);
            LabelPainter::paint(surface, cell, record, &ctx.config, ordinal);
        }
        log::debug!(
            "label sheet: {} label(s) on {} page(s)",
            self.records.len(),
            surface.page_count()
        );
        Ok(())
    }

    fn file_name(&self) -> String {
        "specimen_labels.pdf".to_string()
    }
}
