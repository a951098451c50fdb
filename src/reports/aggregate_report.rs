//! Aggregate report: cover with totals, bar chart, full sorted table.

use crate::chart::{ChartDatum, ChartRenderer, ChartStyle};
use crate::chrome::Chrome;
use crate::cursor::Cursor;
use crate::display_list::PaintStyle;
use crate::error::Result;
use crate::fonts::FontStyle;
use crate::model::AggregateEntry;
use crate::output::sanitize_file_stem;
use crate::pipeline::{ReportAssembler, ReportContext};
use crate::surface::{Surface, TextAlign};
use crate::table::{CellValue, ColumnStyle, TableRenderer, TableSpec};

/// Cover logo box edge.
const COVER_LOGO: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub entries: usize,
    pub total_count: u64,
    pub entries_with_records: usize,
}

impl Totals {
    pub fn of(entries: &[AggregateEntry]) -> Self {
        Self {
            entries: entries.len(),
            total_count: entries.iter().map(|e| e.count).sum(),
            entries_with_records: entries.iter().filter(|e| e.count > 0).count(),
        }
    }
}

pub struct AggregateReport {
    pub title: String,
    pub subtitle: Option<String>,
    /// Header of the name column ("Family", "Genus", ...).
    pub entity_label: String,
    pub entries: Vec<AggregateEntry>,
    /// Overrides the configured chart top-N.
    pub top_n: Option<usize>,
}

impl AggregateReport {
    pub fn new(title: &str, entity_label: &str, entries: Vec<AggregateEntry>) -> Self {
        Self {
            title: title.to_string(),
            subtitle: None,
            entity_label: entity_label.to_string(),
            entries,
            top_n: None,
        }
    }

    /// Entries ordered by count (desc), then name (asc).
    pub fn sorted_entries(&self) -> Vec<&AggregateEntry> {
        let mut sorted: Vec<&AggregateEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        sorted
    }

    fn table(&self) -> TableSpec {
        let rows = self
            .sorted_entries()
            .into_iter()
            .map(|e| {
                vec![
                    CellValue::from(e.name.as_str()),
                    CellValue::from(e.authorship.clone()),
                    CellValue::from(e.count),
                    CellValue::from(e.created_at_display.as_str()),
                ]
            })
            .collect();
        TableSpec::new(&[self.entity_label.as_str(), "Authorship", "Specimens", "Registered"], rows).with_styles(vec![
            ColumnStyle::italic().weight(3.0),
            ColumnStyle::muted().weight(2.5),
            ColumnStyle::numeric().weight(1.2),
            ColumnStyle::default().weight(1.6),
        ])
    }

    /// Largest top-N whose bars (plus a possible "Others" bar) fit in `available`.
    fn chart_top_n(&self, renderer: &ChartRenderer, requested: usize, available: f32) -> usize {
        let capacity = renderer.max_entries_for(available);
        let bars = |n: usize| n.min(self.entries.len()) + usize::from(self.entries.len() > n);
        let mut top_n = requested;
        while top_n > 0 && bars(top_n) > capacity {
            top_n -= 1;
        }
        if top_n < requested {
            log::debug!("aggregate: chart capped at top {} to fit {:.1}mm", top_n, available);
        }
        top_n
    }

    fn draw_cover_totals(&self, surface: &mut Surface, y: f32, ctx: &ReportContext) -> f32 {
        let page = *surface.geometry();
        let labels = &ctx.config.labels;
        let totals = Totals::of(&self.entries);
        let box_width = 120.0;
        let box_x = page.margins.left + (page.content_width() - box_width) / 2.0;
        let rows = [
            (labels.total_entries.as_str(), totals.entries.to_string()),
            (labels.total_count.as_str(), totals.total_count.to_string()),
            (labels.entries_with_records.as_str(), totals.entries_with_records.to_string()),
        ];
        let row_pitch = 9.0;
        let height = rows.len() as f32 * row_pitch + 8.0;

        surface.set_fill_color(242, 246, 242);
        surface.set_draw_color(46, 125, 50);
        surface.set_line_width(0.4);
        surface.draw_rect(box_x, y, box_width, height, PaintStyle::FillStroke, 3.0);
        surface.set_line_width(0.2);

        for (i, (label, value)) in rows.iter().enumerate() {
            let baseline = y + 10.0 + i as f32 * row_pitch;
            surface.set_text_color(60, 60, 60);
            surface.set_font_style(FontStyle::Normal, 11.0);
            surface.draw_text(label, box_x + 8.0, baseline, TextAlign::Left);
            surface.set_text_color(27, 94, 32);
            surface.set_font_style(FontStyle::Bold, 12.0);
            surface.draw_text(value, box_x + box_width - 8.0, baseline, TextAlign::Right);
        }
        surface.set_text_color(0, 0, 0);
        y + height
    }
}

impl ReportAssembler for AggregateReport {
    fn title(&self, _ctx: &ReportContext) -> String {
        self.title.clone()
    }

    fn subtitle(&self, _ctx: &ReportContext) -> Option<String> {
        self.subtitle.clone()
    }

    fn compose_cover(&self, surface: &mut Surface, chrome: &Chrome, ctx: &ReportContext) -> bool {
        let page = *surface.geometry();
        let center = page.margins.left + page.content_width() / 2.0;
        let mut y = page.margins.top + 30.0;

        if let Some(logo) = chrome.logo() {
            let (w, h) = logo.fit_within(COVER_LOGO, COVER_LOGO);
            surface.draw_image(logo, center - w / 2.0, y + (COVER_LOGO - h) / 2.0, w, h);
            y += COVER_LOGO + 10.0;
        }

        surface.set_text_color(27, 94, 32);
        surface.set_font_style(FontStyle::Bold, 24.0);
        surface.draw_text(&ctx.config.product_name, center, y + 10.0, TextAlign::Center);
        y += 22.0;

        surface.set_text_color(40, 40, 40);
        surface.set_font_style(FontStyle::Bold, 18.0);
        for line in surface.split_to_width(&self.title, page.content_width()) {
            y += 8.0;
            surface.draw_text(&line, center, y, TextAlign::Center);
        }
        if let Some(subtitle) = &self.subtitle {
            surface.set_font_style(FontStyle::Italic, 12.0);
            y += 8.0;
            surface.draw_text(subtitle, center, y, TextAlign::Center);
        }

        surface.set_draw_color(27, 94, 32);
        surface.set_line_width(0.6);
        y += 8.0;
        surface.draw_line(center - 40.0, y, center + 40.0, y);
        surface.set_line_width(0.2);

        y = self.draw_cover_totals(surface, y + 14.0, ctx);

        let labels = &ctx.config.labels;
        surface.set_text_color(110, 110, 110);
        surface.set_font_style(FontStyle::Normal, 10.0);
        let meta_y = (y + 30.0).min(page.safe_bottom());
        surface.draw_text(
            &format!("{}: {}", labels.generated_by, chrome.spec().generator.display()),
            center,
            meta_y,
            TextAlign::Center,
        );
        surface.draw_text(
            &format!("{}: {}", labels.generated_on, chrome.generated_on()),
            center,
            meta_y + 6.0,
            TextAlign::Center,
        );
        surface.set_text_color(0, 0, 0);
        true
    }

    fn compose_body(&self, cursor: &mut Cursor, chrome: &Chrome, ctx: &ReportContext) -> Result<()> {
        let labels = &ctx.config.labels;

        if self.entries.iter().any(|e| e.count > 0) {
            let renderer = ChartRenderer::new(ChartStyle::default(), &labels.others);
            let requested = self.top_n.unwrap_or(ctx.config.chart_top_n);
            let top_n = self.chart_top_n(&renderer, requested, cursor.remaining());
            let data: Vec<ChartDatum> = self
                .entries
                .iter()
                .map(|e| ChartDatum::new(e.name.as_str(), e.count))
                .collect();
            let start = cursor.y();
            let end = renderer.render(cursor.surface_mut(), &data, start, &labels.chart_title, top_n);
            cursor.set_y(end);
        } else {
            let start = cursor.y();
            let end = chrome.draw_notice_box(cursor.surface_mut(), start, &labels.no_chart_data);
            cursor.set_y(end);
        }

        let start = cursor.y();
        TableRenderer::new(&labels.no_records).render(cursor, start, &self.table());
        Ok(())
    }

    fn file_name(&self) -> String {
        format!("{}.pdf", sanitize_file_stem(&self.title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, count: u64) -> AggregateEntry {
        AggregateEntry {
            name: name.to_string(),
            count,
            created_at_display: "2026-01-01".to_string(),
            authorship: None,
        }
    }

    #[test]
    fn totals_from_entries() {
        let entries = vec![entry("Asteraceae", 4), entry("Poaceae", 0), entry("Fabaceae", 7)];
        assert_eq!(
            Totals::of(&entries),
            Totals {
                entries: 3,
                total_count: 11,
                entries_with_records: 2
            }
        );
    }

    #[test]
    fn sorted_by_count_then_name() {
        let report = AggregateReport::new(
            "Families",
            "Family",
            vec![entry("Poaceae", 2), entry("Fabaceae", 5), entry("Asteraceae", 2)],
        );
        let names: Vec<&str> = report.sorted_entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Fabaceae", "Asteraceae", "Poaceae"]);
    }

    #[test]
    fn chart_top_n_shrinks_to_fit() {
        let entries = (0..40).map(|i| entry(&format!("F{i}"), i + 1)).collect();
        let report = AggregateReport::new("Families", "Family", entries);
        let renderer = ChartRenderer::new(ChartStyle::default(), "Others");
        // 10 title + 8 gap + 5 rows of 9
        let top_n = report.chart_top_n(&renderer, 30, 63.0);
        assert_eq!(top_n, 4);
        assert_eq!(report.chart_top_n(&renderer, 3, 500.0), 3);
    }
}
