//! Single entity with any number of titled tables.

use crate::chrome::Chrome;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::fonts::FontStyle;
use crate::model::EntityDetail;
use crate::output::sanitize_file_stem;
use crate::pipeline::{ReportAssembler, ReportContext};
use crate::surface::TextAlign;
use crate::table::TableRenderer;

/// Gap after each section's table.
const SECTION_GAP: f32 = 6.0;

pub struct DetailReport {
    pub report_title: String,
    pub entity: EntityDetail,
}

impl DetailReport {
    pub fn new(report_title: &str, entity: EntityDetail) -> Self {
        Self {
            report_title: report_title.to_string(),
            entity,
        }
    }

    fn draw_entity_name(&self, cursor: &mut Cursor) {
        let page = *cursor.surface().geometry();
        let center = page.margins.left + page.content_width() / 2.0;
        let surface = cursor.surface_mut();
        surface.set_text_color(27, 94, 32);
        surface.set_font_style(FontStyle::Bold, 16.0);
        let line_height = surface.line_height(1.3);
        let lines = surface.split_to_width(&self.entity.name, page.content_width());
        let mut y = cursor.y();
        for line in &lines {
            y += line_height;
            cursor
                .surface_mut()
                .draw_text(line, center, y - line_height * 0.25, TextAlign::Center);
        }
        cursor.surface_mut().set_text_color(0, 0, 0);
        cursor.set_y(y + 6.0);
    }
}

impl ReportAssembler for DetailReport {
    fn title(&self, _ctx: &ReportContext) -> String {
        self.report_title.clone()
    }

    fn subtitle(&self, _ctx: &ReportContext) -> Option<String> {
        self.entity.subtitle.clone()
    }

    fn compose_body(&self, cursor: &mut Cursor, _chrome: &Chrome, ctx: &ReportContext) -> Result<()> {
        self.draw_entity_name(cursor);

        let tables = TableRenderer::new(&ctx.config.labels.no_records);
        for section in &self.entity.sections {
            cursor.check_break(cursor.line_height() * 2.0);
            if let Some(title) = section.title.as_deref() {
                cursor.print_heading(title);
            }
            if section.table.rows.is_empty() {
                cursor.print_no_data(&ctx.config.labels.no_records);
            } else {
                let start = cursor.y();
                tables.render(cursor, start, &section.table);
            }
            cursor.advance(SECTION_GAP);
        }
        Ok(())
    }

    fn file_name(&self) -> String {
        format!("{}.pdf", sanitize_file_stem(&self.entity.name))
    }
}
