//! Narrative fact sheet for one species, with an embedded remote image.

use crate::chrome::Chrome;
use crate::config::{Labels, PageGeometry};
use crate::cursor::Cursor;
use crate::display_list::PaintStyle;
use crate::error::Result;
use crate::fonts::{ellipsize_to_width, FontStyle};
use crate::model::{non_empty, Audience, FactSheetRecord, Viewer};
use crate::output::sanitize_file_stem;
use crate::pipeline::{ensure_label_width, ReportAssembler, ReportContext};
use crate::surface::{Surface, TextAlign};

/// Width of the label column in labelled blocks.
pub const LABEL_WIDTH: f32 = 42.0;
/// Footprint of the image region, fetched or not.
pub const IMAGE_WIDTH: f32 = 64.0;
pub const IMAGE_HEIGHT: f32 = 64.0;
const COLUMN_GAP: f32 = 6.0;

/// The role-dependent second section, resolved once per document.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<'a> {
    Cultivation(Vec<(&'a str, &'a str)>),
    FieldNotes(Vec<(&'a str, &'a str)>),
}

impl<'a> Section<'a> {
    pub fn resolve(record: &'a FactSheetRecord, viewer: &Viewer, labels: &'a Labels) -> Self {
        match viewer.audience {
            Audience::Public => Section::Cultivation(record.cultivation.fields(labels)),
            Audience::Researcher => Section::FieldNotes(
                [
                    (labels.notes.as_str(), non_empty(&record.notes)),
                    (labels.coordinates.as_str(), non_empty(&record.coordinates)),
                ]
                .into_iter()
                .filter_map(|(label, value)| value.map(|v| (label, v)))
                .collect(),
            ),
        }
    }

    pub fn title<'l>(&self, labels: &'l Labels) -> &'l str {
        match self {
            Section::Cultivation(_) => &labels.cultivation,
            Section::FieldNotes(_) => &labels.field_notes,
        }
    }

    pub fn fields(&self) -> &[(&'a str, &'a str)] {
        match self {
            Section::Cultivation(fields) | Section::FieldNotes(fields) => fields,
        }
    }
}

/// Heading and text of the description block.
pub fn description<'a>(record: &'a FactSheetRecord, viewer: &Viewer, labels: &'a Labels) -> (&'a str, Option<&'a str>) {
    match non_empty(&record.local_occurrence) {
        Some(local) if viewer.local_context => (labels.local_occurrence.as_str(), Some(local)),
        _ => (labels.description.as_str(), non_empty(&record.description)),
    }
}

/// Wrapped text stacked downwards in a fixed column, never past `bottom`.
struct TextColumn {
    x: f32,
    width: f32,
    y: f32,
    bottom: f32,
    clipped: bool,
}

impl TextColumn {
    fn new(x: f32, top: f32, width: f32, bottom: f32) -> Self {
        Self {
            x,
            width,
            y: top,
            bottom,
            clipped: false,
        }
    }

    /// Wrap `text` in the current font, one baseline every `lh`. Lines whose
    /// baseline would pass the bottom are dropped and the last one drawn ends
    /// in an ellipsis. Once clipped, later writes draw nothing.
    fn write(&mut self, surface: &mut Surface, text: &str, lh: f32) {
        if self.clipped {
            return;
        }
        let mut lines = surface.split_to_width(text, self.width);
        let room = ((self.bottom - self.y) / lh).floor().max(0.0) as usize;
        if lines.len() > room {
            self.clipped = true;
            lines.truncate(room);
            if let Some(last) = lines.last_mut() {
                *last = ellipsize_to_width(last, surface.font(), self.width, surface.fonts());
            }
        }
        for line in &lines {
            self.y += lh;
            surface.draw_text(line, self.x, self.y, TextAlign::Left);
        }
    }

    fn skip(&mut self, dy: f32) {
        self.y = (self.y + dy).min(self.bottom);
    }
}

pub struct FactSheet {
    pub record: FactSheetRecord,
    pub viewer: Viewer,
}

impl FactSheet {
    pub fn new(record: FactSheetRecord, viewer: Viewer) -> Self {
        Self { record, viewer }
    }

    /// Taxonomy text in the left column. Returns the Y below it.
    fn draw_taxonomy(&self, surface: &mut Surface, mut column: TextColumn, labels: &Labels) -> f32 {
        if let Some(family) = self.record.family_name() {
            surface.set_text_color(110, 110, 110);
            surface.set_font_style(FontStyle::Bold, 9.0);
            let line = format!("{}: {}", labels.family, family.to_uppercase());
            column.write(surface, &line, 4.0);
            column.skip(2.0);
        }

        surface.set_text_color(27, 94, 32);
        surface.set_font_style(FontStyle::BoldItalic, 16.0);
        let name_lh = surface.line_height(1.2);
        column.write(surface, &self.record.scientific_name, name_lh);

        surface.set_text_color(60, 60, 60);
        if let Some(author) = non_empty(&self.record.author) {
            surface.set_font_style(FontStyle::Normal, 10.0);
            let lh = surface.line_height(1.3);
            column.write(surface, author, lh);
        }

        surface.set_text_color(0, 0, 0);
        let extras = [
            (labels.popular_name.as_str(), non_empty(&self.record.popular_names)),
            (labels.origin.as_str(), non_empty(&self.record.origin)),
        ];
        for (label, value) in extras {
            let Some(value) = value else { continue };
            column.skip(3.0);
            surface.set_font_style(FontStyle::Bold, 9.0);
            let lh = surface.line_height(1.35);
            column.write(surface, label, lh);
            surface.set_font_style(FontStyle::Normal, 9.0);
            column.write(surface, value, lh);
        }

        if column.clipped {
            log::debug!("fact sheet: taxonomy of {} cut at the page bottom", self.record.scientific_name);
        }
        column.y
    }

    /// Fetched image in the right column, or a placeholder box of the same footprint.
    fn draw_image(&self, surface: &mut Surface, x: f32, top: f32, ctx: &ReportContext) {
        let fetched = self.record.image_url().and_then(|url| ctx.images.fetch(url));
        match fetched {
            Some(image) => {
                let (w, h) = image.fit_within(IMAGE_WIDTH, IMAGE_HEIGHT);
                surface.draw_image(
                    &image,
                    x + (IMAGE_WIDTH - w) / 2.0,
                    top + (IMAGE_HEIGHT - h) / 2.0,
                    w,
                    h,
                );
            }
            None => {
                log::debug!("fact sheet: placeholder for {}", self.record.scientific_name);
                surface.set_fill_color(238, 238, 238);
                surface.set_draw_color(200, 200, 200);
                surface.draw_rect(x, top, IMAGE_WIDTH, IMAGE_HEIGHT, PaintStyle::FillStroke, 2.0);
                surface.set_text_color(140, 140, 140);
                surface.set_font_style(FontStyle::Italic, 9.0);
                surface.draw_text(
                    &ctx.config.labels.image_unavailable,
                    x + IMAGE_WIDTH / 2.0,
                    top + IMAGE_HEIGHT / 2.0 + 1.0,
                    TextAlign::Center,
                );
                surface.set_text_color(0, 0, 0);
            }
        }
    }

    fn print_fields(cursor: &mut Cursor, fields: &[(&str, &str)], no_data: &str) {
        if fields.is_empty() {
            cursor.print_no_data(no_data);
            return;
        }
        for (label, value) in fields {
            cursor.print_labeled_block(label, value, LABEL_WIDTH);
        }
    }
}

impl ReportAssembler for FactSheet {
    fn title(&self, _ctx: &ReportContext) -> String {
        self.record.scientific_name.clone()
    }

    fn subtitle(&self, _ctx: &ReportContext) -> Option<String> {
        self.record.family_name().map(str::to_string)
    }

    fn validate(&self, _ctx: &ReportContext, page: &PageGeometry) -> Result<()> {
        ensure_label_width(LABEL_WIDTH, page.content_width())?;
        ensure_label_width(IMAGE_WIDTH + COLUMN_GAP, page.content_width())
    }

    fn compose_body(&self, cursor: &mut Cursor, _chrome: &Chrome, ctx: &ReportContext) -> Result<()> {
        let labels = &ctx.config.labels;
        let section = Section::resolve(&self.record, &self.viewer, labels);

        let page = *cursor.surface().geometry();
        let top = cursor.y();
        let image_x = page.right_edge() - IMAGE_WIDTH;
        let text_width = page.content_width() - IMAGE_WIDTH - COLUMN_GAP;

        // the image fetch completes before anything is drawn in its region
        self.draw_image(cursor.surface_mut(), image_x, top, ctx);
        let column = TextColumn::new(page.margins.left, top, text_width, cursor.safe_bottom());
        let text_bottom = self.draw_taxonomy(cursor.surface_mut(), column, labels);
        cursor.set_y(text_bottom.max(top + IMAGE_HEIGHT) + 8.0);

        let (heading, text) = description(&self.record, &self.viewer, labels);
        cursor.print_heading(heading);
        match text {
            Some(text) => cursor.print_paragraph(text, FontStyle::Normal),
            None => cursor.print_no_data(&labels.no_data),
        }
        cursor.advance(4.0);

        cursor.print_heading(section.title(labels));
        Self::print_fields(cursor, section.fields(), &labels.no_data);
        Ok(())
    }

    fn file_name(&self) -> String {
        format!("fact_sheet_{}.pdf", sanitize_file_stem(&self.record.scientific_name))
    }
}
