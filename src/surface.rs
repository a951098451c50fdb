//! Drawing surface – a page-oriented 2D drawing primitive.
//!
//! The surface owns the document's display list and the current drawing
//! state (active page, font, colours, line width). Every `draw_*` call
//! appends one [`DrawItem`] to the active page. Coordinates are millimetres
//! from the top-left corner of the page; text is positioned by its baseline.

use serde::{Deserialize, Serialize};

use crate::config::PageGeometry;
use crate::display_list::{DocumentLayout, DrawItem, PageLayout, PaintStyle, Rgb};
use crate::fonts::{split_to_width, FontManager, FontSpec, FontStyle, HELVETICA};
use crate::image_fetch::EncodedImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

pub struct Surface {
    layout: DocumentLayout,
    geometry: PageGeometry,
    active: usize,
    font: FontSpec,
    text_color: Rgb,
    fill_color: Rgb,
    draw_color: Rgb,
    line_width: f32,
    fonts: FontManager,
}

impl Surface {
    /// Create a document with one empty page.
    pub fn new(title: &str, geometry: PageGeometry) -> Self {
        let mut layout = DocumentLayout::new(title, geometry.width(), geometry.height());
        layout.pages.push(PageLayout::default());
        Self {
            layout,
            geometry,
            active: 0,
            font: FontSpec::default(),
            text_color: Rgb::BLACK,
            fill_color: Rgb::WHITE,
            draw_color: Rgb::BLACK,
            line_width: 0.2,
            fonts: FontManager::new(),
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn fonts(&self) -> &FontManager {
        &self.fonts
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    /// Append a page and make it active. Returns its index.
    pub fn add_page(&mut self) -> usize {
        let index = self.layout.pages.len();
        self.layout.pages.push(PageLayout {
            page_index: index,
            items: Vec::new(),
        });
        self.active = index;
        log::debug!("surface: started page {}", index + 1);
        index
    }

    /// Switch the active page. Out-of-range indices are ignored.
    pub fn set_page(&mut self, index: usize) {
        if index < self.layout.pages.len() {
            self.active = index;
        } else {
            log::warn!(
                "surface: page {} requested but document has {}",
                index,
                self.layout.pages.len()
            );
        }
    }

    pub fn active_page(&self) -> usize {
        self.active
    }

    pub fn page_count(&self) -> usize {
        self.layout.pages.len()
    }

    /// Select family, style and size. Only the builtin Helvetica family is
    /// available; any other family is replaced by it.
    pub fn set_font(&mut self, family: &str, style: FontStyle, size: f32) {
        if !family.eq_ignore_ascii_case(HELVETICA) {
            log::warn!("surface: font family \"{family}\" is not available, using {HELVETICA}");
        }
        self.font = FontSpec {
            family: HELVETICA.to_string(),
            style,
            size,
        };
    }

    /// Change style and size, keeping the family.
    pub fn set_font_style(&mut self, style: FontStyle, size: f32) {
        self.font.style = style;
        self.font.size = size;
    }

    pub fn set_text_color(&mut self, r: u8, g: u8, b: u8) {
        self.text_color = Rgb(r, g, b);
    }

    pub fn set_fill_color(&mut self, r: u8, g: u8, b: u8) {
        self.fill_color = Rgb(r, g, b);
    }

    pub fn set_draw_color(&mut self, r: u8, g: u8, b: u8) {
        self.draw_color = Rgb(r, g, b);
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    /// Width of `text` in the current font.
    pub fn measure_text(&self, text: &str) -> f32 {
        self.fonts.measure_text_width(text, &self.font)
    }

    /// Wrap `text` in the current font so every line fits `max_width`.
    pub fn split_to_width(&self, text: &str, max_width: f32) -> Vec<String> {
        split_to_width(text, &self.font, max_width, &self.fonts)
    }

    /// Baseline-to-baseline distance for the current font.
    pub fn line_height(&self, factor: f32) -> f32 {
        self.font.line_height_mm(factor)
    }

    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, align: TextAlign) {
        if text.is_empty() {
            return;
        }
        let x = match align {
            TextAlign::Left => x,
            TextAlign::Center => x - self.measure_text(text) / 2.0,
            TextAlign::Right => x - self.measure_text(text),
        };
        self.push(DrawItem::Text {
            x,
            y,
            text: text.to_string(),
            font: self.font.clone(),
            color: self.text_color,
        });
    }

    pub fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.push(DrawItem::Line {
            x1,
            y1,
            x2,
            y2,
            width: self.line_width,
            color: self.draw_color,
        });
    }

    pub fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32, paint: PaintStyle, corner_radius: f32) {
        let corner_radius = corner_radius.clamp(0.0, width.min(height).max(0.0) / 2.0);
        self.push(DrawItem::Rect {
            x,
            y,
            width,
            height,
            paint,
            corner_radius,
            fill: self.fill_color,
            stroke: self.draw_color,
            line_width: self.line_width,
        });
    }

    /// Place an encoded image. Never fails; undecodable data is skipped at
    /// render time.
    pub fn draw_image(&mut self, image: &EncodedImage, x: f32, y: f32, width: f32, height: f32) {
        self.push(DrawItem::Image {
            x,
            y,
            width,
            height,
            src: image.data_uri.clone(),
        });
    }

    pub fn layout(&self) -> &DocumentLayout {
        &self.layout
    }

    pub fn into_layout(self) -> DocumentLayout {
        self.layout
    }

    fn push(&mut self, item: DrawItem) {
        self.layout.pages[self.active].items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_one_page() {
        let surface = Surface::new("t", PageGeometry::default());
        assert_eq!(surface.page_count(), 1);
        assert_eq!(surface.active_page(), 0);
    }

    #[test]
    fn draws_land_on_active_page() {
        let mut surface = Surface::new("t", PageGeometry::default());
        surface.add_page();
        surface.draw_text("second", 10.0, 20.0, TextAlign::Left);
        surface.set_page(0);
        surface.draw_text("first", 10.0, 20.0, TextAlign::Left);
        let layout = surface.into_layout();
        assert!(layout.pages[0].contains_text("first"));
        assert!(layout.pages[1].contains_text("second"));
        assert!(!layout.pages[0].contains_text("second"));
    }

    #[test]
    fn set_page_out_of_range_is_ignored() {
        let mut surface = Surface::new("t", PageGeometry::default());
        surface.set_page(7);
        assert_eq!(surface.active_page(), 0);
    }

    #[test]
    fn right_alignment_ends_at_anchor() {
        let mut surface = Surface::new("t", PageGeometry::default());
        surface.draw_text("Asteraceae", 100.0, 10.0, TextAlign::Right);
        let width = surface.measure_text("Asteraceae");
        match &surface.layout().pages[0].items[0] {
            DrawItem::Text { x, .. } => assert!((x + width - 100.0).abs() < 1e-4),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_family_falls_back_to_helvetica() {
        let mut surface = Surface::new("t", PageGeometry::default());
        surface.set_font("Times-Roman", FontStyle::Bold, 14.0);
        assert_eq!(surface.font().family, "helvetica");
        assert_eq!(surface.font().style, FontStyle::Bold);
        assert_eq!(surface.font().size, 14.0);

        surface.set_font("Helvetica", FontStyle::Normal, 9.0);
        let width = surface.measure_text("Ipê");
        surface.set_font("Courier", FontStyle::Normal, 9.0);
        assert_eq!(surface.measure_text("Ipê"), width);
    }

    #[test]
    fn corner_radius_is_clamped() {
        let mut surface = Surface::new("t", PageGeometry::default());
        surface.draw_rect(0.0, 0.0, 10.0, 4.0, PaintStyle::Fill, 9.0);
        match &surface.layout().pages[0].items[0] {
            DrawItem::Rect { corner_radius, .. } => assert_eq!(*corner_radius, 2.0),
            other => panic!("unexpected {other:?}"),
        }
    }
}
