//! Layout cursor – the current write position across a document's pages.
//!
//! The cursor owns the surface while a body is being composed. Every
//! component that lays out flowing content asks it for room with
//! [`Cursor::check_break`]; when the room is not there a new page is started
//! and, depending on the [`Continuation`] policy, compact chrome is redrawn.

use crate::chrome::Chrome;
use crate::fonts::FontStyle;
use crate::surface::{Surface, TextAlign};

/// Line factor applied to the body font size.
const LINE_FACTOR: f32 = 1.45;
/// Gap after each labelled block.
const BLOCK_GAP: f32 = 2.0;
/// Body text size in points.
pub const BODY_SIZE: f32 = 10.0;

/// What a freshly started page gets before content continues.
#[derive(Debug, Clone)]
pub enum Continuation {
    /// Nothing; content resumes at the top margin.
    Plain,
    /// Compact header, content resumes below it.
    CompactChrome(Chrome),
}

pub struct Cursor {
    surface: Surface,
    continuation: Continuation,
    y: f32,
    safe_bottom: f32,
    line_height: f32,
    block_gap: f32,
}

impl Cursor {
    pub fn new(surface: Surface, continuation: Continuation, start_y: f32) -> Self {
        let safe_bottom = surface.geometry().safe_bottom();
        let line_height = crate::fonts::FontSpec {
            size: BODY_SIZE,
            ..Default::default()
        }
        .line_height_mm(LINE_FACTOR);
        Self {
            surface,
            continuation,
            y: start_y,
            safe_bottom,
            line_height,
            block_gap: BLOCK_GAP,
        }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    pub fn advance(&mut self, dy: f32) {
        self.y += dy;
    }

    pub fn safe_bottom(&self) -> f32 {
        self.safe_bottom
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Height between the current Y and the safe bottom.
    pub fn remaining(&self) -> f32 {
        (self.safe_bottom - self.y).max(0.0)
    }

    pub fn content_width(&self) -> f32 {
        self.surface.geometry().content_width()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn into_surface(self) -> Surface {
        self.surface
    }

    /// Start a new page if `needed` more millimetres would cross the safe
    /// bottom. Returns whether a page was started.
    pub fn check_break(&mut self, needed: f32) -> bool {
        if self.y + needed > self.safe_bottom {
            self.new_page();
            true
        } else {
            false
        }
    }

    /// Y at which content resumes on a page started by [`Cursor::new_page`].
    pub fn content_top(&self) -> f32 {
        let page = self.surface.geometry();
        match &self.continuation {
            Continuation::Plain => page.margins.top,
            Continuation::CompactChrome(chrome) => chrome.content_top(page, true),
        }
    }

    /// Height available on a freshly started page.
    pub fn page_capacity(&self) -> f32 {
        self.safe_bottom - self.content_top()
    }

    /// Unconditionally start a new page and reset Y to its content top.
    pub fn new_page(&mut self) {
        self.surface.add_page();
        self.y = match &self.continuation {
            Continuation::Plain => self.surface.geometry().margins.top,
            Continuation::CompactChrome(chrome) => chrome.draw_header(&mut self.surface, true),
        };
    }

    /// Write a bold label with `text` wrapped beside it.
    ///
    /// The whole block moves to the next page when it does not fit, so the
    /// label is never separated from its first line. Blocks taller than the
    /// remaining page continue line by line on following pages.
    pub fn print_labeled_block(&mut self, label: &str, text: &str, label_width: f32) {
        let wrap_width = (self.content_width() - label_width).max(0.0);
        self.surface.set_font_style(FontStyle::Normal, BODY_SIZE);
        let lines = self.surface.split_to_width(text, wrap_width);
        let block_height = lines.len() as f32 * self.line_height;

        // A block taller than a whole page only needs its first line here.
        self.check_break(if block_height > self.page_capacity() {
            self.line_height
        } else {
            block_height
        });

        let left = self.surface.geometry().margins.left;
        let baseline = self.baseline_offset();
        self.surface.set_text_color(0, 0, 0);
        self.surface.set_font_style(FontStyle::Bold, BODY_SIZE);
        self.surface.draw_text(label, left, self.y + baseline, TextAlign::Left);

        self.surface.set_font_style(FontStyle::Normal, BODY_SIZE);
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                self.check_break(self.line_height);
            }
            self.surface
                .draw_text(line, left + label_width, self.y + baseline, TextAlign::Left);
            self.y += self.line_height;
        }
        self.y += self.block_gap;
    }

    /// Bold section heading with a thin rule under it.
    pub fn print_heading(&mut self, text: &str) {
        let height = self.line_height + 4.0;
        // keep the heading with at least one body line
        self.check_break(height + self.line_height);
        let page = *self.surface.geometry();
        let baseline = self.y + self.baseline_offset() + 1.0;
        self.surface.set_text_color(27, 94, 32);
        self.surface.set_font_style(FontStyle::Bold, 12.0);
        self.surface
            .draw_text(text, page.margins.left, baseline, TextAlign::Left);
        self.surface.set_draw_color(200, 200, 200);
        self.surface.set_line_width(0.2);
        let rule_y = self.y + self.line_height + 1.5;
        self.surface
            .draw_line(page.margins.left, rule_y, page.right_edge(), rule_y);
        self.surface.set_text_color(0, 0, 0);
        self.y += height;
    }

    /// Full-width wrapped body text, breaking pages between lines.
    pub fn print_paragraph(&mut self, text: &str, style: FontStyle) {
        let left = self.surface.geometry().margins.left;
        let width = self.content_width();
        self.surface.set_font_style(style, BODY_SIZE);
        let lines = self.surface.split_to_width(text, width);
        let baseline = self.baseline_offset();
        for line in &lines {
            self.check_break(self.line_height);
            self.surface.draw_text(line, left, self.y + baseline, TextAlign::Left);
            self.y += self.line_height;
        }
        self.y += self.block_gap;
    }

    /// Single italic line used wherever a section has nothing to show.
    pub fn print_no_data(&mut self, message: &str) {
        self.surface.set_text_color(120, 120, 120);
        self.print_paragraph(message, FontStyle::Italic);
        self.surface.set_text_color(0, 0, 0);
    }

    fn baseline_offset(&self) -> f32 {
        self.line_height * 0.72
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageGeometry;
    use crate::display_list::DrawItem;

    fn cursor_at(y: f32) -> Cursor {
        Cursor::new(Surface::new("t", PageGeometry::default()), Continuation::Plain, y)
    }

    fn text_y(cursor: &Cursor, page: usize, needle: &str) -> Option<f32> {
        cursor.surface().layout().pages.get(page)?.items.iter().find_map(|item| match item {
            DrawItem::Text { text, y, .. } if text == needle => Some(*y),
            _ => None,
        })
    }

    #[test]
    fn check_break_only_when_crossing_safe_bottom() {
        let mut cursor = cursor_at(270.0);
        assert!(!cursor.check_break(7.0));
        assert_eq!(cursor.surface().page_count(), 1);
        assert!(cursor.check_break(7.1));
        assert_eq!(cursor.surface().page_count(), 2);
        assert_eq!(cursor.y(), PageGeometry::default().margins.top);
    }

    #[test]
    fn block_that_does_not_fit_moves_whole_to_next_page() {
        let mut cursor = cursor_at(272.0);
        let text = "Full sun to partial shade, tolerates short dry periods once established.";
        cursor.print_labeled_block("Light", text, 60.0);
        assert_eq!(cursor.surface().page_count(), 2);
        assert!(text_y(&cursor, 0, "Light").is_none());
        let label_y = text_y(&cursor, 1, "Light").unwrap();
        let first_line = cursor.surface().layout().pages[1]
            .items
            .iter()
            .find_map(|item| match item {
                DrawItem::Text { text: t, y, .. } if t != "Light" => Some(*y),
                _ => None,
            })
            .unwrap();
        assert_eq!(label_y, first_line);
    }

    #[test]
    fn block_that_fits_stays_on_page() {
        let mut cursor = cursor_at(40.0);
        cursor.print_labeled_block("Soil", "Well drained, sandy.", 40.0);
        assert_eq!(cursor.surface().page_count(), 1);
        assert!(cursor.y() > 40.0);
    }

    #[test]
    fn oversized_block_never_writes_below_safe_bottom() {
        let mut cursor = cursor_at(30.0);
        let text = "word ".repeat(2000);
        cursor.print_labeled_block("Notes", &text, 40.0);
        assert!(cursor.surface().page_count() > 1);
        let safe = cursor.safe_bottom();
        for page in &cursor.surface().layout().pages {
            for item in &page.items {
                assert!(item.bottom() <= safe, "item below safe bottom: {item:?}");
            }
        }
    }

    #[test]
    fn label_column_wider_than_content_degrades() {
        let mut cursor = cursor_at(30.0);
        let content = cursor.content_width();
        cursor.print_labeled_block("X", "abc", content + 10.0);
        let texts: Vec<&str> = cursor.surface().layout().pages[0].texts().collect();
        assert_eq!(texts, vec!["X", "a", "b", "c"]);
    }

    #[test]
    fn compact_chrome_on_continuation_pages() {
        use crate::chrome::{ChromeSpec, Generator};
        use crate::config::ReportConfig;
        let spec = ChromeSpec {
            title: "Care".into(),
            subtitle: None,
            generator: Generator::default(),
            generated_at: chrono::NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        };
        let chrome = Chrome::new(spec, ReportConfig::default(), None);
        let mut cursor = Cursor::new(
            Surface::new("t", PageGeometry::default()),
            Continuation::CompactChrome(chrome),
            276.0,
        );
        cursor.check_break(10.0);
        assert!(cursor.surface().layout().pages[1].contains_text("Care"));
        assert!(cursor.y() > PageGeometry::default().margins.top);
    }
}
