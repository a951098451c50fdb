//! Repeating page chrome: the branded header and the paginated footer.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::{PageGeometry, ReportConfig};
use crate::display_list::PaintStyle;
use crate::fonts::FontStyle;
use crate::image_fetch::EncodedImage;
use crate::surface::{Surface, TextAlign};

const BRAND: (u8, u8, u8) = (27, 94, 32);
const MUTED: (u8, u8, u8) = (110, 110, 110);

/// Who asked for the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generator {
    pub name: Option<String>,
    pub role: Option<String>,
}

impl Generator {
    pub fn display(&self) -> String {
        match (self.name.as_deref(), self.role.as_deref()) {
            (Some(name), Some(role)) => format!("{name} ({role})"),
            (Some(name), None) => name.to_string(),
            (None, Some(role)) => role.to_string(),
            (None, None) => "-".to_string(),
        }
    }
}

/// Per-document header content. Immutable once generation starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ChromeSpec {
    pub title: String,
    pub subtitle: Option<String>,
    pub generator: Generator,
    pub generated_at: NaiveDateTime,
}

/// Header and footer renderer bound to one document.
#[derive(Debug, Clone)]
pub struct Chrome {
    spec: ChromeSpec,
    config: ReportConfig,
    logo: Option<EncodedImage>,
}

impl Chrome {
    pub fn new(spec: ChromeSpec, config: ReportConfig, logo: Option<EncodedImage>) -> Self {
        Self { spec, config, logo }
    }

    pub fn spec(&self) -> &ChromeSpec {
        &self.spec
    }

    pub fn logo(&self) -> Option<&EncodedImage> {
        self.logo.as_ref()
    }

    pub fn generated_on(&self) -> String {
        self.spec
            .generated_at
            .format(&self.config.date_format)
            .to_string()
    }

    /// Y at which body content begins below a header of either variant.
    pub fn content_top(&self, page: &PageGeometry, compact: bool) -> f32 {
        page.margins.top + Self::band(compact) + 6.0
    }

    fn band(compact: bool) -> f32 {
        if compact {
            12.0
        } else {
            21.0
        }
    }

    /// Draw the header on the active page and return the Y at which body
    /// content may begin. The compact variant is used on continuation pages.
    pub fn draw_header(&self, surface: &mut Surface, compact: bool) -> f32 {
        let page = *surface.geometry();
        let top = page.margins.top;
        let left = page.margins.left;
        let right = page.right_edge();
        let labels = &self.config.labels;

        let band = Self::band(compact);
        let (logo_size, name_size, title_size, meta_size) = if compact {
            (10.0, 10.0, 9.0, 7.0)
        } else {
            (18.0, 14.0, 12.0, 8.0)
        };

        let mut text_x = left;
        if let Some(logo) = &self.logo {
            let (w, h) = logo.fit_within(logo_size, logo_size);
            surface.draw_image(logo, left, top + (logo_size - h) / 2.0, w, h);
            text_x = left + logo_size + 4.0;
        }

        surface.set_text_color(BRAND.0, BRAND.1, BRAND.2);
        surface.set_font_style(FontStyle::Bold, name_size);
        let name_baseline = if compact { top + 5.0 } else { top + 7.0 };
        surface.draw_text(&self.config.product_name, text_x, name_baseline, TextAlign::Left);

        surface.set_text_color(40, 40, 40);
        surface.set_font_style(FontStyle::Bold, title_size);
        surface.draw_text(&self.spec.title, right, name_baseline, TextAlign::Right);

        surface.set_text_color(MUTED.0, MUTED.1, MUTED.2);
        surface.set_font_style(FontStyle::Normal, meta_size);
        let on_line = format!("{}: {}", labels.generated_on, self.generated_on());
        if compact {
            surface.draw_text(&on_line, right, top + 9.0, TextAlign::Right);
        } else {
            let by_line = format!("{}: {}", labels.generated_by, self.spec.generator.display());
            surface.draw_text(&by_line, right, top + 12.0, TextAlign::Right);
            surface.draw_text(&on_line, right, top + 16.0, TextAlign::Right);

            if let Some(subtitle) = &self.spec.subtitle {
                surface.set_font_style(FontStyle::Italic, 9.0);
                surface.draw_text(subtitle, text_x, top + 13.0, TextAlign::Left);
            }
        }

        surface.set_draw_color(BRAND.0, BRAND.1, BRAND.2);
        surface.set_line_width(if compact { 0.3 } else { 0.6 });
        surface.draw_line(left, top + band, right, top + band);

        surface.set_text_color(0, 0, 0);
        surface.set_line_width(0.2);
        self.content_top(&page, compact)
    }

    /// Draw the footer on every page from `from_page` on. Must run after all
    /// content has been emitted so the page total is final.
    pub fn draw_footer(&self, surface: &mut Surface, from_page: usize) {
        let page = *surface.geometry();
        let total = surface.page_count();
        let restore = surface.active_page();
        let divider_y = page.safe_bottom() + 5.0;
        let text_y = divider_y + 5.0;

        for index in from_page..total {
            surface.set_page(index);
            surface.set_draw_color(200, 200, 200);
            surface.set_line_width(0.2);
            surface.draw_line(page.margins.left, divider_y, page.right_edge(), divider_y);

            surface.set_text_color(MUTED.0, MUTED.1, MUTED.2);
            surface.set_font_style(FontStyle::Italic, 7.0);
            surface.draw_text(
                &self.config.confidentiality_line,
                page.margins.left,
                text_y,
                TextAlign::Left,
            );
            surface.set_font_style(FontStyle::Normal, 8.0);
            surface.draw_text(
                &self.config.labels.page_of(index + 1, total),
                page.right_edge(),
                text_y,
                TextAlign::Right,
            );
        }

        surface.set_page(restore);
        surface.set_text_color(0, 0, 0);
    }

    /// Bordered box with a centred message, used for "no data" notices.
    pub fn draw_notice_box(&self, surface: &mut Surface, y: f32, message: &str) -> f32 {
        let page = *surface.geometry();
        let height = 18.0;
        surface.set_fill_color(245, 245, 240);
        surface.set_draw_color(190, 190, 180);
        surface.draw_rect(
            page.margins.left,
            y,
            page.content_width(),
            height,
            PaintStyle::FillStroke,
            2.0,
        );
        surface.set_text_color(MUTED.0, MUTED.1, MUTED.2);
        surface.set_font_style(FontStyle::Italic, 10.0);
        surface.draw_text(
            message,
            page.margins.left + page.content_width() / 2.0,
            y + height / 2.0 + 1.5,
            TextAlign::Center,
        );
        surface.set_text_color(0, 0, 0);
        y + height + 6.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn chrome() -> Chrome {
        let spec = ChromeSpec {
            title: "Families".to_string(),
            subtitle: Some("All records".to_string()),
            generator: Generator {
                name: Some("Ana".to_string()),
                role: Some("curator".to_string()),
            },
            generated_at: NaiveDate::from_ymd_opt(2026, 3, 14)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        };
        Chrome::new(spec, ReportConfig::default(), None)
    }

    #[test]
    fn full_header_carries_metadata() {
        let mut surface = Surface::new("t", PageGeometry::default());
        let y = chrome().draw_header(&mut surface, false);
        let page = &surface.layout().pages[0];
        assert!(page.contains_text("Generated by: Ana (curator)"));
        assert!(page.contains_text("Generated on: 2026-03-14 09:30"));
        assert!(page.contains_text("All records"));
        assert!(y > 30.0);
    }

    #[test]
    fn compact_header_is_shorter_and_has_no_subtitle() {
        let mut surface = Surface::new("t", PageGeometry::default());
        let full = chrome().draw_header(&mut surface, false);
        surface.add_page();
        let compact = chrome().draw_header(&mut surface, true);
        assert!(compact < full);
        assert!(!surface.layout().pages[1].contains_text("All records"));
    }

    #[test]
    fn footer_numbers_every_page_from_start() {
        let mut surface = Surface::new("t", PageGeometry::default());
        surface.add_page();
        surface.add_page();
        chrome().draw_footer(&mut surface, 1);
        let layout = surface.layout();
        assert!(!layout.pages[0].contains_text("Page 1 of 3"));
        assert!(layout.pages[1].contains_text("Page 2 of 3"));
        assert!(layout.pages[2].contains_text("Page 3 of 3"));
    }

    #[test]
    fn generator_display_variants() {
        assert_eq!(Generator::default().display(), "-");
        let role_only = Generator {
            name: None,
            role: Some("admin".into()),
        };
        assert_eq!(role_only.display(), "admin");
    }
}
