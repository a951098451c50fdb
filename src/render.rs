//! PDF renderer – takes a [`DocumentLayout`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).

use std::collections::{HashMap, HashSet};
use std::f32::consts::FRAC_PI_2;

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use printpdf::*;

use crate::display_list::{DocumentLayout, DrawItem, PaintStyle};
use crate::error::{ReportError, Result};
use crate::fonts::{FontStyle, MM_PER_PT};

/// Segments used to approximate each rounded corner.
const CORNER_SEGMENTS: usize = 6;

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

fn pt(mm: f32) -> Pt {
    Pt(mm / MM_PER_PT)
}

fn rgb(col: crate::display_list::Rgb) -> Color {
    let [r, g, b] = col.unit();
    Color::Rgb(Rgb {
        r,
        g,
        b,
        icc_profile: None,
    })
}

/// Render a DocumentLayout into PDF bytes.
///
/// Images whose data URI cannot be decoded are skipped with a `log::warn`.
pub fn render_pdf(layout: &DocumentLayout) -> Result<Vec<u8>> {
    if !(layout.page_width_mm > 0.0 && layout.page_height_mm > 0.0) {
        return Err(ReportError::Render(format!(
            "invalid page size {}x{}mm",
            layout.page_width_mm, layout.page_height_mm
        )));
    }
    let mut doc = PdfDocument::new(&layout.title);

    // ── Pre-register all images ────────────────────────────────────────────
    let mut all_srcs: HashSet<&str> = HashSet::new();
    for page in &layout.pages {
        for item in &page.items {
            if let DrawItem::Image { src, .. } = item {
                all_srcs.insert(src.as_str());
            }
        }
    }

    let mut images: HashMap<&str, ImageResource> = HashMap::new();
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    for src in all_srcs {
        if let Some(resource) = register_image(&mut doc, src, &mut warnings) {
            images.insert(src, resource);
        }
    }

    // ── Render pages ──────────────────────────────────────────────────────
    let page_h = layout.page_height_mm;
    let mut pages = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let mut ops = Vec::new();
        for item in &page.items {
            render_item(&mut ops, item, page_h, &images);
        }
        pages.push(PdfPage::new(
            Mm(layout.page_width_mm),
            Mm(layout.page_height_mm),
            ops,
        ));
    }

    if pages.is_empty() {
        pages.push(PdfPage::new(
            Mm(layout.page_width_mm),
            Mm(layout.page_height_mm),
            Vec::new(),
        ));
    }

    doc.with_pages(pages);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());
    log::debug!(
        "render: {} page(s), {} image(s), {} bytes",
        layout.pages.len(),
        images.len(),
        bytes.len()
    );
    Ok(bytes)
}

fn register_image(doc: &mut PdfDocument, src: &str, warnings: &mut Vec<PdfWarnMsg>) -> Option<ImageResource> {
    let bytes = match parse_data_uri(src) {
        Ok(b) => b,
        Err(e) => {
            log::warn!("skipping image: {e}");
            return None;
        }
    };
    let dyn_img = match ::image::load_from_memory(&bytes) {
        Ok(img) => img,
        Err(e) => {
            log::warn!("skipping image: decode error: {e}");
            return None;
        }
    };
    let raw = match RawImage::decode_from_bytes(&bytes, warnings) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("skipping image: PDF encode error: {e}");
            return None;
        }
    };
    Some(ImageResource {
        xobj_id: doc.add_image(&raw),
        px_width: dyn_img.width(),
        px_height: dyn_img.height(),
    })
}

/// Decode the payload of a `data:<mime>;base64,<data>` URI.
fn parse_data_uri(src: &str) -> std::result::Result<Vec<u8>, String> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| "image src is not a data URI".to_string())?;
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| "data URI has no `,` separator".to_string())?;
    if !header.ends_with(";base64") {
        return Err("data URI is not base64-encoded".to_string());
    }
    BASE64_STD
        .decode(data.trim())
        .map_err(|e| format!("base64 decode error: {e}"))
}

/// Encode a UTF-8 string as Windows-1252 bytes for the builtin fonts, which
/// use WinAnsiEncoding (one byte per glyph). Unmappable characters become `?`.
fn to_winansi(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{201A}' => 0x82,
            '\u{201E}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            '\u{00A0}' => b' ',
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect();
    // SAFETY: printpdf writes builtin-font text bytes straight into the
    // content stream; they are never read back as UTF-8.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

fn builtin_font(style: FontStyle) -> BuiltinFont {
    match style {
        FontStyle::BoldItalic => BuiltinFont::HelveticaBoldOblique,
        FontStyle::Bold => BuiltinFont::HelveticaBold,
        FontStyle::Italic => BuiltinFont::HelveticaOblique,
        FontStyle::Normal => BuiltinFont::Helvetica,
    }
}

fn point(x_mm: f32, y_mm: f32, page_h: f32) -> LinePoint {
    LinePoint {
        p: Point {
            x: pt(x_mm),
            y: pt(page_h - y_mm),
        },
        bezier: false,
    }
}

/// Outline of a (possibly rounded) rectangle in layout coordinates.
fn rect_outline(x: f32, y: f32, w: f32, h: f32, r: f32) -> Vec<(f32, f32)> {
    if r <= 0.0 {
        return vec![(x, y), (x + w, y), (x + w, y + h), (x, y + h)];
    }
    // Corner centres, clockwise from top-right, with each arc's start angle.
    let corners = [
        (x + w - r, y + r, -FRAC_PI_2),
        (x + w - r, y + h - r, 0.0),
        (x + r, y + h - r, FRAC_PI_2),
        (x + r, y + r, 2.0 * FRAC_PI_2),
    ];
    let mut points = Vec::with_capacity(4 * (CORNER_SEGMENTS + 1));
    for (cx, cy, start) in corners {
        for i in 0..=CORNER_SEGMENTS {
            let a = start + FRAC_PI_2 * i as f32 / CORNER_SEGMENTS as f32;
            points.push((cx + r * a.cos(), cy + r * a.sin()));
        }
    }
    points
}

fn render_item(ops: &mut Vec<Op>, item: &DrawItem, page_h: f32, images: &HashMap<&str, ImageResource>) {
    match item {
        DrawItem::Text {
            x,
            y,
            text,
            font,
            color,
        } => {
            let builtin = builtin_font(font.style);
            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: pt(*x),
                    y: pt(page_h - y),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(font.size),
                font: builtin,
            });
            ops.push(Op::SetFillColor { col: rgb(*color) });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(to_winansi(text))],
                font: builtin,
            });
            ops.push(Op::EndTextSection);
        }
        DrawItem::Line {
            x1,
            y1,
            x2,
            y2,
            width,
            color,
        } => {
            ops.push(Op::SetOutlineColor { col: rgb(*color) });
            ops.push(Op::SetOutlineThickness { pt: pt(*width) });
            ops.push(Op::DrawLine {
                line: Line {
                    points: vec![point(*x1, *y1, page_h), point(*x2, *y2, page_h)],
                    is_closed: false,
                },
            });
        }
        DrawItem::Rect {
            x,
            y,
            width,
            height,
            paint,
            corner_radius,
            fill,
            stroke,
            line_width,
        } => {
            if paint.fills() {
                ops.push(Op::SetFillColor { col: rgb(*fill) });
            }
            if paint.strokes() {
                ops.push(Op::SetOutlineColor { col: rgb(*stroke) });
                ops.push(Op::SetOutlineThickness { pt: pt(*line_width) });
            }
            let points = rect_outline(*x, *y, *width, *height, *corner_radius)
                .into_iter()
                .map(|(px, py)| point(px, py, page_h))
                .collect();
            ops.push(Op::DrawPolygon {
                polygon: Polygon {
                    rings: vec![PolygonRing { points }],
                    mode: match paint {
                        PaintStyle::Fill => PaintMode::Fill,
                        PaintStyle::Stroke => PaintMode::Stroke,
                        PaintStyle::FillStroke => PaintMode::FillStroke,
                    },
                    winding_order: WindingOrder::NonZero,
                },
            });
        }
        DrawItem::Image {
            x,
            y,
            width,
            height,
            src,
        } => {
            let Some(res) = images.get(src.as_str()) else {
                return;
            };
            // At dpi=72 printpdf renders 1 px = 1 pt, so
            // scale = desired_pt / px_dim.
            let scale_x = if res.px_width > 0 {
                pt(*width).0 / res.px_width as f32
            } else {
                1.0
            };
            let scale_y = if res.px_height > 0 {
                pt(*height).0 / res.px_height as f32
            } else {
                1.0
            };
            ops.push(Op::UseXobject {
                id: res.xobj_id.clone(),
                transform: XObjectTransform {
                    translate_x: Some(pt(*x)),
                    translate_y: Some(pt(page_h - y - height)),
                    dpi: Some(72.0),
                    scale_x: Some(scale_x),
                    scale_y: Some(scale_y),
                    rotate: None,
                },
            });
        }
    }
}
