//! Integration tests for the specimen-press pipeline.
//!
//! These tests validate:
//! - Every report type produces a valid PDF
//! - Pagination, header repetition and footers land on the right pages
//! - Remote images degrade to a placeholder without failing generation
//! - Layout output is deterministic and can be saved to disk

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use sha2::{Digest, Sha256};

use specimen_press::chart::{bar_width, bucket_top_n, ChartDatum};
use specimen_press::config::{Margins, PageGeometry};
use specimen_press::cursor::{Continuation, Cursor};
use specimen_press::display_list::{DocumentLayout, DrawItem};
use specimen_press::image_fetch::{encode_image, EncodedImage};
use specimen_press::model::{
    AggregateEntry, Audience, CultivationGuide, DetailSection, EntityDetail, FactSheetRecord, ImageRef, LabelRecord,
    Relation, TaxonRef, Viewer,
};
use specimen_press::output::sanitize_file_stem;
use specimen_press::render::render_pdf;
use specimen_press::reports::fact_sheet::{IMAGE_HEIGHT, IMAGE_WIDTH};
use specimen_press::reports::{AggregateReport, DetailReport, FactSheet, LabelSheet, TableReport};
use specimen_press::surface::Surface;
use specimen_press::table::{CellValue, TableSpec};
use specimen_press::{
    compose, generate, generate_to, Generator, HttpImageFetcher, ImageSource, ReportAssembler, ReportConfig,
    ReportContext, ReportError,
};

// =====================================================================
// Helpers
// =====================================================================

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 14)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn curator() -> Generator {
    Generator {
        name: Some("Ana".to_string()),
        role: Some("curator".to_string()),
    }
}

struct NoImages;

impl ImageSource for NoImages {
    fn fetch(&self, _url: &str) -> Option<EncodedImage> {
        None
    }
}

fn context(images: &dyn ImageSource) -> ReportContext<'_> {
    init_logging();
    ReportContext::new(ReportConfig::default(), curator(), images).generated_at(fixed_time())
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(w, h, image::Rgb([200, 160, 20]));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// Serve `body` once on a loopback port and return its URL.
fn serve_once(body: Vec<u8>, content_type: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = Vec::new();
            let mut chunk = [0u8; 512];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&chunk[..n]),
                }
            }
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                content_type,
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
            let _ = stream.flush();
        }
    });
    format!("http://{addr}/photo.png")
}

fn entry(name: &str, count: u64) -> AggregateEntry {
    AggregateEntry {
        name: name.to_string(),
        count,
        created_at_display: "2026-01-02".to_string(),
        authorship: Some("L.".to_string()),
    }
}

fn label(i: usize, notes: &str) -> LabelRecord {
    LabelRecord {
        scientific_name: format!("Species {i}"),
        family: "Bromeliaceae".to_string(),
        collector: "M. Souza".to_string(),
        collector_number: Some(format!("{}", 100 + i)),
        date: "2025-11-03".to_string(),
        locality: "Trail to the waterfall".to_string(),
        coordinates: Some("-22.95, -43.21".to_string()),
        notes: Some(notes.to_string()),
        determinant: "R. Lima".to_string(),
        ..Default::default()
    }
}

fn ipe(image_url: Option<&str>) -> FactSheetRecord {
    FactSheetRecord {
        scientific_name: "Handroanthus albus".to_string(),
        author: Some("(Cham.) Mattos".to_string()),
        family: Some(Relation::Many(vec![TaxonRef {
            name: "Bignoniaceae".to_string(),
        }])),
        popular_names: Some("Ipê-amarelo".to_string()),
        description: Some("Deciduous tree flowering at the end of the dry season.".to_string()),
        local_occurrence: Some("Three adults along the main trail.".to_string()),
        images: image_url.map(|url| Relation::One(ImageRef { url: url.to_string() })),
        cultivation: CultivationGuide {
            light: Some("Full sun".to_string()),
            soil: Some("Deep and well drained".to_string()),
            ..Default::default()
        },
        notes: Some("Flowers visited by large bees.".to_string()),
        coordinates: Some("-22.9, -43.2".to_string()),
        ..Default::default()
    }
}

fn rects(layout: &DocumentLayout, page: usize) -> Vec<(f32, f32)> {
    layout.pages[page]
        .items
        .iter()
        .filter_map(|item| match item {
            DrawItem::Rect { width, height, .. } => Some((*width, *height)),
            _ => None,
        })
        .collect()
}

fn has_image(layout: &DocumentLayout, page: usize) -> bool {
    layout.pages[page]
        .items
        .iter()
        .any(|item| matches!(item, DrawItem::Image { .. }))
}

// =====================================================================
// Chart properties
// =====================================================================

#[test]
fn others_bucket_conserves_total() {
    let data: Vec<ChartDatum> = [10, 6, 4, 3, 2]
        .iter()
        .enumerate()
        .map(|(i, c)| ChartDatum::new(format!("F{i}"), *c))
        .collect();
    let rendered = bucket_top_n(&data, 3, "Others");
    let counts: Vec<u64> = rendered.iter().map(|d| d.count).collect();
    assert_eq!(counts, vec![10, 6, 4, 5]);
    assert_eq!(rendered[3].name, "Others");
    assert_eq!(counts.iter().sum::<u64>(), 25);
}

#[test]
fn bar_widths_are_proportional_with_a_floor() {
    assert!((bar_width(2, 10, 90.0, 5.0) - 18.0).abs() < 1e-4);
    assert_eq!(bar_width(0, 10, 90.0, 5.0), 5.0);
}

// =====================================================================
// Label sheet
// =====================================================================

#[test]
fn label_sheet_page_count_is_ceil_of_quarter() {
    let ctx = context(&NoImages);
    for n in 1usize..=9 {
        let records = (1..=n).map(|i| label(i, "Epiphyte on rock.")).collect();
        let layout = compose(&LabelSheet::new(records), &ctx).unwrap();
        assert_eq!(layout.pages.len(), n.div_ceil(4), "{n} labels");
    }
}

#[test]
fn fifth_label_starts_second_page_regardless_of_length() {
    let ctx = context(&NoImages);
    let long = "Rosette with spiny leaves and a pendent inflorescence. ".repeat(40);
    let records: Vec<LabelRecord> = (1..=5)
        .map(|i| label(i, if i % 2 == 0 { long.as_str() } else { "Short." }))
        .collect();
    let layout = compose(&LabelSheet::new(records), &ctx).unwrap();

    assert_eq!(layout.pages.len(), 2);
    assert!(layout.pages[0].contains_text("Species 4"));
    assert!(!layout.pages[0].contains_text("Species 5"));
    assert!(layout.pages[1].contains_text("Species 5"));
    assert!(layout.pages[1].contains_text("#5"));
}

#[test]
fn long_label_notes_are_truncated_with_ellipsis() {
    let ctx = context(&NoImages);
    let long = "Rosette with spiny leaves and a pendent inflorescence. ".repeat(40);
    let layout = compose(&LabelSheet::new(vec![label(1, &long)]), &ctx).unwrap();
    let page = &layout.pages[0];
    assert!(page.texts().any(|t| t.ends_with("...")));
    // the collector footer is always printed
    assert!(page.contains_text("2025-11-03"));
    assert_eq!(layout.count_text("Col.: M. Souza  No. 101"), 1);
}

#[test]
fn empty_label_sheet_has_notice() {
    let ctx = context(&NoImages);
    let layout = compose(&LabelSheet::new(Vec::new()), &ctx).unwrap();
    assert_eq!(layout.pages.len(), 1);
    assert!(layout.pages[0].contains_text("No specimens selected for printing."));
}

// =====================================================================
// Table and detail reports
// =====================================================================

#[test]
fn table_header_repeats_once_per_page() {
    let ctx = context(&NoImages);
    let rows = (1..=75)
        .map(|i| {
            vec![
                CellValue::from(format!("HB-{i:05}")),
                CellValue::from("Aechmea nudicaulis"),
                CellValue::from(i as i64),
            ]
        })
        .collect();
    let report = TableReport::new(
        "Specimens",
        TableSpec::new(&["Catalog number", "Species", "Sheet"], rows),
    );
    let layout = compose(&report, &ctx).unwrap();

    assert_eq!(layout.pages.len(), 3);
    assert_eq!(layout.count_text("Catalog number"), 3);
    for page in &layout.pages {
        assert_eq!(page.texts().filter(|t| *t == "Catalog number").count(), 1);
    }
    assert!(layout.pages[2].contains_text("Page 3 of 3"));
    assert!(layout.pages[1].contains_text("HB-00040") || layout.pages[1].contains_text("HB-00050"));
}

#[test]
fn detail_report_sections_and_empty_tables() {
    let ctx = context(&NoImages);
    let entity = EntityDetail {
        name: "Família Asteráceae".to_string(),
        subtitle: None,
        sections: vec![
            DetailSection {
                title: Some("Genera".to_string()),
                table: TableSpec::new(&["Genus"], vec![vec!["Baccharis".into()], vec!["Mikania".into()]]),
            },
            DetailSection {
                title: Some("Specimens".to_string()),
                table: TableSpec::new(&["Number"], Vec::new()),
            },
        ],
    };
    let report = DetailReport::new("Family detail", entity);
    let (bytes, layout) = generate(&report, &ctx).unwrap();
    assert_valid_pdf(&bytes);

    let page = &layout.pages[0];
    assert!(page.contains_text("Família Asteráceae"));
    assert!(page.contains_text("Genera"));
    assert!(page.contains_text("Mikania"));
    assert!(page.contains_text("No records found."));
    assert_eq!(report.file_name(), "fam_lia_aster_ceae.pdf");
}

#[test]
fn filename_sanitization_literal() {
    assert_eq!(sanitize_file_stem("Família Asteráceae"), "fam_lia_aster_ceae");
}

// =====================================================================
// Aggregate report
// =====================================================================

#[test]
fn aggregate_cover_is_exempt_from_footer() {
    let ctx = context(&NoImages);
    let entries = (0..60).map(|i| entry(&format!("Family {i:02}"), i % 7)).collect();
    let report = AggregateReport::new("Families", "Family", entries);
    let (bytes, layout) = generate(&report, &ctx).unwrap();
    assert_valid_pdf(&bytes);

    let total = layout.pages.len();
    assert!(total >= 3);
    assert!(!layout.pages[0].texts().any(|t| t.starts_with("Page ")));
    assert!(layout.pages[1].contains_text(&format!("Page 2 of {total}")));
    assert!(layout.pages[total - 1].contains_text(&format!("Page {total} of {total}")));
}

#[test]
fn aggregate_cover_totals_and_chart() {
    let ctx = context(&NoImages);
    let entries = vec![
        entry("Asteraceae", 4),
        entry("Poaceae", 0),
        entry("Fabaceae", 7),
    ];
    let layout = compose(&AggregateReport::new("Families", "Family", entries), &ctx).unwrap();

    let cover = &layout.pages[0];
    assert!(cover.contains_text("Total specimens"));
    assert!(cover.contains_text("11"));
    assert!(cover.contains_text("Generated by: Ana (curator)"));

    let body = &layout.pages[1];
    assert!(body.contains_text("Specimens per entry"));
    assert!(!body.contains_text("No records have been registered yet."));
    // table order: count desc, name asc
    let names: Vec<&str> = body
        .texts()
        .filter(|t| ["Asteraceae", "Poaceae", "Fabaceae"].contains(t))
        .collect();
    assert_eq!(names[names.len() - 3..], ["Fabaceae", "Asteraceae", "Poaceae"]);
}

#[test]
fn aggregate_without_counts_draws_notice() {
    let ctx = context(&NoImages);
    let entries = vec![entry("Asteraceae", 0), entry("Poaceae", 0)];
    let layout = compose(&AggregateReport::new("Families", "Family", entries), &ctx).unwrap();
    assert!(layout.pages[1].contains_text("No records have been registered yet."));
    assert!(!layout.pages[1].contains_text("Specimens per entry"));
}

#[test]
fn aggregate_chart_buckets_others() {
    let ctx = context(&NoImages);
    let entries = (0..25).map(|i| entry(&format!("Family {i:02}"), 30 - i)).collect();
    let mut report = AggregateReport::new("Families", "Family", entries);
    report.top_n = Some(5);
    let layout = compose(&report, &ctx).unwrap();
    assert!(layout.pages[1].contains_text("Others"));
}

// =====================================================================
// Fact sheet and remote images
// =====================================================================

#[test]
fn fact_sheet_survives_unreachable_image() {
    init_logging();
    let fetcher = HttpImageFetcher::new(Duration::from_millis(500), 1024 * 1024);
    let ctx = ReportContext::new(ReportConfig::default(), curator(), &fetcher).generated_at(fixed_time());
    let sheet = FactSheet::new(ipe(Some("http://127.0.0.1:9/ipe.jpg")), Viewer::default());

    let (bytes, layout) = generate(&sheet, &ctx).unwrap();
    assert_valid_pdf(&bytes);
    assert!(layout.pages[0].contains_text("Image unavailable"));
    assert!(rects(&layout, 0).contains(&(IMAGE_WIDTH, IMAGE_HEIGHT)));
    assert!(!has_image(&layout, 0));
}

#[test]
fn fact_sheet_embeds_fetched_image() {
    init_logging();
    let url = serve_once(png_bytes(40, 20), "image/png");
    let fetcher = HttpImageFetcher::new(Duration::from_secs(5), 1024 * 1024);
    let ctx = ReportContext::new(ReportConfig::default(), curator(), &fetcher).generated_at(fixed_time());
    let sheet = FactSheet::new(ipe(Some(&url)), Viewer::default());

    let (bytes, layout) = generate(&sheet, &ctx).unwrap();
    assert_valid_pdf(&bytes);
    assert!(has_image(&layout, 0));
    assert!(!layout.pages[0].contains_text("Image unavailable"));
}

#[test]
fn fetcher_rejects_non_image_body() {
    init_logging();
    let url = serve_once(b"<html>not here</html>".to_vec(), "text/html");
    let fetcher = HttpImageFetcher::new(Duration::from_secs(5), 1024 * 1024);
    assert!(fetcher.fetch(&url).is_none());
}

#[test]
fn fact_sheet_sections_follow_viewer() {
    let ctx = context(&NoImages);

    let public = compose(&FactSheet::new(ipe(None), Viewer::default()), &ctx).unwrap();
    assert!(public.count_text("Cultivation guide") == 1);
    assert_eq!(public.count_text("Field notes"), 0);
    assert!(public.pages[0].contains_text("Description"));
    assert!(public.pages[0].contains_text("Full sun"));

    let researcher = Viewer {
        audience: Audience::Researcher,
        local_context: true,
    };
    let staff = compose(&FactSheet::new(ipe(None), researcher), &ctx).unwrap();
    assert_eq!(staff.count_text("Cultivation guide"), 0);
    assert_eq!(staff.count_text("Field notes"), 1);
    assert!(staff.pages[0].contains_text("Local occurrence"));
    assert!(staff.pages[0].contains_text("Flowers visited by large bees."));
}

#[test]
fn fact_sheet_empty_section_prints_no_data() {
    let ctx = context(&NoImages);
    let record = FactSheetRecord {
        cultivation: CultivationGuide::default(),
        ..ipe(None)
    };
    let layout = compose(&FactSheet::new(record, Viewer::default()), &ctx).unwrap();
    assert!(layout.pages[0].contains_text("Cultivation guide"));
    assert!(layout.pages[0].contains_text("No data available."));
}

#[test]
fn fact_sheet_rejects_label_column_wider_than_content() {
    let mut config = ReportConfig::default();
    config.page.margins = Margins {
        top: 12.0,
        right: 85.0,
        bottom: 10.0,
        left: 85.0,
    };
    let ctx = ReportContext::new(config, curator(), &NoImages);
    let result = compose(&FactSheet::new(ipe(None), Viewer::default()), &ctx);
    assert!(matches!(result, Err(ReportError::InvalidLayout(_))));
}

// =====================================================================
// Cursor page-break atomicity
// =====================================================================

#[test]
fn labeled_block_moves_whole_to_next_page() {
    let surface = Surface::new("t", PageGeometry::default());
    let mut cursor = Cursor::new(surface, Continuation::Plain, 272.5);
    let text = "Water twice a week in summer and once every ten days in winter, never letting the pot stand in water.";
    cursor.print_labeled_block("Watering", text, 42.0);

    let layout = cursor.into_surface().into_layout();
    assert_eq!(layout.pages.len(), 2);
    assert!(layout.pages[0].items.is_empty());
    assert!(layout.pages[1].contains_text("Watering"));
}

// =====================================================================
// Output
// =====================================================================

#[test]
fn layout_is_deterministic() {
    let ctx = context(&NoImages);
    let report = AggregateReport::new(
        "Families",
        "Family",
        vec![entry("Asteraceae", 4), entry("Fabaceae", 7)],
    );
    let digest = |layout: DocumentLayout| Sha256::digest(layout.to_json().as_bytes());
    let first = digest(compose(&report, &ctx).unwrap());
    let second = digest(compose(&report, &ctx).unwrap());
    assert_eq!(first, second);
}

#[test]
fn render_from_layout_json() {
    let ctx = context(&NoImages);
    let layout = compose(&LabelSheet::new(vec![label(1, "Short.")]), &ctx).unwrap();
    let parsed = DocumentLayout::from_json(&layout.to_json()).unwrap();
    assert_eq!(parsed, layout);
    assert_valid_pdf(&render_pdf(&parsed).unwrap());
}

#[test]
fn generate_to_saves_under_default_name() {
    let ctx = context(&NoImages);
    let dir = tempfile::tempdir().unwrap();
    let sheet = FactSheet::new(ipe(None), Viewer::default());
    let path = generate_to(&sheet, &ctx, dir.path()).unwrap();
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "fact_sheet_handroanthus_albus.pdf"
    );
    assert_valid_pdf(&std::fs::read(path).unwrap());
}

#[test]
fn embedded_image_renders() {
    let image = encode_image(&png_bytes(4, 4)).unwrap();
    let mut surface = Surface::new("t", PageGeometry::default());
    surface.draw_image(&image, 20.0, 20.0, 30.0, 30.0);
    assert_valid_pdf(&render_pdf(&surface.into_layout()).unwrap());
}
