//! Report configuration: branding, page geometry and the localisable strings
//! every document draws.
//!
//! All values have A4 defaults, and a config can be loaded from (partial)
//! JSON supplied by the hosting application.

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// A4 short edge in millimetres.
pub const A4_WIDTH_MM: f32 = 210.0;
/// A4 long edge in millimetres.
pub const A4_HEIGHT_MM: f32 = 297.0;

/// Page orientation for the generated PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Portrait mode: height > width (default).
    #[default]
    Portrait,
    /// Landscape mode: width > height.
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 12.0,
            right: 14.0,
            bottom: 10.0,
            left: 14.0,
        }
    }
}

/// Physical page plus the reserves that bound the content area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub orientation: Orientation,
    pub margins: Margins,
    /// Height kept free at the bottom of every page for the footer.
    pub footer_reserve: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            orientation: Orientation::Portrait,
            margins: Margins::default(),
            footer_reserve: 20.0,
        }
    }
}

impl PageGeometry {
    pub fn with_orientation(orientation: Orientation) -> Self {
        Self {
            orientation,
            ..Self::default()
        }
    }

    /// Effective page width after applying orientation.
    pub fn width(&self) -> f32 {
        match self.orientation {
            Orientation::Portrait => A4_WIDTH_MM,
            Orientation::Landscape => A4_HEIGHT_MM,
        }
    }

    /// Effective page height after applying orientation.
    pub fn height(&self) -> f32 {
        match self.orientation {
            Orientation::Portrait => A4_HEIGHT_MM,
            Orientation::Landscape => A4_WIDTH_MM,
        }
    }

    /// Last Y at which content may end without starting a new page.
    pub fn safe_bottom(&self) -> f32 {
        self.height() - self.footer_reserve
    }

    pub fn content_width(&self) -> f32 {
        self.width() - self.margins.left - self.margins.right
    }

    pub fn right_edge(&self) -> f32 {
        self.width() - self.margins.right
    }
}

/// User-facing strings. Defaults are English; the hosting application
/// swaps them for its locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub others: String,
    pub no_data: String,
    pub no_records: String,
    pub no_chart_data: String,
    /// `{page}` and `{total}` are substituted.
    pub page_of: String,
    pub generated_by: String,
    pub generated_on: String,
    pub description: String,
    pub local_occurrence: String,
    pub cultivation: String,
    pub field_notes: String,
    pub light: String,
    pub watering: String,
    pub soil: String,
    pub propagation: String,
    pub flowering: String,
    pub notes: String,
    pub coordinates: String,
    pub family: String,
    pub popular_name: String,
    pub origin: String,
    pub image_unavailable: String,
    pub total_entries: String,
    pub total_count: String,
    pub entries_with_records: String,
    pub chart_title: String,
    pub determination: String,
    pub locality: String,
    pub habitat: String,
    pub collector: String,
    pub collector_number: String,
    pub no_labels: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            others: "Others".into(),
            no_data: "No data available.".into(),
            no_records: "No records found.".into(),
            no_chart_data: "No records have been registered yet.".into(),
            page_of: "Page {page} of {total}".into(),
            generated_by: "Generated by".into(),
            generated_on: "Generated on".into(),
            description: "Description".into(),
            local_occurrence: "Local occurrence".into(),
            cultivation: "Cultivation guide".into(),
            field_notes: "Field notes".into(),
            light: "Light".into(),
            watering: "Watering".into(),
            soil: "Soil".into(),
            propagation: "Propagation".into(),
            flowering: "Flowering".into(),
            notes: "Notes".into(),
            coordinates: "GPS coordinates".into(),
            family: "Family".into(),
            popular_name: "Popular name".into(),
            origin: "Origin".into(),
            image_unavailable: "Image unavailable".into(),
            total_entries: "Entries".into(),
            total_count: "Total specimens".into(),
            entries_with_records: "Entries with specimens".into(),
            chart_title: "Specimens per entry".into(),
            determination: "Det.".into(),
            locality: "Locality".into(),
            habitat: "Habitat".into(),
            collector: "Col.".into(),
            collector_number: "No.".into(),
            no_labels: "No specimens selected for printing.".into(),
        }
    }
}

impl Labels {
    pub fn page_of(&self, page: usize, total: usize) -> String {
        self.page_of
            .replace("{page}", &page.to_string())
            .replace("{total}", &total.to_string())
    }
}

/// Configuration for every report the engine produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub product_name: String,
    pub confidentiality_line: String,
    /// Brand logo fetched once per process; `None` draws no logo.
    pub logo_url: Option<String>,
    /// Upper bound for any single remote image fetch.
    pub image_timeout_ms: u64,
    /// Responses larger than this are treated as failed fetches.
    pub image_max_bytes: u64,
    /// Entries shown individually in charts before bucketing into "Others".
    pub chart_top_n: usize,
    /// The two fixed heading lines printed on every specimen label.
    pub label_heading: [String; 2],
    /// `chrono` format string for the "generated on" stamp.
    pub date_format: String,
    pub page: PageGeometry,
    pub labels: Labels,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            product_name: "Specimen Catalog".into(),
            confidentiality_line: "Internal document. Do not distribute without authorization.".into(),
            logo_url: None,
            image_timeout_ms: 8_000,
            image_max_bytes: 10 * 1024 * 1024,
            chart_top_n: 10,
            label_heading: ["HERBARIUM".into(), "Specimen Collection".into()],
            date_format: "%Y-%m-%d %H:%M".into(),
            page: PageGeometry::default(),
            labels: Labels::default(),
        }
    }
}

impl ReportConfig {
    /// Deserialise from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Reject geometry that leaves no room for content.
    pub fn validate(&self) -> Result<()> {
        let page = &self.page;
        if page.content_width() <= 0.0 {
            return Err(ReportError::InvalidLayout(format!(
                "margins leave no content width ({:.1}mm)",
                page.content_width()
            )));
        }
        if page.safe_bottom() <= page.margins.top {
            return Err(ReportError::InvalidLayout(format!(
                "footer reserve {:.1}mm leaves no content height",
                page.footer_reserve
            )));
        }
        Ok(())
    }
}
