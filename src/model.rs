//! Input records handed over by the data layer, already joined and shaped.

use serde::{Deserialize, Serialize};

use crate::config::Labels;
use crate::table::TableSpec;

/// A joined relation that arrives either as one object or as a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relation<T> {
    Many(Vec<T>),
    One(T),
}

/// First element of a relation, whatever shape it arrived in.
pub fn first_of<T>(relation: &Relation<T>) -> Option<&T> {
    match relation {
        Relation::One(item) => Some(item),
        Relation::Many(items) => items.first(),
    }
}

/// `Some` only for text with something other than whitespace in it.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
}

/// One row of the aggregate report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateEntry {
    pub name: String,
    pub count: u64,
    pub created_at_display: String,
    #[serde(default)]
    pub authorship: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailSection {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub table: TableSpec,
}

/// A single entity with the tables that describe it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDetail {
    pub name: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub sections: Vec<DetailSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CultivationGuide {
    pub light: Option<String>,
    pub watering: Option<String>,
    pub soil: Option<String>,
    pub propagation: Option<String>,
    pub flowering: Option<String>,
}

impl CultivationGuide {
    /// Present fields as `(label, value)`, in print order.
    pub fn fields<'a>(&'a self, labels: &'a Labels) -> Vec<(&'a str, &'a str)> {
        [
            (labels.light.as_str(), &self.light),
            (labels.watering.as_str(), &self.watering),
            (labels.soil.as_str(), &self.soil),
            (labels.propagation.as_str(), &self.propagation),
            (labels.flowering.as_str(), &self.flowering),
        ]
        .into_iter()
        .filter_map(|(label, value)| non_empty(value).map(|v| (label, v)))
        .collect()
    }
}

/// One species as shown on its fact sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactSheetRecord {
    pub scientific_name: String,
    pub author: Option<String>,
    pub family: Option<Relation<TaxonRef>>,
    pub popular_names: Option<String>,
    pub origin: Option<String>,
    pub description: Option<String>,
    pub local_occurrence: Option<String>,
    pub images: Option<Relation<ImageRef>>,
    pub cultivation: CultivationGuide,
    pub notes: Option<String>,
    pub coordinates: Option<String>,
}

impl FactSheetRecord {
    pub fn family_name(&self) -> Option<&str> {
        self.family
            .as_ref()
            .and_then(first_of)
            .map(|f| f.name.as_str())
    }

    pub fn image_url(&self) -> Option<&str> {
        self.images
            .as_ref()
            .and_then(first_of)
            .map(|i| i.url.trim())
            .filter(|u| !u.is_empty())
    }
}

/// Which optional section set the caller is entitled to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// Visitors and growers: cultivation guide.
    #[default]
    Public,
    /// Collection staff: field notes and coordinates.
    Researcher,
}

/// The calling role, as computed by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Viewer {
    pub audience: Audience,
    /// The caller works with the local collection, so local occurrence
    /// notes are preferred over the general description.
    pub local_context: bool,
}

/// Printable fields of one specimen label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelRecord {
    pub scientific_name: String,
    pub author: Option<String>,
    pub family: String,
    pub popular_name: Option<String>,
    pub collector: String,
    pub collector_number: Option<String>,
    pub date: String,
    pub locality: String,
    pub coordinates: Option<String>,
    pub habitat: Option<String>,
    pub morphology: Option<String>,
    pub notes: Option<String>,
    pub determinant: String,
    pub determination_date: Option<String>,
    pub number: Option<u32>,
}
