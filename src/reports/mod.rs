//! The five document types, each a [`ReportAssembler`](crate::pipeline::ReportAssembler).

pub mod aggregate_report;
pub mod detail_report;
pub mod fact_sheet;
pub mod label_sheet;
pub mod table_report;

pub use aggregate_report::AggregateReport;
pub use detail_report::DetailReport;
pub use fact_sheet::{FactSheet, Section};
pub use label_sheet::LabelSheet;
pub use table_report::TableReport;
