//! # specimen-press – report and document generation for a specimen catalog
//!
//! This crate turns already-fetched catalog records into paginated PDF
//! documents. Every document goes through the same stages:
//!
//! 1. **Compose** – a report assembler ([`reports`]) lays its records out on a
//!    drawing [`surface`] through the layout [`cursor`], the [`table`] and
//!    [`chart`] renderers and the branded [`chrome`]
//! 2. **Record** – the surface keeps a serialisable display list
//!    ([`display_list`]) of every page
//! 3. **Render** – emit PDF bytes via printpdf ([`render`])
//!
//! [`pipeline`] wires the stages together; [`output`] names and saves the
//! resulting files. Remote images are fetched through [`image_fetch`].

pub mod chart;
pub mod chrome;
pub mod config;
pub mod cursor;
pub mod display_list;
pub mod error;
pub mod fonts;
pub mod image_fetch;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod reports;
pub mod surface;
pub mod table;

// Re-exports for convenience
pub use chrome::Generator;
pub use config::{Orientation, ReportConfig};
pub use error::{ReportError, Result};
pub use image_fetch::{HttpImageFetcher, ImageSource};
pub use pipeline::{compose, generate, generate_to, ReportAssembler, ReportContext};
