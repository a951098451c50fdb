//! Generic single-table report.

use crate::chrome::Chrome;
use crate::config::Orientation;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::output::sanitize_file_stem;
use crate::pipeline::{ReportAssembler, ReportContext};
use crate::table::{TableRenderer, TableSpec};

pub struct TableReport {
    pub title: String,
    pub subtitle: Option<String>,
    pub table: TableSpec,
    pub orientation: Option<Orientation>,
}

impl TableReport {
    pub fn new(title: &str, table: TableSpec) -> Self {
        Self {
            title: title.to_string(),
            subtitle: None,
            table,
            orientation: None,
        }
    }
}

impl ReportAssembler for TableReport {
    fn title(&self, _ctx: &ReportContext) -> String {
        self.title.clone()
    }

    fn subtitle(&self, _ctx: &ReportContext) -> Option<String> {
        self.subtitle.clone()
    }

    fn orientation(&self) -> Option<Orientation> {
        self.orientation
    }

    fn compose_body(&self, cursor: &mut Cursor, _chrome: &Chrome, ctx: &ReportContext) -> Result<()> {
        let start = cursor.y();
        TableRenderer::new(&ctx.config.labels.no_records).render(cursor, start, &self.table);
        Ok(())
    }

    fn file_name(&self) -> String {
        format!("{}.pdf", sanitize_file_stem(&self.title))
    }
}
