// Report Renderers
//
// Pure functions from (order snapshot, injected wall-clock) to artifact
// bytes plus a suggested filename. Renderers never touch the Job Repository
// and read no clock of their own, so identical input yields identical output.

pub mod delimited;
pub mod paginated;

pub use delimited::DelimitedTextRenderer;
pub use paginated::PaginatedDocumentRenderer;

use crate::domain::{OrderSnapshot, ReportFormat};
use crate::error::{AppError, Result};
use bigdecimal::BigDecimal;
use chrono::DateTime;

/// A rendered artifact: raw bytes plus the suggested filename.
pub struct RenderedReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Shared contract for the two output encodings.
pub trait ReportRenderer: Send + Sync {
    /// Render `snapshot` into an artifact.
    ///
    /// `generated_at_millis` is the injected generation wall-clock; it feeds
    /// the filename and any generated-at line in the output.
    fn render(&self, snapshot: &OrderSnapshot, generated_at_millis: i64) -> Result<RenderedReport>;
}

static DELIMITED: DelimitedTextRenderer = DelimitedTextRenderer;
static PAGINATED: PaginatedDocumentRenderer = PaginatedDocumentRenderer;

/// Select the renderer for a format (closed variant dispatch).
pub fn renderer_for(format: ReportFormat) -> &'static dyn ReportRenderer {
    match format {
        ReportFormat::Csv => &DELIMITED,
        ReportFormat::Pdf => &PAGINATED,
    }
}

/// `order_<id>_report_<timestamp>.<ext>`
pub fn artifact_file_name(
    order_id: i64,
    format: ReportFormat,
    generated_at_millis: i64,
) -> Result<String> {
    let ts = DateTime::from_timestamp_millis(generated_at_millis)
        .ok_or_else(|| AppError::Render(format!("Invalid timestamp: {}", generated_at_millis)))?;
    Ok(format!(
        "order_{}_report_{}.{}",
        order_id,
        ts.format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}

/// Currency figure with two decimal places
pub(crate) fn format_amount(value: &BigDecimal) -> String {
    value.with_scale(2).to_string()
}

/// Human-readable timestamp for report headers
pub(crate) fn format_header_timestamp(millis: i64) -> Result<String> {
    let ts = DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| AppError::Render(format!("Invalid timestamp: {}", millis)))?;
    Ok(ts.format("%Y-%m-%d %H:%M:%S").to_string())
}
