// Delimited-Text (CSV) Renderer

use crate::domain::{OrderSnapshot, ReportFormat};
use crate::error::{AppError, Result};
use crate::render::{
    artifact_file_name, format_amount, format_header_timestamp, RenderedReport, ReportRenderer,
};
use bigdecimal::{BigDecimal, Zero};

/// Tabular text encoding: header block, one row per line item, trailing
/// total row. Rows have varying widths, hence the flexible writer.
pub struct DelimitedTextRenderer;

impl ReportRenderer for DelimitedTextRenderer {
    fn render(&self, snapshot: &OrderSnapshot, generated_at_millis: i64) -> Result<RenderedReport> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        let order_id = snapshot.id.to_string();
        let created = format_header_timestamp(snapshot.created_at)?;

        writer.write_record(["Order Report"]).map_err(encode_err)?;
        writer
            .write_record(["Order ID:", order_id.as_str()])
            .map_err(encode_err)?;
        writer
            .write_record(["Order Name:", snapshot.name.as_str()])
            .map_err(encode_err)?;
        writer
            .write_record(["Created:", created.as_str()])
            .map_err(encode_err)?;
        writer.write_record([""]).map_err(encode_err)?;

        writer
            .write_record(["Product", "Quantity", "Unit Price", "Total Price"])
            .map_err(encode_err)?;

        let mut order_total = BigDecimal::zero();
        for item in &snapshot.items {
            let line_total = item.line_total();
            let quantity = item.quantity.to_string();
            let unit_price = format_amount(&item.unit_price);
            let total_price = format_amount(&line_total);
            writer
                .write_record([
                    item.product_name.as_str(),
                    quantity.as_str(),
                    unit_price.as_str(),
                    total_price.as_str(),
                ])
                .map_err(encode_err)?;
            order_total += line_total;
        }

        writer.write_record([""]).map_err(encode_err)?;
        let total = format_amount(&order_total);
        writer
            .write_record(["Total Order Value:", "", "", total.as_str()])
            .map_err(encode_err)?;

        let bytes = writer.into_inner().map_err(encode_err)?;
        let file_name = artifact_file_name(snapshot.id, ReportFormat::Csv, generated_at_millis)?;

        Ok(RenderedReport { file_name, bytes })
    }
}

fn encode_err(err: impl std::fmt::Display) -> AppError {
    AppError::Render(format!("CSV encoding failed: {}", err))
}
