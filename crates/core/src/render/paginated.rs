// Paginated-Document (PDF) Renderer

use crate::domain::{OrderSnapshot, ReportFormat};
use crate::error::{AppError, Result};
use crate::render::{
    artifact_file_name, format_amount, format_header_timestamp, RenderedReport, ReportRenderer,
};
use bigdecimal::{BigDecimal, Zero};
use lopdf::{dictionary, Document, Object, Stream};

// Letter geometry, points
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN_LEFT: f64 = 50.0;
const TOP_Y: f64 = 742.0;
const LINE_HEIGHT: f64 = 14.0;
const LINES_PER_PAGE: usize = 48;

// Item table column x positions: product, quantity, unit price, total price
const COLUMNS: [f64; 4] = [50.0, 300.0, 380.0, 470.0];

/// One laid-out output line, paginated later.
enum Line {
    /// Full-width text at the left margin
    Text { text: String, bold: bool, size: u32 },
    /// Four-column table row
    Row { cells: [String; 4], bold: bool },
    Blank,
}

/// Page-oriented document with the same header block, item table and total
/// row as the delimited encoding. Layout is fixed-position Helvetica text;
/// only the data content is normative.
pub struct PaginatedDocumentRenderer;

impl ReportRenderer for PaginatedDocumentRenderer {
    fn render(&self, snapshot: &OrderSnapshot, generated_at_millis: i64) -> Result<RenderedReport> {
        let lines = layout_lines(snapshot, generated_at_millis)?;
        let bytes = build_document(&lines)?;
        let file_name = artifact_file_name(snapshot.id, ReportFormat::Pdf, generated_at_millis)?;
        Ok(RenderedReport { file_name, bytes })
    }
}

fn layout_lines(snapshot: &OrderSnapshot, generated_at_millis: i64) -> Result<Vec<Line>> {
    let mut lines = Vec::new();

    lines.push(Line::Text {
        text: "Order Report".to_string(),
        bold: true,
        size: 16,
    });
    lines.push(Line::Blank);
    lines.push(Line::Text {
        text: format!("Order ID: {}", snapshot.id),
        bold: false,
        size: 11,
    });
    lines.push(Line::Text {
        text: format!("Order Name: {}", snapshot.name),
        bold: false,
        size: 11,
    });
    lines.push(Line::Text {
        text: format!("Created: {}", format_header_timestamp(snapshot.created_at)?),
        bold: false,
        size: 11,
    });
    lines.push(Line::Text {
        text: format!(
            "Report Generated: {}",
            format_header_timestamp(generated_at_millis)?
        ),
        bold: false,
        size: 11,
    });
    lines.push(Line::Blank);

    lines.push(Line::Row {
        cells: [
            "Product".to_string(),
            "Quantity".to_string(),
            "Unit Price".to_string(),
            "Total Price".to_string(),
        ],
        bold: true,
    });

    let mut order_total = BigDecimal::zero();
    for item in &snapshot.items {
        let line_total = item.line_total();
        lines.push(Line::Row {
            cells: [
                item.product_name.clone(),
                item.quantity.to_string(),
                format_amount(&item.unit_price),
                format_amount(&line_total),
            ],
            bold: false,
        });
        order_total += line_total;
    }

    lines.push(Line::Blank);
    lines.push(Line::Row {
        cells: [
            "Total Order Value:".to_string(),
            String::new(),
            String::new(),
            format_amount(&order_total),
        ],
        bold: true,
    });

    Ok(lines)
}

fn build_document(lines: &[Line]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let regular_font_id = doc.new_object_id();
    let bold_font_id = doc.new_object_id();
    let resources_id = doc.new_object_id();

    doc.objects.insert(
        regular_font_id,
        Object::Dictionary(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        }),
    );
    doc.objects.insert(
        bold_font_id,
        Object::Dictionary(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        }),
    );
    doc.objects.insert(
        resources_id,
        Object::Dictionary(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_font_id,
                "F2" => bold_font_id,
            },
        }),
    );

    let page_count = lines.len().div_ceil(LINES_PER_PAGE).max(1);
    let mut page_ids = Vec::new();

    for page_num in 0..page_count {
        let start = page_num * LINES_PER_PAGE;
        let end = ((page_num + 1) * LINES_PER_PAGE).min(lines.len());
        let page_lines = if start < lines.len() {
            &lines[start..end]
        } else {
            &[]
        };

        let content_id = doc.new_object_id();
        let page_id = doc.new_object_id();

        let content = encode_page(page_lines);
        doc.objects.insert(
            content_id,
            Object::Stream(Stream::new(dictionary! {}, content.into_bytes())),
        );
        doc.objects.insert(
            page_id,
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
                "Resources" => resources_id,
                "Contents" => content_id,
            }),
        );
        page_ids.push(page_id);
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| (*id).into()).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| AppError::Render(format!("PDF encoding failed: {}", e)))?;

    Ok(buffer)
}

/// Encode one page of lines as a PDF content stream.
fn encode_page(lines: &[Line]) -> String {
    let mut content = String::new();
    let mut y = TOP_Y;

    for line in lines {
        match line {
            Line::Text { text, bold, size } => {
                push_text_run(&mut content, MARGIN_LEFT, y, text, *bold, *size);
            }
            Line::Row { cells, bold } => {
                for (x, cell) in COLUMNS.iter().zip(cells.iter()) {
                    if !cell.is_empty() {
                        push_text_run(&mut content, *x, y, cell, *bold, 11);
                    }
                }
            }
            Line::Blank => {}
        }
        y -= LINE_HEIGHT;
    }

    content
}

fn push_text_run(content: &mut String, x: f64, y: f64, text: &str, bold: bool, size: u32) {
    let font = if bold { "F2" } else { "F1" };
    content.push_str(&format!(
        "BT\n/{} {} Tf\n{} {} Td\n({}) Tj\nET\n",
        font,
        size,
        x,
        y,
        escape_pdf_string(text)
    ));
}

// WinAnsi text runs: printable ASCII passes through, the Latin-1 range is
// emitted as octal escapes (WinAnsi and Latin-1 agree on 0xA0-0xFF), anything
// beyond has no single-byte encoding and becomes a space.
fn escape_pdf_string(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '(' => "\\(".to_string(),
            ')' => "\\)".to_string(),
            '\\' => "\\\\".to_string(),
            c if c.is_ascii() && !c.is_control() => c.to_string(),
            c if ('\u{a0}'..='\u{ff}').contains(&c) => format!("\\{:03o}", c as u32),
            _ => " ".to_string(),
        })
        .collect()
}
