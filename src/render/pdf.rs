use chrono::{DateTime, Local};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point, Polygon,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{format_money, format_percent};
use crate::billing::InvoiceSummary;
use crate::error::{AppError, AppResult};
use crate::models::{
    InventoryItem, Invoice, InvoiceItem, Quotation, QuotationRequest, QuoteComparison,
    ReorderSuggestion, TransactionKind, TransactionReport,
};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_X: f32 = 15.0;
const TOP_Y: f32 = 280.0;
const BOTTOM_Y: f32 = 20.0;
const ROW_H: f32 = 5.5;
const BODY_SIZE: f32 = 8.5;

// Rough Helvetica advance in mm per point of font size.
const CHAR_MM: f32 = 0.18;

fn pdf_err(e: impl std::fmt::Display) -> AppError {
    AppError::Pdf(e.to_string())
}

/// `{prefix}_{YYYYMMDD_HHMMSS}.pdf`, prefix reduced to filename-safe characters.
pub fn export_filename(prefix: &str, now: DateTime<Local>) -> String {
    let safe: String = prefix
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let safe = if safe.is_empty() { "document".to_string() } else { safe };
    format!("{}_{}.pdf", safe, now.format("%Y%m%d_%H%M%S"))
}

pub fn write_pdf(dir: &Path, prefix: &str, now: DateTime<Local>, bytes: &[u8]) -> AppResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(prefix, now));
    let mut file = BufWriter::new(File::create(&path)?);
    file.write_all(bytes)?;
    file.flush()?;
    tracing::info!("Wrote PDF {}", path.display());
    Ok(path)
}

struct Column {
    title: String,
    width: f32,
    numeric: bool,
}

fn col(title: impl Into<String>, width: f32, numeric: bool) -> Column {
    Column {
        title: title.into(),
        width,
        numeric,
    }
}

fn fit(text: &str, width: f32, size: f32) -> String {
    let max_chars = ((width - 1.5) / (size * CHAR_MM)).max(1.0) as usize;
    if text.chars().count() > max_chars {
        text.chars().take(max_chars.saturating_sub(2)).collect::<String>() + ".."
    } else {
        text.to_string()
    }
}

/// A4 document with a moving cursor; rows that would cross the bottom margin
/// start a new page.
struct PdfPages {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    title: String,
    y: f32,
    pages: usize,
}

impl PdfPages {
    fn new(title: &str) -> AppResult<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;

        let pages = PdfPages {
            doc,
            layer,
            regular,
            bold,
            title: title.to_string(),
            y: TOP_Y,
            pages: 1,
        };
        pages.footer();
        Ok(pages)
    }

    fn text(&self, x: f32, y: f32, size: f32, txt: &str) {
        self.layer.use_text(txt, size, Mm(x), Mm(y), &self.regular);
    }

    fn bold(&self, x: f32, y: f32, size: f32, txt: &str) {
        self.layer.use_text(txt, size, Mm(x), Mm(y), &self.bold);
    }

    fn right(&self, x_right: f32, y: f32, size: f32, txt: &str, bold: bool) {
        let x = x_right - txt.chars().count() as f32 * size * CHAR_MM;
        if bold {
            self.bold(x, y, size, txt);
        } else {
            self.text(x, y, size, txt);
        }
    }

    fn rule(&self, y: f32) {
        let line = Line::from_iter(vec![
            (Point::new(Mm(MARGIN_X), Mm(y)), false),
            (Point::new(Mm(PAGE_W - MARGIN_X), Mm(y)), false),
        ]);
        self.layer.add_line(line);
    }

    fn frame(&self, x: f32, y: f32, w: f32, h: f32) {
        let pts = vec![
            (Point::new(Mm(x), Mm(y)), false),
            (Point::new(Mm(x + w), Mm(y)), false),
            (Point::new(Mm(x + w), Mm(y + h)), false),
            (Point::new(Mm(x), Mm(y + h)), false),
        ];
        self.layer.add_polygon(Polygon {
            rings: vec![pts],
            mode: PaintMode::Stroke,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn footer(&self) {
        self.text(
            MARGIN_X,
            10.0,
            7.0,
            &format!("{} | page {}", self.title, self.pages),
        );
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Continued");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
        self.y = TOP_Y;
        self.footer();
    }

    /// Returns true when a page break happened.
    fn ensure(&mut self, needed: f32) -> bool {
        if self.y - needed < BOTTOM_Y {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn heading(&mut self, company: &str, heading: &str, fields: &[(&str, String)]) {
        self.bold(MARGIN_X, self.y, 16.0, company);
        self.right(PAGE_W - MARGIN_X, self.y, 14.0, heading, true);
        self.y -= 9.0;

        let visible: Vec<&(&str, String)> = fields.iter().filter(|(_, v)| !v.is_empty()).collect();
        let box_h = (visible.len().div_ceil(2) as f32 * 5.5 + 3.0).max(8.5);
        self.frame(MARGIN_X, self.y - box_h + 4.0, PAGE_W - 2.0 * MARGIN_X, box_h);

        for (i, (label, value)) in visible.iter().enumerate() {
            let x = if i % 2 == 0 { MARGIN_X + 3.0 } else { PAGE_W / 2.0 + 3.0 };
            self.bold(x, self.y, 9.0, &format!("{}:", label));
            self.text(x + 28.0, self.y, 9.0, value);
            if i % 2 == 1 || i + 1 == visible.len() {
                self.y -= 5.5;
            }
        }
        self.y -= 8.0;
    }

    fn table_header(&mut self, columns: &[Column]) {
        let mut x = MARGIN_X;
        for c in columns {
            if c.numeric {
                self.right(x + c.width - 1.0, self.y, BODY_SIZE, &c.title, true);
            } else {
                self.bold(x, self.y, BODY_SIZE, &fit(&c.title, c.width, BODY_SIZE));
            }
            x += c.width;
        }
        self.y -= 2.0;
        self.rule(self.y);
        self.y -= 4.0;
    }

    fn table(&mut self, columns: &[Column], rows: &[Vec<String>]) {
        self.ensure(ROW_H * 3.0);
        self.table_header(columns);

        for row in rows {
            if self.ensure(ROW_H) {
                self.table_header(columns);
            }
            let mut x = MARGIN_X;
            for (c, cell) in columns.iter().zip(row) {
                if c.numeric {
                    self.right(x + c.width - 1.0, self.y, BODY_SIZE, cell, false);
                } else {
                    self.text(x, self.y, BODY_SIZE, &fit(cell, c.width, BODY_SIZE));
                }
                x += c.width;
            }
            self.y -= ROW_H;
        }

        self.rule(self.y + ROW_H - 1.5);
        self.y -= 3.0;
    }

    fn totals(&mut self, rows: &[(&str, String)]) {
        self.ensure(rows.len() as f32 * ROW_H + 4.0);
        let label_right = PAGE_W - MARGIN_X - 40.0;
        for (label, value) in rows {
            self.right(label_right, self.y, 9.5, label, true);
            self.right(PAGE_W - MARGIN_X, self.y, 9.5, value, false);
            self.y -= ROW_H;
        }
    }

    fn note(&mut self, txt: &str) {
        for line in txt.lines() {
            self.ensure(ROW_H);
            self.text(MARGIN_X, self.y, 9.0, line);
            self.y -= ROW_H;
        }
    }

    fn finish(self) -> AppResult<Vec<u8>> {
        let mut writer = BufWriter::new(Vec::<u8>::new());
        self.doc.save(&mut writer).map_err(pdf_err)?;
        writer.into_inner().map_err(pdf_err)
    }
}

fn item_columns(with_tax: bool) -> Vec<Column> {
    let mut columns = vec![
        col("#", 8.0, false),
        col("Code", 25.0, false),
        col("Description", if with_tax { 57.0 } else { 72.0 }, false),
        col("Qty", 15.0, true),
        col("Unit", 15.0, false),
        col("Rate", 25.0, true),
    ];
    if with_tax {
        columns.push(col("Tax", 15.0, true));
    }
    columns.push(col("Amount", 20.0, true));
    columns
}

fn item_rows(items: &[InvoiceItem], with_tax: bool) -> Vec<Vec<String>> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let mut row = vec![
                (idx + 1).to_string(),
                item.article_code.clone(),
                item.description.clone(),
                item.quantity.to_string(),
                item.unit.clone(),
                format_money(item.rate),
            ];
            if with_tax {
                row.push(format_percent(item.tax_percentage));
            }
            row.push(format_money(item.total_amount));
            row
        })
        .collect()
}

pub fn invoice_pdf(invoice: &Invoice, summary: &InvoiceSummary) -> AppResult<Vec<u8>> {
    let is_sale = invoice.kind == TransactionKind::Sale;
    let (heading, party_label) = if is_sale {
        ("SALE INVOICE", "Customer")
    } else {
        ("PURCHASE INVOICE", "Supplier")
    };

    let mut pdf = PdfPages::new(&format!("{} {}", heading, invoice.invoice_no))?;
    pdf.heading(
        &invoice.company_name,
        heading,
        &[
            ("Invoice No", invoice.invoice_no.clone()),
            ("Date", invoice.invoice_date.clone()),
            (party_label, invoice.customer_name.clone()),
            ("Payment", invoice.payment_option.to_string()),
            ("Term of Sale", invoice.term_of_sale.clone().unwrap_or_default()),
        ],
    );
    pdf.table(&item_columns(is_sale), &item_rows(&invoice.items, is_sale));

    let mut rows = vec![("Subtotal", format_money(summary.subtotal))];
    if summary.discount > 0.0 {
        rows.push(("Discount", format_money(summary.discount)));
    }
    if summary.extra_charge > 0.0 {
        rows.push(("TCS Charges", format_money(summary.extra_charge)));
    }
    rows.push(("Net Total", format_money(summary.net_total)));
    rows.push(("Paid", format_money(summary.paid)));
    rows.push(("Remaining", format_money(summary.remaining)));
    rows.push(("Status", summary.status.to_string()));
    pdf.totals(&rows);
    pdf.y -= 3.0;
    pdf.note(&summary.amount_in_words);

    pdf.finish()
}

pub fn quotation_pdf(quotation: &Quotation, summary: &InvoiceSummary) -> AppResult<Vec<u8>> {
    let mut pdf = PdfPages::new(&format!("QUOTATION {}", quotation.quotation_no))?;
    pdf.heading(
        &quotation.company_name,
        "QUOTATION",
        &[
            ("Quotation No", quotation.quotation_no.clone()),
            ("Date", quotation.date.clone()),
            ("Customer", quotation.customer_name.clone()),
            ("Valid Until", quotation.valid_until.clone().unwrap_or_default()),
        ],
    );
    pdf.table(&item_columns(true), &item_rows(&quotation.items, true));

    let mut rows = vec![("Subtotal", format_money(summary.subtotal))];
    if summary.discount > 0.0 {
        rows.push(("Discount", format_money(summary.discount)));
    }
    rows.push(("Net Total", format_money(summary.net_total)));
    pdf.totals(&rows);
    pdf.y -= 3.0;
    pdf.note(&summary.amount_in_words);
    if let Some(notes) = quotation.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        pdf.y -= 3.0;
        pdf.note(notes);
    }

    pdf.finish()
}

pub fn transaction_report_pdf(
    company: &str,
    report: &TransactionReport,
    now: DateTime<Local>,
) -> AppResult<Vec<u8>> {
    let period = match (&report.filter.from, &report.filter.to) {
        (Some(from), Some(to)) => format!("{} to {}", from, to),
        (Some(from), None) => format!("from {}", from),
        (None, Some(to)) => format!("until {}", to),
        (None, None) => "all dates".to_string(),
    };

    let mut pdf = PdfPages::new("TRANSACTION REPORT")?;
    pdf.heading(
        company,
        "TRANSACTION REPORT",
        &[
            ("Period", period),
            ("Generated", now.format("%Y-%m-%d %H:%M").to_string()),
            (
                "Type",
                report.filter.kind.map(|k| k.to_string()).unwrap_or_default(),
            ),
            ("Party", report.filter.customer_name.clone().unwrap_or_default()),
        ],
    );

    let columns = vec![
        col("Date", 20.0, false),
        col("Type", 16.0, false),
        col("Invoice No", 28.0, false),
        col("Party", 40.0, false),
        col("Amount", 22.0, true),
        col("Paid", 22.0, true),
        col("Remaining", 22.0, true),
        col("Status", 10.0, false),
    ];
    let rows: Vec<Vec<String>> = report
        .records
        .iter()
        .map(|r| {
            vec![
                r.date.clone(),
                r.kind.to_string(),
                r.invoice_no.clone(),
                r.customer_name.clone(),
                format_money(r.amount),
                format_money(r.paid_amount),
                format_money(r.remaining_amount),
                r.payment_status.to_string(),
            ]
        })
        .collect();
    pdf.table(&columns, &rows);

    pdf.totals(&[
        ("Transactions", report.records.len().to_string()),
        ("Total Amount", format_money(report.total_amount)),
        ("Total Paid", format_money(report.total_paid)),
        ("Total Remaining", format_money(report.total_remaining)),
    ]);

    pdf.finish()
}

pub fn inventory_report_pdf(
    company: &str,
    items: &[InventoryItem],
    stock_value: f64,
    now: DateTime<Local>,
) -> AppResult<Vec<u8>> {
    let mut pdf = PdfPages::new("INVENTORY REPORT")?;
    pdf.heading(
        company,
        "INVENTORY REPORT",
        &[
            ("Generated", now.format("%Y-%m-%d %H:%M").to_string()),
            ("Items", items.len().to_string()),
        ],
    );

    let columns = vec![
        col("Code", 24.0, false),
        col("Name", 50.0, false),
        col("Unit", 12.0, false),
        col("Stock", 15.0, true),
        col("Min", 12.0, true),
        col("Rate", 22.0, true),
        col("Sale Price", 22.0, true),
        col("Location", 23.0, false),
    ];
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|i| {
            vec![
                i.article_code.clone(),
                i.name.clone(),
                i.unit.clone(),
                i.current_stock.to_string(),
                i.min_stock.to_string(),
                format_money(i.rate),
                format_money(i.sale_price),
                i.location.clone().unwrap_or_default(),
            ]
        })
        .collect();
    pdf.table(&columns, &rows);
    pdf.totals(&[("Stock Value", format_money(stock_value))]);

    pdf.finish()
}

pub fn low_stock_pdf(
    company: &str,
    suggestions: &[ReorderSuggestion],
    now: DateTime<Local>,
) -> AppResult<Vec<u8>> {
    let mut pdf = PdfPages::new("LOW STOCK REPORT")?;
    pdf.heading(
        company,
        "LOW STOCK REPORT",
        &[
            ("Generated", now.format("%Y-%m-%d %H:%M").to_string()),
            ("Items", suggestions.len().to_string()),
        ],
    );

    let columns = vec![
        col("Code", 25.0, false),
        col("Name", 55.0, false),
        col("Stock", 15.0, true),
        col("Min", 15.0, true),
        col("Max", 15.0, true),
        col("Reorder", 18.0, true),
        col("Supplier", 37.0, false),
    ];
    let rows: Vec<Vec<String>> = suggestions
        .iter()
        .map(|s| {
            vec![
                s.item.article_code.clone(),
                s.item.name.clone(),
                s.item.current_stock.to_string(),
                s.item.min_stock.to_string(),
                s.item.max_stock.to_string(),
                s.reorder_quantity.to_string(),
                s.item.supplier.clone(),
            ]
        })
        .collect();
    pdf.table(&columns, &rows);

    pdf.finish()
}

pub fn quotation_request_pdf(request: &QuotationRequest) -> AppResult<Vec<u8>> {
    let mut pdf = PdfPages::new(&format!("QUOTATION REQUEST {}", request.request_no))?;
    pdf.heading(
        &request.company_name,
        "REQUEST FOR QUOTATION",
        &[
            ("Request No", request.request_no.clone()),
            ("Date", request.date.clone()),
            ("Suppliers", request.supplier_names.join(", ")),
        ],
    );

    let columns = vec![
        col("#", 8.0, false),
        col("Code", 28.0, false),
        col("Description", 74.0, false),
        col("Qty", 15.0, true),
        col("Unit", 15.0, false),
        col("Your Rate", 40.0, true),
    ];
    let rows: Vec<Vec<String>> = request
        .items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            vec![
                (idx + 1).to_string(),
                item.article_code.clone(),
                item.description.clone(),
                item.quantity.to_string(),
                item.unit.clone(),
                "__________".to_string(),
            ]
        })
        .collect();
    pdf.table(&columns, &rows);
    pdf.y -= 3.0;
    pdf.note("Please quote your best rates against each item.");

    pdf.finish()
}

pub fn comparison_pdf(company: &str, comparison: &QuoteComparison) -> AppResult<Vec<u8>> {
    let mut pdf = PdfPages::new(&format!("QUOTATION COMPARISON {}", comparison.request_no))?;
    pdf.heading(
        company,
        "QUOTATION COMPARISON",
        &[("Request No", comparison.request_no.clone())],
    );

    let suppliers: Vec<String> = comparison
        .rows
        .first()
        .map(|r| r.quotes.iter().map(|q| q.supplier.clone()).collect())
        .unwrap_or_default();

    // Fixed columns take 110mm; supplier columns share the rest
    let supplier_w = if suppliers.is_empty() {
        0.0
    } else {
        ((PAGE_W - 2.0 * MARGIN_X - 110.0) / suppliers.len() as f32).max(12.0)
    };
    let mut columns = vec![
        col("Code", 22.0, false),
        col("Description", 38.0, false),
        col("Qty", 10.0, true),
    ];
    columns.extend(suppliers.iter().map(|s| col(s.clone(), supplier_w, true)));
    columns.push(col("Best", 20.0, false));
    columns.push(col("Best Total", 20.0, true));

    let rows: Vec<Vec<String>> = comparison
        .rows
        .iter()
        .map(|r| {
            let mut row = vec![
                r.article_code.clone(),
                r.description.clone(),
                r.quantity.to_string(),
            ];
            row.extend(
                r.quotes
                    .iter()
                    .map(|q| q.rate.map(format_money).unwrap_or_else(|| "-".to_string())),
            );
            row.push(r.best_supplier.clone().unwrap_or_else(|| "-".to_string()));
            row.push(format_money(r.best_total));
            row
        })
        .collect();
    pdf.table(&columns, &rows);
    pdf.totals(&[("Cheapest Total", format_money(comparison.cheapest_total))]);

    pdf.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 30).unwrap()
    }

    #[test]
    fn test_export_filename_format() {
        assert_eq!(export_filename("invoice", now()), "invoice_20240307_090530.pdf");
        assert_eq!(
            export_filename("Sale Invoice/INV-1", now()),
            "Sale_Invoice_INV-1_20240307_090530.pdf"
        );
        assert_eq!(export_filename("  ", now()), "document_20240307_090530.pdf");
    }

    #[test]
    fn test_fit_truncates_long_cells() {
        assert_eq!(fit("NDL-90", 25.0, BODY_SIZE), "NDL-90");
        let long = "Heavy duty industrial servo motor with speed control";
        let cut = fit(long, 20.0, BODY_SIZE);
        assert!(cut.ends_with(".."));
        assert!(cut.chars().count() < long.chars().count());
    }

    #[test]
    fn test_long_request_paginates() {
        let request = QuotationRequest {
            request_no: "RFQ-0307-0001".to_string(),
            company_name: "Main Store".to_string(),
            supplier_names: vec!["Singer".to_string()],
            date: "2024-03-07".to_string(),
            items: (0..120)
                .map(|i| crate::models::RequestedItem {
                    article_code: format!("PRT-{:03}", i),
                    description: "Spare part".to_string(),
                    unit: "pcs".to_string(),
                    quantity: 5,
                })
                .collect(),
        };

        let bytes = quotation_request_pdf(&request).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
