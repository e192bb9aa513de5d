use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::{format_money, format_percent};
use crate::billing::InvoiceSummary;
use crate::models::{CustomerType, DeliveryChallan, Invoice, InvoiceItem, Quotation, TransactionKind};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    A4,
    A5,
}

impl PageSize {
    /// Walk-in bills go out on A4, party bills on A5.
    pub fn for_customer(customer_type: CustomerType) -> Self {
        match customer_type {
            CustomerType::WalkIn => PageSize::A4,
            CustomerType::Party => PageSize::A5,
        }
    }

    pub fn css(&self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::A5 => "A5",
        }
    }
}

/// A ready-to-print HTML document.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PrintDocument {
    pub title: String,
    pub page_size: PageSize,
    pub html: String,
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn page(title: &str, size: PageSize, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
<style>\n@page {{ size: {size}; margin: 10mm; }}\n\
body {{ font-family: Helvetica, Arial, sans-serif; font-size: 11px; }}\n\
table {{ width: 100%; border-collapse: collapse; }}\n\
th, td {{ border: 1px solid #444; padding: 3px 5px; }}\n\
td.num {{ text-align: right; }}\n\
.totals td {{ border: none; }}\n</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        title = escape_html(title),
        size = size.css(),
        body = body
    )
}

fn header(out: &mut String, company: &str, heading: &str, fields: &[(&str, &str)]) {
    let _ = writeln!(out, "<h2>{}</h2>", escape_html(company));
    let _ = writeln!(out, "<h3>{}</h3>", escape_html(heading));
    out.push_str("<p>\n");
    for (label, value) in fields {
        if !value.is_empty() {
            let _ = writeln!(out, "<strong>{}:</strong> {}<br>", label, escape_html(value));
        }
    }
    out.push_str("</p>\n");
}

fn priced_rows(out: &mut String, items: &[InvoiceItem], with_tax: bool) {
    out.push_str("<table>\n<tr><th>#</th><th>Code</th><th>Description</th><th>Qty</th><th>Unit</th><th>Rate</th>");
    if with_tax {
        out.push_str("<th>Tax</th>");
    }
    out.push_str("<th>Amount</th></tr>\n");

    for (idx, item) in items.iter().enumerate() {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"num\">{}</td><td>{}</td><td class=\"num\">{}</td>",
            idx + 1,
            escape_html(&item.article_code),
            escape_html(&item.description),
            item.quantity,
            escape_html(&item.unit),
            format_money(item.rate)
        );
        if with_tax {
            let _ = write!(out, "<td class=\"num\">{}</td>", format_percent(item.tax_percentage));
        }
        let _ = writeln!(out, "<td class=\"num\">{}</td></tr>", format_money(item.total_amount));
    }
    out.push_str("</table>\n");
}

fn totals(out: &mut String, rows: &[(&str, String)]) {
    out.push_str("<table class=\"totals\">\n");
    for (label, value) in rows {
        let _ = writeln!(
            out,
            "<tr><td class=\"num\"><strong>{}</strong></td><td class=\"num\">{}</td></tr>",
            label, value
        );
    }
    out.push_str("</table>\n");
}

pub fn invoice_html(invoice: &Invoice, summary: &InvoiceSummary) -> PrintDocument {
    let (heading, party_label) = match invoice.kind {
        TransactionKind::Sale => ("Sale Invoice", "Customer"),
        TransactionKind::Purchase => ("Purchase Invoice", "Supplier"),
    };
    let page_size = PageSize::for_customer(invoice.customer_type);

    let mut body = String::new();
    header(
        &mut body,
        &invoice.company_name,
        heading,
        &[
            ("Invoice No", &invoice.invoice_no),
            ("Date", &invoice.invoice_date),
            (party_label, &invoice.customer_name),
            ("Term of Sale", invoice.term_of_sale.as_deref().unwrap_or("")),
            ("Payment", invoice.payment_option.as_str()),
        ],
    );
    priced_rows(&mut body, &invoice.items, invoice.kind == TransactionKind::Sale);

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
    rows.push(("Status", summary.status.as_str().to_string()));
    totals(&mut body, &rows);
    let _ = writeln!(body, "<p><em>{}</em></p>", escape_html(&summary.amount_in_words));

    let title = format!("{} {}", heading, invoice.invoice_no);
    PrintDocument {
        html: page(&title, page_size, &body),
        title,
        page_size,
    }
}

pub fn challan_html(challan: &DeliveryChallan) -> PrintDocument {
    let mut body = String::new();
    header(
        &mut body,
        &challan.company_name,
        "Delivery Challan",
        &[
            ("Challan No", &challan.challan_no),
            ("Date", &challan.date),
            ("Customer", &challan.customer_name),
        ],
    );

    body.push_str("<table>\n<tr><th>#</th><th>Code</th><th>Description</th><th>Qty</th><th>Unit</th><th>PO No</th><th>Demand No</th></tr>\n");
    for (idx, item) in challan.items.iter().enumerate() {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"num\">{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            idx + 1,
            escape_html(&item.article_code),
            escape_html(&item.description),
            item.quantity,
            escape_html(&item.unit),
            escape_html(item.po_number.as_deref().unwrap_or("-")),
            escape_html(item.demand_number.as_deref().unwrap_or("-"))
        );
    }
    body.push_str("</table>\n");
    totals(&mut body, &[("Total Quantity", challan.total_quantity.to_string())]);
    body.push_str("<p>Received by: ____________________</p>\n");

    let title = format!("Delivery Challan {}", challan.challan_no);
    PrintDocument {
        html: page(&title, PageSize::A4, &body),
        title,
        page_size: PageSize::A4,
    }
}

pub fn quotation_html(quotation: &Quotation, summary: &InvoiceSummary) -> PrintDocument {
    let mut body = String::new();
    header(
        &mut body,
        &quotation.company_name,
        "Quotation",
        &[
            ("Quotation No", &quotation.quotation_no),
            ("Date", &quotation.date),
            ("Customer", &quotation.customer_name),
            ("Valid Until", quotation.valid_until.as_deref().unwrap_or("")),
        ],
    );
    priced_rows(&mut body, &quotation.items, true);

    let mut rows = vec![("Subtotal", format_money(summary.subtotal))];
    if summary.discount > 0.0 {
        rows.push(("Discount", format_money(summary.discount)));
    }
    rows.push(("Net Total", format_money(summary.net_total)));
    totals(&mut body, &rows);
    let _ = writeln!(body, "<p><em>{}</em></p>", escape_html(&summary.amount_in_words));
    if let Some(notes) = quotation.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        let _ = writeln!(body, "<p>{}</p>", escape_html(notes));
    }

    let title = format!("Quotation {}", quotation.quotation_no);
    PrintDocument {
        html: page(&title, PageSize::A4, &body),
        title,
        page_size: PageSize::A4,
    }
}
