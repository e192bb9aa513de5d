use chrono::{DateTime, Local};

use super::inventory::reorder_suggestions;
use crate::billing::{build_quotation, document_number, round2};
use crate::config::AppConfig;
use crate::error::{validation, AppResult};
use crate::models::{
    ComparisonRow, CreateQuotation, CreateQuotationRequest, DraftLine, Quotation,
    QuotationRequest, QuotationStatus, QuoteComparison, RequestedItem, SupplierQuote,
    SupplierRate,
};
use crate::store::{InventoryStore, QuotationStore};

pub fn create_quotation<S: QuotationStore>(
    store: &S,
    config: &AppConfig,
    request: &CreateQuotation,
    now: DateTime<Local>,
) -> AppResult<Quotation> {
    let quotation = build_quotation(request, config, now)?;
    let saved = store.insert_quotation(&quotation)?;
    tracing::info!("Saved quotation {} for '{}'", saved.quotation_no, saved.customer_name);
    Ok(saved)
}

/// Status is a plain label: any status may follow any other.
pub fn set_status<S: QuotationStore>(
    store: &S,
    id: i64,
    status: QuotationStatus,
) -> AppResult<Quotation> {
    store.set_quotation_status(id, status)?;
    store.get_quotation(id)
}

/// Draft lines for a sale at the quoted prices.
pub fn to_sale_lines(quotation: &Quotation) -> Vec<DraftLine> {
    quotation
        .items
        .iter()
        .map(|item| DraftLine {
            article_code: item.article_code.clone(),
            description: item.description.clone(),
            unit: Some(item.unit.clone()),
            quantity: item.quantity,
            rate: item.rate,
            tax_percentage: item.tax_percentage,
            po_number: item.po_number.clone(),
            demand_number: item.demand_number.clone(),
        })
        .collect()
}

pub fn build_request<S: InventoryStore>(
    store: &S,
    config: &AppConfig,
    request: &CreateQuotationRequest,
    now: DateTime<Local>,
) -> AppResult<QuotationRequest> {
    if request.lines.is_empty() {
        return Err(validation("Add at least one item to the request"));
    }

    let mut items = Vec::with_capacity(request.lines.len());
    for line in &request.lines {
        if line.quantity <= 0 {
            return Err(validation(format!(
                "Quantity for {} must be greater than zero",
                line.article_code
            )));
        }
        let stored = store.find_item(&line.article_code)?;
        let description = match (&stored, line.description.trim()) {
            (Some(item), "") => item.name.clone(),
            (_, given) => given.to_string(),
        };
        let unit = line
            .unit
            .clone()
            .or_else(|| stored.as_ref().map(|i| i.unit.clone()))
            .unwrap_or_else(|| "pcs".to_string());
        items.push(RequestedItem {
            article_code: line.article_code.clone(),
            description,
            unit,
            quantity: line.quantity,
        });
    }

    let request_no = match request.request_no.as_deref().map(str::trim) {
        Some(no) if !no.is_empty() => no.to_string(),
        _ => document_number(&config.prefixes.quotation_request, now),
    };
    let company_name = match request.company_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => config.company_name(),
    };

    Ok(QuotationRequest {
        request_no,
        company_name,
        supplier_names: request.supplier_names.clone(),
        date: now.format("%Y-%m-%d").to_string(),
        items,
    })
}

/// A rate enquiry covering everything at or below its minimum stock.
pub fn low_stock_request<S: InventoryStore>(
    store: &S,
    config: &AppConfig,
    supplier_names: Vec<String>,
    now: DateTime<Local>,
) -> AppResult<QuotationRequest> {
    let lines: Vec<DraftLine> = reorder_suggestions(store)?
        .into_iter()
        .filter(|s| s.reorder_quantity > 0)
        .map(|s| DraftLine {
            article_code: s.item.article_code,
            description: s.item.name,
            unit: Some(s.item.unit),
            quantity: s.reorder_quantity,
            ..Default::default()
        })
        .collect();

    build_request(
        store,
        config,
        &CreateQuotationRequest {
            supplier_names,
            lines,
            ..Default::default()
        },
        now,
    )
}

/// Cheapest supplier per requested article. Ties keep the earlier quote.
pub fn compare_quotes(request: &QuotationRequest, quotes: &[SupplierQuote]) -> QuoteComparison {
    let rows: Vec<ComparisonRow> = request
        .items
        .iter()
        .map(|item| {
            let offers: Vec<SupplierRate> = quotes
                .iter()
                .map(|quote| SupplierRate {
                    supplier: quote.supplier.clone(),
                    rate: quote
                        .rates
                        .iter()
                        .find(|r| r.article_code == item.article_code)
                        .map(|r| r.rate),
                })
                .collect();

            let best = offers
                .iter()
                .filter_map(|o| o.rate.map(|rate| (o.supplier.clone(), rate)))
                .fold(None, |best: Option<(String, f64)>, (supplier, rate)| match best {
                    Some((_, best_rate)) if best_rate <= rate => best,
                    _ => Some((supplier, rate)),
                });

            let best_total = best
                .as_ref()
                .map(|(_, rate)| round2(rate * item.quantity as f64))
                .unwrap_or(0.0);

            ComparisonRow {
                article_code: item.article_code.clone(),
                description: item.description.clone(),
                quantity: item.quantity,
                quotes: offers,
                best_rate: best.as_ref().map(|(_, rate)| *rate),
                best_supplier: best.map(|(supplier, _)| supplier),
                best_total,
            }
        })
        .collect();

    let cheapest_total = round2(rows.iter().map(|r| r.best_total).sum());

    QuoteComparison {
        request_no: request.request_no.clone(),
        rows,
        cheapest_total,
    }
}
