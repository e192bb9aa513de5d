//! Document arithmetic shared by every builder and renderer.
//!
//! Renderers never compute money themselves; they format an [`InvoiceSummary`].

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::{validation, AppResult};
use crate::models::{
    ChallanRequest, CreateQuotation, CustomerType, DeliveryChallan, DraftLine, Invoice,
    InvoiceItem, PaymentOption, PaymentStatus, PurchaseRequest, Quotation, QuotationStatus,
    SaleRequest, TransactionKind,
};
use crate::words::amount_in_words;

pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

/// Largest quantity a single document line may carry.
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `quantity × rate`, plus the line tax when `with_tax` is set.
pub fn line_total(line: &DraftLine, with_tax: bool) -> f64 {
    let base = line.quantity as f64 * line.rate;
    let tax = match line.tax_percentage {
        Some(pct) if with_tax => base * pct / 100.0,
        _ => 0.0,
    };
    round2(base + tax)
}

pub fn remaining_amount(net_total: f64, paid: f64) -> f64 {
    round2((net_total - paid).max(0.0))
}

/// Both sides are rounded to cents first so `paid == net` is always full.
pub fn classify_payment(paid: f64, net_total: f64) -> PaymentStatus {
    let paid = round2(paid);
    let net_total = round2(net_total);
    if paid <= 0.0 {
        PaymentStatus::Unpaid
    } else if paid >= net_total {
        PaymentStatus::Full
    } else {
        PaymentStatus::Partial
    }
}

/// `{PREFIX}-{MMDD}-{last four digits of the millisecond clock}`. Not unique.
pub fn document_number(prefix: &str, now: DateTime<Local>) -> String {
    format!(
        "{}-{}-{:04}",
        prefix,
        now.format("%m%d"),
        now.timestamp_millis().rem_euclid(10_000)
    )
}

fn manual_or_generated(manual: &Option<String>, prefix: &str, now: DateTime<Local>) -> String {
    match manual.as_deref().map(str::trim) {
        Some(no) if !no.is_empty() => no.to_string(),
        _ => document_number(prefix, now),
    }
}

fn company_or_active(company: &Option<String>, config: &AppConfig) -> String {
    match company.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => config.company_name(),
    }
}

fn build_items(lines: &[DraftLine], with_tax: bool) -> AppResult<Vec<InvoiceItem>> {
    if lines.is_empty() {
        return Err(validation("Add at least one item"));
    }

    lines
        .iter()
        .map(|line| {
            if line.article_code.trim().is_empty() {
                return Err(validation("Article code is required for every line"));
            }
            if line.quantity <= 0 {
                return Err(validation(format!(
                    "Quantity for {} must be greater than zero",
                    line.article_code
                )));
            }
            if line.quantity > MAX_LINE_QUANTITY {
                return Err(validation(format!(
                    "Quantity for {} cannot exceed {}",
                    line.article_code, MAX_LINE_QUANTITY
                )));
            }
            if !line.rate.is_finite() {
                return Err(validation(format!("Rate for {} must be a number", line.article_code)));
            }
            if line.rate < 0.0 {
                return Err(validation(format!("Rate for {} cannot be negative", line.article_code)));
            }
            if line.tax_percentage.is_some_and(|pct| pct < 0.0) {
                return Err(validation(format!("Tax for {} cannot be negative", line.article_code)));
            }
            Ok(InvoiceItem {
                article_code: line.article_code.trim().to_string(),
                description: line.description.clone(),
                unit: line.unit.clone().unwrap_or_else(|| "pcs".to_string()),
                quantity: line.quantity,
                rate: line.rate,
                total_amount: line_total(line, with_tax),
                tax_percentage: if with_tax { line.tax_percentage } else { None },
                po_number: line.po_number.clone(),
                demand_number: line.demand_number.clone(),
            })
        })
        .collect()
}

fn subtotal(items: &[InvoiceItem]) -> f64 {
    round2(items.iter().map(|i| i.total_amount).sum())
}

fn check_discount(discount: f64, total: f64) -> AppResult<()> {
    if discount < 0.0 {
        return Err(validation("Discount cannot be negative"));
    }
    if round2(discount) > total {
        return Err(validation("Discount cannot exceed the invoice total"));
    }
    Ok(())
}

fn settle(paid: Option<f64>, option: PaymentOption, net_total: f64) -> AppResult<f64> {
    let paid = round2(paid.unwrap_or(match option {
        PaymentOption::Cash => net_total,
        PaymentOption::Credit => 0.0,
    }));
    if paid < 0.0 {
        return Err(validation("Paid amount cannot be negative"));
    }
    if paid > round2(net_total) {
        return Err(validation(format!(
            "Paid amount {:.2} exceeds invoice total {:.2}",
            paid, net_total
        )));
    }
    Ok(paid)
}

pub fn build_sale_invoice(
    request: &SaleRequest,
    config: &AppConfig,
    now: DateTime<Local>,
) -> AppResult<Invoice> {
    let customer_name = request.customer_name.trim();
    if request.payment_option == PaymentOption::Credit && customer_name.is_empty() {
        return Err(validation("Credit sales need a customer name"));
    }
    let customer_name = if customer_name.is_empty() {
        WALK_IN_CUSTOMER.to_string()
    } else {
        request.customer_name.clone()
    };

    let items = build_items(&request.lines, true)?;
    let total = subtotal(&items);
    check_discount(request.discount, total)?;
    if request.tcs_charges < 0.0 {
        return Err(validation("TCS charges cannot be negative"));
    }

    let net_total = round2(total - request.discount + request.tcs_charges);
    let paid = settle(request.cash_received, request.payment_option, net_total)?;

    Ok(Invoice {
        id: None,
        invoice_no: manual_or_generated(&request.invoice_no, &config.sale_prefix(), now),
        kind: TransactionKind::Sale,
        customer_name,
        company_name: company_or_active(&request.company_name, config),
        term_of_sale: request.term_of_sale.clone(),
        invoice_date: now.format("%Y-%m-%d").to_string(),
        customer_type: request.customer_type,
        items,
        total,
        discount: round2(request.discount),
        tcs_charges: round2(request.tcs_charges),
        net_total,
        cash_received: paid,
        remaining_balance: remaining_amount(net_total, paid),
        payment_option: request.payment_option,
        payment_status: classify_payment(paid, net_total),
    })
}

pub fn build_purchase_invoice(
    request: &PurchaseRequest,
    config: &AppConfig,
    now: DateTime<Local>,
) -> AppResult<Invoice> {
    // Names are join keys for the ledger, so only blank names are normalised
    let supplier = match request.supplier_name.as_deref() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => String::new(),
    };

    let items = build_items(&request.lines, false)?;
    let total = subtotal(&items);
    check_discount(request.discount, total)?;

    let net_total = round2(total - request.discount);
    let paid = settle(request.paid_amount, request.payment_option, net_total)?;

    Ok(Invoice {
        id: None,
        invoice_no: manual_or_generated(&request.invoice_no, &config.prefixes.purchase, now),
        kind: TransactionKind::Purchase,
        customer_type: if supplier.is_empty() {
            CustomerType::WalkIn
        } else {
            CustomerType::Party
        },
        customer_name: supplier,
        company_name: company_or_active(&request.company_name, config),
        term_of_sale: None,
        invoice_date: now.format("%Y-%m-%d").to_string(),
        items,
        total,
        discount: round2(request.discount),
        tcs_charges: 0.0,
        net_total,
        cash_received: paid,
        remaining_balance: remaining_amount(net_total, paid),
        payment_option: request.payment_option,
        payment_status: classify_payment(paid, net_total),
    })
}

pub fn build_challan(
    request: &ChallanRequest,
    config: &AppConfig,
    now: DateTime<Local>,
) -> AppResult<DeliveryChallan> {
    if request.customer_name.trim().is_empty() {
        return Err(validation("Customer name is required for a delivery challan"));
    }

    // Challans carry quantities only
    let items: Vec<InvoiceItem> = build_items(&request.lines, false)?
        .into_iter()
        .map(|item| InvoiceItem {
            rate: 0.0,
            total_amount: 0.0,
            ..item
        })
        .collect();
    let total_quantity = items.iter().map(|i| i.quantity).sum();

    Ok(DeliveryChallan {
        challan_no: manual_or_generated(&request.challan_no, &config.prefixes.challan, now),
        company_name: company_or_active(&request.company_name, config),
        customer_name: request.customer_name.clone(),
        date: now.format("%Y-%m-%d").to_string(),
        items,
        total_quantity,
    })
}

pub fn build_quotation(
    request: &CreateQuotation,
    config: &AppConfig,
    now: DateTime<Local>,
) -> AppResult<Quotation> {
    if request.customer_name.trim().is_empty() {
        return Err(validation("Customer name is required for a quotation"));
    }

    let items = build_items(&request.lines, true)?;
    let total = subtotal(&items);
    check_discount(request.discount, total)?;

    Ok(Quotation {
        id: None,
        quotation_no: manual_or_generated(&request.quotation_no, &config.prefixes.quotation, now),
        customer_name: request.customer_name.clone(),
        company_name: company_or_active(&request.company_name, config),
        date: now.format("%Y-%m-%d").to_string(),
        valid_until: request.valid_until.clone(),
        items,
        total,
        discount: round2(request.discount),
        net_total: round2(total - request.discount),
        status: QuotationStatus::Draft,
        notes: request.notes.clone(),
    })
}

/// Every figure a renderer prints, computed once.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InvoiceSummary {
    pub subtotal: f64,
    pub discount: f64,
    pub extra_charge: f64,
    pub net_total: f64,
    pub paid: f64,
    pub remaining: f64,
    pub status: PaymentStatus,
    pub total_quantity: i64,
    pub amount_in_words: String,
}

impl InvoiceSummary {
    pub fn of_invoice(invoice: &Invoice) -> Self {
        Self {
            subtotal: invoice.total,
            discount: invoice.discount,
            extra_charge: invoice.tcs_charges,
            net_total: invoice.net_total,
            paid: invoice.cash_received,
            remaining: invoice.remaining_balance,
            status: invoice.payment_status,
            total_quantity: invoice.items.iter().map(|i| i.quantity).sum(),
            amount_in_words: amount_in_words(invoice.net_total),
        }
    }

    pub fn of_quotation(quotation: &Quotation) -> Self {
        Self {
            subtotal: quotation.total,
            discount: quotation.discount,
            extra_charge: 0.0,
            net_total: quotation.net_total,
            paid: 0.0,
            remaining: quotation.net_total,
            status: classify_payment(0.0, quotation.net_total),
            total_quantity: quotation.items.iter().map(|i| i.quantity).sum(),
            amount_in_words: amount_in_words(quotation.net_total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 7, 10, 30, 0).unwrap()
    }

    fn line(code: &str, quantity: i64, rate: f64, tax: Option<f64>) -> DraftLine {
        DraftLine {
            article_code: code.to_string(),
            description: format!("{} part", code),
            quantity,
            rate,
            tax_percentage: tax,
            ..Default::default()
        }
    }

    #[test]
    fn test_line_total_with_tax_baked_in() {
        let l = line("BOB-01", 4, 25.0, Some(18.0));
        assert!((line_total(&l, true) - 118.0).abs() < 0.001);
        assert!((line_total(&l, false) - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_payment_classification_boundaries() {
        assert_eq!(classify_payment(0.0, 100.0), PaymentStatus::Unpaid);
        assert_eq!(classify_payment(40.0, 100.0), PaymentStatus::Partial);
        assert_eq!(classify_payment(100.0, 100.0), PaymentStatus::Full);
        // 0.1 + 0.2 style drift must still be full
        assert_eq!(classify_payment(0.1 + 0.2, 0.3), PaymentStatus::Full);
        assert_eq!(classify_payment(33.333, 33.33), PaymentStatus::Full);
    }

    #[test]
    fn test_remaining_never_negative() {
        assert_eq!(remaining_amount(100.0, 30.0), 70.0);
        assert_eq!(remaining_amount(100.0, 100.0), 0.0);
        assert_eq!(remaining_amount(100.0, 150.0), 0.0);
    }

    #[test]
    fn test_document_number_shape() {
        let no = document_number("INV", now());
        assert!(no.starts_with("INV-0307-"));
        assert_eq!(no.len(), "INV-0307-0000".len());
    }

    #[test]
    fn test_sale_invoice_totals() {
        let request = SaleRequest {
            customer_name: "Rehman Tailors".to_string(),
            customer_type: CustomerType::Party,
            lines: vec![line("NDL-90", 10, 12.5, None), line("BOB-01", 4, 25.0, Some(10.0))],
            discount: 15.0,
            tcs_charges: 5.0,
            cash_received: Some(100.0),
            payment_option: PaymentOption::Credit,
            ..Default::default()
        };

        let invoice = build_sale_invoice(&request, &AppConfig::default(), now()).unwrap();
        assert_eq!(invoice.total, 235.0);
        assert_eq!(invoice.net_total, 225.0);
        assert_eq!(invoice.remaining_balance, 125.0);
        assert_eq!(invoice.payment_status, PaymentStatus::Partial);
        assert_eq!(invoice.company_name, "Main Store");
        assert!(invoice.invoice_no.starts_with("INV-0307-"));
    }

    #[test]
    fn test_cash_sale_defaults_to_full_payment() {
        let request = SaleRequest {
            lines: vec![line("NDL-90", 2, 50.0, None)],
            ..Default::default()
        };

        let invoice = build_sale_invoice(&request, &AppConfig::default(), now()).unwrap();
        assert_eq!(invoice.customer_name, WALK_IN_CUSTOMER);
        assert_eq!(invoice.cash_received, 100.0);
        assert_eq!(invoice.payment_status, PaymentStatus::Full);
        assert_eq!(invoice.remaining_balance, 0.0);
    }

    #[test]
    fn test_manual_invoice_number_kept() {
        let request = SaleRequest {
            invoice_no: Some("MANUAL-7".to_string()),
            lines: vec![line("NDL-90", 1, 10.0, None)],
            ..Default::default()
        };
        let invoice = build_sale_invoice(&request, &AppConfig::default(), now()).unwrap();
        assert_eq!(invoice.invoice_no, "MANUAL-7");
    }

    #[test]
    fn test_overpayment_rejected() {
        let request = SaleRequest {
            lines: vec![line("NDL-90", 1, 10.0, None)],
            cash_received: Some(10.01),
            ..Default::default()
        };
        assert!(build_sale_invoice(&request, &AppConfig::default(), now()).is_err());
    }

    #[test]
    fn test_credit_sale_needs_customer() {
        let request = SaleRequest {
            lines: vec![line("NDL-90", 1, 10.0, None)],
            payment_option: PaymentOption::Credit,
            ..Default::default()
        };
        assert!(build_sale_invoice(&request, &AppConfig::default(), now()).is_err());
    }

    #[test]
    fn test_empty_and_bad_lines_rejected() {
        let empty = PurchaseRequest::default();
        assert!(build_purchase_invoice(&empty, &AppConfig::default(), now()).is_err());

        let zero_qty = PurchaseRequest {
            lines: vec![line("NDL-90", 0, 10.0, None)],
            ..Default::default()
        };
        assert!(build_purchase_invoice(&zero_qty, &AppConfig::default(), now()).is_err());

        let big_discount = PurchaseRequest {
            lines: vec![line("NDL-90", 1, 10.0, None)],
            discount: 11.0,
            ..Default::default()
        };
        assert!(build_purchase_invoice(&big_discount, &AppConfig::default(), now()).is_err());
    }

    #[test]
    fn test_line_quantity_and_rate_bounds() {
        let at_limit = PurchaseRequest {
            lines: vec![line("NDL-90", MAX_LINE_QUANTITY, 1.0, None)],
            ..Default::default()
        };
        assert!(build_purchase_invoice(&at_limit, &AppConfig::default(), now()).is_ok());

        let too_many = PurchaseRequest {
            lines: vec![line("NDL-90", MAX_LINE_QUANTITY + 1, 1.0, None)],
            ..Default::default()
        };
        assert!(build_purchase_invoice(&too_many, &AppConfig::default(), now()).is_err());

        let bad_rate = PurchaseRequest {
            lines: vec![line("NDL-90", 1, f64::NAN, None)],
            ..Default::default()
        };
        assert!(build_purchase_invoice(&bad_rate, &AppConfig::default(), now()).is_err());
    }

    #[test]
    fn test_purchase_ignores_tax_and_tcs() {
        let request = PurchaseRequest {
            supplier_name: Some("Singer Wholesale".to_string()),
            lines: vec![line("NDL-90", 10, 50.0, Some(18.0))],
            discount: 20.0,
            paid_amount: Some(200.0),
            payment_option: PaymentOption::Credit,
            ..Default::default()
        };

        let invoice = build_purchase_invoice(&request, &AppConfig::default(), now()).unwrap();
        assert_eq!(invoice.customer_name, "Singer Wholesale");
        assert_eq!(invoice.total, 500.0);
        assert_eq!(invoice.net_total, 480.0);
        assert_eq!(invoice.remaining_balance, 280.0);
        assert_eq!(invoice.items[0].tax_percentage, None);
        assert!(invoice.invoice_no.starts_with("PUR-"));
    }

    #[test]
    fn test_challan_has_no_prices() {
        let request = ChallanRequest {
            customer_name: "City Garments".to_string(),
            lines: vec![
                DraftLine {
                    po_number: Some("PO-11".to_string()),
                    ..line("NDL-90", 5, 12.0, None)
                },
                line("BOB-01", 3, 25.0, None),
            ],
            ..Default::default()
        };

        let challan = build_challan(&request, &AppConfig::default(), now()).unwrap();
        assert_eq!(challan.total_quantity, 8);
        assert!(challan.items.iter().all(|i| i.total_amount == 0.0 && i.rate == 0.0));
        assert_eq!(challan.items[0].po_number.as_deref(), Some("PO-11"));
        assert!(challan.challan_no.starts_with("DC-"));
    }

    #[test]
    fn test_quotation_starts_as_draft() {
        let request = CreateQuotation {
            customer_name: "Star Stitching".to_string(),
            lines: vec![line("MTR-200", 1, 4500.0, None)],
            discount: 500.0,
            ..Default::default()
        };

        let quotation = build_quotation(&request, &AppConfig::default(), now()).unwrap();
        assert_eq!(quotation.status, QuotationStatus::Draft);
        assert_eq!(quotation.net_total, 4000.0);

        let summary = InvoiceSummary::of_quotation(&quotation);
        assert_eq!(summary.amount_in_words, "Rupees four thousand only");
    }
}
