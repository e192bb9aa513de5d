use chrono::{DateTime, Local};
use std::collections::BTreeMap;

use super::ledger::{post_to_ledger, Posting};
use crate::billing::build_sale_invoice;
use crate::config::AppConfig;
use crate::error::{validation, AppError, AppResult};
use crate::models::{PartyKind, PaymentOption, SaleReceipt, SaleRequest, TransactionRecord};
use crate::store::{InventoryStore, InvoiceStore, PartyStore, TransactionLog};

/// Books a sale: stock out, customer ledger for credit sales, invoice and log.
///
/// Stock is re-checked here against the summed quantity per article, since
/// draft lines may have been edited after they were first checked.
pub fn commit_sale<S>(
    store: &S,
    config: &AppConfig,
    request: &SaleRequest,
    now: DateTime<Local>,
) -> AppResult<SaleReceipt>
where
    S: InventoryStore + PartyStore + TransactionLog + InvoiceStore,
{
    let invoice = build_sale_invoice(request, config, now)?;

    let mut requested: BTreeMap<&str, i64> = BTreeMap::new();
    for item in &invoice.items {
        let total = requested.entry(item.article_code.as_str()).or_insert(0);
        *total = total.checked_add(item.quantity).ok_or_else(|| {
            validation(format!("Quantity for {} is too large", item.article_code))
        })?;
    }

    for (&article_code, &quantity) in &requested {
        let stored = store
            .find_item(article_code)?
            .ok_or_else(|| AppError::NotFound(format!("Inventory item {}", article_code)))?;
        if quantity > stored.current_stock {
            if !config.allow_negative_stock {
                return Err(AppError::InsufficientStock {
                    article_code: article_code.to_string(),
                    requested: quantity,
                    available: stored.current_stock,
                });
            }
            tracing::warn!(
                "{} goes negative: selling {} with {} on hand",
                article_code,
                quantity,
                stored.current_stock
            );
        }
    }

    for (article_code, quantity) in &requested {
        store.deduct_stock(article_code, *quantity)?;
    }

    // Cash sales never touch the ledger
    let party = match invoice.payment_option {
        PaymentOption::Credit => Some(post_to_ledger(
            store,
            PartyKind::Customer,
            &invoice.customer_name,
            &Posting {
                kind: invoice.kind,
                net_total: invoice.net_total,
                paid: invoice.cash_received,
                reference: &invoice.invoice_no,
                date: &invoice.invoice_date,
                items: &invoice.items,
            },
        )?),
        PaymentOption::Cash => None,
    };

    let invoice = store.insert_sale_invoice(&invoice)?;

    let log_entry = store.append_record(&TransactionRecord {
        id: 0,
        kind: invoice.kind,
        invoice_no: invoice.invoice_no.clone(),
        customer_name: invoice.customer_name.clone(),
        company_name: invoice.company_name.clone(),
        amount: invoice.net_total,
        paid_amount: invoice.cash_received,
        remaining_amount: invoice.remaining_balance,
        payment_status: invoice.payment_status,
        date: invoice.invoice_date.clone(),
        item_count: invoice.items.len() as i64,
    })?;

    tracing::info!(
        "Committed {} sale {} to '{}' (net {:.2}, {})",
        invoice.payment_option,
        invoice.invoice_no,
        invoice.customer_name,
        invoice.net_total,
        invoice.payment_status
    );

    Ok(SaleReceipt {
        invoice,
        party,
        log_entry,
    })
}

/// Rate on the most recent sale of `article_code` to this customer.
pub fn last_sale_rate<S: InvoiceStore>(
    store: &S,
    customer_name: &str,
    article_code: &str,
) -> AppResult<Option<f64>> {
    let rate = store
        .customer_invoices(customer_name)?
        .into_iter()
        .find_map(|invoice| {
            invoice
                .items
                .iter()
                .find(|item| item.article_code == article_code)
                .map(|item| item.rate)
        });

    Ok(rate)
}
