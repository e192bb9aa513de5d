use chrono::{DateTime, Local};
use std::collections::HashMap;

use super::inventory::merge_supplier;
use super::ledger::{post_to_ledger, Posting};
use crate::billing::build_purchase_invoice;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::models::{PartyKind, PurchaseReceipt, PurchaseRequest, TransactionRecord};
use crate::store::{InventoryStore, PartyStore, TransactionLog};

/// Books a purchase: stock in, rates overwritten, supplier ledger, log entry.
///
/// Every article code must already exist; unknown codes reject the whole
/// purchase before anything is written.
pub fn commit_purchase<S>(
    store: &S,
    config: &AppConfig,
    request: &PurchaseRequest,
    now: DateTime<Local>,
) -> AppResult<PurchaseReceipt>
where
    S: InventoryStore + PartyStore + TransactionLog,
{
    let invoice = build_purchase_invoice(request, config, now)?;

    let mut known = HashMap::new();
    for item in &invoice.items {
        if known.contains_key(item.article_code.as_str()) {
            continue;
        }
        let stored = store
            .find_item(&item.article_code)?
            .ok_or_else(|| AppError::NotFound(format!("Inventory item {}", item.article_code)))?;
        known.insert(item.article_code.as_str(), stored.supplier);
    }

    let today = invoice.invoice_date.clone();
    for item in &invoice.items {
        let supplier = match known.get(item.article_code.as_str()) {
            Some(existing) => merge_supplier(existing, &invoice.customer_name),
            None => invoice.customer_name.clone(),
        };
        // Latest purchase rate always wins
        store.restock(&item.article_code, item.quantity, item.rate, &supplier, &today)?;
        known.insert(item.article_code.as_str(), supplier);
    }

    let party = if invoice.customer_name.is_empty() {
        None
    } else {
        Some(post_to_ledger(
            store,
            PartyKind::Supplier,
            &invoice.customer_name,
            &Posting {
                kind: invoice.kind,
                net_total: invoice.net_total,
                paid: invoice.cash_received,
                reference: &invoice.invoice_no,
                date: &today,
                items: &invoice.items,
            },
        )?)
    };

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
        date: today,
        item_count: invoice.items.len() as i64,
    })?;

    tracing::info!(
        "Committed purchase {} ({} lines, net {:.2}, {})",
        invoice.invoice_no,
        invoice.items.len(),
        invoice.net_total,
        invoice.payment_status
    );

    Ok(PurchaseReceipt {
        invoice,
        party,
        log_entry,
    })
}
