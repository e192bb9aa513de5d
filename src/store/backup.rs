use super::{InventoryStore, InvoiceStore, PartyStore, QuotationStore, SqliteStore, TransactionLog};
use crate::error::AppResult;
use crate::models::{name_key, CollectionsExport, PartyWithLedger, TransactionFilter};

impl SqliteStore<'_> {
    pub fn export_collections(&self) -> AppResult<CollectionsExport> {
        let parties = self
            .list_parties(None)?
            .into_iter()
            .map(|party| {
                let transactions = self.ledger_entries(party.id)?;
                Ok(PartyWithLedger {
                    party,
                    transactions,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(CollectionsExport {
            inventory: self.list_items()?,
            parties,
            transactions: self.list_records(&TransactionFilter::default())?,
            sales_invoices: self.list_sale_invoices()?,
            quotations: self.list_quotations()?,
        })
    }

    /// Replaces every collection with the snapshot, keeping its ids.
    pub fn import_collections(&self, snapshot: &CollectionsExport) -> AppResult<()> {
        self.conn.execute_batch(
            "DELETE FROM ledger_entries;
             DELETE FROM parties;
             DELETE FROM inventory_items;
             DELETE FROM transactions;
             DELETE FROM sales_invoices;
             DELETE FROM quotations;",
        )?;

        for item in &snapshot.inventory {
            self.conn.execute(
                "INSERT INTO inventory_items (id, article_code, name, description, category, unit, rate,
                     sale_price, min_sale_price, current_stock, min_stock, max_stock, supplier, location,
                     last_restocked, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                rusqlite::params![
                    item.id,
                    item.article_code,
                    item.name,
                    item.description,
                    item.category,
                    item.unit,
                    item.rate,
                    item.sale_price,
                    item.min_sale_price,
                    item.current_stock,
                    item.min_stock,
                    item.max_stock,
                    item.supplier,
                    item.location,
                    item.last_restocked,
                    item.created_at,
                ],
            )?;
        }

        for entry in &snapshot.parties {
            let party = &entry.party;
            self.conn.execute(
                "INSERT INTO parties (id, kind, party_number, name, name_key, phone, address, city,
                     current_balance, total_purchases, total_payments, credit_limit, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                rusqlite::params![
                    party.id,
                    party.kind.as_str(),
                    party.party_number,
                    party.name,
                    name_key(&party.name),
                    party.phone,
                    party.address,
                    party.city,
                    party.current_balance,
                    party.total_purchases,
                    party.total_payments,
                    party.credit_limit,
                    party.created_at,
                ],
            )?;

            for tx in &entry.transactions {
                self.conn.execute(
                    "INSERT INTO ledger_entries (id, party_id, date, kind, amount, paid_amount,
                         remaining_amount, balance, reference, items)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    rusqlite::params![
                        tx.id,
                        party.id,
                        tx.date,
                        tx.kind.as_str(),
                        tx.amount,
                        tx.paid_amount,
                        tx.remaining_amount,
                        tx.balance,
                        tx.reference,
                        serde_json::to_string(&tx.items)?,
                    ],
                )?;
            }
        }

        for record in &snapshot.transactions {
            self.conn.execute(
                "INSERT INTO transactions (id, kind, invoice_no, customer_name, company_name, amount,
                     paid_amount, remaining_amount, payment_status, date, item_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                rusqlite::params![
                    record.id,
                    record.kind.as_str(),
                    record.invoice_no,
                    record.customer_name,
                    record.company_name,
                    record.amount,
                    record.paid_amount,
                    record.remaining_amount,
                    record.payment_status.as_str(),
                    record.date,
                    record.item_count,
                ],
            )?;
        }

        for invoice in &snapshot.sales_invoices {
            let saved = self.insert_sale_invoice(invoice)?;
            if let Some(id) = invoice.id {
                self.conn.execute(
                    "UPDATE sales_invoices SET id = ?1 WHERE id = ?2",
                    rusqlite::params![id, saved.id],
                )?;
            }
        }

        for quotation in &snapshot.quotations {
            let saved = self.insert_quotation(quotation)?;
            if let Some(id) = quotation.id {
                self.conn.execute(
                    "UPDATE quotations SET id = ?1 WHERE id = ?2",
                    rusqlite::params![id, saved.id],
                )?;
            }
        }

        tracing::info!(
            "Imported {} items, {} parties, {} log records",
            snapshot.inventory.len(),
            snapshot.parties.len(),
            snapshot.transactions.len()
        );

        Ok(())
    }
}
