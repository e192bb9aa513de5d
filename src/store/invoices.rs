use rusqlite::Row;

use super::{expect_row, json_column, text_column, InvoiceStore, SqliteStore};
use crate::error::AppResult;
use crate::models::{name_key, Invoice, TransactionKind};

const INVOICE_COLUMNS: &str = "id, invoice_no, customer_name, company_name, term_of_sale, invoice_date, \
     customer_type, items, total, discount, tcs_charges, net_total, cash_received, remaining_balance, \
     payment_option, payment_status";

fn map_invoice(row: &Row<'_>) -> rusqlite::Result<Invoice> {
    Ok(Invoice {
        id: Some(row.get(0)?),
        invoice_no: row.get(1)?,
        kind: TransactionKind::Sale,
        customer_name: row.get(2)?,
        company_name: row.get(3)?,
        term_of_sale: row.get(4)?,
        invoice_date: row.get(5)?,
        customer_type: text_column(row, 6)?,
        items: json_column(row, 7)?,
        total: row.get(8)?,
        discount: row.get(9)?,
        tcs_charges: row.get(10)?,
        net_total: row.get(11)?,
        cash_received: row.get(12)?,
        remaining_balance: row.get(13)?,
        payment_option: text_column(row, 14)?,
        payment_status: text_column(row, 15)?,
    })
}

impl InvoiceStore for SqliteStore<'_> {
    fn insert_sale_invoice(&self, invoice: &Invoice) -> AppResult<Invoice> {
        self.conn.execute(
            "INSERT INTO sales_invoices (invoice_no, customer_name, company_name, term_of_sale, invoice_date,
                 customer_type, items, total, discount, tcs_charges, net_total, cash_received,
                 remaining_balance, payment_option, payment_status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            rusqlite::params![
                invoice.invoice_no,
                invoice.customer_name,
                invoice.company_name,
                invoice.term_of_sale,
                invoice.invoice_date,
                invoice.customer_type.as_str(),
                serde_json::to_string(&invoice.items)?,
                invoice.total,
                invoice.discount,
                invoice.tcs_charges,
                invoice.net_total,
                invoice.cash_received,
                invoice.remaining_balance,
                invoice.payment_option.as_str(),
                invoice.payment_status.as_str(),
            ],
        )?;

        Ok(Invoice {
            id: Some(self.conn.last_insert_rowid()),
            ..invoice.clone()
        })
    }

    fn get_sale_invoice(&self, id: i64) -> AppResult<Invoice> {
        expect_row(
            self.conn.query_row(
                &format!("SELECT {} FROM sales_invoices WHERE id = ?1", INVOICE_COLUMNS),
                [id],
                map_invoice,
            ),
            "Sale invoice",
            id,
        )
    }

    fn list_sale_invoices(&self) -> AppResult<Vec<Invoice>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM sales_invoices ORDER BY id DESC",
            INVOICE_COLUMNS
        ))?;

        let invoices = stmt
            .query_map([], map_invoice)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(invoices)
    }

    fn customer_invoices(&self, customer_name: &str) -> AppResult<Vec<Invoice>> {
        let key = name_key(customer_name);
        let invoices = self
            .list_sale_invoices()?
            .into_iter()
            .filter(|invoice| name_key(&invoice.customer_name) == key)
            .collect();

        Ok(invoices)
    }
}
