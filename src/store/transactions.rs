use rusqlite::Row;

use super::{text_column, SqliteStore, TransactionLog};
use crate::error::AppResult;
use crate::models::{name_key, TransactionFilter, TransactionRecord};

const RECORD_COLUMNS: &str = "id, kind, invoice_no, customer_name, company_name, amount, paid_amount, \
     remaining_amount, payment_status, date, item_count";

fn map_record(row: &Row<'_>) -> rusqlite::Result<TransactionRecord> {
    Ok(TransactionRecord {
        id: row.get(0)?,
        kind: text_column(row, 1)?,
        invoice_no: row.get(2)?,
        customer_name: row.get(3)?,
        company_name: row.get(4)?,
        amount: row.get(5)?,
        paid_amount: row.get(6)?,
        remaining_amount: row.get(7)?,
        payment_status: text_column(row, 8)?,
        date: row.get(9)?,
        item_count: row.get(10)?,
    })
}

impl TransactionLog for SqliteStore<'_> {
    fn append_record(&self, record: &TransactionRecord) -> AppResult<TransactionRecord> {
        self.conn.execute(
            "INSERT INTO transactions (kind, invoice_no, customer_name, company_name, amount, paid_amount,
                 remaining_amount, payment_status, date, item_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
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

        Ok(TransactionRecord {
            id: self.conn.last_insert_rowid(),
            ..record.clone()
        })
    }

    fn list_records(&self, filter: &TransactionFilter) -> AppResult<Vec<TransactionRecord>> {
        let mut sql = format!("SELECT {} FROM transactions WHERE 1 = 1", RECORD_COLUMNS);
        let mut args: Vec<String> = Vec::new();

        if let Some(kind) = filter.kind {
            sql.push_str(" AND kind = ?");
            args.push(kind.as_str().to_string());
        }
        if let Some(from) = &filter.from {
            sql.push_str(" AND date >= ?");
            args.push(from.clone());
        }
        if let Some(to) = &filter.to {
            sql.push_str(" AND date <= ?");
            args.push(to.clone());
        }
        sql.push_str(" ORDER BY date DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(rusqlite::params_from_iter(args.iter()), map_record)?
            .collect::<Result<Vec<_>, _>>()?;

        let records = match &filter.customer_name {
            Some(customer) => {
                let key = name_key(customer);
                records
                    .into_iter()
                    .filter(|r| name_key(&r.customer_name) == key)
                    .collect()
            }
            None => records,
        };

        Ok(records)
    }
}
