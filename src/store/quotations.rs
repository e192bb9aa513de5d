use rusqlite::Row;

use super::{expect_row, json_column, not_found, text_column, QuotationStore, SqliteStore};
use crate::error::AppResult;
use crate::models::{Quotation, QuotationStatus};

const QUOTATION_COLUMNS: &str = "id, quotation_no, customer_name, company_name, date, valid_until, items, \
     total, discount, net_total, status, notes";

fn map_quotation(row: &Row<'_>) -> rusqlite::Result<Quotation> {
    Ok(Quotation {
        id: Some(row.get(0)?),
        quotation_no: row.get(1)?,
        customer_name: row.get(2)?,
        company_name: row.get(3)?,
        date: row.get(4)?,
        valid_until: row.get(5)?,
        items: json_column(row, 6)?,
        total: row.get(7)?,
        discount: row.get(8)?,
        net_total: row.get(9)?,
        status: text_column(row, 10)?,
        notes: row.get(11)?,
    })
}

impl QuotationStore for SqliteStore<'_> {
    fn insert_quotation(&self, quotation: &Quotation) -> AppResult<Quotation> {
        self.conn.execute(
            "INSERT INTO quotations (quotation_no, customer_name, company_name, date, valid_until, items,
                 total, discount, net_total, status, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                quotation.quotation_no,
                quotation.customer_name,
                quotation.company_name,
                quotation.date,
                quotation.valid_until,
                serde_json::to_string(&quotation.items)?,
                quotation.total,
                quotation.discount,
                quotation.net_total,
                quotation.status.as_str(),
                quotation.notes,
            ],
        )?;

        Ok(Quotation {
            id: Some(self.conn.last_insert_rowid()),
            ..quotation.clone()
        })
    }

    fn get_quotation(&self, id: i64) -> AppResult<Quotation> {
        expect_row(
            self.conn.query_row(
                &format!("SELECT {} FROM quotations WHERE id = ?1", QUOTATION_COLUMNS),
                [id],
                map_quotation,
            ),
            "Quotation",
            id,
        )
    }

    fn list_quotations(&self) -> AppResult<Vec<Quotation>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM quotations ORDER BY id DESC",
            QUOTATION_COLUMNS
        ))?;

        let quotations = stmt
            .query_map([], map_quotation)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(quotations)
    }

    fn set_quotation_status(&self, id: i64, status: QuotationStatus) -> AppResult<()> {
        let changed = self.conn.execute(
            "UPDATE quotations SET status = ?1 WHERE id = ?2",
            rusqlite::params![status.as_str(), id],
        )?;

        if changed == 0 {
            return Err(not_found("Quotation", id));
        }
        Ok(())
    }
}
