use rusqlite::{OptionalExtension, Row};

use super::{expect_row, json_column, not_found, text_column, PartyStore, SqliteStore};
use crate::error::AppResult;
use crate::models::{name_key, LedgerEntry, NewLedgerEntry, NewParty, Party, PartyKind};

const PARTY_COLUMNS: &str = "id, kind, party_number, name, phone, address, city, current_balance, \
     total_purchases, total_payments, credit_limit, created_at";

const ENTRY_COLUMNS: &str =
    "id, party_id, date, kind, amount, paid_amount, remaining_amount, balance, reference, items";

fn map_party(row: &Row<'_>) -> rusqlite::Result<Party> {
    Ok(Party {
        id: row.get(0)?,
        kind: text_column(row, 1)?,
        party_number: row.get(2)?,
        name: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
        city: row.get(6)?,
        current_balance: row.get(7)?,
        total_purchases: row.get(8)?,
        total_payments: row.get(9)?,
        credit_limit: row.get(10)?,
        created_at: row.get(11)?,
    })
}

fn map_entry(row: &Row<'_>) -> rusqlite::Result<LedgerEntry> {
    Ok(LedgerEntry {
        id: row.get(0)?,
        party_id: row.get(1)?,
        date: row.get(2)?,
        kind: text_column(row, 3)?,
        amount: row.get(4)?,
        paid_amount: row.get(5)?,
        remaining_amount: row.get(6)?,
        balance: row.get(7)?,
        reference: row.get(8)?,
        items: json_column(row, 9)?,
    })
}

impl PartyStore for SqliteStore<'_> {
    fn list_parties(&self, kind: Option<PartyKind>) -> AppResult<Vec<Party>> {
        let parties = match kind {
            Some(kind) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM parties WHERE kind = ?1 ORDER BY party_number",
                    PARTY_COLUMNS
                ))?;
                let rows = stmt
                    .query_map([kind.as_str()], map_party)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM parties ORDER BY kind, party_number",
                    PARTY_COLUMNS
                ))?;
                let rows = stmt
                    .query_map([], map_party)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(parties)
    }

    fn get_party(&self, id: i64) -> AppResult<Party> {
        expect_row(
            self.conn.query_row(
                &format!("SELECT {} FROM parties WHERE id = ?1", PARTY_COLUMNS),
                [id],
                map_party,
            ),
            "Party",
            id,
        )
    }

    fn find_party_by_name(&self, kind: PartyKind, name: &str) -> AppResult<Option<Party>> {
        let party = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM parties WHERE kind = ?1 AND name_key = ?2
                     ORDER BY id LIMIT 1",
                    PARTY_COLUMNS
                ),
                rusqlite::params![kind.as_str(), name_key(name)],
                map_party,
            )
            .optional()?;

        Ok(party)
    }

    fn next_party_number(&self, kind: PartyKind) -> AppResult<i64> {
        let max: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(party_number), 0) FROM parties WHERE kind = ?1",
            [kind.as_str()],
            |row| row.get(0),
        )?;

        Ok(max + 1)
    }

    fn insert_party(&self, party: &NewParty) -> AppResult<Party> {
        self.conn.execute(
            "INSERT INTO parties (kind, party_number, name, name_key, phone, address, city,
                 current_balance, total_purchases, total_payments, credit_limit)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
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
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_party(id)
    }

    fn save_party(&self, party: &Party) -> AppResult<()> {
        let changed = self.conn.execute(
            "UPDATE parties SET name = ?1, name_key = ?2, phone = ?3, address = ?4, city = ?5,
                 current_balance = ?6, total_purchases = ?7, total_payments = ?8, credit_limit = ?9
             WHERE id = ?10",
            rusqlite::params![
                party.name,
                name_key(&party.name),
                party.phone,
                party.address,
                party.city,
                party.current_balance,
                party.total_purchases,
                party.total_payments,
                party.credit_limit,
                party.id,
            ],
        )?;

        if changed == 0 {
            return Err(not_found("Party", party.id));
        }
        Ok(())
    }

    fn append_entry(&self, entry: &NewLedgerEntry) -> AppResult<LedgerEntry> {
        self.conn.execute(
            "INSERT INTO ledger_entries (party_id, date, kind, amount, paid_amount, remaining_amount,
                 balance, reference, items)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                entry.party_id,
                entry.date,
                entry.kind.as_str(),
                entry.amount,
                entry.paid_amount,
                entry.remaining_amount,
                entry.balance,
                entry.reference,
                serde_json::to_string(&entry.items)?,
            ],
        )?;

        Ok(LedgerEntry {
            id: self.conn.last_insert_rowid(),
            party_id: entry.party_id,
            date: entry.date.clone(),
            kind: entry.kind,
            amount: entry.amount,
            paid_amount: entry.paid_amount,
            remaining_amount: entry.remaining_amount,
            balance: entry.balance,
            reference: entry.reference.clone(),
            items: entry.items.clone(),
        })
    }

    fn ledger_entries(&self, party_id: i64) -> AppResult<Vec<LedgerEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM ledger_entries WHERE party_id = ?1 ORDER BY id",
            ENTRY_COLUMNS
        ))?;

        let entries = stmt
            .query_map([party_id], map_entry)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
