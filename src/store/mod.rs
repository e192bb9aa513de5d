//! Repository traits, one per persisted collection, and their SQLite backing.
//!
//! Services only see the traits; `SqliteStore` is the single implementation and
//! borrows a connection or an open transaction.

mod backup;
mod inventory;
mod invoices;
mod parties;
mod quotations;
mod transactions;

use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use serde::de::DeserializeOwned;
use std::str::FromStr;

use crate::error::{AppError, AppResult};
use crate::models::{
    CreateInventoryItem, InventoryItem, Invoice, LedgerEntry, NewLedgerEntry, NewParty, Party,
    PartyKind, Quotation, QuotationStatus, TransactionFilter, TransactionRecord,
    UpdateInventoryItem,
};

pub trait InventoryStore {
    fn list_items(&self) -> AppResult<Vec<InventoryItem>>;
    fn search_items(&self, query: &str) -> AppResult<Vec<InventoryItem>>;
    fn get_item(&self, id: i64) -> AppResult<InventoryItem>;
    fn find_item(&self, article_code: &str) -> AppResult<Option<InventoryItem>>;
    fn insert_item(&self, item: &CreateInventoryItem, default_min_stock: i64)
        -> AppResult<InventoryItem>;
    fn update_item(&self, item: &UpdateInventoryItem) -> AppResult<InventoryItem>;
    /// Adds stock, overwrites the rate and stamps the restock date.
    fn restock(
        &self,
        article_code: &str,
        quantity: i64,
        rate: f64,
        supplier: &str,
        date: &str,
    ) -> AppResult<()>;
    fn deduct_stock(&self, article_code: &str, quantity: i64) -> AppResult<()>;
    fn low_stock(&self) -> AppResult<Vec<InventoryItem>>;
}

pub trait PartyStore {
    fn list_parties(&self, kind: Option<PartyKind>) -> AppResult<Vec<Party>>;
    fn get_party(&self, id: i64) -> AppResult<Party>;
    /// Case-insensitive, otherwise exact, match within one kind.
    fn find_party_by_name(&self, kind: PartyKind, name: &str) -> AppResult<Option<Party>>;
    fn next_party_number(&self, kind: PartyKind) -> AppResult<i64>;
    fn insert_party(&self, party: &NewParty) -> AppResult<Party>;
    /// Writes the whole row back; the last writer wins.
    fn save_party(&self, party: &Party) -> AppResult<()>;
    fn append_entry(&self, entry: &NewLedgerEntry) -> AppResult<LedgerEntry>;
    fn ledger_entries(&self, party_id: i64) -> AppResult<Vec<LedgerEntry>>;
}

pub trait TransactionLog {
    fn append_record(&self, record: &TransactionRecord) -> AppResult<TransactionRecord>;
    fn list_records(&self, filter: &TransactionFilter) -> AppResult<Vec<TransactionRecord>>;
}

pub trait InvoiceStore {
    fn insert_sale_invoice(&self, invoice: &Invoice) -> AppResult<Invoice>;
    fn get_sale_invoice(&self, id: i64) -> AppResult<Invoice>;
    fn list_sale_invoices(&self) -> AppResult<Vec<Invoice>>;
    /// Newest first.
    fn customer_invoices(&self, customer_name: &str) -> AppResult<Vec<Invoice>>;
}

pub trait QuotationStore {
    fn insert_quotation(&self, quotation: &Quotation) -> AppResult<Quotation>;
    fn get_quotation(&self, id: i64) -> AppResult<Quotation>;
    fn list_quotations(&self) -> AppResult<Vec<Quotation>>;
    fn set_quotation_status(&self, id: i64, status: QuotationStatus) -> AppResult<()>;
}

pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

fn text_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = AppError>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn not_found(what: &str, key: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("{} {}", what, key))
}

/// Maps `QueryReturnedNoRows` to a domain-level not-found error.
fn expect_row<T>(result: rusqlite::Result<T>, what: &str, key: impl std::fmt::Display) -> AppResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(not_found(what, key)),
        Err(e) => Err(e.into()),
    }
}
