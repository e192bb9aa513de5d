use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::models::name_key;

pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    pub fn initialize(&self) -> AppResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Self::initialize_conn(&conn)?;
        Ok(())
    }

    pub fn initialize_conn(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            -- Stock items, keyed by article code
            CREATE TABLE IF NOT EXISTS inventory_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                article_code TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                description TEXT,
                category TEXT,
                unit TEXT NOT NULL DEFAULT 'pcs',
                rate REAL NOT NULL,
                sale_price REAL NOT NULL DEFAULT 0,
                min_sale_price REAL NOT NULL DEFAULT 0,
                current_stock INTEGER NOT NULL DEFAULT 0,
                min_stock INTEGER NOT NULL DEFAULT 5,
                max_stock INTEGER NOT NULL DEFAULT 0,
                supplier TEXT NOT NULL DEFAULT '',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Customers and suppliers with running balances
            CREATE TABLE IF NOT EXISTS parties (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                party_number INTEGER NOT NULL,
                name TEXT NOT NULL,
                name_key TEXT NOT NULL DEFAULT '',
                phone TEXT,
                address TEXT,
                city TEXT,
                current_balance REAL NOT NULL DEFAULT 0,
                total_purchases REAL NOT NULL DEFAULT 0,
                total_payments REAL NOT NULL DEFAULT 0,
                credit_limit REAL NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Ledger entries, each with a post-entry balance snapshot
            CREATE TABLE IF NOT EXISTS ledger_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                party_id INTEGER NOT NULL,
                date DATE NOT NULL,
                kind TEXT NOT NULL,
                amount REAL NOT NULL,
                paid_amount REAL NOT NULL,
                remaining_amount REAL NOT NULL,
                balance REAL NOT NULL,
                reference TEXT NOT NULL,
                items TEXT NOT NULL DEFAULT '[]',
                FOREIGN KEY (party_id) REFERENCES parties(id)
            );

            -- Summarized sale/purchase log for history screens
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                invoice_no TEXT NOT NULL,
                customer_name TEXT NOT NULL,
                company_name TEXT NOT NULL,
                amount REAL NOT NULL,
                paid_amount REAL NOT NULL,
                remaining_amount REAL NOT NULL,
                payment_status TEXT NOT NULL,
                date DATE NOT NULL,
                item_count INTEGER NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Committed sale invoices
            CREATE TABLE IF NOT EXISTS sales_invoices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                invoice_no TEXT NOT NULL,
                customer_name TEXT NOT NULL,
                company_name TEXT NOT NULL,
                term_of_sale TEXT,
                invoice_date DATE NOT NULL,
                items TEXT NOT NULL DEFAULT '[]',
                total REAL NOT NULL,
                discount REAL NOT NULL DEFAULT 0,
                tcs_charges REAL NOT NULL DEFAULT 0,
                net_total REAL NOT NULL,
                cash_received REAL NOT NULL DEFAULT 0,
                remaining_balance REAL NOT NULL DEFAULT 0,
                payment_option TEXT NOT NULL,
                payment_status TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Quotations
            CREATE TABLE IF NOT EXISTS quotations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                quotation_no TEXT NOT NULL,
                customer_name TEXT NOT NULL,
                company_name TEXT NOT NULL,
                date DATE NOT NULL,
                valid_until DATE,
                items TEXT NOT NULL DEFAULT '[]',
                total REAL NOT NULL,
                discount REAL NOT NULL DEFAULT 0,
                net_total REAL NOT NULL,
                status TEXT NOT NULL DEFAULT 'draft',
                notes TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            ",
        )?;

        // Run migrations for existing databases
        Self::migrate_conn(conn)?;

        Ok(())
    }

    fn migrate_conn(conn: &Connection) -> Result<()> {
        let columns = Self::columns(conn, "inventory_items")?;
        if !columns.contains(&"location".to_string()) {
            conn.execute("ALTER TABLE inventory_items ADD COLUMN location TEXT", [])?;
        }
        if !columns.contains(&"last_restocked".to_string()) {
            conn.execute("ALTER TABLE inventory_items ADD COLUMN last_restocked DATE", [])?;
        }

        let columns = Self::columns(conn, "parties")?;
        if !columns.contains(&"name_key".to_string()) {
            conn.execute(
                "ALTER TABLE parties ADD COLUMN name_key TEXT NOT NULL DEFAULT ''",
                [],
            )?;
        }
        Self::backfill_name_keys(conn)?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_parties_name_key ON parties(kind, name_key)",
            [],
        )?;

        let columns = Self::columns(conn, "sales_invoices")?;
        if !columns.contains(&"customer_type".to_string()) {
            conn.execute(
                "ALTER TABLE sales_invoices ADD COLUMN customer_type TEXT NOT NULL DEFAULT 'walk_in'",
                [],
            )?;
        }

        Ok(())
    }

    // SQLite's own case folding is ASCII-only, so keys are computed here
    fn backfill_name_keys(conn: &Connection) -> Result<()> {
        let missing: Vec<(i64, String)> = conn
            .prepare("SELECT id, name FROM parties WHERE name_key = ''")?
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>>>()?;

        for (id, name) in missing {
            conn.execute(
                "UPDATE parties SET name_key = ?1 WHERE id = ?2",
                rusqlite::params![name_key(&name), id],
            )?;
        }
        Ok(())
    }

    fn columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
        let columns: Vec<String> = conn
            .prepare(&format!("PRAGMA table_info({})", table))?
            .query_map([], |row| row.get::<_, String>(1))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poisoned_lock_reported_as_internal() {
        let db = Database::open_in_memory().unwrap();
        std::thread::scope(|s| {
            let handle = s.spawn(|| {
                let _guard = db.conn.lock().unwrap();
                panic!("writer died holding the connection");
            });
            assert!(handle.join().is_err());
        });

        assert!(matches!(db.initialize(), Err(AppError::Internal(_))));
    }

    #[test]
    fn test_old_parties_table_gets_name_keys() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE parties (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                party_number INTEGER NOT NULL,
                name TEXT NOT NULL,
                phone TEXT,
                address TEXT,
                city TEXT,
                current_balance REAL NOT NULL DEFAULT 0,
                total_purchases REAL NOT NULL DEFAULT 0,
                total_payments REAL NOT NULL DEFAULT 0,
                credit_limit REAL NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            INSERT INTO parties (kind, party_number, name) VALUES ('customer', 1, 'Çelik Traders');",
        )
        .unwrap();

        Database::initialize_conn(&conn).unwrap();

        let key: String = conn
            .query_row("SELECT name_key FROM parties WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(key, "çelik traders");
    }
}
