use rusqlite::{OptionalExtension, Row};

use super::{expect_row, not_found, InventoryStore, SqliteStore};
use crate::error::AppResult;
use crate::models::{CreateInventoryItem, InventoryItem, UpdateInventoryItem};

const ITEM_COLUMNS: &str = "id, article_code, name, description, category, unit, rate, sale_price, \
     min_sale_price, current_stock, min_stock, max_stock, supplier, location, last_restocked, created_at";

fn map_item(row: &Row<'_>) -> rusqlite::Result<InventoryItem> {
    Ok(InventoryItem {
        id: row.get(0)?,
        article_code: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        unit: row.get(5)?,
        rate: row.get(6)?,
        sale_price: row.get(7)?,
        min_sale_price: row.get(8)?,
        current_stock: row.get(9)?,
        min_stock: row.get(10)?,
        max_stock: row.get(11)?,
        supplier: row.get(12)?,
        location: row.get(13)?,
        last_restocked: row.get(14)?,
        created_at: row.get(15)?,
    })
}

impl InventoryStore for SqliteStore<'_> {
    fn list_items(&self) -> AppResult<Vec<InventoryItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM inventory_items ORDER BY article_code",
            ITEM_COLUMNS
        ))?;

        let items = stmt
            .query_map([], map_item)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    fn search_items(&self, query: &str) -> AppResult<Vec<InventoryItem>> {
        let pattern = format!("%{}%", query.trim().to_lowercase());
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM inventory_items
             WHERE LOWER(article_code) LIKE ?1
                OR LOWER(name) LIKE ?1
                OR LOWER(COALESCE(description, '')) LIKE ?1
             ORDER BY article_code",
            ITEM_COLUMNS
        ))?;

        let items = stmt
            .query_map([&pattern], map_item)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    fn get_item(&self, id: i64) -> AppResult<InventoryItem> {
        expect_row(
            self.conn.query_row(
                &format!("SELECT {} FROM inventory_items WHERE id = ?1", ITEM_COLUMNS),
                [id],
                map_item,
            ),
            "Inventory item",
            id,
        )
    }

    fn find_item(&self, article_code: &str) -> AppResult<Option<InventoryItem>> {
        let item = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM inventory_items WHERE article_code = ?1",
                    ITEM_COLUMNS
                ),
                [article_code],
                map_item,
            )
            .optional()?;

        Ok(item)
    }

    fn insert_item(
        &self,
        item: &CreateInventoryItem,
        default_min_stock: i64,
    ) -> AppResult<InventoryItem> {
        self.conn.execute(
            "INSERT INTO inventory_items (article_code, name, description, category, unit, rate, sale_price,
                 min_sale_price, current_stock, min_stock, max_stock, supplier, location)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            rusqlite::params![
                item.article_code.trim(),
                item.name.trim(),
                item.description,
                item.category,
                item.unit.clone().unwrap_or_else(|| "pcs".to_string()),
                item.rate,
                item.sale_price.unwrap_or(0.0),
                item.min_sale_price.unwrap_or(0.0),
                item.current_stock.unwrap_or(0),
                item.min_stock.unwrap_or(default_min_stock),
                item.max_stock.unwrap_or(0),
                item.supplier.clone().unwrap_or_default(),
                item.location,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_item(id)
    }

    fn update_item(&self, item: &UpdateInventoryItem) -> AppResult<InventoryItem> {
        let changed = self.conn.execute(
            "UPDATE inventory_items SET name = ?1, description = ?2, category = ?3, unit = ?4, rate = ?5,
                 sale_price = ?6, min_sale_price = ?7, current_stock = ?8, min_stock = ?9, max_stock = ?10,
                 supplier = ?11, location = ?12
             WHERE id = ?13",
            rusqlite::params![
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
                item.id,
            ],
        )?;

        if changed == 0 {
            return Err(not_found("Inventory item", item.id));
        }

        self.get_item(item.id)
    }

    fn restock(
        &self,
        article_code: &str,
        quantity: i64,
        rate: f64,
        supplier: &str,
        date: &str,
    ) -> AppResult<()> {
        let changed = self.conn.execute(
            "UPDATE inventory_items
             SET current_stock = current_stock + ?1, rate = ?2, supplier = ?3, last_restocked = ?4
             WHERE article_code = ?5",
            rusqlite::params![quantity, rate, supplier, date, article_code],
        )?;

        if changed == 0 {
            return Err(not_found("Inventory item", article_code));
        }
        Ok(())
    }

    fn deduct_stock(&self, article_code: &str, quantity: i64) -> AppResult<()> {
        let changed = self.conn.execute(
            "UPDATE inventory_items SET current_stock = current_stock - ?1 WHERE article_code = ?2",
            rusqlite::params![quantity, article_code],
        )?;

        if changed == 0 {
            return Err(not_found("Inventory item", article_code));
        }
        Ok(())
    }

    fn low_stock(&self) -> AppResult<Vec<InventoryItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM inventory_items
             WHERE current_stock <= min_stock
             ORDER BY current_stock ASC, article_code",
            ITEM_COLUMNS
        ))?;

        let items = stmt
            .query_map([], map_item)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }
}
