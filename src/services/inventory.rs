use crate::config::AppConfig;
use crate::error::{validation, AppError, AppResult};
use crate::models::{
    name_key, CreateInventoryItem, DraftLine, InventoryItem, PurchaseLineCheck, ReorderSuggestion,
    UpdateInventoryItem,
};
use crate::store::InventoryStore;

pub fn create_item<S: InventoryStore>(
    store: &S,
    config: &AppConfig,
    item: &CreateInventoryItem,
) -> AppResult<InventoryItem> {
    if item.article_code.trim().is_empty() {
        return Err(validation("Article code is required"));
    }
    if item.name.trim().is_empty() {
        return Err(validation("Item name is required"));
    }
    if item.rate == 0.0 {
        return Err(validation("Rate is required"));
    }
    if store.find_item(item.article_code.trim())?.is_some() {
        return Err(validation(format!(
            "Article code {} already exists",
            item.article_code.trim()
        )));
    }

    let created = store.insert_item(item, config.default_min_stock)?;
    tracing::info!("Created inventory item {}", created.article_code);
    Ok(created)
}

pub fn update_item<S: InventoryStore>(
    store: &S,
    item: &UpdateInventoryItem,
) -> AppResult<InventoryItem> {
    if item.name.trim().is_empty() {
        return Err(validation("Item name is required"));
    }
    store.update_item(item)
}

/// Rejects a sale line asking for more than is on hand right now.
pub fn check_sale_line<S: InventoryStore>(store: &S, line: &DraftLine) -> AppResult<InventoryItem> {
    let item = store
        .find_item(&line.article_code)?
        .ok_or_else(|| AppError::NotFound(format!("Inventory item {}", line.article_code)))?;

    if line.quantity <= 0 {
        return Err(validation("Quantity must be greater than zero"));
    }
    if line.quantity > item.current_stock {
        return Err(AppError::InsufficientStock {
            article_code: item.article_code,
            requested: line.quantity,
            available: item.current_stock,
        });
    }
    Ok(item)
}

/// A rate above the stored one needs explicit confirmation before the line is added.
pub fn check_purchase_line<S: InventoryStore>(
    store: &S,
    line: &DraftLine,
) -> AppResult<PurchaseLineCheck> {
    if line.quantity <= 0 {
        return Err(validation("Quantity must be greater than zero"));
    }
    let check = match store.find_item(&line.article_code)? {
        None => PurchaseLineCheck::NewItem,
        Some(item) if line.rate > item.rate => PurchaseLineCheck::NeedsConfirmation {
            previous_rate: item.rate,
            new_rate: line.rate,
        },
        Some(_) => PurchaseLineCheck::Accepted,
    };
    Ok(check)
}

/// Adds `supplier` to a comma-joined list unless it is already there.
pub fn merge_supplier(existing: &str, supplier: &str) -> String {
    let supplier = supplier.trim();
    let mut names: Vec<&str> = existing
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let key = name_key(supplier);
    if !supplier.is_empty() && !names.iter().any(|n| name_key(n) == key) {
        names.push(supplier);
    }
    names.join(", ")
}

pub fn reorder_suggestions<S: InventoryStore>(store: &S) -> AppResult<Vec<ReorderSuggestion>> {
    let suggestions = store
        .low_stock()?
        .into_iter()
        .map(|item| {
            // No max configured: bring it back up to the threshold
            let target = if item.max_stock > 0 {
                item.max_stock
            } else {
                item.min_stock
            };
            ReorderSuggestion {
                reorder_quantity: (target - item.current_stock).max(0),
                item,
            }
        })
        .collect();

    Ok(suggestions)
}

pub fn stock_value(items: &[InventoryItem]) -> f64 {
    crate::billing::round2(
        items
            .iter()
            .map(|i| i.current_stock.max(0) as f64 * i.rate)
            .sum(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_supplier() {
        assert_eq!(merge_supplier("", "Singer"), "Singer");
        assert_eq!(merge_supplier("Singer", "Juki"), "Singer, Juki");
        assert_eq!(merge_supplier("Singer, Juki", "juki"), "Singer, Juki");
        assert_eq!(merge_supplier("Singer,,Juki ", ""), "Singer, Juki");
        assert_eq!(merge_supplier("Çelik Makina", "ÇELIK MAKINA"), "Çelik Makina");
    }
}
