use tauri::AppHandle;

use super::{export_dir, path_string};
use crate::error::AppResult;
use crate::models::{
    CreateInventoryItem, DraftLine, InventoryItem, PurchaseLineCheck, ReorderSuggestion,
    UpdateInventoryItem,
};
use crate::shop::ShopExt;

#[tauri::command]
pub fn get_inventory_items(app: AppHandle) -> AppResult<Vec<InventoryItem>> {
    app.shop().list_items()
}

#[tauri::command]
pub fn search_inventory(app: AppHandle, query: String) -> AppResult<Vec<InventoryItem>> {
    app.shop().search_items(&query)
}

#[tauri::command]
pub fn get_inventory_item(app: AppHandle, article_code: String) -> AppResult<InventoryItem> {
    app.shop().get_item(&article_code)
}

#[tauri::command]
pub fn create_inventory_item(
    app: AppHandle,
    item: CreateInventoryItem,
) -> AppResult<InventoryItem> {
    app.shop().create_item(&item)
}

#[tauri::command]
pub fn update_inventory_item(
    app: AppHandle,
    item: UpdateInventoryItem,
) -> AppResult<InventoryItem> {
    app.shop().update_item(&item)
}

/// Rejects a sale line asking for more than is on the shelf.
#[tauri::command]
pub fn check_sale_line(app: AppHandle, line: DraftLine) -> AppResult<InventoryItem> {
    app.shop().check_sale_line(&line)
}

#[tauri::command]
pub fn check_purchase_line(app: AppHandle, line: DraftLine) -> AppResult<PurchaseLineCheck> {
    app.shop().check_purchase_line(&line)
}

#[tauri::command]
pub fn get_low_stock(app: AppHandle) -> AppResult<Vec<InventoryItem>> {
    app.shop().low_stock()
}

#[tauri::command]
pub fn get_reorder_suggestions(app: AppHandle) -> AppResult<Vec<ReorderSuggestion>> {
    app.shop().reorder_suggestions()
}

#[tauri::command]
pub fn export_inventory_pdf(app: AppHandle, dir: Option<String>) -> AppResult<String> {
    let dir = export_dir(&app, dir)?;
    let path = app.shop().export_inventory_pdf(&dir)?;
    Ok(path_string(&path))
}

#[tauri::command]
pub fn export_low_stock_pdf(app: AppHandle, dir: Option<String>) -> AppResult<String> {
    let dir = export_dir(&app, dir)?;
    let path = app.shop().export_low_stock_pdf(&dir)?;
    Ok(path_string(&path))
}
