use tauri::AppHandle;

use super::{export_dir, path_string};
use crate::error::AppResult;
use crate::models::{TransactionFilter, TransactionRecord, TransactionReport};
use crate::shop::ShopExt;

#[tauri::command]
pub fn get_transactions(
    app: AppHandle,
    filter: Option<TransactionFilter>,
) -> AppResult<Vec<TransactionRecord>> {
    app.shop().list_transactions(&filter.unwrap_or_default())
}

#[tauri::command]
pub fn get_transaction_report(
    app: AppHandle,
    filter: Option<TransactionFilter>,
) -> AppResult<TransactionReport> {
    app.shop().transaction_report(&filter.unwrap_or_default())
}

#[tauri::command]
pub fn export_transaction_report_pdf(
    app: AppHandle,
    filter: Option<TransactionFilter>,
    dir: Option<String>,
) -> AppResult<String> {
    let dir = export_dir(&app, dir)?;
    let path = app
        .shop()
        .export_transaction_report_pdf(&filter.unwrap_or_default(), &dir)?;
    Ok(path_string(&path))
}
