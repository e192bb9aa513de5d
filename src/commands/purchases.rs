use tauri::AppHandle;

use crate::billing::InvoiceSummary;
use crate::error::AppResult;
use crate::models::{PurchaseReceipt, PurchaseRequest};
use crate::shop::ShopExt;

#[tauri::command]
pub fn preview_purchase(app: AppHandle, request: PurchaseRequest) -> AppResult<InvoiceSummary> {
    app.shop().preview_purchase(&request)
}

#[tauri::command]
pub fn complete_purchase(app: AppHandle, request: PurchaseRequest) -> AppResult<PurchaseReceipt> {
    app.shop().commit_purchase(&request)
}
