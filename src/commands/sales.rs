use tauri::AppHandle;

use super::{export_dir, path_string};
use crate::billing::InvoiceSummary;
use crate::error::AppResult;
use crate::models::{ChallanRequest, DeliveryChallan, Invoice, SaleReceipt, SaleRequest};
use crate::render::print::PrintDocument;
use crate::shop::ShopExt;

#[tauri::command]
pub fn preview_sale(app: AppHandle, request: SaleRequest) -> AppResult<InvoiceSummary> {
    app.shop().preview_sale(&request)
}

#[tauri::command]
pub fn complete_sale(app: AppHandle, request: SaleRequest) -> AppResult<SaleReceipt> {
    app.shop().commit_sale(&request)
}

#[tauri::command]
pub fn get_sale_invoices(app: AppHandle) -> AppResult<Vec<Invoice>> {
    app.shop().list_sale_invoices()
}

#[tauri::command]
pub fn get_sale_invoice(app: AppHandle, id: i64) -> AppResult<Invoice> {
    app.shop().get_sale_invoice(id)
}

#[tauri::command]
pub fn get_last_sale_rate(
    app: AppHandle,
    customer_name: String,
    article_code: String,
) -> AppResult<Option<f64>> {
    app.shop().last_sale_rate(&customer_name, &article_code)
}

#[tauri::command]
pub fn print_invoice(app: AppHandle, invoice: Invoice) -> AppResult<PrintDocument> {
    Ok(app.shop().print_invoice(&invoice))
}

#[tauri::command]
pub fn export_invoice_pdf(
    app: AppHandle,
    invoice: Invoice,
    dir: Option<String>,
) -> AppResult<String> {
    let dir = export_dir(&app, dir)?;
    let path = app.shop().export_invoice_pdf(&invoice, &dir)?;
    Ok(path_string(&path))
}

#[tauri::command]
pub fn create_challan(app: AppHandle, request: ChallanRequest) -> AppResult<DeliveryChallan> {
    app.shop().build_challan(&request)
}

#[tauri::command]
pub fn print_challan(app: AppHandle, challan: DeliveryChallan) -> AppResult<PrintDocument> {
    Ok(app.shop().print_challan(&challan))
}
