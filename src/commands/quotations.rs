use tauri::AppHandle;

use super::{export_dir, path_string};
use crate::error::AppResult;
use crate::models::{
    CreateQuotation, CreateQuotationRequest, DraftLine, Quotation, QuotationRequest,
    QuotationStatus, QuoteComparison, SupplierQuote,
};
use crate::render::print::PrintDocument;
use crate::shop::ShopExt;

#[tauri::command]
pub fn create_quotation(app: AppHandle, request: CreateQuotation) -> AppResult<Quotation> {
    app.shop().create_quotation(&request)
}

#[tauri::command]
pub fn get_quotations(app: AppHandle) -> AppResult<Vec<Quotation>> {
    app.shop().list_quotations()
}

#[tauri::command]
pub fn get_quotation(app: AppHandle, id: i64) -> AppResult<Quotation> {
    app.shop().get_quotation(id)
}

#[tauri::command]
pub fn set_quotation_status(
    app: AppHandle,
    id: i64,
    status: QuotationStatus,
) -> AppResult<Quotation> {
    app.shop().set_quotation_status(id, status)
}

/// Sale draft lines at the quoted prices.
#[tauri::command]
pub fn quotation_to_sale(app: AppHandle, id: i64) -> AppResult<Vec<DraftLine>> {
    app.shop().quotation_sale_lines(id)
}

#[tauri::command]
pub fn print_quotation(app: AppHandle, id: i64) -> AppResult<PrintDocument> {
    app.shop().print_quotation(id)
}

#[tauri::command]
pub fn export_quotation_pdf(app: AppHandle, id: i64, dir: Option<String>) -> AppResult<String> {
    let dir = export_dir(&app, dir)?;
    let path = app.shop().export_quotation_pdf(id, &dir)?;
    Ok(path_string(&path))
}

#[tauri::command]
pub fn create_quotation_request(
    app: AppHandle,
    request: CreateQuotationRequest,
) -> AppResult<QuotationRequest> {
    app.shop().quotation_request(&request)
}

#[tauri::command]
pub fn create_low_stock_request(
    app: AppHandle,
    supplier_names: Vec<String>,
) -> AppResult<QuotationRequest> {
    app.shop().low_stock_request(supplier_names)
}

#[tauri::command]
pub fn export_quotation_request_pdf(
    app: AppHandle,
    request: QuotationRequest,
    dir: Option<String>,
) -> AppResult<String> {
    let dir = export_dir(&app, dir)?;
    let path = app.shop().export_quotation_request_pdf(&request, &dir)?;
    Ok(path_string(&path))
}

#[tauri::command]
pub fn compare_quotations(
    app: AppHandle,
    request: QuotationRequest,
    quotes: Vec<SupplierQuote>,
) -> AppResult<QuoteComparison> {
    Ok(app.shop().compare_quotes(&request, &quotes))
}

#[tauri::command]
pub fn export_comparison_pdf(
    app: AppHandle,
    comparison: QuoteComparison,
    dir: Option<String>,
) -> AppResult<String> {
    let dir = export_dir(&app, dir)?;
    let path = app.shop().export_comparison_pdf(&comparison, &dir)?;
    Ok(path_string(&path))
}
