use std::path::PathBuf;
use tauri::AppHandle;

use crate::config::{AppConfig, CompanyProfile};
use crate::error::AppResult;
use crate::models::CollectionsExport;
use crate::shop::ShopExt;

#[tauri::command]
pub fn get_companies(app: AppHandle) -> AppResult<Vec<CompanyProfile>> {
    app.shop().companies()
}

#[tauri::command]
pub fn get_active_company(app: AppHandle) -> AppResult<CompanyProfile> {
    app.shop().active_company()
}

#[tauri::command]
pub fn set_active_company(app: AppHandle, key: String) -> AppResult<CompanyProfile> {
    app.shop().set_active_company(&key)
}

#[tauri::command]
pub fn get_config(app: AppHandle) -> AppResult<AppConfig> {
    app.shop().config()
}

#[tauri::command]
pub fn update_config(app: AppHandle, config: AppConfig) -> AppResult<AppConfig> {
    app.shop().update_config(config)
}

#[tauri::command]
pub fn export_backup(app: AppHandle, path: String) -> AppResult<String> {
    let snapshot = app.shop().export_collections()?;
    let path = PathBuf::from(path);
    std::fs::write(&path, serde_json::to_string_pretty(&snapshot)?)?;
    tracing::info!("Backup written to {}", path.display());
    Ok(path.to_string_lossy().to_string())
}

/// Replaces every collection with the contents of a backup file.
#[tauri::command]
pub fn import_backup(app: AppHandle, path: String) -> AppResult<()> {
    let raw = std::fs::read_to_string(&path)?;
    let snapshot: CollectionsExport = serde_json::from_str(&raw)?;
    app.shop().import_collections(&snapshot)?;
    tracing::info!("Backup restored from {}", path);
    Ok(())
}
