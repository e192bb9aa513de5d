pub mod company;
pub mod inventory;
pub mod parties;
pub mod purchases;
pub mod quotations;
pub mod reports;
pub mod sales;

use std::path::{Path, PathBuf};
use tauri::{AppHandle, Manager};

use crate::error::{AppError, AppResult};

/// Folder picked in the UI, or the user's downloads folder.
fn export_dir(app: &AppHandle, dir: Option<String>) -> AppResult<PathBuf> {
    match dir {
        Some(d) if !d.trim().is_empty() => Ok(PathBuf::from(d)),
        _ => app
            .path()
            .download_dir()
            .map_err(|e| AppError::Internal(e.to_string())),
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
