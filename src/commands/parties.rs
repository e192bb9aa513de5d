use tauri::AppHandle;

use crate::error::AppResult;
use crate::models::{CreateParty, LedgerCheck, Party, PartyKind, PartyWithLedger};
use crate::shop::ShopExt;

#[tauri::command]
pub fn get_parties(app: AppHandle, kind: Option<PartyKind>) -> AppResult<Vec<Party>> {
    app.shop().list_parties(kind)
}

#[tauri::command]
pub fn get_party(app: AppHandle, id: i64) -> AppResult<Party> {
    app.shop().get_party(id)
}

#[tauri::command]
pub fn create_party(app: AppHandle, party: CreateParty) -> AppResult<Party> {
    app.shop().create_party(&party)
}

#[tauri::command]
pub fn get_party_ledger(app: AppHandle, id: i64) -> AppResult<PartyWithLedger> {
    app.shop().party_ledger(id)
}

#[tauri::command]
pub fn verify_party_ledger(app: AppHandle, id: i64) -> AppResult<LedgerCheck> {
    app.shop().verify_party_ledger(id)
}
