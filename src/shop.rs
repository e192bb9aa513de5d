//! The application handle every front end talks to.
//!
//! `Shop` owns the database, the configuration and the change bus. Reads run
//! against the bare connection; every mutation runs in one SQLite transaction
//! and notifies subscribers only after it commits.

use chrono::Local;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{MutexGuard, RwLock};

use crate::billing::{self, InvoiceSummary};
use crate::config::{AppConfig, CompanyProfile, CONFIG_FILE};
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::events::{ChangeBus, Collection};
use crate::models::{
    ChallanRequest, CollectionsExport, CreateInventoryItem, CreateParty, CreateQuotation,
    CreateQuotationRequest, DeliveryChallan, DraftLine, InventoryItem, Invoice, LedgerCheck,
    Party, PartyKind, PartyWithLedger, PurchaseLineCheck, PurchaseReceipt, PurchaseRequest,
    Quotation, QuotationRequest, QuotationStatus, QuoteComparison, ReorderSuggestion,
    SaleReceipt, SaleRequest, SupplierQuote, TransactionFilter, TransactionKind,
    TransactionRecord, TransactionReport, UpdateInventoryItem,
};
use crate::render::pdf;
use crate::render::print::{self, PrintDocument};
use crate::services::{inventory, ledger, purchases, quotations, reports, sales};
use crate::store::{
    InventoryStore, InvoiceStore, PartyStore, QuotationStore, SqliteStore, TransactionLog,
};

pub struct Shop {
    db: Database,
    config: RwLock<AppConfig>,
    config_path: Option<PathBuf>,
    events: ChangeBus,
}

impl Shop {
    pub fn new(db: Database, config: AppConfig, config_path: Option<PathBuf>) -> AppResult<Self> {
        config.validate()?;
        db.initialize()?;

        Ok(Shop {
            db,
            config: RwLock::new(config),
            config_path,
            events: ChangeBus::new(),
        })
    }

    /// Opens (or creates) the config and database under `data_dir`.
    pub fn open(data_dir: &Path) -> AppResult<Self> {
        std::fs::create_dir_all(data_dir)?;

        let config_path = data_dir.join(CONFIG_FILE);
        let config = AppConfig::load(&config_path)?;
        let db_path = data_dir.join(&config.database_file);
        tracing::info!("Opening database at {}", db_path.display());

        Self::new(Database::open(&db_path)?, config, Some(config_path))
    }

    pub fn in_memory(config: AppConfig) -> AppResult<Self> {
        Self::new(Database::open_in_memory()?, config, None)
    }

    pub fn events(&self) -> &ChangeBus {
        &self.events
    }

    pub fn config(&self) -> AppResult<AppConfig> {
        self.config
            .read()
            .map(|c| c.clone())
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.db
            .conn
            .lock()
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    fn read<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&SqliteStore<'_>) -> AppResult<T>,
    {
        let conn = self.lock()?;
        f(&SqliteStore::new(&conn))
    }

    fn write<T, F>(&self, touched: &[Collection], f: F) -> AppResult<T>
    where
        F: FnOnce(&SqliteStore<'_>) -> AppResult<T>,
    {
        let out = {
            let mut conn = self.lock()?;
            let tx = conn.transaction()?;
            let out = f(&SqliteStore::new(&tx)).map_err(|e| {
                if let AppError::Database(db) = &e {
                    tracing::error!("Rolling back write: {}", db);
                }
                e
            })?;
            tx.commit()?;
            out
        };

        for collection in touched {
            self.events.notify(*collection);
        }
        Ok(out)
    }

    // ===== INVENTORY =====

    pub fn list_items(&self) -> AppResult<Vec<InventoryItem>> {
        self.read(|store| store.list_items())
    }

    pub fn search_items(&self, query: &str) -> AppResult<Vec<InventoryItem>> {
        self.read(|store| store.search_items(query))
    }

    pub fn get_item(&self, article_code: &str) -> AppResult<InventoryItem> {
        self.read(|store| {
            store
                .find_item(article_code)?
                .ok_or_else(|| AppError::NotFound(format!("Inventory item {}", article_code)))
        })
    }

    pub fn create_item(&self, item: &CreateInventoryItem) -> AppResult<InventoryItem> {
        let config = self.config()?;
        self.write(&[Collection::Inventory], |store| {
            inventory::create_item(store, &config, item)
        })
    }

    pub fn update_item(&self, item: &UpdateInventoryItem) -> AppResult<InventoryItem> {
        self.write(&[Collection::Inventory], |store| inventory::update_item(store, item))
    }

    pub fn check_sale_line(&self, line: &DraftLine) -> AppResult<InventoryItem> {
        self.read(|store| inventory::check_sale_line(store, line))
    }

    pub fn check_purchase_line(&self, line: &DraftLine) -> AppResult<PurchaseLineCheck> {
        self.read(|store| inventory::check_purchase_line(store, line))
    }

    pub fn low_stock(&self) -> AppResult<Vec<InventoryItem>> {
        self.read(|store| store.low_stock())
    }

    pub fn reorder_suggestions(&self) -> AppResult<Vec<ReorderSuggestion>> {
        self.read(|store| inventory::reorder_suggestions(store))
    }

    // ===== PARTIES =====

    pub fn list_parties(&self, kind: Option<PartyKind>) -> AppResult<Vec<Party>> {
        self.read(|store| store.list_parties(kind))
    }

    pub fn get_party(&self, id: i64) -> AppResult<Party> {
        self.read(|store| store.get_party(id))
    }

    pub fn create_party(&self, party: &CreateParty) -> AppResult<Party> {
        self.write(&[Collection::Parties], |store| ledger::create_party(store, party))
    }

    pub fn party_ledger(&self, id: i64) -> AppResult<PartyWithLedger> {
        self.read(|store| ledger::party_ledger(store, id))
    }

    pub fn verify_party_ledger(&self, id: i64) -> AppResult<LedgerCheck> {
        self.read(|store| ledger::verify_ledger(store, id))
    }

    // ===== COMMITS =====

    pub fn commit_purchase(&self, request: &PurchaseRequest) -> AppResult<PurchaseReceipt> {
        let config = self.config()?;
        self.write(
            &[
                Collection::Inventory,
                Collection::Parties,
                Collection::Transactions,
            ],
            |store| purchases::commit_purchase(store, &config, request, Local::now()),
        )
    }

    pub fn commit_sale(&self, request: &SaleRequest) -> AppResult<SaleReceipt> {
        let config = self.config()?;
        self.write(
            &[
                Collection::Inventory,
                Collection::Parties,
                Collection::Transactions,
                Collection::Invoices,
            ],
            |store| sales::commit_sale(store, &config, request, Local::now()),
        )
    }

    // ===== INVOICES & DOCUMENTS =====

    pub fn list_sale_invoices(&self) -> AppResult<Vec<Invoice>> {
        self.read(|store| store.list_sale_invoices())
    }

    pub fn get_sale_invoice(&self, id: i64) -> AppResult<Invoice> {
        self.read(|store| store.get_sale_invoice(id))
    }

    pub fn last_sale_rate(&self, customer_name: &str, article_code: &str) -> AppResult<Option<f64>> {
        self.read(|store| sales::last_sale_rate(store, customer_name, article_code))
    }

    /// Totals for a sale draft without committing anything.
    pub fn preview_sale(&self, request: &SaleRequest) -> AppResult<InvoiceSummary> {
        let config = self.config()?;
        let invoice = billing::build_sale_invoice(request, &config, Local::now())?;
        Ok(InvoiceSummary::of_invoice(&invoice))
    }

    pub fn preview_purchase(&self, request: &PurchaseRequest) -> AppResult<InvoiceSummary> {
        let config = self.config()?;
        let invoice = billing::build_purchase_invoice(request, &config, Local::now())?;
        Ok(InvoiceSummary::of_invoice(&invoice))
    }

    pub fn build_challan(&self, request: &ChallanRequest) -> AppResult<DeliveryChallan> {
        let config = self.config()?;
        billing::build_challan(request, &config, Local::now())
    }

    // ===== QUOTATIONS =====

    pub fn create_quotation(&self, request: &CreateQuotation) -> AppResult<Quotation> {
        let config = self.config()?;
        self.write(&[Collection::Quotations], |store| {
            quotations::create_quotation(store, &config, request, Local::now())
        })
    }

    pub fn list_quotations(&self) -> AppResult<Vec<Quotation>> {
        self.read(|store| store.list_quotations())
    }

    pub fn get_quotation(&self, id: i64) -> AppResult<Quotation> {
        self.read(|store| store.get_quotation(id))
    }

    pub fn set_quotation_status(&self, id: i64, status: QuotationStatus) -> AppResult<Quotation> {
        self.write(&[Collection::Quotations], |store| {
            quotations::set_status(store, id, status)
        })
    }

    pub fn quotation_sale_lines(&self, id: i64) -> AppResult<Vec<DraftLine>> {
        let quotation = self.get_quotation(id)?;
        Ok(quotations::to_sale_lines(&quotation))
    }

    pub fn quotation_request(&self, request: &CreateQuotationRequest) -> AppResult<QuotationRequest> {
        let config = self.config()?;
        self.read(|store| quotations::build_request(store, &config, request, Local::now()))
    }

    pub fn low_stock_request(&self, supplier_names: Vec<String>) -> AppResult<QuotationRequest> {
        let config = self.config()?;
        self.read(|store| {
            quotations::low_stock_request(store, &config, supplier_names, Local::now())
        })
    }

    pub fn compare_quotes(
        &self,
        request: &QuotationRequest,
        quotes: &[SupplierQuote],
    ) -> QuoteComparison {
        quotations::compare_quotes(request, quotes)
    }

    // ===== TRANSACTION LOG =====

    pub fn list_transactions(&self, filter: &TransactionFilter) -> AppResult<Vec<TransactionRecord>> {
        self.read(|store| store.list_records(filter))
    }

    pub fn transaction_report(&self, filter: &TransactionFilter) -> AppResult<TransactionReport> {
        self.read(|store| reports::transaction_report(store, filter))
    }

    // ===== COMPANY =====

    pub fn companies(&self) -> AppResult<Vec<CompanyProfile>> {
        Ok(self.config()?.companies)
    }

    pub fn active_company(&self) -> AppResult<CompanyProfile> {
        self.config()?
            .active_company()
            .cloned()
            .ok_or_else(|| AppError::NotFound("Active company".to_string()))
    }

    pub fn set_active_company(&self, key: &str) -> AppResult<CompanyProfile> {
        let updated = {
            let mut config = self
                .config
                .write()
                .map_err(|e| AppError::Internal(e.to_string()))?;
            config.set_active_company(key)?;
            if let Some(path) = &self.config_path {
                config.save(path)?;
            }
            config.clone()
        };

        tracing::info!("Active company is now '{}'", updated.company_name());
        self.events.notify(Collection::Company);
        updated
            .active_company()
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Company {}", key)))
    }

    pub fn update_config(&self, new_config: AppConfig) -> AppResult<AppConfig> {
        new_config.validate()?;
        {
            let mut config = self
                .config
                .write()
                .map_err(|e| AppError::Internal(e.to_string()))?;
            if let Some(path) = &self.config_path {
                new_config.save(path)?;
            }
            *config = new_config.clone();
        }

        self.events.notify(Collection::Company);
        Ok(new_config)
    }

    // ===== PRINT & PDF =====

    pub fn print_invoice(&self, invoice: &Invoice) -> PrintDocument {
        print::invoice_html(invoice, &InvoiceSummary::of_invoice(invoice))
    }

    pub fn print_challan(&self, challan: &DeliveryChallan) -> PrintDocument {
        print::challan_html(challan)
    }

    pub fn print_quotation(&self, id: i64) -> AppResult<PrintDocument> {
        let quotation = self.get_quotation(id)?;
        Ok(print::quotation_html(
            &quotation,
            &InvoiceSummary::of_quotation(&quotation),
        ))
    }

    /// Sale or purchase invoice; purchases are not stored, so the caller
    /// passes the invoice from the receipt.
    pub fn export_invoice_pdf(&self, invoice: &Invoice, dir: &Path) -> AppResult<PathBuf> {
        let bytes = pdf::invoice_pdf(invoice, &InvoiceSummary::of_invoice(invoice))?;
        let prefix = match invoice.kind {
            TransactionKind::Sale => "sale_invoice",
            TransactionKind::Purchase => "purchase_invoice",
        };
        pdf::write_pdf(dir, prefix, Local::now(), &bytes)
    }

    pub fn export_quotation_pdf(&self, id: i64, dir: &Path) -> AppResult<PathBuf> {
        let quotation = self.get_quotation(id)?;
        let bytes = pdf::quotation_pdf(&quotation, &InvoiceSummary::of_quotation(&quotation))?;
        pdf::write_pdf(dir, "quotation", Local::now(), &bytes)
    }

    pub fn export_transaction_report_pdf(
        &self,
        filter: &TransactionFilter,
        dir: &Path,
    ) -> AppResult<PathBuf> {
        let report = self.transaction_report(filter)?;
        let now = Local::now();
        let bytes = pdf::transaction_report_pdf(&self.config()?.company_name(), &report, now)?;
        pdf::write_pdf(dir, "transaction_report", now, &bytes)
    }

    pub fn export_inventory_pdf(&self, dir: &Path) -> AppResult<PathBuf> {
        let items = self.list_items()?;
        let now = Local::now();
        let bytes = pdf::inventory_report_pdf(
            &self.config()?.company_name(),
            &items,
            inventory::stock_value(&items),
            now,
        )?;
        pdf::write_pdf(dir, "inventory_report", now, &bytes)
    }

    pub fn export_low_stock_pdf(&self, dir: &Path) -> AppResult<PathBuf> {
        let suggestions = self.reorder_suggestions()?;
        let now = Local::now();
        let bytes = pdf::low_stock_pdf(&self.config()?.company_name(), &suggestions, now)?;
        pdf::write_pdf(dir, "low_stock_report", now, &bytes)
    }

    pub fn export_quotation_request_pdf(
        &self,
        request: &QuotationRequest,
        dir: &Path,
    ) -> AppResult<PathBuf> {
        let bytes = pdf::quotation_request_pdf(request)?;
        pdf::write_pdf(dir, "quotation_request", Local::now(), &bytes)
    }

    pub fn export_comparison_pdf(
        &self,
        comparison: &QuoteComparison,
        dir: &Path,
    ) -> AppResult<PathBuf> {
        let bytes = pdf::comparison_pdf(&self.config()?.company_name(), comparison)?;
        pdf::write_pdf(dir, "quotation_comparison", Local::now(), &bytes)
    }

    // ===== BACKUP =====

    pub fn export_collections(&self) -> AppResult<CollectionsExport> {
        self.read(|store| store.export_collections())
    }

    pub fn import_collections(&self, snapshot: &CollectionsExport) -> AppResult<()> {
        self.write(
            &[
                Collection::Inventory,
                Collection::Parties,
                Collection::Transactions,
                Collection::Invoices,
                Collection::Quotations,
            ],
            |store| store.import_collections(snapshot),
        )
    }
}

#[cfg(feature = "desktop")]
pub trait ShopExt {
    fn shop(&self) -> &Shop;
}

#[cfg(feature = "desktop")]
impl ShopExt for tauri::AppHandle {
    fn shop(&self) -> &Shop {
        use tauri::Manager;
        self.state::<Shop>().inner()
    }
}
