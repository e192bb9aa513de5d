use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(AppError::Validation(format!(
                        "Unknown {} value: {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

// ===== INVENTORY =====

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InventoryItem {
    pub id: i64,
    pub article_code: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit: String,
    pub rate: f64,
    pub sale_price: f64,
    pub min_sale_price: f64,
    pub current_stock: i64,
    pub min_stock: i64,
    pub max_stock: i64,
    /// Comma-joined supplier names, free text.
    pub supplier: String,
    pub location: Option<String>,
    pub last_restocked: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CreateInventoryItem {
    pub article_code: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub rate: f64,
    pub sale_price: Option<f64>,
    pub min_sale_price: Option<f64>,
    pub current_stock: Option<i64>,
    pub min_stock: Option<i64>,
    pub max_stock: Option<i64>,
    pub supplier: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UpdateInventoryItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit: String,
    pub rate: f64,
    pub sale_price: f64,
    pub min_sale_price: f64,
    pub current_stock: i64,
    pub min_stock: i64,
    pub max_stock: i64,
    pub supplier: String,
    pub location: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReorderSuggestion {
    pub item: InventoryItem,
    pub reorder_quantity: i64,
}

/// Result of adding a purchase line to a draft.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PurchaseLineCheck {
    Accepted,
    NewItem,
    NeedsConfirmation { previous_rate: f64, new_rate: f64 },
}

// ===== PARTIES & LEDGER =====

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    Customer,
    Supplier,
}

text_enum!(PartyKind {
    Customer => "customer",
    Supplier => "supplier",
});

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Party {
    pub id: i64,
    pub kind: PartyKind,
    pub party_number: i64,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    /// Positive means the business is owed (customers) or owes (suppliers).
    pub current_balance: f64,
    pub total_purchases: f64,
    pub total_payments: f64,
    pub credit_limit: f64,
    pub created_at: String,
}

/// Lookup key for party and customer names. Full Unicode lowercase, untrimmed.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateParty {
    pub kind: PartyKind,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub credit_limit: Option<f64>,
}

/// A party row ready to insert, number and opening figures already decided.
#[derive(Debug, Clone)]
pub struct NewParty {
    pub kind: PartyKind,
    pub party_number: i64,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub current_balance: f64,
    pub total_purchases: f64,
    pub total_payments: f64,
    pub credit_limit: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Sale,
    Purchase,
}

text_enum!(TransactionKind {
    Sale => "sale",
    Purchase => "purchase",
});

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LedgerEntry {
    pub id: i64,
    pub party_id: i64,
    pub date: String,
    pub kind: TransactionKind,
    pub amount: f64,
    pub paid_amount: f64,
    pub remaining_amount: f64,
    /// Party balance right after this entry was applied.
    pub balance: f64,
    pub reference: String,
    pub items: Vec<InvoiceItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLedgerEntry {
    pub party_id: i64,
    pub date: String,
    pub kind: TransactionKind,
    pub amount: f64,
    pub paid_amount: f64,
    pub remaining_amount: f64,
    pub balance: f64,
    pub reference: String,
    pub items: Vec<InvoiceItem>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PartyWithLedger {
    #[serde(flatten)]
    pub party: Party,
    pub transactions: Vec<LedgerEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LedgerDiscrepancy {
    pub entry_id: i64,
    pub reference: String,
    pub expected_balance: f64,
    pub recorded_balance: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerCheck {
    pub party_id: i64,
    pub entries: usize,
    pub recomputed_balance: f64,
    pub stored_balance: f64,
    pub first_discrepancy: Option<LedgerDiscrepancy>,
}

impl LedgerCheck {
    pub fn is_consistent(&self) -> bool {
        self.first_discrepancy.is_none()
            && (self.recomputed_balance - self.stored_balance).abs() < 0.005
    }
}

// ===== PAYMENTS =====

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Full,
}

text_enum!(PaymentStatus {
    Unpaid => "unpaid",
    Partial => "partial",
    Full => "full",
});

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOption {
    #[default]
    Cash,
    Credit,
}

text_enum!(PaymentOption {
    Cash => "cash",
    Credit => "credit",
});

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    #[default]
    WalkIn,
    Party,
}

text_enum!(CustomerType {
    WalkIn => "walk_in",
    Party => "party",
});

// ===== TRANSACTION LOG =====

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TransactionRecord {
    pub id: i64,
    pub kind: TransactionKind,
    pub invoice_no: String,
    pub customer_name: String,
    pub company_name: String,
    pub amount: f64,
    pub paid_amount: f64,
    pub remaining_amount: f64,
    pub payment_status: PaymentStatus,
    pub date: String,
    pub item_count: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    /// Inclusive `YYYY-MM-DD` bounds.
    pub from: Option<String>,
    pub to: Option<String>,
    pub customer_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TransactionReport {
    pub filter: TransactionFilter,
    pub records: Vec<TransactionRecord>,
    pub total_amount: f64,
    pub total_paid: f64,
    pub total_remaining: f64,
}

// ===== INVOICES & DOCUMENTS =====

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InvoiceItem {
    pub article_code: String,
    pub description: String,
    pub unit: String,
    pub quantity: i64,
    pub rate: f64,
    pub total_amount: f64,
    pub tax_percentage: Option<f64>,
    pub po_number: Option<String>,
    pub demand_number: Option<String>,
}

/// One line of an in-progress draft, before totals are computed.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DraftLine {
    pub article_code: String,
    pub description: String,
    pub unit: Option<String>,
    pub quantity: i64,
    pub rate: f64,
    pub tax_percentage: Option<f64>,
    pub po_number: Option<String>,
    pub demand_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Invoice {
    pub id: Option<i64>,
    pub invoice_no: String,
    pub kind: TransactionKind,
    pub customer_name: String,
    pub company_name: String,
    pub term_of_sale: Option<String>,
    pub invoice_date: String,
    pub customer_type: CustomerType,
    pub items: Vec<InvoiceItem>,
    pub total: f64,
    pub discount: f64,
    pub tcs_charges: f64,
    pub net_total: f64,
    pub cash_received: f64,
    pub remaining_balance: f64,
    pub payment_option: PaymentOption,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SaleRequest {
    pub invoice_no: Option<String>,
    pub customer_name: String,
    pub customer_type: CustomerType,
    pub company_name: Option<String>,
    pub term_of_sale: Option<String>,
    pub lines: Vec<DraftLine>,
    pub discount: f64,
    pub tcs_charges: f64,
    /// Defaults to the net total for cash sales and zero for credit sales.
    pub cash_received: Option<f64>,
    pub payment_option: PaymentOption,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PurchaseRequest {
    pub invoice_no: Option<String>,
    pub supplier_name: Option<String>,
    pub company_name: Option<String>,
    pub lines: Vec<DraftLine>,
    pub discount: f64,
    /// Defaults to the net total for cash purchases and zero for credit.
    pub paid_amount: Option<f64>,
    pub payment_option: PaymentOption,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SaleReceipt {
    pub invoice: Invoice,
    pub party: Option<Party>,
    pub log_entry: TransactionRecord,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PurchaseReceipt {
    pub invoice: Invoice,
    pub party: Option<Party>,
    pub log_entry: TransactionRecord,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DeliveryChallan {
    pub challan_no: String,
    pub company_name: String,
    pub customer_name: String,
    pub date: String,
    pub items: Vec<InvoiceItem>,
    pub total_quantity: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ChallanRequest {
    pub challan_no: Option<String>,
    pub customer_name: String,
    pub company_name: Option<String>,
    pub lines: Vec<DraftLine>,
}

// ===== QUOTATIONS =====

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuotationStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
}

text_enum!(QuotationStatus {
    Draft => "draft",
    Sent => "sent",
    Accepted => "accepted",
    Rejected => "rejected",
});

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Quotation {
    pub id: Option<i64>,
    pub quotation_no: String,
    pub customer_name: String,
    pub company_name: String,
    pub date: String,
    pub valid_until: Option<String>,
    pub items: Vec<InvoiceItem>,
    pub total: f64,
    pub discount: f64,
    pub net_total: f64,
    pub status: QuotationStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CreateQuotation {
    pub quotation_no: Option<String>,
    pub customer_name: String,
    pub company_name: Option<String>,
    pub valid_until: Option<String>,
    pub lines: Vec<DraftLine>,
    pub discount: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RequestedItem {
    pub article_code: String,
    pub description: String,
    pub unit: String,
    pub quantity: i64,
}

/// Rate enquiry sent to suppliers before purchasing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QuotationRequest {
    pub request_no: String,
    pub company_name: String,
    pub supplier_names: Vec<String>,
    pub date: String,
    pub items: Vec<RequestedItem>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CreateQuotationRequest {
    pub request_no: Option<String>,
    pub company_name: Option<String>,
    pub supplier_names: Vec<String>,
    pub lines: Vec<DraftLine>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QuotedRate {
    pub article_code: String,
    pub rate: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SupplierQuote {
    pub supplier: String,
    pub rates: Vec<QuotedRate>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SupplierRate {
    pub supplier: String,
    pub rate: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ComparisonRow {
    pub article_code: String,
    pub description: String,
    pub quantity: i64,
    pub quotes: Vec<SupplierRate>,
    pub best_supplier: Option<String>,
    pub best_rate: Option<f64>,
    pub best_total: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QuoteComparison {
    pub request_no: String,
    pub rows: Vec<ComparisonRow>,
    pub cheapest_total: f64,
}

// ===== BACKUP =====

/// Every collection as a JSON array under its storage key.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CollectionsExport {
    pub inventory: Vec<InventoryItem>,
    pub parties: Vec<PartyWithLedger>,
    pub transactions: Vec<TransactionRecord>,
    #[serde(rename = "salesInvoices")]
    pub sales_invoices: Vec<Invoice>,
    pub quotations: Vec<Quotation>,
}
