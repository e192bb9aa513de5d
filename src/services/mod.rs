//! Business operations over the repository traits.
//!
//! Each function runs inside whatever transaction the caller opened; none of
//! them commits or notifies on its own.

pub mod inventory;
pub mod ledger;
pub mod purchases;
pub mod quotations;
pub mod reports;
pub mod sales;
