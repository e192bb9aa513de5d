use crate::billing::round2;
use crate::error::AppResult;
use crate::models::{TransactionFilter, TransactionReport};
use crate::store::TransactionLog;

pub fn transaction_report<S: TransactionLog>(
    store: &S,
    filter: &TransactionFilter,
) -> AppResult<TransactionReport> {
    let records = store.list_records(filter)?;

    let (total_amount, total_paid, total_remaining) =
        records.iter().fold((0.0, 0.0, 0.0), |(amount, paid, remaining), r| {
            (amount + r.amount, paid + r.paid_amount, remaining + r.remaining_amount)
        });

    Ok(TransactionReport {
        filter: filter.clone(),
        records,
        total_amount: round2(total_amount),
        total_paid: round2(total_paid),
        total_remaining: round2(total_remaining),
    })
}
