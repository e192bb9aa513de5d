//! Running party balances.
//!
//! Balances move forward one posting at a time and every ledger entry keeps
//! the balance it produced. Nothing here re-sums the entry list to derive a
//! balance; [`verify_ledger`] only reports disagreement.

use crate::billing::{remaining_amount, round2};
use crate::error::{validation, AppResult};
use crate::models::{
    CreateParty, InvoiceItem, LedgerCheck, LedgerDiscrepancy, NewLedgerEntry, NewParty, Party,
    PartyKind, PartyWithLedger, TransactionKind,
};
use crate::store::PartyStore;

/// One committed invoice as seen by the ledger.
#[derive(Debug, Clone)]
pub struct Posting<'a> {
    pub kind: TransactionKind,
    pub net_total: f64,
    pub paid: f64,
    pub reference: &'a str,
    pub date: &'a str,
    pub items: &'a [InvoiceItem],
}

/// Applies `posting` to the in-memory party and returns the entry to append.
pub fn apply_posting(party: &mut Party, posting: &Posting<'_>) -> NewLedgerEntry {
    let remaining = remaining_amount(posting.net_total, posting.paid);
    party.current_balance = round2(party.current_balance + remaining);

    if posting.kind == TransactionKind::Purchase {
        party.total_purchases = round2(party.total_purchases + posting.net_total);
        party.total_payments = round2(party.total_payments + posting.paid);
    }

    NewLedgerEntry {
        party_id: party.id,
        date: posting.date.to_string(),
        kind: posting.kind,
        amount: posting.net_total,
        paid_amount: posting.paid,
        remaining_amount: remaining,
        balance: party.current_balance,
        reference: posting.reference.to_string(),
        items: posting.items.to_vec(),
    }
}

/// Finds the party by name (creating it on first use) and posts to it.
pub fn post_to_ledger<S: PartyStore>(
    store: &S,
    kind: PartyKind,
    name: &str,
    posting: &Posting<'_>,
) -> AppResult<Party> {
    let mut party = match store.find_party_by_name(kind, name)? {
        Some(party) => party,
        None => {
            let party_number = store.next_party_number(kind)?;
            tracing::info!("Creating {} #{} '{}' from {}", kind, party_number, name, posting.reference);
            store.insert_party(&NewParty {
                kind,
                party_number,
                name: name.to_string(),
                phone: None,
                address: None,
                city: None,
                current_balance: 0.0,
                total_purchases: 0.0,
                total_payments: 0.0,
                credit_limit: 0.0,
            })?
        }
    };

    let entry = apply_posting(&mut party, posting);
    store.save_party(&party)?;
    store.append_entry(&entry)?;

    tracing::info!(
        "Posted {} {} to {} '{}': balance now {:.2}",
        posting.kind,
        posting.reference,
        kind,
        party.name,
        party.current_balance
    );
    Ok(party)
}

pub fn create_party<S: PartyStore>(store: &S, party: &CreateParty) -> AppResult<Party> {
    if party.name.trim().is_empty() {
        return Err(validation("Party name is required"));
    }
    if store.find_party_by_name(party.kind, &party.name)?.is_some() {
        return Err(validation(format!("{} '{}' already exists", party.kind, party.name)));
    }
    if party.credit_limit.is_some_and(|limit| limit < 0.0) {
        return Err(validation("Credit limit cannot be negative"));
    }

    let party_number = store.next_party_number(party.kind)?;
    store.insert_party(&NewParty {
        kind: party.kind,
        party_number,
        name: party.name.clone(),
        phone: party.phone.clone(),
        address: party.address.clone(),
        city: party.city.clone(),
        current_balance: 0.0,
        total_purchases: 0.0,
        total_payments: 0.0,
        credit_limit: party.credit_limit.unwrap_or(0.0),
    })
}

pub fn party_ledger<S: PartyStore>(store: &S, party_id: i64) -> AppResult<PartyWithLedger> {
    let party = store.get_party(party_id)?;
    let transactions = store.ledger_entries(party_id)?;
    Ok(PartyWithLedger {
        party,
        transactions,
    })
}

/// Replays remaining amounts in commit order against the stored snapshots.
pub fn verify_ledger<S: PartyStore>(store: &S, party_id: i64) -> AppResult<LedgerCheck> {
    let ledger = party_ledger(store, party_id)?;

    let mut running = 0.0;
    let mut first_discrepancy = None;
    for entry in &ledger.transactions {
        running = round2(running + entry.remaining_amount);
        if first_discrepancy.is_none() && (running - entry.balance).abs() >= 0.005 {
            first_discrepancy = Some(LedgerDiscrepancy {
                entry_id: entry.id,
                reference: entry.reference.clone(),
                expected_balance: running,
                recorded_balance: entry.balance,
            });
        }
    }

    Ok(LedgerCheck {
        party_id,
        entries: ledger.transactions.len(),
        recomputed_balance: running,
        stored_balance: ledger.party.current_balance,
        first_discrepancy,
    })
}
