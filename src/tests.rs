//! Integration tests for the shop operations
//! These tests use an in-memory SQLite database to exercise whole commits

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};
    use rusqlite::Connection;
    use std::sync::{Arc, Mutex};

    use crate::config::{AppConfig, CompanyProfile};
    use crate::db::Database;
    use crate::error::AppError;
    use crate::events::Collection;
    use crate::models::{
        CreateInventoryItem, CreateParty, CreateQuotation, DraftLine, PartyKind, PaymentOption,
        PaymentStatus, PurchaseLineCheck, PurchaseRequest, QuotationStatus, SaleRequest,
        TransactionFilter, TransactionKind,
    };
    use crate::services::{ledger, sales};
    use crate::shop::Shop;
    use crate::store::{PartyStore, SqliteStore};

    /// Create a test database with schema
    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
        Database::initialize_conn(&conn).expect("Failed to create schema");
        conn
    }

    fn setup_shop() -> Shop {
        Shop::in_memory(AppConfig::default()).expect("Failed to open shop")
    }

    fn item(code: &str, name: &str, rate: f64, stock: i64, min: i64, max: i64) -> CreateInventoryItem {
        CreateInventoryItem {
            article_code: code.to_string(),
            name: name.to_string(),
            rate,
            sale_price: Some(rate * 1.25),
            current_stock: Some(stock),
            min_stock: Some(min),
            max_stock: Some(max),
            supplier: Some("Singer".to_string()),
            ..Default::default()
        }
    }

    /// Seed test data
    fn seed_items(shop: &Shop) {
        shop.create_item(&item("NDL-90", "Needle 90 (box)", 40.0, 20, 5, 50))
            .unwrap();
        shop.create_item(&item("BOB-01", "Bobbin case", 25.0, 3, 5, 30))
            .unwrap();
        shop.create_item(&item("MTR-200", "Servo motor", 4000.0, 0, 1, 4))
            .unwrap();
    }

    fn line(code: &str, quantity: i64, rate: f64) -> DraftLine {
        DraftLine {
            article_code: code.to_string(),
            description: format!("{} part", code),
            quantity,
            rate,
            ..Default::default()
        }
    }

    fn credit_sale(customer: &str, lines: Vec<DraftLine>, paid: f64) -> SaleRequest {
        SaleRequest {
            customer_name: customer.to_string(),
            customer_type: crate::models::CustomerType::Party,
            lines,
            cash_received: Some(paid),
            payment_option: PaymentOption::Credit,
            ..Default::default()
        }
    }

    fn stock_of(shop: &Shop, code: &str) -> i64 {
        shop.get_item(code).unwrap().current_stock
    }

    // ===== INVENTORY TESTS =====

    #[test]
    fn test_create_item_validation() {
        let shop = setup_shop();
        seed_items(&shop);

        let duplicate = shop.create_item(&item("NDL-90", "Another needle", 10.0, 0, 1, 1));
        assert!(matches!(duplicate, Err(AppError::Validation(_))));

        let zero_rate = shop.create_item(&item("NEW-1", "Free part", 0.0, 0, 1, 1));
        assert!(matches!(zero_rate, Err(AppError::Validation(_))));

        let no_name = shop.create_item(&item("NEW-2", "  ", 5.0, 0, 1, 1));
        assert!(matches!(no_name, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_new_item_defaults() {
        let shop = setup_shop();

        let created = shop
            .create_item(&CreateInventoryItem {
                article_code: "SPR-7".to_string(),
                name: "Tension spring".to_string(),
                rate: 12.0,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(created.current_stock, 0);
        assert_eq!(created.min_stock, 5, "Falls back to the configured minimum");
        assert_eq!(created.unit, "pcs");
    }

    #[test]
    fn test_search_items_case_insensitive() {
        let shop = setup_shop();
        seed_items(&shop);

        let found = shop.search_items("ndl").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].article_code, "NDL-90");

        let by_name = shop.search_items("MOTOR").unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].article_code, "MTR-200");
    }

    #[test]
    fn test_low_stock_ordered_by_stock() {
        let shop = setup_shop();
        seed_items(&shop);

        let low: Vec<String> = shop
            .low_stock()
            .unwrap()
            .into_iter()
            .map(|i| i.article_code)
            .collect();
        assert_eq!(low, vec!["MTR-200", "BOB-01"]);
    }

    #[test]
    fn test_reorder_suggestions_fill_to_max() {
        let shop = setup_shop();
        seed_items(&shop);

        let suggestions = shop.reorder_suggestions().unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].item.article_code, "MTR-200");
        assert_eq!(suggestions[0].reorder_quantity, 4);
        assert_eq!(suggestions[1].reorder_quantity, 27);
    }

    #[test]
    fn test_sale_line_check_against_stock() {
        let shop = setup_shop();
        seed_items(&shop);

        assert!(shop.check_sale_line(&line("BOB-01", 3, 30.0)).is_ok());

        match shop.check_sale_line(&line("BOB-01", 4, 30.0)) {
            Err(AppError::InsufficientStock {
                requested,
                available,
                ..
            }) => {
                assert_eq!(requested, 4);
                assert_eq!(available, 3);
            }
            other => panic!("Expected insufficient stock, got {:?}", other),
        }
    }

    #[test]
    fn test_purchase_line_rate_increase_needs_confirmation() {
        let shop = setup_shop();
        seed_items(&shop);

        assert_eq!(
            shop.check_purchase_line(&line("NDL-90", 5, 40.0)).unwrap(),
            PurchaseLineCheck::Accepted
        );
        assert_eq!(
            shop.check_purchase_line(&line("NDL-90", 5, 35.0)).unwrap(),
            PurchaseLineCheck::Accepted
        );
        assert_eq!(
            shop.check_purchase_line(&line("NDL-90", 5, 45.0)).unwrap(),
            PurchaseLineCheck::NeedsConfirmation {
                previous_rate: 40.0,
                new_rate: 45.0
            }
        );
        assert_eq!(
            shop.check_purchase_line(&line("NEW-1", 5, 45.0)).unwrap(),
            PurchaseLineCheck::NewItem
        );
    }

    // ===== PURCHASE TESTS =====

    #[test]
    fn test_cash_purchase_without_supplier() {
        let shop = setup_shop();
        shop.create_item(&item("PLT-3", "Needle plate", 40.0, 0, 2, 10))
            .unwrap();

        let receipt = shop
            .commit_purchase(&PurchaseRequest {
                lines: vec![line("PLT-3", 10, 50.0)],
                ..Default::default()
            })
            .unwrap();

        let stored = shop.get_item("PLT-3").unwrap();
        assert_eq!(stored.current_stock, 10);
        assert!((stored.rate - 50.0).abs() < 0.001);
        assert!(stored.last_restocked.is_some());

        assert!(receipt.party.is_none());
        assert!(shop.list_parties(None).unwrap().is_empty());

        let log = shop.list_transactions(&TransactionFilter::default()).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].kind, TransactionKind::Purchase);
        assert_eq!(log[0].payment_status, PaymentStatus::Full);
        assert_eq!(log[0].remaining_amount, 0.0);
    }

    #[test]
    fn test_purchase_adds_stock_and_overwrites_rate() {
        let shop = setup_shop();
        seed_items(&shop);

        shop.commit_purchase(&PurchaseRequest {
            lines: vec![line("NDL-90", 5, 38.0), line("BOB-01", 10, 27.5)],
            ..Default::default()
        })
        .unwrap();

        assert_eq!(stock_of(&shop, "NDL-90"), 25);
        assert_eq!(stock_of(&shop, "BOB-01"), 13);
        assert!((shop.get_item("NDL-90").unwrap().rate - 38.0).abs() < 0.001);
        assert!((shop.get_item("BOB-01").unwrap().rate - 27.5).abs() < 0.001);
    }

    #[test]
    fn test_purchase_creates_supplier_with_next_number() {
        let shop = setup_shop();
        seed_items(&shop);
        shop.create_party(&CreateParty {
            kind: PartyKind::Supplier,
            name: "Juki Traders".to_string(),
            phone: None,
            address: None,
            city: Some("Lahore".to_string()),
            credit_limit: None,
        })
        .unwrap();

        let receipt = shop
            .commit_purchase(&PurchaseRequest {
                supplier_name: Some("Brother Wholesale".to_string()),
                lines: vec![line("NDL-90", 10, 40.0)],
                paid_amount: Some(100.0),
                payment_option: PaymentOption::Credit,
                ..Default::default()
            })
            .unwrap();

        let supplier = receipt.party.expect("Supplier should be created");
        assert_eq!(supplier.party_number, 2);
        assert_eq!(supplier.kind, PartyKind::Supplier);
        assert!((supplier.current_balance - 300.0).abs() < 0.001);
        assert!((supplier.total_purchases - 400.0).abs() < 0.001);
        assert!((supplier.total_payments - 100.0).abs() < 0.001);

        let ledger = shop.party_ledger(supplier.id).unwrap();
        assert_eq!(ledger.transactions.len(), 1);
        assert!((ledger.transactions[0].balance - 300.0).abs() < 0.001);
        assert_eq!(ledger.transactions[0].items.len(), 1);
    }

    #[test]
    fn test_purchase_merges_supplier_into_item() {
        let shop = setup_shop();
        seed_items(&shop);

        shop.commit_purchase(&PurchaseRequest {
            supplier_name: Some("Juki".to_string()),
            lines: vec![line("NDL-90", 1, 40.0)],
            ..Default::default()
        })
        .unwrap();
        shop.commit_purchase(&PurchaseRequest {
            supplier_name: Some("juki".to_string()),
            lines: vec![line("NDL-90", 1, 40.0)],
            ..Default::default()
        })
        .unwrap();

        assert_eq!(shop.get_item("NDL-90").unwrap().supplier, "Singer, Juki");
        // Case-insensitive lookup reuses the same supplier party
        assert_eq!(shop.list_parties(Some(PartyKind::Supplier)).unwrap().len(), 1);
    }

    #[test]
    fn test_purchase_unknown_article_writes_nothing() {
        let shop = setup_shop();
        seed_items(&shop);

        let result = shop.commit_purchase(&PurchaseRequest {
            supplier_name: Some("Singer".to_string()),
            lines: vec![line("NDL-90", 5, 40.0), line("NOPE-1", 1, 10.0)],
            payment_option: PaymentOption::Credit,
            ..Default::default()
        });

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(stock_of(&shop, "NDL-90"), 20);
        assert!(shop.list_parties(None).unwrap().is_empty());
        assert!(shop
            .list_transactions(&TransactionFilter::default())
            .unwrap()
            .is_empty());
    }

    // ===== SALE TESTS =====

    #[test]
    fn test_sale_deducts_stock_and_stores_invoice() {
        let shop = setup_shop();
        seed_items(&shop);

        let receipt = shop
            .commit_sale(&SaleRequest {
                lines: vec![line("NDL-90", 4, 50.0), line("BOB-01", 2, 30.0)],
                ..Default::default()
            })
            .unwrap();

        assert_eq!(stock_of(&shop, "NDL-90"), 16);
        assert_eq!(stock_of(&shop, "BOB-01"), 1);
        assert!(receipt.invoice.id.is_some());
        assert_eq!(receipt.invoice.payment_status, PaymentStatus::Full);

        let invoices = shop.list_sale_invoices().unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].items.len(), 2);
        assert!((invoices[0].net_total - 260.0).abs() < 0.001);
    }

    #[test]
    fn test_cash_sale_posts_no_ledger_entry() {
        let shop = setup_shop();
        seed_items(&shop);

        let receipt = shop
            .commit_sale(&SaleRequest {
                customer_name: "Rehman Tailors".to_string(),
                lines: vec![line("NDL-90", 1, 50.0)],
                ..Default::default()
            })
            .unwrap();

        assert!(receipt.party.is_none());
        assert!(shop.list_parties(None).unwrap().is_empty());
        assert_eq!(
            shop.list_transactions(&TransactionFilter::default())
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_credit_sale_to_party_with_balance() {
        let conn = setup_test_db();
        let store = SqliteStore::new(&conn);
        let config = AppConfig::default();
        let now = Local.with_ymd_and_hms(2024, 3, 7, 11, 0, 0).unwrap();

        crate::services::inventory::create_item(
            &store,
            &config,
            &item("MTR-200", "Servo motor", 800.0, 5, 1, 4),
        )
        .unwrap();
        let mut party = ledger::create_party(
            &store,
            &CreateParty {
                kind: PartyKind::Customer,
                name: "Star Stitching".to_string(),
                phone: None,
                address: None,
                city: None,
                credit_limit: Some(5000.0),
            },
        )
        .unwrap();
        party.current_balance = 500.0;
        store.save_party(&party).unwrap();

        let receipt = sales::commit_sale(
            &store,
            &config,
            &credit_sale("star stitching", vec![line("MTR-200", 1, 1000.0)], 0.0),
            now,
        )
        .unwrap();

        let party = receipt.party.expect("Existing customer should be posted");
        assert!((party.current_balance - 1500.0).abs() < 0.001);

        let entries = store.ledger_entries(party.id).unwrap();
        assert_eq!(entries.len(), 1);
        assert!((entries[0].balance - 1500.0).abs() < 0.001);
        assert!((entries[0].remaining_amount - 1000.0).abs() < 0.001);
        assert_eq!(entries[0].reference, receipt.invoice.invoice_no);
    }

    #[test]
    fn test_credit_balance_is_ordered_sum() {
        let shop = setup_shop();
        seed_items(&shop);

        let sales = [(2, 50.0, 20.0), (1, 45.0, 0.0), (3, 50.0, 150.0), (4, 42.5, 70.0)];
        let mut expected = 0.0;
        let mut party_id = 0;
        for (qty, rate, paid) in sales {
            let receipt = shop
                .commit_sale(&credit_sale("Rehman Tailors", vec![line("NDL-90", qty, rate)], paid))
                .unwrap();
            expected += qty as f64 * rate - paid;
            let party = receipt.party.unwrap();
            assert!((party.current_balance - expected).abs() < 0.001);
            party_id = party.id;
        }

        let ledger = shop.party_ledger(party_id).unwrap();
        assert_eq!(ledger.transactions.len(), 4);
        assert!((ledger.party.current_balance - 225.0).abs() < 0.001);
        assert!((ledger.transactions[3].balance - 225.0).abs() < 0.001);

        let check = shop.verify_party_ledger(party_id).unwrap();
        assert!(check.is_consistent());
        assert_eq!(check.entries, 4);
    }

    #[test]
    fn test_new_customer_gets_next_number() {
        let shop = setup_shop();
        seed_items(&shop);

        let first = shop
            .commit_sale(&credit_sale("City Garments", vec![line("NDL-90", 1, 50.0)], 0.0))
            .unwrap()
            .party
            .unwrap();
        let second = shop
            .commit_sale(&credit_sale("Lucky Tailors", vec![line("NDL-90", 1, 50.0)], 0.0))
            .unwrap()
            .party
            .unwrap();

        assert_eq!(first.party_number, 1);
        assert_eq!(second.party_number, 2);
        assert_eq!(first.kind, PartyKind::Customer);
    }

    #[test]
    fn test_insufficient_stock_rejected_at_commit() {
        let shop = setup_shop();
        seed_items(&shop);

        // Two lines of the same article are checked against their sum
        let result = shop.commit_sale(&SaleRequest {
            lines: vec![line("BOB-01", 2, 30.0), line("BOB-01", 2, 30.0)],
            ..Default::default()
        });

        match result {
            Err(AppError::InsufficientStock {
                article_code,
                requested,
                available,
            }) => {
                assert_eq!(article_code, "BOB-01");
                assert_eq!(requested, 4);
                assert_eq!(available, 3);
            }
            other => panic!("Expected insufficient stock, got {:?}", other),
        }
        assert_eq!(stock_of(&shop, "BOB-01"), 3);
        assert!(shop.list_sale_invoices().unwrap().is_empty());
    }

    #[test]
    fn test_huge_quantities_rejected_without_locking_shop() {
        let shop = setup_shop();
        seed_items(&shop);

        let huge = i64::MAX / 2 + 1;
        let result = shop.commit_sale(&SaleRequest {
            lines: vec![line("NDL-90", huge, 1.0), line("NDL-90", huge, 1.0)],
            ..Default::default()
        });
        assert!(matches!(result, Err(AppError::Validation(_))));

        // The shop stays usable and nothing moved
        assert_eq!(stock_of(&shop, "NDL-90"), 20);
        shop.commit_sale(&SaleRequest {
            lines: vec![line("NDL-90", 1, 50.0)],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(stock_of(&shop, "NDL-90"), 19);
    }

    #[test]
    fn test_negative_stock_allowed_by_config() {
        let config = AppConfig {
            allow_negative_stock: true,
            ..AppConfig::default()
        };
        let shop = Shop::in_memory(config).unwrap();
        seed_items(&shop);

        shop.commit_sale(&SaleRequest {
            lines: vec![line("BOB-01", 4, 30.0)],
            ..Default::default()
        })
        .unwrap();

        assert_eq!(stock_of(&shop, "BOB-01"), -1);
    }

    #[test]
    fn test_credit_sale_requires_customer_and_valid_payment() {
        let shop = setup_shop();
        seed_items(&shop);

        let nameless = shop.commit_sale(&credit_sale("  ", vec![line("NDL-90", 1, 50.0)], 0.0));
        assert!(matches!(nameless, Err(AppError::Validation(_))));

        let overpaid = shop.commit_sale(&credit_sale("Rehman Tailors", vec![line("NDL-90", 1, 50.0)], 60.0));
        assert!(matches!(overpaid, Err(AppError::Validation(_))));

        assert_eq!(stock_of(&shop, "NDL-90"), 20);
    }

    #[test]
    fn test_last_sale_rate_per_customer() {
        let shop = setup_shop();
        seed_items(&shop);

        shop.commit_sale(&credit_sale("Rehman Tailors", vec![line("NDL-90", 1, 50.0)], 0.0))
            .unwrap();
        shop.commit_sale(&credit_sale(
            "Rehman Tailors",
            vec![line("BOB-01", 1, 30.0), line("NDL-90", 1, 55.0)],
            0.0,
        ))
        .unwrap();
        shop.commit_sale(&credit_sale("City Garments", vec![line("NDL-90", 1, 48.0)], 0.0))
            .unwrap();

        assert_eq!(shop.last_sale_rate("rehman tailors", "NDL-90").unwrap(), Some(55.0));
        assert_eq!(shop.last_sale_rate("City Garments", "NDL-90").unwrap(), Some(48.0));
        assert_eq!(shop.last_sale_rate("City Garments", "BOB-01").unwrap(), None);
    }

    // ===== LEDGER TESTS =====

    #[test]
    fn test_stale_party_copies_last_writer_wins() {
        let conn = setup_test_db();
        let store = SqliteStore::new(&conn);

        let mut party = ledger::create_party(
            &store,
            &CreateParty {
                kind: PartyKind::Customer,
                name: "Star Stitching".to_string(),
                phone: None,
                address: None,
                city: None,
                credit_limit: None,
            },
        )
        .unwrap();
        party.current_balance = 500.0;
        store.save_party(&party).unwrap();

        // Two holders read the same row before either writes
        let mut first = store.get_party(party.id).unwrap();
        let mut second = store.get_party(party.id).unwrap();

        let posting = |amount: f64| ledger::Posting {
            kind: TransactionKind::Sale,
            net_total: amount,
            paid: 0.0,
            reference: "INV-1",
            date: "2024-03-07",
            items: &[],
        };
        ledger::apply_posting(&mut first, &posting(200.0));
        store.save_party(&first).unwrap();
        ledger::apply_posting(&mut second, &posting(300.0));
        store.save_party(&second).unwrap();

        let stored = store.get_party(party.id).unwrap();
        assert!((stored.current_balance - 800.0).abs() < 0.001);
    }

    #[test]
    fn test_verify_ledger_reports_bad_snapshot() {
        let conn = setup_test_db();
        let store = SqliteStore::new(&conn);
        let config = AppConfig::default();
        let now = Local.with_ymd_and_hms(2024, 3, 7, 11, 0, 0).unwrap();

        crate::services::inventory::create_item(
            &store,
            &config,
            &item("NDL-90", "Needle 90 (box)", 40.0, 20, 5, 50),
        )
        .unwrap();
        let party_id = sales::commit_sale(
            &store,
            &config,
            &credit_sale("Rehman Tailors", vec![line("NDL-90", 2, 50.0)], 0.0),
            now,
        )
        .unwrap()
        .party
        .unwrap()
        .id;
        sales::commit_sale(
            &store,
            &config,
            &credit_sale("Rehman Tailors", vec![line("NDL-90", 1, 50.0)], 0.0),
            now,
        )
        .unwrap();

        assert!(ledger::verify_ledger(&store, party_id).unwrap().is_consistent());

        conn.execute(
            "UPDATE ledger_entries SET balance = 999 WHERE id = (SELECT MIN(id) FROM ledger_entries)",
            [],
        )
        .unwrap();

        let check = ledger::verify_ledger(&store, party_id).unwrap();
        assert!(!check.is_consistent());
        let discrepancy = check.first_discrepancy.unwrap();
        assert!((discrepancy.expected_balance - 100.0).abs() < 0.001);
        assert!((discrepancy.recorded_balance - 999.0).abs() < 0.001);
        assert!((check.recomputed_balance - 150.0).abs() < 0.001);
        assert!((check.stored_balance - 150.0).abs() < 0.001);
    }

    #[test]
    fn test_create_party_rejects_duplicate_name() {
        let shop = setup_shop();
        let party = CreateParty {
            kind: PartyKind::Customer,
            name: "City Garments".to_string(),
            phone: Some("0300-1234567".to_string()),
            address: None,
            city: None,
            credit_limit: None,
        };

        shop.create_party(&party).unwrap();
        let duplicate = shop.create_party(&CreateParty {
            name: "CITY GARMENTS".to_string(),
            ..party.clone()
        });
        assert!(matches!(duplicate, Err(AppError::Validation(_))));

        // Same name as a supplier is a different partition
        shop.create_party(&CreateParty {
            kind: PartyKind::Supplier,
            ..party
        })
        .unwrap();
        assert_eq!(shop.list_parties(None).unwrap().len(), 2);
    }

    #[test]
    fn test_party_names_match_across_unicode_case() {
        let shop = setup_shop();
        seed_items(&shop);

        shop.commit_sale(&credit_sale("Çelik Traders", vec![line("NDL-90", 2, 50.0)], 0.0))
            .unwrap();
        let party = shop
            .commit_sale(&credit_sale("çelik traders", vec![line("NDL-90", 1, 40.0)], 0.0))
            .unwrap()
            .party
            .unwrap();

        let customers = shop.list_parties(Some(PartyKind::Customer)).unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].name, "Çelik Traders");
        assert!((party.current_balance - 140.0).abs() < 0.001);

        let duplicate = shop.create_party(&CreateParty {
            kind: PartyKind::Customer,
            name: "ÇELIK TRADERS".to_string(),
            phone: None,
            address: None,
            city: None,
            credit_limit: None,
        });
        assert!(matches!(duplicate, Err(AppError::Validation(_))));

        assert_eq!(shop.last_sale_rate("ÇELIK TRADERS", "NDL-90").unwrap(), Some(40.0));
        let history = shop
            .list_transactions(&TransactionFilter {
                customer_name: Some("ÇELIK TRADERS".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_supplier_merge_across_unicode_case() {
        let shop = setup_shop();
        seed_items(&shop);

        for supplier in ["Öztürk Dikiş", "ÖZTÜRK DIKIŞ"] {
            shop.commit_purchase(&PurchaseRequest {
                supplier_name: Some(supplier.to_string()),
                lines: vec![line("NDL-90", 1, 40.0)],
                ..Default::default()
            })
            .unwrap();
        }

        assert_eq!(shop.list_parties(Some(PartyKind::Supplier)).unwrap().len(), 1);
        assert_eq!(shop.get_item("NDL-90").unwrap().supplier, "Singer, Öztürk Dikiş");
    }

    // ===== TRANSACTION LOG TESTS =====

    #[test]
    fn test_transaction_report_filters_and_totals() {
        let shop = setup_shop();
        seed_items(&shop);

        shop.commit_purchase(&PurchaseRequest {
            supplier_name: Some("Singer".to_string()),
            lines: vec![line("BOB-01", 10, 25.0)],
            paid_amount: Some(50.0),
            payment_option: PaymentOption::Credit,
            ..Default::default()
        })
        .unwrap();
        shop.commit_sale(&credit_sale("Rehman Tailors", vec![line("NDL-90", 2, 50.0)], 40.0))
            .unwrap();
        shop.commit_sale(&SaleRequest {
            lines: vec![line("BOB-01", 1, 30.0)],
            ..Default::default()
        })
        .unwrap();

        let all = shop.transaction_report(&TransactionFilter::default()).unwrap();
        assert_eq!(all.records.len(), 3);

        let sales_only = shop
            .transaction_report(&TransactionFilter {
                kind: Some(TransactionKind::Sale),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(sales_only.records.len(), 2);
        assert!((sales_only.total_amount - 130.0).abs() < 0.001);
        assert!((sales_only.total_paid - 70.0).abs() < 0.001);
        assert!((sales_only.total_remaining - 60.0).abs() < 0.001);

        let by_customer = shop
            .list_transactions(&TransactionFilter {
                customer_name: Some("REHMAN TAILORS".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_customer.len(), 1);
        assert_eq!(by_customer[0].payment_status, PaymentStatus::Partial);
    }

    // ===== QUOTATION TESTS =====

    fn sample_quotation(shop: &Shop) -> i64 {
        shop.create_quotation(&CreateQuotation {
            customer_name: "Star Stitching".to_string(),
            lines: vec![line("MTR-200", 1, 4500.0), line("NDL-90", 5, 48.0)],
            discount: 40.0,
            ..Default::default()
        })
        .unwrap()
        .id
        .unwrap()
    }

    #[test]
    fn test_quotation_status_any_to_any() {
        let shop = setup_shop();
        let id = sample_quotation(&shop);

        for status in [
            QuotationStatus::Accepted,
            QuotationStatus::Draft,
            QuotationStatus::Rejected,
            QuotationStatus::Sent,
            QuotationStatus::Accepted,
        ] {
            let updated = shop.set_quotation_status(id, status).unwrap();
            assert_eq!(updated.status, status);
        }
    }

    #[test]
    fn test_quotation_converts_to_sale() {
        let shop = setup_shop();
        seed_items(&shop);
        let id = sample_quotation(&shop);

        let quotation = shop.get_quotation(id).unwrap();
        assert!((quotation.net_total - 4700.0).abs() < 0.001);

        let lines = shop.quotation_sale_lines(id).unwrap();
        assert_eq!(lines.len(), 2);
        assert!((lines[0].rate - 4500.0).abs() < 0.001);

        // MTR-200 has no stock yet
        shop.commit_purchase(&PurchaseRequest {
            lines: vec![line("MTR-200", 2, 4000.0)],
            ..Default::default()
        })
        .unwrap();
        let receipt = shop
            .commit_sale(&SaleRequest {
                customer_name: quotation.customer_name.clone(),
                lines,
                ..Default::default()
            })
            .unwrap();
        assert!((receipt.invoice.total - 4740.0).abs() < 0.001);
    }

    #[test]
    fn test_low_stock_request_lists_reorders() {
        let shop = setup_shop();
        seed_items(&shop);

        let request = shop
            .low_stock_request(vec!["Singer".to_string(), "Juki".to_string()])
            .unwrap();
        assert!(request.request_no.starts_with("RFQ-"));
        assert_eq!(request.items.len(), 2);
        assert_eq!(request.items[0].article_code, "MTR-200");
        assert_eq!(request.items[0].description, "Servo motor");
        assert_eq!(request.items[0].quantity, 4);
    }

    // ===== NOTIFICATION TESTS =====

    fn record_events(shop: &Shop) -> Arc<Mutex<Vec<Collection>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        shop.events().subscribe(move |c| sink.lock().unwrap().push(c));
        seen
    }

    #[test]
    fn test_commit_notifies_subscribers() {
        let shop = setup_shop();
        seed_items(&shop);
        let seen = record_events(&shop);

        shop.commit_sale(&credit_sale("Rehman Tailors", vec![line("NDL-90", 1, 50.0)], 0.0))
            .unwrap();

        let seen = seen.lock().unwrap();
        assert!(seen.contains(&Collection::Parties));
        assert!(seen.contains(&Collection::Inventory));
        assert!(seen.contains(&Collection::Transactions));
        assert!(seen.contains(&Collection::Invoices));
    }

    #[test]
    fn test_failed_commit_does_not_notify() {
        let shop = setup_shop();
        seed_items(&shop);
        let seen = record_events(&shop);

        let result = shop.commit_sale(&SaleRequest {
            lines: vec![line("MTR-200", 1, 5000.0)],
            ..Default::default()
        });

        assert!(result.is_err());
        assert!(seen.lock().unwrap().is_empty());
    }

    // ===== COMPANY TESTS =====

    fn two_companies() -> AppConfig {
        let mut config = AppConfig::default();
        config.companies.push(CompanyProfile {
            key: "branch".to_string(),
            name: "Branch Store".to_string(),
            address: Some("Mall Road".to_string()),
            phone: None,
            invoice_prefix: "BR".to_string(),
        });
        config
    }

    #[test]
    fn test_switch_company_changes_invoices() {
        let shop = Shop::in_memory(two_companies()).unwrap();
        seed_items(&shop);
        let seen = record_events(&shop);

        shop.set_active_company("branch").unwrap();
        assert_eq!(seen.lock().unwrap().as_slice(), &[Collection::Company]);

        let receipt = shop
            .commit_sale(&SaleRequest {
                lines: vec![line("NDL-90", 1, 50.0)],
                ..Default::default()
            })
            .unwrap();
        assert!(receipt.invoice.invoice_no.starts_with("BR-"));
        assert_eq!(receipt.invoice.company_name, "Branch Store");

        assert!(shop.set_active_company("nowhere").is_err());
        assert_eq!(shop.active_company().unwrap().key, "branch");
    }

    #[test]
    fn test_company_switch_persists() {
        let dir = tempfile::tempdir().unwrap();

        {
            let shop = Shop::open(dir.path()).unwrap();
            shop.update_config(two_companies()).unwrap();
            shop.set_active_company("branch").unwrap();
        }

        let reopened = Shop::open(dir.path()).unwrap();
        assert_eq!(reopened.active_company().unwrap().name, "Branch Store");
        assert_eq!(reopened.companies().unwrap().len(), 2);
    }

    // ===== BACKUP TESTS =====

    #[test]
    fn test_export_import_round_trip() {
        let shop = setup_shop();
        seed_items(&shop);
        shop.commit_purchase(&PurchaseRequest {
            supplier_name: Some("Singer".to_string()),
            lines: vec![line("MTR-200", 2, 4100.0)],
            payment_option: PaymentOption::Credit,
            ..Default::default()
        })
        .unwrap();
        shop.commit_sale(&credit_sale("Rehman Tailors", vec![line("NDL-90", 2, 50.0)], 30.0))
            .unwrap();
        sample_quotation(&shop);

        let exported = shop.export_collections().unwrap();
        let json = serde_json::to_value(&exported).unwrap();
        for key in ["inventory", "parties", "transactions", "salesInvoices", "quotations"] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }

        let restored = setup_shop();
        let seen = record_events(&restored);
        let raw = serde_json::to_string(&exported).unwrap();
        restored
            .import_collections(&serde_json::from_str(&raw).unwrap())
            .unwrap();

        let again = serde_json::to_value(restored.export_collections().unwrap()).unwrap();
        assert_eq!(json, again);
        assert!(seen.lock().unwrap().contains(&Collection::Parties));

        // Restored data keeps working
        restored
            .commit_sale(&credit_sale("Rehman Tailors", vec![line("NDL-90", 1, 50.0)], 0.0))
            .unwrap();
        let customer = restored
            .list_parties(Some(PartyKind::Customer))
            .unwrap()
            .remove(0);
        assert!((customer.current_balance - 120.0).abs() < 0.001);
    }

    // ===== DOCUMENT TESTS =====

    #[test]
    fn test_pdf_exports_write_files() {
        let shop = setup_shop();
        seed_items(&shop);
        let dir = tempfile::tempdir().unwrap();

        let receipt = shop
            .commit_sale(&credit_sale("Rehman Tailors", vec![line("NDL-90", 3, 50.0)], 50.0))
            .unwrap();
        let quotation_id = sample_quotation(&shop);

        let paths = vec![
            shop.export_invoice_pdf(&receipt.invoice, dir.path()).unwrap(),
            shop.export_quotation_pdf(quotation_id, dir.path()).unwrap(),
            shop.export_transaction_report_pdf(&TransactionFilter::default(), dir.path())
                .unwrap(),
            shop.export_inventory_pdf(dir.path()).unwrap(),
            shop.export_low_stock_pdf(dir.path()).unwrap(),
        ];

        for path in &paths {
            let bytes = std::fs::read(path).unwrap();
            assert!(bytes.starts_with(b"%PDF"), "{} is not a PDF", path.display());
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            assert!(name.ends_with(".pdf"));
        }
        assert!(paths[0]
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("sale_invoice_"));
    }

    #[test]
    fn test_comparison_pdf_for_request() {
        let shop = setup_shop();
        seed_items(&shop);
        let dir = tempfile::tempdir().unwrap();

        let request = shop.low_stock_request(vec!["Singer".to_string()]).unwrap();
        let comparison = shop.compare_quotes(
            &request,
            &[crate::models::SupplierQuote {
                supplier: "Singer".to_string(),
                rates: vec![crate::models::QuotedRate {
                    article_code: "BOB-01".to_string(),
                    rate: 24.0,
                }],
            }],
        );
        assert_eq!(comparison.rows[1].best_supplier.as_deref(), Some("Singer"));

        let request_pdf = shop.export_quotation_request_pdf(&request, dir.path()).unwrap();
        let comparison_pdf = shop.export_comparison_pdf(&comparison, dir.path()).unwrap();
        assert!(request_pdf.exists());
        assert!(comparison_pdf.exists());
    }

    #[test]
    fn test_print_matches_committed_numbers() {
        let shop = setup_shop();
        seed_items(&shop);

        let receipt = shop
            .commit_sale(&credit_sale("Rehman Tailors", vec![line("NDL-90", 3, 50.0)], 50.0))
            .unwrap();
        let doc = shop.print_invoice(&receipt.invoice);

        assert_eq!(doc.page_size, crate::render::print::PageSize::A5);
        assert!(doc.html.contains("150.00"));
        assert!(doc.html.contains("100.00"));
        assert!(doc.html.contains(&receipt.invoice.invoice_no));
    }
}
