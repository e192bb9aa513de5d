pub mod billing;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod models;
pub mod render;
pub mod services;
pub mod shop;
pub mod store;
pub mod words;

#[cfg(feature = "desktop")]
mod commands;

#[cfg(test)]
mod tests;

pub use error::{AppError, AppResult};
pub use shop::Shop;

/// `RUST_LOG` filter (default `info`) plus the fmt layer. Safe to call twice.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use commands::{company, inventory, parties, purchases, quotations, reports, sales};
    use tauri::{
        menu::{Menu, MenuItem},
        tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
        Emitter, Manager,
    };

    dotenvy::dotenv().ok();
    init_tracing();
    tracing::info!("Starting partsdesk...");

    let result = tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_fs::init())
        .setup(|app| {
            let data_dir = match config::data_dir_override() {
                Some(dir) => dir,
                None => app.path().app_data_dir()?,
            };
            let shop = Shop::open(&data_dir)?;

            // Every committed change becomes a payload-free webview event
            let handle = app.handle().clone();
            shop.events().subscribe(move |collection| {
                if let Err(e) = handle.emit(collection.event_name(), ()) {
                    tracing::error!("Failed to emit {}: {}", collection.event_name(), e);
                }
            });
            app.manage(shop);

            let show = MenuItem::with_id(app, "show", "Show", true, None::<&str>)?;
            let quit = MenuItem::with_id(app, "quit", "Quit", true, None::<&str>)?;
            let menu = Menu::with_items(app, &[&show, &quit])?;

            let mut tray = TrayIconBuilder::new()
                .menu(&menu)
                .show_menu_on_left_click(false)
                .on_tray_icon_event(|tray, event| {
                    if let TrayIconEvent::Click {
                        button: MouseButton::Left,
                        button_state: MouseButtonState::Up,
                        ..
                    } = event
                    {
                        let app = tray.app_handle();
                        if let Some(window) = app.get_webview_window("main") {
                            if window.is_visible().unwrap_or(false) {
                                let _ = window.hide();
                            } else {
                                let _ = window.show();
                                let _ = window.set_focus();
                            }
                        }
                    }
                })
                .on_menu_event(|app, event| {
                    if event.id == "show" {
                        if let Some(window) = app.get_webview_window("main") {
                            let _ = window.show();
                            let _ = window.set_focus();
                        }
                    } else if event.id == "quit" {
                        app.exit(0);
                    }
                });
            if let Some(icon) = app.default_window_icon() {
                tray = tray.icon(icon.clone());
            }
            tray.build(app)?;

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Inventory
            inventory::get_inventory_items,
            inventory::search_inventory,
            inventory::get_inventory_item,
            inventory::create_inventory_item,
            inventory::update_inventory_item,
            inventory::check_sale_line,
            inventory::check_purchase_line,
            inventory::get_low_stock,
            inventory::get_reorder_suggestions,
            inventory::export_inventory_pdf,
            inventory::export_low_stock_pdf,
            // Parties
            parties::get_parties,
            parties::get_party,
            parties::create_party,
            parties::get_party_ledger,
            parties::verify_party_ledger,
            // Sales
            sales::preview_sale,
            sales::complete_sale,
            sales::get_sale_invoices,
            sales::get_sale_invoice,
            sales::get_last_sale_rate,
            sales::print_invoice,
            sales::export_invoice_pdf,
            sales::create_challan,
            sales::print_challan,
            // Purchases
            purchases::preview_purchase,
            purchases::complete_purchase,
            // Quotations
            quotations::create_quotation,
            quotations::get_quotations,
            quotations::get_quotation,
            quotations::set_quotation_status,
            quotations::quotation_to_sale,
            quotations::print_quotation,
            quotations::export_quotation_pdf,
            quotations::create_quotation_request,
            quotations::create_low_stock_request,
            quotations::export_quotation_request_pdf,
            quotations::compare_quotations,
            quotations::export_comparison_pdf,
            // Reports
            reports::get_transactions,
            reports::get_transaction_report,
            reports::export_transaction_report_pdf,
            // Company & backup
            company::get_companies,
            company::get_active_company,
            company::set_active_company,
            company::get_config,
            company::update_config,
            company::export_backup,
            company::import_backup,
        ])
        .run(tauri::generate_context!());

    if let Err(e) = result {
        tracing::error!("Error while running tauri application: {}", e);
        std::process::exit(1);
    }
}
