pub mod auth;
pub mod badges;
pub mod clock;
pub mod commands;
pub mod config;
pub mod db;
pub mod dialog;
pub mod error;
pub mod models;
pub mod recycle;
pub mod sync;
pub mod tables;


use clock::SystemClock;
use commands::menu::MenuController;
use config::Config;
use db::SqliteStorage;
use error::Result;
use std::sync::Arc;
use std::time::Instant;
use sync::{LocalBus, Reconcile};
use tables::SharedStore;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,cafe_desk_lib=debug"));

    // A second call (tests, embedders) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

/// Runs a menu board against the configured database.
///
/// The board is one more tab: it picks up products, orders and offers written
/// by any other process sharing the file, on the poll interval.
pub fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::load()?;
    info!("Starting cafe-desk v{}", env!("CARGO_PKG_VERSION"));

    let storage = Arc::new(SqliteStorage::open(&config.db_path)?);
    let shared = SharedStore::with_bus(storage, Arc::new(LocalBus::new()), &config.key_prefix);
    let mut board = MenuController::new(shared.open_tab(), Arc::new(SystemClock), config.poll_interval);
    log_board(&board);

    loop {
        std::thread::sleep(config.poll_interval / 4);
        if !board.tick(Instant::now()).is_empty() {
            log_board(&board);
        }
    }
}

fn log_board(board: &MenuController) {
    for (category, items) in board.menu() {
        for item in items {
            let badges: Vec<&str> = item.badges.iter().map(|b| b.label()).collect();
            info!(
                category = category.display_name(),
                name = %item.product.name,
                price = item.product.price,
                orders = item.product.order_count,
                badges = ?badges,
                "menu item"
            );
        }
    }
    for offer in board.live_offers() {
        info!(title = %offer.title, discount = offer.discount, until = %offer.valid_until, "offer");
    }
}
