// src/main.rs
use env_logger::Builder;
use log::{error, info, LevelFilter};
use stock_desk::api;
use stock_desk::config::Config;
use stock_desk::context::AppContext;
use stock_desk::db;
use stock_desk::state::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return;
        }
    };

    let store = match db::init(&config) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open record store: {}", e);
            return;
        }
    };

    let context = match AppContext::open(store) {
        Ok(context) => context,
        Err(e) => {
            error!("Stored session or portfolio is unreadable: {}", e);
            return;
        }
    };

    info!("Starting the stock desk...");
    let bind_addr = config.bind_addr;
    let state = AppState::new(context).shared();
    let app = api::app(state, Arc::new(config));

    info!("Server running on http://{}", bind_addr);
    warp::serve(app).run(bind_addr).await;
}
