// src/db.rs
use crate::config::Config;
use crate::error::AppError;
use crate::models::{PurchaseRecord, User};
use crate::store::{FileStore, KeyValueStore};
use log::info;

pub const USER_KEY: &str = "user";
pub const PORTFOLIO_KEY: &str = "portfolio";

pub fn init(config: &Config) -> Result<FileStore, AppError> {
    let store = FileStore::open(&config.data_dir)?;
    info!("Opened record store at {:?}", store.dir());
    Ok(store)
}

pub fn load_user<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<User>, AppError> {
    match store.get_item(USER_KEY)? {
        Some(user_json) => Ok(Some(serde_json::from_str(&user_json)?)),
        None => Ok(None),
    }
}

pub fn save_user<S: KeyValueStore + ?Sized>(store: &mut S, user: &User) -> Result<(), AppError> {
    let user_json = serde_json::to_string(user)?;
    store.set_item(USER_KEY, &user_json)
}

pub fn remove_user<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<(), AppError> {
    store.remove_item(USER_KEY)
}

pub fn load_portfolio<S: KeyValueStore + ?Sized>(
    store: &S,
) -> Result<Vec<PurchaseRecord>, AppError> {
    match store.get_item(PORTFOLIO_KEY)? {
        Some(records_json) => Ok(serde_json::from_str(&records_json)?),
        None => Ok(Vec::new()),
    }
}

pub fn save_portfolio<S: KeyValueStore + ?Sized>(
    store: &mut S,
    records: &[PurchaseRecord],
) -> Result<(), AppError> {
    let records_json = serde_json::to_string(records)?;
    store.set_item(PORTFOLIO_KEY, &records_json)
}
