// src/lib.rs
pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod ledger;
pub mod models;
pub mod session;
pub mod state;
pub mod store;

pub use context::AppContext;
pub use error::AppError;
