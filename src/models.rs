// src/models.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Balance handed to a user who logs in without one.
pub fn default_credits() -> Decimal {
    Decimal::new(10_000, 0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub credits: Decimal,
    /// Fields supplied at login that the desk does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ if !self.email.is_empty() => &self.email,
            _ => "User",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub credits: Option<Decimal>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PurchaseKind {
    Buy,
    /// A tag this version does not write. Kept verbatim, skipped by summaries.
    Other(String),
}

impl PurchaseKind {
    pub fn is_buy(&self) -> bool {
        matches!(self, PurchaseKind::Buy)
    }
}

impl From<String> for PurchaseKind {
    fn from(tag: String) -> Self {
        if tag == "buy" {
            PurchaseKind::Buy
        } else {
            PurchaseKind::Other(tag)
        }
    }
}

impl From<PurchaseKind> for String {
    fn from(kind: PurchaseKind) -> Self {
        match kind {
            PurchaseKind::Buy => "buy".to_string(),
            PurchaseKind::Other(tag) => tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub id: String,
    pub stock_id: u32,
    pub symbol: String,
    pub name: String,
    pub quantity: u32,
    pub purchase_price: Decimal,
    pub current_price: Decimal,
    pub purchase_date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: PurchaseKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SymbolHolding {
    pub quantity: u64,
    pub value: Decimal,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_stocks: u64,
    pub total_value: Decimal,
    pub stocks_by_symbol: BTreeMap<String, SymbolHolding>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instrument {
    pub id: u32,
    pub symbol: String,
    pub name: String,
    pub price: Decimal,
    pub change: String,
    pub available: u32,
}

impl Instrument {
    fn new(id: u32, symbol: &str, name: &str, cents: i64, change: &str, available: u32) -> Self {
        Self {
            id,
            symbol: symbol.to_string(),
            name: name.to_string(),
            price: Decimal::new(cents, 2),
            change: change.to_string(),
            available,
        }
    }

    pub fn is_rising(&self) -> bool {
        self.change.starts_with('+')
    }
}

/// The fixed catalog offered on every fresh buy screen.
pub fn mock_instruments() -> Vec<Instrument> {
    vec![
        Instrument::new(1, "AAPL", "Apple Inc.", 17534, "+1.25%", 100),
        Instrument::new(2, "MSFT", "Microsoft Corporation", 32567, "+0.75%", 150),
        Instrument::new(3, "GOOGL", "Alphabet Inc.", 13589, "-0.50%", 80),
        Instrument::new(4, "AMZN", "Amazon.com Inc.", 14523, "+2.10%", 120),
        Instrument::new(5, "META", "Meta Platforms Inc.", 29845, "-1.20%", 90),
        Instrument::new(6, "TSLA", "Tesla Inc.", 24578, "+3.45%", 110),
        Instrument::new(7, "NFLX", "Netflix Inc.", 42512, "+0.95%", 70),
        Instrument::new(8, "NVDA", "NVIDIA Corporation", 43567, "+2.75%", 60),
    ]
}
