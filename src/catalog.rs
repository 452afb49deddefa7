// src/catalog.rs
use crate::context::AppContext;
use crate::error::AppError;
use crate::models::{mock_instruments, Instrument};
use crate::store::KeyValueStore;
use log::{info, warn};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuyMessage {
    pub text: String,
    pub kind: MessageKind,
}

impl BuyMessage {
    fn success(text: String) -> Self {
        Self {
            text,
            kind: MessageKind::Success,
        }
    }

    fn danger(text: String) -> Self {
        Self {
            text,
            kind: MessageKind::Danger,
        }
    }
}

#[derive(Debug, Clone)]
struct CatalogRow {
    instrument: Instrument,
    quantity: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRowView {
    #[serde(flatten)]
    pub instrument: Instrument,
    pub quantity: u32,
    pub total_price: Decimal,
    pub rising: bool,
    pub can_buy: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub credits: Decimal,
    pub message: Option<BuyMessage>,
    pub stocks: Vec<CatalogRowView>,
}

/// One session's buy screen: the mock catalog with a chosen quantity per row.
#[derive(Debug, Clone)]
pub struct BuyScreen {
    rows: Vec<CatalogRow>,
    message: Option<BuyMessage>,
}

impl Default for BuyScreen {
    fn default() -> Self {
        Self::new(mock_instruments())
    }
}

impl BuyScreen {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self {
            rows: instruments
                .into_iter()
                .map(|instrument| CatalogRow {
                    instrument,
                    quantity: 1,
                })
                .collect(),
            message: None,
        }
    }

    pub fn message(&self) -> Option<&BuyMessage> {
        self.message.as_ref()
    }

    pub fn instrument(&self, id: u32) -> Option<&Instrument> {
        self.rows
            .iter()
            .find(|r| r.instrument.id == id)
            .map(|r| &r.instrument)
    }

    pub fn quantity(&self, id: u32) -> Option<u32> {
        self.rows.iter().find(|r| r.instrument.id == id).map(|r| r.quantity)
    }

    fn row_mut(&mut self, id: u32) -> Result<&mut CatalogRow, AppError> {
        self.rows
            .iter_mut()
            .find(|r| r.instrument.id == id)
            .ok_or(AppError::UnknownInstrument(id))
    }

    /// Moves a row's quantity by `delta`, never below 1. A step past what is
    /// available is ignored. Returns the row's quantity afterwards.
    pub fn adjust_quantity(&mut self, id: u32, delta: i64) -> Result<u32, AppError> {
        let row = self.row_mut(id)?;
        let wanted = i64::from(row.quantity).saturating_add(delta).max(1);
        if wanted <= i64::from(row.instrument.available) {
            row.quantity = wanted as u32;
        }
        Ok(row.quantity)
    }

    /// Buys the row's chosen quantity with the session's credits.
    ///
    /// A shortfall is reported as a danger message with nothing changed. On
    /// success the credits are debited and then the ledger is appended; the
    /// two writes are independent and a failure in between is not rolled back.
    pub fn buy<S: KeyValueStore>(
        &mut self,
        id: u32,
        ctx: &mut AppContext<S>,
    ) -> Result<BuyMessage, AppError> {
        let credits = ctx.session().credits().ok_or(AppError::NotAuthenticated)?;
        let row = self.row_mut(id)?;
        let instrument = row.instrument.clone();
        let quantity = row.quantity;
        let total_price = instrument.price * Decimal::from(quantity);

        let message = if instrument.available == 0 || quantity > instrument.available {
            warn!("Rejected buy of {}: nothing available", instrument.symbol);
            BuyMessage::danger(format!("No shares of {} are available.", instrument.symbol))
        } else if credits < total_price {
            warn!(
                "Rejected buy of {} x {}: {} needed, {} held",
                quantity, instrument.symbol, total_price, credits
            );
            BuyMessage::danger("Insufficient credits to purchase this stock.".to_string())
        } else {
            ctx.update_credits(credits - total_price)?;
            ctx.add_purchase(&instrument, quantity, instrument.price)?;

            let row = self.row_mut(id)?;
            row.instrument.available -= quantity;
            row.quantity = 1;

            info!(
                "Bought {} x {} for {:.2}",
                quantity, instrument.symbol, total_price
            );
            BuyMessage::success(format!(
                "Successfully purchased {} share{} of {} for ${:.2}",
                quantity,
                if quantity > 1 { "s" } else { "" },
                instrument.symbol,
                total_price
            ))
        };

        self.message = Some(message.clone());
        Ok(message)
    }

    pub fn view(&self, credits: Decimal) -> CatalogView {
        CatalogView {
            credits,
            message: self.message.clone(),
            stocks: self
                .rows
                .iter()
                .map(|row| {
                    let total_price = row.instrument.price * Decimal::from(row.quantity);
                    CatalogRowView {
                        rising: row.instrument.is_rising(),
                        can_buy: row.instrument.available > 0 && credits >= total_price,
                        instrument: row.instrument.clone(),
                        quantity: row.quantity,
                        total_price,
                    }
                })
                .collect(),
        }
    }
}
