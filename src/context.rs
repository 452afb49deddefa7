// src/context.rs
use crate::error::AppError;
use crate::ledger::Ledger;
use crate::models::{Instrument, LoginRequest, PortfolioSummary, User};
use crate::session::Session;
use crate::store::KeyValueStore;
use log::info;
use rust_decimal::Decimal;

/// Session and ledger over the store they persist to.
pub struct AppContext<S> {
    store: S,
    session: Session,
    ledger: Ledger,
}

impl<S: KeyValueStore> AppContext<S> {
    /// Loads whatever the store holds. Malformed records fail here.
    pub fn open(store: S) -> Result<Self, AppError> {
        let session = Session::restore(&store)?;
        let ledger = Ledger::restore(&store)?;
        info!(
            "Restored context: authenticated={}, {} purchases",
            session.is_authenticated(),
            ledger.len()
        );
        Ok(Self {
            store,
            session,
            ledger,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn login(&mut self, request: LoginRequest) -> Result<&User, AppError> {
        self.session.login(&mut self.store, request)
    }

    pub fn logout(&mut self) -> Result<(), AppError> {
        self.session.logout(&mut self.store)
    }

    pub fn update_credits(&mut self, new_balance: Decimal) -> Result<(), AppError> {
        self.session.update_credits(&mut self.store, new_balance)
    }

    pub fn add_purchase(
        &mut self,
        instrument: &Instrument,
        quantity: u32,
        price: Decimal,
    ) -> Result<String, AppError> {
        self.ledger
            .add_purchase(&mut self.store, instrument, quantity, price)
    }

    pub fn portfolio_summary(&self) -> PortfolioSummary {
        self.ledger.summarize()
    }
}
