// src/state.rs
use crate::catalog::BuyScreen;
use crate::context::AppContext;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Everything a request handler may touch. Handlers take the lock for their
/// whole run, so requests never interleave.
pub struct AppState<S> {
    pub context: AppContext<S>,
    pub buy_screen: BuyScreen,
}

pub type SharedState<S> = Arc<Mutex<AppState<S>>>;

impl<S> AppState<S> {
    pub fn new(context: AppContext<S>) -> Self {
        Self {
            context,
            buy_screen: BuyScreen::default(),
        }
    }

    pub fn shared(self) -> SharedState<S> {
        Arc::new(Mutex::new(self))
    }

    /// Fresh catalog, as on every new login.
    pub fn reset_buy_screen(&mut self) {
        self.buy_screen = BuyScreen::default();
    }
}
