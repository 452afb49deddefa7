// src/session.rs
use crate::db;
use crate::error::AppError;
use crate::models::{default_credits, LoginRequest, User};
use crate::store::KeyValueStore;
use log::{debug, info};
use rust_decimal::Decimal;

/// The logged-in user and the authentication flag.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<User>,
    authenticated: bool,
}

impl Session {
    /// A stored user record means the last session never logged out.
    pub fn restore<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self, AppError> {
        let user = db::load_user(store)?;
        let authenticated = user.is_some();
        Ok(Self {
            user,
            authenticated,
        })
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn credits(&self) -> Option<Decimal> {
        self.user.as_ref().map(|u| u.credits)
    }

    pub fn login<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        request: LoginRequest,
    ) -> Result<&User, AppError> {
        // Zero counts as absent.
        let credits = match request.credits {
            Some(credits) if !credits.is_zero() => credits,
            _ => default_credits(),
        };
        let user = User {
            email: request.email,
            name: request.name,
            credits,
            extra: request.extra,
        };

        db::save_user(store, &user)?;
        info!("{} logged in with {} credits", user.email, user.credits);
        self.authenticated = true;
        Ok(&*self.user.insert(user))
    }

    pub fn logout<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) -> Result<(), AppError> {
        if let Some(user) = self.user.take() {
            info!("{} logged out", user.email);
        }
        self.authenticated = false;
        db::remove_user(store)
    }

    /// Overwrites the balance without validation. Does nothing when nobody is logged in.
    pub fn update_credits<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        new_balance: Decimal,
    ) -> Result<(), AppError> {
        let Some(current) = self.user.as_ref() else {
            debug!("Credit update ignored, no user loaded");
            return Ok(());
        };
        let updated = User {
            credits: new_balance,
            ..current.clone()
        };
        db::save_user(store, &updated)?;
        self.user = Some(updated);
        Ok(())
    }
}
