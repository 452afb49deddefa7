// src/dashboard.rs
use crate::context::AppContext;
use crate::error::AppError;
use crate::models::PortfolioSummary;
use crate::store::KeyValueStore;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardCard {
    pub title: &'static str,
    pub description: &'static str,
    /// Route the card leads to, if it leads anywhere yet.
    pub action: Option<&'static str>,
}

const CARDS: [DashboardCard; 3] = [
    DashboardCard {
        title: "Buy Stocks",
        description: "Invest in new assets",
        action: Some("/stocks"),
    },
    DashboardCard {
        title: "View Portfolio",
        description: "Check owned stocks, bonds, and insurance",
        action: Some("/portfolio"),
    },
    DashboardCard {
        title: "Sell Investments",
        description: "Liquidate existing ones",
        action: None,
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub greeting: String,
    pub credits: Decimal,
    pub portfolio: PortfolioSummary,
    pub cards: Vec<DashboardCard>,
}

impl DashboardView {
    pub fn build<S: KeyValueStore>(ctx: &AppContext<S>) -> Result<Self, AppError> {
        let user = ctx.session().user().ok_or(AppError::NotAuthenticated)?;
        Ok(Self {
            greeting: format!("Hello, {}", user.display_name()),
            credits: user.credits,
            portfolio: ctx.portfolio_summary(),
            cards: CARDS.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{mock_instruments, LoginRequest};
    use crate::store::MemoryStore;
    use serde_json::Map;

    #[test]
    fn dashboard_needs_a_user() {
        let ctx = AppContext::open(MemoryStore::new()).unwrap();
        assert!(matches!(
            DashboardView::build(&ctx),
            Err(AppError::NotAuthenticated)
        ));
    }

    #[test]
    fn dashboard_reads_credits_and_summary() {
        let mut ctx = AppContext::open(MemoryStore::new()).unwrap();
        ctx.login(LoginRequest {
            email: "ada@example.com".into(),
            name: Some("Ada".into()),
            credits: None,
            extra: Map::new(),
        })
        .unwrap();
        let tsla = mock_instruments().remove(5);
        ctx.add_purchase(&tsla, 4, tsla.price).unwrap();

        let view = DashboardView::build(&ctx).unwrap();
        assert_eq!(view.greeting, "Hello, Ada");
        assert_eq!(view.credits, Decimal::new(10_000, 0));
        assert_eq!(view.portfolio.total_stocks, 4);
        assert_eq!(view.portfolio.stocks_by_symbol["TSLA"].quantity, 4);
        assert_eq!(view.cards.len(), 3);

        // Building twice reads the same state.
        let again = DashboardView::build(&ctx).unwrap();
        assert_eq!(again.portfolio, view.portfolio);
    }
}
