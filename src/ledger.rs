// src/ledger.rs
use crate::db;
use crate::error::AppError;
use crate::models::{
    Instrument, PortfolioSummary, PurchaseKind, PurchaseRecord, SymbolHolding,
};
use crate::store::KeyValueStore;
use chrono::Utc;
use log::info;
use rust_decimal::Decimal;

/// Append-only purchase history.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<PurchaseRecord>,
}

impl Ledger {
    pub fn restore<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self, AppError> {
        let records = db::load_portfolio(store)?;
        info!("Loaded {} portfolio records", records.len());
        Ok(Self { records })
    }

    pub fn records(&self) -> &[PurchaseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a buy and persists the whole ledger. Returns the new record's id.
    /// When the write fails the record is dropped again.
    pub fn add_purchase<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        instrument: &Instrument,
        quantity: u32,
        price: Decimal,
    ) -> Result<String, AppError> {
        let purchase_date = Utc::now();
        let id = purchase_date.timestamp_millis().to_string();

        self.records.push(PurchaseRecord {
            id: id.clone(),
            stock_id: instrument.id,
            symbol: instrument.symbol.clone(),
            name: instrument.name.clone(),
            quantity,
            purchase_price: price,
            current_price: instrument.price,
            purchase_date,
            kind: PurchaseKind::Buy,
        });
        if let Err(e) = db::save_portfolio(store, &self.records) {
            self.records.pop();
            return Err(e);
        }

        info!(
            "Recorded purchase {}: {} x {} @ {}",
            id, quantity, instrument.symbol, price
        );
        Ok(id)
    }

    /// Values holdings at each record's `current_price`, not what was paid.
    pub fn summarize(&self) -> PortfolioSummary {
        let mut summary = PortfolioSummary::default();

        for record in self.records.iter().filter(|r| r.kind.is_buy()) {
            let value = record.current_price * Decimal::from(record.quantity);
            summary.total_stocks += u64::from(record.quantity);
            summary.total_value += value;

            let holding = summary
                .stocks_by_symbol
                .entry(record.symbol.clone())
                .or_insert_with(|| SymbolHolding {
                    name: record.name.clone(),
                    ..SymbolHolding::default()
                });
            holding.quantity += u64::from(record.quantity);
            holding.value += value;
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mock_instruments;
    use crate::db::PORTFOLIO_KEY;
    use crate::store::{MemoryStore, ReadOnlyStore};
    use serde_json::{json, Value};

    fn instrument(symbol: &str) -> Instrument {
        mock_instruments()
            .into_iter()
            .find(|i| i.symbol == symbol)
            .unwrap()
    }

    #[test]
    fn add_purchase_appends_and_persists() {
        let mut store = MemoryStore::new();
        let mut ledger = Ledger::default();
        let aapl = instrument("AAPL");

        let id = ledger
            .add_purchase(&mut store, &aapl, 10, aapl.price)
            .unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.records()[0].id, id);
        assert_eq!(ledger.records()[0].symbol, "AAPL");
        assert_eq!(ledger.records()[0].quantity, 10);

        let reloaded = Ledger::restore(&store).unwrap();
        assert_eq!(reloaded.records(), ledger.records());
    }

    #[test]
    fn failed_write_leaves_the_ledger_unchanged() {
        let mut store = ReadOnlyStore::default();
        let mut ledger = Ledger::default();
        let aapl = instrument("AAPL");

        assert!(matches!(
            ledger.add_purchase(&mut store, &aapl, 1, aapl.price),
            Err(AppError::Storage(_))
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn foreign_records_keep_their_tag_across_appends() {
        let mut store = MemoryStore::new();
        store
            .set_item(
                PORTFOLIO_KEY,
                &json!([{
                    "id": "1700000000000",
                    "stockId": 2,
                    "symbol": "MSFT",
                    "name": "Microsoft Corporation",
                    "quantity": 3,
                    "purchasePrice": 325.67,
                    "currentPrice": 325.67,
                    "purchaseDate": "2024-01-01T00:00:00Z",
                    "type": "sell"
                }])
                .to_string(),
            )
            .unwrap();

        let mut ledger = Ledger::restore(&store).unwrap();
        let aapl = instrument("AAPL");
        ledger.add_purchase(&mut store, &aapl, 1, aapl.price).unwrap();

        let raw: Value =
            serde_json::from_str(&store.get_item(PORTFOLIO_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw[0]["type"], "sell");
        assert_eq!(raw[1]["type"], "buy");

        let reloaded = Ledger::restore(&store).unwrap();
        assert_eq!(reloaded.records()[0].kind, PurchaseKind::Other("sell".into()));
        assert_eq!(reloaded.summarize().total_stocks, 1);
    }

    #[test]
    fn summary_groups_by_symbol_at_current_price() {
        let mut store = MemoryStore::new();
        let mut ledger = Ledger::default();
        let aapl = instrument("AAPL");
        let msft = instrument("MSFT");

        ledger.add_purchase(&mut store, &aapl, 2, aapl.price).unwrap();
        ledger.add_purchase(&mut store, &msft, 1, msft.price).unwrap();
        // Paid less than the listed price; value still uses the listed one.
        ledger
            .add_purchase(&mut store, &aapl, 3, Decimal::new(100, 0))
            .unwrap();

        let summary = ledger.summarize();
        assert_eq!(summary.total_stocks, 6);
        assert_eq!(
            summary.total_value,
            Decimal::new(17534, 2) * Decimal::from(5) + Decimal::new(32567, 2)
        );
        let apple = &summary.stocks_by_symbol["AAPL"];
        assert_eq!(apple.quantity, 5);
        assert_eq!(apple.name, "Apple Inc.");
        assert_eq!(summary.stocks_by_symbol["MSFT"].quantity, 1);
    }

    #[test]
    fn summary_matches_buy_quantities_and_is_idempotent() {
        let mut store = MemoryStore::new();
        let mut ledger = Ledger::default();
        for (i, inst) in mock_instruments().iter().enumerate() {
            ledger
                .add_purchase(&mut store, inst, i as u32 + 1, inst.price)
                .unwrap();
        }
        let mut foreign = ledger.records()[0].clone();
        foreign.kind = PurchaseKind::Other("sell".into());
        foreign.quantity = 1000;
        ledger.records.push(foreign);

        let expected: u64 = ledger
            .records()
            .iter()
            .filter(|r| r.kind.is_buy())
            .map(|r| u64::from(r.quantity))
            .sum();

        let first = ledger.summarize();
        let second = ledger.summarize();
        assert_eq!(first.total_stocks, expected);
        assert_eq!(
            first
                .stocks_by_symbol
                .values()
                .map(|h| h.quantity)
                .sum::<u64>(),
            expected
        );
        assert_eq!(first, second);
    }

    #[test]
    fn empty_ledger_summarizes_to_zero() {
        let summary = Ledger::default().summarize();
        assert_eq!(summary.total_stocks, 0);
        assert!(summary.total_value.is_zero());
        assert!(summary.stocks_by_symbol.is_empty());
    }
}
