//! Core data types for GrowthCast.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{GrowthError, Result};

/// Type alias for price values.
pub type Price = f64;

/// A single holding in the portfolio.
///
/// Share count is never stored; it is always derived from `value` and
/// `current_price`, so editing either one implicitly changes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Ticker symbol.
    pub ticker: String,
    /// Current market value of the position.
    pub value: f64,
    /// Historical return percentage (e.g. year-to-date).
    pub return_pct: f64,
    /// Current share price.
    pub current_price: Price,
}

impl Position {
    /// Create a new position.
    pub fn new(ticker: impl Into<String>, value: f64, return_pct: f64, current_price: Price) -> Self {
        Self {
            ticker: ticker.into(),
            value,
            return_pct,
            current_price,
        }
    }

    /// Number of shares held, or 0 when the price is not positive.
    #[inline]
    pub fn shares(&self) -> f64 {
        if self.current_price > 0.0 {
            self.value / self.current_price
        } else {
            0.0
        }
    }

    /// Annualized drift implied by the historical return.
    #[inline]
    pub fn mu(&self) -> f64 {
        self.return_pct / 100.0
    }
}

/// A candidate asset on the watchlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchItem {
    /// Ticker symbol.
    pub ticker: String,
    /// Display name.
    pub name: String,
    /// Current share price.
    pub current_price: Price,
    /// Today's return percentage.
    pub today_return_pct: f64,
    /// Optional longer-horizon return percentage.
    #[serde(default)]
    pub total_return_pct: Option<f64>,
}

impl WatchItem {
    /// Create a new watchlist item.
    pub fn new(
        ticker: impl Into<String>,
        name: impl Into<String>,
        current_price: Price,
        today_return_pct: f64,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            name: name.into(),
            current_price,
            today_return_pct,
            total_return_pct: None,
        }
    }

    /// Set the longer-horizon return.
    pub fn with_total_return(mut self, total_return_pct: f64) -> Self {
        self.total_return_pct = Some(total_return_pct);
        self
    }

    /// Convert into a position worth `allocation_value` at the current price.
    ///
    /// The historical return is unknown for a fresh purchase, so it is left at 0.
    pub fn to_position(&self, allocation_value: f64) -> Position {
        Position::new(self.ticker.clone(), allocation_value, 0.0, self.current_price)
    }
}

/// A recurring contribution for one ticker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcaEntry {
    /// Cash converted into shares on each contribution day.
    pub amount: f64,
    /// Contribution happens on every day divisible by this.
    pub frequency_days: usize,
}

impl DcaEntry {
    /// Create a new DCA entry.
    pub fn new(amount: f64, frequency_days: usize) -> Self {
        Self {
            amount,
            frequency_days,
        }
    }

    /// Check whether a contribution falls on `day`.
    ///
    /// # Panics
    ///
    /// Panics if `frequency_days` is 0; call [`Self::validate`] first.
    #[inline]
    pub fn is_due(&self, day: usize) -> bool {
        day % self.frequency_days == 0
    }

    /// Validate the entry.
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(GrowthError::invalid_parameter(format!(
                "DCA amount must be a non-negative number, got {}",
                self.amount
            )));
        }
        if self.frequency_days == 0 {
            return Err(GrowthError::invalid_parameter(
                "DCA frequency_days must be positive",
            ));
        }
        Ok(())
    }
}

/// Recurring contributions keyed by ticker.
///
/// Backed by an ordered map so iteration order (and the cache key built from
/// it) is always sorted by ticker. Entries for tickers not held are inert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DcaSchedule {
    entries: BTreeMap<String, DcaEntry>,
}

impl DcaSchedule {
    /// Create an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the entry for a ticker.
    pub fn insert(&mut self, ticker: impl Into<String>, entry: DcaEntry) -> Option<DcaEntry> {
        self.entries.insert(ticker.into(), entry)
    }

    /// Builder-style insert.
    pub fn with_entry(mut self, ticker: impl Into<String>, amount: f64, frequency_days: usize) -> Self {
        self.insert(ticker, DcaEntry::new(amount, frequency_days));
        self
    }

    /// Remove the entry for a ticker.
    pub fn remove(&mut self, ticker: &str) -> Option<DcaEntry> {
        self.entries.remove(ticker)
    }

    /// Look up the entry for a ticker.
    pub fn get(&self, ticker: &str) -> Option<&DcaEntry> {
        self.entries.get(ticker)
    }

    /// Iterate entries in ticker order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DcaEntry)> {
        self.entries.iter().map(|(t, e)| (t.as_str(), e))
    }

    /// Number of scheduled tickers.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether no contributions are scheduled.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate every entry.
    pub fn validate(&self) -> Result<()> {
        for (ticker, entry) in &self.entries {
            entry.validate().map_err(|e| match e {
                GrowthError::InvalidParameter { message } => {
                    GrowthError::invalid_parameter(format!("{} ({})", message, ticker))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

impl FromIterator<(String, DcaEntry)> for DcaSchedule {
    fn from_iter<I: IntoIterator<Item = (String, DcaEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Historical portfolio snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Sum of position values.
    pub total_value: f64,
    /// Value-weighted historical return percentage.
    pub weighted_return_pct: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shares_derived_from_value_and_price() {
        let mut pos = Position::new("AAPL", 1000.0, 10.0, 100.0);
        assert!((pos.shares() - 10.0).abs() < 1e-12);

        pos.value = 1500.0;
        assert!((pos.shares() - 15.0).abs() < 1e-12);

        pos.current_price = 0.0;
        assert_eq!(pos.shares(), 0.0);

        pos.current_price = -5.0;
        assert_eq!(pos.shares(), 0.0);
    }

    #[test]
    fn test_watch_item_to_position() {
        let item = WatchItem::new("MRK", "Merck & Co", 94.18, 1.79).with_total_return(12.0);
        let pos = item.to_position(10.0);
        assert_eq!(pos.ticker, "MRK");
        assert_eq!(pos.value, 10.0);
        assert_eq!(pos.return_pct, 0.0);
        assert_eq!(pos.current_price, 94.18);
    }

    #[test]
    fn test_dca_entry_validation() {
        assert!(DcaEntry::new(100.0, 30).validate().is_ok());
        assert!(DcaEntry::new(0.0, 1).validate().is_ok());
        assert!(DcaEntry::new(100.0, 0).validate().is_err());
        assert!(DcaEntry::new(-1.0, 30).validate().is_err());
        assert!(DcaEntry::new(f64::NAN, 30).validate().is_err());
    }

    #[test]
    fn test_dca_entry_due_days() {
        let entry = DcaEntry::new(100.0, 30);
        assert!(!entry.is_due(29));
        assert!(entry.is_due(30));
        assert!(entry.is_due(60));
    }

    #[test]
    #[should_panic]
    fn test_dca_entry_zero_frequency_panics() {
        DcaEntry::new(100.0, 0).is_due(1);
    }

    #[test]
    fn test_dca_schedule_sorted_iteration() {
        let schedule = DcaSchedule::new()
            .with_entry("MSFT", 50.0, 7)
            .with_entry("AAPL", 100.0, 30);
        let tickers: Vec<&str> = schedule.iter().map(|(t, _)| t).collect();
        assert_eq!(tickers, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_dca_schedule_validation_names_ticker() {
        let schedule = DcaSchedule::new().with_entry("AAPL", 100.0, 0);
        let err = schedule.validate().unwrap_err();
        assert!(err.to_string().contains("AAPL"));
    }

    #[test]
    fn test_dca_schedule_serde_shape() {
        let json = r#"{"AAPL": {"amount": 100.0, "frequency_days": 30}}"#;
        let schedule: DcaSchedule = serde_json::from_str(json).unwrap();
        assert_eq!(schedule.get("AAPL"), Some(&DcaEntry::new(100.0, 30)));
    }
}
