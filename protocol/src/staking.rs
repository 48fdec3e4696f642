//! # Staking Periods & Interest Rates
//!
//! The backend publishes one annual rate per lock-up period at
//! `GET /staking/rates`. The wallet falls back to a fixed table when that
//! endpoint is down, and remembers a successful answer for a few minutes.
//!
//! ## Design
//!
//! - [`RateCache`] owns its state. Two caches never share an entry, and a
//!   test can build one around a [`ManualClock`](crate::clock::ManualClock).
//! - `parking_lot::RwLock` guards the entry. Reads vastly outnumber
//!   refreshes, and a refresh holds the lock only to swap the value in.
//! - Fallback defaults are never cached, so the next call after an outage
//!   tries the backend again.
//! - Rewards are simple interest in `f64`, matching what the staking form
//!   displays. They are estimates, not amounts to sign.

use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::RATE_CACHE_TTL;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StakingError {
    /// The endpoint answered with `success: false`.
    #[error("rate lookup failed: {message}")]
    Unsuccessful { message: String },

    #[error("malformed rates response: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Periods
// ---------------------------------------------------------------------------

/// One lock-up option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakingPeriod {
    /// The day count as text; what the backend expects back on submission.
    pub id: String,
    pub name: String,
    pub days: u32,
    /// Annual percentage yield, e.g. `6.0` for 6%.
    pub apy: f64,
}

impl StakingPeriod {
    pub fn new(days: u32, name: impl Into<String>, apy: f64) -> Self {
        Self {
            id: days.to_string(),
            name: name.into(),
            days,
            apy,
        }
    }

    /// Interest earned on `amount` over this period.
    pub fn reward(&self, amount: f64) -> f64 {
        calculate_reward(amount, self.apy, self.days)
    }
}

/// The table used when the backend cannot be reached.
pub fn default_staking_periods() -> Vec<StakingPeriod> {
    vec![
        StakingPeriod::new(30, "30일", 3.0),
        StakingPeriod::new(90, "90일", 6.0),
        StakingPeriod::new(180, "180일", 10.0),
        StakingPeriod::new(365, "365일", 15.0),
    ]
}

pub fn find_period<'a>(periods: &'a [StakingPeriod], id: &str) -> Option<&'a StakingPeriod> {
    periods.iter().find(|p| p.id == id)
}

/// Simple interest: `amount * apy / 365 / 100 * days`.
pub fn calculate_reward(amount: f64, apy: f64, days: u32) -> f64 {
    let daily_rate = apy / 365.0 / 100.0;
    amount * daily_rate * f64::from(days)
}

/// Principal plus [`calculate_reward`].
pub fn calculate_total_return(amount: f64, apy: f64, days: u32) -> f64 {
    amount + calculate_reward(amount, apy, days)
}

// ---------------------------------------------------------------------------
// Rates response
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RateRow {
    period: u32,
    #[serde(default)]
    name: Option<String>,
    rate: f64,
}

/// Decodes `{"success": bool, "data": [{"period", "name", "rate"}], "message"}`.
///
/// A row without a `name` is labelled with its day count.
pub fn parse_rates_response(response: &Value) -> Result<Vec<StakingPeriod>, StakingError> {
    let success = response
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !success {
        let message = response
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(StakingError::Unsuccessful { message });
    }

    let data = response
        .get("data")
        .cloned()
        .ok_or_else(|| StakingError::Malformed("missing data".to_string()))?;
    let rows: Vec<RateRow> =
        serde_json::from_value(data).map_err(|e| StakingError::Malformed(e.to_string()))?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let name = row.name.unwrap_or_else(|| format!("{}일", row.period));
            StakingPeriod::new(row.period, name, row.rate)
        })
        .collect())
}

// ---------------------------------------------------------------------------
// RateCache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CachedRates {
    periods: Vec<StakingPeriod>,
    fetched_at: u64,
}

/// Holds the last successfully fetched rate table.
#[derive(Debug)]
pub struct RateCache<C: Clock = SystemClock> {
    clock: C,
    ttl: Duration,
    entry: RwLock<Option<CachedRates>>,
}

impl Default for RateCache<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> RateCache<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            ttl: RATE_CACHE_TTL,
            entry: RwLock::new(None),
        }
    }

    /// Sets how long an entry stays fresh.
    pub fn invalidate_after(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached table if it is still fresh.
    pub fn cached(&self) -> Option<Vec<StakingPeriod>> {
        let now = self.clock.now_micros();
        let guard = self.entry.read();
        guard
            .as_ref()
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.periods.clone())
    }

    /// Returns the cached table while fresh. Otherwise calls `loader`,
    /// caching its result on success and returning
    /// [`default_staking_periods`] uncached on failure.
    pub fn get_or_refresh<F, E>(&self, loader: F) -> Vec<StakingPeriod>
    where
        F: FnOnce() -> Result<Vec<StakingPeriod>, E>,
        E: std::fmt::Display,
    {
        if let Some(periods) = self.cached() {
            return periods;
        }

        match loader() {
            Ok(periods) => {
                debug!(count = periods.len(), "refreshed staking rates");
                *self.entry.write() = Some(CachedRates {
                    periods: periods.clone(),
                    fetched_at: self.clock.now_micros(),
                });
                periods
            }
            Err(err) => {
                warn!(error = %err, "staking rate lookup failed, using defaults");
                default_staking_periods()
            }
        }
    }

    /// Drops the cached entry.
    pub fn invalidate(&self) {
        *self.entry.write() = None;
    }

    fn is_fresh(&self, entry: &CachedRates, now: u64) -> bool {
        let age = now.saturating_sub(entry.fetched_at);
        u128::from(age) < self.ttl.as_micros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde_json::json;
    use std::cell::Cell;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn default_table() {
        let periods = default_staking_periods();
        let summary: Vec<(&str, u32, f64)> = periods
            .iter()
            .map(|p| (p.id.as_str(), p.days, p.apy))
            .collect();
        assert_eq!(
            summary,
            vec![("30", 30, 3.0), ("90", 90, 6.0), ("180", 180, 10.0), ("365", 365, 15.0)]
        );
        assert_eq!(find_period(&periods, "180").map(|p| p.days), Some(180));
        assert!(find_period(&periods, "60").is_none());
    }

    #[test]
    fn reward_math() {
        assert!(approx(calculate_reward(1000.0, 15.0, 365), 150.0));
        assert!(approx(calculate_reward(1000.0, 3.65, 100), 10.0));
        assert!(approx(calculate_total_return(1000.0, 15.0, 365), 1150.0));
        assert_eq!(calculate_reward(0.0, 10.0, 180), 0.0);
        assert!(approx(StakingPeriod::new(365, "1y", 10.0).reward(50.0), 5.0));
    }

    #[test]
    fn parses_rates() {
        let body = json!({
            "success": true,
            "data": [
                {"period": 30, "name": "30 days", "rate": 4.5, "label": "ignored"},
                {"period": 60, "rate": 7}
            ]
        });
        let periods = parse_rates_response(&body).unwrap();
        assert_eq!(periods[0], StakingPeriod::new(30, "30 days", 4.5));
        assert_eq!(periods[1].id, "60");
        assert_eq!(periods[1].name, "60일");
        assert_eq!(periods[1].apy, 7.0);
    }

    #[test]
    fn rate_errors() {
        assert_eq!(
            parse_rates_response(&json!({"success": false, "message": "db down"})),
            Err(StakingError::Unsuccessful { message: "db down".into() })
        );
        assert!(matches!(
            parse_rates_response(&json!({"success": true})),
            Err(StakingError::Malformed(_))
        ));
        assert!(matches!(
            parse_rates_response(&json!({"success": true, "data": [{"period": "x"}]})),
            Err(StakingError::Malformed(_))
        ));
    }

    #[test]
    fn cache_serves_until_stale() {
        let clock = ManualClock::new(1_000_000);
        let cache = RateCache::new(&clock).invalidate_after(Duration::from_secs(60));
        let calls = Cell::new(0);
        let load = || {
            calls.set(calls.get() + 1);
            Ok::<_, StakingError>(vec![StakingPeriod::new(7, "week", 1.0)])
        };

        assert_eq!(cache.get_or_refresh(load)[0].days, 7);
        assert_eq!(cache.get_or_refresh(load)[0].days, 7);
        assert_eq!(calls.get(), 1);

        clock.advance(Duration::from_secs(59));
        cache.get_or_refresh(load);
        assert_eq!(calls.get(), 1);

        clock.advance(Duration::from_secs(1));
        cache.get_or_refresh(load);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn fallback_is_not_cached() {
        let clock = ManualClock::new(0);
        let cache = RateCache::new(&clock);
        let failed = cache.get_or_refresh(|| Err::<Vec<StakingPeriod>, _>("offline"));
        assert_eq!(failed, default_staking_periods());
        assert!(cache.cached().is_none());

        let ok = cache.get_or_refresh(|| Ok::<_, &str>(vec![StakingPeriod::new(1, "d", 1.0)]));
        assert_eq!(ok.len(), 1);
        assert!(cache.cached().is_some());
    }

    #[test]
    fn invalidate_forces_reload() {
        let clock = ManualClock::new(0);
        let cache = RateCache::new(&clock);
        cache.get_or_refresh(|| Ok::<_, &str>(default_staking_periods()));
        assert!(cache.cached().is_some());
        cache.invalidate();
        assert!(cache.cached().is_none());
        assert_eq!(cache.ttl(), RATE_CACHE_TTL);
    }
}
