//! Mock event source for integration testing.
//!
//! Provides a deterministic `EventSource` that serves known records and
//! can be switched into a failing state, all in-memory with no external
//! dependencies.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crossline::platforms::EventSource;
use crossline::types::*;

/// A mock provider whose records and failures are controlled by the test.
#[derive(Clone)]
pub struct MockSource {
    name: String,
    records: Vec<EventRecord>,
    /// If set, every fetch returns this error.
    force_error: Arc<Mutex<Option<String>>>,
    fetches: Arc<Mutex<usize>>,
}

impl MockSource {
    pub fn new(name: &str, records: Vec<EventRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|mut r| {
                r.provider = name.to_string();
                r
            })
            .collect();
        Self {
            name: name.to_string(),
            records,
            force_error: Arc::new(Mutex::new(None)),
            fetches: Arc::new(Mutex::new(0)),
        }
    }

    /// Force all subsequent fetches to fail.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap()
    }
}

#[async_trait]
impl EventSource for MockSource {
    async fn fetch(&self, sport: Sport) -> Result<Vec<EventRecord>> {
        *self.fetches.lock().unwrap() += 1;
        if let Some(msg) = self.force_error.lock().unwrap().clone() {
            return Err(anyhow!("{} unavailable: {msg}", self.name));
        }
        Ok(self
            .records
            .iter()
            .filter(|r| r.sport == Some(sport))
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

/// Fixed evaluation time for deterministic staleness.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 7, 15, 0, 0).unwrap()
}

/// Sunday afternoon kickoff.
pub fn kickoff() -> DateTime<Utc> {
    now() + Duration::hours(2)
}

pub fn make_record(provider: &str, home: &str, away: &str, quotes: Vec<RawQuote>) -> EventRecord {
    EventRecord {
        provider: provider.to_string(),
        provider_id: format!("{provider}:{away}@{home}"),
        sport: Some(Sport::Nfl),
        home_team: home.to_string(),
        away_team: away.to_string(),
        start_time: Some(kickoff()),
        event_date: None,
        venue: None,
        status: None,
        quotes,
    }
}

pub fn moneyline(home: i32, away: i32) -> RawQuote {
    RawQuote {
        kind: BetKind::Moneyline,
        line: None,
        prices: BTreeMap::from([
            (Side::Home, Price::American(home)),
            (Side::Away, Price::American(away)),
        ]),
        observed_at: now(),
    }
}
