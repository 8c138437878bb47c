//! JSON snapshot source.
//!
//! Reads a provider listing captured to disk. Listings may name teams
//! directly or only carry a coded exchange ticker, in which case the teams
//! and date are recovered through the alias table.
//!
//! ```json
//! {
//!   "sport": "NFL",
//!   "events": [
//!     { "id": "8812", "home_team": "Buffalo Bills", "away_team": "Baltimore Ravens",
//!       "start_time": "2025-09-08T00:20:00Z",
//!       "quotes": [{ "kind": "moneyline", "prices": { "home": { "american": -120 } } }] },
//!     { "ticker": "KXNFLGAME-25SEP07BALBUF",
//!       "quotes": [{ "kind": "moneyline", "prices": { "home": { "exchange": 0.55 } } }] }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{tag_provider, EventSource};
use crate::aliases::AliasTable;
use crate::types::{EventRecord, RawQuote, Sport};

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    /// Sport for events that do not name one.
    #[serde(default)]
    sport: Option<Sport>,
    #[serde(default)]
    events: Vec<SnapshotEvent>,
}

#[derive(Debug, Deserialize)]
struct SnapshotEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    ticker: Option<String>,
    #[serde(default)]
    sport: Option<Sport>,
    #[serde(default)]
    home_team: Option<String>,
    #[serde(default)]
    away_team: Option<String>,
    #[serde(default)]
    start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    event_date: Option<NaiveDate>,
    #[serde(default)]
    venue: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    quotes: Vec<RawQuote>,
}

pub struct SnapshotSource {
    name: String,
    path: PathBuf,
    aliases: Arc<AliasTable>,
}

impl SnapshotSource {
    pub fn new(name: &str, path: impl Into<PathBuf>, aliases: Arc<AliasTable>) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            aliases,
        }
    }

    /// Parse snapshot contents into records of one sport.
    pub fn parse(&self, contents: &str, sport: Sport) -> Result<Vec<EventRecord>> {
        let file: SnapshotFile = serde_json::from_str(contents)
            .with_context(|| format!("Invalid snapshot JSON for {}", self.name))?;
        let default_sport = file.sport;

        let mut skipped = 0usize;
        let mut records: Vec<EventRecord> = file
            .events
            .into_iter()
            .filter(|e| e.sport.or(default_sport) == Some(sport))
            .filter_map(|e| {
                let record = self.to_record(e, sport);
                if record.is_none() {
                    skipped += 1;
                }
                record
            })
            .collect();

        if skipped > 0 {
            warn!(
                provider = %self.name,
                skipped,
                "Snapshot events without teams or a parseable ticker skipped"
            );
        }
        tag_provider(&mut records, &self.name);
        Ok(records)
    }

    fn to_record(&self, event: SnapshotEvent, sport: Sport) -> Option<EventRecord> {
        let mut event_date = event.event_date;

        let (home_team, away_team) = match (event.home_team, event.away_team) {
            (Some(home), Some(away)) => (home, away),
            _ => {
                let ticker = event.ticker.as_deref()?;
                let parsed = self.aliases.parse_event_ticker(ticker, Some(sport))?;
                debug!(
                    provider = %self.name,
                    ticker,
                    away = %parsed.teams.away,
                    home = %parsed.teams.home,
                    method = ?parsed.teams.method,
                    "Teams recovered from ticker"
                );
                event_date = event_date.or(Some(parsed.date));
                (parsed.teams.home, parsed.teams.away)
            }
        };

        let provider_id = event.id.or(event.ticker)?;

        Some(EventRecord {
            provider: self.name.clone(),
            provider_id,
            sport: Some(sport),
            home_team,
            away_team,
            start_time: event.start_time,
            event_date,
            venue: event.venue,
            status: event.status,
            quotes: event.quotes,
        })
    }
}

#[async_trait]
impl EventSource for SnapshotSource {
    async fn fetch(&self, sport: Sport) -> Result<Vec<EventRecord>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read snapshot: {}", self.path.display()))?;
        let records = self.parse(&contents, sport)?;
        info!(
            provider = %self.name,
            sport = %sport,
            records = records.len(),
            "Snapshot loaded"
        );
        Ok(records)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
