//! The reconciliation pass: fetch -> merge -> best prices -> opportunities.

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::report::{Diagnostics, EventPrices, ProviderFailure, ReconciliationReport};
use crate::merge::MergeEngine;
use crate::platforms::EventSource;
use crate::pricing::BestPriceSelector;
use crate::strategy::OpportunityDetector;
use crate::types::{EventRecord, ReconcileError, Sport};

/// Runs reconciliation passes over a fixed set of sources.
pub struct Reconciler {
    sources: Vec<Box<dyn EventSource>>,
    merge: MergeEngine,
    selector: BestPriceSelector,
    detector: OpportunityDetector,
}

impl Reconciler {
    pub fn new(
        sources: Vec<Box<dyn EventSource>>,
        merge: MergeEngine,
        selector: BestPriceSelector,
        detector: OpportunityDetector,
    ) -> Self {
        Self {
            sources,
            merge,
            selector,
            detector,
        }
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// One pass for one sport, evaluated now.
    pub async fn run(&self, sport: Sport) -> ReconciliationReport {
        self.run_at(sport, Utc::now()).await
    }

    /// One pass for one sport with staleness judged at `as_of`.
    ///
    /// A failing source is logged and listed in the diagnostics; the pass
    /// continues with the others.
    pub async fn run_at(&self, sport: Sport, as_of: DateTime<Utc>) -> ReconciliationReport {
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = %run_id, sport = %sport, sources = self.sources.len(), "Starting reconciliation pass");

        // 1. Fetch from all sources concurrently
        let results: Vec<Result<Vec<EventRecord>>> =
            join_all(self.sources.iter().map(|s| s.fetch(sport))).await;

        let mut diagnostics = Diagnostics {
            alias_version: self.merge.matcher().aliases().version().to_string(),
            ..Diagnostics::default()
        };
        let mut records = Vec::new();

        for (source, result) in self.sources.iter().zip(results) {
            let fetched = result.unwrap_or_else(|e| {
                let failure = ReconcileError::ProviderFetch {
                    provider: source.name().to_string(),
                    message: format!("{e:#}"),
                };
                warn!(error = %failure, "Source fetch failed, continuing without");
                diagnostics.failed_providers.push(ProviderFailure {
                    provider: source.name().to_string(),
                    error: failure.to_string(),
                });
                Vec::new()
            });
            diagnostics
                .records_by_provider
                .insert(source.name().to_string(), fetched.len());
            records.extend(fetched);
        }

        info!(
            records = records.len(),
            failed = diagnostics.failed_providers.len(),
            "Records fetched"
        );

        // 2. Merge, select, detect
        let outcome = self.merge.merge_all(&records);
        diagnostics.merge = outcome.stats;
        let events = outcome.events;

        let best_prices: Vec<EventPrices> = events
            .iter()
            .map(|event| EventPrices {
                event_key: event.key().clone(),
                prices: self.selector.all_best_prices_at(event, as_of),
            })
            .filter(|p| !p.prices.is_empty())
            .collect();
        debug!(priced = best_prices.len(), "Best prices selected");

        let opportunities = self.detector.scan(&events, &self.selector, as_of);

        let report = ReconciliationReport {
            run_id,
            sport,
            generated_at: as_of,
            events,
            best_prices,
            opportunities,
            diagnostics,
        };
        info!(
            run_id = %report.run_id,
            events = report.events.len(),
            cross_listed = report.cross_listed(),
            opportunities = report.opportunities.len(),
            arbitrage = report.arbitrage_count(),
            "Reconciliation pass complete"
        );
        report
    }

    /// Run a pass for each sport in turn.
    pub async fn run_all(&self, sports: &[Sport]) -> BTreeMap<Sport, ReconciliationReport> {
        let mut reports = BTreeMap::new();
        for sport in sports {
            reports.insert(*sport, self.run(*sport).await);
        }
        reports
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aliases::AliasTable;
    use crate::matching::{MatchConfig, Matcher};
    use crate::odds::FeeSchedule;
    use crate::platforms::{MockEventSource, StaticSource};
    use crate::strategy::edge::{EdgeConfig, EdgeDetector};
    use crate::strategy::kelly::{KellyCalculator, KellyConfig};
    use crate::types::{BetKind, Price, RawQuote, Side};
    use anyhow::anyhow;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 7, 18, 0, 0).unwrap()
    }

    fn make_record(provider: &str, home: &str, away: &str, moneyline: (i32, i32)) -> EventRecord {
        EventRecord {
            provider: provider.to_string(),
            provider_id: format!("{provider}-1"),
            sport: Some(Sport::Nfl),
            home_team: home.into(),
            away_team: away.into(),
            start_time: Some(now() + Duration::hours(2)),
            event_date: None,
            venue: None,
            status: None,
            quotes: vec![RawQuote {
                kind: BetKind::Moneyline,
                line: None,
                prices: [
                    (Side::Home, Price::American(moneyline.0)),
                    (Side::Away, Price::American(moneyline.1)),
                ]
                .into_iter()
                .collect(),
                observed_at: now(),
            }],
        }
    }

    fn make_reconciler(sources: Vec<Box<dyn EventSource>>) -> Reconciler {
        let matcher = Matcher::new(Arc::new(AliasTable::builtin()), MatchConfig::default());
        Reconciler::new(
            sources,
            MergeEngine::new(matcher, FeeSchedule::default()),
            BestPriceSelector::default(),
            OpportunityDetector::new(
                EdgeDetector::new(EdgeConfig::default()),
                KellyCalculator::new(KellyConfig::default()),
            ),
        )
    }

    fn make_failing_source(name: &str) -> MockEventSource {
        let mut mock = MockEventSource::new();
        mock.expect_fetch()
            .returning(|_| Err(anyhow!("connection refused")));
        mock.expect_name().return_const(name.to_string());
        mock
    }

    #[tokio::test]
    async fn test_pass_merges_and_finds_arbitrage() {
        let reconciler = make_reconciler(vec![
            Box::new(StaticSource::new(
                "a",
                vec![make_record("", "Dallas Cowboys", "Philadelphia Eagles", (120, -150))],
            )),
            Box::new(StaticSource::new(
                "b",
                vec![make_record("", "Dallas", "Philadelphia", (-160, 130))],
            )),
        ]);

        let report = reconciler.run_at(Sport::Nfl, now()).await;
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.cross_listed(), 1);
        assert_eq!(report.best_prices.len(), 1);
        assert_eq!(report.arbitrage_count(), 1);
        assert!(report.is_complete());
        assert_eq!(report.diagnostics.records_by_provider["a"], 1);
        assert_eq!(report.diagnostics.merge.records_in, 2);
        assert_eq!(report.diagnostics.alias_version, "builtin-2025.09");
    }

    #[tokio::test]
    async fn test_failing_source_is_isolated() {
        let reconciler = make_reconciler(vec![
            Box::new(make_failing_source("broken")),
            Box::new(StaticSource::new(
                "a",
                vec![make_record("", "Dallas Cowboys", "Philadelphia Eagles", (-110, -110))],
            )),
        ]);

        let report = reconciler.run_at(Sport::Nfl, now()).await;
        assert_eq!(report.events.len(), 1);
        assert!(!report.is_complete());
        assert_eq!(report.diagnostics.failed_providers.len(), 1);
        assert_eq!(report.diagnostics.failed_providers[0].provider, "broken");
        assert!(report.diagnostics.failed_providers[0].error.contains("connection refused"));
        assert_eq!(report.diagnostics.records_by_provider["broken"], 0);
        assert!(report.to_string().contains("failed: broken"));
    }

    #[test]
    fn test_all_sources_failing_yields_empty_report() {
        let reconciler = make_reconciler(vec![
            Box::new(make_failing_source("x")),
            Box::new(make_failing_source("y")),
        ]);
        let report = tokio_test::block_on(reconciler.run_at(Sport::Nfl, now()));
        assert!(report.events.is_empty());
        assert!(report.opportunities.is_empty());
        assert_eq!(report.diagnostics.failed_providers.len(), 2);
        assert_eq!(reconciler.source_names(), vec!["x", "y"]);
    }

    #[tokio::test]
    async fn test_empty_source_is_not_a_failure() {
        let mut mock = MockEventSource::new();
        mock.expect_fetch().returning(|_| Ok(Vec::new()));
        mock.expect_name().return_const("quiet".to_string());

        let reconciler = make_reconciler(vec![Box::new(mock)]);
        let report = reconciler.run_at(Sport::Nfl, now()).await;
        assert!(report.is_complete());
        assert!(report.events.is_empty());
    }

    #[tokio::test]
    async fn test_run_all_covers_each_sport() {
        let reconciler = make_reconciler(vec![Box::new(StaticSource::new(
            "a",
            vec![make_record("", "Dallas Cowboys", "Philadelphia Eagles", (-110, -110))],
        ))]);
        let reports = reconciler.run_all(&[Sport::Nfl, Sport::Nba]).await;
        assert_eq!(reports[&Sport::Nfl].events.len(), 1);
        assert!(reports[&Sport::Nba].events.is_empty());
    }
}
