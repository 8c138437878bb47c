//! Reconciliation scenarios across providers.

use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;

use crossline::aliases::AliasTable;
use crossline::config::AppConfig;
use crossline::engine::Reconciler;
use crossline::matching::{MatchConfig, MatchCriterion, Matcher};
use crossline::merge::MergeEngine;
use crossline::odds::FeeSchedule;
use crossline::platforms::{EventSource, SnapshotSource};
use crossline::pricing::BestPriceSelector;
use crossline::strategy::edge::{EdgeConfig, EdgeDetector};
use crossline::strategy::kelly::{KellyCalculator, KellyConfig};
use crossline::strategy::{OpportunityDetector, OpportunityKind, StakeSplit};
use crossline::types::{BetKind, Side, Sport};

use crate::mock_source::{make_record, moneyline, now, MockSource};

// ---- helpers ---------------------------------------------------------------

fn make_engine() -> MergeEngine {
    let matcher = Matcher::new(Arc::new(AliasTable::builtin()), MatchConfig::default());
    MergeEngine::new(matcher, FeeSchedule::default())
}

fn make_detector() -> OpportunityDetector {
    OpportunityDetector::new(
        EdgeDetector::new(EdgeConfig::default()),
        KellyCalculator::new(KellyConfig::default()),
    )
}

fn make_reconciler(sources: Vec<Box<dyn EventSource>>) -> Reconciler {
    Reconciler::new(sources, make_engine(), BestPriceSelector::default(), make_detector())
}

// ---- scenarios -------------------------------------------------------------

#[test]
fn test_full_and_short_team_names_merge() {
    let a = make_record("a", "Dallas Cowboys", "Philadelphia Eagles", vec![moneyline(-110, -110)]);
    let b = make_record("b", "Dallas", "Philadelphia", vec![moneyline(-105, 105)]);

    let engine = make_engine();
    let result = engine.matcher().match_confidence(&a, &b);
    assert!(result.confidence >= 0.8);
    assert!(result.criteria.contains(&MatchCriterion::TeamExactMatch));
    assert!(result.is_match());

    let out = engine.merge_all(&[a, b]);
    assert_eq!(out.events.len(), 1);
    let event = &out.events[0];
    assert_eq!(event.home(), "DAL");
    assert_eq!(event.away(), "PHI");
    assert_eq!(event.providers().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn test_best_price_takes_provider_b_on_both_sides() {
    let out = make_engine().merge_all(&[
        make_record("A", "Dallas Cowboys", "Philadelphia Eagles", vec![moneyline(-110, -110)]),
        make_record("B", "Dallas Cowboys", "Philadelphia Eagles", vec![moneyline(-105, 105)]),
    ]);
    let best = BestPriceSelector::default().best_prices_at(&out.events[0], BetKind::Moneyline, now());
    assert_eq!(best.len(), 1);
    assert_eq!(best[0].leg(Side::Home).unwrap().provider, "B");
    assert_eq!(best[0].leg(Side::Away).unwrap().provider, "B");
}

#[test]
fn test_plus_120_plus_130_is_arbitrage_with_equal_payout() {
    let out = make_engine().merge_all(&[
        make_record("a", "Dallas Cowboys", "Philadelphia Eagles", vec![moneyline(120, -150)]),
        make_record("b", "Dallas Cowboys", "Philadelphia Eagles", vec![moneyline(-150, 130)]),
    ]);
    let opps = make_detector().scan(&out.events, &BestPriceSelector::default(), now());
    assert_eq!(opps.len(), 1);
    let opp = &opps[0];
    assert_eq!(opp.kind, OpportunityKind::Arbitrage);
    assert!((opp.edge - 0.1107).abs() < 1e-4);

    let StakeSplit::TwoLeg { legs } = &opp.stake_split else {
        panic!("expected two-leg split");
    };
    let home = &legs[&Side::Home];
    let away = &legs[&Side::Away];
    assert!((home.fraction - 0.4545 / 0.8893).abs() < 1e-3);
    assert!((away.fraction - 0.4348 / 0.8893).abs() < 1e-3);
    // Profit is the same whichever side wins.
    let payout_home = home.fraction * 2.20;
    let payout_away = away.fraction * 2.30;
    assert!((payout_home - payout_away).abs() < 1e-9);
}

#[test]
fn test_merge_is_idempotent() {
    let records = vec![
        make_record("a", "Dallas Cowboys", "Philadelphia Eagles", vec![moneyline(-110, -110)]),
        make_record("b", "Dallas", "Philadelphia", vec![moneyline(-105, 105)]),
        make_record("a", "Green Bay Packers", "Detroit Lions", vec![moneyline(-120, 100)]),
        make_record("c", "Packers", "Lions", vec![moneyline(-115, -105)]),
    ];
    let engine = make_engine();
    let first = engine.merge_all(&records);
    let keys: BTreeSet<String> = first.events.iter().map(|e| e.key().to_string()).collect();

    let second = engine.merge_events(first.events.clone());
    let again: BTreeSet<String> = second.events.iter().map(|e| e.key().to_string()).collect();
    assert_eq!(first.events.len(), 2);
    assert_eq!(keys, again);
    assert_eq!(first.events.len(), second.events.len());
    for (a, b) in first.events.iter().zip(&second.events) {
        assert_eq!(a.provider_ids(), b.provider_ids());
    }
}

#[tokio::test]
async fn test_failed_provider_does_not_abort_pass() {
    let healthy = MockSource::new(
        "a",
        vec![make_record("", "Dallas Cowboys", "Philadelphia Eagles", vec![moneyline(120, -150)])],
    );
    let flaky = MockSource::new(
        "b",
        vec![make_record("", "Dallas", "Philadelphia", vec![moneyline(-150, 130)])],
    );
    flaky.set_error("HTTP 503");

    let reconciler = make_reconciler(vec![Box::new(healthy.clone()), Box::new(flaky.clone())]);

    let degraded = reconciler.run_at(Sport::Nfl, now()).await;
    assert_eq!(degraded.events.len(), 1);
    assert!(degraded.opportunities.is_empty());
    assert_eq!(degraded.diagnostics.failed_providers.len(), 1);
    assert!(degraded.diagnostics.failed_providers[0].error.contains("HTTP 503"));

    flaky.clear_error();
    let recovered = reconciler.run_at(Sport::Nfl, now()).await;
    assert!(recovered.is_complete());
    assert_eq!(recovered.arbitrage_count(), 1);
    assert_eq!(healthy.fetch_count(), 2);
    assert_eq!(flaky.fetch_count(), 2);
}

#[tokio::test]
async fn test_snapshot_fixtures_end_to_end() {
    let cfg = AppConfig::load("config.toml").unwrap();
    let aliases = Arc::new(AliasTable::load(cfg.aliases.path.as_deref()).unwrap());
    assert!(aliases.version().ends_with("+fixtures-1"));

    let sources: Vec<Box<dyn EventSource>> = cfg
        .enabled_providers()
        .map(|p| Box::new(SnapshotSource::new(&p.name, &p.snapshot, Arc::clone(&aliases))) as Box<dyn EventSource>)
        .collect();
    let reconciler = Reconciler::new(
        sources,
        MergeEngine::new(Matcher::new(aliases, cfg.match_config()), cfg.fee_schedule()),
        BestPriceSelector::new(cfg.max_quote_age()),
        OpportunityDetector::new(
            EdgeDetector::new(cfg.edge_config()),
            KellyCalculator::new(cfg.kelly_config()),
        ),
    );

    let nfl = reconciler.run_at(Sport::Nfl, Utc::now()).await;
    assert!(nfl.is_complete());
    assert_eq!(nfl.events.len(), 4);
    // Buffalo, New York and Green Bay are listed on all three providers.
    assert_eq!(nfl.cross_listed(), 3);
    for code in ["BUF", "NYJ", "GB"] {
        let event = nfl.events.iter().find(|e| e.home() == code).unwrap();
        assert_eq!(event.providers().count(), 3, "{code}");
    }

    assert_eq!(nfl.arbitrage_count(), 1);
    let arb = &nfl.opportunities[0];
    assert_eq!(arb.event_key.home, "GB");
    assert!((arb.edge - (1.0 - 2.0 * 100.0 / 210.0)).abs() < 1e-9);

    let mlb = reconciler.run_at(Sport::Mlb, Utc::now()).await;
    assert_eq!(mlb.events.len(), 1);
    assert_eq!(mlb.cross_listed(), 1);

    let json = serde_json::to_value(&nfl).unwrap();
    assert_eq!(json["sport"], "NFL");
    assert!(json["events"].as_array().unwrap().len() == 4);
}
