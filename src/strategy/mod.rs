//! Opportunity detection: arbitrage, mispricing and stake allocation.

pub mod arbitrage;
pub mod edge;
pub mod kelly;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

use crate::merge::{CanonicalEvent, EventKey};
use crate::pricing::{BestPriceSelector, BestPrices};
use crate::types::{BetKind, PriceQuote, Side, Sport};
use arbitrage::{detect_arbitrage, StakeLeg};
use edge::{EdgeDetector, Estimate};
use kelly::KellyCalculator;

// ---------------------------------------------------------------------------
// Opportunity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    Arbitrage,
    Mispricing,
}

impl fmt::Display for OpportunityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpportunityKind::Arbitrage => write!(f, "arbitrage"),
            OpportunityKind::Mispricing => write!(f, "mispricing"),
        }
    }
}

/// Recommended allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StakeSplit {
    /// Fractions of the total stake per leg, summing to 1.
    TwoLeg { legs: BTreeMap<Side, StakeLeg> },
    /// Fraction of bankroll on a single side, already capped.
    Kelly {
        side: Side,
        provider: String,
        odds: i32,
        fraction: f64,
        true_probability: f64,
    },
}

impl StakeSplit {
    /// Currency amount per side for a bankroll, rounded to cents.
    pub fn amounts(&self, bankroll: Decimal) -> BTreeMap<Side, Decimal> {
        let scale = |fraction: f64| {
            (bankroll * Decimal::from_f64(fraction).unwrap_or(Decimal::ZERO)).round_dp(2)
        };
        match self {
            StakeSplit::TwoLeg { legs } => legs
                .iter()
                .map(|(side, leg)| (*side, scale(leg.fraction)))
                .collect(),
            StakeSplit::Kelly { side, fraction, .. } => BTreeMap::from([(*side, scale(*fraction))]),
        }
    }
}

/// One actionable opportunity on a canonical event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    pub event_key: EventKey,
    pub sport: Option<Sport>,
    pub bet_kind: BetKind,
    pub line: Option<Decimal>,
    pub kind: OpportunityKind,
    /// Leg to take for a mispricing; `None` for arbitrage (take both).
    pub side: Option<Side>,
    pub best_implied_probability_sum: f64,
    pub edge: f64,
    /// Expected return per unit staked. Guaranteed for arbitrage.
    pub expected_value: f64,
    /// Weakest match confidence among the event's merged records.
    pub match_confidence: f64,
    pub stake_split: StakeSplit,
}

impl fmt::Display for Opportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.event_key, self.bet_kind)?;
        if let Some(line) = self.line {
            write!(f, " {line}")?;
        }
        if let Some(side) = self.side {
            write!(f, " {side}")?;
        }
        write!(f, " edge {:.2}%", self.edge * 100.0)
    }
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

/// Pipelines arbitrage check -> mispricing check -> Kelly sizing.
///
/// Reads canonical events only; never mutates them.
pub struct OpportunityDetector {
    edge_detector: EdgeDetector,
    kelly: KellyCalculator,
}

impl OpportunityDetector {
    pub fn new(edge_detector: EdgeDetector, kelly: KellyCalculator) -> Self {
        Self { edge_detector, kelly }
    }

    /// Check one set of best prices.
    ///
    /// `quotes` are the event's live quotes of the same bet kind; they feed
    /// the mispricing estimate.
    pub fn find_opportunity(
        &self,
        event: &CanonicalEvent,
        best: &BestPrices,
        quotes: &[&PriceQuote],
    ) -> Option<Opportunity> {
        let sum = best.implied_probability_sum()?;

        let match_confidence = event.confidence();
        if !self.edge_detector.config().is_confident(match_confidence) {
            debug!(
                event = %event.key(),
                confidence = format!("{:.1}%", match_confidence * 100.0),
                "Match confidence too low, skipping"
            );
            return None;
        }

        if let Some(arb) = detect_arbitrage(best) {
            return Some(Opportunity {
                event_key: event.key().clone(),
                sport: event.sport(),
                bet_kind: best.kind,
                line: best.line,
                kind: OpportunityKind::Arbitrage,
                side: None,
                best_implied_probability_sum: arb.implied_probability_sum,
                edge: arb.edge,
                expected_value: arb.payout_per_unit() - 1.0,
                match_confidence,
                stake_split: StakeSplit::TwoLeg { legs: arb.legs },
            });
        }

        let mispricing = self.edge_detector.detect(event.sport(), best, quotes)?;
        let fraction = self
            .kelly
            .fraction(mispricing.true_probability, mispricing.market_probability);
        if fraction <= 0.0 {
            debug!(
                event = %event.key(),
                side = %mispricing.side,
                "Kelly rejected (zero fraction)"
            );
            return None;
        }
        if let Estimate::Reference(name) = &mispricing.estimate {
            debug!(event = %event.key(), reference = %name, "Priced against reference provider");
        }

        Some(Opportunity {
            event_key: event.key().clone(),
            sport: event.sport(),
            bet_kind: best.kind,
            line: best.line,
            kind: OpportunityKind::Mispricing,
            side: Some(mispricing.side),
            best_implied_probability_sum: sum,
            edge: mispricing.edge,
            expected_value: mispricing.expected_value,
            match_confidence,
            stake_split: StakeSplit::Kelly {
                side: mispricing.side,
                provider: mispricing.provider,
                odds: mispricing.odds,
                fraction,
                true_probability: mispricing.true_probability,
            },
        })
    }

    /// Detect opportunities across every event, bet kind and line.
    /// Sorted by edge descending.
    pub fn scan(
        &self,
        events: &[CanonicalEvent],
        selector: &BestPriceSelector,
        as_of: DateTime<Utc>,
    ) -> Vec<Opportunity> {
        let mut found = Vec::new();

        for event in events {
            for kind in BetKind::ALL {
                let quotes = selector.fresh_quotes(event, *kind, as_of);
                for best in selector.best_prices_at(event, *kind, as_of) {
                    if let Some(opp) = self.find_opportunity(event, &best, &quotes) {
                        found.push(opp);
                    }
                }
            }
        }

        found.sort_by(|a, b| b.edge.partial_cmp(&a.edge).unwrap_or(std::cmp::Ordering::Equal));

        info!(
            events = events.len(),
            opportunities = found.len(),
            arbitrage = found.iter().filter(|o| o.kind == OpportunityKind::Arbitrage).count(),
            "Opportunity scan complete"
        );
        found
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
