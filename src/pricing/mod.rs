//! Best-price selection.
//!
//! For each canonical event, bet kind and line, picks the most favorable
//! signed-odds price per side across all providers.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::merge::CanonicalEvent;
use crate::odds::signed_odds_to_probability;
use crate::types::{BetKind, PriceQuote, Side};

/// Whether `candidate` pays better than `current` for the same outcome.
///
/// Both positive: the larger wins. Both negative: the one closer to zero
/// wins. Mixed: the positive price wins.
pub fn is_better_odds(candidate: i32, current: i32) -> bool {
    match (candidate > 0, current > 0) {
        (true, true) => candidate > current,
        (false, false) => candidate > current,
        (true, false) => true,
        (false, true) => false,
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// The best available price for one side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestLeg {
    pub provider: String,
    pub odds: i32,
    pub implied_probability: f64,
    pub observed_at: DateTime<Utc>,
}

/// Best prices for one bet kind at one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestPrices {
    pub kind: BetKind,
    /// `None` for moneyline.
    pub line: Option<Decimal>,
    pub legs: BTreeMap<Side, BestLeg>,
}

impl BestPrices {
    pub fn leg(&self, side: Side) -> Option<&BestLeg> {
        self.legs.get(&side)
    }

    /// Both complementary sides are priced.
    pub fn is_complete(&self) -> bool {
        self.kind.sides().iter().all(|s| self.legs.contains_key(s))
    }

    /// Sum of the best legs' implied probabilities, when both are priced.
    pub fn implied_probability_sum(&self) -> Option<f64> {
        if !self.is_complete() {
            return None;
        }
        Some(
            self.kind
                .sides()
                .iter()
                .filter_map(|s| self.legs.get(s))
                .map(|l| l.implied_probability)
                .sum(),
        )
    }
}

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct BestPriceSelector {
    /// Quotes older than this (relative to the evaluation time) are ignored.
    max_quote_age: Option<Duration>,
}

impl BestPriceSelector {
    pub fn new(max_quote_age: Option<Duration>) -> Self {
        Self { max_quote_age }
    }

    /// Best prices per line for one bet kind, evaluated now.
    pub fn best_prices(&self, event: &CanonicalEvent, kind: BetKind) -> Vec<BestPrices> {
        self.best_prices_at(event, kind, Utc::now())
    }

    /// Best prices per line for one bet kind, with staleness judged at `as_of`.
    ///
    /// Providers are visited in name order, so on equal prices the first
    /// provider by name keeps the leg. Spread and total legs are only
    /// compared among quotes with an identical line.
    pub fn best_prices_at(
        &self,
        event: &CanonicalEvent,
        kind: BetKind,
        as_of: DateTime<Utc>,
    ) -> Vec<BestPrices> {
        let mut by_line: BTreeMap<Option<Decimal>, BestPrices> = BTreeMap::new();

        for quote in self.fresh_quotes(event, kind, as_of) {
            let entry = by_line.entry(quote.line).or_insert_with(|| BestPrices {
                kind,
                line: quote.line,
                legs: BTreeMap::new(),
            });

            for (side, &odds) in &quote.prices {
                let Ok(implied_probability) = signed_odds_to_probability(odds) else {
                    continue;
                };
                let better = entry
                    .legs
                    .get(side)
                    .map_or(true, |current| is_better_odds(odds, current.odds));
                if better {
                    entry.legs.insert(
                        *side,
                        BestLeg {
                            provider: quote.provider.clone(),
                            odds,
                            implied_probability,
                            observed_at: quote.observed_at,
                        },
                    );
                }
            }
        }

        by_line.into_values().filter(|b| !b.legs.is_empty()).collect()
    }

    /// Quotes of one bet kind that are not stale at `as_of`, ordered by provider.
    pub fn fresh_quotes<'a>(
        &self,
        event: &'a CanonicalEvent,
        kind: BetKind,
        as_of: DateTime<Utc>,
    ) -> Vec<&'a PriceQuote> {
        event
            .quotes_for(kind)
            .filter(|quote| match self.max_quote_age {
                Some(max_age) if as_of - quote.observed_at > max_age => {
                    debug!(
                        event = %event.key(),
                        provider = %quote.provider,
                        observed_at = %quote.observed_at,
                        "Stale quote ignored"
                    );
                    false
                }
                _ => true,
            })
            .collect()
    }

    /// Best prices for every bet kind and line of an event.
    pub fn all_best_prices_at(&self, event: &CanonicalEvent, as_of: DateTime<Utc>) -> Vec<BestPrices> {
        BetKind::ALL
            .iter()
            .flat_map(|kind| self.best_prices_at(event, *kind, as_of))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
