//! Mispricing detection.
//!
//! Compares the best available price for each side with the other
//! providers' view of the same outcome and reports the side where the best
//! price is cheaper than that estimate by more than the sport's minimum edge.

use std::collections::HashMap;
use tracing::debug;

use crate::odds::signed_odds_to_probability;
use crate::pricing::BestPrices;
use crate::types::{PriceQuote, Side, Sport};

// ---------------------------------------------------------------------------
// Configuration (defaults overridden by config.toml at runtime)
// ---------------------------------------------------------------------------

/// Minimum divergence per sport. Less liquid leagues need larger edges.
#[derive(Debug, Clone)]
pub struct EdgeConfig {
    pub default_min_edge: f64,
    pub sports: HashMap<Sport, f64>,
    /// Provider whose price is taken as the true probability when it quoted
    /// the side. Otherwise the other providers' mean is used.
    pub reference_provider: Option<String>,
    /// Events merged with a weaker match confidence are not traded.
    /// Zero accepts every event.
    pub min_confidence: f64,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        let sports = [
            (Sport::Mlb, 0.02),
            (Sport::Nfl, 0.03),
            (Sport::Nba, 0.025),
            (Sport::Nhl, 0.03),
            (Sport::Ncaaf, 0.04),
            (Sport::Ncaab, 0.035),
        ]
        .into_iter()
        .collect();

        Self {
            default_min_edge: 0.05,
            sports,
            reference_provider: None,
            min_confidence: 0.0,
        }
    }
}

impl EdgeConfig {
    /// Get the minimum edge for a given sport.
    pub fn min_edge_for(&self, sport: Option<Sport>) -> f64 {
        sport
            .and_then(|s| self.sports.get(&s).copied())
            .unwrap_or(self.default_min_edge)
    }

    /// Whether an event's match confidence is high enough to act on.
    pub fn is_confident(&self, confidence: f64) -> bool {
        confidence >= self.min_confidence
    }
}

// ---------------------------------------------------------------------------
// Edge detection
// ---------------------------------------------------------------------------

/// Where the true-probability estimate came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Estimate {
    Reference(String),
    /// Mean over this many other providers.
    Consensus(usize),
}

/// A one-sided mispricing.
#[derive(Debug, Clone, PartialEq)]
pub struct Mispricing {
    pub side: Side,
    pub provider: String,
    pub odds: i32,
    pub market_probability: f64,
    pub true_probability: f64,
    /// `true_probability - market_probability`, always positive.
    pub edge: f64,
    /// Expected return per unit staked: `true / market - 1`.
    pub expected_value: f64,
    pub estimate: Estimate,
}

pub struct EdgeDetector {
    config: EdgeConfig,
}

impl EdgeDetector {
    pub fn new(config: EdgeConfig) -> Self {
        Self { config }
    }

    /// Access the edge configuration.
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// Check complete best prices for a mispricing.
    ///
    /// `quotes` are the quotes the best prices were drawn from; only those
    /// at the same line count towards the estimate.
    pub fn detect(&self, sport: Option<Sport>, best: &BestPrices, quotes: &[&PriceQuote]) -> Option<Mispricing> {
        if !best.is_complete() {
            return None;
        }
        let min_edge = self.config.min_edge_for(sport);

        let found = best
            .kind
            .sides()
            .iter()
            .filter_map(|side| self.side_edge(*side, best, quotes))
            .fold(None::<Mispricing>, |acc, m| match acc {
                Some(a) if a.edge >= m.edge => Some(a),
                _ => Some(m),
            })?;

        if found.edge <= min_edge {
            debug!(
                kind = %best.kind,
                side = %found.side,
                edge = format!("{:.1}%", found.edge * 100.0),
                min_edge = format!("{:.1}%", min_edge * 100.0),
                "Edge below sport threshold"
            );
            return None;
        }

        debug!(
            kind = %best.kind,
            side = %found.side,
            provider = %found.provider,
            edge = format!("{:.1}%", found.edge * 100.0),
            ev = format!("{:.1}%", found.expected_value * 100.0),
            true_prob = format!("{:.1}%", found.true_probability * 100.0),
            market_prob = format!("{:.1}%", found.market_probability * 100.0),
            "Edge detected"
        );
        Some(found)
    }

    fn side_edge(&self, side: Side, best: &BestPrices, quotes: &[&PriceQuote]) -> Option<Mispricing> {
        let leg = best.leg(side)?;

        let others: Vec<(&str, f64)> = quotes
            .iter()
            .filter(|q| q.kind == best.kind && q.line == best.line && q.provider != leg.provider)
            .filter_map(|q| {
                let odds = q.price(side)?;
                signed_odds_to_probability(odds)
                    .ok()
                    .map(|p| (q.provider.as_str(), p))
            })
            .collect();

        let reference = self
            .config
            .reference_provider
            .as_deref()
            .and_then(|name| others.iter().find(|(p, _)| *p == name));

        let (true_probability, estimate) = match reference {
            Some((name, p)) => (*p, Estimate::Reference(name.to_string())),
            None if !others.is_empty() => {
                let mean = others.iter().map(|(_, p)| p).sum::<f64>() / others.len() as f64;
                (mean, Estimate::Consensus(others.len()))
            }
            None => return None,
        };

        let edge = true_probability - leg.implied_probability;
        if edge <= 0.0 {
            return None;
        }

        Some(Mispricing {
            side,
            provider: leg.provider.clone(),
            odds: leg.odds,
            market_probability: leg.implied_probability,
            true_probability,
            edge,
            expected_value: expected_value(true_probability, leg.implied_probability),
            estimate,
        })
    }
}

/// Expected return per unit staked at `market_prob` when the outcome's
/// real chance is `true_prob`. Zero for a degenerate market probability.
pub fn expected_value(true_prob: f64, market_prob: f64) -> f64 {
    if market_prob <= 0.0 {
        return 0.0;
    }
    true_prob / market_prob - 1.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::BestLeg;
    use crate::types::BetKind;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn make_quote(provider: &str, home: i32, away: i32) -> PriceQuote {
        PriceQuote {
            provider: provider.to_string(),
            kind: BetKind::Moneyline,
            line: None,
            prices: BTreeMap::from([(Side::Home, home), (Side::Away, away)]),
            observed_at: Utc::now(),
        }
    }

    /// Best prices computed the simple way for moneyline test inputs.
    fn make_best(quotes: &[PriceQuote]) -> BestPrices {
        let mut legs = BTreeMap::new();
        for side in [Side::Home, Side::Away] {
            let q = quotes
                .iter()
                .max_by_key(|q| {
                    let p = signed_odds_to_probability(q.price(side).unwrap()).unwrap();
                    -(p * 1e9) as i64
                })
                .unwrap();
            let odds = q.price(side).unwrap();
            legs.insert(
                side,
                BestLeg {
                    provider: q.provider.clone(),
                    odds,
                    implied_probability: signed_odds_to_probability(odds).unwrap(),
                    observed_at: q.observed_at,
                },
            );
        }
        BestPrices {
            kind: BetKind::Moneyline,
            line: None,
            legs,
        }
    }

    #[test]
    fn test_min_edge_per_sport() {
        let config = EdgeConfig::default();
        assert_eq!(config.min_edge_for(Some(Sport::Mlb)), 0.02);
        assert_eq!(config.min_edge_for(Some(Sport::Ncaaf)), 0.04);
        assert_eq!(config.min_edge_for(None), 0.05);
    }

    #[test]
    fn test_consensus_mispricing() {
        // Outlier offers +150 on home while two others imply ~52%.
        let quotes = vec![
            make_quote("outlier", 150, -190),
            make_quote("book1", -110, -110),
            make_quote("book2", -110, -110),
        ];
        let best = make_best(&quotes);
        let refs: Vec<&PriceQuote> = quotes.iter().collect();

        let m = EdgeDetector::new(EdgeConfig::default())
            .detect(Some(Sport::Nfl), &best, &refs)
            .unwrap();
        assert_eq!(m.side, Side::Home);
        assert_eq!(m.provider, "outlier");
        assert_eq!(m.estimate, Estimate::Consensus(2));
        assert!((m.market_probability - 0.4).abs() < 1e-12);
        assert!((m.edge - (110.0 / 210.0 - 0.4)).abs() < 1e-12);
        // 52.4% chance at 2.50 decimal.
        assert!((m.expected_value - (110.0 / 210.0 / 0.4 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_expected_value() {
        assert!((expected_value(0.55, 0.5) - 0.1).abs() < 1e-12);
        assert!((expected_value(0.4, 0.5) + 0.2).abs() < 1e-12);
        assert_eq!(expected_value(0.6, 0.0), 0.0);
    }

    #[test]
    fn test_min_confidence_gate() {
        let config = EdgeConfig::default();
        assert!(config.is_confident(0.0));

        let config = EdgeConfig {
            min_confidence: 0.8,
            ..EdgeConfig::default()
        };
        assert!(config.is_confident(0.8));
        assert!(!config.is_confident(0.79));
    }

    #[test]
    fn test_reference_provider_preferred() {
        let quotes = vec![
            make_quote("outlier", 150, -190),
            make_quote("sharp", -105, -115),
            make_quote("book", -110, -110),
        ];
        let best = make_best(&quotes);
        let refs: Vec<&PriceQuote> = quotes.iter().collect();

        let config = EdgeConfig {
            reference_provider: Some("sharp".into()),
            ..EdgeConfig::default()
        };
        let m = EdgeDetector::new(config).detect(Some(Sport::Nfl), &best, &refs).unwrap();
        assert_eq!(m.estimate, Estimate::Reference("sharp".into()));
        assert!((m.true_probability - 105.0 / 205.0).abs() < 1e-12);
    }

    #[test]
    fn test_small_divergence_ignored() {
        let quotes = vec![make_quote("a", -105, -115), make_quote("b", -110, -110)];
        let best = make_best(&quotes);
        let refs: Vec<&PriceQuote> = quotes.iter().collect();
        assert!(EdgeDetector::new(EdgeConfig::default())
            .detect(Some(Sport::Nfl), &best, &refs)
            .is_none());
    }

    #[test]
    fn test_single_provider_has_no_estimate() {
        let quotes = vec![make_quote("only", 150, -190)];
        let best = make_best(&quotes);
        let refs: Vec<&PriceQuote> = quotes.iter().collect();
        assert!(EdgeDetector::new(EdgeConfig::default())
            .detect(Some(Sport::Nfl), &best, &refs)
            .is_none());
    }

    #[test]
    fn test_incomplete_best_prices_skipped() {
        let quotes = vec![make_quote("a", 150, -190), make_quote("b", -110, -110)];
        let mut best = make_best(&quotes);
        best.legs.remove(&Side::Away);
        let refs: Vec<&PriceQuote> = quotes.iter().collect();
        assert!(EdgeDetector::new(EdgeConfig::default())
            .detect(Some(Sport::Nfl), &best, &refs)
            .is_none());
    }
}
