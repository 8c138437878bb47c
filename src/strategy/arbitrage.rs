//! Two-leg arbitrage detection.
//!
//! When the best prices for two complementary sides imply probabilities
//! summing below 1, staking each leg in proportion to its implied
//! probability returns the same amount whichever side wins.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::pricing::BestPrices;
use crate::types::Side;

/// One leg of an arbitrage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StakeLeg {
    pub provider: String,
    pub odds: i32,
    /// Fraction of the total stake placed on this leg.
    pub fraction: f64,
}

/// A detected arbitrage.
#[derive(Debug, Clone, PartialEq)]
pub struct Arbitrage {
    pub implied_probability_sum: f64,
    /// `1 - implied_probability_sum`.
    pub edge: f64,
    pub legs: BTreeMap<Side, StakeLeg>,
}

impl Arbitrage {
    /// Guaranteed return per unit staked across both legs.
    pub fn payout_per_unit(&self) -> f64 {
        1.0 / self.implied_probability_sum
    }
}

/// Check complementary best prices for an arbitrage.
pub fn detect_arbitrage(best: &BestPrices) -> Option<Arbitrage> {
    let sum = best.implied_probability_sum()?;
    if sum >= 1.0 || sum <= 0.0 {
        return None;
    }

    let legs = best
        .kind
        .sides()
        .iter()
        .filter_map(|side| {
            best.leg(*side).map(|leg| {
                (
                    *side,
                    StakeLeg {
                        provider: leg.provider.clone(),
                        odds: leg.odds,
                        fraction: leg.implied_probability / sum,
                    },
                )
            })
        })
        .collect();

    debug!(
        kind = %best.kind,
        sum,
        edge = format!("{:.2}%", (1.0 - sum) * 100.0),
        "Arbitrage detected"
    );

    Some(Arbitrage {
        implied_probability_sum: sum,
        edge: 1.0 - sum,
        legs,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odds::{american_to_decimal, signed_odds_to_probability};
    use crate::pricing::BestLeg;
    use crate::types::BetKind;
    use chrono::Utc;

    fn make_best(kind: BetKind, legs: &[(Side, &str, i32)]) -> BestPrices {
        BestPrices {
            kind,
            line: None,
            legs: legs
                .iter()
                .map(|(side, provider, odds)| {
                    (
                        *side,
                        BestLeg {
                            provider: provider.to_string(),
                            odds: *odds,
                            implied_probability: signed_odds_to_probability(*odds).unwrap(),
                            observed_at: Utc::now(),
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_arbitrage_edge_and_split() {
        let best = make_best(BetKind::Moneyline, &[(Side::Home, "a", 120), (Side::Away, "b", 130)]);
        let arb = detect_arbitrage(&best).unwrap();
        assert!((arb.edge - 0.1107).abs() < 1e-4);

        let home = &arb.legs[&Side::Home];
        let away = &arb.legs[&Side::Away];
        assert!((home.fraction + away.fraction - 1.0).abs() < 1e-12);

        // Equal payout whichever side wins.
        let pay_home = home.fraction * american_to_decimal(120).unwrap();
        let pay_away = away.fraction * american_to_decimal(130).unwrap();
        assert!((pay_home - pay_away).abs() < 1e-12);
        assert!((pay_home - arb.payout_per_unit()).abs() < 1e-12);
    }

    #[test]
    fn test_no_arbitrage_with_vig() {
        let best = make_best(BetKind::Moneyline, &[(Side::Home, "a", -110), (Side::Away, "b", -110)]);
        assert!(detect_arbitrage(&best).is_none());
    }

    #[test]
    fn test_one_sided_prices_cannot_arbitrage() {
        let best = make_best(BetKind::Total, &[(Side::Over, "a", 500)]);
        assert!(detect_arbitrage(&best).is_none());
    }

    #[test]
    fn test_total_arbitrage_uses_over_under() {
        let best = make_best(BetKind::Total, &[(Side::Over, "a", 105), (Side::Under, "b", 105)]);
        let arb = detect_arbitrage(&best).unwrap();
        assert!(arb.legs.contains_key(&Side::Over));
        assert!(arb.legs.contains_key(&Side::Under));
        assert!((arb.legs[&Side::Over].fraction - 0.5).abs() < 1e-12);
    }
}
