//! Odds normalization.
//!
//! Pure conversions between signed (American) odds, decimal multiplier
//! odds, exchange probability prices and implied probability, plus the
//! per-quote normalizer that turns a provider's `RawQuote` into the
//! canonical signed-odds `PriceQuote`.

use rust_decimal::prelude::*;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::types::{Price, PriceQuote, RawQuote, ReconcileError};

/// Fee applied to exchange prices when a provider has no configured rate.
pub const DEFAULT_EXCHANGE_FEE: f64 = 0.035;

// ---------------------------------------------------------------------------
// Signed odds <-> probability
// ---------------------------------------------------------------------------

/// Implied probability of a signed-odds price.
///
/// `+150` means a 100 stake profits 150 (p = 100/250); `-150` means 150
/// must be staked to profit 100 (p = 150/250). Values in (-100, +100)
/// encode no price.
pub fn signed_odds_to_probability(odds: i32) -> Result<f64, ReconcileError> {
    if odds >= 100 {
        Ok(100.0 / (f64::from(odds) + 100.0))
    } else if odds <= -100 {
        let stake = -f64::from(odds);
        Ok(stake / (stake + 100.0))
    } else {
        Err(ReconcileError::InvalidOdds(odds))
    }
}

/// Signed odds for a probability, rounded to the nearest integer.
///
/// An even price (p = 0.5) is always written `+100`; `-100` denotes the
/// same price and is never produced.
pub fn probability_to_signed_odds(p: f64) -> Result<i32, ReconcileError> {
    if !(p > 0.0 && p < 1.0) {
        return Err(ReconcileError::InvalidProbability(p));
    }
    let odds = if p > 0.5 {
        -(p / (1.0 - p) * 100.0).round()
    } else {
        ((1.0 - p) / p * 100.0).round()
    };
    // `as` saturates for probabilities vanishingly close to 0 or 1.
    Ok(canonical(odds as i32))
}

/// Validate a signed-odds price and fold `-100` onto `+100`.
pub fn canonical_signed_odds(odds: i32) -> Result<i32, ReconcileError> {
    signed_odds_to_probability(odds)?;
    Ok(canonical(odds))
}

fn canonical(odds: i32) -> i32 {
    if odds == -100 {
        100
    } else {
        odds
    }
}

// ---------------------------------------------------------------------------
// Decimal odds
// ---------------------------------------------------------------------------

/// Decimal multiplier odds (total return per unit staked) for a signed price.
pub fn american_to_decimal(odds: i32) -> Result<f64, ReconcileError> {
    signed_odds_to_probability(odds)?;
    if odds > 0 {
        Ok(1.0 + f64::from(odds) / 100.0)
    } else {
        Ok(1.0 + 100.0 / -f64::from(odds))
    }
}

/// Signed odds for a decimal multiplier price.
pub fn decimal_to_american(decimal: f64) -> Result<i32, ReconcileError> {
    if !(decimal > 1.0) || !decimal.is_finite() {
        return Err(ReconcileError::InvalidDecimalOdds(decimal));
    }
    let odds = if decimal >= 2.0 {
        ((decimal - 1.0) * 100.0).round()
    } else {
        -(100.0 / (decimal - 1.0)).round()
    };
    Ok(canonical(odds as i32))
}

/// Implied probability of a decimal multiplier price.
pub fn decimal_to_probability(decimal: f64) -> Result<f64, ReconcileError> {
    if !(decimal > 1.0) || !decimal.is_finite() {
        return Err(ReconcileError::InvalidDecimalOdds(decimal));
    }
    Ok(1.0 / decimal)
}

// ---------------------------------------------------------------------------
// Exchange prices
// ---------------------------------------------------------------------------

/// Implied probability of an exchange price (identity on (0, 1)).
pub fn exchange_price_to_probability(price: Decimal) -> Result<f64, ReconcileError> {
    if price <= Decimal::ZERO || price >= Decimal::ONE {
        return Err(ReconcileError::InvalidExchangePrice(price));
    }
    price
        .to_f64()
        .ok_or(ReconcileError::InvalidExchangePrice(price))
}

/// Signed odds for an exchange price after the exchange's fee.
///
/// The fee raises the effective cost of the contract: the implied
/// probability becomes `price * (1 + fee_rate)`. A zero fee gives the plain
/// identity conversion. A fee that pushes the cost to 1 or more leaves no
/// payout and the price is rejected.
pub fn exchange_price_to_signed_odds(price: Decimal, fee_rate: f64) -> Result<i32, ReconcileError> {
    if !(fee_rate >= 0.0) || !fee_rate.is_finite() {
        return Err(ReconcileError::InvalidFeeRate(fee_rate));
    }
    let p = exchange_price_to_probability(price)? * (1.0 + fee_rate);
    probability_to_signed_odds(p)
}

// ---------------------------------------------------------------------------
// Fee schedule
// ---------------------------------------------------------------------------

/// Exchange fee rates by provider name.
#[derive(Debug, Clone)]
pub struct FeeSchedule {
    pub default_rate: f64,
    pub rates: HashMap<String, f64>,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            default_rate: DEFAULT_EXCHANGE_FEE,
            rates: HashMap::new(),
        }
    }
}

impl FeeSchedule {
    pub fn new(default_rate: f64, rates: HashMap<String, f64>) -> Self {
        Self { default_rate, rates }
    }

    /// Fee rate applied to exchange prices published by `provider`.
    pub fn rate_for(&self, provider: &str) -> f64 {
        self.rates.get(provider).copied().unwrap_or(self.default_rate)
    }
}

// ---------------------------------------------------------------------------
// Quote normalization
// ---------------------------------------------------------------------------

/// Result of normalizing one raw quote.
#[derive(Debug, Clone)]
pub struct NormalizedQuote {
    /// `None` when no leg survived.
    pub quote: Option<PriceQuote>,
    /// Legs discarded as invalid.
    pub dropped_legs: usize,
}

/// Convert one native price to canonical signed odds.
pub fn price_to_signed_odds(price: Price, fee_rate: f64) -> Result<i32, ReconcileError> {
    match price {
        Price::American(odds) => canonical_signed_odds(odds),
        Price::Decimal(decimal) => decimal_to_american(decimal),
        Price::Exchange(p) => exchange_price_to_signed_odds(p, fee_rate),
    }
}

/// Normalize a provider's raw quote into canonical form.
///
/// Invalid legs (unconvertible prices, or sides that do not belong to the
/// quote's bet kind) are dropped individually; the quote survives if at
/// least one leg is valid. Spread and total quotes without a line are
/// unusable as a whole.
pub fn normalize_quote(provider: &str, raw: &RawQuote, fees: &FeeSchedule) -> NormalizedQuote {
    if raw.kind.has_line() && raw.line.is_none() {
        debug!(provider, kind = %raw.kind, "Quote without a line dropped");
        return NormalizedQuote {
            quote: None,
            dropped_legs: raw.prices.len(),
        };
    }

    let fee_rate = fees.rate_for(provider);
    let valid_sides = raw.kind.sides();
    let mut prices = BTreeMap::new();
    let mut dropped_legs = 0;

    for (side, price) in &raw.prices {
        if !valid_sides.contains(side) {
            debug!(provider, kind = %raw.kind, side = %side, "Leg does not belong to bet kind");
            dropped_legs += 1;
            continue;
        }
        match price_to_signed_odds(*price, fee_rate) {
            Ok(odds) => {
                prices.insert(*side, odds);
            }
            Err(e) => {
                debug!(provider, side = %side, price = %price, error = %e, "Invalid leg dropped");
                dropped_legs += 1;
            }
        }
    }

    let quote = if prices.is_empty() {
        None
    } else {
        Some(PriceQuote {
            provider: provider.to_string(),
            kind: raw.kind,
            line: if raw.kind.has_line() { raw.line } else { None },
            prices,
            observed_at: raw.observed_at,
        })
    };

    NormalizedQuote { quote, dropped_legs }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
