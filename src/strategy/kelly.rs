//! Kelly criterion sizing for one-sided mispricings.
//!
//! Computes the growth-optimal stake fraction for a price whose true
//! probability is believed to exceed its implied probability, clamped to a
//! configurable cap.

use tracing::debug;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Kelly sizing configuration.
#[derive(Debug, Clone)]
pub struct KellyConfig {
    /// Maximum stake as a fraction of bankroll.
    pub cap: f64,
}

impl Default for KellyConfig {
    fn default() -> Self {
        Self { cap: 0.25 }
    }
}

// ---------------------------------------------------------------------------
// Kelly calculator
// ---------------------------------------------------------------------------

pub struct KellyCalculator {
    config: KellyConfig,
}

impl KellyCalculator {
    pub fn new(config: KellyConfig) -> Self {
        Self { config }
    }

    /// Access the Kelly configuration.
    pub fn config(&self) -> &KellyConfig {
        &self.config
    }

    /// Raw Kelly fraction for a price implying `market_prob` when the
    /// outcome's true probability is `true_prob`.
    ///
    /// f* = (p × d − 1) / (d − 1), with decimal odds d = 1 / market_prob.
    /// Not clamped; negative means the price is not worth taking.
    pub fn raw_fraction(true_prob: f64, market_prob: f64) -> f64 {
        if !(market_prob > 0.0 && market_prob < 1.0) {
            return 0.0;
        }
        let decimal_odds = 1.0 / market_prob;
        (true_prob * decimal_odds - 1.0) / (decimal_odds - 1.0)
    }

    /// Kelly fraction clamped to `[0, cap]`.
    pub fn fraction(&self, true_prob: f64, market_prob: f64) -> f64 {
        let raw = Self::raw_fraction(true_prob, market_prob);
        let capped = raw.clamp(0.0, self.config.cap.max(0.0));
        if raw > capped {
            debug!(raw, cap = self.config.cap, "Kelly fraction capped");
        }
        capped
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
