//! Reconciliation output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::merge::{CanonicalEvent, EventKey, MergeStats};
use crate::pricing::BestPrices;
use crate::strategy::{Opportunity, OpportunityKind};
use crate::types::Sport;

/// A source whose fetch failed during a pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: String,
}

/// What happened during a pass, for the caller to render.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub records_by_provider: BTreeMap<String, usize>,
    pub failed_providers: Vec<ProviderFailure>,
    pub merge: MergeStats,
    pub alias_version: String,
}

/// Best prices of one canonical event.
#[derive(Debug, Clone, Serialize)]
pub struct EventPrices {
    pub event_key: EventKey,
    pub prices: Vec<BestPrices>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    pub run_id: String,
    pub sport: Sport,
    pub generated_at: DateTime<Utc>,
    pub events: Vec<CanonicalEvent>,
    pub best_prices: Vec<EventPrices>,
    pub opportunities: Vec<Opportunity>,
    pub diagnostics: Diagnostics,
}

impl ReconciliationReport {
    pub fn arbitrage_count(&self) -> usize {
        self.opportunities
            .iter()
            .filter(|o| o.kind == OpportunityKind::Arbitrage)
            .count()
    }

    /// Events quoted by more than one provider.
    pub fn cross_listed(&self) -> usize {
        self.events.iter().filter(|e| e.provider_ids().len() > 1).count()
    }

    /// Whether every configured source answered.
    pub fn is_complete(&self) -> bool {
        self.diagnostics.failed_providers.is_empty()
    }
}

impl fmt::Display for ReconciliationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} run {}: {} events ({} cross-listed), {} opportunities",
            self.sport,
            self.run_id,
            self.events.len(),
            self.cross_listed(),
            self.opportunities.len()
        )?;
        if !self.is_complete() {
            let failed: Vec<&str> = self
                .diagnostics
                .failed_providers
                .iter()
                .map(|p| p.provider.as_str())
                .collect();
            write!(f, ", failed: {}", failed.join(", "))?;
        }
        Ok(())
    }
}
