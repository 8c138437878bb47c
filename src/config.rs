//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! section has defaults, so a partial file (or an empty one) is valid.

use anyhow::{Context, Result};
use chrono::Duration;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;

use crate::matching::{MatchConfig, SportMatchConfig, MAX_TIME_THRESHOLD_HOURS};
use crate::odds::{FeeSchedule, DEFAULT_EXCHANGE_FEE};
use crate::strategy::edge::EdgeConfig;
use crate::strategy::kelly::KellyConfig;
use crate::types::{ReconcileError, Sport};

/// Largest accepted quote age: one year.
pub const MAX_QUOTE_AGE_SECS: u64 = 366 * 24 * 3600;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub reconciler: ReconcilerConfig,
    pub matching: MatchingConfig,
    pub opportunity: OpportunityConfig,
    pub fees: FeesConfig,
    pub providers: Vec<ProviderConfig>,
    pub aliases: AliasesConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReconcilerConfig {
    pub sports: Vec<Sport>,
    /// Loop every this many seconds; a single pass when absent.
    pub interval_secs: Option<u64>,
    /// Ignore quotes older than this.
    pub max_quote_age_secs: Option<u64>,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            sports: vec![Sport::Nfl],
            interval_secs: None,
            max_quote_age_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SportMatchingConfig {
    pub threshold: Option<f64>,
    pub time_threshold_hours: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MatchingConfig {
    pub threshold: Option<f64>,
    pub time_threshold_hours: Option<f64>,
    /// Keyed by lowercase sport name, e.g. `[matching.sports.nfl]`.
    pub sports: HashMap<String, SportMatchingConfig>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OpportunityConfig {
    pub min_edge: Option<f64>,
    /// Keyed by lowercase sport name.
    pub sports: HashMap<String, f64>,
    pub kelly_cap: f64,
    pub reference_provider: Option<String>,
    /// Skip events merged with a weaker match confidence.
    pub min_confidence: Option<f64>,
}

impl Default for OpportunityConfig {
    fn default() -> Self {
        Self {
            min_edge: None,
            sports: HashMap::new(),
            kelly_cap: KellyConfig::default().cap,
            reference_provider: None,
            min_confidence: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FeesConfig {
    /// Fee for exchange prices of providers not listed below.
    pub default: f64,
    #[serde(flatten)]
    pub providers: HashMap<String, f64>,
}

impl Default for FeesConfig {
    fn default() -> Self {
        Self {
            default: DEFAULT_EXCHANGE_FEE,
            providers: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    pub name: String,
    /// JSON snapshot file this provider is read from.
    pub snapshot: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AliasesConfig {
    /// Optional TOML file extending the built-in alias table.
    pub path: Option<String>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Parse and validate TOML contents.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ReconcileError> {
        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(ReconcileError::Config(format!("{name} must be in [0, 1], got {v}")))
            }
        };
        let hours = |name: &str, h: f64| {
            if h.is_finite() && h > 0.0 && h <= MAX_TIME_THRESHOLD_HOURS {
                Ok(())
            } else {
                Err(ReconcileError::Config(format!(
                    "{name} must be in (0, {MAX_TIME_THRESHOLD_HOURS}], got {h}"
                )))
            }
        };

        if self.reconciler.sports.is_empty() {
            return Err(ReconcileError::Config("reconciler.sports is empty".into()));
        }
        if self.reconciler.interval_secs == Some(0) {
            return Err(ReconcileError::Config("reconciler.interval_secs must be > 0".into()));
        }
        if let Some(age) = self.reconciler.max_quote_age_secs {
            if age > MAX_QUOTE_AGE_SECS {
                return Err(ReconcileError::Config(format!(
                    "reconciler.max_quote_age_secs must be <= {MAX_QUOTE_AGE_SECS}, got {age}"
                )));
            }
        }
        if let Some(t) = self.matching.threshold {
            unit("matching.threshold", t)?;
        }
        if let Some(h) = self.matching.time_threshold_hours {
            hours("matching.time_threshold_hours", h)?;
        }
        for (key, sport) in &self.matching.sports {
            parse_sport_key(key)?;
            if let Some(t) = sport.threshold {
                unit(&format!("matching.sports.{key}.threshold"), t)?;
            }
            if let Some(h) = sport.time_threshold_hours {
                hours(&format!("matching.sports.{key}.time_threshold_hours"), h)?;
            }
        }
        for (key, edge) in &self.opportunity.sports {
            parse_sport_key(key)?;
            unit(&format!("opportunity.sports.{key}"), *edge)?;
        }
        unit("opportunity.kelly_cap", self.opportunity.kelly_cap)?;
        if let Some(c) = self.opportunity.min_confidence {
            unit("opportunity.min_confidence", c)?;
        }
        for (provider, rate) in std::iter::once(("default", &self.fees.default))
            .chain(self.fees.providers.iter().map(|(k, v)| (k.as_str(), v)))
        {
            if !rate.is_finite() || *rate < 0.0 {
                return Err(ReconcileError::Config(format!(
                    "fees.{provider}: {}",
                    ReconcileError::InvalidFeeRate(*rate)
                )));
            }
        }
        Ok(())
    }

    pub fn match_config(&self) -> MatchConfig {
        let mut config = MatchConfig::default();
        if let Some(t) = self.matching.threshold {
            config.default_threshold = t;
        }
        if let Some(h) = self.matching.time_threshold_hours {
            config.default_time_threshold_hours = h;
        }
        for (key, overrides) in &self.matching.sports {
            let Ok(sport) = parse_sport_key(key) else { continue };
            let entry = config.sports.entry(sport).or_insert(SportMatchConfig {
                threshold: config.default_threshold,
                time_threshold_hours: config.default_time_threshold_hours,
            });
            if let Some(t) = overrides.threshold {
                entry.threshold = t;
            }
            if let Some(h) = overrides.time_threshold_hours {
                entry.time_threshold_hours = h;
            }
        }
        config
    }

    pub fn fee_schedule(&self) -> FeeSchedule {
        FeeSchedule::new(self.fees.default, self.fees.providers.clone())
    }

    pub fn edge_config(&self) -> EdgeConfig {
        let mut config = EdgeConfig::default();
        if let Some(e) = self.opportunity.min_edge {
            config.default_min_edge = e;
        }
        for (key, edge) in &self.opportunity.sports {
            if let Ok(sport) = parse_sport_key(key) {
                config.sports.insert(sport, *edge);
            }
        }
        config.reference_provider = self.opportunity.reference_provider.clone();
        if let Some(c) = self.opportunity.min_confidence {
            config.min_confidence = c;
        }
        config
    }

    pub fn kelly_config(&self) -> KellyConfig {
        KellyConfig {
            cap: self.opportunity.kelly_cap,
        }
    }

    pub fn max_quote_age(&self) -> Option<Duration> {
        self.reconciler
            .max_quote_age_secs
            .map(|s| Duration::seconds(s.min(MAX_QUOTE_AGE_SECS) as i64))
    }

    /// Providers switched on in config.
    pub fn enabled_providers(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.providers.iter().filter(|p| p.enabled)
    }
}

fn parse_sport_key(key: &str) -> Result<Sport, ReconcileError> {
    key.parse::<Sport>()
        .map_err(|_| ReconcileError::Config(format!("unknown sport: {key}")))
}
