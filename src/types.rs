//! Shared types for the reconciliation pipeline.
//!
//! These types form the data model used across all modules. Provider
//! sources produce `EventRecord`s in their native price conventions; the
//! odds, merge, pricing and strategy modules only ever see the canonical
//! `PriceQuote` form.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// League an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sport {
    Nfl,
    Nba,
    Mlb,
    Nhl,
    Ncaaf,
    Ncaab,
}

impl Sport {
    /// All known sports, in alias lookup order.
    pub const ALL: &'static [Sport] = &[
        Sport::Nfl,
        Sport::Nba,
        Sport::Mlb,
        Sport::Nhl,
        Sport::Ncaaf,
        Sport::Ncaab,
    ];

    /// Lowercase key used in config tables (`[matching.sports.nfl]`).
    pub fn key(&self) -> &'static str {
        match self {
            Sport::Nfl => "nfl",
            Sport::Nba => "nba",
            Sport::Mlb => "mlb",
            Sport::Nhl => "nhl",
            Sport::Ncaaf => "ncaaf",
            Sport::Ncaab => "ncaab",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sport::Nfl => write!(f, "NFL"),
            Sport::Nba => write!(f, "NBA"),
            Sport::Mlb => write!(f, "MLB"),
            Sport::Nhl => write!(f, "NHL"),
            Sport::Ncaaf => write!(f, "NCAAF"),
            Sport::Ncaab => write!(f, "NCAAB"),
        }
    }
}

/// Parse a sport name (case-insensitive). Accepts a few common spellings.
impl std::str::FromStr for Sport {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nfl" | "americanfootball_nfl" => Ok(Sport::Nfl),
            "nba" | "basketball_nba" => Ok(Sport::Nba),
            "mlb" | "baseball_mlb" => Ok(Sport::Mlb),
            "nhl" | "icehockey_nhl" => Ok(Sport::Nhl),
            "ncaaf" | "cfb" | "americanfootball_ncaaf" => Ok(Sport::Ncaaf),
            "ncaab" | "cbb" | "basketball_ncaab" => Ok(Sport::Ncaab),
            _ => Err(anyhow::anyhow!("Unknown sport: {s}")),
        }
    }
}

/// Kind of wager a quote prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetKind {
    Moneyline,
    Spread,
    Total,
}

impl BetKind {
    pub const ALL: &'static [BetKind] = &[BetKind::Moneyline, BetKind::Spread, BetKind::Total];

    /// The two complementary sides priced by this kind of bet.
    pub fn sides(&self) -> [Side; 2] {
        match self {
            BetKind::Moneyline | BetKind::Spread => [Side::Home, Side::Away],
            BetKind::Total => [Side::Over, Side::Under],
        }
    }

    /// Whether quotes of this kind carry a line (points handicap or total).
    pub fn has_line(&self) -> bool {
        !matches!(self, BetKind::Moneyline)
    }
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetKind::Moneyline => write!(f, "moneyline"),
            BetKind::Spread => write!(f, "spread"),
            BetKind::Total => write!(f, "total"),
        }
    }
}

/// Outcome a price is offered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
    Over,
    Under,
}

impl Side {
    /// The complementary side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
            Side::Over => Side::Under,
            Side::Under => Side::Over,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Home => write!(f, "home"),
            Side::Away => write!(f, "away"),
            Side::Over => write!(f, "over"),
            Side::Under => write!(f, "under"),
        }
    }
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

/// A price in the convention its provider publishes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Price {
    /// Signed (American) odds, e.g. `-110` or `+130`.
    American(i32),
    /// Decimal multiplier odds, e.g. `1.91`.
    Decimal(f64),
    /// Exchange probability price in (0, 1), e.g. `0.45` for 45¢.
    Exchange(Decimal),
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::American(o) => write!(f, "{o:+}"),
            Price::Decimal(d) => write!(f, "{d:.3}"),
            Price::Exchange(p) => write!(f, "{}¢", p * Decimal::ONE_HUNDRED),
        }
    }
}

/// A quote as received from a provider, before normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuote {
    pub kind: BetKind,
    /// Points line for spread/total quotes (home handicap or total points).
    #[serde(default)]
    pub line: Option<Decimal>,
    pub prices: BTreeMap<Side, Price>,
    #[serde(default = "Utc::now")]
    pub observed_at: DateTime<Utc>,
}

/// A quote in canonical signed-odds form.
///
/// Every price present converts to an implied probability in (0, 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub provider: String,
    pub kind: BetKind,
    pub line: Option<Decimal>,
    pub prices: BTreeMap<Side, i32>,
    pub observed_at: DateTime<Utc>,
}

impl PriceQuote {
    /// Signed odds for one side, if the provider quoted it.
    pub fn price(&self, side: Side) -> Option<i32> {
        self.prices.get(&side).copied()
    }
}

impl fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.provider, self.kind)?;
        if let Some(line) = self.line {
            write!(f, " {line}")?;
        }
        for (side, odds) in &self.prices {
            write!(f, " {side}:{odds:+}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Event record
// ---------------------------------------------------------------------------

/// One provider's listing of one event. Immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Source platform name. Snapshot files may omit it; the source fills it in.
    #[serde(default)]
    pub provider: String,
    pub provider_id: String,
    #[serde(default)]
    pub sport: Option<Sport>,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// Calendar date for providers that publish no start time (coded tickers).
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub quotes: Vec<RawQuote>,
}

impl EventRecord {
    /// Effective event date: the explicit date, else the start time's UTC date.
    pub fn date(&self) -> Option<NaiveDate> {
        self.event_date
            .or_else(|| self.start_time.map(|t| t.date_naive()))
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} @ {}", self.provider, self.away_team, self.home_team)?;
        if let Some(sport) = self.sport {
            write!(f, " ({sport})")?;
        }
        match self.date() {
            Some(d) => write!(f, " on {d}"),
            None => write!(f, " (undated)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReconcileError {
    #[error("Invalid signed odds: {0} (must be <= -100 or >= +100)")]
    InvalidOdds(i32),

    #[error("Invalid probability: {0} (must be in (0, 1))")]
    InvalidProbability(f64),

    #[error("Invalid decimal odds: {0} (must be > 1.0)")]
    InvalidDecimalOdds(f64),

    #[error("Invalid exchange price: {0} (must be in (0, 1))")]
    InvalidExchangePrice(Decimal),

    #[error("Invalid fee rate: {0} (must be >= 0)")]
    InvalidFeeRate(f64),

    #[error("Provider fetch failed ({provider}): {message}")]
    ProviderFetch { provider: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
