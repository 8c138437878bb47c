//! Identity resolution.
//!
//! Scores pairs of provider records and decides whether they describe the
//! same real-world event. The confidence is a weighted blend of team,
//! start-time and date agreement; the acceptance threshold and the time
//! window are per sport.

pub mod similarity;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::aliases::{normalize_name, AliasTable, Resolution, ResolutionKind};
use crate::types::{EventRecord, Sport};
use similarity::lcs_ratio;

// Weights in tenths so a perfect match sums to exactly 1.0.
const TEAM_WEIGHT: f64 = 6.0;
const TIME_WEIGHT: f64 = 3.0;
const DATE_WEIGHT: f64 = 1.0;

/// Unknown time or date scores halfway.
const UNKNOWN_SCORE: f64 = 0.5;

/// Start times this close count as identical.
const SAME_TIME_MINUTES: i64 = 15;

const TEAM_EXACT_SCORE: f64 = 0.9;
const TEAM_FUZZY_SCORE: f64 = 0.7;
const TIME_PROXIMITY_HOURS: i64 = 1;

/// Largest accepted time window: one year.
pub const MAX_TIME_THRESHOLD_HOURS: f64 = 24.0 * 366.0;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Per-sport matching parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SportMatchConfig {
    /// Minimum confidence to accept a match.
    pub threshold: f64,
    /// Start times this far apart score zero on time proximity.
    pub time_threshold_hours: f64,
}

/// Matching configuration (defaults overridden by config.toml at runtime).
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub default_threshold: f64,
    pub default_time_threshold_hours: f64,
    pub sports: HashMap<Sport, SportMatchConfig>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        let sports = [
            (Sport::Mlb, 0.4, 6.0),
            (Sport::Nfl, 0.5, 12.0),
            (Sport::Nba, 0.5, 8.0),
            (Sport::Nhl, 0.5, 8.0),
            (Sport::Ncaaf, 0.6, 12.0),
            (Sport::Ncaab, 0.6, 8.0),
        ]
        .into_iter()
        .map(|(sport, threshold, hours)| {
            (
                sport,
                SportMatchConfig {
                    threshold,
                    time_threshold_hours: hours,
                },
            )
        })
        .collect();

        Self {
            default_threshold: 0.4,
            default_time_threshold_hours: 96.0,
            sports,
        }
    }
}

impl MatchConfig {
    /// Acceptance threshold for a sport (fallback when unknown).
    pub fn threshold_for(&self, sport: Option<Sport>) -> f64 {
        sport
            .and_then(|s| self.sports.get(&s))
            .map(|c| c.threshold)
            .unwrap_or(self.default_threshold)
    }

    /// Time window for a sport, clamped to `[0, MAX_TIME_THRESHOLD_HOURS]`.
    /// NaN clamps to the maximum.
    pub fn time_threshold_for(&self, sport: Option<Sport>) -> Duration {
        let hours = sport
            .and_then(|s| self.sports.get(&s))
            .map(|c| c.time_threshold_hours)
            .unwrap_or(self.default_time_threshold_hours)
            .min(MAX_TIME_THRESHOLD_HOURS)
            .max(0.0);
        Duration::seconds((hours * 3600.0).round() as i64)
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Audit tag recorded for a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchCriterion {
    DateMatch,
    TeamExactMatch,
    TeamFuzzyMatch,
    TimeProximity,
}

impl fmt::Display for MatchCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchCriterion::DateMatch => write!(f, "date_match"),
            MatchCriterion::TeamExactMatch => write!(f, "team_exact_match"),
            MatchCriterion::TeamFuzzyMatch => write!(f, "team_fuzzy_match"),
            MatchCriterion::TimeProximity => write!(f, "time_proximity"),
        }
    }
}

/// Outcome of comparing two records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Weighted confidence in [0, 1].
    pub confidence: f64,
    pub criteria: BTreeSet<MatchCriterion>,
    pub team_score: f64,
    pub time_score: f64,
    pub date_score: f64,
    /// Threshold the confidence was judged against.
    pub threshold: f64,
}

impl MatchResult {
    fn sport_conflict(threshold: f64) -> Self {
        Self {
            confidence: 0.0,
            criteria: BTreeSet::new(),
            team_score: 0.0,
            time_score: 0.0,
            date_score: 0.0,
            threshold,
        }
    }

    /// Whether the two records are the same event.
    pub fn is_match(&self) -> bool {
        self.confidence >= self.threshold
    }
}

// ---------------------------------------------------------------------------
// Record profiles
// ---------------------------------------------------------------------------

/// A team name resolved once for repeated comparison.
#[derive(Debug, Clone)]
pub struct TeamProfile {
    pub code: String,
    pub kind: ResolutionKind,
    /// Normalized raw name, for fuzzy comparison.
    pub name: String,
}

impl TeamProfile {
    fn new(raw: &str, resolution: Resolution) -> Self {
        Self {
            code: resolution.code,
            kind: resolution.kind,
            name: normalize_name(raw),
        }
    }

    /// Same team by code. Synthetic codes also need equal names.
    pub fn same_team(&self, other: &TeamProfile) -> bool {
        if self.kind == ResolutionKind::Synthetic || other.kind == ResolutionKind::Synthetic {
            self.code == other.code && self.name == other.name
        } else {
            self.code == other.code
        }
    }

    fn similarity(&self, other: &TeamProfile) -> f64 {
        if self.same_team(other) {
            1.0
        } else {
            lcs_ratio(&self.name, &other.name)
        }
    }
}

/// The matching-relevant view of an `EventRecord`.
#[derive(Debug, Clone)]
pub struct MatchProfile {
    pub sport: Option<Sport>,
    pub home: TeamProfile,
    pub away: TeamProfile,
    pub start_time: Option<DateTime<Utc>>,
    pub date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

/// Scores record pairs against the shared alias table.
#[derive(Debug, Clone)]
pub struct Matcher {
    aliases: Arc<AliasTable>,
    config: MatchConfig,
}

impl Matcher {
    pub fn new(aliases: Arc<AliasTable>, config: MatchConfig) -> Self {
        Self { aliases, config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Resolve a record's teams once.
    pub fn profile(&self, record: &EventRecord) -> MatchProfile {
        let resolve = |raw: &str| {
            TeamProfile::new(raw, self.aliases.resolve(raw, record.sport))
        };
        MatchProfile {
            sport: record.sport,
            home: resolve(&record.home_team),
            away: resolve(&record.away_team),
            start_time: record.start_time,
            date: record.date(),
        }
    }

    /// Confidence that two records denote the same event.
    pub fn match_confidence(&self, a: &EventRecord, b: &EventRecord) -> MatchResult {
        self.compare(&self.profile(a), &self.profile(b))
    }

    /// Whether two records denote the same event.
    pub fn is_same_event(&self, a: &EventRecord, b: &EventRecord) -> bool {
        self.match_confidence(a, b).is_match()
    }

    /// Compare two prepared profiles. Symmetric in its arguments.
    pub fn compare(&self, a: &MatchProfile, b: &MatchProfile) -> MatchResult {
        let sport = a.sport.or(b.sport);
        let threshold = self.config.threshold_for(sport);

        if let (Some(sa), Some(sb)) = (a.sport, b.sport) {
            if sa != sb {
                return MatchResult::sport_conflict(threshold);
            }
        }

        let team_score = team_similarity(a, b);
        let time_diff = match (a.start_time, b.start_time) {
            (Some(ta), Some(tb)) => Some(if ta >= tb { ta - tb } else { tb - ta }),
            _ => None,
        };
        let time_score = time_score(time_diff, self.config.time_threshold_for(sport));
        let date_score = match (a.date, b.date) {
            (Some(da), Some(db)) if da == db => 1.0,
            (Some(_), Some(_)) => 0.0,
            _ => UNKNOWN_SCORE,
        };

        let confidence = ((TEAM_WEIGHT * team_score + TIME_WEIGHT * time_score
            + DATE_WEIGHT * date_score)
            / 10.0)
            .clamp(0.0, 1.0);

        let mut criteria = BTreeSet::new();
        if date_score == 1.0 {
            criteria.insert(MatchCriterion::DateMatch);
        }
        if team_score >= TEAM_EXACT_SCORE {
            criteria.insert(MatchCriterion::TeamExactMatch);
        } else if team_score >= TEAM_FUZZY_SCORE {
            criteria.insert(MatchCriterion::TeamFuzzyMatch);
        }
        if time_diff.is_some_and(|d| d < Duration::hours(TIME_PROXIMITY_HOURS)) {
            criteria.insert(MatchCriterion::TimeProximity);
        }

        MatchResult {
            confidence,
            criteria,
            team_score,
            time_score,
            date_score,
            threshold,
        }
    }
}

/// Team agreement in [0, 1], allowing home/away to be swapped.
fn team_similarity(a: &MatchProfile, b: &MatchProfile) -> f64 {
    let direct = a.home.same_team(&b.home) && a.away.same_team(&b.away);
    let reversed = a.home.same_team(&b.away) && a.away.same_team(&b.home);
    if direct || reversed {
        return 1.0;
    }

    let direct = (a.home.similarity(&b.home) + a.away.similarity(&b.away)) / 2.0;
    let reversed = (a.home.similarity(&b.away) + a.away.similarity(&b.home)) / 2.0;
    direct.max(reversed)
}

/// Start-time agreement: full marks within 15 minutes, then linear decay
/// to zero at the sport's time window.
fn time_score(diff: Option<Duration>, window: Duration) -> f64 {
    let Some(diff) = diff else {
        return UNKNOWN_SCORE;
    };
    if diff < Duration::minutes(SAME_TIME_MINUTES) {
        return 1.0;
    }
    if window <= Duration::zero() || diff >= window {
        return 0.0;
    }
    1.0 - diff.num_seconds() as f64 / window.num_seconds() as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
