//! Team alias resolution.
//!
//! A single versioned `AliasTable` maps free-text team names and coded
//! tickers to one canonical short code per sport. The table is built once
//! at start (built-in data, optionally extended from a TOML file) and
//! passed by reference to every consumer.
//!
//! Resolution never fails: unknown names degrade to a synthetic code.

pub mod teams;
pub mod ticker;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use tracing::{debug, info};

use crate::types::Sport;

pub use ticker::{ParsedTicker, SplitMethod, TickerSplit};

/// Version string of the built-in tables.
pub const BUILTIN_VERSION: &str = "builtin-2025.09";

/// Minimum length of the contained string for a substring match.
const MIN_SUBSTRING_LEN: usize = 4;

// ---------------------------------------------------------------------------
// Table entries
// ---------------------------------------------------------------------------

/// One team: its canonical code and the names it is known by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub code: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Which lookup step produced a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionKind {
    /// Exact (case-insensitive) match on an alias or code.
    Exact,
    /// One name contains the other.
    Substring,
    /// No table entry; code derived from the raw text.
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub code: String,
    pub kind: ResolutionKind,
}

#[derive(Debug, Clone)]
struct AliasKey {
    key: String,
    code: String,
}

/// Extension file layout:
///
/// ```toml
/// version = "local-1"
/// [teams]
/// nfl = [{ code = "WAS", aliases = ["Washington Football Team"] }]
/// ```
#[derive(Debug, Deserialize)]
struct AliasFile {
    version: Option<String>,
    #[serde(default)]
    teams: HashMap<String, Vec<TeamEntry>>,
}

// ---------------------------------------------------------------------------
// Alias table
// ---------------------------------------------------------------------------

/// Versioned per-sport team lookup.
#[derive(Debug, Clone)]
pub struct AliasTable {
    version: String,
    teams: BTreeMap<Sport, Vec<TeamEntry>>,
    index: BTreeMap<Sport, Vec<AliasKey>>,
}

impl AliasTable {
    /// An empty table.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            teams: BTreeMap::new(),
            index: BTreeMap::new(),
        }
    }

    /// The built-in tables for every supported league.
    pub fn builtin() -> Self {
        let mut table = Self::new(BUILTIN_VERSION);
        let leagues = [
            (Sport::Nfl, teams::NFL),
            (Sport::Nba, teams::NBA),
            (Sport::Mlb, teams::MLB),
            (Sport::Nhl, teams::NHL),
            (Sport::Ncaaf, teams::NCAAF),
            (Sport::Ncaab, teams::NCAAB),
        ];
        for (sport, rows) in leagues {
            for (code, aliases) in rows {
                table.add_team(
                    sport,
                    TeamEntry {
                        code: code.to_string(),
                        aliases: aliases.iter().map(|a| a.to_string()).collect(),
                    },
                );
            }
        }
        table
    }

    /// Built-in tables extended with an optional TOML file.
    pub fn load(extension: Option<&str>) -> Result<Self> {
        let mut table = Self::builtin();
        if let Some(path) = extension {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read alias file: {path}"))?;
            table
                .extend_from_toml(&contents)
                .with_context(|| format!("Failed to parse alias file: {path}"))?;
        }
        info!(
            version = %table.version,
            teams = table.teams.values().map(Vec::len).sum::<usize>(),
            "Alias table ready"
        );
        Ok(table)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Teams registered for a sport, in table order.
    pub fn teams(&self, sport: Sport) -> &[TeamEntry] {
        self.teams.get(&sport).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Register a team. Aliases of an existing code are appended to it.
    pub fn add_team(&mut self, sport: Sport, entry: TeamEntry) {
        let code = entry.code.trim().to_uppercase();
        let entries = self.teams.entry(sport).or_default();
        match entries.iter_mut().find(|e| e.code == code) {
            Some(existing) => {
                for alias in entry.aliases {
                    if !existing.aliases.contains(&alias) {
                        existing.aliases.push(alias);
                    }
                }
            }
            None => entries.push(TeamEntry {
                code,
                aliases: entry.aliases,
            }),
        }
        self.rebuild_index(sport);
    }

    /// Merge teams from an alias extension file.
    pub fn extend_from_toml(&mut self, contents: &str) -> Result<()> {
        let file: AliasFile = toml::from_str(contents)?;
        for (sport_name, entries) in file.teams {
            let sport: Sport = sport_name.parse()?;
            for entry in entries {
                self.add_team(sport, entry);
            }
        }
        if let Some(version) = file.version {
            self.version = format!("{}+{}", self.version, version);
        }
        Ok(())
    }

    fn rebuild_index(&mut self, sport: Sport) {
        let keys: Vec<AliasKey> = self
            .teams(sport)
            .iter()
            .flat_map(|entry| {
                std::iter::once(entry.code.as_str())
                    .chain(entry.aliases.iter().map(String::as_str))
                    .map(move |name| AliasKey {
                        key: normalize_name(name),
                        code: entry.code.clone(),
                    })
            })
            .filter(|k| !k.key.is_empty())
            .collect();
        self.index.insert(sport, keys);
    }

    fn keys<'a>(&'a self, sport: Option<Sport>) -> impl Iterator<Item = &'a AliasKey> + 'a {
        let sports: &'static [Sport] = match sport {
            Some(Sport::Nfl) => &[Sport::Nfl],
            Some(Sport::Nba) => &[Sport::Nba],
            Some(Sport::Mlb) => &[Sport::Mlb],
            Some(Sport::Nhl) => &[Sport::Nhl],
            Some(Sport::Ncaaf) => &[Sport::Ncaaf],
            Some(Sport::Ncaab) => &[Sport::Ncaab],
            None => Sport::ALL,
        };
        sports
            .iter()
            .filter_map(move |s| self.index.get(s))
            .flatten()
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Canonical code for a team name. Never empty.
    pub fn canonicalize(&self, raw: &str, sport: Option<Sport>) -> String {
        self.resolve(raw, sport).code
    }

    /// Canonical code plus the lookup step that produced it.
    ///
    /// 1. exact match on an alias or code (case-insensitive);
    /// 2. substring containment in either direction, the contained string
    ///    being at least four characters long (longest alias wins);
    /// 3. synthetic code from the first three alphanumeric characters.
    pub fn resolve(&self, raw: &str, sport: Option<Sport>) -> Resolution {
        let norm = normalize_name(raw);

        if let Some(code) = self.exact(&norm, sport) {
            return Resolution {
                code,
                kind: ResolutionKind::Exact,
            };
        }

        if let Some(code) = self.substring(&norm, sport) {
            debug!(raw, code = %code, "Team resolved by substring");
            return Resolution {
                code,
                kind: ResolutionKind::Substring,
            };
        }

        let code = synthetic_code(&norm);
        debug!(raw, code = %code, "Unknown team, using synthetic code");
        Resolution {
            code,
            kind: ResolutionKind::Synthetic,
        }
    }

    /// Code for an exact alias or code match only.
    pub fn lookup_exact(&self, raw: &str, sport: Option<Sport>) -> Option<String> {
        self.exact(&normalize_name(raw), sport)
    }

    fn exact(&self, norm: &str, sport: Option<Sport>) -> Option<String> {
        if norm.is_empty() {
            return None;
        }
        self.keys(sport)
            .find(|k| k.key == norm)
            .map(|k| k.code.clone())
    }

    fn substring(&self, norm: &str, sport: Option<Sport>) -> Option<String> {
        if norm.is_empty() {
            return None;
        }
        // Raw name contains a known alias: take the longest alias.
        let mut best: Option<&AliasKey> = None;
        for k in self.keys(sport) {
            if k.key.len() >= MIN_SUBSTRING_LEN
                && norm.contains(k.key.as_str())
                && best.map_or(true, |b| k.key.len() > b.key.len())
            {
                best = Some(k);
            }
        }
        if let Some(k) = best {
            return Some(k.code.clone());
        }
        // A known alias contains the raw name: first in table order.
        if norm.len() >= MIN_SUBSTRING_LEN {
            return self
                .keys(sport)
                .find(|k| k.key.contains(norm))
                .map(|k| k.code.clone());
        }
        None
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lowercase, punctuation to spaces, whitespace collapsed.
pub fn normalize_name(raw: &str) -> String {
    raw.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn synthetic_code(norm: &str) -> String {
    let code: String = norm
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    if code.is_empty() {
        "UNK".to_string()
    } else {
        code
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
