//! Deduplication and merge.
//!
//! Folds provider-tagged `EventRecord`s into `CanonicalEvent`s. Clustering
//! is greedy complete-linkage: a record joins the existing event whose
//! *weakest* member match is strongest, provided every member matches it
//! at or above the sport threshold and its provider is not already in the
//! event. Otherwise it founds a new event.
//!
//! Ties between equally good events go to the earliest-created one, so the
//! grouping can depend on input order when a record sits exactly between
//! two events. The complete-linkage rule still guarantees that no two
//! records below threshold ever share an event, whatever the order.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, info};

use crate::matching::{MatchProfile, Matcher};
use crate::odds::{normalize_quote, FeeSchedule};
use crate::types::{BetKind, EventRecord, PriceQuote, Sport};

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Identity of a canonical event.
///
/// `seq` separates distinct events that derive the same key in one pass
/// (doubleheaders, or unrelated teams sharing a synthetic code). Only
/// `merge_events` may bump it, when batches from separate passes collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    pub sport: Option<Sport>,
    pub home: String,
    pub away: String,
    pub date: Option<NaiveDate>,
    pub seq: u32,
}

impl EventKey {
    /// Same key apart from `seq`.
    fn same_base(&self, other: &EventKey) -> bool {
        self.sport == other.sport
            && self.home == other.home
            && self.away == other.away
            && self.date == other.date
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sport {
            Some(sport) => write!(f, "{sport}:")?,
            None => write!(f, "ANY:")?,
        }
        write!(f, "{}@{}:", self.away, self.home)?;
        match self.date {
            Some(date) => write!(f, "{date}")?,
            None => write!(f, "undated")?,
        }
        if self.seq > 1 {
            write!(f, "#{}", self.seq)?;
        }
        Ok(())
    }
}

impl Serialize for EventKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

type BaseKey = (Option<Sport>, String, String, Option<NaiveDate>);

/// At most one live quote per provider and bet kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuoteKey {
    pub provider: String,
    pub kind: BetKind,
}

// ---------------------------------------------------------------------------
// Canonical event
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Member {
    provider: String,
    profile: MatchProfile,
}

/// The merged view of one real-world event across providers.
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalEvent {
    key: EventKey,
    sport: Option<Sport>,
    home: String,
    away: String,
    start_time: Option<DateTime<Utc>>,
    venue: Option<String>,
    status: Option<String>,
    /// Weakest pairwise match confidence among members (1.0 when alone).
    confidence: f64,
    provider_ids: BTreeMap<String, String>,
    #[serde(serialize_with = "quotes_as_list")]
    quotes: BTreeMap<QuoteKey, PriceQuote>,
    #[serde(skip)]
    members: Vec<Member>,
}

fn quotes_as_list<S: Serializer>(
    quotes: &BTreeMap<QuoteKey, PriceQuote>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(quotes.values())
}

impl CanonicalEvent {
    pub fn key(&self) -> &EventKey {
        &self.key
    }

    pub fn sport(&self) -> Option<Sport> {
        self.sport
    }

    /// Canonical home team code.
    pub fn home(&self) -> &str {
        &self.home
    }

    /// Canonical away team code.
    pub fn away(&self) -> &str {
        &self.away
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn venue(&self) -> Option<&str> {
        self.venue.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Provider name -> that provider's event id.
    pub fn provider_ids(&self) -> &BTreeMap<String, String> {
        &self.provider_ids
    }

    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.provider_ids.keys().map(String::as_str)
    }

    pub fn has_provider(&self, provider: &str) -> bool {
        self.provider_ids.contains_key(provider)
    }

    /// All live quotes, ordered by provider then bet kind.
    pub fn quotes(&self) -> impl Iterator<Item = &PriceQuote> {
        self.quotes.values()
    }

    /// Live quotes of one bet kind, ordered by provider.
    pub fn quotes_for(&self, kind: BetKind) -> impl Iterator<Item = &PriceQuote> {
        self.quotes.values().filter(move |q| q.kind == kind)
    }

    pub fn quote(&self, provider: &str, kind: BetKind) -> Option<&PriceQuote> {
        self.quotes.get(&QuoteKey {
            provider: provider.to_string(),
            kind,
        })
    }

    /// Number of provider records folded into this event.
    pub fn record_count(&self) -> usize {
        self.members.len()
    }

    fn found(key: EventKey, record: &EventRecord, profile: MatchProfile) -> Self {
        let mut event = Self {
            sport: record.sport,
            home: profile.home.code.clone(),
            away: profile.away.code.clone(),
            start_time: None,
            venue: None,
            status: None,
            confidence: 1.0,
            provider_ids: BTreeMap::new(),
            quotes: BTreeMap::new(),
            members: Vec::new(),
            key,
        };
        event.absorb_metadata(record);
        event.provider_ids.insert(record.provider.clone(), record.provider_id.clone());
        event.members.push(Member {
            provider: record.provider.clone(),
            profile,
        });
        event
    }

    /// Fill empty metadata fields; present values are never overwritten.
    fn absorb_metadata(&mut self, record: &EventRecord) {
        if self.sport.is_none() {
            self.sport = record.sport;
        }
        if self.start_time.is_none() {
            self.start_time = record.start_time;
        }
        if self.venue.is_none() {
            self.venue = record.venue.clone();
        }
        if self.status.is_none() {
            self.status = record.status.clone();
        }
    }

    fn overlay_quote(&mut self, quote: PriceQuote) {
        let key = QuoteKey {
            provider: quote.provider.clone(),
            kind: quote.kind,
        };
        self.quotes.insert(key, quote);
    }

    /// Fold another event into this one, keeping this event's key.
    fn absorb_event(&mut self, other: CanonicalEvent, confidence: f64) {
        if self.sport.is_none() {
            self.sport = other.sport;
        }
        if self.start_time.is_none() {
            self.start_time = other.start_time;
        }
        if self.venue.is_none() {
            self.venue = other.venue;
        }
        if self.status.is_none() {
            self.status = other.status;
        }
        self.confidence = self.confidence.min(other.confidence).min(confidence);
        self.provider_ids.extend(other.provider_ids);
        for (_, quote) in other.quotes {
            self.overlay_quote(quote);
        }
        self.members.extend(other.members);
    }
}

impl fmt::Display for CanonicalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} providers, {} quotes)",
            self.key,
            self.provider_ids.len(),
            self.quotes.len()
        )
    }
}

// ---------------------------------------------------------------------------
// Merge engine
// ---------------------------------------------------------------------------

/// Counters for one merge pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub records_in: usize,
    /// Records whose home and away resolve to the same team.
    pub records_rejected: usize,
    /// Quotes with no valid leg left.
    pub quotes_dropped: usize,
    /// Individual legs discarded during normalization.
    pub legs_dropped: usize,
    /// Records kept out of a matching event because their provider was
    /// already in it.
    pub provider_conflicts: usize,
    pub events_out: usize,
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub events: Vec<CanonicalEvent>,
    pub stats: MergeStats,
}

/// Clusters records into canonical events.
#[derive(Debug, Clone)]
pub struct MergeEngine {
    matcher: Matcher,
    fees: FeeSchedule,
}

/// How a candidate relates to an existing event.
enum Fit {
    /// Every member matches; carries the weakest confidence.
    Match(f64),
    /// Would match, but the provider is already present.
    ProviderConflict,
    NoMatch,
}

impl MergeEngine {
    pub fn new(matcher: Matcher, fees: FeeSchedule) -> Self {
        Self { matcher, fees }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Merge one pass worth of provider records.
    pub fn merge_all(&self, records: &[EventRecord]) -> MergeOutcome {
        let mut events: Vec<CanonicalEvent> = Vec::new();
        let mut stats = MergeStats {
            records_in: records.len(),
            ..MergeStats::default()
        };
        let mut key_counts: HashMap<BaseKey, u32> = HashMap::new();

        for record in records {
            let profile = self.matcher.profile(record);
            if profile.home.same_team(&profile.away) {
                debug!(record = %record, code = %profile.home.code, "Home and away are the same team, rejected");
                stats.records_rejected += 1;
                continue;
            }

            let mut quotes = Vec::with_capacity(record.quotes.len());
            for raw in &record.quotes {
                let normalized = normalize_quote(&record.provider, raw, &self.fees);
                stats.legs_dropped += normalized.dropped_legs;
                match normalized.quote {
                    Some(q) => quotes.push(q),
                    None => stats.quotes_dropped += 1,
                }
            }

            let mut best: Option<(usize, f64)> = None;
            let mut conflicted = false;
            for (idx, event) in events.iter().enumerate() {
                let providers = [record.provider.as_str()];
                let profiles = [&profile];
                match self.fit(event, &providers, &profiles) {
                    Fit::Match(confidence) => {
                        if best.map_or(true, |(_, c)| confidence > c) {
                            best = Some((idx, confidence));
                        }
                    }
                    Fit::ProviderConflict => conflicted = true,
                    Fit::NoMatch => {}
                }
            }

            match best {
                Some((idx, confidence)) => {
                    let event = &mut events[idx];
                    debug!(
                        record = %record,
                        event = %event.key,
                        confidence,
                        "Record merged into existing event"
                    );
                    event.absorb_metadata(record);
                    event.confidence = event.confidence.min(confidence);
                    event
                        .provider_ids
                        .insert(record.provider.clone(), record.provider_id.clone());
                    event.members.push(Member {
                        provider: record.provider.clone(),
                        profile,
                    });
                    for q in quotes {
                        event.overlay_quote(q);
                    }
                }
                None => {
                    if conflicted {
                        stats.provider_conflicts += 1;
                    }
                    let base = (
                        record.sport,
                        profile.home.code.clone(),
                        profile.away.code.clone(),
                        profile.date,
                    );
                    let seq = key_counts.entry(base.clone()).or_insert(0);
                    *seq += 1;
                    let key = EventKey {
                        sport: base.0,
                        home: base.1,
                        away: base.2,
                        date: base.3,
                        seq: *seq,
                    };
                    debug!(record = %record, event = %key, "New canonical event");
                    let mut event = CanonicalEvent::found(key, record, profile);
                    for q in quotes {
                        event.overlay_quote(q);
                    }
                    events.push(event);
                }
            }
        }

        stats.events_out = events.len();
        info!(
            records = stats.records_in,
            events = stats.events_out,
            rejected = stats.records_rejected,
            quotes_dropped = stats.quotes_dropped,
            conflicts = stats.provider_conflicts,
            "Merge pass complete"
        );
        MergeOutcome { events, stats }
    }

    /// Re-merge already merged events, treating each as an indivisible unit.
    ///
    /// Uses the same complete-linkage rule as `merge_all`, so feeding it the
    /// output of `merge_all` changes nothing.
    pub fn merge_events(&self, events: Vec<CanonicalEvent>) -> MergeOutcome {
        let mut stats = MergeStats {
            records_in: events.iter().map(CanonicalEvent::record_count).sum(),
            ..MergeStats::default()
        };
        let mut merged: Vec<CanonicalEvent> = Vec::new();

        for event in events {
            let providers: Vec<&str> = event.members.iter().map(|m| m.provider.as_str()).collect();
            let profiles: Vec<&MatchProfile> = event.members.iter().map(|m| &m.profile).collect();

            let mut best: Option<(usize, f64)> = None;
            let mut conflicted = false;
            for (idx, existing) in merged.iter().enumerate() {
                match self.fit(existing, &providers, &profiles) {
                    Fit::Match(confidence) => {
                        if best.map_or(true, |(_, c)| confidence > c) {
                            best = Some((idx, confidence));
                        }
                    }
                    Fit::ProviderConflict => conflicted = true,
                    Fit::NoMatch => {}
                }
            }

            match best {
                Some((idx, confidence)) => {
                    debug!(
                        event = %event.key,
                        into = %merged[idx].key,
                        confidence,
                        "Events merged"
                    );
                    merged[idx].absorb_event(event, confidence);
                }
                None => {
                    if conflicted {
                        stats.provider_conflicts += 1;
                    }
                    let mut event = event;
                    if merged.iter().any(|e| e.key == event.key) {
                        let seq = merged
                            .iter()
                            .filter(|e| e.key.same_base(&event.key))
                            .map(|e| e.key.seq)
                            .max()
                            .unwrap_or(0)
                            + 1;
                        debug!(event = %event.key, seq, "Key taken, re-sequenced");
                        event.key.seq = seq;
                    }
                    merged.push(event);
                }
            }
        }

        stats.events_out = merged.len();
        MergeOutcome {
            events: merged,
            stats,
        }
    }

    /// Complete-linkage fit of a candidate group against an event.
    fn fit(&self, event: &CanonicalEvent, providers: &[&str], profiles: &[&MatchProfile]) -> Fit {
        let mut weakest = f64::INFINITY;
        for candidate in profiles {
            for member in &event.members {
                let result = self.matcher.compare(candidate, &member.profile);
                if !result.is_match() {
                    return Fit::NoMatch;
                }
                weakest = weakest.min(result.confidence);
            }
        }
        if providers.iter().any(|p| event.has_provider(p)) {
            return Fit::ProviderConflict;
        }
        Fit::Match(weakest)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aliases::AliasTable;
    use crate::matching::{MatchConfig, SportMatchConfig};
    use crate::types::{Price, RawQuote, Side};
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn engine() -> MergeEngine {
        let matcher = Matcher::new(Arc::new(AliasTable::builtin()), MatchConfig::default());
        MergeEngine::new(matcher, FeeSchedule::default())
    }

    fn kickoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 8, 0, 20, 0).unwrap()
    }

    fn moneyline(home: i32, away: i32) -> RawQuote {
        RawQuote {
            kind: BetKind::Moneyline,
            line: None,
            prices: [(Side::Home, Price::American(home)), (Side::Away, Price::American(away))]
                .into_iter()
                .collect(),
            observed_at: kickoff() - Duration::hours(2),
        }
    }

    fn make_record(provider: &str, id: &str, home: &str, away: &str) -> EventRecord {
        EventRecord {
            provider: provider.to_string(),
            provider_id: id.to_string(),
            sport: Some(Sport::Nfl),
            home_team: home.to_string(),
            away_team: away.to_string(),
            start_time: Some(kickoff()),
            event_date: None,
            venue: None,
            status: None,
            quotes: vec![moneyline(-110, -110)],
        }
    }

    #[test]
    fn test_same_event_from_two_providers_merges() {
        let mut a = make_record("book", "b-1", "Dallas Cowboys", "Philadelphia Eagles");
        a.venue = Some("AT&T Stadium".into());
        let mut b = make_record("exchange", "x-9", "Dallas", "Philadelphia");
        b.status = Some("scheduled".into());
        b.venue = Some("Somewhere Else".into());

        let out = engine().merge_all(&[a, b]);
        assert_eq!(out.events.len(), 1);
        let ev = &out.events[0];
        assert_eq!(ev.key().to_string(), "NFL:PHI@DAL:2025-09-08");
        assert_eq!(ev.home(), "DAL");
        assert_eq!(ev.provider_ids().len(), 2);
        assert_eq!(ev.provider_ids()["exchange"], "x-9");
        assert_eq!(ev.quotes().count(), 2);
        // Backfilled, never overwritten.
        assert_eq!(ev.venue(), Some("AT&T Stadium"));
        assert_eq!(ev.status(), Some("scheduled"));
        assert_eq!(ev.confidence(), 1.0);
    }

    #[test]
    fn test_different_events_stay_apart() {
        let a = make_record("book", "1", "Dallas Cowboys", "Philadelphia Eagles");
        let b = make_record("book", "2", "Buffalo Bills", "Baltimore Ravens");
        let c = make_record("exchange", "3", "Buffalo", "Baltimore");
        let out = engine().merge_all(&[a, b, c]);
        assert_eq!(out.events.len(), 2);
        assert_eq!(out.events[1].provider_ids().len(), 2);
    }

    #[test]
    fn test_self_match_record_rejected() {
        let a = make_record("book", "1", "Dallas Cowboys", "Dallas");
        let out = engine().merge_all(&[a]);
        assert!(out.events.is_empty());
        assert_eq!(out.stats.records_rejected, 1);
    }

    #[test]
    fn test_same_provider_twice_is_a_conflict() {
        let a = make_record("book", "1", "Dallas Cowboys", "Philadelphia Eagles");
        let b = make_record("book", "2", "Dallas", "Philadelphia");
        let out = engine().merge_all(&[a, b]);
        assert_eq!(out.events.len(), 2);
        assert_eq!(out.stats.provider_conflicts, 1);
        assert_eq!(out.events[0].key().seq, 1);
        assert_eq!(out.events[1].key().seq, 2);
        assert_eq!(out.events[1].key().to_string(), "NFL:PHI@DAL:2025-09-08#2");
    }

    #[test]
    fn test_quote_overlay_last_write_wins() {
        let mut a = make_record("book", "1", "Dallas Cowboys", "Philadelphia Eagles");
        a.quotes = vec![moneyline(-110, -110), moneyline(-120, 100)];
        let out = engine().merge_all(&[a]);
        let q = out.events[0].quote("book", BetKind::Moneyline).unwrap();
        assert_eq!(q.price(Side::Home), Some(-120));
        assert_eq!(out.events[0].quotes().count(), 1);
    }

    #[test]
    fn test_invalid_quotes_counted() {
        let mut a = make_record("book", "1", "Dallas Cowboys", "Philadelphia Eagles");
        a.quotes = vec![moneyline(0, 50), moneyline(-110, 20)];
        let out = engine().merge_all(&[a]);
        assert_eq!(out.stats.quotes_dropped, 1);
        assert_eq!(out.stats.legs_dropped, 3);
        assert_eq!(out.events[0].quotes().count(), 1);
    }

    #[test]
    fn test_complete_linkage_blocks_chaining() {
        let mut config = MatchConfig::default();
        config.sports.insert(
            Sport::Nfl,
            SportMatchConfig {
                threshold: 0.8,
                time_threshold_hours: 12.0,
            },
        );
        let m = MergeEngine::new(
            Matcher::new(Arc::new(AliasTable::builtin()), config),
            FeeSchedule::default(),
        );

        // b is close enough to a and to c, but a and c are too far apart.
        let a = make_record("p1", "1", "Dallas Cowboys", "Philadelphia Eagles");
        let mut b = make_record("p2", "2", "Dallas Cowboys", "Philadelphia Eagles");
        let mut c = make_record("p3", "3", "Dallas Cowboys", "Philadelphia Eagles");
        b.start_time = Some(kickoff() + Duration::hours(5));
        c.start_time = Some(kickoff() + Duration::hours(10));
        assert!(m.matcher().is_same_event(&a, &b));
        assert!(m.matcher().is_same_event(&b, &c));
        assert!(!m.matcher().is_same_event(&a, &c));

        let out = m.merge_all(&[a, b, c]);
        assert_eq!(out.events.len(), 2);
        assert_eq!(out.events[0].record_count(), 2);
        assert!(out.events[0].confidence() < 1.0);
    }

    #[test]
    fn test_merge_events_is_idempotent() {
        let records = vec![
            make_record("book", "1", "Dallas Cowboys", "Philadelphia Eagles"),
            make_record("exchange", "2", "Dallas", "Philadelphia"),
            make_record("book", "3", "Buffalo Bills", "Baltimore Ravens"),
            make_record("p2p", "4", "Buffalo", "Baltimore"),
            make_record("book", "5", "Dallas", "Philadelphia"),
        ];
        let m = engine();
        let first = m.merge_all(&records);
        let keys: Vec<String> = first.events.iter().map(|e| e.key().to_string()).collect();

        let second = m.merge_events(first.events.clone());
        let again: Vec<String> = second.events.iter().map(|e| e.key().to_string()).collect();
        assert_eq!(keys, again);
        assert_eq!(second.stats.records_in, 5);
        for (x, y) in first.events.iter().zip(&second.events) {
            assert_eq!(x.provider_ids(), y.provider_ids());
        }
    }

    #[test]
    fn test_merge_events_joins_split_batches() {
        let m = engine();
        let left = m.merge_all(&[make_record("book", "1", "Dallas Cowboys", "Philadelphia Eagles")]);
        let right = m.merge_all(&[make_record("exchange", "2", "Dallas", "Philadelphia")]);
        let mut all = left.events;
        all.extend(right.events);

        let out = m.merge_events(all);
        assert_eq!(out.events.len(), 1);
        assert_eq!(out.events[0].record_count(), 2);
        assert_eq!(out.events[0].quotes().count(), 2);
    }

    #[test]
    fn test_merge_events_keeps_keys_unique() {
        let m = engine();
        // Two passes each see one Dallas listing from the same provider.
        let left = m.merge_all(&[make_record("book", "1", "Dallas Cowboys", "Philadelphia Eagles")]);
        let right = m.merge_all(&[make_record("book", "2", "Dallas", "Philadelphia")]);
        assert_eq!(left.events[0].key(), right.events[0].key());
        let mut all = left.events;
        all.extend(right.events);

        let out = m.merge_events(all);
        assert_eq!(out.events.len(), 2);
        assert_eq!(out.stats.provider_conflicts, 1);
        assert_eq!(out.events[0].key().seq, 1);
        assert_eq!(out.events[1].key().seq, 2);
        assert_eq!(out.events[1].key().to_string(), "NFL:PHI@DAL:2025-09-08#2");

        // Re-merging the result changes nothing.
        let again = m.merge_events(out.events.clone());
        let keys: Vec<&EventKey> = out.events.iter().map(CanonicalEvent::key).collect();
        let again_keys: Vec<&EventKey> = again.events.iter().map(CanonicalEvent::key).collect();
        assert_eq!(keys, again_keys);
    }

    #[test]
    fn test_serializes_quotes_as_list() {
        let out = engine().merge_all(&[make_record("book", "1", "Dallas Cowboys", "Philadelphia Eagles")]);
        let json = serde_json::to_value(&out.events[0]).unwrap();
        assert_eq!(json["key"], "NFL:PHI@DAL:2025-09-08");
        assert!(json["quotes"].is_array());
        assert!(json.get("members").is_none());
    }
}
