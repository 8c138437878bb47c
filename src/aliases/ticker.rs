//! Coded exchange tickers.
//!
//! Exchange event tickers concatenate both team codes without a
//! separator, e.g. `KXNFLGAME-25SEP07BALBUF` (Baltimore at Buffalo on
//! 2025-09-07). Codes are 2-5 characters long, so the split point has to
//! be inferred from the alias table.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::AliasTable;
use crate::types::Sport;

/// Which rule produced a ticker split, from most to least trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    /// 3+3 split with both halves known.
    FixedPair,
    /// Variable split with both halves known.
    VariablePair,
    /// Only the leading code is known.
    KnownPrefix,
    /// Only the trailing code is known.
    KnownSuffix,
    /// Nothing known; split down the middle.
    EvenBisect,
}

/// Away and home codes recovered from a combined ticker code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerSplit {
    pub away: String,
    pub home: String,
    pub method: SplitMethod,
}

/// A parsed event ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTicker {
    pub series: String,
    pub date: NaiveDate,
    pub teams: TickerSplit,
    /// Market suffix naming the outcome, e.g. `BUF` in `...BALBUF-BUF`.
    pub outcome: Option<String>,
}

impl AliasTable {
    /// Split a concatenated `AWAYHOME` code into canonical team codes.
    ///
    /// Rules, first hit wins:
    /// 1. a six-character code whose halves are both known;
    /// 2. any split (longest prefix first) whose halves are both known;
    /// 3. the longest known prefix or suffix, the remainder kept as-is;
    /// 4. even bisection.
    ///
    /// Every part is at least two characters when the input allows it.
    pub fn split_ticker_code(&self, combined: &str, sport: Option<Sport>) -> TickerSplit {
        let chars: Vec<char> = combined
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_uppercase)
            .collect();
        let n = chars.len();
        let part = |from: usize, to: usize| -> String { chars[from..to].iter().collect() };
        let known = |code: &str| self.lookup_exact(code, sport);

        if n < 4 {
            return bisect(&chars);
        }

        if n == 6 {
            if let (Some(away), Some(home)) = (known(&part(0, 3)), known(&part(3, 6))) {
                return TickerSplit {
                    away,
                    home,
                    method: SplitMethod::FixedPair,
                };
            }
        }

        for i in (2..=n - 2).rev() {
            if let (Some(away), Some(home)) = (known(&part(0, i)), known(&part(i, n))) {
                return TickerSplit {
                    away,
                    home,
                    method: SplitMethod::VariablePair,
                };
            }
        }

        let prefix = (2..=n - 2)
            .rev()
            .find_map(|i| known(&part(0, i)).map(|code| (i, code)));
        let suffix = (2..=n - 2)
            .find_map(|i| known(&part(i, n)).map(|code| (n - i, code)));

        let split = match (prefix, suffix) {
            (Some((plen, away)), Some((slen, _))) if plen >= slen => TickerSplit {
                away,
                home: part(plen, n),
                method: SplitMethod::KnownPrefix,
            },
            (_, Some((slen, home))) => TickerSplit {
                away: part(0, n - slen),
                home,
                method: SplitMethod::KnownSuffix,
            },
            (Some((plen, away)), None) => TickerSplit {
                away,
                home: part(plen, n),
                method: SplitMethod::KnownPrefix,
            },
            (None, None) => bisect(&chars),
        };
        debug!(combined, away = %split.away, home = %split.home, method = ?split.method, "Ambiguous ticker split");
        split
    }

    /// Parse a full event ticker (`SERIES-YYMMMDDAWAYHOME[-OUTCOME]`).
    ///
    /// Returns `None` when the ticker has no recognisable date segment.
    pub fn parse_event_ticker(&self, ticker: &str, sport: Option<Sport>) -> Option<ParsedTicker> {
        let mut parts = ticker.trim().splitn(3, '-');
        let series = parts.next()?.to_uppercase();
        let event = parts.next()?;
        let outcome = parts
            .next()
            .map(|s| s.to_uppercase())
            .filter(|s| !s.is_empty());

        if event.len() < 8 || !event.is_char_boundary(7) {
            return None;
        }
        let date = parse_ticker_date(&event[..7])?;
        let teams = self.split_ticker_code(&event[7..], sport);

        Some(ParsedTicker {
            series,
            date,
            teams,
            outcome,
        })
    }
}

/// Parse a `YYMMMDD` ticker date, e.g. `25SEP07`.
pub fn parse_ticker_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 7 || !raw.is_ascii() {
        return None;
    }
    let year: i32 = raw[..2].parse().ok()?;
    let month = match raw[2..5].to_uppercase().as_str() {
        "JAN" => 1,
        "FEB" => 2,
        "MAR" => 3,
        "APR" => 4,
        "MAY" => 5,
        "JUN" => 6,
        "JUL" => 7,
        "AUG" => 8,
        "SEP" => 9,
        "OCT" => 10,
        "NOV" => 11,
        "DEC" => 12,
        _ => return None,
    };
    let day: u32 = raw[5..7].parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + year, month, day)
}

fn bisect(chars: &[char]) -> TickerSplit {
    let mid = chars.len() / 2;
    let or_unknown = |s: String| if s.is_empty() { "UNK".to_string() } else { s };
    TickerSplit {
        away: or_unknown(chars[..mid].iter().collect()),
        home: or_unknown(chars[mid..].iter().collect()),
        method: SplitMethod::EvenBisect,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
