//! Derived views over the synchronized collection.
//!
//! Everything here is a pure function of the collection slice: no caching,
//! no interior state. Equal inputs always give equal outputs, and the input
//! order (newest first) is preserved.

use std::fmt;
use std::str::FromStr;

use brandassoc_types::{Record, HIGH_SCORE_THRESHOLD, LOW_SCORE_THRESHOLD};
use thiserror::Error;

/// Score band of a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// Score >= 7.
    High,
    /// 4 <= score < 7.
    Medium,
    /// Score < 4.
    Low,
}

impl ScoreBand {
    /// Classify a score.
    pub fn of(score: i32) -> Self {
        if score >= HIGH_SCORE_THRESHOLD {
            Self::High
        } else if score >= LOW_SCORE_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Filter tab narrowing the list by score band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// No restriction.
    #[default]
    All,
    /// Only [`ScoreBand::High`].
    High,
    /// Only [`ScoreBand::Medium`].
    Medium,
    /// Only [`ScoreBand::Low`].
    Low,
}

impl Tab {
    /// Whether a score passes this tab.
    pub fn admits(self, score: i32) -> bool {
        match self {
            Self::All => true,
            Self::High => ScoreBand::of(score) == ScoreBand::High,
            Self::Medium => ScoreBand::of(score) == ScoreBand::Medium,
            Self::Low => ScoreBand::of(score) == ScoreBand::Low,
        }
    }

    /// Lowercase tab name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Unknown tab name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tab {0:?} (expected all, high, medium or low)")]
pub struct ParseTabError(String);

impl FromStr for Tab {
    type Err = ParseTabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParseTabError(s.to_string())),
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records matching `search_term` (case-insensitive substring of brand or
/// platform) AND admitted by `tab`, in collection order.
pub fn filter<'a>(collection: &'a [Record], search_term: &str, tab: Tab) -> Vec<&'a Record> {
    let needle = search_term.to_lowercase();
    collection
        .iter()
        .filter(|r| tab.admits(r.score))
        .filter(|r| {
            needle.is_empty()
                || r.brand.to_lowercase().contains(&needle)
                || r.platform.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Aggregate statistics over a collection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    /// Number of records.
    pub count: usize,
    /// Mean score; 0 for an empty collection.
    pub average_score: f64,
    /// Records with score >= 7.
    pub high_count: usize,
    /// Records with score < 4.
    pub low_count: usize,
}

/// Compute [`Stats`] over the whole (unfiltered) collection.
pub fn stats(collection: &[Record]) -> Stats {
    let count = collection.len();
    if count == 0 {
        return Stats::default();
    }

    let total: i64 = collection.iter().map(|r| i64::from(r.score)).sum();
    let (high_count, low_count) =
        collection
            .iter()
            .fold((0, 0), |(high, low), r| match ScoreBand::of(r.score) {
                ScoreBand::High => (high + 1, low),
                ScoreBand::Low => (high, low + 1),
                ScoreBand::Medium => (high, low),
            });

    Stats {
        count,
        average_score: total as f64 / count as f64,
        high_count,
        low_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandassoc_types::RecordId;

    fn record(id: &str, brand: &str, platform: &str, score: i32, created_at: u64) -> Record {
        Record {
            id: RecordId::parse(id).unwrap(),
            platform: platform.into(),
            brand: brand.into(),
            score,
            ciphertext: "FHE-x".into(),
            created_at,
            owner: "0xABC".into(),
        }
    }

    /// Sorted newest first, like a reloaded collection.
    fn collection() -> Vec<Record> {
        vec![
            record("6-f", "Acme", "TV", 9, 60),
            record("5-e", "Globex", "Print", 5, 50),
            record("4-d", "acme labs", "Digital", 2, 40),
            record("3-c", "Initech", "Social Media", 7, 30),
            record("2-b", "Umbrella", "Outdoor", 4, 20),
            record("1-a", "Hooli", "tv", 3, 10),
        ]
    }

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn score_bands() {
        assert_eq!(ScoreBand::of(10), ScoreBand::High);
        assert_eq!(ScoreBand::of(7), ScoreBand::High);
        assert_eq!(ScoreBand::of(6), ScoreBand::Medium);
        assert_eq!(ScoreBand::of(4), ScoreBand::Medium);
        assert_eq!(ScoreBand::of(3), ScoreBand::Low);
        assert_eq!(ScoreBand::of(0), ScoreBand::Low);
    }

    #[test]
    fn high_tab_keeps_exactly_high_scores_in_order() {
        let c = collection();
        let result = filter(&c, "", Tab::High);
        assert_eq!(ids(&result), vec!["6-f", "3-c"]);
        assert!(result.iter().all(|r| r.score >= 7));
    }

    #[test]
    fn medium_and_low_tabs() {
        let c = collection();
        assert_eq!(ids(&filter(&c, "", Tab::Medium)), vec!["5-e", "2-b"]);
        assert_eq!(ids(&filter(&c, "", Tab::Low)), vec!["4-d", "1-a"]);
    }

    #[test]
    fn all_tab_with_empty_search_is_identity() {
        let c = collection();
        assert_eq!(filter(&c, "", Tab::All).len(), c.len());
    }

    #[test]
    fn search_is_case_insensitive_on_brand_or_platform() {
        let c = collection();
        assert_eq!(ids(&filter(&c, "ACME", Tab::All)), vec!["6-f", "4-d"]);
        assert_eq!(ids(&filter(&c, "Tv", Tab::All)), vec!["6-f", "1-a"]);
        assert_eq!(ids(&filter(&c, "social", Tab::All)), vec!["3-c"]);
        assert!(filter(&c, "nothing", Tab::All).is_empty());
    }

    #[test]
    fn search_and_tab_compose_with_and() {
        let c = collection();
        assert_eq!(ids(&filter(&c, "acme", Tab::High)), vec!["6-f"]);
        assert_eq!(ids(&filter(&c, "acme", Tab::Low)), vec!["4-d"]);
        assert!(filter(&c, "acme", Tab::Medium).is_empty());
    }

    #[test]
    fn filter_is_stable() {
        let c = collection();
        assert_eq!(filter(&c, "e", Tab::All), filter(&c, "e", Tab::All));
    }

    #[test]
    fn stats_of_empty_collection_is_zero() {
        let s = stats(&[]);
        assert_eq!(s.count, 0);
        assert_eq!(s.average_score, 0.0);
        assert_eq!(s.high_count, 0);
        assert_eq!(s.low_count, 0);
    }

    #[test]
    fn stats_over_collection() {
        let s = stats(&collection());
        assert_eq!(s.count, 6);
        assert!((s.average_score - 5.0).abs() < f64::EPSILON);
        assert_eq!(s.high_count, 2);
        assert_eq!(s.low_count, 2);
    }

    #[test]
    fn tab_parses_and_displays() {
        assert_eq!("HIGH".parse::<Tab>().unwrap(), Tab::High);
        assert_eq!("medium".parse::<Tab>().unwrap(), Tab::Medium);
        assert_eq!(Tab::Low.to_string(), "low");
        assert_eq!(Tab::default(), Tab::All);
        assert!("best".parse::<Tab>().is_err());
    }
}
