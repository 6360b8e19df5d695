//! Filter channels by name and messages by calendar date.
//!
//! This module provides [`FilterSpec`] for defining which channels and dates
//! to keep, and [`apply_filters`] for applying it to normalized channels.
//!
//! # Filter file format
//!
//! A YAML mapping from channel name to a list of ranges. Each item is either a
//! `{start, end}` object or a single `YYYY-MM-DD` date. `null` or an empty list
//! keeps the whole channel. The mapping may also be nested under a top-level
//! `chats:` key; other top-level keys are then ignored.
//!
//! ```yaml
//! general:
//!   - start: 2023-01-02
//!     end: 2023-01-03
//!   - 2023-01-05
//! random:
//! ```
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeMap;
//! use chrono::TimeZone;
//! use chrono_tz::UTC;
//! use slackpack::core::filter::{FilterSpec, apply_filters};
//! use slackpack::{Channel, Message};
//!
//! # fn main() -> slackpack::Result<()> {
//! let day = |d| UTC.with_ymd_and_hms(2023, 1, d, 12, 0, 0).unwrap();
//! let general = Channel::new("general", vec![
//!     Message::new("1", "Alice", day(1), "old"),
//!     Message::new("2", "Alice", day(2), "kept"),
//! ]);
//! let channels = BTreeMap::from([("general".to_string(), general)]);
//!
//! let spec = FilterSpec::from_yaml_str("general: [2023-01-02]")?;
//! let filtered = apply_filters(channels, Some(&spec));
//!
//! assert_eq!(filtered["general"].messages.len(), 1);
//! assert_eq!(filtered["general"].messages[0].text(), "kept");
//! # Ok(())
//! # }
//! ```
//!
//! # Behavior Notes
//!
//! - No spec means no filtering at all
//! - A channel not named in the spec is excluded
//! - Ranges are inclusive on both ends and combined with OR logic
//! - Channels left without messages are dropped
//! - Filtering is idempotent

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::Channel;
use crate::error::{ExportError, Result};

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    /// First included date.
    pub start: NaiveDate,
    /// Last included date.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidFilter`] if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ExportError::InvalidFilter(format!(
                "range start {start} is after its end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// A range covering exactly one day.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Parses two `YYYY-MM-DD` dates into a range.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidDate`] on a bad date and
    /// [`ExportError::InvalidFilter`] if start is after end.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// Returns `true` if `date` lies within the range, ends included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Which channels, and which dates of them, to keep.
///
/// A channel without an entry is excluded. An entry with no ranges keeps the
/// whole channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Ranges per channel name.
    pub channels: BTreeMap<String, Vec<DateRange>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FilterFile {
    Wrapped {
        chats: BTreeMap<String, Option<Vec<RangeEntry>>>,
    },
    Plain(BTreeMap<String, Option<Vec<RangeEntry>>>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RangeEntry {
    Day(String),
    Span { start: String, end: String },
}

impl RangeEntry {
    fn into_range(self) -> Result<DateRange> {
        match self {
            RangeEntry::Day(date) => parse_date(&date).map(DateRange::day),
            RangeEntry::Span { start, end } => DateRange::parse(&start, &end),
        }
    }
}

impl FilterSpec {
    /// Creates a spec that excludes every channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps all of `channel`.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channels.entry(channel.into()).or_default();
        self
    }

    /// Keeps the days of `channel` within `range`.
    #[must_use]
    pub fn with_range(mut self, channel: impl Into<String>, range: DateRange) -> Self {
        self.channels.entry(channel.into()).or_default().push(range);
        self
    }

    /// Parses a YAML filter document.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Yaml`] if the document is not a mapping of the
    /// expected shape, [`ExportError::InvalidDate`] for a bad date and
    /// [`ExportError::InvalidFilter`] for an empty document or a reversed
    /// range.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Err(ExportError::InvalidFilter("filter file is empty".into()));
        }

        let entries = match serde_yaml::from_str::<FilterFile>(yaml)? {
            FilterFile::Wrapped { chats } => chats,
            FilterFile::Plain(map) => map,
        };

        let mut channels = BTreeMap::new();
        for (name, ranges) in entries {
            let ranges = ranges
                .unwrap_or_default()
                .into_iter()
                .map(RangeEntry::into_range)
                .collect::<Result<Vec<_>>>()?;
            channels.insert(name, ranges);
        }

        Ok(Self { channels })
    }

    /// Reads and parses a YAML filter file.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the file cannot be read, otherwise as
    /// [`from_yaml_str`](Self::from_yaml_str).
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Ranges for `channel`, or `None` if the channel is excluded.
    pub fn ranges(&self, channel: &str) -> Option<&[DateRange]> {
        self.channels.get(channel).map(Vec::as_slice)
    }

    /// Returns `true` if `channel` has an entry.
    pub fn includes(&self, channel: &str) -> bool {
        self.channels.contains_key(channel)
    }

    /// Channel names in the spec that `known` does not contain.
    pub fn unknown_channels<'a>(&'a self, known: impl Fn(&str) -> bool) -> Vec<&'a str> {
        self.channels
            .keys()
            .map(String::as_str)
            .filter(|name| !known(name))
            .collect()
    }
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| ExportError::invalid_date(input))
}

/// Filters channels according to `spec`.
///
/// With no spec the input is returned unchanged. Otherwise only channels with
/// an entry survive; if the entry has ranges, only messages whose date (in the
/// display timezone they were normalized to) falls in one of them are kept.
/// Channels left empty are dropped.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use slackpack::core::filter::{FilterSpec, apply_filters};
/// use slackpack::Channel;
///
/// let channels = BTreeMap::from([
///     ("general".to_string(), Channel::new("general", vec![])),
/// ]);
///
/// // Identity without a spec
/// assert_eq!(apply_filters(channels.clone(), None), channels);
///
/// // Unlisted channels are excluded
/// let spec = FilterSpec::new().with_channel("random");
/// assert!(apply_filters(channels, Some(&spec)).is_empty());
/// ```
pub fn apply_filters(
    channels: BTreeMap<String, Channel>,
    spec: Option<&FilterSpec>,
) -> BTreeMap<String, Channel> {
    let Some(spec) = spec else {
        return channels;
    };

    channels
        .into_iter()
        .filter_map(|(name, mut channel)| {
            let ranges = spec.ranges(&name)?;
            if !ranges.is_empty() {
                channel
                    .messages
                    .retain(|msg| ranges.iter().any(|range| range.contains(msg.date())));
            }
            (!channel.is_empty()).then_some((name, channel))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Message;
    use chrono::TimeZone;
    use chrono_tz::UTC;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn channel(name: &str, days: &[u32]) -> Channel {
        let messages = days
            .iter()
            .map(|&d| {
                let ts = UTC.with_ymd_and_hms(2023, 1, d, 12, 0, 0).unwrap();
                Message::new(d.to_string(), "Alice", ts, format!("day {d}"))
            })
            .collect();
        Channel::new(name, messages)
    }

    fn channels() -> BTreeMap<String, Channel> {
        BTreeMap::from([
            ("general".to_string(), channel("general", &[1, 2, 3, 4, 5])),
            ("random".to_string(), channel("random", &[1, 9])),
        ])
    }

    #[test]
    fn test_no_spec_is_identity() {
        assert_eq!(apply_filters(channels(), None), channels());
    }

    #[test]
    fn test_unlisted_channel_excluded() {
        let spec = FilterSpec::new().with_channel("general");
        let filtered = apply_filters(channels(), Some(&spec));

        assert_eq!(filtered.keys().collect::<Vec<_>>(), ["general"]);
        assert_eq!(filtered["general"].len(), 5);
    }

    #[test]
    fn test_range_boundaries_inclusive() {
        let range = DateRange::parse("2023-01-02", "2023-01-03").unwrap();
        let spec = FilterSpec::new().with_range("general", range);
        let filtered = apply_filters(channels(), Some(&spec));

        let texts: Vec<&str> = filtered["general"].messages.iter().map(Message::text).collect();
        assert_eq!(texts, ["day 2", "day 3"]);
    }

    #[test]
    fn test_overlapping_ranges_union() {
        let spec = FilterSpec::new()
            .with_range("general", DateRange::parse("2023-01-01", "2023-01-03").unwrap())
            .with_range("general", DateRange::parse("2023-01-02", "2023-01-04").unwrap());
        let filtered = apply_filters(channels(), Some(&spec));
        assert_eq!(filtered["general"].len(), 4);
    }

    #[test]
    fn test_channel_left_empty_is_dropped() {
        let spec = FilterSpec::new().with_range("random", DateRange::day(date("2023-01-05")));
        assert!(apply_filters(channels(), Some(&spec)).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let spec = FilterSpec::new()
            .with_range("general", DateRange::parse("2023-01-02", "2023-01-04").unwrap())
            .with_channel("random");
        let once = apply_filters(channels(), Some(&spec));
        let twice = apply_filters(once.clone(), Some(&spec));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_yaml_plain_map() {
        let spec = FilterSpec::from_yaml_str(
            "general:\n  - start: 2023-01-02\n    end: 2023-01-03\n  - 2023-01-05\nrandom:\n",
        )
        .unwrap();

        assert_eq!(
            spec.ranges("general").unwrap(),
            [
                DateRange::parse("2023-01-02", "2023-01-03").unwrap(),
                DateRange::day(date("2023-01-05")),
            ]
        );
        assert_eq!(spec.ranges("random"), Some(&[][..]));
        assert_eq!(spec.ranges("missing"), None);
    }

    #[test]
    fn test_yaml_chats_wrapper() {
        let spec = FilterSpec::from_yaml_str(
            "copy-files: true\nchats:\n  general:\n    - '2023-01-02'\n  random: []\n",
        )
        .unwrap();
        assert!(spec.includes("general"));
        assert!(spec.includes("random"));
        assert!(!spec.includes("copy-files"));
    }

    #[test]
    fn test_yaml_rejects_bad_input() {
        assert!(matches!(
            FilterSpec::from_yaml_str("general: [2023-13-45]"),
            Err(ExportError::InvalidDate { .. })
        ));
        assert!(matches!(
            FilterSpec::from_yaml_str("general:\n  - start: 2023-01-05\n    end: 2023-01-01\n"),
            Err(ExportError::InvalidFilter(_))
        ));
        assert!(matches!(
            FilterSpec::from_yaml_str("  \n"),
            Err(ExportError::InvalidFilter(_))
        ));
        assert!(FilterSpec::from_yaml_str("- just\n- a list\n").is_err());
    }

    #[test]
    fn test_unknown_channels() {
        let spec = FilterSpec::new().with_channel("general").with_channel("nonexistent");
        let known = channels();
        assert_eq!(spec.unknown_channels(|n| known.contains_key(n)), ["nonexistent"]);
    }
}
