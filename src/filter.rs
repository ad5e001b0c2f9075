use crate::dates;
use crate::gratitude_entry::GratitudeEntry;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("start date is after end date")]
    InvertedRange,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
    Alphabetical,
}

impl SortOrder {
    pub fn next(self) -> Self {
        match self {
            SortOrder::NewestFirst => SortOrder::OldestFirst,
            SortOrder::OldestFirst => SortOrder::Alphabetical,
            SortOrder::Alphabetical => SortOrder::NewestFirst,
        }
    }

    pub fn previous(self) -> Self {
        self.next().next()
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "Newest first",
            SortOrder::OldestFirst => "Oldest first",
            SortOrder::Alphabetical => "Alphabetical",
        }
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FilterError> {
        if start > end {
            return Err(FilterError::InvertedRange);
        }
        Ok(DateRange { start, end })
    }

    /// Builds a range from form input. A blank bound is open on that side;
    /// two blank bounds mean no range at all.
    pub fn parse(start: &str, end: &str) -> Result<Option<Self>, FilterError> {
        let bound = |value: &str| -> Result<Option<NaiveDate>, FilterError> {
            if value.trim().is_empty() {
                return Ok(None);
            }
            dates::parse_entry_date(value)
                .map(Some)
                .ok_or_else(|| FilterError::InvalidDate(value.trim().to_string()))
        };

        match (bound(start)?, bound(end)?) {
            (None, None) => Ok(None),
            (start, end) => Self::new(
                start.unwrap_or(NaiveDate::MIN),
                end.unwrap_or(NaiveDate::MAX),
            )
            .map(Some),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GratitudeFilter {
    pub date_range: Option<DateRange>,
    pub keyword: Option<String>,
    pub sort_order: SortOrder,
}

impl GratitudeFilter {
    pub fn with_sort(sort_order: SortOrder) -> Self {
        GratitudeFilter {
            sort_order,
            ..Default::default()
        }
    }

    /// The keyword as typed, trimmed; `None` when blank.
    fn typed_keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    fn keyword(&self) -> Option<String> {
        self.typed_keyword().map(str::to_lowercase)
    }

    /// True when the filter narrows the list, not just reorders it.
    pub fn is_active(&self) -> bool {
        self.date_range.is_some() || self.typed_keyword().is_some()
    }

    pub fn matches(&self, entry: &GratitudeEntry) -> bool {
        if let Some(range) = &self.date_range {
            match entry.parsed_date() {
                Some(date) if range.contains(date) => {}
                _ => return false,
            }
        }
        match self.keyword() {
            Some(keyword) => entry.content.to_lowercase().contains(&keyword),
            None => true,
        }
    }

    pub fn apply(&self, entries: &[GratitudeEntry]) -> Vec<GratitudeEntry> {
        let mut result: Vec<GratitudeEntry> =
            entries.iter().filter(|e| self.matches(e)).cloned().collect();
        sort_entries(&mut result, self.sort_order);
        result
    }

    /// One-line description for the main screen.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(range) = &self.date_range {
            let bound = |d: NaiveDate| {
                if d == NaiveDate::MIN || d == NaiveDate::MAX {
                    "…".to_string()
                } else {
                    dates::format_entry_date(d)
                }
            };
            parts.push(format!("{} to {}", bound(range.start), bound(range.end)));
        }
        if let Some(keyword) = self.typed_keyword() {
            parts.push(format!("\"{}\"", keyword));
        }
        parts.push(self.sort_order.label().to_string());
        parts.join(" | ")
    }
}

fn chronological(a: &GratitudeEntry, b: &GratitudeEntry) -> Ordering {
    // Unparseable dates sort as the oldest.
    a.parsed_date()
        .cmp(&b.parsed_date())
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_entries(entries: &mut [GratitudeEntry], order: SortOrder) {
    match order {
        SortOrder::NewestFirst => entries.sort_by(|a, b| chronological(b, a)),
        SortOrder::OldestFirst => entries.sort_by(chronological),
        SortOrder::Alphabetical => entries.sort_by(|a, b| {
            a.content
                .to_lowercase()
                .cmp(&b.content.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        }),
    }
}

/// Groups an already sorted list by its date string, keeping the order in
/// which each date first appears.
///
/// Entries sharing a date are merged into one group even when they are not
/// adjacent, as happens with `SortOrder::Alphabetical`.
pub fn group_by_date(entries: &[GratitudeEntry]) -> Vec<(String, Vec<GratitudeEntry>)> {
    let mut groups: Vec<(String, Vec<GratitudeEntry>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        match index.get(entry.date.as_str()) {
            Some(&i) => groups[i].1.push(entry.clone()),
            None => {
                index.insert(&entry.date, groups.len());
                groups.push((entry.date.clone(), vec![entry.clone()]));
            }
        }
    }
    groups
}
