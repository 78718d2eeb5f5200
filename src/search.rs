//! Search and sort over fetched records.
//!
//! Records are projected to [`DisplayRecord`]s first; filtering and sorting
//! work on the projection so missing fields behave as empty strings.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::source::{DisplayRecord, SourceRecord};

/// Field to sort by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
  Name,
  #[default]
  City,
  Phone,
}

impl SortKey {
  /// Parse a user-supplied key. Anything unrecognized sorts by city.
  pub fn parse(input: &str) -> Self {
    match input.trim().to_lowercase().as_str() {
      "name" => Self::Name,
      "phone" => Self::Phone,
      _ => Self::City,
    }
  }

  fn field<'a>(&self, record: &'a DisplayRecord) -> &'a str {
    match self {
      Self::Name => &record.name,
      Self::City => &record.city,
      Self::Phone => &record.phone,
    }
  }
}

impl FromStr for SortKey {
  type Err = std::convert::Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(Self::parse(s))
  }
}

impl fmt::Display for SortKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::Name => "name",
      Self::City => "city",
      Self::Phone => "phone",
    };
    f.write_str(name)
  }
}

/// Project source records to display records, preserving order.
pub fn transform(records: &[SourceRecord]) -> Vec<DisplayRecord> {
  debug!(count = records.len(), "transforming records");
  records.iter().map(DisplayRecord::from).collect()
}

/// Transform, then keep records whose name, city, or phone contains `term`.
///
/// Matching is case-insensitive on the trimmed term. A missing or blank term
/// keeps everything.
pub fn search(records: &[SourceRecord], term: Option<&str>) -> Vec<DisplayRecord> {
  let transformed = transform(records);

  let needle = match term.map(str::trim) {
    Some(t) if !t.is_empty() => t.to_lowercase(),
    _ => {
      debug!(count = transformed.len(), "no search term, returning all records");
      return transformed;
    }
  };

  let matched: Vec<DisplayRecord> = transformed
    .into_iter()
    .filter(|record| matches_term(record, &needle))
    .collect();

  debug!(term = needle.as_str(), count = matched.len(), "search complete");
  matched
}

fn matches_term(record: &DisplayRecord, needle: &str) -> bool {
  [&record.name, &record.city, &record.phone]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Stable sort on the field named by `sort_by`.
///
/// Values compare case-insensitively, with exact case as the tiebreak, so
/// `apple < Banana < cherry`. Equal keys keep their input order in both
/// directions.
pub fn sort(mut records: Vec<DisplayRecord>, sort_by: &str, descending: bool) -> Vec<DisplayRecord> {
  let key = SortKey::parse(sort_by);
  debug!(count = records.len(), %key, descending, "sorting records");

  if descending {
    records.sort_by(|a, b| compare_fields(key.field(b), key.field(a)));
  } else {
    records.sort_by(|a, b| compare_fields(key.field(a), key.field(b)));
  }
  records
}

fn compare_fields(a: &str, b: &str) -> Ordering {
  a.to_lowercase()
    .cmp(&b.to_lowercase())
    .then_with(|| a.cmp(b))
}
