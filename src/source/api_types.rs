//! Serde types matching the brewery listing payload.
//!
//! Only the fields the pipeline reads are typed. Everything else the source
//! sends is carried through `extra` so a snapshot keeps the full record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A record exactly as received from the remote source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub brewery_type: Option<String>,
  #[serde(default)]
  pub city: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub state: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub country: Option<String>,
  #[serde(default)]
  pub phone: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub website_url: Option<String>,
  // Catch-all for attributes we pass through untouched
  #[serde(flatten)]
  pub extra: BTreeMap<String, serde_json::Value>,
}

#[cfg(test)]
impl SourceRecord {
  /// Build a record with just the three display fields set.
  pub fn new(name: &str, city: &str, phone: &str) -> Self {
    Self {
      name: Some(name.to_string()),
      city: Some(city.to_string()),
      phone: Some(phone.to_string()),
      ..Self::default()
    }
  }
}

/// Parse a payload into records.
///
/// A blank body or a JSON `null` is a legitimate "no records" answer.
pub fn parse_records(body: &str) -> serde_json::Result<Vec<SourceRecord>> {
  if body.trim().is_empty() {
    return Ok(Vec::new());
  }
  let records: Option<Vec<SourceRecord>> = serde_json::from_str(body)?;
  Ok(records.unwrap_or_default())
}
