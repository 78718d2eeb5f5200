use serde::Serialize;

use super::api_types::SourceRecord;

/// Normalized projection of a [`SourceRecord`] handed back to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayRecord {
  pub name: String,
  pub city: String,
  pub phone: String,
}

impl From<&SourceRecord> for DisplayRecord {
  fn from(source: &SourceRecord) -> Self {
    Self {
      name: source.name.clone().unwrap_or_default(),
      city: source.city.clone().unwrap_or_default(),
      phone: source.phone.clone().unwrap_or_default(),
    }
  }
}
