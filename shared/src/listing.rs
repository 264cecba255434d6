//! Field access for list views
//!
//! Each entity exposes its columns and a by-name field accessor so that
//! search, filtering, sorting and CSV export can be written once.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// A table column: the field key and its header label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub header: &'static str,
}

impl Column {
    pub const fn new(key: &'static str, header: &'static str) -> Self {
        Self { key, header }
    }
}

/// A single field value, typed for comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Number(Decimal),
    Text(String),
    Date(NaiveDate),
    Flag(bool),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn int(value: i64) -> Self {
        Self::Number(Decimal::from(value))
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Date(_) => 1,
            Self::Flag(_) => 2,
            Self::Text(_) => 3,
        }
    }

    /// Total order used by every list view.
    ///
    /// Numbers compare arithmetically, dates chronologically, flags
    /// false before true. Text compares case-insensitively and falls back
    /// to the exact text so that distinct strings never tie.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Flag(a), Self::Flag(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    /// Case-insensitive substring match against the rendered value
    pub fn contains(&self, needle_lower: &str) -> bool {
        self.to_string().to_lowercase().contains(needle_lower)
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n.normalize()),
            Self::Text(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        Self::text(value.as_str())
    }
}

/// An entity that can be shown in a list view
pub trait Listable {
    /// Columns in display order; also the CSV layout
    fn columns() -> &'static [Column];

    /// Field keys searched by the free-text box
    fn searchable() -> &'static [&'static str];

    /// Value of a field by key; `None` when absent or unknown
    fn field(&self, key: &str) -> Option<FieldValue>;
}

/// Lift an optional string field into a value
pub fn opt_text(value: &Option<String>) -> Option<FieldValue> {
    value.as_deref().map(FieldValue::from)
}
