//! Common types for the shared crate

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Permission granted to an admin (e.g. `products`, `sales:*`, `*`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(pub String);

impl Permission {
    /// Check if this permission grants access to the given area or action
    pub fn grants(&self, action: &str) -> bool {
        if self.0 == "*" {
            return true;
        }
        if let Some(prefix) = self.0.strip_suffix(":*") {
            return action == prefix || action.starts_with(&format!("{prefix}:"));
        }
        self.0 == action
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Permission {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A calendar date the backend stores as three separate integers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateParts {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl DateParts {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { day, month, year }
    }

    /// `YYYY-MM-DD`, zero padded, whether or not the date exists
    pub fn iso(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// The calendar date, if the parts form one
    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for DateParts {
    fn from(date: NaiveDate) -> Self {
        Self {
            day: date.day(),
            month: date.month(),
            year: date.year(),
        }
    }
}

impl std::fmt::Display for DateParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.iso())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_grants() {
        assert!(Permission::from("*").grants("backup"));
        assert!(Permission::from("sales:*").grants("sales"));
        assert!(Permission::from("sales:*").grants("sales:delete"));
        assert!(!Permission::from("sales:*").grants("salesman"));
        assert!(Permission::from("products").grants("products"));
        assert!(!Permission::from("products").grants("debts"));
    }

    #[test]
    fn test_date_parts_iso_is_padded() {
        let parts = DateParts::new(2024, 3, 7);
        assert_eq!(parts.iso(), "2024-03-07");
        assert_eq!(parts.to_date(), NaiveDate::from_ymd_opt(2024, 3, 7));
    }

    #[test]
    fn test_invalid_date_parts() {
        let parts = DateParts::new(2023, 2, 30);
        assert_eq!(parts.iso(), "2023-02-30");
        assert!(parts.to_date().is_none());
    }

    #[test]
    fn test_date_parts_wire_shape() {
        let parts: DateParts =
            serde_json::from_str(r#"{"day":1,"month":12,"year":2025}"#).unwrap();
        assert_eq!(parts, DateParts::new(2025, 12, 1));
    }
}
