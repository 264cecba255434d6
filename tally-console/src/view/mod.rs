//! List views
//!
//! Search, filter, sort and paginate a collection. The view is derived on
//! every call and never stored.

pub mod csv;

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{AppError, FieldValue, Listable, Pagination};

pub const DEFAULT_PER_PAGE: u32 = 20;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Sort key and direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    #[serde(default)]
    pub direction: Direction,
}

impl SortSpec {
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: Direction::Desc,
        }
    }
}

/// `name` sorts ascending, `-name` descending
impl FromStr for SortSpec {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (key, direction) = match s.strip_prefix('-') {
            Some(key) => (key, Direction::Desc),
            None => (s.strip_prefix('+').unwrap_or(s), Direction::Asc),
        };
        if key.is_empty() {
            return Err(AppError::field("sort", "sort key must not be empty"));
        }
        Ok(Self {
            key: key.to_string(),
            direction,
        })
    }
}

/// A predicate over one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Filter {
    /// Field equals the value (text compares case-insensitively)
    Equals { field: String, value: String },
    /// Field lies within the inclusive bounds
    Range {
        field: String,
        #[serde(default)]
        min: Option<String>,
        #[serde(default)]
        max: Option<String>,
    },
    /// Field has a value
    Present { field: String },
    /// Field has no value
    Missing { field: String },
}

impl Filter {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn range(field: impl Into<String>, min: Option<&str>, max: Option<&str>) -> Self {
        Self::Range {
            field: field.into(),
            min: min.map(str::to_string),
            max: max.map(str::to_string),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::Equals { field, .. }
            | Self::Range { field, .. }
            | Self::Present { field }
            | Self::Missing { field } => field,
        }
    }

    pub fn matches<R: Listable>(&self, record: &R) -> bool {
        let value = record.field(self.field());
        match self {
            Self::Present { .. } => value.is_some(),
            Self::Missing { .. } => value.is_none(),
            Self::Equals { value: wanted, .. } => value.is_some_and(|v| equals(&v, wanted)),
            Self::Range { min, max, .. } => value.is_some_and(|v| {
                within(&v, min.as_deref(), Ordering::Less)
                    && within(&v, max.as_deref(), Ordering::Greater)
            }),
        }
    }
}

/// Command-line filter syntax
///
/// - `field=value`
/// - `field=min..max` (either bound may be empty)
/// - `field?` present, `!field` missing
impl FromStr for Filter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(field) = s.strip_prefix('!') {
            return non_empty(field).map(|field| Self::Missing { field });
        }
        if let Some(field) = s.strip_suffix('?') {
            return non_empty(field).map(|field| Self::Present { field });
        }
        let Some((field, value)) = s.split_once('=') else {
            return Err(AppError::field(
                "filter",
                format!("invalid filter {s:?}, expected field=value"),
            ));
        };
        let field = non_empty(field)?;
        match value.split_once("..") {
            Some((min, max)) => Ok(Self::Range {
                field,
                min: Some(min.trim()).filter(|m| !m.is_empty()).map(str::to_string),
                max: Some(max.trim()).filter(|m| !m.is_empty()).map(str::to_string),
            }),
            None => Ok(Self::Equals {
                field,
                value: value.trim().to_string(),
            }),
        }
    }
}

fn non_empty(field: &str) -> Result<String, AppError> {
    let field = field.trim();
    if field.is_empty() {
        return Err(AppError::field("filter", "filter field must not be empty"));
    }
    Ok(field.to_string())
}

/// Parse `raw` as the same kind of value as `like`
fn coerce(like: &FieldValue, raw: &str) -> Option<FieldValue> {
    let raw = raw.trim();
    match like {
        FieldValue::Number(_) => Decimal::from_str(raw).ok().map(FieldValue::Number),
        FieldValue::Date(_) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(FieldValue::Date),
        FieldValue::Flag(_) => raw.parse::<bool>().ok().map(FieldValue::Flag),
        FieldValue::Text(_) => Some(FieldValue::text(raw)),
    }
}

fn equals(value: &FieldValue, wanted: &str) -> bool {
    match (value, coerce(value, wanted)) {
        (FieldValue::Text(text), _) => text.to_lowercase() == wanted.trim().to_lowercase(),
        (_, Some(parsed)) => value.compare(&parsed) == Ordering::Equal,
        (_, None) => false,
    }
}

/// `value` is not on the `outside` side of `bound`
fn within(value: &FieldValue, bound: Option<&str>, outside: Ordering) -> bool {
    let Some(bound) = bound else {
        return true;
    };
    match coerce(value, bound) {
        Some(bound) => {
            let ordering = match (value, &bound) {
                (FieldValue::Text(a), FieldValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
                _ => value.compare(&bound),
            };
            ordering != outside
        }
        None => false,
    }
}

/// Order two records by `spec`; records without the field go last
/// whatever the direction.
pub fn compare_by<R: Listable>(a: &R, b: &R, spec: &SortSpec) -> Ordering {
    match (a.field(&spec.key), b.field(&spec.key)) {
        (Some(x), Some(y)) => {
            let ordering = x.compare(&y);
            match spec.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Search text, filters, sort and page for one list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn first_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            filters: Vec::new(),
            sort: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sort(mut self, spec: SortSpec) -> Self {
        self.sort = Some(spec);
        self
    }

    pub fn page(mut self, page: u32, per_page: u32) -> Self {
        self.page = page;
        self.per_page = per_page;
        self
    }

    fn matches_search<R: Listable>(&self, record: &R) -> bool {
        let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return true;
        };
        let needle = needle.to_lowercase();
        R::searchable()
            .iter()
            .filter_map(|key| record.field(key))
            .any(|value| value.contains(&needle))
    }

    /// Whether `record` passes the search and every filter
    pub fn matches<R: Listable>(&self, record: &R) -> bool {
        self.matches_search(record) && self.filters.iter().all(|f| f.matches(record))
    }

    /// Filtered and sorted records, every page
    pub fn select<'a, R: Listable>(&self, records: impl IntoIterator<Item = &'a R>) -> Vec<&'a R>
    where
        R: 'a,
    {
        let mut rows: Vec<&R> = records.into_iter().filter(|r| self.matches(*r)).collect();
        if let Some(spec) = &self.sort {
            rows.sort_by(|a, b| compare_by(*a, *b, spec));
        }
        rows
    }

    /// The requested page of the selection
    pub fn apply<'a, R: Listable + Clone>(
        &self,
        records: impl IntoIterator<Item = &'a R>,
    ) -> ListView<R>
    where
        R: 'a,
    {
        let rows = self.select(records);
        let per_page = self.per_page.max(1);
        let page = self.page.max(1);
        let pagination = Pagination::new(page, per_page, rows.len() as u64);
        let start = (page as usize - 1).saturating_mul(per_page as usize);
        let items = rows
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect();
        ListView { items, pagination }
    }
}

/// One page of a list
#[derive(Debug, Clone, PartialEq)]
pub struct ListView<R> {
    pub items: Vec<R>,
    pub pagination: Pagination,
}

impl<R> ListView<R> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
