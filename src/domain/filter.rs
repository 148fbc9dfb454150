//! Listing filters, sort whitelisting and pagination.

use chrono::NaiveDate;

use super::entry::{Outcome, Side};

/// Whitelisted sort columns for journal listings. Anything outside this
/// enum never reaches SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Date,
    Instrument,
    Profit,
    LotSize,
    Id,
}

impl SortField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "date" => Some(SortField::Date),
            "instrument" | "pair" => Some(SortField::Instrument),
            "profit" => Some(SortField::Profit),
            "lot_size" => Some(SortField::LotSize),
            "id" => Some(SortField::Id),
            _ => None,
        }
    }

    /// The SQL column the field maps to.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Date => "date",
            SortField::Instrument => "instrument",
            SortField::Profit => "profit",
            SortField::LotSize => "lot_size",
            SortField::Id => "id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Listing filter. All criteria are conjunctive; `None` means "don't
/// filter on this".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    /// Substring match on the instrument symbol.
    pub instrument: Option<String>,
    /// Exact-date match; ignored when a range bound is present.
    pub date: Option<NaiveDate>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub outcome: Option<Outcome>,
    pub side: Option<Side>,
    pub sort_by: SortField,
    pub sort_order: SortDirection,
}

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

/// 1-based page request with a clamped page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        PageRequest {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u32 {
        (self.page - 1) * self.limit
    }
}

/// One page of rows plus the unpaginated total.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub rows: Vec<T>,
    pub total: u64,
}

impl<T> PageResult<T> {
    pub fn total_pages(&self, limit: u32) -> u64 {
        if limit == 0 {
            return 0;
        }
        self.total.div_ceil(limit as u64)
    }
}
