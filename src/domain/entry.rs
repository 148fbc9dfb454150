//! Trade journal entry types and boundary parsing.
//!
//! External records arrive with duck-typed numeric fields (strings, blanks,
//! garbage). Everything is funnelled through [`parse_amount`] once, at the
//! boundary, so the rest of the domain only ever sees clean `Option<f64>`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Scale factor between the minor unit (cent account) and the base unit.
pub const MINOR_UNIT_SCALE: f64 = 100.0;

/// Currency unit the capital/profit amounts of a row were entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CapitalUnit {
    #[default]
    Base,
    Minor,
}

impl CapitalUnit {
    /// Accepts both this crate's vocabulary and the legacy `USD`/`Cent`
    /// labels. Anything unrecognized falls back to the base unit.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "minor" | "cent" => CapitalUnit::Minor,
            _ => CapitalUnit::Base,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CapitalUnit::Base => "Base",
            CapitalUnit::Minor => "Minor",
        }
    }

    /// Convert an amount entered in this unit into base units.
    pub fn to_base(&self, amount: f64) -> f64 {
        match self {
            CapitalUnit::Base => amount,
            CapitalUnit::Minor => amount / MINOR_UNIT_SCALE,
        }
    }

    /// Convert a canonical base-unit amount back into this unit.
    pub fn from_base(&self, amount: f64) -> f64 {
        match self {
            CapitalUnit::Base => amount,
            CapitalUnit::Minor => amount * MINOR_UNIT_SCALE,
        }
    }
}

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Case/whitespace-insensitive; accepts the broker vocabulary
    /// (`Buy`/`Sell`) as well as `Long`/`Short`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "long" | "buy" => Some(Side::Long),
            "short" | "sell" => Some(Side::Short),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "Long",
            Side::Short => "Short",
        }
    }
}

/// Recorded result of a trade. Unrecognized outcome strings stay `None`
/// and are tolerated everywhere downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Lose,
}

impl Outcome {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "win" => Some(Outcome::Win),
            "lose" => Some(Outcome::Lose),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Lose => "Lose",
        }
    }
}

/// Tolerant numeric parse: trims, accepts any finite decimal, and maps
/// blanks and garbage to `None` instead of failing.
pub fn parse_amount(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// One row of a user's trading journal.
///
/// `capital` and `profit` are always canonical base-unit decimals; the
/// conversion from `capital_unit` happens exactly once, at ingestion
/// ([`NewEntry::normalized`] / [`EntryPatch::normalized`]). The unit tag is
/// retained for display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEntry {
    pub id: i64,
    pub owner_id: i64,
    pub date: NaiveDate,
    pub capital: Option<f64>,
    pub capital_unit: CapitalUnit,
    pub instrument: Option<String>,
    pub side: Option<Side>,
    pub lot_size: Option<f64>,
    pub entry_price: Option<f64>,
    pub take_profit: Option<f64>,
    pub stop_loss: Option<f64>,
    pub outcome: Option<Outcome>,
    pub profit: Option<f64>,
    pub before_image: Option<String>,
    pub after_image: Option<String>,
    pub entry_reason: Option<String>,
}

/// Insert payload. Amounts are raw, in `capital_unit`, until
/// [`NewEntry::normalized`] is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEntry {
    pub date: Option<NaiveDate>,
    pub capital: Option<f64>,
    pub capital_unit: CapitalUnit,
    pub instrument: Option<String>,
    pub side: Option<Side>,
    pub lot_size: Option<f64>,
    pub entry_price: Option<f64>,
    pub take_profit: Option<f64>,
    pub stop_loss: Option<f64>,
    pub outcome: Option<Outcome>,
    pub profit: Option<f64>,
    pub before_image: Option<String>,
    pub after_image: Option<String>,
    pub entry_reason: Option<String>,
}

impl NewEntry {
    /// Resolve the unit coercion once: capital and profit become base-unit
    /// decimals and stay that way for the lifetime of the row.
    pub fn normalized(mut self) -> Self {
        self.capital = self.capital.map(|v| self.capital_unit.to_base(v));
        self.profit = self.profit.map(|v| self.capital_unit.to_base(v));
        self
    }
}

/// Partial update. `None` leaves the stored column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPatch {
    pub date: Option<NaiveDate>,
    pub capital: Option<f64>,
    pub capital_unit: Option<CapitalUnit>,
    pub instrument: Option<String>,
    pub side: Option<Side>,
    pub lot_size: Option<f64>,
    pub entry_price: Option<f64>,
    pub take_profit: Option<f64>,
    pub stop_loss: Option<f64>,
    pub outcome: Option<Outcome>,
    pub profit: Option<f64>,
    pub before_image: Option<String>,
    pub after_image: Option<String>,
    pub entry_reason: Option<String>,
}

impl EntryPatch {
    /// True when no column would change.
    pub fn is_empty(&self) -> bool {
        *self == EntryPatch::default()
    }

    /// Scale supplied amounts into base units. A patch that changes the
    /// unit without resupplying an amount does not rescale the stored
    /// value; `current_unit` only fills in when the patch omits the unit.
    pub fn normalized(mut self, current_unit: CapitalUnit) -> Self {
        let unit = self.capital_unit.unwrap_or(current_unit);
        self.capital = self.capital.map(|v| unit.to_base(v));
        self.profit = self.profit.map(|v| unit.to_base(v));
        self
    }
}
