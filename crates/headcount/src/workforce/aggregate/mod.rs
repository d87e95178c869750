//! Read-only aggregations over parsed roster and departures rows.
//!
//! Every function counts rows: a row is one contract stint, and nothing is
//! deduplicated by name. Rows whose key date is missing drop out of that
//! bucket only.

mod headcount;
mod movements;
mod turnover;

pub use headcount::{
    active_headcount, active_headcount_by_category, active_headcount_series,
    headcount_by_category, headcount_by_contract,
};
pub use movements::{departures_by_reason, movement_series};
pub use turnover::{
    headline, is_probation_break, probation_breaks, turnover, DEFAULT_PROBATION_MONTHS,
};

use super::classifier::Category;
use super::domain::{
    ContractType, DepartureReason, DepartureRecord, Period, PersonRecord, Ratio,
};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Movement {
    Entry,
    Exit,
}

impl Movement {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Entry => "Entrée",
            Self::Exit => "Sortie",
        }
    }
}

/// Population a turnover figure is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Cohort {
    All,
    Contract(ContractType),
    Category(Category),
}

impl Cohort {
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "Tous",
            Self::Contract(contract) => contract.label(),
            Self::Category(category) => category.label(),
        }
    }

    pub fn includes_person(self, record: &PersonRecord) -> bool {
        match self {
            Self::All => true,
            Self::Contract(contract) => record.contract == contract,
            Self::Category(category) => record.category == category,
        }
    }

    /// The departures sheet carries no department, so category cohorts
    /// cannot be evaluated against it.
    pub const fn applies_to_departures(self) -> bool {
        !matches!(self, Self::Category(_))
    }

    pub fn includes_departure(self, departure: &DepartureRecord) -> bool {
        match self {
            Self::All => true,
            Self::Contract(contract) => departure.contract == contract,
            Self::Category(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractHeadcountRow {
    pub period: Period,
    pub contract: ContractType,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryHeadcountRow {
    pub period: Period,
    pub category: Category,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveHeadcountRow {
    pub period: Period,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryActiveRow {
    pub period: Period,
    pub category: Category,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementRow {
    pub period: Period,
    pub movement: Movement,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartureReasonRow {
    pub period: Period,
    pub reason: DepartureReason,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnoverRow {
    pub period: Period,
    pub cohort: Cohort,
    pub exits: usize,
    pub active: usize,
    pub rate: Ratio,
    pub voluntary_exits: Option<usize>,
    pub voluntary_rate: Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbationRow {
    pub period: Period,
    pub entrants: usize,
    pub breaks: usize,
    pub rate: Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headline {
    pub as_of: NaiveDate,
    pub year: i32,
    pub active: usize,
    pub entries: usize,
    pub exits: usize,
    pub voluntary_exits: usize,
    pub turnover: Ratio,
    pub voluntary_turnover: Ratio,
    pub probation_break_rate: Ratio,
}
