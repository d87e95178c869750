use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use super::classifier::{classify, Category};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    Permanent,
    FixedTerm,
    Intern,
    Other,
}

impl ContractType {
    pub const fn ordered() -> [Self; 4] {
        [Self::Permanent, Self::FixedTerm, Self::Intern, Self::Other]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Permanent => "CDI",
            Self::FixedTerm => "CDD",
            Self::Intern => "Stage / Alternance",
            Self::Other => "Autre",
        }
    }

    /// Reads the free-text "Type de contrat" cell.
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(raw) = label else {
            return Self::Other;
        };
        let lowered = raw.trim().to_lowercase();
        if lowered.is_empty() {
            return Self::Other;
        }

        if ["cdi", "permanent", "indétermin", "indetermin"]
            .iter()
            .any(|keyword| lowered.contains(keyword))
        {
            Self::Permanent
        } else if ["cdd", "fixed", "détermin", "determin"]
            .iter()
            .any(|keyword| lowered.contains(keyword))
        {
            Self::FixedTerm
        } else if ["stag", "intern", "alternan", "apprenti"]
            .iter()
            .any(|keyword| lowered.contains(keyword))
        {
            Self::Intern
        } else {
            Self::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartureReason {
    Resignation,
    MutualAgreement,
    Dismissal,
    ProbationBreak,
    ContractExpiry,
    Retirement,
    Other,
}

impl DepartureReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Resignation => "Démission",
            Self::MutualAgreement => "Rupture conventionnelle",
            Self::Dismissal => "Licenciement",
            Self::ProbationBreak => "Rupture de période d'essai",
            Self::ContractExpiry => "Fin de contrat",
            Self::Retirement => "Retraite",
            Self::Other => "Autre",
        }
    }

    /// Reads the free-text "Type de départ" cell. Probation is tested before
    /// expiry since "fin de période d'essai" mentions both.
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(raw) = label else {
            return Self::Other;
        };
        let lowered = raw.trim().to_lowercase();

        if lowered.contains("essai") {
            Self::ProbationBreak
        } else if lowered.contains("conventionnelle") {
            Self::MutualAgreement
        } else if lowered.contains("démission") || lowered.contains("demission") {
            Self::Resignation
        } else if lowered.contains("licenciement") {
            Self::Dismissal
        } else if lowered.contains("retraite") {
            Self::Retirement
        } else if lowered.contains("fin de contrat")
            || lowered.contains("fin de cdd")
            || lowered.contains("fin de stage")
            || lowered.contains("terme")
        {
            Self::ContractExpiry
        } else {
            Self::Other
        }
    }

    /// Natural expiry of a fixed-term contract is not a voluntary departure.
    pub const fn is_voluntary_turnover(self) -> bool {
        !matches!(self, Self::ContractExpiry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Annual,
    Monthly,
}

impl Granularity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Annual => "Vue annuelle",
            Self::Monthly => "Vue mensuelle",
        }
    }
}

/// Reporting bucket. Ordering follows the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    Year(i32),
    Month { year: i32, month: u32 },
}

impl Period {
    pub fn of(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Annual => Self::Year(date.year()),
            Granularity::Monthly => Self::Month {
                year: date.year(),
                month: date.month(),
            },
        }
    }

    pub const fn granularity(self) -> Granularity {
        match self {
            Self::Year(_) => Granularity::Annual,
            Self::Month { .. } => Granularity::Monthly,
        }
    }

    /// Dense index used by the interval sweep; consecutive periods differ by one.
    pub(crate) fn ordinal(self) -> i64 {
        match self {
            Self::Year(year) => i64::from(year),
            Self::Month { year, month } => i64::from(year) * 12 + i64::from(month) - 1,
        }
    }

    pub(crate) fn from_ordinal(ordinal: i64, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Annual => Self::Year(ordinal as i32),
            Granularity::Monthly => Self::Month {
                year: ordinal.div_euclid(12) as i32,
                month: ordinal.rem_euclid(12) as u32 + 1,
            },
        }
    }

    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(year) => write!(f, "{year}"),
            Self::Month { year, month } => write!(f, "{year}-{month:02}"),
        }
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Percentage with an explicit undefined state for empty denominators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Defined(f64),
    Undefined,
}

impl Ratio {
    pub fn percentage(numerator: usize, denominator: usize) -> Self {
        if denominator == 0 {
            return Self::Undefined;
        }
        let pct = numerator as f64 / denominator as f64 * 100.0;
        Self::Defined((pct * 100.0).round() / 100.0)
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Self::Defined(value) => Some(value),
            Self::Undefined => None,
        }
    }

    pub const fn is_undefined(self) -> bool {
        matches!(self, Self::Undefined)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defined(value) => write!(f, "{value:.2}%"),
            Self::Undefined => f.write_str("n/a"),
        }
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Defined(value) => serializer.serialize_f64(*value),
            Self::Undefined => serializer.serialize_none(),
        }
    }
}

/// One roster row: a person over one contract stint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonRecord {
    pub name: Option<String>,
    pub contract: ContractType,
    pub contract_label: Option<String>,
    pub pole_label: Option<String>,
    pub category: Category,
    pub arrival: Option<NaiveDate>,
    pub departure: Option<NaiveDate>,
}

impl PersonRecord {
    pub fn new(
        name: Option<String>,
        contract_label: Option<String>,
        pole_label: Option<String>,
        arrival: Option<NaiveDate>,
        departure: Option<NaiveDate>,
    ) -> Self {
        Self {
            contract: ContractType::from_label(contract_label.as_deref()),
            category: classify(pole_label.as_deref()),
            name,
            contract_label,
            pole_label,
            arrival,
            departure,
        }
    }

    pub fn arrival_period(&self, granularity: Granularity) -> Option<Period> {
        self.arrival.map(|date| Period::of(date, granularity))
    }

    pub fn departure_period(&self, granularity: Granularity) -> Option<Period> {
        self.departure.map(|date| Period::of(date, granularity))
    }

    /// Completed calendar months between arrival and departure.
    pub fn tenure_months(&self) -> Option<u32> {
        let (arrival, departure) = (self.arrival?, self.departure?);
        completed_months(arrival, departure)
    }

    pub fn is_active(&self, as_of: NaiveDate) -> bool {
        match self.arrival {
            Some(arrival) if arrival <= as_of => self.departure.is_none_or(|end| end > as_of),
            _ => false,
        }
    }

    /// Snapshot membership at the end of `period`: arrived in or before it and
    /// not departed in or before it.
    pub fn is_in_post_during(&self, period: Period) -> bool {
        let granularity = period.granularity();
        match self.arrival_period(granularity) {
            Some(arrived) if arrived <= period => self
                .departure_period(granularity)
                .is_none_or(|left| left > period),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartureRecord {
    pub name: Option<String>,
    pub contract: ContractType,
    pub contract_label: Option<String>,
    pub planned_departure: Option<NaiveDate>,
    pub reason: DepartureReason,
    pub reason_label: Option<String>,
}

impl DepartureRecord {
    pub fn new(
        name: Option<String>,
        contract_label: Option<String>,
        planned_departure: Option<NaiveDate>,
        reason_label: Option<String>,
    ) -> Self {
        Self {
            contract: ContractType::from_label(contract_label.as_deref()),
            reason: DepartureReason::from_label(reason_label.as_deref()),
            name,
            contract_label,
            planned_departure,
            reason_label,
        }
    }

    pub fn departure_period(&self, granularity: Granularity) -> Option<Period> {
        self.planned_departure
            .map(|date| Period::of(date, granularity))
    }
}

pub(crate) fn completed_months(start: NaiveDate, end: NaiveDate) -> Option<u32> {
    if end < start {
        return None;
    }
    let mut months =
        (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() {
        months -= 1;
    }
    u32::try_from(months.max(0)).ok()
}
