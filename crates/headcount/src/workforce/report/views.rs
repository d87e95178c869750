use super::super::aggregate::{Cohort, Headline, Movement};
use super::super::classifier::Category;
use super::super::domain::{ContractType, DepartureReason, Granularity, Ratio};
use chrono::NaiveDate;
use serde::Serialize;

/// How a section is meant to be drawn by whatever consumes the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    GroupedBar,
    StackedBar,
    Line,
    Table,
}

#[derive(Debug, Clone, Serialize)]
pub struct Section<T> {
    pub title: &'static str,
    pub chart: ChartKind,
    pub rows: Vec<T>,
}

impl<T> Section<T> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContractHeadcountEntry {
    pub period: String,
    pub contract: ContractType,
    pub contract_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryHeadcountEntry {
    pub period: String,
    pub category: Category,
    pub category_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovementEntry {
    pub period: String,
    pub movement: Movement,
    pub movement_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartureReasonEntry {
    pub period: String,
    pub reason: DepartureReason,
    pub reason_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveHeadcountEntry {
    pub period: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryActiveEntry {
    pub period: String,
    pub category: Category,
    pub category_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnoverEntry {
    pub period: String,
    pub cohort: Cohort,
    pub cohort_label: &'static str,
    pub exits: usize,
    pub active: usize,
    pub rate: Ratio,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voluntary_exits: Option<usize>,
    pub voluntary_rate: Ratio,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbationEntry {
    pub period: String,
    pub entrants: usize,
    pub breaks: usize,
    pub rate: Ratio,
}

/// One tab of the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct WorkforceReportSummary {
    pub granularity: Granularity,
    pub granularity_label: &'static str,
    pub as_of: NaiveDate,
    pub classifier_version: u32,
    pub probation_months: u32,
    pub headline: Headline,
    pub headcount_by_contract: Section<ContractHeadcountEntry>,
    pub headcount_by_category: Section<CategoryHeadcountEntry>,
    pub movements: Section<MovementEntry>,
    pub departures_by_reason: Section<DepartureReasonEntry>,
    pub active_headcount: Section<ActiveHeadcountEntry>,
    pub active_headcount_by_category: Section<CategoryActiveEntry>,
    pub turnover: Section<TurnoverEntry>,
    pub turnover_by_contract: Section<TurnoverEntry>,
    pub turnover_by_category: Section<TurnoverEntry>,
    pub probation_breaks: Section<ProbationEntry>,
}

/// Both tabs side by side.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub annual: WorkforceReportSummary,
    pub monthly: WorkforceReportSummary,
}
