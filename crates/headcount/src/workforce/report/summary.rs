use super::super::aggregate::{
    self, ActiveHeadcountRow, CategoryActiveRow, CategoryHeadcountRow, Cohort,
    ContractHeadcountRow, DepartureReasonRow, Headline, MovementRow, ProbationRow, TurnoverRow,
    DEFAULT_PROBATION_MONTHS,
};
use super::super::classifier::{Category, CLASSIFIER_VERSION};
use super::super::domain::{ContractType, DepartureRecord, Granularity, PersonRecord};
use super::views::{
    ActiveHeadcountEntry, CategoryActiveEntry, CategoryHeadcountEntry, ChartKind,
    ContractHeadcountEntry, Dashboard, DepartureReasonEntry, MovementEntry, ProbationEntry,
    Section, TurnoverEntry, WorkforceReportSummary,
};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub as_of: NaiveDate,
    pub probation_months: u32,
}

impl ReportOptions {
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            probation_months: DEFAULT_PROBATION_MONTHS,
        }
    }
}

/// All aggregates for one granularity, still keyed by typed periods.
#[derive(Debug, Clone)]
pub struct WorkforceReport {
    pub granularity: Granularity,
    pub options: ReportOptions,
    pub headline: Headline,
    pub headcount_by_contract: Vec<ContractHeadcountRow>,
    pub headcount_by_category: Vec<CategoryHeadcountRow>,
    pub movements: Vec<MovementRow>,
    pub departures_by_reason: Vec<DepartureReasonRow>,
    pub active_headcount: Vec<ActiveHeadcountRow>,
    pub active_headcount_by_category: Vec<CategoryActiveRow>,
    pub turnover: Vec<TurnoverRow>,
    pub turnover_by_contract: Vec<TurnoverRow>,
    pub turnover_by_category: Vec<TurnoverRow>,
    pub probation_breaks: Vec<ProbationRow>,
}

impl WorkforceReport {
    pub fn build(
        roster: &[PersonRecord],
        departures: &[DepartureRecord],
        granularity: Granularity,
        options: ReportOptions,
    ) -> Self {
        let contracts: Vec<ContractType> = ContractType::ordered()
            .into_iter()
            .filter(|contract| roster.iter().any(|record| record.contract == *contract))
            .collect();
        let categories: Vec<Category> = Category::ordered()
            .into_iter()
            .filter(|category| roster.iter().any(|record| record.category == *category))
            .collect();

        let turnover_by_contract = cohort_turnover(
            roster,
            departures,
            granularity,
            contracts.into_iter().map(Cohort::Contract),
        );
        let turnover_by_category = cohort_turnover(
            roster,
            departures,
            granularity,
            categories.into_iter().map(Cohort::Category),
        );

        Self {
            granularity,
            options,
            headline: aggregate::headline(
                roster,
                departures,
                options.as_of,
                options.probation_months,
            ),
            headcount_by_contract: aggregate::headcount_by_contract(roster, granularity),
            headcount_by_category: aggregate::headcount_by_category(roster, granularity),
            movements: aggregate::movement_series(roster, granularity),
            departures_by_reason: aggregate::departures_by_reason(departures, granularity),
            active_headcount: aggregate::active_headcount_series(roster, granularity),
            active_headcount_by_category: aggregate::active_headcount_by_category(
                roster,
                granularity,
            ),
            turnover: aggregate::turnover(roster, departures, granularity, Cohort::All),
            turnover_by_contract,
            turnover_by_category,
            probation_breaks: aggregate::probation_breaks(
                roster,
                granularity,
                options.probation_months,
            ),
        }
    }

    pub fn summary(&self) -> WorkforceReportSummary {
        let stacked = match self.granularity {
            Granularity::Annual => ChartKind::GroupedBar,
            Granularity::Monthly => ChartKind::StackedBar,
        };

        WorkforceReportSummary {
            granularity: self.granularity,
            granularity_label: self.granularity.label(),
            as_of: self.options.as_of,
            classifier_version: CLASSIFIER_VERSION,
            probation_months: self.options.probation_months,
            headline: self.headline.clone(),
            headcount_by_contract: Section {
                title: "Effectifs par contrat",
                chart: stacked,
                rows: self
                    .headcount_by_contract
                    .iter()
                    .map(|row| ContractHeadcountEntry {
                        period: row.period.label(),
                        contract: row.contract,
                        contract_label: row.contract.label(),
                        count: row.count,
                    })
                    .collect(),
            },
            headcount_by_category: Section {
                title: "Arrivées par pôle",
                chart: ChartKind::GroupedBar,
                rows: self
                    .headcount_by_category
                    .iter()
                    .map(|row| CategoryHeadcountEntry {
                        period: row.period.label(),
                        category: row.category,
                        category_label: row.category.label(),
                        count: row.count,
                    })
                    .collect(),
            },
            movements: Section {
                title: "Entrées / Sorties",
                chart: ChartKind::GroupedBar,
                rows: self
                    .movements
                    .iter()
                    .map(|row| MovementEntry {
                        period: row.period.label(),
                        movement: row.movement,
                        movement_label: row.movement.label(),
                        count: row.count,
                    })
                    .collect(),
            },
            departures_by_reason: Section {
                title: "Départs par type",
                chart: ChartKind::GroupedBar,
                rows: self
                    .departures_by_reason
                    .iter()
                    .map(|row| DepartureReasonEntry {
                        period: row.period.label(),
                        reason: row.reason,
                        reason_label: row.reason.label(),
                        count: row.count,
                    })
                    .collect(),
            },
            active_headcount: Section {
                title: "Effectif en poste",
                chart: ChartKind::Line,
                rows: self
                    .active_headcount
                    .iter()
                    .map(|row| ActiveHeadcountEntry {
                        period: row.period.label(),
                        count: row.count,
                    })
                    .collect(),
            },
            active_headcount_by_category: Section {
                title: "Effectif en poste par pôle",
                chart: ChartKind::Line,
                rows: self
                    .active_headcount_by_category
                    .iter()
                    .map(|row| CategoryActiveEntry {
                        period: row.period.label(),
                        category: row.category,
                        category_label: row.category.label(),
                        count: row.count,
                    })
                    .collect(),
            },
            turnover: turnover_section("Turnover", &self.turnover),
            turnover_by_contract: turnover_section(
                "Turnover par contrat",
                &self.turnover_by_contract,
            ),
            turnover_by_category: turnover_section("Turnover par pôle", &self.turnover_by_category),
            probation_breaks: Section {
                title: "Ruptures de période d'essai",
                chart: ChartKind::Table,
                rows: self
                    .probation_breaks
                    .iter()
                    .map(|row| ProbationEntry {
                        period: row.period.label(),
                        entrants: row.entrants,
                        breaks: row.breaks,
                        rate: row.rate,
                    })
                    .collect(),
            },
        }
    }
}

impl Dashboard {
    pub fn build(
        roster: &[PersonRecord],
        departures: &[DepartureRecord],
        options: ReportOptions,
    ) -> Self {
        Self {
            annual: WorkforceReport::build(roster, departures, Granularity::Annual, options)
                .summary(),
            monthly: WorkforceReport::build(roster, departures, Granularity::Monthly, options)
                .summary(),
        }
    }
}

fn cohort_turnover(
    roster: &[PersonRecord],
    departures: &[DepartureRecord],
    granularity: Granularity,
    cohorts: impl Iterator<Item = Cohort>,
) -> Vec<TurnoverRow> {
    let mut rows: Vec<TurnoverRow> = cohorts
        .flat_map(|cohort| aggregate::turnover(roster, departures, granularity, cohort))
        .collect();
    // stable: cohort order within a period is preserved
    rows.sort_by_key(|row| row.period);
    rows
}

fn turnover_section(title: &'static str, rows: &[TurnoverRow]) -> Section<TurnoverEntry> {
    Section {
        title,
        chart: ChartKind::Table,
        rows: rows
            .iter()
            .map(|row| TurnoverEntry {
                period: row.period.label(),
                cohort: row.cohort,
                cohort_label: row.cohort.label(),
                exits: row.exits,
                active: row.active,
                rate: row.rate,
                voluntary_exits: row.voluntary_exits,
                voluntary_rate: row.voluntary_rate,
            })
            .collect(),
    }
}
