use chrono::NaiveDate;
use headcount::workforce::aggregate::{self, Cohort, Movement};
use headcount::workforce::report::views::ChartKind;
use headcount::workforce::sources::{parse_departures, parse_roster};
use headcount::workforce::{
    ContractType, Dashboard, DepartureRecord, Granularity, Period, PersonRecord, Ratio,
    ReportOptions, WorkforceReport, DEFAULT_DEPARTURES_SKIP_ROWS, DEFAULT_ROSTER_SKIP_ROWS,
};

fn load() -> (Vec<PersonRecord>, Vec<DepartureRecord>) {
    let roster = parse_roster(&include_bytes!("data/roster.csv")[..], DEFAULT_ROSTER_SKIP_ROWS)
        .expect("roster parses");
    let departures = parse_departures(
        &include_bytes!("data/departures.csv")[..],
        DEFAULT_DEPARTURES_SKIP_ROWS,
    )
    .expect("departures parse");
    (roster.records, departures.records)
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 6, 30).expect("valid reference date")
}

#[test]
fn annual_active_headcount_and_turnover() {
    let (roster, departures) = load();

    let active: Vec<(Period, usize)> = aggregate::active_headcount_series(&roster, Granularity::Annual)
        .into_iter()
        .map(|row| (row.period, row.count))
        .collect();
    assert_eq!(
        active,
        vec![
            (Period::Year(2020), 2),
            (Period::Year(2021), 5),
            (Period::Year(2022), 5),
        ]
    );

    let turnover = aggregate::turnover(&roster, &departures, Granularity::Annual, Cohort::All);
    let rates: Vec<Ratio> = turnover.iter().map(|row| row.rate).collect();
    assert_eq!(
        rates,
        vec![
            Ratio::Defined(50.0),
            Ratio::Defined(40.0),
            Ratio::Defined(40.0)
        ]
    );

    let voluntary: Vec<Option<usize>> = turnover.iter().map(|row| row.voluntary_exits).collect();
    assert_eq!(voluntary, vec![Some(0), Some(1), Some(2)]);
    assert_eq!(turnover[1].voluntary_rate, Ratio::Defined(20.0));
}

#[test]
fn movements_sum_to_dated_rows() {
    let (roster, _) = load();
    let rows = aggregate::movement_series(&roster, Granularity::Monthly);

    let entries: usize = rows
        .iter()
        .filter(|row| row.movement == Movement::Entry)
        .map(|row| row.count)
        .sum();
    let exits: usize = rows
        .iter()
        .filter(|row| row.movement == Movement::Exit)
        .map(|row| row.count)
        .sum();

    assert_eq!(entries, roster.iter().filter(|record| record.arrival.is_some()).count());
    assert_eq!(exits, roster.iter().filter(|record| record.departure.is_some()).count());
    assert!(rows.windows(2).all(|pair| pair[0].period <= pair[1].period));
}

#[test]
fn probation_breaks_group_by_arrival_year() {
    let (roster, _) = load();
    let rows = aggregate::probation_breaks(&roster, Granularity::Annual, 8);

    let figures: Vec<(Period, usize, usize)> = rows
        .iter()
        .map(|row| (row.period, row.entrants, row.breaks))
        .collect();
    assert_eq!(
        figures,
        vec![
            (Period::Year(2020), 3, 1),
            (Period::Year(2021), 5, 3),
            (Period::Year(2022), 2, 1),
        ]
    );
    assert_eq!(rows[1].rate, Ratio::Defined(60.0));
}

#[test]
fn headline_uses_reference_year() {
    let (roster, departures) = load();
    let report = WorkforceReport::build(
        &roster,
        &departures,
        Granularity::Annual,
        ReportOptions::new(as_of()),
    );

    let headline = &report.headline;
    assert_eq!(headline.year, 2022);
    assert_eq!(headline.active, 5);
    assert_eq!(headline.entries, 2);
    assert_eq!(headline.exits, 2);
    assert_eq!(headline.voluntary_exits, 2);
    assert_eq!(headline.turnover, Ratio::Defined(40.0));
    assert_eq!(headline.probation_break_rate, Ratio::Defined(50.0));
}

#[test]
fn contract_cohorts_only_cover_present_contracts() {
    let (roster, departures) = load();
    let report = WorkforceReport::build(
        &roster,
        &departures,
        Granularity::Annual,
        ReportOptions::new(as_of()),
    );

    assert!(report
        .turnover_by_contract
        .iter()
        .all(|row| row.cohort != Cohort::Contract(ContractType::Other)));
    assert!(report
        .turnover_by_category
        .iter()
        .all(|row| row.voluntary_exits.is_none() && row.voluntary_rate.is_undefined()));
}

#[test]
fn dashboard_serialises_both_tabs_with_null_ratios() {
    let (roster, departures) = load();
    let dashboard = Dashboard::build(&roster, &departures, ReportOptions::new(as_of()));

    assert_eq!(dashboard.annual.headcount_by_contract.chart, ChartKind::GroupedBar);
    assert_eq!(dashboard.monthly.headcount_by_contract.chart, ChartKind::StackedBar);
    assert_eq!(dashboard.monthly.active_headcount.rows[0].period, "2020-01");

    let json = serde_json::to_value(&dashboard).expect("dashboard serialises");
    let category_rows = json["annual"]["turnover_by_category"]["rows"]
        .as_array()
        .expect("rows array");
    assert!(!category_rows.is_empty());
    assert!(category_rows
        .iter()
        .all(|row| row["voluntary_rate"].is_null() && row.get("voluntary_exits").is_none()));
    assert_eq!(json["annual"]["headline"]["voluntary_turnover"], 40.0);
}
