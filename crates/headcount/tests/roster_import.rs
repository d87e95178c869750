use chrono::NaiveDate;
use headcount::workforce::sources::{parse_departures, parse_roster};
use headcount::workforce::{
    Category, ContractType, DepartureReason, LoadError, DEFAULT_DEPARTURES_SKIP_ROWS,
    DEFAULT_ROSTER_SKIP_ROWS,
};

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

#[test]
fn roster_export_skips_banner_and_derives_fields() {
    let data = include_bytes!("data/roster.csv");
    let roster = parse_roster(&data[..], DEFAULT_ROSTER_SKIP_ROWS).expect("roster parses");

    assert_eq!(roster.len(), 10);
    assert_eq!(roster.summary.rows, 10);
    assert_eq!(roster.summary.coerced_dates, 0);

    let alice = &roster.records[0];
    assert_eq!(alice.name.as_deref(), Some("Alice Martin"));
    assert_eq!(alice.contract, ContractType::Permanent);
    assert_eq!(alice.category, Category::Tech);
    assert_eq!(alice.arrival, date(2020, 1, 6));
    assert!(alice.departure.is_none());

    let categories: Vec<Category> = roster.records.iter().map(|record| record.category).collect();
    assert_eq!(
        categories,
        vec![
            Category::Tech,
            Category::Sales,
            Category::Ops,
            Category::GeneralAndAdmin,
            Category::Marketing,
            Category::Tech,
            Category::Codir,
            Category::GeneralAndAdmin,
            Category::Uk,
            Category::Sales,
        ]
    );

    let interns = roster
        .records
        .iter()
        .filter(|record| record.contract == ContractType::Intern)
        .count();
    assert_eq!(interns, 2);
}

#[test]
fn departures_export_maps_reasons() {
    let data = include_bytes!("data/departures.csv");
    let departures =
        parse_departures(&data[..], DEFAULT_DEPARTURES_SKIP_ROWS).expect("departures parse");

    let reasons: Vec<DepartureReason> = departures
        .records
        .iter()
        .map(|record| record.reason)
        .collect();
    assert_eq!(
        reasons,
        vec![
            DepartureReason::ContractExpiry,
            DepartureReason::Resignation,
            DepartureReason::ContractExpiry,
            DepartureReason::ProbationBreak,
            DepartureReason::MutualAgreement,
        ]
    );
    assert_eq!(departures.records[3].planned_departure, date(2022, 3, 15));
}

#[test]
fn wrong_banner_height_surfaces_missing_columns() {
    let data = include_bytes!("data/roster.csv");
    let err = parse_roster(&data[..], 2).expect_err("header row is missed");

    match err {
        LoadError::MissingColumns { columns, .. } => {
            assert!(columns.iter().any(|column| column == "Date d'arrivée"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_cells_are_coerced_not_fatal() {
    let csv = "Nom,Type de contrat,Pôle associé,Date d'arrivée,Date de fin (si applicable)\n\
Zoé,CDI,Tech,pas de date,\n\
Yann,,,2021-05-03,03/05/2020\n";

    let roster = parse_roster(csv.as_bytes(), 0).expect("roster parses");
    assert_eq!(roster.len(), 2);
    assert!(roster.records[0].arrival.is_none());
    assert_eq!(roster.summary.coerced_dates, 1);

    let yann = &roster.records[1];
    assert_eq!(yann.contract, ContractType::Other);
    assert_eq!(yann.category, Category::Other);
    assert_eq!(yann.arrival, date(2021, 5, 3));
    assert!(yann.departure.is_none());
    assert_eq!(roster.summary.date_order_violations, 1);
}
