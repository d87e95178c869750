use super::headcount::PeriodSpan;
use super::{Cohort, Headline, ProbationRow, TurnoverRow};
use crate::workforce::domain::{DepartureRecord, Granularity, Period, PersonRecord, Ratio};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_PROBATION_MONTHS: u32 = 8;

/// Exits over active headcount per period for one cohort.
///
/// Voluntary figures come from the departures sheet and skip natural contract
/// expiries; they are only available when the cohort can be read off that
/// sheet.
pub fn turnover(
    records: &[PersonRecord],
    departures: &[DepartureRecord],
    granularity: Granularity,
    cohort: Cohort,
) -> Vec<TurnoverRow> {
    let members: Vec<&PersonRecord> = records
        .iter()
        .filter(|record| cohort.includes_person(record))
        .collect();

    let mut active = BTreeMap::new();
    if let Some(span) = PeriodSpan::of(members.iter().copied(), granularity) {
        active.extend(span.sweep(members.iter().copied(), granularity));
    }

    let mut exits: BTreeMap<Period, usize> = BTreeMap::new();
    for record in &members {
        if let Some(period) = record.departure_period(granularity) {
            *exits.entry(period).or_insert(0) += 1;
        }
    }

    let voluntary = voluntary_exits(departures, granularity, cohort);

    let mut periods: BTreeSet<Period> = active.keys().copied().collect();
    periods.extend(exits.keys().copied());
    if let Some(voluntary) = &voluntary {
        periods.extend(voluntary.keys().copied());
    }

    periods
        .into_iter()
        .map(|period| {
            let active_count = active.get(&period).copied().unwrap_or(0);
            let exit_count = exits.get(&period).copied().unwrap_or(0);
            let voluntary_count = voluntary
                .as_ref()
                .map(|counts| counts.get(&period).copied().unwrap_or(0));

            TurnoverRow {
                period,
                cohort,
                exits: exit_count,
                active: active_count,
                rate: Ratio::percentage(exit_count, active_count),
                voluntary_exits: voluntary_count,
                voluntary_rate: voluntary_count
                    .map_or(Ratio::Undefined, |count| Ratio::percentage(count, active_count)),
            }
        })
        .collect()
}

fn voluntary_exits(
    departures: &[DepartureRecord],
    granularity: Granularity,
    cohort: Cohort,
) -> Option<BTreeMap<Period, usize>> {
    if !cohort.applies_to_departures() {
        return None;
    }

    let mut counts = BTreeMap::new();
    for departure in departures {
        if !cohort.includes_departure(departure) || !departure.reason.is_voluntary_turnover() {
            continue;
        }
        if let Some(period) = departure.departure_period(granularity) {
            *counts.entry(period).or_insert(0) += 1;
        }
    }
    Some(counts)
}

/// Entrants per arrival period whose stint ended before `threshold_months`
/// completed months.
pub fn probation_breaks(
    records: &[PersonRecord],
    granularity: Granularity,
    threshold_months: u32,
) -> Vec<ProbationRow> {
    let mut buckets: BTreeMap<Period, (usize, usize)> = BTreeMap::new();
    for record in records {
        let Some(period) = record.arrival_period(granularity) else {
            continue;
        };
        let bucket = buckets.entry(period).or_insert((0, 0));
        bucket.0 += 1;
        if is_probation_break(record, threshold_months) {
            bucket.1 += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(period, (entrants, breaks))| ProbationRow {
            period,
            entrants,
            breaks,
            rate: Ratio::percentage(breaks, entrants),
        })
        .collect()
}

pub fn is_probation_break(record: &PersonRecord, threshold_months: u32) -> bool {
    record
        .tenure_months()
        .is_some_and(|months| months < threshold_months)
}

/// Figures for the calendar year containing `as_of`.
pub fn headline(
    records: &[PersonRecord],
    departures: &[DepartureRecord],
    as_of: NaiveDate,
    threshold_months: u32,
) -> Headline {
    let year = Period::Year(as_of.year());
    let in_year = |period: Option<Period>| period == Some(year);

    let active_now = records.iter().filter(|record| record.is_active(as_of)).count();
    let entries = records
        .iter()
        .filter(|record| in_year(record.arrival_period(Granularity::Annual)))
        .count();
    let exits = records
        .iter()
        .filter(|record| in_year(record.departure_period(Granularity::Annual)))
        .count();
    let voluntary_exits = departures
        .iter()
        .filter(|departure| departure.reason.is_voluntary_turnover())
        .filter(|departure| in_year(departure.departure_period(Granularity::Annual)))
        .count();
    let probation_breaks = records
        .iter()
        .filter(|record| in_year(record.arrival_period(Granularity::Annual)))
        .filter(|record| is_probation_break(record, threshold_months))
        .count();

    let active_in_year = super::active_headcount(records, year);

    Headline {
        as_of,
        year: as_of.year(),
        active: active_now,
        entries,
        exits,
        voluntary_exits,
        turnover: Ratio::percentage(exits, active_in_year),
        voluntary_turnover: Ratio::percentage(voluntary_exits, active_in_year),
        probation_break_rate: Ratio::percentage(probation_breaks, entries),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workforce::classifier::Category;
    use crate::workforce::domain::ContractType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn person(contract: &str, pole: &str, arrival: NaiveDate, departure: Option<NaiveDate>) -> PersonRecord {
        PersonRecord::new(
            None,
            Some(contract.to_string()),
            Some(pole.to_string()),
            Some(arrival),
            departure,
        )
    }

    fn abc() -> Vec<PersonRecord> {
        vec![
            person("CDI", "Tech", date(2020, 2, 1), None),
            person("CDI", "Sales", date(2020, 5, 1), Some(date(2021, 3, 31))),
            person("CDI", "Tech", date(2021, 9, 1), None),
        ]
    }

    #[test]
    fn turnover_matches_worked_example() {
        let rows = turnover(&abc(), &[], Granularity::Annual, Cohort::All);
        let row_2021 = rows
            .iter()
            .find(|row| row.period == Period::Year(2021))
            .expect("2021 row");
        assert_eq!(row_2021.exits, 1);
        assert_eq!(row_2021.active, 2);
        assert_eq!(row_2021.rate, Ratio::Defined(50.0));

        let row_2020 = rows
            .iter()
            .find(|row| row.period == Period::Year(2020))
            .expect("2020 row");
        assert_eq!(row_2020.rate, Ratio::Defined(0.0));
    }

    #[test]
    fn zero_headcount_gives_undefined_ratio() {
        let departures = vec![DepartureRecord::new(
            None,
            Some("CDD".to_string()),
            Some(date(2019, 6, 30)),
            Some("Démission".to_string()),
        )];
        let rows = turnover(
            &abc(),
            &departures,
            Granularity::Annual,
            Cohort::Contract(ContractType::FixedTerm),
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].active, 0);
        assert!(rows[0].rate.is_undefined());
        assert_eq!(rows[0].voluntary_exits, Some(1));
        assert!(rows[0].voluntary_rate.is_undefined());
    }

    #[test]
    fn voluntary_turnover_skips_contract_expiry() {
        let departures = vec![
            DepartureRecord::new(None, None, Some(date(2021, 3, 31)), Some("Démission".into())),
            DepartureRecord::new(None, None, Some(date(2021, 8, 31)), Some("Fin de contrat".into())),
        ];
        let rows = turnover(&abc(), &departures, Granularity::Annual, Cohort::All);
        let row_2021 = rows
            .iter()
            .find(|row| row.period == Period::Year(2021))
            .expect("2021 row");
        assert_eq!(row_2021.voluntary_exits, Some(1));
        assert_eq!(row_2021.voluntary_rate, Ratio::Defined(50.0));
    }

    #[test]
    fn category_cohort_has_no_voluntary_figures() {
        let rows = turnover(
            &abc(),
            &[],
            Granularity::Annual,
            Cohort::Category(Category::Sales),
        );
        let row_2021 = rows
            .iter()
            .find(|row| row.period == Period::Year(2021))
            .expect("2021 row");
        assert_eq!(row_2021.exits, 1);
        assert_eq!(row_2021.active, 0);
        assert!(row_2021.rate.is_undefined());
        assert_eq!(row_2021.voluntary_exits, None);
    }

    #[test]
    fn short_stints_count_as_probation_breaks() {
        let records = vec![
            person("CDI", "Tech", date(2021, 1, 4), Some(date(2021, 6, 4))),
            person("CDI", "Tech", date(2021, 2, 1), Some(date(2021, 12, 15))),
            person("CDI", "Ops", date(2021, 3, 1), None),
            person("CDI", "Ops", date(2022, 3, 1), None),
        ];
        assert!(is_probation_break(&records[0], DEFAULT_PROBATION_MONTHS));
        assert!(!is_probation_break(&records[1], DEFAULT_PROBATION_MONTHS));

        let rows = probation_breaks(&records, Granularity::Annual, DEFAULT_PROBATION_MONTHS);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].entrants, 3);
        assert_eq!(rows[0].breaks, 1);
        assert_eq!(rows[0].rate, Ratio::Defined(33.33));
        assert_eq!(rows[1].breaks, 0);
    }

    #[test]
    fn headline_summarises_the_evaluation_year() {
        let departures = vec![DepartureRecord::new(
            None,
            None,
            Some(date(2021, 3, 31)),
            Some("Démission".into()),
        )];
        let headline = headline(&abc(), &departures, date(2021, 10, 1), DEFAULT_PROBATION_MONTHS);
        assert_eq!(headline.year, 2021);
        assert_eq!(headline.active, 2);
        assert_eq!(headline.entries, 1);
        assert_eq!(headline.exits, 1);
        assert_eq!(headline.turnover, Ratio::Defined(50.0));
        assert_eq!(headline.voluntary_turnover, Ratio::Defined(50.0));
        assert_eq!(headline.probation_break_rate, Ratio::Defined(0.0));
    }
}
