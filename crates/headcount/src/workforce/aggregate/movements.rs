use super::{DepartureReasonRow, Movement, MovementRow};
use crate::workforce::domain::{DepartureRecord, Granularity, PersonRecord};
use std::collections::BTreeMap;

/// Entries keyed by arrival period and exits keyed by departure period, as
/// one series.
pub fn movement_series(records: &[PersonRecord], granularity: Granularity) -> Vec<MovementRow> {
    let mut counts = BTreeMap::new();
    for record in records {
        if let Some(period) = record.arrival_period(granularity) {
            *counts.entry((period, Movement::Entry)).or_insert(0) += 1;
        }
        if let Some(period) = record.departure_period(granularity) {
            *counts.entry((period, Movement::Exit)).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .map(|((period, movement), count)| MovementRow {
            period,
            movement,
            count,
        })
        .collect()
}

/// Departures sheet rows per planned departure period and reason.
pub fn departures_by_reason(
    departures: &[DepartureRecord],
    granularity: Granularity,
) -> Vec<DepartureReasonRow> {
    let mut counts = BTreeMap::new();
    for departure in departures {
        if let Some(period) = departure.departure_period(granularity) {
            *counts.entry((period, departure.reason)).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .map(|((period, reason), count)| DepartureReasonRow {
            period,
            reason,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workforce::domain::{DepartureReason, Period};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn roster() -> Vec<PersonRecord> {
        vec![
            PersonRecord::new(None, None, None, date(2020, 1, 6), None),
            PersonRecord::new(None, None, None, date(2020, 4, 1), date(2021, 2, 28)),
            PersonRecord::new(None, None, None, date(2021, 9, 1), date(2021, 12, 31)),
            PersonRecord::new(None, None, None, None, date(2022, 1, 15)),
            PersonRecord::new(None, None, None, None, None),
        ]
    }

    #[test]
    fn series_totals_reproduce_source_counts() {
        let records = roster();
        let arrivals = records.iter().filter(|r| r.arrival.is_some()).count();
        let departures = records.iter().filter(|r| r.departure.is_some()).count();

        for granularity in [Granularity::Annual, Granularity::Monthly] {
            let series = movement_series(&records, granularity);
            let total = |kind: Movement| -> usize {
                series
                    .iter()
                    .filter(|row| row.movement == kind)
                    .map(|row| row.count)
                    .sum()
            };
            assert_eq!(total(Movement::Entry), arrivals);
            assert_eq!(total(Movement::Exit), departures);
        }
    }

    #[test]
    fn series_is_sorted_by_period_then_movement() {
        let series = movement_series(&roster(), Granularity::Annual);
        let keys: Vec<(Period, Movement, usize)> = series
            .iter()
            .map(|row| (row.period, row.movement, row.count))
            .collect();
        assert_eq!(
            keys,
            vec![
                (Period::Year(2020), Movement::Entry, 2),
                (Period::Year(2021), Movement::Entry, 1),
                (Period::Year(2021), Movement::Exit, 2),
                (Period::Year(2022), Movement::Exit, 1),
            ]
        );
    }

    #[test]
    fn departures_grouped_by_reason() {
        let departures = vec![
            DepartureRecord::new(None, None, date(2021, 3, 1), Some("Démission".into())),
            DepartureRecord::new(None, None, date(2021, 6, 1), Some("Démission".into())),
            DepartureRecord::new(None, None, date(2021, 6, 1), Some("Fin de contrat".into())),
            DepartureRecord::new(None, None, None, Some("Démission".into())),
        ];

        let rows = departures_by_reason(&departures, Granularity::Annual);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].reason, DepartureReason::Resignation);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[1].reason, DepartureReason::ContractExpiry);
        assert_eq!(rows[1].count, 1);
    }
}
