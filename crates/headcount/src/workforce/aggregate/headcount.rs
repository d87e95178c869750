use super::{ActiveHeadcountRow, CategoryActiveRow, CategoryHeadcountRow, ContractHeadcountRow};
use crate::workforce::classifier::Category;
use crate::workforce::domain::{Granularity, Period, PersonRecord};
use std::collections::BTreeMap;

/// Arrivals per arrival period, split by contract type.
pub fn headcount_by_contract(
    records: &[PersonRecord],
    granularity: Granularity,
) -> Vec<ContractHeadcountRow> {
    let mut counts = BTreeMap::new();
    for record in records {
        if let Some(period) = record.arrival_period(granularity) {
            *counts.entry((period, record.contract)).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .map(|((period, contract), count)| ContractHeadcountRow {
            period,
            contract,
            count,
        })
        .collect()
}

/// Arrivals per arrival period, split by department category.
pub fn headcount_by_category(
    records: &[PersonRecord],
    granularity: Granularity,
) -> Vec<CategoryHeadcountRow> {
    let mut counts = BTreeMap::new();
    for record in records {
        if let Some(period) = record.arrival_period(granularity) {
            *counts.entry((period, record.category)).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .map(|((period, category), count)| CategoryHeadcountRow {
            period,
            category,
            count,
        })
        .collect()
}

/// Rows in post at `period`: arrived in or before it, not departed in or
/// before it.
pub fn active_headcount(records: &[PersonRecord], period: Period) -> usize {
    records
        .iter()
        .filter(|record| record.is_in_post_during(period))
        .count()
}

/// Active headcount for every period between the first arrival and the last
/// recorded movement.
pub fn active_headcount_series(
    records: &[PersonRecord],
    granularity: Granularity,
) -> Vec<ActiveHeadcountRow> {
    let Some(span) = PeriodSpan::of(records, granularity) else {
        return Vec::new();
    };

    span.sweep(records.iter(), granularity)
        .into_iter()
        .map(|(period, count)| ActiveHeadcountRow { period, count })
        .collect()
}

/// Same as [`active_headcount_series`], one series per category over a shared
/// period range. Categories with no rows at all are left out.
pub fn active_headcount_by_category(
    records: &[PersonRecord],
    granularity: Granularity,
) -> Vec<CategoryActiveRow> {
    let Some(span) = PeriodSpan::of(records, granularity) else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for category in Category::ordered() {
        let members: Vec<&PersonRecord> = records
            .iter()
            .filter(|record| record.category == category)
            .collect();
        if members.is_empty() {
            continue;
        }

        rows.extend(
            span.sweep(members.into_iter(), granularity)
                .into_iter()
                .map(|(period, count)| CategoryActiveRow {
                    period,
                    category,
                    count,
                }),
        );
    }

    rows.sort_by_key(|row| (row.period, row.category));
    rows
}

/// Inclusive ordinal range covered by a record set.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PeriodSpan {
    first: i64,
    last: i64,
}

impl PeriodSpan {
    pub(crate) fn of<'a>(
        records: impl IntoIterator<Item = &'a PersonRecord>,
        granularity: Granularity,
    ) -> Option<Self> {
        let mut span: Option<Self> = None;
        for record in records {
            let Some(arrival) = record.arrival_period(granularity) else {
                continue;
            };
            let start = arrival.ordinal();
            let end = record
                .departure_period(granularity)
                .map_or(start, |period| period.ordinal().max(start));

            span = Some(match span {
                Some(current) => Self {
                    first: current.first.min(start),
                    last: current.last.max(end),
                },
                None => Self {
                    first: start,
                    last: end,
                },
            });
        }
        span
    }

    /// Interval-overlap count: each row adds one from its arrival period up to
    /// (excluding) its departure period, accumulated over a difference array.
    pub(crate) fn sweep<'a>(
        self,
        records: impl Iterator<Item = &'a PersonRecord>,
        granularity: Granularity,
    ) -> Vec<(Period, usize)> {
        let width = (self.last - self.first + 1) as usize;
        let mut deltas = vec![0_i64; width + 1];

        for record in records {
            let Some(arrival) = record.arrival_period(granularity) else {
                continue;
            };
            let start = arrival.ordinal();
            let end = record
                .departure_period(granularity)
                .map_or(self.last + 1, |period| period.ordinal());
            if end <= start || start > self.last || end <= self.first {
                continue;
            }

            let from = (start.max(self.first) - self.first) as usize;
            let to = (end.min(self.last + 1) - self.first) as usize;
            deltas[from] += 1;
            deltas[to] -= 1;
        }

        let mut running = 0_i64;
        (0..width)
            .map(|offset| {
                running += deltas[offset];
                let period = Period::from_ordinal(self.first + offset as i64, granularity);
                (period, running.max(0) as usize)
            })
            .collect()
    }
}
