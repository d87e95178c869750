use super::columns::{self, ColumnMap};
use super::{DatasetKind, LoadError};
use crate::workforce::domain::{DepartureRecord, PersonRecord};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::io::{BufRead, BufReader, Read};
use tracing::{debug, warn};

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];
const SHORT_YEAR_FORMATS: &[&str] = &["%d/%m/%y", "%d-%m-%y", "%d.%m.%y"];
const DATETIME_FORMATS: &[&str] = &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M", "%Y-%m-%d %H:%M:%S"];

/// Bookkeeping for one parsed sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub rows: usize,
    pub coerced_dates: usize,
    pub date_order_violations: usize,
    pub duplicate_columns: usize,
}

#[derive(Debug, Clone)]
pub struct Dataset<T> {
    pub records: Vec<T>,
    pub summary: LoadSummary,
}

impl<T> Dataset<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub fn parse_roster<R: Read>(reader: R, skip_rows: usize) -> Result<Dataset<PersonRecord>, LoadError> {
    let table = read_table(reader, skip_rows, DatasetKind::Roster)?;
    let mut summary = table.summary();
    let mut records = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        let arrival = read_date(&table.columns, row, columns::ARRIVAL, &mut summary);
        let mut departure = read_date(&table.columns, row, columns::END, &mut summary);

        if let (Some(start), Some(end)) = (arrival, departure) {
            if end < start {
                warn!(%start, %end, "departure precedes arrival, ignoring departure date");
                summary.date_order_violations += 1;
                departure = None;
            }
        }

        records.push(PersonRecord::new(
            owned(&table.columns, row, columns::NAME),
            owned(&table.columns, row, columns::CONTRACT),
            owned(&table.columns, row, columns::POLE),
            arrival,
            departure,
        ));
    }

    summary.rows = records.len();
    log_summary(DatasetKind::Roster, &summary);
    Ok(Dataset { records, summary })
}

pub fn parse_departures<R: Read>(
    reader: R,
    skip_rows: usize,
) -> Result<Dataset<DepartureRecord>, LoadError> {
    let table = read_table(reader, skip_rows, DatasetKind::Departures)?;
    let mut summary = table.summary();
    let mut records = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        let planned = read_date(&table.columns, row, columns::PLANNED_DEPARTURE, &mut summary);
        records.push(DepartureRecord::new(
            owned(&table.columns, row, columns::NAME),
            owned(&table.columns, row, columns::CONTRACT),
            planned,
            owned(&table.columns, row, columns::DEPARTURE_REASON),
        ));
    }

    summary.rows = records.len();
    log_summary(DatasetKind::Departures, &summary);
    Ok(Dataset { records, summary })
}

/// Parses a day-first date cell. Unrecognised input yields `None`.
pub fn parse_day_first_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    // chrono reads "21" as year 21 under %Y, so two-digit years get their own
    // formats. Any time of day after the date is dropped for them.
    let date_part = trimmed.split_whitespace().next().unwrap_or(trimmed);
    let segments: Vec<&str> = date_part.split(['/', '-', '.']).collect();
    let short_year = segments.len() == 3 && segments[0].len() <= 2 && segments[2].len() == 2;
    if short_year {
        return SHORT_YEAR_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
                .map(|dt| dt.date())
        })
}

struct RawTable {
    columns: ColumnMap,
    rows: Vec<csv::StringRecord>,
}

impl RawTable {
    fn summary(&self) -> LoadSummary {
        LoadSummary {
            duplicate_columns: self.columns.duplicates(),
            ..LoadSummary::default()
        }
    }
}

fn read_table<R: Read>(reader: R, skip_rows: usize, kind: DatasetKind) -> Result<RawTable, LoadError> {
    // Banner rows are raw lines: the csv reader would silently drop empty ones.
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    for _ in 0..skip_rows {
        line.clear();
        if reader.read_until(b'\n', &mut line).map_err(csv::Error::from)? == 0 {
            break;
        }
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = csv_reader.records();

    let headers = match records.next() {
        Some(record) => record?,
        None => return Err(LoadError::MissingHeader { dataset: kind }),
    };
    let columns = ColumnMap::from_headers(&headers);

    let missing = columns.missing(kind.required_columns());
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns {
            dataset: kind,
            columns: missing,
        });
    }

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows.push(record);
    }

    Ok(RawTable { columns, rows })
}

fn read_date(
    columns: &ColumnMap,
    row: &csv::StringRecord,
    column: &str,
    summary: &mut LoadSummary,
) -> Option<NaiveDate> {
    let raw = columns.get(row, column)?;
    let parsed = parse_day_first_date(raw);
    if parsed.is_none() {
        debug!(column, value = raw, "unparseable date coerced to null");
        summary.coerced_dates += 1;
    }
    parsed
}

fn owned(columns: &ColumnMap, row: &csv::StringRecord, column: &str) -> Option<String> {
    columns.get(row, column).map(str::to_string)
}

fn log_summary(kind: DatasetKind, summary: &LoadSummary) {
    if summary.coerced_dates > 0 || summary.date_order_violations > 0 {
        warn!(
            dataset = kind.label(),
            rows = summary.rows,
            coerced_dates = summary.coerced_dates,
            date_order_violations = summary.date_order_violations,
            "dataset parsed with recovered cells"
        );
    } else {
        debug!(dataset = kind.label(), rows = summary.rows, "dataset parsed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workforce::classifier::Category;
    use crate::workforce::domain::{ContractType, DepartureReason};

    const ROSTER: &str = "\
Suivi des effectifs,,,,,
Mis à jour le 01/09/2024,,,,,
,,,,,
Confidentiel,,,,,
 Nom ,Type de contrat,Pôle associé,Date d'arrivée,Date de fin (si applicable),Nom
Alice,CDI,Tech,15/01/2020,,doublon
Bruno,CDD,Sales,01/03/2020,31/08/2020,
Chloé,Stage,,31/02/2021,,
,,,,,
Damien,CDI,Ops,01/06/2022,01/01/2022,
";

    #[test]
    fn roster_skips_banner_and_parses_day_first_dates() {
        let dataset = parse_roster(ROSTER.as_bytes(), 4).expect("roster parses");
        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.summary.duplicate_columns, 1);

        let alice = &dataset.records[0];
        assert_eq!(alice.name.as_deref(), Some("Alice"));
        assert_eq!(alice.contract, ContractType::Permanent);
        assert_eq!(alice.category, Category::Tech);
        assert_eq!(alice.arrival, NaiveDate::from_ymd_opt(2020, 1, 15));
        assert_eq!(alice.departure, None);

        let bruno = &dataset.records[1];
        assert_eq!(bruno.departure, NaiveDate::from_ymd_opt(2020, 8, 31));
    }

    #[test]
    fn malformed_dates_become_null_and_are_counted() {
        let dataset = parse_roster(ROSTER.as_bytes(), 4).expect("roster parses");
        let chloe = &dataset.records[2];
        assert_eq!(chloe.arrival, None);
        assert_eq!(chloe.category, Category::Other);
        assert_eq!(dataset.summary.coerced_dates, 1);
    }

    #[test]
    fn departure_before_arrival_is_dropped() {
        let dataset = parse_roster(ROSTER.as_bytes(), 4).expect("roster parses");
        let damien = &dataset.records[3];
        assert!(damien.arrival.is_some());
        assert_eq!(damien.departure, None);
        assert_eq!(dataset.summary.date_order_violations, 1);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let csv = "Nom,Date d'arrivée\nAlice,01/01/2020\n";
        let err = parse_roster(csv.as_bytes(), 0).expect_err("end date column missing");
        match err {
            LoadError::MissingColumns { dataset, columns: missing } => {
                assert_eq!(dataset, DatasetKind::Roster);
                assert_eq!(missing, vec![columns::END.to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_banner_lines_count_towards_skipped_rows() {
        let csv = "Titre\n\nMis à jour\nConfidentiel\n\
Nom,Date d'arrivée,Date de fin (si applicable)\n\
Alice,01/01/2020,\n";
        let dataset = parse_roster(csv.as_bytes(), 4).expect("header found after banner");
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records[0].name.as_deref(), Some("Alice"));
        assert_eq!(dataset.records[0].arrival, NaiveDate::from_ymd_opt(2020, 1, 1));
    }

    #[test]
    fn empty_payload_has_no_header() {
        let err = parse_departures("a,b\n".as_bytes(), 3).expect_err("nothing after banner");
        assert!(matches!(err, LoadError::MissingHeader { .. }));
    }

    #[test]
    fn departures_sheet_reads_reason_and_optional_columns() {
        let csv = "\
Sorties,,
,,
,,
Nom,Date de départ prévue,Type de départ
Bruno,31/08/2020,Fin de contrat
Emma,2021-04-30,Démission
";
        let dataset = parse_departures(csv.as_bytes(), 3).expect("departures parse");
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[0].reason, DepartureReason::ContractExpiry);
        assert_eq!(dataset.records[1].reason, DepartureReason::Resignation);
        assert_eq!(
            dataset.records[1].planned_departure,
            NaiveDate::from_ymd_opt(2021, 4, 30)
        );
        assert_eq!(dataset.records[0].contract, ContractType::Other);
    }

    #[test]
    fn day_first_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 4);
        assert_eq!(parse_day_first_date("04/03/2021"), expected);
        assert_eq!(parse_day_first_date("04-03-2021"), expected);
        assert_eq!(parse_day_first_date("04.03.2021"), expected);
        assert_eq!(parse_day_first_date("04/03/21"), expected);
        assert_eq!(parse_day_first_date("2021-03-04"), expected);
        assert_eq!(parse_day_first_date("04/03/2021 09:30:00"), expected);
        assert_eq!(parse_day_first_date("04/03/21 09:30"), expected);
        assert_eq!(parse_day_first_date("04.03.21 09:30:15"), expected);
        assert_eq!(parse_day_first_date("March 4th"), None);
        assert_eq!(parse_day_first_date(""), None);
    }
}
