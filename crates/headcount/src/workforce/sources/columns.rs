use std::collections::HashMap;

pub(crate) const NAME: &str = "Nom";
pub(crate) const CONTRACT: &str = "Type de contrat";
pub(crate) const POLE: &str = "Pôle associé";
pub(crate) const ARRIVAL: &str = "Date d'arrivée";
pub(crate) const END: &str = "Date de fin (si applicable)";
pub(crate) const PLANNED_DEPARTURE: &str = "Date de départ prévue";
pub(crate) const DEPARTURE_REASON: &str = "Type de départ";

pub(crate) const ROSTER_REQUIRED: &[&str] = &[ARRIVAL, END];
pub(crate) const DEPARTURES_REQUIRED: &[&str] = &[PLANNED_DEPARTURE];

/// Header lookup built from the first data row after the banner.
///
/// Names are trimmed and normalised; a repeated name keeps the index of its
/// first occurrence.
#[derive(Debug)]
pub(crate) struct ColumnMap {
    indices: HashMap<String, usize>,
    duplicates: usize,
}

impl ColumnMap {
    pub(crate) fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut indices = HashMap::new();
        let mut duplicates = 0;

        for (index, field) in headers.iter().enumerate() {
            let name = normalize_header(field);
            if name.is_empty() {
                continue;
            }
            if indices.contains_key(&name) {
                duplicates += 1;
                continue;
            }
            indices.insert(name, index);
        }

        Self {
            indices,
            duplicates,
        }
    }

    pub(crate) fn get<'a>(&self, record: &'a csv::StringRecord, column: &str) -> Option<&'a str> {
        self.indices
            .get(column)
            .and_then(|&index| record.get(index))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub(crate) fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|column| !self.indices.contains_key(**column))
            .map(|column| (*column).to_string())
            .collect()
    }

    pub(crate) fn duplicates(&self) -> usize {
        self.duplicates
    }
}

/// Trims the header and folds the typographic apostrophe Google Sheets
/// sometimes emits so "Date d’arrivée" resolves like "Date d'arrivée".
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "").replace('\u{2019}', "'");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
