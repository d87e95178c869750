mod cache;
mod columns;
mod parser;

pub use cache::SourceCache;
pub use parser::{parse_day_first_date, parse_departures, parse_roster, Dataset, LoadSummary};

use crate::workforce::domain::{DepartureRecord, PersonRecord};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_ROSTER_SKIP_ROWS: usize = 4;
pub const DEFAULT_DEPARTURES_SKIP_ROWS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Roster,
    Departures,
}

impl DatasetKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Roster => "roster",
            Self::Departures => "departures",
        }
    }

    pub(crate) fn required_columns(self) -> &'static [&'static str] {
        match self {
            Self::Roster => columns::ROSTER_REQUIRED,
            Self::Departures => columns::DEPARTURES_REQUIRED,
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a CSV export lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceLocation {
    Url(String),
    Path(PathBuf),
}

impl SourceLocation {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lowered = trimmed.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A source plus the number of banner rows to drop before the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub location: SourceLocation,
    pub skip_rows: usize,
}

impl SourceSpec {
    pub fn new(location: SourceLocation, skip_rows: usize) -> Self {
        Self {
            location,
            skip_rows,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to fetch {location}: {source}")]
    Http {
        location: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{location} answered with HTTP {status}")]
    Status { location: String, status: u16 },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("{dataset} sheet has no header row after the banner")]
    MissingHeader { dataset: DatasetKind },
    #[error("{dataset} sheet is missing required columns: {}", .columns.join(", "))]
    MissingColumns {
        dataset: DatasetKind,
        columns: Vec<String>,
    },
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl LoadError {
    /// True when the remote side, not the payload, is at fault.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Status { .. })
    }
}

pub type RosterDataset = Dataset<PersonRecord>;
pub type DeparturesDataset = Dataset<DepartureRecord>;

/// Fetches and parses both sheets, memoising each by location until told to
/// refresh.
#[derive(Debug)]
pub struct WorkforceLoader {
    http: reqwest::Client,
    roster: SourceCache<RosterDataset>,
    departures: SourceCache<DeparturesDataset>,
    fetches: usize,
}

impl WorkforceLoader {
    pub fn new(timeout: Duration) -> Result<Self, LoadError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LoadError::Client)?;

        Ok(Self {
            http,
            roster: SourceCache::default(),
            departures: SourceCache::default(),
            fetches: 0,
        })
    }

    pub async fn load_roster(&mut self, spec: &SourceSpec) -> Result<Arc<RosterDataset>, LoadError> {
        if let Some(hit) = self.roster.get(&spec.location) {
            debug!(location = %spec.location, "roster served from cache");
            return Ok(hit);
        }

        let payload = self.fetch(&spec.location).await?;
        let dataset = parse_roster(payload.as_slice(), spec.skip_rows)?;
        info!(location = %spec.location, rows = dataset.len(), "roster loaded");
        Ok(self.roster.insert(spec.location.clone(), dataset))
    }

    pub async fn load_departures(
        &mut self,
        spec: &SourceSpec,
    ) -> Result<Arc<DeparturesDataset>, LoadError> {
        if let Some(hit) = self.departures.get(&spec.location) {
            debug!(location = %spec.location, "departures served from cache");
            return Ok(hit);
        }

        let payload = self.fetch(&spec.location).await?;
        let dataset = parse_departures(payload.as_slice(), spec.skip_rows)?;
        info!(location = %spec.location, rows = dataset.len(), "departures loaded");
        Ok(self.departures.insert(spec.location.clone(), dataset))
    }

    /// Drops whatever was cached for `location`, in either sheet.
    pub fn invalidate(&mut self, location: &SourceLocation) -> bool {
        let roster = self.roster.invalidate(location);
        let departures = self.departures.invalidate(location);
        roster || departures
    }

    pub fn clear(&mut self) -> usize {
        let evicted = self.roster.clear() + self.departures.clear();
        info!(evicted, "source cache cleared");
        evicted
    }

    pub fn cached_sources(&self) -> Vec<SourceLocation> {
        self.roster
            .locations()
            .chain(self.departures.locations())
            .cloned()
            .collect()
    }

    /// Number of payloads actually fetched since construction.
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    async fn fetch(&mut self, location: &SourceLocation) -> Result<Vec<u8>, LoadError> {
        self.fetches += 1;
        match location {
            SourceLocation::Url(url) => {
                let response = self
                    .http
                    .get(url)
                    .send()
                    .await
                    .map_err(|source| LoadError::Http {
                        location: url.clone(),
                        source,
                    })?;

                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        location: url.clone(),
                        status: status.as_u16(),
                    });
                }

                let body = response.bytes().await.map_err(|source| LoadError::Http {
                    location: url.clone(),
                    source,
                })?;
                Ok(body.to_vec())
            }
            SourceLocation::Path(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| LoadError::Io {
                        path: path.clone(),
                        source,
                    })
            }
        }
    }
}
