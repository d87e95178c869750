use chrono::NaiveDate;
use headcount::config::SourcesConfig;
use headcount::error::AppError;
use headcount::workforce::sources::{DeparturesDataset, RosterDataset};
use headcount::workforce::{SourceLocation, WorkforceLoader};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// The configured sheets behind one shared, lazily filled cache.
#[derive(Debug)]
pub(crate) struct WorkforceService {
    loader: Mutex<WorkforceLoader>,
    sources: SourcesConfig,
    probation_months: u32,
}

impl WorkforceService {
    pub(crate) fn new(loader: WorkforceLoader, sources: SourcesConfig, probation_months: u32) -> Self {
        Self {
            loader: Mutex::new(loader),
            sources,
            probation_months,
        }
    }

    pub(crate) fn probation_months(&self) -> u32 {
        self.probation_months
    }

    pub(crate) async fn datasets(
        &self,
        refresh: bool,
    ) -> Result<(Arc<RosterDataset>, Arc<DeparturesDataset>), AppError> {
        let roster_spec = self.sources.roster_spec()?;
        let departures_spec = self.sources.departures_spec()?;

        let mut loader = self.loader.lock().await;
        if refresh {
            loader.invalidate(&roster_spec.location);
            loader.invalidate(&departures_spec.location);
        }

        let roster = loader.load_roster(&roster_spec).await?;
        let departures = loader.load_departures(&departures_spec).await?;
        Ok((roster, departures))
    }

    /// Empties the cache and reports what was dropped.
    pub(crate) async fn refresh(&self) -> (usize, Vec<SourceLocation>) {
        let mut loader = self.loader.lock().await;
        let sources = loader.cached_sources();
        let evicted = loader.clear();
        info!(evicted, "workforce cache refreshed on request");
        (evicted, sources)
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_expects_iso_format() {
        assert_eq!(
            parse_date(" 2022-06-30 "),
            Ok(NaiveDate::from_ymd_opt(2022, 6, 30).expect("valid"))
        );
        let err = parse_date("30/06/2022").expect_err("day-first dates are rejected");
        assert!(err.contains("YYYY-MM-DD"));
    }
}
