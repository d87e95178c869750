use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use headcount::config::AppConfig;
use headcount::error::AppError;
use headcount::telemetry;
use headcount::workforce::report::views::{
    ActiveHeadcountEntry, CategoryActiveEntry, CategoryHeadcountEntry, ContractHeadcountEntry,
    DepartureReasonEntry, MovementEntry, ProbationEntry, Section, TurnoverEntry,
};
use headcount::workforce::sources::LoadSummary;
use headcount::workforce::{
    classify, Category, Dashboard, DepartureRecord, Granularity, PersonRecord, ReportOptions,
    SourceLocation, WorkforceLoader, WorkforceReport, WorkforceReportSummary, CLASSIFIER_VERSION,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which tabs of the dashboard to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ViewSelection {
    Annual,
    Monthly,
    #[default]
    Both,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub(crate) enum ReportPayload {
    Dashboard(Box<Dashboard>),
    Single(Box<WorkforceReportSummary>),
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ReportResponse {
    pub(crate) roster: LoadSummary,
    pub(crate) departures: LoadSummary,
    pub(crate) report: ReportPayload,
}

pub(crate) fn build_payload(
    roster: &[PersonRecord],
    departures: &[DepartureRecord],
    view: ViewSelection,
    options: ReportOptions,
) -> ReportPayload {
    let single = |granularity| {
        ReportPayload::Single(Box::new(
            WorkforceReport::build(roster, departures, granularity, options).summary(),
        ))
    };

    match view {
        ViewSelection::Annual => single(Granularity::Annual),
        ViewSelection::Monthly => single(Granularity::Monthly),
        ViewSelection::Both => {
            ReportPayload::Dashboard(Box::new(Dashboard::build(roster, departures, options)))
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Roster export, as a URL or a file path (defaults to APP_ROSTER_SOURCE)
    #[arg(long)]
    pub(crate) roster: Option<String>,
    /// Departures export, as a URL or a file path (defaults to APP_DEPARTURES_SOURCE)
    #[arg(long)]
    pub(crate) departures: Option<String>,
    /// Banner rows above the roster header
    #[arg(long)]
    pub(crate) roster_skip_rows: Option<usize>,
    /// Banner rows above the departures header
    #[arg(long)]
    pub(crate) departures_skip_rows: Option<usize>,
    #[arg(long, value_enum, default_value_t = ViewSelection::Both)]
    pub(crate) granularity: ViewSelection,
    /// Reference date for the headline figures (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Tenure in months under which a departure counts as a probation break
    #[arg(long)]
    pub(crate) probation_months: Option<u32>,
    /// Print JSON instead of text tables
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let mut sources = config.sources;
    if let Some(raw) = args.roster.as_deref() {
        sources.roster = Some(SourceLocation::parse(raw));
    }
    if let Some(raw) = args.departures.as_deref() {
        sources.departures = Some(SourceLocation::parse(raw));
    }
    if let Some(rows) = args.roster_skip_rows {
        sources.roster_skip_rows = rows;
    }
    if let Some(rows) = args.departures_skip_rows {
        sources.departures_skip_rows = rows;
    }

    let mut loader = WorkforceLoader::new(sources.fetch_timeout)?;
    let roster = loader.load_roster(&sources.roster_spec()?).await?;
    let departures = loader.load_departures(&sources.departures_spec()?).await?;

    let options = ReportOptions {
        as_of: args.as_of.unwrap_or_else(|| Local::now().date_naive()),
        probation_months: args
            .probation_months
            .unwrap_or(config.reporting.probation_months),
    };
    let payload = build_payload(&roster.records, &departures.records, args.granularity, options);

    if args.json {
        let response = ReportResponse {
            roster: roster.summary.clone(),
            departures: departures.summary.clone(),
            report: payload,
        };
        let json = serde_json::to_string_pretty(&response).map_err(std::io::Error::from)?;
        println!("{json}");
    } else {
        println!("{}", TextReport(&payload));
    }

    Ok(())
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Free-text department labels, as typed in the roster
    #[arg(required = true)]
    pub(crate) labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ClassificationView {
    pub(crate) label: Option<String>,
    pub(crate) category: Category,
    pub(crate) category_label: &'static str,
    pub(crate) classifier_version: u32,
}

impl ClassificationView {
    pub(crate) fn of(label: Option<&str>) -> Self {
        let category = classify(label);
        Self {
            label: label.map(str::to_string),
            category,
            category_label: category.label(),
            classifier_version: CLASSIFIER_VERSION,
        }
    }
}

pub(crate) fn run_classify(args: ClassifyArgs) {
    for label in &args.labels {
        let view = ClassificationView::of(Some(label.as_str()));
        println!("{label} -> {}", view.category_label);
    }
}

/// Plain-text rendering of a report, one aligned table per section.
pub(crate) struct TextReport<'a>(pub(crate) &'a ReportPayload);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ReportPayload::Single(summary) => write_summary(f, summary),
            ReportPayload::Dashboard(dashboard) => {
                write_summary(f, &dashboard.annual)?;
                writeln!(f)?;
                write_summary(f, &dashboard.monthly)
            }
        }
    }
}

fn write_summary(f: &mut fmt::Formatter<'_>, summary: &WorkforceReportSummary) -> fmt::Result {
    let headline = &summary.headline;
    writeln!(f, "== {} (au {}) ==", summary.granularity_label, summary.as_of)?;
    writeln!(
        f,
        "En poste: {} | Entrées {year}: {} | Sorties {year}: {} dont {} volontaires",
        headline.active,
        headline.entries,
        headline.exits,
        headline.voluntary_exits,
        year = headline.year,
    )?;
    writeln!(
        f,
        "Turnover {}: {} | volontaire: {} | ruptures d'essai (< {} mois): {}",
        headline.year,
        headline.turnover,
        headline.voluntary_turnover,
        summary.probation_months,
        headline.probation_break_rate,
    )?;

    write_section(f, &summary.headcount_by_contract)?;
    write_section(f, &summary.headcount_by_category)?;
    write_section(f, &summary.movements)?;
    write_section(f, &summary.departures_by_reason)?;
    write_section(f, &summary.active_headcount)?;
    write_section(f, &summary.active_headcount_by_category)?;
    write_section(f, &summary.turnover)?;
    write_section(f, &summary.turnover_by_contract)?;
    write_section(f, &summary.turnover_by_category)?;
    write_section(f, &summary.probation_breaks)
}

trait TextRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

fn write_section<T: TextRow>(f: &mut fmt::Formatter<'_>, section: &Section<T>) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", section.title)?;
    if section.is_empty() {
        return writeln!(f, "  (aucune donnée)");
    }

    let rows: Vec<Vec<String>> = section.rows.iter().map(TextRow::cells).collect();
    let mut widths: Vec<usize> = T::HEADERS.iter().map(|header| header.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let headers: Vec<String> = T::HEADERS.iter().map(|header| header.to_string()).collect();
    write_row(f, &headers, &widths)?;
    for row in &rows {
        write_row(f, row, &widths)?;
    }
    Ok(())
}

fn write_row(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    writeln!(f, "  {}", padded.join("  ").trim_end())
}

impl TextRow for ContractHeadcountEntry {
    const HEADERS: &'static [&'static str] = &["Période", "Contrat", "Effectif"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.period.clone(),
            self.contract_label.to_string(),
            self.count.to_string(),
        ]
    }
}

impl TextRow for CategoryHeadcountEntry {
    const HEADERS: &'static [&'static str] = &["Période", "Pôle", "Arrivées"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.period.clone(),
            self.category_label.to_string(),
            self.count.to_string(),
        ]
    }
}

impl TextRow for MovementEntry {
    const HEADERS: &'static [&'static str] = &["Période", "Mouvement", "Nombre"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.period.clone(),
            self.movement_label.to_string(),
            self.count.to_string(),
        ]
    }
}

impl TextRow for DepartureReasonEntry {
    const HEADERS: &'static [&'static str] = &["Période", "Type de départ", "Départs"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.period.clone(),
            self.reason_label.to_string(),
            self.count.to_string(),
        ]
    }
}

impl TextRow for ActiveHeadcountEntry {
    const HEADERS: &'static [&'static str] = &["Période", "En poste"];

    fn cells(&self) -> Vec<String> {
        vec![self.period.clone(), self.count.to_string()]
    }
}

impl TextRow for CategoryActiveEntry {
    const HEADERS: &'static [&'static str] = &["Période", "Pôle", "En poste"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.period.clone(),
            self.category_label.to_string(),
            self.count.to_string(),
        ]
    }
}

impl TextRow for TurnoverEntry {
    const HEADERS: &'static [&'static str] = &[
        "Période",
        "Population",
        "Sorties",
        "En poste",
        "Turnover",
        "Sorties volontaires",
        "Turnover volontaire",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.period.clone(),
            self.cohort_label.to_string(),
            self.exits.to_string(),
            self.active.to_string(),
            self.rate.to_string(),
            self.voluntary_exits
                .map_or_else(|| "n/a".to_string(), |count| count.to_string()),
            self.voluntary_rate.to_string(),
        ]
    }
}

impl TextRow for ProbationEntry {
    const HEADERS: &'static [&'static str] = &["Période", "Arrivées", "Ruptures", "Taux"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.period.clone(),
            self.entrants.to_string(),
            self.breaks.to_string(),
            self.rate.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn roster() -> Vec<PersonRecord> {
        vec![
            PersonRecord::new(
                Some("Alice".into()),
                Some("CDI".into()),
                Some("Tech".into()),
                date(2020, 1, 6),
                None,
            ),
            PersonRecord::new(
                Some("Bruno".into()),
                Some("CDD".into()),
                Some("Sales".into()),
                date(2020, 3, 1),
                date(2021, 2, 28),
            ),
        ]
    }

    fn options() -> ReportOptions {
        ReportOptions::new(date(2021, 12, 31).expect("valid"))
    }

    #[test]
    fn single_view_renders_headline_and_tables() {
        let payload = build_payload(&roster(), &[], ViewSelection::Annual, options());
        let text = TextReport(&payload).to_string();

        assert!(text.starts_with("== Vue annuelle (au 2021-12-31) =="));
        assert!(text.contains("Effectifs par contrat"));
        assert!(text.contains("Turnover par pôle"));
        assert!(text.contains("Sorties volontaires"));
        assert!(!text.contains("Vue mensuelle"));
    }

    #[test]
    fn undefined_ratios_render_as_not_available() {
        let payload = build_payload(&[], &[], ViewSelection::Monthly, options());
        let text = TextReport(&payload).to_string();

        assert!(text.contains("Turnover 2021: n/a"));
        assert!(text.contains("(aucune donnée)"));
    }

    #[test]
    fn dashboard_serialises_both_tabs() {
        let payload = build_payload(&roster(), &[], ViewSelection::Both, options());
        let value = serde_json::to_value(&payload).expect("payload serialises");

        assert_eq!(value["annual"]["granularity"], "annual");
        assert_eq!(value["monthly"]["granularity"], "monthly");
        assert_eq!(value["annual"]["headline"]["active"], 1);
    }

    #[test]
    fn classification_view_carries_rule_version() {
        let view = ClassificationView::of(Some("Tech & Ops"));
        assert_eq!(view.category, Category::Tech);
        assert_eq!(view.classifier_version, CLASSIFIER_VERSION);
        assert_eq!(ClassificationView::of(None).category, Category::Other);
    }
}
