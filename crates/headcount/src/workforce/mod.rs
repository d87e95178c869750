pub mod aggregate;
pub mod classifier;
pub mod domain;
pub mod report;
pub mod sources;

pub use classifier::{classify, Category, CLASSIFIER_VERSION};
pub use domain::{
    ContractType, DepartureReason, DepartureRecord, Granularity, Period, PersonRecord, Ratio,
};
pub use report::{Dashboard, ReportOptions, WorkforceReport, WorkforceReportSummary};
pub use sources::{
    LoadError, SourceLocation, SourceSpec, WorkforceLoader, DEFAULT_DEPARTURES_SKIP_ROWS,
    DEFAULT_ROSTER_SKIP_ROWS,
};
