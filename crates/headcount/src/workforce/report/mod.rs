mod summary;
pub mod views;

pub use summary::{ReportOptions, WorkforceReport};
pub use views::{ChartKind, Dashboard, Section, WorkforceReportSummary};
