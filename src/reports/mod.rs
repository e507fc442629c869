pub mod aggregator;
pub mod types;

pub use aggregator::build_report;
pub use types::{DepartmentDwell, MonthlyThroughput, Report, ReportOptions};
