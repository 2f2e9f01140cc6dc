mod project_report;
mod screenshot;
mod task;
mod time_interval;

pub use project_report::ProjectReportRow;
pub use screenshot::Screenshot;
pub use task::{ProjectSummary, Task};
pub use time_interval::{IntervalFact, TimeInterval};
