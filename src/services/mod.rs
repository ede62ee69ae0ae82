pub mod moon;
pub mod mosaic;
pub mod pipeline;
pub mod scheduler;
pub mod visibility;
pub mod weekly;

pub use mosaic::MosaicDetection;
pub use pipeline::{plan_night, NightPlan};
pub use scheduler::build_schedule;
pub use weekly::{aggregate_weeks, WeekKey, WeeklySummary};
