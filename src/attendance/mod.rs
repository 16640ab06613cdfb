//! Pure attendance transforms: per-course aggregation, the daily calendar
//! grid, and the report that combines them.

pub mod grid;
pub mod report;
pub mod summary;

pub use grid::{GridWindow, build_grid};
pub use report::{AttendanceReport, CourseStanding, MINIMUM_ATTENDANCE_PERCENT, compose_report};
pub use summary::summarize;
