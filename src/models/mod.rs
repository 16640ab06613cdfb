pub mod academic;
pub mod attendance;
pub mod course;
pub mod student;

pub use academic::{AcademicRecord, AcademicSlot, Mark, Marksheet};
pub use attendance::{
    AttendanceRecord, AttendanceRow, AttendanceStatus, BulkAttendanceEntry, BulkAttendanceRequest, DailyAttendanceItem,
    MarkAttendanceRequest, UnknownStatus, UpsertOutcome,
};
pub use course::{CourseCatalog, CourseDefinition, CourseSummary};
pub use student::{InvalidStudent, NewStudent, Student, StudentInput, StudentRow};
