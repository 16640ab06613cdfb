pub mod attendance;
pub mod photos;
pub mod students;

pub use attendance::{BulkOutcome, MarkOutcome, RosterEntry};
pub use photos::PhotoUploader;
pub use students::{AcademicEntry, AcademicRecords, StudentQuery};
