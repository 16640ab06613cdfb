use chrono::NaiveDate;
use serde::Serialize;

use super::grid::{GridWindow, build_grid};
use super::summary::{percentage, summarize};
use crate::models::{AttendanceRecord, CourseDefinition, CourseSummary, DailyAttendanceItem};

/// Minimum per-course attendance for exam eligibility.
pub const MINIMUM_ATTENDANCE_PERCENT: f64 = 75.0;

pub const ATTENDANCE_POLICY: [&str; 3] = [
    "Minimum 75% attendance is required in each course to be eligible for examinations.",
    "Medical leaves are considered only with valid documentation.",
    "Students with attendance below 75% may request consideration with valid reasons.",
];

#[derive(Debug, Clone, Serialize)]
pub struct CourseStanding {
    #[serde(flatten)]
    pub summary: CourseSummary,
    pub eligible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceReport {
    pub student_id: String,
    pub reference_date: NaiveDate,
    pub courses: Vec<CourseStanding>,
    pub total_classes: u64,
    pub total_attended: u64,
    pub overall_percentage: String,
    pub minimum_percentage: f64,
    pub policy: Vec<String>,
    pub daily: Vec<DailyAttendanceItem>,
}

pub fn compose_report(
    student_id: &str,
    records: &[AttendanceRecord],
    catalog: &[CourseDefinition],
    window: GridWindow,
    reference: NaiveDate,
) -> AttendanceReport {
    let summaries = summarize(records, catalog);
    let total_classes: u64 = summaries.iter().map(|s| u64::from(s.total_classes)).sum();
    let total_attended: u64 = summaries.iter().map(|s| u64::from(s.attended)).sum();

    let courses = summaries
        .into_iter()
        .map(|summary| CourseStanding {
            eligible: summary.percentage >= MINIMUM_ATTENDANCE_PERCENT,
            summary,
        })
        .collect();

    AttendanceReport {
        student_id: student_id.to_string(),
        reference_date: reference,
        courses,
        total_classes,
        total_attended,
        overall_percentage: format!("{:.2}", percentage(total_attended, total_classes)),
        minimum_percentage: MINIMUM_ATTENDANCE_PERCENT,
        policy: ATTENDANCE_POLICY.iter().map(|line| line.to_string()).collect(),
        daily: build_grid(records, window, reference),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceStatus, CourseCatalog};

    #[test]
    fn report_totals_and_eligibility() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let records: Vec<AttendanceRecord> = (0..80u64)
            .map(|i| AttendanceRecord {
                id: format!("r{}", i),
                student_id: "s1".to_string(),
                date: start + chrono::Days::new(i),
                status: AttendanceStatus::Present,
                notes: None,
                created_at: None,
                updated_at: None,
            })
            .collect();
        let catalog = CourseCatalog::default();
        let report = compose_report(
            "s1",
            &records,
            catalog.courses(),
            GridWindow::Fixed(30),
            NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(),
        );

        // 80 of 96: 20/24, 20/24, 26/32, 13/16
        assert_eq!(report.total_classes, 96);
        assert_eq!(report.total_attended, 79);
        assert_eq!(report.overall_percentage, "82.29");
        assert!(report.courses.iter().all(|c| c.eligible));
        assert_eq!(report.daily.len(), 30);
        assert_eq!(report.policy.len(), 3);
    }

    #[test]
    fn empty_report_is_zeroed() {
        let report = compose_report(
            "s1",
            &[],
            CourseCatalog::default().courses(),
            GridWindow::default(),
            NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(),
        );
        assert_eq!(report.total_attended, 0);
        assert_eq!(report.overall_percentage, "0.00");
        assert!(report.courses.iter().all(|c| !c.eligible));
    }

    #[test]
    fn totals_do_not_overflow_large_catalogs() {
        let catalog: Vec<CourseDefinition> = (0..3)
            .map(|i| CourseDefinition {
                id: format!("C{}", i),
                name: format!("Course {}", i),
                total_classes: u32::MAX,
                instructor: None,
                credits: None,
                schedule: None,
            })
            .collect();
        let report = compose_report(
            "s1",
            &[],
            &catalog,
            GridWindow::default(),
            NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(),
        );
        assert_eq!(report.total_classes, 3 * u64::from(u32::MAX));
        assert_eq!(report.overall_percentage, "0.00");
    }
}
