use crate::models::{AttendanceRecord, AttendanceStatus, CourseDefinition, CourseSummary};

/// Spread the student's present count over the catalog in proportion to each
/// course's share of total capacity.
///
/// This is a placeholder distribution: records carry no course reference, so
/// the split is illustrative and must not be read as real per-course data.
pub fn summarize(records: &[AttendanceRecord], catalog: &[CourseDefinition]) -> Vec<CourseSummary> {
    let present = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count() as u64;
    let capacity: u64 = catalog.iter().map(|c| u64::from(c.total_classes)).sum();

    catalog
        .iter()
        .map(|course| {
            let total = u64::from(course.total_classes);
            let allotted = if capacity == 0 { 0 } else { present * total / capacity };
            let attended = allotted.min(total) as u32;

            CourseSummary {
                id: course.id.clone(),
                name: course.name.clone(),
                total_classes: course.total_classes,
                attended,
                percentage: percentage(u64::from(attended), total),
            }
        })
        .collect()
}

pub(crate) fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CourseCatalog;
    use chrono::NaiveDate;

    fn course(id: &str, total_classes: u32) -> CourseDefinition {
        CourseDefinition {
            id: id.to_string(),
            name: format!("Course {}", id),
            total_classes,
            instructor: None,
            credits: None,
            schedule: None,
        }
    }

    fn records(statuses: &[AttendanceStatus]) -> Vec<AttendanceRecord> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| AttendanceRecord {
                id: format!("r{}", i),
                student_id: "s1".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Days::new(i as u64),
                status: *status,
                notes: None,
                created_at: None,
                updated_at: None,
            })
            .collect()
    }

    #[test]
    fn empty_records_give_zero_attendance() {
        let summaries = summarize(&[], &[course("C1", 10)]);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, "C1");
        assert_eq!(summaries[0].attended, 0);
        assert_eq!(summaries[0].percentage, 0.0);
    }

    #[test]
    fn only_present_records_count() {
        use AttendanceStatus::*;
        let recs = records(&[Present, Absent, Late, Excused, Present]);
        let summaries = summarize(&recs, &[course("C1", 10)]);
        assert_eq!(summaries[0].attended, 2);
        assert_eq!(summaries[0].percentage, 20.0);
    }

    #[test]
    fn distribution_floors_per_course_share() {
        let recs = records(&[AttendanceStatus::Present; 48]);
        let summaries = summarize(&recs, CourseCatalog::default().courses());
        // capacity 96: 24/96, 24/96, 32/96, 16/96 of 48
        let attended: Vec<u32> = summaries.iter().map(|s| s.attended).collect();
        assert_eq!(attended, vec![12, 12, 16, 8]);
        assert_eq!(summaries[2].percentage, 50.0);
    }

    #[test]
    fn attended_never_exceeds_capacity_or_present_count() {
        let catalog = vec![course("A", 3), course("B", 7), course("C", 0), course("D", 11)];
        for present in 0..60 {
            let recs = records(&vec![AttendanceStatus::Present; present]);
            let summaries = summarize(&recs, &catalog);
            let sum: u32 = summaries.iter().map(|s| s.attended).sum();
            assert!(sum as usize <= present);
            for s in &summaries {
                assert!(s.attended <= s.total_classes);
                assert!((0.0..=100.0).contains(&s.percentage));
            }
        }
    }

    #[test]
    fn zero_capacity_catalog_has_zero_percentages() {
        let recs = records(&[AttendanceStatus::Present; 5]);
        let summaries = summarize(&recs, &[course("A", 0), course("B", 0)]);
        assert!(summaries.iter().all(|s| s.attended == 0 && s.percentage == 0.0));
    }
}
