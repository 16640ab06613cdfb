use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use crate::models::{AttendanceRecord, AttendanceStatus, DailyAttendanceItem};

const UNMARKED: char = '-';
const MAX_FIXED_DAYS: u32 = 62;

/// Length of the daily grid.
///
/// `Fixed(n)` counts `n` days from the first of the reference month; days
/// beyond the month's end fall into the next month and are always in the
/// future relative to the reference date. `CalendarMonth` covers exactly the
/// reference month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridWindow {
    Fixed(u32),
    CalendarMonth,
}

impl Default for GridWindow {
    fn default() -> Self {
        GridWindow::Fixed(30)
    }
}

impl GridWindow {
    pub fn len_for(&self, reference: NaiveDate) -> u32 {
        match self {
            GridWindow::Fixed(n) => *n,
            GridWindow::CalendarMonth => days_in_month(reference),
        }
    }
}

impl fmt::Display for GridWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridWindow::Fixed(n) => write!(f, "{}", n),
            GridWindow::CalendarMonth => f.write_str("month"),
        }
    }
}

impl FromStr for GridWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("month") {
            return Ok(GridWindow::CalendarMonth);
        }
        match s.parse::<u32>() {
            Ok(n) if (1..=MAX_FIXED_DAYS).contains(&n) => Ok(GridWindow::Fixed(n)),
            _ => Err(format!(
                "grid window must be \"month\" or a day count between 1 and {}, got {:?}",
                MAX_FIXED_DAYS, s
            )),
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

fn days_in_month(date: NaiveDate) -> u32 {
    let first = first_of_month(date);
    first
        .checked_add_months(Months::new(1))
        .map(|next| next.signed_duration_since(first).num_days() as u32)
        .unwrap_or(31)
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Project a student's records onto one grid cell per day of the window.
///
/// Cells after `reference`'s day of month and weekend cells are always
/// unmarked. When several records share a date the last one wins. The grid
/// stops early if the window runs past the last representable date.
pub fn build_grid(
    records: &[AttendanceRecord],
    window: GridWindow,
    reference: NaiveDate,
) -> Vec<DailyAttendanceItem> {
    let mut by_date: HashMap<NaiveDate, AttendanceStatus> = HashMap::with_capacity(records.len());
    for record in records {
        by_date.insert(record.date, record.status);
    }

    let first = first_of_month(reference);
    let today = reference.day();

    (1..=window.len_for(reference))
        .map_while(|day| {
            let date = first.checked_add_days(Days::new(u64::from(day - 1)))?;
            let weekend = is_weekend(date);

            let status = if day > today || weekend {
                UNMARKED
            } else {
                by_date.get(&date).map(|s| s.code()).unwrap_or(UNMARKED)
            };

            Some(DailyAttendanceItem {
                day,
                date: date.format("%-d %a").to_string(),
                status,
                is_weekend: weekend,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: NaiveDate, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id: format!("{}-{}", date, status),
            student_id: "s1".to_string(),
            date,
            status,
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn marks_past_days_and_blanks_future_and_weekends() {
        // March 2025 starts on a Saturday.
        let records = vec![
            record(ymd(2025, 3, 5), AttendanceStatus::Present),
            record(ymd(2025, 3, 12), AttendanceStatus::Absent),
            record(ymd(2025, 3, 8), AttendanceStatus::Present),
            record(ymd(2025, 3, 25), AttendanceStatus::Late),
        ];
        let grid = build_grid(&records, GridWindow::Fixed(30), ymd(2025, 3, 20));

        assert_eq!(grid.len(), 30);
        assert_eq!(grid[4].status, 'P');
        assert_eq!(grid[4].date, "5 Wed");
        assert_eq!(grid[11].status, 'A');
        // Saturday the 8th has a record but is a weekend
        assert!(grid[7].is_weekend);
        assert_eq!(grid[7].status, '-');
        assert!(grid[20..].iter().all(|cell| cell.status == '-'));
        assert_eq!(grid[3].status, '-');
    }

    #[test]
    fn always_returns_window_length_in_day_order() {
        let grid = build_grid(&[], GridWindow::Fixed(30), ymd(2025, 6, 15));
        assert_eq!(grid.len(), 30);
        for (i, cell) in grid.iter().enumerate() {
            assert_eq!(cell.day, i as u32 + 1);
            assert_eq!(cell.status, '-');
        }
    }

    #[test]
    fn weekend_cells_are_always_unmarked() {
        let reference = ymd(2025, 7, 31);
        let records: Vec<_> = (1..=31)
            .map(|d| record(ymd(2025, 7, d), AttendanceStatus::Present))
            .collect();
        let grid = build_grid(&records, GridWindow::CalendarMonth, reference);
        assert_eq!(grid.len(), 31);
        for cell in &grid {
            if cell.is_weekend {
                assert_eq!(cell.status, '-');
            } else {
                assert_eq!(cell.status, 'P');
            }
        }
    }

    #[test]
    fn fixed_window_rolls_into_next_month() {
        // February 2025 has 28 days; days 29 and 30 are March 1st and 2nd.
        let grid = build_grid(&[], GridWindow::Fixed(30), ymd(2025, 2, 28));
        assert_eq!(grid[28].date, "1 Sat");
        assert_eq!(grid[29].date, "2 Sun");
        assert!(grid[28].is_weekend);
    }

    #[test]
    fn calendar_month_window_follows_month_length() {
        assert_eq!(build_grid(&[], GridWindow::CalendarMonth, ymd(2024, 2, 10)).len(), 29);
        assert_eq!(build_grid(&[], GridWindow::CalendarMonth, ymd(2025, 4, 1)).len(), 30);
    }

    #[test]
    fn records_from_other_months_do_not_match() {
        let records = vec![record(ymd(2025, 2, 5), AttendanceStatus::Absent)];
        let grid = build_grid(&records, GridWindow::Fixed(30), ymd(2025, 3, 20));
        assert_eq!(grid[4].status, '-');
    }

    #[test]
    fn last_record_for_a_day_wins() {
        let day = ymd(2025, 3, 6);
        let records = vec![
            record(day, AttendanceStatus::Absent),
            record(day, AttendanceStatus::Excused),
        ];
        let grid = build_grid(&records, GridWindow::Fixed(30), ymd(2025, 3, 20));
        assert_eq!(grid[5].status, 'E');
    }

    #[test]
    fn window_parses_from_config_text() {
        assert_eq!("month".parse::<GridWindow>(), Ok(GridWindow::CalendarMonth));
        assert_eq!("30".parse::<GridWindow>(), Ok(GridWindow::Fixed(30)));
        assert!("0".parse::<GridWindow>().is_err());
        assert!("weekly".parse::<GridWindow>().is_err());
    }

    #[test]
    fn window_past_last_representable_date_is_cut_short() {
        let grid = build_grid(&[], GridWindow::Fixed(62), NaiveDate::MAX);
        assert_eq!(grid.len(), 31);
        assert_eq!(grid[30].day, 31);
    }
}
