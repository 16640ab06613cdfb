//! Data payloads behind each printable document. Layout is left to the
//! client; these structs carry only the values a template needs.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::attendance::{AttendanceReport, GridWindow, compose_report};
use crate::models::{AttendanceRecord, CourseDefinition, Marksheet, Student};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    IdCard,
    FeeReceipt,
    CourseList,
    ExamReceipt,
    Marksheet,
    Attendance,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 6] = [
        DocumentKind::IdCard,
        DocumentKind::FeeReceipt,
        DocumentKind::CourseList,
        DocumentKind::ExamReceipt,
        DocumentKind::Marksheet,
        DocumentKind::Attendance,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            DocumentKind::IdCard => "id-card",
            DocumentKind::FeeReceipt => "fee-receipt",
            DocumentKind::CourseList => "course-list",
            DocumentKind::ExamReceipt => "exam-receipt",
            DocumentKind::Marksheet => "marksheet",
            DocumentKind::Attendance => "attendance",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::IdCard => "Student ID Card",
            DocumentKind::FeeReceipt => "Fee Payment Receipt",
            DocumentKind::CourseList => "Course Student List",
            DocumentKind::ExamReceipt => "Exam Receipt",
            DocumentKind::Marksheet => "Result Marksheet",
            DocumentKind::Attendance => "Attendance Sheet",
        }
    }

    /// Whether composing this document needs the student's attendance rows.
    pub fn needs_attendance(&self) -> bool {
        matches!(self, DocumentKind::Attendance)
    }
}

/// Entry in the list of documents a client can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentType {
    pub id: DocumentKind,
    pub title: &'static str,
}

pub fn document_types() -> Vec<DocumentType> {
    DocumentKind::ALL
        .into_iter()
        .map(|kind| DocumentType {
            id: kind,
            title: kind.title(),
        })
        .collect()
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| format!("unknown document type: {}", s))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentHeader {
    pub id: String,
    pub name: String,
    pub initials: String,
    pub email: Option<String>,
    pub class: Option<String>,
    pub photo_url: Option<String>,
}

impl From<&Student> for StudentHeader {
    fn from(student: &Student) -> Self {
        StudentHeader {
            id: student.id.clone(),
            name: student.name.clone(),
            initials: initials(&student.name),
            email: student.email.clone(),
            class: student.class.clone(),
            photo_url: student.photo_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeeLine {
    pub item: String,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExamSlot {
    pub code: String,
    pub subject: String,
    pub date: NaiveDate,
    pub time: String,
    pub venue: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarksheetEntry {
    pub standard: String,
    pub computed_percentage: String,
    #[serde(flatten)]
    pub marksheet: Marksheet,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Document {
    IdCard {
        student: StudentHeader,
        issue_date: NaiveDate,
        valid_until: NaiveDate,
    },
    FeeReceipt {
        student: StudentHeader,
        receipt_no: String,
        date: NaiveDate,
        items: Vec<FeeLine>,
        total: u64,
        total_display: String,
    },
    CourseList {
        student: StudentHeader,
        courses: Vec<CourseDefinition>,
    },
    ExamReceipt {
        student: StudentHeader,
        exams: Vec<ExamSlot>,
        qr_payload: String,
    },
    Marksheet {
        student: StudentHeader,
        records: Vec<MarksheetEntry>,
    },
    Attendance {
        student: StudentHeader,
        report: AttendanceReport,
    },
}

/// Everything a document may draw on besides the student.
pub struct DocumentContext<'a> {
    pub today: NaiveDate,
    pub catalog: &'a [CourseDefinition],
    pub records: &'a [AttendanceRecord],
    pub grid_window: GridWindow,
}

const FEE_SCHEDULE: [(&str, u64); 5] = [
    ("Tuition Fee", 25_000),
    ("Library Fee", 2_000),
    ("Laboratory Fee", 5_000),
    ("Activity Fee", 3_000),
    ("Development Fee", 5_000),
];

const EXAM_LEAD_DAYS: u64 = 14;

// (day offset from first exam, time, venue), in catalog order
const EXAM_SLOTS: [(u64, &str, &str); 4] = [
    (0, "10:00 AM - 1:00 PM", "Examination Hall A"),
    (2, "2:00 PM - 5:00 PM", "Examination Hall B"),
    (4, "10:00 AM - 1:00 PM", "Examination Hall C"),
    (6, "2:00 PM - 4:00 PM", "Examination Hall A"),
];

pub fn compose(kind: DocumentKind, student: &Student, ctx: &DocumentContext<'_>) -> Document {
    let header = StudentHeader::from(student);
    match kind {
        DocumentKind::IdCard => Document::IdCard {
            student: header,
            issue_date: ctx.today,
            valid_until: one_year_after(ctx.today),
        },
        DocumentKind::FeeReceipt => {
            let items: Vec<FeeLine> = FEE_SCHEDULE
                .iter()
                .map(|(item, amount)| FeeLine {
                    item: item.to_string(),
                    amount: *amount,
                })
                .collect();
            let total: u64 = items.iter().map(|i| i.amount).sum();
            Document::FeeReceipt {
                student: header,
                receipt_no: receipt_number(Uuid::new_v4()),
                date: ctx.today,
                items,
                total,
                total_display: format_inr(total),
            }
        }
        DocumentKind::CourseList => Document::CourseList {
            student: header,
            courses: ctx.catalog.to_vec(),
        },
        DocumentKind::ExamReceipt => {
            let exams = ctx
                .catalog
                .iter()
                .zip(EXAM_SLOTS.iter())
                .map_while(|(course, (offset, time, venue))| {
                    let date = ctx
                        .today
                        .checked_add_days(Days::new(EXAM_LEAD_DAYS + offset))?;
                    Some(ExamSlot {
                        code: course.id.clone(),
                        subject: course.name.clone(),
                        date,
                        time: time.to_string(),
                        venue: venue.to_string(),
                    })
                })
                .collect();
            Document::ExamReceipt {
                qr_payload: format!("STUDENT: {}, ID: {}", student.name, student.id),
                student: header,
                exams,
            }
        }
        DocumentKind::Marksheet => Document::Marksheet {
            student: header,
            records: student
                .academic_records()
                .map(|record| {
                    let marksheet = record.marksheet().clone();
                    MarksheetEntry {
                        standard: record.label().to_string(),
                        computed_percentage: format!("{:.2}", marksheet.computed_percentage()),
                        marksheet,
                    }
                })
                .collect(),
        },
        DocumentKind::Attendance => Document::Attendance {
            report: compose_report(&student.id, ctx.records, ctx.catalog, ctx.grid_window, ctx.today),
            student: header,
        },
    }
}

/// First letter of each space-separated part, upper-cased.
pub fn initials(name: &str) -> String {
    name.split(' ')
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// `R-` followed by five digits.
fn receipt_number(seed: Uuid) -> String {
    format!("R-{}", 10_000 + seed.as_u128() % 90_000)
}

/// Same calendar day next year; 29 February clamps to 28 February.
fn one_year_after(date: NaiveDate) -> NaiveDate {
    date.checked_add_months(Months::new(12)).unwrap_or(date)
}

/// Rupee amount with Indian digit grouping, e.g. `₹1,25,000`.
pub fn format_inr(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return format!("₹{}", digits);
    }

    let (head, last_three) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("₹{},{}", groups.join(","), last_three)
}
