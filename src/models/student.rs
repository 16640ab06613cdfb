use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

use super::academic::{AcademicRecord, AcademicSlot};

/// Raw `students` row; marksheets are still JSON text here.
#[derive(Debug, Clone, FromRow)]
pub struct StudentRow {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub class: Option<String>,
    pub picture: Option<String>,
    pub marksheet_10th: Option<String>,
    pub marksheet_12th: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub class: Option<String>,
    pub photo_url: Option<String>,
    pub marksheet_10th: Option<AcademicRecord>,
    pub marksheet_12th: Option<AcademicRecord>,
    pub has_academic_records: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Student {
    pub fn academic_records(&self) -> impl Iterator<Item = &AcademicRecord> {
        self.marksheet_10th.iter().chain(self.marksheet_12th.iter())
    }
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        let has_academic_records = row.marksheet_10th.is_some() || row.marksheet_12th.is_some();
        Student {
            marksheet_10th: row
                .marksheet_10th
                .as_deref()
                .and_then(|raw| AcademicSlot::Tenth.decode(raw)),
            marksheet_12th: row
                .marksheet_12th
                .as_deref()
                .and_then(|raw| AcademicSlot::Twelfth.decode(raw)),
            has_academic_records,
            id: row.id,
            name: row.name,
            email: row.email,
            class: row.class,
            photo_url: row.picture,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Create/update body for a student.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentInput {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub marksheet_10th: Option<AcademicRecord>,
    #[serde(default)]
    pub marksheet_12th: Option<AcademicRecord>,
}

#[derive(Debug, Error)]
pub enum InvalidStudent {
    #[error("Student name is required")]
    MissingName,

    #[error("{column} must hold a {expected} record")]
    WrongSlot {
        column: &'static str,
        expected: &'static str,
    },

    #[error("academic record could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Validated column values ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub email: Option<String>,
    pub class: Option<String>,
    pub picture: Option<String>,
    pub marksheet_10th: Option<String>,
    pub marksheet_12th: Option<String>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn encode_slot(
    slot: AcademicSlot,
    expected: &'static str,
    record: Option<AcademicRecord>,
) -> Result<Option<String>, InvalidStudent> {
    match record {
        None => Ok(None),
        Some(r) if slot.accepts(&r) => Ok(Some(serde_json::to_string(&r)?)),
        Some(_) => Err(InvalidStudent::WrongSlot {
            column: slot.column(),
            expected,
        }),
    }
}

impl TryFrom<StudentInput> for NewStudent {
    type Error = InvalidStudent;

    fn try_from(input: StudentInput) -> Result<Self, Self::Error> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(InvalidStudent::MissingName);
        }

        Ok(NewStudent {
            name,
            email: blank_to_none(input.email),
            class: blank_to_none(input.class),
            picture: blank_to_none(input.photo_url),
            marksheet_10th: encode_slot(AcademicSlot::Tenth, "10th Standard", input.marksheet_10th)?,
            marksheet_12th: encode_slot(AcademicSlot::Twelfth, "12th Standard", input.marksheet_12th)?,
        })
    }
}
