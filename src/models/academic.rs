use serde::{Deserialize, Serialize};

fn default_max_marks() -> f64 {
    100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mark {
    pub subject: String,
    pub marks: f64,
    #[serde(default = "default_max_marks")]
    pub max_marks: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marksheet {
    pub year: String,
    pub school: String,
    pub board: String,
    /// Percentage as declared on the paper marksheet, if entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub marks: Vec<Mark>,
}

impl Marksheet {
    /// Obtained marks over maximum marks, as a percentage. Zero when no
    /// maximum is recorded.
    pub fn computed_percentage(&self) -> f64 {
        let obtained: f64 = self.marks.iter().map(|m| m.marks).sum();
        let maximum: f64 = self.marks.iter().map(|m| m.max_marks).sum();
        if maximum <= 0.0 {
            0.0
        } else {
            obtained / maximum * 100.0
        }
    }
}

/// School-leaving marksheet stored against a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AcademicRecord {
    #[serde(rename = "10th Standard")]
    StandardTen(Marksheet),
    #[serde(rename = "12th Standard")]
    StandardTwelve(Marksheet),
}

impl AcademicRecord {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AcademicRecord::StandardTen(_) => "10th Standard",
            AcademicRecord::StandardTwelve(_) => "12th Standard",
        }
    }

    pub fn marksheet(&self) -> &Marksheet {
        match self {
            AcademicRecord::StandardTen(m) | AcademicRecord::StandardTwelve(m) => m,
        }
    }
}

/// Column a record is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcademicSlot {
    Tenth,
    Twelfth,
}

impl AcademicSlot {
    pub fn column(&self) -> &'static str {
        match self {
            AcademicSlot::Tenth => "marksheet_10th",
            AcademicSlot::Twelfth => "marksheet_12th",
        }
    }

    pub fn accepts(&self, record: &AcademicRecord) -> bool {
        matches!(
            (self, record),
            (AcademicSlot::Tenth, AcademicRecord::StandardTen(_))
                | (AcademicSlot::Twelfth, AcademicRecord::StandardTwelve(_))
        )
    }

    /// Parse a stored blob, refusing records that belong to the other slot.
    pub fn decode(&self, raw: &str) -> Option<AcademicRecord> {
        match AcademicRecord::parse(raw) {
            Ok(record) if self.accepts(&record) => Some(record),
            Ok(record) => {
                tracing::warn!("{} holds a {} record, ignoring", self.column(), record.label());
                None
            }
            Err(e) => {
                tracing::warn!("malformed {} blob: {}", self.column(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(marks: &[(f64, f64)]) -> Marksheet {
        Marksheet {
            year: "2021".to_string(),
            school: "St. Xavier's".to_string(),
            board: "CBSE".to_string(),
            percentage: None,
            marks: marks
                .iter()
                .enumerate()
                .map(|(i, (m, max))| Mark {
                    subject: format!("Subject {}", i + 1),
                    marks: *m,
                    max_marks: *max,
                })
                .collect(),
        }
    }

    #[test]
    fn parses_tagged_blob_with_default_max_marks() {
        let raw = r#"{
            "type": "12th Standard",
            "year": "2023",
            "school": "City High",
            "board": "ICSE",
            "marks": [{"subject": "Physics", "marks": 85}]
        }"#;
        let record = AcademicRecord::parse(raw).unwrap();
        assert_eq!(record.label(), "12th Standard");
        assert_eq!(record.marksheet().marks[0].max_marks, 100.0);
    }

    #[test]
    fn untagged_blob_is_rejected() {
        let raw = r#"{"year": "2023", "school": "", "board": "", "marks": []}"#;
        assert!(AcademicRecord::parse(raw).is_err());
    }

    #[test]
    fn slot_refuses_other_standard() {
        let twelfth = AcademicRecord::StandardTwelve(sheet(&[]));
        let raw = serde_json::to_string(&twelfth).unwrap();
        assert!(AcademicSlot::Tenth.decode(&raw).is_none());
        assert_eq!(AcademicSlot::Twelfth.decode(&raw), Some(twelfth));
    }

    #[test]
    fn computed_percentage_over_all_subjects() {
        let m = sheet(&[(85.0, 100.0), (92.0, 100.0), (88.0, 100.0), (78.0, 100.0), (82.0, 100.0)]);
        assert!((m.computed_percentage() - 85.0).abs() < 1e-9);
        assert_eq!(sheet(&[]).computed_percentage(), 0.0);
    }
}
