use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDefinition {
    pub id: String,
    pub name: String,
    pub total_classes: u32,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub credits: Option<u32>,
    #[serde(default)]
    pub schedule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSummary {
    pub id: String,
    pub name: String,
    pub total_classes: u32,
    pub attended: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseCatalog(pub Vec<CourseDefinition>);

impl CourseCatalog {
    pub fn courses(&self) -> &[CourseDefinition] {
        &self.0
    }
}

fn course(id: &str, name: &str, total_classes: u32, instructor: &str, credits: u32, schedule: &str) -> CourseDefinition {
    CourseDefinition {
        id: id.to_string(),
        name: name.to_string(),
        total_classes,
        instructor: Some(instructor.to_string()),
        credits: Some(credits),
        schedule: Some(schedule.to_string()),
    }
}

impl Default for CourseCatalog {
    fn default() -> Self {
        CourseCatalog(vec![
            course("CS101", "Introduction to Computer Science", 24, "Dr. Alan Turing", 4, "Mon, Wed 10:00-11:30 AM"),
            course("CS201", "Data Structures and Algorithms", 24, "Dr. Ada Lovelace", 4, "Tue, Thu 1:00-2:30 PM"),
            course("MATH101", "Calculus I", 32, "Dr. Isaac Newton", 3, "Mon, Wed, Fri 9:00-10:00 AM"),
            course("ENG201", "Technical Writing", 16, "Prof. Jane Smith", 2, "Fri 3:00-5:00 PM"),
        ])
    }
}
