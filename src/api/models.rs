//! Wire types for the school REST backend.
//!
//! The backend is loosely typed: most fields can be missing, ids come as
//! `_id` or `id`. Everything here deserializes leniently and the display
//! helpers substitute placeholders for absent relations.

use crate::grading::{LetterGrade, calc_letter_grade};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

const NOT_AVAILABLE: &str = "N/A";

/// Unpopulated relations arrive as `null`; treat them like missing fields.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A student directory record (`GET /students/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
}

impl StudentRecord {
    /// No usable name field at all.
    pub fn is_blank(&self) -> bool {
        [&self.username, &self.name, &self.surname]
            .iter()
            .all(|field| field.as_deref().is_none_or(|s| s.trim().is_empty()))
    }
}

/// A user with the finance-admin role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FinanceAdmin {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A login session (`GET /sessions?userId=`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionInfo {
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Filters for `GET /results`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResultQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,
}

impl ResultQuery {
    /// Query pairs in backend naming, omitting unset filters.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(semester) = self.semester.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("semester", semester.clone()));
        }
        if let Some(year) = self.academic_year.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("academicYear", year.clone()));
        }
        pairs
    }
}

/// One semester of aggregated results, as computed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Semester {
    pub semester: String,
    #[serde(default)]
    pub academic_year: String,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub overall_percentage: Option<f64>,
    #[serde(default)]
    pub result_count: u32,
    #[serde(default)]
    pub subjects: Vec<SubjectSummary>,
}

impl Semester {
    /// Substitute `N/A` for unpopulated subjects and grade every result.
    pub fn fill_display_fields(&mut self) {
        for summary in &mut self.subjects {
            summary.subject = SubjectRef {
                name: Some(summary.subject.display_name().to_owned()),
                code: Some(summary.subject.display_code().to_owned()),
            };
            for record in &mut summary.results {
                record.fill_grade();
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SubjectSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: SubjectRef,
    #[serde(default)]
    pub letter_grade: Option<String>,
    #[serde(default)]
    pub average_score: Option<f64>,
    #[serde(default)]
    pub results: Vec<ResultRecord>,
}

/// A subject relation that may not be populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubjectRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl SubjectRef {
    pub fn display_name(&self) -> &str {
        non_blank_or_na(self.name.as_deref())
    }

    pub fn display_code(&self) -> &str {
        non_blank_or_na(self.code.as_deref())
    }
}

fn non_blank_or_na(value: Option<&str>) -> &str {
    value.filter(|s| !s.trim().is_empty()).unwrap_or(NOT_AVAILABLE)
}

/// A single assessment result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResultRecord {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<String>,
    #[serde(default)]
    pub assessment_title: String,
    #[serde(default)]
    pub exam_type: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub total_marks: f64,
    #[serde(default)]
    pub percentage: Option<f64>,
    /// Filled in locally from [`ResultRecord::letter_grade`]; never read from the backend.
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub grade: Option<LetterGrade>,
}

impl ResultRecord {
    /// Letter grade for this result, from the stored percentage or recomputed
    /// from the raw marks when the backend omitted it.
    pub fn letter_grade(&self) -> Option<LetterGrade> {
        self.percentage
            .filter(|p| p.is_finite())
            .or_else(|| crate::grading::percentage(self.score, self.total_marks))
            .map(calc_letter_grade)
    }

    pub fn fill_grade(&mut self) {
        self.grade = self.letter_grade();
    }
}

/// A semester period (`GET /semesters`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SemesterInfo {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<String>,
    #[serde(alias = "name")]
    pub semester: String,
    #[serde(default)]
    pub academic_year: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Body for `POST /semesters/start-new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StartSemester {
    pub semester: String,
    pub academic_year: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_semester_from_backend_shape() {
        let semester: Semester = serde_json::from_value(json!({
            "semester": "First",
            "academicYear": "2024/2025",
            "gpa": 3.4,
            "overallPercentage": 81.5,
            "resultCount": 2,
            "subjects": [{
                "subject": {"name": "Mathematics", "code": "MTH101"},
                "letterGrade": "B+",
                "averageScore": 81.5,
                "results": [{
                    "assessmentTitle": "Midterm",
                    "examType": "midterm",
                    "date": "2024-10-14",
                    "score": 41,
                    "totalMarks": 50,
                    "percentage": 82
                }]
            }]
        }))
        .unwrap();

        let subject = &semester.subjects[0];
        assert_eq!(subject.subject.display_code(), "MTH101");
        assert_eq!(subject.results[0].letter_grade(), Some(LetterGrade::BPlus));
    }

    #[test]
    fn test_missing_relations_render_placeholder() {
        let summary: SubjectSummary = serde_json::from_value(json!({"results": []})).unwrap();
        assert_eq!(summary.subject.display_name(), "N/A");
        assert_eq!(summary.subject.display_code(), "N/A");

        let summary: SubjectSummary =
            serde_json::from_value(json!({"subject": null, "results": []})).unwrap();
        assert_eq!(summary.subject, SubjectRef::default());
    }

    #[test]
    fn test_fill_display_fields() {
        let mut semester: Semester = serde_json::from_value(json!({
            "semester": "Second",
            "subjects": [{
                "subject": {"name": " ", "code": "PHY201"},
                "results": [{"score": 27, "totalMarks": 30, "grade": "F"}]
            }]
        }))
        .unwrap();
        assert_eq!(semester.subjects[0].results[0].grade, None);

        semester.fill_display_fields();
        let subject = &semester.subjects[0];
        assert_eq!(subject.subject.name.as_deref(), Some("N/A"));
        assert_eq!(subject.subject.code.as_deref(), Some("PHY201"));
        assert_eq!(subject.results[0].grade, Some(LetterGrade::A));
    }

    #[test]
    fn test_letter_grade_recomputed_without_percentage() {
        let record = ResultRecord {
            score: 18.0,
            total_marks: 20.0,
            ..Default::default()
        };
        assert_eq!(record.letter_grade(), Some(LetterGrade::A));

        let empty = ResultRecord::default();
        assert_eq!(empty.letter_grade(), None);
    }

    #[test]
    fn test_blank_student_record() {
        let record: StudentRecord = serde_json::from_value(json!({})).unwrap();
        assert!(record.is_blank());

        let record: StudentRecord =
            serde_json::from_value(json!({"username": "", "name": "  ", "surname": null})).unwrap();
        assert!(record.is_blank());

        let record: StudentRecord = serde_json::from_value(json!({"surname": "Okoro"})).unwrap();
        assert!(!record.is_blank());
    }

    #[test]
    fn test_result_query_pairs() {
        let query = ResultQuery {
            semester: Some("Second".to_owned()),
            academic_year: Some(String::new()),
        };
        assert_eq!(query.to_pairs(), vec![("semester", "Second".to_owned())]);
    }

    #[test]
    fn test_mongo_style_ids() {
        let admin: FinanceAdmin = serde_json::from_value(json!({
            "_id": "65aa01",
            "username": "fin.admin",
            "name": "Ruth",
        }))
        .unwrap();
        assert_eq!(admin.id, "65aa01");
        assert_eq!(admin.name.as_deref(), Some("Ruth"));

        let period: SemesterInfo =
            serde_json::from_value(json!({"name": "First", "academicYear": "2025/2026"})).unwrap();
        assert_eq!(period.semester, "First");
        assert!(!period.is_current);
    }
}
