use crate::utils::error::Result;
use crate::utils::validation::validate_grade;
use serde::{Deserialize, Serialize};

/// One student's participation in one course for one semester.
///
/// The course is referenced by key and resolved against the database when
/// needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    course_key: u32,
    semester: String,
    grade: f32,
}

impl Enrollment {
    pub fn new(course_key: u32, semester: impl Into<String>) -> Self {
        Self {
            course_key,
            semester: semester.into(),
            grade: 0.0,
        }
    }

    pub fn course_key(&self) -> u32 {
        self.course_key
    }

    pub fn semester(&self) -> &str {
        &self.semester
    }

    pub fn grade(&self) -> f32 {
        self.grade
    }

    pub fn set_grade(&mut self, grade: f32) -> Result<()> {
        validate_grade(grade)?;
        self.grade = grade;
        Ok(())
    }

    pub fn to_record(&self, matrikel_number: u32) -> Vec<String> {
        vec![
            matrikel_number.to_string(),
            self.course_key.to_string(),
            self.semester.clone(),
            self.grade.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_enrollment_has_zero_grade() {
        let enrollment = Enrollment::new(5387, "WS2018");
        assert_eq!(enrollment.grade(), 0.0);
        assert_eq!(enrollment.semester(), "WS2018");
    }

    #[test]
    fn test_set_grade_rejects_out_of_range() {
        let mut enrollment = Enrollment::new(5387, "WS2018");
        enrollment.set_grade(2.3).unwrap();
        assert!(enrollment.set_grade(7.0).is_err());
        assert_eq!(enrollment.grade(), 2.3);
    }

    #[test]
    fn test_record_layout() {
        let mut enrollment = Enrollment::new(5387, "WS2018");
        enrollment.set_grade(1.7).unwrap();
        assert_eq!(enrollment.to_record(100000).join(";"), "100000;5387;WS2018;1.7");
    }
}
