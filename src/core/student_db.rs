use crate::core::codec::{self, Fields, RecordStream};
use crate::core::update::{EnrollmentUpdate, StudentUpdate};
use crate::domain::{Address, Course, Enrollment, Student};
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::{validate_storable_text, Validate};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{Read, Write};

pub const FIRST_MATRIKEL_NUMBER: u32 = 100000;

/// In-memory registry of courses and students.
///
/// Both maps are key-ordered, so listings and the written file come out in
/// ascending course key / matrikel number order.
#[derive(Debug, Clone)]
pub struct StudentDb {
    students: BTreeMap<u32, Student>,
    courses: BTreeMap<u32, Course>,
    /// `None` once every number up to `u32::MAX` has been handed out.
    next_matrikel_number: Option<u32>,
}

impl Default for StudentDb {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentDb {
    pub fn new() -> Self {
        Self::with_first_matrikel_number(FIRST_MATRIKEL_NUMBER)
    }

    pub fn with_first_matrikel_number(first: u32) -> Self {
        Self {
            students: BTreeMap::new(),
            courses: BTreeMap::new(),
            next_matrikel_number: Some(first),
        }
    }

    pub fn next_matrikel_number(&self) -> Option<u32> {
        self.next_matrikel_number
    }

    /// Drops all courses and students; the matrikel counter is kept.
    pub fn clear(&mut self) {
        self.students.clear();
        self.courses.clear();
    }

    pub fn add_weekly_course_to_db(&mut self, course: Course) {
        debug_assert!(course.is_weekly());
        self.add_course_to_db(course);
    }

    pub fn add_block_course_to_db(&mut self, course: Course) {
        debug_assert!(!course.is_weekly());
        self.add_course_to_db(course);
    }

    /// Inserts or overwrites by course key.
    pub fn add_course_to_db(&mut self, course: Course) {
        let key = course.course_key();
        if self.courses.insert(key, course).is_some() {
            tracing::debug!("Course {} overwritten", key);
        } else {
            tracing::debug!("Course {} added", key);
        }
    }

    /// Inserts or overwrites by matrikel number. Auto-assigned numbers always
    /// stay above every number inserted here.
    pub fn add_student_to_db(&mut self, student: Student) {
        let matrikel_number = student.matrikel_number();
        if self
            .next_matrikel_number
            .is_some_and(|next| matrikel_number >= next)
        {
            self.next_matrikel_number = matrikel_number.checked_add(1);
        }
        if self.students.insert(matrikel_number, student).is_some() {
            tracing::debug!("Student {} overwritten", matrikel_number);
        } else {
            tracing::debug!("Student {} added", matrikel_number);
        }
    }

    /// Creates a student with the next free matrikel number and returns it.
    ///
    /// Fails instead of reusing a number once the counter is exhausted, so an
    /// existing student is never replaced.
    pub fn register_student(
        &mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
        address: Address,
    ) -> Result<u32> {
        let matrikel_number = self.next_matrikel_number.ok_or_else(|| {
            tracing::warn!("Matrikel numbers exhausted");
            RegistryError::ValidationError {
                message: "no matrikel numbers left to assign".to_string(),
            }
        })?;
        if self.students.contains_key(&matrikel_number) {
            return Err(RegistryError::ValidationError {
                message: format!("matrikel number {} is already taken", matrikel_number),
            });
        }

        let student = Student::new(matrikel_number, first_name, last_name, date_of_birth, address);
        self.add_student_to_db(student);
        Ok(matrikel_number)
    }

    pub fn add_enrollment_to_student(
        &mut self,
        matrikel_number: u32,
        course_key: u32,
        semester: impl Into<String>,
    ) -> Result<()> {
        if !self.courses.contains_key(&course_key) {
            return Err(RegistryError::CourseNotFound { course_key });
        }

        let student = self.student_mut(matrikel_number)?;
        if student.is_enrolled_in(course_key) {
            tracing::warn!(
                "Enrollment of student {} in course {} already exists",
                matrikel_number,
                course_key
            );
            return Err(RegistryError::DuplicateEnrollment {
                matrikel_number,
                course_key,
            });
        }

        student.push_enrollment(Enrollment::new(course_key, semester));
        tracing::debug!("Student {} enrolled in course {}", matrikel_number, course_key);
        Ok(())
    }

    pub fn is_student_exists(&self, matrikel_number: u32) -> bool {
        self.students.contains_key(&matrikel_number)
    }

    pub fn is_course_exists(&self, course_key: u32) -> bool {
        self.courses.contains_key(&course_key)
    }

    pub fn student(&self, matrikel_number: u32) -> Result<&Student> {
        self.students
            .get(&matrikel_number)
            .ok_or(RegistryError::StudentNotFound { matrikel_number })
    }

    fn student_mut(&mut self, matrikel_number: u32) -> Result<&mut Student> {
        self.students
            .get_mut(&matrikel_number)
            .ok_or(RegistryError::StudentNotFound { matrikel_number })
    }

    pub fn course(&self, course_key: u32) -> Result<&Course> {
        self.courses
            .get(&course_key)
            .ok_or(RegistryError::CourseNotFound { course_key })
    }

    pub fn students(&self) -> impl Iterator<Item = &Student> {
        self.students.values()
    }

    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    pub fn enrollment_count(&self) -> usize {
        self.students.values().map(|s| s.enrollments().len()).sum()
    }

    pub fn list_courses_in_db(&self) -> String {
        let blocks: Vec<String> = self.courses.values().map(|c| c.to_string()).collect();
        blocks.join("\n\n")
    }

    pub fn print_student(&self, matrikel_number: u32) -> Result<String> {
        let student = self.student(matrikel_number)?;
        let dob = student.date_of_birth();
        let mut out = String::new();

        // Writing into a String cannot fail.
        let _ = writeln!(out, "Student Name: {} {}", student.first_name(), student.last_name());
        let _ = writeln!(out, "Matrikel Number: {}", student.matrikel_number());
        let _ = writeln!(out, "Date Of Birth(dd/mm/yyyy): {}", dob.format("%d/%m/%Y"));
        let _ = writeln!(out, "Address Of Student");
        let _ = writeln!(out, "{}", student.address());
        let _ = writeln!(out, "Enrollments");
        for enrollment in student.enrollments() {
            let course = self.course(enrollment.course_key())?;
            let _ = writeln!(out, "Course: {}", course.title());
            let _ = writeln!(out, "Semester: {}", enrollment.semester());
            let _ = writeln!(out, "Grade: {}", enrollment.grade());
        }

        Ok(out)
    }

    /// Students whose first or last name contains `needle`, ignoring case,
    /// in ascending matrikel order.
    pub fn search_student_in_db(&self, needle: &str) -> Vec<&Student> {
        self.students
            .values()
            .filter(|s| s.name_matches(needle))
            .collect()
    }

    pub fn update_student_in_db(&mut self, matrikel_number: u32, update: StudentUpdate) -> Result<()> {
        if matches!(update, StudentUpdate::Terminate) {
            return Ok(());
        }

        let attribute = update.attribute();
        let student = self.student_mut(matrikel_number)?;
        match update {
            StudentUpdate::Terminate => {}
            StudentUpdate::FirstName(name) => student.set_first_name(name),
            StudentUpdate::LastName(name) => student.set_last_name(name),
            StudentUpdate::DateOfBirth(date) => student.set_date_of_birth(date),
            StudentUpdate::Address(address) => student.set_address(address),
            StudentUpdate::Enrollment(change) => {
                let action = change.action();
                match change {
                    EnrollmentUpdate::ChangeGrade { course_key, grade } => {
                        student.update_grade(course_key, grade)?
                    }
                    EnrollmentUpdate::Delete { course_key } => {
                        if !student.delete_enrollment(course_key) {
                            tracing::debug!(
                                "Student {} has no enrollment for course {}, nothing deleted",
                                matrikel_number,
                                course_key
                            );
                        }
                    }
                }
                tracing::debug!("Student {} enrollment change ({:?})", matrikel_number, action);
            }
        }

        tracing::debug!("Student {} updated ({:?})", matrikel_number, attribute);
        Ok(())
    }

    pub fn update_student_grade_in_db(
        &mut self,
        matrikel_number: u32,
        course_key: u32,
        grade: f32,
    ) -> Result<()> {
        self.student_mut(matrikel_number)?
            .update_grade(course_key, grade)
            .inspect_err(|e| tracing::warn!("Grade update rejected: {}", e))
    }

    /// Writes the course, student and enrollment sections.
    ///
    /// Every text field is checked before the first byte is written, so a
    /// rejected database leaves the sink untouched.
    pub fn write<W: Write>(&self, sink: W) -> Result<()> {
        self.validate()?;

        let mut writer = codec::record_writer(sink);

        writer.write_record([self.courses.len().to_string()])?;
        for course in self.courses.values() {
            writer.write_record(course.to_record())?;
        }

        writer.write_record([self.students.len().to_string()])?;
        for student in self.students.values() {
            writer.write_record(student.to_record())?;
        }

        writer.write_record([self.enrollment_count().to_string()])?;
        for student in self.students.values() {
            for enrollment in student.enrollments() {
                writer.write_record(enrollment.to_record(student.matrikel_number()))?;
            }
        }

        writer.flush()?;
        tracing::info!(
            "Wrote {} courses, {} students, {} enrollments",
            self.courses.len(),
            self.students.len(),
            self.enrollment_count()
        );
        Ok(())
    }

    /// Replaces the whole database with the contents of `source`.
    ///
    /// Parsing happens into a fresh database; on any error `self` is left
    /// unchanged. A missing enrollment section counts as zero enrollments.
    pub fn read<R: Read>(&mut self, source: R) -> Result<()> {
        let mut loaded = Self {
            students: BTreeMap::new(),
            courses: BTreeMap::new(),
            next_matrikel_number: self.next_matrikel_number,
        };
        let mut stream = RecordStream::new(source);

        let course_count = stream.expect_count("course")?;
        for _ in 0..course_count {
            let (record, line) = stream.expect_record("course record")?;
            loaded.add_course_to_db(Course::from_record(&Fields::new(&record, line))?);
        }

        let student_count = stream.expect_count("student")?;
        for _ in 0..student_count {
            let (record, line) = stream.expect_record("student record")?;
            loaded.add_student_to_db(Student::from_record(&Fields::new(&record, line))?);
        }

        let enrollment_count = stream.optional_count("enrollment")?;
        for _ in 0..enrollment_count {
            let (record, line) = stream.expect_record("enrollment record")?;
            loaded.apply_enrollment_record(&Fields::new(&record, line))?;
        }

        if stream.next_record()?.is_some() {
            tracing::warn!("Ignoring trailing records after the enrollment section");
        }

        tracing::info!(
            "Read {} courses, {} students, {} enrollments",
            loaded.courses.len(),
            loaded.students.len(),
            loaded.enrollment_count()
        );
        *self = loaded;
        Ok(())
    }

    fn apply_enrollment_record(&mut self, fields: &Fields<'_>) -> Result<()> {
        let matrikel_number: u32 = fields.number(0, "matrikel number")?;
        let course_key: u32 = fields.number(1, "course key")?;
        let semester = fields.text(2, "semester")?;
        let grade: f32 = fields.number(3, "grade")?;

        let at_line = |e: RegistryError| fields.error(e.to_string());
        match self.add_enrollment_to_student(matrikel_number, course_key, semester) {
            Ok(()) | Err(RegistryError::DuplicateEnrollment { .. }) => {}
            Err(e) => return Err(at_line(e)),
        }
        self.update_student_grade_in_db(matrikel_number, course_key, grade)
            .map_err(at_line)
    }
}

impl Validate for StudentDb {
    fn validate(&self) -> Result<()> {
        for course in self.courses.values() {
            validate_storable_text("course title", course.title())?;
        }
        for student in self.students.values() {
            validate_storable_text("first name", student.first_name())?;
            validate_storable_text("last name", student.last_name())?;
            validate_storable_text("street", student.address().street())?;
            validate_storable_text("city", student.address().city_name())?;
            validate_storable_text("additional info", student.address().additional_info())?;
            for enrollment in student.enrollments() {
                validate_storable_text("semester", enrollment.semester())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Major;
    use chrono::{NaiveTime, Weekday};

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn apt() -> Course {
        Course::weekly(5387, "APT", Major::Automation, 5.0, Weekday::Wed, hm(17, 45), hm(19, 15))
    }

    fn sample_db() -> (StudentDb, u32) {
        let mut db = StudentDb::new();
        db.add_weekly_course_to_db(apt());
        let matrikel = db.register_student(
            "Peter",
            "Olsen",
            NaiveDate::from_ymd_opt(1998, 11, 23).unwrap(),
            Address::new("7158 Spurvevej", 21361, "Juelsminde", ""),
        )
        .unwrap();
        (db, matrikel)
    }

    #[test]
    fn test_register_assigns_increasing_numbers() {
        let (mut db, first) = sample_db();
        assert_eq!(first, FIRST_MATRIKEL_NUMBER);
        let dob = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let second = db.register_student("Anna", "Berg", dob, Address::default()).unwrap();
        assert_eq!(second, FIRST_MATRIKEL_NUMBER + 1);
    }

    #[test]
    fn test_explicit_numbers_push_counter_forward() {
        let mut db = StudentDb::new();
        let dob = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        db.add_student_to_db(Student::new(200000, "Anna", "Berg", dob, Address::default()));
        assert_eq!(db.next_matrikel_number(), Some(200001));
        db.add_student_to_db(Student::new(150000, "Jon", "Dahl", dob, Address::default()));
        assert_eq!(db.next_matrikel_number(), Some(200001));
    }

    #[test]
    fn test_exhausted_counter_never_overwrites() {
        let mut db = StudentDb::new();
        let dob = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        db.add_student_to_db(Student::new(u32::MAX, "Keep", "Me", dob, Address::default()));
        assert_eq!(db.next_matrikel_number(), None);

        assert!(matches!(
            db.register_student("New", "Comer", dob, Address::default()),
            Err(RegistryError::ValidationError { .. })
        ));
        assert_eq!(db.student_count(), 1);
        assert_eq!(db.student(u32::MAX).unwrap().last_name(), "Me");

        // Lower explicit numbers do not revive the counter.
        db.add_student_to_db(Student::new(7, "Jon", "Dahl", dob, Address::default()));
        assert!(db.register_student("New", "Comer", dob, Address::default()).is_err());
    }

    #[test]
    fn test_counter_at_top_of_range_assigns_last_number_once() {
        let mut db = StudentDb::with_first_matrikel_number(u32::MAX);
        let dob = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert_eq!(
            db.register_student("Anna", "Berg", dob, Address::default()).unwrap(),
            u32::MAX
        );
        assert!(db.register_student("Jon", "Dahl", dob, Address::default()).is_err());
        assert_eq!(db.student(u32::MAX).unwrap().first_name(), "Anna");
    }

    #[test]
    fn test_enrollment_requires_existing_course_and_student() {
        let (mut db, matrikel) = sample_db();
        assert!(matches!(
            db.add_enrollment_to_student(matrikel, 9999, "WS2018"),
            Err(RegistryError::CourseNotFound { course_key: 9999 })
        ));
        assert!(matches!(
            db.add_enrollment_to_student(1, 5387, "WS2018"),
            Err(RegistryError::StudentNotFound { matrikel_number: 1 })
        ));
    }

    #[test]
    fn test_duplicate_enrollment_rejected_without_change() {
        let (mut db, matrikel) = sample_db();
        db.add_enrollment_to_student(matrikel, 5387, "WS2018").unwrap();
        assert!(matches!(
            db.add_enrollment_to_student(matrikel, 5387, "SS2019"),
            Err(RegistryError::DuplicateEnrollment { .. })
        ));
        let enrollments = db.student(matrikel).unwrap().enrollments();
        assert_eq!(enrollments.len(), 1);
        assert_eq!(enrollments[0].semester(), "WS2018");
    }

    #[test]
    fn test_update_dispatch() {
        let (mut db, matrikel) = sample_db();
        db.add_enrollment_to_student(matrikel, 5387, "WS2018").unwrap();

        db.update_student_in_db(matrikel, StudentUpdate::FirstName("Per".into()))
            .unwrap();
        db.update_student_in_db(
            matrikel,
            StudentUpdate::Enrollment(EnrollmentUpdate::ChangeGrade {
                course_key: 5387,
                grade: 1.3,
            }),
        )
        .unwrap();

        let student = db.student(matrikel).unwrap();
        assert_eq!(student.first_name(), "Per");
        assert_eq!(student.enrollment(5387).unwrap().grade(), 1.3);

        db.update_student_in_db(
            matrikel,
            StudentUpdate::Enrollment(EnrollmentUpdate::Delete { course_key: 5387 }),
        )
        .unwrap();
        assert!(db.student(matrikel).unwrap().enrollments().is_empty());
    }

    #[test]
    fn test_terminate_is_noop_even_for_unknown_student() {
        let (mut db, _) = sample_db();
        assert!(db.update_student_in_db(42, StudentUpdate::Terminate).is_ok());
        assert!(db
            .update_student_in_db(42, StudentUpdate::LastName("X".into()))
            .is_err());
    }

    #[test]
    fn test_print_student_shows_grade() {
        let (mut db, matrikel) = sample_db();
        db.add_enrollment_to_student(matrikel, 5387, "WS2018").unwrap();
        db.update_student_grade_in_db(matrikel, 5387, 2.3).unwrap();

        let text = db.print_student(matrikel).unwrap();
        assert!(text.contains("Student Name: Peter Olsen"));
        assert!(text.contains("Date Of Birth(dd/mm/yyyy): 23/11/1998"));
        assert!(text.contains("Course: APT\nSemester: WS2018\nGrade: 2.3"));
    }

    #[test]
    fn test_write_rejects_delimiter_in_text() {
        let (mut db, _) = sample_db();
        db.add_course_to_db(Course::weekly(
            1,
            "A;B",
            Major::Power,
            1.0,
            Weekday::Mon,
            hm(8, 0),
            hm(9, 0),
        ));
        let mut out = Vec::new();
        assert!(matches!(
            db.write(&mut out),
            Err(RegistryError::UnstorableField { .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_failed_read_keeps_previous_contents() {
        let (mut db, matrikel) = sample_db();
        let input = "1\nW;1;X;Power;1;1;8:00;9:00;\n1\nnot-a-number;A;B;1.1.2000;S;1;C;;\n0\n";
        assert!(db.read(input.as_bytes()).is_err());
        assert!(db.is_student_exists(matrikel));
        assert!(db.is_course_exists(5387));
        assert!(!db.is_course_exists(1));
    }
}
