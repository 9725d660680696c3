use crate::adapters::FileStorage;
use crate::config::Command;
use crate::core::{EnrollmentUpdate, RegistryStore, StudentDb, StudentUpdate};
use crate::domain::{Address, Course};
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::validate_non_empty_string;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SearchHit<'a> {
    matrikel_number: u32,
    last_name: &'a str,
    first_name: &'a str,
}

fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Runs one command against `db` and returns the text to show the operator.
pub fn execute(command: &Command, db: &mut StudentDb, json: bool) -> Result<String> {
    match command {
        Command::ListCourses => {
            if json {
                render_json(&db.courses().collect::<Vec<_>>())
            } else if db.course_count() == 0 {
                Ok("No courses in the database".to_string())
            } else {
                Ok(db.list_courses_in_db())
            }
        }

        Command::AddWeeklyCourse {
            key,
            title,
            major,
            credits,
            day,
            start,
            end,
        } => {
            let replaced = db.is_course_exists(*key);
            db.add_weekly_course_to_db(Course::weekly(
                *key,
                title.as_str(),
                *major,
                *credits,
                *day,
                *start,
                *end,
            ));
            Ok(course_saved_message(*key, replaced))
        }

        Command::AddBlockCourse {
            key,
            title,
            major,
            credits,
            start_date,
            end_date,
            start,
            end,
        } => {
            let replaced = db.is_course_exists(*key);
            db.add_block_course_to_db(Course::block(
                *key,
                title.as_str(),
                *major,
                *credits,
                *start_date,
                *end_date,
                *start,
                *end,
            ));
            Ok(course_saved_message(*key, replaced))
        }

        Command::AddStudent {
            first_name,
            last_name,
            birth_date,
            street,
            postal_code,
            city,
            info,
        } => {
            validate_non_empty_string("first name", first_name)?;
            validate_non_empty_string("last name", last_name)?;
            let matrikel_number = db.register_student(
                first_name.as_str(),
                last_name.as_str(),
                *birth_date,
                Address::new(street.as_str(), *postal_code, city.as_str(), info.as_str()),
            )?;
            Ok(format!(
                "Student registered with matrikel number {}",
                matrikel_number
            ))
        }

        Command::Enroll {
            matrikel,
            course,
            semester,
        } => {
            db.add_enrollment_to_student(*matrikel, *course, semester.as_str())?;
            Ok(format!(
                "Student {} enrolled in course {} for {}",
                matrikel, course, semester
            ))
        }

        Command::Grade {
            matrikel,
            course,
            grade,
        } => {
            db.update_student_grade_in_db(*matrikel, *course, *grade)?;
            Ok(format!(
                "Grade {} recorded for student {} in course {}",
                grade, matrikel, course
            ))
        }

        Command::Unenroll { matrikel, course } => {
            db.update_student_in_db(
                *matrikel,
                StudentUpdate::Enrollment(EnrollmentUpdate::Delete {
                    course_key: *course,
                }),
            )?;
            Ok(format!(
                "Student {} is not enrolled in course {}",
                matrikel, course
            ))
        }

        Command::Show { matrikel } => {
            if json {
                render_json(db.student(*matrikel)?)
            } else {
                db.print_student(*matrikel)
            }
        }

        Command::Search { name } => {
            let hits: Vec<SearchHit<'_>> = db
                .search_student_in_db(name)
                .into_iter()
                .map(|s| SearchHit {
                    matrikel_number: s.matrikel_number(),
                    last_name: s.last_name(),
                    first_name: s.first_name(),
                })
                .collect();

            if json {
                return render_json(&hits);
            }
            if hits.is_empty() {
                return Ok(format!("No student matches '{}'", name));
            }
            Ok(hits
                .iter()
                .map(|h| {
                    format!(
                        "Matrikel Number: {}, Last Name: {}, First Name: {}",
                        h.matrikel_number, h.last_name, h.first_name
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"))
        }

        Command::UpdateName {
            matrikel,
            first,
            last,
        } => {
            if first.is_none() && last.is_none() {
                return Err(RegistryError::ValidationError {
                    message: "pass --first and/or --last".to_string(),
                });
            }
            if let Some(first) = first {
                validate_non_empty_string("first name", first)?;
                db.update_student_in_db(*matrikel, StudentUpdate::FirstName(first.clone()))?;
            }
            if let Some(last) = last {
                validate_non_empty_string("last name", last)?;
                db.update_student_in_db(*matrikel, StudentUpdate::LastName(last.clone()))?;
            }
            db.print_student(*matrikel)
        }

        Command::UpdateBirthDate { matrikel, date } => {
            db.update_student_in_db(*matrikel, StudentUpdate::DateOfBirth(*date))?;
            db.print_student(*matrikel)
        }

        Command::UpdateAddress {
            matrikel,
            street,
            postal_code,
            city,
            info,
        } => {
            let address = Address::new(street.as_str(), *postal_code, city.as_str(), info.as_str());
            db.update_student_in_db(*matrikel, StudentUpdate::Address(address))?;
            db.print_student(*matrikel)
        }

        Command::Import { file } => {
            FileStorage::new(file, false).load_into(db)?;
            Ok(format!(
                "Imported {} courses, {} students and {} enrollments from {}",
                db.course_count(),
                db.student_count(),
                db.enrollment_count(),
                file.display()
            ))
        }

        Command::Export { file } => {
            FileStorage::new(file, false).save(db)?;
            Ok(format!("Registry written to {}", file.display()))
        }
    }
}

fn course_saved_message(key: u32, replaced: bool) -> String {
    if replaced {
        format!("Course {} replaced", key)
    } else {
        format!("Course {} added", key)
    }
}
