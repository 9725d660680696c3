use crate::domain::Address;
use crate::utils::error::RegistryError;
use chrono::NaiveDate;

/// Numeric attribute selector used by menu-driven front-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAttribute {
    Terminate = 0,
    FirstName = 1,
    LastName = 2,
    DateOfBirth = 3,
    Enrollment = 4,
    Address = 5,
}

impl TryFrom<u32> for UpdateAttribute {
    type Error = RegistryError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(UpdateAttribute::Terminate),
            1 => Ok(UpdateAttribute::FirstName),
            2 => Ok(UpdateAttribute::LastName),
            3 => Ok(UpdateAttribute::DateOfBirth),
            4 => Ok(UpdateAttribute::Enrollment),
            5 => Ok(UpdateAttribute::Address),
            other => Err(RegistryError::ValidationError {
                message: format!("unknown update attribute {} (expected 0-5)", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentAction {
    ChangeGrade = 1,
    Delete = 2,
}

impl TryFrom<u32> for EnrollmentAction {
    type Error = RegistryError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(EnrollmentAction::ChangeGrade),
            2 => Ok(EnrollmentAction::Delete),
            other => Err(RegistryError::ValidationError {
                message: format!("unknown enrollment action {} (expected 1 or 2)", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnrollmentUpdate {
    ChangeGrade { course_key: u32, grade: f32 },
    Delete { course_key: u32 },
}

impl EnrollmentUpdate {
    pub fn action(&self) -> EnrollmentAction {
        match self {
            EnrollmentUpdate::ChangeGrade { .. } => EnrollmentAction::ChangeGrade,
            EnrollmentUpdate::Delete { .. } => EnrollmentAction::Delete,
        }
    }
}

/// A change to one student attribute together with its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum StudentUpdate {
    Terminate,
    FirstName(String),
    LastName(String),
    DateOfBirth(NaiveDate),
    Enrollment(EnrollmentUpdate),
    Address(Address),
}

impl StudentUpdate {
    pub fn attribute(&self) -> UpdateAttribute {
        match self {
            StudentUpdate::Terminate => UpdateAttribute::Terminate,
            StudentUpdate::FirstName(_) => UpdateAttribute::FirstName,
            StudentUpdate::LastName(_) => UpdateAttribute::LastName,
            StudentUpdate::DateOfBirth(_) => UpdateAttribute::DateOfBirth,
            StudentUpdate::Enrollment(_) => UpdateAttribute::Enrollment,
            StudentUpdate::Address(_) => UpdateAttribute::Address,
        }
    }
}
