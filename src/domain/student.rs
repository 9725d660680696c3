use crate::core::codec::{self, Fields};
use crate::domain::address::Address;
use crate::domain::enrollment::Enrollment;
use crate::utils::error::{RegistryError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    matrikel_number: u32,
    first_name: String,
    last_name: String,
    date_of_birth: NaiveDate,
    address: Address,
    enrollments: Vec<Enrollment>,
}

impl Student {
    pub fn new(
        matrikel_number: u32,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
        address: Address,
    ) -> Self {
        Self {
            matrikel_number,
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth,
            address,
            enrollments: Vec::new(),
        }
    }

    pub fn matrikel_number(&self) -> u32 {
        self.matrikel_number
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn date_of_birth(&self) -> NaiveDate {
        self.date_of_birth
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn enrollments(&self) -> &[Enrollment] {
        &self.enrollments
    }

    pub fn set_first_name(&mut self, first_name: impl Into<String>) {
        self.first_name = first_name.into();
    }

    pub fn set_last_name(&mut self, last_name: impl Into<String>) {
        self.last_name = last_name.into();
    }

    pub fn set_date_of_birth(&mut self, date_of_birth: NaiveDate) {
        self.date_of_birth = date_of_birth;
    }

    pub fn set_address(&mut self, address: Address) {
        self.address = address;
    }

    pub fn enrollment(&self, course_key: u32) -> Option<&Enrollment> {
        self.enrollments.iter().find(|e| e.course_key() == course_key)
    }

    pub fn is_enrolled_in(&self, course_key: u32) -> bool {
        self.enrollment(course_key).is_some()
    }

    /// Appends without a duplicate check; `StudentDb` guards uniqueness.
    pub(crate) fn push_enrollment(&mut self, enrollment: Enrollment) {
        self.enrollments.push(enrollment);
    }

    pub fn update_grade(&mut self, course_key: u32, grade: f32) -> Result<()> {
        let matrikel_number = self.matrikel_number;
        let enrollment = self
            .enrollments
            .iter_mut()
            .find(|e| e.course_key() == course_key)
            .ok_or(RegistryError::EnrollmentNotFound {
                matrikel_number,
                course_key,
            })?;
        enrollment.set_grade(grade)
    }

    /// Removes the enrollment for `course_key`, returning whether one existed.
    pub fn delete_enrollment(&mut self, course_key: u32) -> bool {
        match self
            .enrollments
            .iter()
            .position(|e| e.course_key() == course_key)
        {
            Some(index) => {
                self.enrollments.remove(index);
                true
            }
            None => false,
        }
    }

    /// Case-insensitive substring match against first or last name.
    pub fn name_matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.first_name.to_lowercase().contains(&needle)
            || self.last_name.to_lowercase().contains(&needle)
    }

    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.matrikel_number.to_string(),
            self.last_name.clone(),
            self.first_name.clone(),
            codec::format_date(self.date_of_birth),
            self.address.street().to_string(),
            self.address.postal_code().to_string(),
            self.address.city_name().to_string(),
            self.address.additional_info().to_string(),
            String::new(),
        ]
    }

    pub fn from_record(fields: &Fields<'_>) -> Result<Self> {
        let address = Address::new(
            fields.text(4, "street")?,
            fields.number(5, "postal code")?,
            fields.text(6, "city")?,
            fields.text(7, "additional info")?,
        );

        Ok(Self::new(
            fields.number(0, "matrikel number")?,
            fields.text(2, "first name")?,
            fields.text(1, "last name")?,
            fields.date(3, "date of birth")?,
            address,
        ))
    }
}
