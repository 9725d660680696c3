use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    street: String,
    postal_code: u16,
    city_name: String,
    additional_info: String,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        postal_code: u16,
        city_name: impl Into<String>,
        additional_info: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            postal_code,
            city_name: city_name.into(),
            additional_info: additional_info.into(),
        }
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn postal_code(&self) -> u16 {
        self.postal_code
    }

    pub fn city_name(&self) -> &str {
        &self.city_name
    }

    pub fn additional_info(&self) -> &str {
        &self.additional_info
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}, {}", self.street, self.city_name, self.postal_code)?;
        if !self.additional_info.is_empty() {
            write!(f, "\n{}", self.additional_info)?;
        }
        Ok(())
    }
}
