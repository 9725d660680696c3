use crate::utils::error::{RegistryError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub const MIN_GRADE: f32 = 0.0;
pub const MAX_GRADE: f32 = 6.0;

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(RegistryError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(RegistryError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_grade(grade: f32) -> Result<()> {
    if !(MIN_GRADE..=MAX_GRADE).contains(&grade) {
        return Err(RegistryError::InvalidGrade {
            grade,
            min: MIN_GRADE,
            max: MAX_GRADE,
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RegistryError::ValidationError {
            message: format!("{} cannot be empty or whitespace-only", field_name),
        });
    }
    Ok(())
}

/// Text fields are written unquoted, so the record delimiter and line breaks
/// would corrupt the file.
pub fn validate_storable_text(field_name: &str, value: &str) -> Result<()> {
    if let Some(c) = value.chars().find(|c| matches!(c, ';' | '\n' | '\r')) {
        return Err(RegistryError::UnstorableField {
            field: field_name.to_string(),
            reason: format!("contains forbidden character {:?}", c),
        });
    }
    Ok(())
}
