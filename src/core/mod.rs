pub mod codec;
pub mod student_db;
pub mod update;

pub use crate::domain::ports::RegistryStore;
pub use crate::utils::error::Result;
pub use student_db::{StudentDb, FIRST_MATRIKEL_NUMBER};
pub use update::{EnrollmentAction, EnrollmentUpdate, StudentUpdate, UpdateAttribute};
