// Domain layer: registry entities and the storage port.

pub mod address;
pub mod course;
pub mod enrollment;
pub mod ports;
pub mod student;

pub use address::Address;
pub use course::{Course, Major, Schedule};
pub use enrollment::Enrollment;
pub use student::Student;
