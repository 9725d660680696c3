pub mod adapters;
#[cfg(feature = "cli")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, Command};

pub use crate::adapters::FileStorage;
pub use crate::config::RegistryConfig;
pub use crate::core::{RegistryStore, StudentDb, StudentUpdate};
pub use crate::domain::{Address, Course, Enrollment, Major, Student};
pub use crate::utils::error::{RegistryError, Result};
