use crate::core::codec;
use crate::domain::Major;
use chrono::{NaiveDate, NaiveTime, Weekday};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "student-registry")]
#[command(about = "Manage a flat-file registry of courses, students and enrollments")]
pub struct CliConfig {
    /// Data file to operate on (overrides storage.data_file)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Render query results as JSON")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List all courses
    ListCourses,

    /// Add (or replace) a course held on one day every week
    AddWeeklyCourse {
        #[arg(long)]
        key: u32,
        #[arg(long)]
        title: String,
        /// A, C, E or P (full names accepted)
        #[arg(long)]
        major: Major,
        #[arg(long)]
        credits: f32,
        /// 0 = Sunday .. 6 = Saturday
        #[arg(long, value_parser = parse_weekday_arg)]
        day: Weekday,
        /// hh:mm[:ss]
        #[arg(long, value_parser = parse_time_arg)]
        start: NaiveTime,
        #[arg(long, value_parser = parse_time_arg)]
        end: NaiveTime,
    },

    /// Add (or replace) a course running over a date range
    AddBlockCourse {
        #[arg(long)]
        key: u32,
        #[arg(long)]
        title: String,
        #[arg(long)]
        major: Major,
        #[arg(long)]
        credits: f32,
        /// dd.mm.yyyy
        #[arg(long, value_parser = parse_date_arg)]
        start_date: NaiveDate,
        #[arg(long, value_parser = parse_date_arg)]
        end_date: NaiveDate,
        #[arg(long, value_parser = parse_time_arg)]
        start: NaiveTime,
        #[arg(long, value_parser = parse_time_arg)]
        end: NaiveTime,
    },

    /// Register a student under the next free matrikel number
    AddStudent {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// dd.mm.yyyy
        #[arg(long, value_parser = parse_date_arg)]
        birth_date: NaiveDate,
        #[arg(long)]
        street: String,
        #[arg(long)]
        postal_code: u16,
        #[arg(long)]
        city: String,
        #[arg(long, default_value = "")]
        info: String,
    },

    /// Enroll a student in a course
    Enroll {
        matrikel: u32,
        course: u32,
        semester: String,
    },

    /// Set the grade of an existing enrollment
    Grade {
        matrikel: u32,
        course: u32,
        grade: f32,
    },

    /// Remove an enrollment (no-op if absent)
    Unenroll { matrikel: u32, course: u32 },

    /// Print one student with enrollments
    Show { matrikel: u32 },

    /// Find students by part of their first or last name
    Search { name: String },

    UpdateName {
        matrikel: u32,
        #[arg(long)]
        first: Option<String>,
        #[arg(long)]
        last: Option<String>,
    },

    UpdateBirthDate {
        matrikel: u32,
        #[arg(value_parser = parse_date_arg)]
        date: NaiveDate,
    },

    UpdateAddress {
        matrikel: u32,
        #[arg(long)]
        street: String,
        #[arg(long)]
        postal_code: u16,
        #[arg(long)]
        city: String,
        #[arg(long, default_value = "")]
        info: String,
    },

    /// Replace the registry with the contents of another data file
    Import { file: PathBuf },

    /// Write the registry to another data file
    Export { file: PathBuf },
}

impl Command {
    /// Whether the data file has to be saved after the command ran.
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Command::ListCourses
                | Command::Show { .. }
                | Command::Search { .. }
                | Command::Export { .. }
        )
    }
}

fn parse_weekday_arg(value: &str) -> Result<Weekday, String> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .and_then(codec::weekday_from_number)
        .ok_or_else(|| format!("'{}' is not a day number between 0 (Sunday) and 6", value))
}

fn parse_time_arg(value: &str) -> Result<NaiveTime, String> {
    codec::parse_time(value)
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    codec::parse_date(value)
}
