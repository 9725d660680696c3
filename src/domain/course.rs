use crate::core::codec::{self, Fields};
use crate::utils::error::{RegistryError, Result};
use chrono::{NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Major {
    Automation,
    Communication,
    Embedded,
    Power,
}

impl Major {
    pub const ALL: [Major; 4] = [
        Major::Automation,
        Major::Communication,
        Major::Embedded,
        Major::Power,
    ];

    pub fn code(self) -> char {
        match self {
            Major::Automation => 'A',
            Major::Communication => 'C',
            Major::Embedded => 'E',
            Major::Power => 'P',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Major::Automation => "Automation",
            Major::Communication => "Communication",
            Major::Embedded => "Embedded",
            Major::Power => "Power",
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == code)
    }

    /// Stored files carry the full name but only its first character is
    /// significant, so `"Automation"`, `"A"` and `"Apple"` all resolve to
    /// Automation.
    pub fn from_stored_name(name: &str) -> Option<Self> {
        name.chars().next().and_then(Self::from_code)
    }
}

impl fmt::Display for Major {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts a code or a name, case-insensitively (`e`, `Embedded`).
impl FromStr for Major {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim()
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .and_then(Self::from_code)
            .ok_or_else(|| {
                format!(
                    "unknown major '{}' (expected one of A, C, E, P)",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    Weekly {
        day_of_week: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
    Block {
        start_date: NaiveDate,
        end_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
}

impl Schedule {
    pub fn tag(&self) -> &'static str {
        match self {
            Schedule::Weekly { .. } => WEEKLY_TAG,
            Schedule::Block { .. } => BLOCK_TAG,
        }
    }
}

pub const WEEKLY_TAG: &str = "W";
pub const BLOCK_TAG: &str = "B";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    course_key: u32,
    title: String,
    major: Major,
    credit_points: f32,
    schedule: Schedule,
}

impl Course {
    pub fn weekly(
        course_key: u32,
        title: impl Into<String>,
        major: Major,
        credit_points: f32,
        day_of_week: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            course_key,
            title: title.into(),
            major,
            credit_points,
            schedule: Schedule::Weekly {
                day_of_week,
                start_time: whole_seconds(start_time),
                end_time: whole_seconds(end_time),
            },
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn block(
        course_key: u32,
        title: impl Into<String>,
        major: Major,
        credit_points: f32,
        start_date: NaiveDate,
        end_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            course_key,
            title: title.into(),
            major,
            credit_points,
            schedule: Schedule::Block {
                start_date,
                end_date,
                start_time: whole_seconds(start_time),
                end_time: whole_seconds(end_time),
            },
        }
    }

    pub fn course_key(&self) -> u32 {
        self.course_key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn major(&self) -> Major {
        self.major
    }

    pub fn credit_points(&self) -> f32 {
        self.credit_points
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn is_weekly(&self) -> bool {
        matches!(self.schedule, Schedule::Weekly { .. })
    }

    /// Encodes the course as one record; the trailing empty field yields the
    /// closing `;` of the line.
    pub fn to_record(&self) -> Vec<String> {
        let mut fields = vec![
            self.schedule.tag().to_string(),
            self.course_key.to_string(),
            self.title.clone(),
            self.major.name().to_string(),
            self.credit_points.to_string(),
        ];

        match &self.schedule {
            Schedule::Weekly {
                day_of_week,
                start_time,
                end_time,
            } => {
                fields.push(codec::weekday_number(*day_of_week).to_string());
                fields.push(codec::format_time(*start_time));
                fields.push(codec::format_time(*end_time));
            }
            Schedule::Block {
                start_date,
                end_date,
                start_time,
                end_time,
            } => {
                fields.push(codec::format_date(*start_date));
                fields.push(codec::format_date(*end_date));
                fields.push(codec::format_time(*start_time));
                fields.push(codec::format_time(*end_time));
            }
        }

        fields.push(String::new());
        fields
    }

    pub fn from_record(fields: &Fields<'_>) -> Result<Self> {
        let tag = fields.text(0, "course type")?;
        let course_key = fields.number(1, "course key")?;
        let title = fields.text(2, "title")?.to_string();
        let major_name = fields.text(3, "major")?;
        let major = Major::from_stored_name(major_name)
            .ok_or_else(|| fields.error(format!("unknown major '{}'", major_name)))?;
        let credit_points = fields.number(4, "credit points")?;

        let schedule = match tag {
            WEEKLY_TAG => {
                let day: u32 = fields.number(5, "day of week")?;
                let day_of_week = codec::weekday_from_number(day)
                    .ok_or_else(|| fields.error(format!("day of week {} is not in 0-6", day)))?;
                Schedule::Weekly {
                    day_of_week,
                    start_time: fields.time(6, "start time")?,
                    end_time: fields.time(7, "end time")?,
                }
            }
            BLOCK_TAG => Schedule::Block {
                start_date: fields.date(5, "start date")?,
                end_date: fields.date(6, "end date")?,
                start_time: fields.time(7, "start time")?,
                end_time: fields.time(8, "end time")?,
            },
            other => {
                return Err(RegistryError::parse(
                    fields.line(),
                    format!("unknown course type '{}' (expected W or B)", other),
                ))
            }
        };

        Ok(Self {
            course_key,
            title,
            major,
            credit_points,
            schedule,
        })
    }
}

/// The file format stops at whole seconds.
fn whole_seconds(time: NaiveTime) -> NaiveTime {
    time.with_nanosecond(0).unwrap_or(time)
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Course Key: {}", self.course_key)?;
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Major: {}", self.major)?;
        writeln!(f, "Credit Points: {}", self.credit_points)?;
        match &self.schedule {
            Schedule::Weekly {
                day_of_week,
                start_time,
                end_time,
            } => {
                writeln!(f, "Day of week - {}", day_of_week)?;
                write!(
                    f,
                    "Timings - {} to {}",
                    start_time.format("%H:%M"),
                    end_time.format("%H:%M")
                )
            }
            Schedule::Block {
                start_date,
                end_date,
                start_time,
                end_time,
            } => {
                writeln!(
                    f,
                    "Duration - {} to {}",
                    start_date.format("%d/%m/%Y"),
                    end_date.format("%d/%m/%Y")
                )?;
                write!(
                    f,
                    "Timings - {} to {}",
                    start_time.format("%H:%M"),
                    end_time.format("%H:%M")
                )
            }
        }
    }
}
