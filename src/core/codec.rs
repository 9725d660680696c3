//! Semicolon-delimited record codec shared by the course, student and
//! enrollment encodings.
//!
//! Fields are written unquoted with a `\n` terminator. Dates travel as
//! `day.month.year` and times as `hour:minute` with an optional `:second`.

use crate::utils::error::{RegistryError, Result};
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, StringRecordsIntoIter, Terminator, WriterBuilder};
use std::fmt::Display;
use std::io::{Read, Write};
use std::str::FromStr;

pub const FIELD_DELIMITER: u8 = b';';
pub const DATE_DELIMITER: char = '.';
pub const TIME_DELIMITER: char = ':';

pub fn record_writer<W: Write>(sink: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .has_headers(false)
        .from_writer(sink)
}

pub fn record_reader<R: Read>(source: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .quoting(false)
        .flexible(true)
        .has_headers(false)
        .from_reader(source)
}

pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        date.day(),
        date.month(),
        date.year(),
        sep = DATE_DELIMITER
    )
}

/// Writes `hour:minute`, adding `:second` only when it is non-zero.
pub fn format_time(time: NaiveTime) -> String {
    if time.second() == 0 {
        format!("{}{sep}{}", time.hour(), time.minute(), sep = TIME_DELIMITER)
    } else {
        format!(
            "{}{sep}{}{sep}{}",
            time.hour(),
            time.minute(),
            time.second(),
            sep = TIME_DELIMITER
        )
    }
}

/// Parses `day.month.year`.
pub fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    let parts: Vec<&str> = value.split(DATE_DELIMITER).collect();
    let [day, month, year] = parts.as_slice() else {
        return Err(format!("expected day.month.year, got '{}'", value));
    };

    let day: u32 = parse_component(day, "day")?;
    let month: u32 = parse_component(month, "month")?;
    let year: i32 = parse_component(year, "year")?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("'{}' is not a valid calendar date", value))
}

/// Parses `hour:minute[:second]`; the second defaults to 0.
pub fn parse_time(value: &str) -> std::result::Result<NaiveTime, String> {
    let parts: Vec<&str> = value.split(TIME_DELIMITER).collect();
    let (hour, minute, second) = match parts.as_slice() {
        [hour, minute] => (*hour, *minute, "0"),
        [hour, minute, second] => (*hour, *minute, *second),
        _ => return Err(format!("expected hour:minute[:second], got '{}'", value)),
    };

    let hour: u32 = parse_component(hour, "hour")?;
    let minute: u32 = parse_component(minute, "minute")?;
    let second: u32 = parse_component(second, "second")?;

    NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| format!("'{}' is not a valid time of day", value))
}

fn parse_component<T: FromStr>(value: &str, name: &str) -> std::result::Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("invalid {} '{}'", name, value))
}

/// Day numbering runs 0 = Sunday through 6 = Saturday.
pub fn weekday_from_number(number: u32) -> Option<Weekday> {
    match number {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

pub fn weekday_number(day: Weekday) -> u32 {
    day.num_days_from_sunday()
}

/// Positional access to one parsed record, reporting failures against the
/// record's line number.
pub struct Fields<'a> {
    record: &'a StringRecord,
    line: u64,
}

impl<'a> Fields<'a> {
    pub fn new(record: &'a StringRecord, line: u64) -> Self {
        Self { record, line }
    }

    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn text(&self, index: usize, name: &str) -> Result<&'a str> {
        self.record.get(index).ok_or_else(|| {
            RegistryError::parse(
                self.line,
                format!("missing field '{}' (column {})", name, index + 1),
            )
        })
    }

    pub fn number<T>(&self, index: usize, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.text(index, name)?;
        raw.trim().parse().map_err(|e| {
            RegistryError::parse(self.line, format!("invalid {} '{}': {}", name, raw, e))
        })
    }

    pub fn date(&self, index: usize, name: &str) -> Result<NaiveDate> {
        let raw = self.text(index, name)?;
        parse_date(raw).map_err(|e| RegistryError::parse(self.line, format!("{}: {}", name, e)))
    }

    pub fn time(&self, index: usize, name: &str) -> Result<NaiveTime> {
        let raw = self.text(index, name)?;
        parse_time(raw).map_err(|e| RegistryError::parse(self.line, format!("{}: {}", name, e)))
    }

    pub fn error(&self, message: impl Into<String>) -> RegistryError {
        RegistryError::parse(self.line, message)
    }
}

/// Sequential record access for the sectioned file layout.
pub struct RecordStream<R: Read> {
    records: StringRecordsIntoIter<R>,
    last_line: u64,
}

impl<R: Read> RecordStream<R> {
    pub fn new(source: R) -> Self {
        Self {
            records: record_reader(source).into_records(),
            last_line: 0,
        }
    }

    pub fn next_record(&mut self) -> Result<Option<(StringRecord, u64)>> {
        match self.records.next() {
            None => Ok(None),
            Some(record) => {
                let record = record?;
                let line = record
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(self.last_line + 1);
                // The csv reader skips empty lines; a gap in line numbers is one.
                if line > self.last_line + 1 {
                    return Err(RegistryError::parse(self.last_line + 1, "unexpected blank line"));
                }
                self.last_line = line;
                Ok(Some((record, line)))
            }
        }
    }

    pub fn expect_record(&mut self, expected: &str) -> Result<(StringRecord, u64)> {
        self.next_record()?
            .ok_or_else(|| RegistryError::UnexpectedEof {
                line: self.last_line + 1,
                expected: expected.to_string(),
            })
    }

    /// Reads a section header holding the number of records that follow.
    pub fn expect_count(&mut self, section: &str) -> Result<usize> {
        let (record, line) = self.expect_record(&format!("{} count", section))?;
        Fields::new(&record, line).number(0, &format!("{} count", section))
    }

    pub fn optional_count(&mut self, section: &str) -> Result<usize> {
        match self.next_record()? {
            None => Ok(0),
            Some((record, line)) => {
                Fields::new(&record, line).number(0, &format!("{} count", section))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_day_first() {
        let date = parse_date("23.11.1998").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(1998, 11, 23).unwrap());
        assert_eq!(format_date(date), "23.11.1998");
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("23.11").is_err());
        assert!(parse_date("31.2.2020").is_err());
        assert!(parse_date("aa.11.1998").is_err());
        assert!(parse_date("1.2.3.4").is_err());
    }

    #[test]
    fn test_parse_time_defaults_seconds() {
        let time = parse_time("17:45").unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(17, 45, 0).unwrap());
        assert_eq!(parse_time("9:5:30").unwrap(), NaiveTime::from_hms_opt(9, 5, 30).unwrap());
        assert_eq!(format_time(NaiveTime::from_hms_opt(9, 5, 0).unwrap()), "9:5");
        assert_eq!(format_time(NaiveTime::from_hms_opt(9, 5, 30).unwrap()), "9:5:30");
    }

    #[test]
    fn test_parse_time_rejects_out_of_range() {
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("12").is_err());
        assert!(parse_time("12:xx").is_err());
    }

    #[test]
    fn test_weekday_numbering_starts_on_sunday() {
        assert_eq!(weekday_from_number(0), Some(Weekday::Sun));
        assert_eq!(weekday_from_number(3), Some(Weekday::Wed));
        assert_eq!(weekday_from_number(7), None);
        assert_eq!(weekday_number(Weekday::Sat), 6);
    }

    #[test]
    fn test_record_stream_reports_line_numbers() {
        let input = "2\nW;1;x\n";
        let mut stream = RecordStream::new(input.as_bytes());
        assert_eq!(stream.expect_count("course").unwrap(), 2);
        let (record, line) = stream.expect_record("course").unwrap();
        assert_eq!(line, 2);
        assert_eq!(&record[0], "W");

        match stream.expect_record("course") {
            Err(RegistryError::UnexpectedEof { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected UnexpectedEof, got {:?}", other),
        }
    }

    #[test]
    fn test_record_stream_rejects_blank_lines() {
        let mut stream = RecordStream::new("\n\n0\n".as_bytes());
        match stream.next_record() {
            Err(RegistryError::ParseError { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected ParseError, got {:?}", other),
        }

        let mut stream = RecordStream::new("0\n\n0\n".as_bytes());
        assert_eq!(stream.expect_count("course").unwrap(), 0);
        match stream.expect_count("student") {
            Err(RegistryError::ParseError { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_newlines_are_not_records() {
        let mut stream = RecordStream::new("0\n\n\n".as_bytes());
        assert_eq!(stream.expect_count("course").unwrap(), 0);
        assert!(stream.next_record().unwrap().is_none());
    }

    #[test]
    fn test_fields_number_error_names_field() {
        let record = StringRecord::from(vec!["abc"]);
        let fields = Fields::new(&record, 7);
        let err = fields.number::<u32>(0, "course key").unwrap_err();
        assert!(err.to_string().starts_with("Line 7: invalid course key 'abc'"));
        assert!(fields.text(3, "title").is_err());
    }
}
