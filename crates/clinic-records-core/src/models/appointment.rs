//! Appointment calendar views.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{Record, Table};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    // Slash dates read month first; day first only when that cannot parse.
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"];

/// Parse a manually entered appointment date.
///
/// Date-only values are placed at midnight. Returns `None` for anything
/// that does not parse; callers exclude such rows instead of failing.
pub fn parse_appointment_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Upcoming appointments that fall on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDay {
    pub date: NaiveDate,
    pub rows: Vec<Record>,
}

impl AppointmentDay {
    /// Heading used by list views, e.g. "Monday, 10 June 2024".
    pub fn heading(&self) -> String {
        self.date.format("%A, %d %B %Y").to_string()
    }
}

/// Appointments split around the "yesterday" cutoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentPartition {
    /// Appointments after the cutoff, grouped by day, earliest day first
    pub upcoming: Vec<AppointmentDay>,
    /// Appointments at or before the cutoff, most recent first
    pub archive: Table,
    /// Rows whose date could not be parsed
    pub malformed: usize,
}

impl AppointmentPartition {
    /// Split a table relative to `today`.
    ///
    /// The cutoff is midnight at the start of the day before `today`: a row is
    /// upcoming iff its date is strictly later than the cutoff. Same-day
    /// appointments therefore stay upcoming, and so does a timed entry from
    /// yesterday.
    pub fn split(table: &Table, today: NaiveDate) -> Self {
        let schema = table.schema().clone();
        let cutoff = today
            .checked_sub_days(Days::new(1))
            .unwrap_or(today)
            .and_time(NaiveTime::MIN);

        let Some(date_field) = schema.appointment_date_field() else {
            return Self {
                upcoming: Vec::new(),
                archive: Table::empty(schema),
                malformed: 0,
            };
        };

        let mut upcoming: Vec<(NaiveDateTime, &Record)> = Vec::new();
        let mut archive: Vec<(NaiveDateTime, &Record)> = Vec::new();
        let mut malformed = 0;

        for record in table.rows() {
            match parse_appointment_date(record.get(date_field)) {
                Some(when) if when > cutoff => upcoming.push((when, record)),
                Some(when) => archive.push((when, record)),
                None => malformed += 1,
            }
        }

        // sort_by_key is stable, so input order breaks ties
        upcoming.sort_by_key(|(when, _)| *when);
        archive.sort_by_key(|(when, _)| std::cmp::Reverse(*when));

        let mut days: Vec<AppointmentDay> = Vec::new();
        for (when, record) in upcoming {
            match days.last_mut() {
                Some(day) if day.date == when.date() => day.rows.push(record.clone()),
                _ => days.push(AppointmentDay {
                    date: when.date(),
                    rows: vec![record.clone()],
                }),
            }
        }

        Self {
            upcoming: days,
            archive: Table::from_records(schema, archive.into_iter().map(|(_, r)| r.clone())),
            malformed,
        }
    }

    /// Upcoming rows flattened back into a table, in calendar order.
    pub fn upcoming_table(&self) -> Table {
        Table::from_records(
            self.archive.schema().clone(),
            self.upcoming.iter().flat_map(|d| d.rows.iter().cloned()),
        )
    }

    pub fn upcoming_count(&self) -> usize {
        self.upcoming.iter().map(|d| d.rows.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, Schema};

    fn booking(name: &str, date: &str) -> Record {
        Record::new()
            .with(Field::ApptName, name)
            .with(Field::ApptDate, date)
            .with(Field::ApptTime, "10:00")
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_formats() {
        let midnight = day(2024, 6, 10).and_time(NaiveTime::MIN);
        assert_eq!(parse_appointment_date("2024-06-10"), Some(midnight));
        assert_eq!(parse_appointment_date("2024/06/10"), Some(midnight));
        assert_eq!(parse_appointment_date("06/10/2024"), Some(midnight));
        assert_eq!(
            parse_appointment_date("2024-06-10 14:30"),
            Some(day(2024, 6, 10).and_hms_opt(14, 30, 0).unwrap())
        );
        assert!(parse_appointment_date("2024-06-10T09:00:00+00:00").is_some());
        assert_eq!(parse_appointment_date("next tuesday"), None);
        assert_eq!(parse_appointment_date(""), None);
    }

    #[test]
    fn test_slash_dates_are_month_first() {
        assert_eq!(
            parse_appointment_date("05/06/2024"),
            Some(day(2024, 5, 6).and_time(NaiveTime::MIN))
        );
        assert_eq!(
            parse_appointment_date("25/06/2024"),
            Some(day(2024, 6, 25).and_time(NaiveTime::MIN))
        );
        assert_eq!(
            parse_appointment_date("25/06/2024 09:15"),
            Some(day(2024, 6, 25).and_hms_opt(9, 15, 0).unwrap())
        );
        assert_eq!(parse_appointment_date("13/13/2024"), None);
    }

    #[test]
    fn test_cutoff_boundary() {
        let table = Table::from_records(
            Schema::appointments(),
            vec![booking("Yesterday", "2024-06-09"), booking("Today", "2024-06-10")],
        );

        let split = AppointmentPartition::split(&table, day(2024, 6, 10));
        assert_eq!(split.upcoming.len(), 1);
        assert_eq!(split.upcoming[0].rows[0].get(Field::ApptName), "Today");
        assert_eq!(split.archive.len(), 1);
        assert_eq!(split.archive.get(0).unwrap().get(Field::ApptName), "Yesterday");
    }

    #[test]
    fn test_timed_entry_from_yesterday_is_upcoming() {
        let table = Table::from_records(
            Schema::appointments(),
            vec![booking("Late", "2024-06-09 16:00")],
        );
        let split = AppointmentPartition::split(&table, day(2024, 6, 10));
        assert_eq!(split.upcoming_count(), 1);
    }

    #[test]
    fn test_grouping_and_ordering() {
        let table = Table::from_records(
            Schema::appointments(),
            vec![
                booking("B", "2024-06-12"),
                booking("A", "2024-06-11"),
                booking("C", "2024-06-12"),
                booking("Old1", "2024-05-01"),
                booking("Old2", "2024-06-01"),
                booking("Bad", "someday"),
            ],
        );

        let split = AppointmentPartition::split(&table, day(2024, 6, 10));
        assert_eq!(split.malformed, 1);
        assert_eq!(split.upcoming.len(), 2);
        assert_eq!(split.upcoming[0].date, day(2024, 6, 11));
        let second: Vec<_> = split.upcoming[1].rows.iter().map(|r| r.get(Field::ApptName)).collect();
        assert_eq!(second, vec!["B", "C"]);

        let archived: Vec<_> = split.archive.rows().iter().map(|r| r.get(Field::ApptName)).collect();
        assert_eq!(archived, vec!["Old2", "Old1"]);
        assert_eq!(split.upcoming_table().len(), 3);
    }

    #[test]
    fn test_heading() {
        let d = AppointmentDay {
            date: day(2024, 6, 10),
            rows: vec![],
        };
        assert_eq!(d.heading(), "Monday, 10 June 2024");
    }
}
