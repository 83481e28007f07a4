use std::sync::LazyLock;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone};
use regex::Regex;
use serde::Serialize;

use super::slots::TimeSlot;
use crate::error::StructuralFault;

/// The timetable is published for a single zone, UTC+3.
pub static TIMEZONE: LazyLock<FixedOffset> =
    LazyLock::new(|| FixedOffset::east_opt(3 * 60 * 60).unwrap());

static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2})\.(\d{2})(?:-(\d{2})\.(\d{2}) (к\.н\.|ч\.н\.))?$").unwrap()
});

const ENTRY_SEPARATOR: &str = ", ";
const EVERY_WEEK: &str = "к.н.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recurrence {
    #[serde(rename = "once")]
    Once,
    #[serde(rename = "every")]
    Weekly,
    #[serde(rename = "throughout")]
    Biweekly,
}

/// Day of the year as printed in the timetable, without a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayMonth {
    pub day: u32,
    pub month: u32,
}

impl DayMonth {
    /// Year this day falls in: the reference year while the day is still
    /// ahead of (or on) the reference date, the next year once it has passed.
    pub fn year_after(&self, reference: NaiveDate) -> i32 {
        let ahead = self.month > reference.month()
            || (self.month == reference.month() && self.day >= reference.day());
        if ahead {
            reference.year()
        } else {
            reference.year() + 1
        }
    }

    fn resolve(&self, reference: NaiveDate, entry: &str) -> Result<NaiveDate, StructuralFault> {
        NaiveDate::from_ymd_opt(self.year_after(reference), self.month, self.day)
            .ok_or_else(|| StructuralFault::InvalidDate(entry.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DayMonth,
    pub end: DayMonth,
    pub recurrence: Recurrence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDate {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    #[serde(rename = "frequency")]
    pub recurrence: Recurrence,
}

/// Byte offset of the `[...]` suffix that closes every cell.
pub fn find_dates(data: &str) -> Option<usize> {
    if !data.ends_with(']') {
        return None;
    }
    let start = data.find('[')?;
    // At least one character between the brackets.
    (start + 2 < data.len()).then_some(start)
}

/// Parse the inside of the brackets: `05.12, 19.12` or `02.09-28.10 к.н., 11.11`.
pub fn parse_ranges(spec: &str) -> Result<Vec<DateRange>, StructuralFault> {
    spec.split(ENTRY_SEPARATOR).map(parse_entry).collect()
}

fn parse_entry(entry: &str) -> Result<DateRange, StructuralFault> {
    let malformed = || StructuralFault::MalformedDate(entry.to_string());
    let caps = ENTRY_RE.captures(entry).ok_or_else(malformed)?;
    let number = |i: usize| -> Result<u32, StructuralFault> {
        caps[i].parse::<u32>().map_err(|_| malformed())
    };

    let start = DayMonth {
        day: number(1)?,
        month: number(2)?,
    };
    let Some(tag) = caps.get(5) else {
        return Ok(DateRange {
            start,
            end: start,
            recurrence: Recurrence::Once,
        });
    };

    let recurrence = if tag.as_str() == EVERY_WEEK {
        Recurrence::Weekly
    } else {
        Recurrence::Biweekly
    };
    Ok(DateRange {
        start,
        end: DayMonth {
            day: number(3)?,
            month: number(4)?,
        },
        recurrence,
    })
}

/// Place a range on the calendar: year from `reference`, times from `slot`.
pub fn resolve_range(
    range: &DateRange,
    slot: &TimeSlot,
    reference: NaiveDate,
    entry: &str,
) -> Result<EventDate, StructuralFault> {
    let invalid = || StructuralFault::InvalidDate(entry.to_string());
    let start = slot.start.on(range.start.resolve(reference, entry)?);
    let end = slot.end.on(range.end.resolve(reference, entry)?);
    Ok(EventDate {
        start: TIMEZONE.from_local_datetime(&start).single().ok_or_else(invalid)?,
        end: TIMEZONE.from_local_datetime(&end).single().ok_or_else(invalid)?,
        recurrence: range.recurrence,
    })
}

/// Every date of a cell plus the offset where its bracket begins.
pub fn parse_dates(
    data: &str,
    slot: &TimeSlot,
    reference: NaiveDate,
) -> Result<(Vec<EventDate>, usize), StructuralFault> {
    let offset = find_dates(data).ok_or(StructuralFault::DatesNotFound)?;
    let spec = &data[offset + 1..data.len() - 1];

    let ranges = parse_ranges(spec)?;
    let dates = ranges
        .iter()
        .zip(spec.split(ENTRY_SEPARATOR))
        .map(|(range, entry)| resolve_range(range, slot, reference, entry))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((dates, offset))
}
