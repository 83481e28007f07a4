use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::SlotOutOfRange;

pub const SLOT_COUNT: usize = 8;

/// Wall-clock time of day, hours and minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    pub hour: u32,
    pub minute: u32,
}

impl Clock {
    const fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// This time of day on `date`.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(chrono::NaiveTime::MIN)
            + Duration::minutes(i64::from(self.hour * 60 + self.minute))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: Clock,
    pub end: Clock,
}

const fn slot(start: (u32, u32), end: (u32, u32)) -> TimeSlot {
    TimeSlot {
        start: Clock::new(start.0, start.1),
        end: Clock::new(end.0, end.1),
    }
}

pub static SLOTS: [TimeSlot; SLOT_COUNT] = [
    slot((8, 30), (10, 10)),
    slot((10, 20), (12, 0)),
    slot((12, 20), (14, 0)),
    slot((14, 10), (15, 50)),
    slot((16, 0), (17, 40)),
    slot((18, 0), (19, 30)),
    slot((19, 40), (21, 10)),
    slot((21, 20), (22, 50)),
];

/// Left edge of each timetable column, in slot order. Anything else is the
/// last column.
const COLUMNS: [(i64, usize); 7] = [
    (46, 0),
    (139, 1),
    (233, 2),
    (327, 3),
    (420, 4),
    (514, 5),
    (607, 6),
];

pub fn slot_index(x: f64) -> usize {
    let column = x.trunc() as i64;
    COLUMNS
        .iter()
        .find(|(left, _)| *left == column)
        .map(|(_, index)| *index)
        .unwrap_or(SLOT_COUNT - 1)
}

/// Slot for a cell anchored at `x`, stretched over `span` extra periods.
pub fn resolve(x: f64, span: usize) -> Result<TimeSlot, SlotOutOfRange> {
    let index = slot_index(x);
    let last = SLOTS
        .get(index + span)
        .ok_or(SlotOutOfRange { index, span })?;
    Ok(TimeSlot {
        start: SLOTS[index].start,
        end: last.end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_column_maps_to_its_slot() {
        for (x, index) in COLUMNS {
            assert_eq!(resolve(x as f64, 0), Ok(SLOTS[index]));
        }
    }

    #[test]
    fn unknown_column_falls_back_to_last() {
        for x in [0.0, 47.0, 700.0, 701.5] {
            assert_eq!(slot_index(x), 7);
        }
        assert_eq!(resolve(700.0, 0), Ok(SLOTS[7]));
    }

    #[test]
    fn fractional_x_truncates() {
        assert_eq!(slot_index(46.9), 0);
        assert_eq!(slot_index(233.2), 2);
    }

    #[test]
    fn two_periods() {
        let slot = resolve(233.0, 1).unwrap();
        assert_eq!(slot.start, Clock::new(12, 20));
        assert_eq!(slot.end, Clock::new(15, 50));
    }

    #[test]
    fn extension_past_last_slot() {
        assert_eq!(resolve(700.0, 1), Err(SlotOutOfRange { index: 7, span: 1 }));
        assert!(resolve(607.0, 1).is_ok());
        assert_eq!(resolve(607.0, 2), Err(SlotOutOfRange { index: 6, span: 2 }));
    }

    #[test]
    fn clock_on_date() {
        let date = NaiveDate::from_ymd_opt(2000, 9, 5).unwrap();
        assert_eq!(
            Clock::new(8, 30).on(date),
            date.and_hms_opt(8, 30, 0).unwrap()
        );
    }

    #[test]
    fn slots_are_ordered() {
        for pair in SLOTS.windows(2) {
            assert!(pair[0].end.hour * 60 + pair[0].end.minute
                < pair[1].start.hour * 60 + pair[1].start.minute);
        }
    }
}
