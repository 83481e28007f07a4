use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use super::cells::Cell;
use super::dates::{self, EventDate};
use super::fields::{self, SessionType};
use super::slots;
use crate::error::{CellError, StructuralFault};

/// One timetable entry, in the field order consumers read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub title: String,
    pub teacher: String,
    #[serde(rename = "type")]
    pub kind: SessionType,
    pub subgroup: String,
    pub location: String,
    pub dates: Vec<EventDate>,
}

/// Segment a cell's text and place its dates on the calendar.
pub fn parse_cell(cell: &Cell, reference: NaiveDate) -> Result<Event, CellError> {
    let data = cell.data.as_str();

    let found = fields::find_type(data).ok_or(StructuralFault::TypeNotFound)?;
    let (title, teacher) = fields::split_title(&data[..found.start])?;

    let slot = slots::resolve(cell.x, found.kind.span())?;
    let (dates, offset) = dates::parse_dates(data, &slot, reference)?;

    let after = data
        .get(found.end..offset)
        .ok_or(StructuralFault::TypeNotFound)?;
    let (subgroup, location) = fields::split_location(after)?;
    if !subgroup.is_empty() && found.kind != SessionType::Lab {
        warn!(kind = ?found.kind, %subgroup, "subgroup on a non-lab session");
    }

    debug!(%title, kind = ?found.kind, dates = dates.len(), "parsed cell");
    Ok(Event {
        title,
        teacher,
        kind: found.kind,
        subgroup,
        location,
        dates,
    })
}
