pub mod cells;
pub mod dates;
pub mod event;
pub mod fields;
pub mod slots;

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::info;

use crate::error::ParseError;
use cells::{Cell, Fragment};
use event::Event;

/// Body fragments grouped into cells, in page order.
pub fn collect_cells(fragments: &[Fragment]) -> Vec<Cell> {
    let body = cells::body_fragments(fragments);
    let cells = cells::group_cells(body);
    info!(
        fragments = fragments.len(),
        cells = cells.len(),
        "grouped fragments into cells"
    );
    cells
}

/// Parse every cell, in order. The lowest failing index aborts the batch.
pub fn parse_cells(cells: &[Cell], reference: NaiveDate) -> Result<Vec<Event>, ParseError> {
    let results: Vec<_> = cells
        .par_iter()
        .map(|cell| event::parse_cell(cell, reference))
        .collect();

    results
        .into_iter()
        .enumerate()
        .map(|(index, result)| result.map_err(|kind| ParseError { index, kind }))
        .collect()
}

/// Three-stage pipeline: fragments -> cells -> events.
pub fn parse_fragments(
    fragments: &[Fragment],
    reference: NaiveDate,
) -> Result<Vec<Event>, ParseError> {
    let cells = collect_cells(fragments);
    let events = parse_cells(&cells, reference)?;
    info!(events = events.len(), %reference, "parsed events");
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CellError, StructuralFault};

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 8, 20).unwrap()
    }

    fn cell(data: &str, x: f64) -> Cell {
        Cell {
            data: data.to_string(),
            x,
            y: 0.0,
        }
    }

    #[test]
    fn order_follows_cells() {
        let cells: Vec<Cell> = (1..=20)
            .map(|d| cell(&format!("Course {d}. лекции. Room. [{d:02}.09]"), 46.0))
            .collect();
        let events = parse_cells(&cells, reference()).unwrap();
        let titles: Vec<String> = events.into_iter().map(|e| e.title).collect();
        let expected: Vec<String> = (1..=20).map(|d| format!("Course {d}")).collect();
        assert_eq!(titles, expected);
    }

    #[test]
    fn first_failure_wins() {
        let cells = vec![
            cell("A. лекции. Room. [01.09]", 46.0),
            cell("B. Unknown. Room. [01.09]", 46.0),
            cell("C. лабораторные занятия. (1). Room. [01.09]", 700.0),
        ];
        let err = parse_cells(&cells, reference()).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.kind, CellError::Structural(StructuralFault::TypeNotFound));
        assert_eq!(err.to_string(), "parse events[1]: schedule event type is not found");
    }

    #[test]
    fn empty_page() {
        assert!(parse_fragments(&[], reference()).unwrap().is_empty());
    }
}
