use serde::{Deserialize, Serialize};

/// Fragments at or below this baseline belong to the page footer.
const BODY_MAX_Y: f64 = 521.0;
/// Fragments at or left of this offset belong to the weekday column.
const BODY_MIN_X: f64 = 42.0;

const CELL_CLOSE: &str = "]";

/// One run of text at a position on the page, as produced by the reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl Fragment {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }
}

/// Text of one timetable event, anchored at its first fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub data: String,
    pub x: f64,
    pub y: f64,
}

pub fn is_body(fragment: &Fragment) -> bool {
    fragment.y < BODY_MAX_Y && fragment.x > BODY_MIN_X
}

/// Drop header, footer and weekday-column fragments.
pub fn body_fragments(fragments: &[Fragment]) -> Vec<&Fragment> {
    fragments.iter().filter(|f| is_body(f)).collect()
}

/// Concatenate fragments into cells, closing a cell on a lone `]`.
///
/// A change of baseline between neighbours is a soft wrap and becomes one
/// space. Text after the last `]` never forms a cell.
pub fn group_cells<'a, I>(fragments: I) -> Vec<Cell>
where
    I: IntoIterator<Item = &'a Fragment>,
{
    let mut cells = Vec::new();
    let mut current = Cell {
        data: String::new(),
        x: 0.0,
        y: 0.0,
    };
    let mut prev_y: Option<f64> = None;

    for fragment in fragments {
        if current.data.is_empty() {
            current.x = fragment.x;
            current.y = fragment.y;
        } else if prev_y.is_some_and(|y| y != fragment.y) {
            current.data.push(' ');
        }
        current.data.push_str(&fragment.text);
        prev_y = Some(fragment.y);

        if fragment.text == CELL_CLOSE {
            let next = Cell {
                data: String::new(),
                x: 0.0,
                y: 0.0,
            };
            cells.push(std::mem::replace(&mut current, next));
        }
    }

    cells
}
