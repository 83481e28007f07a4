use thiserror::Error;

use crate::parser::slots::SLOT_COUNT;

/// A cell whose text does not have the keyword-then-date-bracket shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralFault {
    #[error("schedule event type is not found")]
    TypeNotFound,
    #[error("date specification is not found")]
    DatesNotFound,
    #[error("malformed date entry {0:?}")]
    MalformedDate(String),
    #[error("date {0:?} does not exist in the resolved year")]
    InvalidDate(String),
    #[error("unexpected {count} segments {part} the event type")]
    SegmentCount { part: &'static str, count: usize },
}

/// A multi-period slot lookup that runs past the last slot of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("time slot {index} extended by {span} is out of range ({} slots)", SLOT_COUNT)]
pub struct SlotOutOfRange {
    pub index: usize,
    pub span: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellError {
    #[error(transparent)]
    Structural(#[from] StructuralFault),
    #[error(transparent)]
    LookupOutOfRange(#[from] SlotOutOfRange),
}

/// Batch failure: the first cell that could not be turned into an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse events[{index}]: {kind}")]
pub struct ParseError {
    pub index: usize,
    pub kind: CellError,
}
