//! Fixed-layout university timetable (one PDF page) to a JSON list of events.

pub mod error;
pub mod output;
pub mod parser;
pub mod reader;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

pub use error::{CellError, ParseError, SlotOutOfRange, StructuralFault};
pub use parser::cells::{Cell, Fragment};
pub use parser::dates::{EventDate, Recurrence};
pub use parser::event::Event;
pub use parser::fields::SessionType;
pub use parser::parse_fragments;

/// Read `input`, parse its events and write them to `output` as JSON.
/// Returns the number of events written.
pub fn parse_file(
    input: &Path,
    output: &Path,
    reference: NaiveDate,
    pretty: bool,
) -> Result<usize> {
    let fragments = reader::read_file(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let events = parse_fragments(&fragments, reference).context("parsing error")?;
    output::write_events(output, &events, pretty).context("writing events")?;
    Ok(events.len())
}

/// In-memory variant of [`parse_file`]: PDF bytes in, JSON bytes out.
pub fn parse_bytes(bytes: &[u8], reference: NaiveDate) -> Result<Vec<u8>> {
    let fragments = reader::read_bytes(bytes).context("reading pdf bytes")?;
    let events = parse_fragments(&fragments, reference).context("parsing error")?;
    output::to_json(&events, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::sample_pdf;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 8, 20).unwrap()
    }

    #[test]
    fn bytes_to_json() {
        let pdf = sample_pdf(false, &[(46, 300, "Курс. лекции. А-1. [01.09]")]);
        let json = String::from_utf8(parse_bytes(&pdf, reference()).unwrap()).unwrap();
        assert_eq!(
            json,
            r#"[{"title":"Курс","teacher":"","type":"lecture","subgroup":"","location":"А-1","dates":[{"start":"2000-09-01T08:30:00+03:00","end":"2000-09-01T10:10:00+03:00","frequency":"once"}]}]"#
        );
    }

    #[test]
    fn junk_fails_while_reading() {
        let err = parse_bytes(b"junk", reference()).unwrap_err();
        assert!(format!("{err:#}").starts_with("reading"), "{err:#}");
    }

    #[test]
    fn unparseable_cell_fails_while_parsing() {
        let pdf = sample_pdf(false, &[(46, 300, "Курс. А-1. [01.09]")]);
        let err = parse_bytes(&pdf, reference()).unwrap_err();
        assert!(format!("{err:#}").starts_with("parsing error"), "{err:#}");
    }

    #[test]
    fn file_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("page.pdf");
        let output = dir.path().join("events.json");
        std::fs::write(&input, sample_pdf(false, &[(139, 300, "Курс. семинар. А-1. [01.09]")]))
            .unwrap();

        let count = parse_file(&input, &output, reference(), false).unwrap();
        assert_eq!(count, 1);
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written[0]["type"], "seminar");
        assert_eq!(written[0]["dates"][0]["start"], "2000-09-01T10:20:00+03:00");
    }

    #[test]
    fn missing_input_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("absent.pdf");
        let err = parse_file(&input, &dir.path().join("out.json"), reference(), false)
            .unwrap_err();
        assert!(format!("{err:#}").contains("absent.pdf"), "{err:#}");
    }

    #[test]
    fn unwritable_output_fails_while_writing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("page.pdf");
        std::fs::write(&input, sample_pdf(false, &[(46, 300, "Курс. лекции. А-1. [01.09]")]))
            .unwrap();
        let output = dir.path().join("missing").join("events.json");
        let err = parse_file(&input, &output, reference(), false).unwrap_err();
        assert!(format!("{err:#}").starts_with("writing events"), "{err:#}");
    }
}
