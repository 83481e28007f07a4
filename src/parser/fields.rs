use serde::Serialize;

use crate::error::StructuralFault;

const SENTENCE: &str = ". ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Lecture,
    Seminar,
    Lab,
}

impl SessionType {
    /// Extra periods the session occupies after its own.
    pub fn span(self) -> usize {
        match self {
            SessionType::Lab => 1,
            SessionType::Lecture | SessionType::Seminar => 0,
        }
    }
}

/// Keyword (with its closing period) that marks each session type.
const KEYWORDS: [(&str, SessionType); 3] = [
    ("лекции.", SessionType::Lecture),
    ("семинар.", SessionType::Seminar),
    ("лабораторные занятия.", SessionType::Lab),
];

/// Where the session-type keyword sits in a cell's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMatch {
    pub kind: SessionType,
    pub start: usize,
    /// Just past the keyword's period.
    pub end: usize,
}

/// Earliest session-type keyword in `data`.
pub fn find_type(data: &str) -> Option<TypeMatch> {
    KEYWORDS
        .iter()
        .filter_map(|(keyword, kind)| {
            data.find(keyword).map(|start| TypeMatch {
                kind: *kind,
                start,
                end: start + keyword.len(),
            })
        })
        .min_by_key(|m| m.start)
}

/// `Title. Teacher T.T.` -> (title, teacher). A lone title loses its period.
pub fn split_title(before: &str) -> Result<(String, String), StructuralFault> {
    let before = before.trim();
    let parts: Vec<&str> = before.split(SENTENCE).collect();
    match parts.as_slice() {
        &[title] => Ok((title.strip_suffix('.').unwrap_or(title).to_string(), String::new())),
        &[title, teacher] => Ok((title.to_string(), teacher.to_string())),
        _ => Err(StructuralFault::SegmentCount {
            part: "before",
            count: parts.len(),
        }),
    }
}

/// ` (Subgroup). Location. ` -> (subgroup, location).
pub fn split_location(after: &str) -> Result<(String, String), StructuralFault> {
    let after = after.strip_prefix(' ').unwrap_or(after);
    let after = after.strip_suffix(SENTENCE).unwrap_or(after);
    let parts: Vec<&str> = after.split(SENTENCE).collect();
    match parts.as_slice() {
        &[location] => Ok((String::new(), location.to_string())),
        &[subgroup, location] => Ok((
            subgroup.trim_matches(['(', ')']).to_string(),
            location.to_string(),
        )),
        _ => Err(StructuralFault::SegmentCount {
            part: "after",
            count: parts.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_each_keyword() {
        for (keyword, kind) in KEYWORDS {
            let data = format!("Title. Teacher. {keyword} Location. [01.09]");
            let m = find_type(&data).unwrap();
            assert_eq!(m.kind, kind);
            assert_eq!(&data[m.start..m.end], keyword);
        }
    }

    #[test]
    fn keyword_needs_period() {
        assert!(find_type("Title. лекции Location. [01.09]").is_none());
        assert!(find_type("Title. Teacher T.T. Unknown. Location. [05.09-05.12 к.н.]").is_none());
    }

    #[test]
    fn earliest_keyword_wins() {
        let m = find_type("Семинар. семинар. Location про лекции. [01.09]").unwrap();
        assert_eq!(m.kind, SessionType::Seminar);
    }

    #[test]
    fn title_and_teacher() {
        assert_eq!(
            split_title("Title. Teacher T.T. ").unwrap(),
            ("Title".to_string(), "Teacher T.T.".to_string())
        );
    }

    #[test]
    fn title_alone() {
        assert_eq!(
            split_title("Title. ").unwrap(),
            ("Title".to_string(), String::new())
        );
    }

    #[test]
    fn too_many_title_segments() {
        assert_eq!(
            split_title("Title. Teacher A. B. "),
            Err(StructuralFault::SegmentCount {
                part: "before",
                count: 3
            })
        );
    }

    #[test]
    fn location_alone() {
        assert_eq!(
            split_location(" Location. ").unwrap(),
            (String::new(), "Location".to_string())
        );
    }

    #[test]
    fn subgroup_and_location() {
        assert_eq!(
            split_location(" (Subgroup). Location. ").unwrap(),
            ("Subgroup".to_string(), "Location".to_string())
        );
    }

    #[test]
    fn only_one_leading_space_is_dropped() {
        assert_eq!(
            split_location("  Location. ").unwrap(),
            (String::new(), " Location".to_string())
        );
        assert_eq!(
            split_location("Location. ").unwrap(),
            (String::new(), "Location".to_string())
        );
    }

    #[test]
    fn too_many_location_segments() {
        assert!(matches!(
            split_location(" (A). B. C. "),
            Err(StructuralFault::SegmentCount { part: "after", count: 3 })
        ));
    }

    #[test]
    fn lab_spans_two_periods() {
        assert_eq!(SessionType::Lab.span(), 1);
        assert_eq!(SessionType::Lecture.span(), 0);
        assert_eq!(SessionType::Seminar.span(), 0);
    }
}
