use serde::{Deserialize, Serialize};

/// The two resume sections whose bullets get rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    WorkExperience,
    Projects,
}

impl SectionKind {
    pub const ALL: [SectionKind; 2] = [SectionKind::WorkExperience, SectionKind::Projects];

    /// Header text as it appears on a resume.
    pub fn heading(self) -> &'static str {
        match self {
            SectionKind::WorkExperience => "Work Experience",
            SectionKind::Projects => "Projects",
        }
    }
}

/// A resume as an ordered sequence of visible text lines.
/// Never mutated in place: substitutions produce a new document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumeDocument {
    lines: Vec<String>,
}

impl ResumeDocument {
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Splits extracted text into lines. `\r\n`, `\r` and form feeds count as breaks;
    /// a single trailing newline does not produce an extra empty line.
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        let normalized = text
            .replace("\r\n", "\n")
            .replace(['\r', '\x0c'], "\n");
        let body = normalized.strip_suffix('\n').unwrap_or(&normalized);
        Self {
            lines: body.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Reconstructed document text, one line per `\n`.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    /// Returns a copy with the given positions overwritten. Positions outside the document are ignored.
    pub fn with_replacements<I>(&self, replacements: I) -> Self
    where
        I: IntoIterator<Item = (usize, String)>,
    {
        let mut lines = self.lines.clone();
        for (index, text) in replacements {
            if let Some(slot) = lines.get_mut(index) {
                *slot = text;
            }
        }
        Self { lines }
    }
}

/// Half-open range of body lines belonging to a target section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionBoundary {
    pub section: SectionKind,
    pub header_index: usize,
    /// First body line (the line after the header).
    pub start: usize,
    /// One past the last body line.
    pub end: usize,
}

/// A line identified as a bullet entry inside a target section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bullet {
    pub index: usize,
    pub section: SectionKind,
    /// The original line, byte-for-byte.
    pub text: String,
    /// Leading indentation plus the bullet glyph and its trailing space.
    /// Only the indentation for unmarked bullets.
    pub marker: String,
    /// The bullet's words without marker or surrounding whitespace.
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_normalizes_line_endings() {
        let doc = ResumeDocument::from_text("Jane Doe\r\nWork Experience\r- Built\x0cEducation\n");
        assert_eq!(
            doc.lines(),
            &["Jane Doe", "Work Experience", "- Built", "Education"]
        );
    }

    #[test]
    fn test_from_text_keeps_interior_blank_lines() {
        let doc = ResumeDocument::from_text("a\n\nb\n\n");
        assert_eq!(doc.lines(), &["a", "", "b", ""]);
        assert_eq!(doc.to_text(), "a\n\nb\n");
    }

    #[test]
    fn test_from_text_empty_is_empty_document() {
        assert!(ResumeDocument::from_text("").is_empty());
    }

    #[test]
    fn test_with_replacements_leaves_original_untouched() {
        let doc = ResumeDocument::from_lines(vec!["a".into(), "b".into(), "c".into()]);
        let replaced = doc.with_replacements([(1, "B".to_string()), (7, "ignored".to_string())]);

        assert_eq!(replaced.lines(), &["a", "B", "c"]);
        assert_eq!(doc.lines(), &["a", "b", "c"]);
        assert_eq!(replaced.len(), doc.len());
    }

    #[test]
    fn test_document_serializes_as_plain_array() {
        let doc = ResumeDocument::from_lines(vec!["x".into()]);
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"["x"]"#);
    }
}
