//! Section & Bullet Locator: pure functions from a line sequence to bullet positions.
//!
//! A target section starts at a header line equal (case-insensitively, ignoring a
//! trailing colon) to "Work Experience" or "Projects" and runs until the next
//! recognised section header, an all-caps heading (see `closes_open_section`) or
//! end of document. Inside a section:
//! - lines starting with a bullet glyph are bullets;
//! - if the section has no such lines, every non-empty line that is not a
//!   sub-header (all-caps, contains a date range, ends with ':') is a bullet.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::resume::{Bullet, SectionBoundary, SectionKind};

/// Glyphs that open a bullet line. ASCII-like dashes and `*` also need trailing whitespace.
/// U+F0B7 is the Symbol-font bullet Word-exported PDFs extract to.
const BULLET_GLYPHS: &[char] = &[
    '-', '*', '•', '●', '◦', '○', '▪', '■', '‣', '–', '▶', '►', '➢', '\u{f0b7}',
];
const SPACED_GLYPHS: &[char] = &['-', '*', '–'];

/// Non-target headers that close a target section. Compared after normalisation.
const OTHER_HEADERS: &[&str] = &[
    "experience",
    "professional experience",
    "employment",
    "employment history",
    "personal projects",
    "education",
    "skills",
    "technical skills",
    "summary",
    "professional summary",
    "objective",
    "certifications",
    "awards",
    "honors",
    "achievements",
    "publications",
    "languages",
    "interests",
    "volunteer experience",
    "volunteering",
    "hobbies",
    "hobbies and interests",
    "certificates",
    "licenses and certifications",
    "open source",
    "open source contributions",
    "research",
    "research experience",
    "teaching experience",
    "extracurricular activities",
    "additional information",
    "leadership",
    "activities",
    "coursework",
    "relevant coursework",
    "references",
    "contact",
];

static DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    let point = r"(?:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+|(?:spring|summer|fall|autumn|winter)\s+|\d{1,2}/)?(?:19|20)\d{2}";
    Regex::new(&format!(
        r"(?i)\b{point}\s*(?:-|–|—|\bto\b)\s*(?:{point}|present|current|now)\b"
    ))
    .expect("date range pattern is valid")
});

enum Header {
    Target(SectionKind),
    Other,
}

fn normalize_header(line: &str) -> String {
    line.trim()
        .trim_end_matches(':')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn classify_header(line: &str) -> Option<Header> {
    let normalized = normalize_header(line);
    if normalized.is_empty() {
        return None;
    }
    if normalized.starts_with("projects &") || normalized.starts_with("projects and ") {
        return Some(Header::Other);
    }
    if let Some(kind) = SectionKind::ALL
        .into_iter()
        .find(|kind| kind.heading().to_lowercase() == normalized)
    {
        return Some(Header::Target(kind));
    }
    OTHER_HEADERS
        .contains(&normalized.as_str())
        .then_some(Header::Other)
}

/// Finds the body range of each target section, in document order.
/// A repeated header of an already-seen section closes the open section but opens nothing.
pub fn locate_sections(lines: &[String]) -> Vec<SectionBoundary> {
    let mut found: Vec<SectionBoundary> = Vec::new();
    let mut open: Option<(SectionKind, usize)> = None;

    for (index, line) in lines.iter().enumerate() {
        let header = match classify_header(line) {
            Some(header) => header,
            None if open.is_some_and(|(_, header_index)| {
                closes_open_section(lines, header_index + 1, index)
            }) =>
            {
                Header::Other
            }
            None => continue,
        };

        if let Some((section, header_index)) = open.take() {
            found.push(SectionBoundary {
                section,
                header_index,
                start: header_index + 1,
                end: index,
            });
        }

        if let Header::Target(kind) = header {
            if !found.iter().any(|b| b.section == kind) {
                open = Some((kind, index));
            }
        }
    }

    if let Some((section, header_index)) = open {
        found.push(SectionBoundary {
            section,
            header_index,
            start: header_index + 1,
            end: lines.len(),
        });
    }

    found
}

/// An unlisted all-caps heading ("HOBBIES") ends the open section when the section
/// already has content and either uses bullet markers or the heading is followed by
/// a marked line, a blank line or the end of the document. A company name heading the
/// first entry of an unmarked section stays inside it.
fn closes_open_section(lines: &[String], body_start: usize, index: usize) -> bool {
    if !is_caps_heading(&lines[index]) {
        return false;
    }
    let before = &lines[body_start..index];
    if before.iter().all(|l| l.trim().is_empty()) {
        return false;
    }
    let marked_so_far = before.iter().any(|l| split_marker(l).is_some());
    let opens_block = lines
        .get(index + 1)
        .map_or(true, |next| next.trim().is_empty() || split_marker(next).is_some());
    marked_so_far || opens_block
}

fn is_caps_heading(line: &str) -> bool {
    let trimmed = line.trim().trim_end_matches(':');
    trimmed.chars().filter(|c| c.is_alphabetic()).count() >= 2
        && trimmed
            .chars()
            .all(|c| c.is_uppercase() || c == ' ' || c == '&')
}

/// Classifies the bullets inside one section's body range.
pub fn section_bullets(lines: &[String], boundary: &SectionBoundary) -> Vec<Bullet> {
    let body = lines
        .get(boundary.start..boundary.end)
        .unwrap_or_default();

    let marked: Vec<Bullet> = body
        .iter()
        .enumerate()
        .filter_map(|(offset, line)| {
            split_marker(line).map(|(marker, content)| Bullet {
                index: boundary.start + offset,
                section: boundary.section,
                text: line.clone(),
                marker: marker.to_string(),
                content: content.to_string(),
            })
        })
        .collect();

    if !marked.is_empty() {
        return marked;
    }

    body.iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !is_sub_header(line))
        .map(|(offset, line)| {
            let indent_len = line.len() - line.trim_start().len();
            Bullet {
                index: boundary.start + offset,
                section: boundary.section,
                text: line.clone(),
                marker: line[..indent_len].to_string(),
                content: line.trim().to_string(),
            }
        })
        .collect()
}

/// All bullets of both target sections, in document order.
pub fn locate_bullets(lines: &[String]) -> Vec<Bullet> {
    let mut bullets: Vec<Bullet> = locate_sections(lines)
        .iter()
        .flat_map(|boundary| section_bullets(lines, boundary))
        .collect();
    bullets.sort_by_key(|b| b.index);
    bullets
}

/// Splits a marked bullet line into (indent + glyph + spacing, content).
/// `1.` / `2)` numbering counts as a marker when followed by whitespace.
pub(crate) fn split_marker(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim_start();
    let (after, needs_space) = match strip_number(trimmed) {
        Some(after) => (after, true),
        None => {
            let glyph = trimmed.chars().next()?;
            if !BULLET_GLYPHS.contains(&glyph) {
                return None;
            }
            (&trimmed[glyph.len_utf8()..], SPACED_GLYPHS.contains(&glyph))
        }
    };

    let content = after.trim_start();
    if content.trim().is_empty() {
        return None;
    }
    if needs_space && content.len() == after.len() {
        return None;
    }

    let prefix_len = line.len() - content.len();
    Some((&line[..prefix_len], content.trim_end()))
}

fn strip_number(s: &str) -> Option<&str> {
    let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if !(1..=2).contains(&digits) {
        return None;
    }
    s[digits..].strip_prefix(['.', ')'])
}

fn is_sub_header(line: &str) -> bool {
    let trimmed = line.trim();
    let has_letters = trimmed.chars().any(char::is_alphabetic);
    let all_caps = has_letters && !trimmed.chars().any(char::is_lowercase);
    all_caps || trimmed.ends_with(':') || DATE_RANGE.is_match(trimmed)
}
