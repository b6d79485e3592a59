pub mod group;
pub mod header;
pub mod scan;
pub mod student;
pub mod term;

use crate::settings::Settings;
use group::Group;
use student::StudentRecord;
use term::TermLabel;

pub struct ParsedClasslist {
    pub term: TermLabel,
    pub records: Vec<StudentRecord>,
}

impl ParsedClasslist {
    pub fn groups(&self) -> Vec<Group> {
        group::group_records(&self.records)
    }
}

/// Two-stage pipeline: term from page one, then the roster scan over all
/// pages. `on_page` gets the 0-based page index and the records it added.
pub fn parse_pages<S, F>(pages: &[S], settings: &Settings, mut on_page: F) -> ParsedClasslist
where
    S: AsRef<str>,
    F: FnMut(usize, usize),
{
    let term = pages
        .first()
        .map(|p| term::detect_term(p.as_ref()))
        .unwrap_or(TermLabel::Unknown);

    let mut scanner = scan::Scanner::from_settings(settings);
    for (i, page) in pages.iter().enumerate() {
        let added = scanner.scan_page(page.as_ref());
        on_page(i, added);
    }

    ParsedClasslist {
        term,
        records: scanner.finish(),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_end_to_end() {
        let text = std::fs::read_to_string("tests/fixtures/classlist.txt").unwrap();
        let pages: Vec<&str> = text.split('\x0C').collect();
        let mut per_page = Vec::new();
        let parsed = parse_pages(&pages, &Settings::default(), |_, added| per_page.push(added));

        assert_eq!(per_page, vec![3, 0, 1, 1]);
        assert_eq!(parsed.term.to_string(), "Fall 2025");
        let groups = parsed.groups();
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["GEO 170_12345", "GEO 221_33333", "GEO 280A_44444"]);
        assert_eq!(groups[0].records.len(), 3);
    }

    #[test]
    fn empty_document() {
        let pages: Vec<String> = Vec::new();
        let parsed = parse_pages(&pages, &Settings::default(), |_, _| {});
        assert_eq!(parsed.term, TermLabel::Unknown);
        assert!(parsed.records.is_empty());
    }
}
