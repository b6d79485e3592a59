use tracing::debug;

use super::header::{match_header, CourseContext, CourseFilter};
use super::student::{match_student_row, StudentRecord};
use crate::settings::Settings;

/// Page-by-page roster scanner.
///
/// Each page is read twice. The header pass walks every line and lets the
/// last matching header decide the current course (an excluded header clears
/// it). The row pass then attributes every student row on the page to that
/// course, even rows printed above a later header on the same page. The
/// current course carries over to the next page.
pub struct Scanner {
    filter: CourseFilter,
    email_domain: String,
    current: Option<CourseContext>,
    records: Vec<StudentRecord>,
}

impl Scanner {
    pub fn new(filter: CourseFilter, email_domain: impl Into<String>) -> Self {
        Scanner {
            filter,
            email_domain: email_domain.into(),
            current: None,
            records: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(CourseFilter::from_settings(settings), settings.email_domain.clone())
    }

    /// Scan one page; returns how many records it added.
    pub fn scan_page(&mut self, text: &str) -> usize {
        let lines: Vec<&str> = text.lines().collect();

        for line in &lines {
            if let Some(course) = match_header(line) {
                if self.filter.allows(&course) {
                    debug!(
                        crn = %course.crn,
                        class = %course.class_name(),
                        section = %course.section,
                        title = %course.title,
                        "course header"
                    );
                    self.current = Some(course);
                } else {
                    debug!(crn = %course.crn, class = %course.class_name(), "excluded course header");
                    self.current = None;
                }
            }
        }

        let before = self.records.len();
        let mut i = 0;
        while i < lines.len() {
            let next = lines.get(i + 1).copied();
            match match_student_row(lines[i], next, self.current.as_ref(), &self.email_domain) {
                Some(m) => {
                    self.records.push(m.record);
                    i += m.consumed;
                }
                None => i += 1,
            }
        }

        self.records.len() - before
    }

    pub fn finish(self) -> Vec<StudentRecord> {
        self.records
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_pages(pages: &[&str], settings: &Settings) -> Vec<StudentRecord> {
        let mut scanner = Scanner::from_settings(settings);
        for page in pages {
            scanner.scan_page(page);
        }
        scanner.finish()
    }

    fn geo_settings() -> Settings {
        Settings {
            allowed_courses: vec!["170".into(), "221".into()],
            ..Settings::default()
        }
    }

    #[test]
    fn two_page_document() {
        let pages = [
            "12345 GEO 170 1 Intro to Geography\n1 Doe, Jane G00012345\njdoe@pcc.edu extra\n",
            "22222 GEO 999 1 Excluded Topic\n1 Roe, Rick G00054321\nrroe@pcc.edu\n",
        ];
        let records = scan_pages(&pages, &geo_settings());
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!((r.first_name.as_str(), r.last_name.as_str()), ("Jane", "Doe"));
        assert_eq!(r.class_name, "GEO 170");
        assert_eq!(r.crn, "12345");
        assert_eq!(r.institutional_email, "jdoe@pcc.edu");
    }

    #[test]
    fn excluded_header_clears_previous_course() {
        let page = "12345 GEO 170 1 Intro\n22222 GEO 999 1 Excluded\n1 Roe, Rick G00054321\n";
        let mut scanner = Scanner::from_settings(&geo_settings());
        assert_eq!(scanner.scan_page(page), 0);
        assert_eq!(scanner.scan_page("2 Doe, Jane G00012345\n"), 0);
        assert!(scanner.finish().is_empty());
    }

    #[test]
    fn rows_before_first_header_are_dropped() {
        let pages = ["1 Early, Bird G00000001\n", "12345 GEO 170 1 Intro\n2 Doe, Jane G00012345\n"];
        let records = scan_pages(&pages, &geo_settings());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].g_number, "G00012345");
    }

    #[test]
    fn course_carries_across_pages() {
        let pages = [
            "12345 GEO 170 1 Intro\n1 Doe, Jane G00012345\n",
            "Page 2 of 2\n2 Roe, Rick G00054321\n",
        ];
        let records = scan_pages(&pages, &geo_settings());
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.crn == "12345"));
    }

    #[test]
    fn last_header_on_page_wins_for_all_rows() {
        let page = "12345 GEO 170 1 Intro\n1 Doe, Jane G00012345\n33333 GEO 221 1 Physical\n2 Roe, Rick G00054321\n";
        let records = scan_pages(&[page], &geo_settings());
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.class_name == "GEO 221" && r.crn == "33333"));
    }

    #[test]
    fn line_after_row_without_email_is_still_scanned() {
        let page = "12345 GEO 170 1 Intro\n1 Doe, Jane G00012345\n2 Roe, Rick G00054321\nrroe@pcc.edu\n";
        let records = scan_pages(&[page], &geo_settings());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].institutional_email, "");
        assert_eq!(records[1].institutional_email, "rroe@pcc.edu");
    }

    #[test]
    fn duplicates_are_kept() {
        let page = "12345 GEO 170 1 Intro\n1 Doe, Jane G00012345\n1 Doe, Jane G00012345\n";
        assert_eq!(scan_pages(&[page], &geo_settings()).len(), 2);
    }

    #[test]
    fn fixture_roster() {
        let text = std::fs::read_to_string("tests/fixtures/classlist.txt").unwrap();
        let pages: Vec<&str> = text.split('\x0C').collect();
        let records = scan_pages(&pages, &Settings::default());

        let ids: Vec<&str> = records.iter().map(|r| r.g_number.as_str()).collect();
        assert_eq!(
            ids,
            vec!["G00012345", "G00023456", "G00034567", "G00045678", "G00056789"]
        );
        assert!(records.iter().all(|r| r.g_number != "G00099999"));
        assert_eq!(records[1].institutional_email, "");
        assert_eq!(records[2].first_name, "");
        assert_eq!(records[4].class_name, "GEO 280A");
    }
}
