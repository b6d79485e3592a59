use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::header::CourseContext;

static G_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"G\d{8}").unwrap());

/// Export column order.
pub const COLUMNS: [&str; 7] = [
    "First Name",
    "Last Name",
    "G Number",
    "PCC email address",
    "Non-PCC email",
    "Class",
    "CRN",
];

/// One enrolled student in one course section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentRecord {
    #[serde(rename = "First Name")]
    pub first_name: String,
    #[serde(rename = "Last Name")]
    pub last_name: String,
    #[serde(rename = "G Number")]
    pub g_number: String,
    #[serde(rename = "PCC email address")]
    pub institutional_email: String,
    /// Reserved; the class list never carries it.
    #[serde(rename = "Non-PCC email")]
    pub personal_email: String,
    #[serde(rename = "Class")]
    pub class_name: String,
    #[serde(rename = "CRN")]
    pub crn: String,
}

impl StudentRecord {
    /// Cell values in [`COLUMNS`] order.
    pub fn cells(&self) -> [&str; 7] {
        [
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.g_number.as_str(),
            self.institutional_email.as_str(),
            self.personal_email.as_str(),
            self.class_name.as_str(),
            self.crn.as_str(),
        ]
    }
}

/// Name portion of a roster row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentName {
    Parsed { last: String, first: String },
    /// The row did not split into "<marker> Last, First".
    Unparsed,
}

impl StudentName {
    /// Parse the text preceding the G number, e.g. `"1 Doe, Jane "`.
    pub fn parse(before_id: &str) -> Self {
        let Some((_marker, rest)) = before_id.trim_start().split_once(char::is_whitespace) else {
            return StudentName::Unparsed;
        };
        // Suffixes after a second comma ("Doe, Jane, Jr") are dropped.
        let mut parts = rest.split(',');
        match (parts.next(), parts.next()) {
            (Some(last), Some(first)) => StudentName::Parsed {
                last: last.trim().to_string(),
                first: first.trim().to_string(),
            },
            _ => StudentName::Unparsed,
        }
    }

    /// `(first, last)`, both empty when unparsed.
    pub fn into_parts(self) -> (String, String) {
        match self {
            StudentName::Parsed { last, first } => (first, last),
            StudentName::Unparsed => (String::new(), String::new()),
        }
    }
}

/// A matched roster row and how many lines it used (1, or 2 with an email line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMatch {
    pub record: StudentRecord,
    pub consumed: usize,
}

pub fn find_g_number(line: &str) -> Option<&str> {
    G_NUMBER_RE.find(line).map(|m| m.as_str())
}

/// Email on the line after a row, if that line is not another row.
fn email_from_next(next_line: Option<&str>, email_domain: &str) -> Option<String> {
    let next = next_line?.trim();
    if email_domain.is_empty() || find_g_number(next).is_some() || !next.contains(email_domain) {
        return None;
    }
    next.split_whitespace().next().map(|t| t.to_string())
}

pub fn match_student_row(
    line: &str,
    next_line: Option<&str>,
    course: Option<&CourseContext>,
    email_domain: &str,
) -> Option<RowMatch> {
    let g_number = find_g_number(line)?;
    let course = course?;

    let before_id = line.split(g_number).next().unwrap_or_default();
    let (first_name, last_name) = StudentName::parse(before_id).into_parts();

    let email = email_from_next(next_line, email_domain);
    let consumed = if email.is_some() { 2 } else { 1 };

    Some(RowMatch {
        record: StudentRecord {
            first_name,
            last_name,
            g_number: g_number.to_string(),
            institutional_email: email.unwrap_or_default(),
            personal_email: String::new(),
            class_name: course.class_name(),
            crn: course.crn.clone(),
        },
        consumed,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::header::match_header;

    const DOMAIN: &str = "@pcc.edu";

    fn geo170() -> CourseContext {
        match_header("12345 GEO 170 1 Intro to Geography").unwrap()
    }

    #[test]
    fn row_with_email_line() {
        let course = geo170();
        let m = match_student_row(
            "1 Doe, Jane G00012345",
            Some("jdoe@pcc.edu extra"),
            Some(&course),
            DOMAIN,
        )
        .unwrap();
        assert_eq!(m.consumed, 2);
        assert_eq!(m.record.first_name, "Jane");
        assert_eq!(m.record.last_name, "Doe");
        assert_eq!(m.record.g_number, "G00012345");
        assert_eq!(m.record.institutional_email, "jdoe@pcc.edu");
        assert_eq!(m.record.personal_email, "");
        assert_eq!(m.record.class_name, "GEO 170");
        assert_eq!(m.record.crn, "12345");
    }

    #[test]
    fn row_without_email_consumes_one_line() {
        let course = geo170();
        let m = match_student_row(
            "2 Smith, John G00099999 Registered",
            Some("3 Lee, Ann G00011111"),
            Some(&course),
            DOMAIN,
        )
        .unwrap();
        assert_eq!(m.consumed, 1);
        assert_eq!(m.record.institutional_email, "");

        let last = match_student_row("2 Smith, John G00099999", None, Some(&course), DOMAIN).unwrap();
        assert_eq!(last.consumed, 1);
    }

    #[test]
    fn next_row_with_domain_is_not_an_email() {
        let course = geo170();
        let m = match_student_row(
            "1 Doe, Jane G00012345",
            Some("2 Roe, Rick G00054321 rroe@pcc.edu"),
            Some(&course),
            DOMAIN,
        )
        .unwrap();
        assert_eq!(m.consumed, 1);
        assert_eq!(m.record.institutional_email, "");
    }

    #[test]
    fn no_course_no_record() {
        assert!(match_student_row("1 Doe, Jane G00012345", None, None, DOMAIN).is_none());
    }

    #[test]
    fn no_identifier_no_record() {
        let course = geo170();
        assert!(match_student_row("1 Doe, Jane", None, Some(&course), DOMAIN).is_none());
        assert!(match_student_row("1 Doe, Jane G1234567", None, Some(&course), DOMAIN).is_none());
    }

    #[test]
    fn name_fallbacks() {
        assert_eq!(StudentName::parse("1 Doe Jane "), StudentName::Unparsed);
        assert_eq!(StudentName::parse("1"), StudentName::Unparsed);
        assert_eq!(StudentName::parse(""), StudentName::Unparsed);
        assert_eq!(
            StudentName::parse("  12   Van Buren,  Martin  "),
            StudentName::Parsed {
                last: "Van Buren".into(),
                first: "Martin".into()
            }
        );
        assert_eq!(
            StudentName::parse("3 Doe, Jane, Jr "),
            StudentName::Parsed {
                last: "Doe".into(),
                first: "Jane".into()
            }
        );
    }

    #[test]
    fn unparsed_name_still_emits_record() {
        let course = geo170();
        let m = match_student_row("G00012345 jdoe", None, Some(&course), DOMAIN).unwrap();
        assert_eq!(m.record.first_name, "");
        assert_eq!(m.record.last_name, "");
        assert_eq!(m.record.g_number, "G00012345");
    }
}
