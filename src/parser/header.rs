use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::settings::Settings;

/// CRN, subject, course number, section, title.
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{5})\s+(\w+)\s+(\d+[A-Z]?)\s+(\d)\s+(.*)").unwrap());

/// The course section whose roster is currently being read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseContext {
    pub crn: String,
    pub subject: String,
    pub course_number: String,
    pub section: String,
    pub title: String,
}

impl CourseContext {
    /// "GEO 170"
    pub fn class_name(&self) -> String {
        format!("{} {}", self.subject, self.course_number)
    }
}

pub fn match_header(line: &str) -> Option<CourseContext> {
    let caps = HEADER_RE.captures(line)?;
    Some(CourseContext {
        crn: caps[1].to_string(),
        subject: caps[2].to_string(),
        course_number: caps[3].to_string(),
        section: caps[4].to_string(),
        title: caps[5].trim().to_string(),
    })
}

/// Decides which matched headers open a course whose rows are kept.
#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    /// `None` accepts every course number.
    allowed: Option<BTreeSet<String>>,
    department: Option<String>,
}

impl CourseFilter {
    pub fn new(allowed: Option<BTreeSet<String>>, department: Option<String>) -> Self {
        CourseFilter {
            allowed,
            department: department
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.course_allow_list(), settings.department_prefix.clone())
    }

    pub fn is_allowed(&self, course_number: &str) -> bool {
        self.allowed
            .as_ref()
            .map_or(true, |set| set.contains(course_number))
    }

    pub fn allows(&self, course: &CourseContext) -> bool {
        let subject_ok = self
            .department
            .as_deref()
            .map_or(true, |d| d.eq_ignore_ascii_case(&course.subject));
        subject_ok && self.is_allowed(&course.course_number)
    }
}

// ── Tests ──
