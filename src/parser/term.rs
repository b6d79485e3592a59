use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static TERM_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(Spring|Summer|Fall|Winter)\s+(20\d{2})\b").unwrap());
static TERM_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(20\d{2})0([1-4])\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Last digit of a Banner term code.
    pub fn from_code(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(Season::Winter),
            2 => Some(Season::Spring),
            3 => Some(Season::Summer),
            4 => Some(Season::Fall),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "winter" => Some(Season::Winter),
            "spring" => Some(Season::Spring),
            "summer" => Some(Season::Summer),
            "fall" => Some(Season::Fall),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }
}

/// Academic term of a class list. `Unknown` renders as an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermLabel {
    Detected { season: Season, year: String },
    Unknown,
}

impl TermLabel {
    pub fn is_known(&self) -> bool {
        matches!(self, TermLabel::Detected { .. })
    }
}

impl fmt::Display for TermLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermLabel::Detected { season, year } => write!(f, "{} {}", season.as_str(), year),
            TermLabel::Unknown => Ok(()),
        }
    }
}

/// Infer the term from first-page text: explicit "Fall 2025" wins over a
/// "202504" style code.
pub fn detect_term(first_page: &str) -> TermLabel {
    if let Some(caps) = TERM_TEXT_RE.captures(first_page) {
        if let Some(season) = Season::from_name(&caps[1]) {
            return TermLabel::Detected {
                season,
                year: caps[2].to_string(),
            };
        }
    }

    TERM_CODE_RE
        .captures_iter(first_page)
        .find_map(|caps| {
            let digit = caps[2].parse::<u8>().ok()?;
            Some(TermLabel::Detected {
                season: Season::from_code(digit)?,
                year: caps[1].to_string(),
            })
        })
        .unwrap_or(TermLabel::Unknown)
}

// ── Tests ──
