use std::collections::BTreeSet;
use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ClasslistError, Result};

const ENV_PREFIX: &str = "CLASSLIST";
pub const DEFAULT_CONFIG_FILE: &str = "classlist.toml";

/// Course numbers accepted when no other list is configured.
const DEFAULT_ALLOWED_COURSES: &[&str] = &[
    "170", "221", "223", "240", "242", "244", "246", "248", "252", "254", "260", "265", "266",
    "267", "270", "280A",
];

/// Sentinel list entry that disables course filtering.
pub const ACCEPT_ALL: &str = "*";

/// Run-wide settings, fixed before the first page is scanned.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Restrict scanning to a single subject code (e.g. "GEO").
    #[serde(default)]
    pub department_prefix: Option<String>,
    /// Accepted course numbers; `["*"]` accepts every course.
    pub allowed_courses: Vec<String>,
    /// Substring marking an institutional email line; must not be empty.
    pub email_domain: String,
    pub output_name_prefix: String,
    pub output_subfolder: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            department_prefix: None,
            allowed_courses: DEFAULT_ALLOWED_COURSES.iter().map(|c| c.to_string()).collect(),
            email_domain: "@pcc.edu".to_string(),
            output_name_prefix: "GEO_Class_Lists".to_string(),
            output_subfolder: "Output Files".to_string(),
        }
    }
}

impl Settings {
    /// Layer defaults, an optional TOML file and `CLASSLIST_*` variables.
    ///
    /// An explicit `path` must exist; the default `classlist.toml` is only
    /// read when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("allowed_courses", defaults.allowed_courses)?
            .set_default("email_domain", defaults.email_domain)?
            .set_default("output_name_prefix", defaults.output_name_prefix)?
            .set_default("output_subfolder", defaults.output_subfolder)?;

        builder = match path {
            Some(p) => builder.add_source(File::from(p).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("allowed_courses"),
            )
            .build()?
            .try_deserialize()?;

        // An empty domain would make every line after a row look like its email.
        if settings.email_domain.trim().is_empty() {
            return Err(ClasslistError::Config(ConfigError::Message(
                "email_domain must not be empty".to_string(),
            )));
        }

        debug!(?settings, "settings loaded");
        Ok(settings)
    }

    pub fn accept_all_courses(&mut self) {
        self.allowed_courses = vec![ACCEPT_ALL.to_string()];
    }

    /// `None` means every course number is accepted.
    pub fn course_allow_list(&self) -> Option<BTreeSet<String>> {
        if self.allowed_courses.iter().any(|c| c.trim() == ACCEPT_ALL) {
            return None;
        }
        Some(
            self.allowed_courses
                .iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
        )
    }
}

// ── Tests ──
