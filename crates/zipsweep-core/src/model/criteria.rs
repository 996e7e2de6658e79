/// Filter criteria: which extensions and what minimum age select a file.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Extensions offered by front ends as ready-made choices.
///
/// Criteria are not limited to this list; any extension string is accepted.
pub const KNOWN_EXTENSIONS: &[&str] = &["ok", "ng", "log", "txt", "csv", "mp4"];

/// How old a file's last modification must be for it to be selected.
///
/// Each selector names a cutoff `now - months`; a file is old enough when
/// its modification time is strictly before that cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgeSelector {
    #[default]
    Today,
    OneYear,
    TwoYears,
    ThreeYears,
    FourYears,
    FiveYears,
}

impl AgeSelector {
    pub const ALL: [AgeSelector; 6] = [
        Self::Today,
        Self::OneYear,
        Self::TwoYears,
        Self::ThreeYears,
        Self::FourYears,
        Self::FiveYears,
    ];

    /// Number of calendar months subtracted from "now" to get the cutoff.
    pub fn months(self) -> u32 {
        match self {
            Self::Today => 0,
            Self::OneYear => 12,
            Self::TwoYears => 24,
            Self::ThreeYears => 36,
            Self::FourYears => 48,
            Self::FiveYears => 60,
        }
    }

    /// Stable token used on the command line and in settings files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::OneYear => "one-year",
            Self::TwoYears => "two-years",
            Self::ThreeYears => "three-years",
            Self::FourYears => "four-years",
            Self::FiveYears => "five-years",
        }
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::OneYear => "1 year ago",
            Self::TwoYears => "2 years ago",
            Self::ThreeYears => "3 years ago",
            Self::FourYears => "4 years ago",
            Self::FiveYears => "5 years ago",
        }
    }
}

impl fmt::Display for AgeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAgeSelector(pub String);

impl fmt::Display for UnknownAgeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown age `{}` (expected one of: {})",
            self.0,
            AgeSelector::ALL.map(AgeSelector::as_str).join(", ")
        )
    }
}

impl std::error::Error for UnknownAgeSelector {}

impl FromStr for AgeSelector {
    type Err = UnknownAgeSelector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|age| age.as_str() == wanted)
            .ok_or_else(|| UnknownAgeSelector(s.to_string()))
    }
}

/// The combination of selected extensions and age threshold for one scan.
///
/// Extensions are stored lowercase without a leading dot. An empty set
/// selects nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    extensions: BTreeSet<String>,
    age: AgeSelector,
}

impl FilterCriteria {
    pub fn new<I, S>(extensions: I, age: AgeSelector) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        Self { extensions, age }
    }

    /// Parse a comma-separated extension list such as `"txt, .CSV,log"`.
    pub fn parse_extension_list(list: &str) -> Vec<String> {
        list.split(',').filter_map(normalize_extension).collect()
    }

    pub fn extensions(&self) -> &BTreeSet<String> {
        &self.extensions
    }

    pub fn age(&self) -> AgeSelector {
        self.age
    }

    /// Extensions joined back into the comma-separated form.
    pub fn extension_list(&self) -> String {
        self.extensions
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn normalize_extension(raw: &str) -> Option<String> {
    let ext = raw.trim().trim_start_matches('.');
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}
