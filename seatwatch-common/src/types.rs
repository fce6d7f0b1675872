use serde::{Deserialize, Serialize};

/// Chat identifier of the subscriber a watch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriberId(pub i64);

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SubscriberId {
    fn from(id: i64) -> Self {
        SubscriberId(id)
    }
}

/// A (program, section) pair as typed by a user, e.g. `END_12345`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionTarget {
    /// Upper-case 3-letter program code
    pub program: String,
    /// Section key (CRN), digits only
    pub section: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseTargetError {
    /// No `_` separator, or more than one
    MissingSeparator,
    /// Program part is not exactly three ASCII letters
    InvalidProgram(String),
    /// Section part is empty or not numeric
    InvalidSection(String),
}

impl std::fmt::Display for ParseTargetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseTargetError::MissingSeparator => write!(f, "expected PROGRAM_CRN"),
            ParseTargetError::InvalidProgram(p) => {
                write!(f, "program code must be 3 letters, got '{}'", p)
            }
            ParseTargetError::InvalidSection(s) => write!(f, "CRN must be numeric, got '{}'", s),
        }
    }
}

impl std::error::Error for ParseTargetError {}

impl std::str::FromStr for SectionTarget {
    type Err = ParseTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let mut parts = upper.split('_');
        let (program, section) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(c), None) => (p, c),
            _ => return Err(ParseTargetError::MissingSeparator),
        };

        if program.len() != 3 || !program.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ParseTargetError::InvalidProgram(program.to_string()));
        }
        if section.is_empty() || !section.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParseTargetError::InvalidSection(section.to_string()));
        }

        Ok(SectionTarget {
            program: program.to_string(),
            section: section.to_string(),
        })
    }
}

impl std::fmt::Display for SectionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.program, self.section)
    }
}

/// Identity of one watch: who is watching which section
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WatchKey {
    pub subscriber: SubscriberId,
    pub target: SectionTarget,
}

impl WatchKey {
    pub fn new(subscriber: SubscriberId, program: &str, section: &str) -> Self {
        Self {
            subscriber,
            target: SectionTarget {
                program: program.to_uppercase(),
                section: section.to_string(),
            },
        }
    }

    pub fn program(&self) -> &str {
        &self.target.program
    }

    pub fn section(&self) -> &str {
        &self.target.section
    }
}

impl std::fmt::Display for WatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.subscriber, self.target)
    }
}

/// Seat counts for one section as read from the upstream schedule table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeatStatus {
    /// Whether the section key exists in the program's table
    pub found: bool,
    pub course_code: String,
    pub course_name: String,
    /// Day column, e.g. "Pazartesi"
    pub day: String,
    /// Time slot column, e.g. "0830/1129"
    pub time_slot: String,
    pub capacity: u32,
    pub enrolled: u32,
}

impl SeatStatus {
    /// Status for a section key that is not present upstream
    pub fn not_found() -> Self {
        Self::default()
    }

    /// `max(0, capacity - enrolled)`
    pub fn open_seats(&self) -> u32 {
        self.capacity.saturating_sub(self.enrolled)
    }

    pub fn has_open_seats(&self) -> bool {
        self.found && self.open_seats() > 0
    }
}
