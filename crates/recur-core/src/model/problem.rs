use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Single-letter difficulty tag carried by a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "E")]
    Easy,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "H")]
    Hard,
}

impl Difficulty {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "E",
            Self::Medium => "M",
            Self::Hard => "H",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl FromStr for Difficulty {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "e" | "easy" => Ok(Self::Easy),
            "m" | "medium" => Ok(Self::Medium),
            "h" | "hard" => Ok(Self::Hard),
            _ => Err(ParseEnumError {
                expected: "difficulty",
                got: s.to_string(),
            }),
        }
    }
}

/// A registered problem. Identity (`problem_id`) never changes; title and
/// difficulty may be refreshed on re-registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub problem_id: String,
    pub title: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Problem {
    /// Display title falling back to the bare id.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.problem_id)
    }
}

#[cfg(test)]
mod tests {
    use super::Difficulty;
    use std::str::FromStr;

    #[test]
    fn difficulty_json_roundtrips() {
        assert_eq!(serde_json::to_string(&Difficulty::Easy).unwrap(), "\"E\"");
        assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), "\"H\"");
        assert_eq!(
            serde_json::from_str::<Difficulty>("\"M\"").unwrap(),
            Difficulty::Medium
        );
    }

    #[test]
    fn difficulty_parse_accepts_letters_and_words() {
        assert_eq!(Difficulty::from_str("E").unwrap(), Difficulty::Easy);
        assert_eq!(Difficulty::from_str("easy").unwrap(), Difficulty::Easy);
        assert_eq!(Difficulty::from_str("Medium").unwrap(), Difficulty::Medium);
        assert_eq!(Difficulty::from_str("h").unwrap(), Difficulty::Hard);
    }

    #[test]
    fn difficulty_parse_rejects_unknown_values() {
        assert!(Difficulty::from_str("extreme").is_err());
        assert!(Difficulty::from_str("").is_err());
    }
}
