//! Problem-input parsing: extracting the numeric id, difficulty tag, and
//! clean title from the free-form strings users paste in.
//!
//! Accepted shapes: `42`, `215. Kth Largest Element`, `(E) 1. Two Sum`.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::model::Difficulty;

static DIFFICULTY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(([EMHemh])\)\s*").expect("difficulty pattern compiles"));

static ID_WITH_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*?(\d+)\.").expect("id-with-dot pattern compiles"));

static ID_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)$").expect("id-only pattern compiles"));

static ID_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("id-prefix pattern compiles"));

/// The id and display title extracted from a problem argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemInput {
    pub problem_id: String,
    pub display_title: String,
}

/// Parse a problem argument into its id and display title.
///
/// # Errors
///
/// Returns [`CoreError::InvalidArgument`] when the input matches none of
/// the accepted shapes.
pub fn parse_problem_input(input: &str) -> Result<ProblemInput, CoreError> {
    let trimmed = input.trim();

    if let Some(captures) = ID_WITH_DOT.captures(trimmed) {
        return Ok(ProblemInput {
            problem_id: captures[1].to_string(),
            display_title: trimmed.to_string(),
        });
    }

    if let Some(captures) = ID_ONLY.captures(trimmed) {
        return Ok(ProblemInput {
            problem_id: captures[1].to_string(),
            display_title: trimmed.to_string(),
        });
    }

    Err(CoreError::InvalidArgument(format!(
        "invalid problem input '{input}': expected '1', '1. Two Sum', or '(E) 1. Two Sum'"
    )))
}

/// Split a full title into its difficulty tag and clean title.
///
/// `"(E) 1. Two Sum"` yields `(Some(Easy), "Two Sum")`; a title with no
/// recognizable structure is returned as-is with no difficulty.
#[must_use]
pub fn parse_title(title: &str) -> (Option<Difficulty>, String) {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return (None, String::new());
    }

    let mut difficulty = None;
    let mut rest = trimmed.to_string();

    if let Some(captures) = DIFFICULTY_PREFIX.captures(&rest) {
        difficulty = Difficulty::from_str(&captures[1]).ok();
        rest = DIFFICULTY_PREFIX.replace(&rest, "").into_owned();
    }

    rest = ID_PREFIX.replace(&rest, "").into_owned();

    let clean = rest.trim();
    if clean.is_empty() {
        (difficulty, trimmed.to_string())
    } else {
        (difficulty, clean.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_problem_input, parse_title};
    use crate::model::Difficulty;

    #[test]
    fn bare_number_is_its_own_title() {
        let parsed = parse_problem_input("42").unwrap();
        assert_eq!(parsed.problem_id, "42");
        assert_eq!(parsed.display_title, "42");
    }

    #[test]
    fn id_dot_title_extracts_id() {
        let parsed = parse_problem_input("215. Kth Largest Element").unwrap();
        assert_eq!(parsed.problem_id, "215");
        assert_eq!(parsed.display_title, "215. Kth Largest Element");
    }

    #[test]
    fn difficulty_prefix_is_part_of_display_title() {
        let parsed = parse_problem_input("(E) 1. Two Sum").unwrap();
        assert_eq!(parsed.problem_id, "1");
        assert_eq!(parsed.display_title, "(E) 1. Two Sum");
    }

    #[test]
    fn unparseable_input_is_rejected() {
        assert!(parse_problem_input("two sum").is_err());
        assert!(parse_problem_input("").is_err());
    }

    #[test]
    fn title_parsing_strips_tag_and_id() {
        assert_eq!(
            parse_title("(E) 1. Two Sum"),
            (Some(Difficulty::Easy), "Two Sum".to_string())
        );
        assert_eq!(
            parse_title("(h) 4. Median of Two Sorted Arrays"),
            (Some(Difficulty::Hard), "Median of Two Sorted Arrays".to_string())
        );
        assert_eq!(
            parse_title("215. Kth Largest Element"),
            (None, "Kth Largest Element".to_string())
        );
    }

    #[test]
    fn title_with_nothing_left_falls_back_to_original() {
        assert_eq!(parse_title("42."), (None, "42.".to_string()));
        assert_eq!(parse_title(""), (None, String::new()));
    }
}
