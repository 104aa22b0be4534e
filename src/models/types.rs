//! Core Data Types - ratings and model tags

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::constants::{RATING_LETTERS, RATING_UNKNOWN};

/// EPC energy rating letter, A (best) to G (worst)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatingLetter {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    /// Model produced a code outside 0..=6
    Unknown,
}

impl RatingLetter {
    /// Map a numeric rating code to its letter. Never fails.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::A,
            1 => Self::B,
            2 => Self::C,
            3 => Self::D,
            4 => Self::E,
            5 => Self::F,
            6 => Self::G,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => RATING_LETTERS[0],
            Self::B => RATING_LETTERS[1],
            Self::C => RATING_LETTERS[2],
            Self::D => RATING_LETTERS[3],
            Self::E => RATING_LETTERS[4],
            Self::F => RATING_LETTERS[5],
            Self::G => RATING_LETTERS[6],
            Self::Unknown => RATING_UNKNOWN,
        }
    }
}

impl fmt::Display for RatingLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rating code as produced by a model, with its letter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rating {
    pub code: i64,
    pub letter: RatingLetter,
}

impl Rating {
    pub fn from_code(code: i64) -> Self {
        Self {
            code,
            letter: RatingLetter::from_code(code),
        }
    }
}

/// Kind tag stored alongside the active model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Trained classifier artifact
    Ml,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_table() {
        let letters: Vec<String> = (0..=6)
            .map(|code| RatingLetter::from_code(code).to_string())
            .collect();
        assert_eq!(letters, vec!["A", "B", "C", "D", "E", "F", "G"]);
    }

    #[test]
    fn test_unmapped_codes_are_unknown() {
        assert_eq!(RatingLetter::from_code(7), RatingLetter::Unknown);
        assert_eq!(RatingLetter::from_code(-1), RatingLetter::Unknown);
        assert_eq!(RatingLetter::from_code(i64::MAX).as_str(), "Unknown");
    }

    #[test]
    fn test_rating_keeps_raw_code() {
        let rating = Rating::from_code(42);
        assert_eq!(rating.code, 42);
        assert_eq!(rating.letter, RatingLetter::Unknown);
    }

    #[test]
    fn test_serialized_forms() {
        assert_eq!(serde_json::to_string(&RatingLetter::C).unwrap(), "\"C\"");
        assert_eq!(
            serde_json::to_string(&RatingLetter::Unknown).unwrap(),
            "\"Unknown\""
        );
        assert_eq!(serde_json::to_string(&ModelKind::Ml).unwrap(), "\"ml\"");
    }
}
