//! Letter-grade banding for result percentages.
//!
//! Bands are checked from the top down and the first match wins, so a
//! boundary value always lands in the higher band (`95.0` is `A+`,
//! `94.999` is `A`). Out-of-range input is not clamped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

/// A discrete letter grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    C,
    #[serde(rename = "C-")]
    CMinus,
    D,
    F,
}

/// Lower bounds (inclusive) in descending order. Anything below the last band is `F`.
const BANDS: [(f64, LetterGrade); 10] = [
    (95.0, LetterGrade::APlus),
    (90.0, LetterGrade::A),
    (85.0, LetterGrade::AMinus),
    (80.0, LetterGrade::BPlus),
    (75.0, LetterGrade::B),
    (70.0, LetterGrade::BMinus),
    (65.0, LetterGrade::CPlus),
    (60.0, LetterGrade::C),
    (55.0, LetterGrade::CMinus),
    (50.0, LetterGrade::D),
];

/// Map a percentage to its letter grade.
///
/// Total over every `f64`. `NaN` fails every comparison and therefore
/// falls through to [`LetterGrade::F`]; callers that need to reject it
/// must check [`f64::is_finite`] themselves.
pub fn calc_letter_grade(percentage: f64) -> LetterGrade {
    BANDS
        .iter()
        .find(|(lower, _)| percentage >= *lower)
        .map(|&(_, grade)| grade)
        .unwrap_or(LetterGrade::F)
}

/// `score / total_marks` as a percentage.
///
/// Returns `None` when `total_marks` is not positive or either input is not finite.
pub fn percentage(score: f64, total_marks: f64) -> Option<f64> {
    if !score.is_finite() || !total_marks.is_finite() || total_marks <= 0.0 {
        return None;
    }
    Some(score / total_marks * 100.0)
}

impl LetterGrade {
    pub const ALL: [LetterGrade; 11] = [
        Self::APlus,
        Self::A,
        Self::AMinus,
        Self::BPlus,
        Self::B,
        Self::BMinus,
        Self::CPlus,
        Self::C,
        Self::CMinus,
        Self::D,
        Self::F,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::D => "D",
            Self::F => "F",
        }
    }

    pub fn is_passing(self) -> bool {
        self != Self::F
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown letter grade: {0:?}")]
pub struct UnknownGrade(pub String);

impl FromStr for LetterGrade {
    type Err = UnknownGrade;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownGrade(s.to_owned()))
    }
}
