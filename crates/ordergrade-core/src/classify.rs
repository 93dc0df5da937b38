//! Per-item score classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fractions above this count as fully correct.
pub const CORRECT_THRESHOLD: f64 = 0.999999;
/// Fractions below this count as fully incorrect.
pub const INCORRECT_THRESHOLD: f64 = 0.000001;
/// Lower bound of the upper partial band.
pub const PARTIAL66_THRESHOLD: f64 = 0.66;
/// Lower bound of the middle partial band.
pub const PARTIAL33_THRESHOLD: f64 = 0.33;

/// Discrete correctness class of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassLabel {
    Correct,
    Partial66,
    Partial33,
    Partial00,
    Incorrect,
    Unscored,
}

impl ClassLabel {
    /// Classify a score fraction. The epsilon bounds absorb division error.
    pub fn from_fraction(fraction: f64) -> Self {
        if fraction > CORRECT_THRESHOLD {
            ClassLabel::Correct
        } else if fraction < INCORRECT_THRESHOLD {
            ClassLabel::Incorrect
        } else if fraction >= PARTIAL66_THRESHOLD {
            ClassLabel::Partial66
        } else if fraction >= PARTIAL33_THRESHOLD {
            ClassLabel::Partial33
        } else {
            ClassLabel::Partial00
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClassLabel::Correct => "correct",
            ClassLabel::Partial66 => "partial66",
            ClassLabel::Partial33 => "partial33",
            ClassLabel::Partial00 => "partial00",
            ClassLabel::Incorrect => "incorrect",
            ClassLabel::Unscored => "unscored",
        }
    }

    pub fn is_partial(self) -> bool {
        matches!(
            self,
            ClassLabel::Partial66 | ClassLabel::Partial33 | ClassLabel::Partial00
        )
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemScore {
    /// Credit earned.
    pub score: u32,
    /// Credit available; `None` when the item is not graded.
    pub max_score: Option<u32>,
    /// `score / max_score`, in `[0, 1]`.
    pub fraction: f64,
    /// `fraction` as a rounded percentage.
    pub percent: u32,
    pub class: ClassLabel,
}

impl ItemScore {
    /// An item that no comparison applies to.
    pub fn unscored() -> Self {
        classify(0, None)
    }

    pub fn is_scored(&self) -> bool {
        self.max_score.is_some()
    }
}

/// Turn a raw score into a classified [`ItemScore`].
///
/// A zero `max_score` yields a zero fraction rather than a division error.
pub fn classify(score: u32, max_score: Option<u32>) -> ItemScore {
    let Some(max) = max_score else {
        return ItemScore {
            score,
            max_score: None,
            fraction: 0.0,
            percent: 0,
            class: ClassLabel::Unscored,
        };
    };
    let fraction = if max == 0 {
        0.0
    } else {
        f64::from(score) / f64::from(max)
    };
    ItemScore {
        score,
        max_score: Some(max),
        fraction,
        percent: percent_of(fraction),
        class: ClassLabel::from_fraction(fraction),
    }
}

/// Round `100 * fraction` to the nearest integer, halves rounding up.
pub fn percent_of(fraction: f64) -> u32 {
    (100.0 * fraction).round().max(0.0) as u32
}
