//! Grading policies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How much credit an item earns for its place in the submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradingPolicy {
    /// Every item scores 1 only when the whole order is correct.
    AllOrNothing,
    /// An item scores when it sits at its correct position.
    AbsolutePosition,
    /// An item scores when it is followed by its correct successor; the last
    /// item is not graded.
    RelativeNextExcludeLast,
    /// Like [`RelativeNextExcludeLast`](Self::RelativeNextExcludeLast), but the
    /// last item scores when it is also last in the submission.
    RelativeNextIncludeLast,
    /// Credit for each correct immediate neighbour.
    RelativeOnePreviousAndNext,
    /// Credit for each item correctly placed before or after this one.
    RelativeAllPreviousAndNext,
    /// Items in the longest correctly ordered subsequence score.
    LongestOrderedSubset,
    /// Items in the longest correctly ordered gap-free run score.
    LongestContiguousSubset,
    /// Credit decreases with distance from the correct position.
    RelativeToCorrect,
}

impl GradingPolicy {
    /// Every policy, in code order.
    pub const ALL: [GradingPolicy; 9] = [
        GradingPolicy::AllOrNothing,
        GradingPolicy::AbsolutePosition,
        GradingPolicy::RelativeNextExcludeLast,
        GradingPolicy::RelativeNextIncludeLast,
        GradingPolicy::RelativeOnePreviousAndNext,
        GradingPolicy::RelativeAllPreviousAndNext,
        GradingPolicy::LongestOrderedSubset,
        GradingPolicy::LongestContiguousSubset,
        GradingPolicy::RelativeToCorrect,
    ];

    /// Integer selector used by question definitions.
    pub fn code(self) -> i64 {
        match self {
            GradingPolicy::AllOrNothing => -1,
            GradingPolicy::AbsolutePosition => 0,
            GradingPolicy::RelativeNextExcludeLast => 1,
            GradingPolicy::RelativeNextIncludeLast => 2,
            GradingPolicy::RelativeOnePreviousAndNext => 3,
            GradingPolicy::RelativeAllPreviousAndNext => 4,
            GradingPolicy::LongestOrderedSubset => 5,
            GradingPolicy::LongestContiguousSubset => 6,
            GradingPolicy::RelativeToCorrect => 7,
        }
    }

    /// Resolve an integer selector. Unknown codes yield `None`.
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            GradingPolicy::AllOrNothing => "all_or_nothing",
            GradingPolicy::AbsolutePosition => "absolute_position",
            GradingPolicy::RelativeNextExcludeLast => "relative_next_exclude_last",
            GradingPolicy::RelativeNextIncludeLast => "relative_next_include_last",
            GradingPolicy::RelativeOnePreviousAndNext => "relative_one_previous_and_next",
            GradingPolicy::RelativeAllPreviousAndNext => "relative_all_previous_and_next",
            GradingPolicy::LongestOrderedSubset => "longest_ordered_subset",
            GradingPolicy::LongestContiguousSubset => "longest_contiguous_subset",
            GradingPolicy::RelativeToCorrect => "relative_to_correct",
        }
    }

    /// One-line description for listings.
    pub fn description(self) -> &'static str {
        match self {
            GradingPolicy::AllOrNothing => "full credit only if the whole order is correct",
            GradingPolicy::AbsolutePosition => "credit for items at their correct position",
            GradingPolicy::RelativeNextExcludeLast => {
                "credit for items followed by their correct successor (last item ungraded)"
            }
            GradingPolicy::RelativeNextIncludeLast => {
                "credit for items followed by their correct successor (last item graded)"
            }
            GradingPolicy::RelativeOnePreviousAndNext => {
                "credit for each correct immediate neighbour"
            }
            GradingPolicy::RelativeAllPreviousAndNext => {
                "credit for each item correctly before or after"
            }
            GradingPolicy::LongestOrderedSubset => {
                "credit for items in the longest ordered subsequence"
            }
            GradingPolicy::LongestContiguousSubset => {
                "credit for items in the longest contiguous run"
            }
            GradingPolicy::RelativeToCorrect => {
                "credit reduced by distance from the correct position"
            }
        }
    }
}

impl fmt::Display for GradingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GradingPolicy {
    type Err = String;

    /// Accepts a snake_case name, the same name with dashes, or an integer code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i64>() {
            return Self::from_code(code)
                .ok_or_else(|| format!("unknown grading policy code: {code}"));
        }
        let normalized = trimmed.to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|p| p.name() == normalized)
            .ok_or_else(|| format!("unknown grading policy: {trimmed}"))
    }
}

/// A policy as written in a question definition: a name or an integer code.
///
/// Kept unresolved so an unrecognized value can be reported verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolicySelector {
    Code(i64),
    Name(String),
}

impl PolicySelector {
    /// The policy this selector names, or `None` if it names none.
    pub fn resolve(&self) -> Option<GradingPolicy> {
        match self {
            PolicySelector::Code(code) => GradingPolicy::from_code(*code),
            PolicySelector::Name(name) => name.parse().ok(),
        }
    }
}

impl From<GradingPolicy> for PolicySelector {
    fn from(policy: GradingPolicy) -> Self {
        PolicySelector::Name(policy.name().to_string())
    }
}

impl fmt::Display for PolicySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicySelector::Code(code) => write!(f, "{code}"),
            PolicySelector::Name(name) => f.write_str(name),
        }
    }
}
