//! Typed orderings: item identifiers, positions and position→item responses.
//!
//! An [`OrderedResponse`] is the representation used for both the correct
//! order of a question and a submitted order. It keeps an inverse index so
//! that "where is item X" is a map lookup rather than a scan.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ResponseError;

/// Zero-based slot in a sequence.
pub type Position = usize;

/// Opaque identifier of an orderable item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for ItemId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// A position→item mapping with contiguous positions starting at 0.
///
/// A sanitized submission may leave a slot vacant where an id was skipped, so
/// the items after it keep the positions they were submitted at. Vacant slots
/// have no item: [`get`](Self::get) returns `None` for them.
///
/// Equality is whole-structure equality: same items at the same positions.
#[derive(Debug, Clone, Default)]
pub struct OrderedResponse {
    slots: Vec<Option<ItemId>>,
    index: HashMap<ItemId, Position>,
}

impl PartialEq for OrderedResponse {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots
    }
}

impl Eq for OrderedResponse {}

impl OrderedResponse {
    /// Build a response from items listed in position order.
    pub fn new<I, T>(items: I) -> Result<Self, ResponseError>
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemId>,
    {
        let slots: Vec<Option<ItemId>> = items.into_iter().map(|item| Some(item.into())).collect();
        let mut index = HashMap::with_capacity(slots.len());
        for (position, item) in slots.iter().enumerate() {
            let Some(item) = item else { continue };
            if let Some(first) = index.insert(item.clone(), position) {
                return Err(ResponseError::DuplicateItem {
                    item: item.clone(),
                    first,
                    second: position,
                });
            }
        }
        Ok(Self { slots, index })
    }

    /// Build a response from an explicit position→item mapping.
    pub fn from_positions(positions: BTreeMap<Position, ItemId>) -> Result<Self, ResponseError> {
        let mut items = Vec::with_capacity(positions.len());
        for (expected, (position, item)) in positions.into_iter().enumerate() {
            if position != expected {
                return Err(ResponseError::MissingPosition(expected));
            }
            items.push(item);
        }
        Self::new(items)
    }

    /// Sanitize a raw submission against the correct order.
    ///
    /// Ids unknown to `correct` and repeats of an id already seen are skipped.
    /// A skipped slot stays vacant; every other id keeps its submitted position.
    pub fn from_submission<I, T>(raw: I, correct: &OrderedResponse) -> Submission
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemId>,
    {
        let mut slots = Vec::new();
        let mut index = HashMap::new();
        let mut skipped = Vec::new();
        for (position, item) in raw.into_iter().map(Into::into).enumerate() {
            if !correct.contains(&item) || index.contains_key(&item) {
                tracing::warn!("skipping item '{item}' at position {position} in submitted response");
                skipped.push(item);
                slots.push(None);
                continue;
            }
            index.insert(item.clone(), position);
            slots.push(Some(item));
        }
        Submission {
            response: OrderedResponse { slots, index },
            skipped,
        }
    }

    /// Number of positions, vacant slots included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Item at `position`, if the position exists and is occupied.
    pub fn get(&self, position: Position) -> Option<&ItemId> {
        self.slots.get(position).and_then(Option::as_ref)
    }

    /// Position of `item`, if present.
    pub fn position_of(&self, item: &ItemId) -> Option<Position> {
        self.index.get(item).copied()
    }

    pub fn contains(&self, item: &ItemId) -> bool {
        self.index.contains_key(item)
    }

    /// Every slot in position order; `None` marks a vacant one.
    pub fn slots(&self) -> &[Option<ItemId>] {
        &self.slots
    }

    /// Iterate `(position, item)` pairs in position order, skipping vacant slots.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &ItemId)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(position, item)| item.as_ref().map(|item| (position, item)))
    }
}

/// A sanitized submission and the ids that were skipped in it.
#[derive(Debug, Clone)]
pub struct Submission {
    pub response: OrderedResponse,
    pub skipped: Vec<ItemId>,
}
