//! Response construction errors.
//!
//! Scoring itself is total and never fails. These errors only surface when a
//! caller builds an [`OrderedResponse`](crate::sequence::OrderedResponse) from
//! malformed input, so the caller can reject it before a session exists.

use thiserror::Error;

use crate::sequence::{ItemId, Position};

/// Errors that can occur when constructing an ordered response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    /// The same item appears at more than one position.
    #[error("item '{item}' appears at positions {first} and {second}")]
    DuplicateItem {
        item: ItemId,
        first: Position,
        second: Position,
    },

    /// Positions are not contiguous from zero.
    #[error("position {0} is missing; positions must be contiguous from 0")]
    MissingPosition(Position),
}

impl ResponseError {
    /// The item involved in the error, if any.
    pub fn item(&self) -> Option<&ItemId> {
        match self {
            ResponseError::DuplicateItem { item, .. } => Some(item),
            ResponseError::MissingPosition(_) => None,
        }
    }
}
