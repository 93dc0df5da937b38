//! Relation builders.
//!
//! Pure functions that derive, from an ordering, the relational data the
//! graph-based and subsequence-based grading policies compare:
//! next-item maps, previous/next sets and the longest run of items that is
//! ordered consistently with the correct response.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::sequence::{ItemId, OrderedResponse, Position};

/// What follows an item in a next-item map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NextItem {
    Item(ItemId),
    /// Terminal marker for the last item of an include-last map.
    End,
}

/// Item → the item that follows it.
pub type NextMap = HashMap<ItemId, NextItem>;

/// Items before and after a given item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrevNext {
    pub prev: HashSet<ItemId>,
    pub next: HashSet<ItemId>,
}

/// Item → its previous/next sets.
pub type PrevNextMap = HashMap<ItemId, PrevNext>;

/// Positions of `current` that belong to the best ordered run.
pub type Subset = BTreeSet<Position>;

/// Map every item to the item after it.
///
/// With `include_last` the final item maps to [`NextItem::End`]; without it
/// the final item has no entry at all. An item followed by a vacant slot has
/// no entry either, so it never matches an expected successor.
pub fn build_next_map(response: &OrderedResponse, include_last: bool) -> NextMap {
    let slots = response.slots();
    let mut map: NextMap = slots
        .windows(2)
        .filter_map(|pair| match pair {
            [Some(item), Some(next)] => Some((item.clone(), NextItem::Item(next.clone()))),
            _ => None,
        })
        .collect();
    if include_last {
        if let Some(Some(last)) = slots.last() {
            map.insert(last.clone(), NextItem::End);
        }
    }
    map
}

/// Map every item to the items before and after it.
///
/// With `include_all` the sets hold every earlier/later item; otherwise only
/// the immediate neighbours. Vacant slots contribute nothing.
pub fn build_prev_next_sets(response: &OrderedResponse, include_all: bool) -> PrevNextMap {
    let slots = response.slots();
    let n = slots.len();
    response
        .iter()
        .map(|(p, item)| {
            let (before, after) = if include_all {
                (&slots[..p], &slots[p + 1..])
            } else {
                (&slots[p.saturating_sub(1)..p], &slots[(p + 1).min(n)..(p + 2).min(n)])
            };
            let sets = PrevNext {
                prev: before.iter().flatten().cloned().collect(),
                next: after.iter().flatten().cloned().collect(),
            };
            (item.clone(), sets)
        })
        .collect()
}

/// Find the longest run of `current` that is ordered consistently with `correct`.
///
/// Ordered mode (`contiguous == false`) is a longest strictly increasing
/// subsequence over correct-positions, gaps allowed. Contiguous mode only
/// accepts runs of adjacent positions whose correct-positions step by exactly
/// one. Ties go to the run that starts earliest; among ordered runs with the
/// same start, the earliest positions win. Vacant slots and items unknown to
/// `correct` never join a run.
pub fn longest_ordered_subset(
    correct: &OrderedResponse,
    current: &OrderedResponse,
    contiguous: bool,
) -> Subset {
    let ranks: Vec<Option<Position>> = current
        .slots()
        .iter()
        .map(|slot| slot.as_ref().and_then(|item| correct.position_of(item)))
        .collect();
    if contiguous {
        longest_contiguous_run(&ranks)
    } else {
        longest_increasing_run(&ranks)
    }
}

fn longest_contiguous_run(ranks: &[Option<Position>]) -> Subset {
    let mut best: Option<(Position, usize)> = None;
    let mut start = 0;
    while start < ranks.len() {
        if ranks[start].is_none() {
            start += 1;
            continue;
        }
        let mut end = start;
        while let (Some(Some(a)), Some(Some(b))) = (ranks.get(end), ranks.get(end + 1)) {
            if *b != a + 1 {
                break;
            }
            end += 1;
        }
        let len = end - start + 1;
        if best.is_none_or(|(_, best_len)| len > best_len) {
            best = Some((start, len));
        }
        start = end + 1;
    }
    best.map(|(start, len)| (start..start + len).collect())
        .unwrap_or_default()
}

fn longest_increasing_run(ranks: &[Option<Position>]) -> Subset {
    let n = ranks.len();
    // from[p]: length of the longest increasing run starting at p.
    let mut from = vec![0usize; n];
    for p in (0..n).rev() {
        let Some(rank) = ranks[p] else { continue };
        from[p] = 1 + (p + 1..n)
            .filter(|&q| ranks[q].is_some_and(|r| r > rank))
            .map(|q| from[q])
            .max()
            .unwrap_or(0);
    }

    let mut subset = Subset::new();
    let Some(best_len) = from.iter().copied().max().filter(|&len| len > 0) else {
        return subset;
    };
    let mut cursor = from.iter().position(|&len| len == best_len);
    while let Some(p) = cursor {
        subset.insert(p);
        let (rank, want) = (ranks[p], from[p] - 1);
        cursor = (p + 1..n).find(|&q| want > 0 && from[q] == want && ranks[q] > rank);
    }
    subset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resp(items: &[&str]) -> OrderedResponse {
        OrderedResponse::new(items.iter().copied()).unwrap()
    }

    fn id(s: &str) -> ItemId {
        ItemId::from(s)
    }

    fn ids(items: &[&str]) -> HashSet<ItemId> {
        items.iter().map(|s| id(s)).collect()
    }

    fn set(positions: &[Position]) -> Subset {
        positions.iter().copied().collect()
    }

    #[test]
    fn next_map_exclude_last() {
        let map = build_next_map(&resp(&["A", "B", "C"]), false);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&id("A")], NextItem::Item(id("B")));
        assert_eq!(map[&id("B")], NextItem::Item(id("C")));
        assert!(!map.contains_key(&id("C")));
    }

    #[test]
    fn next_map_include_last() {
        let map = build_next_map(&resp(&["A", "B", "C"]), true);
        assert_eq!(map.len(), 3);
        assert_eq!(map[&id("C")], NextItem::End);
    }

    #[test]
    fn next_map_empty() {
        assert!(build_next_map(&OrderedResponse::default(), true).is_empty());
        assert!(build_next_map(&OrderedResponse::default(), false).is_empty());
    }

    #[test]
    fn prev_next_immediate() {
        let map = build_prev_next_sets(&resp(&["A", "B", "C"]), false);
        assert!(map[&id("A")].prev.is_empty());
        assert_eq!(map[&id("A")].next, ids(&["B"]));
        assert_eq!(map[&id("B")].prev, ids(&["A"]));
        assert_eq!(map[&id("B")].next, ids(&["C"]));
        assert!(map[&id("C")].next.is_empty());
    }

    #[test]
    fn prev_next_all() {
        let map = build_prev_next_sets(&resp(&["A", "B", "C", "D"]), true);
        assert_eq!(map[&id("C")].prev, ids(&["A", "B"]));
        assert_eq!(map[&id("C")].next, ids(&["D"]));
        assert_eq!(map[&id("A")].next.len(), 3);
        assert!(map[&id("D")].next.is_empty());
    }

    #[test]
    fn prev_next_single_item() {
        let map = build_prev_next_sets(&resp(&["A"]), false);
        assert_eq!(map[&id("A")], PrevNext::default());
    }

    #[test]
    fn ordered_subset_identity_is_everything() {
        let correct = resp(&["A", "B", "C", "D"]);
        assert_eq!(
            longest_ordered_subset(&correct, &correct, false),
            set(&[0, 1, 2, 3])
        );
        assert_eq!(
            longest_ordered_subset(&correct, &correct, true),
            set(&[0, 1, 2, 3])
        );
    }

    #[test]
    fn ordered_subset_allows_gaps() {
        let correct = resp(&["A", "B", "C", "D", "E"]);
        // ranks: 0 3 1 4 2 -> runs of length 3 start at 0; earliest is 0,3,4
        let current = resp(&["A", "D", "B", "E", "C"]);
        assert_eq!(
            longest_ordered_subset(&correct, &current, false),
            set(&[0, 1, 3])
        );
    }

    #[test]
    fn ordered_subset_ties_take_earliest_start() {
        let correct = resp(&["A", "B", "C", "D"]);
        // ranks: 2 3 0 1 -> runs {0,1} and {2,3}, both length 2
        let current = resp(&["C", "D", "A", "B"]);
        assert_eq!(longest_ordered_subset(&correct, &current, false), set(&[0, 1]));
        assert_eq!(longest_ordered_subset(&correct, &current, true), set(&[0, 1]));
    }

    #[test]
    fn contiguous_subset_requires_adjacent_steps() {
        let correct = resp(&["A", "B", "C", "D", "E"]);
        // ranks: 0 2 3 4 1 -> contiguous run 2,3,4 at positions 1..=3
        let current = resp(&["A", "C", "D", "E", "B"]);
        assert_eq!(longest_ordered_subset(&correct, &current, true), set(&[1, 2, 3]));
        // ordered mode can also take A in front
        assert_eq!(
            longest_ordered_subset(&correct, &current, false),
            set(&[0, 1, 2, 3])
        );
    }

    #[test]
    fn contiguous_subset_rejects_increasing_gaps() {
        let correct = resp(&["A", "B", "C", "D"]);
        // ranks: 0 2 1 3 -> no two adjacent positions step by one
        let current = resp(&["A", "C", "B", "D"]);
        assert_eq!(longest_ordered_subset(&correct, &current, true), set(&[0]));
    }

    #[test]
    fn reversed_order_yields_single_item() {
        let correct = resp(&["A", "B", "C"]);
        let current = resp(&["C", "B", "A"]);
        assert_eq!(longest_ordered_subset(&correct, &current, false), set(&[0]));
        assert_eq!(longest_ordered_subset(&correct, &current, true), set(&[0]));
    }

    #[test]
    fn unknown_items_never_join() {
        let correct = resp(&["A", "B", "C"]);
        let current = resp(&["X", "A", "Y", "B"]);
        assert_eq!(longest_ordered_subset(&correct, &current, false), set(&[1, 3]));
        assert_eq!(longest_ordered_subset(&correct, &current, true), set(&[1]));
    }

    #[test]
    fn vacant_slots_break_neighbour_relations() {
        let correct = resp(&["A", "B", "C", "D"]);
        let sub = OrderedResponse::from_submission(["A", "X", "C", "D"], &correct);

        let next = build_next_map(&sub.response, true);
        assert!(!next.contains_key(&id("A")));
        assert_eq!(next[&id("C")], NextItem::Item(id("D")));
        assert_eq!(next[&id("D")], NextItem::End);

        let sets = build_prev_next_sets(&sub.response, false);
        assert!(sets[&id("A")].next.is_empty());
        assert!(sets[&id("C")].prev.is_empty());
        assert_eq!(sets[&id("C")].next, ids(&["D"]));
        assert_eq!(sets.len(), 3);

        let all = build_prev_next_sets(&sub.response, true);
        assert_eq!(all[&id("D")].prev, ids(&["A", "C"]));

        // ranks: 0 - 2 3
        assert_eq!(
            longest_ordered_subset(&correct, &sub.response, false),
            set(&[0, 2, 3])
        );
        assert_eq!(
            longest_ordered_subset(&correct, &sub.response, true),
            set(&[2, 3])
        );
    }

    #[test]
    fn empty_current_yields_empty_subset() {
        let correct = resp(&["A", "B"]);
        let current = OrderedResponse::default();
        assert!(longest_ordered_subset(&correct, &current, false).is_empty());
        assert!(longest_ordered_subset(&correct, &current, true).is_empty());
    }
}
