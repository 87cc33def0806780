//! Referendum-start detection over one batch of chain events.

use crate::domain::{ChainEvent, ReferendumIndex};

/// Pallet that emits referendum lifecycle events.
pub const DEMOCRACY_PALLET: &str = "Democracy";

/// Variant emitted when a referendum opens for voting.
pub const STARTED_VARIANT: &str = "Started";

const REF_INDEX_FIELD: &str = "ref_index";

/// Returns the index of the first referendum started in `batch`.
///
/// Only events tagged exactly `Democracy::Started` are considered; one
/// whose payload lacks a readable index is skipped. Later matches in the
/// same batch are ignored.
#[must_use]
pub fn find_referendum_started(batch: &[ChainEvent]) -> Option<ReferendumIndex> {
    batch
        .iter()
        .filter(|event| event.is(DEMOCRACY_PALLET, STARTED_VARIANT))
        .find_map(|event| {
            event
                .field(REF_INDEX_FIELD, 0)
                .and_then(ReferendumIndex::from_json)
        })
}

/// Counts the `Democracy::Started` events in `batch`, readable or not.
#[must_use]
pub fn count_referendum_started(batch: &[ChainEvent]) -> usize {
    batch
        .iter()
        .filter(|event| event.is(DEMOCRACY_PALLET, STARTED_VARIANT))
        .count()
}
