//! Ordered chat list: every known conversation in one total order.
//!
//! Rows hold a [`RecordHandle`] into the [`ConversationStore`] plus the
//! [`SortKey`] they were last placed with. The front of `rows` (up to
//! `settled`) is always sorted by that key, which lets [`OrderedList::reposition`]
//! find a row and its new slot with two binary searches. Rows pushed by
//! [`OrderedList::add_to_end`] out of order wait in an unsettled tail until
//! they are repositioned or the list is rebuilt.

use std::{collections::HashMap, num::NonZeroU32};

use thiserror::Error;

use super::{
    conversation::{ConversationRecord, ConversationStore, PeerId, RecordHandle, StoreError},
    sort_policy::{SortKey, SortPolicy},
};

const LIST_DUPLICATE_IDENTITY: &str = "CHAT_LIST_DUPLICATE_IDENTITY";
const LIST_ORDER_INVARIANT_BROKEN: &str = "CHAT_LIST_ORDER_INVARIANT_BROKEN";
const LIST_REBUILT: &str = "CHAT_LIST_REBUILT";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("conversation {0} is already in the chat list")]
    DuplicateIdentity(PeerId),
    #[error("conversation {0} is not in the chat list")]
    NotFound(PeerId),
    #[error("chat list out of order at position {position}: {before} sorts after {after}")]
    InvariantViolation {
        position: usize,
        before: PeerId,
        after: PeerId,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One entry of the chat list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    handle: RecordHandle,
    key: SortKey,
}

impl Row {
    pub fn peer_id(&self) -> PeerId {
        self.key.peer_id()
    }

    pub fn handle(&self) -> RecordHandle {
        self.handle
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_pinned(&self) -> bool {
        self.key.is_pinned()
    }

    pub fn pin_rank(&self) -> Option<NonZeroU32> {
        self.key.pin_rank()
    }

    pub fn record<'s>(
        &self,
        store: &'s ConversationStore,
    ) -> Result<&'s ConversationRecord, StoreError> {
        store.get(self.handle)
    }
}

#[derive(Debug)]
pub struct OrderedList {
    policy: SortPolicy,
    rows: Vec<Row>,
    settled: usize,
    index: HashMap<PeerId, SortKey>,
}

impl OrderedList {
    pub fn new(policy: SortPolicy) -> Self {
        Self {
            policy,
            rows: Vec::new(),
            settled: 0,
            index: HashMap::new(),
        }
    }

    pub fn policy(&self) -> SortPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, peer_id: PeerId) -> bool {
        self.index.contains_key(&peer_id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Appends a row at the physical end of the list.
    ///
    /// The row only joins the sorted part when it already belongs at the end;
    /// otherwise it stays at the tail until it is repositioned or the list is
    /// rebuilt.
    pub fn add_to_end(
        &mut self,
        store: &ConversationStore,
        handle: RecordHandle,
    ) -> Result<(), ListError> {
        let key = self.policy.key(store.get(handle)?);
        let peer_id = key.peer_id();

        if self.index.contains_key(&peer_id) {
            tracing::warn!(
                code = LIST_DUPLICATE_IDENTITY,
                peer_id = %peer_id,
                "rejected second row for an already listed conversation"
            );
            return Err(ListError::DuplicateIdentity(peer_id));
        }

        let extends_sorted_run = self.settled == self.rows.len()
            && self.rows.last().map_or(true, |last| last.key < key);
        if extends_sorted_run {
            self.settled += 1;
        }

        self.rows.push(Row { handle, key });
        self.index.insert(peer_id, key);
        Ok(())
    }

    pub fn get_row(&self, peer_id: PeerId) -> Result<&Row, ListError> {
        let position = self.locate(peer_id)?;
        Ok(&self.rows[position])
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn position(&self, peer_id: PeerId) -> Result<usize, ListError> {
        self.locate(peer_id)
    }

    /// Moves one row to where its record now belongs. Call it right after the
    /// record's timestamp, unread count or pin rank changed.
    pub fn reposition(
        &mut self,
        store: &ConversationStore,
        peer_id: PeerId,
    ) -> Result<(), ListError> {
        let from = self.locate(peer_id)?;
        let key = self.policy.key(store.get(self.rows[from].handle)?);

        let row = self.rows.remove(from);
        if from < self.settled {
            self.settled -= 1;
        }

        let to = self.rows[..self.settled].partition_point(|other| other.key < key);
        self.rows.insert(to, Row { key, ..row });
        self.settled += 1;
        self.index.insert(peer_id, key);

        self.check_order_around(to);
        Ok(())
    }

    /// Switches to `policy` and sorts every row from scratch.
    pub fn rebuild(
        &mut self,
        store: &ConversationStore,
        policy: SortPolicy,
    ) -> Result<(), ListError> {
        let keys = self
            .rows
            .iter()
            .map(|row| store.get(row.handle).map(|record| policy.key(record)))
            .collect::<Result<Vec<_>, _>>()?;

        for (row, key) in self.rows.iter_mut().zip(keys) {
            row.key = key;
        }
        self.rows.sort_unstable_by_key(|row| row.key);

        self.policy = policy;
        self.settled = self.rows.len();
        self.index = self.rows.iter().map(|row| (row.peer_id(), row.key)).collect();

        tracing::info!(
            code = LIST_REBUILT,
            policy = ?policy,
            rows = self.rows.len(),
            "chat list rebuilt"
        );
        Ok(())
    }

    pub fn remove(&mut self, peer_id: PeerId) -> Result<Row, ListError> {
        let position = self.locate(peer_id)?;
        let row = self.rows.remove(position);
        if position < self.settled {
            self.settled -= 1;
        }
        self.index.remove(&peer_id);

        Ok(row)
    }

    /// Rows appended by [`OrderedList::add_to_end`] that have not been placed
    /// yet. Zero whenever every row sits at its sorted position.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn unsettled(&self) -> usize {
        self.rows.len() - self.settled
    }

    /// Full scan of the sorted part. An unsettled tail is not an inversion, callers
    /// that need the whole list ordered check [`OrderedList::unsettled`] too.
    pub fn verify_order(&self) -> Result<(), ListError> {
        first_inversion(&self.rows[..self.settled], 0).map_or(Ok(()), Err)
    }

    fn locate(&self, peer_id: PeerId) -> Result<usize, ListError> {
        let key = self.index.get(&peer_id).ok_or(ListError::NotFound(peer_id))?;

        if let Ok(position) = self.rows[..self.settled].binary_search_by(|row| row.key.cmp(key)) {
            return Ok(position);
        }

        self.rows[self.settled..]
            .iter()
            .position(|row| row.peer_id() == peer_id)
            .map(|offset| self.settled + offset)
            .ok_or(ListError::NotFound(peer_id))
    }

    fn check_order_around(&self, position: usize) {
        if cfg!(debug_assertions) {
            if let Err(error) = self.verify_order() {
                panic!("{error}");
            }
            return;
        }

        if let Some(violation) = inversion_around(&self.rows[..self.settled], position) {
            tracing::error!(
                code = LIST_ORDER_INVARIANT_BROKEN,
                error = %violation,
                "chat list row landed out of order"
            );
        }
    }
}

/// Checks only the neighbours of `position`, so a single placement costs O(1).
fn inversion_around(rows: &[Row], position: usize) -> Option<ListError> {
    let start = position.saturating_sub(1);
    let end = (position + 2).min(rows.len());
    if start >= end {
        return None;
    }

    first_inversion(&rows[start..end], start)
}

/// First adjacent pair that is not strictly ascending. `offset` is the index
/// of `rows[0]` within the whole list.
fn first_inversion(rows: &[Row], offset: usize) -> Option<ListError> {
    rows.windows(2)
        .position(|pair| pair[0].key >= pair[1].key)
        .map(|index| ListError::InvariantViolation {
            position: offset + index,
            before: rows[index].peer_id(),
            after: rows[index + 1].peer_id(),
        })
}

impl<'a> IntoIterator for &'a OrderedList {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
