use std::{fmt, num::NonZeroU32};

use thiserror::Error;

/// Stable identity of a conversation partner (user, group or channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerId(pub i64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The facts about one conversation that decide where it sits in the chat list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRecord {
    peer_id: PeerId,
    title: String,
    last_activity_ms: i64,
    unread_count: u32,
    pinned_rank: Option<NonZeroU32>,
}

impl ConversationRecord {
    pub fn new(peer_id: PeerId, title: impl Into<String>, last_activity_ms: i64) -> Self {
        Self {
            peer_id,
            title: title.into(),
            last_activity_ms,
            unread_count: 0,
            pinned_rank: None,
        }
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn last_activity_ms(&self) -> i64 {
        self.last_activity_ms
    }

    pub fn unread_count(&self) -> u32 {
        self.unread_count
    }

    pub fn is_unread(&self) -> bool {
        self.unread_count > 0
    }

    pub fn pinned_rank(&self) -> Option<NonZeroU32> {
        self.pinned_rank
    }

    /// Moves the activity timestamp forward. Older timestamps are ignored and
    /// reported back as `false`.
    pub fn touch(&mut self, at_ms: i64) -> bool {
        if at_ms < self.last_activity_ms {
            return false;
        }

        self.last_activity_ms = at_ms;
        true
    }

    pub fn add_unread(&mut self, count: u32) {
        self.unread_count = self.unread_count.saturating_add(count);
    }

    pub fn set_unread_count(&mut self, count: u32) {
        self.unread_count = count;
    }

    pub fn pin(&mut self, rank: NonZeroU32) {
        self.pinned_rank = Some(rank);
    }

    pub fn unpin(&mut self) {
        self.pinned_rank = None;
    }
}

/// Index into a [`ConversationStore`]. Handles of removed records go stale and
/// are rejected instead of aliasing a newer record in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordHandle {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record handle {0:?} no longer points at a live conversation")]
    StaleHandle(RecordHandle),
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    record: Option<ConversationRecord>,
}

/// Arena owning every conversation record. The chat list only ever keeps
/// handles into it.
#[derive(Debug, Default)]
pub struct ConversationStore {
    slots: Vec<Slot>,
    free: Vec<usize>,
    len: usize,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn len(&self) -> usize {
        self.len
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, record: ConversationRecord) -> RecordHandle {
        self.len += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.record = Some(record);
            return RecordHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            record: Some(record),
        });

        RecordHandle {
            index,
            generation: 0,
        }
    }

    pub fn get(&self, handle: RecordHandle) -> Result<&ConversationRecord, StoreError> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.record.as_ref())
            .ok_or(StoreError::StaleHandle(handle))
    }

    pub fn get_mut(&mut self, handle: RecordHandle) -> Result<&mut ConversationRecord, StoreError> {
        self.slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.record.as_mut())
            .ok_or(StoreError::StaleHandle(handle))
    }

    pub fn remove(&mut self, handle: RecordHandle) -> Result<ConversationRecord, StoreError> {
        let slot = self
            .slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .ok_or(StoreError::StaleHandle(handle))?;
        let record = slot.record.take().ok_or(StoreError::StaleHandle(handle))?;

        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64) -> ConversationRecord {
        ConversationRecord::new(PeerId(id), format!("peer-{id}"), 1_000)
    }

    #[test]
    fn touch_ignores_older_timestamps() {
        let mut record = record(1);

        assert!(record.touch(2_000));
        assert!(!record.touch(1_500));

        assert_eq!(record.last_activity_ms(), 2_000);
    }

    #[test]
    fn unread_and_pin_state_round_out_the_record() {
        let mut record = record(1);

        record.add_unread(2);
        record.add_unread(3);
        record.pin(NonZeroU32::new(4).expect("non-zero"));

        assert_eq!(record.unread_count(), 5);
        assert!(record.is_unread());
        assert_eq!(record.pinned_rank().map(NonZeroU32::get), Some(4));

        record.set_unread_count(0);
        record.unpin();

        assert!(!record.is_unread());
        assert_eq!(record.pinned_rank(), None);
    }

    #[test]
    fn store_reuses_slots_without_reviving_stale_handles() {
        let mut store = ConversationStore::new();
        let first = store.insert(record(1));

        let removed = store.remove(first).expect("record should be removable");
        assert_eq!(removed.peer_id(), PeerId(1));

        let second = store.insert(record(2));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(first), Err(StoreError::StaleHandle(first)));
        assert_eq!(store.get(second).map(|r| r.peer_id()), Ok(PeerId(2)));
    }

    #[test]
    fn removing_twice_reports_stale_handle() {
        let mut store = ConversationStore::new();
        let handle = store.insert(record(1));

        store.remove(handle).expect("first removal succeeds");

        assert_eq!(store.remove(handle), Err(StoreError::StaleHandle(handle)));
        assert!(store.is_empty());
    }
}
