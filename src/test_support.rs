use std::num::NonZeroU32;

use crate::domain::{
    conversation::{ConversationRecord, ConversationStore, PeerId},
    ordered_list::OrderedList,
    sort_policy::SortPolicy,
};

const PEER_TITLES: [(i64, &str); 5] = [
    (1, "Mike"),
    (2, "John"),
    (3, "Adam"),
    (4, "Alex"),
    (5, "Bob"),
];

/// Strictly increasing millisecond clock so that every delivery is newer
/// than the previous one.
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    now_ms: i64,
}

impl Default for SimulatedClock {
    fn default() -> Self {
        Self {
            now_ms: 1_700_000_000_000,
        }
    }
}

impl SimulatedClock {
    pub fn tick(&mut self) -> i64 {
        self.now_ms += 1_000;
        self.now_ms
    }
}

/// Five conversations with ids 1..=5, created oldest to newest and appended
/// to the list in id order.
pub struct ChatListFixture {
    pub store: ConversationStore,
    pub list: OrderedList,
    clock: SimulatedClock,
}

impl ChatListFixture {
    pub fn five_peers(policy: SortPolicy) -> Self {
        let mut store = ConversationStore::new();
        let mut list = OrderedList::new(policy);
        let mut clock = SimulatedClock::default();

        for (id, title) in PEER_TITLES {
            let handle = store.insert(ConversationRecord::new(PeerId(id), title, clock.tick()));
            list.add_to_end(&store, handle)
                .expect("fixture peers must be unique");
        }

        Self { store, list, clock }
    }

    pub fn record_mut(&mut self, id: i64) -> &mut ConversationRecord {
        let handle = self
            .list
            .get_row(PeerId(id))
            .expect("fixture peer must be listed")
            .handle();
        self.store
            .get_mut(handle)
            .expect("fixture record must be live")
    }

    /// New message arrives now, adding `unread` unread messages.
    pub fn deliver(&mut self, id: i64, unread: u32) {
        let at_ms = self.clock.tick();
        let record = self.record_mut(id);
        record.touch(at_ms);
        record.add_unread(unread);
        self.reposition(id);
    }

    pub fn mark_read(&mut self, id: i64) {
        let at_ms = self.clock.tick();
        let record = self.record_mut(id);
        record.touch(at_ms);
        record.set_unread_count(0);
        self.reposition(id);
    }

    pub fn pin(&mut self, id: i64, rank: u32) {
        let rank = NonZeroU32::new(rank).expect("pin rank must be non-zero");
        self.record_mut(id).pin(rank);
        self.reposition(id);
    }

    pub fn unpin(&mut self, id: i64) {
        self.record_mut(id).unpin();
        self.reposition(id);
    }

    pub fn order(&self) -> Vec<i64> {
        self.list.iter().map(|row| row.peer_id().0).collect()
    }

    /// Every fixture peer is listed exactly once.
    pub fn assert_consistent(&self) {
        assert_eq!(self.list.len(), PEER_TITLES.len());

        let mut seen = [0; 5];
        for row in &self.list {
            seen[(row.peer_id().0 - 1) as usize] += 1;
        }

        assert_eq!(seen, [1; 5]);
    }

    fn reposition(&mut self, id: i64) {
        self.list
            .reposition(&self.store, PeerId(id))
            .expect("fixture peer must be listed");
    }
}
