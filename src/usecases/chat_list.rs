use std::num::NonZeroU32;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::domain::{
    conversation::{ConversationRecord, ConversationStore, PeerId, StoreError},
    events::ConversationEvent,
    ordered_list::{ListError, OrderedList},
    sort_policy::SortMode,
};

use super::contracts::SettingsGateway;

const CHAT_LIST_STALE_ACTIVITY: &str = "CHAT_LIST_STALE_ACTIVITY";
const CHAT_LIST_SORT_MODE_CHANGED: &str = "CHAT_LIST_SORT_MODE_CHANGED";
const CHAT_LIST_PIN_RANK_TAKEN: &str = "CHAT_LIST_PIN_RANK_TAKEN";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatListError {
    #[error(transparent)]
    List(#[from] ListError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("pin rank {rank} is already held by conversation {holder}")]
    PinRankTaken { rank: NonZeroU32, holder: PeerId },
}

/// Owns the conversation records and keeps the chat list ordered as they
/// change. Every record mutation is followed by a reposition of its row
/// before control returns to the caller.
#[derive(Debug)]
pub struct ChatListService {
    store: ConversationStore,
    list: OrderedList,
}

impl ChatListService {
    pub fn new(mode: SortMode) -> Self {
        Self {
            store: ConversationStore::new(),
            list: OrderedList::new(mode.policy()),
        }
    }

    pub fn sort_mode(&self) -> SortMode {
        self.list.policy().mode()
    }

    pub fn list(&self) -> &OrderedList {
        &self.list
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Initial population: appends every record, then sorts once.
    ///
    /// A rejected record stops population; the records admitted before it
    /// stay listed and sorted.
    pub fn populate(
        &mut self,
        records: impl IntoIterator<Item = ConversationRecord>,
    ) -> Result<(), ChatListError> {
        let admitted = records
            .into_iter()
            .try_for_each(|record| self.admit(record));

        self.list.rebuild(&self.store, self.list.policy())?;
        admitted
    }

    pub fn apply(&mut self, event: ConversationEvent) -> Result<(), ChatListError> {
        tracing::debug!(
            peer_id = %event.peer_id(),
            kind = event.kind(),
            "applying conversation event"
        );

        match event {
            ConversationEvent::Created {
                peer_id,
                title,
                at_ms,
            } => self.create(ConversationRecord::new(peer_id, title, at_ms)),
            ConversationEvent::MessageArrived {
                peer_id,
                at_ms,
                unread,
            } => self.mutate(peer_id, |record| {
                touch_or_log(record, at_ms);
                record.add_unread(unread);
            }),
            ConversationEvent::ActivityTouched { peer_id, at_ms } => {
                self.mutate(peer_id, |record| touch_or_log(record, at_ms))
            }
            ConversationEvent::UnreadChanged { peer_id, count } => {
                self.mutate(peer_id, |record| record.set_unread_count(count))
            }
            ConversationEvent::Pinned { peer_id, rank } => {
                self.list.get_row(peer_id)?;
                self.ensure_rank_free(peer_id, rank)?;
                self.mutate(peer_id, |record| record.pin(rank))
            }
            ConversationEvent::Unpinned { peer_id } => {
                self.mutate(peer_id, |record| record.unpin())
            }
            ConversationEvent::Removed { peer_id } => {
                let row = self.list.remove(peer_id)?;
                self.store.remove(row.handle())?;
                Ok(())
            }
        }
    }

    /// Persists `mode` and reorders the live list under it.
    pub fn change_sort_mode(
        &mut self,
        settings: &mut dyn SettingsGateway,
        mode: SortMode,
    ) -> Result<()> {
        let previous = self.sort_mode();
        if previous == mode {
            return Ok(());
        }

        settings
            .save_sort_mode(mode)
            .with_context(|| format!("failed to persist sort mode `{mode}`"))?;
        self.list.rebuild(&self.store, mode.policy())?;

        tracing::info!(
            code = CHAT_LIST_SORT_MODE_CHANGED,
            from = %previous,
            to = %mode,
            "chat list sort mode changed"
        );
        Ok(())
    }

    /// Records in display order, front to back.
    pub fn records(&self) -> Result<Vec<&ConversationRecord>, ChatListError> {
        self.list
            .iter()
            .map(|row| row.record(&self.store).map_err(ChatListError::from))
            .collect()
    }

    fn admit(&mut self, record: ConversationRecord) -> Result<(), ChatListError> {
        if let Some(rank) = record.pinned_rank() {
            self.ensure_rank_free(record.peer_id(), rank)?;
        }

        let handle = self.store.insert(record);
        if let Err(error) = self.list.add_to_end(&self.store, handle) {
            self.store.remove(handle)?;
            return Err(error.into());
        }
        Ok(())
    }

    /// Pin ranks are unique across the list; `peer_id` may keep its own.
    fn ensure_rank_free(&self, peer_id: PeerId, rank: NonZeroU32) -> Result<(), ChatListError> {
        let holder = self
            .list
            .iter()
            .find(|row| row.pin_rank() == Some(rank) && row.peer_id() != peer_id);

        match holder {
            Some(holder) => {
                tracing::warn!(
                    code = CHAT_LIST_PIN_RANK_TAKEN,
                    peer_id = %peer_id,
                    rank = rank.get(),
                    holder = %holder.peer_id(),
                    "rejected pin rank already held by another conversation"
                );
                Err(ChatListError::PinRankTaken {
                    rank,
                    holder: holder.peer_id(),
                })
            }
            None => Ok(()),
        }
    }

    fn create(&mut self, record: ConversationRecord) -> Result<(), ChatListError> {
        let peer_id = record.peer_id();
        if self.list.contains(peer_id) {
            return Err(ListError::DuplicateIdentity(peer_id).into());
        }

        let handle = self.store.insert(record);
        self.list.add_to_end(&self.store, handle)?;
        self.list.reposition(&self.store, peer_id)?;
        Ok(())
    }

    fn mutate(
        &mut self,
        peer_id: PeerId,
        change: impl FnOnce(&mut ConversationRecord),
    ) -> Result<(), ChatListError> {
        let handle = self.list.get_row(peer_id)?.handle();
        change(self.store.get_mut(handle)?);
        self.list.reposition(&self.store, peer_id)?;
        Ok(())
    }
}

fn touch_or_log(record: &mut ConversationRecord, at_ms: i64) {
    if !record.touch(at_ms) {
        tracing::debug!(
            code = CHAT_LIST_STALE_ACTIVITY,
            peer_id = %record.peer_id(),
            at_ms,
            current_ms = record.last_activity_ms(),
            "ignored activity older than the current timestamp"
        );
    }
}
