//! Conversation snapshot files: the initial chat list plus an ordered log
//! of activity to replay on top of it.
//!
//! ```toml
//! [[conversation]]
//! peer = 1
//! title = "Mike"
//! last_activity_ms = 1700000000000
//! unread = 0
//! pinned = 2
//!
//! [[event]]
//! kind = "message"
//! peer = 1
//! unread = 3
//! ```
//!
//! Events without `at_ms` are stamped with the load time plus their index in
//! the file, so later events always count as newer activity.

use std::{fs, num::NonZeroU32, path::Path};

use serde::Deserialize;

use crate::{
    domain::{
        conversation::{ConversationRecord, PeerId},
        events::ConversationEvent,
    },
    infra::error::AppError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub conversations: Vec<ConversationRecord>,
    pub events: Vec<ConversationEvent>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SnapshotFile {
    #[serde(default)]
    conversation: Vec<SnapshotConversation>,
    #[serde(default)]
    event: Vec<SnapshotEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotConversation {
    peer: i64,
    title: String,
    last_activity_ms: i64,
    #[serde(default)]
    unread: u32,
    pinned: Option<NonZeroU32>,
}

impl SnapshotConversation {
    fn into_record(self) -> ConversationRecord {
        let mut record =
            ConversationRecord::new(PeerId(self.peer), self.title, self.last_activity_ms);
        record.set_unread_count(self.unread);
        if let Some(rank) = self.pinned {
            record.pin(rank);
        }
        record
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SnapshotEvent {
    Created {
        peer: i64,
        title: String,
        at_ms: Option<i64>,
    },
    Message {
        peer: i64,
        at_ms: Option<i64>,
        #[serde(default)]
        unread: u32,
    },
    Touch {
        peer: i64,
        at_ms: Option<i64>,
    },
    Unread {
        peer: i64,
        count: u32,
    },
    Pin {
        peer: i64,
        rank: NonZeroU32,
    },
    Unpin {
        peer: i64,
    },
    Remove {
        peer: i64,
    },
}

impl SnapshotEvent {
    fn into_event(self, default_at_ms: i64) -> ConversationEvent {
        match self {
            Self::Created { peer, title, at_ms } => ConversationEvent::Created {
                peer_id: PeerId(peer),
                title,
                at_ms: at_ms.unwrap_or(default_at_ms),
            },
            Self::Message {
                peer,
                at_ms,
                unread,
            } => ConversationEvent::MessageArrived {
                peer_id: PeerId(peer),
                at_ms: at_ms.unwrap_or(default_at_ms),
                unread,
            },
            Self::Touch { peer, at_ms } => ConversationEvent::ActivityTouched {
                peer_id: PeerId(peer),
                at_ms: at_ms.unwrap_or(default_at_ms),
            },
            Self::Unread { peer, count } => ConversationEvent::UnreadChanged {
                peer_id: PeerId(peer),
                count,
            },
            Self::Pin { peer, rank } => ConversationEvent::Pinned {
                peer_id: PeerId(peer),
                rank,
            },
            Self::Unpin { peer } => ConversationEvent::Unpinned {
                peer_id: PeerId(peer),
            },
            Self::Remove { peer } => ConversationEvent::Removed {
                peer_id: PeerId(peer),
            },
        }
    }
}

pub fn load(path: &Path) -> Result<Snapshot, AppError> {
    let raw = fs::read_to_string(path).map_err(|source| AppError::SnapshotRead {
        path: path.to_path_buf(),
        source,
    })?;

    parse(&raw, chrono::Utc::now().timestamp_millis()).map_err(|source| AppError::SnapshotParse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse(raw: &str, now_ms: i64) -> Result<Snapshot, toml::de::Error> {
    let file: SnapshotFile = toml::from_str(raw)?;

    let conversations = file
        .conversation
        .into_iter()
        .map(SnapshotConversation::into_record)
        .collect();
    let events = file
        .event
        .into_iter()
        .enumerate()
        .map(|(index, event)| event.into_event(now_ms.saturating_add(index as i64)))
        .collect();

    Ok(Snapshot {
        conversations,
        events,
    })
}
