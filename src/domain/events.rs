use std::num::NonZeroU32;

use super::conversation::PeerId;

/// Conversation activity coming from the messaging layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEvent {
    Created {
        peer_id: PeerId,
        title: String,
        at_ms: i64,
    },
    /// A message arrived at `at_ms`, adding `unread` unread messages
    /// (zero for outgoing or already seen messages).
    MessageArrived {
        peer_id: PeerId,
        at_ms: i64,
        unread: u32,
    },
    ActivityTouched {
        peer_id: PeerId,
        at_ms: i64,
    },
    UnreadChanged {
        peer_id: PeerId,
        count: u32,
    },
    Pinned {
        peer_id: PeerId,
        rank: NonZeroU32,
    },
    Unpinned {
        peer_id: PeerId,
    },
    Removed {
        peer_id: PeerId,
    },
}

impl ConversationEvent {
    pub fn peer_id(&self) -> PeerId {
        match self {
            Self::Created { peer_id, .. }
            | Self::MessageArrived { peer_id, .. }
            | Self::ActivityTouched { peer_id, .. }
            | Self::UnreadChanged { peer_id, .. }
            | Self::Pinned { peer_id, .. }
            | Self::Unpinned { peer_id }
            | Self::Removed { peer_id } => *peer_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::MessageArrived { .. } => "message_arrived",
            Self::ActivityTouched { .. } => "activity_touched",
            Self::UnreadChanged { .. } => "unread_changed",
            Self::Pinned { .. } => "pinned",
            Self::Unpinned { .. } => "unpinned",
            Self::Removed { .. } => "removed",
        }
    }
}
