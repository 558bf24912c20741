use std::{cmp::Ordering, cmp::Reverse, fmt, num::NonZeroU32};

use serde::{Deserialize, Serialize};

use super::conversation::{ConversationRecord, PeerId};

/// Sort mode as chosen by the user and persisted in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Recency,
    UnreadFirst,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recency => "recency",
            Self::UnreadFirst => "unread_first",
        }
    }

    pub fn policy(self) -> SortPolicy {
        match self {
            Self::Recency => SortPolicy::ByRecency,
            Self::UnreadFirst => SortPolicy::ByUnreadThenRecency,
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison policy applied by the ordered chat list.
///
/// Every policy puts pinned conversations first, higher pin rank on top.
/// Unpinned conversations are then ordered by the policy key, and ties are
/// broken by most recent activity and finally by peer id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortPolicy {
    ByRecency,
    ByUnreadThenRecency,
}

impl SortPolicy {
    pub fn mode(self) -> SortMode {
        match self {
            Self::ByRecency => SortMode::Recency,
            Self::ByUnreadThenRecency => SortMode::UnreadFirst,
        }
    }

    pub fn key(self, record: &ConversationRecord) -> SortKey {
        let partition = match (self, record.pinned_rank()) {
            (Self::ByUnreadThenRecency, None) if record.is_unread() => 0,
            (Self::ByUnreadThenRecency, None) => 1,
            _ => 0,
        };

        SortKey {
            pin: Reverse(record.pinned_rank()),
            partition,
            recency: Reverse(record.last_activity_ms()),
            peer_id: record.peer_id(),
        }
    }

    /// `Less` means `left` is shown above `right`.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn compare(self, left: &ConversationRecord, right: &ConversationRecord) -> Ordering {
        self.key(left).cmp(&self.key(right))
    }
}

impl From<SortMode> for SortPolicy {
    fn from(mode: SortMode) -> Self {
        mode.policy()
    }
}

/// Position key of a row under one policy. Ascending order is front to back.
///
/// Field order is significant: the derived `Ord` compares pin band first,
/// then the unread partition, then recency, then identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey {
    pin: Reverse<Option<NonZeroU32>>,
    partition: u8,
    recency: Reverse<i64>,
    peer_id: PeerId,
}

impl SortKey {
    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn pin_rank(&self) -> Option<NonZeroU32> {
        self.pin.0
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_pinned(&self) -> bool {
        self.pin.0.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, at_ms: i64, unread: u32, pin: Option<u32>) -> ConversationRecord {
        let mut record = ConversationRecord::new(PeerId(id), format!("peer-{id}"), at_ms);
        record.set_unread_count(unread);
        if let Some(rank) = pin.and_then(NonZeroU32::new) {
            record.pin(rank);
        }
        record
    }

    #[test]
    fn recency_puts_newest_activity_first() {
        let older = record(1, 1_000, 0, None);
        let newer = record(2, 2_000, 0, None);

        assert_eq!(
            SortPolicy::ByRecency.compare(&newer, &older),
            Ordering::Less
        );
    }

    #[test]
    fn recency_ignores_unread_state() {
        let unread_older = record(1, 1_000, 5, None);
        let read_newer = record(2, 2_000, 0, None);

        assert_eq!(
            SortPolicy::ByRecency.compare(&read_newer, &unread_older),
            Ordering::Less
        );
    }

    #[test]
    fn unread_first_puts_unread_before_newer_read() {
        let unread_older = record(1, 1_000, 1, None);
        let read_newer = record(2, 2_000, 0, None);

        assert_eq!(
            SortPolicy::ByUnreadThenRecency.compare(&unread_older, &read_newer),
            Ordering::Less
        );
    }

    #[test]
    fn unread_first_falls_back_to_recency_within_partition() {
        let a = record(1, 1_000, 3, None);
        let b = record(2, 2_000, 1, None);

        assert_eq!(
            SortPolicy::ByUnreadThenRecency.compare(&b, &a),
            Ordering::Less
        );
    }

    #[test]
    fn pinned_precede_unpinned_under_every_policy() {
        let pinned_old_read = record(1, 1, 0, Some(1));
        let unpinned_new_unread = record(2, 9_000, 4, None);

        for policy in [SortPolicy::ByRecency, SortPolicy::ByUnreadThenRecency] {
            assert_eq!(
                policy.compare(&pinned_old_read, &unpinned_new_unread),
                Ordering::Less
            );
        }
    }

    #[test]
    fn higher_pin_rank_sits_on_top_regardless_of_activity() {
        let rank_two = record(3, 1_000, 0, Some(2));
        let rank_one = record(5, 9_000, 7, Some(1));

        for policy in [SortPolicy::ByRecency, SortPolicy::ByUnreadThenRecency] {
            assert_eq!(policy.compare(&rank_two, &rank_one), Ordering::Less);
        }
    }

    #[test]
    fn identity_breaks_full_ties() {
        let a = record(1, 1_000, 2, None);
        let b = record(2, 1_000, 2, None);

        assert_eq!(
            SortPolicy::ByUnreadThenRecency.compare(&a, &b),
            Ordering::Less
        );
        assert_eq!(SortPolicy::ByRecency.compare(&b, &a), Ordering::Greater);
        assert_eq!(SortPolicy::ByRecency.compare(&a, &a), Ordering::Equal);
    }

    #[test]
    fn sort_mode_and_policy_map_both_ways() {
        for mode in [SortMode::Recency, SortMode::UnreadFirst] {
            assert_eq!(SortPolicy::from(mode).mode(), mode);
        }
    }
}
