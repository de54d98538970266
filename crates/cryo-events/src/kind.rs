//! # Event Kinds
//!
//! The discriminator that selects a record shape and the subscriber and
//! middleware lists that apply to an event.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returned when a string does not name a known [`EventKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown event kind: {0}")]
pub struct UnknownEventKind(pub String);

/// Every kind of event that can travel over the bus.
///
/// The set is closed: adding a kind means adding a record in
/// [`crate::records`] and a variant in [`crate::CryoEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    // =========================================================================
    // MESSAGES
    // =========================================================================
    /// A one-to-one message.
    PrivateMessage,
    /// A message posted in a group.
    GroupMessage,
    /// A temporary session message started from a group.
    TempMessage,

    // =========================================================================
    // FRIENDS
    // =========================================================================
    /// Someone asked to become a friend.
    NewFriendRequest,
    /// A friendship was established.
    NewFriend,
    /// A friend recalled a message.
    FriendRecall,
    /// A friend changed nickname.
    FriendRename,
    /// A friend sent a poke.
    FriendPoke,

    // =========================================================================
    // GROUPS
    // =========================================================================
    /// A member gained or lost admin rights.
    GroupMemberPermissionUpdated,
    /// The group was renamed.
    GroupNameUpdated,
    /// A member (or the whole group) was muted.
    GroupMute,
    /// A group message was recalled.
    GroupRecall,
    /// Someone asked to join a group.
    GroupMemberJoinRequest,
    /// A member joined.
    GroupMemberIncrease,
    /// A member left or was removed.
    GroupMemberDecrease,
    /// A message was added to or removed from the digest.
    GroupDigest,
    /// A reaction was added to or removed from a message.
    GroupReaction,
    /// A member's special title changed.
    GroupMemberSpecialTitleUpdated,
    /// The bot was invited into a group.
    GroupInvite,

    // =========================================================================
    // CONNECTION
    // =========================================================================
    /// A bot connection came up.
    BotConnected,
    /// A bot connection went away.
    BotDisconnected,

    // =========================================================================
    // APPLICATION
    // =========================================================================
    /// Application-defined payload.
    Custom,
}

impl EventKind {
    /// All kinds, in declaration order.
    pub const ALL: [EventKind; 22] = [
        EventKind::PrivateMessage,
        EventKind::GroupMessage,
        EventKind::TempMessage,
        EventKind::NewFriendRequest,
        EventKind::NewFriend,
        EventKind::FriendRecall,
        EventKind::FriendRename,
        EventKind::FriendPoke,
        EventKind::GroupMemberPermissionUpdated,
        EventKind::GroupNameUpdated,
        EventKind::GroupMute,
        EventKind::GroupRecall,
        EventKind::GroupMemberJoinRequest,
        EventKind::GroupMemberIncrease,
        EventKind::GroupMemberDecrease,
        EventKind::GroupDigest,
        EventKind::GroupReaction,
        EventKind::GroupMemberSpecialTitleUpdated,
        EventKind::GroupInvite,
        EventKind::BotConnected,
        EventKind::BotDisconnected,
        EventKind::Custom,
    ];

    /// Kinds that carry a chat message.
    pub const MESSAGES: [EventKind; 3] = [
        EventKind::PrivateMessage,
        EventKind::GroupMessage,
        EventKind::TempMessage,
    ];

    /// Snake-case name, identical to the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PrivateMessage => "private_message",
            Self::GroupMessage => "group_message",
            Self::TempMessage => "temp_message",
            Self::NewFriendRequest => "new_friend_request",
            Self::NewFriend => "new_friend",
            Self::FriendRecall => "friend_recall",
            Self::FriendRename => "friend_rename",
            Self::FriendPoke => "friend_poke",
            Self::GroupMemberPermissionUpdated => "group_member_permission_updated",
            Self::GroupNameUpdated => "group_name_updated",
            Self::GroupMute => "group_mute",
            Self::GroupRecall => "group_recall",
            Self::GroupMemberJoinRequest => "group_member_join_request",
            Self::GroupMemberIncrease => "group_member_increase",
            Self::GroupMemberDecrease => "group_member_decrease",
            Self::GroupDigest => "group_digest",
            Self::GroupReaction => "group_reaction",
            Self::GroupMemberSpecialTitleUpdated => "group_member_special_title_updated",
            Self::GroupInvite => "group_invite",
            Self::BotConnected => "bot_connected",
            Self::BotDisconnected => "bot_disconnected",
            Self::Custom => "custom",
        }
    }

    /// Whether this kind carries a chat message.
    #[must_use]
    pub fn is_message(self) -> bool {
        Self::MESSAGES.contains(&self)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}
