//! # Event Records
//!
//! One concrete record per [`EventKind`](crate::EventKind). Every record
//! embeds a [`BaseEvent`] as `base`.

use crate::base::BaseEvent;
use serde::{Deserialize, Serialize};

// =============================================================================
// MESSAGES
// =============================================================================

/// Fields shared by the three message records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFields {
    pub message_id: u32,
    pub sender_uin: u32,
    pub sender_uid: String,
    pub sender_nickname: String,
    pub sender_cardname: String,
    pub is_sender_friend: bool,
    /// Plain-text rendering of the message elements.
    pub content: String,
}

/// A one-to-one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateMessageEvent {
    pub base: BaseEvent,
    pub message: MessageFields,
    pub internal_id: u32,
    pub client_seq: u32,
    pub target_uin: u32,
}

/// A message posted in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMessageEvent {
    pub base: BaseEvent,
    pub message: MessageFields,
    pub internal_id: u32,
    pub group_uin: u32,
    pub group_name: String,
}

/// A temporary session message started from a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempMessageEvent {
    pub base: BaseEvent,
    pub message: MessageFields,
    pub internal_id: u32,
    pub from_group_uin: u32,
    pub from_group_name: String,
}

// =============================================================================
// FRIENDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFriendRequestEvent {
    pub base: BaseEvent,
    pub uin: u32,
    pub uid: String,
    pub nickname: String,
    pub message: String,
    /// Where the request came from (search, group, ...).
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFriendEvent {
    pub base: BaseEvent,
    pub uin: u32,
    pub uid: String,
    pub nickname: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRecallEvent {
    pub base: BaseEvent,
    pub uin: u32,
    pub uid: String,
    pub sequence: u64,
    pub random: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRenameEvent {
    pub base: BaseEvent,
    /// True when the bot account itself was renamed.
    pub is_self: bool,
    pub uin: u32,
    pub uid: String,
    pub nickname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendPokeEvent {
    pub base: BaseEvent,
    pub sender_uin: u32,
    pub target_uin: u32,
    pub suffix: String,
    pub action: String,
}

// =============================================================================
// GROUPS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMemberPermissionUpdatedEvent {
    pub base: BaseEvent,
    pub group_uin: u32,
    pub uin: u32,
    pub uid: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupNameUpdatedEvent {
    pub base: BaseEvent,
    pub group_uin: u32,
    /// Operator who changed the name.
    pub uin: u32,
    pub uid: String,
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMuteEvent {
    pub base: BaseEvent,
    pub group_uin: u32,
    pub operator_uin: u32,
    pub operator_uid: String,
    pub target_uin: u32,
    pub target_uid: String,
    /// Mute duration in seconds, zero when lifted.
    pub duration: u32,
    pub is_mute_all: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecallEvent {
    pub base: BaseEvent,
    pub group_uin: u32,
    pub operator_uin: u32,
    pub operator_uid: String,
    pub sender_uin: u32,
    pub sender_uid: String,
    pub sequence: u64,
    pub random: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMemberJoinRequestEvent {
    pub base: BaseEvent,
    pub group_uin: u32,
    pub sender_uin: u32,
    pub sender_uid: String,
    pub sender_nickname: String,
    pub inviter_uin: u32,
    pub inviter_uid: String,
    pub answer: String,
    pub request_sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMemberIncreaseEvent {
    pub base: BaseEvent,
    pub group_uin: u32,
    pub uin: u32,
    pub uid: String,
    pub inviter_uin: u32,
    pub inviter_uid: String,
    pub is_self: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMemberDecreaseEvent {
    pub base: BaseEvent,
    pub group_uin: u32,
    pub uin: u32,
    pub uid: String,
    pub is_self: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDigestEvent {
    pub base: BaseEvent,
    pub group_uin: u32,
    pub message_id: String,
    pub internal_id: u32,
    pub sender_uin: u32,
    pub sender_uid: String,
    pub sender_nickname: String,
    pub operator_uin: u32,
    pub operator_uid: String,
    pub operator_nickname: String,
    pub is_remove: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReactionEvent {
    pub base: BaseEvent,
    pub group_uin: u32,
    pub uin: u32,
    pub uid: String,
    pub target_seq: u32,
    pub is_add: bool,
    pub is_emoji: bool,
    pub code: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMemberSpecialTitleUpdatedEvent {
    pub base: BaseEvent,
    pub group_uin: u32,
    pub uin: u32,
    pub uid: String,
    pub new_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInviteEvent {
    pub base: BaseEvent,
    pub group_uin: u32,
    pub group_name: String,
    pub inviter_uin: u32,
    pub inviter_uid: String,
    pub inviter_nickname: String,
    pub request_sequence: u64,
}

// =============================================================================
// CONNECTION
// =============================================================================

/// A bot connection came up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConnectedEvent {
    pub base: BaseEvent,
    /// Protocol client version string.
    pub version: String,
}

/// A bot connection went away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotDisconnectedEvent {
    pub base: BaseEvent,
}

// =============================================================================
// APPLICATION
// =============================================================================

/// Application-defined event with an arbitrary JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEvent {
    pub base: BaseEvent,
    /// Application-level name, used to tell custom events apart.
    pub name: String,
    pub payload: serde_json::Value,
}
