//! # Cryo Event
//!
//! The sum type carried by the bus, and the [`EventPayload`] trait that lets
//! handlers work with one concrete record at a time.

use crate::base::BaseEvent;
use crate::kind::EventKind;
use crate::records::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A concrete record that corresponds to exactly one [`EventKind`].
///
/// Implemented for every record in [`crate::records`].
pub trait EventPayload: Sized + Send + Sync + 'static {
    /// The kind this record is published under.
    const KIND: EventKind;

    /// Borrow the record out of an erased event, if the variant matches.
    fn from_event(event: &CryoEvent) -> Option<&Self>;

    /// Wrap the record into the erased event.
    fn into_event(self) -> CryoEvent;

    /// The record's base fields.
    fn base(&self) -> &BaseEvent;
}

macro_rules! event_set {
    ($($variant:ident($record:ident)),+ $(,)?) => {
        /// Every event that can be published to the bus.
        ///
        /// Exactly one variant per [`EventKind`]; the variant name is the kind.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "kind", content = "event", rename_all = "snake_case")]
        pub enum CryoEvent {
            $($variant($record),)+
        }

        impl CryoEvent {
            /// The kind of this event, derived from the variant.
            #[must_use]
            pub fn kind(&self) -> EventKind {
                match self {
                    $(Self::$variant(_) => EventKind::$variant,)+
                }
            }

            /// Shared base fields.
            #[must_use]
            pub fn base(&self) -> &BaseEvent {
                match self {
                    $(Self::$variant(e) => &e.base,)+
                }
            }

            /// Mutable base fields, for middleware that annotates events.
            pub fn base_mut(&mut self) -> &mut BaseEvent {
                match self {
                    $(Self::$variant(e) => &mut e.base,)+
                }
            }
        }

        $(
            impl EventPayload for $record {
                const KIND: EventKind = EventKind::$variant;

                fn from_event(event: &CryoEvent) -> Option<&Self> {
                    match event {
                        CryoEvent::$variant(e) => Some(e),
                        _ => None,
                    }
                }

                fn into_event(self) -> CryoEvent {
                    CryoEvent::$variant(self)
                }

                fn base(&self) -> &BaseEvent {
                    &self.base
                }
            }

            impl From<$record> for CryoEvent {
                fn from(record: $record) -> Self {
                    CryoEvent::$variant(record)
                }
            }
        )+
    };
}

event_set! {
    PrivateMessage(PrivateMessageEvent),
    GroupMessage(GroupMessageEvent),
    TempMessage(TempMessageEvent),
    NewFriendRequest(NewFriendRequestEvent),
    NewFriend(NewFriendEvent),
    FriendRecall(FriendRecallEvent),
    FriendRename(FriendRenameEvent),
    FriendPoke(FriendPokeEvent),
    GroupMemberPermissionUpdated(GroupMemberPermissionUpdatedEvent),
    GroupNameUpdated(GroupNameUpdatedEvent),
    GroupMute(GroupMuteEvent),
    GroupRecall(GroupRecallEvent),
    GroupMemberJoinRequest(GroupMemberJoinRequestEvent),
    GroupMemberIncrease(GroupMemberIncreaseEvent),
    GroupMemberDecrease(GroupMemberDecreaseEvent),
    GroupDigest(GroupDigestEvent),
    GroupReaction(GroupReactionEvent),
    GroupMemberSpecialTitleUpdated(GroupMemberSpecialTitleUpdatedEvent),
    GroupInvite(GroupInviteEvent),
    BotConnected(BotConnectedEvent),
    BotDisconnected(BotDisconnectedEvent),
    Custom(CustomEvent),
}

impl CryoEvent {
    /// Unique event id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.base().id
    }

    /// Origin tags.
    #[must_use]
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.base().tags
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        &self.base().summary
    }

    /// Unix timestamp in seconds.
    #[must_use]
    pub fn time(&self) -> u64 {
        self.base().time
    }

    /// The message fields, for the three message kinds.
    #[must_use]
    pub fn message(&self) -> Option<&MessageFields> {
        match self {
            Self::PrivateMessage(e) => Some(&e.message),
            Self::GroupMessage(e) => Some(&e.message),
            Self::TempMessage(e) => Some(&e.message),
            _ => None,
        }
    }

    /// Borrow the concrete record, if this event is an `E`.
    #[must_use]
    pub fn downcast_ref<E: EventPayload>(&self) -> Option<&E> {
        E::from_event(self)
    }

    /// Serialize to JSON bytes.
    ///
    /// # Errors
    ///
    /// Fails only if a custom payload cannot be represented as JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Serialize to a JSON string.
    ///
    /// # Errors
    ///
    /// Same as [`CryoEvent::to_json`].
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
