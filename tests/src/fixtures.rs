//! # Test Fixtures
//!
//! Event builders mirroring what a protocol adapter would produce.

use cryo_bus::{EventBus, NO_TAGS};
use cryo_events::{
    BaseEvent, BotConnectedEvent, BotIdentity, CryoEvent, CustomEvent, EventKind, EventPayload,
    GroupMessageEvent, GroupMuteEvent, MessageFields, PrivateMessageEvent,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn test_bot() -> BotIdentity {
    BotIdentity {
        bot_id: "bot-1".to_string(),
        nickname: "cryo".to_string(),
        uin: 10_001,
        uid: "u_bot".to_string(),
        platform: "linux".to_string(),
    }
}

pub fn private_message(id: &str, content: &str) -> PrivateMessageEvent {
    PrivateMessageEvent {
        base: BaseEvent::new(["private_message", "message"], "PrivateMessageEvent")
            .with_id(id)
            .with_bot(test_bot()),
        message: MessageFields {
            message_id: 1,
            sender_uin: 20_002,
            sender_uid: "u_alice".to_string(),
            sender_nickname: "alice".to_string(),
            content: content.to_string(),
            ..MessageFields::default()
        },
        internal_id: 7,
        client_seq: 1,
        target_uin: 10_001,
    }
}

pub fn group_message(id: &str, content: &str) -> GroupMessageEvent {
    GroupMessageEvent {
        base: BaseEvent::new(["group_message", "message"], "GroupMessageEvent")
            .with_id(id)
            .with_bot(test_bot()),
        message: MessageFields {
            message_id: 2,
            sender_uin: 30_003,
            sender_nickname: "bob".to_string(),
            content: content.to_string(),
            ..MessageFields::default()
        },
        internal_id: 9,
        group_uin: 40_004,
        group_name: "rustaceans".to_string(),
    }
}

pub fn group_mute(id: &str) -> GroupMuteEvent {
    GroupMuteEvent {
        base: BaseEvent::new(["group_mute", "group"], "GroupMuteEvent")
            .with_id(id)
            .with_bot(test_bot()),
        group_uin: 40_004,
        operator_uin: 30_003,
        operator_uid: "u_bob".to_string(),
        target_uin: 20_002,
        target_uid: "u_alice".to_string(),
        duration: 600,
        is_mute_all: false,
    }
}

pub fn bot_connected() -> CryoEvent {
    BotConnectedEvent {
        base: BaseEvent::new(["system", "bot"], "BotConnectedEvent")
            .with_bot(test_bot()),
        version: "1.0.0".to_string(),
    }
    .into_event()
}

pub fn custom(name: &str, payload: serde_json::Value) -> CustomEvent {
    CustomEvent {
        base: BaseEvent::new(["custom"], name),
        name: name.to_string(),
        payload,
    }
}

/// Subscribe a handler that only counts invocations.
pub fn counting_subscriber(bus: &EventBus, kind: EventKind) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    bus.subscribe(
        kind,
        move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        },
        NO_TAGS,
    );
    count
}
