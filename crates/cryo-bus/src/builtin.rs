//! # Built-in Middleware
//!
//! Pass-through transforms that log bus traffic. Each is switched on by a
//! [`BusConfig`] flag and never alters or vetoes an event.

use crate::config::BusConfig;
use crate::middleware::{inspect, Middleware};
use crate::registry::Registry;
use cryo_events::{CryoEvent, EventKind};
use tracing::{debug, info, warn};

/// Install whatever built-in middleware `config` enables.
///
/// The event debug middleware is attached to every kind explicitly, so it
/// also covers kinds nobody has subscribed to yet.
pub fn install_builtin_middleware(registry: &Registry, config: &BusConfig) {
    if config.enable_connect_print_middleware {
        registry.add_middleware(EventKind::BotConnected, [connect_print()]);
        registry.add_middleware(EventKind::BotDisconnected, [connect_print()]);
    }
    if config.enable_message_print_middleware {
        registry.add_middleware(EventKind::PrivateMessage, [message_print()]);
        registry.add_middleware(EventKind::GroupMessage, [message_print()]);
    }
    if config.enable_event_debug_middleware {
        let debug = event_debug();
        for kind in EventKind::ALL {
            registry.add_middleware(kind, [debug.clone()]);
        }
    }
}

/// Log bot connection changes.
#[must_use]
pub fn connect_print() -> Middleware {
    inspect(|event| match event {
        CryoEvent::BotConnected(e) => info!(
            nickname = %e.base.bot.nickname,
            bot_id = %e.base.bot.bot_id,
            uin = e.base.bot.uin,
            version = %e.version,
            "Bot connected"
        ),
        CryoEvent::BotDisconnected(e) => info!(
            nickname = %e.base.bot.nickname,
            bot_id = %e.base.bot.bot_id,
            uin = e.base.bot.uin,
            "Bot disconnected"
        ),
        _ => {}
    })
}

/// Log incoming private and group messages.
#[must_use]
pub fn message_print() -> Middleware {
    inspect(|event| match event {
        CryoEvent::PrivateMessage(e) => info!(
            bot = %e.base.bot.nickname,
            sender = %e.message.sender_nickname,
            sender_uin = e.message.sender_uin,
            content = %e.message.content,
            "[private]"
        ),
        CryoEvent::GroupMessage(e) => info!(
            bot = %e.base.bot.nickname,
            group = %e.group_name,
            group_uin = e.group_uin,
            sender = %e.message.sender_nickname,
            sender_uin = e.message.sender_uin,
            content = %e.message.content,
            "[group]"
        ),
        _ => {}
    })
}

/// Dump every event as JSON at debug level.
#[must_use]
pub fn event_debug() -> Middleware {
    inspect(|event| match event.to_json_string() {
        Ok(json) => debug!(kind = %event.kind(), %json, "Event"),
        Err(e) => warn!(kind = %event.kind(), error = %e, "Event could not be rendered as JSON"),
    })
}
