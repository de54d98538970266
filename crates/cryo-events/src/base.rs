//! # Base Event
//!
//! Identity fields shared by every event record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// The bot connection an event originated from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotIdentity {
    /// Local identifier of the bot client.
    pub bot_id: String,
    /// Display name of the bot account.
    pub nickname: String,
    /// Numeric account id.
    pub uin: u32,
    /// Opaque account uid.
    pub uid: String,
    /// Protocol platform the client is logged in as.
    pub platform: String,
}

/// Fields every event carries.
///
/// The kind is not stored here: it is the [`CryoEvent`](crate::CryoEvent)
/// variant the record is wrapped in. The bus never rewrites `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseEvent {
    /// Unique event id (uuid v4).
    pub id: String,
    /// Origin tags, e.g. `{"message", "group_message"}`.
    pub tags: BTreeSet<String>,
    /// The bot the event came from.
    pub bot: BotIdentity,
    /// Human-readable summary.
    pub summary: String,
    /// Unix timestamp in seconds.
    pub time: u64,
}

impl BaseEvent {
    /// Create a base with a fresh id and the current time.
    #[must_use]
    pub fn new<I, S>(tags: I, summary: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: Uuid::new_v4().to_string(),
            tags: tags.into_iter().map(Into::into).collect(),
            bot: BotIdentity::default(),
            summary: summary.into(),
            time: unix_now(),
        }
    }

    /// Replace the generated id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Attach the originating bot.
    #[must_use]
    pub fn with_bot(mut self, bot: BotIdentity) -> Self {
        self.bot = bot;
        self
    }

    /// Override the timestamp (protocol events carry their own).
    #[must_use]
    pub fn with_time(mut self, time: u64) -> Self {
        self.time = time;
        self
    }

    /// Whether the event carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Seconds since the unix epoch; zero if the clock is before it.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
