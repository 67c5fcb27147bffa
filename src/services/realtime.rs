//! Push events for the admin inbox. Handlers depend on `RealtimeEmitter`; the HTTP layer
//! streams a `BroadcastHub` subscription to clients over SSE.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

pub const GLOBAL_ROOM: &str = "global";
const ROOM_CAPACITY: usize = 100;

pub mod events {
    pub const SMS: &str = "sms";
    pub const NEW_SMS: &str = "new-sms";
    pub const SEEN_UPDATED: &str = "seen-updated";
    pub const SEEN_INDIVIDUAL: &str = "seen-individual";
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RealtimeEvent {
    pub room: String,
    pub event: String,
    pub payload: Value,
}

pub trait RealtimeEmitter: Send + Sync {
    /// `room = None` targets every global subscriber.
    fn emit(&self, room: Option<&str>, event: &str, payload: Value);
}

#[derive(Clone, Default)]
pub struct BroadcastHub {
    rooms: Arc<RwLock<HashMap<String, broadcast::Sender<RealtimeEvent>>>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, room: Option<&str>) -> broadcast::Receiver<RealtimeEvent> {
        let room = room.unwrap_or(GLOBAL_ROOM).to_string();
        let mut rooms = self.rooms.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        rooms
            .entry(room)
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .subscribe()
    }
}

impl RealtimeEmitter for BroadcastHub {
    fn emit(&self, room: Option<&str>, event: &str, payload: Value) {
        let room = room.unwrap_or(GLOBAL_ROOM);
        let mut rooms = self.rooms.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(sender) = rooms.get(room) else {
            log::debug!("No subscribers in room {} for {}", room, event);
            return;
        };
        let message = RealtimeEvent {
            room: room.to_string(),
            event: event.to_string(),
            payload,
        };
        if sender.send(message).is_err() {
            // every receiver is gone
            rooms.remove(room);
        }
    }
}

/// Drops every event.
pub struct NoopEmitter;

impl RealtimeEmitter for NoopEmitter {
    fn emit(&self, _room: Option<&str>, _event: &str, _payload: Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn events_reach_only_their_room() {
        let hub = BroadcastHub::new();
        let mut room_a = hub.subscribe(Some("1"));
        let mut global = hub.subscribe(None);

        hub.emit(Some("1"), events::SMS, json!({ "message": "hi" }));
        hub.emit(None, events::NEW_SMS, json!({ "conversationId": 1 }));

        let got = room_a.recv().await.unwrap();
        assert_eq!(got.event, "sms");
        assert_eq!(got.payload["message"], "hi");
        assert!(room_a.try_recv().is_err());

        let got = global.recv().await.unwrap();
        assert_eq!(got.event, "new-sms");
        assert_eq!(got.room, GLOBAL_ROOM);
    }

    #[test]
    fn emitting_without_subscribers_is_silent() {
        let hub = BroadcastHub::new();
        hub.emit(Some("9"), events::SMS, json!({}));

        let rx = hub.subscribe(Some("9"));
        drop(rx);
        hub.emit(Some("9"), events::SMS, json!({}));
        assert!(hub.rooms.read().unwrap().get("9").is_none());
    }
}
