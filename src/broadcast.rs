//! Publishing formation events to connected clients.
//!
//! The engines only append events to the session; nothing depends on a transport being present.

use crate::models::{FormationEvent, SessionId};
use serde::Serialize;
use tokio::sync::broadcast;

/// An event tagged with the session it came from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionEvent {
    pub session_id: SessionId,
    #[serde(flatten)]
    pub event: FormationEvent,
}

/// Transport for session events. Delivery is best effort.
pub trait Broadcaster: Send + Sync {
    fn publish(&self, session_id: SessionId, events: Vec<FormationEvent>);
}

/// Drops every event (single-process / offline mode).
#[derive(Clone, Copy, Debug, Default)]
pub struct Offline;

impl Broadcaster for Offline {
    fn publish(&self, _session_id: SessionId, _events: Vec<FormationEvent>) {}
}

/// Fans events out over a tokio broadcast channel.
#[derive(Clone, Debug)]
pub struct ChannelBroadcaster {
    tx: broadcast::Sender<SessionEvent>,
}

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn publish(&self, session_id: SessionId, events: Vec<FormationEvent>) {
        for event in events {
            // No subscribers is fine.
            let _ = self.tx.send(SessionEvent { session_id, event });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn channel_delivers_to_subscribers() {
        let b = ChannelBroadcaster::new(8);
        let mut rx = b.subscribe();
        let id = Uuid::new_v4();
        b.publish(id, vec![FormationEvent::PlayerUnsold { player_id: 7 }]);
        let got = rx.try_recv().unwrap();
        assert_eq!(got.session_id, id);
        assert_eq!(got.event, FormationEvent::PlayerUnsold { player_id: 7 });
    }

    #[test]
    fn channel_without_subscribers_does_not_fail() {
        ChannelBroadcaster::new(1).publish(Uuid::new_v4(), vec![FormationEvent::PlayerUnsold { player_id: 1 }]);
        Offline.publish(Uuid::new_v4(), vec![FormationEvent::PlayerUnsold { player_id: 1 }]);
    }
}
