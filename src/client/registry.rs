//! Client registry
//!
//! Tracks the connections currently eligible to send and receive broadcasts.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::client::{Connection, ConnectionId, Transport};

/// Registry shared between the accept loop and the broadcast loop.
pub type SharedRegistry<T = Connection> = Arc<Mutex<ClientRegistry<T>>>;

struct Slot<T> {
    id: ConnectionId,
    conn: T,
}

/// Insertion-ordered collection of registered connections.
///
/// Membership means "currently considered reachable". A peer that went away
/// stays here until the relay observes it and removes it.
pub struct ClientRegistry<T = Connection> {
    slots: Vec<Slot<T>>,
    next_id: u64,
}

impl<T> ClientRegistry<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_id: 0,
        }
    }

    pub fn shared() -> SharedRegistry<T> {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Appends a connection and returns the id it is tracked under.
    pub fn register(&mut self, conn: T) -> ConnectionId {
        let id = ConnectionId::new(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot { id, conn });
        id
    }

    pub fn remove(&mut self, id: ConnectionId) -> Option<T> {
        let index = self.slots.iter().position(|slot| slot.id == id)?;
        Some(self.slots.remove(index).conn)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&T> {
        self.slots
            .iter()
            .find(|slot| slot.id == id)
            .map(|slot| &slot.conn)
    }

    /// Every registered connection except `excluding`, in insertion order.
    pub fn others(&self, excluding: ConnectionId) -> impl Iterator<Item = (ConnectionId, &T)> {
        self.slots
            .iter()
            .filter(move |slot| slot.id != excluding)
            .map(|slot| (slot.id, &slot.conn))
    }

    /// Snapshot of the registered ids in insertion order.
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.slots.iter().map(|slot| slot.id).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T: Transport> ClientRegistry<T> {
    pub fn peer_addrs(&self) -> Vec<SocketAddr> {
        self.slots.iter().map(|slot| slot.conn.peer_addr()).collect()
    }
}

impl<T> Default for ClientRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
