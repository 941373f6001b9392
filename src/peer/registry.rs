use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::types::Peer;

/// Thread-safe map of peer records, keyed by peer id.
///
/// Each operation is atomic with respect to the others; list reads return
/// independent snapshots that callers may iterate without holding any lock.
/// The registry never contains a record for the local node itself; callers
/// filter their own id before inserting.
pub struct PeerRegistry {
    peers: DashMap<String, Peer>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self {
            peers: DashMap::new(),
        }
    }

    /// Inserts or overwrites a record, stamping it as freshly seen.
    ///
    /// Returns `true` if the id was previously absent.
    pub fn add(&self, mut peer: Peer) -> bool {
        peer.last_seen = Utc::now();
        peer.is_alive = true;
        self.peers.insert(peer.id.clone(), peer).is_none()
    }

    /// Merges a record received via gossip, keeping the sender's timestamp.
    ///
    /// An absent id is inserted; a present id is overwritten only when the
    /// incoming `last_seen` is strictly newer. An accepted record counts as
    /// fresh evidence and therefore comes back alive; only the health check
    /// ever marks records dead. A stale accepted record simply gets
    /// tombstoned again on the next health tick, which is what makes
    /// repeated merges converge instead of flapping.
    /// Returns `true` if the registry changed.
    pub fn merge(&self, incoming: Peer) -> bool {
        let accepted = Peer {
            is_alive: true,
            ..incoming
        };

        match self.peers.entry(accepted.id.clone()) {
            Entry::Occupied(mut existing) => {
                if accepted.last_seen > existing.get().last_seen {
                    existing.insert(accepted);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(accepted);
                true
            }
        }
    }

    /// Deletes a record if present. Idempotent.
    pub fn remove(&self, id: &str) {
        self.peers.remove(id);
    }

    /// Snapshot read of a single record.
    pub fn get(&self, id: &str) -> Option<Peer> {
        self.peers.get(id).map(|entry| entry.value().clone())
    }

    pub fn exists(&self, id: &str) -> bool {
        self.peers.contains_key(id)
    }

    /// Snapshot of all known records, dead ones included.
    pub fn all(&self) -> Vec<Peer> {
        self.peers
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Snapshot of the records currently considered alive.
    pub fn alive(&self) -> Vec<Peer> {
        self.peers
            .iter()
            .filter(|entry| entry.value().is_alive)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.peers.len()
    }

    pub fn count_alive(&self) -> usize {
        self.peers.iter().filter(|entry| entry.value().is_alive).count()
    }

    /// Marks a peer dead without touching its `last_seen`, so that the
    /// record still ranks correctly against incoming gossip. Idempotent.
    pub fn mark_dead(&self, id: &str) {
        if let Some(mut peer) = self.peers.get_mut(id) {
            peer.is_alive = false;
        }
    }

    /// Refreshes the liveness evidence for a known peer; no-op otherwise.
    pub fn touch(&self, id: &str) {
        if let Some(mut peer) = self.peers.get_mut(id) {
            peer.last_seen = Utc::now();
            peer.is_alive = true;
        }
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
