use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single member of the cluster as known to this node.
///
/// This is also the wire representation: peers are exchanged verbatim over
/// `/join` responses and `/gossip` payloads. `last_seen` travels with the
/// record so that receivers can rank competing claims about the same peer;
/// fields unknown to this version are ignored on decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Peer {
    /// Cluster-unique identifier of the peer.
    pub id: String,
    /// Base URL (`http://host:port`) of the peer's HTTP endpoint.
    pub address: String,
    /// UTC instant of the most recent evidence that the peer was alive.
    #[serde(default = "unix_epoch")]
    pub last_seen: DateTime<Utc>,
    /// Whether the local failure detector currently considers the peer alive.
    #[serde(default)]
    pub is_alive: bool,
}

impl Peer {
    /// Creates a record for a peer we just heard from directly.
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            last_seen: Utc::now(),
            is_alive: true,
        }
    }
}

fn unix_epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}
