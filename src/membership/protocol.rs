//! Membership Wire Protocol
//!
//! Endpoint paths and DTOs for the five-verb peer protocol. Peers exchange
//! JSON over HTTP/1.1; field names are stable and additional fields in
//! inbound payloads are ignored so that versions can interoperate.

use serde::{Deserialize, Serialize};

use crate::peer::types::Peer;

// --- API Endpoints ---

/// A new node posts itself here and receives the receiver's peer list.
pub const ENDPOINT_JOIN: &str = "/join";
/// Periodic liveness signal carrying the sender's id and address.
pub const ENDPOINT_HEARTBEAT: &str = "/heartbeat";
/// Bulk exchange of the sender's full registry snapshot.
pub const ENDPOINT_GOSSIP: &str = "/gossip";
/// Read-only list of all known peers.
pub const ENDPOINT_PEERS: &str = "/peers";
/// Read-only summary of this node's cluster view.
pub const ENDPOINT_STATUS: &str = "/status";

// --- Data Transfer Objects ---

/// Body of an inbound `/join`: the joining node's identity.
///
/// The full peer record is accepted on the wire; only these two fields
/// matter, since the receiver stamps its own liveness evidence.
#[derive(Debug, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: String,
    pub address: String,
}

/// Body of a `/heartbeat`: who is alive and where to reach them.
#[derive(Debug, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    pub id: String,
    pub address: String,
}

/// Response of `/status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// This node's id.
    pub id: String,
    /// This node's full advertised URL.
    pub address: String,
    /// All known peers, tombstones included.
    pub total_peers: usize,
    /// Peers currently considered alive.
    pub alive_peers: usize,
    pub peers: Vec<Peer>,
}
