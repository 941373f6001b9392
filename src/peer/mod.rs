//! Peer Registry Module
//!
//! The cluster view as seen from this node: a map of peer records keyed by id,
//! each carrying the address other nodes use to reach the peer and the most
//! recent evidence that it was alive.
//!
//! ## Core Mechanisms
//! - **Liveness evidence**: every inbound `join`, `heartbeat`, gossip record or
//!   broadcast announcement refreshes `last_seen`. The health loop marks peers
//!   dead once that evidence ages past the configured timeout.
//! - **Tombstones**: dead peers stay in the registry with `is_alive = false` so
//!   that newer gossip can revive them. Deleting them outright would let stale
//!   gossip resurrect a peer that the rest of the cluster already declared dead.
//! - **Merge precedence**: gossip merges keep the sender's timestamp and only
//!   overwrite a local record when the incoming one is strictly newer.

pub mod registry;
pub mod types;

#[cfg(test)]
mod tests;
