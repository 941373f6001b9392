//! Membership Engine Module
//!
//! The coordination core of the node. Ties the peer registry, broadcast
//! discovery and the HTTP protocol surface together into one engine.
//!
//! ## Core Mechanisms
//! - **Joining**: a node posts itself to a seed's `/join` and receives the
//!   seed's peer list in return, so a single round trip teaches both sides
//!   about each other.
//! - **Heartbeats**: every interval the engine pings each alive peer; a
//!   heartbeat from an unknown sender doubles as a discovery event.
//! - **Failure detection**: the health loop tombstones peers whose last
//!   evidence is older than the configured timeout. No record is deleted, so
//!   fresher gossip can always revive a peer.
//! - **Gossip**: every interval the full registry snapshot is pushed to one
//!   randomly chosen alive peer; receivers merge records by comparing
//!   `last_seen`, which makes the exchange idempotent and order-insensitive.
//!
//! ## Submodules
//! - **`service`**: the engine itself - loops, outbound requests, callbacks.
//! - **`handlers`**: Axum handlers for the five membership endpoints.
//! - **`protocol`**: endpoint paths and wire DTOs.

pub mod handlers;
pub mod protocol;
pub mod service;
