//! CLIP - Peer-to-Peer Cluster Membership Library
//!
//! This library crate defines the core modules of the membership service.
//! It serves as the foundation for the node binary (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of small, loosely coupled subsystems:
//!
//! - **`peer`**: The registry of peer records - the single piece of shared
//!   mutable state, guarded by a concurrent map with snapshot reads.
//! - **`membership`**: The engine. Owns the heartbeat, health-check and
//!   gossip loops, serves the five HTTP endpoints, and issues every outbound
//!   peer request.
//! - **`discovery`**: Link-local UDP broadcast announcements for
//!   zero-configuration peer detection on a LAN.
//! - **`network`**: Best-effort probes of the local network environment
//!   (outbound IP, interface addresses, broadcast address).
//! - **`config`** / **`cli`**: Startup configuration from flags and
//!   `CLIP_*` environment variables.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod membership;
pub mod network;
pub mod peer;
