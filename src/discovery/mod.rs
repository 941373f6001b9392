//! Broadcast Discovery Module
//!
//! Zero-configuration peer detection for nodes sharing a LAN segment.
//!
//! ## How it works
//! - **Announcer**: once per interval, sends a small JSON datagram to the
//!   subnet's directed broadcast address naming this node's id and URL.
//! - **Listener**: binds the shared discovery port and reports every
//!   announcement from an unknown node to the membership layer, which then
//!   performs a regular `join` handshake so both sides converge immediately.
//!
//! Discovery is strictly optional: if the UDP port cannot be bound or no
//! broadcast address can be determined, the node keeps running and relies on
//! seed nodes instead.

pub mod service;
