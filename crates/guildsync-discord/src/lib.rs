//! `guildsync-discord` — Discord REST implementation of the
//! [`CommunityGateway`](guildsync_core::gateway::CommunityGateway) trait.
//!
//! Talks directly to the Discord HTTP API (v10): guild and member lookups,
//! ban-list operations, timed communication restrictions
//! (`communication_disabled_until`), and channel messages for the audit
//! mirror. Capability flags are computed from role permission bitfields the
//! same way the platform does (role union, `ADMINISTRATOR` implies
//! everything, the guild owner implies everything).
//!
//! The engine in `guildsync-core` never sees any of this: it only sees the
//! trait.

pub mod rest;
pub mod wire;

pub use rest::DiscordGateway;
