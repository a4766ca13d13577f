//! `guildsync-core` — domain model and fan-out engine for federated
//! moderation sync.
//!
//! One operator directive (ban, timed mute, unmute, unban, or status query)
//! is applied sequentially across every community the bot participates in,
//! with per-community failures isolated from each other.
//!
//! # Architecture
//!
//! ```text
//! Directive
//!     │
//!     ▼
//! ActionOrchestrator  ← pre-dispatch guards, then one sequential pass
//!     │                 over the configured community list
//!     ├── PrivilegeGate    ← "is this identity a moderator here?"
//!     ├── CommunityGateway ← the platform API (trait; see guildsync-discord)
//!     └── MuteTimerStore   ← auto-expiry timers for timed mutes
//!     │
//!     ▼
//! Report ── Reporter ← grouped text summary + audit-channel mirror
//! ```
//!
//! The engine never talks to the platform directly: everything goes through
//! the [`gateway::CommunityGateway`] trait so tests can inject a mock and the
//! server can inject a real REST client.

pub mod config;
pub mod directive;
pub mod duration;
pub mod error;
pub mod gate;
pub mod gateway;
pub mod orchestrator;
pub mod report;
pub mod reporter;
pub mod timers;
pub mod types;

pub use error::{Result, SyncError};
