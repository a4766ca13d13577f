//! Wire types for the slice of the Discord API the gateway touches, plus
//! the permission-bit arithmetic used to derive capability flags.

use chrono::{DateTime, Utc};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Permission bits
// ---------------------------------------------------------------------------

pub const BAN_MEMBERS: u64 = 1 << 2;
pub const ADMINISTRATOR: u64 = 1 << 3;
pub const MODERATE_MEMBERS: u64 = 1 << 40;

/// Union of the permission bitfields of every role the member holds,
/// including the guild's `@everyone` role (whose id equals the guild id).
pub fn aggregate_permissions(guild: &Guild, member_role_ids: &[String]) -> u64 {
    let mut bits = 0u64;
    for role in &guild.roles {
        if role.id == guild.id || member_role_ids.iter().any(|r| *r == role.id) {
            bits |= role.permissions.parse::<u64>().unwrap_or(0);
        }
    }
    bits
}

/// Whether `bits` grants `flag`. `ADMINISTRATOR` grants everything.
pub fn grants(bits: u64, flag: u64) -> bool {
    bits & ADMINISTRATOR != 0 || bits & flag != 0
}

// ---------------------------------------------------------------------------
// Wire objects
// ---------------------------------------------------------------------------

/// `GET /users/@me`
#[derive(Debug, Deserialize)]
pub struct CurrentUser {
    pub id: String,
}

/// `GET /guilds/{id}` — only the fields the gateway needs.
#[derive(Debug, Deserialize)]
pub struct Guild {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Deserialize)]
pub struct Role {
    pub id: String,
    /// Permission bitfield, serialized by the platform as a decimal string.
    pub permissions: String,
}

/// `GET /guilds/{id}/members/{user_id}`
#[derive(Debug, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub roles: Vec<String>,
    /// Set while a communication restriction is active; may be a past
    /// instant the platform has not cleared yet.
    #[serde(default)]
    pub communication_disabled_until: Option<DateTime<Utc>>,
}

impl Member {
    pub fn is_muted(&self, now: DateTime<Utc>) -> bool {
        self.communication_disabled_until
            .map(|until| until > now)
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
