use crate::types::{ChannelId, CommunityId, RoleId, UserId};
use crate::Result;
use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// The bot's view of a community it belongs to, resolved per dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityProfile {
    pub id: CommunityId,
    pub name: String,
    /// Bot may add/remove ban-list entries here.
    pub can_ban: bool,
    /// Bot may apply/lift timed communication restrictions here.
    pub can_moderate: bool,
}

/// A member of a community, as needed by the privilege gate and the
/// orchestrator's precondition checks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberProfile {
    pub roles: Vec<RoleId>,
    /// Coarse "can administer members" platform permission, used as the
    /// privilege fallback when no privilege role is configured.
    pub can_moderate: bool,
    /// Whether a communication restriction is currently active.
    pub muted: bool,
}

// ---------------------------------------------------------------------------
// CommunityGateway
// ---------------------------------------------------------------------------

/// The external per-community moderation capability.
///
/// Every network interaction the engine performs goes through this trait:
/// the server wires in the REST client from `guildsync-discord`, tests wire
/// in an in-memory mock. All methods are suspension points; the orchestrator
/// awaits each before issuing the next.
///
/// Conventions:
/// - `community_profile` returns `None` when the bot is not a member of the
///   community (as opposed to a transport failure, which is `Err`).
/// - `member_profile` returns `None` when the user is not a member.
#[async_trait]
pub trait CommunityGateway: Send + Sync {
    /// The acting process's own identity.
    fn bot_user(&self) -> UserId;

    async fn community_profile(&self, community: CommunityId)
        -> Result<Option<CommunityProfile>>;

    async fn member_profile(
        &self,
        community: CommunityId,
        user: UserId,
    ) -> Result<Option<MemberProfile>>;

    /// Whether the user is on the community's ban list. Ban lists operate
    /// independently of membership.
    async fn is_banned(&self, community: CommunityId, user: UserId) -> Result<bool>;

    async fn ban(&self, community: CommunityId, user: UserId, reason: &str) -> Result<()>;

    async fn unban(&self, community: CommunityId, user: UserId, reason: &str) -> Result<()>;

    /// Apply a timed communication restriction for `duration_ms`.
    async fn mute(
        &self,
        community: CommunityId,
        user: UserId,
        duration_ms: u64,
        reason: &str,
    ) -> Result<()>;

    /// Lift a communication restriction.
    async fn unmute(&self, community: CommunityId, user: UserId, reason: &str) -> Result<()>;

    /// Deliver a text record to the audit destination.
    async fn send_audit(&self, channel: ChannelId, message: &str) -> Result<()>;
}
