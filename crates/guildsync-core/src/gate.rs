use crate::gateway::{CommunityGateway, MemberProfile};
use crate::types::{CommunityId, RoleId, UserId};
use crate::Result;

// ---------------------------------------------------------------------------
// PrivilegeGate
// ---------------------------------------------------------------------------

/// Decides whether an identity counts as a moderator in a community.
///
/// If a privilege role is configured, the test is "holds that role there";
/// otherwise it falls back to the coarse "can moderate members" platform
/// permission. The same predicate answers both questions the engine asks:
/// "may this actor issue directives here?" and "is this target protected
/// (exempt from being moderated) here?".
#[derive(Debug, Clone, Default)]
pub struct PrivilegeGate {
    privilege_role: Option<RoleId>,
}

impl PrivilegeGate {
    pub fn new(privilege_role: Option<RoleId>) -> Self {
        Self { privilege_role }
    }

    /// The privilege predicate on an already-fetched member profile.
    pub fn member_is_privileged(&self, member: &MemberProfile) -> bool {
        match self.privilege_role {
            Some(role) => member.roles.contains(&role),
            None => member.can_moderate,
        }
    }

    /// Whether `user` may issue directives in `community`.
    ///
    /// Absence from the community resolves to `false`, not an error.
    pub async fn has_privilege(
        &self,
        gateway: &dyn CommunityGateway,
        community: CommunityId,
        user: UserId,
    ) -> Result<bool> {
        match gateway.member_profile(community, user).await? {
            Some(member) => Ok(self.member_is_privileged(&member)),
            None => Ok(false),
        }
    }

    /// Whether `user` is exempt from being targeted in `community`.
    /// Identical predicate to [`has_privilege`](Self::has_privilege).
    pub async fn is_protected(
        &self,
        gateway: &dyn CommunityGateway,
        community: CommunityId,
        user: UserId,
    ) -> Result<bool> {
        self.has_privilege(gateway, community, user).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
