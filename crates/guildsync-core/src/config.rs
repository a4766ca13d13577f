use crate::error::Result;
use crate::types::{ChannelId, CommunityId, RoleId};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// SyncConfig
// ---------------------------------------------------------------------------

/// Which communities a directive fans out to, and the identities the engine
/// consults along the way. Secrets (bot token, intake token) are not config
/// file material; they arrive through the server's environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// The community where directives nominally originate. Always dispatched
    /// first.
    pub primary_community: CommunityId,
    /// Additional communities, dispatched in the order listed.
    #[serde(default)]
    pub sync_communities: Vec<CommunityId>,
    /// Audit destination for report mirrors and auto-unmute records.
    /// Unset: mirroring is skipped silently.
    #[serde(default)]
    pub audit_channel: Option<ChannelId>,
    /// Privilege role for the moderator check. Unset: fall back to the
    /// coarse "can moderate members" platform permission.
    #[serde(default)]
    pub privilege_role: Option<RoleId>,
}

impl SyncConfig {
    /// Ordered dispatch list: primary community first, then the sync list in
    /// its configured order, duplicates removed (first occurrence wins).
    pub fn dispatch_order(&self) -> Vec<CommunityId> {
        let mut order = vec![self.primary_community];
        for &c in &self.sync_communities {
            if !order.contains(&c) {
                order.push(c);
            }
        }
        order
    }

    pub fn is_enrolled(&self, community: CommunityId) -> bool {
        community == self.primary_community || self.sync_communities.contains(&community)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let cfg: SyncConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.sync_communities.contains(&self.primary_community) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "primary community {} is repeated in sync_communities",
                    self.primary_community
                ),
            });
        }

        let mut seen = Vec::new();
        for &c in &self.sync_communities {
            if seen.contains(&c) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("community {c} appears more than once in sync_communities"),
                });
            } else {
                seen.push(c);
            }
        }

        if self.audit_channel.is_none() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no audit_channel configured: moderation actions will not be logged"
                    .to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
