use crate::wire::{self, CurrentUser, Guild, Member};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use guildsync_core::gateway::{CommunityGateway, CommunityProfile, MemberProfile};
use guildsync_core::types::{ChannelId, CommunityId, RoleId, UserId};
use guildsync_core::{Result, SyncError};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};

pub const API_BASE: &str = "https://discord.com/api/v10";

fn transport(e: reqwest::Error) -> SyncError {
    SyncError::Gateway(e.to_string())
}

fn status_error(method: &str, path: &str, status: StatusCode, body: String) -> SyncError {
    let mut snippet = body;
    // Truncation point must land on a char boundary or String::truncate
    // panics on multibyte response bodies.
    let mut end = snippet.len().min(200);
    while !snippet.is_char_boundary(end) {
        end -= 1;
    }
    snippet.truncate(end);
    if snippet.is_empty() {
        SyncError::Gateway(format!("{method} {path} returned {status}"))
    } else {
        SyncError::Gateway(format!("{method} {path} returned {status}: {snippet}"))
    }
}

fn parse_id(id: &str) -> Result<u64> {
    id.parse()
        .map_err(|_| SyncError::Gateway(format!("malformed platform id '{id}'")))
}

// ---------------------------------------------------------------------------
// DiscordGateway
// ---------------------------------------------------------------------------

/// REST-backed [`CommunityGateway`] for the Discord HTTP API.
///
/// Lookups that can legitimately come back empty (guild the bot left, user
/// not a member, ban entry absent) map 404 — and 403 for guild access — to
/// `None`/`false`; every other non-success status is a gateway error
/// carrying the method, path and response snippet.
pub struct DiscordGateway {
    http: reqwest::Client,
    base_url: String,
    auth: String,
    bot_user: UserId,
}

impl DiscordGateway {
    /// Authenticate against the production API and resolve the bot's own
    /// identity from `/users/@me`.
    pub async fn connect(token: &str) -> Result<Self> {
        Self::connect_to(API_BASE, token).await
    }

    pub async fn connect_to(base_url: &str, token: &str) -> Result<Self> {
        let mut gateway = Self::with_bot_user(base_url, token, UserId(0));
        let me: CurrentUser = gateway
            .get_optional("/users/@me")
            .await?
            .ok_or_else(|| SyncError::Gateway("authentication rejected by the platform".into()))?;
        gateway.bot_user = UserId(parse_id(&me.id)?);
        tracing::info!(bot = %gateway.bot_user, "authenticated with the platform");
        Ok(gateway)
    }

    /// Construct without the self-identification round trip (tests).
    pub fn with_bot_user(base_url: &str, token: &str, bot_user: UserId) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth: format!("Bot {token}"),
            bot_user,
        }
    }

    async fn get_optional<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header(AUTHORIZATION, self.auth.as_str())
            .send()
            .await
            .map_err(transport)?;
        match resp.status() {
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => Ok(None),
            s if s.is_success() => Ok(Some(resp.json::<T>().await.map_err(transport)?)),
            s => Err(status_error(
                "GET",
                path,
                s,
                resp.text().await.unwrap_or_default(),
            )),
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        reason: Option<&str>,
    ) -> Result<()> {
        let mut req = self
            .http
            .request(method.clone(), format!("{}{}", self.base_url, path))
            .header(AUTHORIZATION, self.auth.as_str());
        if let Some(reason) = reason {
            // An unrepresentable reason is dropped rather than failing the
            // action itself.
            if let Ok(value) = HeaderValue::from_str(reason) {
                req = req.header("X-Audit-Log-Reason", value);
            }
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await.map_err(transport)?;
        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            Err(status_error(
                method.as_str(),
                path,
                status,
                resp.text().await.unwrap_or_default(),
            ))
        }
    }

    async fn guild(&self, community: CommunityId) -> Result<Option<Guild>> {
        self.get_optional(&format!("/guilds/{community}")).await
    }

    async fn member(&self, community: CommunityId, user: UserId) -> Result<Option<Member>> {
        self.get_optional(&format!("/guilds/{community}/members/{user}"))
            .await
    }
}

#[async_trait]
impl CommunityGateway for DiscordGateway {
    fn bot_user(&self) -> UserId {
        self.bot_user
    }

    async fn community_profile(
        &self,
        community: CommunityId,
    ) -> Result<Option<CommunityProfile>> {
        let Some(guild) = self.guild(community).await? else {
            return Ok(None);
        };
        let Some(me) = self.member(community, self.bot_user).await? else {
            return Ok(None);
        };
        let owner = guild.owner_id == self.bot_user.to_string();
        let bits = wire::aggregate_permissions(&guild, &me.roles);
        Ok(Some(CommunityProfile {
            id: community,
            name: guild.name,
            can_ban: owner || wire::grants(bits, wire::BAN_MEMBERS),
            can_moderate: owner || wire::grants(bits, wire::MODERATE_MEMBERS),
        }))
    }

    async fn member_profile(
        &self,
        community: CommunityId,
        user: UserId,
    ) -> Result<Option<MemberProfile>> {
        let Some(guild) = self.guild(community).await? else {
            return Ok(None);
        };
        let Some(member) = self.member(community, user).await? else {
            return Ok(None);
        };
        let owner = guild.owner_id == user.to_string();
        let bits = wire::aggregate_permissions(&guild, &member.roles);
        let roles = member
            .roles
            .iter()
            .filter_map(|r| r.parse::<u64>().ok().map(RoleId))
            .collect();
        Ok(Some(MemberProfile {
            roles,
            can_moderate: owner || wire::grants(bits, wire::MODERATE_MEMBERS),
            muted: member.is_muted(Utc::now()),
        }))
    }

    async fn is_banned(&self, community: CommunityId, user: UserId) -> Result<bool> {
        let entry: Option<serde_json::Value> = self
            .get_optional(&format!("/guilds/{community}/bans/{user}"))
            .await?;
        Ok(entry.is_some())
    }

    async fn ban(&self, community: CommunityId, user: UserId, reason: &str) -> Result<()> {
        self.send(
            Method::PUT,
            &format!("/guilds/{community}/bans/{user}"),
            Some(&serde_json::json!({ "delete_message_seconds": 0 })),
            Some(reason),
        )
        .await
    }

    async fn unban(&self, community: CommunityId, user: UserId, reason: &str) -> Result<()> {
        self.send(
            Method::DELETE,
            &format!("/guilds/{community}/bans/{user}"),
            None,
            Some(reason),
        )
        .await
    }

    async fn mute(
        &self,
        community: CommunityId,
        user: UserId,
        duration_ms: u64,
        reason: &str,
    ) -> Result<()> {
        // Durations beyond the calendar's range saturate instead of wrapping
        // into the past.
        let delta = chrono::Duration::milliseconds(i64::try_from(duration_ms).unwrap_or(i64::MAX));
        let until = Utc::now()
            .checked_add_signed(delta)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.send(
            Method::PATCH,
            &format!("/guilds/{community}/members/{user}"),
            Some(&serde_json::json!({
                "communication_disabled_until":
                    until.to_rfc3339_opts(SecondsFormat::Millis, true)
            })),
            Some(reason),
        )
        .await
    }

    async fn unmute(&self, community: CommunityId, user: UserId, reason: &str) -> Result<()> {
        self.send(
            Method::PATCH,
            &format!("/guilds/{community}/members/{user}"),
            Some(&serde_json::json!({ "communication_disabled_until": null })),
            Some(reason),
        )
        .await
    }

    async fn send_audit(&self, channel: ChannelId, message: &str) -> Result<()> {
        self.send(
            Method::POST,
            &format!("/channels/{channel}/messages"),
            Some(&serde_json::json!({ "content": message })),
            None,
        )
        .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
