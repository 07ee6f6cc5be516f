use crate::ethos_client::{ApiError, EthosClient};
use crate::models::{EnhancedProfile, EthosUser, V1User};
use crate::userkey::Userkey;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug)]
pub enum UserServiceError {
    /// No profile matched; surfaced as a 404 with the given message.
    NotFound(String),
    /// The upstream API itself misbehaved; surfaced as a 500.
    Upstream(ApiError),
}

impl std::fmt::Display for UserServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserServiceError::NotFound(msg) => write!(f, "{}", msg),
            UserServiceError::Upstream(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for UserServiceError {}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Auto,
    Twitter,
    Userkey,
}

fn is_twitter_userkey(userkey: &str) -> bool {
    userkey.contains("service:x.com:") || userkey.contains("service:twitter.com:")
}

/// Resolve a search query to a single user.
///
/// Auto mode tries the V2 Twitter lookup first and falls back to V1 global
/// search restricted to Twitter/X profiles. The explicit modes skip the
/// parts the caller ruled out.
pub async fn search_user(
    client: &EthosClient,
    query: &str,
    mode: SearchMode,
) -> Result<EthosUser, UserServiceError> {
    match mode {
        SearchMode::Auto => {
            if matches!(
                Userkey::parse(query),
                Userkey::Handle(_) | Userkey::Twitter(_)
            ) {
                if let Ok(users) = client.users_by_twitter(&[query.to_string()]).await {
                    if let Some(user) = users.into_iter().next() {
                        return Ok(user);
                    }
                }
            }

            // V2 missed; fall back to global search, Twitter/X hits only
            let envelope = client
                .search_v1(query, 10)
                .await
                .map_err(|e| not_found_or_upstream(e, "User not found"))?;
            if !envelope.ok {
                return Err(UserServiceError::NotFound("User not found".to_string()));
            }

            envelope
                .data
                .values
                .iter()
                .find(|user| is_twitter_userkey(&user.userkey))
                .map(EthosUser::from_v1)
                .ok_or_else(|| {
                    UserServiceError::NotFound("No Twitter/X profiles found".to_string())
                })
        }
        SearchMode::Twitter => {
            let users = client
                .users_by_twitter(&[query.to_string()])
                .await
                .map_err(|e| not_found_or_upstream(e, "Twitter user not found"))?;
            users.into_iter().next().ok_or_else(|| {
                UserServiceError::NotFound("Twitter user not found".to_string())
            })
        }
        SearchMode::Userkey => {
            if !is_twitter_userkey(query) {
                return Err(UserServiceError::NotFound(
                    "Only Twitter/X userkeys are supported".to_string(),
                ));
            }

            let envelope = client
                .search_v1(query, 50)
                .await
                .map_err(|e| not_found_or_upstream(e, "Twitter userkey not found"))?;

            let values = &envelope.data.values;
            let hit = values
                .iter()
                .find(|user| user.userkey == query)
                .or_else(|| fuzzy_userkey_match(values, query));

            match hit {
                Some(user) if envelope.ok => Ok(EthosUser::from_v1(user)),
                _ => Err(UserServiceError::NotFound(
                    "Twitter userkey not found".to_string(),
                )),
            }
        }
    }
}

/// When the exact userkey is absent from the search results, accept a hit
/// that carries the same service and identifier (V1 sometimes returns the
/// legacy twitter.com spelling for an x.com query, and vice versa).
fn fuzzy_userkey_match<'a>(values: &'a [V1User], query: &str) -> Option<&'a V1User> {
    let mut parts = query.splitn(3, ':');
    let _ = parts.next();
    let service = parts.next()?;
    let identifier = parts.next()?;

    values
        .iter()
        .find(|user| user.userkey.contains(service) && user.userkey.contains(identifier))
}

/// Resolve a Farcaster username to a full profile: username lookup, FID
/// extraction, then the FID profile endpoint. Misses fall back to V1
/// global search and take the best match.
pub async fn search_farcaster_user(
    client: &EthosClient,
    username: &str,
) -> Result<EthosUser, UserServiceError> {
    let user = match client.user_by_farcaster_username(username).await {
        Ok(envelope) => envelope.user,
        Err(e) => {
            debug!("farcaster username lookup failed for {}: {}", username, e);
            None
        }
    };

    let Some(user) = user else {
        if let Ok(envelope) = client.search_v1(username, 10).await {
            if envelope.ok {
                if let Some(best) = envelope.data.values.first() {
                    return Ok(EthosUser::from_v1(best));
                }
            }
        }
        return Err(UserServiceError::NotFound(format!(
            "User not found in Farcaster or global search: {}",
            username
        )));
    };

    let fid = user
        .userkeys
        .iter()
        .find_map(|key| key.strip_prefix("service:farcaster:"))
        .ok_or_else(|| {
            UserServiceError::NotFound(format!("No FID found for Farcaster user: {}", username))
        })?;

    client.user_by_farcaster_fid(fid).await.map_err(|e| {
        debug!("farcaster fid lookup failed for {}: {}", fid, e);
        UserServiceError::NotFound(format!("Could not get profile data for FID: {}", fid))
    })
}

/// Full profile lookup for the trust card: V2 endpoint picked by userkey
/// shape, V1 search fallback, then best-effort weekly-XP and leaderboard
/// decoration.
pub async fn enhanced_profile(
    client: &EthosClient,
    userkey: &str,
) -> Result<EnhancedProfile, UserServiceError> {
    let direct = match Userkey::parse(userkey) {
        Userkey::ProfileId(id) => first(client.users_by_profile_id(&[id]).await),
        Userkey::Twitter(id) => first(client.users_by_twitter(&[id]).await),
        Userkey::Address(address) => first(client.users_by_address(&[address]).await),
        _ => client.user_by_userkey(userkey).await.ok(),
    };

    let user = match direct {
        Some(user) => user,
        None => v1_fallback(client, userkey).await.ok_or_else(|| {
            UserServiceError::NotFound("Enhanced profile not found".to_string())
        })?,
    };

    // Weekly XP is only meaningful for accounts that actually accrue XP
    let weekly_xp_gain = if user.status.as_deref() == Some("ACTIVE") && user.xp_total > 0 {
        client.weekly_xp_gain(userkey).await.unwrap_or(0)
    } else {
        0
    };

    let leaderboard_position = match client.leaderboard_rank(userkey).await {
        Ok(rank) => rank,
        Err(e) => {
            debug!("leaderboard rank lookup failed for {}: {}", userkey, e);
            None
        }
    };

    Ok(EnhancedProfile {
        user,
        leaderboard_position,
        weekly_xp_gain,
    })
}

fn first(result: Result<Vec<EthosUser>, ApiError>) -> Option<EthosUser> {
    result.ok().and_then(|users| users.into_iter().next())
}

/// V1 search fallback for profiles the V2 API does not know. Prefers an
/// exact userkey match over the top hit, then re-enriches XP and status
/// through the profile-id endpoint when the hit has a profile.
async fn v1_fallback(client: &EthosClient, userkey: &str) -> Option<EthosUser> {
    let envelope = client.search_v1(userkey, 5).await.ok()?;
    if !envelope.ok {
        return None;
    }

    let hit = envelope
        .data
        .values
        .iter()
        .find(|user| user.userkey == userkey)
        .or_else(|| envelope.data.values.first())?;

    let mut user = EthosUser::from_v1(hit);

    if let Some(profile_id) = hit.profile_id {
        if let Some(enriched) = first(client.users_by_profile_id(&[profile_id]).await) {
            user.xp_total = enriched.xp_total;
            user.xp_streak_days = enriched.xp_streak_days;
            user.status = enriched.status;
        }
    }

    if user.status.is_none() {
        let status = if hit.profile_id.is_some() {
            "ACTIVE"
        } else {
            "UNINITIALIZED"
        };
        user.status = Some(status.to_string());
    }

    Some(user)
}

fn not_found_or_upstream(error: ApiError, message: &str) -> UserServiceError {
    match error {
        ApiError::NotFound(_) => UserServiceError::NotFound(message.to_string()),
        other => UserServiceError::Upstream(other),
    }
}
