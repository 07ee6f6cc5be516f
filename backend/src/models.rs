use serde::{Deserialize, Serialize};

/// Response envelope shared by every API route:
/// `{success: true, data: ...}` or `{success: false, error: "..."}`
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// User shape returned by the Ethos V2 API and by our own routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthosUser {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub profile_id: i64,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub userkeys: Vec<String>,
    #[serde(default)]
    pub xp_total: i64,
    #[serde(default)]
    pub xp_streak_days: i64,
    #[serde(default)]
    pub links: Option<ProfileLinks>,
    #[serde(default)]
    pub stats: Option<UserStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileLinks {
    pub profile: String,
    pub score_breakdown: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub review: ReviewStats,
    pub vouch: VouchStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewStats {
    pub received: ReviewCounts,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewCounts {
    #[serde(default)]
    pub negative: i64,
    #[serde(default)]
    pub neutral: i64,
    #[serde(default)]
    pub positive: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VouchStats {
    pub given: VouchSide,
    pub received: VouchSide,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VouchSide {
    #[serde(default = "zero_wei")]
    pub amount_wei_total: String,
    #[serde(default)]
    pub count: i64,
}

fn zero_wei() -> String {
    "0".to_string()
}

impl Default for VouchSide {
    fn default() -> Self {
        Self {
            amount_wei_total: zero_wei(),
            count: 0,
        }
    }
}

/// Flat user shape returned by the Ethos V1 search API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V1User {
    pub userkey: String,
    #[serde(default)]
    pub profile_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub score: i64,
}

/// V1 search responses arrive wrapped as `{ok, data: {values: [...]}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct V1SearchEnvelope {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub data: V1SearchData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct V1SearchData {
    #[serde(default)]
    pub values: Vec<V1User>,
}

/// Farcaster username lookups wrap the user one level deeper.
#[derive(Debug, Clone, Deserialize)]
pub struct FarcasterUserEnvelope {
    #[serde(default)]
    pub user: Option<EthosUser>,
}

/// Profile response enriched with leaderboard rank and weekly XP.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedProfile {
    #[serde(flatten)]
    pub user: EthosUser,
    pub leaderboard_position: Option<i64>,
    pub weekly_xp_gain: i64,
}

pub fn profile_links(userkey: &str) -> ProfileLinks {
    ProfileLinks {
        profile: format!("https://app.ethos.network/profile/{}", userkey),
        score_breakdown: format!("https://app.ethos.network/profile/{}/score", userkey),
    }
}

impl EthosUser {
    /// Convert a V1 search hit into the V2 shape the frontend expects.
    /// Fields V1 does not carry (XP, status, stats) are zeroed out; callers
    /// that can enrich them from the V2 API overwrite them afterwards.
    pub fn from_v1(v1: &V1User) -> Self {
        let profile_id = v1.profile_id.unwrap_or(0);
        Self {
            id: profile_id,
            profile_id,
            display_name: v1
                .name
                .clone()
                .or_else(|| v1.username.clone())
                .unwrap_or_else(|| v1.userkey.clone()),
            username: v1.username.clone(),
            avatar_url: v1.avatar.clone(),
            description: v1.description.clone(),
            score: v1.score,
            status: None,
            userkeys: vec![v1.userkey.clone()],
            xp_total: 0,
            xp_streak_days: 0,
            links: Some(profile_links(&v1.userkey)),
            stats: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v1_user() -> V1User {
        V1User {
            userkey: "service:x.com:12345".to_string(),
            profile_id: Some(42),
            name: Some("Alice".to_string()),
            username: Some("alice".to_string()),
            avatar: Some("https://example.com/a.png".to_string()),
            description: None,
            score: 1650,
        }
    }

    #[test]
    fn from_v1_carries_identity_and_score() {
        let user = EthosUser::from_v1(&v1_user());

        assert_eq!(user.id, 42);
        assert_eq!(user.profile_id, 42);
        assert_eq!(user.display_name, "Alice");
        assert_eq!(user.score, 1650);
        assert_eq!(user.userkeys, vec!["service:x.com:12345".to_string()]);
        assert_eq!(user.xp_total, 0);
        assert!(user.status.is_none());
        assert!(user.stats.is_none());
    }

    #[test]
    fn from_v1_builds_profile_links() {
        let user = EthosUser::from_v1(&v1_user());
        let links = user.links.expect("links should be set");

        assert_eq!(
            links.profile,
            "https://app.ethos.network/profile/service:x.com:12345"
        );
        assert_eq!(
            links.score_breakdown,
            "https://app.ethos.network/profile/service:x.com:12345/score"
        );
    }

    #[test]
    fn from_v1_falls_back_to_userkey_as_display_name() {
        let mut v1 = v1_user();
        v1.name = None;
        v1.username = None;

        let user = EthosUser::from_v1(&v1);
        assert_eq!(user.display_name, "service:x.com:12345");
    }

    #[test]
    fn api_response_envelope_serializes_without_empty_fields() {
        let ok = serde_json::to_value(ApiResponse::ok(1)).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "data": 1}));

        let err = serde_json::to_value(ApiResponse::<i32>::err("nope")).unwrap();
        assert_eq!(err, serde_json::json!({"success": false, "error": "nope"}));
    }
}
