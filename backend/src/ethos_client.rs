use crate::models::{EthosUser, FarcasterUserEnvelope, V1SearchEnvelope};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

const ETHOS_V1_BASE: &str = "https://api.ethos.network/api/v1";
const ETHOS_V2_BASE: &str = "https://api.ethos.network/api/v2";

const USER_AGENT: &str = "EthosRadar/1.0.0";

/// Client for the Ethos reputation API (V2 endpoints, plus the V1 search
/// endpoint used as a fallback when V2 lookups miss).
pub struct EthosClient {
    client: reqwest::Client,
    v1_base: String,
    v2_base: String,
}

#[derive(Debug)]
pub enum ApiError {
    RequestFailed(String),
    ParseError(String),
    NotFound(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            ApiError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl EthosClient {
    pub fn new() -> Self {
        Self::with_base_urls(ETHOS_V1_BASE, ETHOS_V2_BASE)
    }

    /// Base URLs are injectable so tests can point at a local stub server.
    pub fn with_base_urls(v1_base: &str, v2_base: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            v1_base: v1_base.trim_end_matches('/').to_string(),
            v2_base: v2_base.trim_end_matches('/').to_string(),
        }
    }

    /// Batch lookup by Twitter/X account id or handle.
    pub async fn users_by_twitter(&self, accounts: &[String]) -> Result<Vec<EthosUser>, ApiError> {
        self.post_json(
            format!("{}/users/by/x", self.v2_base),
            &json!({ "accountIdsOrUsernames": accounts }),
        )
        .await
    }

    pub async fn users_by_profile_id(&self, ids: &[i64]) -> Result<Vec<EthosUser>, ApiError> {
        self.post_json(
            format!("{}/users/by/profile-id", self.v2_base),
            &json!({ "profileIds": ids }),
        )
        .await
    }

    pub async fn users_by_address(&self, addresses: &[String]) -> Result<Vec<EthosUser>, ApiError> {
        self.post_json(
            format!("{}/users/by/address", self.v2_base),
            &json!({ "addresses": addresses }),
        )
        .await
    }

    pub async fn user_by_userkey(&self, userkey: &str) -> Result<EthosUser, ApiError> {
        self.get_json(format!("{}/user/by/userkey/{}", self.v2_base, userkey))
            .await
    }

    pub async fn user_by_farcaster_username(
        &self,
        username: &str,
    ) -> Result<FarcasterUserEnvelope, ApiError> {
        self.get_json(format!(
            "{}/user/by/farcaster/username/{}",
            self.v2_base, username
        ))
        .await
    }

    pub async fn user_by_farcaster_fid(&self, fid: &str) -> Result<EthosUser, ApiError> {
        self.get_json(format!("{}/user/by/farcaster/{}", self.v2_base, fid))
            .await
    }

    /// V1 global search. Returns the raw `{ok, data: {values}}` envelope;
    /// callers filter and convert the hits themselves.
    pub async fn search_v1(&self, query: &str, limit: u32) -> Result<V1SearchEnvelope, ApiError> {
        let response = self
            .client
            .get(format!("{}/search", self.v1_base))
            .query(&[("query", query), ("limit", &limit.to_string())])
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Self::decode(response).await
    }

    /// XP gained over the trailing week. The endpoint returns a bare number.
    pub async fn weekly_xp_gain(&self, userkey: &str) -> Result<i64, ApiError> {
        self.get_json(format!("{}/xp/user/{}/weekly", self.v2_base, userkey))
            .await
    }

    /// Rank on the XP leaderboard, if the user is on it.
    pub async fn leaderboard_rank(&self, userkey: &str) -> Result<Option<i64>, ApiError> {
        match self
            .get_json(format!("{}/users/{}/leaderboard-rank", self.v2_base, userkey))
            .await
        {
            Ok(rank) => Ok(Some(rank)),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        let response = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Self::decode(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: String,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .post(&url)
            .header("User-Agent", USER_AGENT)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("{}", status)));
        }
        if !status.is_success() {
            return Err(ApiError::RequestFailed(format!(
                "unexpected status {}",
                status
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::ParseError(e.to_string()))
    }
}

