//! HTTP client for the breach lookup server

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use breachcheck_core::{
    digest, normalize_digest, password_digest_parts, BreachId, BreachRecord,
    BreachSearchResult, DataType, HashPrefix, MembershipId, MembershipRecord, NewBreach,
    NewMembership, NewPasswordPrefix, PasswordCheckResult, PasswordPrefixEntry, PrefixRange,
    SnapshotStats,
};

use crate::error::{ClientError, Result};

/// Response from `/health`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(flatten)]
    pub stats: SnapshotStats,
}

/// Response from `/api/initialize-demo`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InitializeResult {
    pub message: String,
    pub seeded: bool,
    pub breaches: usize,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    code: Option<String>,
}

pub struct BreachClient {
    http: Client,
    server_url: String,
}

impl BreachClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_http(Client::new(), server_url)
    }

    pub fn with_http(http: Client, server_url: impl Into<String>) -> Self {
        let server_url: String = server_url.into();
        Self {
            http,
            server_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Hash `email` locally and look the digest up.
    pub async fn search_email(&self, email: &str) -> Result<BreachSearchResult> {
        self.search_hash(DataType::Email, &digest(email)).await
    }

    /// Hash `phone` locally and look the digest up.
    pub async fn search_phone(&self, phone: &str) -> Result<BreachSearchResult> {
        self.search_hash(DataType::Phone, &digest(phone)).await
    }

    /// Look up a precomputed digest.
    pub async fn search_hash(&self, data_type: DataType, hash: &str) -> Result<BreachSearchResult> {
        let hash = normalize_digest(hash)?;
        tracing::debug!(kind = %data_type, "Searching breaches");
        self.get(&format!("/api/breach/{data_type}/{hash}")).await
    }

    pub async fn prefix_range(&self, prefix: &HashPrefix) -> Result<PrefixRange> {
        self.get(&format!("/api/breach/password/{prefix}")).await
    }

    /// k-anonymity password check. Only the digest prefix leaves the process;
    /// the suffix is matched against the returned range locally.
    pub async fn check_password(&self, password: &str) -> Result<PasswordCheckResult> {
        let parts = password_digest_parts(password);
        let range = self.prefix_range(&parts.prefix).await?;

        tracing::debug!(
            prefix = %parts.prefix,
            candidates = range.len(),
            "Matching password suffix locally"
        );
        Ok(range.check(&parts.suffix))
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.get("/health").await
    }

    pub async fn breaches(&self) -> Result<Vec<BreachRecord>> {
        self.get("/api/breaches").await
    }

    pub async fn breach(&self, id: BreachId) -> Result<BreachRecord> {
        self.get(&format!("/api/breaches/{id}")).await
    }

    pub async fn membership(&self, id: MembershipId) -> Result<MembershipRecord> {
        self.get(&format!("/api/compromised-data/{id}")).await
    }

    pub async fn add_breach(&self, new: &NewBreach) -> Result<BreachRecord> {
        self.post("/api/breach", new).await
    }

    pub async fn add_membership(&self, new: &NewMembership) -> Result<MembershipRecord> {
        self.post("/api/compromised-data", new).await
    }

    pub async fn add_password_prefix(&self, new: &NewPasswordPrefix) -> Result<PasswordPrefixEntry> {
        self.post("/api/password-prefix", new).await
    }

    pub async fn initialize_demo(&self) -> Result<InitializeResult> {
        let url = format!("{}/api/initialize-demo", self.server_url);
        let resp = self.http.post(&url).send().await?;
        decode(resp).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.server_url, path);
        let resp = self.http.get(&url).send().await?;
        decode(resp).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.server_url, path);
        let resp = self.http.post(&url).json(body).send().await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(server_error(status.as_u16(), &body));
    }
    Ok(serde_json::from_str(&body)?)
}

fn server_error(status: u16, body: &str) -> ClientError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => ClientError::Server {
            status,
            code: parsed.code,
            message: parsed.error,
        },
        Err(_) => ClientError::Server {
            status,
            code: None,
            message: body.to_string(),
        },
    }
}
