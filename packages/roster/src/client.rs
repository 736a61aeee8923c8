//! HTTP binding for the roster API.
//!
//! # Example
//!
//! ```rust,ignore
//! use roster::RosterClient;
//!
//! let client = RosterClient::new("https://api.example.edu".into(), Some(token));
//! let memberships = client.list("chess-club").await?;
//! ```

use async_trait::async_trait;
use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{Result, RosterError};
use crate::model::{Membership, MembershipId, MembershipUpdate};
use crate::service::BaseRosterService;

pub struct RosterClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl RosterClient {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_url.clone(), config.api_token.clone())
    }

    fn memberships_url(&self, org_slug: &str) -> String {
        format!("{}/organizations/{}/memberships", self.base_url, org_slug)
    }

    fn membership_url(&self, org_slug: &str, id: MembershipId) -> String {
        format!("{}/{}", self.memberships_url(org_slug), id)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(resp: Response) -> Result<Response> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RosterError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(resp)
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
        let body = Self::check(resp).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl BaseRosterService for RosterClient {
    async fn list(&self, org_slug: &str) -> Result<Vec<Membership>> {
        let url = self.memberships_url(org_slug);
        let resp = self.authorize(self.client.get(&url)).send().await?;
        let memberships: Vec<Membership> = Self::decode(resp).await?;
        tracing::debug!(org = org_slug, count = memberships.len(), "Fetched memberships");
        Ok(memberships)
    }

    async fn delete(&self, org_slug: &str, membership_id: MembershipId) -> Result<()> {
        let url = self.membership_url(org_slug, membership_id);
        let resp = self.authorize(self.client.delete(&url)).send().await?;
        Self::check(resp).await?;
        tracing::debug!(org = org_slug, membership_id = %membership_id, "Membership deleted");
        Ok(())
    }

    async fn update(&self, org_slug: &str, update: MembershipUpdate) -> Result<Membership> {
        let url = self.membership_url(org_slug, update.id);
        let resp = self
            .authorize(self.client.patch(&url))
            .json(&update)
            .send()
            .await?;
        Self::decode(resp).await
    }
}
