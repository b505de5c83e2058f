//! CloutCast promotion API. Bearer-token authenticated: the caller first
//! exchanges a node JWT for a CloutCast session token.

use serde::{Deserialize, Serialize};

use crate::models::CloutCastPromotion;
use crate::{Api, ApiError, DesoClient};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateRequest<'a> {
    public_key: &'a str,
    jwt: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct AuthenticateResponse {
    token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProofOfWorkRequest<'a> {
    post_hash_hex: &'a str,
}

impl DesoClient {
    /// Exchange a node JWT for a CloutCast bearer token.
    pub async fn cloutcast_authenticate(
        &self,
        public_key: &str,
        jwt: &str,
    ) -> Result<String, ApiError> {
        let request = AuthenticateRequest { public_key, jwt };
        let response: AuthenticateResponse = self
            .post_json(Api::CloutCast, "authenticate", &request)
            .await?;
        if response.token.is_empty() {
            return Err(ApiError::Validation(
                "promotion service returned an empty token".to_string(),
            ));
        }
        Ok(response.token)
    }

    /// Promotions currently accepting engagements.
    pub async fn active_promotions(
        &self,
        bearer_token: &str,
    ) -> Result<Vec<CloutCastPromotion>, ApiError> {
        self.get_json_bearer(Api::CloutCast, "promotions/active", bearer_token)
            .await
    }

    /// Claim a promotion reward after the promoting post exists on-chain.
    pub async fn submit_proof_of_work(
        &self,
        promotion_id: u64,
        post_hash_hex: &str,
        bearer_token: &str,
    ) -> Result<(), ApiError> {
        let route = format!("promotions/{promotion_id}/proof-of-work");
        let request = ProofOfWorkRequest { post_hash_hex };
        let _: serde_json::Value = self
            .post_json_bearer(Api::CloutCast, &route, bearer_token, &request)
            .await?;
        Ok(())
    }
}
