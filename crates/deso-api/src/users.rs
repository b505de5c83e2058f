//! Node API: users, profiles, holders, notifications, exchange rate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    CreatorCoinHodler, ExchangeRate, Notification, ProfileEntryResponse, User,
};
use crate::posts::UnsignedTransaction;
use crate::{Api, ApiError, DesoClient, MIN_FEE_RATE_NANOS_PER_KB};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
struct UsersStatelessRequest {
    public_keys_base58_check: Vec<String>,
    skip_for_leaderboard: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct UsersStatelessResponse {
    user_list: Vec<User>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SingleProfileRequest {
    public_key_base58_check: String,
    username: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct SingleProfileResponse {
    profile: Option<ProfileEntryResponse>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
struct HodlersRequest {
    public_key_base58_check: String,
    last_public_key_base58_check: String,
    num_to_fetch: u64,
    fetch_hodlings: bool,
    fetch_all: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct HodlersPage {
    pub hodlers: Vec<CreatorCoinHodler>,
    pub last_public_key_base58_check: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
struct NotificationsRequest {
    public_key_base58_check: String,
    /// Index to page down from; −1 requests the newest page.
    fetch_start_index: i64,
    num_to_fetch: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct NotificationsPage {
    pub notifications: Vec<Notification>,
    pub profiles_by_public_key: HashMap<String, ProfileEntryResponse>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
struct FollowsStatelessRequest {
    public_key_base58_check: String,
    get_entries_following_public_key: bool,
    num_to_fetch: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct FollowsStatelessResponse {
    num_followers: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
struct UpdateProfileRequest {
    updater_public_key_base58_check: String,
    new_username: String,
    new_description: String,
    new_creator_basis_points: u64,
    #[serde(rename = "MinFeeRateNanosPerKB")]
    min_fee_rate_nanos_per_kb: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
struct BlockPublicKeyRequest {
    public_key_base58_check: String,
    block_public_key_base58_check: String,
    unblock: bool,
    #[serde(rename = "JWT")]
    jwt: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct BlockPublicKeyResponse {
    pub blocked_pub_keys: HashMap<String, serde_json::Value>,
}

impl DesoClient {
    /// Full user records (balance, blocked keys, coins held) for the given
    /// public keys, in request order.
    pub async fn get_users_stateless(
        &self,
        public_keys: &[String],
    ) -> Result<Vec<User>, ApiError> {
        let request = UsersStatelessRequest {
            public_keys_base58_check: public_keys.to_vec(),
            skip_for_leaderboard: false,
        };
        let response: UsersStatelessResponse = self
            .post_json(Api::Node, "get-users-stateless", &request)
            .await?;
        Ok(response.user_list)
    }

    /// Profile lookup by public key (preferred) or username.
    pub async fn get_single_profile(
        &self,
        public_key: &str,
        username: &str,
    ) -> Result<Option<ProfileEntryResponse>, ApiError> {
        let request = SingleProfileRequest {
            public_key_base58_check: public_key.to_string(),
            username: username.to_string(),
        };
        let response: SingleProfileResponse = self
            .post_json(Api::Node, "get-single-profile", &request)
            .await?;
        Ok(response.profile)
    }

    /// One page of a creator's coin-holder list.
    pub async fn get_hodlers_for_public_key(
        &self,
        public_key: &str,
        cursor: Option<&str>,
        num_to_fetch: u64,
    ) -> Result<HodlersPage, ApiError> {
        let request = HodlersRequest {
            public_key_base58_check: public_key.to_string(),
            last_public_key_base58_check: cursor.unwrap_or_default().to_string(),
            num_to_fetch,
            fetch_hodlings: false,
            fetch_all: false,
        };
        self.post_json(Api::Node, "get-hodlers-for-public-key", &request)
            .await
    }

    /// One page of notifications plus the profiles they reference.
    /// `fetch_start_index` of −1 requests the newest page.
    pub async fn get_notifications(
        &self,
        public_key: &str,
        fetch_start_index: i64,
        num_to_fetch: u64,
    ) -> Result<NotificationsPage, ApiError> {
        let request = NotificationsRequest {
            public_key_base58_check: public_key.to_string(),
            fetch_start_index,
            num_to_fetch,
        };
        self.post_json(Api::Node, "get-notifications", &request).await
    }

    /// Follower count of the given user.
    pub async fn get_follower_count(&self, public_key: &str) -> Result<u64, ApiError> {
        let request = FollowsStatelessRequest {
            public_key_base58_check: public_key.to_string(),
            get_entries_following_public_key: true,
            num_to_fetch: 0,
        };
        let response: FollowsStatelessResponse = self
            .post_json(Api::Node, "get-follows-stateless", &request)
            .await?;
        Ok(response.num_followers)
    }

    /// Current DeSo exchange rate. Consumers cache this; it changes slowly.
    pub async fn get_exchange_rate(&self) -> Result<ExchangeRate, ApiError> {
        self.get_json(Api::Node, "get-exchange-rate").await
    }

    /// Construct the (unsigned) profile-update transaction.
    pub async fn update_profile(
        &self,
        updater_public_key: &str,
        new_username: &str,
        new_description: &str,
        new_creator_basis_points: u64,
    ) -> Result<UnsignedTransaction, ApiError> {
        let request = UpdateProfileRequest {
            updater_public_key_base58_check: updater_public_key.to_string(),
            new_username: new_username.to_string(),
            new_description: new_description.to_string(),
            new_creator_basis_points,
            min_fee_rate_nanos_per_kb: MIN_FEE_RATE_NANOS_PER_KB,
        };
        self.post_json(Api::Node, "update-profile", &request).await
    }

    /// Block or unblock a user. JWT-authenticated; returns the full updated
    /// blocked-key set.
    pub async fn block_public_key(
        &self,
        public_key: &str,
        block_public_key: &str,
        unblock: bool,
        jwt: &str,
    ) -> Result<BlockPublicKeyResponse, ApiError> {
        let request = BlockPublicKeyRequest {
            public_key_base58_check: public_key.to_string(),
            block_public_key_base58_check: block_public_key.to_string(),
            unblock,
            jwt: jwt.to_string(),
        };
        self.post_json(Api::Node, "block-public-key", &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_page_deserializes_profile_map() {
        let json = serde_json::json!({
            "Notifications": [
                { "Index": 41, "Metadata": { "TxnType": "LIKE",
                    "TransactorPublicKeyBase58Check": "BC1fan" } }
            ],
            "ProfilesByPublicKey": {
                "BC1fan": { "PublicKeyBase58Check": "BC1fan", "Username": "fan" }
            }
        });
        let page: NotificationsPage = serde_json::from_value(json).unwrap();
        assert_eq!(page.notifications.len(), 1);
        assert_eq!(page.notifications[0].index, 41);
        assert_eq!(page.profiles_by_public_key["BC1fan"].username, "fan");
    }

    #[test]
    fn block_request_carries_uppercase_jwt_field() {
        let request = BlockPublicKeyRequest {
            public_key_base58_check: "BC1me".into(),
            block_public_key_base58_check: "BC1spam".into(),
            unblock: false,
            jwt: "token".into(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["JWT"], "token");
        assert_eq!(value["BlockPublicKeyBase58Check"], "BC1spam");
    }
}
