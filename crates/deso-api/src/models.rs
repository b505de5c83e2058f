//! Wire model shared by every endpoint module.
//!
//! Field names mirror the backend's JSON exactly (node API: PascalCase,
//! companion/CloutCast APIs: camelCase). Unknown fields are ignored and
//! absent fields surface as explicit `Option`s or defaults, never panics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Post {
    pub post_hash_hex: String,
    pub poster_public_key_base58_check: String,
    pub body: String,
    #[serde(rename = "ImageURLs")]
    pub image_urls: Option<Vec<String>>,
    #[serde(rename = "VideoURLs")]
    pub video_urls: Option<Vec<String>>,
    pub timestamp_nanos: i64,
    pub is_hidden: bool,
    #[serde(rename = "IsNFT")]
    pub is_nft: bool,
    pub like_count: u64,
    pub comment_count: u64,
    pub repost_count: u64,
    pub diamond_count: u64,
    #[serde(rename = "ParentStakeID")]
    pub parent_stake_id: Option<String>,
    pub profile_entry_response: Option<ProfileEntryResponse>,
    pub reposted_post_entry_response: Option<Box<Post>>,
    /// Comment window attached by `get-single-post`; `None` on feed pages.
    pub comments: Option<Vec<Post>>,
    /// Ancestor chain attached by `get-single-post` when parents are requested.
    pub parent_posts: Option<Vec<Post>>,
    pub post_entry_reader_state: Option<PostEntryReaderState>,
}

impl Post {
    /// Public key of the reposted/quoted post's author, when there is one.
    pub fn reposted_author_key(&self) -> Option<&str> {
        self.reposted_post_entry_response
            .as_deref()
            .and_then(|p| p.profile_entry_response.as_ref())
            .map(|p| p.public_key_base58_check.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PostEntryReaderState {
    pub liked_by_reader: bool,
    pub reposted_by_reader: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ProfileEntryResponse {
    pub public_key_base58_check: String,
    pub username: String,
    pub description: String,
    pub is_verified: bool,
    pub coin_entry: CoinEntry,
    #[serde(rename = "CoinPriceDeSoNanos")]
    pub coin_price_deso_nanos: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CoinEntry {
    #[serde(rename = "DeSoLockedNanos")]
    pub deso_locked_nanos: u64,
    pub coins_in_circulation_nanos: u64,
    pub creator_basis_points: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct User {
    pub public_key_base58_check: String,
    pub profile_entry_response: Option<ProfileEntryResponse>,
    pub balance_nanos: u64,
    /// JSON map keyed by blocked public key. The values carry no information;
    /// membership is what matters (set semantics).
    pub blocked_pub_keys: HashMap<String, serde_json::Value>,
    #[serde(rename = "UsersYouHODL")]
    pub users_you_hodl: Vec<CreatorCoinHodler>,
    pub public_keys_base58_check_followed_by_user: Vec<String>,
}

impl User {
    pub fn username(&self) -> &str {
        self.profile_entry_response
            .as_ref()
            .map(|p| p.username.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CreatorCoinHodler {
    #[serde(rename = "HODLerPublicKeyBase58Check")]
    pub hodler_public_key_base58_check: String,
    pub creator_public_key_base58_check: String,
    pub balance_nanos: u64,
    pub has_purchased: bool,
    pub profile_entry_response: Option<ProfileEntryResponse>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Notification {
    pub index: i64,
    pub metadata: TransactionMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct TransactionMetadata {
    pub txn_type: String,
    pub transactor_public_key_base58_check: String,
    pub creator_coin_txindex_metadata: Option<CreatorCoinTxindexMetadata>,
    pub like_txindex_metadata: Option<LikeTxindexMetadata>,
    pub submit_post_txindex_metadata: Option<SubmitPostTxindexMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CreatorCoinTxindexMetadata {
    pub operation_type: String,
    #[serde(rename = "DeSoToSellNanos")]
    pub deso_to_sell_nanos: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct LikeTxindexMetadata {
    pub is_unlike: bool,
    pub post_hash_hex: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SubmitPostTxindexMetadata {
    pub post_hash_being_modified_hex: String,
    pub parent_post_hash_hex: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeRate {
    #[serde(rename = "SatoshisPerDeSoExchangeRate")]
    pub satoshis_per_deso: u64,
    #[serde(rename = "USDCentsPerDeSoExchangeRate")]
    pub usd_cents_per_deso: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloutTag {
    #[serde(rename = "clouttag")]
    pub tag: String,
    #[serde(rename = "count")]
    pub count: u64,
}

// --- CloutCast promotions (camelCase wire format) ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CloutCastPromotion {
    pub id: u64,
    pub client: CloutCastClient,
    pub target: CloutCastTarget,
    pub header: CloutCastHeader,
    pub criteria: CloutCastCriteria,
    pub events: Option<CloutCastEvent>,
    pub promoters: Vec<CloutCastClient>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CloutCastClient {
    pub public_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CloutCastTarget {
    /// Raw engagement kind as the service spells it; see
    /// [`CloutCastTarget::action_kind`].
    pub action: String,
    /// Post hash of the post being promoted.
    pub hex: String,
}

impl CloutCastTarget {
    /// Parsed engagement kind. Unrecognized values (the service adds kinds
    /// over time) come back as [`CloutCastAction::Unknown`].
    pub fn action_kind(&self) -> CloutCastAction {
        match self.action.as_str() {
            "ReClout" => CloutCastAction::ReClout,
            "Quote" => CloutCastAction::Quote,
            "Comment" => CloutCastAction::Comment,
            _ => CloutCastAction::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloutCastAction {
    ReClout,
    Quote,
    Comment,
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CloutCastEvent {
    pub action: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CloutCastHeader {
    pub rate: u64,
    pub fee: u64,
    pub engagements: u64,
    pub duration: u64,
    pub bit_clout_to_usd_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CloutCastCriteria {
    pub min_coin_price: u64,
    pub min_follower_count: u64,
    pub allowed_users: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_deserializes_backend_field_names() {
        let json = serde_json::json!({
            "PostHashHex": "abc123",
            "PosterPublicKeyBase58Check": "BC1userA",
            "Body": "gm",
            "TimestampNanos": 1_700_000_000_000_000_000u64,
            "IsNFT": true,
            "IsHidden": false,
            "LikeCount": 3,
            "ImageURLs": ["https://images.example/one.png"],
            "ProfileEntryResponse": {
                "PublicKeyBase58Check": "BC1userA",
                "Username": "userA",
                "CoinEntry": {
                    "DeSoLockedNanos": 5_000_000_000u64,
                    "CoinsInCirculationNanos": 10_000_000_000u64
                },
                "CoinPriceDeSoNanos": 1_500_000_000u64
            },
            "SomeFieldWeDoNotKnow": {"ignored": true}
        });
        let post: Post = serde_json::from_value(json).unwrap();
        assert_eq!(post.post_hash_hex, "abc123");
        assert!(post.is_nft);
        assert_eq!(post.like_count, 3);
        let profile = post.profile_entry_response.unwrap();
        assert_eq!(profile.coin_entry.deso_locked_nanos, 5_000_000_000);
        assert_eq!(profile.coin_price_deso_nanos, 1_500_000_000);
    }

    #[test]
    fn reposted_author_key_walks_the_nested_post() {
        let json = serde_json::json!({
            "PostHashHex": "outer",
            "RepostedPostEntryResponse": {
                "PostHashHex": "inner",
                "ProfileEntryResponse": { "PublicKeyBase58Check": "BC1reposted" }
            }
        });
        let post: Post = serde_json::from_value(json).unwrap();
        assert_eq!(post.reposted_author_key(), Some("BC1reposted"));
    }

    #[test]
    fn blocked_pub_keys_have_set_semantics() {
        let json = serde_json::json!({
            "PublicKeyBase58Check": "BC1me",
            "BalanceNanos": 42,
            "BlockedPubKeys": { "BC1spam": {}, "BC1troll": true }
        });
        let user: User = serde_json::from_value(json).unwrap();
        assert!(user.blocked_pub_keys.contains_key("BC1spam"));
        assert!(user.blocked_pub_keys.contains_key("BC1troll"));
        assert_eq!(user.blocked_pub_keys.len(), 2);
    }

    #[test]
    fn promotion_uses_camel_case_and_tolerates_unknown_action() {
        let json = serde_json::json!({
            "id": 7,
            "client": { "publicKey": "BC1promoter" },
            "target": { "action": "ReClout", "hex": "abc" },
            "criteria": { "minCoinPrice": 100, "minFollowerCount": 5, "allowedUsers": [] },
            "header": { "rate": 10, "fee": 1, "engagements": 20, "duration": 3600 },
            "promoters": [{ "publicKey": "BC1done" }]
        });
        let promo: CloutCastPromotion = serde_json::from_value(json).unwrap();
        assert_eq!(promo.target.action_kind(), CloutCastAction::ReClout);
        assert_eq!(promo.criteria.min_follower_count, 5);

        let odd: CloutCastTarget =
            serde_json::from_value(serde_json::json!({ "action": "Dance", "hex": "x" })).unwrap();
        assert_eq!(odd.action_kind(), CloutCastAction::Unknown);
    }
}
