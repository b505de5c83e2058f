//! Node API: feeds, single posts, post construction, likes, broadcast.

use serde::{Deserialize, Serialize};

use crate::models::Post;
use crate::{Api, ApiError, DesoClient, MIN_FEE_RATE_NANOS_PER_KB};

/// Which server-side feed to page through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Global,
    Following,
    Recent,
    /// Engagement-ranked feed over a trailing window, in minutes. Zero means
    /// no lookback limit.
    Hot { lookback_minutes: u64 },
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PostsStatelessRequest {
    reader_public_key_base58_check: String,
    /// Exclusive lower bound: hash of the last post of the previous page.
    post_hash_hex: String,
    num_to_fetch: u64,
    get_posts_for_global_whitelist: bool,
    get_posts_for_follow_feed: bool,
    #[serde(rename = "GetPostsByDESO")]
    get_posts_by_deso: bool,
    #[serde(rename = "PostsByDESOMinutesLookback")]
    posts_by_deso_minutes_lookback: u64,
    order_by: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct PostsStatelessResponse {
    posts_found: Option<Vec<Post>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SinglePostRequest {
    post_hash_hex: String,
    reader_public_key_base58_check: String,
    fetch_parents: bool,
    comment_offset: u64,
    comment_limit: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct SinglePostResponse {
    post_found: Option<Box<Post>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PostBody {
    body: String,
    #[serde(rename = "ImageURLs")]
    image_urls: Vec<String>,
    #[serde(rename = "VideoURLs")]
    video_urls: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SubmitPostRequest {
    updater_public_key_base58_check: String,
    post_hash_hex_to_modify: String,
    #[serde(rename = "ParentStakeID")]
    parent_stake_id: String,
    body_obj: PostBody,
    reposted_post_hash_hex: String,
    is_hidden: bool,
    #[serde(rename = "MinFeeRateNanosPerKB")]
    min_fee_rate_nanos_per_kb: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
struct LikeRequest {
    reader_public_key_base58_check: String,
    liked_post_hash_hex: String,
    is_unlike: bool,
    #[serde(rename = "MinFeeRateNanosPerKB")]
    min_fee_rate_nanos_per_kb: u64,
}

/// Unsigned transaction produced by a construction endpoint. The caller signs
/// it out-of-process and broadcasts the result with
/// [`DesoClient::submit_transaction`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct UnsignedTransaction {
    pub transaction_hex: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SubmitTransactionRequest {
    transaction_hex: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SubmitTransactionResponse {
    /// Populated when the broadcast transaction was a post submission.
    pub post_entry_response: Option<Box<Post>>,
}

/// What a new or edited post should contain. Exactly the fields the compose
/// screen controls; everything else is derived server-side.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub body: String,
    pub image_urls: Vec<String>,
    pub video_urls: Vec<String>,
    /// Hash of the post being replied to, for comments.
    pub parent_post_hash_hex: Option<String>,
    /// Hash of the post being reposted or quoted.
    pub reposted_post_hash_hex: Option<String>,
    /// Hash of an existing post when editing instead of creating.
    pub edited_post_hash_hex: Option<String>,
}

impl DesoClient {
    /// One page of a server-ordered feed. `cursor` is the hash of the last
    /// post already seen, or `None` for the first page.
    pub async fn get_posts_stateless(
        &self,
        reader_public_key: &str,
        kind: FeedKind,
        cursor: Option<&str>,
        num_to_fetch: u64,
    ) -> Result<Vec<Post>, ApiError> {
        let mut request = PostsStatelessRequest {
            reader_public_key_base58_check: reader_public_key.to_string(),
            post_hash_hex: cursor.unwrap_or_default().to_string(),
            num_to_fetch,
            ..Default::default()
        };
        match kind {
            FeedKind::Global => request.get_posts_for_global_whitelist = true,
            FeedKind::Following => request.get_posts_for_follow_feed = true,
            FeedKind::Recent => request.order_by = "newest".to_string(),
            FeedKind::Hot { lookback_minutes } => {
                request.get_posts_by_deso = true;
                request.posts_by_deso_minutes_lookback = lookback_minutes;
            }
        }
        let response: PostsStatelessResponse = self
            .post_json(Api::Node, "get-posts-stateless", &request)
            .await?;
        Ok(response.posts_found.unwrap_or_default())
    }

    /// A post with its ancestor chain (optional) and a comment window.
    /// Returns `Ok(None)` when the node knows no such post.
    pub async fn get_single_post(
        &self,
        reader_public_key: &str,
        post_hash_hex: &str,
        fetch_parents: bool,
        comment_offset: u64,
        comment_limit: u64,
    ) -> Result<Option<Box<Post>>, ApiError> {
        let request = SinglePostRequest {
            post_hash_hex: post_hash_hex.to_string(),
            reader_public_key_base58_check: reader_public_key.to_string(),
            fetch_parents,
            comment_offset,
            comment_limit,
        };
        let response: SinglePostResponse =
            self.post_json(Api::Node, "get-single-post", &request).await?;
        Ok(response.post_found)
    }

    /// Construct the (unsigned) transaction for a new, edited, reply or
    /// repost post.
    pub async fn submit_post(
        &self,
        updater_public_key: &str,
        post: &NewPost,
    ) -> Result<UnsignedTransaction, ApiError> {
        let request = SubmitPostRequest {
            updater_public_key_base58_check: updater_public_key.to_string(),
            post_hash_hex_to_modify: post.edited_post_hash_hex.clone().unwrap_or_default(),
            parent_stake_id: post.parent_post_hash_hex.clone().unwrap_or_default(),
            body_obj: PostBody {
                body: post.body.clone(),
                image_urls: post.image_urls.clone(),
                video_urls: post.video_urls.clone(),
            },
            reposted_post_hash_hex: post.reposted_post_hash_hex.clone().unwrap_or_default(),
            is_hidden: false,
            min_fee_rate_nanos_per_kb: MIN_FEE_RATE_NANOS_PER_KB,
        };
        self.post_json(Api::Node, "submit-post", &request).await
    }

    /// Construct the (unsigned) like/unlike transaction.
    pub async fn create_like_stateless(
        &self,
        reader_public_key: &str,
        liked_post_hash_hex: &str,
        is_unlike: bool,
    ) -> Result<UnsignedTransaction, ApiError> {
        let request = LikeRequest {
            reader_public_key_base58_check: reader_public_key.to_string(),
            liked_post_hash_hex: liked_post_hash_hex.to_string(),
            is_unlike,
            min_fee_rate_nanos_per_kb: MIN_FEE_RATE_NANOS_PER_KB,
        };
        self.post_json(Api::Node, "create-like-stateless", &request)
            .await
    }

    /// Broadcast a signed transaction hex.
    pub async fn submit_transaction(
        &self,
        signed_transaction_hex: &str,
    ) -> Result<SubmitTransactionResponse, ApiError> {
        let request = SubmitTransactionRequest {
            transaction_hex: signed_transaction_hex.to_string(),
        };
        self.post_json(Api::Node, "submit-transaction", &request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_request_serializes_backend_flags() {
        let request = PostsStatelessRequest {
            reader_public_key_base58_check: "BC1me".into(),
            post_hash_hex: "lasthash".into(),
            num_to_fetch: 10,
            get_posts_by_deso: true,
            posts_by_deso_minutes_lookback: 1440,
            ..Default::default()
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["ReaderPublicKeyBase58Check"], "BC1me");
        assert_eq!(value["PostHashHex"], "lasthash");
        assert_eq!(value["NumToFetch"], 10);
        assert_eq!(value["GetPostsByDESO"], true);
        assert_eq!(value["PostsByDESOMinutesLookback"], 1440);
    }

    #[test]
    fn submit_post_request_nests_the_body_object() {
        let post = NewPost {
            body: "hello".into(),
            parent_post_hash_hex: Some("parent".into()),
            ..Default::default()
        };
        let request = SubmitPostRequest {
            updater_public_key_base58_check: "BC1me".into(),
            parent_stake_id: post.parent_post_hash_hex.clone().unwrap_or_default(),
            body_obj: PostBody {
                body: post.body.clone(),
                image_urls: vec![],
                video_urls: vec![],
            },
            min_fee_rate_nanos_per_kb: MIN_FEE_RATE_NANOS_PER_KB,
            ..Default::default()
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["BodyObj"]["Body"], "hello");
        assert_eq!(value["ParentStakeID"], "parent");
        assert_eq!(value["MinFeeRateNanosPerKB"], 1000);
    }
}
