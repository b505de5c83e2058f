//! CloutFeed companion API: saved posts, pinned posts, clout tags.
//!
//! Unlike the node API this backend speaks camelCase and authenticates reads
//! with a JWT query parameter.

use serde::{Deserialize, Serialize};

use crate::models::{CloutTag, Post};
use crate::{Api, ApiError, DesoClient};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedPostRequest<'a> {
    public_key: &'a str,
    jwt: &'a str,
    post_hash_hex: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PinnedPostRequest<'a> {
    public_key: &'a str,
    jwt: &'a str,
    post_hash_hex: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct PinnedPostResponse {
    #[serde(rename = "pinnedPost")]
    pinned_post: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct CloutTagPostsResponse {
    posts: Vec<Post>,
}

impl DesoClient {
    /// Hashes of the user's saved posts, newest first. The backend does not
    /// guarantee uniqueness; callers apply set semantics.
    pub async fn get_saved_posts(
        &self,
        public_key: &str,
        jwt: &str,
    ) -> Result<Vec<String>, ApiError> {
        let route = format!("saved-posts/{public_key}?jwt={jwt}");
        self.get_json(Api::Companion, &route).await
    }

    pub async fn save_post(
        &self,
        public_key: &str,
        jwt: &str,
        post_hash_hex: &str,
    ) -> Result<(), ApiError> {
        let request = SavedPostRequest {
            public_key,
            jwt,
            post_hash_hex,
        };
        let _: serde_json::Value = self
            .post_json(Api::Companion, "saved-posts/save", &request)
            .await?;
        Ok(())
    }

    pub async fn unsave_post(
        &self,
        public_key: &str,
        jwt: &str,
        post_hash_hex: &str,
    ) -> Result<(), ApiError> {
        let request = SavedPostRequest {
            public_key,
            jwt,
            post_hash_hex,
        };
        let _: serde_json::Value = self
            .post_json(Api::Companion, "saved-posts/unsave", &request)
            .await?;
        Ok(())
    }

    /// Hash of the post the user pinned to their profile, if any.
    pub async fn get_pinned_post(&self, public_key: &str) -> Result<Option<String>, ApiError> {
        let route = format!("pinned-posts/{public_key}");
        let response: PinnedPostResponse = self.get_json(Api::Companion, &route).await?;
        Ok(response.pinned_post)
    }

    pub async fn pin_post(
        &self,
        public_key: &str,
        jwt: &str,
        post_hash_hex: &str,
    ) -> Result<(), ApiError> {
        let request = PinnedPostRequest {
            public_key,
            jwt,
            post_hash_hex,
        };
        let _: serde_json::Value = self
            .post_json(Api::Companion, "pinned-posts/pin", &request)
            .await?;
        Ok(())
    }

    pub async fn unpin_post(
        &self,
        public_key: &str,
        jwt: &str,
        post_hash_hex: &str,
    ) -> Result<(), ApiError> {
        let request = PinnedPostRequest {
            public_key,
            jwt,
            post_hash_hex,
        };
        let _: serde_json::Value = self
            .post_json(Api::Companion, "pinned-posts/unpin", &request)
            .await?;
        Ok(())
    }

    pub async fn trending_clout_tags(
        &self,
        num_to_fetch: u64,
        offset: u64,
    ) -> Result<Vec<CloutTag>, ApiError> {
        let route = format!("clouttags/trending?numToFetch={num_to_fetch}&offset={offset}");
        self.get_json(Api::Companion, &route).await
    }

    pub async fn search_clout_tags(&self, term: &str) -> Result<Vec<CloutTag>, ApiError> {
        let encoded: String = url::form_urlencoded::byte_serialize(term.as_bytes()).collect();
        let route = format!("clouttags/search/{encoded}");
        self.get_json(Api::Companion, &route).await
    }

    pub async fn clout_tag_posts(
        &self,
        term: &str,
        num_to_fetch: u64,
        offset: u64,
    ) -> Result<Vec<Post>, ApiError> {
        let encoded: String = url::form_urlencoded::byte_serialize(term.as_bytes()).collect();
        let route = format!("clouttag/{encoded}/posts?numToFetch={num_to_fetch}&offset={offset}");
        let response: CloutTagPostsResponse = self.get_json(Api::Companion, &route).await?;
        Ok(response.posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_post_request_uses_camel_case() {
        let request = SavedPostRequest {
            public_key: "BC1me",
            jwt: "token",
            post_hash_hex: "abc",
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["publicKey"], "BC1me");
        assert_eq!(value["jwt"], "token");
        assert_eq!(value["postHashHex"], "abc");
    }

    #[test]
    fn pinned_post_response_field_is_optional() {
        let some: PinnedPostResponse =
            serde_json::from_value(serde_json::json!({ "pinnedPost": "abc" })).unwrap();
        assert_eq!(some.pinned_post.as_deref(), Some("abc"));
        let none: PinnedPostResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(none.pinned_post, None);
    }
}
