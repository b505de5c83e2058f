//! Blocked-content filtering, applied between the accumulated lists and the
//! view state handed to the shell.

use std::collections::HashSet;

use deso_api::models::{Post, User};

use crate::state::HiddenNftMode;

/// Visibility rules for one derivation pass. Pure: consults the blocklist,
/// never mutates it.
#[derive(Clone, Debug, Default)]
pub(crate) struct PostFilter {
    pub blocklist: HashSet<String>,
    pub hidden_nft_mode: HiddenNftMode,
}

impl PostFilter {
    /// A post is visible iff it has a poster profile, is not flagged hidden,
    /// and neither its author nor the reposted post's author is blocked.
    pub fn allows(&self, post: &Post) -> bool {
        let Some(profile) = post.profile_entry_response.as_ref() else {
            return false;
        };
        if post.is_hidden {
            return false;
        }
        if self.blocklist.contains(&profile.public_key_base58_check) {
            return false;
        }
        if let Some(reposted_author) = post.reposted_author_key() {
            if self.blocklist.contains(reposted_author) {
                return false;
            }
        }
        if self.hidden_nft_mode == HiddenNftMode::Hide && post.is_nft {
            return false;
        }
        true
    }

    pub fn apply(&self, posts: &[Post]) -> Vec<Post> {
        posts.iter().filter(|p| self.allows(p)).cloned().collect()
    }
}

/// The blocklist is the key set of the user's blocked-keys map. Duplicate or
/// odd-valued entries from the backend collapse into set membership.
pub(crate) fn blocklist_from_user(user: &User) -> HashSet<String> {
    user.blocked_pub_keys.keys().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use deso_api::models::ProfileEntryResponse;

    fn post_by(author: &str) -> Post {
        Post {
            post_hash_hex: format!("post-by-{author}"),
            profile_entry_response: Some(ProfileEntryResponse {
                public_key_base58_check: author.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn filter_blocking(keys: &[&str]) -> PostFilter {
        PostFilter {
            blocklist: keys.iter().map(|k| k.to_string()).collect(),
            hidden_nft_mode: HiddenNftMode::Show,
        }
    }

    #[test]
    fn blocked_author_is_dropped_others_stay() {
        let filter = filter_blocking(&["userA"]);
        let posts = vec![post_by("userA"), post_by("userB")];
        let visible = filter.apply(&posts);
        assert_eq!(visible.len(), 1);
        assert_eq!(
            visible[0]
                .profile_entry_response
                .as_ref()
                .unwrap()
                .public_key_base58_check,
            "userB"
        );
    }

    #[test]
    fn blocked_reposted_author_hides_the_wrapping_post() {
        let mut wrapper = post_by("userB");
        wrapper.reposted_post_entry_response = Some(Box::new(post_by("userA")));
        let filter = filter_blocking(&["userA"]);
        assert!(!filter.allows(&wrapper));
        assert!(filter_blocking(&["userC"]).allows(&wrapper));
    }

    #[test]
    fn hidden_and_profileless_posts_never_show() {
        let filter = filter_blocking(&[]);
        let mut hidden = post_by("userA");
        hidden.is_hidden = true;
        assert!(!filter.allows(&hidden));

        let orphan = Post::default();
        assert!(!filter.allows(&orphan));
    }

    #[test]
    fn filter_is_idempotent() {
        let filter = filter_blocking(&["userA"]);
        let posts = vec![post_by("userA"), post_by("userB"), post_by("userC")];
        let once = filter.apply(&posts);
        let twice = filter.apply(&once);
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.post_hash_hex, b.post_hash_hex);
        }
    }

    #[test]
    fn nft_posts_drop_only_in_hide_mode() {
        let mut nft = post_by("userA");
        nft.is_nft = true;

        let mut filter = filter_blocking(&[]);
        assert!(filter.allows(&nft));
        filter.hidden_nft_mode = HiddenNftMode::Details;
        assert!(filter.allows(&nft));
        filter.hidden_nft_mode = HiddenNftMode::Hide;
        assert!(!filter.allows(&nft));
    }

    #[test]
    fn blocklist_has_set_semantics_regardless_of_map_values() {
        let user: User = serde_json::from_value(serde_json::json!({
            "PublicKeyBase58Check": "BC1me",
            "BlockedPubKeys": { "userA": {}, "userB": false, "userC": 3 }
        }))
        .unwrap();
        let blocklist = blocklist_from_user(&user);
        assert_eq!(blocklist.len(), 3);
        assert!(blocklist.contains("userB"));
    }
}
