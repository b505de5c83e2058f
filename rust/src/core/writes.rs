// Write path. Every node-side mutation is the same two-phase dance: a
// construction endpoint returns unsigned transaction hex, the injected signer
// signs it, and the signed hex is broadcast. Companion-API writes carry a
// fresh JWT instead. Failures always surface as a toast; nothing here is
// retried automatically.

use std::sync::Arc;

use deso_api::models::Post;
use deso_api::{
    ApiError, BlockPublicKeyResponse, DesoClient, NewPost, SubmitTransactionResponse,
    TransactionSigner, UnsignedTransaction,
};

use super::*;
use crate::core::session::JwtVault;

/// Sign an unsigned transaction and broadcast it.
pub(super) async fn sign_and_submit(
    client: &DesoClient,
    signer: &Arc<dyn TransactionSigner>,
    unsigned: UnsignedTransaction,
) -> Result<SubmitTransactionResponse, WriteFailure> {
    let signed = signer.sign_transaction(&unsigned.transaction_hex).await?;
    Ok(client.submit_transaction(&signed).await?)
}

async fn fresh_jwt(jwt: &JwtVault) -> Result<String, WriteFailure> {
    Ok(jwt.token().await?)
}

impl AppCore {
    pub(super) fn submit_post(&mut self, post: NewPost) {
        let (public_key, alive) = {
            let Some(sess) = self.session.as_ref() else {
                self.toast("Please log in first");
                return;
            };
            (sess.public_key.clone(), sess.alive.clone())
        };
        // Local precondition: an empty post is refused before any request.
        if post.body.trim().is_empty()
            && post.image_urls.is_empty()
            && post.video_urls.is_empty()
            && post.reposted_post_hash_hex.is_none()
        {
            self.toast(
                ApiError::Validation("Write something before you post!".into()).user_message(),
            );
            return;
        }
        if !self.network_enabled() {
            self.toast("Network disabled");
            return;
        }
        if self.state.busy.submitting_post {
            return;
        }
        self.set_busy(|b| b.submitting_post = true);

        let signer = self.signer.clone();
        let client = self.client.clone();
        let tx = self.core_sender.clone();
        let parent_post_hash_hex = post.parent_post_hash_hex.clone();

        self.runtime.spawn(async move {
            let result = async {
                let unsigned = client.submit_post(&public_key, &post).await?;
                let response = sign_and_submit(&client, &signer, unsigned).await?;
                Ok::<_, WriteFailure>(response.post_entry_response)
            }
            .await;
            if alive.load(Ordering::SeqCst) {
                let _ = tx.send(CoreMsg::Internal(Box::new(InternalEvent::PostSubmitted {
                    result,
                    parent_post_hash_hex,
                })));
            }
        });
    }

    pub(super) fn apply_post_submitted(
        &mut self,
        result: Result<Option<Box<Post>>, WriteFailure>,
        parent_post_hash_hex: Option<String>,
    ) {
        self.set_busy(|b| b.submitting_post = false);
        match result {
            Ok(Some(post)) => match parent_post_hash_hex {
                Some(parent) => self.insert_new_comment(&parent, *post),
                None => {
                    self.home_feed.prepend_unique(*post);
                    self.sync_home_view();
                    self.emit_state();
                }
            },
            Ok(None) => {
                // Broadcast succeeded but the node returned no post entry;
                // the next refresh will pick it up.
                self.emit_state();
            }
            Err(failure) => self.toast(failure.user_message()),
        }
    }

    pub(super) fn toggle_like(&mut self, post_hash_hex: String, unlike: bool) {
        let (public_key, alive) = {
            let Some(sess) = self.session.as_ref() else {
                self.toast("Please log in first");
                return;
            };
            (sess.public_key.clone(), sess.alive.clone())
        };
        if !self.network_enabled() {
            self.toast("Network disabled");
            return;
        }

        let signer = self.signer.clone();
        let client = self.client.clone();
        let tx = self.core_sender.clone();

        self.runtime.spawn(async move {
            let result = async {
                let unsigned = client
                    .create_like_stateless(&public_key, &post_hash_hex, unlike)
                    .await?;
                sign_and_submit(&client, &signer, unsigned).await?;
                Ok::<_, WriteFailure>(())
            }
            .await;
            if alive.load(Ordering::SeqCst) {
                let _ = tx.send(CoreMsg::Internal(Box::new(InternalEvent::LikeToggled {
                    post_hash_hex,
                    unlike,
                    result,
                })));
            }
        });
    }

    pub(super) fn apply_like_toggled(
        &mut self,
        post_hash_hex: &str,
        unlike: bool,
        result: Result<(), WriteFailure>,
    ) {
        match result {
            Ok(()) => {
                let patch = |post: &mut Post| {
                    post.like_count = if unlike {
                        post.like_count.saturating_sub(1)
                    } else {
                        post.like_count.saturating_add(1)
                    };
                    if let Some(reader_state) = post.post_entry_reader_state.as_mut() {
                        reader_state.liked_by_reader = !unlike;
                    }
                };
                self.home_feed.update(post_hash_hex, patch);
                self.saved_posts.update(post_hash_hex, patch);
                self.comments.update(post_hash_hex, patch);
                self.refresh_visible_lists();
                self.emit_state();
            }
            Err(failure) => self.toast(failure.user_message()),
        }
    }

    pub(super) fn save_post(&mut self, post_hash_hex: String, unsave: bool) {
        let (public_key, jwt, alive) = {
            let Some(sess) = self.session.as_ref() else {
                self.toast("Please log in first");
                return;
            };
            (sess.public_key.clone(), sess.jwt.clone(), sess.alive.clone())
        };
        if !self.network_enabled() {
            self.toast("Network disabled");
            return;
        }

        let client = self.client.clone();
        let tx = self.core_sender.clone();

        self.runtime.spawn(async move {
            let result = async {
                let token = fresh_jwt(&jwt).await?;
                if unsave {
                    client.unsave_post(&public_key, &token, &post_hash_hex).await?;
                } else {
                    client.save_post(&public_key, &token, &post_hash_hex).await?;
                }
                Ok::<_, WriteFailure>(())
            }
            .await;
            if alive.load(Ordering::SeqCst) {
                let event = if unsave {
                    InternalEvent::PostUnsaved {
                        post_hash_hex,
                        result,
                    }
                } else {
                    InternalEvent::PostSaved {
                        post_hash_hex,
                        result,
                    }
                };
                let _ = tx.send(CoreMsg::Internal(Box::new(event)));
            }
        });
    }

    pub(super) fn apply_post_saved(
        &mut self,
        post_hash_hex: &str,
        result: Result<(), WriteFailure>,
    ) {
        match result {
            Ok(()) => {
                if !self.saved_ids.iter().any(|id| id == post_hash_hex) {
                    self.saved_ids.insert(0, post_hash_hex.to_string());
                }
                self.cache.saved_post_ids.mutate(|ids| {
                    ids.insert(post_hash_hex.to_string());
                });
                self.toast("Post saved");
            }
            Err(failure) => self.toast(failure.user_message()),
        }
    }

    pub(super) fn apply_post_unsaved(
        &mut self,
        post_hash_hex: &str,
        result: Result<(), WriteFailure>,
    ) {
        match result {
            Ok(()) => {
                // The saved list itself reacts to the bus event, same as any
                // other subscriber.
                self.events.publish(&AppEvent::UnsavePost {
                    post_hash_hex: post_hash_hex.to_string(),
                });
                self.toast("Post unsaved");
            }
            Err(failure) => self.toast(failure.user_message()),
        }
    }

    pub(super) fn pin_post(&mut self, post_hash_hex: String, unpin: bool) {
        let (public_key, jwt, alive) = {
            let Some(sess) = self.session.as_ref() else {
                self.toast("Please log in first");
                return;
            };
            (sess.public_key.clone(), sess.jwt.clone(), sess.alive.clone())
        };
        if !self.network_enabled() {
            self.toast("Network disabled");
            return;
        }

        let client = self.client.clone();
        let tx = self.core_sender.clone();

        self.runtime.spawn(async move {
            let result = async {
                let token = fresh_jwt(&jwt).await?;
                if unpin {
                    client.unpin_post(&public_key, &token, &post_hash_hex).await?;
                } else {
                    client.pin_post(&public_key, &token, &post_hash_hex).await?;
                }
                Ok::<_, WriteFailure>(())
            }
            .await;
            if alive.load(Ordering::SeqCst) {
                let _ = tx.send(CoreMsg::Internal(Box::new(InternalEvent::PostPinned {
                    post_hash_hex: (!unpin).then_some(post_hash_hex),
                    result,
                })));
            }
        });
    }

    pub(super) fn apply_post_pinned(
        &mut self,
        post_hash_hex: Option<String>,
        result: Result<(), WriteFailure>,
    ) {
        match result {
            Ok(()) => {
                let pinned = post_hash_hex.is_some();
                self.state.pinned_post_hash = post_hash_hex;
                self.toast(if pinned { "Post pinned" } else { "Post unpinned" });
            }
            Err(failure) => self.toast(failure.user_message()),
        }
    }

    pub(super) fn block_user(&mut self, blocked_public_key: String) {
        let (public_key, jwt, alive) = {
            let Some(sess) = self.session.as_ref() else {
                self.toast("Please log in first");
                return;
            };
            (sess.public_key.clone(), sess.jwt.clone(), sess.alive.clone())
        };
        if public_key == blocked_public_key {
            self.toast(ApiError::Validation("You cannot block yourself".into()).user_message());
            return;
        }
        if !self.network_enabled() {
            self.toast("Network disabled");
            return;
        }

        let client = self.client.clone();
        let tx = self.core_sender.clone();

        self.runtime.spawn(async move {
            let result = async {
                let token = fresh_jwt(&jwt).await?;
                let response = client
                    .block_public_key(&public_key, &blocked_public_key, false, &token)
                    .await?;
                Ok::<_, WriteFailure>(Box::new(response))
            }
            .await;
            if alive.load(Ordering::SeqCst) {
                let _ = tx.send(CoreMsg::Internal(Box::new(InternalEvent::UserBlocked {
                    public_key: blocked_public_key,
                    result,
                })));
            }
        });
    }

    pub(super) fn apply_user_blocked(
        &mut self,
        public_key: &str,
        result: Result<Box<BlockPublicKeyResponse>, WriteFailure>,
    ) {
        match result {
            Ok(response) => {
                // The response carries the authoritative blocked set; patch
                // the cached user and re-derive every visible list.
                self.cache.user.mutate(|user| {
                    user.blocked_pub_keys = response.blocked_pub_keys.clone();
                });
                self.filter.blocklist = response.blocked_pub_keys.keys().cloned().collect();
                self.refresh_visible_lists();
                tracing::info!(blocked = %public_key, "user blocked");
                self.toast("User blocked");
            }
            Err(failure) => self.toast(failure.user_message()),
        }
    }

    pub(super) fn update_profile(&mut self, username: String, description: String) {
        let (public_key, alive) = {
            let Some(sess) = self.session.as_ref() else {
                self.toast("Please log in first");
                return;
            };
            (sess.public_key.clone(), sess.alive.clone())
        };
        if username.trim().is_empty() {
            self.toast(ApiError::Validation("Username is required".into()).user_message());
            return;
        }
        if !self.network_enabled() {
            self.toast("Network disabled");
            return;
        }
        if self.state.busy.updating_profile {
            return;
        }
        self.set_busy(|b| b.updating_profile = true);

        let creator_basis_points = self
            .cache
            .user
            .peek()
            .and_then(|u| u.profile_entry_response)
            .map(|p| p.coin_entry.creator_basis_points)
            .unwrap_or(10_000);
        let signer = self.signer.clone();
        let client = self.client.clone();
        let tx = self.core_sender.clone();

        self.runtime.spawn(async move {
            let result = async {
                let unsigned = client
                    .update_profile(&public_key, &username, &description, creator_basis_points)
                    .await?;
                sign_and_submit(&client, &signer, unsigned).await?;
                Ok::<_, WriteFailure>(())
            }
            .await;
            if alive.load(Ordering::SeqCst) {
                let _ = tx.send(CoreMsg::Internal(Box::new(InternalEvent::ProfileUpdated {
                    result,
                })));
            }
        });
    }

    pub(super) fn apply_profile_updated(&mut self, result: Result<(), WriteFailure>) {
        self.set_busy(|b| b.updating_profile = false);
        match result {
            Ok(()) => {
                self.cache.user.invalidate();
                self.refresh_user(false);
                self.toast("Profile updated");
            }
            Err(failure) => self.toast(failure.user_message()),
        }
    }
}
