// CloutCast promotions: list, gate, claim.

use deso_api::models::{CloutCastCriteria, CloutCastPromotion};
use deso_api::{ApiError, DesoClient};
use futures_util::future::join_all;
use parking_lot::Mutex;

use super::*;
use crate::core::session::JwtVault;
use crate::state::PromotionView;

/// Whether the logged-in user qualifies to work a promotion. Pure; every
/// input is fetched by the caller.
pub(super) fn promotion_requirements_met(
    criteria: &CloutCastCriteria,
    public_key: &str,
    coin_price_nanos: u64,
    follower_count: u64,
) -> bool {
    if coin_price_nanos < criteria.min_coin_price {
        return false;
    }
    if follower_count < criteria.min_follower_count {
        return false;
    }
    if !criteria.allowed_users.is_empty()
        && !criteria.allowed_users.iter().any(|user| user == public_key)
    {
        return false;
    }
    true
}

fn already_promoted(promotion: &CloutCastPromotion, public_key: &str) -> bool {
    promotion
        .promoters
        .iter()
        .any(|promoter| promoter.public_key == public_key)
}

/// The promotion service authenticates with its own bearer token, exchanged
/// once per session from a node JWT.
async fn cloutcast_bearer(
    client: &DesoClient,
    jwt: &JwtVault,
    slot: &Mutex<Option<String>>,
    public_key: &str,
) -> Result<String, ApiError> {
    if let Some(token) = slot.lock().clone() {
        return Ok(token);
    }
    let node_jwt = jwt
        .token()
        .await
        .map_err(|err| ApiError::Validation(WriteFailure::Signer(err).user_message()))?;
    let bearer = client.cloutcast_authenticate(public_key, &node_jwt).await?;
    *slot.lock() = Some(bearer.clone());
    Ok(bearer)
}

impl AppCore {
    pub(super) fn refresh_promotions(&mut self) {
        let (public_key, jwt, bearer_slot, alive) = {
            let Some(sess) = self.session.as_ref() else {
                self.toast("Please log in first");
                return;
            };
            (
                sess.public_key.clone(),
                sess.jwt.clone(),
                sess.cloutcast_token.clone(),
                sess.alive.clone(),
            )
        };
        if self.state.promotions.status.is_loading() {
            return;
        }
        if !self.network_enabled() {
            self.toast("Network disabled");
            return;
        }

        self.promotions_token = self.promotions_token.wrapping_add(1);
        let token = self.promotions_token;
        self.state.promotions.status = if self.state.promotions.promotions.is_empty() {
            LoadStatus::InitialLoading
        } else {
            LoadStatus::Refreshing
        };
        self.emit_state();

        let client = self.client.clone();
        let cache = self.cache.clone();
        let tx = self.core_sender.clone();

        self.runtime.spawn(async move {
            let result = async {
                let bearer =
                    cloutcast_bearer(&client, &jwt, &bearer_slot, &public_key).await?;
                let promotions = client.active_promotions(&bearer).await?;

                // The gate inputs: our own coin price and follower count.
                let user = cache
                    .user
                    .get_or_fetch(|| async {
                        client
                            .get_users_stateless(std::slice::from_ref(&public_key))
                            .await?
                            .into_iter()
                            .next()
                            .ok_or_else(|| ApiError::Validation("user not found".into()))
                    })
                    .await?;
                let coin_price_nanos = user
                    .profile_entry_response
                    .as_ref()
                    .map(|p| p.coin_price_deso_nanos)
                    .unwrap_or(0);
                let follower_count = client.get_follower_count(&public_key).await?;

                // Attach every promoted post in one joined sweep; a missing
                // post disables the card, it does not fail the list.
                let posts = join_all(promotions.iter().map(|promotion| {
                    client.get_single_post(&public_key, &promotion.target.hex, false, 0, 0)
                }))
                .await;

                let views = promotions
                    .into_iter()
                    .zip(posts)
                    .map(|(promotion, post)| PromotionView {
                        requirements_met: promotion_requirements_met(
                            &promotion.criteria,
                            &public_key,
                            coin_price_nanos,
                            follower_count,
                        ),
                        already_promoted: already_promoted(&promotion, &public_key),
                        post: post.ok().flatten(),
                        promotion,
                    })
                    .collect::<Vec<_>>();
                Ok::<_, ApiError>(views)
            }
            .await;

            if alive.load(Ordering::SeqCst) {
                let _ = tx.send(CoreMsg::Internal(Box::new(
                    InternalEvent::PromotionsLoaded { token, result },
                )));
            }
        });
    }

    pub(super) fn apply_promotions_loaded(
        &mut self,
        token: u64,
        result: Result<Vec<PromotionView>, ApiError>,
    ) {
        if token != self.promotions_token {
            return;
        }
        self.state.promotions.status = LoadStatus::Idle;
        match result {
            Ok(views) => {
                self.state.promotions.promotions = views;
                self.emit_state();
            }
            Err(err) => {
                tracing::warn!(err = %err, "promotions load failed");
                self.toast(err.user_message());
            }
        }
    }

    /// Claim a reward once the promoting post exists on-chain.
    pub(super) fn complete_promotion(&mut self, promotion_id: u64, post_hash_hex: String) {
        let (public_key, jwt, bearer_slot, alive) = {
            let Some(sess) = self.session.as_ref() else {
                self.toast("Please log in first");
                return;
            };
            (
                sess.public_key.clone(),
                sess.jwt.clone(),
                sess.cloutcast_token.clone(),
                sess.alive.clone(),
            )
        };
        if !self.network_enabled() {
            self.toast("Network disabled");
            return;
        }
        if self.state.busy.working_promotion {
            return;
        }
        self.set_busy(|b| b.working_promotion = true);

        let client = self.client.clone();
        let tx = self.core_sender.clone();

        self.runtime.spawn(async move {
            let result = async {
                let bearer =
                    cloutcast_bearer(&client, &jwt, &bearer_slot, &public_key).await?;
                client
                    .submit_proof_of_work(promotion_id, &post_hash_hex, &bearer)
                    .await?;
                Ok::<_, WriteFailure>(())
            }
            .await;
            if alive.load(Ordering::SeqCst) {
                let _ = tx.send(CoreMsg::Internal(Box::new(
                    InternalEvent::ProofOfWorkSubmitted {
                        promotion_id,
                        result,
                    },
                )));
            }
        });
    }

    pub(super) fn apply_proof_of_work(
        &mut self,
        promotion_id: u64,
        result: Result<(), WriteFailure>,
    ) {
        self.set_busy(|b| b.working_promotion = false);
        match result {
            Ok(()) => {
                // Mark it done locally; the next refresh gets the real state.
                for view in &mut self.state.promotions.promotions {
                    if view.promotion.id == promotion_id {
                        view.already_promoted = true;
                    }
                }
                self.toast("Promotion reward claimed");
            }
            Err(failure) => self.toast(failure.user_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria(min_price: u64, min_followers: u64, allowed: &[&str]) -> CloutCastCriteria {
        CloutCastCriteria {
            min_coin_price: min_price,
            min_follower_count: min_followers,
            allowed_users: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn requirements_check_price_followers_and_allowlist() {
        let c = criteria(1_000_000_000, 50, &[]);
        assert!(promotion_requirements_met(&c, "BC1me", 2_000_000_000, 60));
        assert!(!promotion_requirements_met(&c, "BC1me", 500_000_000, 60));
        assert!(!promotion_requirements_met(&c, "BC1me", 2_000_000_000, 10));
    }

    #[test]
    fn empty_allowlist_means_everyone_nonempty_gates() {
        let open = criteria(0, 0, &[]);
        assert!(promotion_requirements_met(&open, "BC1anyone", 0, 0));

        let gated = criteria(0, 0, &["BC1vip", "BC1other"]);
        assert!(promotion_requirements_met(&gated, "BC1vip", 0, 0));
        assert!(!promotion_requirements_met(&gated, "BC1anyone", 0, 0));
    }

    #[test]
    fn already_promoted_matches_on_public_key() {
        let promotion = CloutCastPromotion {
            promoters: vec![deso_api::models::CloutCastClient {
                public_key: "BC1done".into(),
            }],
            ..Default::default()
        };
        assert!(already_promoted(&promotion, "BC1done"));
        assert!(!already_promoted(&promotion, "BC1fresh"));
    }
}
