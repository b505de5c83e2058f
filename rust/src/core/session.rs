// Session lifecycle + JWT plumbing.

use base64::Engine;
use deso_api::models::User;
use deso_api::{SignerError, TransactionSigner};
use parking_lot::Mutex;

use super::*;
use crate::core::filter::blocklist_from_user;

/// Reuse a JWT until this close to its `exp` claim.
const JWT_EXPIRY_MARGIN_SECONDS: i64 = 30;

pub(super) struct Session {
    pub public_key: String,
    /// Cleared on logout; spawned tasks check it before reporting back, so a
    /// completed fetch can never mutate state for a torn-down session.
    pub alive: Arc<AtomicBool>,
    pub jwt: Arc<JwtVault>,
    /// Bearer token for the promotion service, exchanged lazily.
    pub cloutcast_token: Arc<Mutex<Option<String>>>,
}

/// Caches signer-produced JWTs until shortly before they expire. Shared with
/// spawned tasks so every JWT-authenticated call goes through one place.
pub(crate) struct JwtVault {
    signer: Arc<dyn TransactionSigner>,
    cached: Mutex<Option<CachedJwt>>,
}

#[derive(Clone)]
struct CachedJwt {
    token: String,
    expires_at: Option<i64>,
}

impl JwtVault {
    pub fn new(signer: Arc<dyn TransactionSigner>) -> Arc<Self> {
        Arc::new(Self {
            signer,
            cached: Mutex::new(None),
        })
    }

    pub async fn token(&self) -> Result<String, SignerError> {
        if let Some(cached) = self.cached.lock().clone() {
            let fresh = match cached.expires_at {
                Some(exp) => now_seconds() + JWT_EXPIRY_MARGIN_SECONDS < exp,
                // No parseable expiry: do not reuse, ask the signer again.
                None => false,
            };
            if fresh {
                return Ok(cached.token);
            }
        }

        let token = self.signer.sign_jwt().await?;
        *self.cached.lock() = Some(CachedJwt {
            token: token.clone(),
            expires_at: jwt_expiry(&token),
        });
        Ok(token)
    }

    pub fn clear(&self) {
        *self.cached.lock() = None;
    }
}

/// `exp` claim of a JWT, without verifying the signature (the backends do
/// that; we only need it for cache freshness).
pub(crate) fn jwt_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_i64()
}

impl AppCore {
    pub(super) fn start_session(&mut self, public_key: String) {
        // Tear down any existing session first.
        self.stop_session();

        if public_key.trim().is_empty() {
            self.toast("Public key is required");
            return;
        }

        tracing::info!(public_key = %public_key, "start_session");

        self.session = Some(Session {
            public_key: public_key.clone(),
            alive: Arc::new(AtomicBool::new(true)),
            jwt: JwtVault::new(self.signer.clone()),
            cloutcast_token: Arc::new(Mutex::new(None)),
        });

        self.state.auth = AuthState::LoggedIn {
            public_key,
            username: String::new(),
        };
        self.set_busy(|b| b.logging_in = true);
        self.emit_state();

        self.refresh_user(true);
        self.prime_exchange_rate();
        self.load_home_feed(LoadKind::Initial);
    }

    pub(super) fn stop_session(&mut self) {
        if let Some(sess) = self.session.take() {
            sess.alive.store(false, Ordering::SeqCst);
            sess.jwt.clear();
        }

        // Invalidate every in-flight fetch and all per-screen state.
        self.home_feed.reset();
        self.saved_posts.reset();
        self.comments.reset();
        self.notifications.reset();
        self.coin_holders.reset();
        self.saved_ids.clear();
        self.wallet_token = self.wallet_token.wrapping_add(1);
        self.thread_token = self.thread_token.wrapping_add(1);
        self.promotions_token = self.promotions_token.wrapping_add(1);
        self.discovery_token = self.discovery_token.wrapping_add(1);
        self.cache.clear();
        self.filter = PostFilter::default();

        self.state.auth = AuthState::LoggedOut;
        self.state.busy = BusyState::idle();
        self.state.home_feed = FeedViewState::empty();
        self.state.saved_posts = FeedViewState::empty();
        self.state.notifications = NotificationsViewState::empty();
        self.state.current_thread = None;
        self.state.coin_holders = None;
        self.state.wallet = None;
        self.state.promotions = PromotionsViewState::empty();
        self.state.discovery = DiscoveryViewState::empty();
        self.state.pinned_post_hash = None;
        self.emit_state();
    }

    /// Fetch the session user and prime the user cache. `while_logging_in`
    /// additionally resolves the username and clears the login flag.
    pub(super) fn refresh_user(&mut self, while_logging_in: bool) {
        let (public_key, alive) = {
            let Some(sess) = self.session.as_ref() else {
                return;
            };
            (sess.public_key.clone(), sess.alive.clone())
        };
        if !self.network_enabled() {
            // Keep offline test runs deterministic: login completes locally.
            if while_logging_in {
                self.set_busy(|b| b.logging_in = false);
            }
            return;
        }

        let client = self.client.clone();
        let tx = self.core_sender.clone();

        self.runtime.spawn(async move {
            let result = client
                .get_users_stateless(std::slice::from_ref(&public_key))
                .await
                .and_then(|users| {
                    users
                        .into_iter()
                        .next()
                        .map(Box::new)
                        .ok_or_else(|| deso_api::ApiError::Validation("user not found".into()))
                });
            if alive.load(Ordering::SeqCst) {
                let _ = tx.send(CoreMsg::Internal(Box::new(InternalEvent::UserRefreshed {
                    result,
                    while_logging_in,
                })));
            }
        });
    }

    pub(super) fn apply_user_refreshed(
        &mut self,
        result: Result<Box<User>, deso_api::ApiError>,
        while_logging_in: bool,
    ) {
        if while_logging_in {
            self.set_busy(|b| b.logging_in = false);
        }
        match result {
            Ok(user) => {
                self.cache.user.set((*user).clone());
                self.apply_user_snapshot(&user);
            }
            Err(err) => {
                tracing::warn!(err = %err, "user refresh failed");
                self.toast(err.user_message());
            }
        }
    }

    /// Fold a fresh user record into auth state and the content filter, then
    /// re-derive every visible list.
    pub(super) fn apply_user_snapshot(&mut self, user: &User) {
        if let AuthState::LoggedIn { username, .. } = &mut self.state.auth {
            let fresh = user.username().to_string();
            if !fresh.is_empty() {
                *username = fresh;
            }
        }
        self.filter.blocklist = blocklist_from_user(user);
        self.refresh_visible_lists();
        self.emit_state();
    }

    pub(super) fn prime_exchange_rate(&mut self) {
        if !self.network_enabled() {
            return;
        }
        let Some(sess) = self.session.as_ref() else {
            return;
        };
        let alive = sess.alive.clone();
        let client = self.client.clone();
        let cache = self.cache.clone();
        let tx = self.core_sender.clone();
        self.runtime.spawn(async move {
            let result = cache
                .exchange_rate
                .get_or_fetch(|| client.get_exchange_rate())
                .await;
            if alive.load(Ordering::SeqCst) {
                let _ = tx.send(CoreMsg::Internal(Box::new(
                    InternalEvent::ExchangeRateLoaded { result },
                )));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn fake_jwt(exp: Option<i64>) -> String {
        let header = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(br#"{"alg":"ES256","typ":"JWT"}"#);
        let claims = match exp {
            Some(exp) => format!(r#"{{"exp":{exp},"iat":0}}"#),
            None => r#"{"iat":0}"#.to_string(),
        };
        let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(claims.as_bytes());
        format!("{header}.{payload}.sig")
    }

    #[test]
    fn jwt_expiry_reads_the_exp_claim() {
        assert_eq!(jwt_expiry(&fake_jwt(Some(1_999_999_999))), Some(1_999_999_999));
        assert_eq!(jwt_expiry(&fake_jwt(None)), None);
        assert_eq!(jwt_expiry("not-a-jwt"), None);
        assert_eq!(jwt_expiry("a.###.c"), None);
    }

    struct CountingSigner {
        calls: AtomicUsize,
        exp: i64,
    }

    #[async_trait::async_trait]
    impl TransactionSigner for CountingSigner {
        async fn sign_transaction(&self, _unsigned: &str) -> Result<String, SignerError> {
            Err(SignerError::Unavailable)
        }

        async fn sign_jwt(&self) -> Result<String, SignerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(fake_jwt(Some(self.exp)))
        }
    }

    #[tokio::test]
    async fn vault_reuses_unexpired_tokens() {
        let signer = Arc::new(CountingSigner {
            calls: AtomicUsize::new(0),
            exp: now_seconds() + 3600,
        });
        let vault = JwtVault::new(signer.clone());

        let first = vault.token().await.unwrap();
        let second = vault.token().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(signer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn vault_resigns_expired_tokens() {
        let signer = Arc::new(CountingSigner {
            calls: AtomicUsize::new(0),
            exp: now_seconds() - 10,
        });
        let vault = JwtVault::new(signer.clone());

        let _ = vault.token().await.unwrap();
        let _ = vault.token().await.unwrap();
        assert_eq!(signer.calls.load(Ordering::SeqCst), 2);
    }
}
