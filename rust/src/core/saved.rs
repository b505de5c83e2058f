// Saved posts: the companion API hands back an ordered id list; pages of ids
// are resolved into posts with one concurrent fetch per id, joined before a
// single merge so the visible list never updates piecemeal.

use std::collections::HashSet;

use deso_api::models::Post;
use deso_api::{ApiError, DesoClient};
use futures_util::future::join_all;

use super::*;

pub(super) const SAVED_POSTS_PAGE_SIZE: usize = 8;

impl AppCore {
    pub(super) fn load_saved_posts(&mut self, kind: LoadKind) {
        let (public_key, jwt, alive) = {
            let Some(sess) = self.session.as_ref() else {
                self.toast("Please log in first");
                return;
            };
            (sess.public_key.clone(), sess.jwt.clone(), sess.alive.clone())
        };
        let Some(req) = self.saved_posts.begin(kind) else {
            return;
        };
        self.sync_saved_view();
        self.emit_state();

        if !self.network_enabled() {
            self.saved_posts.fail(req.token);
            self.sync_saved_view();
            self.emit_state();
            return;
        }

        let client = self.client.clone();
        let tx = self.core_sender.clone();

        match kind {
            // First page: reload the id list, then resolve its head.
            LoadKind::Initial | LoadKind::Refresh => {
                self.runtime.spawn(async move {
                    let result = reload_and_fetch_first_page(
                        &client,
                        &public_key,
                        &jwt,
                        req.limit,
                    )
                    .await;
                    if !alive.load(Ordering::SeqCst) {
                        return;
                    }
                    let result = match result {
                        Ok((ids, page)) => {
                            let _ = tx.send(CoreMsg::Internal(Box::new(
                                InternalEvent::SavedIdsReloaded {
                                    token: req.token,
                                    ids,
                                },
                            )));
                            Ok(page)
                        }
                        Err(err) => Err(err),
                    };
                    let _ = tx.send(CoreMsg::Internal(Box::new(InternalEvent::PageLoaded {
                        list: ListTarget::SavedPosts,
                        token: req.token,
                        result,
                    })));
                });
            }
            // Later pages slice the already-known id list.
            LoadKind::More => {
                let batch: Vec<String> = self
                    .saved_ids
                    .iter()
                    .skip(req.offset)
                    .take(req.limit)
                    .cloned()
                    .collect();
                self.runtime.spawn(async move {
                    let fetched = batch.len();
                    let items = fetch_posts_by_hash(&client, &public_key, &batch).await;
                    if !alive.load(Ordering::SeqCst) {
                        return;
                    }
                    let _ = tx.send(CoreMsg::Internal(Box::new(InternalEvent::PageLoaded {
                        list: ListTarget::SavedPosts,
                        token: req.token,
                        result: Ok(LoadedPage { items, fetched }),
                    })));
                });
            }
        }
    }

    pub(super) fn apply_saved_ids(&mut self, token: u64, ids: Vec<String>) {
        if token != self.saved_posts.token() {
            return;
        }
        self.cache
            .saved_post_ids
            .set(ids.iter().cloned().collect::<HashSet<String>>());
        self.saved_ids = ids;
    }

    pub(super) fn apply_saved_page(&mut self, token: u64, result: Result<LoadedPage, ApiError>) {
        match result {
            Ok(page) => {
                if !self.saved_posts.complete(token, page.items, page.fetched) {
                    return;
                }
            }
            Err(err) => {
                if !self.saved_posts.fail(token) {
                    return;
                }
                tracing::warn!(err = %err, "saved posts page failed");
                self.toast(err.user_message());
            }
        }
        self.sync_saved_view();
        self.emit_state();
    }

    pub(super) fn sync_saved_view(&mut self) {
        let filter = &self.filter;
        self.state.saved_posts = FeedViewState {
            posts: self.saved_posts.visible(|p| filter.allows(p)),
            status: self.saved_posts.status(),
            end_of_data: self.saved_posts.end_of_data(),
        };
    }
}

async fn reload_and_fetch_first_page(
    client: &DesoClient,
    public_key: &str,
    jwt: &crate::core::session::JwtVault,
    limit: usize,
) -> Result<(Vec<String>, LoadedPage), ApiError> {
    let token = jwt
        .token()
        .await
        .map_err(|err| ApiError::Validation(WriteFailure::Signer(err).user_message()))?;
    let raw_ids = client.get_saved_posts(public_key, &token).await?;

    // The backend list has no uniqueness guarantee; collapse duplicates,
    // first occurrence wins.
    let mut seen = HashSet::new();
    let ids: Vec<String> = raw_ids
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect();

    let batch: Vec<String> = ids.iter().take(limit).cloned().collect();
    let fetched = batch.len();
    let items = fetch_posts_by_hash(client, public_key, &batch).await;
    Ok((ids, LoadedPage { items, fetched }))
}

/// Resolve post hashes concurrently; the all-complete join is the only await
/// point, so callers merge exactly once. Posts that fail to resolve are
/// dropped, not retried.
async fn fetch_posts_by_hash(
    client: &DesoClient,
    reader_public_key: &str,
    hashes: &[String],
) -> Vec<Post> {
    let fetches = hashes
        .iter()
        .map(|hash| client.get_single_post(reader_public_key, hash, false, 0, 0));
    join_all(fetches)
        .await
        .into_iter()
        .filter_map(|result| match result {
            Ok(post) => post.map(|p| *p),
            Err(err) => {
                tracing::debug!(err = %err, "saved post fetch failed");
                None
            }
        })
        .collect()
}
