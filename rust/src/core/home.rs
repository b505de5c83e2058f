// Home feed: tabbed, key-cursor paged, pinned post on the global tab.

use deso_api::models::Post;
use deso_api::{ApiError, DesoClient, FeedKind};

use super::*;

pub(super) const HOME_FEED_PAGE_SIZE: usize = 10;

impl AppCore {
    pub(super) fn load_home_feed(&mut self, kind: LoadKind) {
        let Some(req) = self.home_feed.begin(kind) else {
            return;
        };
        self.sync_home_view();
        self.emit_state();

        if !self.network_enabled() {
            self.home_feed.fail(req.token);
            self.sync_home_view();
            self.emit_state();
            return;
        }

        let reader = self
            .state
            .auth
            .public_key()
            .unwrap_or_default()
            .to_string();
        let tab = self.state.selected_tab;
        let feed_kind = match tab {
            HomeScreenTab::Global => FeedKind::Global,
            HomeScreenTab::Following => FeedKind::Following,
            HomeScreenTab::Recent => FeedKind::Recent,
            HomeScreenTab::Hot => FeedKind::Hot {
                lookback_minutes: self.state.hot_feed_filter.lookback_minutes(),
            },
        };
        // The pinned post only decorates the first page of the global tab.
        let fetch_pinned = kind != LoadKind::More && tab == HomeScreenTab::Global;
        let client = self.client.clone();
        let tx = self.core_sender.clone();

        self.runtime.spawn(async move {
            let pinned = if fetch_pinned {
                fetch_pinned_post(&client, &reader).await
            } else {
                None
            };
            if fetch_pinned {
                let _ = tx.send(CoreMsg::Internal(Box::new(InternalEvent::PinnedPostKnown {
                    post_hash_hex: pinned.as_ref().map(|p| p.post_hash_hex.clone()),
                })));
            }

            let result = client
                .get_posts_stateless(&reader, feed_kind, req.cursor.as_deref(), req.limit as u64)
                .await
                .map(|posts| {
                    let fetched = posts.len();
                    let mut items = Vec::with_capacity(fetched + 1);
                    // Front-load the pinned post; de-duplication keeps it
                    // single if the feed also contains it.
                    items.extend(pinned.map(|p| *p));
                    items.extend(posts);
                    LoadedPage { items, fetched }
                });
            let _ = tx.send(CoreMsg::Internal(Box::new(InternalEvent::PageLoaded {
                list: ListTarget::HomeFeed,
                token: req.token,
                result,
            })));
        });
    }

    pub(super) fn select_feed_tab(&mut self, tab: HomeScreenTab) {
        if self.state.selected_tab == tab {
            return;
        }
        self.state.selected_tab = tab;
        self.home_feed.reset();
        self.load_home_feed(LoadKind::Initial);
    }

    pub(super) fn set_hot_feed_filter(&mut self, filter: HotFeedFilter) {
        if self.state.hot_feed_filter == filter {
            return;
        }
        self.state.hot_feed_filter = filter;
        if self.state.selected_tab == HomeScreenTab::Hot {
            self.home_feed.reset();
            self.load_home_feed(LoadKind::Initial);
        } else {
            self.emit_state();
        }
    }

    pub(super) fn apply_home_page(
        &mut self,
        token: u64,
        result: Result<LoadedPage, ApiError>,
    ) {
        match result {
            Ok(page) => {
                if !self.home_feed.complete(token, page.items, page.fetched) {
                    return;
                }
            }
            Err(err) => {
                if !self.home_feed.fail(token) {
                    return;
                }
                tracing::warn!(err = %err, "home feed page failed");
                // Read path: the stale list stays up, only the spinner clears.
                self.toast(err.user_message());
            }
        }
        self.sync_home_view();
        self.emit_state();
    }

    pub(super) fn sync_home_view(&mut self) {
        let filter = &self.filter;
        self.state.home_feed = FeedViewState {
            posts: self.home_feed.visible(|p| filter.allows(p)),
            status: self.home_feed.status(),
            end_of_data: self.home_feed.end_of_data(),
        };
    }
}

/// Resolve the community-pinned post, if any. Best effort: a missing or
/// broken pinned post never fails the feed load.
async fn fetch_pinned_post(client: &DesoClient, reader: &str) -> Option<Box<Post>> {
    let hash = match client.get_pinned_post(reader).await {
        Ok(Some(hash)) if !hash.is_empty() => hash,
        Ok(_) => return None,
        Err(err) => {
            tracing::debug!(err = %err, "pinned post lookup failed");
            return None;
        }
    };
    match client.get_single_post(reader, &hash, false, 0, 0).await {
        Ok(post) => post,
        Err(err) => {
            tracing::debug!(err = %err, "pinned post fetch failed");
            None
        }
    }
}
