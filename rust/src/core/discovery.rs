// Discovery: trending clout tags. One-shot list, no paging.

use deso_api::models::CloutTag;
use deso_api::ApiError;

use super::*;

const TRENDING_TAGS_COUNT: u64 = 20;

impl AppCore {
    pub(super) fn refresh_discovery(&mut self) {
        if self.state.discovery.status.is_loading() {
            return;
        }
        if !self.network_enabled() {
            self.toast("Network disabled");
            return;
        }

        self.discovery_token = self.discovery_token.wrapping_add(1);
        let token = self.discovery_token;
        self.state.discovery.status = if self.state.discovery.trending_tags.is_empty() {
            LoadStatus::InitialLoading
        } else {
            LoadStatus::Refreshing
        };
        self.emit_state();

        let client = self.client.clone();
        let tx = self.core_sender.clone();
        self.runtime.spawn(async move {
            let result = client.trending_clout_tags(TRENDING_TAGS_COUNT, 0).await;
            let _ = tx.send(CoreMsg::Internal(Box::new(InternalEvent::DiscoveryLoaded {
                token,
                result,
            })));
        });
    }

    pub(super) fn apply_discovery_loaded(
        &mut self,
        token: u64,
        result: Result<Vec<CloutTag>, ApiError>,
    ) {
        if token != self.discovery_token {
            return;
        }
        self.state.discovery.status = LoadStatus::Idle;
        match result {
            Ok(tags) => {
                self.state.discovery.trending_tags = tags;
                self.emit_state();
            }
            Err(err) => {
                tracing::warn!(err = %err, "discovery load failed");
                self.toast(err.user_message());
            }
        }
    }
}
