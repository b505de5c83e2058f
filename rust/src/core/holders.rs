// Creator-coin holder list for a profile screen. Server-ordered; the cursor
// is the hodler key of the last row, exactly what the node hands back as
// LastPublicKeyBase58Check.

use deso_api::ApiError;
use deso_api::HodlersPage;

use super::*;

pub(super) const COIN_HOLDERS_PAGE_SIZE: usize = 20;

impl AppCore {
    pub(super) fn open_coin_holders(&mut self, public_key: String) {
        if public_key.trim().is_empty() {
            return;
        }
        self.coin_holders.reset();
        let Some(req) = self.coin_holders.begin(LoadKind::Initial) else {
            return;
        };
        self.state.coin_holders = Some(CoinHoldersViewState {
            public_key: public_key.clone(),
            holders: Vec::new(),
            status: LoadStatus::InitialLoading,
            end_of_data: false,
        });
        self.emit_state();
        self.fetch_holders_page(public_key, req);
    }

    pub(super) fn load_more_coin_holders(&mut self) {
        let Some(view) = self.state.coin_holders.as_ref() else {
            return;
        };
        let public_key = view.public_key.clone();
        let Some(req) = self.coin_holders.begin(LoadKind::More) else {
            return;
        };
        self.sync_holders_view();
        self.emit_state();
        self.fetch_holders_page(public_key, req);
    }

    pub(super) fn close_coin_holders(&mut self) {
        self.coin_holders.reset();
        if self.state.coin_holders.take().is_some() {
            self.emit_state();
        }
    }

    fn fetch_holders_page(&mut self, public_key: String, req: feed::PageRequest) {
        if !self.network_enabled() {
            self.coin_holders.fail(req.token);
            self.sync_holders_view();
            self.emit_state();
            return;
        }
        let client = self.client.clone();
        let tx = self.core_sender.clone();
        self.runtime.spawn(async move {
            let result = client
                .get_hodlers_for_public_key(&public_key, req.cursor.as_deref(), req.limit as u64)
                .await;
            let _ = tx.send(CoreMsg::Internal(Box::new(
                InternalEvent::HoldersPageLoaded {
                    token: req.token,
                    result,
                },
            )));
        });
    }

    pub(super) fn apply_holders_page(
        &mut self,
        token: u64,
        result: Result<HodlersPage, ApiError>,
    ) {
        match result {
            Ok(page) => {
                let fetched = page.hodlers.len();
                if !self.coin_holders.complete(token, page.hodlers, fetched) {
                    return;
                }
            }
            Err(err) => {
                if !self.coin_holders.fail(token) {
                    return;
                }
                tracing::warn!(err = %err, "holders page failed");
                self.toast(err.user_message());
            }
        }
        self.sync_holders_view();
        self.emit_state();
    }

    pub(super) fn sync_holders_view(&mut self) {
        let holders = self.coin_holders.visible(|_| true);
        let status = self.coin_holders.status();
        let end = self.coin_holders.end_of_data();
        if let Some(view) = self.state.coin_holders.as_mut() {
            view.holders = holders;
            view.status = status;
            view.end_of_data = end;
        }
    }
}
