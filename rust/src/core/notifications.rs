// Notifications: numeric-index cursor, newest first.

use deso_api::{ApiError, NotificationsPage};

use super::*;

pub(super) const NOTIFICATIONS_PAGE_SIZE: usize = 20;

impl AppCore {
    pub(super) fn load_notifications(&mut self, kind: LoadKind) {
        let (public_key, alive) = {
            let Some(sess) = self.session.as_ref() else {
                self.toast("Please log in first");
                return;
            };
            (sess.public_key.clone(), sess.alive.clone())
        };
        let Some(req) = self.notifications.begin(kind) else {
            return;
        };
        self.sync_notifications_view();
        self.emit_state();

        if !self.network_enabled() {
            self.notifications.fail(req.token);
            self.sync_notifications_view();
            self.emit_state();
            return;
        }

        let client = self.client.clone();
        let tx = self.core_sender.clone();

        // The node pages down from an index: −1 means "newest", otherwise
        // start just below the last index already seen.
        let fetch_start_index = req
            .cursor
            .as_deref()
            .and_then(|cursor| cursor.parse::<i64>().ok())
            .map(|last_index| last_index - 1)
            .unwrap_or(-1);

        self.runtime.spawn(async move {
            let result = client
                .get_notifications(&public_key, fetch_start_index, req.limit as u64)
                .await;
            if alive.load(Ordering::SeqCst) {
                let _ = tx.send(CoreMsg::Internal(Box::new(
                    InternalEvent::NotificationsPageLoaded {
                        token: req.token,
                        result,
                    },
                )));
            }
        });
    }

    pub(super) fn apply_notifications_page(
        &mut self,
        token: u64,
        result: Result<NotificationsPage, ApiError>,
    ) {
        match result {
            Ok(page) => {
                let fetched = page.notifications.len();
                if !self.notifications.complete(token, page.notifications, fetched) {
                    return;
                }
                self.state
                    .notifications
                    .profiles
                    .extend(page.profiles_by_public_key);
            }
            Err(err) => {
                if !self.notifications.fail(token) {
                    return;
                }
                tracing::warn!(err = %err, "notifications page failed");
                self.toast(err.user_message());
            }
        }
        self.sync_notifications_view();
        self.emit_state();
    }

    pub(super) fn sync_notifications_view(&mut self) {
        let blocklist = &self.filter.blocklist;
        self.state.notifications.notifications = self
            .notifications
            .visible(|n| !blocklist.contains(&n.metadata.transactor_public_key_base58_check));
        self.state.notifications.status = self.notifications.status();
        self.state.notifications.end_of_data = self.notifications.end_of_data();
    }
}
