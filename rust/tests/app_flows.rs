use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cloutfeed_core::{
    App, AppAction, AppState, AppUpdate, AuthState, HiddenNftMode, LoadStatus, NewPost,
    SignerError, TransactionSigner, UpdateObserver,
};
use tempfile::tempdir;

fn write_config(data_dir: &str, disable_network: bool) {
    let path = std::path::Path::new(data_dir).join("cloutfeed_config.json");
    let v = serde_json::json!({
        "disable_network": disable_network,
        "fiat_currency": "USD",
    });
    std::fs::write(path, serde_json::to_vec(&v).unwrap()).unwrap();
}

fn wait_until(what: &str, timeout: Duration, mut f: impl FnMut() -> bool) {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if f() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("{what}: condition not met within {timeout:?}");
}

struct MockSigner;

#[async_trait]
impl TransactionSigner for MockSigner {
    async fn sign_transaction(&self, unsigned: &str) -> Result<String, SignerError> {
        Ok(format!("{unsigned}signed"))
    }

    async fn sign_jwt(&self) -> Result<String, SignerError> {
        Ok("header.payload.signature".to_string())
    }
}

struct TestObserver {
    updates: Arc<Mutex<Vec<AppUpdate>>>,
}

impl TestObserver {
    fn new() -> (Self, Arc<Mutex<Vec<AppUpdate>>>) {
        let updates = Arc::new(Mutex::new(vec![]));
        (
            Self {
                updates: updates.clone(),
            },
            updates,
        )
    }
}

impl UpdateObserver for TestObserver {
    fn apply(&self, update: AppUpdate) {
        self.updates.lock().unwrap().push(update);
    }
}

fn offline_app() -> Arc<App> {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().to_str().unwrap().to_string();
    write_config(&data_dir, true);
    // The tempdir may be dropped; the config was already read at boot.
    let app = App::new(data_dir, Arc::new(MockSigner));
    std::mem::forget(dir);
    app
}

fn toast(state: &AppState) -> Option<String> {
    state.toast.clone()
}

#[test]
fn boots_empty_and_logged_out() {
    let app = offline_app();
    let state = app.state();
    assert!(matches!(state.auth, AuthState::LoggedOut));
    assert!(state.home_feed.posts.is_empty());
    assert!(state.saved_posts.posts.is_empty());
    assert!(state.current_thread.is_none());
    assert!(state.wallet.is_none());
    assert_eq!(state.toast, None);
}

#[test]
fn login_completes_offline_and_feed_load_settles_idle() {
    let app = offline_app();
    app.dispatch(AppAction::Login {
        public_key: "BC1me".to_string(),
    });

    wait_until("login settles", Duration::from_secs(5), || {
        let state = app.state();
        state.auth.is_logged_in()
            && !state.busy.logging_in
            && state.home_feed.status == LoadStatus::Idle
    });

    let state = app.state();
    assert_eq!(state.auth.public_key(), Some("BC1me"));
    // Offline: nothing arrived, nothing crashed, list stayed empty.
    assert!(state.home_feed.posts.is_empty());
}

#[test]
fn empty_login_is_rejected_with_a_toast() {
    let app = offline_app();
    app.dispatch(AppAction::Login {
        public_key: "   ".to_string(),
    });

    wait_until("validation toast", Duration::from_secs(5), || {
        toast(&app.state()).is_some()
    });
    assert!(!app.state().auth.is_logged_in());
}

#[test]
fn logged_out_writes_are_refused() {
    let app = offline_app();
    app.dispatch(AppAction::RefreshWallet);

    wait_until("login-required toast", Duration::from_secs(5), || {
        toast(&app.state()).as_deref() == Some("Please log in first")
    });
}

#[test]
fn empty_post_fails_validation_before_any_network_concern() {
    let app = offline_app();
    app.dispatch(AppAction::Login {
        public_key: "BC1me".to_string(),
    });
    wait_until("login settles", Duration::from_secs(5), || {
        app.state().auth.is_logged_in()
    });

    app.dispatch(AppAction::SubmitPost {
        post: NewPost {
            body: "   ".to_string(),
            ..Default::default()
        },
    });
    wait_until("validation toast", Duration::from_secs(5), || {
        toast(&app.state()).as_deref() == Some("Write something before you post!")
    });

    // A valid post offline hits the network guard instead.
    app.dispatch(AppAction::ClearToast);
    app.dispatch(AppAction::SubmitPost {
        post: NewPost {
            body: "gm".to_string(),
            ..Default::default()
        },
    });
    wait_until("network toast", Duration::from_secs(5), || {
        toast(&app.state()).as_deref() == Some("Network disabled")
    });
}

#[test]
fn clear_toast_clears() {
    let app = offline_app();
    app.dispatch(AppAction::RefreshWallet);
    wait_until("toast set", Duration::from_secs(5), || {
        toast(&app.state()).is_some()
    });

    app.dispatch(AppAction::ClearToast);
    wait_until("toast cleared", Duration::from_secs(5), || {
        toast(&app.state()).is_none()
    });
}

#[test]
fn bus_events_reach_core_state() {
    let app = offline_app();
    let events = app.events();

    events.publish(&cloutfeed_core::AppEvent::FocusSearchHeader { focused: true });
    wait_until("search header focus", Duration::from_secs(5), || {
        app.state().search_header_focused
    });

    events.publish(&cloutfeed_core::AppEvent::ToggleProfileManager { visible: true });
    wait_until("profile manager visible", Duration::from_secs(5), || {
        app.state().profile_manager_visible
    });
}

#[test]
fn hidden_nft_mode_round_trips_through_the_bus() {
    let app = offline_app();
    assert_eq!(app.state().hidden_nft_mode, HiddenNftMode::Show);

    app.dispatch(AppAction::SetHiddenNftMode {
        mode: HiddenNftMode::Hide,
    });
    wait_until("mode applied", Duration::from_secs(5), || {
        app.state().hidden_nft_mode == HiddenNftMode::Hide
    });
}

#[test]
fn updates_stream_carries_monotonic_revs() {
    let app = offline_app();
    let (observer, updates) = TestObserver::new();
    app.listen_for_updates(Box::new(observer));

    app.dispatch(AppAction::Login {
        public_key: "BC1me".to_string(),
    });
    wait_until("some updates arrive", Duration::from_secs(5), || {
        updates.lock().unwrap().len() >= 2
    });

    let revs: Vec<u64> = updates.lock().unwrap().iter().map(|u| u.rev()).collect();
    for pair in revs.windows(2) {
        assert!(pair[0] < pair[1], "revs must increase: {revs:?}");
    }
}

#[test]
fn logout_resets_everything() {
    let app = offline_app();
    app.dispatch(AppAction::Login {
        public_key: "BC1me".to_string(),
    });
    wait_until("login settles", Duration::from_secs(5), || {
        app.state().auth.is_logged_in()
    });

    app.dispatch(AppAction::Logout);
    wait_until("logged out", Duration::from_secs(5), || {
        !app.state().auth.is_logged_in()
    });

    let state = app.state();
    assert!(state.home_feed.posts.is_empty());
    assert!(state.saved_posts.posts.is_empty());
    assert!(state.notifications.notifications.is_empty());
    assert!(state.current_thread.is_none());
    assert!(state.wallet.is_none());
}
