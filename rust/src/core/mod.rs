mod cache;
mod cloutcast;
mod config;
mod discovery;
mod feed;
mod filter;
mod holders;
mod home;
mod notifications;
mod saved;
mod session;
mod thread;
mod wallet;
mod writes;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use flume::Sender;

use deso_api::models::{CreatorCoinHodler, Notification, Post};
use deso_api::{DesoClient, TransactionSigner};

use crate::actions::AppAction;
use crate::events::{AppEvent, EventBus, EventSubscription, EventType};
use crate::state::*;
use crate::updates::{AppUpdate, CoreMsg, InternalEvent, ListTarget, LoadedPage, WriteFailure};

use cache::CacheRegistry;
use feed::{LoadKind, PagedList};
use filter::PostFilter;
use holders::COIN_HOLDERS_PAGE_SIZE;
use home::HOME_FEED_PAGE_SIZE;
use notifications::NOTIFICATIONS_PAGE_SIZE;
use saved::SAVED_POSTS_PAGE_SIZE;
use session::Session;
use thread::COMMENTS_PAGE_SIZE;

pub struct AppCore {
    pub state: AppState,
    rev: u64,

    update_sender: Sender<AppUpdate>,
    core_sender: Sender<CoreMsg>,
    shared_state: Arc<RwLock<AppState>>,

    config: config::AppConfig,
    runtime: tokio::runtime::Runtime,

    client: Arc<DesoClient>,
    signer: Arc<dyn TransactionSigner>,
    events: Arc<EventBus>,
    // Keep the bus registrations alive for the actor's lifetime.
    _event_subscriptions: Vec<EventSubscription>,
    cache: Arc<CacheRegistry>,

    session: Option<Session>,
    filter: PostFilter,

    // One loader per paged collection.
    home_feed: PagedList<Post>,
    saved_posts: PagedList<Post>,
    comments: PagedList<Post>,
    notifications: PagedList<Notification>,
    coin_holders: PagedList<CreatorCoinHodler>,
    /// Ordered saved-post ids the saved loader pages over.
    saved_ids: Vec<String>,

    // Generations for non-list async results.
    wallet_token: u64,
    thread_token: u64,
    promotions_token: u64,
    discovery_token: u64,
}

impl AppCore {
    pub fn new(
        update_sender: Sender<AppUpdate>,
        core_sender: Sender<CoreMsg>,
        data_dir: String,
        signer: Arc<dyn TransactionSigner>,
        shared_state: Arc<RwLock<AppState>>,
        events: Arc<EventBus>,
    ) -> Self {
        let config = config::load_app_config(&data_dir);
        let state = AppState::empty();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .enable_io()
            .build()
            .expect("tokio runtime");

        let client = DesoClient::new(
            config
                .node_api_url
                .as_deref()
                .unwrap_or(deso_api::DEFAULT_NODE_API_URL),
            config
                .cloutfeed_api_url
                .as_deref()
                .unwrap_or(deso_api::DEFAULT_COMPANION_API_URL),
            config
                .cloutcast_api_url
                .as_deref()
                .unwrap_or(deso_api::DEFAULT_CLOUTCAST_API_URL),
        )
        .unwrap_or_else(|err| {
            tracing::warn!(err = %err, "invalid API url in config, using defaults");
            DesoClient::default_urls()
        });

        // Cross-screen signals are handled on the actor thread like any other
        // async result; the bus handlers only forward.
        let mut event_subscriptions = Vec::new();
        for event_type in [
            EventType::UnsavePost,
            EventType::ToggleHideNfts,
            EventType::FocusSearchHeader,
            EventType::ToggleProfileManager,
        ] {
            let tx = core_sender.clone();
            event_subscriptions.push(events.subscribe(event_type, move |event| {
                let _ = tx.send(CoreMsg::Internal(Box::new(InternalEvent::BusEvent(
                    event.clone(),
                ))));
            }));
        }

        let this = Self {
            state,
            rev: 0,
            update_sender,
            core_sender,
            shared_state,
            config,
            runtime,
            client: Arc::new(client),
            signer,
            events,
            _event_subscriptions: event_subscriptions,
            cache: CacheRegistry::new(),
            session: None,
            filter: PostFilter::default(),
            home_feed: PagedList::new(HOME_FEED_PAGE_SIZE),
            saved_posts: PagedList::new(SAVED_POSTS_PAGE_SIZE),
            comments: PagedList::new(COMMENTS_PAGE_SIZE),
            notifications: PagedList::new(NOTIFICATIONS_PAGE_SIZE),
            coin_holders: PagedList::new(COIN_HOLDERS_PAGE_SIZE),
            saved_ids: Vec::new(),
            wallet_token: 0,
            thread_token: 0,
            promotions_token: 0,
            discovery_token: 0,
        };

        // Ensure App::state() has an immediately-available snapshot.
        let snapshot = this.state.clone();
        this.commit_state_snapshot(&snapshot);
        this
    }

    fn next_rev(&mut self) -> u64 {
        self.rev += 1;
        self.state.rev = self.rev;
        self.rev
    }

    fn commit_state_snapshot(&self, snapshot: &AppState) {
        match self.shared_state.write() {
            Ok(mut g) => *g = snapshot.clone(),
            Err(poison) => *poison.into_inner() = snapshot.clone(),
        }
    }

    pub(super) fn emit_state(&mut self) {
        self.next_rev();
        let snapshot = self.state.clone();
        self.commit_state_snapshot(&snapshot);
        let _ = self.update_sender.send(AppUpdate::FullState(snapshot));
    }

    /// Keep the toast in state until the UI explicitly clears it, so a
    /// snapshot resync still shows it.
    pub(super) fn toast(&mut self, msg: impl Into<String>) {
        self.state.toast = Some(msg.into());
        self.emit_state();
    }

    pub(super) fn set_busy(&mut self, f: impl FnOnce(&mut BusyState)) {
        let mut next = self.state.busy.clone();
        f(&mut next);
        if next != self.state.busy {
            self.state.busy = next;
            self.emit_state();
        }
    }

    /// Re-derive every display list through the current filter. Callers emit.
    pub(super) fn refresh_visible_lists(&mut self) {
        self.sync_home_view();
        self.sync_saved_view();
        self.sync_thread_view();
        self.sync_notifications_view();
    }

    pub fn handle_message(&mut self, msg: CoreMsg) {
        match msg {
            CoreMsg::Action(ref action) => {
                // Log the tag only; payloads can carry user content.
                tracing::info!(action = action.tag(), "dispatch");
                self.handle_action(action.clone());
            }
            CoreMsg::Internal(internal) => self.handle_internal(*internal),
        }
    }

    fn handle_action(&mut self, action: AppAction) {
        match action {
            // Auth
            AppAction::Login { public_key } => self.start_session(public_key),
            AppAction::Logout => self.stop_session(),

            // Home feed
            AppAction::SelectFeedTab { tab } => self.select_feed_tab(tab),
            AppAction::SetHotFeedFilter { filter } => self.set_hot_feed_filter(filter),
            AppAction::LoadHomeFeed => self.load_home_feed(LoadKind::Initial),
            AppAction::RefreshHomeFeed => self.load_home_feed(LoadKind::Refresh),
            AppAction::LoadMoreHomeFeed => self.load_home_feed(LoadKind::More),

            // Saved posts
            AppAction::LoadSavedPosts => self.load_saved_posts(LoadKind::Initial),
            AppAction::RefreshSavedPosts => self.load_saved_posts(LoadKind::Refresh),
            AppAction::LoadMoreSavedPosts => self.load_saved_posts(LoadKind::More),

            // Post thread
            AppAction::OpenPost { post_hash_hex } => self.open_post(post_hash_hex),
            AppAction::CloseThread => self.close_thread(),
            AppAction::LoadMoreComments => self.load_more_comments(),

            // Notifications
            AppAction::LoadNotifications => self.load_notifications(LoadKind::Initial),
            AppAction::RefreshNotifications => self.load_notifications(LoadKind::Refresh),
            AppAction::LoadMoreNotifications => self.load_notifications(LoadKind::More),

            // Coin holders
            AppAction::OpenCoinHolders { public_key } => self.open_coin_holders(public_key),
            AppAction::LoadMoreCoinHolders => self.load_more_coin_holders(),
            AppAction::CloseCoinHolders => self.close_coin_holders(),

            // Discovery
            AppAction::RefreshDiscovery => self.refresh_discovery(),

            // Wallet
            AppAction::RefreshWallet => self.refresh_wallet(),

            // Promotions
            AppAction::RefreshPromotions => self.refresh_promotions(),
            AppAction::CompletePromotion {
                promotion_id,
                post_hash_hex,
            } => self.complete_promotion(promotion_id, post_hash_hex),

            // Writes
            AppAction::SubmitPost { post } => self.submit_post(post),
            AppAction::ToggleLike {
                post_hash_hex,
                unlike,
            } => self.toggle_like(post_hash_hex, unlike),
            AppAction::SavePost { post_hash_hex } => self.save_post(post_hash_hex, false),
            AppAction::UnsavePost { post_hash_hex } => self.save_post(post_hash_hex, true),
            AppAction::PinPost { post_hash_hex } => self.pin_post(post_hash_hex, false),
            AppAction::UnpinPost { post_hash_hex } => self.pin_post(post_hash_hex, true),
            AppAction::BlockUser { public_key } => self.block_user(public_key),
            AppAction::UpdateProfile {
                username,
                description,
            } => self.update_profile(username, description),

            // Display
            AppAction::SetHiddenNftMode { mode } => {
                // Through the bus, so screen subscribers hear it too.
                self.events.publish(&AppEvent::ToggleHideNfts { mode });
            }
            AppAction::ClearToast => {
                if self.state.toast.take().is_some() {
                    self.emit_state();
                }
            }
        }
    }

    fn handle_internal(&mut self, internal: InternalEvent) {
        match internal {
            InternalEvent::PageLoaded {
                list,
                token,
                result,
            } => match list {
                ListTarget::HomeFeed => self.apply_home_page(token, result),
                ListTarget::SavedPosts => self.apply_saved_page(token, result),
                ListTarget::Comments => self.apply_comments_page(token, result),
            },
            InternalEvent::PinnedPostKnown { post_hash_hex } => {
                if self.state.pinned_post_hash != post_hash_hex {
                    self.state.pinned_post_hash = post_hash_hex;
                    self.emit_state();
                }
            }
            InternalEvent::SavedIdsReloaded { token, ids } => self.apply_saved_ids(token, ids),
            InternalEvent::ThreadLoaded {
                token,
                post_hash_hex,
                result,
            } => self.apply_thread_loaded(token, post_hash_hex, result),
            InternalEvent::NotificationsPageLoaded { token, result } => {
                self.apply_notifications_page(token, result)
            }
            InternalEvent::HoldersPageLoaded { token, result } => {
                self.apply_holders_page(token, result)
            }
            InternalEvent::DiscoveryLoaded { token, result } => {
                self.apply_discovery_loaded(token, result)
            }
            InternalEvent::UserRefreshed {
                result,
                while_logging_in,
            } => self.apply_user_refreshed(result, while_logging_in),
            InternalEvent::ExchangeRateLoaded { result } => {
                // Read-path prefetch; consumers use the cache when it filled.
                if let Err(err) = result {
                    tracing::warn!(err = %err, "exchange rate fetch failed");
                }
            }
            InternalEvent::WalletLoaded { token, result } => {
                self.apply_wallet_loaded(token, result)
            }
            InternalEvent::PromotionsLoaded { token, result } => {
                self.apply_promotions_loaded(token, result)
            }
            InternalEvent::PostSubmitted {
                result,
                parent_post_hash_hex,
            } => self.apply_post_submitted(result, parent_post_hash_hex),
            InternalEvent::LikeToggled {
                post_hash_hex,
                unlike,
                result,
            } => self.apply_like_toggled(&post_hash_hex, unlike, result),
            InternalEvent::PostSaved {
                post_hash_hex,
                result,
            } => self.apply_post_saved(&post_hash_hex, result),
            InternalEvent::PostUnsaved {
                post_hash_hex,
                result,
            } => self.apply_post_unsaved(&post_hash_hex, result),
            InternalEvent::PostPinned {
                post_hash_hex,
                result,
            } => self.apply_post_pinned(post_hash_hex, result),
            InternalEvent::UserBlocked { public_key, result } => {
                self.apply_user_blocked(&public_key, result)
            }
            InternalEvent::ProfileUpdated { result } => self.apply_profile_updated(result),
            InternalEvent::ProofOfWorkSubmitted {
                promotion_id,
                result,
            } => self.apply_proof_of_work(promotion_id, result),
            InternalEvent::BusEvent(event) => self.apply_bus_event(event),
            InternalEvent::Toast(ref msg) => {
                tracing::info!(msg, "toast");
                self.toast(msg.clone());
            }
        }
    }

    fn apply_bus_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::UnsavePost { post_hash_hex } => {
                self.saved_posts.retain(|p| p.post_hash_hex != post_hash_hex);
                self.saved_ids.retain(|id| *id != post_hash_hex);
                self.cache.saved_post_ids.mutate(|ids| {
                    ids.remove(&post_hash_hex);
                });
                self.sync_saved_view();
                self.emit_state();
            }
            AppEvent::ToggleHideNfts { mode } => {
                if self.state.hidden_nft_mode == mode {
                    return;
                }
                self.state.hidden_nft_mode = mode;
                self.filter.hidden_nft_mode = mode;
                self.refresh_visible_lists();
                self.emit_state();
            }
            AppEvent::FocusSearchHeader { focused } => {
                if self.state.search_header_focused != focused {
                    self.state.search_header_focused = focused;
                    self.emit_state();
                }
            }
            AppEvent::ToggleProfileManager { visible } => {
                if self.state.profile_manager_visible != visible {
                    self.state.profile_manager_visible = visible;
                    self.emit_state();
                }
            }
        }
    }
}
