use std::collections::HashMap;

use deso_api::models::{
    CloutCastPromotion, CloutTag, CreatorCoinHodler, Notification, Post, ProfileEntryResponse,
};

/// Full snapshot handed to the platform shell. Cheap to clone; the core emits
/// a fresh one after every state transition.
#[derive(Clone, Debug)]
pub struct AppState {
    pub rev: u64,
    pub auth: AuthState,
    pub busy: BusyState,
    pub selected_tab: HomeScreenTab,
    pub hot_feed_filter: HotFeedFilter,
    pub hidden_nft_mode: HiddenNftMode,
    pub home_feed: FeedViewState,
    pub saved_posts: FeedViewState,
    pub notifications: NotificationsViewState,
    pub current_thread: Option<ThreadViewState>,
    pub coin_holders: Option<CoinHoldersViewState>,
    pub wallet: Option<WalletViewState>,
    pub promotions: PromotionsViewState,
    pub discovery: DiscoveryViewState,
    /// Hash of the post pinned to the global feed, once known.
    pub pinned_post_hash: Option<String>,
    pub search_header_focused: bool,
    pub profile_manager_visible: bool,
    pub toast: Option<String>,
}

impl AppState {
    pub fn empty() -> Self {
        Self {
            rev: 0,
            auth: AuthState::LoggedOut,
            busy: BusyState::idle(),
            selected_tab: HomeScreenTab::Global,
            hot_feed_filter: HotFeedFilter::Today,
            hidden_nft_mode: HiddenNftMode::Show,
            home_feed: FeedViewState::empty(),
            saved_posts: FeedViewState::empty(),
            notifications: NotificationsViewState::empty(),
            current_thread: None,
            coin_holders: None,
            wallet: None,
            promotions: PromotionsViewState::empty(),
            discovery: DiscoveryViewState::empty(),
            pinned_post_hash: None,
            search_header_focused: false,
            profile_manager_visible: false,
            toast: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    LoggedIn { public_key: String, username: String },
}

impl AuthState {
    pub fn public_key(&self) -> Option<&str> {
        match self {
            AuthState::LoggedOut => None,
            AuthState::LoggedIn { public_key, .. } => Some(public_key),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, AuthState::LoggedIn { .. })
    }
}

/// "In flight" flags for long-ish operations that the UI should reflect.
/// List loading state lives with each list; these cover the one-shot writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BusyState {
    pub logging_in: bool,
    pub submitting_post: bool,
    pub updating_profile: bool,
    pub loading_wallet: bool,
    pub working_promotion: bool,
}

impl BusyState {
    pub fn idle() -> Self {
        Self {
            logging_in: false,
            submitting_post: false,
            updating_profile: false,
            loading_wallet: false,
            working_promotion: false,
        }
    }
}

/// Loading state of one list instance. At most one fetch per list is in
/// flight, so this is a plain enum rather than a set of booleans.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    /// First page, nothing on screen yet (full-screen loader).
    InitialLoading,
    /// Appending a page to an already-visible list (footer spinner).
    LoadingMore,
    /// Pull-to-refresh; the stale list stays visible until data arrives.
    Refreshing,
}

impl LoadStatus {
    pub fn is_loading(&self) -> bool {
        !matches!(self, LoadStatus::Idle)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HomeScreenTab {
    Global,
    Following,
    Recent,
    Hot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HotFeedFilter {
    Today,
    Week,
    AllTime,
}

impl HotFeedFilter {
    /// Trailing window the hot feed ranks over, in minutes. Zero = unbounded.
    pub fn lookback_minutes(&self) -> u64 {
        match self {
            HotFeedFilter::Today => 24 * 60,
            HotFeedFilter::Week => 7 * 24 * 60,
            HotFeedFilter::AllTime => 0,
        }
    }
}

/// How NFT posts are presented in feeds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HiddenNftMode {
    #[default]
    Show,
    /// Render NFT posts but collapse their NFT chrome.
    Details,
    /// Drop NFT posts from every list.
    Hide,
}

/// A post list as the shell should render it: already filtered for blocked
/// and hidden content.
#[derive(Clone, Debug, Default)]
pub struct FeedViewState {
    pub posts: Vec<Post>,
    pub status: LoadStatus,
    pub end_of_data: bool,
}

impl FeedViewState {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Clone, Debug, Default)]
pub struct NotificationsViewState {
    pub notifications: Vec<Notification>,
    /// Profiles referenced by the notifications, keyed by public key.
    pub profiles: HashMap<String, ProfileEntryResponse>,
    pub status: LoadStatus,
    pub end_of_data: bool,
}

impl NotificationsViewState {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// The open post screen: the post itself, its ancestor chain, and a paged
/// comment list.
#[derive(Clone, Debug)]
pub struct ThreadViewState {
    pub post_hash_hex: String,
    pub post: Option<Box<Post>>,
    pub parent_posts: Vec<Post>,
    pub comments: Vec<Post>,
    pub status: LoadStatus,
    pub end_of_comments: bool,
}

/// Who holds a creator's coin, in server order.
#[derive(Clone, Debug)]
pub struct CoinHoldersViewState {
    pub public_key: String,
    pub holders: Vec<CreatorCoinHodler>,
    pub status: LoadStatus,
    pub end_of_data: bool,
}

#[derive(Clone, Debug, Default)]
pub struct DiscoveryViewState {
    pub trending_tags: Vec<CloutTag>,
    pub status: LoadStatus,
}

impl DiscoveryViewState {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Clone, Debug)]
pub struct WalletViewState {
    pub balance_nanos: u64,
    pub balance_deso: String,
    pub balance_fiat: String,
    /// What one DeSo is currently worth, in the configured fiat currency.
    pub deso_price_fiat: String,
    pub total_coin_value_fiat: String,
    pub fiat_code: String,
    /// Creator coins held, sorted by fiat value, descending.
    pub holdings: Vec<CoinHoldingView>,
}

#[derive(Clone, Debug)]
pub struct CoinHoldingView {
    pub holding: CreatorCoinHodler,
    pub fiat_value: f64,
    /// Implied per-coin price derived from the sell valuation.
    pub coin_price_fiat: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PromotionsViewState {
    pub promotions: Vec<PromotionView>,
    pub status: LoadStatus,
}

impl PromotionsViewState {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A promotion enriched with everything the card needs to render and gate its
/// action button.
#[derive(Clone, Debug)]
pub struct PromotionView {
    pub promotion: CloutCastPromotion,
    pub post: Option<Box<Post>>,
    pub requirements_met: bool,
    pub already_promoted: bool,
}

pub fn now_seconds() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Display timestamp for a post's `TimestampNanos` (UTC).
pub fn format_post_timestamp(timestamp_nanos: i64) -> String {
    let secs = timestamp_nanos.div_euclid(1_000_000_000);
    match chrono::DateTime::<chrono::Utc>::from_timestamp(secs, 0) {
        Some(dt) => dt.format("%b %-d, %H:%M").to_string(),
        None => String::new(),
    }
}
