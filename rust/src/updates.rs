use deso_api::models::{CloutTag, ExchangeRate, Post, User};
use deso_api::{
    user_visible_signer_error, ApiError, BlockPublicKeyResponse, HodlersPage, NotificationsPage,
    SignerError,
};

use crate::events::AppEvent;
use crate::state::{AppState, PromotionView};
use crate::AppAction;

/// Pushed to the shell on every state transition.
#[derive(Clone, Debug)]
pub enum AppUpdate {
    FullState(AppState),
}

impl AppUpdate {
    pub fn rev(&self) -> u64 {
        match self {
            AppUpdate::FullState(state) => state.rev,
        }
    }
}

#[derive(Debug)]
pub enum CoreMsg {
    Action(AppAction),
    Internal(Box<InternalEvent>),
}

/// Which paged post list a page belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListTarget {
    HomeFeed,
    SavedPosts,
    Comments,
}

/// One fetched page. `fetched` is the server-side result count before any
/// client-side dropping (failed single-post resolutions, etc); end-of-data is
/// judged against it, not against `items.len()`.
#[derive(Debug)]
pub struct LoadedPage {
    pub items: Vec<Post>,
    pub fetched: usize,
}

/// A write that failed either against the API or at the signing seam.
#[derive(Debug)]
pub enum WriteFailure {
    Api(ApiError),
    Signer(SignerError),
}

impl WriteFailure {
    pub fn user_message(&self) -> String {
        match self {
            WriteFailure::Api(err) => err.user_message(),
            WriteFailure::Signer(err) => match user_visible_signer_error(err) {
                Some(msg) => msg.to_string(),
                None => "Something went wrong! Please try again in one minute.".to_string(),
            },
        }
    }
}

impl From<ApiError> for WriteFailure {
    fn from(err: ApiError) -> Self {
        WriteFailure::Api(err)
    }
}

impl From<SignerError> for WriteFailure {
    fn from(err: SignerError) -> Self {
        WriteFailure::Signer(err)
    }
}

/// Results of spawned work, delivered back to the actor thread. Every variant
/// that races against refresh/teardown carries the generation token captured
/// when the work was spawned.
#[derive(Debug)]
pub enum InternalEvent {
    // Read path
    PageLoaded {
        list: ListTarget,
        token: u64,
        result: Result<LoadedPage, ApiError>,
    },
    /// Which post (if any) is pinned to the global feed; resolved alongside
    /// the feed's first page.
    PinnedPostKnown {
        post_hash_hex: Option<String>,
    },
    SavedIdsReloaded {
        token: u64,
        ids: Vec<String>,
    },
    ThreadLoaded {
        token: u64,
        post_hash_hex: String,
        result: Result<Option<Box<Post>>, ApiError>,
    },
    NotificationsPageLoaded {
        token: u64,
        result: Result<NotificationsPage, ApiError>,
    },
    HoldersPageLoaded {
        token: u64,
        result: Result<HodlersPage, ApiError>,
    },
    DiscoveryLoaded {
        token: u64,
        result: Result<Vec<CloutTag>, ApiError>,
    },
    UserRefreshed {
        result: Result<Box<User>, ApiError>,
        while_logging_in: bool,
    },
    ExchangeRateLoaded {
        result: Result<ExchangeRate, ApiError>,
    },
    WalletLoaded {
        token: u64,
        result: Result<WalletFetch, ApiError>,
    },
    PromotionsLoaded {
        token: u64,
        result: Result<Vec<PromotionView>, ApiError>,
    },

    // Write path
    PostSubmitted {
        result: Result<Option<Box<Post>>, WriteFailure>,
        parent_post_hash_hex: Option<String>,
    },
    LikeToggled {
        post_hash_hex: String,
        unlike: bool,
        result: Result<(), WriteFailure>,
    },
    PostSaved {
        post_hash_hex: String,
        result: Result<(), WriteFailure>,
    },
    PostUnsaved {
        post_hash_hex: String,
        result: Result<(), WriteFailure>,
    },
    /// `post_hash_hex` is `None` for an unpin.
    PostPinned {
        post_hash_hex: Option<String>,
        result: Result<(), WriteFailure>,
    },
    UserBlocked {
        public_key: String,
        result: Result<Box<BlockPublicKeyResponse>, WriteFailure>,
    },
    ProfileUpdated {
        result: Result<(), WriteFailure>,
    },
    ProofOfWorkSubmitted {
        promotion_id: u64,
        result: Result<(), WriteFailure>,
    },

    // Event-bus signals routed onto the actor thread.
    BusEvent(AppEvent),

    Toast(String),
}

/// Everything the wallet screen needs, fetched as one joined unit.
#[derive(Debug)]
pub struct WalletFetch {
    pub user: Box<User>,
    pub exchange_rate: ExchangeRate,
    /// Secondary USD → configured-fiat rate; 1.0 when the currency is USD.
    pub usd_to_fiat: f64,
}
