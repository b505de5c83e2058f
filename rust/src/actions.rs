use deso_api::NewPost;

use crate::state::{HiddenNftMode, HomeScreenTab, HotFeedFilter};

#[derive(Debug, Clone)]
pub enum AppAction {
    // Auth
    Login { public_key: String },
    Logout,

    // Home feed
    SelectFeedTab { tab: HomeScreenTab },
    SetHotFeedFilter { filter: HotFeedFilter },
    LoadHomeFeed,
    RefreshHomeFeed,
    LoadMoreHomeFeed,

    // Saved posts
    LoadSavedPosts,
    RefreshSavedPosts,
    LoadMoreSavedPosts,

    // Post thread
    OpenPost { post_hash_hex: String },
    CloseThread,
    LoadMoreComments,

    // Notifications
    LoadNotifications,
    RefreshNotifications,
    LoadMoreNotifications,

    // Coin holders
    OpenCoinHolders { public_key: String },
    LoadMoreCoinHolders,
    CloseCoinHolders,

    // Discovery
    RefreshDiscovery,

    // Wallet
    RefreshWallet,

    // Promotions
    RefreshPromotions,
    CompletePromotion { promotion_id: u64, post_hash_hex: String },

    // Writes
    SubmitPost { post: NewPost },
    ToggleLike { post_hash_hex: String, unlike: bool },
    SavePost { post_hash_hex: String },
    UnsavePost { post_hash_hex: String },
    PinPost { post_hash_hex: String },
    UnpinPost { post_hash_hex: String },
    BlockUser { public_key: String },
    UpdateProfile { username: String, description: String },

    // Display
    SetHiddenNftMode { mode: HiddenNftMode },
    ClearToast,
}

impl AppAction {
    /// Log-safe action tag (payloads never reach the logs).
    pub fn tag(&self) -> &'static str {
        match self {
            // Auth
            AppAction::Login { .. } => "Login",
            AppAction::Logout => "Logout",

            // Home feed
            AppAction::SelectFeedTab { .. } => "SelectFeedTab",
            AppAction::SetHotFeedFilter { .. } => "SetHotFeedFilter",
            AppAction::LoadHomeFeed => "LoadHomeFeed",
            AppAction::RefreshHomeFeed => "RefreshHomeFeed",
            AppAction::LoadMoreHomeFeed => "LoadMoreHomeFeed",

            // Saved posts
            AppAction::LoadSavedPosts => "LoadSavedPosts",
            AppAction::RefreshSavedPosts => "RefreshSavedPosts",
            AppAction::LoadMoreSavedPosts => "LoadMoreSavedPosts",

            // Post thread
            AppAction::OpenPost { .. } => "OpenPost",
            AppAction::CloseThread => "CloseThread",
            AppAction::LoadMoreComments => "LoadMoreComments",

            // Notifications
            AppAction::LoadNotifications => "LoadNotifications",
            AppAction::RefreshNotifications => "RefreshNotifications",
            AppAction::LoadMoreNotifications => "LoadMoreNotifications",

            // Coin holders
            AppAction::OpenCoinHolders { .. } => "OpenCoinHolders",
            AppAction::LoadMoreCoinHolders => "LoadMoreCoinHolders",
            AppAction::CloseCoinHolders => "CloseCoinHolders",

            // Discovery
            AppAction::RefreshDiscovery => "RefreshDiscovery",

            // Wallet
            AppAction::RefreshWallet => "RefreshWallet",

            // Promotions
            AppAction::RefreshPromotions => "RefreshPromotions",
            AppAction::CompletePromotion { .. } => "CompletePromotion",

            // Writes
            AppAction::SubmitPost { .. } => "SubmitPost",
            AppAction::ToggleLike { .. } => "ToggleLike",
            AppAction::SavePost { .. } => "SavePost",
            AppAction::UnsavePost { .. } => "UnsavePost",
            AppAction::PinPost { .. } => "PinPost",
            AppAction::UnpinPost { .. } => "UnpinPost",
            AppAction::BlockUser { .. } => "BlockUser",
            AppAction::UpdateProfile { .. } => "UpdateProfile",

            // Display
            AppAction::SetHiddenNftMode { .. } => "SetHiddenNftMode",
            AppAction::ClearToast => "ClearToast",
        }
    }
}
