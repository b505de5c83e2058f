//! The paged-list state machine behind every scrolling collection (home
//! feed, comments, saved posts, notifications).
//!
//! The machine owns the accumulated items, the loading state, the end-of-data
//! flag and a generation token; the actor owns the actual fetching. A load
//! starts with [`PagedList::begin`], which refuses when a fetch is already in
//! flight or there is nothing more to load, and ends with
//! [`PagedList::complete`] or [`PagedList::fail`] carrying the token from the
//! matching [`PageRequest`]. Stale tokens (bumped by refresh or teardown) are
//! ignored, which is how discarded in-flight results work — requests are
//! never cancelled at the transport level.

use std::collections::HashSet;

use deso_api::models::{CreatorCoinHodler, Notification, Post};

use crate::state::LoadStatus;

/// Anything pageable: identified by a stable string key.
pub(crate) trait ListItem {
    fn item_key(&self) -> String;
}

impl ListItem for Post {
    fn item_key(&self) -> String {
        self.post_hash_hex.clone()
    }
}

impl ListItem for Notification {
    fn item_key(&self) -> String {
        self.index.to_string()
    }
}

impl ListItem for CreatorCoinHodler {
    fn item_key(&self) -> String {
        self.hodler_public_key_base58_check.clone()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LoadKind {
    /// First page; the previous list (if any) is replaced when data arrives.
    Initial,
    /// Next page, appended.
    More,
    /// Like `Initial`, but surfaced to the UI as a pull-to-refresh.
    Refresh,
}

/// What the fetcher should ask the server for.
#[derive(Clone, Debug)]
pub(crate) struct PageRequest {
    pub token: u64,
    /// Key of the last accumulated item — the exclusive lower bound for
    /// key-cursor endpoints. `None` on the first page.
    pub cursor: Option<String>,
    /// Number of items already accumulated, for offset-based endpoints.
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug)]
pub(crate) struct PagedList<T> {
    items: Vec<T>,
    keys: HashSet<String>,
    status: LoadStatus,
    end_of_data: bool,
    replace_on_complete: bool,
    token: u64,
    page_size: usize,
}

impl<T: ListItem> PagedList<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            keys: HashSet::new(),
            status: LoadStatus::Idle,
            end_of_data: false,
            replace_on_complete: false,
            token: 0,
            page_size,
        }
    }

    /// Start a load. Returns `None` (caller does nothing) when a fetch is
    /// already in flight, or for `More` when the end of data was reached.
    pub fn begin(&mut self, kind: LoadKind) -> Option<PageRequest> {
        if self.status.is_loading() {
            return None;
        }
        if kind == LoadKind::More && self.end_of_data {
            return None;
        }

        self.token = self.token.wrapping_add(1);
        let (cursor, offset) = match kind {
            LoadKind::Initial | LoadKind::Refresh => {
                self.end_of_data = false;
                self.replace_on_complete = true;
                self.status = if kind == LoadKind::Initial {
                    LoadStatus::InitialLoading
                } else {
                    LoadStatus::Refreshing
                };
                (None, 0)
            }
            LoadKind::More => {
                self.status = LoadStatus::LoadingMore;
                (self.items.last().map(ListItem::item_key), self.items.len())
            }
        };

        Some(PageRequest {
            token: self.token,
            cursor,
            offset,
            limit: self.page_size,
        })
    }

    /// Merge a fetched page. `fetched` is the raw server-side count the page
    /// was derived from; the end-of-data flag trips when it falls short of
    /// the page size. Returns false (and changes nothing) on a stale token.
    pub fn complete(&mut self, token: u64, page: Vec<T>, fetched: usize) -> bool {
        if token != self.token {
            return false;
        }
        if self.replace_on_complete {
            self.items.clear();
            self.keys.clear();
            self.replace_on_complete = false;
        }
        if fetched < self.page_size {
            self.end_of_data = true;
        }
        for item in page {
            // First-seen occurrence wins and keeps its position.
            if self.keys.insert(item.item_key()) {
                self.items.push(item);
            }
        }
        self.status = LoadStatus::Idle;
        true
    }

    /// A failed fetch clears the loading state and nothing else.
    pub fn fail(&mut self, token: u64) -> bool {
        if token != self.token {
            return false;
        }
        self.status = LoadStatus::Idle;
        self.replace_on_complete = false;
        true
    }

    /// Forget everything and invalidate any in-flight fetch (logout,
    /// screen teardown).
    pub fn reset(&mut self) {
        self.token = self.token.wrapping_add(1);
        self.items.clear();
        self.keys.clear();
        self.status = LoadStatus::Idle;
        self.end_of_data = false;
        self.replace_on_complete = false;
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Generation of the most recently issued request.
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn end_of_data(&self) -> bool {
        self.end_of_data
    }

    /// Out-of-band removal (e.g. an unsave event); no network involved.
    pub fn retain(&mut self, f: impl Fn(&T) -> bool) {
        self.items.retain(|item| f(item));
        self.keys = self.items.iter().map(ListItem::item_key).collect();
    }

    /// Insert at the front unless the key is already present (a just-created
    /// post landing on top of the feed).
    pub fn prepend_unique(&mut self, item: T) -> bool {
        if !self.keys.insert(item.item_key()) {
            return false;
        }
        self.items.insert(0, item);
        true
    }

    /// Front-insert that moves an already-present key to the front instead
    /// (the new-comment semantics of the post screen).
    pub fn move_to_front_or_prepend(&mut self, item: T) {
        let key = item.item_key();
        if self.keys.contains(&key) {
            self.items.retain(|existing| existing.item_key() != key);
        } else {
            self.keys.insert(key);
        }
        self.items.insert(0, item);
    }

    /// Apply an in-place edit to the item with the given key.
    pub fn update(&mut self, key: &str, f: impl FnOnce(&mut T)) -> bool {
        match self.items.iter_mut().find(|item| item.item_key() == key) {
            Some(item) => {
                f(item);
                true
            }
            None => false,
        }
    }

    /// Derive the display list. Never mutates the accumulated list.
    pub fn visible(&self, f: impl Fn(&T) -> bool) -> Vec<T>
    where
        T: Clone,
    {
        self.items.iter().filter(|item| f(item)).cloned().collect()
    }
}
