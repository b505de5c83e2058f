// The open post screen: post + ancestor chain + offset-paged comments.

use deso_api::ApiError;
use deso_api::models::Post;

use super::*;

pub(super) const COMMENTS_PAGE_SIZE: usize = 20;

impl AppCore {
    pub(super) fn open_post(&mut self, post_hash_hex: String) {
        if post_hash_hex.trim().is_empty() {
            self.toast("Post not found");
            return;
        }

        // A new thread supersedes whatever was open.
        self.thread_token = self.thread_token.wrapping_add(1);
        self.comments.reset();
        let Some(req) = self.comments.begin(LoadKind::Initial) else {
            return;
        };

        self.state.current_thread = Some(ThreadViewState {
            post_hash_hex: post_hash_hex.clone(),
            post: None,
            parent_posts: Vec::new(),
            comments: Vec::new(),
            status: LoadStatus::InitialLoading,
            end_of_comments: false,
        });
        self.emit_state();

        if !self.network_enabled() {
            self.comments.fail(req.token);
            self.sync_thread_view();
            self.emit_state();
            return;
        }

        let reader = self
            .state
            .auth
            .public_key()
            .unwrap_or_default()
            .to_string();
        let client = self.client.clone();
        let tx = self.core_sender.clone();

        self.runtime.spawn(async move {
            let result = client
                .get_single_post(&reader, &post_hash_hex, true, 0, COMMENTS_PAGE_SIZE as u64)
                .await;
            let _ = tx.send(CoreMsg::Internal(Box::new(InternalEvent::ThreadLoaded {
                token: req.token,
                post_hash_hex,
                result,
            })));
        });
    }

    pub(super) fn close_thread(&mut self) {
        self.thread_token = self.thread_token.wrapping_add(1);
        self.comments.reset();
        if self.state.current_thread.take().is_some() {
            self.emit_state();
        }
    }

    pub(super) fn load_more_comments(&mut self) {
        let Some(thread) = self.state.current_thread.as_ref() else {
            return;
        };
        let post_hash_hex = thread.post_hash_hex.clone();
        let Some(req) = self.comments.begin(LoadKind::More) else {
            return;
        };
        self.sync_thread_view();
        self.emit_state();

        if !self.network_enabled() {
            self.comments.fail(req.token);
            self.sync_thread_view();
            self.emit_state();
            return;
        }

        let reader = self
            .state
            .auth
            .public_key()
            .unwrap_or_default()
            .to_string();
        let client = self.client.clone();
        let tx = self.core_sender.clone();

        self.runtime.spawn(async move {
            let result = client
                .get_single_post(
                    &reader,
                    &post_hash_hex,
                    false,
                    req.offset as u64,
                    req.limit as u64,
                )
                .await
                .map(|post| {
                    let comments = post
                        .and_then(|p| p.comments)
                        .unwrap_or_default();
                    LoadedPage {
                        fetched: comments.len(),
                        items: comments,
                    }
                });
            let _ = tx.send(CoreMsg::Internal(Box::new(InternalEvent::PageLoaded {
                list: ListTarget::Comments,
                token: req.token,
                result,
            })));
        });
    }

    pub(super) fn apply_thread_loaded(
        &mut self,
        token: u64,
        post_hash_hex: String,
        result: Result<Option<Box<Post>>, ApiError>,
    ) {
        // The comments list carries the generation for the whole thread load.
        match result {
            Ok(Some(mut post)) => {
                let comment_window = post.comments.take().unwrap_or_default();
                let fetched = comment_window.len();
                if !self.comments.complete(token, comment_window, fetched) {
                    return;
                }
                let parent_posts = post.parent_posts.take().unwrap_or_default();
                if let Some(thread) = self.state.current_thread.as_mut() {
                    if thread.post_hash_hex == post_hash_hex {
                        thread.parent_posts = parent_posts;
                        thread.post = Some(post);
                    }
                }
                self.sync_thread_view();
                self.emit_state();
            }
            Ok(None) => {
                if !self.comments.fail(token) {
                    return;
                }
                self.state.current_thread = None;
                self.toast("Post not found");
            }
            Err(err) => {
                if !self.comments.fail(token) {
                    return;
                }
                tracing::warn!(err = %err, "thread load failed");
                self.sync_thread_view();
                self.toast(err.user_message());
            }
        }
    }

    pub(super) fn apply_comments_page(
        &mut self,
        token: u64,
        result: Result<LoadedPage, ApiError>,
    ) {
        match result {
            Ok(page) => {
                if !self.comments.complete(token, page.items, page.fetched) {
                    return;
                }
            }
            Err(err) => {
                if !self.comments.fail(token) {
                    return;
                }
                tracing::warn!(err = %err, "comments page failed");
                self.toast(err.user_message());
            }
        }
        self.sync_thread_view();
        self.emit_state();
    }

    /// A successful reply lands at the front of the open thread's comments;
    /// an already-present hash is hoisted instead of duplicated.
    pub(super) fn insert_new_comment(&mut self, parent_post_hash_hex: &str, comment: Post) {
        let is_open = self
            .state
            .current_thread
            .as_ref()
            .map(|t| t.post_hash_hex == parent_post_hash_hex)
            .unwrap_or(false);
        if !is_open {
            return;
        }
        self.comments.move_to_front_or_prepend(comment);
        if let Some(thread) = self.state.current_thread.as_mut() {
            if let Some(post) = thread.post.as_mut() {
                post.comment_count = post.comment_count.saturating_add(1);
            }
        }
        self.sync_thread_view();
        self.emit_state();
    }

    pub(super) fn sync_thread_view(&mut self) {
        let filter = self.filter.clone();
        let comments = self.comments.visible(|p| filter.allows(p));
        let status = self.comments.status();
        let end = self.comments.end_of_data();
        if let Some(thread) = self.state.current_thread.as_mut() {
            thread.comments = comments;
            thread.status = status;
            thread.end_of_comments = end;
        }
    }
}
