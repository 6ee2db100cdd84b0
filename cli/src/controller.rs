//! In-memory page of one remote collection.
//!
//! After a create/update/delete the controller patches its copy instead of
//! refetching. Those optimistic edits never touch `current_page` or
//! `total_pages`, so the held page drifts from the server until the next
//! load. That drift is accepted; `sync_state` reports it.

use crate::api::ResourceClient;
use crate::models::{Identified, Page, Patchable};
use crate::notify::Notifier;
use crate::pagination::{self, PageWindow};
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Nothing loaded yet.
    Unsynced,
    /// Items are exactly what the server last returned.
    Synced,
    /// Optimistic edits applied since the last load.
    Dirty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// Out-of-range request, nothing happened.
    Ignored,
    /// The fetch failed. Previous state is untouched.
    Failed,
}

pub struct ListController<C: ResourceClient> {
    client: C,
    limit: u32,
    max_buttons: u32,
    items: Vec<C::Item>,
    current_page: u32,
    total_pages: Option<u32>,
    total_count: u64,
    loading: bool,
    sync: SyncState,
    last_synced: Option<DateTime<Utc>>,
    failure_message: String,
    notifier: Arc<dyn Notifier>,
}

impl<C: ResourceClient> ListController<C> {
    pub fn new(client: C, limit: u32, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            limit,
            max_buttons: 5,
            items: Vec::new(),
            current_page: 1,
            total_pages: None,
            total_count: 0,
            loading: false,
            sync: SyncState::Unsynced,
            last_synced: None,
            failure_message: "Failed to load items".to_string(),
            notifier,
        }
    }

    /// Text of the notification shown when a page fails to load.
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    pub fn with_max_buttons(mut self, max_buttons: u32) -> Self {
        self.max_buttons = max_buttons;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn items(&self) -> &[C::Item] {
        &self.items
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Page count from the last load, 0 before the first one.
    pub fn total_pages(&self) -> u32 {
        self.total_pages.unwrap_or(0)
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync
    }

    pub fn last_synced(&self) -> Option<DateTime<Utc>> {
        self.last_synced
    }

    /// Whether `load_page(page)` would do anything. Before the first load the
    /// page count is unknown and only page 1 is allowed.
    pub fn can_load(&self, page: u32) -> bool {
        match self.total_pages {
            Some(total) => (1..=total).contains(&page),
            None => page == 1,
        }
    }

    pub async fn load_page(&mut self, page: u32) -> LoadOutcome {
        if !self.can_load(page) {
            log::debug!(
                "ignoring page {} (total pages {:?})",
                page,
                self.total_pages
            );
            return LoadOutcome::Ignored;
        }
        self.fetch(page).await
    }

    /// Reloads the current page without the range check, so an empty
    /// collection can still be re-fetched.
    pub async fn refresh(&mut self) -> LoadOutcome {
        self.fetch(self.current_page.max(1)).await
    }

    async fn fetch(&mut self, page: u32) -> LoadOutcome {
        self.loading = true;
        let result = self.client.list(self.limit, page).await;
        self.loading = false;

        match result {
            Ok(loaded) => {
                self.apply(loaded);
                LoadOutcome::Loaded
            }
            Err(e) => {
                log::warn!("loading page {} failed: {}", page, e);
                self.notifier.error(&self.failure_message);
                LoadOutcome::Failed
            }
        }
    }

    fn apply(&mut self, page: Page<C::Item>) {
        self.items = page.items;
        self.current_page = page.current_page;
        self.total_pages = Some(page.total_pages);
        self.total_count = page.total_count;
        self.sync = SyncState::Synced;
        self.last_synced = Some(Utc::now());
    }

    /// Prepends a freshly created item and bumps the count. Page totals are
    /// left alone.
    ///
    /// Ids stay unique: an item whose id is already held replaces the old
    /// entry (moved to the front) and the count is not bumped again.
    pub fn optimistic_add(&mut self, item: C::Item) {
        let before = self.items.len();
        self.items.retain(|existing| existing.id() != item.id());
        if self.items.len() == before {
            self.total_count += 1;
        }
        self.items.insert(0, item);
        self.sync = SyncState::Dirty;
    }

    /// Drops `id` and decrements the count. Call only after the remote
    /// delete is confirmed.
    pub fn optimistic_remove(&mut self, id: u64) {
        self.items.retain(|item| item.id() != id);
        self.total_count = self.total_count.saturating_sub(1);
        self.sync = SyncState::Dirty;
    }

    /// Page-button window for the current position.
    pub fn navigation(&self) -> Option<PageWindow> {
        pagination::visible_pages(self.current_page, self.total_pages(), self.max_buttons)
    }
}

impl<C> ListController<C>
where
    C: ResourceClient,
    C::Item: Patchable,
{
    /// Shallow-merges `patch` into the held item with the same id. Returns
    /// false when that id is not on this page.
    pub fn optimistic_update(&mut self, patch: <C::Item as Patchable>::Patch) -> bool {
        match self.items.iter_mut().find(|item| item.id() == patch.id()) {
            Some(item) => {
                item.merge(patch);
                self.sync = SyncState::Dirty;
                true
            }
            None => false,
        }
    }
}
