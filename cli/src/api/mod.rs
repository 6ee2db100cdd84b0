//! Typed wrappers over the two remote collections.

pub mod products;
pub mod tasks;

pub use products::ProductClient;
pub use tasks::TaskClient;

use crate::error::{Error, Result};
use crate::models::{DeletedTask, Identified, NewTask, Page, Task, TaskFields, TaskPatch};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// One remote collection that can be paged through and looked up by id.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    type Item: Identified + Clone + Send + Sync;

    /// Page `page` (1-based) of at most `limit` items.
    async fn list(&self, limit: u32, page: u32) -> Result<Page<Self::Item>>;

    /// A single record. The id is passed through as the caller gave it.
    async fn get_by_id(&self, id: &str) -> Result<Self::Item>;
}

/// Write side of the task collection.
#[async_trait]
pub trait TaskMutations: Send + Sync {
    async fn create(&self, task: NewTask) -> Result<Task>;
    /// Only the fields the server echoes back are set in the returned patch.
    async fn update(&self, id: u64, fields: TaskFields) -> Result<TaskPatch>;
    async fn delete(&self, id: u64) -> Result<DeletedTask>;
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Non-success statuses become `Error::Http`; bodies that do not decode into
/// `T` are `UnexpectedResponse`.
pub(crate) fn parse_json<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T> {
    if !status.is_success() {
        return Err(Error::from_response(status, text));
    }
    serde_json::from_str(text).map_err(|e| Error::UnexpectedResponse(e.to_string()))
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;
    parse_json(status, &text)
}

fn check_page_request(limit: u32, page: u32) -> Result<()> {
    if limit == 0 {
        return Err(Error::invalid("limit", "Page size must be greater than 0"));
    }
    if page == 0 {
        return Err(Error::invalid("page", "Pages start at 1"));
    }
    Ok(())
}
