use super::{ResourceClient, TaskMutations, check_page_request, endpoint, read_json};
use crate::error::Result;
use crate::models::{DeletedTask, NewTask, Page, Task, TaskFields, TaskPatch};
use crate::pagination;
use async_trait::async_trait;
use serde::Deserialize;

pub const DEFAULT_USER_ID: u64 = 1;

/// `GET /todos?limit=L&skip=S`. The echoed `skip` and `limit` are ignored.
#[derive(Debug, Deserialize)]
struct TaskListResponse {
    todos: Vec<Task>,
    total: u64,
}

/// Client for the to-do collection. Paging is done upstream with
/// `limit`/`skip`. No request timeout beyond the transport's own.
#[derive(Debug, Clone)]
pub struct TaskClient {
    http: reqwest::Client,
    base_url: String,
}

impl TaskClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        endpoint(&self.base_url, path)
    }
}

#[async_trait]
impl ResourceClient for TaskClient {
    type Item = Task;

    async fn list(&self, limit: u32, page: u32) -> Result<Page<Task>> {
        check_page_request(limit, page)?;
        let skip = pagination::skip_for(page, limit);
        let url = self.url("/todos");
        log::debug!("GET {} limit={} skip={}", url, limit, skip);

        let response = self
            .http
            .get(&url)
            .query(&[("limit", u64::from(limit)), ("skip", skip)])
            .send()
            .await?;
        let body: TaskListResponse = read_json(response).await?;

        Ok(Page {
            items: body.todos,
            current_page: page,
            total_pages: pagination::total_pages(body.total, limit),
            total_count: body.total,
            limit,
        })
    }

    async fn get_by_id(&self, id: &str) -> Result<Task> {
        let url = self.url(&format!("/todos/{}", id));
        log::debug!("GET {}", url);
        read_json(self.http.get(&url).send().await?).await
    }
}

#[async_trait]
impl TaskMutations for TaskClient {
    async fn create(&self, task: NewTask) -> Result<Task> {
        let url = self.url("/todos/add");
        log::debug!("POST {}", url);
        read_json(self.http.post(&url).json(&task).send().await?).await
    }

    async fn update(&self, id: u64, fields: TaskFields) -> Result<TaskPatch> {
        let url = self.url(&format!("/todos/{}", id));
        log::debug!("PUT {}", url);
        read_json(self.http.put(&url).json(&fields).send().await?).await
    }

    async fn delete(&self, id: u64) -> Result<DeletedTask> {
        let url = self.url(&format!("/todos/{}", id));
        log::debug!("DELETE {}", url);
        read_json(self.http.delete(&url).send().await?).await
    }
}

impl NewTask {
    /// A pending task for `user_id`, or the default user when unknown.
    pub fn pending(todo: impl Into<String>, user_id: Option<u64>) -> Self {
        Self {
            todo: todo.into(),
            completed: false,
            user_id: user_id.unwrap_or(DEFAULT_USER_ID),
        }
    }
}
